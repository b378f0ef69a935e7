//! Line-delimited JSON RPC over a [`Workspace`].
//!
//! Every request line produces exactly one response line. Configuration
//! changes caused by the request follow it as `didChangeConfig`
//! notifications.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::base::{FileId, LineIndex};
use crate::hir::Diagnostic;
use crate::ide::Analysis;

use super::protocol::{
    CompletionResult, ConfigChangeParams, ConfigResult, DiagnosticsResult, ExportResult, FileParams,
    ImportParams, ImportResult, Notification, ParseParams, PositionParams, Request, Response,
    ResponseError, SetConfigParams, SetConfigResult, WireCompletionItem, WireDiagnostic,
    WireDocumentSymbol, WireHover,
};
use super::{ConfigChange, Workspace};

const DID_CHANGE_CONFIG: &str = "didChangeConfig";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] serde_json::Error),
    #[error("invalid params for `{method}`: {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown method `{0}`")]
    UnknownMethod(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub struct RpcServer {
    workspace: Arc<Workspace>,
    changes: Receiver<ConfigChange>,
    shutdown: bool,
}

impl RpcServer {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        let changes = workspace.subscribe();
        Self {
            workspace,
            changes,
            shutdown: false,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Serve requests until `shutdown` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<(), RpcError> {
        info!("kconfig server ready");
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            for out in self.handle_line(&line) {
                writeln!(output, "{out}")?;
            }
            output.flush()?;
            if self.shutdown {
                break;
            }
        }
        info!("kconfig server stopped");
        Ok(())
    }

    /// Handle one request line; returns the response followed by any
    /// change notifications.
    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                debug!(method = %request.method, "request");
                let id = request.id.clone();
                match self.dispatch(request) {
                    Ok(result) => Response {
                        id,
                        result: Some(result),
                        error: None,
                    },
                    Err(error) => {
                        warn!(%error, "request failed");
                        error_response(id, &error)
                    }
                }
            }
            Err(source) => error_response(Value::Null, &RpcError::InvalidRequest(source)),
        };

        let mut out = Vec::new();
        out.extend(encode(&response));
        for change in self.changes.try_iter() {
            let notification = Notification {
                method: DID_CHANGE_CONFIG,
                params: ConfigChangeParams {
                    version: change.version,
                    symbols: change.symbols,
                },
            };
            out.extend(encode(&notification));
        }
        out
    }

    fn dispatch(&mut self, request: Request) -> Result<Value, RpcError> {
        let method = request.method.as_str();
        match method {
            "parse" => {
                let params: ParseParams = params(method, request.params)?;
                let path = uri_to_path(&params.file_uri);
                self.workspace.set_file_text(&path, params.text);
                let analysis = self.workspace.analysis();
                to_value(DiagnosticsResult {
                    diagnostics: file_diagnostics(&analysis, analysis.file_id(&path)),
                })
            }
            "close" => {
                let params: FileParams = params(method, request.params)?;
                self.workspace.close_file(&uri_to_path(&params.file_uri));
                Ok(Value::Null)
            }
            "complete" => {
                let params: PositionParams = params(method, request.params)?;
                let analysis = self.workspace.analysis();
                let items = analysis
                    .file_id(&uri_to_path(&params.file_uri))
                    .map(|file| analysis.completions(file, params.position.into()))
                    .unwrap_or_default();
                to_value(CompletionResult {
                    items: items.iter().map(WireCompletionItem::from).collect(),
                })
            }
            "hover" => {
                let params: PositionParams = params(method, request.params)?;
                let analysis = self.workspace.analysis();
                let hover = analysis
                    .file_id(&uri_to_path(&params.file_uri))
                    .and_then(|file| analysis.hover(file, params.position.into()))
                    .map(WireHover::from);
                to_value(hover)
            }
            "documentSymbols" => {
                let params: FileParams = params(method, request.params)?;
                let analysis = self.workspace.analysis();
                let symbols: Vec<WireDocumentSymbol> = analysis
                    .file_id(&uri_to_path(&params.file_uri))
                    .map(|file| analysis.document_symbols(file))
                    .unwrap_or_default()
                    .iter()
                    .map(WireDocumentSymbol::from)
                    .collect();
                to_value(symbols)
            }
            "diagnostics" => {
                let params: FileParams = params(method, request.params)?;
                let analysis = self.workspace.analysis();
                let file = analysis.file_id(&uri_to_path(&params.file_uri));
                to_value(DiagnosticsResult {
                    diagnostics: file_diagnostics(&analysis, file),
                })
            }
            "getConfig" => to_value(ConfigResult::new(&self.workspace.analysis())),
            "setConfig" => {
                let params: SetConfigParams = params(method, request.params)?;
                let result = match self.workspace.set_value(&params.name, &params.raw_value()) {
                    Ok(_) => SetConfigResult::Ok { ok: true },
                    Err(error) => SetConfigResult::Error {
                        error: error.to_string(),
                    },
                };
                to_value(result)
            }
            "exportConfig" => to_value(ExportResult {
                text: self.workspace.export_config(),
            }),
            "importConfig" => {
                let params: ImportParams = params(method, request.params)?;
                let path = params.file_uri.as_deref().map(uri_to_path);
                let index = LineIndex::new(&params.text);
                let result = match self.workspace.import_config(path.as_deref(), &params.text) {
                    Ok(outcome) => ImportResult {
                        applied: outcome.applied,
                        diagnostics: outcome
                            .diagnostics
                            .iter()
                            .map(|d| WireDiagnostic::new(d, &index))
                            .collect(),
                    },
                    Err(_) => ImportResult {
                        applied: 0,
                        diagnostics: Vec::new(),
                    },
                };
                to_value(result)
            }
            "shutdown" => {
                self.shutdown = true;
                Ok(Value::Null)
            }
            _ => Err(RpcError::UnknownMethod(request.method)),
        }
    }
}

fn params<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|source| RpcError::InvalidParams {
        method: method.to_string(),
        source,
    })
}

fn to_value(value: impl Serialize) -> Result<Value, RpcError> {
    Ok(serde_json::to_value(value)?)
}

fn encode(value: &impl Serialize) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(line) => Some(line),
        Err(error) => {
            warn!(%error, "failed to encode message");
            None
        }
    }
}

fn error_response(id: Value, error: &RpcError) -> Response {
    Response {
        id,
        result: None,
        error: Some(ResponseError {
            message: error.to_string(),
        }),
    }
}

fn file_diagnostics(analysis: &Analysis, file: Option<FileId>) -> Vec<WireDiagnostic> {
    let Some(file) = file else {
        return Vec::new();
    };
    let diagnostics: Vec<Diagnostic> = analysis.diagnostics(file);
    match analysis.line_index(file) {
        Some(index) => diagnostics
            .iter()
            .map(|d| WireDiagnostic::new(d, index))
            .collect(),
        None => {
            let index = LineIndex::new("");
            diagnostics
                .iter()
                .map(|d| WireDiagnostic::new(d, &index))
                .collect()
        }
    }
}

/// Map a `file://` URI to a path; anything else is taken as a path.
pub fn uri_to_path(uri: &str) -> PathBuf {
    match uri.strip_prefix("file://") {
        Some(rest) => PathBuf::from(percent_decode(rest)),
        None => PathBuf::from(uri),
    }
}

fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
