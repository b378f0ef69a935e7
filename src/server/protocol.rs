//! Wire types of the line-oriented JSON protocol.
//!
//! Positions and ranges are 0-based lines and characters, like LSP.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::{LineIndex, Position, Span};
use crate::hir::Diagnostic;
use crate::ide::{Analysis, CompletionItem, HoverResult, SymbolInfo};

/// One request line.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: serde_json::Value,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseError {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification<T> {
    pub method: &'static str,
    pub params: T,
}

// ============================================================================
// PARAMS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseParams {
    pub file_uri: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileParams {
    pub file_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionParams {
    pub file_uri: String,
    pub position: WirePosition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetConfigParams {
    pub name: String,
    /// A string, or a bool / number for convenience.
    pub value: serde_json::Value,
}

impl SetConfigParams {
    /// The raw text to validate.
    pub fn raw_value(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Bool(true) => "y".to_string(),
            serde_json::Value::Bool(false) => "n".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportParams {
    #[serde(default)]
    pub file_uri: Option<String>,
    pub text: String,
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePosition {
    pub line: u32,
    pub character: u32,
}

impl From<Position> for WirePosition {
    fn from(position: Position) -> Self {
        Self {
            line: position.line,
            character: position.column,
        }
    }
}

impl From<WirePosition> for Position {
    fn from(position: WirePosition) -> Self {
        Position::new(position.line, position.character)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WireRange {
    pub start: WirePosition,
    pub end: WirePosition,
}

impl From<Span> for WireRange {
    fn from(span: Span) -> Self {
        Self {
            start: span.start.into(),
            end: span.end.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WireDiagnostic {
    pub range: WireRange,
    /// LSP severity number.
    pub severity: u32,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SmolStr>,
}

impl WireDiagnostic {
    pub fn new(diagnostic: &Diagnostic, index: &LineIndex) -> Self {
        Self {
            range: diagnostic.span(index).into(),
            severity: diagnostic.severity.to_lsp(),
            code: diagnostic.code,
            message: diagnostic.message.to_string(),
            symbol: diagnostic.symbol.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsResult {
    pub diagnostics: Vec<WireDiagnostic>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCompletionItem {
    pub label: String,
    /// LSP completion item kind number.
    pub kind: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    pub sort_text: String,
}

impl From<&CompletionItem> for WireCompletionItem {
    fn from(item: &CompletionItem) -> Self {
        Self {
            label: item.label.to_string(),
            kind: item.kind.to_lsp(),
            detail: item.detail.as_deref().map(str::to_string),
            documentation: item.documentation.as_deref().map(str::to_string),
            sort_text: format!("{:05}", item.sort_priority),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub items: Vec<WireCompletionItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireHover {
    pub contents: String,
    pub range: WireRange,
}

impl From<HoverResult> for WireHover {
    fn from(hover: HoverResult) -> Self {
        Self {
            contents: hover.contents,
            range: hover.span.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocumentSymbol {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub range: WireRange,
    pub selection_range: WireRange,
    pub active: bool,
    pub children: Vec<WireDocumentSymbol>,
}

impl From<&SymbolInfo> for WireDocumentSymbol {
    fn from(info: &SymbolInfo) -> Self {
        Self {
            name: info.name.to_string(),
            kind: info.kind.as_str(),
            detail: info.detail.as_deref().map(str::to_string),
            range: info.span.into(),
            selection_range: info.selection_span.into(),
            active: info.active,
            children: info.children.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSymbolValue {
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub value: Option<String>,
    pub visible: bool,
    pub active: bool,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResult {
    pub symbols: IndexMap<String, WireSymbolValue>,
}

impl ConfigResult {
    pub fn new(analysis: &Analysis) -> Self {
        let symbols = analysis
            .model()
            .iter()
            .filter(|entry| entry.ty.is_some())
            .map(|entry| {
                (
                    entry.name.to_string(),
                    WireSymbolValue {
                        ty: entry.ty.map(|t| t.as_str().to_string()),
                        value: entry.value.as_ref().map(ToString::to_string),
                        visible: entry.visible,
                        active: entry.active,
                        state: entry.state.as_str().to_string(),
                    },
                )
            })
            .collect();
        Self { symbols }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SetConfigResult {
    Ok { ok: bool },
    Error { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    pub applied: usize,
    pub diagnostics: Vec<WireDiagnostic>,
}

/// Body of a `didChangeConfig` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigChangeParams {
    pub version: u64,
    pub symbols: Vec<SmolStr>,
}
