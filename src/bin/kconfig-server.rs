use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kconfig::project::{OsFileAccess, ProjectConfig};
use kconfig::server::{RpcServer, Workspace};

#[derive(Parser)]
#[command(name = "kconfig-server")]
#[command(about = "Kconfig engine speaking line-delimited JSON on stdio", long_about = None)]
struct Cli {
    /// Top-level Kconfig file
    #[arg(long)]
    root: Option<PathBuf>,

    /// Fallback directory for `source` lookups (repeatable)
    #[arg(long = "search-root")]
    search_roots: Vec<PathBuf>,

    /// Variable for `source` path expansion, as KEY=VALUE (repeatable)
    #[arg(long = "define", value_parser = parse_define)]
    defines: Vec<(String, String)>,

    /// JSON project configuration; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_define(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{text}`")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kconfig=info")),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => ProjectConfig::load(path)?,
        None => ProjectConfig::default(),
    };
    if let Some(root) = cli.root {
        config.root = Some(root);
    }
    config.search_roots.extend(cli.search_roots);
    for (key, value) in cli.defines {
        config.env.insert(key, value);
    }
    for (key, value) in std::env::vars() {
        config.env.entry(key).or_insert(value);
    }

    let workspace = Arc::new(Workspace::new(config, Arc::new(OsFileAccess)));
    let mut server = RpcServer::new(workspace);
    server.run(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}
