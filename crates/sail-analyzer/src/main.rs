use std::path::{Path, PathBuf};

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sail_analyzer::SailLanguageServer;

const LOG_FILE_NAME: &str = "sail-analyzer.log";

#[derive(Parser, Debug)]
#[command(name = "sail-analyzer", version, about)]
struct Args {
    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,

    /// Also send info-level events to the editor as log messages.
    #[arg(long)]
    log_messages: bool,

    /// Log file path (defaults to ~/.sail-analyzer/sail-analyzer.log).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn default_log_path() -> PathBuf {
    log_dir().join(LOG_FILE_NAME)
}

fn log_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        let dir = PathBuf::from(home).join(".sail-analyzer");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    std::env::temp_dir()
}

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("sail_analyzer=debug,tower_lsp=info")
    } else {
        EnvFilter::new("sail_analyzer=info,tower_lsp=warn")
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(Path::new(".")),
        log_path
            .file_name()
            .unwrap_or(std::ffi::OsStr::new(LOG_FILE_NAME)),
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter(args.verbose));

    // stdout carries the protocol, so console logs go to stderr.
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter(args.verbose));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    info!("Starting sail-analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("Log file: {}", log_path.display());

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| SailLanguageServer::new(client, args.log_messages));

    Server::new(stdin, stdout, socket).serve(service).await;

    info!("sail-analyzer stopped");
}
