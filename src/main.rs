use clap::Parser;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use compose_ls::server::ComposeLanguageServer;

/// Language server for Docker Compose files.
#[derive(Parser)]
#[command(name = "compose-ls", version, about)]
struct Cli {
    /// Communicate over stdio. This is the only transport; the flag is
    /// accepted for compatibility with editor clients that pass it.
    #[arg(long)]
    #[allow(dead_code)]
    stdio: bool,
}

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    let stdin = stdin();
    let stdout = stdout();
    let (service, socket) = LspService::new(ComposeLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
