use clap::Parser;

use revproxy::{logging, FileServer, ServerConfig};

/// Static file and upload server.
#[derive(Debug, Parser)]
#[command(name = "backend", version, about)]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing("revproxy=info");

    let cli = Cli::parse();
    let server = FileServer::bind(cli.config).await?;
    server.run().await;

    Ok(())
}
