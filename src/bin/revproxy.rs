use clap::Parser;

use revproxy::{logging, Proxy, ProxyConfig};

/// Transparent TCP reverse proxy in front of a single backend.
#[derive(Debug, Parser)]
#[command(name = "revproxy", version, about)]
struct Cli {
    #[command(flatten)]
    config: ProxyConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing("revproxy=info");

    let cli = Cli::parse();
    let proxy = Proxy::bind(cli.config).await?;
    proxy.run().await;

    Ok(())
}
