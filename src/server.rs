//! Accept loop of the file server.

use std::{io, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::{config::ServerConfig, handlers};

#[derive(Debug)]
pub struct FileServer {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl FileServer {
    /// Validates `config` and binds its listen address. Either failing is
    /// fatal to the process.
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid server configuration")?;

        let listener = TcpListener::bind(config.listen)
            .await
            .with_context(|| format!("failed to bind {}", config.listen))?;

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves forever, one task per connection. Failures on a single
    /// connection are logged and never stop the loop.
    pub async fn run(self) {
        if let Ok(addr) = self.local_addr() {
            tracing::info!(%addr, root = %self.config.root.display(), "backend server listening");
        }

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!(%err, "failed to accept connection");
                    continue;
                }
            };

            tracing::debug!(%peer, "request");

            let config = Arc::clone(&self.config);
            tokio::spawn(
                async move {
                    if let Err(err) = handlers::handle_connection(stream, &config).await {
                        tracing::warn!(%err, "connection abandoned");
                    }
                }
                .instrument(tracing::info_span!("connection", %peer)),
            );
        }
    }
}
