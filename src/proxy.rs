//! Accept loop of the reverse proxy. Each client gets its own backend
//! connection and a [`forward`] relay between the two.

use std::{io, net::SocketAddr};

use anyhow::Context;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
};
use tracing::Instrument;

use crate::{config::ProxyConfig, forward::forward};

#[derive(Debug)]
pub struct Proxy {
    listener: TcpListener,
    config: ProxyConfig,
}

impl Proxy {
    pub async fn bind(config: ProxyConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid proxy configuration")?;

        let listener = TcpListener::bind(config.listen)
            .await
            .with_context(|| format!("failed to bind {}", config.listen))?;

        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) {
        if let Ok(addr) = self.local_addr() {
            tracing::info!(%addr, backend = %self.config.backend, "reverse proxy listening");
        }

        loop {
            let (client, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!(%err, "failed to accept connection");
                    continue;
                }
            };

            tracing::debug!(%peer, "new connection");

            let backend = self.config.backend;
            let buffer_size = self.config.buffer_size;
            tokio::spawn(
                relay_client(client, backend, buffer_size)
                    .instrument(tracing::info_span!("proxy", %peer)),
            );
        }
    }
}

async fn relay_client(mut client: TcpStream, backend_addr: SocketAddr, buffer_size: usize) {
    let mut backend = match TcpStream::connect(backend_addr).await {
        Ok(backend) => backend,
        Err(err) => {
            tracing::warn!(%err, backend = %backend_addr, "backend connection failed");
            return;
        }
    };

    match forward(&mut client, &mut backend, buffer_size).await {
        Ok(outcome) => tracing::debug!(
            closed_by = %outcome.closed_by,
            up = outcome.client_to_backend,
            down = outcome.backend_to_client,
            "relay finished"
        ),
        Err(err) => tracing::warn!(%err, "relay aborted"),
    }

    // Either side may already be gone.
    let _ = backend.shutdown().await;
    let _ = client.shutdown().await;
}
