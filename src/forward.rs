//! Full-duplex relay between two connected streams.

use std::{
    fmt::{self, Display, Formatter},
    io,
};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Client,
    Backend,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Backend => write!(f, "backend"),
        }
    }
}

/// How a relay ended when neither side failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardOutcome {
    /// The side whose read returned end-of-stream.
    pub closed_by: Side,
    pub client_to_backend: u64,
    pub backend_to_client: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("reading from {side} failed: {source}")]
    Read {
        side: Side,
        #[source]
        source: io::Error,
    },
    #[error("writing to {side} failed: {source}")]
    Write {
        side: Side,
        #[source]
        source: io::Error,
    },
}

/// Relays bytes both ways until either side reaches end-of-stream or any read
/// or write fails.
///
/// Each direction has its own `buffer_size` buffer and every chunk is
/// written out completely before that direction is read again, so bytes keep
/// their order within a direction. No timeout is applied: a silent peer
/// keeps the relay waiting. Closing both streams is left to the caller.
pub async fn forward<C, B>(
    client: &mut C,
    backend: &mut B,
    buffer_size: usize,
) -> Result<ForwardOutcome, ForwardError>
where
    C: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let mut client_buf = vec![0u8; buffer_size];
    let mut backend_buf = vec![0u8; buffer_size];
    let mut client_to_backend = 0u64;
    let mut backend_to_client = 0u64;

    let outcome = |closed_by: Side, client_to_backend: u64, backend_to_client: u64| ForwardOutcome {
        closed_by,
        client_to_backend,
        backend_to_client,
    };

    loop {
        tokio::select! {
            res = client.read(&mut client_buf) => {
                let n = res.map_err(|source| ForwardError::Read { side: Side::Client, source })?;
                if n == 0 {
                    return Ok(outcome(Side::Client, client_to_backend, backend_to_client));
                }
                backend
                    .write_all(&client_buf[..n])
                    .await
                    .map_err(|source| ForwardError::Write { side: Side::Backend, source })?;
                client_to_backend += n as u64;
            }
            res = backend.read(&mut backend_buf) => {
                let n = res.map_err(|source| ForwardError::Read { side: Side::Backend, source })?;
                if n == 0 {
                    return Ok(outcome(Side::Backend, client_to_backend, backend_to_client));
                }
                client
                    .write_all(&backend_buf[..n])
                    .await
                    .map_err(|source| ForwardError::Write { side: Side::Client, source })?;
                backend_to_client += n as u64;
            }
        }
    }
}
