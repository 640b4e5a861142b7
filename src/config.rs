//! Runtime configuration for both processes.
//!
//! Every field doubles as a command-line flag through `clap`, and the
//! defaults match the addresses the two services have always used: the file
//! server on port 8000 serving `./www`, and the proxy on port 4950 relaying
//! to `127.0.0.1:8000`.

use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    path::PathBuf,
};

use clap::Args;

pub const DEFAULT_SERVER_PORT: u16 = 8000;
pub const DEFAULT_PROXY_PORT: u16 = 4950;
pub const DEFAULT_ROOT_DIR: &str = "./www";
pub const DEFAULT_BUFFER_SIZE: usize = 4096;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;
pub const DEFAULT_LISTING_PATH: &str = "/list";
pub const DEFAULT_UPLOAD_PATH: &str = "/upload";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("buffer size must be greater than zero")]
    ZeroBufferSize,
    #[error("max request size ({max}) must be at least the buffer size ({buffer})")]
    RequestLimitBelowBuffer { max: usize, buffer: usize },
    #[error("reserved path `{0}` must start with '/'")]
    RelativeReservedPath(String),
    #[error("listing and upload paths must differ (both `{0}`)")]
    ReservedPathClash(String),
}

/// Settings for the static-file/upload server.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value_t = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_SERVER_PORT)))]
    pub listen: SocketAddr,

    /// Directory served and written to
    #[arg(long, default_value = DEFAULT_ROOT_DIR)]
    pub root: PathBuf,

    /// Size of each socket read, also the cap on a directory listing
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Bytes read for a single request before it is truncated
    #[arg(long, default_value_t = DEFAULT_MAX_REQUEST_BYTES)]
    pub max_request_bytes: usize,

    /// Path that returns the root directory listing
    #[arg(long, default_value = DEFAULT_LISTING_PATH)]
    pub listing_path: String,

    /// Path that accepts multipart/form-data uploads
    #[arg(long, default_value = DEFAULT_UPLOAD_PATH)]
    pub upload_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_SERVER_PORT)),
            root: PathBuf::from(DEFAULT_ROOT_DIR),
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            listing_path: DEFAULT_LISTING_PATH.to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        if self.max_request_bytes < self.buffer_size {
            return Err(ConfigError::RequestLimitBelowBuffer {
                max: self.max_request_bytes,
                buffer: self.buffer_size,
            });
        }
        for path in [&self.listing_path, &self.upload_path] {
            if !path.starts_with('/') {
                return Err(ConfigError::RelativeReservedPath(path.clone()));
            }
        }
        if self.listing_path == self.upload_path {
            return Err(ConfigError::ReservedPathClash(self.listing_path.clone()));
        }
        Ok(())
    }
}

/// Settings for the TCP reverse proxy.
#[derive(Debug, Clone, Args)]
pub struct ProxyConfig {
    /// Address to listen on
    #[arg(long, default_value_t = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PROXY_PORT)))]
    pub listen: SocketAddr,

    /// The single backend every client is relayed to
    #[arg(long, default_value_t = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_SERVER_PORT)))]
    pub backend: SocketAddr,

    /// Size of the relay buffer for each direction
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PROXY_PORT)),
            backend: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_SERVER_PORT)),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ProxyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        Ok(())
    }
}
