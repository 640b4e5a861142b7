//! A small static-file/upload server and the transparent TCP reverse proxy
//! that sits in front of it.
//!
//! The two run as separate processes (`backend` and `revproxy`) and only
//! talk over TCP.

pub mod config;
pub mod forward;
pub mod handlers;
pub mod http;
pub mod listing;
pub mod logging;
pub mod mime;
pub mod multipart;
pub mod proxy;
pub mod resolver;
pub mod router;
pub mod server;

pub use config::{ProxyConfig, ServerConfig};
pub use proxy::Proxy;
pub use server::FileServer;
