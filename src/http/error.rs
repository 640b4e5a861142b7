use std::str::Utf8Error;

use super::method::MethodError;

/// Why a request line could not be turned into a [`Request`](super::Request).
#[derive(Debug, thiserror::Error)]
pub enum ParseRequestError {
    #[error("Request parsing error: Invalid Request Encoding")]
    Encoding(#[from] Utf8Error),
    #[error("Request parsing error: Invalid Request Method ({0})")]
    Method(#[from] MethodError),
    #[error("Request parsing error: Invalid Request")]
    Request,
    #[error("Request parsing error: Empty Request")]
    Empty,
}

impl ParseRequestError {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Request => "Invalid Request",
            Self::Encoding(_) => "Invalid Request Encoding",
            Self::Method(_) => "Invalid Request Method",
            Self::Empty => "Empty Request",
        }
    }
}
