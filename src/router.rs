//! Classifies one raw request into the single thing the server will do
//! about it.

use std::path::PathBuf;

use bytes::Bytes;

use crate::{
    config::ServerConfig,
    http::{Method, ParseRequestError, Request},
    multipart::{self, MultipartError, UploadedPart},
    resolver::{self, Rejection, ResolvedPath},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ServeFile(ResolvedPath),
    ListDirectory,
    SaveUpload {
        part: UploadedPart,
        destination: PathBuf,
    },
    Reject(Reason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    BadRequest,
    Multipart(MultipartError),
    Forbidden,
    NotFound,
}

/// First match wins: unparsable request line, listing path, upload, then
/// everything else as a file under the root.
pub async fn route(raw: Bytes, config: &ServerConfig) -> Action {
    let request = match Request::try_from(raw) {
        Ok(request) => request,
        Err(err) => {
            log_bad_request(&err);
            return Action::Reject(Reason::BadRequest);
        }
    };

    tracing::debug!(method = %request.method(), path = request.path(), "routing request");

    if request.path() == config.listing_path {
        return Action::ListDirectory;
    }

    if request.method() == Method::Post && request.path() == config.upload_path {
        return route_upload(&request, config).await;
    }

    match resolver::resolve(&config.root, request.path()).await {
        Ok(resolved) => Action::ServeFile(resolved),
        Err(Rejection::Empty) => Action::Reject(Reason::NotFound),
        Err(rejection) => {
            tracing::info!(path = request.path(), %rejection, "access denied");
            Action::Reject(Reason::Forbidden)
        }
    }
}

async fn route_upload(request: &Request, config: &ServerConfig) -> Action {
    let part = match multipart::parse_upload(request.raw()) {
        Ok(part) => part,
        Err(err) => {
            tracing::debug!(reason = err.reason(), "rejecting upload: {err}");
            return Action::Reject(Reason::Multipart(err));
        }
    };

    match resolver::upload_target(&config.root, part.filename()).await {
        Ok(destination) => Action::SaveUpload { part, destination },
        Err(rejection) => {
            tracing::info!(filename = part.filename(), %rejection, "upload denied");
            Action::Reject(Reason::Forbidden)
        }
    }
}

fn log_bad_request(err: &ParseRequestError) {
    tracing::debug!(kind = err.message(), "{err}");
}
