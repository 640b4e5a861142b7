use std::default::Default;

use super::{Response, StatusCode};

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

#[derive(Clone, Debug, Default)]
pub struct MissingStatusCode;

#[derive(Clone, Debug)]
pub struct ResponseBuilder<S> {
    status_code: S,
    content_type: Option<String>,
    body: Option<Vec<u8>>,
    streamed_length: Option<u64>,
}

impl ResponseBuilder<MissingStatusCode> {
    pub fn new() -> Self {
        ResponseBuilder {
            status_code: MissingStatusCode,
            content_type: None,
            body: None,
            streamed_length: None,
        }
    }

    pub fn status_code(self, status_code: StatusCode) -> ResponseBuilder<StatusCode> {
        ResponseBuilder {
            status_code,
            content_type: self.content_type,
            body: self.body,
            streamed_length: self.streamed_length,
        }
    }

    pub fn ok() -> ResponseBuilder<StatusCode> {
        Self::new().status_code(StatusCode::Ok)
    }

    pub fn bad_request() -> ResponseBuilder<StatusCode> {
        Self::new().status_code(StatusCode::BadRequest)
    }

    pub fn forbidden() -> ResponseBuilder<StatusCode> {
        Self::new().status_code(StatusCode::Forbidden)
    }

    pub fn not_found() -> ResponseBuilder<StatusCode> {
        Self::new().status_code(StatusCode::NotFound)
    }

    pub fn internal_server_error() -> ResponseBuilder<StatusCode> {
        Self::new().status_code(StatusCode::InternalServerError)
    }
}

impl Default for ResponseBuilder<MissingStatusCode> {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder<StatusCode> {
    pub fn build(self) -> Response {
        let content_length = match (self.streamed_length, &self.body) {
            (Some(length), _) => length,
            (None, Some(body)) => body.len() as u64,
            (None, None) => 0,
        };

        let content_type = self
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Response {
            status_code: self.status_code,
            headers: vec![
                ("Content-Type".to_string(), content_type),
                ("Content-Length".to_string(), content_length.to_string()),
            ],
            body: self.body,
        }
    }
}

impl<S> ResponseBuilder<S> {
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self.streamed_length = None;
        self
    }

    /// Announces a body of `length` bytes that the caller writes to the
    /// stream itself after the head.
    pub fn streamed_body(mut self, length: u64) -> Self {
        self.body = None;
        self.streamed_length = Some(length);
        self
    }
}
