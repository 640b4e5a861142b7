use super::status_code::StatusCode;

/// A complete response: status line, `Content-Type`, `Content-Length`, blank
/// line and an optional in-memory body.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Response {
    pub status_code: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Response {
    /// Status line and headers, terminated by the blank line.
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut head = format!("{}\r\n", self.status_code).into_bytes();

        for (k, v) in &self.headers {
            head.extend_from_slice(k.as_bytes());
            head.extend_from_slice(b": ");
            head.extend_from_slice(v.as_bytes());
            head.extend_from_slice(b"\r\n");
        }

        // Add additional CLRF after all headers
        head.extend_from_slice(b"\r\n");
        head
    }

    pub fn to_bytes_vec(&self) -> Vec<u8> {
        let mut response = self.head_bytes();

        if let Some(body) = &self.body {
            response.extend_from_slice(body);
        }

        response
    }
}
