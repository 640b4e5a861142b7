use bytes::Bytes;
use memchr::memchr;
use nom::{
    bytes::complete::take_till1,
    character::complete::space1,
    sequence::separated_pair,
    IResult,
};

use super::{method::Method, ParseRequestError};

/// One request as read off a connection: the two request-line tokens and the
/// untouched bytes they were read from.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    raw: Bytes,
}

impl Request {
    pub fn method(&self) -> Method {
        self.method
    }

    /// The path token exactly as the client sent it, not percent-decoded.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Every byte received for this request, request line included.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }
}

impl TryFrom<Bytes> for Request {
    type Error = ParseRequestError;

    fn try_from(raw: Bytes) -> Result<Self, Self::Error> {
        if raw.is_empty() {
            return Err(ParseRequestError::Empty);
        }

        let line_end = memchr(b'\n', &raw).unwrap_or(raw.len());
        let first_line = std::str::from_utf8(&raw[..line_end])?.trim_end_matches('\r');

        let (_, (method, path)) =
            request_line(first_line).map_err(|_| ParseRequestError::Request)?;

        let method = method.parse::<Method>()?;
        let path = path.to_string();

        Ok(Self { method, path, raw })
    }
}

impl TryFrom<&str> for Request {
    type Error = ParseRequestError;

    fn try_from(request_str: &str) -> Result<Self, Self::Error> {
        Self::try_from(Bytes::copy_from_slice(request_str.as_bytes()))
    }
}

/// `METHOD SP PATH`; whatever follows the path (usually the version) is ignored.
fn request_line(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(token, space1, token)(input)
}

fn token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_ascii_whitespace())(input)
}
