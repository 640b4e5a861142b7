//! Single-file `multipart/form-data` extraction.
//!
//! The parser is a fixed sequence of bounded searches over the immutable
//! request buffer. Each step either yields a position or fails with its own
//! [`MultipartError`], and the returned content is a slice of the original
//! buffer rather than a copy.
//!
//! Only the first part is looked at. Content that happens to contain the
//! delimiter (`CRLF--boundary`) is cut short at that point; that is an
//! accepted limitation of delimiter scanning, not something worked around.

use bytes::Bytes;
use memchr::{memchr, memmem};

const BOUNDARY_PARAM: &[u8] = b"boundary=";
const HEADER_END: &[u8] = b"\r\n\r\n";
const CRLF: &[u8] = b"\r\n";
const DASHES: &[u8] = b"--";
const FILENAME_PARAM: &[u8] = b"filename=\"";
const CONTENT_TYPE: &[u8] = b"content-type:";

/// The file carried by the first part of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    filename: String,
    content: Bytes,
}

impl UploadedPart {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Verbatim part body; shares storage with the request buffer.
    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MultipartError {
    #[error("no boundary parameter in the request headers")]
    MissingBoundary,
    #[error("request headers are not terminated by a blank line")]
    MissingBodySeparator,
    #[error("boundary delimiter does not occur in the body")]
    BoundaryNotFound,
    #[error("multipart body contains no parts")]
    NoParts,
    #[error("first part has no header/body separator")]
    MissingPartHeaders,
    #[error("first part has no filename")]
    MissingFilename,
    #[error("filename is unterminated, empty or not UTF-8")]
    MalformedFilename,
    #[error("first part has no Content-Type header")]
    MissingContentType,
    #[error("closing boundary not found after the part body")]
    UnterminatedPart,
}

impl MultipartError {
    /// Stable token sent back to the client as the 400 body.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingBoundary => "MissingBoundary",
            Self::MissingBodySeparator => "MissingBodySeparator",
            Self::BoundaryNotFound => "BoundaryNotFound",
            Self::NoParts => "NoParts",
            Self::MissingPartHeaders => "MissingPartHeaders",
            Self::MissingFilename => "MissingFilename",
            Self::MalformedFilename => "MalformedFilename",
            Self::MissingContentType => "MissingContentType",
            Self::UnterminatedPart => "UnterminatedPart",
        }
    }
}

/// Extracts the first file part from a raw `POST` request (request line,
/// headers and body).
pub fn parse_upload(raw: &Bytes) -> Result<UploadedPart, MultipartError> {
    let header_end = memmem::find(raw, HEADER_END);

    let head = &raw[..header_end.unwrap_or(raw.len())];
    let boundary = boundary(head).ok_or(MultipartError::MissingBoundary)?;

    let body_start = header_end.ok_or(MultipartError::MissingBodySeparator)? + HEADER_END.len();
    let body = &raw[body_start..];

    let delimiter = [DASHES, boundary].concat();
    let first = memmem::find(body, &delimiter).ok_or(MultipartError::BoundaryNotFound)?;
    let part_start = first + delimiter.len();

    if body[part_start..].starts_with(DASHES) {
        return Err(MultipartError::NoParts);
    }

    let separator =
        memmem::find(&body[part_start..], HEADER_END).ok_or(MultipartError::MissingPartHeaders)?;
    let part_headers = &body[part_start..part_start + separator];
    let content_start = part_start + separator + HEADER_END.len();

    let filename = filename(part_headers)?;

    if find_ignore_ascii_case(part_headers, CONTENT_TYPE).is_none() {
        return Err(MultipartError::MissingContentType);
    }

    // The CRLF in front of a delimiter belongs to the delimiter.
    let next_delimiter = [CRLF, &delimiter[..]].concat();
    let closing = [&next_delimiter[..], DASHES].concat();

    let rest = &body[content_start..];
    if memmem::find(rest, &closing).is_none() {
        return Err(MultipartError::UnterminatedPart);
    }
    // Found at the latest where the closing marker starts.
    let content_len = memmem::find(rest, &next_delimiter).unwrap_or_default();

    let start = body_start + content_start;
    Ok(UploadedPart {
        filename,
        content: raw.slice(start..start + content_len),
    })
}

fn boundary(head: &[u8]) -> Option<&[u8]> {
    let start = memmem::find(head, BOUNDARY_PARAM)? + BOUNDARY_PARAM.len();
    let rest = &head[start..];
    let line = &rest[..memmem::find(rest, CRLF).unwrap_or(rest.len())];

    let value = match line.strip_prefix(b"\"") {
        Some(quoted) => &quoted[..memchr(b'"', quoted)?],
        None => {
            let end = line
                .iter()
                .rposition(|b| !b.is_ascii_whitespace())
                .map_or(0, |last| last + 1);
            &line[..end]
        }
    };

    (!value.is_empty()).then_some(value)
}

fn filename(part_headers: &[u8]) -> Result<String, MultipartError> {
    let start = memmem::find(part_headers, FILENAME_PARAM).ok_or(MultipartError::MissingFilename)?
        + FILENAME_PARAM.len();
    let len = memchr(b'"', &part_headers[start..]).ok_or(MultipartError::MalformedFilename)?;

    match std::str::from_utf8(&part_headers[start..start + len]) {
        Ok(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(MultipartError::MalformedFilename),
    }
}

fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
