use std::io;

use bytes::{Bytes, BytesMut};
use memchr::memmem;
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
};

use crate::{
    config::ServerConfig,
    http::{Response, ResponseBuilder},
    listing::DirectoryListing,
    mime,
    multipart::UploadedPart,
    resolver::ResolvedPath,
    router::{self, Action, Reason},
};

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Reads one request from `stream`, answers it and closes the write side.
pub async fn handle_connection<S>(mut stream: S, config: &ServerConfig) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let raw = read_request(&mut stream, config.buffer_size, config.max_request_bytes).await?;

    let action = router::route(raw, config).await;

    match action {
        Action::ServeFile(path) => serve_file(&mut stream, &path).await?,
        Action::ListDirectory => {
            let response = list_directory_response(config).await;
            stream.write_all(&response.to_bytes_vec()).await?;
        }
        Action::SaveUpload { part, destination } => {
            let response = save_upload_response(&part, &destination).await;
            stream.write_all(&response.to_bytes_vec()).await?;
        }
        Action::Reject(reason) => {
            stream
                .write_all(&reject_response(reason).to_bytes_vec())
                .await?
        }
    }

    stream.flush().await?;
    stream.shutdown().await
}

/// Accumulates the request in `buffer_size` reads until the headers are
/// complete and, when a `Content-Length` is announced, the whole body has
/// arrived. Stops early at EOF; anything past `max_request_bytes` is never
/// read.
pub async fn read_request<R>(
    reader: &mut R,
    buffer_size: usize,
    max_request_bytes: usize,
) -> io::Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    let mut request = BytesMut::with_capacity(buffer_size);
    let mut chunk = vec![0u8; buffer_size];

    loop {
        let remaining = max_request_bytes.saturating_sub(request.len());
        if remaining == 0 {
            tracing::warn!(max_request_bytes, "request truncated");
            break;
        }

        let limit = chunk.len().min(remaining);
        let n = reader.read(&mut chunk[..limit]).await?;
        if n == 0 {
            break;
        }

        request.extend_from_slice(&chunk[..n]);

        if is_complete(&request) {
            break;
        }
    }

    Ok(request.freeze())
}

fn is_complete(request: &[u8]) -> bool {
    let Some(header_end) = memmem::find(request, HEADER_END) else {
        return false;
    };

    let received = request.len() - header_end - HEADER_END.len();
    match content_length(&request[..header_end]) {
        Some(expected) => received >= expected,
        None => true,
    }
}

fn content_length(head: &[u8]) -> Option<usize> {
    head.split(|&b| b == b'\n').find_map(|line| {
        let line = std::str::from_utf8(line).ok()?;
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-length")
            .then(|| value.trim().parse().ok())
            .flatten()
    })
}

async fn serve_file<W>(stream: &mut W, path: &ResolvedPath) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let opened = match File::open(path).await {
        Ok(file) => match file.metadata().await {
            Ok(metadata) if metadata.is_file() => Some((file, metadata.len())),
            _ => None,
        },
        Err(_) => None,
    };

    let Some((file, length)) = opened else {
        let response = reject_response(Reason::NotFound);
        return stream.write_all(&response.to_bytes_vec()).await;
    };

    let head = ResponseBuilder::ok()
        .content_type(mime::content_type_for(path.as_path()))
        .streamed_body(length)
        .build();
    stream.write_all(&head.head_bytes()).await?;

    let sent = tokio::io::copy(&mut file.take(length), stream).await?;
    if sent < length {
        tracing::warn!(sent, length, "file shrank while being served");
    }

    Ok(())
}

async fn list_directory_response(config: &ServerConfig) -> Response {
    match DirectoryListing::read(&config.root, config.buffer_size).await {
        Ok(listing) => ResponseBuilder::ok()
            .content_type("text/plain")
            .body(listing.into_bytes())
            .build(),
        Err(err) => {
            tracing::warn!(%err, "could not list root directory");
            ResponseBuilder::internal_server_error()
                .body("Could not list directory")
                .build()
        }
    }
}

async fn save_upload_response(part: &UploadedPart, destination: &std::path::Path) -> Response {
    let mut file = match OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(destination)
        .await
    {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(%err, filename = part.filename(), "could not open upload destination");
            return ResponseBuilder::internal_server_error()
                .body("Could not save file")
                .build();
        }
    };

    if let Err(err) = file.write_all(part.content()).await {
        tracing::warn!(%err, filename = part.filename(), "could not write upload");
        return ResponseBuilder::internal_server_error()
            .body("Could not save file")
            .build();
    }

    tracing::info!(
        filename = part.filename(),
        bytes = part.content().len(),
        "upload saved"
    );

    ResponseBuilder::ok().body("File uploaded").build()
}

fn reject_response(reason: Reason) -> Response {
    match reason {
        Reason::BadRequest => ResponseBuilder::bad_request().body("Invalid request"),
        Reason::Multipart(err) => ResponseBuilder::bad_request().body(err.reason()),
        Reason::Forbidden => ResponseBuilder::forbidden().body("Access denied"),
        Reason::NotFound => ResponseBuilder::not_found().body("File not found"),
    }
    .build()
}
