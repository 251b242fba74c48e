use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::files::{PageError, read_page};
use crate::http::request::ConnectionPolicy;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Body sent when the error page itself cannot be served.
pub const FALLBACK_NOT_FOUND: &[u8] = b"<h1>404 page not found</h1>";

pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf
}

/// Writes every byte of `buf`, looping over short writes.
///
/// A short write is not an error; a write error or a zero-length write
/// (peer gone) is.
pub async fn write_all<W>(stream: &mut W, buf: &[u8]) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while written < buf.len() {
        let n = stream.write(&buf[written..]).await?;

        if n == 0 {
            return Err(anyhow::anyhow!("connection closed while writing"));
        }

        written += n;
    }

    Ok(())
}

/// Sends one response as two complete writes: head, then body.
pub struct ResponseWriter<'r> {
    head: Vec<u8>,
    body: &'r [u8],
}

impl<'r> ResponseWriter<'r> {
    pub fn new(response: &'r Response) -> Self {
        Self {
            head: serialize_head(response),
            body: &response.body,
        }
    }

    pub async fn write_to_stream<W>(&self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        write_all(stream, &self.head).await?;
        if !self.body.is_empty() {
            write_all(stream, self.body).await?;
        }
        stream.flush().await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum RespondError {
    /// The page could not be produced; nothing was written.
    Page(PageError),
    /// Writing to the client failed; the connection is unusable.
    Io(anyhow::Error),
}

pub async fn send<W>(stream: &mut W, response: &Response) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    ResponseWriter::new(response).write_to_stream(stream).await
}

/// Sends `path` as a 200 page with the given connection policy.
pub async fn respond_ok<W>(
    stream: &mut W,
    path: &Path,
    policy: ConnectionPolicy,
    max_body: usize,
) -> Result<(), RespondError>
where
    W: AsyncWrite + Unpin,
{
    let body = read_page(path, max_body).await.map_err(RespondError::Page)?;
    let response = Response::page(body, policy);
    send(stream, &response).await.map_err(RespondError::Io)
}

/// Sends a 404 from `error_page`, or the fixed fallback body when that page
/// cannot be read. Always `Connection: close`.
pub async fn respond_not_found<W>(
    stream: &mut W,
    error_page: &Path,
    max_body: usize,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = match read_page(error_page, max_body).await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(page = %error_page.display(), error = ?e, "Error page unavailable, using fallback");
            FALLBACK_NOT_FOUND.to_vec()
        }
    };
    send(stream, &Response::not_found(body)).await
}
