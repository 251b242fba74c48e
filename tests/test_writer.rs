use pageserve::http::files::PageError;
use pageserve::http::request::ConnectionPolicy;
use pageserve::http::writer::{
    FALLBACK_NOT_FOUND, RespondError, respond_not_found, respond_ok, write_all,
};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

/// Accepts at most `chunk` bytes per write call.
struct Trickle {
    out: Vec<u8>,
    chunk: usize,
    writes: usize,
}

impl AsyncWrite for Trickle {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let n = buf.len().min(self.chunk);
        self.out.extend_from_slice(&buf[..n]);
        self.writes += 1;
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Fails every write.
struct Broken;

impl AsyncWrite for Broken {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let end = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    (String::from_utf8(raw[..end].to_vec()).unwrap(), raw[end..].to_vec())
}

#[tokio::test]
async fn test_write_all_survives_short_writes() {
    let mut sink = Trickle { out: Vec::new(), chunk: 3, writes: 0 };
    write_all(&mut sink, b"0123456789").await.unwrap();

    assert_eq!(sink.out, b"0123456789");
    assert_eq!(sink.writes, 4);
}

#[tokio::test]
async fn test_write_all_reports_errors() {
    assert!(write_all(&mut Broken, b"data").await.is_err());
}

#[tokio::test]
async fn test_respond_ok_sends_exact_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, "<h1>hello</h1>\n").unwrap();

    let mut sink = Trickle { out: Vec::new(), chunk: 7, writes: 0 };
    respond_ok(&mut sink, &path, ConnectionPolicy::KeepAlive, 64 * 1024)
        .await
        .unwrap();

    let (head, body) = split_response(&sink.out);
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/html; charset=utf-8\r\n"));
    assert!(head.contains("Content-Length: 15\r\n"));
    assert!(head.contains("Connection: keep-alive\r\n"));
    assert_eq!(body, b"<h1>hello</h1>\n");
}

#[tokio::test]
async fn test_respond_ok_missing_file_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = Trickle { out: Vec::new(), chunk: 64, writes: 0 };

    let result = respond_ok(
        &mut sink,
        &dir.path().join("missing/index.html"),
        ConnectionPolicy::KeepAlive,
        1024,
    )
    .await;

    assert!(matches!(result, Err(RespondError::Page(PageError::Unavailable(_)))));
    assert!(sink.out.is_empty());
}

#[tokio::test]
async fn test_respond_ok_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, vec![b'a'; 2048]).unwrap();

    let mut sink = Trickle { out: Vec::new(), chunk: 64, writes: 0 };
    let result = respond_ok(&mut sink, &path, ConnectionPolicy::Close, 1024).await;

    assert!(matches!(
        result,
        Err(RespondError::Page(PageError::TooLarge { size: 2048, limit: 1024 }))
    ));
    assert!(sink.out.is_empty());
}

#[tokio::test]
async fn test_respond_ok_write_failure_is_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, "x").unwrap();

    let result = respond_ok(&mut Broken, &path, ConnectionPolicy::Close, 1024).await;
    assert!(matches!(result, Err(RespondError::Io(_))));
}

#[tokio::test]
async fn test_not_found_uses_error_page() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("error.html");
    std::fs::write(&page, "<p>custom 404</p>").unwrap();

    let mut sink = Trickle { out: Vec::new(), chunk: 5, writes: 0 };
    respond_not_found(&mut sink, &page, 1024).await.unwrap();

    let (head, body) = split_response(&sink.out);
    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(head.contains("Content-Length: 17\r\n"));
    assert!(head.contains("Connection: close\r\n"));
    assert_eq!(body, b"<p>custom 404</p>");
}

#[tokio::test]
async fn test_not_found_falls_back_without_error_page() {
    let dir = tempfile::tempdir().unwrap();

    let mut sink = Trickle { out: Vec::new(), chunk: 64, writes: 0 };
    respond_not_found(&mut sink, &dir.path().join("error.html"), 1024)
        .await
        .unwrap();

    let (head, body) = split_response(&sink.out);
    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(head.contains(&format!("Content-Length: {}\r\n", FALLBACK_NOT_FOUND.len())));
    assert_eq!(body, b"<h1>404 page not found</h1>");
}
