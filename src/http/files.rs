//! Reading pages from the document root into memory.

use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

#[derive(Debug)]
pub enum PageError {
    /// Open, stat, or read failed. Callers answer with the 404 path.
    Unavailable(io::Error),
    /// The page is bigger than the in-memory body limit.
    TooLarge { size: u64, limit: usize },
}

impl From<io::Error> for PageError {
    fn from(e: io::Error) -> Self {
        PageError::Unavailable(e)
    }
}

/// Reads the whole file at `path`, refusing anything over `limit` bytes.
pub async fn read_page(path: &Path, limit: usize) -> Result<Vec<u8>, PageError> {
    let file = File::open(path).await?;
    let meta = file.metadata().await?;
    if meta.is_dir() {
        return Err(PageError::Unavailable(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path is a directory",
        )));
    }
    if meta.len() > limit as u64 {
        return Err(PageError::TooLarge {
            size: meta.len(),
            limit,
        });
    }

    // The file may grow between stat and read; never buffer past the limit.
    let mut body = Vec::with_capacity(meta.len() as usize);
    let read = file
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut body)
        .await?;
    if read > limit {
        return Err(PageError::TooLarge {
            size: read as u64,
            limit,
        });
    }

    Ok(body)
}
