//! pageserve - static page server
//!
//! Serves `index.html` pages from a document root over HTTP/1.1 keep-alive
//! connections, using a fixed pool of workers.

pub mod config;
pub mod http;
pub mod server;
