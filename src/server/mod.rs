//! Accept loop and worker pool.
//!
//! The listener accepts sockets and queues them as [`listener::WorkItem`]s;
//! a fixed [`pool::WorkerPool`] takes each one and runs its
//! [`Connection`](crate::http::connection::Connection) until it closes.

pub mod listener;
pub mod pool;

pub use listener::{Server, WorkItem};
pub use pool::{SubmitError, WorkerPool};
