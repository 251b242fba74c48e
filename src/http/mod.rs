//! HTTP protocol implementation.
//!
//! This module implements a small HTTP/1.1 server for static pages with
//! support for keep-alive connections.
//!
//! # Architecture
//!
//! - **`span`**: Borrowed byte views and delimiter splitting
//! - **`parser`**: Locates and splits request heads
//! - **`request`**: Request-line validation, header lookup, connection policy
//! - **`router`**: Maps request targets to files under the document root
//! - **`files`**: Loads pages into bounded memory
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes responses and writes them completely
//! - **`connection`**: The per-connection request/response state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │ AwaitingRequest  │ ← Read until \r\n\r\n (idle timeout → Closed)
//!        └──────┬───────────┘
//!               │ Head received
//!               ▼
//!        ┌──────────────────┐
//!        │     Parsing      │ ← 400 / 405 skip straight to Responding
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │     Routing      │ ← target → <root><target>/index.html
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← 200, or 404 (forces close)
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │   LoopOrClose    │
//!        └──────┬───────────┘
//!               ├─ Keep-Alive → AwaitingRequest (same connection)
//!               └─ Close → Closed
//! ```

pub mod connection;
pub mod files;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod span;
pub mod writer;
