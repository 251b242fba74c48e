use anyhow::Context;
use bytes::{Buf, BytesMut};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::time::timeout;

use crate::config::Config;
use crate::http::files::PageError;
use crate::http::parser::{RequestHead, find_head_end};
use crate::http::request::{ConnectionPolicy, Method};
use crate::http::response::{Response, StatusCode};
use crate::http::router::route_to_path;
use crate::http::writer::{RespondError, respond_not_found, respond_ok, send};

/// Drives one client connection through repeated request/response cycles.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    config: Arc<Config>,
}

#[derive(Debug)]
pub enum ConnectionState {
    AwaitingRequest,
    /// A complete head of this many bytes sits at the front of the buffer.
    Parsing(usize),
    Routing {
        target: Vec<u8>,
        policy: ConnectionPolicy,
    },
    Responding(Reply),
    LoopOrClose(ConnectionPolicy),
    Closed(CloseReason),
}

/// What the current cycle answers with.
#[derive(Debug)]
pub enum Reply {
    Page {
        path: PathBuf,
        policy: ConnectionPolicy,
    },
    /// A bodiless status response.
    Status {
        status: StatusCode,
        policy: ConnectionPolicy,
    },
}

/// How a connection ended cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    PeerClosed,
    IdleTimeout,
    /// The last response carried `Connection: close`.
    PolicyClose,
}

enum ReadOutcome {
    Head(usize),
    Overflow,
    Closed(CloseReason),
}

const READ_CHUNK: usize = 1024;

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<Config>) -> Self {
        let capacity = config.server.max_head_bytes;
        Self {
            stream,
            buffer: BytesMut::with_capacity(capacity),
            state: ConnectionState::AwaitingRequest,
            config,
        }
    }

    /// Runs the connection to completion.
    ///
    /// Returns why it closed cleanly; an `Err` means an I/O failure ended it.
    pub async fn run(&mut self) -> anyhow::Result<CloseReason> {
        loop {
            let current = std::mem::replace(&mut self.state, ConnectionState::AwaitingRequest);
            self.state = match current {
                ConnectionState::AwaitingRequest => match self.read_head().await? {
                    ReadOutcome::Head(len) => ConnectionState::Parsing(len),
                    ReadOutcome::Overflow => {
                        tracing::warn!(
                            limit = self.config.server.max_head_bytes,
                            "Request head exceeds buffer"
                        );
                        ConnectionState::Responding(Reply::Status {
                            status: StatusCode::BadRequest,
                            policy: ConnectionPolicy::Close,
                        })
                    }
                    ReadOutcome::Closed(reason) => ConnectionState::Closed(reason),
                },

                ConnectionState::Parsing(len) => self.parse(len),

                ConnectionState::Routing { target, policy } => self.route(&target, policy),

                ConnectionState::Responding(reply) => {
                    let policy = self.respond(reply).await?;
                    ConnectionState::LoopOrClose(policy)
                }

                ConnectionState::LoopOrClose(policy) => {
                    if policy.is_keep_alive() {
                        ConnectionState::AwaitingRequest // same connection, next request
                    } else {
                        ConnectionState::Closed(CloseReason::PolicyClose)
                    }
                }

                ConnectionState::Closed(reason) => {
                    self.state = ConnectionState::Closed(reason);
                    return Ok(reason);
                }
            };
        }
    }

    /// Reads until the buffer holds a complete head.
    ///
    /// Bytes already buffered from a pipelined request are checked first.
    async fn read_head(&mut self) -> anyhow::Result<ReadOutcome> {
        let limit = self.config.server.max_head_bytes;
        let idle = self.config.server.idle_timeout();
        let mut temp = [0u8; READ_CHUNK];

        loop {
            if let Some(len) = find_head_end(&self.buffer) {
                return Ok(ReadOutcome::Head(len));
            }

            let room = limit.saturating_sub(self.buffer.len());
            if room == 0 {
                self.buffer.clear();
                return Ok(ReadOutcome::Overflow);
            }

            let want = room.min(temp.len());
            let n = match timeout(idle, self.stream.read(&mut temp[..want])).await {
                Err(_) => return Ok(ReadOutcome::Closed(CloseReason::IdleTimeout)),
                Ok(res) => res.context("reading request")?,
            };

            if n == 0 {
                return Ok(ReadOutcome::Closed(CloseReason::PeerClosed));
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    /// Parses and validates the head, then drops it from the buffer.
    fn parse(&mut self, head_len: usize) -> ConnectionState {
        let next = match RequestHead::parse(&self.buffer[..head_len]) {
            Err(e) => {
                tracing::warn!(error = ?e, "Could not split request head");
                ConnectionState::Responding(Reply::Status {
                    status: StatusCode::BadRequest,
                    policy: ConnectionPolicy::Close,
                })
            }
            Ok(head) => {
                let policy = head.policy();
                match head.request_line() {
                    Err(e) => {
                        tracing::debug!(error = ?e, "Invalid request line");
                        ConnectionState::Responding(Reply::Status {
                            status: StatusCode::BadRequest,
                            policy,
                        })
                    }
                    Ok(line) if line.method != Method::GET => {
                        tracing::debug!(method = line.method.as_str(), "Method not served");
                        ConnectionState::Responding(Reply::Status {
                            status: StatusCode::MethodNotAllowed,
                            policy,
                        })
                    }
                    Ok(line) => {
                        tracing::debug!(
                            method = line.method.as_str(),
                            target = %String::from_utf8_lossy(line.target),
                            ?policy,
                            "Parsed request"
                        );
                        ConnectionState::Routing {
                            target: line.target.to_vec(),
                            policy,
                        }
                    }
                }
            }
        };

        self.buffer.advance(head_len);
        next
    }

    fn route(&self, target: &[u8], policy: ConnectionPolicy) -> ConnectionState {
        match route_to_path(&self.config.static_files.root, target) {
            Ok(path) => ConnectionState::Responding(Reply::Page { path, policy }),
            Err(e) => {
                tracing::debug!(error = ?e, "Unroutable target");
                ConnectionState::Responding(Reply::Status {
                    status: StatusCode::BadRequest,
                    policy,
                })
            }
        }
    }

    /// Writes the reply and returns the policy that actually applies.
    async fn respond(&mut self, reply: Reply) -> anyhow::Result<ConnectionPolicy> {
        let files = &self.config.static_files;

        match reply {
            Reply::Status { status, policy } => {
                send(&mut self.stream, &Response::empty(status, policy)).await?;
                tracing::info!(status = status.as_u16(), "Sent status response");
                Ok(policy)
            }

            Reply::Page { path, policy } => {
                match respond_ok(&mut self.stream, &path, policy, files.max_body_bytes).await {
                    Ok(()) => {
                        tracing::info!(status = 200, path = %path.display(), "Served page");
                        Ok(policy)
                    }
                    Err(RespondError::Io(e)) => Err(e),
                    Err(RespondError::Page(PageError::TooLarge { size, limit })) => {
                        tracing::warn!(path = %path.display(), size, limit, "Page exceeds body limit");
                        let response =
                            Response::empty(StatusCode::InternalServerError, ConnectionPolicy::Close);
                        send(&mut self.stream, &response).await?;
                        Ok(ConnectionPolicy::Close)
                    }
                    Err(RespondError::Page(PageError::Unavailable(e))) => {
                        tracing::info!(status = 404, path = %path.display(), error = %e, "Page not found");
                        respond_not_found(
                            &mut self.stream,
                            &files.error_page_path(),
                            files.max_body_bytes,
                        )
                        .await?;
                        Ok(ConnectionPolicy::Close)
                    }
                }
            }
        }
    }
}
