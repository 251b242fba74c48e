use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, info};

use crate::config::{Admission, Config};
use crate::http::connection::Connection;
use crate::http::request::ConnectionPolicy;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::send;
use crate::server::pool::{SubmitError, WorkerPool};

/// An accepted client connection waiting for a worker.
///
/// Whoever holds the item owns the socket; it closes when the item drops.
#[derive(Debug)]
pub struct WorkItem {
    pub stream: TcpStream,
    pub peer: SocketAddr,
}

pub struct Server {
    listener: TcpListener,
    pool: WorkerPool<WorkItem>,
    config: Arc<Config>,
}

impl Server {
    pub async fn bind(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let listener = TcpListener::bind(&config.server.listen_addr).await?;
        info!(
            addr = %listener.local_addr()?,
            root = %config.static_files.root.display(),
            workers = config.pool.workers,
            "Listening"
        );

        let conn_config = Arc::clone(&config);
        let pool = WorkerPool::new(
            config.pool.workers,
            config.pool.queue_capacity,
            move |item: WorkItem| serve(item, Arc::clone(&conn_config)),
        );

        Ok(Self {
            listener,
            pool,
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, then drains the pool.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self {
            listener,
            pool,
            config,
        } = self;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            tracing::debug!(%peer, "Accepted connection");
                            let item = WorkItem { stream, peer };
                            // A blocked submit must not hold off shutdown.
                            tokio::select! {
                                _ = admit(&pool, config.pool.admission, item) => {}
                                _ = &mut shutdown => {
                                    info!(%peer, "Shutdown requested while queue full");
                                    break;
                                }
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "Accept failed"),
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown requested, draining workers");
                    break;
                }
            }
        }

        drop(listener);
        pool.shutdown().await;
        info!("Server stopped");
        Ok(())
    }
}

async fn admit(pool: &WorkerPool<WorkItem>, admission: Admission, item: WorkItem) {
    let result = match admission {
        Admission::Block => pool.submit(item).await,
        Admission::Reject => pool.try_submit(item),
    };

    if let Err(e) = result {
        let full = matches!(e, SubmitError::Full(_));
        let mut item = e.into_inner();
        if full {
            tracing::warn!(peer = %item.peer, "Worker queue full, rejecting connection");
            let response = Response::empty(StatusCode::ServiceUnavailable, ConnectionPolicy::Close);
            if let Err(e) = send(&mut item.stream, &response).await {
                tracing::debug!(peer = %item.peer, error = %e, "Could not send 503");
            }
        } else {
            tracing::warn!(peer = %item.peer, "Pool closed, dropping connection");
        }
    }
}

/// Services one connection on a worker. The socket closes when this returns.
async fn serve(item: WorkItem, config: Arc<Config>) {
    let WorkItem { stream, peer } = item;
    let span = tracing::info_span!("conn", %peer);

    async move {
        let mut conn = Connection::new(stream, config);
        match conn.run().await {
            Ok(reason) => tracing::debug!(?reason, "Connection closed"),
            Err(e) => tracing::error!("Connection error: {:#}", e),
        }
    }
    .instrument(span)
    .await
}
