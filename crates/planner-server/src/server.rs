//! HTTP/1.1 listener.
//!
//! Accepts connections until the [`ShutdownSignal`] fires, then asks every
//! open connection to finish its current request and waits up to the
//! configured shutdown timeout for them to close.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use planner_config::PlannerConfig;
use tokio::net::{TcpListener, TcpStream};

use crate::app::App;
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// The meeting planner HTTP server.
///
/// # Example
///
/// ```rust,no_run
/// use planner_config::PlannerConfig;
/// use planner_server::{App, Server};
///
/// # async fn run() -> Result<(), planner_server::ServerError> {
/// let config = PlannerConfig::default();
/// let server = Server::new(&config, App::new(&config))?;
/// server.run().await
/// # }
/// ```
#[derive(Debug)]
pub struct Server {
    app: Arc<App>,
    addr: SocketAddr,
    shutdown_timeout: Duration,
}

impl Server {
    /// Creates a server for `app` listening on the configured address.
    pub fn new(config: &PlannerConfig, app: App) -> Result<Self, ServerError> {
        Ok(Self {
            app: Arc::new(app),
            addr: config.socket_addr()?,
            shutdown_timeout: Duration::from_secs(config.server.shutdown_timeout_secs),
        })
    }

    /// The address [`run`](Self::run) binds to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind {}: {e}", self.addr)))?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local = listener.local_addr()?;
        tracing::info!(addr = %local, "listening");

        let tracker = ConnectionTracker::new();
        let stopped = shutdown.recv();
        tokio::pin!(stopped);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let guard = tracker.track();
                        let app = Arc::clone(&self.app);
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            serve_connection(app, stream, remote, shutdown).await;
                            drop(guard);
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to accept connection"),
                },
                () = &mut stopped => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }
        drop(listener);

        let open = tracker.active();
        if open > 0 {
            tracing::info!(connections = open, timeout = ?self.shutdown_timeout, "draining connections");
        }
        if tokio::time::timeout(self.shutdown_timeout, tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                connections = tracker.active(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn serve_connection(
    app: Arc<App>,
    stream: TcpStream,
    remote: SocketAddr,
    shutdown: ShutdownSignal,
) {
    let service = service_fn(move |request: Request<Incoming>| {
        let app = Arc::clone(&app);
        async move { Ok::<_, Infallible>(app.handle(request).await) }
    });

    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        () = shutdown.recv() => {
            tracing::debug!(%remote, "closing connection for shutdown");
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };

    if let Err(e) = result {
        tracing::debug!(%remote, error = %e, "connection error");
    }
}
