//! HTTP server and graceful shutdown.
//!
//! # Lifecycle
//!
//! ```text
//! Starting ──bind ok──▶ Serving ──signal──▶ Draining ──drained──▶ Stopped
//!     │                                        │
//!     └─ bind error: Error::Bind               └─ bound exceeded: Error::ShutdownTimeout
//! ```
//!
//! On a shutdown signal (SIGTERM or Ctrl-C unless
//! [`ServerConfig::shutdown_signals`] says otherwise) the server, in this order:
//! 1. Marks the app unhealthy, so `/healthz` answers `503` at once.
//! 2. Stops accepting and closes the listener; new connections are refused.
//! 3. Disables keep-alive on every open connection: each finishes the request
//!    it is serving, then closes.
//! 4. Waits for those connections, at most `shutdown_timeout` (30 s).

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::app::App;
use crate::config::ServerConfig;
use crate::error::Error;
use crate::response::Response;
use crate::signal;

/// A bound HTTP server.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    /// Binds the listener. The socket accepts nothing until
    /// [`serve`](Server::serve) runs.
    pub async fn bind(config: ServerConfig) -> Result<Self, Error> {
        let listener = TcpListener::bind(config.addr)
            .await
            .map_err(|source| Error::Bind { addr: config.addr, source })?;
        Ok(Self { listener, config })
    }

    /// The address actually bound; useful when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves `app` until one of the configured shutdown signals arrives,
    /// then drains.
    pub async fn serve(self, app: App) -> Result<(), Error> {
        let received = signal::listen(&self.config.shutdown_signals).map_err(Error::Signal)?;
        self.serve_with_shutdown(app, async move {
            let received = received.await;
            info!(signal = %received, "shutdown signal received");
        })
        .await
    }

    /// Serves `app` until `signal` resolves, then drains.
    ///
    /// Returns `Ok(())` once every connection has finished, or
    /// [`Error::ShutdownTimeout`] if the drain overran its bound.
    pub async fn serve_with_shutdown(
        self,
        app: App,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let Self { listener, config } = self;
        let app = Arc::new(app);

        let mut builder = ConnBuilder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(config.read_timeout);

        // Tracks every connection so the drain can tell them to wind down
        // and wait for them.
        let graceful = GracefulShutdown::new();

        tokio::pin!(signal);

        app.liveness().mark_serving();
        info!(addr = %listener.local_addr().unwrap_or(config.addr), "server is ready to handle requests");

        loop {
            tokio::select! {
                // Check the signal first so a shutdown stops accepting even
                // if more connections are queued.
                biased;

                () = &mut signal => break,

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let write_timeout = config.write_timeout;

                    // Called once per request on the connection.
                    let svc = service_fn(move |req: hyper::Request<Incoming>| {
                        let response = app.handle(req, remote_addr);
                        async move {
                            tokio::time::timeout(write_timeout, response)
                                .await
                                .map(Response::into_inner)
                                .map_err(|_| Error::WriteTimeout(write_timeout))
                        }
                    });

                    let conn = builder.serve_connection(TokioIo::new(stream), svc).into_owned();
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            debug!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }
            }
        }

        app.liveness().mark_draining();
        info!("server is shutting down");
        drop(listener);

        tokio::time::timeout(config.shutdown_timeout, graceful.shutdown())
            .await
            .map_err(|_| Error::ShutdownTimeout(config.shutdown_timeout))?;

        info!("server stopped");
        Ok(())
    }
}
