//! The assembled application: routes plus the fixed middleware chain.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::Fault;
use crate::health::Liveness;
use crate::middleware::{AccessLog, Middleware, Next, Recovery, Trace};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::{index, status};

/// Router, middleware chain and liveness flag, ready to hand to
/// [`Server::serve`](crate::Server::serve).
///
/// The chain is always `Recovery → Trace → AccessLog → router`.
pub struct App {
    chain: Arc<[Arc<dyn Middleware>]>,
    router: Arc<Router>,
    liveness: Arc<Liveness>,
}

impl App {
    /// Wraps `router` in the standard chain. `liveness` is the flag the
    /// server flips on startup and shutdown.
    pub fn new(router: Router, liveness: Arc<Liveness>) -> Self {
        let chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recovery),
            Arc::new(Trace::new()),
            Arc::new(AccessLog),
        ];
        Self { chain: chain.into(), router: Arc::new(router), liveness }
    }

    /// The status-code server: `/`, `/json/{code}`, `/plain/{code}` and
    /// `/healthz`, with a fresh liveness flag.
    pub fn status_server() -> Self {
        let liveness = Arc::new(Liveness::new());
        Self::new(routes(Arc::clone(&liveness)), liveness)
    }

    pub fn liveness(&self) -> &Arc<Liveness> {
        &self.liveness
    }

    /// Runs one request through the pipeline.
    ///
    /// The body is discarded before the returned future is created, so the
    /// future does not hold on to it.
    pub fn handle<B>(
        &self,
        req: http::Request<B>,
        remote_addr: SocketAddr,
    ) -> impl Future<Output = Response> + Send + 'static + use<B> {
        let req = Request::from_http(req, remote_addr);
        let outcome = Next::new(Arc::clone(&self.chain), Arc::clone(&self.router)).run(req);
        // Recovery is first in the chain, so a fault never reaches here.
        async move { outcome.await.unwrap_or_else(Fault::into_response) }
    }
}

/// The status-code server's routes. Every route answers any method, so
/// `HEAD`, `POST` and friends get the requested status too.
pub fn routes(liveness: Arc<Liveness>) -> Router {
    Router::new()
        .any("/", index::root)
        .any("/json/{code}", status::json)
        .any("/plain/{code}", status::plain)
        .any("/healthz", move |_req: Request| {
            let probe = liveness.probe();
            async move { probe }
        })
}
