//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the place for
//! cross-cutting concerns. The app runs a fixed chain, outermost first:
//!
//! ```text
//! Recovery → Trace → AccessLog → Router
//! ```
//!
//! - [`Recovery`] must be outermost so it sees faults from every other stage.
//! - [`Trace`] must run before [`AccessLog`] so the request id exists when
//!   the log line is written.
//! - [`AccessLog`] sits next to the router so it observes the handler's own
//!   outcome.
//!
//! Each stage receives the request and a [`Next`] handle; calling
//! [`Next::run`] hands the request to the following stage.

use std::sync::Arc;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::router::Router;

mod access_log;
mod recovery;
mod trace;

pub use access_log::AccessLog;
pub use recovery::Recovery;
pub(crate) use recovery::panic_message;
pub use trace::{REQUEST_ID_HEADER, RequestId, RequestIdGenerator, Trace};

/// One stage of the request pipeline.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// The remainder of the pipeline below the current stage.
///
/// Owns `Arc`s to the chain and router, so the future it returns is
/// `'static` and can be spawned or boxed freely.
pub struct Next {
    chain: Arc<[Arc<dyn Middleware>]>,
    router: Arc<Router>,
    index: usize,
}

impl Next {
    pub(crate) fn new(chain: Arc<[Arc<dyn Middleware>]>, router: Arc<Router>) -> Self {
        Self { chain, router, index: 0 }
    }

    /// Passes `req` to the next stage, or to the router once the chain is
    /// exhausted.
    pub fn run(self, req: Request) -> BoxFuture {
        match self.chain.get(self.index) {
            Some(stage) => {
                let stage = Arc::clone(stage);
                let next = Next { chain: self.chain, router: self.router, index: self.index + 1 };
                stage.call(req, next)
            }
            None => self.router.dispatch(req),
        }
    }
}
