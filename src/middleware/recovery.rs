//! Fault recovery.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use http::StatusCode;
use tracing::error;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// Turns every fault below it into an empty `500 Internal Server Error`.
///
/// Handler faults arrive as `Err` values and keep the request id the trace
/// layer attached. A panic inside a middleware stage unwinds up to here and
/// is answered with a bare `500`; at that point the request id is gone.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recovery;

impl Middleware for Recovery {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin(async move {
            let inner = AssertUnwindSafe(async move { next.run(req).await });
            match inner.catch_unwind().await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(fault)) => {
                    let request_id = fault
                        .request_id()
                        .map_or_else(|| "unknown".to_owned(), ToString::to_string);
                    error!(%request_id, "{fault}");
                    Ok(fault.into_response())
                }
                Err(payload) => {
                    error!("middleware panicked: {}", panic_message(payload.as_ref()));
                    Ok(Response::status(StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        })
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::Method;

    use super::*;
    use crate::error::{Cause, Fault, ParseReason};
    use crate::middleware::testing::run;
    use crate::middleware::Trace;
    use crate::router::Router;

    async fn broken(_req: Request) -> Result<Response, Fault> {
        Err(Fault::from(Cause::Parse { input: "abc".into(), reason: ParseReason::Missing }))
    }

    async fn explode(_req: Request) -> Response {
        panic!("handler bug")
    }

    struct Exploding;

    impl Middleware for Exploding {
        fn call(&self, _req: Request, _next: Next) -> BoxFuture {
            panic!("middleware bug")
        }
    }

    fn get(path: &str) -> http::Request<()> {
        http::Request::builder().uri(path).header("X-Request-Id", "r-1").body(()).unwrap()
    }

    #[tokio::test]
    async fn fault_becomes_500_with_request_id() {
        let router = Router::new().on(Method::GET, "/", broken);
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(Recovery), Arc::new(Trace::new())];

        let response = run(chain, router, get("/")).await.unwrap();
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body().is_empty());
        assert_eq!(response.header("x-request-id"), Some("r-1"));
    }

    #[tokio::test]
    async fn handler_panic_becomes_500() {
        let router = Router::new().on(Method::GET, "/", explode);
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(Recovery), Arc::new(Trace::new())];

        let response = run(chain, router, get("/")).await.unwrap();
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.header("x-request-id"), Some("r-1"));
    }

    #[tokio::test]
    async fn middleware_panic_becomes_500() {
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(Recovery), Arc::new(Exploding)];

        let response = run(chain, Router::new(), get("/")).await.unwrap();
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn panic_message_reads_strings() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
