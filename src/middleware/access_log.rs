//! One access-log line per request.

use tracing::info;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;

/// Emits one `info` event on the `access` target after the inner call
/// completes, whether it produced a response or a fault.
///
/// Fields: `request_id` (`unknown` when the trace layer did not run),
/// `method`, `path`, `remote_addr`, `user_agent`, and either `status` or
/// `fault`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessLog;

impl Middleware for AccessLog {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let request_id = req.request_id()
            .map_or_else(|| "unknown".to_owned(), ToString::to_string);
        let method = req.method().clone();
        let path = req.path().to_owned();
        let remote_addr = req.remote_addr();
        let user_agent = req.user_agent().to_owned();

        let inner = next.run(req);
        Box::pin(async move {
            let outcome = inner.await;
            match &outcome {
                Ok(response) => info!(
                    target: "access",
                    %request_id, %method, %path, %remote_addr, %user_agent,
                    status = response.status_code().as_u16(),
                    "request handled"
                ),
                Err(fault) => info!(
                    target: "access",
                    %request_id, %method, %path, %remote_addr, %user_agent,
                    %fault,
                    "request failed"
                ),
            }
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::{Method, StatusCode};

    use super::*;
    use crate::error::{Cause, Fault, ParseReason};
    use crate::middleware::testing::{capture_logs, run, CapturedLogs, REMOTE_ADDR};
    use crate::middleware::{Middleware, Trace};
    use crate::response::Response;
    use crate::router::Router;

    async fn created(_req: Request) -> StatusCode {
        StatusCode::CREATED
    }

    async fn broken(_req: Request) -> Result<Response, Fault> {
        Err(Fault::from(Cause::Parse { input: "abc".into(), reason: ParseReason::Missing }))
    }

    fn access_lines(logs: &CapturedLogs) -> Vec<String> {
        logs.lines().into_iter().filter(|l| l.contains("access:")).collect()
    }

    #[tokio::test]
    async fn passes_outcome_through_untouched() {
        let router = Router::new().on(Method::GET, "/", created);
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(AccessLog)];
        let req = http::Request::builder().uri("/").body(()).unwrap();

        let response: Response = run(chain, router, req).await.unwrap();
        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert!(response.header("x-request-id").is_none());
    }

    #[tokio::test]
    async fn runs_below_trace() {
        let router = Router::new().on(Method::GET, "/", created);
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(Trace::new()), Arc::new(AccessLog)];
        let req = http::Request::builder().uri("/").body(()).unwrap();

        let response = run(chain, router, req).await.unwrap();
        assert!(response.header("x-request-id").is_some());
    }

    #[tokio::test]
    async fn logs_one_line_per_handled_request() {
        let (logs, _guard) = capture_logs();
        let router = Router::new().on(Method::GET, "/created", created);
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(Trace::new()), Arc::new(AccessLog)];
        let req = http::Request::builder()
            .uri("/created")
            .header("X-Request-Id", "log-1")
            .header("User-Agent", "curl/8.0")
            .body(())
            .unwrap();

        run(chain, router, req).await.unwrap();

        let lines = access_lines(&logs);
        assert_eq!(lines.len(), 1, "{lines:?}");
        let line = &lines[0];
        assert!(line.contains("INFO"), "{line}");
        assert!(line.contains("request handled"), "{line}");
        assert!(line.contains("request_id=log-1"), "{line}");
        assert!(line.contains("method=GET"), "{line}");
        assert!(line.contains("path=/created"), "{line}");
        assert!(line.contains(&format!("remote_addr={REMOTE_ADDR}")), "{line}");
        assert!(line.contains("user_agent=curl/8.0"), "{line}");
        assert!(line.contains("status=201"), "{line}");
    }

    #[tokio::test]
    async fn logs_faults_with_their_cause() {
        let (logs, _guard) = capture_logs();
        let router = Router::new().on(Method::GET, "/json/{code}", broken);
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(Trace::new()), Arc::new(AccessLog)];
        let req = http::Request::builder()
            .uri("/json/abc")
            .header("X-Request-Id", "log-2")
            .body(())
            .unwrap();

        run(chain, router, req).await.unwrap_err();

        let lines = access_lines(&logs);
        assert_eq!(lines.len(), 1, "{lines:?}");
        let line = &lines[0];
        assert!(line.contains("request failed"), "{line}");
        assert!(line.contains("request_id=log-2"), "{line}");
        assert!(line.contains("path=/json/abc"), "{line}");
        assert!(line.contains("fault=unable to process code"), "{line}");
        assert!(!line.contains("status="), "{line}");
    }

    #[tokio::test]
    async fn logs_unknown_id_without_trace() {
        let (logs, _guard) = capture_logs();
        let router = Router::new().on(Method::POST, "/", created);
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(AccessLog)];
        let req = http::Request::builder().method(Method::POST).uri("/").body(()).unwrap();

        run(chain, router, req).await.unwrap();

        let lines = access_lines(&logs);
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].contains("request_id=unknown"), "{}", lines[0]);
        assert!(lines[0].contains("method=POST"), "{}", lines[0]);
        assert!(lines[0].contains("user_agent= "), "{}", lines[0]);
    }
}
