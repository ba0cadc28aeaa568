//! `GET /` — the embedded landing page.

use crate::request::Request;
use crate::response::{ContentType, Response};

/// Compiled into the binary; identical bytes on every request.
pub const INDEX_HTML: &str = include_str!("../assets/index.html");

pub async fn root(_req: Request) -> Response {
    Response::builder().bytes(ContentType::Html, INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[tokio::test]
    async fn serves_the_same_document_every_time() {
        let addr = "127.0.0.1:1".parse().unwrap();
        let first = root(Request::from_http(http::Request::new(()), addr)).await;
        let second = root(Request::from_http(http::Request::new(()), addr)).await;

        assert_eq!(first.status_code(), StatusCode::OK);
        assert_eq!(first.header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(first.body(), INDEX_HTML.as_bytes());
        assert_eq!(first.body(), second.body());
    }
}
