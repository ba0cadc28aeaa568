//! Request-id tagging.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use http::header::{HeaderName, HeaderValue};
use tracing::Instrument;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;

/// `X-Request-Id`, read from the request and echoed on the response.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Opaque per-request correlation token.
///
/// Holds the inbound header value byte for byte, so whatever the caller sent
/// goes back out unchanged. [`Display`](fmt::Display) is lossy for bytes that
/// are not UTF-8 and is meant for logs only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestId(HeaderValue);

impl RequestId {
    #[cfg(test)]
    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(HeaderValue::from_static(id))
    }

    /// Accepts any non-empty inbound header value.
    fn from_header(value: &HeaderValue) -> Option<Self> {
        (!value.is_empty()).then(|| Self(value.clone()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub(crate) fn to_header_value(&self) -> HeaderValue {
        self.0.clone()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Issues ids from the wall clock in nanoseconds since the Unix epoch.
///
/// Ids are strictly increasing within one generator: two requests landing in
/// the same nanosecond (or a clock step backwards) get `last + 1`.
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    last: AtomicU64,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> RequestId {
        RequestId(HeaderValue::from(self.next_value(now_nanos())))
    }

    fn next_value(&self, now: u64) -> u64 {
        let prev = self.last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| {
                Some(now.max(prev.saturating_add(1)))
            })
            .unwrap_or_else(|prev| prev);
        now.max(prev.saturating_add(1))
    }
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Assigns every request an id and echoes it on the response.
///
/// The id comes from the inbound `X-Request-Id` header when present,
/// otherwise from the generator. It is stored on the [`Request`] for later
/// stages, set on the response, and attached to faults so the recovery
/// response carries it too. Everything below runs inside a `request` span.
#[derive(Debug, Default)]
pub struct Trace {
    ids: RequestIdGenerator,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Middleware for Trace {
    fn call(&self, mut req: Request, next: Next) -> BoxFuture {
        let id = req.headers
            .get(REQUEST_ID_HEADER)
            .and_then(RequestId::from_header)
            .unwrap_or_else(|| self.ids.next_id());

        let span = tracing::info_span!("request", request_id = %id);
        req.request_id = Some(id.clone());
        let inner = next.run(req);

        Box::pin(
            async move {
                match inner.await {
                    Ok(response) => Ok(response.with_request_id(&id)),
                    Err(fault) => Err(fault.with_request_id(id)),
                }
            }
            .instrument(span),
        )
    }
}
