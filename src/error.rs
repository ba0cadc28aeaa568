//! Error types.
//!
//! Two layers, never mixed:
//!
//! - [`Error`] — process-level failures. Startup errors and a drain that
//!   overruns its bound are fatal; the binary logs them and exits non-zero.
//! - [`Fault`] — a single request went wrong. Faults travel up the middleware
//!   chain as `Err` values and the recovery layer turns them into a `500`.
//!   They never cross the process boundary.

use std::net::SocketAddr;
use std::num::ParseIntError;
use std::time::Duration;

use crate::middleware::RequestId;
use crate::response::Response;

/// The error type returned by httpcode's fallible process-level operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Environment / command-line configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] clap::Error),

    /// The listener could not bind the configured address.
    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A shutdown signal handler could not be installed.
    #[error("could not install shutdown signal handler: {0}")]
    Signal(#[source] std::io::Error),

    /// In-flight connections did not finish within the drain bound.
    #[error("could not gracefully shutdown the server within {0:?}")]
    ShutdownTimeout(Duration),

    /// A request did not produce its response in time. Only the connection
    /// carrying it is aborted.
    #[error("response not written within {0:?}")]
    WriteTimeout(Duration),
}

/// Why a request failed.
#[derive(Debug, thiserror::Error)]
pub enum Cause {
    /// The `{code}` path segment is not a usable status code.
    #[error("unable to process code {input:?}: {reason}")]
    Parse { input: String, reason: ParseReason },

    /// A handler panicked. The payload message is kept when it is a string.
    #[error("handler panicked: {0}")]
    Panic(String),
}

/// Detail for [`Cause::Parse`].
#[derive(Debug, thiserror::Error)]
pub enum ParseReason {
    #[error("{0}")]
    NotAnInteger(#[from] ParseIntError),

    #[error("{0} is not a valid HTTP status code")]
    OutOfRange(i64),

    #[error("missing path parameter")]
    Missing,
}

/// A per-request failure travelling up the middleware chain.
///
/// Once the tracing layer has seen it, the fault carries the request id so
/// the `500` produced by recovery can still be correlated.
#[derive(Debug, thiserror::Error)]
#[error("{cause}")]
pub struct Fault {
    cause: Cause,
    request_id: Option<RequestId>,
}

impl Fault {
    pub fn new(cause: Cause) -> Self {
        Self { cause, request_id: None }
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub(crate) fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    /// The response a fault becomes once recovery catches it: an empty
    /// `500 Internal Server Error`, tagged with the request id when known.
    pub fn into_response(self) -> Response {
        let response = Response::status(http::StatusCode::INTERNAL_SERVER_ERROR);
        match self.request_id {
            Some(id) => response.with_request_id(&id),
            None => response,
        }
    }
}

impl From<Cause> for Fault {
    fn from(cause: Cause) -> Self {
        Self::new(cause)
    }
}
