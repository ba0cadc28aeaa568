//! # httpcode
//!
//! A tiny HTTP server that answers with whatever status code you ask for.
//! Point an HTTP client, proxy or retry policy at it and watch how it copes
//! with a `418`, a `503` or a `204`.
//!
//! ## Routes
//!
//! | Route | Response |
//! |---|---|
//! | `/` | embedded landing page |
//! | `/json/{code}` | status `{code}`, body `{}` (none for `204`) |
//! | `/plain/{code}` | status `{code}`, empty body |
//! | `/healthz` | `204` while serving, `503` once shutdown began |
//!
//! Routes answer any method; `HEAD` gets the same status and headers with
//! the body left off.
//!
//! Every response carries `X-Request-Id`, echoed from the request when the
//! caller sent one. A `{code}` that is not a valid status yields a `500`.
//!
//! ## Pipeline
//!
//! ```text
//! Recovery → Trace → AccessLog → Router → handler
//! ```
//!
//! See [`middleware`] for what each stage does and why the order matters.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use httpcode::{App, Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), httpcode::Error> {
//!     let config = Config::load()?;
//!     Server::bind(config.server()).await?
//!         .serve(App::status_server())
//!         .await
//! }
//! ```

mod app;
mod config;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod signal;

pub mod health;
pub mod index;
pub mod middleware;
pub mod status;

pub use app::{App, routes};
pub use config::{Config, ServerConfig};
pub use error::{Cause, Error, Fault, ParseReason};
pub use handler::{BoxFuture, Handler, IntoOutcome, Outcome};
pub use health::Liveness;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use signal::ShutdownSignal;
