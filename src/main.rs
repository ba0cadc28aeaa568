//! `httpcode` binary.
//!
//! ```text
//! PORT=8080 RUST_LOG=info httpcode
//! curl -i localhost:8080/json/418
//! ```

use std::process::ExitCode;

use httpcode::{App, Config, Error, Server};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("server is starting");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::load()?;
    let server = Server::bind(config.server()).await?;
    server.serve(App::status_server()).await
}
