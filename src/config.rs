//! Process configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;

use crate::error::Error;
use crate::signal::ShutdownSignal;

/// Command-line / environment configuration.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
}

impl Config {
    /// Reads the process arguments and environment.
    ///
    /// `--help` and `--version` print and exit here; anything else clap
    /// rejects comes back as [`Error::Config`].
    pub fn load() -> Result<Self, Error> {
        Self::try_parse().or_else(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => Err(Error::Config(e)),
        })
    }

    /// Listener settings: every interface on the configured port, default
    /// timeouts.
    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port)),
            ..ServerConfig::default()
        }
    }
}

/// Listener address and connection limits.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Time allowed for a client to send its request headers.
    pub read_timeout: Duration,
    /// Time allowed between receiving a request and handing back its
    /// response. Overrunning it aborts the connection.
    pub write_timeout: Duration,
    /// Bound on the graceful drain after a shutdown signal.
    pub shutdown_timeout: Duration,
    /// Signals that start the drain when serving with
    /// [`Server::serve`](crate::Server::serve).
    pub shutdown_signals: Vec<ShutdownSignal>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(30),
            shutdown_signals: ShutdownSignal::DEFAULT.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::try_parse_from(["httpcode"]).unwrap();
        // PORT may be set in the environment running the tests.
        if std::env::var_os("PORT").is_none() {
            assert_eq!(config.port, 3000);
        }
    }

    #[test]
    fn test_config_args() {
        let config = Config::try_parse_from(["httpcode", "--port", "8080"]).unwrap();
        assert_eq!(config.port, 8080);

        let server = config.server();
        assert_eq!(server.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(server.read_timeout, Duration::from_secs(5));
        assert_eq!(server.write_timeout, Duration::from_secs(10));
        assert_eq!(server.shutdown_timeout, Duration::from_secs(30));
        assert_eq!(server.shutdown_signals, ShutdownSignal::DEFAULT);
    }

    #[test]
    fn test_config_rejects_bad_port() {
        let err = Config::try_parse_from(["httpcode", "--port", "not-a-port"]).unwrap_err();
        assert!(matches!(Error::from(err), Error::Config(_)));
    }
}
