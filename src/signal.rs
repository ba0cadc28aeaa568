//! Process signals that start a graceful shutdown.

use std::fmt;
use std::future::Future;
use std::io;

use futures::future::{self, FutureExt};

/// A signal the server treats as a request to drain and stop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShutdownSignal {
    /// `SIGINT`, or Ctrl-C off Unix.
    Interrupt,
    /// `SIGTERM`. Unix only.
    Terminate,
    /// `SIGHUP`. Unix only.
    Hangup,
}

impl ShutdownSignal {
    /// What [`Server::serve`](crate::Server::serve) listens for unless told
    /// otherwise.
    pub const DEFAULT: [ShutdownSignal; 2] = [ShutdownSignal::Interrupt, ShutdownSignal::Terminate];
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Hangup => "SIGHUP",
        })
    }
}

/// Installs handlers for `signals` and returns a future resolving with the
/// first one received.
///
/// Handlers are in place when this returns, so a signal sent afterwards is
/// never lost. An empty set never resolves.
#[cfg(unix)]
pub(crate) fn listen(
    signals: &[ShutdownSignal],
) -> io::Result<impl Future<Output = ShutdownSignal> + Send + use<>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut waits = Vec::with_capacity(signals.len());
    for &which in signals {
        let kind = match which {
            ShutdownSignal::Interrupt => SignalKind::interrupt(),
            ShutdownSignal::Terminate => SignalKind::terminate(),
            ShutdownSignal::Hangup => SignalKind::hangup(),
        };
        let mut stream = signal(kind)?;
        waits.push(async move {
            stream.recv().await;
            which
        }.boxed());
    }

    Ok(async move {
        if waits.is_empty() {
            return future::pending().await;
        }
        future::select_all(waits).await.0
    })
}

/// Off Unix only Ctrl-C can be observed; other signals in the set are ignored.
#[cfg(not(unix))]
pub(crate) fn listen(
    signals: &[ShutdownSignal],
) -> io::Result<impl Future<Output = ShutdownSignal> + Send + use<>> {
    let interrupt = signals.contains(&ShutdownSignal::Interrupt);
    Ok(async move {
        if interrupt && tokio::signal::ctrl_c().await.is_ok() {
            return ShutdownSignal::Interrupt;
        }
        future::pending().await
    })
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::Command;
    use std::time::Duration;

    use super::*;

    #[test]
    fn default_set_is_interrupt_and_terminate() {
        assert_eq!(ShutdownSignal::DEFAULT, [ShutdownSignal::Interrupt, ShutdownSignal::Terminate]);
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn empty_set_never_fires() {
        let signal = listen(&[]).unwrap();
        assert!(tokio::time::timeout(Duration::from_millis(50), signal).await.is_err());
    }

    #[tokio::test]
    async fn resolves_with_the_signal_received() {
        let signal = listen(&[ShutdownSignal::Hangup]).unwrap();

        let status = Command::new("kill")
            .args(["-HUP", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        let received = tokio::time::timeout(Duration::from_secs(5), signal).await.unwrap();
        assert_eq!(received, ShutdownSignal::Hangup);
    }
}
