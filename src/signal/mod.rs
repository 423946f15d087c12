// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Signal bridge.
//!
//! The engine's worker raises a process signal toward the supervisor thread
//! with `pthread_kill`. The handler itself is tokio's self-pipe handler, which
//! only writes a byte; a task on the supervisor's runtime turns the delivery
//! into a cancelled [`CancellationToken`], and the supervisor's wait loop
//! issues `bg_halt` when it observes the cancellation.
//!
//! Once installed for a given signal, tokio's handler stays registered for the
//! remainder of the process even after the bridge is dropped; the signal's
//! default disposition (terminating the process) is not restored.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::io;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Which process signal carries the halt request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltSignal {
    #[default]
    Terminate,
    User1,
    User2,
}

impl HaltSignal {
    /// Platform signal number.
    #[cfg(unix)]
    pub fn raw(self) -> i32 {
        match self {
            HaltSignal::Terminate => libc::SIGTERM,
            HaltSignal::User1 => libc::SIGUSR1,
            HaltSignal::User2 => libc::SIGUSR2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HaltSignal::Terminate => "SIGTERM",
            HaltSignal::User1 => "SIGUSR1",
            HaltSignal::User2 => "SIGUSR2",
        }
    }
}

impl Display for HaltSignal {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// True when signals can be delivered to one specific thread.
pub fn directed_delivery_supported() -> bool {
    cfg!(unix)
}

/// Thread that directed halt signals are sent to.
#[derive(Debug, Clone, Copy)]
pub struct SignalTarget {
    #[cfg(unix)]
    thread: libc::pthread_t,
}

// SAFETY: a pthread_t is an identifier; it is only ever passed to pthread_kill.
unsafe impl Send for SignalTarget {}
unsafe impl Sync for SignalTarget {}

impl SignalTarget {
    /// Capture the calling thread.
    #[cfg(unix)]
    pub fn current() -> Self {
        // SAFETY: pthread_self has no preconditions
        Self {
            thread: unsafe { libc::pthread_self() },
        }
    }

    #[cfg(not(unix))]
    pub fn current() -> Self {
        Self {}
    }

    /// Send `signal` to the captured thread. Returns whether delivery was accepted.
    #[cfg(unix)]
    pub fn raise(&self, signal: HaltSignal) -> bool {
        // SAFETY: the target thread is the supervisor, which outlives every engine
        unsafe { libc::pthread_kill(self.thread, signal.raw()) == 0 }
    }

    #[cfg(not(unix))]
    pub fn raise(&self, _signal: HaltSignal) -> bool {
        false
    }
}

/// Listener that turns one process signal into a cancellation.
pub struct SignalBridge {
    signal: HaltSignal,
    token: CancellationToken,
    target: SignalTarget,
    task: JoinHandle<()>,
}

impl SignalBridge {
    /// Install the listener on the current runtime and capture the calling thread
    /// as the delivery target.
    ///
    /// Must be called from within a tokio runtime.
    #[cfg(unix)]
    pub fn install(signal: HaltSignal) -> io::Result<Self> {
        use tokio::signal::unix::{signal as listen, SignalKind};

        let mut stream = listen(SignalKind::from_raw(signal.raw()))?;
        let token = CancellationToken::new();
        let trigger = token.clone();
        let task = tokio::spawn(async move {
            while stream.recv().await.is_some() {
                trigger.cancel();
            }
        });

        Ok(Self {
            signal,
            token,
            target: SignalTarget::current(),
            task,
        })
    }

    #[cfg(not(unix))]
    pub fn install(_signal: HaltSignal) -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "thread-directed signals are not available on this platform",
        ))
    }

    pub fn signal(&self) -> HaltSignal {
        self.signal
    }

    /// Token cancelled on the first delivery.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn target(&self) -> SignalTarget {
        self.target
    }

    pub fn received(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SignalBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_signal_names() {
        assert_eq!(HaltSignal::Terminate.raw(), libc::SIGTERM);
        assert_eq!(HaltSignal::User1.to_string(), "SIGUSR1");
        assert!(directed_delivery_supported());
    }

    #[tokio::test]
    async fn test_directed_signal_cancels_token() {
        let bridge = SignalBridge::install(HaltSignal::User2).unwrap();
        assert!(!bridge.received());

        let target = bridge.target();
        std::thread::spawn(move || target.raise(HaltSignal::User2))
            .join()
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), bridge.token().cancelled())
            .await
            .expect("signal never reached the bridge");
        assert!(bridge.received());
    }
}
