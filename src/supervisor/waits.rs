// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Readiness waits.
//!
//! Every wait re-checks its predicate once per poll interval and whenever a
//! callback pulses the observer's [`Notify`](tokio::sync::Notify). An exit
//! request from the engine ends any wait that is not itself waiting for it.

use crate::errors::ScenarioError;
use crate::observation::{ObservationState, Observer};
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};

/// Wait until `predicate` holds, failing after `timeout`.
pub async fn wait_until<F>(
    observer: &Observer,
    poll: Duration,
    timeout: Duration,
    waiting_for: &'static str,
    predicate: F,
) -> Result<(), ScenarioError>
where
    F: Fn(&ObservationState) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let notified = observer.wake().notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        let state = observer.state();
        if predicate(state) {
            return Ok(());
        }
        check_exit(state)?;

        let now = Instant::now();
        if now >= deadline {
            return Err(ScenarioError::Timeout {
                waiting_for,
                after: timeout,
            });
        }
        let nap = poll.min(deadline - now);
        tokio::select! {
            _ = &mut notified => {}
            _ = sleep(nap) => {}
        }
    }
}

/// Wait until a run newer than `since` has started.
pub async fn wait_for_run_start(
    observer: &Observer,
    poll: Duration,
    timeout: Duration,
    since: u64,
) -> Result<(), ScenarioError> {
    wait_until(observer, poll, timeout, "background run to start", |state| {
        state.runs_started() > since
    })
    .await
}

/// Wait until the worker is idle and every started run has finished.
pub async fn wait_for_quiescence(
    observer: &Observer,
    poll: Duration,
    timeout: Duration,
) -> Result<(), ScenarioError> {
    wait_until(observer, poll, timeout, "background worker to go idle", |state| {
        state.quiescent()
    })
    .await
}

/// Sleep for `duration`, cut short only by an engine exit request.
pub async fn hold(observer: &Observer, duration: Duration) -> Result<(), ScenarioError> {
    let deadline = Instant::now() + duration;
    loop {
        let notified = observer.wake().notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        check_exit(observer.state())?;
        if Instant::now() >= deadline {
            return Ok(());
        }
        tokio::select! {
            _ = &mut notified => {}
            _ = sleep_until(deadline) => {}
        }
    }
}

fn check_exit(state: &ObservationState) -> Result<(), ScenarioError> {
    match state.exit_request() {
        Some(exit) => Err(ScenarioError::EngineExitRequested {
            status: exit.status,
        }),
        None => Ok(()),
    }
}
