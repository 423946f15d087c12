// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Callback registry.
//!
//! One [`Observer`] is handed to the engine (as the opaque user pointer) for
//! the lifetime of an engine instance. The engine's callbacks land in the
//! `on_*` methods, which translate each event into updates of the shared
//! [`ObservationState`] and wake any supervisor waiting on it.
//!
//! The `on_*` methods run on the engine's worker thread. They never block on
//! the supervisor: the only lock they take guards the console capture buffer,
//! which is held for a single push.

use crate::observability::messages::callback::{
    BackgroundThreadChanged, ConsoleLine, ConsoleStream, ExitRequested, HaltSignalRaised,
    LateCallback, StatusLine, ThresholdCrossed, VectorTablePublished, WatchVectorMissing,
    WatchVectorResolved,
};
use crate::observability::messages::StructuredLog;
use crate::observation::data::{DataPoint, VectorTable};
use crate::observation::state::{ExitKind, ObservationState};
use crate::signal::{HaltSignal, SignalTarget};
use crate::supervisor::ScenarioId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

/// Which vector to watch and when it counts as crossed.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchPolicy {
    pub vector: String,
    /// Strict greater-than on the real part
    pub threshold: f64,
    /// Pause on the worker thread after the crossing so the supervisor can halt
    pub yield_for: Duration,
}

impl WatchPolicy {
    pub fn new(vector: impl Into<String>, threshold: f64) -> Self {
        Self {
            vector: vector.into(),
            threshold,
            yield_for: Duration::ZERO,
        }
    }

    pub fn with_yield(mut self, yield_for: Duration) -> Self {
        self.yield_for = yield_for;
        self
    }
}

/// Console lines captured while a command executes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleCapture {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

#[derive(Debug, Default)]
struct CaptureBuffer {
    active: bool,
    lines: ConsoleCapture,
}

/// Split the `stdout `/`stderr ` prefix the engine puts on console lines.
pub fn split_console_line(line: &str) -> (ConsoleStream, &str) {
    if let Some(rest) = line.strip_prefix("stderr") {
        (ConsoleStream::Stderr, rest.strip_prefix(' ').unwrap_or(rest))
    } else if let Some(rest) = line.strip_prefix("stdout") {
        (ConsoleStream::Stdout, rest.strip_prefix(' ').unwrap_or(rest))
    } else {
        (ConsoleStream::Stdout, line)
    }
}

/// Event sink shared between the supervisor and the engine's callbacks.
#[derive(Debug)]
pub struct Observer {
    state: ObservationState,
    policy: WatchPolicy,
    attached: AtomicBool,
    capture: Mutex<CaptureBuffer>,
    last_table: Mutex<Option<VectorTable>>,
    halt: Mutex<Option<(SignalTarget, HaltSignal)>>,
    wake: Notify,
}

impl Observer {
    pub fn new(policy: WatchPolicy) -> Self {
        Self {
            state: ObservationState::new(),
            policy,
            attached: AtomicBool::new(false),
            capture: Mutex::new(CaptureBuffer::default()),
            last_table: Mutex::new(None),
            halt: Mutex::new(None),
            wake: Notify::new(),
        }
    }

    pub fn state(&self) -> &ObservationState {
        &self.state
    }

    pub fn policy(&self) -> &WatchPolicy {
        &self.policy
    }

    /// Woken after every callback that changes the observation state.
    pub fn wake(&self) -> &Notify {
        &self.wake
    }

    // Supervisor side

    /// Start accepting callbacks for a fresh engine instance.
    pub fn attach(&self) {
        self.state.reset_for_engine();
        self.attached.store(true, Ordering::Release);
    }

    /// Stop accepting callbacks; anything arriving later is counted as late.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
        self.wake.notify_waiters();
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Expect a fresh vector table ahead of the next run's data.
    pub fn begin_run(&self) {
        self.state.begin_run();
    }

    /// Select the scenario and re-arm the one-shot threshold.
    pub fn reset_for_scenario(&self, id: ScenarioId) {
        self.state.set_scenario_id(id.number());
        self.state.clear_break();
    }

    /// Raise `signal` toward `target` when the threshold trips in a signalling scenario.
    pub fn arm_halt_signal(&self, target: SignalTarget, signal: HaltSignal) {
        *lock(&self.halt) = Some((target, signal));
    }

    pub fn disarm_halt_signal(&self) {
        *lock(&self.halt) = None;
    }

    /// Clear the capture buffer and start recording console lines.
    pub fn begin_capture(&self) {
        let mut buffer = lock(&self.capture);
        buffer.active = true;
        buffer.lines = ConsoleCapture::default();
    }

    /// Stop recording and return what was captured.
    pub fn take_capture(&self) -> ConsoleCapture {
        let mut buffer = lock(&self.capture);
        buffer.active = false;
        std::mem::take(&mut buffer.lines)
    }

    /// Vector table of the most recent simulation.
    pub fn last_table(&self) -> Option<VectorTable> {
        lock(&self.last_table).clone()
    }

    // Engine side

    fn accept(&self, callback: &str) -> bool {
        if self.attached.load(Ordering::Acquire) {
            return true;
        }
        self.state.note_late_callback();
        tracing::warn!("{}", LateCallback { callback });
        false
    }

    pub fn on_char(&self, engine_id: i32, line: &str) {
        if !self.accept("send_char") {
            return;
        }
        let (stream, text) = split_console_line(line);
        {
            let mut buffer = lock(&self.capture);
            if buffer.active {
                match stream {
                    ConsoleStream::Stdout => buffer.lines.stdout.push(text.to_string()),
                    ConsoleStream::Stderr => buffer.lines.stderr.push(text.to_string()),
                }
            }
        }
        ConsoleLine {
            engine_id,
            stream,
            text,
        }
        .log();
    }

    pub fn on_stat(&self, engine_id: i32, line: &str) {
        if !self.accept("send_stat") {
            return;
        }
        tracing::debug!("{}", StatusLine { engine_id, text: line });
    }

    pub fn on_thread_state(&self, engine_id: i32, idle: bool) {
        if !self.accept("bg_thread_running") {
            return;
        }
        self.state.set_bg_idle(idle);
        BackgroundThreadChanged { engine_id, idle }.log();
        self.wake.notify_waiters();
    }

    /// Record the new vector table and resolve the watched vector in it.
    pub fn on_init_data(&self, engine_id: i32, table: VectorTable) {
        if !self.accept("send_init_data") {
            return;
        }
        self.state.reset_watch();
        tracing::info!(
            "{}",
            VectorTablePublished {
                engine_id,
                plot: &table.plot_name,
                vector_count: table.vectors.len(),
            }
        );
        for vector in &table.vectors {
            tracing::debug!(engine_id, number = vector.number, "Vector: {}", vector.name);
        }

        match table.position_of(&self.policy.vector) {
            Some(index) => {
                self.state.publish_watch_index(index);
                tracing::info!(
                    "{}",
                    WatchVectorResolved {
                        vector: &self.policy.vector,
                        index,
                    }
                );
            }
            None => tracing::warn!(
                "{}",
                WatchVectorMissing {
                    vector: &self.policy.vector,
                    plot: &table.plot_name,
                }
            ),
        }

        if !self.state.note_table_published() {
            tracing::warn!(
                engine_id,
                plot = %table.plot_name,
                "Vector table repeated or published after data in the same run"
            );
        }
        *lock(&self.last_table) = Some(table);
        self.wake.notify_waiters();
    }

    /// Sample the watched vector and trip the threshold at most once.
    pub fn on_data(&self, _engine_id: i32, point: &DataPoint<'_>) {
        if !self.accept("send_data") {
            return;
        }
        if !self.state.note_data_point() {
            tracing::warn!(
                index = point.index(),
                "Data point arrived before the vector table"
            );
        }

        let Some(index) = self.state.watch_index() else {
            return;
        };
        let Some(value) = point.value(index) else {
            return;
        };
        self.state.set_last_watch_value(value.real);

        if self.state.break_reached() || value.real <= self.policy.threshold {
            return;
        }
        if !self.state.trip_break() {
            return;
        }

        ThresholdCrossed {
            vector: &self.policy.vector,
            value: value.real,
            threshold: self.policy.threshold,
        }
        .log();

        let signalling = ScenarioId::from_number(self.state.scenario_id())
            .map(|id| id.signals_on_break())
            .unwrap_or(false);
        if signalling {
            self.raise_halt_signal();
        }

        self.wake.notify_waiters();
        if !self.policy.yield_for.is_zero() {
            std::thread::sleep(self.policy.yield_for);
        } else {
            std::thread::yield_now();
        }
    }

    fn raise_halt_signal(&self) {
        let armed = *lock(&self.halt);
        if let Some((target, signal)) = armed {
            let delivered = target.raise(signal);
            let message = HaltSignalRaised {
                signal: signal_number(signal),
                delivered,
            };
            if delivered {
                tracing::info!("{}", message);
            } else {
                tracing::error!("{}", message);
            }
        }
    }

    /// Record the exit request. The unload itself is left to the supervisor.
    pub fn on_exit(&self, engine_id: i32, status: i32, immediate: bool, quit: bool) {
        if !self.accept("controlled_exit") {
            return;
        }
        let kind = if quit {
            ExitKind::Quit
        } else if immediate {
            ExitKind::Immediate
        } else {
            ExitKind::Deferred
        };
        self.state.record_exit(kind, status);
        ExitRequested {
            engine_id,
            status,
            immediate,
            quit,
        }
        .log();
        self.wake.notify_waiters();
    }
}

#[cfg(unix)]
fn signal_number(signal: HaltSignal) -> i32 {
    signal.raw()
}

#[cfg(not(unix))]
fn signal_number(_signal: HaltSignal) -> i32 {
    -1
}

// A poisoned buffer only means a logging thread panicked mid-push.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::data::{VectorSample, VectorValue};

    fn rc_table() -> VectorTable {
        VectorTable::from_names("tran1", ["time", "V(1)", "v(2)", "i(v1)"])
    }

    fn point(time: f64, v2: f64) -> Vec<VectorSample> {
        vec![
            VectorSample::new("time", VectorValue::scale(time)),
            VectorSample::new("V(1)", VectorValue::real(1.0)),
            VectorSample::new("v(2)", VectorValue::real(v2)),
            VectorSample::new("i(v1)", VectorValue::real(-v2)),
        ]
    }

    fn attached_observer() -> Observer {
        let observer = Observer::new(WatchPolicy::new("V(2)", 0.5));
        observer.attach();
        observer
    }

    #[test]
    fn test_split_console_prefix() {
        assert_eq!(
            split_console_line("stdout Circuit: test array"),
            (ConsoleStream::Stdout, "Circuit: test array")
        );
        assert_eq!(
            split_console_line("stderr Error: no such file"),
            (ConsoleStream::Stderr, "Error: no such file")
        );
        assert_eq!(split_console_line("bare"), (ConsoleStream::Stdout, "bare"));
    }

    #[test]
    fn test_init_data_resolves_watch_index_case_insensitively() {
        let observer = attached_observer();
        observer.on_init_data(0, rc_table());

        assert_eq!(observer.state().watch_index(), Some(2));
        assert_eq!(observer.state().init_data_events(), 1);
        assert_eq!(observer.last_table().unwrap().plot_name, "tran1");
    }

    #[test]
    fn test_threshold_trips_once() {
        let observer = attached_observer();
        observer.reset_for_scenario(ScenarioId::InFlightAlter);
        observer.on_init_data(0, rc_table());

        let below = point(0.1, 0.4);
        observer.on_data(0, &DataPoint::from_samples(0, &below));
        assert!(!observer.state().break_reached());

        // Equal is not greater
        let equal = point(0.2, 0.5);
        observer.on_data(0, &DataPoint::from_samples(1, &equal));
        assert!(!observer.state().break_reached());

        for (i, v) in [0.51, 0.6, 0.7].iter().enumerate() {
            let above = point(0.3 + i as f64, *v);
            observer.on_data(0, &DataPoint::from_samples(2 + i as i32, &above));
        }
        assert!(observer.state().break_reached());
        assert_eq!(observer.state().threshold_trips(), 1);
        assert_eq!(observer.state().last_watch_value(), 0.7);
        assert_eq!(observer.state().ordering_violations(), 0);
    }

    #[test]
    fn test_missing_watch_vector_never_trips() {
        let observer = attached_observer();
        observer.on_init_data(0, VectorTable::from_names("tran2", ["time", "V(out)"]));
        assert_eq!(observer.state().watch_index(), None);
        assert_eq!(observer.state().raw_watch_index(), 0);

        // Vector 0 is the time scale and would exceed the threshold
        let samples = vec![
            VectorSample::new("time", VectorValue::scale(2.0)),
            VectorSample::new("V(out)", VectorValue::real(3.0)),
        ];
        observer.on_data(0, &DataPoint::from_samples(0, &samples));
        assert!(!observer.state().break_reached());
    }

    #[test]
    fn test_data_before_table_is_counted() {
        let observer = attached_observer();
        let samples = point(0.0, 0.0);
        observer.on_data(0, &DataPoint::from_samples(0, &samples));
        assert_eq!(observer.state().ordering_violations(), 1);
    }

    #[test]
    fn test_second_run_without_table_is_counted() {
        let observer = attached_observer();
        let samples = point(0.0, 0.0);

        observer.begin_run();
        observer.on_thread_state(0, false);
        observer.on_init_data(0, VectorTable::from_names("tran1", ["time", "V(2)"]));
        observer.on_data(0, &DataPoint::from_samples(0, &samples));
        observer.on_thread_state(0, true);
        assert_eq!(observer.state().ordering_violations(), 0);

        observer.begin_run();
        observer.on_thread_state(0, false);
        observer.on_data(0, &DataPoint::from_samples(0, &samples));
        observer.on_init_data(0, VectorTable::from_names("tran2", ["time", "V(2)"]));
        assert_eq!(observer.state().ordering_violations(), 2);
    }

    #[test]
    fn test_thread_state_tracks_runs() {
        let observer = attached_observer();
        observer.on_thread_state(0, false);
        assert!(!observer.state().bg_idle());
        observer.on_thread_state(0, true);
        assert!(observer.state().quiescent());
        assert_eq!(observer.state().runs_started(), 1);
    }

    #[test]
    fn test_exit_kinds() {
        let observer = attached_observer();
        observer.on_exit(0, 1, false, false);
        let exit = observer.state().exit_request().unwrap();
        assert_eq!(exit.kind, ExitKind::Deferred);
        assert!(observer.state().pending_unload());

        observer.attach();
        observer.on_exit(0, 0, true, true);
        assert_eq!(observer.state().exit_request().unwrap().kind, ExitKind::Quit);

        observer.attach();
        observer.on_exit(0, 2, true, false);
        assert_eq!(
            observer.state().exit_request().unwrap().kind,
            ExitKind::Immediate
        );
    }

    #[test]
    fn test_capture_records_only_while_active() {
        let observer = attached_observer();
        observer.on_char(0, "stdout before");

        observer.begin_capture();
        observer.on_char(0, "stdout ** ngspice-42 : Circuit level simulation program");
        observer.on_char(0, "stderr warning: something");
        let captured = observer.take_capture();

        observer.on_char(0, "stdout after");

        assert_eq!(
            captured.stdout,
            vec!["** ngspice-42 : Circuit level simulation program"]
        );
        assert_eq!(captured.stderr, vec!["warning: something"]);
        assert!(observer.take_capture().stdout.is_empty());
    }

    #[test]
    fn test_detached_observer_counts_late_callbacks() {
        let observer = attached_observer();
        observer.detach();

        observer.on_thread_state(0, false);
        observer.on_char(0, "stdout late");

        assert!(observer.state().bg_idle());
        assert_eq!(observer.state().late_callbacks(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signalling_scenario_raises_armed_signal() {
        use crate::signal::SignalBridge;

        let bridge = SignalBridge::install(HaltSignal::User1).unwrap();
        let observer = std::sync::Arc::new(attached_observer());
        observer.reset_for_scenario(ScenarioId::SignalHalt);
        observer.arm_halt_signal(bridge.target(), HaltSignal::User1);
        observer.on_init_data(0, rc_table());

        let worker = std::sync::Arc::clone(&observer);
        std::thread::spawn(move || {
            let above = point(0.7, 0.55);
            worker.on_data(0, &DataPoint::from_samples(0, &above));
        })
        .join()
        .unwrap();

        tokio::time::timeout(Duration::from_secs(5), bridge.token().cancelled())
            .await
            .expect("halt signal not delivered");
        assert!(observer.state().break_reached());
    }
}
