// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared observation record.
//!
//! Every field is a scalar atomic. Flags are stored with `Release` and loaded
//! with `Acquire`; the watch index is published before `watch_resolved` so a
//! reader that sees the flag also sees the index. No lock is ever held across
//! a callback boundary.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// How the engine asked to be torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitKind {
    /// `quit` command; a normal termination
    Quit,
    /// Unload at the next safe point
    Deferred,
    /// Stop the worker and unload now
    Immediate,
}

impl ExitKind {
    fn encode(kind: Option<ExitKind>) -> u8 {
        match kind {
            None => 0,
            Some(ExitKind::Quit) => 1,
            Some(ExitKind::Deferred) => 2,
            Some(ExitKind::Immediate) => 3,
        }
    }

    fn decode(raw: u8) -> Option<ExitKind> {
        match raw {
            1 => Some(ExitKind::Quit),
            2 => Some(ExitKind::Deferred),
            3 => Some(ExitKind::Immediate),
            _ => None,
        }
    }
}

/// Exit request recorded from the exit callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitRequest {
    pub kind: ExitKind,
    pub status: i32,
}

/// Process-wide observation state shared between the supervisor and the callbacks.
#[derive(Debug)]
pub struct ObservationState {
    bg_idle: AtomicBool,
    break_reached: AtomicBool,
    watch_index: AtomicUsize,
    watch_resolved: AtomicBool,
    last_watch_value: AtomicU64,
    scenario_id: AtomicU32,
    pending_unload: AtomicBool,
    exit_kind: AtomicU8,
    exit_status: AtomicI32,
    table_published: AtomicBool,
    run_has_data: AtomicBool,

    // Reset for every engine instance
    runs_started: AtomicU64,
    runs_finished: AtomicU64,

    total_runs_started: AtomicU64,
    total_runs_finished: AtomicU64,
    init_data_events: AtomicU64,
    data_points: AtomicU64,
    threshold_trips: AtomicU64,
    ordering_violations: AtomicU64,
    late_callbacks: AtomicU64,
}

impl Default for ObservationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservationState {
    pub fn new() -> Self {
        Self {
            bg_idle: AtomicBool::new(true),
            break_reached: AtomicBool::new(false),
            watch_index: AtomicUsize::new(0),
            watch_resolved: AtomicBool::new(false),
            last_watch_value: AtomicU64::new(0f64.to_bits()),
            scenario_id: AtomicU32::new(0),
            pending_unload: AtomicBool::new(false),
            exit_kind: AtomicU8::new(0),
            exit_status: AtomicI32::new(0),
            table_published: AtomicBool::new(false),
            run_has_data: AtomicBool::new(false),
            runs_started: AtomicU64::new(0),
            runs_finished: AtomicU64::new(0),
            total_runs_started: AtomicU64::new(0),
            total_runs_finished: AtomicU64::new(0),
            init_data_events: AtomicU64::new(0),
            data_points: AtomicU64::new(0),
            threshold_trips: AtomicU64::new(0),
            ordering_violations: AtomicU64::new(0),
            late_callbacks: AtomicU64::new(0),
        }
    }

    // Background worker

    pub fn bg_idle(&self) -> bool {
        self.bg_idle.load(Ordering::Acquire)
    }

    /// Publish a worker edge. Only the thread-state callback calls this.
    pub(crate) fn set_bg_idle(&self, idle: bool) {
        if idle {
            self.runs_finished.fetch_add(1, Ordering::AcqRel);
            self.total_runs_finished.fetch_add(1, Ordering::AcqRel);
        } else {
            self.runs_started.fetch_add(1, Ordering::AcqRel);
            self.total_runs_started.fetch_add(1, Ordering::AcqRel);
        }
        self.bg_idle.store(idle, Ordering::Release);
    }

    /// Worker starts reported by the current engine instance.
    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Acquire)
    }

    pub fn runs_finished(&self) -> u64 {
        self.runs_finished.load(Ordering::Acquire)
    }

    /// Worker starts across every engine instance.
    pub fn total_runs_started(&self) -> u64 {
        self.total_runs_started.load(Ordering::Acquire)
    }

    pub fn total_runs_finished(&self) -> u64 {
        self.total_runs_finished.load(Ordering::Acquire)
    }

    /// Worker reported idle and every run this engine started has also finished.
    pub fn quiescent(&self) -> bool {
        self.bg_idle() && self.runs_finished() >= self.runs_started()
    }

    // Threshold

    pub fn break_reached(&self) -> bool {
        self.break_reached.load(Ordering::Acquire)
    }

    /// Set the breakpoint flag; returns true only for the false -> true edge.
    pub(crate) fn trip_break(&self) -> bool {
        let tripped = self
            .break_reached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if tripped {
            self.threshold_trips.fetch_add(1, Ordering::AcqRel);
        }
        tripped
    }

    /// Supervisor-only: re-arm the threshold between scenarios.
    pub fn clear_break(&self) {
        self.break_reached.store(false, Ordering::Release);
    }

    pub fn threshold_trips(&self) -> u64 {
        self.threshold_trips.load(Ordering::Acquire)
    }

    // Watched vector

    /// Publish the index, then the flag that makes it visible.
    pub(crate) fn publish_watch_index(&self, index: usize) {
        self.watch_index.store(index, Ordering::Relaxed);
        self.watch_resolved.store(true, Ordering::Release);
    }

    /// Forget the resolved index at the start of a new simulation.
    pub(crate) fn reset_watch(&self) {
        self.watch_resolved.store(false, Ordering::Release);
        self.watch_index.store(0, Ordering::Relaxed);
    }

    /// The resolved index, if the current simulation contains the watched vector.
    pub fn watch_index(&self) -> Option<usize> {
        if self.watch_resolved.load(Ordering::Acquire) {
            Some(self.watch_index.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Raw index value regardless of resolution; 0 until first published.
    pub fn raw_watch_index(&self) -> usize {
        self.watch_index.load(Ordering::Acquire)
    }

    pub fn last_watch_value(&self) -> f64 {
        f64::from_bits(self.last_watch_value.load(Ordering::Acquire))
    }

    pub(crate) fn set_last_watch_value(&self, value: f64) {
        self.last_watch_value.store(value.to_bits(), Ordering::Release);
    }

    // Scenario selection

    pub fn scenario_id(&self) -> u32 {
        self.scenario_id.load(Ordering::Acquire)
    }

    pub fn set_scenario_id(&self, id: u32) {
        self.scenario_id.store(id, Ordering::Release);
    }

    // Exit and unload

    pub fn pending_unload(&self) -> bool {
        self.pending_unload.load(Ordering::Acquire)
    }

    pub(crate) fn record_exit(&self, kind: ExitKind, status: i32) {
        self.exit_status.store(status, Ordering::Relaxed);
        self.exit_kind.store(ExitKind::encode(Some(kind)), Ordering::Release);
        self.pending_unload.store(true, Ordering::Release);
    }

    pub fn exit_request(&self) -> Option<ExitRequest> {
        ExitKind::decode(self.exit_kind.load(Ordering::Acquire)).map(|kind| ExitRequest {
            kind,
            status: self.exit_status.load(Ordering::Relaxed),
        })
    }

    // Ordering bookkeeping

    /// Open a new simulation run; it expects exactly one vector table before data.
    ///
    /// A resumed worker continues the open run and does not call this.
    pub(crate) fn begin_run(&self) {
        self.table_published.store(false, Ordering::Release);
        self.run_has_data.store(false, Ordering::Release);
    }

    /// Count a vector table; returns false if the run already had a table or data.
    pub(crate) fn note_table_published(&self) -> bool {
        self.init_data_events.fetch_add(1, Ordering::AcqRel);
        let repeated = self.table_published.swap(true, Ordering::AcqRel);
        let ordered = !repeated && !self.run_has_data.load(Ordering::Acquire);
        if !ordered {
            self.ordering_violations.fetch_add(1, Ordering::AcqRel);
        }
        ordered
    }

    /// Count a data point; returns false if it arrived before the run's vector table.
    pub(crate) fn note_data_point(&self) -> bool {
        self.data_points.fetch_add(1, Ordering::AcqRel);
        self.run_has_data.store(true, Ordering::Release);
        let ordered = self.table_published.load(Ordering::Acquire);
        if !ordered {
            self.ordering_violations.fetch_add(1, Ordering::AcqRel);
        }
        ordered
    }

    pub(crate) fn note_late_callback(&self) {
        self.late_callbacks.fetch_add(1, Ordering::AcqRel);
    }

    pub fn init_data_events(&self) -> u64 {
        self.init_data_events.load(Ordering::Acquire)
    }

    pub fn data_points(&self) -> u64 {
        self.data_points.load(Ordering::Acquire)
    }

    pub fn ordering_violations(&self) -> u64 {
        self.ordering_violations.load(Ordering::Acquire)
    }

    pub fn late_callbacks(&self) -> u64 {
        self.late_callbacks.load(Ordering::Acquire)
    }

    /// Reset per-engine fields when a fresh engine instance is attached.
    ///
    /// A previous instance that never reported its last idle edge must not
    /// hold the new one's run counters apart. Totals and event counters
    /// survive re-instantiation.
    pub(crate) fn reset_for_engine(&self) {
        self.pending_unload.store(false, Ordering::Release);
        self.exit_kind.store(0, Ordering::Release);
        self.exit_status.store(0, Ordering::Relaxed);
        self.begin_run();
        self.runs_started.store(0, Ordering::Release);
        self.runs_finished.store(0, Ordering::Release);
        self.bg_idle.store(true, Ordering::Release);
        self.reset_watch();
    }

    pub fn snapshot(&self) -> ObservationSnapshot {
        ObservationSnapshot {
            bg_idle: self.bg_idle(),
            break_reached: self.break_reached(),
            watch_index: self.watch_index(),
            last_watch_value: self.last_watch_value(),
            scenario_id: self.scenario_id(),
            pending_unload: self.pending_unload(),
            exit: self.exit_request(),
            runs_started: self.total_runs_started(),
            runs_finished: self.total_runs_finished(),
            init_data_events: self.init_data_events(),
            data_points: self.data_points(),
            threshold_trips: self.threshold_trips(),
            ordering_violations: self.ordering_violations(),
            late_callbacks: self.late_callbacks(),
        }
    }
}

/// Point-in-time copy of the observation state, for reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationSnapshot {
    pub bg_idle: bool,
    pub break_reached: bool,
    pub watch_index: Option<usize>,
    pub last_watch_value: f64,
    pub scenario_id: u32,
    pub pending_unload: bool,
    pub exit: Option<ExitRequest>,
    pub runs_started: u64,
    pub runs_finished: u64,
    pub init_data_events: u64,
    pub data_points: u64,
    pub threshold_trips: u64,
    pub ordering_violations: u64,
    pub late_callbacks: u64,
}
