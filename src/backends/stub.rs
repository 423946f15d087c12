// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scripted in-process engine for tests.
//!
//! [`ScriptedEngine`] understands the handful of interpreter commands the
//! supervisor issues and simulates the RC charging circuit on a worker thread,
//! reporting through the [`Observer`] exactly as the shared library does:
//! thread-state changes, one vector table per run, one data point per step and
//! an exit request when a circuit fails to parse.

use crate::backends::ngspice::vector::VF_REAL;
use crate::backends::ngspice::{VectorData, VectorValues};
use crate::errors::{EngineError, EngineResult};
use crate::observation::{DataPoint, Observer, VectorSample, VectorTable, VectorValue};
use crate::traits::{EngineFactory, Simulator};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const ENGINE_ID: i32 = 0;
const PLOT: &str = "tran1";
const VECTORS: [&str; 3] = ["time", "V(1)", "V(2)"];
const RESISTANCE: f64 = 1.0;
const SOURCE_VOLTAGE: f64 = 1.0;

/// Step size, stop time and wall-clock pacing of the scripted transient.
#[derive(Debug, Clone)]
pub struct ScriptedTiming {
    pub step: f64,
    pub stop: f64,
    pub point_delay: Duration,
}

impl Default for ScriptedTiming {
    fn default() -> Self {
        Self {
            step: 0.01,
            stop: 3.0,
            point_delay: Duration::from_millis(1),
        }
    }
}

/// Callback a scripted worker delivered. Runs of data points collapse to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    ThreadStarted,
    InitData,
    Data,
    ThreadIdle,
}

/// Every command any scripted engine from one factory received, in order,
/// and the callbacks their workers delivered.
#[derive(Debug, Default)]
pub struct CommandJournal {
    commands: Mutex<Vec<String>>,
    events: Mutex<Vec<EngineEvent>>,
}

impl CommandJournal {
    fn record(&self, command: &str) {
        lock(&self.commands).push(command.to_string());
    }

    fn record_event(&self, event: EngineEvent) {
        let mut events = lock(&self.events);
        if event == EngineEvent::Data && events.last() == Some(&EngineEvent::Data) {
            return;
        }
        events.push(event);
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        lock(&self.events).clone()
    }

    pub fn commands(&self) -> Vec<String> {
        lock(&self.commands).clone()
    }

    pub fn contains(&self, command: &str) -> bool {
        lock(&self.commands).iter().any(|c| c == command)
    }

    pub fn count_of(&self, command: &str) -> usize {
        lock(&self.commands).iter().filter(|c| *c == command).count()
    }
}

#[derive(Debug)]
struct Transient {
    time: f64,
    voltage: f64,
    capacitance: f64,
    history: Vec<(f64, f64)>,
    breakpoint: Option<f64>,
}

impl Transient {
    fn new() -> Self {
        Self {
            time: 0.0,
            voltage: 0.0,
            capacitance: 1.0,
            history: Vec::new(),
            breakpoint: None,
        }
    }

    fn restart(&mut self) {
        self.time = 0.0;
        self.voltage = 0.0;
        self.history.clear();
    }

    /// Accept the next timepoint, or `None` when the run is over.
    fn advance(&mut self, timing: &ScriptedTiming) -> Option<(usize, f64, f64)> {
        if let Some(stop_at) = self.breakpoint {
            if self.time >= stop_at {
                self.breakpoint = None;
                return None;
            }
        }
        if !self.history.is_empty() {
            if self.time >= timing.stop - timing.step / 2.0 {
                return None;
            }
            let tau = RESISTANCE * self.capacitance;
            self.voltage =
                SOURCE_VOLTAGE - (SOURCE_VOLTAGE - self.voltage) * (-timing.step / tau).exp();
            self.time += timing.step;
        }
        self.history.push((self.time, self.voltage));
        Some((self.history.len() - 1, self.time, self.voltage))
    }

    fn column(&self, vector: &str) -> Option<Vec<f64>> {
        let pick: fn(&(f64, f64)) -> f64 = match canonical(vector)? {
            "time" => |p: &(f64, f64)| p.0,
            "V(1)" => |_: &(f64, f64)| SOURCE_VOLTAGE,
            _ => |p: &(f64, f64)| p.1,
        };
        Some(self.history.iter().map(pick).collect())
    }
}

struct Shared {
    transient: Mutex<Transient>,
    stop: AtomicBool,
}

/// In-process stand-in for the shared library.
pub struct ScriptedEngine {
    observer: Arc<Observer>,
    shared: Arc<Shared>,
    timing: ScriptedTiming,
    journal: Arc<CommandJournal>,
    worker: Option<JoinHandle<()>>,
    pending_lines: Vec<String>,
    circuit: Vec<String>,
    has_run: bool,
    unloaded: bool,
}

impl ScriptedEngine {
    pub fn new(observer: Arc<Observer>, timing: ScriptedTiming, journal: Arc<CommandJournal>) -> Self {
        Self {
            observer,
            shared: Arc::new(Shared {
                transient: Mutex::new(Transient::new()),
                stop: AtomicBool::new(false),
            }),
            timing,
            journal,
            worker: None,
            pending_lines: Vec::new(),
            circuit: Vec::new(),
            has_run: false,
            unloaded: false,
        }
    }

    fn ensure_live(&self) -> EngineResult<()> {
        if self.unloaded {
            return Err(EngineError::Unloaded);
        }
        if let Some(exit) = self.observer.state().exit_request() {
            return Err(EngineError::Exited {
                status: exit.status,
            });
        }
        Ok(())
    }

    fn stdout(&self, text: &str) {
        self.observer.on_char(ENGINE_ID, &format!("stdout {}", text));
    }

    fn stderr(&self, text: &str) {
        self.observer.on_char(ENGINE_ID, &format!("stderr {}", text));
    }

    fn worker_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Start the worker. A fresh run publishes `table` once the thread is up;
    /// a resumed one passes `None` and continues the open run.
    fn spawn_worker(&mut self, table: Option<VectorTable>) {
        self.join_worker();
        self.shared.stop.store(false, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let observer = Arc::clone(&self.observer);
        let journal = Arc::clone(&self.journal);
        let timing = self.timing.clone();
        self.worker = Some(thread::spawn(move || {
            journal.record_event(EngineEvent::ThreadStarted);
            observer.on_thread_state(ENGINE_ID, false);
            if let Some(table) = table {
                journal.record_event(EngineEvent::InitData);
                observer.on_init_data(ENGINE_ID, table);
            }
            run_points(&shared, &observer, &journal, &timing);
            journal.record_event(EngineEvent::ThreadIdle);
            observer.on_thread_state(ENGINE_ID, true);
        }));
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn halt(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        self.join_worker();
    }

    fn bg_run(&mut self) -> i32 {
        if self.circuit.is_empty() {
            self.stderr("Error: there aren't any circuits loaded.");
            return 1;
        }
        if self.worker_running() {
            self.stderr("Warning: cannot execute \"bg_run\", type \"bg_halt\" first");
            return 1;
        }
        lock(&self.shared.transient).restart();
        let mut table = VectorTable::from_names(PLOT, VECTORS);
        table.title = self.circuit[0].clone();
        table.plot_type = "tran".to_string();
        self.has_run = true;
        self.spawn_worker(Some(table));
        0
    }

    fn bg_resume(&mut self) -> i32 {
        if !self.has_run {
            self.stderr("Error: no simulation to resume");
            return 1;
        }
        if self.worker_running() {
            return 1;
        }
        self.spawn_worker(None);
        0
    }

    fn circuit_line(&mut self, line: &str) -> i32 {
        self.pending_lines.push(line.to_string());
        if line.trim().eq_ignore_ascii_case(".end") {
            let lines = std::mem::take(&mut self.pending_lines);
            return self.accept_circuit(lines);
        }
        0
    }

    fn accept_circuit(&mut self, lines: Vec<String>) -> i32 {
        let missing = lines.iter().find_map(|line| {
            let target = line.trim().strip_prefix(".include")?.trim();
            (!Path::new(target).exists()).then(|| target.to_string())
        });
        if let Some(target) = missing {
            self.stderr(&format!("Error: Could not find include file {}", target));
            self.stderr("Error: ngspice.dll cannot recover and awaits to be detached");
            self.observer.on_exit(ENGINE_ID, 1, false, false);
            return 1;
        }
        self.circuit = lines;
        self.stdout("Circuit loaded");
        0
    }

    fn source(&mut self, path: &str) -> i32 {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let lines = text.lines().map(str::to_string).collect();
                self.accept_circuit(lines)
            }
            Err(error) => {
                self.stderr(&format!("Error: Could not open {}: {}", path, error));
                1
            }
        }
    }

    fn alter(&mut self, args: &str) -> i32 {
        let parsed = args.split_once('=').and_then(|(lhs, rhs)| {
            let device = lhs.split_whitespace().next()?;
            let value: f64 = rhs.trim().parse().ok()?;
            Some((device.to_string(), value))
        });
        match parsed {
            Some((device, value)) if device.eq_ignore_ascii_case("c1") && value > 0.0 => {
                lock(&self.shared.transient).capacitance = value;
                0
            }
            _ => {
                self.stderr(&format!("Error: cannot alter '{}'", args));
                1
            }
        }
    }

    fn alter_model(&mut self, args: &str) -> i32 {
        let model = args.split_whitespace().next().unwrap_or_default();
        self.stderr(&format!("Error: could not find model {}", model));
        1
    }

    fn write(&mut self, args: &str) -> i32 {
        let mut tokens = args.split_whitespace();
        let Some(path) = tokens.next() else {
            self.stderr("Error: write needs a file name");
            return 1;
        };
        let requested: Vec<&str> = tokens.collect();
        let requested = if requested.is_empty() {
            VECTORS[1..].to_vec()
        } else {
            requested
        };

        let text = {
            let transient = lock(&self.shared.transient);
            let mut columns = Vec::new();
            for name in std::iter::once("time").chain(requested.iter().copied()) {
                match transient.column(name) {
                    Some(values) => columns.push((name, values)),
                    None => {
                        drop(transient);
                        self.stderr(&format!("Error: no such vector {}", name));
                        return 1;
                    }
                }
            }
            raw_ascii(&self.circuit_title(), &columns, transient.history.len())
        };

        match std::fs::write(path, text) {
            Ok(()) => 0,
            Err(error) => {
                self.stderr(&format!("Error: cannot write {}: {}", path, error));
                1
            }
        }
    }

    fn circuit_title(&self) -> String {
        self.circuit.first().cloned().unwrap_or_default()
    }

    fn dispatch(&mut self, text: &str) -> i32 {
        let text = text.trim();
        let (verb, args) = text
            .split_once(char::is_whitespace)
            .map(|(verb, args)| (verb, args.trim()))
            .unwrap_or((text, ""));
        match verb.to_ascii_lowercase().as_str() {
            "bg_run" => self.bg_run(),
            "bg_halt" => {
                self.halt();
                0
            }
            "bg_resume" => self.bg_resume(),
            "circbyline" => self.circuit_line(args),
            "source" => self.source(args),
            "alter" => self.alter(args),
            "altermod" => self.alter_model(args),
            "write" => self.write(args),
            "echo" => {
                self.stdout(args);
                0
            }
            "listing" => {
                for (n, line) in self.circuit.clone().iter().enumerate() {
                    self.stdout(&format!("{:>6} : {}", n + 1, line));
                }
                0
            }
            "set" | "unset" => 0,
            _ => {
                self.stderr(&format!("{}: no such command available in ngspice", verb));
                1
            }
        }
    }
}

impl Simulator for ScriptedEngine {
    fn command(&mut self, text: &str) -> EngineResult<i32> {
        self.ensure_live()?;
        self.journal.record(text);
        Ok(self.dispatch(text))
    }

    fn exec_command(&mut self, text: &str) -> EngineResult<Vec<String>> {
        self.observer.begin_capture();
        let result = self.command(text);
        let captured = self.observer.take_capture();
        result?;
        Ok(captured.stdout)
    }

    fn load_circuit(&mut self, lines: &[&str]) -> EngineResult<i32> {
        self.ensure_live()?;
        self.pending_lines.clear();
        let lines = lines.iter().map(|l| l.to_string()).collect();
        Ok(self.accept_circuit(lines))
    }

    fn current_plot(&mut self) -> EngineResult<String> {
        self.ensure_live()?;
        Ok(if self.has_run { PLOT } else { "const" }.to_string())
    }

    fn all_plots(&mut self) -> EngineResult<Vec<String>> {
        self.ensure_live()?;
        let mut plots = vec!["const".to_string()];
        if self.has_run {
            plots.insert(0, PLOT.to_string());
        }
        Ok(plots)
    }

    fn all_vectors(&mut self, plot: &str) -> EngineResult<Vec<String>> {
        self.ensure_live()?;
        if self.has_run && plot == PLOT {
            return Ok(VECTORS.iter().map(|v| v.to_string()).collect());
        }
        Err(EngineError::NoData {
            operation: format!("vectors of plot '{}'", plot),
        })
    }

    fn vector_info(&mut self, name: &str) -> EngineResult<VectorData> {
        self.ensure_live()?;
        let vector = match name.split_once('.') {
            Some((plot, vector)) if plot == PLOT => vector,
            _ => name,
        };
        let values = lock(&self.shared.transient).column(vector);
        match (values, canonical(vector)) {
            (Some(values), Some(canonical)) => Ok(VectorData {
                name: canonical.to_string(),
                vector_type: if canonical == "time" { 1 } else { 3 },
                flags: VF_REAL,
                values: VectorValues::Real(values),
            }),
            _ => Err(EngineError::NoData {
                operation: format!("vector '{}'", name),
            }),
        }
    }

    fn is_running(&mut self) -> EngineResult<bool> {
        self.ensure_live()?;
        Ok(self.worker_running())
    }

    fn set_breakpoint(&mut self, time: f64) -> EngineResult<bool> {
        self.ensure_live()?;
        lock(&self.shared.transient).breakpoint = Some(time);
        Ok(true)
    }

    fn unload(&mut self) {
        if self.unloaded {
            return;
        }
        self.halt();
        self.observer.detach();
        self.unloaded = true;
    }

    fn origin(&self) -> &str {
        "scripted"
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Produces [`ScriptedEngine`]s sharing one command journal.
#[derive(Default)]
pub struct ScriptedFactory {
    timing: ScriptedTiming,
    journal: Arc<CommandJournal>,
    instances: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(timing: ScriptedTiming) -> Self {
        Self {
            timing,
            ..Self::default()
        }
    }

    pub fn journal(&self) -> Arc<CommandJournal> {
        Arc::clone(&self.journal)
    }

    /// Shared counter of engines handed out so far.
    pub fn instances(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.instances)
    }
}

impl EngineFactory for ScriptedFactory {
    fn instantiate(&self, observer: Arc<Observer>) -> Result<Box<dyn Simulator>, EngineError> {
        observer.attach();
        self.instances.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedEngine::new(
            observer,
            self.timing.clone(),
            Arc::clone(&self.journal),
        )))
    }
}

fn run_points(
    shared: &Shared,
    observer: &Observer,
    journal: &CommandJournal,
    timing: &ScriptedTiming,
) {
    while !shared.stop.load(Ordering::Acquire) {
        let Some((index, time, voltage)) = lock(&shared.transient).advance(timing) else {
            break;
        };
        let samples = [
            VectorSample::new("time", VectorValue::scale(time)),
            VectorSample::new("V(1)", VectorValue::real(SOURCE_VOLTAGE)),
            VectorSample::new("V(2)", VectorValue::real(voltage)),
        ];
        journal.record_event(EngineEvent::Data);
        observer.on_data(ENGINE_ID, &DataPoint::from_samples(index as i32, &samples));
        thread::sleep(timing.point_delay);
    }
}

fn canonical(vector: &str) -> Option<&'static str> {
    VECTORS
        .iter()
        .copied()
        .find(|v| v.eq_ignore_ascii_case(vector))
}

fn raw_ascii(title: &str, columns: &[(&str, Vec<f64>)], points: usize) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Title: {}", title);
    let _ = writeln!(text, "Date: scripted");
    let _ = writeln!(text, "Plotname: Transient Analysis");
    let _ = writeln!(text, "Flags: real");
    let _ = writeln!(text, "No. Variables: {}", columns.len());
    let _ = writeln!(text, "No. Points: {}", points);
    let _ = writeln!(text, "Variables:");
    for (i, (name, _)) in columns.iter().enumerate() {
        let kind = if *name == "time" { "time" } else { "voltage" };
        let _ = writeln!(text, "\t{}\t{}\t{}", i, name, kind);
    }
    let _ = writeln!(text, "Values:");
    for point in 0..points {
        for (i, (_, values)) in columns.iter().enumerate() {
            if i == 0 {
                let _ = writeln!(text, " {}\t{:e}", point, values[point]);
            } else {
                let _ = writeln!(text, "\t{:e}", values[point]);
            }
        }
        text.push('\n');
    }
    text
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::WatchPolicy;
    use crate::raw::RawFile;

    fn engine() -> (ScriptedEngine, Arc<Observer>) {
        let observer = Arc::new(Observer::new(WatchPolicy::new("V(2)", 0.5)));
        observer.attach();
        let engine = ScriptedEngine::new(
            Arc::clone(&observer),
            ScriptedTiming {
                point_delay: Duration::ZERO,
                ..ScriptedTiming::default()
            },
            Arc::new(CommandJournal::default()),
        );
        (engine, observer)
    }

    fn paced_engine() -> (ScriptedEngine, Arc<Observer>) {
        let observer = Arc::new(Observer::new(WatchPolicy::new("V(2)", 0.5)));
        observer.attach();
        let engine = ScriptedEngine::new(
            Arc::clone(&observer),
            ScriptedTiming::default(),
            Arc::new(CommandJournal::default()),
        );
        (engine, observer)
    }

    fn wait_idle(engine: &ScriptedEngine) {
        while engine.worker_running() {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_run_trips_threshold_and_writes_raw() {
        let (mut engine, observer) = engine();
        engine.load_circuit(&crate::supervisor::RC_CIRCUIT).unwrap();
        engine.command("bg_run").unwrap();
        wait_idle(&engine);

        assert!(observer.state().break_reached());
        assert_eq!(observer.state().runs_started(), 1);
        assert_eq!(observer.state().ordering_violations(), 0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rc.raw");
        engine
            .command(&format!("write {} V(2)", path.display()))
            .unwrap();
        let raw = RawFile::read(&path).unwrap();
        assert_eq!(raw.points, 301);
        assert!(raw.column("v(2)").unwrap().last().unwrap() > 0.9);
    }

    #[test]
    fn test_broken_include_requests_exit() {
        let (mut engine, observer) = engine();
        for line in crate::supervisor::BAD_INCLUDE_CIRCUIT {
            engine.command(&format!("circbyline {}", line)).unwrap();
        }
        assert!(observer.state().pending_unload());
        assert!(matches!(
            engine.command("bg_run"),
            Err(EngineError::Exited { status: 1 })
        ));
    }

    #[test]
    fn test_exec_command_captures_listing() {
        let (mut engine, _observer) = engine();
        engine.load_circuit(&crate::supervisor::RC_CIRCUIT).unwrap();
        let listing = engine.exec_command("listing").unwrap();
        assert_eq!(listing.len(), crate::supervisor::RC_CIRCUIT.len());
        assert!(listing[0].ends_with("test array"));
    }

    #[test]
    fn test_alter_slows_charging() {
        let (mut engine, _observer) = engine();
        engine.load_circuit(&crate::supervisor::RC_CIRCUIT).unwrap();
        engine.command("alter c1=2").unwrap();
        engine.command("bg_run").unwrap();
        wait_idle(&engine);

        let v2 = engine.vector_info("tran1.V(2)").unwrap();
        let expected = 1.0 - (-3.0f64 / 2.0).exp();
        assert!((v2.last_real().unwrap() - expected).abs() < 1e-6);
        assert_eq!(engine.command("alter r9=1").unwrap(), 1);
    }

    #[test]
    fn test_unload_detaches_observer() {
        let (mut engine, observer) = engine();
        engine.unload();
        assert!(!observer.is_attached());
        assert!(matches!(engine.command("echo hi"), Err(EngineError::Unloaded)));
    }

    #[test]
    fn test_callbacks_follow_engine_order() {
        let (mut engine, observer) = engine();
        engine.load_circuit(&crate::supervisor::RC_CIRCUIT).unwrap();
        engine.set_breakpoint(0.5).unwrap();
        observer.begin_run();
        engine.command("bg_run").unwrap();
        wait_idle(&engine);
        engine.command("bg_resume").unwrap();
        wait_idle(&engine);

        assert_eq!(
            engine.journal.events(),
            vec![
                EngineEvent::ThreadStarted,
                EngineEvent::InitData,
                EngineEvent::Data,
                EngineEvent::ThreadIdle,
                EngineEvent::ThreadStarted,
                EngineEvent::Data,
                EngineEvent::ThreadIdle,
            ]
        );
        assert_eq!(observer.state().init_data_events(), 1);
        assert_eq!(observer.state().ordering_violations(), 0);
    }

    #[test]
    fn test_alter_device_and_model_command_text() {
        let (mut engine, _observer) = engine();
        engine.load_circuit(&crate::supervisor::RC_CIRCUIT).unwrap();

        assert_eq!(engine.alter_device("C1", "capacitance", "2").unwrap(), 0);
        assert!(engine.journal.contains("alter c1 capacitance = 2"));
        assert_eq!(lock(&engine.shared.transient).capacitance, 2.0);

        assert_eq!(Simulator::alter_model(&mut engine, "RMOD", "r", "2").unwrap(), 1);
        assert!(engine.journal.contains("altermod rmod r = 2"));
    }

    #[test]
    fn test_plot_list_before_and_after_run() {
        let (mut engine, _observer) = engine();
        engine.load_circuit(&crate::supervisor::RC_CIRCUIT).unwrap();
        assert_eq!(engine.all_plots().unwrap(), vec!["const"]);
        assert_eq!(engine.current_plot().unwrap(), "const");

        engine.command("bg_run").unwrap();
        wait_idle(&engine);

        assert_eq!(engine.all_plots().unwrap(), vec!["tran1", "const"]);
        assert_eq!(engine.all_vectors("tran1").unwrap(), vec!["time", "V(1)", "V(2)"]);
        assert!(matches!(
            engine.all_vectors("ac1"),
            Err(EngineError::NoData { .. })
        ));
    }

    #[test]
    fn test_is_running_tracks_worker() {
        let (mut engine, _observer) = paced_engine();
        engine.load_circuit(&crate::supervisor::RC_CIRCUIT).unwrap();
        assert!(!engine.is_running().unwrap());

        engine.command("bg_run").unwrap();
        assert!(engine.is_running().unwrap());

        engine.command("bg_halt").unwrap();
        assert!(!engine.is_running().unwrap());
    }

    #[test]
    fn test_breakpoint_stops_run_until_resumed() {
        let (mut engine, observer) = engine();
        engine.load_circuit(&crate::supervisor::RC_CIRCUIT).unwrap();
        assert!(engine.set_breakpoint(1.0).unwrap());

        engine.command("bg_run").unwrap();
        wait_idle(&engine);
        let time = engine.vector_info("time").unwrap();
        let stopped_at = time.last_real().unwrap();
        assert!((0.99..1.02).contains(&stopped_at), "stopped at {}", stopped_at);
        assert!(observer.state().quiescent());

        engine.command("bg_resume").unwrap();
        wait_idle(&engine);
        let time = engine.vector_info("time").unwrap();
        assert!(time.last_real().unwrap() > 2.9);
    }
}
