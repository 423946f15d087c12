use crate::backends::ngspice::VectorData;
use crate::errors::{EngineError, EngineResult};
use crate::observation::Observer;
use std::sync::Arc;

/// Typed operations of one engine instance.
///
/// All calls are synchronous and must come from the supervisor thread. The
/// engine reports progress through the [`Observer`] it was instantiated with.
pub trait Simulator {
    /// Forward one interpreter command. The returned status is advisory.
    fn command(&mut self, text: &str) -> EngineResult<i32>;

    /// Issue a command and return the stdout lines it printed.
    fn exec_command(&mut self, text: &str) -> EngineResult<Vec<String>>;

    /// Hand the engine a circuit, one description line per entry.
    fn load_circuit(&mut self, lines: &[&str]) -> EngineResult<i32>;

    fn current_plot(&mut self) -> EngineResult<String>;

    fn all_plots(&mut self) -> EngineResult<Vec<String>>;

    fn all_vectors(&mut self, plot: &str) -> EngineResult<Vec<String>>;

    /// Copy a vector out of the engine. `name` may be plot-qualified (`tran1.V(2)`).
    fn vector_info(&mut self, name: &str) -> EngineResult<VectorData>;

    fn is_running(&mut self) -> EngineResult<bool>;

    /// Ask the engine to stop at simulation time `time`.
    fn set_breakpoint(&mut self, time: f64) -> EngineResult<bool>;

    /// Stop the background worker and release the engine. Idempotent.
    fn unload(&mut self);

    /// Where the engine came from, for logs.
    fn origin(&self) -> &str;

    /// `alter <device> <parameter> = <value>`
    fn alter_device(&mut self, device: &str, parameter: &str, value: &str) -> EngineResult<i32> {
        let command = format!("alter {} {} = {}", device.to_lowercase(), parameter, value);
        self.command(&command)
    }

    /// `altermod <model> <parameter> = <value>`
    fn alter_model(&mut self, model: &str, parameter: &str, value: &str) -> EngineResult<i32> {
        let command = format!("altermod {} {} = {}", model.to_lowercase(), parameter, value);
        self.command(&command)
    }
}

/// Produces fresh engine instances bound to an observer.
pub trait EngineFactory {
    fn instantiate(&self, observer: Arc<Observer>) -> Result<Box<dyn Simulator>, EngineError>;
}
