pub mod simulator;

pub use simulator::{EngineFactory, Simulator};
