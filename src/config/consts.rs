/// Environment variable naming the engine module to load
pub const LIBRARY_ENV_VAR: &str = "NGSPICE_LIBRARY";
/// Longest command the engine interpreter accepts
pub const MAX_COMMAND_LENGTH: usize = 1023;

/// Readiness poll granularity
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
/// How long S1 lets the background run go before halting it
pub const DEFAULT_RUN_BEFORE_HALT_MS: u64 = 5_000;
/// Length of the S1 pause countdown
pub const DEFAULT_PAUSE_MS: u64 = 3_000;
/// Delay between `bg_resume` and the S1 plot queries
pub const DEFAULT_RESUME_SETTLE_MS: u64 = 1_000;
/// Deadline for a background worker to report it has started
pub const DEFAULT_START_TIMEOUT_MS: u64 = 5_000;
/// Deadline for a background worker to become quiescent
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 300_000;
/// Deadline for the engine to request exit after a failed parse
pub const DEFAULT_EXIT_TIMEOUT_MS: u64 = 10_000;

/// Vector watched for the threshold crossing
pub const DEFAULT_WATCH_VECTOR: &str = "V(2)";
/// Strict greater-than threshold on the real part of the watched vector
pub const DEFAULT_WATCH_THRESHOLD: f64 = 0.5;

/// Scenario ids run when no selector is configured
pub const DEFAULT_SCENARIOS: [u32; 4] = [1, 2, 3, 4];

/// How long the data callback steps aside after tripping the threshold
pub const DEFAULT_BREAK_YIELD_MS: u64 = 100;
