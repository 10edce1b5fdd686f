/*!
 * Simulator Limits and Constants
 *
 * Centralized location for scheduler tunables and scoring constants.
 * Grouped by domain; the scheduler reads its defaults from here.
 */

// =============================================================================
// READY QUEUES
// =============================================================================

/// Number of ready queues (one per priority level, 0 is the most urgent)
pub const QUEUE_LEVELS: usize = 5;

/// Queue residency after which a ready process in a non-top queue is promoted
pub const DEFAULT_STARVATION_THRESHOLD: u64 = 2000;

/// Slice growth applied on multi-level feedback demotion (numerator / denominator = 1.5x)
pub const DEMOTION_SLICE_NUMERATOR: u64 = 3;
pub const DEMOTION_SLICE_DENOMINATOR: u64 = 2;

/// Default simulated time offered to the CPU per tick
pub const DEFAULT_TICK_LENGTH: u64 = 10;

// =============================================================================
// PROCESS DEFAULTS
// =============================================================================

/// Default required execution time for a process
pub const DEFAULT_TOTAL_NEED_TIME: u64 = 100;

/// Default time-slice budget
pub const DEFAULT_TIME_SLICE: u64 = 100;

// =============================================================================
// DYNAMIC PRIORITY SCORING
// =============================================================================

/// Upper bound of the dynamic priority score (lower is more urgent)
pub const MAX_DYNAMIC_PRIORITY: i64 = 99;

/// Weight of one static priority class in the dynamic score
pub const CLASS_WEIGHT: i64 = 10;

/// Interactivity score is scaled by this before being subtracted
pub const INTERACTIVE_WEIGHT: f64 = 5.0;

/// Average burst above which a process counts as CPU bound
pub const CPU_BOUND_BURST: f64 = 100.0;

/// Score penalty for CPU-bound processes
pub const CPU_BOUND_PENALTY: i64 = 2;

/// Residency in a non-top queue that earns the waiting bonus
pub const WAIT_BONUS_RESIDENCY: u64 = 1000;

/// Smoothing factor for the average CPU burst
pub const BURST_SMOOTHING: f64 = 0.3;

/// Bursts shorter than this look interactive
pub const SHORT_BURST: u64 = 10;

/// Bursts longer than this look CPU bound
pub const LONG_BURST: u64 = 100;
