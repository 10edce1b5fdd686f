/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
pub type Pid = u32;

/// Point on the simulated timeline, in abstract time units
pub type SimTime = u64;

/// Amount of a single resource type
pub type Amount = u32;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimError>;
