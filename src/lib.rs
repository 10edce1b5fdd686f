/*!
 * OS Resource-Control Simulator
 * Multi-queue preemptive scheduler and Banker's-algorithm allocation authority
 */

pub mod banker;
pub mod config;
pub mod core;
pub mod monitoring;
pub mod process;
pub mod resources;
pub mod scheduler;
pub mod simulation;

// Re-exports
pub use banker::{AllocationAuthority, ProcessSnapshot, RequestCounts, SafetyReport, StateSnapshot};
pub use config::{load as load_config, SimulationConfig};
pub use crate::core::errors::{AllocationError, ConfigError, LedgerError, SimError};
pub use crate::core::types::{Amount, Pid, SimResult, SimTime};
pub use monitoring::init_tracing;
pub use process::{
    PriorityClass, ProcessDescriptor, ProcessState, ResourceLedger, SchedulingInfo,
    SchedulingParams, SchedulingPolicy,
};
pub use resources::{ResourceId, ResourceTypes, ResourceVector};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerStatus};
pub use simulation::{BankerSimulation, SchedulerSimulation, SharedAllocator, SharedScheduler};
