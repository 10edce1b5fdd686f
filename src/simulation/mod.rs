/*!
 * Simulation Drivers
 * Round-based runners over the scheduler and the allocation authority
 */

mod banker;
mod events;
mod scheduler;
mod shared;

pub use banker::{BankerRound, BankerSimulation};
pub use events::EventOutcome;
pub use scheduler::{ScheduleTrace, SchedulerSimulation};
pub use shared::{SharedAllocator, SharedScheduler};
