/*!
 * Process Module
 * Process descriptors and the entities the engines operate on
 */

pub mod context;
pub mod descriptor;
pub mod ledger;
pub mod scheduling;
pub mod types;

pub use context::RegisterContext;
pub use descriptor::{ProcessDescriptor, SchedulingParams};
pub use ledger::{LedgerAction, LedgerOutcome, LedgerPhase, LedgerRecord, ResourceLedger};
pub use scheduling::SchedulingInfo;
pub use types::{PriorityClass, ProcessState, SchedulingPolicy};
