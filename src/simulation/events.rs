/*!
 * Event Outcomes
 * What happened when a scripted event was applied
 */

use crate::config::EventAction;
use crate::core::serde::is_none;
use crate::core::types::Pid;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventOutcome {
    pub round: u64,
    pub action: &'static str,
    pub process_id: Pid,
    pub accepted: bool,
    #[serde(skip_serializing_if = "is_none")]
    pub reason: Option<String>,
}

impl EventOutcome {
    pub fn new<E: ToString>(round: u64, action: &EventAction, result: Result<(), E>) -> Self {
        let (accepted, reason) = match result {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        };
        Self {
            round,
            action: action.name(),
            process_id: action.process_id(),
            accepted,
            reason,
        }
    }
}

impl EventAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Request { .. } => "REQUEST",
            Self::Release { .. } => "RELEASE",
            Self::AddProcess { .. } => "ADD_PROCESS",
            Self::RemoveProcess { .. } => "REMOVE_PROCESS",
            Self::ChangePriority { .. } => "CHANGE_PRIORITY",
        }
    }

    /// Process the event targets
    pub fn process_id(&self) -> Pid {
        match self {
            Self::Request { process_id, .. }
            | Self::Release { process_id, .. }
            | Self::RemoveProcess { process_id }
            | Self::ChangePriority { process_id, .. } => *process_id,
            Self::AddProcess { process } => process.id,
        }
    }
}
