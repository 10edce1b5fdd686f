/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Amount, Pid};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors, surfaced at load time and never silently defaulted
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Cannot read config {path}: {message}")]
    #[diagnostic(
        code(config::io),
        help("Check that the file exists and is readable.")
    )]
    Io { path: String, message: String },

    #[error("Malformed {format} config: {message}")]
    #[diagnostic(
        code(config::parse),
        help("Fix the syntax or the field named in the message.")
    )]
    Parse { format: String, message: String },

    #[error("Unsupported config format: {0}")]
    #[diagnostic(
        code(config::unsupported_format),
        help("Use a .json or .toml file.")
    )]
    UnsupportedFormat(String),

    #[error("Resource type set is empty")]
    #[diagnostic(code(config::no_resource_types))]
    NoResourceTypes,

    #[error("Resource type '{0}' declared more than once")]
    #[diagnostic(code(config::duplicate_resource_type))]
    DuplicateResourceType(String),

    #[error("Unknown resource type '{name}' in {context}")]
    #[diagnostic(
        code(config::unknown_resource_type),
        help("Every resource map must use only the types listed under resources.types.")
    )]
    UnknownResourceType { context: String, name: String },

    #[error("Resource type '{name}' missing from {context}")]
    #[diagnostic(
        code(config::missing_resource_type),
        help("Max demand must name every configured resource type.")
    )]
    MissingResourceType { context: String, name: String },

    #[error("Process {0} defined more than once")]
    #[diagnostic(code(config::duplicate_process))]
    DuplicateProcess(Pid),

    #[error("Process {pid}: allocation {allocation} of {resource} exceeds max demand {max_demand}")]
    #[diagnostic(code(config::allocation_exceeds_max))]
    AllocationExceedsMaxDemand {
        pid: Pid,
        resource: String,
        allocation: Amount,
        max_demand: Amount,
    },

    #[error("Process {pid}: {message}")]
    #[diagnostic(code(config::invalid_scheduling))]
    InvalidScheduling { pid: Pid, message: String },

    #[error("Process {0} declares resources but the config has no resources section")]
    #[diagnostic(code(config::resources_missing))]
    ResourcesMissing(Pid),

    #[error("Invalid simulation parameter: {0}")]
    #[diagnostic(code(config::invalid_simulation))]
    InvalidSimulation(String),
}

/// Ledger self-consistency violations
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LedgerError {
    #[error("{resource}: allocation {allocation} + need {need} != max demand {max_demand}")]
    #[diagnostic(
        code(ledger::inconsistent),
        help("This is a defect signal; the offending operation is rolled back.")
    )]
    Inconsistent {
        resource: String,
        allocation: Amount,
        need: Amount,
        max_demand: Amount,
    },

    #[error("Vector has {actual} entries, expected {expected}")]
    #[diagnostic(code(ledger::dimension_mismatch))]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Rejections from the allocation authority
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum AllocationError {
    #[error("Process {0} not found")]
    #[diagnostic(code(allocation::not_found))]
    ProcessNotFound(Pid),

    #[error("Process {0} is already registered")]
    #[diagnostic(code(allocation::duplicate_process))]
    DuplicateProcess(Pid),

    #[error("Vector has {actual} entries, expected {expected}")]
    #[diagnostic(code(allocation::dimension_mismatch))]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Requested {requested} of {resource} exceeds remaining need {need}")]
    #[diagnostic(
        code(allocation::exceeds_need),
        help("A process may never request more than it declared as max demand.")
    )]
    ExceedsNeed {
        resource: String,
        requested: Amount,
        need: Amount,
    },

    #[error("Requested {requested} of {resource} exceeds available {available}")]
    #[diagnostic(
        code(allocation::exceeds_available),
        help("The process is left waiting; retry after other processes release.")
    )]
    ExceedsAvailable {
        resource: String,
        requested: Amount,
        available: Amount,
    },

    #[error("Allocation {allocation} + {requested} of {resource} exceeds max demand {max_demand}")]
    #[diagnostic(code(allocation::exceeds_max_demand))]
    ExceedsMaxDemand {
        resource: String,
        allocation: Amount,
        requested: Amount,
        max_demand: Amount,
    },

    #[error("Releasing {released} of {resource} exceeds allocation {allocated}")]
    #[diagnostic(code(allocation::exceeds_allocation))]
    ExceedsAllocation {
        resource: String,
        released: Amount,
        allocated: Amount,
    },

    #[error("Max demand {demand} of {resource} exceeds system total {total}")]
    #[diagnostic(code(allocation::exceeds_system_total))]
    ExceedsSystemTotal {
        resource: String,
        demand: Amount,
        total: Amount,
    },

    #[error("Granting the request would leave the system unsafe")]
    #[diagnostic(
        code(allocation::unsafe_state),
        help("The provisional allocation was rolled back.")
    )]
    Unsafe,

    #[error("Ledger inconsistency: {0}")]
    #[diagnostic(code(allocation::inconsistent))]
    Inconsistent(LedgerError),
}

impl From<LedgerError> for AllocationError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DimensionMismatch { expected, actual } => {
                AllocationError::DimensionMismatch { expected, actual }
            }
            other => AllocationError::Inconsistent(other),
        }
    }
}

/// Unified simulator error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum SimError {
    #[error("Config error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Allocation error: {0}")]
    #[diagnostic(transparent)]
    Allocation(#[from] AllocationError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(sim::serialization))]
    Serialization(#[from] serde_json::Error),
}
