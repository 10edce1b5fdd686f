/*!
 * Config Builder
 * Validation and construction of engines and descriptors from a document
 */

use super::model::{ProcessConfig, ResourceConfig, SimulationConfig};
use crate::banker::AllocationAuthority;
use crate::core::errors::{ConfigError, LedgerError};
use crate::core::types::SimResult;
use crate::process::{ProcessDescriptor, ProcessState, ResourceLedger, SchedulingParams};
use crate::resources::{ResourceTypes, ResourceVector};
use crate::scheduler::{Scheduler, SchedulerConfig};
use std::collections::HashSet;

impl SimulationConfig {
    /// Structural checks that do not need an engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_length == 0 {
            return Err(ConfigError::InvalidSimulation(
                "tick_length must be positive".to_string(),
            ));
        }

        let types = self.resource_types()?;
        let mut seen = HashSet::with_capacity(self.processes.len());
        for process in &self.processes {
            if !seen.insert(process.id) {
                return Err(ConfigError::DuplicateProcess(process.id));
            }
            process.validate(types.as_ref())?;
        }
        Ok(())
    }

    /// Resource type set, if the document declares one
    pub fn resource_types(&self) -> Result<Option<ResourceTypes>, ConfigError> {
        self.resources
            .as_ref()
            .map(|resources| ResourceTypes::new(resources.types.iter().cloned()))
            .transpose()
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            starvation_threshold: self.simulation.starvation_threshold,
            tick_length: self.simulation.tick_length,
        }
    }

    /// Scheduler with every configured process admitted in document order
    pub fn build_scheduler(&self) -> Result<Scheduler, ConfigError> {
        let mut scheduler = Scheduler::with_config(self.scheduler_config());
        for process in &self.processes {
            scheduler.admit(process.descriptor()?);
        }
        Ok(scheduler)
    }

    /// Allocation authority initialized from the resources section
    pub fn build_authority(&self) -> SimResult<AllocationAuthority> {
        let resources = self.resources.as_ref().ok_or(ConfigError::NoResourceTypes)?;
        let types = ResourceTypes::new(resources.types.iter().cloned())?;
        let available = resources.available_vector(&types)?;

        let processes = self
            .processes
            .iter()
            .map(|process| process.descriptor_with_ledger(&types))
            .collect::<Result<Vec<_>, _>>()?;

        let mut authority = AllocationAuthority::new(types);
        authority.initialize(available, processes)?;
        Ok(authority)
    }
}

impl ResourceConfig {
    pub fn available_vector(&self, types: &ResourceTypes) -> Result<ResourceVector, ConfigError> {
        types.vector_from_map(&self.available, "resources.available")
    }
}

impl ProcessConfig {
    fn validate(&self, types: Option<&ResourceTypes>) -> Result<(), ConfigError> {
        self.validate_scheduling()?;
        match (types, &self.resources) {
            (Some(types), Some(_)) => self.ledger(types).map(|_| ()),
            (None, Some(_)) => Err(ConfigError::ResourcesMissing(self.id)),
            (_, None) => Ok(()),
        }
    }

    fn validate_scheduling(&self) -> Result<(), ConfigError> {
        let scheduling = &self.scheduling;
        let message = if scheduling.total_need_time == 0 {
            "total_need_time must be positive"
        } else if scheduling.time_slice == 0 {
            "time_slice must be positive"
        } else {
            return Ok(());
        };
        Err(ConfigError::InvalidScheduling {
            pid: self.id,
            message: message.to_string(),
        })
    }

    pub fn scheduling_params(&self) -> SchedulingParams {
        let scheduling = &self.scheduling;
        SchedulingParams {
            total_need_time: scheduling.total_need_time,
            time_slice: scheduling.time_slice,
            priority: scheduling.priority,
            policy: scheduling.policy,
            preemptable: scheduling.preemptable,
            queue_level: scheduling.queue_level,
        }
    }

    /// Descriptor carrying only scheduling parameters
    pub fn descriptor(&self) -> Result<ProcessDescriptor, ConfigError> {
        self.validate_scheduling()?;
        Ok(ProcessDescriptor::new(self.id, self.name.clone(), self.scheduling_params())
            .with_state(self.state.unwrap_or(ProcessState::New)))
    }

    /// Descriptor with a Banker's ledger built against `types`
    pub fn descriptor_with_ledger(
        &self,
        types: &ResourceTypes,
    ) -> Result<ProcessDescriptor, ConfigError> {
        let ledger = self.ledger(types)?;
        Ok(self.descriptor()?.with_ledger(ledger))
    }

    fn ledger(&self, types: &ResourceTypes) -> Result<ResourceLedger, ConfigError> {
        let resources = self
            .resources
            .as_ref()
            .ok_or(ConfigError::ResourcesMissing(self.id))?;
        let context = format!("process {} max_demand", self.id);
        let max_demand = types.complete_vector_from_map(&resources.max_demand, &context)?;
        let context = format!("process {} allocation", self.id);
        let allocation = types.vector_from_map(&resources.allocation, &context)?;

        ResourceLedger::new(types, max_demand, allocation).map_err(|e| match e {
            LedgerError::Inconsistent {
                resource,
                allocation,
                max_demand,
                ..
            } => ConfigError::AllocationExceedsMaxDemand {
                pid: self.id,
                resource,
                allocation,
                max_demand,
            },
            LedgerError::DimensionMismatch { expected, actual } => {
                ConfigError::InvalidScheduling {
                    pid: self.id,
                    message: format!("resource vector has {actual} entries, expected {expected}"),
                }
            }
        })
    }
}
