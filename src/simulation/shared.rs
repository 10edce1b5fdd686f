/*!
 * Shared Engines
 * Mutex-guarded handles for callers that drive an engine from several places
 */

use crate::banker::{AllocationAuthority, SafetyReport, StateSnapshot};
use crate::core::errors::AllocationError;
use crate::core::types::{Pid, SimTime};
use crate::process::{PriorityClass, ProcessDescriptor};
use crate::resources::ResourceVector;
use crate::scheduler::{Scheduler, SchedulerStatus};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Cloneable scheduler handle; every call holds the lock for its duration
#[derive(Clone)]
pub struct SharedScheduler {
    inner: Arc<Mutex<Scheduler>>,
}

impl SharedScheduler {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    pub fn admit(&self, process: ProcessDescriptor) {
        self.inner.lock().admit(process);
    }

    pub fn tick(&self, time_budget: SimTime) -> Option<Pid> {
        self.inner.lock().tick(time_budget)
    }

    pub fn remove(&self, pid: Pid) -> Option<ProcessDescriptor> {
        self.inner.lock().remove(pid)
    }

    pub fn set_priority(&self, pid: Pid, priority: PriorityClass) -> bool {
        self.inner.lock().set_priority(pid, priority)
    }

    pub fn status(&self) -> SchedulerStatus {
        self.inner.lock().status()
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut Scheduler) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

/// Cloneable allocation authority handle
#[derive(Clone)]
pub struct SharedAllocator {
    inner: Arc<Mutex<AllocationAuthority>>,
}

impl SharedAllocator {
    pub fn new(authority: AllocationAuthority) -> Self {
        Self {
            inner: Arc::new(Mutex::new(authority)),
        }
    }

    pub fn request(&self, pid: Pid, request: &ResourceVector) -> Result<(), AllocationError> {
        self.inner.lock().request_resources(pid, request)
    }

    pub fn release(&self, pid: Pid, release: &ResourceVector) -> Result<(), AllocationError> {
        self.inner.lock().release_resources(pid, release)
    }

    pub fn add_process(&self, process: ProcessDescriptor) -> Result<(), AllocationError> {
        self.inner.lock().add_process(process)
    }

    pub fn remove_process(&self, pid: Pid) -> Result<ProcessDescriptor, AllocationError> {
        self.inner.lock().remove_process(pid)
    }

    pub fn safety_check(&self) -> SafetyReport {
        self.inner.lock().safety_check()
    }

    pub fn detect_deadlock(&self) -> BTreeSet<Pid> {
        self.inner.lock().detect_deadlock()
    }

    pub fn available(&self) -> ResourceVector {
        self.inner.lock().available().clone()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.inner.lock().snapshot()
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut AllocationAuthority) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
