//! Representation of virtual machine.

use crate::core::cloudlet_scheduler::CloudletScheduler;
use crate::core::common::Allocation;
use crate::core::error::NumericError;
use crate::core::utilization_stats::UtilizationStats;

/// Represents virtual machine (VM).
///
/// VM exists only after it was placed, so its host never changes (there is no migration).
/// Cloudlets bound to the VM are executed by its cloudlet scheduler.
#[derive(Clone)]
pub struct Vm {
    pub id: u32,
    pub pes: u32,
    pub ram: u64,
    pub bw: u64,
    pub storage: u64,
    host_id: u32,
    scheduler: CloudletScheduler,
    utilization: UtilizationStats,
}

impl Vm {
    /// Creates VM placed on the specified host.
    pub fn new(alloc: &Allocation, host_id: u32, scheduler: CloudletScheduler) -> Self {
        Self {
            id: alloc.id,
            pes: alloc.pes,
            ram: alloc.ram,
            bw: alloc.bw,
            storage: alloc.storage,
            host_id,
            scheduler,
            utilization: UtilizationStats::new(),
        }
    }

    pub fn host_id(&self) -> u32 {
        self.host_id
    }

    pub fn scheduler(&self) -> &CloudletScheduler {
        &self.scheduler
    }

    pub(crate) fn scheduler_mut(&mut self) -> &mut CloudletScheduler {
        &mut self.scheduler
    }

    /// Returns true if some cloudlets were executed on the VM during the last update.
    pub fn is_busy(&self) -> bool {
        self.scheduler.was_busy()
    }

    /// Current utilization clamped to `[0, 1]`.
    pub fn current_utilization(&self) -> f64 {
        self.scheduler.utilization()
    }

    pub fn utilization_stats(&self) -> &UtilizationStats {
        &self.utilization
    }

    pub(crate) fn record_utilization(&mut self, utilization: f64) -> Result<(), NumericError> {
        self.utilization.add(utilization)
    }
}
