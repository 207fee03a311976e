//! First Fit algorithm.

use crate::core::common::Allocation;
use crate::core::common::AllocationVerdict;
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm_placement_policy::VmPlacementPolicy;

/// Uses the first host in ascending ID order with enough free processing elements.
///
/// By default only PEs are checked. [`FirstFit::with_all_resources`] creates a variant
/// which also checks RAM, bandwidth and storage.
#[derive(Default)]
pub struct FirstFit {
    check_all_resources: bool,
}

impl FirstFit {
    pub fn new() -> Self {
        Self {
            check_all_resources: false,
        }
    }

    pub fn with_all_resources() -> Self {
        Self {
            check_all_resources: true,
        }
    }
}

impl VmPlacementPolicy for FirstFit {
    fn select_host(&mut self, alloc: &Allocation, pool_state: &ResourcePoolState) -> Option<u32> {
        pool_state.get_hosts_by_id().into_iter().find(|&host| {
            if self.check_all_resources {
                pool_state.can_allocate(alloc, host) == AllocationVerdict::Success
            } else {
                pool_state.has_free_pes(alloc, host)
            }
        })
    }
}
