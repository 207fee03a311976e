//! Simple algorithm.

use crate::core::common::Allocation;
use crate::core::common::AllocationVerdict;
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm_placement_policy::VmPlacementPolicy;

/// Uses the first host in host list order which can fit the VM by all resources (PEs, RAM, bandwidth, storage).
#[derive(Default)]
pub struct Simple;

impl Simple {
    pub fn new() -> Self {
        Self {}
    }
}

impl VmPlacementPolicy for Simple {
    fn select_host(&mut self, alloc: &Allocation, pool_state: &ResourcePoolState) -> Option<u32> {
        pool_state
            .get_hosts_list()
            .into_iter()
            .find(|&host| pool_state.can_allocate(alloc, host) == AllocationVerdict::Success)
    }
}
