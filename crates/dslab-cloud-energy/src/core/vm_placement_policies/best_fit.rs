//! Best Fit algorithm.

use crate::core::common::Allocation;
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm_placement_policy::VmPlacementPolicy;

/// Uses the suitable host with the least free PEs left after placement, ties are broken by the lowest host ID.
#[derive(Default)]
pub struct BestFit;

impl BestFit {
    pub fn new() -> Self {
        Self {}
    }
}

impl VmPlacementPolicy for BestFit {
    fn select_host(&mut self, alloc: &Allocation, pool_state: &ResourcePoolState) -> Option<u32> {
        let mut result: Option<u32> = None;
        let mut min_leftover_pes: u32 = u32::MAX;

        for host in pool_state.get_hosts_by_id() {
            if pool_state.has_free_pes(alloc, host) {
                let leftover = pool_state.get_available_pes(host) - alloc.pes;
                if leftover < min_leftover_pes {
                    min_leftover_pes = leftover;
                    result = Some(host);
                }
            }
        }
        result
    }
}
