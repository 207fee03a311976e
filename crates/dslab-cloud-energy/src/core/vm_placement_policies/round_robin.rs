//! Round Robin algorithm.

use crate::core::common::Allocation;
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm_placement_policy::VmPlacementPolicy;

/// Walks the host list with a wrapping cursor and uses the first host with enough free PEs.
///
/// The cursor moves past every inspected host, so consecutive placements start from the host
/// following the previously selected one.
#[derive(Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }
}

impl VmPlacementPolicy for RoundRobin {
    fn select_host(&mut self, alloc: &Allocation, pool_state: &ResourcePoolState) -> Option<u32> {
        let hosts = pool_state.get_hosts_list();
        if hosts.is_empty() {
            return None;
        }
        for _ in 0..hosts.len() {
            let host = hosts[self.cursor % hosts.len()];
            self.cursor = (self.cursor + 1) % hosts.len();
            if pool_state.has_free_pes(alloc, host) {
                return Some(host);
            }
        }
        None
    }
}
