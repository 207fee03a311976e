//! Random algorithm.

use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::core::common::Allocation;
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm_placement_policy::VmPlacementPolicy;

/// Selects uniformly at random among the hosts with enough free PEs.
pub struct RandomPlacement {
    rand: Pcg64,
}

impl RandomPlacement {
    pub fn new(seed: u64) -> Self {
        Self {
            rand: Pcg64::seed_from_u64(seed),
        }
    }
}

impl VmPlacementPolicy for RandomPlacement {
    fn select_host(&mut self, alloc: &Allocation, pool_state: &ResourcePoolState) -> Option<u32> {
        let suitable: Vec<u32> = pool_state
            .get_hosts_list()
            .into_iter()
            .filter(|&host| pool_state.has_free_pes(alloc, host))
            .collect();
        suitable.choose(&mut self.rand).copied()
    }
}
