//! Resource pool state used by VM placement policies.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::core::common::{Allocation, AllocationVerdict};

/// Host resource capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct HostCapacity {
    /// Number of processing elements.
    pub pes: u32,
    /// Processing rate of a single PE in MIPS.
    pub mips: f64,
    pub ram: u64,
    pub bw: u64,
    pub storage: u64,
}

/// Stores host capacity and state (allocated resources, current allocations).
#[derive(Clone)]
pub struct HostInfo {
    pub capacity: HostCapacity,

    pub pes_allocated: u32,
    pub ram_allocated: u64,
    pub bw_allocated: u64,
    pub storage_allocated: u64,

    pub allocations: BTreeMap<u32, Allocation>,
}

impl HostInfo {
    pub fn new(capacity: HostCapacity) -> Self {
        Self {
            capacity,
            pes_allocated: 0,
            ram_allocated: 0,
            bw_allocated: 0,
            storage_allocated: 0,
            allocations: BTreeMap::new(),
        }
    }

    pub fn pes_available(&self) -> u32 {
        self.capacity.pes.saturating_sub(self.pes_allocated)
    }

    pub fn ram_available(&self) -> u64 {
        self.capacity.ram.saturating_sub(self.ram_allocated)
    }

    pub fn bw_available(&self) -> u64 {
        self.capacity.bw.saturating_sub(self.bw_allocated)
    }

    pub fn storage_available(&self) -> u64 {
        self.capacity.storage.saturating_sub(self.storage_allocated)
    }
}

/// Allocation state of the hosts of one datacenter.
///
/// Hosts are kept in the order they were added (the host list order).
#[derive(Clone, Default)]
pub struct ResourcePoolState {
    hosts: IndexMap<u32, HostInfo>,
}

impl ResourcePoolState {
    /// Creates empty resource pool state.
    pub fn new() -> Self {
        Self { hosts: IndexMap::new() }
    }

    /// Adds host to resource pool.
    pub fn add_host(&mut self, id: u32, capacity: HostCapacity) {
        self.hosts.insert(id, HostInfo::new(capacity));
    }

    /// Returns IDs of all hosts in host list order.
    pub fn get_hosts_list(&self) -> Vec<u32> {
        self.hosts.keys().cloned().collect()
    }

    /// Returns IDs of all hosts in ascending order.
    pub fn get_hosts_by_id(&self) -> Vec<u32> {
        let mut ids = self.get_hosts_list();
        ids.sort_unstable();
        ids
    }

    /// Checks if the host has enough free processing elements for the allocation.
    /// Other resources are not checked.
    pub fn has_free_pes(&self, alloc: &Allocation, host_id: u32) -> bool {
        self.hosts
            .get(&host_id)
            .map_or(false, |host| host.pes_available() >= alloc.pes)
    }

    /// Checks if the specified allocation fits the host by all resources.
    pub fn can_allocate(&self, alloc: &Allocation, host_id: u32) -> AllocationVerdict {
        let host = match self.hosts.get(&host_id) {
            Some(host) => host,
            None => return AllocationVerdict::HostNotFound,
        };
        if host.pes_available() < alloc.pes {
            return AllocationVerdict::NotEnoughPes;
        }
        if host.ram_available() < alloc.ram {
            return AllocationVerdict::NotEnoughRam;
        }
        if host.bw_available() < alloc.bw {
            return AllocationVerdict::NotEnoughBandwidth;
        }
        if host.storage_available() < alloc.storage {
            return AllocationVerdict::NotEnoughStorage;
        }
        AllocationVerdict::Success
    }

    /// Applies the specified allocation on the specified host.
    ///
    /// Resources which were not checked by the placement policy may become overcommitted,
    /// the available amount is then reported as zero.
    pub fn allocate(&mut self, alloc: &Allocation, host_id: u32) {
        if let Some(host) = self.hosts.get_mut(&host_id) {
            if host.allocations.contains_key(&alloc.id) {
                return;
            }
            host.pes_allocated += alloc.pes;
            host.ram_allocated += alloc.ram;
            host.bw_allocated += alloc.bw;
            host.storage_allocated += alloc.storage;
            host.allocations.insert(alloc.id, alloc.clone());
        }
    }

    /// Returns the number of free PEs of the specified host.
    pub fn get_available_pes(&self, host_id: u32) -> u32 {
        self.hosts.get(&host_id).map_or(0, |host| host.pes_available())
    }
}
