//! Construction of datacenters with their hosts and VMs.

use crate::core::config::SimulationConfig;
use crate::core::datacenter::Datacenter;
use crate::{log_debug, log_info, log_warn};

/// Hands out host and VM IDs which are unique within the simulation.
#[derive(Default)]
pub struct IdGenerator {
    next_host_id: u32,
    next_vm_id: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_host_id(&mut self) -> u32 {
        let id = self.next_host_id;
        self.next_host_id += 1;
        id
    }

    pub fn next_vm_id(&mut self) -> u32 {
        let id = self.next_vm_id;
        self.next_vm_id += 1;
        id
    }
}

/// Builds all datacenters described in the config at the specified time.
///
/// VMs which can't be placed are dropped: their IDs are not reused and they do not appear in the datacenter.
pub fn build_datacenters(config: &SimulationConfig, time: f64) -> Vec<Datacenter> {
    let mut ids = IdGenerator::new();
    let mut datacenters = Vec::with_capacity(config.datacenters.len());
    for (index, spec) in config.datacenters.iter().enumerate() {
        let mut dc = Datacenter::new(index, spec.clone(), config.seed);
        for _ in 0..spec.host_count {
            dc.add_host(ids.next_host_id());
        }
        let mut dropped = 0;
        for _ in 0..spec.vm.count {
            let vm_id = ids.next_vm_id();
            if let Err(e) = dc.create_vm(vm_id, time) {
                log_warn!(time, &dc.name, "vm #{} is dropped: {}", vm_id, e);
                dropped += 1;
            }
        }
        log_info!(
            time,
            &dc.name,
            "created {} hosts and {} vms ({} dropped) with {} placement",
            dc.host_count(),
            dc.vm_count(),
            dropped,
            spec.placement_policy
        );
        if dc.vm_count() == 0 {
            log_warn!(time, &dc.name, "datacenter has no vms, its cloudlets can't be bound");
        }
        for host in dc.hosts().filter(|h| h.vm_count() > 0) {
            log_debug!(time, &dc.name, "host #{} runs vms {:?}", host.id, host.vms());
        }
        datacenters.push(dc);
    }
    datacenters
}
