//! Datacenter: hosts, VMs placed on them and cloudlets bound to VMs.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;
use rand::prelude::*;
use rand_pcg::Pcg64;
use sugars::{rc, refcell};

use crate::core::cloudlet::{Cloudlet, CloudletRequest};
use crate::core::cloudlet_scheduler::CloudletScheduler;
use crate::core::common::Allocation;
use crate::core::config::DatacenterSpec;
use crate::core::error::PlacementError;
use crate::core::host::Host;
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm::Vm;
use crate::core::vm_placement_policy::{place, VmPlacementPolicy};
use crate::{log_debug, log_trace, log_warn};

/// Offset of the seed of utilization models random source from the placement policy seed.
const UTILIZATION_SEED_OFFSET: u64 = 1000;

/// Represents datacenter, a named group of hosts under one VM placement policy.
///
/// Host membership is fixed at creation. VMs are placed once and never migrate.
pub struct Datacenter {
    pub index: usize,
    pub name: String,
    spec: DatacenterSpec,
    hosts: IndexMap<u32, Host>,
    vms: BTreeMap<u32, Vm>,
    pool_state: ResourcePoolState,
    placement_policy: Box<dyn VmPlacementPolicy>,
    utilization_rand: Rc<RefCell<Pcg64>>,
    binding_cursor: usize,
    submitted: BTreeSet<u64>,
    terminal: BTreeSet<u64>,
    finished: Vec<Cloudlet>,
    failed: Vec<Cloudlet>,
    delivered_senders: HashSet<u64>,
    last_sample_time: Option<f64>,
}

impl Datacenter {
    /// Creates datacenter without hosts.
    ///
    /// Random sources of the placement policy and utilization models are derived from `seed` and `index`.
    pub fn new(index: usize, spec: DatacenterSpec, seed: u64) -> Self {
        let policy_seed = seed.wrapping_add(index as u64);
        Self {
            index,
            name: spec.name.clone(),
            placement_policy: spec.placement_policy.build(policy_seed),
            utilization_rand: rc!(refcell!(Pcg64::seed_from_u64(
                policy_seed.wrapping_add(UTILIZATION_SEED_OFFSET)
            ))),
            spec,
            hosts: IndexMap::new(),
            vms: BTreeMap::new(),
            pool_state: ResourcePoolState::new(),
            binding_cursor: 0,
            submitted: BTreeSet::new(),
            terminal: BTreeSet::new(),
            finished: Vec::new(),
            failed: Vec::new(),
            delivered_senders: HashSet::new(),
            last_sample_time: None,
        }
    }

    pub fn spec(&self) -> &DatacenterSpec {
        &self.spec
    }

    /// Adds host with capacity and power model from the datacenter spec.
    pub fn add_host(&mut self, id: u32) {
        let capacity = self.spec.host.capacity();
        self.pool_state.add_host(id, capacity.clone());
        self.hosts.insert(id, Host::new(id, capacity, self.spec.power.build()));
    }

    /// Places new VM with resources from the datacenter spec and returns the ID of selected host.
    ///
    /// On failure nothing is changed, the VM does not exist.
    pub fn create_vm(&mut self, vm_id: u32, time: f64) -> Result<u32, PlacementError> {
        let alloc = Allocation {
            id: vm_id,
            pes: self.spec.vm.pes,
            ram: self.spec.vm.ram,
            bw: self.spec.vm.bw,
            storage: self.spec.vm.storage,
        };
        let host_id = place(self.placement_policy.as_mut(), &alloc, &self.pool_state)?;
        let host = self.hosts.get_mut(&host_id).ok_or(PlacementError::NoCapacity {
            vm_id,
            requested_pes: alloc.pes,
        })?;
        self.pool_state.allocate(&alloc, host_id);
        host.attach_vm(vm_id, time);
        let scheduler = CloudletScheduler::new(self.spec.cloudlet_scheduler, alloc.pes, host.capacity.mips);
        self.vms.insert(vm_id, Vm::new(&alloc, host_id, scheduler));
        log_debug!(time, &self.name, "vm #{} placed on host #{}", vm_id, host_id);
        Ok(host_id)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    pub fn host(&self, id: u32) -> Option<&Host> {
        self.hosts.get(&id)
    }

    /// Gives access to host state for activation and sampling.
    pub fn host_mut(&mut self, id: u32) -> Option<&mut Host> {
        self.hosts.get_mut(&id)
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn vms(&self) -> impl Iterator<Item = &Vm> {
        self.vms.values()
    }

    pub fn vm(&self, id: u32) -> Option<&Vm> {
        self.vms.get(&id)
    }

    pub fn vm_count(&self) -> usize {
        self.vms.len()
    }

    pub fn pool_state(&self) -> &ResourcePoolState {
        &self.pool_state
    }

    pub(crate) fn hosts_and_vms_mut(&mut self) -> (&mut IndexMap<u32, Host>, &mut BTreeMap<u32, Vm>) {
        (&mut self.hosts, &mut self.vms)
    }

    /// Returns the VM the next cloudlet is bound to. VMs are taken in round-robin order by ID.
    pub fn next_vm_for_binding(&mut self) -> Option<u32> {
        if self.vms.is_empty() {
            return None;
        }
        let vm_id = self.vms.keys().nth(self.binding_cursor % self.vms.len()).copied();
        self.binding_cursor += 1;
        vm_id
    }

    /// Binds cloudlet to the next VM and submits it. Returns the ID of the VM or `None` if there are no VMs.
    pub fn submit(&mut self, request: CloudletRequest, time: f64) -> Option<u32> {
        let vm_id = self.next_vm_for_binding()?;
        let vm = self.vms.get_mut(&vm_id)?;
        let cloudlet_id = request.id;
        let model = self.spec.utilization_model.build(self.utilization_rand.clone());
        let cloudlet = Cloudlet::new(request, vm_id, time, model);
        self.submitted.insert(cloudlet_id);
        if let Err(cloudlet) = vm.scheduler_mut().submit(cloudlet, time) {
            log_warn!(
                time,
                &self.name,
                "cloudlet #{} requests {} PEs and can never fit vm #{} with {} PEs",
                cloudlet_id,
                cloudlet.pes,
                vm_id,
                vm.pes
            );
            self.terminal.insert(cloudlet_id);
            self.failed.push(cloudlet);
        } else {
            log_trace!(time, &self.name, "cloudlet #{} submitted to vm #{}", cloudlet_id, vm_id);
        }
        Some(vm_id)
    }

    /// Advances execution of cloudlets on all VMs by `delta` seconds ending at `time`.
    ///
    /// Packets of senders which finished during this update are delivered in the same update.
    pub fn execute(&mut self, time: f64, delta: f64) -> usize {
        let mut finished = Vec::new();
        for vm in self.vms.values_mut() {
            finished.extend(vm.scheduler_mut().update(time, delta));
        }
        for cloudlet in finished.iter().filter(|c| c.is_sender()) {
            self.delivered_senders.insert(cloudlet.id);
        }
        for vm in self.vms.values_mut() {
            finished.extend(vm.scheduler_mut().deliver_packets(time, &self.delivered_senders));
        }

        let count = finished.len();
        for cloudlet in finished {
            log_trace!(time, &self.name, "cloudlet #{} finished on vm #{}", cloudlet.id, cloudlet.vm_id());
            self.terminal.insert(cloudlet.id);
            self.finished.push(cloudlet);
        }
        count
    }

    /// Checks whether the scheduling interval has elapsed since the last sampling.
    pub fn sample_due(&self, time: f64) -> bool {
        self.last_sample_time
            .map_or(true, |last| time - last >= self.spec.scheduling_interval - 1e-9)
    }

    pub fn mark_sampled(&mut self, time: f64) {
        self.last_sample_time = Some(time);
    }

    /// Shuts down all active hosts, returns the number of hosts shut down.
    pub fn shut_down(&mut self, time: f64) -> usize {
        let mut count = 0;
        for host in self.hosts.values_mut() {
            if host.shut_down(time) {
                count += 1;
            }
        }
        count
    }

    /// IDs of all submitted cloudlets.
    pub fn submitted(&self) -> &BTreeSet<u64> {
        &self.submitted
    }

    /// IDs of cloudlets which are finished or failed.
    pub fn terminal(&self) -> &BTreeSet<u64> {
        &self.terminal
    }

    pub fn submitted_count(&self) -> u64 {
        self.submitted.len() as u64
    }

    pub fn finished(&self) -> &[Cloudlet] {
        &self.finished
    }

    pub fn failed(&self) -> &[Cloudlet] {
        &self.failed
    }

    /// Returns true if every submitted cloudlet reached a terminal state.
    pub fn all_submitted_terminal(&self) -> bool {
        self.submitted.is_subset(&self.terminal)
    }
}
