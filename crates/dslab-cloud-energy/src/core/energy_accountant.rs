//! Conversion of utilization samples and host alive time into power and energy figures.

use crate::core::datacenter::Datacenter;
use crate::core::error::NumericError;
use crate::core::host::Host;
use crate::core::vm::Vm;
use crate::report::{DatacenterRecord, HostRecord, VmRecord};
use crate::{log_trace, log_warn};

pub const WATT_SECONDS_PER_KWH: f64 = 3_600_000.;

/// Returns the value if it is finite.
pub fn ensure_finite(value: f64, what: &str) -> Result<f64, NumericError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumericError::NaNPropagation {
            what: what.to_string(),
            value,
        })
    }
}

/// Non-finite values are never reported, they are replaced with zero.
fn finite_or_zero(value: f64, what: &str, time: f64, component: &str) -> f64 {
    match ensure_finite(value, what) {
        Ok(value) => value,
        Err(e) => {
            log_warn!(time, component, "{}, reported as 0", e);
            0.
        }
    }
}

/// Records utilization sample of the host at the specified time.
pub fn record_sample(host: &mut Host, time: f64, utilization: f64) -> Result<(), NumericError> {
    host.record_utilization(time, utilization)
}

/// Host utilization computed from its VMs: sum of VM utilizations weighted by VM PEs divided by host PEs.
pub fn host_utilization<'a>(host: &Host, vms: impl Iterator<Item = &'a Vm>) -> f64 {
    if host.capacity.pes == 0 {
        return 0.;
    }
    let used: f64 = vms.map(|vm| vm.current_utilization() * vm.pes as f64).sum();
    (used / host.capacity.pes as f64).clamp(0., 1.)
}

/// Samples utilization of hosts and VMs which executed cloudlets during the last update.
/// Returns the number of sampled hosts.
pub fn sample(dc: &mut Datacenter, time: f64) -> usize {
    let name = dc.name.clone();
    let (hosts, vms) = dc.hosts_and_vms_mut();
    let mut sampled = 0;
    for host in hosts.values_mut() {
        if !host.vms().iter().any(|id| vms.get(id).map_or(false, |vm| vm.is_busy())) {
            continue;
        }
        let utilization = host_utilization(host, host.vms().iter().filter_map(|id| vms.get(id)));
        if let Err(e) = record_sample(host, time, utilization) {
            log_warn!(time, &name, "host #{} sample skipped: {}", host.id, e);
            continue;
        }
        for vm_id in host.vms() {
            if let Some(vm) = vms.get_mut(vm_id) {
                if vm.is_busy() {
                    let vm_utilization = vm.current_utilization();
                    if let Err(e) = vm.record_utilization(vm_utilization) {
                        log_warn!(time, &name, "vm #{} sample skipped: {}", vm.id, e);
                    }
                }
            }
        }
        log_trace!(time, &name, "host #{} utilization {:.3}", host.id, utilization);
        sampled += 1;
    }
    sampled
}

/// Mean host utilization for energy purposes, zero if the host was never sampled.
pub fn host_mean_utilization(host: &Host) -> f64 {
    host.utilization_stats().mean().unwrap_or(0.)
}

/// Power in W at the mean utilization of the host.
pub fn host_mean_power(host: &Host) -> f64 {
    host.power_model().get_power(host_mean_utilization(host))
}

/// Energy in W*s consumed by the host until `now`: mean power over alive time plus transition costs.
pub fn host_energy_ws(host: &Host, now: f64) -> f64 {
    host_mean_power(host) * host.alive_time(now) + host.transition_energy()
}

/// Detail record of the host state at `now`.
pub fn host_record(host: &Host, now: f64) -> HostRecord {
    let component = format!("host #{}", host.id);
    let finite = |value: f64, what: &str| finite_or_zero(value, what, now, &component);
    let energy_ws = finite(host_energy_ws(host, now), "host energy");
    HostRecord {
        host_id: host.id,
        ram_capacity: host.capacity.ram,
        bw_capacity: host.capacity.bw,
        storage_capacity: host.capacity.storage,
        pe_count: host.capacity.pes,
        utilization_percent: finite(host_mean_utilization(host) * 100., "host utilization"),
        watts_mean: finite(host_mean_power(host), "host power"),
        energy_watt_seconds: energy_ws,
        energy_kwh: energy_ws / WATT_SECONDS_PER_KWH,
        alive_time_seconds: host.alive_time(now),
        transition_energy_ws: host.transition_energy(),
        integrated_energy_ws: finite(host.energy_meter().energy_consumed(now), "integrated energy"),
    }
}

/// Power attributed to the VM: its share of the host static power plus the dynamic power of its own load.
///
/// The sum over co-located VMs only approximates the host power.
pub fn vm_attributed_power(vm: &Vm, host: &Host) -> f64 {
    let vm_count = host.vm_count().max(1) as f64;
    let static_power = host.power_model().static_power();
    let static_share = static_power / vm_count;
    let vm_utilization = vm.utilization_stats().mean().unwrap_or(0.);
    host.power_model().get_power(vm_utilization / vm_count) - static_power + static_share
}

pub fn vm_record(vm: &Vm, host: &Host, now: f64) -> VmRecord {
    let component = format!("vm #{}", vm.id);
    VmRecord {
        vm_id: vm.id,
        host_id: host.id,
        mean_utilization_percent: finite_or_zero(
            vm.utilization_stats().mean().unwrap_or(0.) * 100.,
            "vm utilization",
            now,
            &component,
        ),
        attributed_power_watts: finite_or_zero(vm_attributed_power(vm, host), "vm power", now, &component),
    }
}

/// Summary record of the datacenter state at `now`.
///
/// A datacenter without submitted cloudlets is charged the static power of all its hosts over the whole
/// elapsed time. The mean utilization is averaged over sampled hosts only.
pub fn datacenter_record(dc: &Datacenter, now: f64) -> DatacenterRecord {
    let total_energy_ws = if dc.submitted_count() == 0 {
        log_warn!(now, &dc.name, "no cloudlets were submitted, energy is computed from static power");
        dc.hosts().map(|h| h.power_model().static_power() * now).sum::<f64>()
    } else {
        dc.hosts().map(|h| host_record(h, now).energy_watt_seconds).sum::<f64>()
    };

    let sampled: Vec<f64> = dc.hosts().filter_map(|h| h.utilization_stats().mean()).collect();
    let mean_utilization = if sampled.is_empty() {
        0.
    } else {
        sampled.iter().sum::<f64>() / sampled.len() as f64
    };

    DatacenterRecord {
        datacenter_name: dc.name.clone(),
        total_hosts: dc.host_count(),
        total_vms: dc.vm_count(),
        total_tasks_submitted: dc.submitted_count(),
        mean_utilization_percent: finite_or_zero(mean_utilization * 100., "datacenter utilization", now, &dc.name),
        total_energy_kwh: finite_or_zero(
            total_energy_ws / WATT_SECONDS_PER_KWH,
            "datacenter energy",
            now,
            &dc.name,
        ),
    }
}

/// Detail records of all hosts of the datacenter.
pub fn host_records(dc: &Datacenter, now: f64) -> Vec<HostRecord> {
    dc.hosts().map(|h| host_record(h, now)).collect()
}

/// Records of all VMs of the datacenter.
pub fn vm_records(dc: &Datacenter, now: f64) -> Vec<VmRecord> {
    dc.vms()
        .filter_map(|vm| dc.host(vm.host_id()).map(|host| vm_record(vm, host, now)))
        .collect()
}
