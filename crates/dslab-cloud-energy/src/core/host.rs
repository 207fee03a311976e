//! Physical host state.

use crate::core::energy_meter::EnergyMeter;
use crate::core::error::NumericError;
use crate::core::power_model::HostPowerModel;
use crate::core::resource_pool::HostCapacity;
use crate::core::utilization_stats::UtilizationStats;

/// Represents physical host.
///
/// Host becomes active when the first VM is placed on it and stays active until shut down
/// at the end of simulation.
#[derive(Clone)]
pub struct Host {
    pub id: u32,
    pub capacity: HostCapacity,
    power_model: HostPowerModel,
    first_active_time: Option<f64>,
    shutdown_time: Option<f64>,
    vms: Vec<u32>,
    utilization: UtilizationStats,
    energy_meter: EnergyMeter,
    transition_energy: f64,
}

impl Host {
    pub fn new(id: u32, capacity: HostCapacity, power_model: HostPowerModel) -> Self {
        Self {
            id,
            capacity,
            power_model,
            first_active_time: None,
            shutdown_time: None,
            vms: Vec::new(),
            utilization: UtilizationStats::new(),
            energy_meter: EnergyMeter::new(),
            transition_energy: 0.,
        }
    }

    pub fn power_model(&self) -> &HostPowerModel {
        &self.power_model
    }

    pub fn first_active_time(&self) -> Option<f64> {
        self.first_active_time
    }

    pub fn is_active(&self) -> bool {
        self.first_active_time.is_some() && self.shutdown_time.is_none()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown_time.is_some()
    }

    /// IDs of VMs placed on the host in placement order.
    pub fn vms(&self) -> &[u32] {
        &self.vms
    }

    pub fn vm_count(&self) -> usize {
        self.vms.len()
    }

    pub fn utilization_stats(&self) -> &UtilizationStats {
        &self.utilization
    }

    pub fn energy_meter(&self) -> &EnergyMeter {
        &self.energy_meter
    }

    /// Startup and shutdown energy in W*s.
    pub fn transition_energy(&self) -> f64 {
        self.transition_energy
    }

    /// Time in seconds elapsed since activation until `now` or until shutdown, whichever is earlier.
    pub fn alive_time(&self, now: f64) -> f64 {
        match self.first_active_time {
            Some(start) => {
                let end = self.shutdown_time.map_or(now, |t| t.min(now));
                (end - start).max(0.)
            }
            None => 0.,
        }
    }

    /// Activates host at the specified time. Repeated calls have no effect.
    pub fn activate(&mut self, time: f64) {
        if self.first_active_time.is_some() {
            return;
        }
        self.first_active_time = Some(time);
        self.transition_energy += self.power_model.startup_energy();
        self.energy_meter.start(time, self.power_model.static_power());
    }

    pub(crate) fn attach_vm(&mut self, vm_id: u32, time: f64) {
        self.activate(time);
        self.vms.push(vm_id);
    }

    pub(crate) fn record_utilization(&mut self, time: f64, utilization: f64) -> Result<(), NumericError> {
        self.utilization.add(utilization)?;
        self.energy_meter.update(time, self.power_model.get_power(utilization));
        Ok(())
    }

    /// Shuts down active host. Returns false if the host was never activated or is already shut down.
    pub(crate) fn shut_down(&mut self, time: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        self.shutdown_time = Some(time);
        self.transition_energy += self.power_model.shutdown_energy();
        self.energy_meter.update(time, 0.);
        true
    }
}
