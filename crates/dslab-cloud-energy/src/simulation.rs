//! Tick-driven cloud simulation.

use std::rc::Rc;

use sugars::rc;

use crate::core::config::SimulationConfig;
use crate::core::datacenter::Datacenter;
use crate::core::energy_accountant;
use crate::core::error::Error;
use crate::core::topology::build_datacenters;
use crate::core::workload_generator::WorkloadGenerator;
use crate::report::{DatacenterReport, SimulationReport};
use crate::{log_debug, log_info, log_warn};

/// Component driven by an external clock.
pub trait ClockDriven {
    /// Processes the clock tick at the specified time.
    fn on_tick(&mut self, time: f64) -> Result<(), Error>;

    /// Returns true if there is nothing left to simulate.
    fn on_completion_check(&self) -> bool;

    /// Finishes simulation. No ticks are processed afterwards.
    fn terminate(&mut self);
}

/// Sequential clock delivering ticks with a fixed step.
pub struct TickClock {
    step: f64,
    limit: Option<f64>,
    ticks: u64,
}

impl TickClock {
    /// Creates clock with the specified step in seconds and optional time limit.
    pub fn new(step: f64, limit: Option<f64>) -> Self {
        Self { step, limit, ticks: 0 }
    }

    /// Time of the next tick.
    pub fn time(&self) -> f64 {
        self.ticks as f64 * self.step
    }

    /// Delivers ticks starting from time 0 until the component completes or the time limit is reached,
    /// then terminates it. Returns the time of the last tick.
    pub fn run(&mut self, component: &mut dyn ClockDriven) -> Result<f64, Error> {
        loop {
            let time = self.time();
            component.on_tick(time)?;
            if component.on_completion_check() || self.limit.map_or(false, |limit| time >= limit) {
                component.terminate();
                return Ok(time);
            }
            self.ticks += 1;
        }
    }
}

/// Simulation of datacenters running generated workload.
///
/// Each tick runs workload generators, then advances cloudlet execution, then samples host utilization
/// in datacenters whose scheduling interval has elapsed.
pub struct CloudSimulation {
    sim_config: Rc<SimulationConfig>,
    datacenters: Vec<Datacenter>,
    generators: Vec<WorkloadGenerator>,
    next_cloudlet_id: u64,
    time: f64,
    terminated: bool,
}

impl CloudSimulation {
    /// Creates simulation with datacenters, hosts and VMs described in the config.
    pub fn new(sim_config: SimulationConfig) -> Self {
        let datacenters = build_datacenters(&sim_config, 0.);
        let generators = sim_config.datacenters.iter().map(WorkloadGenerator::new).collect();
        Self {
            sim_config: rc!(sim_config),
            datacenters,
            generators,
            next_cloudlet_id: 0,
            time: 0.,
            terminated: false,
        }
    }

    /// Creates simulation from config file.
    pub fn from_file(file_name: &str) -> Result<Self, Error> {
        Ok(Self::new(SimulationConfig::from_file(file_name)?))
    }

    pub fn sim_config(&self) -> Rc<SimulationConfig> {
        self.sim_config.clone()
    }

    /// Returns the time of the last processed tick.
    pub fn current_time(&self) -> f64 {
        self.time
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn datacenters(&self) -> &[Datacenter] {
        &self.datacenters
    }

    pub fn datacenter(&self, name: &str) -> Option<&Datacenter> {
        self.datacenters.iter().find(|dc| dc.name == name)
    }

    pub fn generators(&self) -> &[WorkloadGenerator] {
        &self.generators
    }

    /// Runs simulation with the clock from the config and returns the final report.
    pub fn run(&mut self) -> Result<SimulationReport, Error> {
        let mut clock = TickClock::new(self.sim_config.tick, self.sim_config.simulation_length);
        let end_time = clock.run(self)?;
        log_info!(end_time, "simulation", "simulation finished");
        Ok(self.report())
    }

    /// Builds report from the current state. Repeated calls give the same result.
    pub fn report(&self) -> SimulationReport {
        let datacenters = self
            .datacenters
            .iter()
            .map(|dc| DatacenterReport {
                summary: energy_accountant::datacenter_record(dc, self.time),
                hosts: energy_accountant::host_records(dc, self.time),
                vms: energy_accountant::vm_records(dc, self.time),
            })
            .collect();
        SimulationReport {
            time: self.time,
            datacenters,
        }
    }
}

impl ClockDriven for CloudSimulation {
    fn on_tick(&mut self, time: f64) -> Result<(), Error> {
        if self.terminated {
            log_warn!(time, "simulation", "tick after termination is ignored");
            return Ok(());
        }
        let delta = (time - self.time).max(0.);
        self.time = time;

        for (generator, dc) in self.generators.iter_mut().zip(self.datacenters.iter_mut()) {
            if !generator.is_exhausted() {
                generator.on_tick(time, dc, &mut self.next_cloudlet_id)?;
            }
        }

        for dc in self.datacenters.iter_mut() {
            let finished = dc.execute(time, delta);
            if finished > 0 {
                log_debug!(time, &dc.name, "{} cloudlets finished", finished);
            }
            if dc.sample_due(time) {
                energy_accountant::sample(dc, time);
                dc.mark_sampled(time);
            }
        }
        Ok(())
    }

    fn on_completion_check(&self) -> bool {
        self.generators.iter().all(|g| g.is_exhausted())
            && self.datacenters.iter().all(|dc| dc.all_submitted_terminal())
    }

    fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        for dc in self.datacenters.iter_mut() {
            let count = dc.shut_down(self.time);
            log_debug!(self.time, &dc.name, "{} hosts shut down", count);
        }
        self.terminated = true;
    }
}
