//! Tools for running experiments with multiple simulation runs.

use std::sync::{Arc, Mutex, PoisonError};

use dyn_clone::{clone_trait_object, DynClone};
use log::{error, info};
use threadpool::ThreadPool;

use crate::core::config::SimulationConfig;
use crate::core::error::Error;
use crate::report::SimulationReport;
use crate::simulation::CloudSimulation;

/// Trait for implementing custom callbacks for simulation runs within an experiment.
pub trait SimulationCallbacks: DynClone + Send {
    /// Runs before starting a simulation run.
    fn on_simulation_start(&mut self, _sim: &mut CloudSimulation) {}

    /// Runs upon the completion of a simulation run.
    fn on_simulation_finish(&mut self, _sim: &mut CloudSimulation, _report: &SimulationReport) {}
}

clone_trait_object!(SimulationCallbacks);

/// Callbacks which do nothing.
#[derive(Clone, Default)]
pub struct NoCallbacks;

impl SimulationCallbacks for NoCallbacks {}

/// Result of a single run: the name of its config and its report or error.
pub struct RunResult {
    pub id: usize,
    pub name: String,
    pub result: Result<SimulationReport, Error>,
}

/// Runs independent simulations, one per config, on a thread pool.
///
/// Simulations share no state, each one is created and dropped by the thread running it.
pub struct Experiment {
    pub runs: Vec<(String, SimulationConfig)>,
    pub callbacks: Box<dyn SimulationCallbacks>,
}

impl Experiment {
    pub fn new(callbacks: Box<dyn SimulationCallbacks>) -> Self {
        Self {
            runs: Vec::new(),
            callbacks,
        }
    }

    /// Adds a run with the specified name and config.
    pub fn add_run(&mut self, name: &str, config: SimulationConfig) {
        self.runs.push((name.to_string(), config));
    }

    /// Adds runs from config files named by their paths. Fails on the first invalid config.
    pub fn from_files(files: &[String], callbacks: Box<dyn SimulationCallbacks>) -> Result<Self, Error> {
        let mut experiment = Self::new(callbacks);
        for file in files {
            experiment.add_run(file, SimulationConfig::from_file(file)?);
        }
        Ok(experiment)
    }

    /// Runs the experiment using the specified number of threads. Results are ordered as the runs were added.
    ///
    /// A run which panicked has no result, the results of other runs are kept.
    pub fn run(&mut self, num_threads: usize) -> Vec<RunResult> {
        let results = Arc::new(Mutex::new(Vec::new()));
        let pool = ThreadPool::new(num_threads.max(1));

        for (run_id, (name, config)) in self.runs.iter().enumerate() {
            let name = name.clone();
            let config = config.clone();
            let mut callbacks = self.callbacks.clone();
            let results = results.clone();

            pool.execute(move || {
                info!("RUN {}: {}", run_id, name);
                let result = run_simulation(config, &mut callbacks);
                if let Err(e) = &result {
                    error!("RUN {} failed: {}", run_id, e);
                }
                results
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(RunResult {
                        id: run_id,
                        name,
                        result,
                    });
            });
        }

        pool.join();
        let mut results = std::mem::take(&mut *results.lock().unwrap_or_else(PoisonError::into_inner));
        results.sort_by_key(|r| r.id);
        for (run_id, (name, _)) in self.runs.iter().enumerate() {
            if results.iter().all(|r| r.id != run_id) {
                error!("RUN {} ({}) produced no result", run_id, name);
            }
        }
        results
    }
}

fn run_simulation(
    config: SimulationConfig,
    callbacks: &mut Box<dyn SimulationCallbacks>,
) -> Result<SimulationReport, Error> {
    let mut cloud_sim = CloudSimulation::new(config);
    callbacks.on_simulation_start(&mut cloud_sim);
    let report = cloud_sim.run()?;
    callbacks.on_simulation_finish(&mut cloud_sim, &report);
    Ok(report)
}
