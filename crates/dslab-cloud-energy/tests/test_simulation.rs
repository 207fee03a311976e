use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_abs_diff_eq;

use dslab_cloud_energy::core::cloudlet::{CloudletKind, CloudletStatus};
use dslab_cloud_energy::core::config::PowerModelSpec;
use dslab_cloud_energy::core::power_model::MeasuredPowerModel;
use dslab_cloud_energy::core::utilization_model::UtilizationModelKind;
use dslab_cloud_energy::experiment::{Experiment, NoCallbacks, SimulationCallbacks};
use dslab_cloud_energy::{ClockDriven, CloudSimulation, SimulationConfig, SimulationReport};

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

fn run(file_name: &str) -> (CloudSimulation, SimulationReport) {
    let mut sim = CloudSimulation::from_file(&name_wrapper(file_name)).unwrap();
    let report = sim.run().unwrap();
    (sim, report)
}

#[test]
fn test_single_datacenter() {
    let (sim, report) = run("config.yaml");
    assert!(sim.is_terminated());
    assert_eq!(sim.current_time(), 3.);
    assert_eq!(report.time, 3.);

    let dc = sim.datacenter("dc1").unwrap();
    assert_eq!(dc.finished().len(), 4);
    assert!(dc.failed().is_empty());
    assert!(dc.all_submitted_terminal());
    assert!(sim.generators().iter().all(|g| g.is_exhausted()));
    assert_eq!(sim.generators()[0].generated(), 4);
    assert_eq!(sim.generators()[0].rate(), 2);
    assert_eq!(sim.sim_config().seed, 123);
    assert_eq!(dc.spec().name, "dc1");
    assert!(dc.hosts().all(|host| host.is_shut_down() && !host.is_active()));

    let summary = &report.datacenter("dc1").unwrap().summary;
    assert_eq!(summary.total_hosts, 2);
    assert_eq!(summary.total_vms, 2);
    assert_eq!(summary.total_tasks_submitted, 4);
    assert_abs_diff_eq!(summary.mean_utilization_percent, 100. / 3., epsilon = 1e-9);
    assert_abs_diff_eq!(summary.total_energy_kwh, 1920. / 3_600_000., epsilon = 1e-12);

    for host in &report.datacenters[0].hosts {
        assert_abs_diff_eq!(host.watts_mean, 320., epsilon = 1e-9);
        assert_abs_diff_eq!(host.energy_watt_seconds, 960., epsilon = 1e-9);
        assert_abs_diff_eq!(host.alive_time_seconds, 3., epsilon = 1e-9);
        assert_abs_diff_eq!(host.integrated_energy_ws, 780., epsilon = 1e-9);
        assert_eq!(host.transition_energy_ws, 0.);
    }

    assert_eq!(
        report.to_csv_string().unwrap(),
        "Datacenter Name,Total Energy Used (kWh),cloudlets\ndc1,0.000533,4\n"
    );
}

#[test]
fn test_csv_file() {
    let (_, report) = run("config.yaml");
    let dir = std::env::temp_dir().join(format!("dslab-cloud-energy-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join("energy.csv");
    report.write_csv(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), report.to_csv_string().unwrap());

    let hosts_path = dir.join("hosts.csv");
    report.host_details_csv(&hosts_path).unwrap();
    let content = std::fs::read_to_string(&hosts_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("datacenter_name,host_id,"));
    assert!(lines[1].starts_with("dc1,0,"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_report_is_stable() {
    let (mut sim, report) = run("config.yaml");
    assert_eq!(sim.report(), report);
    // ticks after termination change nothing
    sim.on_tick(10.).unwrap();
    assert_eq!(sim.current_time(), 3.);
    assert_eq!(sim.report(), report);
    sim.terminate();
    assert_eq!(sim.report(), report);
}

#[test]
fn test_idle_datacenter() {
    let (sim, report) = run("two_datacenters.yaml");
    assert_eq!(sim.current_time(), 3.);
    assert_eq!(sim.generators()[1].generated(), 0);

    let idle = &report.datacenter("idle").unwrap().summary;
    assert_eq!(idle.total_tasks_submitted, 0);
    assert_eq!(idle.mean_utilization_percent, 0.);
    assert_abs_diff_eq!(idle.total_energy_kwh, 300. / 3_600_000., epsilon = 1e-12);

    let busy = &report.datacenter("dc1").unwrap().summary;
    assert_abs_diff_eq!(busy.total_energy_kwh, 1920. / 3_600_000., epsilon = 1e-12);

    assert_eq!(
        report.to_csv_string().unwrap(),
        "Datacenter Name,Total Energy Used (kWh),cloudlets\ndc1,0.000533,4\nidle,0.000083,0\n"
    );
}

#[test]
fn test_colocated_vms() {
    let (sim, report) = run("colocated.yaml");
    assert_eq!(sim.current_time(), 2.);

    let dc = sim.datacenter("dc1").unwrap();
    let host_ids: Vec<u32> = dc.vms().map(|vm| vm.host_id()).collect();
    assert_eq!(host_ids, vec![0, 0]);

    let dc_report = report.datacenter("dc1").unwrap();
    for vm in &dc_report.vms {
        assert_abs_diff_eq!(vm.mean_utilization_percent, 50., epsilon = 1e-9);
        assert_abs_diff_eq!(vm.attributed_power_watts, 220., epsilon = 1e-9);
    }
    let busy_host = &dc_report.hosts[0];
    assert_abs_diff_eq!(busy_host.energy_watt_seconds, 880., epsilon = 1e-9);
    let unused_host = &dc_report.hosts[1];
    assert_eq!(unused_host.alive_time_seconds, 0.);
    assert_eq!(unused_host.energy_watt_seconds, 0.);
    // unused host does not lower the average
    assert_abs_diff_eq!(dc_report.summary.mean_utilization_percent, 50., epsilon = 1e-9);
    assert_abs_diff_eq!(dc_report.summary.total_energy_kwh, 880. / 3_600_000., epsilon = 1e-12);
}

#[test]
fn test_network_cloudlets() {
    let (sim, _) = run("network.yaml");
    assert_eq!(sim.current_time(), 3.);

    let dc = sim.datacenter("net").unwrap();
    let finished = dc.finished();
    assert_eq!(finished.len(), 5);
    assert!(finished.iter().all(|c| c.status() == CloudletStatus::Finished));

    let senders = finished.iter().filter(|c| c.is_sender()).count();
    let plain = finished.iter().filter(|c| c.kind == CloudletKind::Plain).count();
    assert_eq!(senders, 2);
    assert_eq!(plain, 1);

    for receiver in finished.iter().filter(|c| c.sender().is_some()) {
        let sender_id = receiver.sender().unwrap();
        assert_eq!(sender_id + 1, receiver.id);
        let sender = finished.iter().find(|c| c.id == sender_id).unwrap();
        match &sender.kind {
            CloudletKind::Sender(directive) => {
                assert_eq!(directive.receiver, receiver.id);
                assert_eq!(directive.bytes, 500);
            }
            _ => panic!("cloudlet #{} is not a sender", sender_id),
        }
        assert!(receiver.finish_time().unwrap() >= sender.finish_time().unwrap());
    }
}

#[test]
fn test_space_shared_failures() {
    let (sim, report) = run("space_shared.yaml");
    assert_eq!(sim.current_time(), 1.);

    let dc = sim.datacenter("ss").unwrap();
    assert!(dc.finished().is_empty());
    assert_eq!(dc.failed().len(), 3);
    assert!(dc.failed().iter().all(|c| c.status() == CloudletStatus::Failed));

    let summary = &report.datacenter("ss").unwrap().summary;
    assert_eq!(summary.total_tasks_submitted, 3);
    assert_eq!(summary.mean_utilization_percent, 0.);
    assert_abs_diff_eq!(summary.total_energy_kwh, 50. / 3_600_000., epsilon = 1e-12);
}

#[test]
fn test_transition_energy() {
    let (sim, report) = run("transitions.yaml");
    assert_eq!(sim.current_time(), 2.);

    let hosts = &report.datacenter("dc1").unwrap().hosts;
    assert_abs_diff_eq!(hosts[0].transition_energy_ws, 250., epsilon = 1e-9);
    assert_abs_diff_eq!(hosts[0].energy_watt_seconds, 770., epsilon = 1e-9);
    assert_eq!(hosts[1].transition_energy_ws, 0.);
    assert_eq!(hosts[1].energy_watt_seconds, 0.);
}

#[test]
fn test_simulation_length() {
    let (sim, report) = run("limited.yaml");
    assert_eq!(sim.current_time(), 5.);
    assert!(sim.is_terminated());
    assert!(!sim.on_completion_check());

    let dc = sim.datacenter("dc1").unwrap();
    assert!(dc.finished().is_empty());
    assert!(!dc.all_submitted_terminal());
    assert_eq!(report.datacenters[0].summary.total_tasks_submitted, 1);
    assert_abs_diff_eq!(report.datacenters[0].summary.mean_utilization_percent, 25., epsilon = 1e-9);
}

#[test]
fn test_zero_demand_stops_at_simulation_length() {
    let mut config = SimulationConfig::from_file(&name_wrapper("limited.yaml")).unwrap();
    config.datacenters[0].cloudlet.length = 1000;
    config.datacenters[0].utilization_model = UtilizationModelKind::Gaussian { mean: 0., stddev: 0. };
    let mut sim = CloudSimulation::new(config);
    let report = sim.run().unwrap();
    assert_eq!(sim.current_time(), 5.);
    assert!(sim.is_terminated());
    let dc = sim.datacenter("dc1").unwrap();
    assert!(dc.finished().is_empty());
    assert_eq!(report.datacenters[0].summary.total_tasks_submitted, 1);
    assert_eq!(report.datacenters[0].summary.mean_utilization_percent, 0.);
}

#[test]
fn test_measured_power_model_run() {
    let mut config = SimulationConfig::from_file(&name_wrapper("config.yaml")).unwrap();
    // same curve as the linear 80..800 W model
    let measurements = (0..11).map(|i| 80. + 72. * i as f64).collect();
    config.datacenters[0].power.model = PowerModelSpec::Measured(MeasuredPowerModel::new(measurements).unwrap());
    let mut sim = CloudSimulation::new(config);
    let report = sim.run().unwrap();
    assert_eq!(sim.current_time(), 3.);
    for host in &report.datacenters[0].hosts {
        assert_abs_diff_eq!(host.watts_mean, 320., epsilon = 1e-9);
        assert_abs_diff_eq!(host.energy_watt_seconds, 960., epsilon = 1e-9);
    }
}

#[test]
fn test_no_vms() {
    let (sim, report) = run("no_vms.yaml");
    assert_eq!(sim.current_time(), 0.);
    assert_eq!(sim.datacenters()[0].vm_count(), 0);
    assert!(sim.generators()[0].is_exhausted());
    assert_eq!(sim.generators()[0].generated(), 0);
    assert_eq!(report.datacenters[0].summary.total_tasks_submitted, 0);
    assert_eq!(report.datacenters[0].summary.total_energy_kwh, 0.);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let (first_sim, first) = run("gaussian.yaml");
    let (second_sim, second) = run("gaussian.yaml");
    assert_eq!(first_sim.current_time(), second_sim.current_time());
    assert_eq!(first, second);
    assert_eq!(first.datacenters[0].summary.total_tasks_submitted, 12);
    assert_eq!(first_sim.datacenters()[0].finished().len(), 12);
}

#[derive(Clone)]
struct CountingCallbacks {
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

impl SimulationCallbacks for CountingCallbacks {
    fn on_simulation_start(&mut self, _sim: &mut CloudSimulation) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_simulation_finish(&mut self, sim: &mut CloudSimulation, report: &SimulationReport) {
        assert!(sim.is_terminated());
        assert_eq!(report.time, sim.current_time());
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_experiment() {
    let files = ["config.yaml", "two_datacenters.yaml", "network.yaml", "gaussian.yaml"];
    let callbacks = CountingCallbacks {
        started: Arc::new(AtomicUsize::new(0)),
        finished: Arc::new(AtomicUsize::new(0)),
    };
    let paths: Vec<String> = files.iter().map(|f| name_wrapper(f)).collect();
    let mut experiment = Experiment::from_files(&paths, Box::new(callbacks.clone())).unwrap();
    let results = experiment.run(2);

    assert_eq!(results.len(), files.len());
    assert_eq!(callbacks.started.load(Ordering::SeqCst), files.len());
    assert_eq!(callbacks.finished.load(Ordering::SeqCst), files.len());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.id, i);
        assert_eq!(result.name, paths[i]);
        let (_, expected) = run(files[i]);
        assert_eq!(result.result.as_ref().unwrap(), &expected);
    }
}

#[derive(Clone)]
struct FailingCallbacks {
    failing_seed: u64,
}

impl SimulationCallbacks for FailingCallbacks {
    fn on_simulation_finish(&mut self, sim: &mut CloudSimulation, _report: &SimulationReport) {
        if sim.sim_config().seed == self.failing_seed {
            panic!("callback failed for seed {}", self.failing_seed);
        }
    }
}

#[test]
fn test_experiment_keeps_results_of_other_runs() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml")).unwrap();
    let mut failing = config.clone();
    failing.seed = 999;

    let mut experiment = Experiment::new(Box::new(FailingCallbacks { failing_seed: 999 }));
    experiment.add_run("first", config.clone());
    experiment.add_run("failing", failing);
    experiment.add_run("last", config);
    let results = experiment.run(2);

    assert_eq!(results.len(), 2);
    assert_eq!((results[0].id, results[0].name.as_str()), (0, "first"));
    assert_eq!((results[1].id, results[1].name.as_str()), (2, "last"));
    let (_, expected) = run("config.yaml");
    for result in &results {
        assert_eq!(result.result.as_ref().unwrap(), &expected);
    }
}

#[test]
fn test_experiment_reports_invalid_config() {
    assert!(Experiment::from_files(&[name_wrapper("unknown_policy.yaml")], Box::new(NoCallbacks)).is_err());

    let mut experiment = Experiment::new(Box::new(NoCallbacks));
    experiment.add_run(
        "classical",
        SimulationConfig::from_file(&name_wrapper("classical.json")).unwrap(),
    );
    let results = experiment.run(1);
    assert_eq!(results.len(), 1);
    assert!(results[0].result.is_ok());
}
