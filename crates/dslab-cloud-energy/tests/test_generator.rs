use dslab_cloud_energy::core::config::{DatacenterSpec, SimulationConfig};
use dslab_cloud_energy::core::datacenter::Datacenter;
use dslab_cloud_energy::core::topology::build_datacenters;
use dslab_cloud_energy::core::workload_generator::{GeneratorState, WorkloadGenerator};

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

fn load(file_name: &str) -> (DatacenterSpec, Datacenter) {
    let config = SimulationConfig::from_file(&name_wrapper(file_name)).unwrap();
    let dc = build_datacenters(&config, 0.).remove(0);
    (config.datacenters[0].clone(), dc)
}

#[test]
fn test_generation_respects_rate_and_cap() {
    let (mut spec, mut dc) = load("config.yaml");
    spec.generation_rate = 2;
    spec.generation_cap = 5;
    let mut generator = WorkloadGenerator::new(&spec);
    let mut next_id = 0;
    assert_eq!(generator.state(), GeneratorState::Idle);

    let mut emitted = Vec::new();
    for tick in 0..6 {
        emitted.push(generator.on_tick(tick as f64, &mut dc, &mut next_id).unwrap());
        assert!(generator.generated() <= generator.cap());
    }
    assert_eq!(emitted, vec![2, 2, 1, 0, 0, 0]);
    assert_eq!(generator.generated(), 5);
    assert_eq!(generator.state(), GeneratorState::Exhausted);
    assert_eq!(dc.submitted_count(), 5);
    assert_eq!(next_id, 5);
}

#[test]
// The cap is checked before generation, so the generator becomes exhausted on the tick after the last batch.
fn test_exhaustion_happens_on_next_tick() {
    let (spec, mut dc) = load("config.yaml");
    let mut generator = WorkloadGenerator::new(&spec);
    let mut next_id = 0;
    generator.on_tick(0., &mut dc, &mut next_id).unwrap();
    generator.on_tick(1., &mut dc, &mut next_id).unwrap();
    assert_eq!(generator.generated(), generator.cap());
    assert_eq!(generator.state(), GeneratorState::Generating);
    assert_eq!(generator.on_tick(2., &mut dc, &mut next_id).unwrap(), 0);
    assert_eq!(generator.state(), GeneratorState::Exhausted);
}

#[test]
fn test_stop_is_idempotent() {
    let (spec, mut dc) = load("config.yaml");
    let mut generator = WorkloadGenerator::new(&spec);
    let mut next_id = 0;
    generator.start();
    assert_eq!(generator.state(), GeneratorState::Generating);
    generator.stop();
    generator.stop();
    assert_eq!(generator.state(), GeneratorState::Exhausted);
    generator.start();
    assert_eq!(generator.state(), GeneratorState::Exhausted);
    assert_eq!(generator.on_tick(0., &mut dc, &mut next_id).unwrap(), 0);
    assert_eq!(dc.submitted_count(), 0);
}

#[test]
fn test_zero_cap() {
    let (mut spec, mut dc) = load("config.yaml");
    spec.generation_cap = 0;
    let mut generator = WorkloadGenerator::new(&spec);
    let mut next_id = 0;
    assert_eq!(generator.on_tick(0., &mut dc, &mut next_id).unwrap(), 0);
    assert!(generator.is_exhausted());
    assert_eq!(generator.generated(), 0);
}

#[test]
fn test_datacenter_without_vms_is_exhausted() {
    let (spec, mut dc) = load("no_vms.yaml");
    assert_eq!(dc.vm_count(), 0);
    let mut generator = WorkloadGenerator::new(&spec);
    let mut next_id = 0;
    assert_eq!(generator.on_tick(0., &mut dc, &mut next_id).unwrap(), 0);
    assert!(generator.is_exhausted());
    assert_eq!(dc.submitted_count(), 0);
}

#[test]
// Cloudlets are bound to VMs in round-robin order.
fn test_binding_is_round_robin() {
    let (mut spec, mut dc) = load("config.yaml");
    spec.generation_rate = 3;
    let mut generator = WorkloadGenerator::new(&spec);
    let mut next_id = 0;
    generator.on_tick(0., &mut dc, &mut next_id).unwrap();
    assert_eq!(dc.vm(0).unwrap().scheduler().active_count(), 2);
    assert_eq!(dc.vm(1).unwrap().scheduler().active_count(), 1);
    assert_eq!(dc.next_vm_for_binding(), Some(1));
    assert_eq!(dc.next_vm_for_binding(), Some(0));
}

#[test]
fn test_cloudlet_ids_beyond_u32() {
    let (mut spec, mut dc) = load("config.yaml");
    spec.generation_rate = 3;
    let mut generator = WorkloadGenerator::new(&spec);
    let first = u32::MAX as u64 - 1;
    let mut next_id = first;
    assert_eq!(generator.on_tick(0., &mut dc, &mut next_id).unwrap(), 3);
    assert_eq!(next_id, first + 3);
    let ids: Vec<u64> = dc.submitted().iter().copied().collect();
    assert_eq!(ids, vec![first, first + 1, first + 2]);
    assert!(ids[2] > u32::MAX as u64);
}
