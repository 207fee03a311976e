use dslab_cloud_energy::core::common::Allocation;
use dslab_cloud_energy::core::error::{ConfigError, PlacementError};
use dslab_cloud_energy::core::resource_pool::{HostCapacity, ResourcePoolState};
use dslab_cloud_energy::core::vm_placement_policies::best_fit::BestFit;
use dslab_cloud_energy::core::vm_placement_policies::first_fit::FirstFit;
use dslab_cloud_energy::core::vm_placement_policies::random::RandomPlacement;
use dslab_cloud_energy::core::vm_placement_policies::round_robin::RoundRobin;
use dslab_cloud_energy::core::vm_placement_policies::simple::Simple;
use dslab_cloud_energy::core::vm_placement_policy::{place, PlacementPolicyKind, VmPlacementPolicy};

fn capacity(pes: u32, ram: u64) -> HostCapacity {
    HostCapacity {
        pes,
        mips: 1000.,
        ram,
        bw: 10000,
        storage: 100000,
    }
}

fn pool_with_free_pes(free_pes: &[u32]) -> ResourcePoolState {
    let mut pool = ResourcePoolState::new();
    for (id, pes) in free_pes.iter().enumerate() {
        pool.add_host(id as u32, capacity(*pes, 4096));
    }
    pool
}

fn place_all(policy: &mut dyn VmPlacementPolicy, pool: &mut ResourcePoolState, allocs: &[Allocation]) -> Vec<u32> {
    let mut hosts = Vec::new();
    for alloc in allocs {
        let host = place(policy, alloc, pool).unwrap();
        pool.allocate(alloc, host);
        hosts.push(host);
    }
    hosts
}

#[test]
// Host 2 has not enough PEs, hosts 1 and 3 leave more PEs free than host 0.
fn test_best_fit_selects_least_leftover() {
    let pool = pool_with_free_pes(&[2, 5, 1, 8]);
    let mut policy = BestFit::new();
    assert_eq!(policy.select_host(&Allocation::pes_only(0, 2), &pool), Some(0));
}

#[test]
fn test_best_fit_ties_broken_by_lowest_id() {
    let pool = pool_with_free_pes(&[4, 3, 3, 8]);
    let mut policy = BestFit::new();
    assert_eq!(policy.select_host(&Allocation::pes_only(0, 2), &pool), Some(1));
}

#[test]
fn test_round_robin_wraps() {
    let mut pool = pool_with_free_pes(&[10, 10, 10]);
    let mut policy = RoundRobin::new();
    let allocs: Vec<Allocation> = (0..4).map(|id| Allocation::pes_only(id, 1)).collect();
    assert_eq!(place_all(&mut policy, &mut pool, &allocs), vec![0, 1, 2, 0]);
}

#[test]
fn test_round_robin_skips_full_hosts() {
    let mut pool = pool_with_free_pes(&[2, 1, 2]);
    let mut policy = RoundRobin::new();
    let allocs: Vec<Allocation> = (0..3).map(|id| Allocation::pes_only(id, 2)).collect();
    assert_eq!(place_all(&mut policy, &mut pool, &allocs[..2]), vec![0, 2]);
    assert_eq!(policy.select_host(&allocs[2], &pool), None);
}

#[test]
fn test_first_fit_uses_ascending_ids() {
    let mut pool = ResourcePoolState::new();
    pool.add_host(7, capacity(8, 4096));
    pool.add_host(3, capacity(1, 4096));
    pool.add_host(5, capacity(4, 4096));
    let mut policy = FirstFit::new();
    assert_eq!(policy.select_host(&Allocation::pes_only(0, 2), &pool), Some(5));
}

#[test]
fn test_no_capacity() {
    let pool = pool_with_free_pes(&[2, 4]);
    let alloc = Allocation::pes_only(42, 8);
    for kind in [
        PlacementPolicyKind::Simple,
        PlacementPolicyKind::FirstFit,
        PlacementPolicyKind::BestFit,
        PlacementPolicyKind::RoundRobin,
        PlacementPolicyKind::Random,
    ] {
        let mut policy = kind.build(123);
        assert_eq!(
            place(policy.as_mut(), &alloc, &pool),
            Err(PlacementError::NoCapacity {
                vm_id: 42,
                requested_pes: 8
            })
        );
    }
}

#[test]
// FirstFit checks PEs only, Simple and the multi-resource FirstFit also check RAM.
fn test_multi_resource_fitting() {
    let mut pool = ResourcePoolState::new();
    pool.add_host(0, capacity(8, 512));
    pool.add_host(1, capacity(8, 4096));
    let alloc = Allocation {
        id: 0,
        pes: 2,
        ram: 1024,
        bw: 100,
        storage: 100,
    };
    assert_eq!(FirstFit::new().select_host(&alloc, &pool), Some(0));
    assert_eq!(FirstFit::with_all_resources().select_host(&alloc, &pool), Some(1));
    assert_eq!(Simple::new().select_host(&alloc, &pool), Some(1));
}

#[test]
fn test_random_is_reproducible() {
    let pool = pool_with_free_pes(&[4, 1, 4, 4, 4]);
    let alloc = Allocation::pes_only(0, 2);
    let mut first = RandomPlacement::new(42);
    let mut second = RandomPlacement::new(42);
    let first_hosts: Vec<Option<u32>> = (0..20).map(|_| first.select_host(&alloc, &pool)).collect();
    let second_hosts: Vec<Option<u32>> = (0..20).map(|_| second.select_host(&alloc, &pool)).collect();
    assert_eq!(first_hosts, second_hosts);
    assert!(first_hosts.iter().all(|h| h.is_some() && *h != Some(1)));
}

#[test]
fn test_policy_names() {
    assert_eq!("SP".parse::<PlacementPolicyKind>().unwrap(), PlacementPolicyKind::Simple);
    assert_eq!("FF".parse::<PlacementPolicyKind>().unwrap(), PlacementPolicyKind::FirstFit);
    assert_eq!("BestFit".parse::<PlacementPolicyKind>().unwrap(), PlacementPolicyKind::BestFit);
    assert_eq!("RR".parse::<PlacementPolicyKind>().unwrap(), PlacementPolicyKind::RoundRobin);
    assert_eq!("RD".parse::<PlacementPolicyKind>().unwrap(), PlacementPolicyKind::Random);
    assert_eq!(PlacementPolicyKind::BestFit.to_string(), "BF");
}

#[test]
fn test_unknown_policy_is_rejected() {
    for name in ["WF", "sp", "", "FirstFit2"] {
        assert!(matches!(
            name.parse::<PlacementPolicyKind>(),
            Err(ConfigError::UnknownPlacementPolicy(_))
        ));
    }
}
