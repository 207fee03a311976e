//! Virtual machine placement policies.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::core::common::Allocation;
use crate::core::error::{ConfigError, PlacementError};
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm_placement_policies::best_fit::BestFit;
use crate::core::vm_placement_policies::first_fit::FirstFit;
use crate::core::vm_placement_policies::random::RandomPlacement;
use crate::core::vm_placement_policies::round_robin::RoundRobin;
use crate::core::vm_placement_policies::simple::Simple;

/// Trait for implementation of VM placement policies.
///
/// The policy is defined as a function of VM allocation request and current resource pool state, which returns an
/// ID of host selected for VM placement or `None` if there is no suitable host.
///
/// Policies may keep internal state (a cursor, a random generator), which is updated on each call.
/// The caller applies the allocation to the pool state after a host is selected.
pub trait VmPlacementPolicy {
    fn select_host(&mut self, alloc: &Allocation, pool_state: &ResourcePoolState) -> Option<u32>;
}

/// Selects a host for the allocation, turning a failed selection into [`PlacementError::NoCapacity`].
pub fn place(
    policy: &mut dyn VmPlacementPolicy,
    alloc: &Allocation,
    pool_state: &ResourcePoolState,
) -> Result<u32, PlacementError> {
    policy
        .select_host(alloc, pool_state)
        .ok_or(PlacementError::NoCapacity {
            vm_id: alloc.id,
            requested_pes: alloc.pes,
        })
}

/// Closed set of supported placement policies, as named in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicyKind {
    Simple,
    FirstFit,
    BestFit,
    RoundRobin,
    Random,
}

impl PlacementPolicyKind {
    /// Creates a fresh policy instance. The seed is used by the random policy only.
    pub fn build(&self, seed: u64) -> Box<dyn VmPlacementPolicy> {
        match self {
            PlacementPolicyKind::Simple => Box::new(Simple::new()),
            PlacementPolicyKind::FirstFit => Box::new(FirstFit::new()),
            PlacementPolicyKind::BestFit => Box::new(BestFit::new()),
            PlacementPolicyKind::RoundRobin => Box::new(RoundRobin::new()),
            PlacementPolicyKind::Random => Box::new(RandomPlacement::new(seed)),
        }
    }

    /// Short config name of the policy.
    pub fn short_name(&self) -> &'static str {
        match self {
            PlacementPolicyKind::Simple => "SP",
            PlacementPolicyKind::FirstFit => "FF",
            PlacementPolicyKind::BestFit => "BF",
            PlacementPolicyKind::RoundRobin => "RR",
            PlacementPolicyKind::Random => "RD",
        }
    }
}

impl FromStr for PlacementPolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SP" | "Simple" => Ok(PlacementPolicyKind::Simple),
            "FF" | "FirstFit" => Ok(PlacementPolicyKind::FirstFit),
            "BF" | "BestFit" => Ok(PlacementPolicyKind::BestFit),
            "RR" | "RoundRobin" => Ok(PlacementPolicyKind::RoundRobin),
            "RD" | "Random" => Ok(PlacementPolicyKind::Random),
            _ => Err(ConfigError::UnknownPlacementPolicy(s.to_string())),
        }
    }
}

impl Display for PlacementPolicyKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
