//! Execution of cloudlets inside a VM.

use std::collections::{HashSet, VecDeque};
use std::fmt::{Display, Formatter};
use std::mem;
use std::str::FromStr;

use crate::core::cloudlet::Cloudlet;
use crate::core::error::ConfigError;

/// Policy of sharing VM processing elements between cloudlets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudletSchedulerPolicy {
    /// All cloudlets run at once, the VM capacity is split proportionally when oversubscribed.
    TimeShared,
    /// Cloudlets run in submission order while their total PEs fit the VM PEs.
    SpaceShared,
}

impl FromStr for CloudletSchedulerPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TS" | "TimeShared" => Ok(CloudletSchedulerPolicy::TimeShared),
            "SS" | "SpaceShared" => Ok(CloudletSchedulerPolicy::SpaceShared),
            _ => Err(ConfigError::UnknownCloudletScheduler(s.to_string())),
        }
    }
}

impl Display for CloudletSchedulerPolicy {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            CloudletSchedulerPolicy::TimeShared => write!(f, "TS"),
            CloudletSchedulerPolicy::SpaceShared => write!(f, "SS"),
        }
    }
}

/// Holds cloudlets of a single VM and advances their execution.
#[derive(Clone)]
pub struct CloudletScheduler {
    policy: CloudletSchedulerPolicy,
    pes: u32,
    mips: f64,
    waiting: VecDeque<Cloudlet>,
    running: Vec<Cloudlet>,
    awaiting_packet: Vec<Cloudlet>,
    raw_utilization: f64,
    busy: bool,
}

impl CloudletScheduler {
    /// Creates scheduler for a VM with `pes` processing elements of `mips` MIPS each.
    pub fn new(policy: CloudletSchedulerPolicy, pes: u32, mips: f64) -> Self {
        Self {
            policy,
            pes,
            mips,
            waiting: VecDeque::new(),
            running: Vec::new(),
            awaiting_packet: Vec::new(),
            raw_utilization: 0.,
            busy: false,
        }
    }

    /// Total VM capacity in MIPS.
    pub fn capacity(&self) -> f64 {
        self.pes as f64 * self.mips
    }

    /// Accepts a cloudlet for execution.
    ///
    /// Under space-sharing a cloudlet requesting more PEs than the VM has can never run,
    /// so it is returned back as failed.
    pub fn submit(&mut self, mut cloudlet: Cloudlet, time: f64) -> Result<(), Cloudlet> {
        if self.policy == CloudletSchedulerPolicy::SpaceShared && cloudlet.pes > self.pes {
            cloudlet.fail(time);
            return Err(cloudlet);
        }
        self.waiting.push_back(cloudlet);
        Ok(())
    }

    /// Number of cloudlets which are not in a terminal state.
    pub fn active_count(&self) -> usize {
        self.waiting.len() + self.running.len() + self.awaiting_packet.len()
    }

    /// Returns true if some cloudlets consumed VM capacity during the last update.
    pub fn was_busy(&self) -> bool {
        self.busy
    }

    /// Ratio of requested to available MIPS during the last update, may exceed 1 under time-sharing.
    pub fn raw_utilization(&self) -> f64 {
        self.raw_utilization
    }

    /// Utilization during the last update clamped to `[0, 1]`.
    pub fn utilization(&self) -> f64 {
        self.raw_utilization.clamp(0., 1.)
    }

    fn admit_waiting(&mut self, time: f64) {
        match self.policy {
            CloudletSchedulerPolicy::TimeShared => {
                while let Some(mut cloudlet) = self.waiting.pop_front() {
                    cloudlet.start(time);
                    self.running.push(cloudlet);
                }
            }
            CloudletSchedulerPolicy::SpaceShared => {
                let mut used_pes: u32 = self.running.iter().map(|c| c.pes).sum();
                while let Some(cloudlet) = self.waiting.front() {
                    if used_pes + cloudlet.pes > self.pes {
                        break;
                    }
                    used_pes += cloudlet.pes;
                    if let Some(mut cloudlet) = self.waiting.pop_front() {
                        cloudlet.start(time);
                        self.running.push(cloudlet);
                    }
                }
            }
        }
    }

    /// Advances execution of running cloudlets by `delta` seconds ending at `time` and returns finished cloudlets.
    /// Then waiting cloudlets which fit are started at `time`.
    ///
    /// Receivers which executed their length are parked until their sender's packet is delivered.
    pub fn update(&mut self, time: f64, delta: f64) -> Vec<Cloudlet> {
        let start_time = time - delta;
        let requests: Vec<f64> = self
            .running
            .iter()
            .map(|c| c.pes as f64 * self.mips * c.demand(start_time))
            .collect();
        let requested: f64 = requests.iter().sum();
        self.busy = !requests.is_empty();
        let capacity = self.capacity();
        self.raw_utilization = if capacity > 0. { requested / capacity } else { 0. };
        let share = if requested > capacity { capacity / requested } else { 1. };

        let mut finished = Vec::new();
        for (mut cloudlet, request) in mem::take(&mut self.running).into_iter().zip(requests) {
            if cloudlet.execute(request * share * delta) {
                if cloudlet.sender().is_some() {
                    cloudlet.await_packet();
                    self.awaiting_packet.push(cloudlet);
                } else {
                    cloudlet.finish(time);
                    finished.push(cloudlet);
                }
            } else {
                self.running.push(cloudlet);
            }
        }
        self.admit_waiting(time);
        finished
    }

    /// Finishes parked receivers whose senders are in the delivered set.
    pub fn deliver_packets(&mut self, time: f64, delivered: &HashSet<u64>) -> Vec<Cloudlet> {
        let mut finished = Vec::new();
        for mut cloudlet in mem::take(&mut self.awaiting_packet) {
            if cloudlet.sender().map_or(false, |sender| delivered.contains(&sender)) {
                cloudlet.finish(time);
                finished.push(cloudlet);
            } else {
                self.awaiting_packet.push(cloudlet);
            }
        }
        finished
    }
}
