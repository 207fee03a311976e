//! Rate-limited generation of cloudlets.

use std::fmt::{Display, Formatter};

use crate::core::cloudlet::{CloudletKind, CloudletRequest, SendDirective};
use crate::core::config::{CloudletSpec, DatacenterSpec};
use crate::core::datacenter::Datacenter;
use crate::core::error::GeneratorError;
use crate::{log_debug, log_info, log_warn};

/// State of workload generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    Generating,
    /// The cap is reached or the cloudlets can't be bound. Terminal state.
    Exhausted,
}

impl Display for GeneratorState {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            GeneratorState::Idle => write!(f, "idle"),
            GeneratorState::Generating => write!(f, "generating"),
            GeneratorState::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Emits up to `rate` cloudlets per tick into its datacenter until `cap` cloudlets are generated in total.
///
/// Cloudlet IDs come from a counter shared by all generators of a simulation.
#[derive(Clone, Debug)]
pub struct WorkloadGenerator {
    datacenter: String,
    rate: u64,
    cap: u64,
    network: bool,
    cloudlet: CloudletSpec,
    generated: u64,
    state: GeneratorState,
}

impl WorkloadGenerator {
    pub fn new(spec: &DatacenterSpec) -> Self {
        Self {
            datacenter: spec.name.clone(),
            rate: spec.generation_rate,
            cap: spec.generation_cap,
            network: spec.network_cloudlets,
            cloudlet: spec.cloudlet.clone(),
            generated: 0,
            state: GeneratorState::Idle,
        }
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == GeneratorState::Exhausted
    }

    /// Total number of generated cloudlets.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    /// Starts generation. Has no effect unless the generator is idle.
    pub fn start(&mut self) {
        if self.state == GeneratorState::Idle {
            self.state = GeneratorState::Generating;
        }
    }

    /// Stops generation for good. Repeated calls have no effect.
    pub fn stop(&mut self) {
        self.state = GeneratorState::Exhausted;
    }

    /// Generates the batch of this tick and submits it to the datacenter. Returns the number of emitted cloudlets.
    ///
    /// The cap is checked before generation: once it is reached, the generator becomes exhausted and emits nothing.
    pub fn on_tick(
        &mut self,
        time: f64,
        dc: &mut Datacenter,
        next_cloudlet_id: &mut u64,
    ) -> Result<u64, GeneratorError> {
        self.start();
        if self.state == GeneratorState::Exhausted {
            return Ok(0);
        }
        if self.generated >= self.cap {
            self.stop();
            log_info!(time, &self.datacenter, "generation finished after {} cloudlets", self.generated);
            return Ok(0);
        }
        if dc.vm_count() == 0 {
            self.stop();
            log_warn!(time, &self.datacenter, "no vms to bind cloudlets, generation stopped");
            return Ok(0);
        }

        let count = self.rate.min(self.cap - self.generated);
        for request in self.make_batch(count, next_cloudlet_id) {
            dc.submit(request, time);
        }
        self.generated += count;
        log_debug!(
            time,
            &self.datacenter,
            "generated {} cloudlets ({} of {})",
            count,
            self.generated,
            self.cap
        );

        if self.generated > self.cap {
            return Err(GeneratorError::CapExceeded {
                datacenter: self.datacenter.clone(),
                generated: self.generated,
                cap: self.cap,
            });
        }
        Ok(count)
    }

    fn request(&self, id: u64, kind: CloudletKind) -> CloudletRequest {
        CloudletRequest {
            id,
            length: self.cloudlet.length,
            pes: self.cloudlet.pes,
            file_size: self.cloudlet.file_size,
            output_size: self.cloudlet.output_size,
            kind,
        }
    }

    /// Makes `count` cloudlet requests. Network workload is made of sender/receiver pairs
    /// plus a plain cloudlet if `count` is odd.
    fn make_batch(&self, count: u64, next_cloudlet_id: &mut u64) -> Vec<CloudletRequest> {
        let mut batch = Vec::with_capacity(count as usize);
        let mut remaining = count;
        while remaining > 0 {
            if self.network && remaining >= 2 {
                let sender = *next_cloudlet_id;
                let receiver = sender + 1;
                *next_cloudlet_id += 2;
                let directive = SendDirective {
                    receiver,
                    bytes: self.cloudlet.output_size,
                };
                batch.push(self.request(sender, CloudletKind::Sender(directive)));
                batch.push(self.request(receiver, CloudletKind::Receiver { sender }));
                remaining -= 2;
            } else {
                batch.push(self.request(*next_cloudlet_id, CloudletKind::Plain));
                *next_cloudlet_id += 1;
                remaining -= 1;
            }
        }
        batch
    }
}
