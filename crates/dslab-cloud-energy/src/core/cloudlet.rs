//! Representation of cloudlet (task) and its status.

use std::fmt::{Debug, Display, Formatter};

use crate::core::utilization_model::UtilizationModel;

/// Status of cloudlet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudletStatus {
    /// Submitted to VM, waiting for free processing elements.
    Waiting,
    Running,
    /// Network receiver which executed its length and waits for the packet of its sender.
    AwaitingPacket,
    Finished,
    Failed,
}

impl CloudletStatus {
    /// Terminal statuses are never left.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CloudletStatus::Finished | CloudletStatus::Failed)
    }
}

impl Display for CloudletStatus {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            CloudletStatus::Waiting => write!(f, "waiting"),
            CloudletStatus::Running => write!(f, "running"),
            CloudletStatus::AwaitingPacket => write!(f, "awaiting_packet"),
            CloudletStatus::Finished => write!(f, "finished"),
            CloudletStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Packet sent by a network sender cloudlet to its receiver.
#[derive(Clone, Debug, PartialEq)]
pub struct SendDirective {
    pub receiver: u64,
    pub bytes: u64,
}

/// Role of cloudlet in the workload.
#[derive(Clone, Debug, PartialEq)]
pub enum CloudletKind {
    Plain,
    Sender(SendDirective),
    /// Receiver knows its sender to wait for its packet, but sends nothing itself.
    Receiver { sender: u64 },
}

/// Static description of a cloudlet.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudletRequest {
    pub id: u64,
    /// Length in millions of instructions.
    pub length: u64,
    pub pes: u32,
    pub file_size: u64,
    pub output_size: u64,
    pub kind: CloudletKind,
}

/// Represents a unit of synthetic work bound to a VM.
#[derive(Clone)]
pub struct Cloudlet {
    pub id: u64,
    pub length: u64,
    pub pes: u32,
    pub file_size: u64,
    pub output_size: u64,
    pub kind: CloudletKind,
    vm_id: u32,
    status: CloudletStatus,
    executed: f64,
    submission_time: f64,
    start_time: Option<f64>,
    finish_time: Option<f64>,
    utilization_model: Box<dyn UtilizationModel>,
}

impl Debug for Cloudlet {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Cloudlet")
            .field("id", &self.id)
            .field("vm_id", &self.vm_id)
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("executed", &self.executed)
            .finish()
    }
}

impl Cloudlet {
    /// Creates cloudlet bound to the specified VM.
    pub fn new(
        request: CloudletRequest,
        vm_id: u32,
        submission_time: f64,
        utilization_model: Box<dyn UtilizationModel>,
    ) -> Self {
        Self {
            id: request.id,
            length: request.length,
            pes: request.pes,
            file_size: request.file_size,
            output_size: request.output_size,
            kind: request.kind,
            vm_id,
            status: CloudletStatus::Waiting,
            executed: 0.,
            submission_time,
            start_time: None,
            finish_time: None,
            utilization_model,
        }
    }

    pub fn vm_id(&self) -> u32 {
        self.vm_id
    }

    pub fn status(&self) -> CloudletStatus {
        self.status
    }

    /// Returns executed work in millions of instructions.
    pub fn executed(&self) -> f64 {
        self.executed
    }

    pub fn submission_time(&self) -> f64 {
        self.submission_time
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn finish_time(&self) -> Option<f64> {
        self.finish_time
    }

    /// Returns the fraction of requested resources used at the given time.
    pub fn demand(&self, time: f64) -> f64 {
        self.utilization_model.demand(time)
    }

    /// Returns the ID of the sender this cloudlet waits for, if it is a network receiver.
    pub fn sender(&self) -> Option<u64> {
        match self.kind {
            CloudletKind::Receiver { sender } => Some(sender),
            _ => None,
        }
    }

    pub fn is_sender(&self) -> bool {
        matches!(self.kind, CloudletKind::Sender(_))
    }

    pub(crate) fn start(&mut self, time: f64) {
        self.status = CloudletStatus::Running;
        self.start_time = Some(time);
    }

    /// Adds executed work and returns true if the whole length is executed.
    pub(crate) fn execute(&mut self, work: f64) -> bool {
        self.executed += work;
        self.executed >= self.length as f64
    }

    pub(crate) fn await_packet(&mut self) {
        self.status = CloudletStatus::AwaitingPacket;
    }

    pub(crate) fn finish(&mut self, time: f64) {
        self.status = CloudletStatus::Finished;
        self.finish_time = Some(time);
    }

    pub(crate) fn fail(&mut self, time: f64) {
        self.status = CloudletStatus::Failed;
        self.finish_time = Some(time);
    }
}
