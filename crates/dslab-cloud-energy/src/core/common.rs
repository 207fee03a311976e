/// Resources requested by a VM which is about to be placed.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub id: u32,
    pub pes: u32,
    pub ram: u64,
    pub bw: u64,
    pub storage: u64,
}

impl Allocation {
    /// Shortcut for allocations where only processing elements matter.
    pub fn pes_only(id: u32, pes: u32) -> Self {
        Self {
            id,
            pes,
            ram: 0,
            bw: 0,
            storage: 0,
        }
    }
}

#[derive(PartialEq, Debug)]
pub enum AllocationVerdict {
    NotEnoughPes,
    NotEnoughRam,
    NotEnoughBandwidth,
    NotEnoughStorage,
    Success,
    HostNotFound,
}
