#![doc = include_str!("../readme.md")]

pub mod core;
pub mod experiment;
pub mod log;
pub mod report;
pub mod simulation;

pub use colored;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::Error;
pub use crate::report::SimulationReport;
pub use crate::simulation::{ClockDriven, CloudSimulation, TickClock};
