//! Error types.

use thiserror::Error;

/// Errors detected while loading or validating the simulation config.
///
/// All of them are fatal: no simulation state is built from an invalid config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can't read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse config: {0}")]
    Parse(String),
    #[error("missing config field `{0}`")]
    MissingField(String),
    #[error("invalid value of config field `{field}`: {reason}")]
    InvalidType { field: String, reason: String },
    #[error("unknown VM placement policy `{0}`")]
    UnknownPlacementPolicy(String),
    #[error("unknown utilization model `{0}`")]
    UnknownUtilizationModel(String),
    #[error("unknown cloudlet scheduler `{0}`")]
    UnknownCloudletScheduler(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidType {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// VM placement failure. The VM is dropped, the simulation goes on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("no host can fit vm #{vm_id} requesting {requested_pes} PEs")]
    NoCapacity { vm_id: u32, requested_pes: u32 },
}

/// Workload generation failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// Can only happen if the cap check before generation is broken, the run must be aborted.
    #[error("datacenter {datacenter} generated {generated} cloudlets while its cap is {cap}")]
    CapExceeded {
        datacenter: String,
        generated: u64,
        cap: u64,
    },
}

/// Non-finite value met during energy accounting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("non-finite value of {what}: {value}")]
    NaNPropagation { what: String, value: f64 },
}

/// Failure while writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("can't write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("can't write CSV report: {0}")]
    Csv(#[from] csv::Error),
}

/// Umbrella error of the public API.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
