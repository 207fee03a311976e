//! Cloudlet utilization models.

use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::str::FromStr;

use dyn_clone::{clone_trait_object, DynClone};
use rand_distr::{Distribution, StandardNormal};
use rand_pcg::Pcg64;

use crate::core::config::options::{option_f64, parse_config_value, parse_options};
use crate::core::error::ConfigError;

/// A utilization model is a function, which defines the fraction of requested resources a cloudlet
/// actually uses at the given simulation time.
///
/// Implementations must return a value in `[0, 1]` and must not change their own parameters between calls.
pub trait UtilizationModel: DynClone {
    fn demand(&self, time: f64) -> f64;
}

clone_trait_object!(UtilizationModel);

/// The cloudlet always uses all requested resources.
#[derive(Clone, Default)]
pub struct FullUtilizationModel;

impl FullUtilizationModel {
    pub fn new() -> Self {
        Self {}
    }
}

impl UtilizationModel for FullUtilizationModel {
    fn demand(&self, _time: f64) -> f64 {
        1.
    }
}

/// The cloudlet uses a fixed fraction of requested resources.
#[derive(Clone)]
pub struct DynamicUtilizationModel {
    fraction: f64,
}

impl DynamicUtilizationModel {
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0., 1.),
        }
    }
}

impl UtilizationModel for DynamicUtilizationModel {
    fn demand(&self, _time: f64) -> f64 {
        self.fraction
    }
}

/// The demand is `mean + noise * stddev` clamped to `[0, 1]`, where noise is drawn from the standard normal
/// distribution on every call.
///
/// The random source is injected, so models sharing a seeded generator produce reproducible sequences.
#[derive(Clone)]
pub struct GaussianUtilizationModel {
    mean: f64,
    stddev: f64,
    rand: Rc<RefCell<Pcg64>>,
}

impl GaussianUtilizationModel {
    pub fn new(mean: f64, stddev: f64, rand: Rc<RefCell<Pcg64>>) -> Self {
        Self { mean, stddev, rand }
    }
}

impl UtilizationModel for GaussianUtilizationModel {
    fn demand(&self, _time: f64) -> f64 {
        let noise: f64 = StandardNormal.sample(&mut *self.rand.borrow_mut());
        (self.mean + noise * self.stddev).clamp(0., 1.)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Utilization model as named in the config.
///
/// Accepted values: `F`/`Full`, `D`/`Dynamic` with optional `[fraction=...]` (0.5 by default),
/// `G`/`Gaussian` with optional `[mean=...,stddev=...]` (0.5 and 0.1 by default).
#[derive(Debug, Clone, PartialEq)]
pub enum UtilizationModelKind {
    Full,
    Dynamic { fraction: f64 },
    Gaussian { mean: f64, stddev: f64 },
}

impl UtilizationModelKind {
    /// Creates model instance. The random source is used by the Gaussian model only.
    pub fn build(&self, rand: Rc<RefCell<Pcg64>>) -> Box<dyn UtilizationModel> {
        match *self {
            UtilizationModelKind::Full => Box::new(FullUtilizationModel::new()),
            UtilizationModelKind::Dynamic { fraction } => Box::new(DynamicUtilizationModel::new(fraction)),
            UtilizationModelKind::Gaussian { mean, stddev } => {
                Box::new(GaussianUtilizationModel::new(mean, stddev, rand))
            }
        }
    }

    /// Returns true if the model never demands any resources.
    pub fn is_always_idle(&self) -> bool {
        match *self {
            UtilizationModelKind::Full => false,
            UtilizationModelKind::Dynamic { fraction } => fraction <= 0.,
            UtilizationModelKind::Gaussian { mean, stddev } => mean <= 0. && stddev <= 0.,
        }
    }
}

impl FromStr for UtilizationModelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, options) = parse_config_value(s.trim());
        let options = parse_options(options.as_deref().unwrap_or(""));
        match name.as_str() {
            "F" | "Full" => Ok(UtilizationModelKind::Full),
            "D" | "Dynamic" => {
                let fraction = option_f64(&options, "fraction", 0.5)?;
                if !(fraction > 0. && fraction <= 1.) {
                    return Err(ConfigError::invalid("utilization_model.fraction", "should be in (0, 1]"));
                }
                Ok(UtilizationModelKind::Dynamic { fraction })
            }
            "G" | "Gaussian" => {
                let mean = option_f64(&options, "mean", 0.5)?;
                let stddev = option_f64(&options, "stddev", 0.1)?;
                if !(0. ..=1.).contains(&mean) || stddev < 0. {
                    return Err(ConfigError::invalid(
                        "utilization_model",
                        "mean should be in [0, 1] and stddev should be non-negative",
                    ));
                }
                Ok(UtilizationModelKind::Gaussian { mean, stddev })
            }
            _ => Err(ConfigError::UnknownUtilizationModel(s.to_string())),
        }
    }
}

impl Display for UtilizationModelKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            UtilizationModelKind::Full => write!(f, "F"),
            UtilizationModelKind::Dynamic { fraction } => write!(f, "D[fraction={}]", fraction),
            UtilizationModelKind::Gaussian { mean, stddev } => write!(f, "G[mean={},stddev={}]", mean, stddev),
        }
    }
}
