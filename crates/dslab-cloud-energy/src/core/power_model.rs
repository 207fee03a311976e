//! Physical host power consumption models.

use dyn_clone::{clone_trait_object, DynClone};

/// Power model is a function, which computes the power consumption of a physical host in W
/// based on its CPU utilization.
pub trait PowerModel: DynClone {
    /// Returns host power consumption in W.
    ///
    /// Utilization should be passed as a float in 0.0-1.0 range.
    fn get_power(&self, utilization: f64) -> f64;
}

clone_trait_object!(PowerModel);

/// A power model based on linear interpolation between the static (idle) and maximum power consumption values.
///
/// An idle host is assumed to be powered on, so zero utilization gives static power.
#[derive(Clone, Debug)]
pub struct LinearPowerModel {
    static_power: f64,
    max_power: f64,
}

impl LinearPowerModel {
    /// Creates a linear power model.
    ///
    /// * `max_power` - The maximum power consumption in W (at 100% utilization).
    /// * `static_power` - The static power consumption in W (at 0% utilization).
    pub fn new(max_power: f64, static_power: f64) -> Self {
        Self {
            static_power,
            max_power,
        }
    }
}

impl PowerModel for LinearPowerModel {
    fn get_power(&self, utilization: f64) -> f64 {
        // written as a weighted sum to be exact at both ends
        self.static_power * (1. - utilization) + self.max_power * utilization
    }
}

/// A power model based on measurements of actual power consumption at different utilization levels.
///
/// The model uses 11 measurements corresponding to power consumption in W at utilization levels from 0% to 100%
/// with step 10%, such as measurements reported by the [SPECpower benchmark](https://www.spec.org/power_ssj2008/results/).
///
/// The power consumption is computed using linear interpolation between the closest measurements.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredPowerModel {
    measurements: Vec<f64>,
}

impl MeasuredPowerModel {
    /// Number of measurements expected by the model.
    pub const POINTS: usize = 11;

    /// Creates a measured power model.
    ///
    /// Returns `None` unless there are exactly 11 finite, non-negative and non-decreasing measurements.
    pub fn new(measurements: Vec<f64>) -> Option<Self> {
        if measurements.len() != Self::POINTS
            || measurements.iter().any(|m| !m.is_finite() || *m < 0.)
            || measurements.windows(2).any(|w| w[1] < w[0])
        {
            return None;
        }
        Some(Self { measurements })
    }

    pub fn measurements(&self) -> &[f64] {
        &self.measurements
    }
}

impl PowerModel for MeasuredPowerModel {
    fn get_power(&self, utilization: f64) -> f64 {
        let position = utilization * 10.;
        let floor_idx = (position.floor() as usize).min(Self::POINTS - 2);
        let fraction = position - floor_idx as f64;
        let floor_power = self.measurements[floor_idx];
        let ceil_power = self.measurements[floor_idx + 1];
        if fraction == 0. {
            return floor_power;
        }
        if fraction == 1. {
            return ceil_power;
        }
        floor_power + (ceil_power - floor_power) * fraction
    }
}

/// Complete power description of a host: the utilization curve plus one-off startup and shutdown costs.
#[derive(Clone)]
pub struct HostPowerModel {
    model: Box<dyn PowerModel>,
    startup_power: f64,
    shutdown_power: f64,
    startup_delay: f64,
    shutdown_delay: f64,
}

impl HostPowerModel {
    /// Creates host power model without startup and shutdown costs.
    pub fn new(model: Box<dyn PowerModel>) -> Self {
        Self {
            model,
            startup_power: 0.,
            shutdown_power: 0.,
            startup_delay: 0.,
            shutdown_delay: 0.,
        }
    }

    /// Sets power consumption in W and duration in seconds of host startup.
    pub fn with_startup(mut self, power: f64, delay: f64) -> Self {
        self.startup_power = power;
        self.startup_delay = delay;
        self
    }

    /// Sets power consumption in W and duration in seconds of host shutdown.
    pub fn with_shutdown(mut self, power: f64, delay: f64) -> Self {
        self.shutdown_power = power;
        self.shutdown_delay = delay;
        self
    }

    /// Returns the power consumption in W for the given utilization, which is clamped to `[0, 1]`.
    pub fn get_power(&self, utilization: f64) -> f64 {
        self.model.get_power(utilization.clamp(0., 1.))
    }

    /// Power consumption of an idle host.
    pub fn static_power(&self) -> f64 {
        self.get_power(0.)
    }

    /// Power consumption of a fully loaded host.
    pub fn max_power(&self) -> f64 {
        self.get_power(1.)
    }

    /// Energy in W*s consumed once when the host is started.
    pub fn startup_energy(&self) -> f64 {
        self.startup_power * self.startup_delay
    }

    /// Energy in W*s consumed once when the host is shut down.
    pub fn shutdown_energy(&self) -> f64 {
        self.shutdown_power * self.shutdown_delay
    }
}
