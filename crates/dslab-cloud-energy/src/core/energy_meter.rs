//! Energy meter integrates the host power consumption over time.

/// Energy meter structure.
#[derive(Debug, Clone, Default)]
pub struct EnergyMeter {
    energy_consumed: f64,
    current_power: f64,
    prev_time: f64,
    started: bool,
}

impl EnergyMeter {
    /// Creates meter which does not count anything until started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts metering at the specified time with the specified power.
    pub fn start(&mut self, time: f64, power: f64) {
        if self.started {
            return;
        }
        self.started = true;
        self.prev_time = time;
        self.current_power = power;
    }

    /// Invoked each time the host power consumption is changed to update the total energy consumption.
    pub fn update(&mut self, time: f64, power: f64) {
        if !self.started {
            self.start(time, power);
            return;
        }
        self.energy_consumed += (time - self.prev_time) * self.current_power;
        self.current_power = power;
        self.prev_time = time;
    }

    /// Returns the total energy consumption in W*s up to the specified time without changing the meter.
    pub fn energy_consumed(&self, time: f64) -> f64 {
        if !self.started {
            return 0.;
        }
        self.energy_consumed + (time - self.prev_time).max(0.) * self.current_power
    }
}
