//! Simulation configuration.

use std::path::Path;

use serde::Deserialize;

use crate::core::cloudlet_scheduler::CloudletSchedulerPolicy;
use crate::core::error::ConfigError;
use crate::core::power_model::{HostPowerModel, LinearPowerModel, MeasuredPowerModel};
use crate::core::resource_pool::HostCapacity;
use crate::core::utilization_model::UtilizationModelKind;
use crate::core::vm_placement_policy::PlacementPolicyKind;

/// Holds raw simulation config parsed from YAML or JSON file.
#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
struct RawSimulationConfig {
    pub seed: Option<u64>,
    pub tick: Option<f64>,
    pub simulation_length: Option<f64>,
    #[serde(alias = "SCHEDULING_INTERVAL")]
    pub scheduling_interval: Option<f64>,
    #[serde(alias = "DATACENTERS")]
    pub datacenters: Option<Vec<RawDatacenterConfig>>,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
struct RawDatacenterConfig {
    pub name: Option<String>,
    pub hosts: Option<u32>,
    pub host_spec: Option<RawHostSpec>,
    pub power_spec: Option<RawPowerSpec>,
    pub vm_spec: Option<RawVmSpec>,
    #[serde(alias = "vm")]
    pub vms: Option<u32>,
    pub cloudlet_spec: Option<RawCloudletSpec>,
    #[serde(alias = "VmAllocationPolicy")]
    pub placement_policy: Option<String>,
    #[serde(alias = "UtilizationModel")]
    pub utilization_model: Option<String>,
    #[serde(alias = "VmScheduler")]
    pub cloudlet_scheduler: Option<String>,
    pub network_cloudlets: Option<bool>,
    #[serde(alias = "SCHEDULING_INTERVAL")]
    pub scheduling_interval: Option<f64>,
    #[serde(alias = "lastCloudlets")]
    pub generation_cap: Option<u64>,
    #[serde(alias = "cloudlets")]
    pub generation_rate: Option<u64>,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
struct RawHostSpec {
    #[serde(alias = "HOST_PES")]
    pub pes: Option<u32>,
    #[serde(alias = "HOST_MIPS")]
    pub mips: Option<f64>,
    #[serde(alias = "HOST_RAM")]
    pub ram: Option<u64>,
    #[serde(alias = "HOST_BW")]
    pub bw: Option<u64>,
    #[serde(alias = "HOST_STORAGE")]
    pub storage: Option<u64>,
    #[serde(alias = "HOST_START_UP_DELAY")]
    pub startup_delay: Option<f64>,
    #[serde(alias = "HOST_SHUT_DOWN_DELAY")]
    pub shutdown_delay: Option<f64>,
    #[serde(alias = "HOST_START_UP_POWER")]
    pub startup_power: Option<f64>,
    #[serde(alias = "HOST_SHUT_DOWN_POWER")]
    pub shutdown_power: Option<f64>,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
struct RawPowerSpec {
    #[serde(alias = "MAX_POWER")]
    pub max_power: Option<f64>,
    #[serde(alias = "STATIC_POWER")]
    pub static_power: Option<f64>,
    pub measurements: Option<Vec<f64>>,
    #[serde(alias = "HOST_START_UP_DELAY")]
    pub startup_delay: Option<f64>,
    #[serde(alias = "HOST_SHUT_DOWN_DELAY")]
    pub shutdown_delay: Option<f64>,
    #[serde(alias = "HOST_START_UP_POWER")]
    pub startup_power: Option<f64>,
    #[serde(alias = "HOST_SHUT_DOWN_POWER")]
    pub shutdown_power: Option<f64>,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
struct RawVmSpec {
    #[serde(alias = "VM_PES")]
    pub pes: Option<u32>,
    #[serde(alias = "VM_RAM")]
    pub ram: Option<u64>,
    #[serde(alias = "VM_BW")]
    pub bw: Option<u64>,
    #[serde(alias = "VM_STORAGE")]
    pub storage: Option<u64>,
    pub count: Option<u32>,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
struct RawCloudletSpec {
    #[serde(alias = "CLOUDLET_LENGTH")]
    pub length: Option<u64>,
    #[serde(alias = "CLOUDLET_PES")]
    pub pes: Option<u32>,
    #[serde(alias = "FILE_SIZE")]
    pub file_size: Option<u64>,
    #[serde(alias = "OUTPUT_SIZE")]
    pub output_size: Option<u64>,
}

fn required<T>(value: Option<T>, path: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingField(path.to_string()))
}

fn positive<T: PartialOrd + Default>(value: T, path: &str) -> Result<T, ConfigError> {
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::invalid(path, "should be positive"))
    }
}

fn non_negative(value: f64, path: &str) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0. {
        Ok(value)
    } else {
        Err(ConfigError::invalid(path, "should be a non-negative number"))
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Host capacity of a datacenter.
#[derive(Debug, PartialEq, Clone)]
pub struct HostSpec {
    pub pes: u32,
    /// Processing rate of a single PE.
    pub mips: f64,
    pub ram: u64,
    pub bw: u64,
    pub storage: u64,
}

impl HostSpec {
    pub fn capacity(&self) -> HostCapacity {
        HostCapacity {
            pes: self.pes,
            mips: self.mips,
            ram: self.ram,
            bw: self.bw,
            storage: self.storage,
        }
    }
}

/// Host power consumption curve.
#[derive(Debug, PartialEq, Clone)]
pub enum PowerModelSpec {
    Linear { max_power: f64, static_power: f64 },
    /// 11 measurements at 0%, 10%, ..., 100% utilization.
    Measured(MeasuredPowerModel),
}

/// Host power model with transition costs.
#[derive(Debug, PartialEq, Clone)]
pub struct PowerSpec {
    pub model: PowerModelSpec,
    pub startup_power: f64,
    pub startup_delay: f64,
    pub shutdown_power: f64,
    pub shutdown_delay: f64,
}

impl PowerSpec {
    /// Creates host power model instance.
    pub fn build(&self) -> HostPowerModel {
        let model = match &self.model {
            PowerModelSpec::Linear {
                max_power,
                static_power,
            } => HostPowerModel::new(Box::new(LinearPowerModel::new(*max_power, *static_power))),
            PowerModelSpec::Measured(model) => HostPowerModel::new(Box::new(model.clone())),
        };
        model
            .with_startup(self.startup_power, self.startup_delay)
            .with_shutdown(self.shutdown_power, self.shutdown_delay)
    }
}

/// Resources requested by each VM of a datacenter.
#[derive(Debug, PartialEq, Clone)]
pub struct VmSpec {
    pub pes: u32,
    pub ram: u64,
    pub bw: u64,
    pub storage: u64,
    /// Number of VMs to create.
    pub count: u32,
}

/// Shape of each cloudlet generated in a datacenter.
#[derive(Debug, PartialEq, Clone)]
pub struct CloudletSpec {
    /// Length in millions of instructions.
    pub length: u64,
    pub pes: u32,
    pub file_size: u64,
    pub output_size: u64,
}

/// Validated configuration of a single datacenter.
#[derive(Debug, PartialEq, Clone)]
pub struct DatacenterSpec {
    pub name: String,
    pub host_count: u32,
    pub host: HostSpec,
    pub power: PowerSpec,
    pub vm: VmSpec,
    pub cloudlet: CloudletSpec,
    pub placement_policy: PlacementPolicyKind,
    pub utilization_model: UtilizationModelKind,
    pub cloudlet_scheduler: CloudletSchedulerPolicy,
    /// Whether cloudlets are generated as sender/receiver pairs.
    pub network_cloudlets: bool,
    /// Period in seconds of host utilization sampling.
    pub scheduling_interval: f64,
    /// Total number of cloudlets the datacenter may generate.
    pub generation_cap: u64,
    /// Number of cloudlets generated per tick.
    pub generation_rate: u64,
}

/// Represents simulation configuration.
#[derive(Debug, PartialEq, Clone)]
pub struct SimulationConfig {
    /// Seed of all random generators.
    pub seed: u64,
    /// Clock step in seconds.
    pub tick: f64,
    /// Hard stop for the clock in seconds, if set.
    pub simulation_length: Option<f64>,
    pub datacenters: Vec<DatacenterSpec>,
}

impl SimulationConfig {
    /// Creates simulation config by reading parameter values from file.
    ///
    /// Files with `.json` extension are parsed as JSON, all others as YAML.
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(file_name).map_err(|e| ConfigError::Io {
            path: file_name.to_string(),
            source: e,
        })?;
        let is_json = Path::new(file_name)
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawSimulationConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawSimulationConfig = serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSimulationConfig) -> Result<Self, ConfigError> {
        let tick = positive(raw.tick.unwrap_or(1.), "tick")?;
        let simulation_length = match raw.simulation_length {
            Some(length) => Some(positive(length, "simulation_length")?),
            None => None,
        };
        let default_interval = raw.scheduling_interval.unwrap_or(1.);
        let raw_datacenters = required(raw.datacenters, "datacenters")?;
        if raw_datacenters.is_empty() {
            return Err(ConfigError::invalid("datacenters", "should not be empty"));
        }
        let datacenters = raw_datacenters
            .into_iter()
            .enumerate()
            .map(|(i, dc)| DatacenterSpec::from_raw(dc, &format!("datacenters[{}]", i), default_interval))
            .collect::<Result<Vec<_>, _>>()?;
        if simulation_length.is_none() {
            // cloudlets with zero demand never finish, so such a run could only be stopped by the time limit
            if let Some(i) = datacenters
                .iter()
                .position(|dc| dc.utilization_model.is_always_idle() && dc.generation_cap > 0)
            {
                return Err(ConfigError::invalid(
                    format!("datacenters[{}].utilization_model", i),
                    "demand is always zero, set simulation_length to bound the run",
                ));
            }
        }
        Ok(Self {
            seed: raw.seed.unwrap_or(123),
            tick,
            simulation_length,
            datacenters,
        })
    }
}

impl DatacenterSpec {
    fn from_raw(raw: RawDatacenterConfig, path: &str, default_interval: f64) -> Result<Self, ConfigError> {
        let field = |name: &str| format!("{}.{}", path, name);

        let name = required(raw.name, &field("name"))?;
        let host_count = required(raw.hosts, &field("hosts"))?;

        let raw_host = required(raw.host_spec, &field("host_spec"))?;
        let host = HostSpec {
            pes: positive(required(raw_host.pes, &field("host_spec.pes"))?, &field("host_spec.pes"))?,
            mips: positive(required(raw_host.mips, &field("host_spec.mips"))?, &field("host_spec.mips"))?,
            ram: required(raw_host.ram, &field("host_spec.ram"))?,
            bw: required(raw_host.bw, &field("host_spec.bw"))?,
            storage: required(raw_host.storage, &field("host_spec.storage"))?,
        };

        let raw_power = required(raw.power_spec, &field("power_spec"))?;
        let model = match raw_power.measurements {
            Some(measurements) => {
                let path = field("power_spec.measurements");
                if measurements.len() != MeasuredPowerModel::POINTS {
                    return Err(ConfigError::invalid(
                        path,
                        format!("expected {} values", MeasuredPowerModel::POINTS),
                    ));
                }
                let model = MeasuredPowerModel::new(measurements)
                    .ok_or_else(|| ConfigError::invalid(path, "should be non-negative and non-decreasing"))?;
                PowerModelSpec::Measured(model)
            }
            None => {
                let max_power = required(raw_power.max_power, &field("power_spec.max_power"))?;
                let static_power = required(raw_power.static_power, &field("power_spec.static_power"))?;
                if !(static_power >= 0. && max_power >= static_power && max_power.is_finite()) {
                    return Err(ConfigError::invalid(
                        field("power_spec"),
                        "should satisfy max_power >= static_power >= 0",
                    ));
                }
                PowerModelSpec::Linear {
                    max_power,
                    static_power,
                }
            }
        };
        let transition = |power_value: Option<f64>, host_value: Option<f64>, name: &str| {
            non_negative(power_value.or(host_value).unwrap_or(0.), &field(name))
        };
        let power = PowerSpec {
            model,
            startup_power: transition(raw_power.startup_power, raw_host.startup_power, "power_spec.startup_power")?,
            startup_delay: transition(raw_power.startup_delay, raw_host.startup_delay, "host_spec.startup_delay")?,
            shutdown_power: transition(
                raw_power.shutdown_power,
                raw_host.shutdown_power,
                "power_spec.shutdown_power",
            )?,
            shutdown_delay: transition(
                raw_power.shutdown_delay,
                raw_host.shutdown_delay,
                "host_spec.shutdown_delay",
            )?,
        };

        let raw_vm = required(raw.vm_spec, &field("vm_spec"))?;
        let vm = VmSpec {
            pes: positive(required(raw_vm.pes, &field("vm_spec.pes"))?, &field("vm_spec.pes"))?,
            ram: raw_vm.ram.unwrap_or(0),
            bw: raw_vm.bw.unwrap_or(0),
            storage: raw_vm.storage.unwrap_or(0),
            count: required(raw_vm.count.or(raw.vms), &field("vm_spec.count"))?,
        };

        let raw_cloudlet = required(raw.cloudlet_spec, &field("cloudlet_spec"))?;
        let cloudlet = CloudletSpec {
            length: positive(
                required(raw_cloudlet.length, &field("cloudlet_spec.length"))?,
                &field("cloudlet_spec.length"),
            )?,
            pes: positive(
                required(raw_cloudlet.pes, &field("cloudlet_spec.pes"))?,
                &field("cloudlet_spec.pes"),
            )?,
            file_size: raw_cloudlet.file_size.unwrap_or(0),
            output_size: raw_cloudlet.output_size.unwrap_or(0),
        };

        let placement_policy = required(raw.placement_policy, &field("placement_policy"))?.parse()?;
        let utilization_model = match raw.utilization_model {
            Some(value) => value.parse()?,
            None => UtilizationModelKind::Full,
        };
        let cloudlet_scheduler = match raw.cloudlet_scheduler {
            Some(value) => value.parse()?,
            None => CloudletSchedulerPolicy::TimeShared,
        };
        let scheduling_interval = positive(
            raw.scheduling_interval.unwrap_or(default_interval),
            &field("scheduling_interval"),
        )?;

        let generation_rate = required(raw.generation_rate, &field("generation_rate"))?;
        // a datacenter without cap submits a single batch
        let generation_cap = raw.generation_cap.unwrap_or(generation_rate);
        if generation_rate == 0 && generation_cap > 0 {
            return Err(ConfigError::invalid(
                field("generation_rate"),
                "should be positive when generation_cap is positive",
            ));
        }

        Ok(Self {
            name,
            host_count,
            host,
            power,
            vm,
            cloudlet,
            placement_policy,
            utilization_model,
            cloudlet_scheduler,
            network_cloudlets: raw.network_cloudlets.unwrap_or(false),
            scheduling_interval,
            generation_cap,
            generation_rate,
        })
    }
}
