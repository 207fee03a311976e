//! Simulation report records and their rendering.

use std::fmt::{Display, Formatter};
use std::path::Path;

use serde::Serialize;

use crate::core::error::ReportError;

/// Summary of a single datacenter.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DatacenterRecord {
    pub datacenter_name: String,
    pub total_hosts: usize,
    pub total_vms: usize,
    pub total_tasks_submitted: u64,
    pub mean_utilization_percent: f64,
    pub total_energy_kwh: f64,
}

/// Detail record of a single host.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HostRecord {
    pub host_id: u32,
    pub ram_capacity: u64,
    pub bw_capacity: u64,
    pub storage_capacity: u64,
    pub pe_count: u32,
    pub utilization_percent: f64,
    pub watts_mean: f64,
    pub energy_watt_seconds: f64,
    pub energy_kwh: f64,
    pub alive_time_seconds: f64,
    /// Startup and shutdown costs included into `energy_watt_seconds`.
    pub transition_energy_ws: f64,
    /// Energy integrated between utilization samples, for comparison with the mean-based figure.
    pub integrated_energy_ws: f64,
}

/// Record of a single VM.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct VmRecord {
    pub vm_id: u32,
    pub host_id: u32,
    pub mean_utilization_percent: f64,
    pub attributed_power_watts: f64,
}

/// All records of a single datacenter.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DatacenterReport {
    pub summary: DatacenterRecord,
    pub hosts: Vec<HostRecord>,
    pub vms: Vec<VmRecord>,
}

/// Final figures of a simulation run.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SimulationReport {
    /// Simulation time the report was made at.
    pub time: f64,
    pub datacenters: Vec<DatacenterReport>,
}

impl SimulationReport {
    pub fn summaries(&self) -> impl Iterator<Item = &DatacenterRecord> {
        self.datacenters.iter().map(|dc| &dc.summary)
    }

    pub fn datacenter(&self, name: &str) -> Option<&DatacenterReport> {
        self.datacenters.iter().find(|dc| dc.summary.datacenter_name == name)
    }

    /// Writes energy per datacenter as CSV with columns `Datacenter Name`, `Total Energy Used (kWh)`, `cloudlets`.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let mut wtr = csv::Writer::from_path(path)?;
        self.write_csv_to(&mut wtr)?;
        wtr.flush()?;
        Ok(())
    }

    /// Renders the energy CSV into a string.
    pub fn to_csv_string(&self) -> Result<String, ReportError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        self.write_csv_to(&mut wtr)?;
        let bytes = wtr.into_inner().map_err(|e| ReportError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write_csv_to<W: std::io::Write>(&self, wtr: &mut csv::Writer<W>) -> Result<(), ReportError> {
        wtr.write_record(["Datacenter Name", "Total Energy Used (kWh)", "cloudlets"])?;
        for dc in self.summaries() {
            wtr.write_record([
                dc.datacenter_name.clone(),
                format!("{:.6}", dc.total_energy_kwh),
                dc.total_tasks_submitted.to_string(),
            ])?;
        }
        Ok(())
    }

    /// Writes detail records of all hosts as CSV.
    pub fn host_details_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record([
            "datacenter_name",
            "host_id",
            "ram_capacity",
            "bw_capacity",
            "storage_capacity",
            "pe_count",
            "utilization_percent",
            "watts_mean",
            "energy_watt_seconds",
            "energy_kwh",
            "alive_time_seconds",
            "transition_energy_ws",
            "integrated_energy_ws",
        ])?;
        for dc in &self.datacenters {
            for host in &dc.hosts {
                wtr.write_record([
                    dc.summary.datacenter_name.clone(),
                    host.host_id.to_string(),
                    host.ram_capacity.to_string(),
                    host.bw_capacity.to_string(),
                    host.storage_capacity.to_string(),
                    host.pe_count.to_string(),
                    format!("{:.3}", host.utilization_percent),
                    format!("{:.3}", host.watts_mean),
                    format!("{:.3}", host.energy_watt_seconds),
                    format!("{:.6}", host.energy_kwh),
                    format!("{:.3}", host.alive_time_seconds),
                    format!("{:.3}", host.transition_energy_ws),
                    format!("{:.3}", host.integrated_energy_ws),
                ])?;
            }
        }
        wtr.flush()?;
        Ok(())
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        println!("{}", self);
    }
}

impl Display for SimulationReport {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(f, "---------------- Detailed Datacenter Report ----------------")?;
        for dc in &self.datacenters {
            let summary = &dc.summary;
            writeln!(f)?;
            writeln!(f, "Datacenter Name      : {}", summary.datacenter_name)?;
            writeln!(f, "Total Hosts          : {}", summary.total_hosts)?;
            if let Some(host) = dc.hosts.first() {
                writeln!(f, "  Host ID              : {}", host.host_id)?;
                writeln!(f, "  RAM                : {} MB", host.ram_capacity)?;
                writeln!(f, "  Bandwidth          : {} MBps", host.bw_capacity)?;
                writeln!(f, "  Storage            : {} MB", host.storage_capacity)?;
                writeln!(f, "  Number of PEs      : {}", host.pe_count)?;
                write!(f, "  CPU Usage mean: {:6.1}%", host.utilization_percent)?;
                write!(f, "  Power Consumption mean: {:8.0} W", host.watts_mean)?;
                write!(
                    f,
                    "  Host Power Consumption: {:.1} W-s ({:.6} kWh)",
                    host.energy_watt_seconds, host.energy_kwh
                )?;
                writeln!(f, "  Host Alive Time: {:.1} s", host.alive_time_seconds)?;
            }
            writeln!(f, "Total VMs            : {}", summary.total_vms)?;
            writeln!(f, "Total Cloudlets      : {}", summary.total_tasks_submitted)?;
            writeln!(f, "Average CPU Utilization: {:.2}%", summary.mean_utilization_percent)?;
            writeln!(f, "Total Energy Used    : {:.6} kWh", summary.total_energy_kwh)?;
            writeln!(f, "------------------------------")?;
        }
        Ok(())
    }
}
