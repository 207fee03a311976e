pub mod cloudlet;
pub mod cloudlet_scheduler;
pub mod common;
pub mod config;
pub mod datacenter;
pub mod energy_accountant;
pub mod energy_meter;
pub mod error;
pub mod host;
pub mod power_model;
pub mod resource_pool;
pub mod topology;
pub mod utilization_model;
pub mod utilization_stats;
pub mod vm;
pub mod vm_placement_policies;
pub mod vm_placement_policy;
pub mod workload_generator;
