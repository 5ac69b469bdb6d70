//! Scheduling configuration.

use serde::{Deserialize, Serialize};

use crate::core::resource_pool::ResourcePoolState;

pub mod options;
pub use options::{parse_config_value, parse_options};

/// Holds raw scheduling config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawSchedulingConfig {
    pub algorithm: Option<String>,
    pub hosts: Option<Vec<HostConfig>>,
}

/// Holds configuration of a single physical host or a set of identical hosts.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct HostConfig {
    /// Host CPU capacity.
    pub cpus: u32,
    /// Host memory capacity in GB.
    pub memory: u64,
    /// Number of such hosts.
    pub count: Option<u32>,
}

/// Represents scheduling configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SchedulingConfig {
    /// Allocation policy in config value form, e.g. `SingleThreshold[threshold=0.8]`.
    pub algorithm: String,
    /// Configurations of physical hosts.
    pub hosts: Vec<HostConfig>,
}

impl SchedulingConfig {
    /// Creates scheduling config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Self {
        let raw: RawSchedulingConfig = serde_yaml::from_str(
            &std::fs::read_to_string(file_name).unwrap_or_else(|_| panic!("Can't read file {}", file_name)),
        )
        .unwrap_or_else(|_| panic!("Can't parse YAML from file {}", file_name));

        Self {
            algorithm: raw
                .algorithm
                .unwrap_or_else(|| "SingleThreshold[threshold=0.8]".to_string()),
            hosts: raw.hosts.unwrap_or_default(),
        }
    }

    /// Materializes the host pool described by the config. Hosts get
    /// sequential IDs in declaration order, starting from 1.
    pub fn build_pool(&self) -> ResourcePoolState {
        let mut pool = ResourcePoolState::new();
        let mut next_id: u32 = 1;
        for host in &self.hosts {
            for _ in 0..host.count.unwrap_or(1) {
                pool.add_host(next_id, host.cpus, host.memory);
                next_id += 1;
            }
        }
        pool
    }
}
