//! Resource pool state.

use std::collections::BTreeSet;

use indexmap::map::Iter;
use indexmap::IndexMap;

use crate::core::vm::VirtualMachine;

/// Stores host capacity and current state: utilization rates, the power
/// consumption figure precomputed by the caller and the set of hosted VMs.
#[derive(Clone, Debug, PartialEq)]
pub struct HostState {
    pub cpu_total: u32,
    pub memory_total: u64,
    /// CPU utilization rate (used/total). May exceed 1 under overcommit.
    pub cpu_load: f64,
    /// Memory utilization rate (used/total).
    pub memory_load: f64,
    /// Power consumption figure, see [`crate::core::power_model`].
    pub power: f64,
    /// IDs of VMs currently placed on the host.
    pub vms: BTreeSet<u32>,
}

impl HostState {
    pub fn new(cpu_total: u32, memory_total: u64) -> Self {
        Self {
            cpu_total,
            memory_total,
            cpu_load: 0.,
            memory_load: 0.,
            power: 0.,
            vms: BTreeSet::new(),
        }
    }

    /// Whether CPU or memory utilization reaches the threshold.
    pub fn is_overused(&self, threshold: f64) -> bool {
        self.cpu_load >= threshold || self.memory_load >= threshold
    }

    /// Whether the host currently consumes both CPU and memory, i.e. runs at
    /// least one VM and is powered on.
    pub fn is_active(&self) -> bool {
        self.cpu_load > 0. && self.memory_load > 0.
    }

    /// Host load rates after receiving the specified VM.
    pub fn load_after_receiving(&self, vm: &VirtualMachine) -> (f64, f64) {
        let cpu_used = self.cpu_load * self.cpu_total as f64;
        let memory_used = self.memory_load * self.memory_total as f64;
        (
            (cpu_used + vm.cpu_usage as f64) / self.cpu_total as f64,
            (memory_used + vm.memory_usage as f64) / self.memory_total as f64,
        )
    }
}

/// Ordered snapshot of host states within one datacenter.
///
/// Hosts are kept in insertion order, which defines the order of all derived
/// host sequences (classification, consolidation sources). The policy engine
/// clones the snapshot it was constructed with and applies decided migrations
/// to the clone only, so that later decisions within one invocation observe
/// the effect of earlier ones. The caller-owned snapshot is never mutated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourcePoolState {
    hosts: IndexMap<u32, HostState>,
}

impl ResourcePoolState {
    /// Creates empty resource pool state.
    pub fn new() -> Self {
        Self {
            hosts: IndexMap::new(),
        }
    }

    /// Adds host with zero load to the pool.
    pub fn add_host(&mut self, id: u32, cpu_total: u32, memory_total: u64) {
        self.hosts.insert(id, HostState::new(cpu_total, memory_total));
    }

    /// Overwrites the observed load rates and power figure of the specified host.
    pub fn update_host(&mut self, id: u32, cpu_load: f64, memory_load: f64, power: f64) {
        if let Some(host) = self.hosts.get_mut(&id) {
            host.cpu_load = cpu_load;
            host.memory_load = memory_load;
            host.power = power;
        }
    }

    /// Places the VM on the specified host, increasing its load rates by the
    /// VM demand.
    pub fn place_vm(&mut self, vm: &VirtualMachine, host_id: u32) {
        if let Some(host) = self.hosts.get_mut(&host_id) {
            host.cpu_load += vm.cpu_usage as f64 / host.cpu_total as f64;
            host.memory_load += vm.memory_usage as f64 / host.memory_total as f64;
            host.vms.insert(vm.id);
        }
    }

    /// Moves the VM between hosts, adjusting the load rates on both sides.
    /// The power figures are not recomputed, they reflect the input snapshot.
    pub fn apply_migration(&mut self, vm: &VirtualMachine, source: u32, target: u32) {
        if let Some(host) = self.hosts.get_mut(&source) {
            host.cpu_load = (host.cpu_load - vm.cpu_usage as f64 / host.cpu_total as f64).max(0.);
            host.memory_load = (host.memory_load - vm.memory_usage as f64 / host.memory_total as f64).max(0.);
            host.vms.remove(&vm.id);
        }
        self.place_vm(vm, target);
    }

    /// Returns the state of the specified host.
    pub fn get_host(&self, id: u32) -> &HostState {
        &self.hosts[&id]
    }

    /// Returns IDs of all hosts in pool order.
    pub fn get_hosts_list(&self) -> Vec<u32> {
        self.hosts.keys().cloned().collect()
    }

    /// Returns an iterator over IDs and states of all hosts in pool order.
    pub fn iter(&self) -> Iter<u32, HostState> {
        self.hosts.iter()
    }

    /// Returns the number of hosts.
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Returns IDs of VMs placed on the specified host.
    pub fn get_host_vms(&self, id: u32) -> BTreeSet<u32> {
        self.hosts[&id].vms.clone()
    }

    /// Returns the CPU utilization rate of the specified host.
    pub fn get_cpu_load(&self, id: u32) -> f64 {
        self.hosts[&id].cpu_load
    }

    /// Returns the memory utilization rate of the specified host.
    pub fn get_memory_load(&self, id: u32) -> f64 {
        self.hosts[&id].memory_load
    }

    /// Returns the power consumption figure of the specified host.
    pub fn get_power(&self, id: u32) -> f64 {
        self.hosts[&id].power
    }
}
