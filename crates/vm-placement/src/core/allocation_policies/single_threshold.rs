//! Allocation policy based on a single utilization threshold.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::core::allocation_policy::AllocationPolicy;
use crate::core::classifier::classify_hosts;
use crate::core::common::{ConfigurationError, PolicyResolveError};
use crate::core::config::parse_options;
use crate::core::migration::{Migration, MigrationReason};
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm::VirtualMachine;

/// Optimizes VM allocation against a single upper utilization threshold.
///
/// Hosts whose CPU or memory utilization reaches the threshold are relieved by
/// migrating VMs to hosts below it (distribution), then lightly loaded hosts
/// are drained onto other active hosts to reduce the number of powered-on
/// machines (consolidation). Both phases run on a working copy of the host
/// snapshot, so every decision observes the cumulative effect of the previous
/// ones within the same invocation. The policy only records the intended
/// migrations, executing them is up to the caller.
#[derive(Clone, Debug)]
pub struct SingleThreshold {
    pool: ResourcePoolState,
    threshold: f64,
}

impl SingleThreshold {
    /// Creates the policy over the given host snapshot.
    /// Fails if the threshold is outside (0, 1] or the snapshot has no hosts.
    pub fn new(pool: ResourcePoolState, threshold: f64) -> Result<Self, ConfigurationError> {
        if !(threshold > 0. && threshold <= 1.) {
            return Err(ConfigurationError::InvalidThreshold(threshold));
        }
        if pool.host_count() == 0 {
            return Err(ConfigurationError::EmptyHostPool);
        }
        Ok(Self { pool, threshold })
    }

    /// Creates the policy from a registry options string, e.g. `threshold=0.8`.
    pub fn from_options(pool: ResourcePoolState, options: Option<&str>) -> Result<Self, PolicyResolveError> {
        let options_str = options.ok_or_else(|| {
            PolicyResolveError::InvalidOptions("missing options, expected threshold=<value>".to_string())
        })?;
        let options = parse_options(options_str);
        let threshold = options
            .get("threshold")
            .ok_or_else(|| PolicyResolveError::InvalidOptions("threshold option is required".to_string()))?
            .parse::<f64>()
            .map_err(|err| PolicyResolveError::InvalidOptions(format!("bad threshold value: {}", err)))?;
        Ok(Self::new(pool, threshold)?)
    }

    /// Returns the configured utilization threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Relieves overused hosts by offloading their VMs onto hosts below the
    /// threshold, most power-hungry sources first. A host that cannot be
    /// relieved is left overused and reconsidered on the next cycle.
    fn distribute_vms(
        &self,
        migrations: &mut Vec<Migration>,
        state: &mut ResourcePoolState,
        vm_table: &BTreeMap<u32, VirtualMachine>,
        overused_hosts: &[u32],
        target_hosts: &[u32],
        migrated_vms: &mut BTreeSet<u32>,
    ) {
        if target_hosts.is_empty() {
            debug!("no hosts below threshold, overload cannot be relieved this cycle");
            return;
        }

        let mut sources = overused_hosts.to_vec();
        sources.sort_by(|a, b| state.get_power(*b).total_cmp(&state.get_power(*a)).then(a.cmp(b)));

        for source in sources {
            while state.get_host(source).is_overused(self.threshold) {
                match self.select_distribution_move(state, vm_table, source, target_hosts) {
                    Some((vm_id, target)) => {
                        let vm = &vm_table[&vm_id];
                        info!("schedule migration of vm {} from host {} to host {}", vm_id, source, target);
                        state.apply_migration(vm, source, target);
                        migrated_vms.insert(vm_id);
                        migrations.push(Migration::new(vm_id, source, target));
                    }
                    None => {
                        debug!("host {} is still overused, no suitable target for its vms", source);
                        break;
                    }
                }
            }
        }

        for migration in migrations.iter_mut() {
            if migration.reason.is_none() {
                migration.reason = Some(MigrationReason::Distribution);
            }
        }
    }

    /// Picks the VM and target pair whose move keeps the target below the
    /// threshold on both resources and leaves it with the lowest peak
    /// utilization. Remaining ties resolve to the lowest target host ID, then
    /// the lowest VM ID.
    fn select_distribution_move(
        &self,
        state: &ResourcePoolState,
        vm_table: &BTreeMap<u32, VirtualMachine>,
        source: u32,
        target_hosts: &[u32],
    ) -> Option<(u32, u32)> {
        let mut best: Option<(f64, u32, u32)> = None;
        for vm_id in state.get_host_vms(source) {
            // VMs with unknown demand cannot be moved
            let vm = match vm_table.get(&vm_id) {
                Some(vm) => vm,
                None => continue,
            };
            for &target in target_hosts {
                let (cpu_load_new, memory_load_new) = state.get_host(target).load_after_receiving(vm);
                if cpu_load_new >= self.threshold || memory_load_new >= self.threshold {
                    continue;
                }
                let peak_load = cpu_load_new.max(memory_load_new);
                let better = match &best {
                    None => true,
                    Some((best_peak, best_target, best_vm)) => {
                        peak_load
                            .total_cmp(best_peak)
                            .then(target.cmp(best_target))
                            .then(vm_id.cmp(best_vm))
                            == Ordering::Less
                    }
                };
                if better {
                    best = Some((peak_load, target, vm_id));
                }
            }
        }
        best.map(|(_, target, vm_id)| (vm_id, target))
    }

    /// Drains active hosts onto other active hosts to reduce the number of
    /// powered-on machines. A host is drained only if every VM it hosts can be
    /// relocated; otherwise its tentative moves are discarded and it stays
    /// active. Once a host has been considered for draining it no longer
    /// receives VMs in this pass, whether or not its drain succeeded.
    fn consolidate_vms(
        &self,
        migrations: &mut Vec<Migration>,
        state: &mut ResourcePoolState,
        vm_table: &BTreeMap<u32, VirtualMachine>,
        active_hosts: &[u32],
        migrated_vms: &mut BTreeSet<u32>,
    ) {
        let mut excluded_targets = BTreeSet::<u32>::new();

        for &source in active_hosts {
            let vm_ids = state.get_host_vms(source);
            if vm_ids.is_empty() {
                excluded_targets.insert(source);
                continue;
            }

            let saved_state = state.clone();
            let mut new_migrations = Vec::<Migration>::new();
            let mut drained = true;
            for vm_id in vm_ids {
                // a VM already scheduled to move in this invocation is pinned
                if migrated_vms.contains(&vm_id) {
                    drained = false;
                    break;
                }
                let vm = match vm_table.get(&vm_id) {
                    Some(vm) => vm,
                    None => {
                        drained = false;
                        break;
                    }
                };
                match self.select_consolidation_target(state, vm, source, active_hosts, &excluded_targets) {
                    Some(target) => {
                        state.apply_migration(vm, source, target);
                        new_migrations.push(Migration::new(vm_id, source, target));
                    }
                    None => {
                        drained = false;
                        break;
                    }
                }
            }

            if drained {
                info!("host {} can be fully drained, scheduling its shutdown", source);
                for migration in &new_migrations {
                    migrated_vms.insert(migration.vm_id);
                }
                migrations.append(&mut new_migrations);
            } else {
                debug!("host {} cannot be fully drained, keeping it active", source);
                *state = saved_state;
            }
            excluded_targets.insert(source);
        }

        // a VM moved during distribution keeps its original label
        for migration in migrations.iter_mut() {
            if migration.reason.is_none() {
                migration.reason = Some(MigrationReason::Consolidation);
            }
        }
    }

    /// Returns the first active host that can receive the VM without reaching
    /// the threshold, in pool order. The source itself and hosts already
    /// considered for draining are not candidates.
    fn select_consolidation_target(
        &self,
        state: &ResourcePoolState,
        vm: &VirtualMachine,
        source: u32,
        active_hosts: &[u32],
        excluded_targets: &BTreeSet<u32>,
    ) -> Option<u32> {
        for &target in active_hosts {
            if target == source || excluded_targets.contains(&target) {
                continue;
            }
            let (cpu_load_new, memory_load_new) = state.get_host(target).load_after_receiving(vm);
            if cpu_load_new < self.threshold && memory_load_new < self.threshold {
                return Some(target);
            }
        }
        None
    }
}

impl AllocationPolicy for SingleThreshold {
    fn optimize_allocation(&self, vm_list: &[VirtualMachine]) -> Vec<Migration> {
        let mut migrations = Vec::new();
        if vm_list.is_empty() {
            return migrations;
        }

        let vm_table: BTreeMap<u32, VirtualMachine> = vm_list.iter().map(|vm| (vm.id, vm.clone())).collect();
        let mut state = self.pool.clone();
        let mut migrated_vms = BTreeSet::<u32>::new();

        let classification = classify_hosts(&state, self.threshold);
        if !classification.overused.is_empty() {
            self.distribute_vms(
                &mut migrations,
                &mut state,
                &vm_table,
                &classification.overused,
                &classification.not_overused,
                &mut migrated_vms,
            );
        }

        // the active set reflects the moves already decided above
        let active_hosts = classify_hosts(&state, self.threshold).active;
        self.consolidate_vms(&mut migrations, &mut state, &vm_table, &active_hosts, &mut migrated_vms);

        migrations
    }
}
