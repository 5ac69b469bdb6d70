//! Allocation policy interface and alias-based policy selection.

use std::collections::HashMap;

use dyn_clone::{clone_trait_object, DynClone};

use crate::core::allocation_policies::single_threshold::SingleThreshold;
use crate::core::common::PolicyResolveError;
use crate::core::config::parse_config_value;
use crate::core::migration::Migration;
use crate::core::resource_pool::ResourcePoolState;
use crate::core::vm::VirtualMachine;

/// Trait for implementation of VM allocation policies.
///
/// The policy is defined as a function of the current VM list, which returns
/// the list of migrations needed to optimize the allocation. The policy holds
/// the host snapshot it was constructed with and never mutates it; executing
/// the returned migrations is up to the caller, which re-invokes the policy
/// on the next scheduling cycle with updated states.
///
/// It is possible to implement an arbitrary policy and make it selectable by
/// alias, see [`PolicyRegistry`].
pub trait AllocationPolicy: DynClone + std::fmt::Debug {
    fn optimize_allocation(&self, vm_list: &[VirtualMachine]) -> Vec<Migration>;
}

clone_trait_object!(AllocationPolicy);

/// Constructor invoked on alias resolution. Receives the host snapshot and
/// the options part of the config string.
pub type PolicyConstructor =
    Box<dyn Fn(ResourcePoolState, Option<&str>) -> Result<Box<dyn AllocationPolicy>, PolicyResolveError>>;

/// Maps policy aliases to constructors.
///
/// Native policies are registered eagerly on creation. User-implemented
/// policies are added with [`PolicyRegistry::register`]; discovering and
/// loading them is up to the host application.
pub struct PolicyRegistry {
    constructors: HashMap<String, PolicyConstructor>,
}

impl PolicyRegistry {
    /// Creates registry with native policies registered.
    pub fn new() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
        };
        registry.register(
            "SingleThreshold",
            Box::new(|pool, options| Ok(Box::new(SingleThreshold::from_options(pool, options)?))),
        );
        registry
    }

    /// Registers a policy constructor under the given alias.
    /// Replaces the previous entry if the alias is already taken.
    pub fn register(&mut self, alias: &str, constructor: PolicyConstructor) {
        self.constructors.insert(alias.to_string(), constructor);
    }

    /// Resolves a policy from a config string such as
    /// `SingleThreshold[threshold=0.8]` and constructs it over the given host
    /// snapshot.
    pub fn resolve(
        &self,
        config_str: &str,
        pool: ResourcePoolState,
    ) -> Result<Box<dyn AllocationPolicy>, PolicyResolveError> {
        let (alias, options) = parse_config_value(config_str);
        match self.constructors.get(&alias) {
            Some(constructor) => constructor(pool, options.as_deref()),
            None => Err(PolicyResolveError::UnknownPolicy(alias)),
        }
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a policy using the native implementations only.
pub fn allocation_policy_resolver(
    config_str: &str,
    pool: ResourcePoolState,
) -> Result<Box<dyn AllocationPolicy>, PolicyResolveError> {
    PolicyRegistry::new().resolve(config_str, pool)
}
