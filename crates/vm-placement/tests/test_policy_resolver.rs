use vm_placement::core::allocation_policy::{allocation_policy_resolver, AllocationPolicy, PolicyRegistry};
use vm_placement::core::common::{ConfigurationError, PolicyResolveError};
use vm_placement::core::config::SchedulingConfig;
use vm_placement::core::migration::Migration;
use vm_placement::core::resource_pool::ResourcePoolState;
use vm_placement::core::vm::VirtualMachine;

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

fn small_pool() -> ResourcePoolState {
    let mut pool = ResourcePoolState::new();
    pool.add_host(1, 100, 100);
    pool.add_host(2, 100, 100);
    pool
}

#[derive(Clone, Debug)]
struct MigrateNothing;

impl AllocationPolicy for MigrateNothing {
    fn optimize_allocation(&self, _vm_list: &[VirtualMachine]) -> Vec<Migration> {
        Vec::new()
    }
}

#[test]
fn test_resolve_native_policy() {
    let _ = env_logger::builder().is_test(true).try_init();

    let policy = allocation_policy_resolver("SingleThreshold[threshold=0.8]", small_pool()).unwrap();
    assert!(policy.optimize_allocation(&[]).is_empty());

    // boxed policies are clonable
    let cloned = policy.clone();
    assert!(cloned.optimize_allocation(&[]).is_empty());
}

#[test]
fn test_resolve_unknown_policy() {
    let err = allocation_policy_resolver("PowerAware[threshold=0.5]", small_pool()).unwrap_err();
    assert!(matches!(err, PolicyResolveError::UnknownPolicy(alias) if alias == "PowerAware"));
}

#[test]
fn test_resolve_with_bad_options() {
    let err = allocation_policy_resolver("SingleThreshold", small_pool()).unwrap_err();
    assert!(matches!(err, PolicyResolveError::InvalidOptions(_)));

    let err = allocation_policy_resolver("SingleThreshold[limit=0.8]", small_pool()).unwrap_err();
    assert!(matches!(err, PolicyResolveError::InvalidOptions(_)));

    let err = allocation_policy_resolver("SingleThreshold[threshold=high]", small_pool()).unwrap_err();
    assert!(matches!(err, PolicyResolveError::InvalidOptions(_)));
}

#[test]
fn test_resolve_with_invalid_configuration() {
    let err = allocation_policy_resolver("SingleThreshold[threshold=1.5]", small_pool()).unwrap_err();
    assert!(matches!(
        err,
        PolicyResolveError::Configuration(ConfigurationError::InvalidThreshold(_))
    ));

    let err = allocation_policy_resolver("SingleThreshold[threshold=0.8]", ResourcePoolState::new()).unwrap_err();
    assert!(matches!(
        err,
        PolicyResolveError::Configuration(ConfigurationError::EmptyHostPool)
    ));
}

#[test]
// User-implemented policies become selectable by alias once registered.
fn test_register_custom_policy() {
    let mut registry = PolicyRegistry::new();
    registry.register("MigrateNothing", Box::new(|_pool, _options| Ok(Box::new(MigrateNothing))));

    let policy = registry.resolve("MigrateNothing", small_pool()).unwrap();
    let vm_list = [VirtualMachine::new(1, 50, 50)];
    assert!(policy.optimize_allocation(&vm_list).is_empty());

    // natives are still present
    assert!(registry.resolve("SingleThreshold[threshold=0.8]", small_pool()).is_ok());
}

#[test]
fn test_config_from_file() {
    let config = SchedulingConfig::from_file(&name_wrapper("config.yaml"));
    assert_eq!(config.algorithm, "SingleThreshold[threshold=0.8]");
    assert_eq!(config.hosts.len(), 2);

    let pool = config.build_pool();
    assert_eq!(pool.host_count(), 3);
    assert_eq!(pool.get_hosts_list(), vec![1, 2, 3]);
    assert_eq!(pool.get_host(1).cpu_total, 100);
    assert_eq!(pool.get_host(2).cpu_total, 100);
    assert_eq!(pool.get_host(3).cpu_total, 80);
    assert_eq!(pool.get_host(3).memory_total, 40);

    let policy = PolicyRegistry::new().resolve(&config.algorithm, pool).unwrap();
    // freshly built hosts carry no load, so there is nothing to optimize
    let vm_list = [VirtualMachine::new(1, 10, 10)];
    assert!(policy.optimize_allocation(&vm_list).is_empty());
}

#[test]
fn test_config_defaults() {
    let config = SchedulingConfig::from_file(&name_wrapper("config_minimal.yaml"));
    assert_eq!(config.algorithm, "SingleThreshold[threshold=0.8]");
    assert_eq!(config.hosts.len(), 1);
    assert_eq!(config.hosts[0].count, None);
    assert_eq!(config.build_pool().host_count(), 1);
}
