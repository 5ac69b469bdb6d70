//! Host utilization classifier.

use crate::core::resource_pool::ResourcePoolState;

/// Ordered partition of hosts by utilization.
///
/// Every host lands in exactly one of `overused` and `not_overused`; `active`
/// holds the hosts consuming both resources, independently of the other two.
/// All three preserve the pool host order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostClassification {
    pub overused: Vec<u32>,
    pub not_overused: Vec<u32>,
    pub active: Vec<u32>,
}

/// Splits hosts into overused, not overused and active sets against the given
/// threshold. Pure function of the snapshot passed in, O(n) in host count; an
/// empty pool yields three empty sequences.
pub fn classify_hosts(pool: &ResourcePoolState, threshold: f64) -> HostClassification {
    let mut classification = HostClassification::default();
    for (id, host) in pool.iter() {
        if host.is_overused(threshold) {
            classification.overused.push(*id);
        } else {
            classification.not_overused.push(*id);
        }
        if host.is_active() {
            classification.active.push(*id);
        }
    }
    classification
}
