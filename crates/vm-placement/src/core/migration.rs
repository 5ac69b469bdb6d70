//! Migration records produced by allocation policies.

use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Reason tag assigned to a migration by the phase that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MigrationReason {
    Distribution,
    Consolidation,
}

impl Display for MigrationReason {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            MigrationReason::Distribution => write!(f, "Distribution"),
            MigrationReason::Consolidation => write!(f, "Consolidation"),
        }
    }
}

/// Describes one decided VM move.
///
/// Policies only record the intent to move a VM, the caller is responsible for
/// executing the move and updating host and VM states. Source and target hosts
/// always differ, and one VM appears in at most one migration per policy
/// invocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Migration {
    pub vm_id: u32,
    pub source_host: u32,
    pub target_host: u32,
    pub reason: Option<MigrationReason>,
}

impl Migration {
    /// Creates an untagged migration record. The policy tags it with the
    /// producing phase before returning it to the caller.
    pub fn new(vm_id: u32, source_host: u32, target_host: u32) -> Self {
        Self {
            vm_id,
            source_host,
            target_host,
            reason: None,
        }
    }

    /// Human-readable reason, empty while the migration is untagged.
    pub fn description(&self) -> &'static str {
        match self.reason {
            Some(MigrationReason::Distribution) => "Distribution",
            Some(MigrationReason::Consolidation) => "Consolidation",
            None => "",
        }
    }
}
