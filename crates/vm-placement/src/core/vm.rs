//! Representation of virtual machine.

use serde::Serialize;

/// Represents virtual machine (VM).
///
/// VM is characterized by its ID and resource demand (vCPUs and memory).
/// The execution of VMs over time is managed by the surrounding simulation,
/// the policy engine treats them as immutable inputs for one invocation and
/// obtains the VM to host association from the host snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VirtualMachine {
    pub id: u32,
    pub cpu_usage: u32,
    pub memory_usage: u64,
}

impl VirtualMachine {
    /// Creates virtual machine with specified resource demand.
    pub fn new(id: u32, cpu_usage: u32, memory_usage: u64) -> Self {
        Self {
            id,
            cpu_usage,
            memory_usage,
        }
    }
}
