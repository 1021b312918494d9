//! The configuration for reconfiguring an existing VM.

use getset::Getters;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::{AUTO_GPU_NAME, DEFAULT_CPU_CORES, DEFAULT_GPU_ALLOCATION_PERCENT};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The hardware changes to apply to an existing VM.
///
/// Applying an update force-stops the VM; the backend restarts nothing on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct VmUpdateConfig {
    /// The VM to reconfigure. Also the job target.
    #[builder(setter(into))]
    pub(super) name: String,

    /// The GPU to partition, or [`AUTO_GPU_NAME`] to pick the first partitionable adapter.
    #[builder(default = AUTO_GPU_NAME.to_string(), setter(into))]
    pub(super) gpu_name: String,

    /// Share of the GPU assigned to the partition, in percent.
    #[builder(default = DEFAULT_GPU_ALLOCATION_PERCENT)]
    pub(super) gpu_allocation_percent: u32,

    /// Number of virtual processors.
    #[builder(default = DEFAULT_CPU_CORES)]
    pub(super) cpu_count: u32,

    /// Assigned RAM in MiB.
    #[builder(default = 4096)]
    pub(super) memory_mb: u64,

    /// The network switch to connect the VM to.
    #[builder(default, setter(into))]
    pub(super) network_switch: String,
}
