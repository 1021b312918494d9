//! The configuration for creating a new VM.

use getset::Getters;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::{
    AUTO_GPU_NAME, DEFAULT_CPU_CORES, DEFAULT_DISK_SIZE_GB, DEFAULT_GPU_ALLOCATION_PERCENT,
    DEFAULT_MEMORY_GB, DEFAULT_NETWORK_SWITCH, DEFAULT_USERNAME,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The full configuration for provisioning a new GPU-partitioned VM.
///
/// Defaults mirror the console's create form; only the name, installation media, storage path
/// and guest password have no usable default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct VmConfig {
    /// The VM name. Also the job target.
    #[builder(setter(into))]
    pub(super) name: String,

    /// Path to the OS installation ISO on the host.
    #[builder(default, setter(into))]
    pub(super) iso_path: String,

    /// Virtual disk size in GiB.
    #[builder(default = DEFAULT_DISK_SIZE_GB)]
    pub(super) disk_size_gb: u32,

    /// Assigned RAM in GiB.
    #[builder(default = DEFAULT_MEMORY_GB)]
    pub(super) memory_gb: u32,

    /// Number of virtual processors.
    #[builder(default = DEFAULT_CPU_CORES)]
    pub(super) cpu_cores: u32,

    /// Directory on the host where the virtual disk is stored.
    #[builder(default, setter(into))]
    pub(super) vhd_path: String,

    /// The network switch to connect the VM to.
    #[builder(default = DEFAULT_NETWORK_SWITCH.to_string(), setter(into))]
    pub(super) network_switch: String,

    /// The guest account name.
    #[builder(default = DEFAULT_USERNAME.to_string(), setter(into))]
    pub(super) username: String,

    /// The guest account password.
    #[builder(default, setter(into))]
    pub(super) password: String,

    /// Whether the guest logs the account in automatically.
    #[builder(default = true)]
    pub(super) auto_logon: bool,

    /// The GPU to partition, or [`AUTO_GPU_NAME`] to pick the first partitionable adapter.
    #[builder(default = AUTO_GPU_NAME.to_string(), setter(into))]
    pub(super) gpu_name: String,

    /// Share of the GPU assigned to the partition, in percent.
    #[builder(default = DEFAULT_GPU_ALLOCATION_PERCENT)]
    pub(super) gpu_allocation_percent: u32,

    /// Whether a virtual TPM is attached.
    #[builder(default = true)]
    pub(super) tpm_enabled: bool,

    /// Whether secure boot is enabled.
    #[builder(default = true)]
    pub(super) secure_boot: bool,
}
