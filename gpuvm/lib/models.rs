//! Shared data models: inventory snapshots and read-only reference data.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use getset::Getters;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The lifecycle state of a virtual machine as reported by the hypervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmState {
    /// The VM is powered on and running.
    Running,

    /// The VM is powered off.
    Off,

    /// The VM state was saved to disk.
    Saved,

    /// The VM is paused.
    Paused,

    /// Any other state string the hypervisor reports (e.g. transitional states).
    Other(String),
}

/// A point-in-time description of one virtual machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct VmInfo {
    /// The VM name. Stable identity key across polls.
    #[builder(setter(into))]
    name: String,

    /// The lifecycle state of the VM.
    #[builder(default = VmState::Off)]
    state: VmState,

    /// CPU usage in percent.
    #[builder(default)]
    cpu_usage: u32,

    /// Memory assigned to the VM in MiB.
    #[builder(default)]
    memory_assigned_mb: u64,

    /// Uptime as reported by the hypervisor.
    #[builder(default, setter(into))]
    uptime: String,

    /// Whether a GPU partition adapter is attached.
    #[builder(default)]
    has_gpu: bool,

    /// The number of virtual processors.
    #[builder(default)]
    cpu_cores: u32,

    /// The network switch the VM is connected to.
    #[builder(default, setter(into))]
    network_switch: String,

    /// The IP address of the VM, when one is known.
    #[builder(default, setter(into, strip_option))]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    ip_address: Option<String>,
}

/// A full-replacement snapshot of the VM inventory.
///
/// The reconciler publishes a new value on every successful poll; readers always observe either
/// the previous or the next complete snapshot, never a partial merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct VmInventory {
    /// The listed VMs, in backend order.
    vms: Vec<VmInfo>,

    /// When the snapshot was taken. `None` until the first successful poll.
    polled_at: Option<DateTime<Utc>>,
}

/// The backend's response to a create-VM request.
///
/// A receipt can carry a recoverable sub-error: the VM was provisioned but a follow-up step
/// (typically the GPU partition attachment) failed. That case is distinct from the VM not
/// existing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ProvisionReceipt {
    /// Human-readable completion message.
    message: String,

    /// The error of a failed follow-up step, if any. The primary resource exists regardless.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    error: Option<String>,
}

/// A GPU installed on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct GpuInfo {
    /// The adapter name.
    #[builder(setter(into))]
    name: String,

    /// The installed driver version.
    #[builder(default, setter(into))]
    driver_version: String,

    /// Whether the adapter supports GPU partitioning.
    #[builder(default)]
    supports_partitioning: bool,
}

/// Host capability information returned by the backend system check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct SystemInfo {
    /// The host OS version.
    #[builder(default, setter(into))]
    os_version: String,

    /// The host OS edition.
    #[builder(default, setter(into))]
    os_edition: String,

    /// Whether the hypervisor is enabled on the host.
    #[builder(default)]
    hyper_v_enabled: bool,

    /// GPUs installed on the host.
    #[builder(default)]
    gpu_list: Vec<GpuInfo>,

    /// Total physical memory in GiB.
    #[builder(default)]
    available_memory_gb: f64,

    /// Requirement violations detected by the backend, empty when the host is ready.
    #[builder(default)]
    issues: Vec<String>,
}

/// A virtual network switch available on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct NetworkSwitch {
    /// The switch name.
    #[builder(setter(into))]
    name: String,

    /// The switch type (external, internal, private).
    #[builder(default, setter(into))]
    switch_type: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl VmState {
    /// Parses a hypervisor-reported state string, falling back to [`VmState::Other`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => VmState::Running,
            "off" => VmState::Off,
            "saved" => VmState::Saved,
            "paused" => VmState::Paused,
            _ => VmState::Other(raw.trim().to_string()),
        }
    }

    /// Returns whether the VM is powered on and running.
    pub fn is_running(&self) -> bool {
        matches!(self, VmState::Running)
    }
}

impl VmInventory {
    /// Creates a snapshot stamped with the current time.
    pub fn new(vms: Vec<VmInfo>) -> Self {
        Self {
            vms,
            polled_at: Some(Utc::now()),
        }
    }

    /// Looks up a VM by name.
    pub fn find(&self, name: &str) -> Option<&VmInfo> {
        self.vms.iter().find(|vm| vm.get_name() == name)
    }

    /// Returns whether at least one poll has completed.
    pub fn has_polled(&self) -> bool {
        self.polled_at.is_some()
    }
}

impl ProvisionReceipt {
    /// Creates a receipt for a fully successful provision.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    /// Creates a receipt for a provision whose primary effect succeeded but whose follow-up
    /// step failed.
    pub fn partial(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmState::Running => write!(f, "Running"),
            VmState::Off => write!(f, "Off"),
            VmState::Saved => write!(f, "Saved"),
            VmState::Paused => write!(f, "Paused"),
            VmState::Other(raw) => write!(f, "{}", raw),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
