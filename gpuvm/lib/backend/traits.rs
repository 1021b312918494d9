use std::pin::Pin;

use futures::Stream;

use crate::{
    config::{VmConfig, VmUpdateConfig},
    models::{NetworkSwitch, ProvisionReceipt, SystemInfo, VmInfo},
    settings::ConnectionSettings,
    GpuVmResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A live operation-log channel: raw text lines scoped to the operation currently running for
/// one target. The backend ends the stream when the operation finishes.
pub type OperationLogStream = Pin<Box<dyn Stream<Item = String> + Send>>;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The management backend the console drives.
///
/// All calls suspend at the boundary and resume on response; none of them spin or block a
/// shared thread. Long-running operations (`create_vm`, `update_vm`) additionally emit log
/// lines on the channel returned by [`subscribe_operation_log`](Self::subscribe_operation_log);
/// callers that want the full transcript must subscribe *before* issuing the request.
#[async_trait::async_trait]
pub trait VmBackend: Send + Sync {
    /// Checks host capabilities and requirement violations.
    async fn check_system(&self) -> GpuVmResult<SystemInfo>;

    /// Lists all VMs known to the hypervisor.
    async fn list_vms(&self) -> GpuVmResult<Vec<VmInfo>>;

    /// Provisions a new VM and attaches its GPU partition.
    ///
    /// A receipt carrying an error means the VM was created but a follow-up step failed; the
    /// call only returns `Err` when nothing was provisioned at all.
    async fn create_vm(&self, config: &VmConfig) -> GpuVmResult<ProvisionReceipt>;

    /// Applies hardware changes to an existing VM. Returns a completion message; faults on
    /// failure.
    async fn update_vm(&self, config: &VmUpdateConfig) -> GpuVmResult<String>;

    /// Starts a VM.
    async fn start_vm(&self, name: &str) -> GpuVmResult<()>;

    /// Stops a VM, forcefully when requested.
    async fn stop_vm(&self, name: &str, force: bool) -> GpuVmResult<()>;

    /// Deletes a VM.
    async fn delete_vm(&self, name: &str) -> GpuVmResult<()>;

    /// Requests cancellation of the operation currently running for the named target.
    /// Best-effort: a no-op when the operation already finished.
    async fn cancel_operation(&self, name: &str) -> GpuVmResult<()>;

    /// Lists the virtual network switches available on the host.
    async fn network_switches(&self) -> GpuVmResult<Vec<NetworkSwitch>>;

    /// Returns the host's default virtual hard disk directory, used to pre-fill the create
    /// form.
    async fn default_vhd_path(&self) -> GpuVmResult<String>;

    /// Loads the connection settings blob for a VM, if one was saved.
    async fn load_settings(&self, name: &str) -> GpuVmResult<Option<ConnectionSettings>>;

    /// Saves the connection settings blob for a VM, overwriting any previous one.
    async fn save_settings(&self, name: &str, settings: &ConnectionSettings) -> GpuVmResult<()>;

    /// Opens the operation-log channel for a target.
    async fn subscribe_operation_log(&self, name: &str) -> GpuVmResult<OperationLogStream>;
}
