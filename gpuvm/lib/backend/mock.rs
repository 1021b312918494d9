//! A scripted in-memory backend for unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{
    config::{VmConfig, VmUpdateConfig},
    models::{GpuInfo, NetworkSwitch, ProvisionReceipt, SystemInfo, VmInfo, VmState},
    settings::ConnectionSettings,
    GpuVmError, GpuVmResult,
};

use super::{OperationLogStream, VmBackend};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// How the next long-running operation behaves.
#[derive(Debug, Clone)]
pub(crate) enum MockOutcome {
    /// Emit `lines`, end the stream, respond with a clean receipt.
    Success {
        lines: Vec<String>,
        message: String,
    },

    /// Emit `lines`, end the stream, respond with a receipt carrying a follow-up error.
    /// The VM is still added to the inventory.
    Partial {
        lines: Vec<String>,
        message: String,
        error: String,
    },

    /// Emit `lines`, end the stream, fault the call outright.
    Fault { lines: Vec<String>, message: String },

    /// Emit `lines`, then block until `cancel_operation` is called, then fault.
    HangUntilCancel { lines: Vec<String> },
}

pub(crate) struct MockBackend {
    vms: Mutex<Vec<VmInfo>>,
    switches: Vec<NetworkSwitch>,
    settings: Mutex<HashMap<String, ConnectionSettings>>,
    outcome: Mutex<MockOutcome>,
    channels: Mutex<HashMap<String, mpsc::UnboundedSender<String>>>,
    scripted_inventories: Mutex<VecDeque<Result<Vec<VmInfo>, String>>>,
    fail_settings: AtomicBool,
    fail_subscribe: AtomicBool,
    cancel_tx: watch::Sender<bool>,
    subscribe_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MockBackend {
    pub(crate) fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            vms: Mutex::new(Vec::new()),
            switches: vec![
                NetworkSwitch::builder()
                    .name("Default Switch")
                    .switch_type("Internal")
                    .build(),
                NetworkSwitch::builder()
                    .name("External")
                    .switch_type("External")
                    .build(),
            ],
            settings: Mutex::new(HashMap::new()),
            outcome: Mutex::new(MockOutcome::Success {
                lines: Vec::new(),
                message: "VM Provisioned Successfully!".to_string(),
            }),
            channels: Mutex::new(HashMap::new()),
            scripted_inventories: Mutex::new(VecDeque::new()),
            fail_settings: AtomicBool::new(false),
            fail_subscribe: AtomicBool::new(false),
            cancel_tx,
            subscribe_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_outcome(&self, outcome: MockOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub(crate) fn insert_vm(&self, vm: VmInfo) {
        self.vms.lock().unwrap().push(vm);
    }

    pub(crate) fn push_inventory(&self, result: Result<Vec<VmInfo>, String>) {
        self.scripted_inventories.lock().unwrap().push_back(result);
    }

    pub(crate) fn set_fail_settings(&self, fail: bool) {
        self.fail_settings.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    fn emit(&self, name: &str, lines: &[String]) {
        let channels = self.channels.lock().unwrap();
        if let Some(tx) = channels.get(name) {
            for line in lines {
                let _ = tx.send(line.clone());
            }
        }
    }

    fn end_stream(&self, name: &str) {
        self.channels.lock().unwrap().remove(name);
    }

    fn add_vm(&self, config: &VmConfig, has_gpu: bool) {
        self.insert_vm(
            VmInfo::builder()
                .name(config.get_name().clone())
                .state(VmState::Off)
                .memory_assigned_mb(u64::from(*config.get_memory_gb()) * 1024)
                .cpu_cores(*config.get_cpu_cores())
                .network_switch(config.get_network_switch().clone())
                .has_gpu(has_gpu)
                .build(),
        );
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait::async_trait]
impl VmBackend for MockBackend {
    async fn check_system(&self) -> GpuVmResult<SystemInfo> {
        Ok(SystemInfo::builder()
            .os_version("10.0.26100")
            .os_edition("Windows 11 Pro")
            .hyper_v_enabled(true)
            .gpu_list(vec![GpuInfo::builder()
                .name("NVIDIA GeForce RTX 4070")
                .driver_version("560.94")
                .supports_partitioning(true)
                .build()])
            .available_memory_gb(64.0)
            .build())
    }

    async fn list_vms(&self) -> GpuVmResult<Vec<VmInfo>> {
        if let Some(result) = self.scripted_inventories.lock().unwrap().pop_front() {
            return result.map_err(GpuVmError::Backend);
        }
        Ok(self.vms.lock().unwrap().clone())
    }

    async fn create_vm(&self, config: &VmConfig) -> GpuVmResult<ProvisionReceipt> {
        let outcome = self.outcome.lock().unwrap().clone();
        let name = config.get_name().clone();

        match outcome {
            MockOutcome::Success { lines, message } => {
                self.emit(&name, &lines);
                self.end_stream(&name);
                self.add_vm(config, true);
                Ok(ProvisionReceipt::success(message))
            }
            MockOutcome::Partial {
                lines,
                message,
                error,
            } => {
                self.emit(&name, &lines);
                self.end_stream(&name);
                self.add_vm(config, false);
                Ok(ProvisionReceipt::partial(message, error))
            }
            MockOutcome::Fault { lines, message } => {
                self.emit(&name, &lines);
                self.end_stream(&name);
                Err(GpuVmError::Backend(message))
            }
            MockOutcome::HangUntilCancel { lines } => {
                self.emit(&name, &lines);
                let mut cancelled = self.cancel_tx.subscribe();
                let _ = cancelled.wait_for(|c| *c).await;
                self.end_stream(&name);
                Err(GpuVmError::Backend("operation aborted by host".to_string()))
            }
        }
    }

    async fn update_vm(&self, config: &VmUpdateConfig) -> GpuVmResult<String> {
        let outcome = self.outcome.lock().unwrap().clone();
        let name = config.get_name().clone();

        match outcome {
            MockOutcome::Success { lines, message } | MockOutcome::Partial { lines, message, .. } => {
                self.emit(&name, &lines);
                self.end_stream(&name);
                Ok(message)
            }
            MockOutcome::Fault { lines, message } => {
                self.emit(&name, &lines);
                self.end_stream(&name);
                Err(GpuVmError::Backend(message))
            }
            MockOutcome::HangUntilCancel { lines } => {
                self.emit(&name, &lines);
                let mut cancelled = self.cancel_tx.subscribe();
                let _ = cancelled.wait_for(|c| *c).await;
                self.end_stream(&name);
                Err(GpuVmError::Backend("operation aborted by host".to_string()))
            }
        }
    }

    async fn start_vm(&self, name: &str) -> GpuVmResult<()> {
        let mut vms = self.vms.lock().unwrap();
        match vms.iter().position(|vm| vm.get_name() == name) {
            Some(index) => {
                let vm = vms.remove(index);
                // VmInfo is immutable by design; rebuild with the new state.
                vms.insert(
                    index,
                    VmInfo::builder()
                        .name(vm.get_name().clone())
                        .state(VmState::Running)
                        .memory_assigned_mb(*vm.get_memory_assigned_mb())
                        .cpu_cores(*vm.get_cpu_cores())
                        .network_switch(vm.get_network_switch().clone())
                        .has_gpu(*vm.get_has_gpu())
                        .build(),
                );
                Ok(())
            }
            None => Err(GpuVmError::Backend(format!("vm '{}' not found", name))),
        }
    }

    async fn stop_vm(&self, name: &str, _force: bool) -> GpuVmResult<()> {
        let mut vms = self.vms.lock().unwrap();
        match vms.iter().position(|vm| vm.get_name() == name) {
            Some(index) => {
                let vm = vms.remove(index);
                vms.insert(
                    index,
                    VmInfo::builder()
                        .name(vm.get_name().clone())
                        .state(VmState::Off)
                        .memory_assigned_mb(*vm.get_memory_assigned_mb())
                        .cpu_cores(*vm.get_cpu_cores())
                        .network_switch(vm.get_network_switch().clone())
                        .has_gpu(*vm.get_has_gpu())
                        .build(),
                );
                Ok(())
            }
            None => Err(GpuVmError::Backend(format!("vm '{}' not found", name))),
        }
    }

    async fn delete_vm(&self, name: &str) -> GpuVmResult<()> {
        self.vms.lock().unwrap().retain(|vm| vm.get_name() != name);
        Ok(())
    }

    async fn cancel_operation(&self, _name: &str) -> GpuVmResult<()> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.cancel_tx.send(true);
        Ok(())
    }

    async fn network_switches(&self) -> GpuVmResult<Vec<NetworkSwitch>> {
        Ok(self.switches.clone())
    }

    async fn default_vhd_path(&self) -> GpuVmResult<String> {
        Ok(r"C:\Users\Public\Documents\Hyper-V\Virtual Hard Disks\".to_string())
    }

    async fn load_settings(&self, name: &str) -> GpuVmResult<Option<ConnectionSettings>> {
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(GpuVmError::Backend("settings store unavailable".to_string()));
        }
        Ok(self.settings.lock().unwrap().get(name).cloned())
    }

    async fn save_settings(&self, name: &str, settings: &ConnectionSettings) -> GpuVmResult<()> {
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(GpuVmError::Backend("settings store unavailable".to_string()));
        }
        self.settings
            .lock()
            .unwrap()
            .insert(name.to_string(), settings.clone());
        Ok(())
    }

    async fn subscribe_operation_log(&self, name: &str) -> GpuVmResult<OperationLogStream> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(GpuVmError::Backend("log channel unavailable".to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.lock().unwrap().insert(name.to_string(), tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}
