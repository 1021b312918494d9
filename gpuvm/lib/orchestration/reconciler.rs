use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{trace, warn};

use crate::{
    backend::VmBackend,
    log::{AuditLog, LogLevel},
    models::VmInventory,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// How often the inventory is re-polled.
pub const DEFAULT_RECONCILE_PERIOD: Duration = Duration::from_secs(5);

/// Audit log source tag for reconciler entries.
const AUDIT_SOURCE: &str = "reconciler";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Keeps a full-replacement snapshot of the VM inventory fresh.
///
/// The first poll fires immediately on activation; after that the backend is polled on a fixed
/// period. Each successful poll replaces the published snapshot wholesale, so observers never
/// see a partially merged inventory. A failed poll keeps the previous snapshot and records a
/// warning.
#[derive(Debug)]
pub struct VmReconciler<B: VmBackend> {
    backend: Arc<B>,
    audit: AuditLog,
    period: Duration,
}

/// A handle to a running reconciler.
///
/// Dropping the handle stops the poll loop.
#[derive(Debug)]
pub struct ReconcilerHandle {
    task: JoinHandle<()>,
    inventory_rx: watch::Receiver<VmInventory>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<B: VmBackend + 'static> VmReconciler<B> {
    /// Creates a reconciler with the default poll period.
    pub fn new(backend: Arc<B>, audit: AuditLog) -> Self {
        Self {
            backend,
            audit,
            period: DEFAULT_RECONCILE_PERIOD,
        }
    }

    /// Overrides the poll period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Starts the poll loop and returns a handle to it.
    pub fn spawn(self) -> ReconcilerHandle {
        let Self {
            backend,
            audit,
            period,
        } = self;

        let (inventory_tx, inventory_rx) = watch::channel(VmInventory::default());

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // The first tick resolves immediately.
                ticker.tick().await;

                match backend.list_vms().await {
                    Ok(vms) => {
                        trace!(count = vms.len(), "inventory polled");
                        inventory_tx.send_replace(VmInventory::new(vms));
                    }
                    Err(error) => {
                        warn!(%error, "inventory poll failed");
                        audit.append(
                            LogLevel::Warn,
                            AUDIT_SOURCE,
                            format!("Inventory poll failed: {}", error),
                        );
                    }
                }
            }
        });

        ReconcilerHandle { task, inventory_rx }
    }
}

impl ReconcilerHandle {
    /// Returns the latest snapshot.
    pub fn inventory(&self) -> VmInventory {
        self.inventory_rx.borrow().clone()
    }

    /// Subscribes to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<VmInventory> {
        self.inventory_rx.clone()
    }

    /// Stops the poll loop. Subscribers observe the channel closing.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
