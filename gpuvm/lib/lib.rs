//! `gpuvm` is the orchestration core of a management console for provisioning and operating
//! Hyper-V virtual machines with GPU partitioning.
//!
//! # Overview
//!
//! The surrounding console is mostly presentational; this crate owns the only parts with real
//! temporal and concurrency hazards:
//!
//! - Long-running job orchestration (create VM, reconfigure VM) with a small status state machine
//! - Live operation-log transcripts, subscribed before the backend call is issued so no early
//!   lines are lost
//! - Mid-flight cancellation, modeled as a distinguished error cause rather than an extra state
//! - Periodic reconciliation of the VM inventory, independent of in-flight jobs
//! - A process-wide append-only audit log
//! - Advisory per-VM connection settings
//!
//! The hypervisor itself is an opaque collaborator reached through the [`backend::VmBackend`]
//! trait: a request/response surface plus a per-operation event stream of raw log lines.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gpuvm::{
//!     config::VmConfig,
//!     orchestration::{JobController, JobRequest},
//!     AuditLog,
//! };
//! # use gpuvm::backend::VmBackend;
//! # async fn demo(backend: Arc<impl VmBackend + 'static>) -> anyhow::Result<()> {
//! let audit = AuditLog::new();
//! let controller = JobController::new(backend, audit);
//!
//! let config = VmConfig::builder()
//!     .name("gpu-vm-1")
//!     .iso_path(r"C:\Downloads\Win11.iso")
//!     .vhd_path(r"C:\Hyper-V\Virtual Hard Disks")
//!     .password("hunter2")
//!     .build();
//!
//! let job = controller.submit(JobRequest::Create(config)).await?;
//! let status = job.wait_terminal().await;
//! println!("job finished: {:?}", status);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`backend`] - The opaque hypervisor boundary and its event channel
//! - [`config`] - VM configuration types, defaults and validation
//! - [`events`] - Operation-log subscription handles
//! - [`models`] - Inventory snapshots and read-only reference data
//! - [`orchestration`] - Job controller, job state machine and inventory reconciler
//! - [`settings`] - Advisory per-VM connection settings

#![warn(missing_docs)]

mod error;
mod log;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod backend;
pub mod config;
pub mod events;
pub mod models;
pub mod orchestration;
pub mod settings;

pub use error::*;
pub use log::*;
