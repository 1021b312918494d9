//! Long-running job orchestration.
//!
//! [`JobController`] drives provisioning and reconfiguration jobs against the backend: one
//! non-terminal job per target, live transcripts, cancellation, and terminal outcomes that
//! survive until the operator dismisses them. [`VmReconciler`] keeps a full-replacement
//! inventory snapshot fresh on a fixed period.

mod controller;
mod job;
mod reconciler;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use controller::*;
pub use job::*;
pub use reconciler::*;
