//! The opaque hypervisor boundary.
//!
//! Everything the console knows about the hypervisor goes through [`VmBackend`]: a
//! request/response surface plus a per-operation event stream of raw log lines. No on-disk
//! format or wire protocol is owned on this side of the boundary.

mod traits;

#[cfg(test)]
pub(crate) mod mock;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use traits::*;
