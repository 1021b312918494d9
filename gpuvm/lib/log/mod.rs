//! Process-wide audit logging for the management console.

mod audit;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use audit::*;
