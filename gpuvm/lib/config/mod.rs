//! VM configuration types, defaults and validation.

mod defaults;
mod update;
mod validate;
mod vm;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use update::*;
pub use vm::*;
