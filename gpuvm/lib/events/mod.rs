//! Event stream plumbing for long-running operations.
//!
//! A [`LogSubscription`] owns the background task that pumps a backend operation-log stream
//! into a caller-supplied sink. Subscriptions are opened before the operation is requested so
//! no early lines are lost, and closed exactly once when the operation settles.

mod subscription;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use subscription::*;
