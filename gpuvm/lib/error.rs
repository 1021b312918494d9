use std::{
    error::Error,
    fmt::{self, Display},
};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a gpuvm-related operation.
pub type GpuVmResult<T> = Result<T, GpuVmError>;

/// An error that occurred during a VM management operation.
#[derive(Debug, Error)]
pub enum GpuVmError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),

    /// A request or event-channel failure at the hypervisor backend boundary.
    #[error("backend error: {0}")]
    Backend(String),

    /// One or more local validation failures for a VM configuration.
    /// Raised before the backend is contacted.
    #[error("invalid vm configuration: {}", .0.join("; "))]
    ConfigValidation(Vec<String>),

    /// A job was submitted for a target that already has a non-terminal job.
    #[error("a job is already running for vm '{0}'")]
    JobAlreadyRunning(String),

    /// No job is tracked for the given target.
    #[error("no job found for vm '{0}'")]
    JobNotFound(String),

    /// A terminal-only operation was attempted while the job was still running.
    #[error("job for vm '{0}' has not finished")]
    JobStillRunning(String),
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl GpuVmError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> GpuVmError {
        GpuVmError::Custom(AnyError {
            error: error.into(),
        })
    }
}

impl AnyError {
    /// Downcasts the error to a `T`.
    pub fn downcast<T>(&self) -> Option<&T>
    where
        T: Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<T>()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `GpuVmResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> GpuVmResult<T> {
    Result::Ok(value)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}
