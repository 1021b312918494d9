use std::{
    fmt::{self, Display},
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{
    config::{VmConfig, VmUpdateConfig},
    GpuVmResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The kind of long-running operation a job drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    /// Provision a new VM with a GPU partition.
    Create,

    /// Apply hardware changes to an existing VM.
    Update,
}

/// A request to run a long-running operation against one target VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobRequest {
    /// Provision a new VM.
    Create(VmConfig),

    /// Reconfigure an existing VM.
    Update(VmUpdateConfig),
}

/// Why a job ended in [`JobStatus::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobFailureCause {
    /// The backend faulted and nothing (or everything) was rolled back on its side.
    Backend,

    /// The primary resource was created but a follow-up step failed. The VM exists and shows up
    /// in the inventory.
    PartialProvision,

    /// The operator cancelled the job.
    Cancelled,
}

/// The lifecycle state of a job.
///
/// Transitions are monotone: `Idle -> Running -> {Succeeded | Failed}`, and a terminal state is
/// never left. A finished job keeps its status until the operator dismisses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Submitted but not yet running.
    Idle,

    /// The backend is executing the operation.
    Running,

    /// The operation completed cleanly.
    Succeeded {
        /// The backend's completion message.
        message: String,
    },

    /// The operation failed, was cancelled, or only partially applied.
    Failed {
        /// Why the job failed.
        cause: JobFailureCause,

        /// Operator-facing description of the failure.
        message: String,
    },
}

/// The in-order log lines captured for one job.
///
/// Append-only for the lifetime of the job; the transcript of a finished job stays readable
/// until the job is dismissed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

/// One long-running operation and its observable state.
///
/// The status is published through a watch channel so any number of observers can follow the
/// job without polling.
#[derive(Debug)]
pub struct Job {
    target: String,
    kind: JobKind,
    transcript: Transcript,
    status_tx: watch::Sender<JobStatus>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl JobRequest {
    /// The VM name this request operates on.
    pub fn target(&self) -> &str {
        match self {
            JobRequest::Create(config) => config.get_name(),
            JobRequest::Update(config) => config.get_name(),
        }
    }

    /// The kind of job this request produces.
    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::Create(_) => JobKind::Create,
            JobRequest::Update(_) => JobKind::Update,
        }
    }

    /// Validates the embedded configuration, collecting every violation.
    pub fn validate(&self) -> GpuVmResult<()> {
        match self {
            JobRequest::Create(config) => config.validate(),
            JobRequest::Update(config) => config.validate(),
        }
    }
}

impl JobStatus {
    /// Returns whether this status is terminal. Terminal statuses are never left.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded { .. } | JobStatus::Failed { .. })
    }

    /// Returns whether the job is currently executing.
    pub fn is_running(&self) -> bool {
        matches!(self, JobStatus::Running)
    }

    /// The failure message, when the job failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            JobStatus::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl Transcript {
    /// Appends a line.
    pub fn append(&self, line: impl Into<String>) {
        self.lines.lock().unwrap().push(line.into());
    }

    /// Returns all lines in append order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Returns the number of captured lines.
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    /// Returns whether no lines were captured yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Job {
    /// Creates a job in [`JobStatus::Idle`].
    pub fn new(target: impl Into<String>, kind: JobKind) -> Self {
        let (status_tx, _) = watch::channel(JobStatus::Idle);
        Self {
            target: target.into(),
            kind,
            transcript: Transcript::default(),
            status_tx,
        }
    }

    /// The VM this job operates on.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The kind of operation this job drives.
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// The job's transcript handle.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The current status.
    pub fn status(&self) -> JobStatus {
        self.status_tx.borrow().clone()
    }

    /// Subscribes to status changes.
    pub fn watch(&self) -> watch::Receiver<JobStatus> {
        self.status_tx.subscribe()
    }

    /// Moves the job from idle to running. Does nothing if the job already left idle.
    pub fn start(&self) {
        self.status_tx.send_if_modified(|status| {
            if matches!(status, JobStatus::Idle) {
                *status = JobStatus::Running;
                true
            } else {
                false
            }
        });
    }

    /// Settles the job with a terminal outcome. Returns whether the outcome was applied: a job
    /// that is already terminal refuses further transitions, so a late backend result never
    /// overwrites a cancellation (or the other way round).
    pub fn complete(&self, outcome: JobStatus) -> bool {
        debug_assert!(outcome.is_terminal());
        self.status_tx.send_if_modified(|status| {
            if status.is_terminal() {
                false
            } else {
                *status = outcome;
                true
            }
        })
    }

    /// Waits until the job reaches a terminal status and returns it.
    pub async fn wait_terminal(&self) -> JobStatus {
        let mut rx = self.status_tx.subscribe();
        let terminal = match rx.wait_for(|status| status.is_terminal()).await {
            Ok(status) => status.clone(),
            // The sender lives in `self`, so this arm is unreachable in practice.
            Err(_) => self.status(),
        };
        terminal
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Create => write!(f, "create"),
            JobKind::Update => write!(f, "update"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_starts_idle_and_runs() {
        let job = Job::new("vm1", JobKind::Create);
        assert_eq!(job.status(), JobStatus::Idle);

        job.start();
        assert!(job.status().is_running());

        // Starting twice is harmless.
        job.start();
        assert!(job.status().is_running());
    }

    #[test]
    fn test_terminal_status_is_sticky() {
        let job = Job::new("vm1", JobKind::Create);
        job.start();

        let applied = job.complete(JobStatus::Failed {
            cause: JobFailureCause::Cancelled,
            message: "Operation cancelled".to_string(),
        });
        assert!(applied);

        // A late backend result must not overwrite the cancellation.
        let applied = job.complete(JobStatus::Succeeded {
            message: "VM Provisioned Successfully!".to_string(),
        });
        assert!(!applied);

        assert_eq!(
            job.status().error_message(),
            Some("Operation cancelled")
        );
    }

    #[test]
    fn test_complete_from_idle_is_allowed() {
        // A job can settle without ever running, e.g. when the request is rejected after
        // registration.
        let job = Job::new("vm1", JobKind::Update);
        assert!(job.complete(JobStatus::Failed {
            cause: JobFailureCause::Backend,
            message: "backend unreachable".to_string(),
        }));
        assert!(job.status().is_terminal());
    }

    #[test_log::test(tokio::test)]
    async fn test_wait_terminal_observes_outcome() {
        let job = std::sync::Arc::new(Job::new("vm1", JobKind::Create));
        job.start();

        let waiter = {
            let job = job.clone();
            tokio::spawn(async move { job.wait_terminal().await })
        };

        job.complete(JobStatus::Succeeded {
            message: "done".to_string(),
        });

        let status = waiter.await.unwrap();
        assert_eq!(
            status,
            JobStatus::Succeeded {
                message: "done".to_string()
            }
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_wait_terminal_on_settled_job_returns_immediately() {
        let job = Job::new("vm1", JobKind::Update);
        job.complete(JobStatus::Succeeded {
            message: "done".to_string(),
        });

        // No further transition will arrive; the wait must resolve with the current status.
        assert_eq!(
            job.wait_terminal().await,
            JobStatus::Succeeded {
                message: "done".to_string()
            }
        );
    }

    #[test]
    fn test_transcript_appends_in_order() {
        let transcript = Transcript::default();
        transcript.append("one");
        transcript.append("two");

        let clone = transcript.clone();
        clone.append("three");

        assert_eq!(transcript.lines(), vec!["one", "two", "three"]);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_job_kind_display() {
        assert_eq!(JobKind::Create.to_string(), "create");
        assert_eq!(JobKind::Update.to_string(), "update");
    }
}
