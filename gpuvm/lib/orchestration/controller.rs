use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tracing::{debug, info, warn};

use crate::{
    backend::VmBackend,
    events::LogSubscription,
    log::{AuditLog, LogLevel},
    GpuVmError, GpuVmResult,
};

use super::{Job, JobFailureCause, JobRequest, JobStatus};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Transcript marker appended the moment a cancellation is requested.
pub const CANCEL_REQUESTED_MARKER: &str = "Cancelling operation...";

/// Transcript marker appended once a cancellation settled the job.
pub const CANCELLED_MARKER: &str = "Operation cancelled by user";

/// Audit log source tag for controller entries.
const AUDIT_SOURCE: &str = "jobs";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Drives long-running jobs against the backend.
///
/// At most one non-terminal job exists per target at any time. A finished job keeps its status
/// and transcript until it is dismissed or a new submission for the same target replaces it.
#[derive(Debug)]
pub struct JobController<B: VmBackend> {
    backend: Arc<B>,
    audit: AuditLog,
    jobs: Mutex<HashMap<String, Arc<Job>>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<B: VmBackend + 'static> JobController<B> {
    /// Creates a controller over the given backend.
    pub fn new(backend: Arc<B>, audit: AuditLog) -> Self {
        Self {
            backend,
            audit,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Submits a job.
    ///
    /// The request is validated first; a rejected request touches neither the backend nor the
    /// job registry. The operation-log channel is opened *before* the backend request goes out,
    /// so the transcript captures every line the operation emits. The returned job is already
    /// running; observe it through [`Job::watch`] or [`Job::wait_terminal`].
    pub async fn submit(&self, request: JobRequest) -> GpuVmResult<Arc<Job>> {
        request.validate()?;

        let target = request.target().to_string();
        let kind = request.kind();
        let job = Arc::new(Job::new(target.clone(), kind));

        {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(existing) = jobs.get(&target) {
                if !existing.status().is_terminal() {
                    return Err(GpuVmError::JobAlreadyRunning(target));
                }
            }
            // A terminal leftover for the same target is replaced wholesale.
            jobs.insert(target.clone(), job.clone());
        }

        let stream = match self.backend.subscribe_operation_log(&target).await {
            Ok(stream) => stream,
            Err(error) => {
                self.jobs.lock().unwrap().remove(&target);
                self.audit.append(
                    LogLevel::Error,
                    AUDIT_SOURCE,
                    format!("Could not open log channel for '{}': {}", target, error),
                );
                return Err(error);
            }
        };

        job.start();
        info!(vm = %target, kind = %kind, "job started");
        self.audit.append(
            LogLevel::Info,
            AUDIT_SOURCE,
            format!("Started {} job for '{}'", kind, target),
        );

        let subscription = LogSubscription::attach(target.clone(), stream, {
            let transcript = job.transcript().clone();
            move |line| transcript.append(line)
        });

        tokio::spawn(Self::drive(
            self.backend.clone(),
            self.audit.clone(),
            job.clone(),
            request,
            subscription,
        ));

        Ok(job)
    }

    /// Requests cancellation of the job for a target.
    ///
    /// A cancel against a target with no job fails with [`GpuVmError::JobNotFound`]; a cancel
    /// against an already-finished job is a silent no-op. Otherwise the backend is asked to
    /// abort the operation and the job settles as cancelled, even if the backend's own result
    /// arrives later.
    ///
    /// The operation's own result can land while the abort request is in flight. The first
    /// terminal transition wins: such a job keeps its backend outcome, and its transcript
    /// carries the request marker but never [`CANCELLED_MARKER`].
    pub async fn cancel(&self, target: &str) -> GpuVmResult<()> {
        let job = self
            .jobs
            .lock()
            .unwrap()
            .get(target)
            .cloned()
            .ok_or_else(|| GpuVmError::JobNotFound(target.to_string()))?;

        if job.status().is_terminal() {
            return Ok(());
        }

        job.transcript().append(CANCEL_REQUESTED_MARKER);

        if let Err(error) = self.backend.cancel_operation(target).await {
            warn!(vm = %target, %error, "cancellation request failed");
            job.transcript()
                .append(format!("Cancellation request failed: {}", error));
            self.audit.append(
                LogLevel::Warn,
                AUDIT_SOURCE,
                format!("Could not cancel job for '{}': {}", target, error),
            );
            return Err(error);
        }

        let applied = job.complete(JobStatus::Failed {
            cause: JobFailureCause::Cancelled,
            message: "Operation cancelled".to_string(),
        });

        if applied {
            job.transcript().append(CANCELLED_MARKER);
            self.audit.append(
                LogLevel::Warn,
                AUDIT_SOURCE,
                format!("Job for '{}' cancelled by user", target),
            );
        }

        Ok(())
    }

    /// Removes a finished job from the registry, releasing its transcript.
    ///
    /// Fails with [`GpuVmError::JobStillRunning`] when the job has not settled yet.
    pub fn dismiss(&self, target: &str) -> GpuVmResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get(target)
            .ok_or_else(|| GpuVmError::JobNotFound(target.to_string()))?;

        if !job.status().is_terminal() {
            return Err(GpuVmError::JobStillRunning(target.to_string()));
        }

        jobs.remove(target);
        Ok(())
    }

    /// Looks up the job for a target, running or finished.
    pub fn job(&self, target: &str) -> Option<Arc<Job>> {
        self.jobs.lock().unwrap().get(target).cloned()
    }

    /// Returns all registered jobs.
    pub fn jobs(&self) -> Vec<Arc<Job>> {
        self.jobs.lock().unwrap().values().cloned().collect()
    }

    /// Runs the backend call for a job and settles it.
    ///
    /// Owns the log subscription for the job's lifetime; it is closed on every exit path so a
    /// cancelled job does not leak its reader task.
    async fn drive(
        backend: Arc<B>,
        audit: AuditLog,
        job: Arc<Job>,
        request: JobRequest,
        subscription: LogSubscription,
    ) {
        let outcome = match &request {
            JobRequest::Create(config) => match backend.create_vm(config).await {
                Ok(receipt) => match receipt.get_error() {
                    Some(error) => JobStatus::Failed {
                        cause: JobFailureCause::PartialProvision,
                        message: format!(
                            "VM '{}' was created, but a follow-up step failed: {}",
                            job.target(),
                            error
                        ),
                    },
                    None => JobStatus::Succeeded {
                        message: receipt.get_message().clone(),
                    },
                },
                Err(error) => JobStatus::Failed {
                    cause: JobFailureCause::Backend,
                    message: error.to_string(),
                },
            },
            JobRequest::Update(config) => match backend.update_vm(config).await {
                Ok(message) => JobStatus::Succeeded { message },
                Err(error) => JobStatus::Failed {
                    cause: JobFailureCause::Backend,
                    message: error.to_string(),
                },
            },
        };

        let applied = job.complete(outcome.clone());

        // Drain the lines the operation emitted before its response arrived; the terminal
        // marker must land after every streamed line.
        subscription.close().await;

        if applied {
            match &outcome {
                JobStatus::Succeeded { message } => {
                    audit.append(LogLevel::Success, AUDIT_SOURCE, message.clone());
                }
                JobStatus::Failed { cause, message } => {
                    job.transcript().append(format!("ERROR: {}", message));
                    let level = match cause {
                        JobFailureCause::PartialProvision => LogLevel::Warn,
                        _ => LogLevel::Error,
                    };
                    audit.append(level, AUDIT_SOURCE, message.clone());
                }
                _ => {}
            }
        } else {
            // The job settled elsewhere (cancellation) while the backend call was in flight.
            debug!(vm = %job.target(), "late job result ignored");
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
