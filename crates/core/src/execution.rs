//! Execution handles, results and job status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exit code recorded when the backend lost track of the unit and no real
/// exit code is available.
pub const INFRASTRUCTURE_EXIT_CODE: i64 = -1;

// ---------------------------------------------------------------------------
// Backend / ExecutionHandle
// ---------------------------------------------------------------------------

/// Which backend issued a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Local container engine.
    Docker,
    /// Cluster job-orchestration API.
    Cluster,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Docker => f.write_str("docker"),
            Backend::Cluster => f.write_str("cluster"),
        }
    }
}

/// Opaque reference to one running unit: a container id or a job
/// resource name.
///
/// Deliberately not `Clone`: a handle has a single owner for the duration
/// of one execution and is consumed when its result is awaited.
#[derive(Debug, PartialEq, Eq)]
pub struct ExecutionHandle {
    id: String,
    backend: Backend,
}

impl ExecutionHandle {
    pub fn new(backend: Backend, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            backend,
        }
    }

    /// Backend-assigned identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Backend that issued this handle.
    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.id)
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Conceptual lifecycle of a job: `Pending -> Running -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Parse a status as reported by the cluster operator. Case is ignored;
    /// anything outside the four known states yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "Pending",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ExecutionResult
// ---------------------------------------------------------------------------

/// Why a unit ended up `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The workload exited with a nonzero code.
    NonZeroExit { code: i64 },
    /// The backend reported an infrastructure error before any exit code.
    Infrastructure { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NonZeroExit { .. } => f.write_str("non-zero exit"),
            FailureReason::Infrastructure { message } => {
                write!(f, "infrastructure error: {message}")
            }
        }
    }
}

/// Terminal outcome of one locally executed unit. Produced once per handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub exit_code: i64,
    pub failure: Option<FailureReason>,
}

impl ExecutionResult {
    /// Outcome of a normal termination carrying `exit_code`.
    pub fn from_exit_code(exit_code: i64) -> Self {
        let failure = (exit_code != 0).then_some(FailureReason::NonZeroExit { code: exit_code });
        Self { exit_code, failure }
    }

    /// Outcome when the backend's error signal won the race.
    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self {
            exit_code: INFRASTRUCTURE_EXIT_CODE,
            failure: Some(FailureReason::Infrastructure {
                message: message.into(),
            }),
        }
    }

    pub fn status(&self) -> JobStatus {
        if self.failure.is_none() {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == JobStatus::Completed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
