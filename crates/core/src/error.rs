/// Errors surfaced by the job execution engine.
///
/// Every variant carries enough context (step, image, handle or job name)
/// for the message to be actionable on its own. Nothing in the engine
/// retries; callers receive these unchanged in kind.
#[derive(Debug, thiserror::Error)]
pub enum RhinoError {
    /// The request was rejected at the boundary, before any backend call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Cluster configuration is missing or unreadable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backend is unreachable or returned an unexpected failure.
    #[error("Backend error during {step}: {detail}")]
    Backend { step: &'static str, detail: String },

    /// The named image could not be fetched.
    #[error("Failed to pull image '{reference}': {detail}")]
    ImagePull { reference: String, detail: String },

    /// The run specification was rejected or the unit failed to start.
    #[error("Failed to launch '{image}': {detail}")]
    Launch { image: String, detail: String },

    /// The unit's output stream was malformed. The unit itself keeps running.
    #[error("Malformed output stream from {handle}: {detail}")]
    Stream { handle: String, detail: String },

    /// The cluster API rejected the job descriptor.
    #[error("Failed to submit job '{job}': {detail}")]
    Submission { job: String, detail: String },

    /// Writing to a caller-provided sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RhinoError {
    /// Shorthand for a [`RhinoError::Backend`] at a named step.
    pub fn backend(step: &'static str, detail: impl std::fmt::Display) -> Self {
        Self::Backend {
            step,
            detail: detail.to_string(),
        }
    }
}

pub type RhinoResult<T> = Result<T, RhinoError>;
