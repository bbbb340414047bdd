//! Port to the local container engine.
//!
//! [`ContainerEngine`] is the narrow set of engine calls the local backend
//! needs. [`BollardEngine`](crate::bollard_engine::BollardEngine) implements
//! it against a Docker daemon; tests implement it in memory.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::oneshot;

use crate::launch::RunSpec;

/// Failures reported by a [`ContainerEngine`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The referenced image or container does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other engine failure, with the engine's own message.
    #[error("{0}")]
    Api(String),

    /// The multiplexed output stream could not be decoded.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

/// One progress message from an image pull.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullProgress {
    /// Layer id the message refers to, if any.
    pub id: Option<String>,
    pub status: Option<String>,
    /// Human-readable progress bar, if any.
    pub progress: Option<String>,
}

impl PullProgress {
    /// Render as a single line, `<id>: <status> <progress>`.
    ///
    /// Returns `None` for messages that carry nothing printable.
    pub fn to_line(&self) -> Option<String> {
        let status = self.status.as_deref().unwrap_or_default();
        let body = match self.progress.as_deref() {
            Some(progress) if !progress.is_empty() => format!("{status} {progress}"),
            _ => status.to_string(),
        };
        if body.is_empty() {
            return None;
        }
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => Some(format!("{id}: {body}")),
            _ => Some(body),
        }
    }
}

/// One demultiplexed chunk of container output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFrame {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
}

/// The two independent completion signals of a unit.
///
/// Exactly one of them is expected to fire. A sender dropped without
/// sending means that signal will never arrive.
pub struct WaitSignals {
    /// Normal termination, carrying the exit code.
    pub exit: oneshot::Receiver<i64>,
    /// Infrastructure failure while waiting.
    pub failure: oneshot::Receiver<EngineError>,
}

impl WaitSignals {
    /// Create a connected pair of signals and their senders.
    pub fn channel() -> (oneshot::Sender<i64>, oneshot::Sender<EngineError>, Self) {
        let (exit_tx, exit) = oneshot::channel();
        let (failure_tx, failure) = oneshot::channel();
        (exit_tx, failure_tx, Self { exit, failure })
    }
}

/// Engine operations used by the local backend.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Look up image metadata. Absence is reported as [`EngineError::NotFound`].
    async fn inspect_image(&self, reference: &str) -> Result<(), EngineError>;

    /// Pull an image, yielding progress messages until the pull finishes.
    fn pull_image<'a>(
        &'a self,
        reference: &'a str,
    ) -> BoxStream<'a, Result<PullProgress, EngineError>>;

    /// Create a container from `spec` and return its id.
    async fn create_container(&self, spec: &RunSpec) -> Result<String, EngineError>;

    async fn start_container(&self, id: &str) -> Result<(), EngineError>;

    /// Follow both output streams until the container stops producing output.
    fn logs<'a>(&'a self, id: &'a str) -> BoxStream<'a, Result<LogFrame, EngineError>>;

    /// Start waiting for the container to stop.
    fn wait(&self, id: &str) -> WaitSignals;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_with_layer_and_bar() {
        let progress = PullProgress {
            id: Some("a3ed95caeb02".into()),
            status: Some("Downloading".into()),
            progress: Some("[=====>   ] 1.2MB/2.4MB".into()),
        };
        assert_eq!(
            progress.to_line().as_deref(),
            Some("a3ed95caeb02: Downloading [=====>   ] 1.2MB/2.4MB")
        );
    }

    #[test]
    fn progress_line_status_only() {
        let progress = PullProgress {
            status: Some("Pulling from library/hello".into()),
            ..Default::default()
        };
        assert_eq!(progress.to_line().as_deref(), Some("Pulling from library/hello"));
    }

    #[test]
    fn empty_progress_has_no_line() {
        assert_eq!(PullProgress::default().to_line(), None);
    }
}
