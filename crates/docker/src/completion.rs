//! Decide how a container terminated.
//!
//! The engine offers two independent signals: a normal exit carrying a
//! code, and an infrastructure error. Whichever resolves first decides the
//! outcome; the other one is dropped unobserved.

use rhino_core::{Backend, ExecutionHandle, ExecutionResult, RhinoError, RhinoResult};

use crate::engine::{ContainerEngine, EngineError, WaitSignals};

pub struct CompletionWatcher<'e, E: ?Sized> {
    engine: &'e E,
}

impl<'e, E: ContainerEngine + ?Sized> CompletionWatcher<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Wait for the unit behind `handle` to terminate, consuming the handle.
    ///
    /// Call only after log streaming for the same handle has returned.
    pub async fn wait(&self, handle: ExecutionHandle) -> RhinoResult<ExecutionResult> {
        if handle.backend() != Backend::Docker {
            return Err(RhinoError::backend(
                "completion wait",
                format!("{handle} was not issued by the docker backend"),
            ));
        }
        let signals = self.engine.wait(handle.id());
        let result = first_signal(&handle, signals).await?;

        tracing::info!(
            handle = %handle,
            exit_code = result.exit_code,
            status = %result.status(),
            "Container finished",
        );
        Ok(result)
    }
}

/// Resolve on whichever of the two completion signals fires first.
///
/// A unit the engine no longer knows about is a backend error rather than
/// a job failure. If both senders are dropped without firing, the wait is
/// reported as a backend error too.
pub async fn first_signal(
    handle: &ExecutionHandle,
    signals: WaitSignals,
) -> RhinoResult<ExecutionResult> {
    let WaitSignals { exit, failure } = signals;

    tokio::select! {
        Ok(code) = exit => Ok(ExecutionResult::from_exit_code(code)),
        Ok(err) = failure => match err {
            EngineError::NotFound(detail) => Err(RhinoError::backend(
                "completion wait",
                format!("{handle} no longer exists: {detail}"),
            )),
            other => Ok(ExecutionResult::infrastructure(other.to_string())),
        },
        else => Err(RhinoError::backend(
            "completion wait",
            format!("{handle}: engine closed both completion signals"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use rhino_core::{FailureReason, JobStatus};

    use super::*;

    fn handle() -> ExecutionHandle {
        ExecutionHandle::new(Backend::Docker, "c0ffee")
    }

    #[tokio::test]
    async fn exit_zero_completes() {
        let (exit_tx, _failure_tx, signals) = WaitSignals::channel();
        exit_tx.send(0).unwrap();

        let result = first_signal(&handle(), signals).await.unwrap();
        assert_eq!(result.status(), JobStatus::Completed);
        assert_eq!(result.failure, None);
    }

    #[tokio::test]
    async fn nonzero_exit_fails_with_code() {
        let (exit_tx, _failure_tx, signals) = WaitSignals::channel();
        exit_tx.send(137).unwrap();

        let result = first_signal(&handle(), signals).await.unwrap();
        assert_eq!(result.status(), JobStatus::Failed);
        assert_eq!(result.exit_code, 137);
        assert_eq!(result.failure, Some(FailureReason::NonZeroExit { code: 137 }));
    }

    #[tokio::test]
    async fn infrastructure_error_wins_over_later_clean_exit() {
        let (exit_tx, failure_tx, signals) = WaitSignals::channel();
        failure_tx
            .send(EngineError::Api("daemon lost container state".into()))
            .unwrap();
        let late_exit = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = exit_tx.send(0);
        });

        let result = first_signal(&handle(), signals).await.unwrap();
        assert_eq!(result.status(), JobStatus::Failed);
        assert_matches!(
            result.failure,
            Some(FailureReason::Infrastructure { ref message }) if message.contains("daemon lost")
        );
        late_exit.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_failure_sender_still_waits_for_exit() {
        let (exit_tx, failure_tx, signals) = WaitSignals::channel();
        drop(failure_tx);
        let exit = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = exit_tx.send(3);
        });

        let result = first_signal(&handle(), signals).await.unwrap();
        assert_eq!(result.exit_code, 3);
        exit.await.unwrap();
    }

    #[tokio::test]
    async fn missing_container_is_backend_error() {
        let (_exit_tx, failure_tx, signals) = WaitSignals::channel();
        failure_tx
            .send(EngineError::NotFound("No such container: c0ffee".into()))
            .unwrap();

        let err = first_signal(&handle(), signals).await.unwrap_err();
        assert_matches!(err, RhinoError::Backend { step: "completion wait", .. });
    }

    #[tokio::test]
    async fn both_signals_dropped_is_backend_error() {
        let (exit_tx, failure_tx, signals) = WaitSignals::channel();
        drop(exit_tx);
        drop(failure_tx);

        let err = first_signal(&handle(), signals).await.unwrap_err();
        assert_matches!(err, RhinoError::Backend { .. });
    }
}
