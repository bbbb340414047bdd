//! Entry points for running a job on the local container engine.
//!
//! The steps are strictly sequential: resolve image, launch, stream logs
//! until the output closes, then determine the exit status. No step is
//! retried and nothing runs in the background.

use tokio::io::AsyncWrite;

use rhino_core::{ExecutionHandle, ExecutionResult, JobRequest, RhinoError, RhinoResult};

use crate::completion::CompletionWatcher;
use crate::engine::ContainerEngine;
use crate::image::ImageResolver;
use crate::launch::ContainerLauncher;
use crate::logs::{LogStreamReader, LogSummary};

/// Local backend over any [`ContainerEngine`].
pub struct LocalBackend<E> {
    engine: E,
}

impl<E: ContainerEngine> LocalBackend<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Validate `request`, make sure its image is present, then create and
    /// start the container.
    ///
    /// Validation happens before any engine call. Pull progress is written
    /// to `progress`.
    pub async fn launch<W>(
        &self,
        request: &JobRequest,
        progress: &mut W,
    ) -> RhinoResult<ExecutionHandle>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        request.validate()?;
        ImageResolver::new(&self.engine)
            .ensure(&request.image, progress)
            .await?;
        ContainerLauncher::new(&self.engine).launch(request).await
    }

    /// Forward the container's output until its stream closes.
    pub async fn stream_logs<O, R>(
        &self,
        handle: &ExecutionHandle,
        stdout: &mut O,
        stderr: &mut R,
    ) -> RhinoResult<LogSummary>
    where
        O: AsyncWrite + Unpin + ?Sized,
        R: AsyncWrite + Unpin + ?Sized,
    {
        LogStreamReader::new(&self.engine)
            .stream(handle, stdout, stderr)
            .await
    }

    /// Determine how the container terminated. Consumes the handle.
    pub async fn await_completion(&self, handle: ExecutionHandle) -> RhinoResult<ExecutionResult> {
        CompletionWatcher::new(&self.engine).wait(handle).await
    }

    /// Run the whole local lifecycle for `request`.
    ///
    /// Pull progress and container stdout go to `stdout`, container stderr
    /// to `stderr`. A malformed output stream is logged and the run still
    /// proceeds to completion. A nonzero exit is a normal result, not an
    /// error.
    pub async fn run<O, R>(
        &self,
        request: &JobRequest,
        stdout: &mut O,
        stderr: &mut R,
    ) -> RhinoResult<ExecutionResult>
    where
        O: AsyncWrite + Unpin + ?Sized,
        R: AsyncWrite + Unpin + ?Sized,
    {
        let handle = self.launch(request, stdout).await?;

        match self.stream_logs(&handle, stdout, stderr).await {
            Ok(_) => {}
            Err(e @ RhinoError::Stream { .. }) => {
                tracing::warn!(handle = %handle, error = %e, "Log streaming aborted");
            }
            Err(e) => return Err(e),
        }

        self.await_completion(handle).await
    }
}
