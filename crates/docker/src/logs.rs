//! Follow a container's output and split it into stdout and stderr.
//!
//! [`LogStreamReader::stream`] blocks until the engine closes the output
//! stream, which in practice means the container has stopped. The close is
//! how the caller learns the job has finished producing output.

use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use rhino_core::{ExecutionHandle, RhinoError, RhinoResult};

use crate::engine::{ContainerEngine, EngineError, LogFrame};

/// Byte counts forwarded to each sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub stdout_bytes: u64,
    pub stderr_bytes: u64,
}

pub struct LogStreamReader<'e, E: ?Sized> {
    engine: &'e E,
}

impl<'e, E: ContainerEngine + ?Sized> LogStreamReader<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Forward output frames to `stdout` / `stderr` until the stream closes.
    ///
    /// A malformed frame ends streaming with [`RhinoError::Stream`]; the
    /// container is left running and can still be awaited.
    pub async fn stream<O, R>(
        &self,
        handle: &ExecutionHandle,
        stdout: &mut O,
        stderr: &mut R,
    ) -> RhinoResult<LogSummary>
    where
        O: AsyncWrite + Unpin + ?Sized,
        R: AsyncWrite + Unpin + ?Sized,
    {
        let mut summary = LogSummary::default();
        let mut frames = self.engine.logs(handle.id());

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(LogFrame::Stdout(bytes)) => {
                    stdout.write_all(&bytes).await?;
                    stdout.flush().await?;
                    summary.stdout_bytes += bytes.len() as u64;
                }
                Ok(LogFrame::Stderr(bytes)) => {
                    stderr.write_all(&bytes).await?;
                    stderr.flush().await?;
                    summary.stderr_bytes += bytes.len() as u64;
                }
                Err(EngineError::MalformedFrame(detail)) => {
                    return Err(RhinoError::Stream {
                        handle: handle.to_string(),
                        detail,
                    });
                }
                Err(e) => return Err(RhinoError::backend("log streaming", e)),
            }
        }

        tracing::debug!(
            handle = %handle,
            stdout_bytes = summary.stdout_bytes,
            stderr_bytes = summary.stderr_bytes,
            "Output stream closed",
        );
        Ok(summary)
    }
}
