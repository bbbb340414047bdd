//! Make sure an image is present locally before it is run.

use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use rhino_core::{RhinoError, RhinoResult};

use crate::engine::{ContainerEngine, EngineError};

/// What [`ImageResolver::ensure`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    /// Already present; no network access happened.
    Present,
    /// Missing locally and pulled.
    Pulled,
}

/// Resolves image references against the local engine, pulling on a miss.
pub struct ImageResolver<'e, E: ?Sized> {
    engine: &'e E,
}

impl<'e, E: ContainerEngine + ?Sized> ImageResolver<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Guarantee `reference` is available locally.
    ///
    /// A local hit returns immediately. A miss starts a pull and forwards
    /// every progress message to `progress`, one per line, as it arrives.
    pub async fn ensure<W>(&self, reference: &str, progress: &mut W) -> RhinoResult<ImageState>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        match self.engine.inspect_image(reference).await {
            Ok(()) => {
                tracing::debug!(image = %reference, "Image present locally");
                return Ok(ImageState::Present);
            }
            Err(EngineError::NotFound(_)) => {}
            Err(e) => return Err(RhinoError::backend("image inspection", e)),
        }

        tracing::info!(image = %reference, "Image not found locally, pulling");
        progress
            .write_all(format!("Image {reference} not found, pulling...\n").as_bytes())
            .await?;

        let mut stream = self.engine.pull_image(reference);
        while let Some(message) = stream.next().await {
            let message = message.map_err(|e| RhinoError::ImagePull {
                reference: reference.to_string(),
                detail: e.to_string(),
            })?;
            if let Some(line) = message.to_line() {
                progress.write_all(line.as_bytes()).await?;
                progress.write_all(b"\n").await?;
            }
        }
        progress.flush().await?;

        tracing::info!(image = %reference, "Image pulled");
        Ok(ImageState::Pulled)
    }
}

/// Split a reference into the repository and tag the engine pull API wants.
///
/// An untagged reference resolves to `latest`. Digest references are
/// passed through whole with an empty tag.
pub fn split_reference(reference: &str) -> (&str, &str) {
    if reference.contains('@') {
        return (reference, "");
    }
    let name_start = reference.rfind('/').map_or(0, |i| i + 1);
    match reference[name_start..].rfind(':') {
        Some(i) => {
            let colon = name_start + i;
            (&reference[..colon], &reference[colon + 1..])
        }
        None => (reference, "latest"),
    }
}
