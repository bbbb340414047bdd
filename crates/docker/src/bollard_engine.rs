//! [`ContainerEngine`] backed by a Docker daemon through `bollard`.

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, StartContainerOptions,
    WaitContainerOptions,
};
use bollard::errors::Error as DockerError;
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::Docker;
use futures::stream::BoxStream;
use futures::StreamExt;

use rhino_core::{RhinoError, RhinoResult};

use crate::engine::{ContainerEngine, EngineError, LogFrame, PullProgress, WaitSignals};
use crate::image::split_reference;
use crate::launch::RunSpec;

/// Docker daemon client.
#[derive(Debug, Clone)]
pub struct BollardEngine {
    docker: Docker,
}

impl BollardEngine {
    /// Connect using the standard environment (`DOCKER_HOST`, local socket)
    /// and negotiate the API version with the daemon.
    pub async fn connect() -> RhinoResult<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| RhinoError::backend("docker connect", e))?
            .negotiate_version()
            .await
            .map_err(|e| RhinoError::backend("docker version negotiation", e))?;

        tracing::info!(api_version = ?docker.client_version(), "Connected to Docker daemon");
        Ok(Self { docker })
    }

    pub fn from_client(docker: Docker) -> Self {
        Self { docker }
    }
}

/// Map a bollard error onto the engine's error kinds.
fn classify(err: DockerError) -> EngineError {
    match err {
        DockerError::DockerResponseServerError {
            status_code: 404,
            message,
        } => EngineError::NotFound(message),
        DockerError::DockerResponseServerError {
            status_code,
            message,
        } => EngineError::Api(format!("{message} (status {status_code})")),
        DockerError::DockerStreamError { error } => EngineError::Api(error),
        DockerError::IOError { err } if err.kind() == std::io::ErrorKind::InvalidData => {
            EngineError::MalformedFrame(err.to_string())
        }
        other => EngineError::Api(other.to_string()),
    }
}

fn log_frame(output: LogOutput) -> Result<LogFrame, EngineError> {
    match output {
        LogOutput::StdOut { message } | LogOutput::Console { message } => {
            Ok(LogFrame::Stdout(message.to_vec()))
        }
        LogOutput::StdErr { message } => Ok(LogFrame::Stderr(message.to_vec())),
        LogOutput::StdIn { .. } => Err(EngineError::MalformedFrame(
            "unexpected stdin frame in output stream".to_string(),
        )),
    }
}

#[async_trait]
impl ContainerEngine for BollardEngine {
    async fn inspect_image(&self, reference: &str) -> Result<(), EngineError> {
        self.docker
            .inspect_image(reference)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    fn pull_image<'a>(
        &'a self,
        reference: &'a str,
    ) -> BoxStream<'a, Result<PullProgress, EngineError>> {
        let (from_image, tag) = split_reference(reference);
        let options = CreateImageOptions {
            from_image,
            tag,
            ..Default::default()
        };

        self.docker
            .create_image(Some(options), None, None)
            .map(|message| {
                let info = message.map_err(classify)?;
                if let Some(error) = info.error {
                    return Err(EngineError::Api(error));
                }
                Ok(PullProgress {
                    id: info.id,
                    status: info.status,
                    progress: info.progress,
                })
            })
            .boxed()
    }

    async fn create_container(&self, spec: &RunSpec) -> Result<String, EngineError> {
        let binds = (!spec.binds.is_empty()).then(|| spec.binds.clone());
        let config = Config {
            image: Some(spec.image.clone()),
            entrypoint: Some(spec.entrypoint.clone()),
            cmd: Some(spec.cmd.clone()),
            env: Some(spec.env.clone()),
            host_config: Some(HostConfig {
                binds,
                ..Default::default()
            }),
            ..Default::default()
        };

        let response = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await
            .map_err(classify)?;

        for warning in &response.warnings {
            tracing::warn!(
                container_id = %response.id,
                warning = %warning,
                "Container created with warning",
            );
        }
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(classify)
    }

    fn logs<'a>(&'a self, id: &'a str) -> BoxStream<'a, Result<LogFrame, EngineError>> {
        let options = LogsOptions::<String> {
            follow: true,
            stdout: true,
            stderr: true,
            tail: "all".to_string(),
            ..Default::default()
        };

        self.docker
            .logs(id, Some(options))
            .map(|output| output.map_err(classify).and_then(log_frame))
            .boxed()
    }

    fn wait(&self, id: &str) -> WaitSignals {
        let (exit_tx, failure_tx, signals) = WaitSignals::channel();
        let docker = self.docker.clone();
        let id = id.to_string();

        // The daemon reports a single wait response; bollard surfaces a
        // nonzero status as an error, which is still a normal exit here.
        tokio::spawn(async move {
            let options = WaitContainerOptions {
                condition: "not-running",
            };
            let mut responses = std::pin::pin!(docker.wait_container(&id, Some(options)));
            match responses.next().await {
                Some(Ok(response)) => {
                    let _ = exit_tx.send(response.status_code);
                }
                Some(Err(DockerError::DockerContainerWaitError { code, .. })) => {
                    let _ = exit_tx.send(code);
                }
                Some(Err(e)) => {
                    let _ = failure_tx.send(classify(e));
                }
                None => {
                    let _ = failure_tx.send(EngineError::Api(format!(
                        "wait stream for container {id} ended without a status"
                    )));
                }
            }
        });

        signals
    }
}
