//! Translate a job request into a container and start it.

use rhino_core::{Backend, ExecutionHandle, JobRequest, RhinoError, RhinoResult};

use crate::engine::ContainerEngine;

/// Parallel launcher invoked as the container entrypoint.
pub const MPI_LAUNCHER: &str = "mpirun";

/// Well-known path of the workload executable inside the image.
pub const FUNC_EXECUTABLE: &str = "/app/mpi-func";

/// Silences Open MPI's "unused component" warning on single-host runs.
pub const SUPPRESS_MPI_WARNING_ENV: &str = "OMPI_MCA_btl_base_warn_component_unused=0";

/// Backend-neutral description of the container to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub entrypoint: Vec<String>,
    /// Program arguments, verbatim and in order.
    pub cmd: Vec<String>,
    pub env: Vec<String>,
    /// Zero or one `host:container` bind.
    pub binds: Vec<String>,
}

impl RunSpec {
    /// Build the run specification for a validated request.
    pub fn for_request(request: &JobRequest) -> Self {
        let entrypoint = vec![
            MPI_LAUNCHER.to_string(),
            "-np".to_string(),
            request.parallelism.to_string(),
            FUNC_EXECUTABLE.to_string(),
        ];

        let binds = request
            .volume
            .iter()
            .filter(|v| !v.host_path.is_empty() && !v.container_path.is_empty())
            .map(|v| v.to_bind())
            .collect();

        Self {
            image: request.image.clone(),
            entrypoint,
            cmd: request.program_args.clone(),
            env: vec![SUPPRESS_MPI_WARNING_ENV.to_string()],
            binds,
        }
    }
}

/// Creates and starts the container for a request.
pub struct ContainerLauncher<'e, E: ?Sized> {
    engine: &'e E,
}

impl<'e, E: ContainerEngine + ?Sized> ContainerLauncher<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Create and start a container for `request`.
    ///
    /// The image must already be resolved. On failure no handle is
    /// returned, so the caller makes no further lifecycle calls.
    pub async fn launch(&self, request: &JobRequest) -> RhinoResult<ExecutionHandle> {
        let spec = RunSpec::for_request(request);
        let launch_error = |detail: String| RhinoError::Launch {
            image: request.image.clone(),
            detail,
        };

        let id = self
            .engine
            .create_container(&spec)
            .await
            .map_err(|e| launch_error(format!("create failed: {e}")))?;

        self.engine
            .start_container(&id)
            .await
            .map_err(|e| launch_error(format!("start of container {id} failed: {e}")))?;

        tracing::info!(
            image = %request.image,
            container_id = %id,
            parallelism = request.parallelism,
            "Container started",
        );

        Ok(ExecutionHandle::new(Backend::Docker, id))
    }
}
