//! Job requests and their boundary validation.
//!
//! A [`JobRequest`] is built once per invocation, validated with
//! [`JobRequest::validate`], and handed to exactly one backend launch or
//! submit call. Nothing downstream re-checks the invariants enforced here.

use serde::{Deserialize, Serialize};

use crate::error::RhinoError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default process count when none is given.
pub const DEFAULT_PARALLELISM: i64 = 1;

/// Default time-to-live for cluster jobs, in seconds.
pub const DEFAULT_TTL_SECS: i64 = 600;

// ---------------------------------------------------------------------------
// VolumeBinding
// ---------------------------------------------------------------------------

/// A `host:container` bind mount for the local backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBinding {
    pub host_path: String,
    pub container_path: String,
}

impl VolumeBinding {
    /// Parse a `<host-path>:<container-path>` flag value.
    ///
    /// Returns `Ok(None)` for an empty value or when both halves are empty
    /// (`":"`). A value without a separator, or with only one half filled
    /// in, is rejected.
    pub fn parse(spec: &str) -> Result<Option<Self>, RhinoError> {
        if spec.is_empty() {
            return Ok(None);
        }
        let (host, container) = spec.split_once(':').ok_or_else(|| {
            RhinoError::Validation(
                "invalid volume format, should be <host-path>:<container-path>".to_string(),
            )
        })?;
        Self::from_parts(host, container)
    }

    /// Build a binding from its two halves. Both empty means "no mount".
    pub fn from_parts(host_path: &str, container_path: &str) -> Result<Option<Self>, RhinoError> {
        match (host_path.is_empty(), container_path.is_empty()) {
            (true, true) => Ok(None),
            (false, false) => Ok(Some(Self {
                host_path: host_path.to_string(),
                container_path: container_path.to_string(),
            })),
            _ => Err(RhinoError::Validation(format!(
                "volume binding '{host_path}:{container_path}' must set both the host and the container path"
            ))),
        }
    }

    /// Render in the engine's bind syntax, `host:container`.
    pub fn to_bind(&self) -> String {
        format!("{}:{}", self.host_path, self.container_path)
    }
}

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Shared data server and directory mounted into every process of a
/// cluster job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    /// Address of the data (NFS) server.
    pub server: String,
    /// Directory on the server shared with all processes.
    pub path: String,
}

impl DataSource {
    /// Combine the two optional flag values. They must be given together.
    pub fn from_pair(
        server: Option<String>,
        path: Option<String>,
    ) -> Result<Option<Self>, RhinoError> {
        let server = server.filter(|s| !s.is_empty());
        let path = path.filter(|p| !p.is_empty());
        match (server, path) {
            (None, None) => Ok(None),
            (Some(server), Some(path)) => Ok(Some(Self { server, path })),
            _ => Err(RhinoError::Validation(
                "the data server and the data path must be specified together".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// JobRequest
// ---------------------------------------------------------------------------

/// Everything needed to run one parallel workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Image to run, e.g. `foo/matmul:v2.1`.
    pub image: String,
    /// Number of processes to launch.
    pub parallelism: i64,
    /// Arguments passed verbatim to the workload entrypoint.
    pub program_args: Vec<String>,
    /// Optional bind mount (local backend only).
    pub volume: Option<VolumeBinding>,
    /// Explicit namespace override (cluster backend only).
    pub namespace: Option<String>,
    /// Seconds the cluster keeps the job around (cluster backend only).
    pub ttl_secs: i64,
    /// Optional shared data mount (cluster backend only).
    pub data_source: Option<DataSource>,
}

impl JobRequest {
    /// Create a request for `image` with default settings.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            parallelism: DEFAULT_PARALLELISM,
            program_args: Vec::new(),
            volume: None,
            namespace: None,
            ttl_secs: DEFAULT_TTL_SECS,
            data_source: None,
        }
    }

    pub fn with_parallelism(mut self, parallelism: i64) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_volume(mut self, volume: Option<VolumeBinding>) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn with_data_source(mut self, data_source: Option<DataSource>) -> Self {
        self.data_source = data_source;
        self
    }

    /// Name of the job derived from the image reference.
    pub fn job_name(&self) -> String {
        job_name_for_image(&self.image)
    }

    /// Check the request invariants.
    ///
    /// Rules:
    /// - The image reference must not be empty and must yield a job name.
    /// - `parallelism` must be at least 1.
    /// - `ttl_secs` must not be negative.
    /// - A volume binding, if present, has both paths set.
    /// - A data source, if present, has both server and path set.
    pub fn validate(&self) -> Result<(), RhinoError> {
        if self.image.trim().is_empty() {
            return Err(RhinoError::Validation(
                "an image reference is required".to_string(),
            ));
        }
        if self.job_name().is_empty() {
            return Err(RhinoError::Validation(format!(
                "image reference '{}' does not name an image",
                self.image
            )));
        }
        if self.parallelism < 1 {
            return Err(RhinoError::Validation(
                "the number of MPI processes (--np) must be greater than 0".to_string(),
            ));
        }
        if self.ttl_secs < 0 {
            return Err(RhinoError::Validation(
                "the time to live (--ttl) must be greater than or equal to 0".to_string(),
            ));
        }
        if let Some(volume) = &self.volume {
            VolumeBinding::from_parts(&volume.host_path, &volume.container_path)?;
        }
        if let Some(data) = &self.data_source {
            if data.server.is_empty() || data.path.is_empty() {
                return Err(RhinoError::Validation(
                    "the data server and the data path must be specified together".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Derive a job name from an image reference.
///
/// Takes the last path segment and strips any tag or digest:
/// `registry:5000/foo/matmul:v2.1` becomes `matmul`.
pub fn job_name_for_image(image: &str) -> String {
    let last = image.rsplit('/').next().unwrap_or(image);
    let without_digest = last.split('@').next().unwrap_or(last);
    without_digest
        .split(':')
        .next()
        .unwrap_or(without_digest)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
