//! Submit a job to the cluster and return as soon as it is accepted.
//!
//! Running and completing the job is the operator's business; nothing here
//! waits for it. One create attempt is made, with no retries.

use kube::api::DynamicObject;
use kube::ResourceExt;

use rhino_core::{Backend, ExecutionHandle, JobRequest, RhinoError, RhinoResult};

use crate::api::JobApi;
use crate::descriptor::JobDescriptor;

pub struct ClusterJobSubmitter<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: JobApi + ?Sized> ClusterJobSubmitter<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Validate `request`, render its descriptor and create it in `namespace`.
    ///
    /// Returns the object as echoed back by the API server.
    pub async fn submit(
        &self,
        request: &JobRequest,
        namespace: &str,
    ) -> RhinoResult<DynamicObject> {
        request.validate()?;

        let descriptor = JobDescriptor::from_request(request);
        let object = descriptor.to_object()?;

        tracing::info!(
            job = %descriptor.name,
            namespace = %namespace,
            image = %descriptor.image,
            parallelism = descriptor.parallelism,
            ttl_secs = descriptor.ttl_secs,
            "Submitting RhinoJob",
        );

        let created = self
            .api
            .create(namespace, &object)
            .await
            .map_err(|e| RhinoError::Submission {
                job: descriptor.name.clone(),
                detail: e.to_string(),
            })?;

        tracing::info!(job = %created.name_any(), namespace = %namespace, "RhinoJob created");
        Ok(created)
    }

    /// Submit `request` and return a handle naming the created job.
    pub async fn launch(
        &self,
        request: &JobRequest,
        namespace: &str,
    ) -> RhinoResult<ExecutionHandle> {
        let created = self.submit(request, namespace).await?;
        Ok(ExecutionHandle::new(Backend::Cluster, created.name_any()))
    }
}
