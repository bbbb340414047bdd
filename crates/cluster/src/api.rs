//! Port to the cluster API for `RhinoJob` objects, with a `kube` adapter.

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use rhino_core::{RhinoError, RhinoResult};

use crate::descriptor::rhinojob_resource;

/// Failures reported by a [`JobApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClusterApiError {
    /// The API server answered and refused the request.
    #[error("{message} ({reason}, status {code})")]
    Rejected {
        code: u16,
        reason: String,
        message: String,
    },

    /// The request never got an answer (network, TLS, auth plugin, ...).
    #[error("{0}")]
    Transport(String),
}

impl From<kube::Error> for ClusterApiError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => ClusterApiError::Rejected {
                code: response.code,
                reason: response.reason,
                message: response.message,
            },
            other => ClusterApiError::Transport(other.to_string()),
        }
    }
}

/// Namespaced create / list / delete of job objects.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Create `job` and return the object as stored by the server.
    async fn create(
        &self,
        namespace: &str,
        job: &DynamicObject,
    ) -> Result<DynamicObject, ClusterApiError>;

    async fn list(&self, namespace: &str) -> Result<Vec<DynamicObject>, ClusterApiError>;

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), ClusterApiError>;
}

/// [`JobApi`] over a live cluster connection.
#[derive(Clone)]
pub struct KubeJobApi {
    client: Client,
    resource: ApiResource,
}

impl KubeJobApi {
    /// Build a client from an already loaded kubeconfig, using its
    /// current context.
    pub async fn connect(kubeconfig: Kubeconfig) -> RhinoResult<Self> {
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| RhinoError::Configuration(format!("invalid cluster configuration: {e}")))?;

        tracing::debug!(cluster_url = %config.cluster_url, "Connecting to cluster API");

        let client =
            Client::try_from(config).map_err(|e| RhinoError::backend("cluster client setup", e))?;

        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            resource: rhinojob_resource(),
        }
    }

    fn api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.resource)
    }
}

#[async_trait]
impl JobApi for KubeJobApi {
    async fn create(
        &self,
        namespace: &str,
        job: &DynamicObject,
    ) -> Result<DynamicObject, ClusterApiError> {
        Ok(self.api(namespace).create(&PostParams::default(), job).await?)
    }

    async fn list(&self, namespace: &str) -> Result<Vec<DynamicObject>, ClusterApiError> {
        let list = self.api(namespace).list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), ClusterApiError> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kube::core::ErrorResponse;

    use super::*;

    #[test]
    fn api_rejection_keeps_server_detail() {
        let err = kube::Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: "rhinojobs.openrhino.org \"matmul\" already exists".into(),
            reason: "AlreadyExists".into(),
            code: 409,
        });
        let mapped = ClusterApiError::from(err);
        assert_eq!(
            mapped.to_string(),
            "rhinojobs.openrhino.org \"matmul\" already exists (AlreadyExists, status 409)"
        );
    }
}
