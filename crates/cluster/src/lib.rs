//! Cluster backend.
//!
//! Submits parallel jobs as `RhinoJob` custom resources and returns as
//! soon as the API server accepts them; the RHINO operator runs them.
//! Also resolves the working namespace from the kubeconfig and lists or
//! deletes existing jobs.

pub mod api;
pub mod descriptor;
pub mod jobs;
pub mod namespace;
pub mod submit;

pub use api::{ClusterApiError, JobApi, KubeJobApi};
pub use descriptor::JobDescriptor;
pub use jobs::{delete_job, list_jobs, render_table, JobSummary};
pub use namespace::{load_kubeconfig, namespace_for, resolve_namespace, DEFAULT_NAMESPACE};
pub use submit::ClusterJobSubmitter;
