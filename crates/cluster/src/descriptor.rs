//! Rendering of the `RhinoJob` custom resource.
//!
//! The descriptor is rendered as YAML text first and then parsed back into
//! a [`DynamicObject`], so the submitted object is exactly what the text
//! says.

use kube::api::{ApiResource, DynamicObject, GroupVersionKind};

use rhino_core::{DataSource, JobRequest, RhinoError, RhinoResult};

// ---------------------------------------------------------------------------
// Resource identity
// ---------------------------------------------------------------------------

pub const RHINOJOB_GROUP: &str = "openrhino.org";
pub const RHINOJOB_VERSION: &str = "v1alpha1";
pub const RHINOJOB_KIND: &str = "RhinoJob";
pub const RHINOJOB_PLURAL: &str = "rhinojobs";

/// Executable the operator launches inside every job pod.
pub const APP_EXEC: &str = "./mpi-func";

/// API resource for namespaced `RhinoJob` objects.
pub fn rhinojob_resource() -> ApiResource {
    let gvk = GroupVersionKind::gvk(RHINOJOB_GROUP, RHINOJOB_VERSION, RHINOJOB_KIND);
    ApiResource::from_gvk_with_plural(&gvk, RHINOJOB_PLURAL)
}

// ---------------------------------------------------------------------------
// JobDescriptor
// ---------------------------------------------------------------------------

/// Fields carried by a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub name: String,
    pub image: String,
    pub ttl_secs: i64,
    pub parallelism: i64,
    pub app_exec: String,
    pub app_args: Vec<String>,
    pub data_source: Option<DataSource>,
}

impl JobDescriptor {
    pub fn from_request(request: &JobRequest) -> Self {
        Self {
            name: request.job_name(),
            image: request.image.clone(),
            ttl_secs: request.ttl_secs,
            parallelism: request.parallelism,
            app_exec: APP_EXEC.to_string(),
            app_args: request.program_args.clone(),
            data_source: request.data_source.clone(),
        }
    }

    /// Render the descriptor as YAML.
    ///
    /// `appArgs` is written only when there are arguments, as a flow
    /// sequence of double-quoted strings. `dataServer` and `dataPath` are
    /// written together or not at all.
    pub fn render(&self) -> String {
        let name = quote(&self.name);
        let mut yaml = format!(
            "apiVersion: {RHINOJOB_GROUP}/{RHINOJOB_VERSION}\n\
             kind: {RHINOJOB_KIND}\n\
             metadata:\n\
             \x20 labels:\n\
             \x20   app.kubernetes.io/name: rhinojob\n\
             \x20   app.kubernetes.io/instance: {name}\n\
             \x20   app.kubernetes.io/part-of: rhino-operator\n\
             \x20   app.kubernetes.io/managed-by: kustomize\n\
             \x20   app.kubernetes.io/created-by: rhino-operator\n\
             \x20 name: {name}\n\
             spec:\n\
             \x20 image: {image}\n\
             \x20 ttl: {ttl}\n\
             \x20 parallelism: {parallelism}\n\
             \x20 appExec: {app_exec}\n",
            image = quote(&self.image),
            ttl = self.ttl_secs,
            parallelism = self.parallelism,
            app_exec = quote(&self.app_exec),
        );

        if !self.app_args.is_empty() {
            let args: Vec<String> = self.app_args.iter().map(|a| quote(a)).collect();
            yaml.push_str(&format!("  appArgs: [{}]\n", args.join(", ")));
        }

        if let Some(data) = &self.data_source {
            yaml.push_str(&format!("  dataServer: {}\n", quote(&data.server)));
            yaml.push_str(&format!("  dataPath: {}\n", quote(&data.path)));
        }

        yaml
    }

    /// Parse the rendered descriptor back into the API object model.
    pub fn to_object(&self) -> RhinoResult<DynamicObject> {
        let yaml = self.render();
        serde_yaml::from_str::<DynamicObject>(&yaml).map_err(|e| RhinoError::Submission {
            job: self.name.clone(),
            detail: format!("rendered descriptor does not parse: {e}"),
        })
    }
}

/// Double-quote a scalar. A JSON string literal is a valid YAML
/// double-quoted scalar, escapes included.
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> JobRequest {
        JobRequest::new("foo/matmul:v2.1")
            .with_parallelism(4)
            .with_ttl_secs(600)
            .with_args(["1", "10", "1"])
    }

    #[test]
    fn render_carries_identity_and_counts() {
        let yaml = JobDescriptor::from_request(&request()).render();
        assert!(yaml.starts_with("apiVersion: openrhino.org/v1alpha1\nkind: RhinoJob\n"));
        assert!(yaml.contains("  name: \"matmul\"\n"));
        assert!(yaml.contains("    app.kubernetes.io/instance: \"matmul\"\n"));
        assert!(yaml.contains("  image: \"foo/matmul:v2.1\"\n"));
        assert!(yaml.contains("  ttl: 600\n"));
        assert!(yaml.contains("  parallelism: 4\n"));
        assert!(yaml.contains("  appExec: \"./mpi-func\"\n"));
    }

    #[test]
    fn render_args_as_quoted_sequence() {
        let yaml = JobDescriptor::from_request(&request()).render();
        assert!(yaml.contains("  appArgs: [\"1\", \"10\", \"1\"]\n"));
    }

    #[test]
    fn render_omits_args_when_empty() {
        let yaml = JobDescriptor::from_request(&JobRequest::new("hello:v1.0")).render();
        assert!(!yaml.contains("appArgs"));
    }

    #[test]
    fn render_omits_data_fields_without_source() {
        let yaml = JobDescriptor::from_request(&request()).render();
        assert!(!yaml.contains("dataServer"));
        assert!(!yaml.contains("dataPath"));
    }

    #[test]
    fn render_includes_data_fields_as_pair() {
        let req = request().with_data_source(Some(DataSource {
            server: "10.0.0.7".into(),
            path: "/mnt".into(),
        }));
        let yaml = JobDescriptor::from_request(&req).render();
        assert!(yaml.contains("  dataServer: \"10.0.0.7\"\n"));
        assert!(yaml.contains("  dataPath: \"/mnt\"\n"));
    }

    #[test]
    fn object_round_trips_spec_fields() {
        let obj = JobDescriptor::from_request(&request()).to_object().unwrap();
        let types = obj.types.as_ref().unwrap();
        assert_eq!(types.api_version, "openrhino.org/v1alpha1");
        assert_eq!(types.kind, "RhinoJob");
        assert_eq!(obj.metadata.name.as_deref(), Some("matmul"));
        assert_eq!(obj.data["spec"]["parallelism"], 4);
        assert_eq!(obj.data["spec"]["ttl"], 600);
        assert_eq!(
            obj.data["spec"]["appArgs"],
            serde_json::json!(["1", "10", "1"])
        );
    }

    #[test]
    fn args_with_quotes_survive_parsing() {
        let req = request().with_args(["--in=\"/data/file\"", "a\\b", "two words"]);
        let obj = JobDescriptor::from_request(&req).to_object().unwrap();
        assert_eq!(
            obj.data["spec"]["appArgs"],
            serde_json::json!(["--in=\"/data/file\"", "a\\b", "two words"])
        );
    }

    #[test]
    fn resource_uses_rhinojobs_plural() {
        let resource = rhinojob_resource();
        assert_eq!(resource.group, "openrhino.org");
        assert_eq!(resource.version, "v1alpha1");
        assert_eq!(resource.kind, "RhinoJob");
        assert_eq!(resource.plural, "rhinojobs");
    }
}
