//! Work out which namespace a cluster operation runs in.
//!
//! Resolution order:
//! 1. an explicit, non-empty override;
//! 2. the namespace of the kubeconfig's current context;
//! 3. [`DEFAULT_NAMESPACE`] when that context declares none.

use std::path::Path;

use kube::config::Kubeconfig;

use rhino_core::{RhinoError, RhinoResult};

/// Namespace used when the active context does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Read and parse the kubeconfig at `path`.
pub fn load_kubeconfig(path: &Path) -> RhinoResult<Kubeconfig> {
    Kubeconfig::read_from(path).map_err(|e| {
        RhinoError::Configuration(format!(
            "cannot load cluster configuration from {}: {e}",
            path.display()
        ))
    })
}

/// Resolve the namespace against an already loaded kubeconfig.
pub fn namespace_for(explicit: Option<&str>, kubeconfig: &Kubeconfig) -> RhinoResult<String> {
    if let Some(ns) = explicit.filter(|ns| !ns.is_empty()) {
        return Ok(ns.to_string());
    }

    let current = kubeconfig.current_context.as_deref().ok_or_else(|| {
        RhinoError::Configuration("cluster configuration has no current context".to_string())
    })?;

    let context = kubeconfig
        .contexts
        .iter()
        .find(|named| named.name == current)
        .ok_or_else(|| {
            RhinoError::Configuration(format!(
                "current context '{current}' is not defined in the cluster configuration"
            ))
        })?;

    let namespace = context
        .context
        .as_ref()
        .and_then(|ctx| ctx.namespace.as_deref())
        .filter(|ns| !ns.is_empty())
        .unwrap_or(DEFAULT_NAMESPACE);

    Ok(namespace.to_string())
}

/// Resolve the namespace, reading the kubeconfig at `path` only when no
/// explicit override is given.
pub fn resolve_namespace(explicit: Option<&str>, path: &Path) -> RhinoResult<String> {
    if let Some(ns) = explicit.filter(|ns| !ns.is_empty()) {
        return Ok(ns.to_string());
    }
    let kubeconfig = load_kubeconfig(path)?;
    namespace_for(None, &kubeconfig)
}
