//! Environment-driven settings for the `rhino` binary.
//!
//! Command-line flags take precedence over everything read here.

use std::path::PathBuf;

use rhino_core::job::DEFAULT_TTL_SECS;
use rhino_core::{RhinoError, RhinoResult};

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Kubeconfig path from the environment, if any.
    pub kubeconfig: Option<PathBuf>,
    /// Default `--ttl` for `rhino run` (default: `600`).
    pub default_ttl_secs: i64,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                   |
    /// |--------------------------|-------------------------------------------|
    /// | `RHINO_KUBECONFIG`       | `KUBECONFIG`, then `$HOME/.kube/config`   |
    /// | `RHINO_DEFAULT_TTL_SECS` | `600`                                     |
    pub fn from_env() -> RhinoResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CliConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> RhinoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kubeconfig = var("RHINO_KUBECONFIG")
            .or_else(|| var("KUBECONFIG"))
            .map(PathBuf::from)
            .or_else(|| var("HOME").map(|home| PathBuf::from(home).join(".kube").join("config")));

        let default_ttl_secs = match var("RHINO_DEFAULT_TTL_SECS") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                RhinoError::Configuration(format!(
                    "RHINO_DEFAULT_TTL_SECS must be an integer, got '{raw}'"
                ))
            })?,
            None => DEFAULT_TTL_SECS,
        };

        Ok(Self {
            kubeconfig,
            default_ttl_secs,
        })
    }

    /// Kubeconfig path to use: the `--kubeconfig` flag wins over the
    /// environment.
    pub fn kubeconfig_path(&self, flag: Option<PathBuf>) -> RhinoResult<PathBuf> {
        flag.or_else(|| self.kubeconfig.clone()).ok_or_else(|| {
            RhinoError::Configuration(
                "no kubeconfig found; set KUBECONFIG or pass --kubeconfig".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> RhinoResult<CliConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_home_kubeconfig() {
        let cfg = config(&[("HOME", "/home/mpi")]).unwrap();
        assert_eq!(cfg.kubeconfig, Some(PathBuf::from("/home/mpi/.kube/config")));
        assert_eq!(cfg.default_ttl_secs, 600);
    }

    #[test]
    fn rhino_kubeconfig_beats_kubeconfig() {
        let cfg = config(&[
            ("HOME", "/home/mpi"),
            ("KUBECONFIG", "/etc/kube/config"),
            ("RHINO_KUBECONFIG", "/opt/rhino/kubeconfig"),
        ])
        .unwrap();
        assert_eq!(cfg.kubeconfig, Some(PathBuf::from("/opt/rhino/kubeconfig")));
    }

    #[test]
    fn kubeconfig_env_beats_home() {
        let cfg = config(&[("HOME", "/home/mpi"), ("KUBECONFIG", "/etc/kube/config")]).unwrap();
        assert_eq!(cfg.kubeconfig, Some(PathBuf::from("/etc/kube/config")));
    }

    #[test]
    fn flag_overrides_environment() {
        let cfg = config(&[("KUBECONFIG", "/etc/kube/config")]).unwrap();
        let path = cfg.kubeconfig_path(Some(PathBuf::from("./kc"))).unwrap();
        assert_eq!(path, PathBuf::from("./kc"));
    }

    #[test]
    fn no_path_at_all_is_configuration_error() {
        let cfg = config(&[]).unwrap();
        assert_matches!(cfg.kubeconfig_path(None), Err(RhinoError::Configuration(_)));
    }

    #[test]
    fn ttl_default_is_configurable() {
        let cfg = config(&[("RHINO_DEFAULT_TTL_SECS", "120")]).unwrap();
        assert_eq!(cfg.default_ttl_secs, 120);
    }

    #[test]
    fn bad_ttl_default_is_configuration_error() {
        assert_matches!(
            config(&[("RHINO_DEFAULT_TTL_SECS", "ten")]),
            Err(RhinoError::Configuration(msg)) if msg.contains("ten")
        );
    }
}
