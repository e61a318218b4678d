//! Contracts configuration stored in `contracts.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::policy::MemberPolicy;

/// Contracts configuration (TOML).
///
/// Missing fields default to the built-in naming rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ContractsConfig {
    /// Naming rules applied when interfaces are defined.
    pub policy: MemberPolicy,
}

impl ContractsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.policy.private_prefix.trim().is_empty() {
            return Err(anyhow!("policy.private_prefix must be non-empty"));
        }
        if let Some(blank) = self
            .policy
            .reserved_names
            .iter()
            .find(|name| name.trim().is_empty())
        {
            return Err(anyhow!(
                "policy.reserved_names must not contain blank names (got {:?})",
                blank
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ContractsConfig::default()`.
pub fn load_config(path: &Path) -> Result<ContractsConfig> {
    if !path.exists() {
        let cfg = ContractsConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ContractsConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ContractsConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, ContractsConfig::default());
        assert!(cfg.policy.properties_count_as_members);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("contracts.toml");
        fs::write(&path, "[policy]\nproperties_count_as_members = false\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert!(!cfg.policy.properties_count_as_members);
        assert_eq!(cfg.policy.private_prefix, "_");
        assert_eq!(cfg.policy.reserved_names, vec!["new", "init", "constructed"]);
    }

    #[test]
    fn rejects_empty_private_prefix() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("contracts.toml");
        fs::write(&path, "[policy]\nprivate_prefix = \"\"\n").expect("write");

        let err = load_config(&path).expect_err("invalid");
        assert!(err.to_string().contains("private_prefix"));
    }

    #[test]
    fn write_then_load_preserves_policy() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("contracts.toml");
        let mut cfg = ContractsConfig::default();
        cfg.policy.reserved_names.push("drop".to_string());
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }
}
