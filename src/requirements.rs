//! The requirements file: the ordered tool list a host should have.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::spec::PackageSpec;

/// On-disk requirements document: an ordered array of requirement specs.
///
/// ```toml
/// tools = ["taplo@0.9.3", "hurl"]
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub tools: Vec<String>,
}

impl Requirements {
    /// Default location: `<config dir>/kit/tools.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("could not determine the user config directory")?;
        Ok(base.join("kit").join("tools.toml"))
    }

    /// Load the requirements file. A missing file is an empty list; an
    /// unreadable or invalid one is a hard error and aborts the whole run.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("invalid requirements file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(self).context("failed to encode requirements")?;
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Parsed specs in file order.
    pub fn specs(&self) -> Vec<PackageSpec> {
        self.tools.iter().map(|t| PackageSpec::parse(t)).collect()
    }

    /// Add a requirement, replacing any existing entry for the same tool.
    pub fn add(&mut self, spec: &PackageSpec) {
        self.remove(&spec.name);
        self.tools.push(spec.to_string());
    }

    /// Drop every entry for `name`. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.tools.len();
        self.tools.retain(|t| PackageSpec::parse(t).name != name);
        before != self.tools.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let requirements = Requirements::load(&dir.path().join("tools.toml")).unwrap();
        assert!(requirements.tools.is_empty());
    }

    #[test]
    fn test_invalid_file_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.toml");
        fs::write(&path, "tools = \"not-an-array\"").unwrap();
        assert!(Requirements::load(&path).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tools.toml");

        let mut requirements = Requirements::default();
        requirements.add(&PackageSpec::parse("taplo@0.9.3"));
        requirements.add(&PackageSpec::parse("hurl"));
        requirements.save(&path).unwrap();

        let loaded = Requirements::load(&path).unwrap();
        assert_eq!(loaded.tools, vec!["taplo@0.9.3", "hurl"]);
        assert_eq!(loaded.specs()[0], PackageSpec::parse("taplo@0.9.3"));
    }

    #[test]
    fn test_add_replaces_existing_entry() {
        let mut requirements = Requirements {
            tools: vec!["taplo@0.9.3".to_string(), "hurl".to_string()],
        };
        requirements.add(&PackageSpec::parse("taplo@1.0.0"));

        assert_eq!(requirements.tools, vec!["hurl", "taplo@1.0.0"]);
    }

    #[test]
    fn test_remove_by_tool_name() {
        let mut requirements = Requirements {
            tools: vec!["taplo@0.9.3".to_string(), "hurl".to_string()],
        };

        assert!(requirements.remove("taplo"));
        assert!(!requirements.remove("taplo"));
        assert_eq!(requirements.tools, vec!["hurl"]);
    }
}
