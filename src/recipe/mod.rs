//! Recipe data model: what a tool is and how each backend installs it.
//!
//! A recipe is a TOML document with a `[package]` identity table and one
//! `[install.<backend>]` table per supported backend:
//!
//! ```toml
//! [package]
//! name = "taplo"
//! description = "TOML toolkit"
//!
//! [install.brew]
//! package = "taplo"
//!
//! [install.script]
//! script = "cargo binstall taplo-cli"
//! ```

pub mod source;

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::backend::Backend;

/// Identity and verification metadata for one tool.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    /// Shell command that exits zero iff the tool is installed.
    #[serde(default)]
    pub verify_command: Option<String>,
    /// Binary looked up on PATH when no verify command is given.
    /// Defaults to the package name.
    #[serde(default)]
    pub verify_binary: Option<String>,
    /// Shell command whose output carries the installed version.
    #[serde(default)]
    pub version_command: Option<String>,
}

/// One way to install a tool via one backend.
///
/// A method with neither `package` nor `script` falls back to the tool's
/// own name as the package name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallMethod {
    /// Package name override.
    #[serde(default)]
    pub package: Option<String>,
    /// Extra tap/repository to register first (Homebrew).
    #[serde(default)]
    pub tap: Option<String>,
    /// Install as a Homebrew cask instead of a formula.
    #[serde(default)]
    pub cask: bool,
    /// Inline installer script body (script backend).
    #[serde(default)]
    pub script: Option<String>,
    /// Shell command run after a successful install.
    #[serde(default)]
    pub post_install: Option<String>,
    /// Ask the installer script for a global install.
    #[serde(default)]
    pub global: bool,
}

impl InstallMethod {
    /// Effective package name for a tool named `tool_name`.
    pub fn package_name<'a>(&'a self, tool_name: &'a str) -> &'a str {
        self.package.as_deref().unwrap_or(tool_name)
    }
}

#[derive(Debug, Deserialize)]
struct RecipeDoc {
    package: PackageInfo,
    #[serde(default)]
    install: BTreeMap<String, InstallMethod>,
}

/// An installable tool: identity plus per-backend install methods.
///
/// Immutable after parsing. Method keys a running kit does not know about
/// are kept but never matched, so recipes written for newer backends stay
/// loadable.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub package: PackageInfo,
    methods: BTreeMap<String, InstallMethod>,
}

impl Recipe {
    /// Parse a recipe from its TOML document.
    pub fn from_toml(input: &str) -> Result<Self> {
        let doc: RecipeDoc = toml::from_str(input).context("invalid recipe document")?;
        if doc.package.name.trim().is_empty() {
            bail!("recipe is missing a package name");
        }
        Ok(Self {
            package: doc.package,
            methods: doc.install,
        })
    }

    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// Install method for the given backend, if the recipe has one.
    pub fn method_for(&self, backend: Backend) -> Option<&InstallMethod> {
        self.methods.get(backend.key())
    }

    /// Backend keys this recipe declares methods for.
    pub fn method_keys(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAPLO: &str = r#"
[package]
name = "taplo"
description = "TOML toolkit"
homepage = "https://taplo.tamasfe.dev"

[install.apt]
package = "taplo-cli"

[install.brew]

[install.script]
script = "curl -fsSL https://example.com/taplo.sh | sh"
global = true
"#;

    #[test]
    fn test_parse_full_recipe() {
        let recipe = Recipe::from_toml(TAPLO).unwrap();
        assert_eq!(recipe.name(), "taplo");
        assert_eq!(recipe.package.description.as_deref(), Some("TOML toolkit"));

        let apt = recipe.method_for(Backend::Apt).unwrap();
        assert_eq!(apt.package_name("taplo"), "taplo-cli");

        // Empty method table falls back to the tool's own name.
        let brew = recipe.method_for(Backend::Brew).unwrap();
        assert_eq!(brew.package_name("taplo"), "taplo");
        assert!(!brew.cask);

        let script = recipe.method_for(Backend::Script).unwrap();
        assert!(script.script.is_some());
        assert!(script.global);

        assert!(recipe.method_for(Backend::Pacman).is_none());
    }

    #[test]
    fn test_unknown_backend_keys_are_tolerated() {
        let recipe = Recipe::from_toml(
            r#"
[package]
name = "hurl"

[install.nix]
package = "hurl"

[install.script]
script = "true"
"#,
        )
        .unwrap();
        assert!(recipe.method_for(Backend::Script).is_some());
        assert!(recipe.method_keys().any(|k| k == "nix"));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let result = Recipe::from_toml("[package]\nname = \"  \"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(Recipe::from_toml("not a recipe").is_err());
    }
}
