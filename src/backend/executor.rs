//! Install execution for each backend.
//!
//! Each backend is one narrow function building the literal command line;
//! dispatch is an exhaustive match on the [`Backend`] tag.

use anyhow::{Context, Result, bail};
use duct::cmd;

use super::Backend;
use crate::recipe::InstallMethod;

/// The capability the orchestrator needs from a backend: install one
/// package, succeed or fail with a message. Implemented by
/// [`SystemExecutor`] for real package managers and by scripted doubles in
/// tests.
pub trait InstallExecutor {
    fn install(
        &mut self,
        backend: Backend,
        name: &str,
        method: &InstallMethod,
        version: Option<&str>,
    ) -> Result<()>;
}

/// Executor that runs the real package-manager commands.
///
/// One value lives per run: the apt index refresh is remembered here so it
/// happens at most once, before the first apt install of the run.
#[derive(Debug, Default)]
pub struct SystemExecutor {
    apt_index_updated: bool,
}

impl SystemExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn install_apt(
        &mut self,
        name: &str,
        method: &InstallMethod,
        version: Option<&str>,
    ) -> Result<()> {
        if !self.apt_index_updated {
            cmd!("sudo", "apt-get", "update")
                .run()
                .context("Failed to refresh the apt package index")?;
            self.apt_index_updated = true;
        }

        let package = method.package_name(name);
        let target = match version {
            Some(version) => format!("{package}={version}"),
            None => package.to_string(),
        };
        cmd!("sudo", "apt-get", "install", "-y", &target)
            .run()
            .with_context(|| format!("Failed to install {package} with apt"))?;
        Ok(())
    }
}

impl InstallExecutor for SystemExecutor {
    fn install(
        &mut self,
        backend: Backend,
        name: &str,
        method: &InstallMethod,
        version: Option<&str>,
    ) -> Result<()> {
        match backend {
            Backend::Apt => self.install_apt(name, method, version)?,
            Backend::Pacman => install_pacman(name, method)?,
            Backend::Brew => install_brew(name, method)?,
            Backend::Script => install_script(name, method, version)?,
        }

        if let Some(post) = &method.post_install {
            cmd!("sh", "-c", post)
                .run()
                .with_context(|| format!("Post-install step for {name} failed"))?;
        }
        Ok(())
    }
}

/// Install a package using pacman. Pacman cannot pin versions, so none is
/// passed here; the capability table keeps versioned requests away.
fn install_pacman(name: &str, method: &InstallMethod) -> Result<()> {
    let package = method.package_name(name);
    cmd!("sudo", "pacman", "-S", "--noconfirm", package)
        .run()
        .with_context(|| format!("Failed to install {package} with pacman"))?;
    Ok(())
}

/// Install a package using Homebrew, registering the method's tap first.
fn install_brew(name: &str, method: &InstallMethod) -> Result<()> {
    if let Some(tap) = &method.tap {
        cmd!("brew", "tap", tap)
            .run()
            .with_context(|| format!("Failed to tap {tap}"))?;
    }

    let package = method.package_name(name);
    let args: Vec<&str> = if method.cask {
        vec!["install", "--cask", package]
    } else {
        vec!["install", package]
    };
    cmd("brew", &args)
        .run()
        .with_context(|| format!("Failed to install {package} with Homebrew"))?;
    Ok(())
}

/// Run the method's installer script through the shell. The target version
/// and global flag are exported as KIT_VERSION and KIT_GLOBAL.
fn install_script(name: &str, method: &InstallMethod, version: Option<&str>) -> Result<()> {
    let Some(script) = &method.script else {
        bail!("script method for {name} has no script body");
    };

    let mut invocation = cmd!("sh", "-c", script);
    if let Some(version) = version {
        invocation = invocation.env("KIT_VERSION", version);
    }
    if method.global {
        invocation = invocation.env("KIT_GLOBAL", "1");
    }
    invocation
        .run()
        .with_context(|| format!("Installer script for {name} failed"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_method_without_body_is_rejected() {
        let method = InstallMethod::default();
        let result = install_script("tool", &method, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_script_method_runs_through_shell() {
        let method = InstallMethod {
            script: Some("true".to_string()),
            ..Default::default()
        };
        assert!(install_script("tool", &method, Some("1.0.0")).is_ok());

        let failing = InstallMethod {
            script: Some("false".to_string()),
            ..Default::default()
        };
        assert!(install_script("tool", &failing, None).is_err());
    }

    #[test]
    fn test_script_sees_exported_version() {
        let method = InstallMethod {
            script: Some("test \"$KIT_VERSION\" = 2.1.0".to_string()),
            ..Default::default()
        };
        assert!(install_script("tool", &method, Some("2.1.0")).is_ok());
        assert!(install_script("tool", &method, Some("9.9.9")).is_err());
    }
}
