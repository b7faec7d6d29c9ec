//! Whole-requirement-set synchronization.

use super::{InstallOptions, InstallOutcome, Installer};
use crate::backend::InstallExecutor;
use crate::resolver;
use crate::spec::PackageSpec;

/// Options for a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub ignore_local: bool,
}

/// Why a requirement was left out of the install batch.
#[derive(Debug, Clone)]
pub enum SyncWarning {
    RecipeUnavailable { name: String, message: String },
    NoInstallMethod { name: String },
}

/// Per-package result line of a sync run.
#[derive(Debug)]
pub struct SyncResult {
    pub spec: PackageSpec,
    pub outcome: InstallOutcome,
}

/// Aggregated outcome of a sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub warnings: Vec<SyncWarning>,
    pub results: Vec<SyncResult>,
}

impl SyncReport {
    pub fn installed(&self) -> usize {
        self.count(|o| matches!(o, InstallOutcome::Installed { .. } | InstallOutcome::WouldInstall { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, InstallOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(InstallOutcome::is_failure)
    }

    /// A sync containing any failed package fails overall, even though the
    /// other packages were still attempted and reported.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, matches: impl Fn(&InstallOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| matches(&r.outcome)).count()
    }
}

/// Synchronize a requirement set against the host.
///
/// Every entry is vetted up front: requirements without a fetchable recipe
/// or without any install path on this host become warnings and are
/// excluded from the batch. The remaining batch installs in lexicographic
/// name order; one package's failure never stops the rest.
pub fn sync<E: InstallExecutor>(
    installer: &mut Installer<'_, E>,
    specs: &[PackageSpec],
    options: &SyncOptions,
) -> SyncReport {
    let mut report = SyncReport::default();

    let mut ordered: Vec<&PackageSpec> = specs.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));
    ordered.dedup_by(|a, b| a.name == b.name);

    let mut batch = Vec::new();
    for spec in ordered {
        let recipe = match installer.recipe(&spec.name) {
            Ok(recipe) => recipe,
            Err(error) => {
                report.warnings.push(SyncWarning::RecipeUnavailable {
                    name: spec.name.clone(),
                    message: error.to_string(),
                });
                continue;
            }
        };
        if resolver::resolve(&recipe, installer.environment(), spec.version.as_deref()).is_empty() {
            report
                .warnings
                .push(SyncWarning::NoInstallMethod {
                    name: spec.name.clone(),
                });
            continue;
        }
        batch.push((spec.clone(), recipe));
    }

    for (spec, recipe) in batch {
        let install_options = InstallOptions {
            force: false,
            dry_run: options.dry_run,
            ignore_local: options.ignore_local,
            version: spec.version.clone(),
        };
        let outcome = installer.install_one(&recipe, &install_options);
        report.results.push(SyncResult { spec, outcome });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::environment::Environment;
    use crate::recipe::InstallMethod;
    use crate::recipe::source::RecipeSource;
    use anyhow::bail;
    use std::fs;

    /// Test double failing for configured package names.
    struct NameFailExecutor {
        failing: Vec<&'static str>,
        calls: Vec<String>,
    }

    impl InstallExecutor for NameFailExecutor {
        fn install(
            &mut self,
            _backend: Backend,
            name: &str,
            _method: &InstallMethod,
            _version: Option<&str>,
        ) -> anyhow::Result<()> {
            self.calls.push(name.to_string());
            if self.failing.contains(&name) {
                bail!("install of {name} blew up");
            }
            Ok(())
        }
    }

    fn recipe_dir(recipes: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in recipes {
            fs::write(dir.path().join(format!("{name}.toml")), body).unwrap();
        }
        dir
    }

    fn script_recipe(name: &str) -> String {
        format!("[package]\nname = \"{name}\"\n\n[install.script]\nscript = \"true\"\n")
    }

    fn specs(raw: &[&str]) -> Vec<PackageSpec> {
        raw.iter().map(|s| PackageSpec::parse(s)).collect()
    }

    #[test]
    fn test_batch_continues_after_failure_and_reports_everything() {
        let dir = recipe_dir(&[
            ("kit-sync-alpha", &script_recipe("kit-sync-alpha")),
            ("kit-sync-beta", &script_recipe("kit-sync-beta")),
            ("kit-sync-gamma", &script_recipe("kit-sync-gamma")),
        ]);
        let env = Environment::from_backends(vec![Backend::Script]);
        let mut installer = Installer::with_executor(
            &env,
            RecipeSource::local(dir.path().to_path_buf()),
            NameFailExecutor {
                failing: vec!["kit-sync-beta"],
                calls: Vec::new(),
            },
        );

        let report = sync(
            &mut installer,
            &specs(&["kit-sync-gamma", "kit-sync-alpha", "kit-sync-beta"]),
            &SyncOptions::default(),
        );

        // Lexicographic batch order, regardless of requirement order.
        assert_eq!(
            installer.executor.calls,
            vec!["kit-sync-alpha", "kit-sync-beta", "kit-sync-gamma"]
        );
        assert_eq!(report.installed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());

        let beta = &report.results[1];
        assert_eq!(beta.spec.name, "kit-sync-beta");
        assert!(matches!(
            beta.outcome,
            InstallOutcome::AllMethodsFailed { ref attempts } if attempts.len() == 1
        ));
    }

    #[test]
    fn test_unresolvable_entries_become_warnings_not_failures() {
        let dir = recipe_dir(&[
            ("kit-sync-alpha", &script_recipe("kit-sync-alpha")),
            // Installable nowhere in a script-only environment.
            (
                "kit-sync-brewonly",
                "[package]\nname = \"kit-sync-brewonly\"\n\n[install.brew]\n",
            ),
        ]);
        let env = Environment::from_backends(vec![Backend::Script]);
        let mut installer = Installer::with_executor(
            &env,
            RecipeSource::local(dir.path().to_path_buf()),
            NameFailExecutor {
                failing: vec![],
                calls: Vec::new(),
            },
        );

        let report = sync(
            &mut installer,
            &specs(&["kit-sync-alpha", "kit-sync-brewonly", "kit-sync-missing"]),
            &SyncOptions::default(),
        );

        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().any(|w| matches!(
            w,
            SyncWarning::NoInstallMethod { name } if name == "kit-sync-brewonly"
        )));
        assert!(report.warnings.iter().any(|w| matches!(
            w,
            SyncWarning::RecipeUnavailable { name, .. } if name == "kit-sync-missing"
        )));

        assert_eq!(report.installed(), 1);
        assert!(!report.has_failures());
        assert_eq!(installer.executor.calls, vec!["kit-sync-alpha"]);
    }

    #[test]
    fn test_duplicate_requirements_install_once() {
        let dir = recipe_dir(&[("kit-sync-alpha", &script_recipe("kit-sync-alpha"))]);
        let env = Environment::from_backends(vec![Backend::Script]);
        let mut installer = Installer::with_executor(
            &env,
            RecipeSource::local(dir.path().to_path_buf()),
            NameFailExecutor {
                failing: vec![],
                calls: Vec::new(),
            },
        );

        let report = sync(
            &mut installer,
            &specs(&["kit-sync-alpha", "kit-sync-alpha@1.0.0"]),
            &SyncOptions::default(),
        );

        assert_eq!(report.results.len(), 1);
        assert_eq!(installer.executor.calls.len(), 1);
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        let dir = recipe_dir(&[("kit-sync-alpha", &script_recipe("kit-sync-alpha"))]);
        let env = Environment::from_backends(vec![Backend::Script]);
        let mut installer = Installer::with_executor(
            &env,
            RecipeSource::local(dir.path().to_path_buf()),
            NameFailExecutor {
                failing: vec![],
                calls: Vec::new(),
            },
        );

        let report = sync(
            &mut installer,
            &specs(&["kit-sync-alpha"]),
            &SyncOptions {
                dry_run: true,
                ignore_local: false,
            },
        );

        assert!(installer.executor.calls.is_empty());
        assert!(matches!(
            report.results[0].outcome,
            InstallOutcome::WouldInstall { .. }
        ));
        assert!(!report.has_failures());
    }
}
