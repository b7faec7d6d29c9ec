//! Installation orchestration: single-package fallback chains.

pub mod sync;

use std::collections::HashMap;

use crate::backend::{Backend, InstallExecutor, SystemExecutor};
use crate::environment::Environment;
use crate::recipe::Recipe;
use crate::recipe::source::{RecipeSource, SourceError};
use crate::resolver;
use crate::version;

/// Why a package was skipped instead of installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Installed, and the requirement (if any) is satisfied.
    AlreadyInstalled { version: Option<String> },
    /// Installed at a different version than requested; replacing the local
    /// install requires an explicit opt-in.
    VersionMismatch {
        installed: Option<String>,
        required: String,
    },
}

/// One failed install attempt in a fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptError {
    pub backend: Backend,
    pub message: String,
}

/// Terminal state of a single package install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Skipped(SkipReason),
    /// A backend succeeded. Failures of earlier candidates are kept so the
    /// caller can report the whole chain.
    Installed {
        backend: Backend,
        attempts: Vec<AttemptError>,
    },
    /// Dry-run preview: the candidate that would be tried, plus the
    /// fallbacks that would be available. Nothing was executed.
    WouldInstall {
        backend: Backend,
        fallbacks: Vec<Backend>,
    },
    /// The resolver found no installation path; no backend was invoked.
    NoMethod,
    /// Every candidate was attempted; the errors are carried in attempt
    /// order, never just the last one.
    AllMethodsFailed { attempts: Vec<AttemptError> },
}

impl InstallOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::NoMethod | Self::AllMethodsFailed { .. })
    }
}

/// Options for a single install.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Install even when the tool is already present.
    pub force: bool,
    /// Report what would happen without invoking any backend.
    pub dry_run: bool,
    /// Replace a locally installed version that does not match the request.
    pub ignore_local: bool,
    /// Required version, if the request pinned one.
    pub version: Option<String>,
}

/// Drives installs for one run.
///
/// Owns the per-run recipe cache and the run-scoped executor state. The
/// environment is detected once by the caller and only read here.
pub struct Installer<'a, E: InstallExecutor = SystemExecutor> {
    env: &'a Environment,
    source: RecipeSource,
    executor: E,
    recipes: HashMap<String, Recipe>,
}

impl<'a> Installer<'a, SystemExecutor> {
    pub fn new(env: &'a Environment, source: RecipeSource) -> Self {
        Self::with_executor(env, source, SystemExecutor::new())
    }
}

impl<'a, E: InstallExecutor> Installer<'a, E> {
    pub fn with_executor(env: &'a Environment, source: RecipeSource, executor: E) -> Self {
        Self {
            env,
            source,
            executor,
            recipes: HashMap::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        self.env
    }

    /// Fetch the recipe for `name`, reusing the per-run cache.
    pub fn recipe(&mut self, name: &str) -> Result<Recipe, SourceError> {
        if let Some(recipe) = self.recipes.get(name) {
            return Ok(recipe.clone());
        }
        let recipe = self.source.fetch(name)?;
        self.recipes.insert(name.to_string(), recipe.clone());
        Ok(recipe)
    }

    /// Install one package, following the resolver's fallback order.
    ///
    /// The first successful backend wins and later candidates are never
    /// attempted. Every failed attempt is recorded in order.
    pub fn install_one(&mut self, recipe: &Recipe, options: &InstallOptions) -> InstallOutcome {
        let required = options.version.as_deref();

        if !options.force {
            let state = version::check(recipe, required);
            if state.installed {
                if state.version_match {
                    return InstallOutcome::Skipped(SkipReason::AlreadyInstalled {
                        version: state.installed_version,
                    });
                }
                if let Some(required) = required
                    && !options.ignore_local
                {
                    return InstallOutcome::Skipped(SkipReason::VersionMismatch {
                        installed: state.installed_version,
                        required: required.to_string(),
                    });
                }
            }
        }

        let candidates = resolver::resolve(recipe, self.env, required);
        if candidates.is_empty() {
            return InstallOutcome::NoMethod;
        }

        if options.dry_run {
            let (backend, _) = candidates[0];
            let fallbacks = candidates[1..].iter().map(|(b, _)| *b).collect();
            return InstallOutcome::WouldInstall { backend, fallbacks };
        }

        let mut attempts = Vec::new();
        for (backend, method) in candidates {
            match self.executor.install(backend, recipe.name(), method, required) {
                Ok(()) => return InstallOutcome::Installed { backend, attempts },
                Err(error) => attempts.push(AttemptError {
                    backend,
                    message: format!("{error:#}"),
                }),
            }
        }
        InstallOutcome::AllMethodsFailed { attempts }
    }
}
