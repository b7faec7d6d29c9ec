//! Resolution of install methods against the detected environment.

use crate::backend::Backend;
use crate::environment::Environment;
use crate::recipe::{InstallMethod, Recipe};

/// Ordered (backend, method) candidates for installing `recipe`.
///
/// Candidates follow the environment's priority order, restricted to
/// backends the recipe has a method for. When a version is required,
/// version-capable backends are moved ahead of incapable ones without
/// disturbing the relative order inside either group (a stable partition,
/// not a re-sort).
///
/// An empty result means the recipe has no installation path on this host;
/// that is a normal outcome, not an error.
pub fn resolve<'r>(
    recipe: &'r Recipe,
    env: &Environment,
    required_version: Option<&str>,
) -> Vec<(Backend, &'r InstallMethod)> {
    let candidates: Vec<(Backend, &InstallMethod)> = env
        .backends()
        .iter()
        .filter_map(|&backend| recipe.method_for(backend).map(|method| (backend, method)))
        .collect();

    if required_version.is_none() {
        return candidates;
    }

    let (mut capable, incapable): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|(backend, _)| backend.supports_versioning());
    capable.extend(incapable);
    capable
}

/// First candidate only; used by read-only status paths.
pub fn resolve_first<'r>(
    recipe: &'r Recipe,
    env: &Environment,
    required_version: Option<&str>,
) -> Option<(Backend, &'r InstallMethod)> {
    resolve(recipe, env, required_version).into_iter().next()
}
