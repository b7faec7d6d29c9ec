//! Installed-state and version checks for recipes.
//!
//! Version extraction is heuristic: the first semver-looking token in the
//! combined output wins, with a bare MAJOR.MINOR fallback. Output that
//! contains no such token yields no version.

use duct::cmd;
use regex::Regex;

use crate::recipe::Recipe;

/// Version flags tried in order when no custom version command is set.
const VERSION_FLAGS: &[&str] = &["--version", "-V", "-v", "version"];

/// Outcome of a version check. Produced fresh on every call; an install
/// invalidates any previously observed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCheck {
    pub installed: bool,
    pub installed_version: Option<String>,
    pub version_match: bool,
    pub required_version: Option<String>,
}

/// Whether the recipe's tool is present on this host.
///
/// A custom verify command wins; otherwise the verify binary (or the tool
/// name) is looked up on PATH. Execution problems count as "not installed".
pub fn is_installed(recipe: &Recipe) -> bool {
    if let Some(command) = &recipe.package.verify_command {
        return cmd!("sh", "-c", command)
            .stdout_null()
            .stderr_null()
            .run()
            .is_ok();
    }
    which::which(verify_binary(recipe)).is_ok()
}

/// Best-effort installed version of the recipe's tool.
pub fn installed_version(recipe: &Recipe) -> Option<String> {
    if let Some(command) = &recipe.package.version_command {
        return extract_version(&capture_shell(command)?);
    }

    let binary = verify_binary(recipe);
    for flag in VERSION_FLAGS {
        if let Some(output) = probe_flag(binary, flag)
            && let Some(version) = extract_version(&output)
        {
            return Some(version);
        }
    }
    None
}

/// Check the recipe's installed state against an optional required version.
pub fn check(recipe: &Recipe, required: Option<&str>) -> VersionCheck {
    let installed = is_installed(recipe);
    let installed_version = if installed {
        installed_version(recipe)
    } else {
        None
    };
    evaluate(installed, installed_version, required)
}

/// Decision table behind [`check`], kept pure so it can be tested without
/// touching the host.
fn evaluate(
    installed: bool,
    installed_version: Option<String>,
    required: Option<&str>,
) -> VersionCheck {
    let required_version = required.map(str::to_string);
    if !installed {
        return VersionCheck {
            installed: false,
            installed_version: None,
            version_match: false,
            required_version,
        };
    }

    let version_match = match required {
        // No constraint is trivially satisfied.
        None => true,
        Some(required) => installed_version
            .as_deref()
            .is_some_and(|installed| normalize(installed) == normalize(required)),
    };

    VersionCheck {
        installed: true,
        installed_version,
        version_match,
        required_version,
    }
}

/// Strip surrounding whitespace and one leading `v`/`V` prefix.
///
/// The prefix is only stripped in front of a digit, which keeps the
/// function idempotent and leaves names like `vim` alone.
pub fn normalize(version: &str) -> String {
    let trimmed = version.trim();
    match trimmed.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Pull a version token out of command output.
///
/// Tries `MAJOR.MINOR.PATCH` with an optional `-`/`+` suffix first, then a
/// bare `MAJOR.MINOR`.
pub fn extract_version(output: &str) -> Option<String> {
    let semver = Regex::new(r"\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.+-]+)?").ok()?;
    if let Some(found) = semver.find(output) {
        return Some(found.as_str().to_string());
    }
    let short = Regex::new(r"\d+\.\d+").ok()?;
    short.find(output).map(|m| m.as_str().to_string())
}

fn verify_binary(recipe: &Recipe) -> &str {
    recipe
        .package
        .verify_binary
        .as_deref()
        .unwrap_or(&recipe.package.name)
}

/// Run a version command through the shell, capturing stdout and stderr
/// together. Exit status is ignored; some tools report their version and
/// exit non-zero.
fn capture_shell(command: &str) -> Option<String> {
    let output = cmd!("sh", "-c", command)
        .stderr_to_stdout()
        .stdout_capture()
        .unchecked()
        .run()
        .ok()?;
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Invoke `binary flag`, returning combined output only on a zero exit.
fn probe_flag(binary: &str, flag: &str) -> Option<String> {
    let output = cmd!(binary, flag)
        .stderr_to_stdout()
        .stdout_capture()
        .unchecked()
        .run()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}
