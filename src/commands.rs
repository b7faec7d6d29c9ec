//! Command handlers for the CLI surface.

use std::path::Path;

use anyhow::{Result, bail};
use colored::Colorize;

use crate::backend::Backend;
use crate::environment::Environment;
use crate::install::sync::{self, SyncOptions, SyncWarning};
use crate::install::{InstallOptions, InstallOutcome, Installer, SkipReason};
use crate::recipe::source::RecipeSource;
use crate::requirements::Requirements;
use crate::resolver;
use crate::spec::PackageSpec;
use crate::version;

pub struct InstallArgs {
    pub packages: Vec<String>,
    pub version: Option<String>,
    pub force: bool,
    pub dry_run: bool,
    pub ignore_local: bool,
}

/// Install the requested tools, one fallback chain each.
pub fn install(source: RecipeSource, args: &InstallArgs) -> Result<()> {
    let env = Environment::detect();
    let mut installer = Installer::new(&env, source);
    let mut failed = 0;

    for raw in &args.packages {
        let spec = PackageSpec::parse(raw);
        let recipe = match installer.recipe(&spec.name) {
            Ok(recipe) => recipe,
            Err(error) => {
                println!("{} {}: {error}", "✗".red(), spec.name.bold());
                failed += 1;
                continue;
            }
        };

        let options = InstallOptions {
            force: args.force,
            dry_run: args.dry_run,
            ignore_local: args.ignore_local,
            // An explicit --version wins over the version in the spec.
            version: args.version.clone().or_else(|| spec.version.clone()),
        };
        let outcome = installer.install_one(&recipe, &options);
        print_outcome(&spec.name, &outcome);
        if outcome.is_failure() {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} package(s) failed to install");
    }
    Ok(())
}

/// Install everything the requirements file lists.
pub fn sync(
    source: RecipeSource,
    requirements_path: &Path,
    dry_run: bool,
    ignore_local: bool,
) -> Result<()> {
    // An unreadable requirements file aborts the run before any package.
    let requirements = Requirements::load(requirements_path)?;
    let specs = requirements.specs();
    if specs.is_empty() {
        println!("Nothing to sync: {} lists no tools.", requirements_path.display());
        return Ok(());
    }

    let env = Environment::detect();
    let mut installer = Installer::new(&env, source);
    let report = sync::sync(
        &mut installer,
        &specs,
        &SyncOptions {
            dry_run,
            ignore_local,
        },
    );

    for warning in &report.warnings {
        match warning {
            SyncWarning::RecipeUnavailable { name, message } => {
                println!("{} {}: {message}", "!".yellow(), name.bold());
            }
            SyncWarning::NoInstallMethod { name } => {
                println!(
                    "{} {}: no installation method available",
                    "!".yellow(),
                    name.bold()
                );
            }
        }
    }
    for result in &report.results {
        print_outcome(&result.spec.name, &result.outcome);
    }

    println!();
    println!(
        "{} installed, {} skipped, {} failed, {} warning(s)",
        report.installed().to_string().green(),
        report.skipped(),
        report.failed().to_string().red(),
        report.warnings.len()
    );

    if report.has_failures() {
        bail!("sync finished with failures");
    }
    Ok(())
}

/// Show recipe metadata and install state for one tool.
pub fn status(source: RecipeSource, name: &str) -> Result<()> {
    let env = Environment::detect();
    let mut installer = Installer::new(&env, source);
    let recipe = installer.recipe(name)?;

    let check = version::check(&recipe, None);
    let first = resolver::resolve_first(&recipe, &env, None);

    println!("{}", recipe.name().bold());
    if let Some(description) = &recipe.package.description {
        println!("  {description}");
    }
    if let Some(homepage) = &recipe.package.homepage {
        println!("  {}", homepage.dimmed());
    }
    println!();

    let installed = if check.installed {
        match &check.installed_version {
            Some(version) => format!("yes ({version})").green(),
            None => "yes".green(),
        }
    } else {
        "no".red()
    };
    println!("{: <14} {installed}", "Installed:");

    match first {
        Some((backend, _)) => println!("{: <14} {backend}", "Install via:"),
        None => println!("{: <14} {}", "Install via:", "none available".yellow()),
    }

    let declared: Vec<&str> = recipe.method_keys().collect();
    println!("{: <14} {}", "Recipes for:", declared.join(", "));
    Ok(())
}

/// Search the recipe index.
pub fn search(mut source: RecipeSource, query: &str) -> Result<()> {
    let entries = source.search(query)?;
    if entries.is_empty() {
        println!("No recipes match '{query}'.");
        return Ok(());
    }

    for entry in entries {
        let description = entry.description.unwrap_or_default();
        println!("{: <24} {}", entry.name.cyan(), description.dimmed());
    }
    Ok(())
}

/// Show the detected package-manager backends.
pub fn env_report() -> Result<()> {
    let env = Environment::detect();

    println!("{}", "Detected backends (in fallback order):".bold());
    println!();
    for backend in env.backends() {
        let kind = if backend.is_native() {
            "native"
        } else if *backend == Backend::Script {
            "fallback"
        } else {
            "cross-platform"
        };
        let pinning = if backend.supports_versioning() {
            "version pinning".green()
        } else {
            "no version pinning".dimmed()
        };
        println!("  {: <12} {: <16} {pinning}", backend.to_string(), kind);
    }
    Ok(())
}

/// Add requirements to the requirements file.
pub fn add(requirements_path: &Path, specs: &[String]) -> Result<()> {
    let mut requirements = Requirements::load(requirements_path)?;
    for raw in specs {
        let spec = PackageSpec::parse(raw);
        requirements.add(&spec);
        println!("{} added {spec}", "✓".green());
    }
    requirements.save(requirements_path)
}

/// Remove requirements from the requirements file.
pub fn remove(requirements_path: &Path, names: &[String]) -> Result<()> {
    let mut requirements = Requirements::load(requirements_path)?;
    for raw in names {
        let name = &PackageSpec::parse(raw).name;
        if requirements.remove(name) {
            println!("{} removed {name}", "✓".green());
        } else {
            println!("{} {name} was not tracked", "!".yellow());
        }
    }
    requirements.save(requirements_path)
}

fn print_outcome(name: &str, outcome: &InstallOutcome) {
    match outcome {
        InstallOutcome::Skipped(SkipReason::AlreadyInstalled { version }) => {
            let suffix = version
                .as_deref()
                .map(|v| format!(" ({v})"))
                .unwrap_or_default();
            println!("{} {} already installed{suffix}", "✓".green(), name.bold());
        }
        InstallOutcome::Skipped(SkipReason::VersionMismatch { installed, required }) => {
            println!(
                "{} {} held back: installed {} does not match {required}; use --ignore-local to replace it",
                "!".yellow(),
                name.bold(),
                installed.as_deref().unwrap_or("unknown version"),
            );
        }
        InstallOutcome::Installed { backend, attempts } => {
            for attempt in attempts {
                println!(
                    "  {} {} failed: {}",
                    "↪".yellow(),
                    attempt.backend,
                    attempt.message.dimmed()
                );
            }
            println!("{} {} installed via {backend}", "✓".green(), name.bold());
        }
        InstallOutcome::WouldInstall { backend, fallbacks } => {
            let tail = if fallbacks.is_empty() {
                String::new()
            } else {
                let names: Vec<String> = fallbacks.iter().map(ToString::to_string).collect();
                format!(" (fallbacks: {})", names.join(", "))
            };
            println!(
                "{} would install {} via {backend}{tail}",
                "→".cyan(),
                name.bold()
            );
        }
        InstallOutcome::NoMethod => {
            println!(
                "{} {}: no installation method available",
                "✗".red(),
                name.bold()
            );
        }
        InstallOutcome::AllMethodsFailed { attempts } => {
            println!("{} {} failed on every backend:", "✗".red(), name.bold());
            for attempt in attempts {
                println!("    {}: {}", attempt.backend, attempt.message);
            }
        }
    }
}
