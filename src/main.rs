mod backend;
mod commands;
mod environment;
mod install;
mod recipe;
mod requirements;
mod resolver;
mod spec;
mod version;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::InstallArgs;
use crate::recipe::source::RecipeSource;
use crate::requirements::Requirements;

/// Kit main parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Use a local recipe directory instead of the remote index
    #[arg(long, global = true, value_name = "DIR")]
    recipes: Option<PathBuf>,

    /// Requirements file to read and write
    #[arg(long, global = true, value_name = "FILE")]
    requirements: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install one or more tools
    Install {
        /// Tools to install, as `name` or `name@version`
        #[arg(required = true)]
        packages: Vec<String>,
        /// Version to install, overriding any `@version` in the spec
        #[arg(long)]
        version: Option<String>,
        /// Reinstall even if the tool is already present
        #[arg(short, long)]
        force: bool,
        /// Show what would happen without installing anything
        #[arg(long)]
        dry_run: bool,
        /// Replace a locally installed version that does not match
        #[arg(long)]
        ignore_local: bool,
    },

    /// Install everything listed in the requirements file
    Sync {
        /// Show what would happen without installing anything
        #[arg(long)]
        dry_run: bool,
        /// Replace locally installed versions that do not match
        #[arg(long)]
        ignore_local: bool,
    },

    /// Show recipe and install state for a tool
    Status { name: String },

    /// Search the recipe index
    Search { query: String },

    /// Show the detected package-manager backends
    Env,

    /// Add tools to the requirements file
    Add {
        /// Requirement specs, as `name` or `name@version`
        #[arg(required = true)]
        specs: Vec<String>,
    },

    /// Remove tools from the requirements file
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let source = match &cli.recipes {
        Some(dir) => RecipeSource::local(dir.clone()),
        None => RecipeSource::default_remote(),
    };
    let requirements_path = match &cli.requirements {
        Some(path) => path.clone(),
        None => Requirements::default_path()?,
    };

    match cli.command {
        Commands::Install {
            packages,
            version,
            force,
            dry_run,
            ignore_local,
        } => commands::install(
            source,
            &InstallArgs {
                packages,
                version,
                force,
                dry_run,
                ignore_local,
            },
        ),
        Commands::Sync {
            dry_run,
            ignore_local,
        } => commands::sync(source, &requirements_path, dry_run, ignore_local),
        Commands::Status { name } => commands::status(source, &name),
        Commands::Search { query } => commands::search(source, &query),
        Commands::Env => commands::env_report(),
        Commands::Add { specs } => commands::add(&requirements_path, &specs),
        Commands::Remove { names } => commands::remove(&requirements_path, &names),
    }
}
