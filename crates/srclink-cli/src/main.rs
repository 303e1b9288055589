#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::Instrument;

#[derive(Parser, Debug)]
#[command(name = "srclink")]
#[command(author, version, long_about = None)]
#[command(about = "Alias workspace packages to their source tree")]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Directory of the invoking package (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Workspace root (defaults to the nearest ancestor declaring a workspace)
    #[arg(long, global = true, value_name = "PATH", env = "SRCLINK_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// List every package manifest found under the workspace root
    Scan,

    /// Print the aliases and source globs for the invoking package
    Info {
        /// Only alias packages whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Never alias packages whose name contains this (repeatable; replaces the default)
        #[arg(long = "reserved", value_name = "NAMESPACE")]
        reserved: Vec<String>,
    },

    /// Resolve an import of a package to its source file
    Resolve {
        /// Package directory (must contain package.json)
        package_dir: PathBuf,

        /// Absolute or package-relative import path (defaults to the package root)
        specifier: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);

    let Some(command) = cli.command else {
        return commands::version::run();
    };

    let json = cli.json;
    let root = cli.root;
    logging::init(cli.verbose, json);

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    runtime.block_on(async move {
        match command {
            Commands::Version => commands::version::run(),
            Commands::Scan => {
                let root = commands::resolve_root(root, &cwd).await;
                commands::scan::run(&root, json).await
            }
            Commands::Info { prefix, reserved } => {
                let root = commands::resolve_root(root, &cwd).await;
                let span = tracing::info_span!("info", cwd = %cwd.display());
                commands::info::run(root, cwd.clone(), prefix, reserved, json)
                    .instrument(span)
                    .await
            }
            Commands::Resolve {
                package_dir,
                specifier,
            } => commands::resolve::run(&cwd, &package_dir, specifier.as_deref(), json).await,
        }
    })
}
