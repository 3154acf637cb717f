//! Inspect how a tenant's units and resources resolve.
//!
//! Reads the layer layout from `stratum.toml` (or `--config`), builds the
//! shared environment plus the tenant resolver, and answers one query.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stratum::ResolveError;
use stratum::assemble::{Layers, assemble_from_file};
use stratum::exit_codes;
use stratum::io::config::DEFAULT_CONFIG_FILE;
use stratum::logging;

#[derive(Parser)]
#[command(
    name = "stratum",
    version,
    about = "Inspect layered, per-tenant unit resolution"
)]
struct Cli {
    /// Layer layout file; relative artifact paths resolve against its directory.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a unit (dotted name) and print the origin of its definition.
    Resolve { unit: String },
    /// List every visible candidate for a resource path, tenant layer first.
    Resources { resource: String },
    /// Validate the config and print a summary of both layers.
    Check,
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let layers = assemble_from_file(&cli.config, None)?;
    match cli.command {
        Command::Resolve { unit } => cmd_resolve(&layers, &unit),
        Command::Resources { resource } => Ok(cmd_resources(&layers, &resource)),
        Command::Check => Ok(cmd_check(&layers)),
    }
}

fn cmd_resolve(layers: &Layers, unit: &str) -> Result<i32> {
    match layers.tenant.resolve_one(unit) {
        Ok(def) => {
            println!("{}\t{}", def.origin, def.resource);
            Ok(exit_codes::OK)
        }
        Err(err @ ResolveError::NotFound { .. }) => {
            eprintln!("{err}");
            Ok(exit_codes::NOT_FOUND)
        }
        Err(err) => Err(err).with_context(|| format!("resolve {unit}")),
    }
}

fn cmd_resources(layers: &Layers, resource: &str) -> i32 {
    let candidates = layers.tenant.resolve_all(resource);
    if candidates.is_empty() {
        eprintln!("no visible candidate for `{resource}`");
        return exit_codes::NOT_FOUND;
    }
    for candidate in &candidates {
        println!("{}", candidate.url());
    }
    exit_codes::OK
}

fn cmd_check(layers: &Layers) -> i32 {
    let tenant = &layers.tenant;
    println!("tenant: {}", tenant.tenant());
    println!("selector: {}", tenant.selector().as_str());
    println!("tenant artifacts: {}", tenant.artifacts().len());
    println!("shared artifacts: {}", layers.shared.artifacts().len());
    exit_codes::OK
}
