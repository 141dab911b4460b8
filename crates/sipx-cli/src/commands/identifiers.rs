//! Identifier sidecar command.

use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sipx_manifest::{parse_manifest_file, Package, PackageType};
use sipx_pip::{project_identifiers, write_sidecar};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct IdentifiersArgs {
    /// Package directory
    pub package: PathBuf,
    /// Sidecar file to write (default: `pip.identifiers_file` from the config)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Package type (detected from the directory when omitted)
    #[arg(long = "type", value_name = "TYPE")]
    pub package_type: Option<PackageType>,
    /// Name of the restructured package (default: the directory name)
    #[arg(long)]
    pub name: Option<String>,
}

/// Handle `sipx identifiers`.
pub fn cmd_identifiers(args: IdentifiersArgs, config: &Config) -> Result<()> {
    let package = Package::open(&args.package, args.package_type)
        .with_context(|| format!("failed to open package {}", args.package.display()))?;
    let manifest_path = package.manifest_path();
    let manifest = parse_manifest_file(&manifest_path)
        .with_context(|| format!("failed to parse manifest {}", manifest_path.display()))?;

    let name = args.name.unwrap_or_else(|| package.name());
    let records = project_identifiers(&manifest, package.package_type, &name)
        .with_context(|| format!("failed to project identifiers for {name}"))?;

    let output = args
        .output
        .unwrap_or_else(|| config.pip.identifiers_file.clone());
    write_sidecar(&output, &records)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "{} {} identifiers written to {}",
        "✓".green().bold(),
        records.len(),
        output.display()
    );
    Ok(())
}
