//! Manifest verification command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sipx_manifest::{verify_package, Package, PackageType, VerificationResult};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Package directory
    pub package: PathBuf,
    /// Package type (detected from the directory when omitted)
    #[arg(long = "type", value_name = "TYPE")]
    pub package_type: Option<PackageType>,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handle `sipx verify`. Returns whether the package verified cleanly.
pub fn cmd_verify(args: VerifyArgs) -> Result<bool> {
    let package = Package::open(&args.package, args.package_type)
        .with_context(|| format!("failed to open package {}", args.package.display()))?;
    let result = verify_package(&package)
        .with_context(|| format!("failed to verify package {}", args.package.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&package, &result);
    }
    Ok(!result.failed())
}

fn print_report(package: &Package, result: &VerificationResult) {
    println!("{}", "Manifest Verification".bold().underline());
    println!("{}: {}", "Package".bold(), package.path.display());
    println!("{}: {}", "Type".bold(), package.package_type);
    println!();

    if !result.failed() {
        println!("{} All declared files present and intact", "✓".green().bold());
        return;
    }

    print_section("Missing files", &result.missing_files);
    print_section("Unexpected files", &result.unexpected_files);
    print_section("Checksum mismatches", &result.checksum_mismatches);
    println!("{}: {}", "Status".bold(), "FAILED".red().bold());
}

fn print_section(title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    println!("{} ({}):", title.bold().yellow(), lines.len());
    for line in lines {
        println!("  - {line}");
    }
    println!();
}
