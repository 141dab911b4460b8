//! PREMIS CLI commands.

use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use sipx_prov::{
    add_premis_agent, add_premis_event, add_premis_objects, EventContext, EventSummary,
    PremisDocument, UUID_IDENTIFIER_TYPE,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct PremisArgs {
    #[command(subcommand)]
    pub command: PremisCommand,
}

#[derive(Debug, Subcommand)]
pub enum PremisCommand {
    /// Record a single file object
    Object {
        /// PREMIS file (created if missing)
        file: PathBuf,
        /// Original name of the object (e.g. data/objects/a.txt)
        #[arg(long)]
        name: String,
        /// UUID of the object (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Record an object for every file in a directory
    Objects {
        /// PREMIS file (created if missing)
        file: PathBuf,
        /// Directory whose files become data/objects/...
        content: PathBuf,
    },
    /// Record the configured agent
    Agent {
        /// PREMIS file (created if missing)
        file: PathBuf,
    },
    /// Record an event concerning every object
    Event {
        /// PREMIS file (created if missing)
        file: PathBuf,
        /// Event type (e.g. validation)
        #[arg(long = "type", value_name = "TYPE")]
        event_type: String,
        #[arg(long, default_value = "")]
        detail: String,
        /// Event outcome (e.g. valid, invalid)
        #[arg(long, default_value = "")]
        outcome: String,
        /// Outcome detail note
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Display a PREMIS file in human-readable format
    Log {
        file: PathBuf,
    },
}

pub fn run(args: PremisArgs, config: &Config) -> Result<()> {
    match args.command {
        PremisCommand::Object { file, name, id } => cmd_object(&file, &name, id),
        PremisCommand::Objects { file, content } => cmd_objects(&file, &content),
        PremisCommand::Agent { file } => cmd_agent(&file, config),
        PremisCommand::Event {
            file,
            event_type,
            detail,
            outcome,
            note,
        } => {
            let summary = EventSummary::new(event_type, detail, outcome, note);
            cmd_event(&file, &summary, config)
        }
        PremisCommand::Log { file } => cmd_log(&file),
    }
}

fn load(file: &Path) -> Result<PremisDocument> {
    PremisDocument::parse_or_initialize(file)
        .with_context(|| format!("failed to load PREMIS file {}", file.display()))
}

/// Handle `sipx premis object`.
pub fn cmd_object(file: &Path, name: &str, id: Option<String>) -> Result<()> {
    let mut doc = load(file)?;
    let id = id.unwrap_or_else(|| EventContext::system().next_id());
    if doc.append_object(name, UUID_IDENTIFIER_TYPE, &id) {
        doc.save(file)
            .with_context(|| format!("failed to write PREMIS file {}", file.display()))?;
        println!("{} Object {} recorded", "✓".green().bold(), name);
    } else {
        println!("{} Object {} already recorded", "•".yellow(), name);
    }
    Ok(())
}

/// Handle `sipx premis objects`.
pub fn cmd_objects(file: &Path, content: &Path) -> Result<()> {
    let added = add_premis_objects(file, content, &EventContext::system())
        .with_context(|| format!("failed to record objects for {}", content.display()))?;
    println!("{} {} objects recorded", "✓".green().bold(), added);
    Ok(())
}

/// Handle `sipx premis agent`.
pub fn cmd_agent(file: &Path, config: &Config) -> Result<()> {
    let agent = config.agent.to_agent();
    let added = add_premis_agent(file, &agent)
        .with_context(|| format!("failed to record agent in {}", file.display()))?;
    if added {
        println!("{} Agent {} recorded", "✓".green().bold(), agent.name);
    } else {
        println!("{} Agent {} already recorded", "•".yellow(), agent.name);
    }
    Ok(())
}

/// Handle `sipx premis event`.
pub fn cmd_event(file: &Path, summary: &EventSummary, config: &Config) -> Result<()> {
    let agent = config.agent.to_agent();
    let id = add_premis_event(file, summary, &agent, &EventContext::system())
        .with_context(|| format!("failed to record event in {}", file.display()))?;
    println!("{} Event {} recorded", "✓".green().bold(), id.value);
    Ok(())
}

/// Handle `sipx premis log`.
pub fn cmd_log(file: &Path) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("PREMIS file {} does not exist", file.display());
    }
    let doc = load(file)?;

    if doc.is_empty() {
        println!("{}", "PREMIS file is empty".yellow());
        return Ok(());
    }

    println!("{}", "PREMIS Record".bold().underline());
    println!("{}: {}", "File".bold(), file.display());
    let objects = doc.objects();
    let agents = doc.agents();
    println!(
        "{}: {}  {}: {}  {}: {}",
        "Objects".bold(),
        objects.len(),
        "Events".bold(),
        doc.events().len(),
        "Agents".bold(),
        agents.len()
    );
    println!();

    for object in &objects {
        println!("{} {}", "Object".bold().cyan(), object.original_name.cyan());
        println!(
            "  {}: {} ({})",
            "ID".bold(),
            object.identifier.value,
            object.identifier.id_type
        );
        if !object.format_name.is_empty() {
            println!("  {}: {}", "Format".bold(), object.format_name);
        }
        let events = doc.events_for(&object.original_name);
        if events.is_empty() {
            println!("  {}: {}", "Events".bold(), "none".yellow());
        }
        for event in events {
            let outcome = match event.outcome.as_str() {
                "invalid" | "failure" => event.outcome.red(),
                _ => event.outcome.green(),
            };
            println!(
                "    - {} {} [{}]",
                event.date_time,
                event.event_type,
                outcome
            );
            if let Some(agent) = doc.agent(&event.linking_agent) {
                println!("      {}: {}", "by".dimmed(), agent.name);
            }
        }
        println!();
    }

    if !agents.is_empty() {
        println!("{}", "Agents".bold());
        for agent in &agents {
            println!(
                "  - {} ({}, {}: {})",
                agent.name.green(),
                agent.agent_type,
                agent.identifier.id_type,
                agent.identifier.value
            );
        }
    }
    Ok(())
}
