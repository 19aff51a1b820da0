//! Audit ledger query commands

use clap::{Args, Subcommand};
use traceport_core::{AuditRecord, EventType, LifecycleCategory};
use traceport_store::repo::AuditRepo;

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// List a product's audit trail, newest first
    List(ListArgs),
    /// Show a single ledger entry as JSON
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Product id whose trail to list
    #[arg(long)]
    pub product: String,

    /// Keep only entries of this event type
    #[arg(long)]
    pub event_type: Option<String>,

    /// Keep only entries with this lifecycle category
    #[arg(long)]
    pub category: Option<String>,

    /// Print full entries as JSON instead of one summary line each
    #[arg(long)]
    pub json: bool,

    #[arg(long, default_value = ".traceport/store.db")]
    pub db: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Ledger entry id
    pub id: String,

    #[arg(long, default_value = ".traceport/store.db")]
    pub db: String,
}

pub fn execute(args: AuditArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AuditCommand::List(args) => execute_list(args),
        AuditCommand::Show(args) => execute_show(args),
    }
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let event_type = args
        .event_type
        .as_deref()
        .map(|s| EventType::parse(s).ok_or_else(|| format!("unknown event type: {}", s)))
        .transpose()?;
    let category = args
        .category
        .as_deref()
        .map(|s| LifecycleCategory::parse(s).ok_or_else(|| format!("unknown category: {}", s)))
        .transpose()?;

    let conn = super::open_db(&args.db)?;
    let trail: Vec<AuditRecord> = AuditRepo::list_by_product(&conn, &args.product)?
        .into_iter()
        .filter(|r| event_type.map_or(true, |et| r.event_type == et))
        .filter(|r| category.map_or(true, |c| r.lifecycle_category == Some(c)))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&trail)?);
        return Ok(());
    }

    println!("{} entries for product {}", trail.len(), args.product);
    for record in &trail {
        let paths = record
            .diff
            .as_ref()
            .map(|d| d.path_keys().len())
            .unwrap_or(0);
        println!(
            "  {}  {}  {}  source={}  paths={}",
            record.created_at.to_rfc3339(),
            record.id,
            record.event_type,
            record.source.as_deref().unwrap_or("-"),
            paths,
        );
    }

    Ok(())
}

fn execute_show(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = super::open_db(&args.db)?;
    match AuditRepo::get(&conn, &args.id)? {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        None => Err(format!("no audit entry with id {}", args.id).into()),
    }
}
