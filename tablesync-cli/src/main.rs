//! tablesync command-line tool
//!
//! Runs the three-way sync over JSON table snapshots:
//! 1. `compare` shows how Base, Local and Remote differ
//! 2. `merge` writes the merged table once every entry is decided
//! 3. `validate` checks a table and stores the per-row results
//!
//! Usage:
//!   tablesync npc compare --base base.json --local local.json --remote remote.json
//!   tablesync quest merge --base … --local … --remote … --out merged.json --accept remote
//!   tablesync dialogue validate --rows dialogue.json

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tablesync_cli::{Accept, Snapshots};
use tablesync_merge::SyncEngine;
use tablesync_tables::{
    DialogueRow, DialogueValidator, ItemRow, ItemValidator, NpcRow, NpcValidator, QuestRow,
    QuestValidator,
};
use tablesync_types::VersionToken;
use tablesync_validation::{RowValidator, Validatable};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "tablesync")]
#[command(about = "Three-way sync, merge and validation for authored tables")]
struct Cli {
    /// Sync configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    table: TableKind,
}

#[derive(Subcommand, Debug)]
enum TableKind {
    /// NPC definitions
    Npc {
        #[command(subcommand)]
        command: Command,
    },
    /// Quest states
    Quest {
        #[command(subcommand)]
        command: Command,
    },
    /// Item definitions
    Item {
        #[command(subcommand)]
        command: Command,
    },
    /// Dialogue tree nodes
    Dialogue {
        #[command(subcommand)]
        command: Command,
    },
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// Snapshot taken at the last export
    #[arg(long)]
    base: PathBuf,

    /// Current rows in the authoring tool
    #[arg(long)]
    local: PathBuf,

    /// Reimported, externally edited rows
    #[arg(long)]
    remote: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify every row and list the ones that need a decision
    Compare {
        #[command(flatten)]
        snapshots: SnapshotArgs,

        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merge the snapshots and write the result
    Merge {
        #[command(flatten)]
        snapshots: SnapshotArgs,

        /// Output file for the merged rows
        #[arg(short, long)]
        out: PathBuf,

        /// Side that wins for entries without an explicit decision
        #[arg(long, value_enum)]
        accept: Option<Accept>,

        /// Per-row decisions: { "<row-id>": "keep_local" | "keep_remote" | "keep_both" | "delete" }
        #[arg(long)]
        resolutions: Option<PathBuf>,
    },
    /// Validate a table, storing results on the rows when a version is given
    Validate {
        /// Rows file; rewritten with cached results when --version is set
        #[arg(long)]
        rows: PathBuf,

        /// Version of the lists the rules depend on
        #[arg(long)]
        version: Option<VersionToken>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = tablesync_cli::read_config(cli.config.as_deref())?;
    let engine = SyncEngine::new(config);

    match cli.table {
        TableKind::Npc { command } => run::<NpcRow, _>(&engine, command, NpcValidator),
        TableKind::Quest { command } => run::<QuestRow, _>(&engine, command, QuestValidator),
        TableKind::Item { command } => run::<ItemRow, _>(&engine, command, ItemValidator),
        TableKind::Dialogue { command } => {
            run::<DialogueRow, _>(&engine, command, DialogueValidator)
        }
    }
}

fn run<R, V>(engine: &SyncEngine, command: Command, validator: V) -> Result<()>
where
    R: Validatable + Serialize + DeserializeOwned,
    V: RowValidator<R>,
{
    match command {
        Command::Compare { snapshots, json } => {
            let snapshots = load(&snapshots)?;
            let report = tablesync_cli::compare(engine, &snapshots, &validator)?;
            if json {
                let entries = tablesync_cli::entry_summaries(&report);
                let out = serde_json::to_string_pretty(&entries)
                    .context("Failed to serialize report")?;
                println!("{out}");
            } else {
                print!("{}", tablesync_cli::render_report(&report, engine));
            }
        }
        Command::Merge {
            snapshots,
            out,
            accept,
            resolutions,
        } => {
            let snapshots = load(&snapshots)?;
            let resolutions = match resolutions {
                Some(path) => tablesync_cli::read_resolutions(&path)?,
                None => Default::default(),
            };
            let merged =
                tablesync_cli::merge(engine, &snapshots, &validator, &resolutions, accept)?;
            tablesync_cli::write_rows(&out, &merged.merged_rows)?;
            info!(
                "Wrote {} rows to {} ({} from local, {} from remote, {} deleted, {} unchanged)",
                merged.merged_rows.len(),
                out.display(),
                merged.applied_from_local,
                merged.applied_from_remote,
                merged.deleted,
                merged.unchanged
            );
        }
        Command::Validate { rows: path, version } => {
            let mut rows: Vec<R> = tablesync_cli::read_rows(&path)?;
            let token = version.unwrap_or_default();
            let report = tablesync_cli::validate(&mut rows, validator, &token);
            for issue in &report.issues {
                println!("{issue}");
            }
            println!(
                "{} rows validated, {} cached, {} deleted: {} errors, {} warnings",
                report.rows_validated,
                report.rows_cached,
                report.rows_skipped,
                report.error_count(),
                report.warning_count()
            );
            if version.is_some() {
                tablesync_cli::write_rows(&path, &rows)?;
            } else if report.rows_validated > 0 {
                warn!("No --version given; results were not stored");
            }
            if report.has_errors() {
                bail!("{} validation errors", report.error_count());
            }
        }
    }
    Ok(())
}

fn load<R: DeserializeOwned>(args: &SnapshotArgs) -> Result<Snapshots<R>> {
    Snapshots::load(&args.base, &args.local, &args.remote)
}
