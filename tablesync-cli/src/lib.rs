//! Shared plumbing for the `tablesync` binary.
//!
//! Snapshot files are JSON arrays of rows. Every command is generic over the
//! row type, so the binary only picks the table kind and its validator.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tablesync_merge::{
    MergeResult, Resolution, SyncConfig, SyncEngine, SyncReport, SyncRow, SyncStatus,
    ValidityLevel,
};
use tablesync_types::{RowId, VersionToken};
use tablesync_validation::{
    annotate_remote, RowValidator, StalenessCache, Validatable, ValidationReport,
};
use tracing::{debug, info};

/// Which side wins for entries the user did not decide explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Accept {
    Local,
    Remote,
}

impl Accept {
    pub fn resolution(self) -> Resolution {
        match self {
            Self::Local => Resolution::KeepLocal,
            Self::Remote => Resolution::KeepRemote,
        }
    }
}

/// The three collections of one sync cycle.
#[derive(Debug, Clone)]
pub struct Snapshots<R> {
    pub base: Vec<R>,
    pub local: Vec<R>,
    pub remote: Vec<R>,
}

impl<R: DeserializeOwned> Snapshots<R> {
    pub fn load(base: &Path, local: &Path, remote: &Path) -> Result<Self> {
        Ok(Self {
            base: read_rows(base)?,
            local: read_rows(local)?,
            remote: read_rows(remote)?,
        })
    }
}

pub fn read_rows<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rows: Vec<R> = tablesync_tables::rows_from_json(&json)
        .with_context(|| format!("Failed to parse rows in {}", path.display()))?;
    debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn write_rows<R: Serialize>(path: &Path, rows: &[R]) -> Result<()> {
    let json = tablesync_tables::rows_to_json(rows).context("Failed to serialize rows")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Reads a [`SyncConfig`], falling back to the defaults without a path.
pub fn read_config(path: Option<&Path>) -> Result<SyncConfig> {
    let Some(path) = path else {
        return Ok(SyncConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid config {}", path.display()))
}

/// Reads a resolution file: `{ "<row-id>": "keep_local" | ... }`.
pub fn read_resolutions(path: &Path) -> Result<BTreeMap<RowId, Resolution>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read resolutions {}", path.display()))?;
    let raw: BTreeMap<String, Resolution> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid resolutions {}", path.display()))?;
    raw.into_iter()
        .map(|(id, resolution)| {
            let row_id = id
                .parse::<RowId>()
                .with_context(|| format!("Invalid row id '{id}' in {}", path.display()))?;
            Ok((row_id, resolution))
        })
        .collect()
}

/// Compares the snapshots, validates the Remote rows and settles every
/// entry that needs no review.
pub fn compare<R, V>(engine: &SyncEngine, snapshots: &Snapshots<R>, validator: &V) -> Result<SyncReport<R>>
where
    R: SyncRow,
    V: RowValidator<R>,
{
    let mut report = engine
        .compare(&snapshots.base, &snapshots.local, &snapshots.remote)
        .context("Comparison failed")?;
    annotate_remote(&mut report, validator);
    let settled = engine.auto_resolve(&mut report);
    info!("{} ({} settled automatically)", report.summary_line(), settled);
    Ok(report)
}

/// Runs a full sync cycle and returns the merged rows.
///
/// Explicit `resolutions` are applied first; `accept` then decides every
/// entry still pending. Fails if anything is left undecided.
pub fn merge<R, V>(
    engine: &SyncEngine,
    snapshots: &Snapshots<R>,
    validator: &V,
    resolutions: &BTreeMap<RowId, Resolution>,
    accept: Option<Accept>,
) -> Result<MergeResult<R>>
where
    R: SyncRow,
    V: RowValidator<R>,
{
    let mut report = compare(engine, snapshots, validator)?;
    for (&row_id, &resolution) in resolutions {
        engine
            .resolve(&mut report, row_id, resolution)
            .with_context(|| format!("Cannot resolve row {row_id}"))?;
    }
    if let Some(accept) = accept {
        for row_id in engine.pending(&report) {
            engine.resolve(&mut report, row_id, accept.resolution())?;
        }
    }

    let pending = engine.pending(&report);
    if let Some(&first) = pending.first() {
        let name = report
            .entry(first)
            .map(|e| e.display_name())
            .unwrap_or_else(|| first.to_string());
        bail!(
            "{} entries still need a decision (first: {}); pass --accept or --resolutions",
            pending.len(),
            name
        );
    }
    Ok(engine.try_apply(&report)?)
}

/// Validates `rows` in place against `version`, reusing cached results.
pub fn validate<R, V>(rows: &mut [R], validator: V, version: &VersionToken) -> ValidationReport
where
    R: Validatable,
    V: RowValidator<R>,
{
    StalenessCache::new(validator).validate_all_and_cache(rows, version)
}

/// One report entry, as printed with `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub row_id: RowId,
    pub name: String,
    pub status: SyncStatus,
    pub resolution: Resolution,
    pub validity: ValidityLevel,
    pub messages: Vec<String>,
}

pub fn entry_summaries<R: SyncRow>(report: &SyncReport<R>) -> Vec<EntrySummary> {
    report
        .entries
        .iter()
        .map(|entry| EntrySummary {
            row_id: entry.row_id,
            name: entry.display_name(),
            status: entry.status,
            resolution: entry.resolution,
            validity: entry.validation.level,
            messages: entry.validation.messages.clone(),
        })
        .collect()
}

/// Human-readable report: the summary line, then every entry that still
/// needs a decision with its Remote validation findings.
pub fn render_report<R: SyncRow>(report: &SyncReport<R>, engine: &SyncEngine) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.summary_line());
    for entry in report.requiring_resolution(engine.policy()) {
        let _ = writeln!(
            out,
            "  {:<20} {} ({})",
            entry.status.label(),
            entry.display_name(),
            entry.row_id
        );
        for message in &entry.validation.messages {
            let _ = writeln!(out, "      {message}");
        }
    }
    if report.validation_errors > 0 {
        let _ = writeln!(
            out,
            "{} remote rows have validation errors",
            report.validation_errors
        );
    }
    out
}
