use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::path::Path;

use crate::models::{ApiEnvelope, ScheduleEntry, ScheduleItem};

// ─── Loaded payload ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LoadedSchedule {
    pub entries: Vec<ScheduleEntry>,
    /// Records dropped at the boundary (malformed or out of range).
    pub rejected: usize,
    pub loaded_at: DateTime<Local>,
}

/// The backend answers either with a bare list or wrapped in its envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Bare(Vec<serde_json::Value>),
    Envelope(ApiEnvelope<Vec<serde_json::Value>>),
}

// ─── I/O ─────────────────────────────────────────────────────────────────────

pub fn load_schedule(path: &Path) -> Result<LoadedSchedule> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schedule at {}", path.display()))?;
    let loaded = parse_schedule(&contents)
        .with_context(|| format!("Failed to parse schedule at {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        entries = loaded.entries.len(),
        rejected = loaded.rejected,
        "schedule loaded"
    );
    Ok(loaded)
}

pub fn parse_schedule(json: &str) -> Result<LoadedSchedule> {
    let records = match serde_json::from_str::<Payload>(json)
        .context("Expected a list of schedule items or a {code, message, data} envelope")?
    {
        Payload::Bare(records) => records,
        Payload::Envelope(envelope) => {
            if let Some(code) = envelope.code.filter(|c| *c != 0 && *c != 200) {
                anyhow::bail!(
                    "Backend returned code {code}: {}",
                    envelope.message.unwrap_or_default()
                );
            }
            envelope.data
        }
    };

    let mut entries = Vec::with_capacity(records.len());
    let mut rejected = 0;
    for (idx, record) in records.into_iter().enumerate() {
        let item = match serde_json::from_value::<ScheduleItem>(record) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "skipping malformed schedule record");
                rejected += 1;
                continue;
            }
        };
        match ScheduleEntry::try_from(item) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "skipping out-of-range schedule record");
                rejected += 1;
            }
        }
    }

    Ok(LoadedSchedule {
        entries,
        rejected,
        loaded_at: Local::now(),
    })
}
