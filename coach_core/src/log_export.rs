//! CSV export of completed and logged workouts.
//!
//! One row per day that is marked done or carries a log, in plan order.

use crate::time::{format_duration, format_km};
use crate::{Error, Plan, Result};
use std::io::Write;
use std::path::Path;

/// File name used for the workout log export
pub const LOG_FILE_NAME: &str = "workout_log.csv";

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    week: usize,
    date: String,
    #[serde(rename = "type")]
    kind: String,
    planned_km: u32,
    done: bool,
    actual_km: Option<String>,
    duration: Option<String>,
    pace_sec_per_km: Option<u32>,
    notes: String,
}

/// Write the log rows to any writer, returning how many were written
pub fn write_csv<W: Write>(plan: &Plan, writer: W) -> Result<usize> {
    if plan.is_empty() {
        return Err(Error::EmptyPlan);
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut count = 0;

    for (w, week) in plan.weeks.iter().enumerate() {
        for day in week.days.iter().filter(|d| d.done || d.log.is_some()) {
            let log = day.log.as_ref();
            csv_writer.serialize(CsvRow {
                week: w + 1,
                date: day.date.format("%Y-%m-%d").to_string(),
                kind: day.kind.to_string(),
                planned_km: day.planned_km,
                done: day.done,
                actual_km: log.map(|l| format_km(l.actual_km)),
                duration: log.and_then(|l| l.duration_sec).map(format_duration),
                pace_sec_per_km: log.and_then(|l| l.pace_sec_per_km),
                notes: day.notes.clone(),
            })?;
            count += 1;
        }
    }

    csv_writer.flush()?;
    tracing::info!("Exported {} logged days to CSV", count);
    Ok(count)
}

/// Write the log to `path`, replacing any previous export
pub fn write_csv_file(plan: &Plan, path: &Path) -> Result<usize> {
    if plan.is_empty() {
        return Err(Error::EmptyPlan);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(plan, std::io::BufWriter::new(file))
}
