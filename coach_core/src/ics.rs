//! iCalendar export of the plan.
//!
//! One all-day event per planned run (non-Rest days with distance). The
//! payload is handed to an `ExportSink`; this module never decides where
//! the file ends up.

use crate::render::log_parts;
use crate::{Day, Error, Plan, Result, WorkoutKind};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File name used for the calendar download
pub const CALENDAR_FILE_NAME: &str = "marathon_plan.ics";

const PRODID: &str = "-//Pocket Marathon Coach//EN";

/// Receives an exported payload
pub trait ExportSink {
    fn deliver(&mut self, file_name: &str, payload: &str) -> Result<PathBuf>;
}

/// Writes exports into a directory
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for FileSink {
    fn deliver(&mut self, file_name: &str, payload: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, payload)?;
        tracing::info!("Wrote {} bytes to {:?}", payload.len(), path);
        Ok(path)
    }
}

/// Whether a day becomes a calendar event
pub fn is_exported(day: &Day) -> bool {
    day.kind != WorkoutKind::Rest && day.planned_km > 0
}

/// Build the calendar payload (CRLF line endings)
pub fn export(plan: &Plan) -> Result<String> {
    if plan.is_empty() {
        return Err(Error::EmptyPlan);
    }

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
    ];

    let mut events = 0;
    for day in plan.days().filter(|d| is_exported(d)) {
        let date = day.date.format("%Y%m%d");
        lines.push("BEGIN:VEVENT".into());
        lines.push(format!("UID:{}@pmc", Uuid::new_v4()));
        lines.push(format!("DTSTAMP:{}T080000Z", date));
        lines.push(format!("DTSTART;VALUE=DATE:{}", date));
        lines.push(format!("SUMMARY:{} {} km", day.kind, day.planned_km));
        if let Some(description) = describe(day) {
            lines.push(format!("DESCRIPTION:{}", escape_text(&description)));
        }
        lines.push("END:VEVENT".into());
        events += 1;
    }

    lines.push("END:VCALENDAR".into());
    tracing::info!("Exported {} calendar events", events);
    Ok(lines.join("\r\n"))
}

/// Export the plan and hand it to `sink` as `marathon_plan.ics`
pub fn export_to(plan: &Plan, sink: &mut dyn ExportSink) -> Result<PathBuf> {
    let payload = export(plan)?;
    sink.deliver(CALENDAR_FILE_NAME, &payload)
}

/// Notes and logged-workout summary, joined with ` | `
fn describe(day: &Day) -> Option<String> {
    let mut sections = Vec::new();
    if !day.notes.is_empty() {
        sections.push(day.notes.replace(['\r', '\n'], " "));
    }
    let parts = log_parts(day);
    if !parts.is_empty() {
        sections.push(parts.join(" • "));
    }
    if sections.is_empty() {
        None
    } else {
        Some(sections.join(" | "))
    }
}

/// RFC 5545 TEXT escaping
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' | '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::distribute_week;
    use crate::WorkoutLog;
    use chrono::NaiveDate;

    fn sample_plan() -> Plan {
        let start = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        Plan::new(vec![
            distribute_week(start, 50, 4, 32.0),
            distribute_week(start + chrono::Duration::weeks(1), 55, 4, 32.0),
        ])
    }

    fn vevent_count(payload: &str) -> usize {
        payload.lines().filter(|l| *l == "BEGIN:VEVENT").count()
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        assert!(matches!(export(&Plan::default()), Err(Error::EmptyPlan)));
    }

    #[test]
    fn test_one_event_per_run_day() {
        let plan = sample_plan();
        let payload = export(&plan).unwrap();

        let expected = plan.days().filter(|d| is_exported(d)).count();
        assert_eq!(expected, 8);
        assert_eq!(vevent_count(&payload), expected);
        assert!(payload.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(payload.ends_with("END:VCALENDAR"));
        assert!(!payload.contains("SUMMARY:Rest"));
    }

    #[test]
    fn test_event_fields() {
        let payload = export(&sample_plan()).unwrap();
        assert!(payload.contains("DTSTAMP:20261019T080000Z\r\n"));
        assert!(payload.contains("DTSTART;VALUE=DATE:20261019\r\n"));
        assert!(payload.contains("SUMMARY:Workout 11 km\r\n"));
        assert!(payload.contains("SUMMARY:Long 19 km\r\n"));
        assert!(payload.contains("@pmc\r\n"));
    }

    #[test]
    fn test_uids_are_unique() {
        let payload = export(&sample_plan()).unwrap();
        let uids: std::collections::HashSet<_> =
            payload.lines().filter(|l| l.starts_with("UID:")).collect();
        assert_eq!(uids.len(), vevent_count(&payload));
    }

    #[test]
    fn test_zero_km_run_day_is_skipped() {
        let mut plan = sample_plan();
        plan.day_mut(0, 0).unwrap().planned_km = 0;
        let payload = export(&plan).unwrap();
        assert_eq!(vevent_count(&payload), 7);
    }

    #[test]
    fn test_rest_day_with_distance_is_skipped() {
        let mut plan = sample_plan();
        let day = plan.day_mut(0, 4).unwrap();
        day.kind = WorkoutKind::Rest;
        day.planned_km = 10;

        let payload = export(&plan).unwrap();
        assert_eq!(vevent_count(&payload), 8);
        assert!(!payload.contains("DTSTART;VALUE=DATE:20261023\r\n"));
        assert!(!payload.contains("SUMMARY:Rest"));
    }

    #[test]
    fn test_description_combines_notes_and_log() {
        let mut plan = sample_plan();
        let day = plan.day_mut(0, 0).unwrap();
        day.notes = "6x800m,\nfast".into();
        day.log = Some(WorkoutLog::new(10.5, Some(3000), None));

        let payload = export(&plan).unwrap();
        assert!(payload
            .contains("DESCRIPTION:6x800m\\, fast | Logged 10.5 km • 50:00 • 4:46/km\r\n"));
    }

    #[test]
    fn test_export_to_file_sink() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(temp_dir.path());

        let path = export_to(&sample_plan(), &mut sink).unwrap();
        assert_eq!(path, temp_dir.path().join(CALENDAR_FILE_NAME));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("BEGIN:VEVENT"));
    }
}
