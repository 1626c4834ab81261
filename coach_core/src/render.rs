//! Display projection of a plan.
//!
//! `project` is a pure function of the plan: calling it twice on the same
//! plan yields the same view. A `Surface` is whatever shows the view.

use crate::time::{format_duration, format_km, format_long_date, format_pace, format_short_date};
use crate::{Day, Plan, Week, WorkoutKind};
use chrono::NaiveDate;
use std::fmt::Write;

/// Something that can show a rendered plan
pub trait Surface {
    fn present(&mut self, view: &PlanView);
}

/// Summary of a logged workout, already formatted for display
#[derive(Clone, Debug, PartialEq)]
pub struct LogSummary {
    pub logged_km: f64,
    pub duration: Option<String>,
    pub pace: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DayView {
    pub kind: WorkoutKind,
    pub planned_km: u32,
    pub date: NaiveDate,
    pub done: bool,
    pub notes: Option<String>,
    pub log: Option<LogSummary>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeekView {
    /// Zero-based position in the plan
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub planned_km: u32,
    pub logged_km: f64,
    pub days: Vec<DayView>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PlanView {
    pub weeks: Vec<WeekView>,
}

impl PlanView {
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// Project the plan into its display structure
pub fn project(plan: &Plan) -> PlanView {
    PlanView {
        weeks: plan
            .weeks
            .iter()
            .enumerate()
            .map(|(index, week)| project_week(index, week))
            .collect(),
    }
}

fn project_week(index: usize, week: &Week) -> WeekView {
    WeekView {
        index,
        start: week.week_start,
        end: week.end_date(),
        planned_km: week.planned_km(),
        logged_km: week.logged_km(),
        days: week.days.iter().map(project_day).collect(),
    }
}

fn project_day(day: &Day) -> DayView {
    DayView {
        kind: day.kind,
        planned_km: day.planned_km,
        date: day.date,
        done: day.done,
        notes: Some(day.notes.clone()).filter(|n| !n.is_empty()),
        log: day.log.as_ref().map(|log| LogSummary {
            logged_km: log.actual_km,
            duration: log.duration_sec.map(format_duration),
            pace: log.pace_sec_per_km.map(|p| format_pace(f64::from(p))),
        }),
    }
}

impl LogSummary {
    /// `Logged: 10.00 km • 50:00 • 5:00/km`
    pub fn line(&self) -> String {
        let mut line = format!("Logged: {:.2} km", self.logged_km);
        for part in [&self.duration, &self.pace].into_iter().flatten() {
            line.push_str(" • ");
            line.push_str(part);
        }
        line
    }
}

/// Render the view as terminal text
pub fn to_text(view: &PlanView) -> String {
    if view.is_empty() {
        return "No plan yet. Run `pmc generate --race-date YYYY-MM-DD` to create one.\n".into();
    }

    let mut out = String::new();
    for week in &view.weeks {
        let _ = writeln!(
            out,
            "Week {} • {} – {}   Planned: {} km • Logged: {:.1} km",
            week.index + 1,
            format_short_date(week.start),
            format_short_date(week.end),
            week.planned_km,
            week.logged_km
        );

        for (i, day) in week.days.iter().enumerate() {
            let check = if day.done { "[x]" } else { "[ ]" };
            let distance = if day.planned_km > 0 {
                format!(" • {} km", day.planned_km)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "  {} {} {}{}  ({})",
                check,
                i + 1,
                day.kind,
                distance,
                format_long_date(day.date)
            );
            if let Some(notes) = &day.notes {
                let _ = writeln!(out, "        📝 {}", notes);
            }
            if let Some(log) = &day.log {
                let _ = writeln!(out, "        {}", log.line());
            }
        }
        out.push('\n');
    }
    out
}

/// Description of a log used outside the plan view (calendar, CSV)
pub fn log_parts(day: &Day) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(log) = &day.log {
        if log.actual_km > 0.0 {
            parts.push(format!("Logged {} km", format_km(log.actual_km)));
        }
        if let Some(duration) = log.duration_sec {
            parts.push(format_duration(duration));
        }
        if let Some(pace) = log.pace_sec_per_km {
            parts.push(format_pace(f64::from(pace)));
        }
    }
    parts
}
