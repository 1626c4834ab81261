//! Core domain types for Pocket Marathon Coach.
//!
//! This module defines the data model shared by every component:
//! - Training parameters collected from the user
//! - The plan itself (weeks of seven days)
//! - Workout logs recorded against a day
//!
//! Serialized field names match the JSON blobs kept in persistent storage.

use crate::{Error, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Training Parameters
// ============================================================================

/// User-supplied inputs for plan generation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_date: Option<NaiveDate>,
    pub base_km: f64,
    pub peak_km: f64,
    pub runs_per_week: u32,
    #[serde(rename = "longRunPeak")]
    pub long_run_peak_km: f64,
    pub cutback: bool,
}

impl Default for TrainingParameters {
    fn default() -> Self {
        Self {
            race_date: None,
            base_km: 30.0,
            peak_km: 60.0,
            runs_per_week: 4,
            long_run_peak_km: 32.0,
            cutback: true,
        }
    }
}

impl TrainingParameters {
    /// Check the parameters before generating a plan, returning the race date
    pub fn validate(&self) -> Result<NaiveDate> {
        let race_date = self
            .race_date
            .ok_or_else(|| Error::Validation("Pick your race date first.".into()))?;

        for (name, value) in [
            ("base weekly km", self.base_km),
            ("peak weekly km", self.peak_km),
            ("long run peak km", self.long_run_peak_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(race_date)
    }
}

// ============================================================================
// Workout Types
// ============================================================================

/// What a day of the plan asks for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum WorkoutKind {
    #[default]
    Rest,
    Easy,
    Workout,
    Long,
}

impl WorkoutKind {
    pub const ALL: [WorkoutKind; 4] = [
        WorkoutKind::Rest,
        WorkoutKind::Easy,
        WorkoutKind::Workout,
        WorkoutKind::Long,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Rest => "Rest",
            WorkoutKind::Easy => "Easy",
            WorkoutKind::Workout => "Workout",
            WorkoutKind::Long => "Long",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        WorkoutKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Unknown workout type '{}' (expected Easy / Workout / Long / Rest)",
                    wanted
                ))
            })
    }
}

/// A workout the user actually ran
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    #[serde(rename = "actualKm")]
    pub actual_km: f64,
    #[serde(rename = "durationSec", default)]
    pub duration_sec: Option<u32>,
    #[serde(rename = "paceSecPerKm", default)]
    pub pace_sec_per_km: Option<u32>,
}

impl WorkoutLog {
    /// Build a log entry, deriving pace from duration whenever both are known
    ///
    /// `manual_pace` is only consulted when the pace cannot be derived.
    pub fn new(actual_km: f64, duration_sec: Option<u32>, manual_pace: Option<u32>) -> Self {
        let actual_km = if actual_km.is_finite() {
            actual_km.max(0.0)
        } else {
            0.0
        };
        let duration_sec = duration_sec.filter(|d| *d > 0);
        let pace_sec_per_km =
            derived_pace(actual_km, duration_sec).or(manual_pace.filter(|p| *p > 0));

        Self {
            actual_km,
            duration_sec,
            pace_sec_per_km,
        }
    }
}

/// Pace in seconds per km, when distance and duration are both positive
pub fn derived_pace(distance_km: f64, duration_sec: Option<u32>) -> Option<u32> {
    let pace = match duration_sec {
        Some(duration) if distance_km > 0.0 && duration > 0 => {
            (f64::from(duration) / distance_km).round() as u32
        }
        _ => return None,
    };
    Some(pace).filter(|p| *p > 0)
}

// ============================================================================
// Plan Structure
// ============================================================================

/// One day of the plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Day {
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
    #[serde(rename = "km")]
    pub planned_km: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub log: Option<WorkoutLog>,
    #[serde(rename = "dateISO")]
    pub date: NaiveDate,
}

impl Day {
    pub fn rest(date: NaiveDate) -> Self {
        Self {
            kind: WorkoutKind::Rest,
            planned_km: 0,
            notes: String::new(),
            done: false,
            log: None,
            date,
        }
    }

    pub fn logged_km(&self) -> f64 {
        self.log.as_ref().map_or(0.0, |log| log.actual_km)
    }
}

/// Seven consecutive days starting on a Monday
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Week {
    #[serde(rename = "weekStartISO")]
    pub week_start: NaiveDate,
    pub days: Vec<Day>,
}

impl Week {
    pub fn end_date(&self) -> NaiveDate {
        self.week_start + Duration::days(6)
    }

    pub fn planned_km(&self) -> u32 {
        self.days.iter().map(|d| d.planned_km).sum()
    }

    pub fn logged_km(&self) -> f64 {
        self.days.iter().map(Day::logged_km).sum()
    }
}

/// The whole training plan, weeks in chronological order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Plan {
    pub weeks: Vec<Week>,
}

impl Plan {
    pub fn new(weeks: Vec<Week>) -> Self {
        Self { weeks }
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    /// Look up a day by zero-based (week, day) coordinate
    pub fn day(&self, week: usize, day: usize) -> Result<&Day> {
        self.weeks
            .get(week)
            .and_then(|w| w.days.get(day))
            .ok_or(Error::OutOfRange { week, day })
    }

    pub fn day_mut(&mut self, week: usize, day: usize) -> Result<&mut Day> {
        self.weeks
            .get_mut(week)
            .and_then(|w| w.days.get_mut(day))
            .ok_or(Error::OutOfRange { week, day })
    }
}
