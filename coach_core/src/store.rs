//! Plan and settings persistence.
//!
//! Both live as JSON strings under two fixed keys in a `KeyValueStore`.
//! Loading never fails: missing or corrupted entries are logged and fall
//! back to the caller's defaults (settings) or an empty plan.

use crate::kv::KeyValueStore;
use crate::time::parse_iso_date;
use crate::{Plan, Result, TrainingParameters};
use serde_json::Value;

pub const SETTINGS_KEY: &str = "pmc_settings";
pub const PLAN_KEY: &str = "pmc_plan";

/// Settings and plan as loaded from storage
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub settings: TrainingParameters,
    pub plan: Plan,
}

/// Persists settings and plan in a key-value backend
pub struct PlanStore<K> {
    backend: K,
}

impl<K: KeyValueStore> PlanStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    /// Serialize both blobs and write them under their keys
    pub fn save(&mut self, settings: &TrainingParameters, plan: &Plan) -> Result<()> {
        let settings_json = serde_json::to_string(settings)?;
        let plan_json = serde_json::to_string(plan)?;

        self.backend.set(SETTINGS_KEY, &settings_json)?;
        self.backend.set(PLAN_KEY, &plan_json)?;

        tracing::debug!("Saved settings and {}-week plan", plan.len());
        Ok(())
    }

    /// Load settings merged onto `defaults`, and the plan (empty on failure)
    pub fn load(&self, defaults: &TrainingParameters) -> Snapshot {
        let settings = match self.read(SETTINGS_KEY) {
            Some(raw) => merge_settings(defaults, &raw),
            None => defaults.clone(),
        };

        let plan = match self.read(PLAN_KEY) {
            Some(raw) => match serde_json::from_str::<Plan>(&raw) {
                Ok(plan) if plan.weeks.iter().all(|w| w.days.len() == 7) => {
                    tracing::debug!("Loaded {}-week plan", plan.len());
                    plan
                }
                Ok(_) => {
                    tracing::warn!("Stored plan has a week without 7 days. Starting empty.");
                    Plan::default()
                }
                Err(e) => {
                    tracing::warn!("Failed to parse stored plan: {}. Starting empty.", e);
                    Plan::default()
                }
            },
            None => Plan::default(),
        };

        Snapshot { settings, plan }
    }

    /// Delete both entries
    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove(SETTINGS_KEY)?;
        self.backend.remove(PLAN_KEY)?;
        tracing::info!("Cleared saved plan and settings");
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Unable to read {}: {}. Using defaults.", key, e);
                None
            }
        }
    }
}

/// Take each stored field only when it is present and well-typed
fn merge_settings(defaults: &TrainingParameters, raw: &str) -> TrainingParameters {
    let stored: Value = match serde_json::from_str(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            tracing::warn!("Stored settings are not an object ({}). Using defaults.", other);
            return defaults.clone();
        }
        Err(e) => {
            tracing::warn!("Failed to parse stored settings: {}. Using defaults.", e);
            return defaults.clone();
        }
    };

    let number = |key: &str| {
        stored
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite() && *v >= 0.0)
    };

    let mut settings = defaults.clone();
    if let Some(date) = stored
        .get("raceDate")
        .and_then(Value::as_str)
        .and_then(parse_iso_date)
    {
        settings.race_date = Some(date);
    }
    if let Some(v) = number("baseKm") {
        settings.base_km = v;
    }
    if let Some(v) = number("peakKm") {
        settings.peak_km = v;
    }
    if let Some(v) = number("runsPerWeek") {
        settings.runs_per_week = v.round() as u32;
    }
    if let Some(v) = number("longRunPeak") {
        settings.long_run_peak_km = v;
    }
    if let Some(v) = stored.get("cutback").and_then(Value::as_bool) {
        settings.cutback = v;
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_plan;
    use crate::kv::{FileStore, MemoryStore};
    use crate::{WorkoutKind, WorkoutLog};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> (TrainingParameters, Plan) {
        let settings = TrainingParameters {
            race_date: Some(date(2027, 4, 18)),
            base_km: 35.0,
            peak_km: 70.0,
            runs_per_week: 5,
            long_run_peak_km: 30.0,
            cutback: false,
        };
        let mut plan = generate_plan(&settings, date(2026, 10, 19)).unwrap();
        let day = plan.day_mut(0, 1).unwrap();
        day.done = true;
        day.notes = "hills".into();
        day.log = Some(WorkoutLog::new(10.0, Some(3000), None));
        (settings, plan)
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = PlanStore::new(FileStore::new(temp_dir.path()));
        let (settings, plan) = sample();

        store.save(&settings, &plan).unwrap();
        let loaded = store.load(&TrainingParameters::default());

        assert_eq!(loaded.settings, settings);
        assert_eq!(loaded.plan, plan);
    }

    #[test]
    fn test_load_empty_store_returns_defaults() {
        let store = PlanStore::new(MemoryStore::new());
        let defaults = TrainingParameters::default();

        let loaded = store.load(&defaults);
        assert_eq!(loaded.settings, defaults);
        assert!(loaded.plan.is_empty());
    }

    #[test]
    fn test_corrupted_plan_loads_empty() {
        let mut backend = MemoryStore::new();
        backend.set(PLAN_KEY, "{ invalid json }").unwrap();
        let store = PlanStore::new(backend);

        assert!(store.load(&TrainingParameters::default()).plan.is_empty());
    }

    fn week_json(day: &str, count: usize) -> String {
        format!(
            r#"[{{"weekStartISO":"2026-10-19","days":[{}]}}]"#,
            vec![day; count].join(",")
        )
    }

    #[test]
    fn test_unknown_workout_type_makes_plan_malformed() {
        let mut backend = MemoryStore::new();
        let day = r#"{"type":"Tempo","km":8,"dateISO":"2026-10-19"}"#;
        backend.set(PLAN_KEY, &week_json(day, 7)).unwrap();
        let store = PlanStore::new(backend);

        assert!(store.load(&TrainingParameters::default()).plan.is_empty());
    }

    #[test]
    fn test_short_week_makes_plan_malformed() {
        let mut backend = MemoryStore::new();
        let day = r#"{"type":"Easy","km":8,"dateISO":"2026-10-19"}"#;
        backend.set(PLAN_KEY, &week_json(day, 6)).unwrap();
        let store = PlanStore::new(backend);

        assert!(store.load(&TrainingParameters::default()).plan.is_empty());
    }

    #[test]
    fn test_minimal_day_fields_default() {
        let mut backend = MemoryStore::new();
        let day = r#"{"type":"Easy","km":8,"dateISO":"2026-10-19"}"#;
        backend.set(PLAN_KEY, &week_json(day, 7)).unwrap();
        let store = PlanStore::new(backend);

        let plan = store.load(&TrainingParameters::default()).plan;
        let day = plan.day(0, 0).unwrap();
        assert_eq!(day.kind, WorkoutKind::Easy);
        assert!(!day.done);
        assert!(day.notes.is_empty());
        assert!(day.log.is_none());
    }

    #[test]
    fn test_partial_settings_merge_onto_defaults() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                SETTINGS_KEY,
                r#"{"raceDate":"2027-04-18","baseKm":-5,"peakKm":"lots","runsPerWeek":5,"cutback":false}"#,
            )
            .unwrap();
        let store = PlanStore::new(backend);
        let defaults = TrainingParameters::default();

        let settings = store.load(&defaults).settings;
        assert_eq!(settings.race_date, Some(date(2027, 4, 18)));
        assert_eq!(settings.base_km, defaults.base_km);
        assert_eq!(settings.peak_km, defaults.peak_km);
        assert_eq!(settings.runs_per_week, 5);
        assert_eq!(settings.long_run_peak_km, defaults.long_run_peak_km);
        assert!(!settings.cutback);
    }

    #[test]
    fn test_zero_settings_survive_reload() {
        let mut store = PlanStore::new(MemoryStore::new());
        let settings = TrainingParameters {
            race_date: Some(date(2027, 4, 18)),
            base_km: 0.0,
            peak_km: 0.0,
            runs_per_week: 0,
            long_run_peak_km: 0.0,
            cutback: false,
        };
        store.save(&settings, &Plan::default()).unwrap();

        let loaded = store.load(&TrainingParameters::default());
        assert_eq!(loaded.settings, settings);
    }

    #[test]
    fn test_corrupted_settings_use_defaults() {
        let mut backend = MemoryStore::new();
        backend.set(SETTINGS_KEY, "[1, 2").unwrap();
        backend.set(PLAN_KEY, "[]").unwrap();
        let store = PlanStore::new(backend);
        let defaults = TrainingParameters::default();

        let loaded = store.load(&defaults);
        assert_eq!(loaded.settings, defaults);
        assert!(loaded.plan.is_empty());
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let mut store = PlanStore::new(MemoryStore::new());
        let (settings, plan) = sample();
        store.save(&settings, &plan).unwrap();

        store.clear().unwrap();
        assert!(store.backend().is_empty());
    }
}
