//! Session controller: owns the plan and applies user actions to it.
//!
//! Every action runs to completion before the next one is accepted:
//! mutate in memory, persist through the `PlanStore`, then re-present the
//! view where the action calls for it. Multi-field input arrives through a
//! `FormSource`; a `None` from any form cancels the whole action before
//! anything is mutated.

use crate::generator::generate_plan;
use crate::kv::KeyValueStore;
use crate::render::{project, PlanView, Surface};
use crate::store::PlanStore;
use crate::time::{parse_duration, parse_pace};
use crate::types::derived_pace;
use crate::{Day, Error, Plan, Result, TrainingParameters, WorkoutKind, WorkoutLog};
use chrono::NaiveDate;

/// A discrete user action against a zero-based (week, day) coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserEvent {
    ToggleDone { week: usize, day: usize, done: bool },
    Edit { week: usize, day: usize },
    Log { week: usize, day: usize },
}

/// Whether an action changed anything
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Cancelled,
}

/// Raw text of the edit form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditForm {
    pub planned_km: String,
    /// Empty keeps the current type
    pub kind: String,
    /// Empty clears the notes
    pub notes: String,
}

/// Raw text of the log form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogForm {
    pub distance: String,
    pub duration: String,
}

/// Source of user input for multi-field actions
///
/// Returning `None` signals cancellation.
pub trait FormSource {
    fn edit_day(&mut self, day: &Day) -> Option<EditForm>;
    fn log_workout(&mut self, day: &Day) -> Option<LogForm>;
    /// Asked only when pace cannot be derived from distance and duration
    fn manual_pace(&mut self, day: &Day) -> Option<String>;
}

/// Session-scoped owner of settings and plan
pub struct Controller<K> {
    store: PlanStore<K>,
    settings: TrainingParameters,
    plan: Plan,
}

impl<K: KeyValueStore> Controller<K> {
    /// Load whatever is persisted, falling back to `defaults`
    pub fn open(backend: K, defaults: &TrainingParameters) -> Self {
        let store = PlanStore::new(backend);
        let snapshot = store.load(defaults);
        Self {
            store,
            settings: snapshot.settings,
            plan: snapshot.plan,
        }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn settings(&self) -> &TrainingParameters {
        &self.settings
    }

    pub fn store(&self) -> &PlanStore<K> {
        &self.store
    }

    pub fn view(&self) -> PlanView {
        project(&self.plan)
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.present(&self.view());
    }

    /// Replace the plan with a freshly generated one
    pub fn generate(
        &mut self,
        params: TrainingParameters,
        today: NaiveDate,
        surface: &mut dyn Surface,
    ) -> Result<()> {
        let plan = generate_plan(&params, today)?;
        self.settings = params;
        self.plan = plan;
        self.persist()?;
        self.render(surface);
        Ok(())
    }

    /// Save new settings without touching the plan
    pub fn update_settings(&mut self, params: TrainingParameters) -> Result<()> {
        self.settings = params;
        self.persist()
    }

    /// Dispatch a user event
    pub fn handle(
        &mut self,
        event: UserEvent,
        forms: &mut dyn FormSource,
        surface: &mut dyn Surface,
    ) -> Result<ActionOutcome> {
        match event {
            UserEvent::ToggleDone { week, day, done } => {
                self.toggle_done(week, day, done)?;
                Ok(ActionOutcome::Applied)
            }
            UserEvent::Edit { week, day } => self.edit_day(week, day, forms, surface),
            UserEvent::Log { week, day } => self.log_workout(week, day, forms, surface),
        }
    }

    /// Set the done flag; the surface already shows the new state
    pub fn toggle_done(&mut self, week: usize, day: usize, done: bool) -> Result<()> {
        self.plan.day_mut(week, day)?.done = done;
        self.persist()?;
        tracing::info!("Week {} day {} marked done={}", week + 1, day + 1, done);
        Ok(())
    }

    /// Edit planned distance, type and notes of a day
    pub fn edit_day(
        &mut self,
        week: usize,
        day: usize,
        forms: &mut dyn FormSource,
        surface: &mut dyn Surface,
    ) -> Result<ActionOutcome> {
        let current = self.plan.day(week, day)?;
        let Some(form) = forms.edit_day(current) else {
            tracing::debug!("Edit of week {} day {} cancelled", week + 1, day + 1);
            return Ok(ActionOutcome::Cancelled);
        };

        let planned_km = parse_planned_km(&form.planned_km)?;
        let kind = if form.kind.trim().is_empty() {
            current.kind
        } else {
            form.kind.parse::<WorkoutKind>()?
        };
        let notes = form.notes.trim().to_string();

        let target = self.plan.day_mut(week, day)?;
        target.planned_km = planned_km;
        target.kind = kind;
        target.notes = notes;

        self.persist()?;
        tracing::info!(
            "Edited week {} day {}: {} {} km",
            week + 1,
            day + 1,
            kind,
            planned_km
        );
        self.render(surface);
        Ok(ActionOutcome::Applied)
    }

    /// Record an actual workout against a day
    pub fn log_workout(
        &mut self,
        week: usize,
        day: usize,
        forms: &mut dyn FormSource,
        surface: &mut dyn Surface,
    ) -> Result<ActionOutcome> {
        let current = self.plan.day(week, day)?;
        let Some(form) = forms.log_workout(current) else {
            tracing::debug!("Log of week {} day {} cancelled", week + 1, day + 1);
            return Ok(ActionOutcome::Cancelled);
        };

        let distance = form
            .distance
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .map_or(0.0, |d| d.max(0.0));
        let duration = parse_duration(&form.duration).filter(|d| *d > 0);

        let manual_pace = if derived_pace(distance, duration).is_some() {
            None
        } else {
            match forms.manual_pace(current) {
                Some(text) => parse_pace(&text),
                None => {
                    tracing::debug!("Log of week {} day {} cancelled", week + 1, day + 1);
                    return Ok(ActionOutcome::Cancelled);
                }
            }
        };

        let log = WorkoutLog::new(distance, duration, manual_pace);
        let target = self.plan.day_mut(week, day)?;
        if log.actual_km > 0.0 {
            target.done = true;
        }
        target.log = Some(log);

        self.persist()?;
        tracing::info!("Logged {} km for week {} day {}", distance, week + 1, day + 1);
        self.render(surface);
        Ok(ActionOutcome::Applied)
    }

    /// Forget the plan and settings, in memory and in storage
    pub fn reset(&mut self, defaults: &TrainingParameters) -> Result<()> {
        self.store.clear()?;
        self.plan = Plan::default();
        self.settings = defaults.clone();
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.settings, &self.plan)
    }
}

/// Non-negative whole kilometres
fn parse_planned_km(text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    match text.parse::<f64>() {
        Ok(km) if km.is_finite() => Ok(km.max(0.0).round() as u32),
        _ => Err(Error::Validation(format!(
            "Planned distance must be a number, got '{}'",
            text
        ))),
    }
}
