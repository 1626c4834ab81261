//! Plan generation: weekly mileage progression and per-day distribution.
//!
//! Weekly targets follow four rules, evaluated in this order for every week:
//! 1. Cutback (optional): every third week starting at index 2 drops to 80%
//! 2. Build-up: linear ramp from base toward peak until 70% of the plan
//! 3. Taper: the final three weeks scale by 0.85, 0.70 and 0.40
//! 4. Plateau: otherwise hold the previous week's mileage
//!
//! Each week's target is then spread over run days with a single long run
//! on Sunday and at most one workout day.

use crate::time::start_of_week;
use crate::{Day, Plan, Result, TrainingParameters, Week, WorkoutKind};
use chrono::{Duration, NaiveDate};

/// Plans are never shorter than this, even for a race next week
pub const MIN_WEEKS: usize = 8;

/// Candidate run days in order of preference (0 = Monday)
pub const RUN_SLOTS: [usize; 6] = [0, 1, 2, 3, 5, 6];

/// Sunday always carries the long run
pub const LONG_RUN_SLOT: usize = 6;

const PEAK_FRACTION: f64 = 0.7;
const CUTBACK_FACTOR: f64 = 0.8;
const TAPER_FACTORS: [f64; 3] = [0.85, 0.70, 0.40];

const LONG_RUN_SHARE: f64 = 0.38;
const LONG_RUN_FLOOR_KM: f64 = 12.0;
const WORKOUT_SHARE: f64 = 0.22;
const WORKOUT_FLOOR_KM: f64 = 6.0;
const EASY_FLOOR_KM: f64 = 5.0;

/// Which rule produced a week's target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Cutback,
    Build,
    Taper,
    Plateau,
}

/// Target mileage for one week of the plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeeklyTarget {
    pub km: u32,
    pub phase: Phase,
}

/// Number of weeks from the Monday of `today`'s week until the race
pub fn week_count(today: NaiveDate, race_date: NaiveDate) -> usize {
    let days = (race_date - start_of_week(today)).num_days();
    let weeks = (days + 6).div_euclid(7);
    usize::try_from(weeks).unwrap_or(0).max(MIN_WEEKS)
}

/// Build the week-by-week mileage progression
pub fn generate_weekly_targets(
    weeks: usize,
    base_km: f64,
    peak_km: f64,
    cutback: bool,
) -> Vec<WeeklyTarget> {
    let peak_week = (weeks as f64 * PEAK_FRACTION).floor() as usize;
    let step = ((peak_km - base_km) / peak_week.max(1) as f64)
        .round()
        .max(1.0);
    let taper_start = weeks.saturating_sub(TAPER_FACTORS.len());

    let mut current = base_km;
    let mut targets = Vec::with_capacity(weeks);

    for w in 0..weeks {
        let phase = if cutback && w > 0 && w % 3 == 2 {
            let reduced = (current * CUTBACK_FACTOR).round();
            let floored = (base_km * CUTBACK_FACTOR).max(reduced);
            // The base floor only applies while it still reduces mileage
            // (late taper weeks can already sit below it).
            current = if floored < current { floored } else { reduced };
            Phase::Cutback
        } else if w < peak_week {
            current = peak_km.min(current + step);
            Phase::Build
        } else if w >= taper_start {
            current = (current * TAPER_FACTORS[w - taper_start]).round();
            Phase::Taper
        } else {
            Phase::Plateau
        };

        let km = current.round().max(0.0) as u32;
        tracing::debug!("Week {}: {:?} {} km", w + 1, phase, km);
        targets.push(WeeklyTarget { km, phase });
    }

    targets
}

/// Spread a week's target mileage over its run days
///
/// `runs_per_week` is clamped into `1..=6`; a single run is always the
/// Sunday long run.
pub fn distribute_week(
    week_start: NaiveDate,
    target_km: u32,
    runs_per_week: u32,
    long_run_peak_km: f64,
) -> Week {
    let runs = (runs_per_week as usize).clamp(1, RUN_SLOTS.len());
    let mut selected = RUN_SLOTS[..runs].to_vec();
    if !selected.contains(&LONG_RUN_SLOT) {
        if let Some(last) = selected.last_mut() {
            *last = LONG_RUN_SLOT;
        }
    }

    let target = f64::from(target_km);
    let long_km = long_run_peak_km
        .min((target * LONG_RUN_SHARE).max(LONG_RUN_FLOOR_KM))
        .round()
        .max(0.0);
    let workout_km = (target * WORKOUT_SHARE).max(WORKOUT_FLOOR_KM).round();
    let remaining = target - long_km - workout_km;

    let mut days: Vec<Day> = (0..7)
        .map(|offset| Day::rest(week_start + Duration::days(offset)))
        .collect();

    let others: Vec<usize> = selected
        .iter()
        .copied()
        .filter(|slot| *slot != LONG_RUN_SLOT)
        .collect();

    if !others.is_empty() {
        let easy_km = (remaining / others.len() as f64)
            .round()
            .max(EASY_FLOOR_KM);

        for (j, slot) in others.iter().enumerate() {
            let day = &mut days[*slot];
            if j == 0 {
                day.kind = WorkoutKind::Workout;
                day.planned_km = workout_km as u32;
            } else {
                day.kind = WorkoutKind::Easy;
                day.planned_km = easy_km as u32;
            }
        }
    }

    let long_day = &mut days[LONG_RUN_SLOT];
    long_day.kind = WorkoutKind::Long;
    long_day.planned_km = long_km as u32;

    Week { week_start, days }
}

/// Generate a full plan from the user's parameters
///
/// Fails only when the parameters do not validate (e.g. no race date).
pub fn generate_plan(params: &TrainingParameters, today: NaiveDate) -> Result<Plan> {
    let race_date = params.validate()?;
    let weeks = week_count(today, race_date);
    let start = start_of_week(today);

    tracing::info!(
        "Generating {}-week plan from {} to race on {}",
        weeks,
        start,
        race_date
    );

    let targets = generate_weekly_targets(weeks, params.base_km, params.peak_km, params.cutback);

    let plan = targets
        .iter()
        .enumerate()
        .map(|(w, target)| {
            let week_start = start + Duration::weeks(w as i64);
            distribute_week(
                week_start,
                target.km,
                params.runs_per_week,
                params.long_run_peak_km,
            )
        })
        .collect();

    Ok(Plan::new(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn kms(targets: &[WeeklyTarget]) -> Vec<u32> {
        targets.iter().map(|t| t.km).collect()
    }

    fn params(race_date: NaiveDate) -> TrainingParameters {
        TrainingParameters {
            race_date: Some(race_date),
            base_km: 30.0,
            peak_km: 60.0,
            runs_per_week: 4,
            long_run_peak_km: 32.0,
            cutback: true,
        }
    }

    #[test]
    fn test_week_count_rounds_up() {
        // Monday 2026-10-19 to Sunday 2027-04-18 is 181 days
        assert_eq!(week_count(date(2026, 10, 19), date(2027, 4, 18)), 26);
        // Mid-week "today" counts from that week's Monday
        assert_eq!(week_count(date(2026, 10, 22), date(2027, 4, 18)), 26);
    }

    #[test]
    fn test_week_count_minimum() {
        assert_eq!(week_count(date(2026, 10, 19), date(2026, 11, 1)), MIN_WEEKS);
        assert_eq!(week_count(date(2026, 10, 19), date(2026, 1, 1)), MIN_WEEKS);
    }

    #[test]
    fn test_targets_without_cutback() {
        let targets = generate_weekly_targets(8, 30.0, 60.0, false);
        assert_eq!(kms(&targets), vec![36, 42, 48, 54, 60, 51, 36, 14]);
        assert_eq!(targets[4].phase, Phase::Build);
        assert_eq!(targets[5].phase, Phase::Taper);
    }

    #[test]
    fn test_targets_with_cutback() {
        let targets = generate_weekly_targets(8, 30.0, 60.0, true);
        assert_eq!(kms(&targets), vec![36, 42, 34, 40, 46, 37, 26, 10]);
        assert_eq!(targets[2].phase, Phase::Cutback);
        // Cutback takes precedence over taper
        assert_eq!(targets[5].phase, Phase::Cutback);
    }

    #[test]
    fn test_plateau_holds_mileage() {
        let targets = generate_weekly_targets(20, 30.0, 60.0, false);
        assert_eq!(targets[13].km, 58);
        for w in 14..17 {
            assert_eq!(targets[w].phase, Phase::Plateau);
            assert_eq!(targets[w].km, 58);
        }
        assert_eq!(kms(&targets[17..]), vec![49, 34, 14]);
    }

    #[test]
    fn test_cutback_in_taper_keeps_decreasing() {
        // 9 weeks: the last week is both a taper and a cutback week, and
        // the 80%-of-base floor would otherwise lift it back up.
        let targets = generate_weekly_targets(9, 30.0, 60.0, true);
        assert_eq!(kms(&targets), vec![35, 40, 32, 37, 42, 34, 29, 20, 16]);
        assert_eq!(targets[8].phase, Phase::Cutback);
    }

    #[test]
    fn test_build_never_exceeds_peak() {
        let targets = generate_weekly_targets(12, 40.0, 42.0, false);
        assert!(targets.iter().all(|t| t.km <= 42));
        assert_eq!(targets[0].km, 41);
    }

    #[test]
    fn test_cutback_weeks_at_expected_indices() {
        for weeks in 8..30 {
            let targets = generate_weekly_targets(weeks, 30.0, 70.0, true);
            for (w, target) in targets.iter().enumerate() {
                let expected = w > 0 && w % 3 == 2;
                assert_eq!(target.phase == Phase::Cutback, expected, "week {}", w);
                if expected {
                    assert!(target.km <= targets[w - 1].km, "week {}", w);
                }
            }
        }
    }

    #[test]
    fn test_taper_strictly_decreases() {
        for weeks in 8..30 {
            for cutback in [false, true] {
                let targets = kms(&generate_weekly_targets(weeks, 30.0, 60.0, cutback));
                let n = targets.len();
                for w in n - 3..n {
                    assert!(
                        targets[w] < targets[w - 1],
                        "weeks={} cutback={} targets={:?}",
                        weeks,
                        cutback,
                        targets
                    );
                }
            }
        }
    }

    #[test]
    fn test_distribute_four_runs() {
        let week = distribute_week(date(2026, 10, 19), 50, 4, 32.0);
        let layout: Vec<(WorkoutKind, u32)> =
            week.days.iter().map(|d| (d.kind, d.planned_km)).collect();
        assert_eq!(
            layout,
            vec![
                (WorkoutKind::Workout, 11),
                (WorkoutKind::Easy, 7),
                (WorkoutKind::Easy, 7),
                (WorkoutKind::Rest, 0),
                (WorkoutKind::Rest, 0),
                (WorkoutKind::Rest, 0),
                (WorkoutKind::Long, 19),
            ]
        );
    }

    #[test]
    fn test_distribute_six_runs_uses_saturday() {
        let week = distribute_week(date(2026, 10, 19), 60, 6, 32.0);
        assert_eq!(week.days[4].kind, WorkoutKind::Rest);
        assert_eq!(week.days[5].kind, WorkoutKind::Easy);
        assert_eq!(week.days[6].kind, WorkoutKind::Long);
    }

    #[test]
    fn test_distribute_clamps_runs_per_week() {
        let single = distribute_week(date(2026, 10, 19), 30, 0, 32.0);
        assert_eq!(
            single.days.iter().filter(|d| d.kind != WorkoutKind::Rest).count(),
            1
        );
        assert_eq!(single.days[6].kind, WorkoutKind::Long);

        let many = distribute_week(date(2026, 10, 19), 70, 9, 32.0);
        assert_eq!(
            many.days.iter().filter(|d| d.kind != WorkoutKind::Rest).count(),
            6
        );
    }

    #[test]
    fn test_distribute_floors_and_caps() {
        let small = distribute_week(date(2026, 10, 19), 20, 4, 32.0);
        assert_eq!(small.days[6].planned_km, 12);
        assert_eq!(small.days[0].planned_km, 6);
        assert_eq!(small.days[1].planned_km, 5);

        let big = distribute_week(date(2026, 10, 19), 100, 4, 32.0);
        assert_eq!(big.days[6].planned_km, 32);
    }

    #[test]
    fn test_generated_plan_shape() {
        let today = date(2026, 10, 21);
        let race = date(2027, 4, 18);
        let plan = generate_plan(&params(race), today).unwrap();

        assert_eq!(plan.len(), week_count(today, race));
        assert_eq!(plan.weeks[0].week_start, date(2026, 10, 19));

        for (w, week) in plan.weeks.iter().enumerate() {
            assert_eq!(week.days.len(), 7);
            assert_eq!(week.week_start.weekday(), chrono::Weekday::Mon);
            assert_eq!(
                week.week_start,
                date(2026, 10, 19) + Duration::weeks(w as i64)
            );
            for (i, day) in week.days.iter().enumerate() {
                assert_eq!(day.date, week.week_start + Duration::days(i as i64));
                assert!(!day.done);
                assert!(day.log.is_none());
            }
            let longs = week.days.iter().filter(|d| d.kind == WorkoutKind::Long).count();
            let workouts = week
                .days
                .iter()
                .filter(|d| d.kind == WorkoutKind::Workout)
                .count();
            assert_eq!(longs, 1);
            assert!(workouts <= 1);
        }
    }

    #[test]
    fn test_generate_without_race_date_fails() {
        let params = TrainingParameters::default();
        let result = generate_plan(&params, date(2026, 10, 19));
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
