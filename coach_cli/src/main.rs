use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use coach_core::render::{self, PlanView};
use coach_core::time::{format_duration, format_km, format_pace, parse_iso_date};
use coach_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pmc")]
#[command(about = "Pocket Marathon Coach - marathon training plans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretend today is this date (for testing)
    #[arg(long, global = true, hide = true, value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new plan (replaces the current one)
    Generate(PlanArgs),

    /// Save training settings without regenerating the plan
    Settings(PlanArgs),

    /// Show the current plan (default)
    Show,

    /// Mark a day as done
    Done {
        /// Week number (1-based)
        #[arg(value_parser = parse_week)]
        week: usize,

        /// Day of the week (1-7 or mon..sun)
        #[arg(value_parser = parse_day)]
        day: usize,

        /// Mark the day as not done instead
        #[arg(long)]
        undo: bool,
    },

    /// Edit a day's planned distance, type and notes
    ///
    /// Without flags, each field is prompted; an empty answer keeps the
    /// current value, end of input cancels the edit.
    Edit {
        #[arg(value_parser = parse_week)]
        week: usize,

        #[arg(value_parser = parse_day)]
        day: usize,

        /// Planned distance in km
        #[arg(long)]
        km: Option<String>,

        /// Easy, Workout, Long or Rest
        #[arg(long)]
        kind: Option<String>,

        /// Notes ("-" clears them)
        #[arg(long)]
        notes: Option<String>,
    },

    /// Log the workout you actually ran
    ///
    /// Pace is derived from distance and duration; it is only asked for
    /// when no duration is given.
    Log {
        #[arg(value_parser = parse_week)]
        week: usize,

        #[arg(value_parser = parse_day)]
        day: usize,

        /// Actual distance in km
        #[arg(long)]
        distance: Option<String>,

        /// Duration (hh:mm:ss, mm:ss or minutes; "-" clears)
        #[arg(long)]
        duration: Option<String>,

        /// Pace (mm:ss per km), used when there is no duration ("-" clears)
        #[arg(long)]
        pace: Option<String>,
    },

    /// Export the plan as an iCalendar file
    Export {
        /// Directory to write the file into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Export done and logged days as CSV
    ExportLog {
        /// Directory to write the file into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Erase the saved plan and settings
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Training parameters; unset flags keep the saved values
#[derive(Args)]
struct PlanArgs {
    /// Race date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    race_date: Option<NaiveDate>,

    /// Starting weekly distance (km)
    #[arg(long)]
    base_km: Option<f64>,

    /// Peak weekly distance (km)
    #[arg(long)]
    peak_km: Option<f64>,

    /// Runs per week (1-6)
    #[arg(long)]
    runs_per_week: Option<u32>,

    /// Longest long run (km)
    #[arg(long)]
    long_run_peak_km: Option<f64>,

    /// Include a cutback week every third week
    #[arg(long)]
    cutback: Option<bool>,
}

impl PlanArgs {
    fn apply(&self, saved: &TrainingParameters) -> TrainingParameters {
        TrainingParameters {
            race_date: self.race_date.or(saved.race_date),
            base_km: self.base_km.unwrap_or(saved.base_km),
            peak_km: self.peak_km.unwrap_or(saved.peak_km),
            runs_per_week: self.runs_per_week.unwrap_or(saved.runs_per_week),
            long_run_peak_km: self.long_run_peak_km.unwrap_or(saved.long_run_peak_km),
            cutback: self.cutback.unwrap_or(saved.cutback),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        coach_core::logging::init_with_level("debug");
    } else {
        coach_core::logging::init();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    tracing::debug!("Using data directory {:?}, today is {}", data_dir, today);

    let defaults = config.defaults.to_parameters();
    let mut controller = Controller::open(FileStore::new(&data_dir), &defaults);
    let mut terminal = Terminal;

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Generate(args) => {
            let params = args.apply(controller.settings());
            controller.generate(params, today, &mut terminal)?;
            println!("✓ Generated {}-week plan", controller.plan().len());
        }
        Commands::Settings(args) => {
            let params = args.apply(controller.settings());
            controller.update_settings(params)?;
            println!("✓ Settings saved");
        }
        Commands::Show => controller.render(&mut terminal),
        Commands::Done { week, day, undo } => {
            let event = UserEvent::ToggleDone {
                week,
                day,
                done: !undo,
            };
            controller.handle(event, &mut CliForms::prompting(), &mut terminal)?;
            let state = if undo { "not done" } else { "done" };
            println!("✓ Week {} day {} marked {}", week + 1, day + 1, state);
        }
        Commands::Edit {
            week,
            day,
            km,
            kind,
            notes,
        } => {
            let mut forms = CliForms::with_fields(vec![km, kind, notes]);
            let event = UserEvent::Edit { week, day };
            let outcome = controller.handle(event, &mut forms, &mut terminal)?;
            report(outcome, "Day updated");
        }
        Commands::Log {
            week,
            day,
            distance,
            duration,
            pace,
        } => {
            let mut forms = CliForms::with_fields(vec![distance, duration, pace]);
            let event = UserEvent::Log { week, day };
            let outcome = controller.handle(event, &mut forms, &mut terminal)?;
            report(outcome, "Workout logged");
        }
        Commands::Export { out_dir } => {
            let payload = coach_core::ics::export(controller.plan())?;
            let mut sink = FileSink::new(out_dir);
            let path = sink.deliver(&config.export.calendar_file, &payload)?;
            println!("✓ Exported calendar to {}", path.display());
        }
        Commands::ExportLog { out_dir } => {
            let path = out_dir.join(&config.export.log_file);
            let count = coach_core::log_export::write_csv_file(controller.plan(), &path)?;
            println!("✓ Exported {} days to {}", count, path.display());
        }
        Commands::Clear { yes } => {
            let confirmed = yes
                || prompt("Clear saved plan & settings? [y/N]")
                    .map(|answer| answer.trim().eq_ignore_ascii_case("y"))
                    .unwrap_or(false);
            if confirmed {
                controller.reset(&defaults)?;
                println!("✓ Cleared saved plan and settings");
            } else {
                println!("Nothing cleared.");
            }
        }
    }

    Ok(())
}

fn report(outcome: ActionOutcome, applied: &str) {
    match outcome {
        ActionOutcome::Applied => println!("✓ {}", applied),
        ActionOutcome::Cancelled => println!("Cancelled - nothing changed."),
    }
}

/// Prints the plan to stdout
struct Terminal;

impl Surface for Terminal {
    fn present(&mut self, view: &PlanView) {
        print!("{}", render::to_text(view));
    }
}

/// Answers forms from command-line flags, or by prompting on stdin
///
/// Fields are consumed in the order the forms ask for them. With any flag
/// set, missing fields take their prefilled default and nothing is
/// prompted.
struct CliForms {
    fields: Option<std::vec::IntoIter<Option<String>>>,
}

impl CliForms {
    fn prompting() -> Self {
        Self { fields: None }
    }

    fn with_fields(fields: Vec<Option<String>>) -> Self {
        if fields.iter().all(Option::is_none) {
            Self::prompting()
        } else {
            Self {
                fields: Some(fields.into_iter()),
            }
        }
    }

    /// Next answer; `default` stands in for an empty or missing answer
    fn field(&mut self, label: &str, default: String) -> Option<String> {
        let answer = match &mut self.fields {
            Some(fields) => fields.next().flatten().unwrap_or_default(),
            None if default.is_empty() => prompt(label)?,
            None => prompt(&format!("{} [{}]", label, default))?,
        };
        if answer.trim().is_empty() {
            Some(default)
        } else {
            Some(answer)
        }
    }
}

impl FormSource for CliForms {
    fn edit_day(&mut self, day: &Day) -> Option<EditForm> {
        let planned_km = self.field("Planned distance (km)", day.planned_km.to_string())?;
        let kind = self.field("Type (Easy / Workout / Long / Rest)", day.kind.to_string())?;
        let notes = cleared(self.field("Notes (optional, '-' clears)", day.notes.clone())?);
        Some(EditForm {
            planned_km,
            kind,
            notes,
        })
    }

    fn log_workout(&mut self, day: &Day) -> Option<LogForm> {
        let previous = day.log.as_ref();
        let distance = previous.map_or_else(
            || day.planned_km.to_string(),
            |log| format_km(log.actual_km),
        );
        let duration = previous
            .and_then(|log| log.duration_sec)
            .map(format_duration)
            .unwrap_or_default();

        let distance = self.field("Actual distance (km)", distance)?;
        let duration = cleared(self.field(
            "Duration (hh:mm:ss or mm:ss; or just minutes like \"45\", '-' clears)",
            duration,
        )?);
        Some(LogForm { distance, duration })
    }

    fn manual_pace(&mut self, day: &Day) -> Option<String> {
        let previous = day
            .log
            .as_ref()
            .and_then(|log| log.pace_sec_per_km)
            .map(|p| format_pace(f64::from(p)).trim_end_matches("/km").to_string())
            .unwrap_or_default();
        self.field("Pace (mm:ss per km) (optional, '-' clears)", previous)
            .map(cleared)
    }
}

/// A lone "-" empties a prefilled field
fn cleared(answer: String) -> String {
    if answer.trim() == "-" {
        String::new()
    } else {
        answer
    }
}

/// Read one line from stdin; `None` at end of input
fn prompt(label: &str) -> Option<String> {
    print!("{}: ", label);
    io::stdout().flush().ok()?;

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => {
            println!();
            None
        }
        Ok(_) => Some(input.trim_end_matches(['\r', '\n']).to_string()),
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_iso_date(s).ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD)", s))
}

fn parse_week(s: &str) -> std::result::Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(week) if week >= 1 => Ok(week - 1),
        _ => Err(format!("'{}' is not a week number (1, 2, ...)", s)),
    }
}

fn parse_day(s: &str) -> std::result::Result<usize, String> {
    const NAMES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
    let lower = s.trim().to_lowercase();
    if let Ok(day) = lower.parse::<usize>() {
        if (1..=7).contains(&day) {
            return Ok(day - 1);
        }
    }
    NAMES
        .iter()
        .position(|name| lower.starts_with(name))
        .ok_or_else(|| format!("'{}' is not a day (1-7 or mon..sun)", s))
}
