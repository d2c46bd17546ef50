use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

use os_energyplus::{ForwardTranslator, ReverseTranslator, TranslationOutput};
use os_model::{Model, ObjectType, Schedule, ScheduleKind, ThermalZone};
use os_schedule::TimeSeries;

#[derive(Parser)]
#[command(name = "os-cli")]
#[command(about = "Building HVAC model translator - project files to EnergyPlus IDF", long_about = None)]
struct Cli {
    /// Log graph surgery and record creation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Build the project's model and write it as IDF
    Translate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Output IDF file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Leave out the `!-` field name comments
        #[arg(long)]
        no_comments: bool,
    },
    /// Encode a `timestamp,value` CSV as a Schedule:Compact record
    Compact {
        /// CSV file with one `timestamp,value` row per sample
        csv_path: PathBuf,
        /// Schedule name
        #[arg(long, default_value = "Schedule")]
        name: String,
        /// Year for timestamps written as `MM/DD HH:MM`
        #[arg(long, default_value_t = os_model::DEFAULT_CALENDAR_YEAR)]
        year: i32,
        /// Value for the parts of the year the CSV does not cover
        #[arg(long, default_value_t = 0.0)]
        fill: f64,
    },
    /// Read an IDF file and report the schedules and zones it holds
    Reverse {
        /// Path to the IDF file
        idf_path: PathBuf,
        /// Calendar year compact schedules are laid out on
        #[arg(long, default_value_t = os_model::DEFAULT_CALENDAR_YEAR)]
        year: i32,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] os_project::ProjectError),

    #[error("Model error: {0}")]
    Model(#[from] os_model::ModelError),

    #[error("IDF error: {0}")]
    Idf(#[from] os_idf::IdfError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] os_schedule::ScheduleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}:{line}: {message}")]
    Csv {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Translation reported {0} error(s)")]
    TranslationFailed(usize),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Translate {
            project_path,
            output,
            no_comments,
        } => cmd_translate(&project_path, output.as_deref(), no_comments),
        Commands::Compact {
            csv_path,
            name,
            year,
            fill,
        } => cmd_compact(&csv_path, &name, year, fill),
        Commands::Reverse { idf_path, year } => cmd_reverse(&idf_path, year),
    }
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = os_project::load(project_path)?;
    println!("✓ Project is valid");
    println!(
        "  {} schedules, {} zones, {} plant loops, {} air loops",
        project.schedules.len(),
        project.zones.len(),
        project.plant_loops.len(),
        project.air_loops.len()
    );
    Ok(())
}

fn cmd_translate(project_path: &Path, output: Option<&Path>, no_comments: bool) -> CliResult<()> {
    let project = os_project::load(project_path)?;
    let model = os_project::build_model(&project)?;

    let mut options = project.options.clone();
    if no_comments {
        options.emit_field_comments = false;
    }
    let comments = options.emit_field_comments;
    let out = ForwardTranslator::new(options).translate_model(&model);
    let idf = out.to_idf(comments);

    match output {
        Some(path) => {
            std::fs::write(path, idf)?;
            println!("✓ Wrote {} records to {}", out.workspace.len(), path.display());
        }
        None => print!("{idf}"),
    }

    print_diagnostics(&out);
    match out.errors().count() {
        0 => Ok(()),
        n => Err(CliError::TranslationFailed(n)),
    }
}

/// Summary goes to stderr so IDF on stdout stays clean.
fn print_diagnostics(out: &TranslationOutput) {
    let warnings = out.warnings().count();
    let errors = out.errors().count();
    eprintln!("Diagnostics: {warnings} warning(s), {errors} error(s)");
    for d in &out.diagnostics {
        eprintln!("  {d}");
    }
}

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a CSV timestamp. `MM/DD HH:MM` takes `year`; `24:00` means the
/// following midnight.
fn parse_timestamp(raw: &str, year: i32) -> Option<NaiveDateTime> {
    if let Some(t) = TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Some(t);
    }
    let (date, time) = raw.split_once(' ')?;
    let (month, day) = date.split_once('/')?;
    let (hour, minute) = time.trim().split_once(':')?;
    let (month, day): (u32, u32) = (month.parse().ok()?, day.parse().ok()?);
    let (hour, minute): (i64, i64) = (hour.parse().ok()?, minute.parse().ok()?);
    if !(0..=24).contains(&hour) || !(0..60).contains(&minute) || (hour == 24 && minute != 0) {
        return None;
    }
    let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    Some(midnight + chrono::Duration::minutes(hour * 60 + minute))
}

fn read_series(csv_path: &Path, year: i32) -> CliResult<TimeSeries> {
    let content = std::fs::read_to_string(csv_path)?;
    let csv_error = |line: usize, message: String| CliError::Csv {
        path: csv_path.to_path_buf(),
        line,
        message,
    };

    let mut times = Vec::new();
    let mut values = Vec::new();
    for (i, row) in content.lines().enumerate() {
        let line = i + 1;
        let row = row.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let Some((stamp, value)) = row.split_once(',') else {
            return Err(csv_error(line, "expected 'timestamp,value'".to_string()));
        };
        let value: f64 = match value.trim().parse() {
            Ok(v) => v,
            // header row
            Err(_) if i == 0 => continue,
            Err(_) => return Err(csv_error(line, format!("bad value '{}'", value.trim()))),
        };
        let stamp = stamp.trim();
        let t = parse_timestamp(stamp, year)
            .ok_or_else(|| csv_error(line, format!("bad timestamp '{stamp}'")))?;
        times.push(t);
        values.push(value);
    }
    debug!(path = %csv_path.display(), samples = values.len(), "read schedule csv");
    Ok(TimeSeries::from_points(times, values)?)
}

fn cmd_compact(csv_path: &Path, name: &str, year: i32, fill: f64) -> CliResult<()> {
    let series = read_series(csv_path, year)?;

    let mut model = Model::new();
    model.set_calendar_year(series.start().year());
    let schedule = Schedule::variable_from_time_series(&mut model, &series);
    model.set_name(schedule.id(), name);

    let options = os_energyplus::ForwardTranslatorOptions {
        compact_out_of_range_value: fill,
        ..Default::default()
    };
    let comments = options.emit_field_comments;
    let out = ForwardTranslator::new(options).translate_model(&model);
    print!("{}", out.to_idf(comments));
    print_diagnostics(&out);
    match out.errors().count() {
        0 => Ok(()),
        n => Err(CliError::TranslationFailed(n)),
    }
}

fn cmd_reverse(idf_path: &Path, year: i32) -> CliResult<()> {
    let text = std::fs::read_to_string(idf_path)?;
    let workspace = os_idf::parse_idf(&text)?;
    let out = ReverseTranslator::new(year).translate_workspace(&workspace);
    let model = &out.model;

    let schedules = model.objects_of_type(ObjectType::Schedule);
    println!("Schedules: {}", schedules.len());
    for id in schedules {
        let Some(schedule) = Schedule::from_id(model, id) else {
            continue;
        };
        let name = model.name(id).unwrap_or_default();
        match schedule.kind(model) {
            Some(ScheduleKind::Constant) => {
                println!("  {name} - constant {}", schedule.value(model).unwrap_or_default());
            }
            _ => {
                let points = schedule.time_series(model).map_or(0, |ts| ts.len());
                println!("  {name} - {points} points");
            }
        }
    }

    let zones = model.objects_of_type(ObjectType::ThermalZone);
    println!("Zones: {}", zones.len());
    for id in zones {
        let multiplier = ThermalZone::from_id(model, id)
            .and_then(|z| z.multiplier(model))
            .unwrap_or(1);
        println!("  {} (x{multiplier})", model.name(id).unwrap_or_default());
    }

    let warnings = out.warnings().count();
    let errors = out.errors().count();
    eprintln!("Diagnostics: {warnings} warning(s), {errors} error(s)");
    for d in &out.diagnostics {
        eprintln!("  {d}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_with_and_without_year() {
        let t = parse_timestamp("2012-02-29 06:30", 2009).unwrap();
        assert_eq!(t.to_string(), "2012-02-29 06:30:00");

        let t = parse_timestamp("01/05 24:00", 2009).unwrap();
        assert_eq!(t.to_string(), "2009-01-06 00:00:00");

        assert!(parse_timestamp("02/29 12:00", 2009).is_none());
        assert!(parse_timestamp("01/05 24:30", 2009).is_none());
    }
}
