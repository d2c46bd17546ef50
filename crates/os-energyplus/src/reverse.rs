//! IDF to model translation for schedules and zones.

use std::collections::HashSet;

use os_idf::{Record, RecordType, Workspace};
use os_model::{Model, Schedule, ThermalZone, DEFAULT_CALENDAR_YEAR};
use os_schedule::{lines_from_fields, time_series_from_compact};
use tracing::{debug, info, warn};

use crate::diagnostics::{Diagnostic, Level};
use crate::error::{TranslateError, TranslateResult};

#[derive(Debug, Clone)]
pub struct ReverseTranslator {
    year: i32,
}

impl Default for ReverseTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_CALENDAR_YEAR)
    }
}

#[derive(Debug)]
pub struct ReverseOutput {
    pub model: Model,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReverseOutput {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Warn)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Error)
    }
}

impl ReverseTranslator {
    /// Compact schedules are decoded against the calendar of `year`.
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn translate_workspace(&self, workspace: &Workspace) -> ReverseOutput {
        info!(records = workspace.len(), "reverse translation started");
        let mut model = Model::new();
        model.set_calendar_year(self.year);
        let mut diagnostics = Vec::new();
        let mut unsupported = HashSet::new();

        for record in workspace.objects() {
            let ty = record.record_type();
            let result = match ty {
                RecordType::ScheduleConstant => self.constant(&mut model, record),
                RecordType::ScheduleCompact => self.compact(&mut model, record),
                RecordType::Zone => self.zone(&mut model, record),
                _ => {
                    if unsupported.insert(ty) {
                        let d = Diagnostic::warn(
                            None,
                            format!("{} records are not read back", ty.keyword()),
                        );
                        warn!("{d}");
                        diagnostics.push(d);
                    }
                    continue;
                }
            };
            if let Err(e) = result {
                let d = Diagnostic::error(record.name().map(str::to_string), e.to_string());
                warn!("{d}");
                diagnostics.push(d);
            }
        }

        info!(objects = model.len(), "reverse translation finished");
        ReverseOutput { model, diagnostics }
    }

    fn constant(&self, model: &mut Model, record: &Record) -> TranslateResult<()> {
        let value = record
            .get_real("Hourly Value")
            .ok_or_else(|| incomplete(record, "hourly value"))?;
        let schedule = Schedule::constant(model, value)?;
        name_object(model, schedule.id(), record);
        Ok(())
    }

    fn compact(&self, model: &mut Model, record: &Record) -> TranslateResult<()> {
        let fields: Vec<&str> = record
            .groups()
            .iter()
            .filter_map(|g| g.first().and_then(|v| v.as_str()))
            .collect();
        let lines = lines_from_fields(&fields)?;
        let series = time_series_from_compact(&lines, self.year)?;
        let schedule = Schedule::variable_from_time_series(model, &series);
        name_object(model, schedule.id(), record);
        debug!(samples = series.len(), "compact schedule decoded");
        Ok(())
    }

    fn zone(&self, model: &mut Model, record: &Record) -> TranslateResult<()> {
        let zone = ThermalZone::new(model);
        name_object(model, zone.id(), record);
        let multiplier = record
            .field_by_name("Multiplier")
            .and_then(|v| match v {
                os_idf::Value::Integer(i) => Some(*i),
                other => other.as_real().map(|r| r as i64),
            });
        if let Some(m) = multiplier {
            if !zone.set_multiplier(model, m) {
                warn!(multiplier = m, "zone multiplier ignored");
            }
        }
        Ok(())
    }
}

fn incomplete(record: &Record, what: &'static str) -> TranslateError {
    TranslateError::Incomplete {
        object: record.name().unwrap_or_default().to_string(),
        what,
    }
}

fn name_object(model: &mut Model, id: os_core::ObjectId, record: &Record) {
    if let Some(name) = record.name().filter(|n| !n.is_empty()) {
        model.set_name(id, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use os_idf::parse_idf;
    use os_model::{ObjectType, ScheduleKind};

    const IDF: &str = "
Schedule:Constant, Always On, , 1;
Schedule:Compact,
  Occupancy,
  ,
  Through: 12/31,
  For: AllDays,
  Until: 08:00, 0,
  Until: 18:00, 1,
  Until: 24:00, 0;
Zone, Office, 0, 0, 0, 0, 1, 3;
Pipe:Adiabatic, P1, In, Out;
Pipe:Adiabatic, P2, In2, Out2;
";

    #[test]
    fn reads_schedules_and_zones() {
        let ws = parse_idf(IDF).unwrap();
        let out = ReverseTranslator::default().translate_workspace(&ws);
        let model = &out.model;

        let schedules = model.objects_of_type(ObjectType::Schedule);
        assert_eq!(schedules.len(), 2);
        let constant = Schedule::from_id(model, schedules[0]).unwrap();
        assert_eq!(constant.kind(model), Some(ScheduleKind::Constant));
        assert_eq!(constant.value(model), Some(1.0));
        assert_eq!(model.name(schedules[0]), Some("Always On"));

        let occupancy = Schedule::from_id(model, schedules[1]).unwrap();
        assert_eq!(occupancy.kind(model), Some(ScheduleKind::VariableInterval));
        let series = occupancy.time_series(model).unwrap();
        assert!(series.values().contains(&1.0));

        let zones = model.objects_of_type(ObjectType::ThermalZone);
        assert_eq!(zones.len(), 1);
        let zone = ThermalZone::from_id(model, zones[0]).unwrap();
        assert_eq!(zone.multiplier(model), Some(3));
        assert_eq!(model.name(zones[0]), Some("Office"));
    }

    #[test]
    fn unsupported_types_warn_once() {
        let ws = parse_idf(IDF).unwrap();
        let out = ReverseTranslator::default().translate_workspace(&ws);
        let warnings: Vec<_> = out.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("Pipe:Adiabatic"));
        assert_eq!(out.errors().count(), 0);
    }

    #[test]
    fn malformed_compact_is_an_error() {
        let ws = parse_idf(
            "Schedule:Compact, Bad, , Through: 12/31, For: AllDays, Until: 00:00, 1;",
        )
        .unwrap();
        let out = ReverseTranslator::default().translate_workspace(&ws);
        assert_eq!(out.errors().count(), 1);
        assert!(out.model.objects_of_type(ObjectType::Schedule).is_empty());
    }
}
