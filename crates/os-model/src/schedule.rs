//! Constant and interval schedules.

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use os_core::ObjectId;
use os_schedule::{validate_interval, ScheduleError, TimeSeries};
use tracing::debug;

use crate::connectors::handle;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::objects::{ObjectKind, ObjectType, ScheduleData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    Constant,
    FixedInterval,
    VariableInterval,
}

handle!(Schedule);

/// Split `series` into the stored form, preferring a fixed interval.
fn interval_data(series: &TimeSeries) -> ModelResult<ScheduleData> {
    match series.interval() {
        Some(interval) => {
            let minutes = validate_interval(interval)?;
            let start = series.start();
            Ok(ScheduleData::FixedInterval {
                start_month: start.month(),
                start_day: start.day(),
                start_minute: start.hour() * 60 + start.minute(),
                interval_minutes: minutes,
                values: series.values().to_vec(),
            })
        }
        None => Ok(ScheduleData::VariableInterval {
            series: series.clone(),
        }),
    }
}

impl Schedule {
    pub fn constant(model: &mut Model, value: f64) -> ModelResult<Self> {
        os_core::ensure_finite(value, "schedule value")
            .map_err(|_| ModelError::Schedule(ScheduleError::NonFinite { index: 0, value }))?;
        Ok(Schedule(
            model.add_object(ObjectKind::Schedule(ScheduleData::Constant { value })),
        ))
    }

    /// Fixed-interval when the series is uniform, variable-interval
    /// otherwise. The interval must divide a day into whole minutes.
    pub fn from_time_series(model: &mut Model, series: &TimeSeries) -> ModelResult<Self> {
        let data = interval_data(series)?;
        Ok(Schedule(model.add_object(ObjectKind::Schedule(data))))
    }

    /// Always variable-interval, whatever the spacing.
    pub fn variable_from_time_series(model: &mut Model, series: &TimeSeries) -> Self {
        Schedule(model.add_object(ObjectKind::Schedule(ScheduleData::VariableInterval {
            series: series.clone(),
        })))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model.is_type(id, ObjectType::Schedule).then_some(Schedule(id))
    }

    pub fn kind(self, model: &Model) -> Option<ScheduleKind> {
        Some(match model.schedule_data(self.0)? {
            ScheduleData::Constant { .. } => ScheduleKind::Constant,
            ScheduleData::FixedInterval { .. } => ScheduleKind::FixedInterval,
            ScheduleData::VariableInterval { .. } => ScheduleKind::VariableInterval,
        })
    }

    /// Value of a constant schedule.
    pub fn value(self, model: &Model) -> Option<f64> {
        match model.schedule_data(self.0)? {
            ScheduleData::Constant { value } => Some(*value),
            _ => None,
        }
    }

    pub fn set_value(self, model: &mut Model, new_value: f64) -> bool {
        if !new_value.is_finite() {
            return false;
        }
        match model.schedule_data_mut(self.0) {
            Some(ScheduleData::Constant { value }) => {
                *value = new_value;
                true
            }
            _ => false,
        }
    }

    /// Interval schedules only. A fixed-interval schedule is placed in the
    /// model's calendar year.
    pub fn time_series(self, model: &Model) -> Option<TimeSeries> {
        match model.schedule_data(self.0)? {
            ScheduleData::Constant { .. } => None,
            ScheduleData::VariableInterval { series } => Some(series.clone()),
            ScheduleData::FixedInterval {
                start_month,
                start_day,
                start_minute,
                interval_minutes,
                values,
            } => {
                let start = NaiveDate::from_ymd_opt(model.calendar_year(), *start_month, *start_day)?
                    .and_hms_opt(0, 0, 0)?
                    + Duration::minutes(i64::from(*start_minute));
                TimeSeries::fixed(start, Duration::minutes(*interval_minutes), values.clone()).ok()
            }
        }
    }

    /// Replace the samples of an interval schedule. A fixed-interval
    /// schedule only takes a series with an acceptable interval. Returns
    /// `false` and keeps the prior state otherwise.
    pub fn set_time_series(self, model: &mut Model, series: &TimeSeries) -> bool {
        let replacement = match self.kind(model) {
            Some(ScheduleKind::FixedInterval) => match interval_data(series) {
                Ok(data @ ScheduleData::FixedInterval { .. }) => data,
                _ => return false,
            },
            Some(ScheduleKind::VariableInterval) => ScheduleData::VariableInterval {
                series: series.clone(),
            },
            _ => return false,
        };
        if let Some(data) = model.schedule_data_mut(self.0) {
            *data = replacement;
        }
        debug!(schedule = %self.0, samples = series.len(), "set time series");
        true
    }

    /// Replace the values of an interval schedule, keeping its timestamps.
    /// Any non-finite value or a length change is refused.
    pub fn set_values(self, model: &mut Model, new_values: &[f64]) -> bool {
        if new_values.is_empty() || new_values.iter().any(|v| !v.is_finite()) {
            return false;
        }
        match model.schedule_data_mut(self.0) {
            Some(ScheduleData::FixedInterval { values, .. }) if values.len() == new_values.len() => {
                values.copy_from_slice(new_values);
                true
            }
            Some(ScheduleData::VariableInterval { series }) if series.len() == new_values.len() => {
                match TimeSeries::variable(
                    series.start(),
                    series.date_times().to_vec(),
                    new_values.to_vec(),
                ) {
                    Ok(updated) => {
                        *series = updated;
                        true
                    }
                    Err(_) => false,
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn jan1() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2009, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn uniform_series_becomes_fixed_interval() {
        let mut m = Model::new();
        let ts = TimeSeries::fixed(jan1(), Duration::hours(1), vec![1.0, 2.0, 3.0]).unwrap();
        let s = Schedule::from_time_series(&mut m, &ts).unwrap();
        assert_eq!(s.kind(&m), Some(ScheduleKind::FixedInterval));
        assert_eq!(s.time_series(&m), Some(ts));
    }

    #[test]
    fn non_divisor_interval_is_rejected() {
        let mut m = Model::new();
        let interval = Duration::minutes(182 * 24 * 60 + 12 * 60);
        let ts = TimeSeries::fixed(jan1(), interval, vec![1.0, 2.0, 3.0]).unwrap();
        assert!(Schedule::from_time_series(&mut m, &ts).is_err());
        assert!(m.objects_of_type(ObjectType::Schedule).is_empty());
    }

    #[test]
    fn uneven_series_becomes_variable_interval() {
        let mut m = Model::new();
        let times = vec![
            jan1() + Duration::hours(1),
            jan1() + Duration::hours(3),
            jan1() + Duration::hours(4),
        ];
        let ts = TimeSeries::from_points(times, vec![1.0, 2.0, 3.0]).unwrap();
        let s = Schedule::from_time_series(&mut m, &ts).unwrap();
        assert_eq!(s.kind(&m), Some(ScheduleKind::VariableInterval));
        assert_eq!(s.time_series(&m).unwrap().values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn constant_value() {
        let mut m = Model::new();
        assert!(Schedule::constant(&mut m, f64::NAN).is_err());
        let s = Schedule::constant(&mut m, 1.0).unwrap();
        assert!(s.time_series(&m).is_none());
        assert!(s.set_value(&mut m, 0.5));
        assert!(!s.set_value(&mut m, f64::INFINITY));
        assert_eq!(s.value(&m), Some(0.5));
    }

    #[test]
    fn fixed_schedule_refuses_uneven_replacement() {
        let mut m = Model::new();
        let ts = TimeSeries::fixed(jan1(), Duration::hours(1), vec![1.0, 2.0]).unwrap();
        let s = Schedule::from_time_series(&mut m, &ts).unwrap();
        let uneven = TimeSeries::from_points(
            vec![jan1() + Duration::hours(1), jan1() + Duration::hours(5)],
            vec![4.0, 5.0],
        )
        .unwrap();
        assert!(!s.set_time_series(&mut m, &uneven));
        assert_eq!(s.time_series(&m), Some(ts));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::NaiveDateTime;
    use proptest::prelude::*;

    fn jan1() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2009, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn non_finite() -> impl Strategy<Value = f64> {
        prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)]
    }

    proptest! {
        #[test]
        fn non_finite_values_leave_schedule_untouched(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..48),
            bad in non_finite(),
            at in any::<prop::sample::Index>(),
            variable in any::<bool>(),
        ) {
            let mut m = Model::new();
            let ts = TimeSeries::fixed(jan1(), Duration::minutes(30), values.clone()).unwrap();
            let s = if variable {
                Schedule::variable_from_time_series(&mut m, &ts)
            } else {
                Schedule::from_time_series(&mut m, &ts).unwrap()
            };
            let before = s.time_series(&m).unwrap();

            let mut poisoned = values.clone();
            poisoned[at.index(values.len())] = bad;
            prop_assert!(!s.set_values(&mut m, &poisoned));
            let after = s.time_series(&m).unwrap();
            prop_assert_eq!(after.values(), before.values());
            prop_assert!(TimeSeries::fixed(jan1(), Duration::minutes(30), poisoned).is_err());
        }
    }
}
