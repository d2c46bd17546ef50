use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ScheduleError, ScheduleResult};

/// Ordered `(timestamp, value)` samples.
///
/// Each value holds over `(previous timestamp, timestamp]`; the first value
/// holds from `start`. Values are always finite and timestamps strictly
/// increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    start: NaiveDateTime,
    date_times: Vec<NaiveDateTime>,
    values: Vec<f64>,
    interval: Option<Duration>,
}

pub(crate) fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn check_values(values: &[f64]) -> ScheduleResult<()> {
    if values.is_empty() {
        return Err(ScheduleError::Empty);
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ScheduleError::NonFinite {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

impl TimeSeries {
    /// Uniform samples: value `i` is reported at `start + (i + 1) * interval`.
    pub fn fixed(start: NaiveDateTime, interval: Duration, values: Vec<f64>) -> ScheduleResult<Self> {
        check_values(&values)?;
        if interval <= Duration::zero() {
            return Err(ScheduleError::NotWholeMinutes {
                seconds: interval.num_seconds(),
            });
        }
        let mut date_times = Vec::with_capacity(values.len());
        let mut t = start;
        for _ in 0..values.len() {
            t += interval;
            date_times.push(t);
        }
        Ok(Self {
            start,
            date_times,
            values,
            interval: Some(interval),
        })
    }

    /// Irregular samples with an explicit start of the first interval.
    pub fn variable(
        start: NaiveDateTime,
        date_times: Vec<NaiveDateTime>,
        values: Vec<f64>,
    ) -> ScheduleResult<Self> {
        if date_times.len() != values.len() {
            return Err(ScheduleError::LengthMismatch {
                times: date_times.len(),
                values: values.len(),
            });
        }
        check_values(&values)?;
        if date_times[0] <= start {
            return Err(ScheduleError::NotIncreasing { index: 0 });
        }
        if let Some(i) = date_times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ScheduleError::NotIncreasing { index: i + 1 });
        }
        Ok(Self {
            start,
            date_times,
            values,
            interval: None,
        })
    }

    /// Irregular samples whose first value holds from the midnight before it.
    pub fn from_points(date_times: Vec<NaiveDateTime>, values: Vec<f64>) -> ScheduleResult<Self> {
        let first = *date_times.first().ok_or(ScheduleError::Empty)?;
        let start = midnight((first - Duration::minutes(1)).date());
        Self::variable(start, date_times, values)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn date_times(&self) -> &[NaiveDateTime] {
        &self.date_times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Fixed interval length, `None` for irregular series.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_report_date_time(&self) -> NaiveDateTime {
        self.date_times[0]
    }

    pub fn last_report_date_time(&self) -> NaiveDateTime {
        self.date_times[self.date_times.len() - 1]
    }

    /// Value holding at `t`, or `None` outside `(start, last timestamp]`.
    pub fn value_at(&self, t: NaiveDateTime) -> Option<f64> {
        if t <= self.start {
            return None;
        }
        let i = self.date_times.partition_point(|dt| *dt < t);
        self.values.get(i).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2009, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn fixed_reports_at_interval_end() {
        let ts = TimeSeries::fixed(dt(1, 1, 0, 0), Duration::hours(1), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.first_report_date_time(), dt(1, 1, 1, 0));
        assert_eq!(ts.last_report_date_time(), dt(1, 1, 3, 0));
        assert_eq!(ts.interval(), Some(Duration::hours(1)));
    }

    #[test]
    fn rejects_nan_and_infinity() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = TimeSeries::fixed(dt(1, 1, 0, 0), Duration::hours(1), vec![1.0, bad]).unwrap_err();
            assert!(matches!(err, ScheduleError::NonFinite { index: 1, .. }));
        }
    }

    #[test]
    fn variable_requires_increasing_times() {
        let times = vec![dt(1, 1, 2, 0), dt(1, 1, 1, 0)];
        assert!(matches!(
            TimeSeries::from_points(times, vec![1.0, 2.0]),
            Err(ScheduleError::NotIncreasing { index: 1 })
        ));
    }

    #[test]
    fn variable_length_mismatch() {
        let times = vec![dt(1, 1, 2, 0)];
        assert!(matches!(
            TimeSeries::from_points(times, vec![1.0, 2.0]),
            Err(ScheduleError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn from_points_starts_at_previous_midnight() {
        let ts = TimeSeries::from_points(vec![dt(1, 2, 0, 0), dt(1, 2, 6, 0)], vec![1.0, 2.0]).unwrap();
        assert_eq!(ts.start(), dt(1, 1, 0, 0));
        let ts = TimeSeries::from_points(vec![dt(3, 5, 0, 30)], vec![1.0]).unwrap();
        assert_eq!(ts.start(), dt(3, 5, 0, 0));
    }

    #[test]
    fn value_at_uses_interval_ending_semantics() {
        let ts = TimeSeries::fixed(dt(1, 1, 0, 0), Duration::hours(1), vec![1.0, 2.0]).unwrap();
        assert_eq!(ts.value_at(dt(1, 1, 0, 0)), None);
        assert_eq!(ts.value_at(dt(1, 1, 0, 30)), Some(1.0));
        assert_eq!(ts.value_at(dt(1, 1, 1, 0)), Some(1.0));
        assert_eq!(ts.value_at(dt(1, 1, 1, 1)), Some(2.0));
        assert_eq!(ts.value_at(dt(1, 1, 2, 1)), None);
    }
}
