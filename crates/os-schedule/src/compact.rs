//! `Schedule:Compact` encoding of a time series, and its inverse.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use os_core::format_real;
use tracing::warn;

use crate::error::{ScheduleError, ScheduleResult};
use crate::interval::{validate_interval, MINUTES_PER_DAY};
use crate::series::{midnight, TimeSeries};

/// One logical line of a compact schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum CompactLine {
    Through { month: u32, day: u32 },
    For(String),
    /// Minutes after midnight, in `1..=1440`.
    Until { minutes: u32, value: f64 },
}

impl CompactLine {
    /// IDF fields for this line; `Until` takes two.
    pub fn to_fields(&self) -> Vec<String> {
        match self {
            CompactLine::Through { month, day } => vec![format!("Through: {month}/{day}")],
            CompactLine::For(days) => vec![format!("For: {days}")],
            CompactLine::Until { minutes, value } => vec![
                format!("Until: {:02}:{:02}", minutes / 60, minutes % 60),
                format_real(*value),
            ],
        }
    }
}

pub fn lines_to_fields(lines: &[CompactLine]) -> Vec<String> {
    lines.iter().flat_map(CompactLine::to_fields).collect()
}

fn keyword_rest<'a>(field: &'a str, keyword: &str) -> Option<&'a str> {
    let head = field.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| field[keyword.len()..].trim())
}

fn parse_through(rest: &str, raw: &str) -> ScheduleResult<CompactLine> {
    let malformed = || ScheduleError::Malformed(raw.to_string());
    let (m, d) = rest.split_once('/').ok_or_else(malformed)?;
    let month = m.trim().parse().map_err(|_| malformed())?;
    let day = d.trim().parse().map_err(|_| malformed())?;
    Ok(CompactLine::Through { month, day })
}

fn parse_until(rest: &str, raw: &str) -> ScheduleResult<u32> {
    let malformed = || ScheduleError::Malformed(raw.to_string());
    let (h, m) = rest.split_once(':').ok_or_else(malformed)?;
    let h: u32 = h.trim().parse().map_err(|_| malformed())?;
    let m: u32 = m.trim().parse().map_err(|_| malformed())?;
    if m >= 60 || h > 24 || (h == 24 && m != 0) {
        return Err(malformed());
    }
    Ok(h * 60 + m)
}

/// Parse raw `Schedule:Compact` fields (after name and type limits).
///
/// `Interpolate:` fields are dropped.
pub fn lines_from_fields<S: AsRef<str>>(fields: &[S]) -> ScheduleResult<Vec<CompactLine>> {
    let mut lines = Vec::new();
    let mut iter = fields.iter().map(|f| f.as_ref().trim());
    while let Some(field) = iter.next() {
        if let Some(rest) = keyword_rest(field, "Through:") {
            lines.push(parse_through(rest, field)?);
        } else if let Some(rest) = keyword_rest(field, "For:") {
            lines.push(CompactLine::For(rest.to_string()));
        } else if keyword_rest(field, "Interpolate:").is_some() {
            continue;
        } else if let Some(rest) = keyword_rest(field, "Until:") {
            let minutes = parse_until(rest, field)?;
            let raw = iter
                .next()
                .ok_or_else(|| ScheduleError::Malformed(field.to_string()))?;
            let value: f64 = raw
                .parse()
                .map_err(|_| ScheduleError::Malformed(raw.to_string()))?;
            lines.push(CompactLine::Until { minutes, value });
        } else {
            return Err(ScheduleError::Malformed(field.to_string()));
        }
    }
    Ok(lines)
}

fn year_bounds(year: i32) -> ScheduleResult<(NaiveDateTime, i64)> {
    let january_first = |y| NaiveDate::from_ymd_opt(y, 1, 1).ok_or(ScheduleError::InvalidDate { month: 1, day: 1 });
    let first = january_first(year)?;
    let next = january_first(year + 1)?;
    let days = (next - first).num_days();
    Ok((midnight(first), days * MINUTES_PER_DAY))
}

fn minutes_since(origin: NaiveDateTime, t: NaiveDateTime) -> ScheduleResult<i64> {
    let delta = t - origin;
    let seconds = delta.num_seconds();
    if seconds % 60 != 0 || delta != Duration::seconds(seconds) {
        return Err(ScheduleError::SubMinute { at: t });
    }
    Ok(seconds / 60)
}

/// Append a run to a day profile, extending the previous run when the
/// value repeats.
fn push_run(profile: &mut Vec<(u32, f64)>, minutes: u32, value: f64) {
    match profile.last_mut() {
        Some(last) if last.1 == value => last.0 = minutes,
        _ => profile.push((minutes, value)),
    }
}

/// Encode a time series as compact schedule lines for the calendar year of
/// its start.
///
/// Time before the first sample and after the last is filled with
/// `out_of_range_value`. Samples beyond December 31 24:00 are dropped; the
/// encoding never wraps into January. Consecutive days with identical
/// profiles share one `Through:` block.
pub fn compact_from_time_series(
    ts: &TimeSeries,
    out_of_range_value: f64,
) -> ScheduleResult<Vec<CompactLine>> {
    if let Some(interval) = ts.interval() {
        validate_interval(interval)?;
    }
    if !out_of_range_value.is_finite() {
        return Err(ScheduleError::NonFinite {
            index: ts.len(),
            value: out_of_range_value,
        });
    }

    let (year_start, year_end) = year_bounds(ts.start().year())?;
    let start = minutes_since(year_start, ts.start())?;

    // (end minute, value) runs covering the whole year
    let mut runs: Vec<(i64, f64)> = Vec::with_capacity(ts.len() + 2);
    if start > 0 {
        runs.push((start, out_of_range_value));
    }
    let mut last_end = start;
    for (i, (t, v)) in ts.date_times().iter().zip(ts.values()).enumerate() {
        let end = minutes_since(year_start, *t)?;
        if end > year_end {
            if last_end < year_end {
                runs.push((year_end, *v));
                last_end = year_end;
            }
            warn!(
                dropped = ts.len() - i,
                "time series runs past December 31; truncating"
            );
            break;
        }
        runs.push((end, *v));
        last_end = end;
    }
    if last_end < year_end {
        runs.push((year_end, out_of_range_value));
    }

    let day_count = (year_end / MINUTES_PER_DAY) as usize;
    let mut days: Vec<Vec<(u32, f64)>> = vec![Vec::new(); day_count];
    let mut cursor = 0_i64;
    for (end, value) in runs {
        while cursor < end {
            let day = cursor / MINUTES_PER_DAY;
            let day_start = day * MINUTES_PER_DAY;
            let stop = end.min(day_start + MINUTES_PER_DAY);
            push_run(&mut days[day as usize], (stop - day_start) as u32, value);
            cursor = stop;
        }
    }

    let mut lines = Vec::new();
    let first_day = year_start.date();
    for (i, profile) in days.iter().enumerate() {
        let block_continues = days.get(i + 1).is_some_and(|next| next == profile);
        if block_continues {
            continue;
        }
        let through = first_day + Duration::days(i as i64);
        lines.push(CompactLine::Through {
            month: through.month(),
            day: through.day(),
        });
        lines.push(CompactLine::For("AllDays".to_string()));
        for (minutes, value) in profile {
            lines.push(CompactLine::Until {
                minutes: *minutes,
                value: *value,
            });
        }
    }
    Ok(lines)
}

struct Block {
    first: NaiveDate,
    through: NaiveDate,
    has_for: bool,
    untils: Vec<(u32, f64)>,
}

impl Block {
    fn label(&self) -> String {
        format!("{}/{}", self.through.month(), self.through.day())
    }

    fn close(self, times: &mut Vec<NaiveDateTime>, values: &mut Vec<f64>) -> ScheduleResult<()> {
        if self.untils.last().map(|u| u.0) != Some(MINUTES_PER_DAY as u32) {
            return Err(ScheduleError::UnclosedBlock {
                through: self.label(),
            });
        }
        let mut day = self.first;
        while day <= self.through {
            for (minutes, value) in &self.untils {
                times.push(midnight(day) + Duration::minutes(i64::from(*minutes)));
                values.push(*value);
            }
            day += Duration::days(1);
        }
        Ok(())
    }
}

/// Rebuild a time series from compact lines for the given calendar year.
///
/// Every block must be closed with `Until: 24:00`, `Through:` dates must
/// increase, and the last block must end on 12/31.
pub fn time_series_from_compact(lines: &[CompactLine], year: i32) -> ScheduleResult<TimeSeries> {
    let (year_start, _) = year_bounds(year)?;
    let mut times = Vec::new();
    let mut values = Vec::new();
    let mut block: Option<Block> = None;
    let mut next_first = year_start.date();

    for line in lines {
        match line {
            CompactLine::Through { month, day } => {
                let through = NaiveDate::from_ymd_opt(year, *month, *day).ok_or(
                    ScheduleError::InvalidDate {
                        month: *month,
                        day: *day,
                    },
                )?;
                if let Some(open) = block.take() {
                    if through <= open.through {
                        return Err(ScheduleError::ThroughOutOfOrder {
                            previous: open.label(),
                            next: format!("{month}/{day}"),
                        });
                    }
                    next_first = open.through + Duration::days(1);
                    open.close(&mut times, &mut values)?;
                }
                block = Some(Block {
                    first: next_first,
                    through,
                    has_for: false,
                    untils: Vec::new(),
                });
            }
            CompactLine::For(_) => {
                let open = block.as_mut().ok_or(ScheduleError::OutsideBlock("For:"))?;
                if open.has_for {
                    return Err(ScheduleError::Malformed(format!(
                        "second For: in block through {}",
                        open.label()
                    )));
                }
                open.has_for = true;
            }
            CompactLine::Until { minutes, value } => {
                let open = block
                    .as_mut()
                    .filter(|b| b.has_for)
                    .ok_or(ScheduleError::OutsideBlock("Until:"))?;
                if *minutes == 0 {
                    return Err(ScheduleError::MidnightUntil);
                }
                let previous = open.untils.last().map_or(0, |u| u.0);
                if *minutes <= previous || i64::from(*minutes) > MINUTES_PER_DAY {
                    return Err(ScheduleError::UntilOutOfOrder { minutes: *minutes });
                }
                if !value.is_finite() {
                    return Err(ScheduleError::NonFinite {
                        index: values.len(),
                        value: *value,
                    });
                }
                open.untils.push((*minutes, *value));
            }
        }
    }

    let last = block.ok_or(ScheduleError::Empty)?;
    if (last.through.month(), last.through.day()) != (12, 31) {
        return Err(ScheduleError::MissingYearEnd(last.label()));
    }
    last.close(&mut times, &mut values)?;

    // Drop samples whose successor carries the same value; the successor's
    // interval then covers them.
    let keep: Vec<bool> = (0..values.len())
        .map(|i| i + 1 == values.len() || values[i] != values[i + 1])
        .collect();
    let mut k = keep.iter();
    times.retain(|_| *k.next().unwrap_or(&true));
    let mut k = keep.iter();
    values.retain(|_| *k.next().unwrap_or(&true));

    TimeSeries::variable(year_start, times, values)
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

    fn untils(lines: &[CompactLine]) -> Vec<(u32, f64)> {
        lines
            .iter()
            .filter_map(|l| match l {
                CompactLine::Until { minutes, value } => Some((*minutes, *value)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn constant_year_is_one_block() {
        let ts = TimeSeries::fixed(dt(1, 1, 0, 0), Duration::hours(24), vec![5.0; 365]).unwrap();
        let lines = compact_from_time_series(&ts, 0.0).unwrap();
        assert_eq!(
            lines,
            vec![
                CompactLine::Through { month: 12, day: 31 },
                CompactLine::For("AllDays".into()),
                CompactLine::Until {
                    minutes: 1440,
                    value: 5.0
                },
            ]
        );
    }

    #[test]
    fn interval_on_day_boundary_closes_the_day() {
        // 12-hour steps: the second sample lands exactly on midnight
        let ts = TimeSeries::fixed(dt(1, 1, 0, 0), Duration::hours(12), vec![1.0, 2.0, 3.0]).unwrap();
        let lines = compact_from_time_series(&ts, 0.0).unwrap();
        assert_eq!(lines[0], CompactLine::Through { month: 1, day: 1 });
        assert_eq!(
            &lines[2..4],
            &[
                CompactLine::Until {
                    minutes: 720,
                    value: 1.0
                },
                CompactLine::Until {
                    minutes: 1440,
                    value: 2.0
                },
            ]
        );
        assert_eq!(lines[4], CompactLine::Through { month: 1, day: 2 });
        assert_eq!(
            lines[6],
            CompactLine::Until {
                minutes: 720,
                value: 3.0
            }
        );
        assert_eq!(
            lines[7],
            CompactLine::Until {
                minutes: 1440,
                value: 0.0
            }
        );
    }

    #[test]
    fn fills_before_first_sample() {
        let ts = TimeSeries::from_points(vec![dt(3, 1, 12, 0)], vec![7.0]).unwrap();
        let lines = compact_from_time_series(&ts, -1.0).unwrap();
        assert_eq!(lines[0], CompactLine::Through { month: 2, day: 28 });
        assert_eq!(
            lines[2],
            CompactLine::Until {
                minutes: 1440,
                value: -1.0
            }
        );
        assert_eq!(lines[3], CompactLine::Through { month: 3, day: 1 });
        assert_eq!(
            untils(&lines[3..7]),
            vec![(720, 7.0), (1440, -1.0)]
        );
    }

    #[test]
    fn truncates_instead_of_wrapping() {
        let start = dt(12, 31, 0, 0);
        let ts = TimeSeries::fixed(start, Duration::hours(12), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let lines = compact_from_time_series(&ts, 0.0).unwrap();
        let last_through = lines
            .iter()
            .rev()
            .find(|l| matches!(l, CompactLine::Through { .. }))
            .unwrap();
        assert_eq!(*last_through, CompactLine::Through { month: 12, day: 31 });
        assert_eq!(untils(&lines).last(), Some(&(1440, 2.0)));
    }

    #[test]
    fn rejects_bad_fixed_interval() {
        let ts = TimeSeries::fixed(dt(1, 1, 0, 0), Duration::minutes(7), vec![1.0]).unwrap();
        assert!(matches!(
            compact_from_time_series(&ts, 0.0),
            Err(ScheduleError::IntervalNotDivisor { minutes: 7 })
        ));
    }

    #[test]
    fn rejects_sub_minute_timestamps() {
        let t = dt(1, 1, 1, 0) + Duration::seconds(30);
        let ts = TimeSeries::from_points(vec![t], vec![1.0]).unwrap();
        assert!(matches!(
            compact_from_time_series(&ts, 0.0),
            Err(ScheduleError::SubMinute { .. })
        ));
    }

    #[test]
    fn fields_format() {
        let fields = lines_to_fields(&[
            CompactLine::Through { month: 12, day: 31 },
            CompactLine::For("AllDays".into()),
            CompactLine::Until {
                minutes: 480,
                value: 0.5,
            },
            CompactLine::Until {
                minutes: 1440,
                value: 1.0,
            },
        ]);
        assert_eq!(
            fields,
            vec![
                "Through: 12/31",
                "For: AllDays",
                "Until: 08:00",
                "0.5",
                "Until: 24:00",
                "1"
            ]
        );
    }

    #[test]
    fn parse_fields_ignores_interpolate() {
        let lines = lines_from_fields(&[
            "Through: 12/31",
            "For: AllDays",
            "Interpolate: No",
            "Until: 24:00",
            "3.5",
        ])
        .unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[2],
            CompactLine::Until {
                minutes: 1440,
                value: 3.5
            }
        );
    }

    #[test]
    fn parse_fields_rejects_garbage() {
        assert!(lines_from_fields(&["Through 12/31"]).is_err());
        assert!(lines_from_fields(&["Through: 12/31", "For: AllDays", "Until: 25:00", "1"]).is_err());
        assert!(lines_from_fields(&["Through: 12/31", "For: AllDays", "Until: 24:00"]).is_err());
    }

    #[test]
    fn decode_rejects_midnight_until() {
        let lines = lines_from_fields(&[
            "Through: 12/31",
            "For: AllDays",
            "Until: 00:00",
            "1",
            "Until: 24:00",
            "1",
        ])
        .unwrap();
        assert_eq!(
            time_series_from_compact(&lines, 2009),
            Err(ScheduleError::MidnightUntil)
        );
    }

    #[test]
    fn decode_rejects_out_of_order_through() {
        let lines = lines_from_fields(&[
            "Through: 6/30",
            "For: AllDays",
            "Until: 24:00",
            "1",
            "Through: 3/1",
            "For: AllDays",
            "Until: 24:00",
            "2",
        ])
        .unwrap();
        assert!(matches!(
            time_series_from_compact(&lines, 2009),
            Err(ScheduleError::ThroughOutOfOrder { .. })
        ));
    }

    #[test]
    fn decode_rejects_unclosed_block() {
        let lines = lines_from_fields(&[
            "Through: 6/30",
            "For: AllDays",
            "Until: 12:00",
            "1",
            "Through: 12/31",
            "For: AllDays",
            "Until: 24:00",
            "2",
        ])
        .unwrap();
        assert!(matches!(
            time_series_from_compact(&lines, 2009),
            Err(ScheduleError::UnclosedBlock { .. })
        ));
    }

    #[test]
    fn decode_requires_year_end() {
        let lines = lines_from_fields(&["Through: 6/30", "For: AllDays", "Until: 24:00", "1"]).unwrap();
        assert!(matches!(
            time_series_from_compact(&lines, 2009),
            Err(ScheduleError::MissingYearEnd(_))
        ));
    }

    #[test]
    fn decode_expands_blocks() {
        let lines = lines_from_fields(&[
            "Through: 1/2",
            "For: AllDays",
            "Until: 08:00",
            "0",
            "Until: 24:00",
            "1",
            "Through: 12/31",
            "For: AllDays",
            "Until: 24:00",
            "2",
        ])
        .unwrap();
        let ts = time_series_from_compact(&lines, 2009).unwrap();
        assert_eq!(ts.start(), dt(1, 1, 0, 0));
        assert_eq!(ts.value_at(dt(1, 1, 7, 0)), Some(0.0));
        assert_eq!(ts.value_at(dt(1, 2, 9, 0)), Some(1.0));
        assert_eq!(ts.value_at(dt(1, 3, 9, 0)), Some(2.0));
        assert_eq!(ts.value_at(dt(12, 31, 23, 59)), Some(2.0));
    }
}
