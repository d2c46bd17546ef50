use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use os_schedule::{
    compact_from_time_series, lines_from_fields, lines_to_fields, time_series_from_compact,
    CompactLine, TimeSeries,
};
use proptest::prelude::*;

fn jan1() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2009, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Structural checks every encoder output must pass.
fn assert_well_formed(lines: &[CompactLine]) {
    let mut previous: Option<(u32, u32)> = None;
    let mut closed = true;
    let mut last_until = 0;
    for line in lines {
        match line {
            CompactLine::Through { month, day } => {
                assert!(closed, "block before {month}/{day} not closed by 24:00");
                if let Some(prev) = previous {
                    assert!((*month, *day) > prev, "Through: dates must increase");
                }
                previous = Some((*month, *day));
                closed = false;
                last_until = 0;
            }
            CompactLine::For(_) => {}
            CompactLine::Until { minutes, value } => {
                assert_ne!(*minutes, 0, "Until: 00:00 emitted");
                assert!(*minutes > last_until);
                assert!(value.is_finite());
                last_until = *minutes;
                closed = *minutes == 1440;
            }
        }
    }
    assert!(closed);
    assert_eq!(previous, Some((12, 31)));
    let fields = lines_to_fields(lines);
    assert!(fields.iter().all(|f| f != "Until: 00:00"));
}

#[test]
fn hourly_year_produces_8760_untils() {
    let values: Vec<f64> = (1..=8760).map(f64::from).collect();
    let ts = TimeSeries::fixed(jan1(), Duration::hours(1), values).unwrap();
    let lines = compact_from_time_series(&ts, 0.0).unwrap();

    let untils: Vec<_> = lines
        .iter()
        .filter_map(|l| match l {
            CompactLine::Until { value, .. } => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(untils.len(), 8760);
    assert_eq!(*untils.last().unwrap(), 8760.0);
    assert_eq!(
        lines.iter().filter(|l| matches!(l, CompactLine::Through { .. })).count(),
        365
    );
    assert_well_formed(&lines);
}

#[test]
fn field_text_round_trips_through_decoder() {
    let values: Vec<f64> = (0..48).map(|h| if h % 24 < 8 { 0.2 } else { 1.0 }).collect();
    let ts = TimeSeries::fixed(jan1(), Duration::hours(1), values.clone()).unwrap();
    let lines = compact_from_time_series(&ts, 0.0).unwrap();
    let fields = lines_to_fields(&lines);
    let parsed = lines_from_fields(&fields).unwrap();
    assert_eq!(parsed, lines);

    let decoded = time_series_from_compact(&parsed, 2009).unwrap();
    for (t, v) in ts.date_times().iter().zip(&values) {
        assert_eq!(decoded.value_at(*t), Some(*v), "at {t}");
    }
    let after = jan1() + Duration::days(10);
    assert_eq!(decoded.value_at(after), Some(0.0));
}

#[test]
fn shifted_start_never_emits_midnight() {
    // Starts mid-morning and ends mid-afternoon a few days later.
    let start = jan1() + Duration::days(40) + Duration::minutes(9 * 60 + 15);
    let ts = TimeSeries::fixed(start, Duration::minutes(15), vec![1.0, 2.0, 3.0, 4.0].repeat(100))
        .unwrap();
    let lines = compact_from_time_series(&ts, 0.0).unwrap();
    assert_well_formed(&lines);
}

fn day_divisors() -> impl Strategy<Value = i64> {
    prop::sample::select(vec![1_i64, 2, 3, 5, 10, 15, 20, 30, 60, 90, 120, 240, 360, 720, 1440])
}

proptest! {
    #[test]
    fn non_divisor_intervals_are_rejected(minutes in 1_i64..3000) {
        prop_assume!(1440 % minutes != 0);
        let ts = TimeSeries::fixed(jan1(), Duration::minutes(minutes), vec![1.0, 2.0, 3.0]).unwrap();
        prop_assert!(compact_from_time_series(&ts, 0.0).is_err());
    }

    #[test]
    fn fixed_series_are_well_formed(
        minutes in day_divisors(),
        offset_days in 0_i64..364,
        values in prop::collection::vec(-50.0_f64..50.0, 1..200),
    ) {
        let start = jan1() + Duration::days(offset_days);
        let ts = TimeSeries::fixed(start, Duration::minutes(minutes), values).unwrap();
        let lines = compact_from_time_series(&ts, 0.0).unwrap();
        assert_well_formed(&lines);
    }

    #[test]
    fn variable_series_are_well_formed(
        start_minute in 0_i64..(365 * 1440),
        steps in prop::collection::vec((1_i64..2000, -5.0_f64..5.0), 1..120),
    ) {
        let start = jan1() + Duration::minutes(start_minute);
        let mut t = start;
        let mut times = Vec::new();
        let mut values = Vec::new();
        for (step, value) in steps {
            t += Duration::minutes(step);
            times.push(t);
            values.push(value);
        }
        let ts = TimeSeries::variable(start, times, values).unwrap();
        let lines = compact_from_time_series(&ts, -1.0).unwrap();
        assert_well_formed(&lines);

        let decoded = time_series_from_compact(&lines, start.year()).unwrap();
        let year_end = jan1() + Duration::days(365);
        for (t, v) in ts.date_times().iter().zip(ts.values()) {
            if *t <= year_end {
                prop_assert_eq!(decoded.value_at(*t), Some(*v));
            }
        }
    }
}
