use chrono::Duration;

use crate::error::{ScheduleError, ScheduleResult};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Check a fixed schedule interval and return its length in minutes.
///
/// The interval must be whole minutes and divide 24 hours exactly; the
/// compact encoding has no way to express anything else.
pub fn validate_interval(interval: Duration) -> ScheduleResult<i64> {
    let seconds = interval.num_seconds();
    let whole = interval == Duration::seconds(seconds);
    if seconds <= 0 || seconds % 60 != 0 || !whole {
        return Err(ScheduleError::NotWholeMinutes { seconds });
    }
    let minutes = seconds / 60;
    if MINUTES_PER_DAY % minutes != 0 {
        return Err(ScheduleError::IntervalNotDivisor { minutes });
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_day_divisors() {
        for m in [1, 5, 10, 15, 30, 60, 120, 180, 360, 720, 1440] {
            assert_eq!(validate_interval(Duration::minutes(m)), Ok(m));
        }
    }

    #[test]
    fn rejects_non_divisors() {
        assert!(matches!(
            validate_interval(Duration::minutes(7)),
            Err(ScheduleError::IntervalNotDivisor { minutes: 7 })
        ));
        let half_year = Duration::minutes(182 * 1440 + 720);
        assert!(validate_interval(half_year).is_err());
        assert!(validate_interval(Duration::days(2)).is_err());
    }

    #[test]
    fn rejects_sub_minute_and_non_positive() {
        assert!(validate_interval(Duration::seconds(90)).is_err());
        assert!(validate_interval(Duration::milliseconds(60_500)).is_err());
        assert!(validate_interval(Duration::zero()).is_err());
        assert!(validate_interval(Duration::minutes(-60)).is_err());
    }
}
