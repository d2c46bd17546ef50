//! os-schedule: time series and the `Schedule:Compact` codec.
//!
//! A value in a [`TimeSeries`] holds over the interval that ends at its
//! timestamp. The compact encoding expresses the same signal as calendar
//! blocks (`Through: M/D`) of clock-time runs (`Until: HH:MM`), with
//! midnight always written as `24:00` of the day that just ended.

pub mod compact;
pub mod error;
pub mod interval;
pub mod series;

pub use compact::{
    compact_from_time_series, lines_from_fields, lines_to_fields, time_series_from_compact,
    CompactLine,
};
pub use error::{ScheduleError, ScheduleResult};
pub use interval::{validate_interval, MINUTES_PER_DAY};
pub use series::TimeSeries;
