use chrono::NaiveDateTime;
use thiserror::Error;

pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Non-finite value at sample {index}: {value}")]
    NonFinite { index: usize, value: f64 },

    #[error("Time series has {times} timestamps but {values} values")]
    LengthMismatch { times: usize, values: usize },

    #[error("Time series is empty")]
    Empty,

    #[error("Timestamps must be strictly increasing (sample {index})")]
    NotIncreasing { index: usize },

    #[error("Interval must be a positive whole number of minutes, got {seconds} s")]
    NotWholeMinutes { seconds: i64 },

    #[error("Interval of {minutes} minutes does not evenly divide a day")]
    IntervalNotDivisor { minutes: i64 },

    #[error("Timestamp {at} is not on a whole minute")]
    SubMinute { at: NaiveDateTime },

    #[error("Malformed compact field '{0}'")]
    Malformed(String),

    #[error("Through: {next} does not follow Through: {previous}")]
    ThroughOutOfOrder { previous: String, next: String },

    #[error("Block through {through} is not closed by Until: 24:00")]
    UnclosedBlock { through: String },

    #[error("Until: 00:00 is not allowed; midnight is written as 24:00")]
    MidnightUntil,

    #[error("Until: times must increase within a block (got {minutes} min)")]
    UntilOutOfOrder { minutes: u32 },

    #[error("{0} appears outside a Through: block")]
    OutsideBlock(&'static str),

    #[error("Last Through: must be 12/31, got {0}")]
    MissingYearEnd(String),

    #[error("Invalid calendar date {month}/{day}")]
    InvalidDate { month: u32, day: u32 },
}
