use os_idf::IdfError;
use os_model::ModelError;
use os_schedule::ScheduleError;
use thiserror::Error;

pub type TranslateResult<T> = Result<T, TranslateError>;

/// Failure to translate one object. The translators turn these into
/// diagnostics; they never abort a whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("IDF error: {0}")]
    Idf(#[from] IdfError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("{object} is missing its {what}")]
    Incomplete { object: String, what: &'static str },
}
