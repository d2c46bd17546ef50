use os_core::ObjectId;
use os_schedule::ScheduleError;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("No object {0} in this model")]
    UnknownObject(ObjectId),

    #[error("Object {id} is not a {expected}")]
    WrongKind { id: ObjectId, expected: &'static str },

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Rejected: {what}")]
    Rejected { what: String },
}
