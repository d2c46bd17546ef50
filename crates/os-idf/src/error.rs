use os_core::Handle;
use thiserror::Error;

pub type IdfResult<T> = Result<T, IdfError>;

/// A value rejected by a field's declared domain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{keyword}: '{value}' is not a legal choice for '{field}'")]
    IllegalChoice {
        keyword: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{keyword}: '{field}' expects {expected}")]
    WrongKind {
        keyword: &'static str,
        field: &'static str,
        expected: &'static str,
    },

    #[error("{keyword}: '{field}' cannot be autosized")]
    NotAutosizable {
        keyword: &'static str,
        field: &'static str,
    },

    #[error("{keyword}: '{field}' is not finite ({value})")]
    NonFinite {
        keyword: &'static str,
        field: &'static str,
        value: f64,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdfError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("No record with handle {0}")]
    UnknownHandle(Handle),

    #[error("{keyword} has no field at index {index} (len={len})")]
    FieldIndex {
        keyword: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{keyword} has no field named '{name}'")]
    UnknownField { keyword: &'static str, name: String },

    #[error("{keyword} has no extensible group {group} (count={count})")]
    GroupIndex {
        keyword: &'static str,
        group: usize,
        count: usize,
    },

    #[error("{keyword} does not accept extensible groups")]
    NotExtensible { keyword: &'static str },

    #[error("Parse error in record {record}: {message}")]
    Parse { record: usize, message: String },
}
