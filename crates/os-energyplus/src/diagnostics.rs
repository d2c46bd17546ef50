//! Per-object translation messages.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    /// The object was translated with a substitution or an omitted field.
    Warn,
    /// The object, or part of it, was dropped from the output.
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    /// Name of the object the message is about, when there is one.
    pub object: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warn(object: Option<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Warn,
            object,
            message: message.into(),
        }
    }

    pub fn error(object: Option<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            object,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            Level::Warn => "warning",
            Level::Error => "error",
        };
        match &self.object {
            Some(object) => write!(f, "{level}: {object}: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}
