//! Forward translator settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardTranslatorOptions {
    /// Write `!-` field name annotations in IDF output.
    pub emit_field_comments: bool,
    /// Name of the constant 1.0 schedule created on demand for defaulted
    /// availability and operation scheme schedules.
    pub always_on_schedule_name: String,
    /// Value written for the parts of the year an interval schedule does
    /// not cover.
    pub compact_out_of_range_value: f64,
}

impl Default for ForwardTranslatorOptions {
    fn default() -> Self {
        Self {
            emit_field_comments: true,
            always_on_schedule_name: "Always On Discrete".to_string(),
            compact_out_of_range_value: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_fill_defaults() {
        let opts: ForwardTranslatorOptions =
            serde_json::from_str(r#"{"emit_field_comments": false}"#).unwrap();
        assert!(!opts.emit_field_comments);
        assert_eq!(opts.always_on_schedule_name, "Always On Discrete");
        assert_eq!(opts.compact_out_of_range_value, 0.0);
    }
}
