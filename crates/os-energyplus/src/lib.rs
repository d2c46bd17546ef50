//! os-energyplus: translation between the building model and IDF records.
//!
//! The forward translator walks a [`os_model::Model`] and emits a
//! [`os_idf::Workspace`] ready to be written as IDF text. Problems with a
//! single object never stop the run; they are collected as
//! [`Diagnostic`]s next to the output. The reverse translator reads
//! schedules and zones back from a workspace.

pub mod diagnostics;
pub mod error;
pub mod forward;
pub mod options;
pub mod reverse;

pub use diagnostics::{Diagnostic, Level};
pub use error::{TranslateError, TranslateResult};
pub use forward::operation_schemes::ComponentType;
pub use forward::{ForwardTranslator, TranslationOutput};
pub use options::ForwardTranslatorOptions;
pub use reverse::{ReverseOutput, ReverseTranslator};
