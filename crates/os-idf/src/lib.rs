//! os-idf: typed record store for EnergyPlus input.
//!
//! Provides:
//! - IDD descriptors: every record type with its ordered, typed fields
//! - `Workspace`: handle-addressed records with extensible groups
//! - IDF text writer and parser
//!
//! # Example
//!
//! ```
//! use os_idf::{RecordType, Value, Workspace};
//!
//! let mut ws = Workspace::new();
//! let h = ws.create_record(RecordType::ScheduleConstant);
//! ws.set_field_by_name(h, "Name", Value::text("Always On")).unwrap();
//! ws.set_field_by_name(h, "Hourly Value", Value::Real(1.0)).unwrap();
//!
//! let text = os_idf::write_idf(&ws, true);
//! assert!(text.contains("Schedule:Constant,"));
//! ```

pub mod error;
pub mod idd;
pub mod record;
pub mod text;
pub mod workspace;

pub use error::{IdfError, IdfResult, ValidationError};
pub use idd::{FieldDef, FieldKind, RecordDescriptor, RecordType};
pub use record::{Record, Value};
pub use text::{parse_idf, write_idf};
pub use workspace::Workspace;
