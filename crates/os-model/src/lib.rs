//! os-model: the object-graph building model.
//!
//! Objects live in one arena ([`Model`]) and are addressed through small
//! copyable handles. Straight components have inlet and outlet ports wired
//! one-to-one; splitters and mixers carry contiguous branch ports.
//!
//! Contains:
//! - loops (plant and air, supply and demand sides)
//! - zones, terminals and plenums on the air demand side
//! - plant equipment with one or two port pairs
//! - setpoint managers, schedules and plant operation schemes
//!
//! Operations that refuse a request return `false`/`None` and leave the
//! model unchanged. A broken graph invariant panics.

pub mod air_loop;
pub mod connectors;
pub mod equipment;
pub mod error;
pub mod hvac;
pub mod model;
pub mod objects;
pub mod plant_loop;
pub mod plenum;
pub mod schedule;
pub mod scheme;
pub mod setpoint;
pub mod terminal;
pub mod thermal_zone;
mod traversal;

pub use air_loop::AirLoopHVAC;
pub use connectors::{ConnectorMixer, ConnectorSplitter, Mixer, Splitter, ZoneMixer, ZoneSplitter};
pub use equipment::{
    GeneratorMicroTurbine, PlantEquipment, PlantEquipmentKind, WaterHeaterHeatPump, ZoneHVACEquipment,
};
pub use error::{ModelError, ModelResult};
pub use hvac::{LoopRef, Node, Side};
pub use model::{Model, ObjectData, Port, DEFAULT_CALENDAR_YEAR};
pub use objects::{AirTerminalKind, LoadRange, ObjectKind, ObjectType, OperationSchemeKind};
pub use plant_loop::PlantLoop;
pub use plenum::{ReturnPlenum, SupplyPlenum};
pub use schedule::{Schedule, ScheduleKind};
pub use scheme::OperationScheme;
pub use setpoint::SetpointManager;
pub use terminal::AirTerminal;
pub use thermal_zone::ThermalZone;
