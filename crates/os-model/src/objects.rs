//! Per-kind payloads stored in the model arena.

use os_core::ObjectId;
use os_schedule::TimeSeries;

use crate::equipment::PlantEquipmentKind;

/// Type tag of a model object; also the namespace for unique names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
    Node,
    PlantLoop,
    AirLoopHvac,
    ConnectorSplitter,
    ConnectorMixer,
    ZoneSplitter,
    ZoneMixer,
    SupplyPlenum,
    ReturnPlenum,
    ThermalZone,
    AirTerminal,
    PlantEquipment,
    GeneratorMicroTurbine,
    WaterHeaterHeatPump,
    ZoneHvacEquipment,
    SetpointManager,
    Schedule,
    OperationScheme,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Node => "Node",
            ObjectType::PlantLoop => "PlantLoop",
            ObjectType::AirLoopHvac => "AirLoopHVAC",
            ObjectType::ConnectorSplitter => "ConnectorSplitter",
            ObjectType::ConnectorMixer => "ConnectorMixer",
            ObjectType::ZoneSplitter => "AirLoopHVACZoneSplitter",
            ObjectType::ZoneMixer => "AirLoopHVACZoneMixer",
            ObjectType::SupplyPlenum => "AirLoopHVACSupplyPlenum",
            ObjectType::ReturnPlenum => "AirLoopHVACReturnPlenum",
            ObjectType::ThermalZone => "ThermalZone",
            ObjectType::AirTerminal => "AirTerminal",
            ObjectType::PlantEquipment => "PlantEquipment",
            ObjectType::GeneratorMicroTurbine => "GeneratorMicroTurbine",
            ObjectType::WaterHeaterHeatPump => "WaterHeaterHeatPump",
            ObjectType::ZoneHvacEquipment => "ZoneHVACEquipment",
            ObjectType::SetpointManager => "SetpointManager",
            ObjectType::Schedule => "Schedule",
            ObjectType::OperationScheme => "PlantEquipmentOperationScheme",
        }
    }

    /// Port topology used by graph walks.
    pub(crate) fn branching(self) -> Branching {
        match self {
            ObjectType::ConnectorSplitter | ObjectType::ZoneSplitter | ObjectType::SupplyPlenum => {
                Branching::Splitter
            }
            ObjectType::ConnectorMixer | ObjectType::ZoneMixer | ObjectType::ReturnPlenum => {
                Branching::Mixer
            }
            _ => Branching::Straight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Branching {
    /// One inlet, outlets `0..n`.
    Splitter,
    /// Inlets `0..n`, one outlet.
    Mixer,
    /// Inlet `k` flows to outlet `k`.
    Straight,
}

#[derive(Debug, Clone, Default)]
pub struct NodeData {
    pub(crate) setpoint_managers: Vec<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct PlantLoopData {
    pub(crate) supply_inlet: ObjectId,
    pub(crate) supply_outlet: ObjectId,
    pub(crate) supply_splitter: ObjectId,
    pub(crate) supply_mixer: ObjectId,
    pub(crate) demand_inlet: ObjectId,
    pub(crate) demand_outlet: ObjectId,
    pub(crate) demand_splitter: ObjectId,
    pub(crate) demand_mixer: ObjectId,
    pub(crate) fluid_type: String,
    pub(crate) maximum_loop_temperature: f64,
    pub(crate) minimum_loop_temperature: f64,
    /// `None` is autosized.
    pub(crate) maximum_loop_flow_rate: Option<f64>,
    pub(crate) load_distribution_scheme: String,
    pub(crate) heating_load_scheme: Option<ObjectId>,
    pub(crate) heating_load_schedule: Option<ObjectId>,
    pub(crate) cooling_load_scheme: Option<ObjectId>,
    pub(crate) cooling_load_schedule: Option<ObjectId>,
    pub(crate) primary_scheme: Option<ObjectId>,
    pub(crate) primary_schedule: Option<ObjectId>,
    pub(crate) component_setpoint_schedule: Option<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct AirLoopData {
    pub(crate) supply_inlet: ObjectId,
    pub(crate) supply_outlet: ObjectId,
    pub(crate) demand_inlet: ObjectId,
    pub(crate) demand_outlet: ObjectId,
    pub(crate) zone_splitter: ObjectId,
    pub(crate) zone_mixer: ObjectId,
    pub(crate) design_supply_air_flow_rate: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct PlenumData {
    pub(crate) thermal_zone: Option<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct ThermalZoneData {
    pub(crate) equipment: Vec<ObjectId>,
    pub(crate) use_ideal_air_loads: bool,
    pub(crate) multiplier: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirTerminalKind {
    ConstantVolumeNoReheat,
    /// Direct-air terminal; it has no inlet node of its own.
    Uncontrolled,
}

#[derive(Debug, Clone)]
pub struct AirTerminalData {
    pub(crate) kind: AirTerminalKind,
    pub(crate) maximum_air_flow_rate: Option<f64>,
    pub(crate) availability_schedule: Option<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct PlantEquipmentData {
    pub(crate) kind: PlantEquipmentKind,
    pub(crate) design_flow_rate: Option<f64>,
    pub(crate) capacity: Option<f64>,
    pub(crate) control_type: String,
    /// Zone HVAC component wrapping this one (water heater tanks).
    pub(crate) container: Option<ObjectId>,
    /// Owning generator of a heat-recovery module.
    pub(crate) generator: Option<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorData {
    pub(crate) heat_recovery: Option<ObjectId>,
    pub(crate) reference_electrical_power_output: f64,
}

#[derive(Debug, Clone)]
pub struct HeatPumpWaterHeaterData {
    pub(crate) tank: ObjectId,
    pub(crate) zone: Option<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct ZoneHvacData {
    pub(crate) zone: Option<ObjectId>,
    /// `None` is autosized.
    pub(crate) heating_capacity: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum SetpointManagerData {
    Scheduled {
        control_variable: String,
        schedule: ObjectId,
        node: Option<ObjectId>,
    },
    SingleZoneReheat {
        control_zone: Option<ObjectId>,
        minimum_supply_air_temperature: f64,
        maximum_supply_air_temperature: f64,
        node: Option<ObjectId>,
    },
}

impl SetpointManagerData {
    pub(crate) fn node(&self) -> Option<ObjectId> {
        match self {
            SetpointManagerData::Scheduled { node, .. }
            | SetpointManagerData::SingleZoneReheat { node, .. } => *node,
        }
    }

    pub(crate) fn set_node(&mut self, value: Option<ObjectId>) {
        match self {
            SetpointManagerData::Scheduled { node, .. }
            | SetpointManagerData::SingleZoneReheat { node, .. } => *node = value,
        }
    }

    pub(crate) fn control_variable(&self) -> &str {
        match self {
            SetpointManagerData::Scheduled {
                control_variable, ..
            } => control_variable,
            SetpointManagerData::SingleZoneReheat { .. } => "Temperature",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScheduleData {
    Constant {
        value: f64,
    },
    /// Uniform steps; the first value is reported one interval after the
    /// start, in the model's calendar year.
    FixedInterval {
        start_month: u32,
        start_day: u32,
        start_minute: u32,
        interval_minutes: i64,
        values: Vec<f64>,
    },
    VariableInterval {
        series: TimeSeries,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationSchemeKind {
    HeatingLoad,
    CoolingLoad,
    Uncontrolled,
}

/// Equipment dispatched over `(lower, upper]` watts of load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRange {
    pub lower: f64,
    pub upper: f64,
    pub equipment: Vec<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct OperationSchemeData {
    pub(crate) kind: OperationSchemeKind,
    pub(crate) ranges: Vec<LoadRange>,
}

/// Payload of every object the model can hold.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Node(NodeData),
    PlantLoop(Box<PlantLoopData>),
    AirLoopHvac(AirLoopData),
    ConnectorSplitter,
    ConnectorMixer,
    ZoneSplitter,
    ZoneMixer,
    SupplyPlenum(PlenumData),
    ReturnPlenum(PlenumData),
    ThermalZone(ThermalZoneData),
    AirTerminal(AirTerminalData),
    PlantEquipment(PlantEquipmentData),
    GeneratorMicroTurbine(GeneratorData),
    WaterHeaterHeatPump(HeatPumpWaterHeaterData),
    ZoneHvacEquipment(ZoneHvacData),
    SetpointManager(SetpointManagerData),
    Schedule(ScheduleData),
    OperationScheme(OperationSchemeData),
}

impl ObjectKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectKind::Node(_) => ObjectType::Node,
            ObjectKind::PlantLoop(_) => ObjectType::PlantLoop,
            ObjectKind::AirLoopHvac(_) => ObjectType::AirLoopHvac,
            ObjectKind::ConnectorSplitter => ObjectType::ConnectorSplitter,
            ObjectKind::ConnectorMixer => ObjectType::ConnectorMixer,
            ObjectKind::ZoneSplitter => ObjectType::ZoneSplitter,
            ObjectKind::ZoneMixer => ObjectType::ZoneMixer,
            ObjectKind::SupplyPlenum(_) => ObjectType::SupplyPlenum,
            ObjectKind::ReturnPlenum(_) => ObjectType::ReturnPlenum,
            ObjectKind::ThermalZone(_) => ObjectType::ThermalZone,
            ObjectKind::AirTerminal(_) => ObjectType::AirTerminal,
            ObjectKind::PlantEquipment(_) => ObjectType::PlantEquipment,
            ObjectKind::GeneratorMicroTurbine(_) => ObjectType::GeneratorMicroTurbine,
            ObjectKind::WaterHeaterHeatPump(_) => ObjectType::WaterHeaterHeatPump,
            ObjectKind::ZoneHvacEquipment(_) => ObjectType::ZoneHvacEquipment,
            ObjectKind::SetpointManager(_) => ObjectType::SetpointManager,
            ObjectKind::Schedule(_) => ObjectType::Schedule,
            ObjectKind::OperationScheme(_) => ObjectType::OperationScheme,
        }
    }

    /// Prefix of generated names, e.g. `Node 3`.
    pub(crate) fn default_name(&self) -> &'static str {
        match self {
            ObjectKind::Node(_) => "Node",
            ObjectKind::PlantLoop(_) => "Plant Loop",
            ObjectKind::AirLoopHvac(_) => "Air Loop HVAC",
            ObjectKind::ConnectorSplitter => "Connector Splitter",
            ObjectKind::ConnectorMixer => "Connector Mixer",
            ObjectKind::ZoneSplitter => "Air Loop HVAC Zone Splitter",
            ObjectKind::ZoneMixer => "Air Loop HVAC Zone Mixer",
            ObjectKind::SupplyPlenum(_) => "Air Loop HVAC Supply Plenum",
            ObjectKind::ReturnPlenum(_) => "Air Loop HVAC Return Plenum",
            ObjectKind::ThermalZone(_) => "Thermal Zone",
            ObjectKind::AirTerminal(t) => match t.kind {
                AirTerminalKind::ConstantVolumeNoReheat => {
                    "Air Terminal Single Duct Constant Volume No Reheat"
                }
                AirTerminalKind::Uncontrolled => "Air Terminal Single Duct Uncontrolled",
            },
            ObjectKind::PlantEquipment(e) => e.kind.default_name(),
            ObjectKind::GeneratorMicroTurbine(_) => "Generator Micro Turbine",
            ObjectKind::WaterHeaterHeatPump(_) => "Water Heater Heat Pump",
            ObjectKind::ZoneHvacEquipment(_) => "Zone HVAC Baseboard Convective Electric",
            ObjectKind::SetpointManager(SetpointManagerData::Scheduled { .. }) => {
                "Setpoint Manager Scheduled"
            }
            ObjectKind::SetpointManager(SetpointManagerData::SingleZoneReheat { .. }) => {
                "Setpoint Manager Single Zone Reheat"
            }
            ObjectKind::Schedule(ScheduleData::Constant { .. }) => "Schedule Constant",
            ObjectKind::Schedule(ScheduleData::FixedInterval { .. }) => "Schedule Fixed Interval",
            ObjectKind::Schedule(ScheduleData::VariableInterval { .. }) => {
                "Schedule Variable Interval"
            }
            ObjectKind::OperationScheme(s) => match s.kind {
                OperationSchemeKind::HeatingLoad => "Plant Equipment Operation Heating Load",
                OperationSchemeKind::CoolingLoad => "Plant Equipment Operation Cooling Load",
                OperationSchemeKind::Uncontrolled => "Plant Equipment Operation Uncontrolled",
            },
        }
    }
}
