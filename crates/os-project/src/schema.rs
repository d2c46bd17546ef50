//! Project schema definitions.

use chrono::NaiveDateTime;
use os_energyplus::ForwardTranslatorOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    /// Calendar year schedules are laid out on.
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default)]
    pub options: ForwardTranslatorOptions,
    #[serde(default)]
    pub schedules: Vec<ScheduleDef>,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
    #[serde(default)]
    pub plant_loops: Vec<PlantLoopDef>,
    #[serde(default)]
    pub air_loops: Vec<AirLoopDef>,
}

fn default_year() -> i32 {
    os_model::DEFAULT_CALENDAR_YEAR
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: crate::validate::LATEST_VERSION,
            name: name.into(),
            year: default_year(),
            options: ForwardTranslatorOptions::default(),
            schedules: Vec::new(),
            zones: Vec::new(),
            plant_loops: Vec::new(),
            air_loops: Vec::new(),
        }
    }

    /// Every plant equipment definition across all loops.
    pub fn equipment(&self) -> impl Iterator<Item = &EquipmentDef> {
        self.plant_loops
            .iter()
            .flat_map(|l| l.supply_branches.iter().chain(&l.series))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleDef {
    pub id: String,
    pub name: String,
    pub kind: ScheduleKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ScheduleKind {
    Constant {
        value: f64,
    },
    /// Value `i` is reported at `start + (i + 1) * interval_min`.
    FixedInterval {
        start: NaiveDateTime,
        interval_min: i64,
        values: Vec<f64>,
    },
    VariableInterval {
        /// Start of the first interval; midnight before the first time when
        /// omitted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<NaiveDateTime>,
        times: Vec<NaiveDateTime>,
        values: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDef {
    pub id: String,
    pub name: String,
    #[serde(default = "default_multiplier")]
    pub multiplier: i64,
    #[serde(default)]
    pub ideal_air_loads: bool,
    #[serde(default)]
    pub equipment: Vec<ZoneEquipmentDef>,
}

fn default_multiplier() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ZoneEquipmentDef {
    Baseboard {
        id: String,
        name: String,
        /// Autosized when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heating_capacity_w: Option<f64>,
    },
    /// Wraps a `WaterHeaterMixed` tank defined on a plant loop.
    HeatPumpWaterHeater {
        id: String,
        name: String,
        tank_id: String,
    },
}

impl ZoneEquipmentDef {
    pub fn id(&self) -> &str {
        match self {
            ZoneEquipmentDef::Baseboard { id, .. } | ZoneEquipmentDef::HeatPumpWaterHeater { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantLoopDef {
    pub id: String,
    pub name: String,
    #[serde(default = "default_fluid")]
    pub fluid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temperature_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temperature_c: Option<f64>,
    /// Autosized when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flow_m3s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_distribution: Option<String>,
    /// One parallel supply branch per entry.
    #[serde(default)]
    pub supply_branches: Vec<EquipmentDef>,
    /// In series behind the supply inlet node, in order.
    #[serde(default)]
    pub series: Vec<EquipmentDef>,
    /// Two-pair equipment from other loops placed on demand branches of
    /// this one (condenser or source side).
    #[serde(default)]
    pub demand_branches: Vec<String>,
    #[serde(default)]
    pub setpoint_managers: Vec<PlantSetpointDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating_scheme: Option<SchemeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling_scheme: Option<SchemeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_scheme: Option<SchemeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint_scheme_schedule_id: Option<String>,
}

fn default_fluid() -> String {
    "Water".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentDef {
    pub id: String,
    pub name: String,
    pub kind: EquipmentKind,
    /// Autosized when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_flow_m3s: Option<f64>,
    /// Autosized when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_w: Option<f64>,
    /// Heat exchanger control type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EquipmentKind {
    Boiler,
    DistrictHeating,
    DistrictCooling,
    ChillerElectricEir,
    ChillerAbsorption,
    CoolingTowerSingleSpeed,
    FluidCooler,
    GroundHeatExchangerVertical,
    HeatExchangerFluidToFluid,
    ThermalStorageIce,
    ThermalStorageChilledWater,
    SolarCollector,
    HeatPumpWaterToWaterHeating,
    HeatPumpWaterToWaterCooling,
    WaterHeaterMixed,
    /// A micro turbine generator whose heat recovery module sits on the loop.
    MicroTurbine,
    PlantComponentTemperatureSource,
    PlantComponentUserDefined,
    Pump,
    Pipe,
}

impl EquipmentKind {
    pub fn model_kind(self) -> os_model::PlantEquipmentKind {
        use os_model::PlantEquipmentKind as K;
        match self {
            EquipmentKind::Boiler => K::Boiler,
            EquipmentKind::DistrictHeating => K::DistrictHeating,
            EquipmentKind::DistrictCooling => K::DistrictCooling,
            EquipmentKind::ChillerElectricEir => K::ChillerElectricEir,
            EquipmentKind::ChillerAbsorption => K::ChillerAbsorption,
            EquipmentKind::CoolingTowerSingleSpeed => K::CoolingTowerSingleSpeed,
            EquipmentKind::FluidCooler => K::FluidCooler,
            EquipmentKind::GroundHeatExchangerVertical => K::GroundHeatExchangerVertical,
            EquipmentKind::HeatExchangerFluidToFluid => K::HeatExchangerFluidToFluid,
            EquipmentKind::ThermalStorageIce => K::ThermalStorageIce,
            EquipmentKind::ThermalStorageChilledWater => K::ThermalStorageChilledWater,
            EquipmentKind::SolarCollector => K::SolarCollector,
            EquipmentKind::HeatPumpWaterToWaterHeating => K::HeatPumpWaterToWaterHeating,
            EquipmentKind::HeatPumpWaterToWaterCooling => K::HeatPumpWaterToWaterCooling,
            EquipmentKind::WaterHeaterMixed => K::WaterHeaterMixed,
            EquipmentKind::MicroTurbine => K::MicroTurbineHeatRecovery,
            EquipmentKind::PlantComponentTemperatureSource => K::PlantComponentTemperatureSource,
            EquipmentKind::PlantComponentUserDefined => K::PlantComponentUserDefined,
            EquipmentKind::Pump => K::Pump,
            EquipmentKind::Pipe => K::Pipe,
        }
    }
}

/// Scheduled setpoint on a plant node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantSetpointDef {
    pub id: String,
    pub name: String,
    /// Outlet node of this supply equipment; the loop's supply outlet node
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
    #[serde(default = "default_control_variable")]
    pub control_variable: String,
    pub schedule_id: String,
}

fn default_control_variable() -> String {
    "Temperature".to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SchemeKind {
    HeatingLoad,
    CoolingLoad,
    Uncontrolled,
}

impl SchemeKind {
    pub fn model_kind(self) -> os_model::OperationSchemeKind {
        match self {
            SchemeKind::HeatingLoad => os_model::OperationSchemeKind::HeatingLoad,
            SchemeKind::CoolingLoad => os_model::OperationSchemeKind::CoolingLoad,
            SchemeKind::Uncontrolled => os_model::OperationSchemeKind::Uncontrolled,
        }
    }
}

/// An authored operation scheme. `equipment` runs over the top load
/// range; each entry of `ranges` splits off a lower range ending at
/// `upper_w`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemeDef {
    pub name: String,
    pub kind: SchemeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub ranges: Vec<LoadRangeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadRangeDef {
    pub upper_w: f64,
    pub equipment: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirLoopDef {
    pub id: String,
    pub name: String,
    /// Autosized when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_supply_air_flow_m3s: Option<f64>,
    #[serde(default)]
    pub branches: Vec<AirBranchDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_setpoint: Option<AirSetpointDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirBranchDef {
    pub zone_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<TerminalDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_plenum_zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_plenum_zone_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerminalDef {
    pub name: String,
    pub kind: TerminalKind,
    /// Autosized when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flow_m3s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_schedule_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TerminalKind {
    ConstantVolumeNoReheat,
    Uncontrolled,
}

impl TerminalKind {
    pub fn model_kind(self) -> os_model::AirTerminalKind {
        match self {
            TerminalKind::ConstantVolumeNoReheat => os_model::AirTerminalKind::ConstantVolumeNoReheat,
            TerminalKind::Uncontrolled => os_model::AirTerminalKind::Uncontrolled,
        }
    }
}

/// Setpoint manager on the air loop's supply outlet node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AirSetpointDef {
    Scheduled {
        name: String,
        #[serde(default = "default_control_variable")]
        control_variable: String,
        schedule_id: String,
    },
    SingleZoneReheat {
        name: String,
        /// First zone on the loop when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        control_zone_id: Option<String>,
        #[serde(default = "default_min_supply_c")]
        min_supply_c: f64,
        #[serde(default = "default_max_supply_c")]
        max_supply_c: f64,
    },
}

fn default_min_supply_c() -> f64 {
    -99.0
}

fn default_max_supply_c() -> f64 {
    99.0
}
