//! Plant equipment, the micro turbine generator, heat pump water heaters and
//! zone equipment.
//!
//! Every plant component shares one field contract: optional getters where
//! `None` means autosized, `bool` setters that refuse bad values without
//! touching state.

use os_core::ObjectId;
use tracing::debug;

use crate::connectors::handle;
use crate::hvac::{insert_at_node, remove_from_series, LoopRef, Node, Side};
use crate::model::Model;
use crate::objects::{
    GeneratorData, HeatPumpWaterHeaterData, ObjectKind, ObjectType, PlantEquipmentData,
    ZoneHvacData,
};
use crate::plant_loop::PlantLoop;
use crate::thermal_zone::ThermalZone;

pub const HX_CONTROL_TYPES: &[&str] = &[
    "UncontrolledOn",
    "OperationSchemeModulated",
    "OperationSchemeOnOff",
    "HeatingSetpointModulated",
    "HeatingSetpointOnOff",
    "CoolingSetpointModulated",
    "CoolingSetpointOnOff",
    "DualDeadbandSetpointModulated",
    "DualDeadbandSetpointOnOff",
    "CoolingDifferentialOnOff",
    "CoolingSetpointOnOffWithComponentOverride",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlantEquipmentKind {
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
    MicroTurbineHeatRecovery,
    PlantComponentTemperatureSource,
    PlantComponentUserDefined,
    Pump,
    Pipe,
}

impl PlantEquipmentKind {
    pub const ALL: &'static [PlantEquipmentKind] = &[
        PlantEquipmentKind::Boiler,
        PlantEquipmentKind::DistrictHeating,
        PlantEquipmentKind::DistrictCooling,
        PlantEquipmentKind::ChillerElectricEir,
        PlantEquipmentKind::ChillerAbsorption,
        PlantEquipmentKind::CoolingTowerSingleSpeed,
        PlantEquipmentKind::FluidCooler,
        PlantEquipmentKind::GroundHeatExchangerVertical,
        PlantEquipmentKind::HeatExchangerFluidToFluid,
        PlantEquipmentKind::ThermalStorageIce,
        PlantEquipmentKind::ThermalStorageChilledWater,
        PlantEquipmentKind::SolarCollector,
        PlantEquipmentKind::HeatPumpWaterToWaterHeating,
        PlantEquipmentKind::HeatPumpWaterToWaterCooling,
        PlantEquipmentKind::WaterHeaterMixed,
        PlantEquipmentKind::MicroTurbineHeatRecovery,
        PlantEquipmentKind::PlantComponentTemperatureSource,
        PlantEquipmentKind::PlantComponentUserDefined,
        PlantEquipmentKind::Pump,
        PlantEquipmentKind::Pipe,
    ];

    /// Number of inlet/outlet port pairs. Pair 0 always faces the loop the
    /// component serves; pair 1 is the condenser, source or demand side.
    pub fn pair_count(self) -> u32 {
        match self {
            PlantEquipmentKind::ChillerElectricEir
            | PlantEquipmentKind::ChillerAbsorption
            | PlantEquipmentKind::HeatExchangerFluidToFluid
            | PlantEquipmentKind::ThermalStorageChilledWater
            | PlantEquipmentKind::HeatPumpWaterToWaterHeating
            | PlantEquipmentKind::HeatPumpWaterToWaterCooling
            | PlantEquipmentKind::WaterHeaterMixed => 2,
            _ => 1,
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            PlantEquipmentKind::Boiler => "Boiler Hot Water",
            PlantEquipmentKind::DistrictHeating => "District Heating",
            PlantEquipmentKind::DistrictCooling => "District Cooling",
            PlantEquipmentKind::ChillerElectricEir => "Chiller Electric EIR",
            PlantEquipmentKind::ChillerAbsorption => "Chiller Absorption",
            PlantEquipmentKind::CoolingTowerSingleSpeed => "Cooling Tower Single Speed",
            PlantEquipmentKind::FluidCooler => "Fluid Cooler Single Speed",
            PlantEquipmentKind::GroundHeatExchangerVertical => "Ground Heat Exchanger Vertical",
            PlantEquipmentKind::HeatExchangerFluidToFluid => "Heat Exchanger Fluid To Fluid",
            PlantEquipmentKind::ThermalStorageIce => "Thermal Storage Ice Detailed",
            PlantEquipmentKind::ThermalStorageChilledWater => {
                "Thermal Storage Chilled Water Stratified"
            }
            PlantEquipmentKind::SolarCollector => "Solar Collector Flat Plate Water",
            PlantEquipmentKind::HeatPumpWaterToWaterHeating => {
                "Heat Pump Water To Water Equation Fit Heating"
            }
            PlantEquipmentKind::HeatPumpWaterToWaterCooling => {
                "Heat Pump Water To Water Equation Fit Cooling"
            }
            PlantEquipmentKind::WaterHeaterMixed => "Water Heater Mixed",
            PlantEquipmentKind::MicroTurbineHeatRecovery => "Generator Micro Turbine Heat Recovery",
            PlantEquipmentKind::PlantComponentTemperatureSource => {
                "Plant Component Temperature Source"
            }
            PlantEquipmentKind::PlantComponentUserDefined => "Plant Component User Defined",
            PlantEquipmentKind::Pump => "Pump Variable Speed",
            PlantEquipmentKind::Pipe => "Pipe Adiabatic",
        }
    }

    /// Kinds whose capacity field means anything.
    pub fn has_capacity(self) -> bool {
        matches!(
            self,
            PlantEquipmentKind::Boiler
                | PlantEquipmentKind::DistrictHeating
                | PlantEquipmentKind::DistrictCooling
                | PlantEquipmentKind::ChillerElectricEir
                | PlantEquipmentKind::ChillerAbsorption
                | PlantEquipmentKind::HeatPumpWaterToWaterHeating
                | PlantEquipmentKind::HeatPumpWaterToWaterCooling
                | PlantEquipmentKind::WaterHeaterMixed
        )
    }
}

fn valid_size(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

handle!(
    /// Any plant-side component from [`PlantEquipmentKind`].
    PlantEquipment
);

impl PlantEquipment {
    pub fn new(model: &mut Model, kind: PlantEquipmentKind) -> Self {
        PlantEquipment(model.add_object(ObjectKind::PlantEquipment(PlantEquipmentData {
            kind,
            design_flow_rate: None,
            capacity: None,
            control_type: "UncontrolledOn".to_string(),
            container: None,
            generator: None,
        })))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model
            .is_type(id, ObjectType::PlantEquipment)
            .then_some(PlantEquipment(id))
    }

    fn data(self, model: &Model) -> Option<&PlantEquipmentData> {
        model.equipment_data(self.0)
    }

    fn data_mut(self, model: &mut Model) -> Option<&mut PlantEquipmentData> {
        model.equipment_data_mut(self.0)
    }

    pub fn kind(self, model: &Model) -> Option<PlantEquipmentKind> {
        self.data(model).map(|d| d.kind)
    }

    /// Design (or reference) water flow rate. `None` when autosized.
    pub fn design_flow_rate(self, model: &Model) -> Option<f64> {
        self.data(model)?.design_flow_rate
    }

    pub fn is_design_flow_rate_autosized(self, model: &Model) -> bool {
        self.data(model).is_some_and(|d| d.design_flow_rate.is_none())
    }

    pub fn set_design_flow_rate(self, model: &mut Model, value: f64) -> bool {
        valid_size(value)
            && self
                .data_mut(model)
                .map(|d| d.design_flow_rate = Some(value))
                .is_some()
    }

    pub fn autosize_design_flow_rate(self, model: &mut Model) {
        if let Some(d) = self.data_mut(model) {
            d.design_flow_rate = None;
        }
    }

    /// Nominal capacity in watts. `None` when autosized or not applicable.
    pub fn capacity(self, model: &Model) -> Option<f64> {
        self.data(model)?.capacity
    }

    pub fn is_capacity_autosized(self, model: &Model) -> bool {
        self.data(model)
            .is_some_and(|d| d.kind.has_capacity() && d.capacity.is_none())
    }

    pub fn set_capacity(self, model: &mut Model, value: f64) -> bool {
        if !valid_size(value) || !self.kind(model).is_some_and(PlantEquipmentKind::has_capacity) {
            return false;
        }
        self.data_mut(model).map(|d| d.capacity = Some(value)).is_some()
    }

    pub fn autosize_capacity(self, model: &mut Model) {
        if let Some(d) = self.data_mut(model) {
            d.capacity = None;
        }
    }

    pub fn control_type(self, model: &Model) -> Option<&str> {
        self.data(model).map(|d| d.control_type.as_str())
    }

    /// Only fluid-to-fluid heat exchangers carry a control type.
    pub fn set_control_type(self, model: &mut Model, value: &str) -> bool {
        if self.kind(model) != Some(PlantEquipmentKind::HeatExchangerFluidToFluid) {
            return false;
        }
        let Some(keyword) = HX_CONTROL_TYPES
            .iter()
            .find(|k| k.eq_ignore_ascii_case(value))
        else {
            return false;
        };
        self.data_mut(model)
            .map(|d| d.control_type = keyword.to_string())
            .is_some()
    }

    /// Port pair used on `side` of a plant loop.
    pub(crate) fn pair_for_side(self, model: &Model, side: Side) -> u32 {
        match side {
            Side::Supply => 0,
            Side::Demand => match self.kind(model) {
                Some(kind) if kind.pair_count() == 2 => 1,
                _ => 0,
            },
        }
    }

    /// Loop served through pair 0: the supply-side loop, or for single-pair
    /// components the demand-side loop holding them.
    pub fn plant_loop(self, model: &Model) -> Option<PlantLoop> {
        let loops = model.plant_loops();
        if let Some(l) = loops
            .iter()
            .find(|l| l.supply_components(model).contains(&self.0))
        {
            return Some(*l);
        }
        if self.kind(model)?.pair_count() == 2 {
            return None;
        }
        loops
            .into_iter()
            .find(|l| l.demand_components(model).contains(&self.0))
    }

    /// Demand-side loop of a two-pair component.
    pub fn secondary_plant_loop(self, model: &Model) -> Option<PlantLoop> {
        if self.kind(model)?.pair_count() != 2 {
            return None;
        }
        model
            .plant_loops()
            .into_iter()
            .find(|l| l.demand_components(model).contains(&self.0))
    }

    pub fn containing_zone_hvac_component(self, model: &Model) -> Option<WaterHeaterHeatPump> {
        self.data(model)?.container.map(WaterHeaterHeatPump)
    }

    /// Owning generator of a heat recovery module.
    pub fn generator(self, model: &Model) -> Option<GeneratorMicroTurbine> {
        self.data(model)?.generator.map(GeneratorMicroTurbine)
    }

    /// Insert in series at `node` of a plant loop. Two-pair components use
    /// pair 1 on a demand side. Air loop nodes are refused.
    pub fn add_to_node(self, model: &mut Model, node: Node) -> bool {
        let Some((lp, side)) = model.loop_of(node.id()) else {
            return false;
        };
        if matches!(lp, LoopRef::Air(_)) {
            return false;
        }
        let pair = self.pair_for_side(model, side);
        insert_at_node(model, self.0, pair, node)
    }

    /// Pull the component out of every loop it sits on, closing the gaps.
    pub fn remove_from_loop(self, model: &mut Model) -> bool {
        let pairs = self.kind(model).map_or(1, PlantEquipmentKind::pair_count);
        let mut removed = false;
        for pair in 0..pairs {
            removed |= remove_from_series(model, self.0, pair);
        }
        removed
    }

    /// Detach and drop the component.
    pub fn remove(self, model: &mut Model) {
        self.remove_from_loop(model);
        if let Some(hpwh) = self.containing_zone_hvac_component(model) {
            if hpwh.tank(model) == Some(self) {
                hpwh.remove(model);
            }
        }
        model.remove_object(self.0);
    }
}

handle!(
    /// Electric generator whose optional heat recovery module sits on a
    /// plant loop as its own component.
    GeneratorMicroTurbine
);

impl GeneratorMicroTurbine {
    pub fn new(model: &mut Model) -> Self {
        GeneratorMicroTurbine(model.add_object(ObjectKind::GeneratorMicroTurbine(GeneratorData {
            heat_recovery: None,
            reference_electrical_power_output: 65_000.0,
        })))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model
            .is_type(id, ObjectType::GeneratorMicroTurbine)
            .then_some(GeneratorMicroTurbine(id))
    }

    pub fn heat_recovery(self, model: &Model) -> Option<PlantEquipment> {
        model.generator_data(self.0)?.heat_recovery.map(PlantEquipment)
    }

    /// Heat recovery module, created on first use.
    pub fn create_heat_recovery(self, model: &mut Model) -> PlantEquipment {
        if let Some(hr) = self.heat_recovery(model) {
            return hr;
        }
        let hr = PlantEquipment::new(model, PlantEquipmentKind::MicroTurbineHeatRecovery);
        if let Some(d) = model.equipment_data_mut(hr.0) {
            d.generator = Some(self.0);
        }
        if let Some(g) = model.generator_data_mut(self.0) {
            g.heat_recovery = Some(hr.0);
        }
        debug!(generator = %self.0, heat_recovery = %hr.0, "create heat recovery");
        hr
    }

    pub fn reference_electrical_power_output(self, model: &Model) -> Option<f64> {
        model
            .generator_data(self.0)
            .map(|g| g.reference_electrical_power_output)
    }

    pub fn set_reference_electrical_power_output(self, model: &mut Model, value: f64) -> bool {
        value.is_finite()
            && value > 0.0
            && model
                .generator_data_mut(self.0)
                .map(|g| g.reference_electrical_power_output = value)
                .is_some()
    }
}

handle!(
    /// Zone HVAC container wrapping a mixed water heater tank.
    WaterHeaterHeatPump
);

impl WaterHeaterHeatPump {
    /// Wrap `tank`, which must be an unwrapped mixed water heater.
    pub fn new(model: &mut Model, tank: PlantEquipment) -> Option<Self> {
        if tank.kind(model) != Some(PlantEquipmentKind::WaterHeaterMixed)
            || tank.containing_zone_hvac_component(model).is_some()
        {
            return None;
        }
        let id = model.add_object(ObjectKind::WaterHeaterHeatPump(HeatPumpWaterHeaterData {
            tank: tank.0,
            zone: None,
        }));
        if let Some(d) = model.equipment_data_mut(tank.0) {
            d.container = Some(id);
        }
        Some(WaterHeaterHeatPump(id))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model
            .is_type(id, ObjectType::WaterHeaterHeatPump)
            .then_some(WaterHeaterHeatPump(id))
    }

    pub fn tank(self, model: &Model) -> Option<PlantEquipment> {
        model.hpwh_data(self.0).map(|d| PlantEquipment(d.tank))
    }

    pub fn thermal_zone(self, model: &Model) -> Option<ThermalZone> {
        model.hpwh_data(self.0)?.zone.map(ThermalZone)
    }

    pub fn add_to_thermal_zone(self, model: &mut Model, zone: ThermalZone) -> bool {
        zone.add_equipment(model, self.0)
    }

    fn remove(self, model: &mut Model) {
        if let Some(zone) = self.thermal_zone(model) {
            zone.remove_equipment(model, self.0);
        }
        model.remove_object(self.0);
    }
}

handle!(
    /// Zone-level conditioning equipment (an electric baseboard).
    ZoneHVACEquipment
);

impl ZoneHVACEquipment {
    pub fn new(model: &mut Model) -> Self {
        ZoneHVACEquipment(model.add_object(ObjectKind::ZoneHvacEquipment(ZoneHvacData {
            zone: None,
            heating_capacity: None,
        })))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model
            .is_type(id, ObjectType::ZoneHvacEquipment)
            .then_some(ZoneHVACEquipment(id))
    }

    pub fn heating_capacity(self, model: &Model) -> Option<f64> {
        model.zone_hvac_data(self.0)?.heating_capacity
    }

    pub fn is_heating_capacity_autosized(self, model: &Model) -> bool {
        model
            .zone_hvac_data(self.0)
            .is_some_and(|d| d.heating_capacity.is_none())
    }

    pub fn set_heating_capacity(self, model: &mut Model, value: f64) -> bool {
        valid_size(value)
            && model
                .zone_hvac_data_mut(self.0)
                .map(|d| d.heating_capacity = Some(value))
                .is_some()
    }

    pub fn autosize_heating_capacity(self, model: &mut Model) {
        if let Some(d) = model.zone_hvac_data_mut(self.0) {
            d.heating_capacity = None;
        }
    }

    pub fn thermal_zone(self, model: &Model) -> Option<ThermalZone> {
        model.zone_hvac_data(self.0)?.zone.map(ThermalZone)
    }

    pub fn add_to_thermal_zone(self, model: &mut Model, zone: ThermalZone) -> bool {
        zone.add_equipment(model, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_contract() {
        let mut m = Model::new();
        let b = PlantEquipment::new(&mut m, PlantEquipmentKind::Boiler);
        assert!(b.is_design_flow_rate_autosized(&m));
        assert_eq!(b.design_flow_rate(&m), None);

        assert!(b.set_design_flow_rate(&mut m, 0.002));
        assert_eq!(b.design_flow_rate(&m), Some(0.002));
        assert!(!b.set_design_flow_rate(&mut m, f64::NAN));
        assert!(!b.set_design_flow_rate(&mut m, -1.0));
        assert_eq!(b.design_flow_rate(&m), Some(0.002));

        b.autosize_design_flow_rate(&mut m);
        assert!(b.is_design_flow_rate_autosized(&m));
    }

    #[test]
    fn capacity_only_for_sized_kinds() {
        let mut m = Model::new();
        let pipe = PlantEquipment::new(&mut m, PlantEquipmentKind::Pipe);
        assert!(!pipe.set_capacity(&mut m, 10.0));
        assert!(!pipe.is_capacity_autosized(&m));
        let wh = PlantEquipment::new(&mut m, PlantEquipmentKind::WaterHeaterMixed);
        assert!(wh.set_capacity(&mut m, 0.0));
        assert_eq!(wh.capacity(&m), Some(0.0));
    }

    #[test]
    fn control_type_is_heat_exchanger_only() {
        let mut m = Model::new();
        let hx = PlantEquipment::new(&mut m, PlantEquipmentKind::HeatExchangerFluidToFluid);
        let boiler = PlantEquipment::new(&mut m, PlantEquipmentKind::Boiler);
        assert_eq!(hx.control_type(&m), Some("UncontrolledOn"));
        assert!(hx.set_control_type(&mut m, "heatingsetpointmodulated"));
        assert_eq!(hx.control_type(&m), Some("HeatingSetpointModulated"));
        assert!(!hx.set_control_type(&mut m, "Sometimes"));
        assert!(!boiler.set_control_type(&mut m, "HeatingSetpointModulated"));
    }

    #[test]
    fn heat_recovery_belongs_to_its_generator() {
        let mut m = Model::new();
        let generator = GeneratorMicroTurbine::new(&mut m);
        let hr = generator.create_heat_recovery(&mut m);
        assert_eq!(hr.generator(&m), Some(generator));
        assert_eq!(generator.create_heat_recovery(&mut m), hr);
        assert_eq!(hr.kind(&m), Some(PlantEquipmentKind::MicroTurbineHeatRecovery));
    }

    #[test]
    fn heat_pump_water_heater_wraps_one_tank() {
        let mut m = Model::new();
        let tank = PlantEquipment::new(&mut m, PlantEquipmentKind::WaterHeaterMixed);
        let hpwh = WaterHeaterHeatPump::new(&mut m, tank).unwrap();
        assert_eq!(tank.containing_zone_hvac_component(&m), Some(hpwh));
        assert_eq!(hpwh.tank(&m), Some(tank));
        assert!(WaterHeaterHeatPump::new(&mut m, tank).is_none());

        let boiler = PlantEquipment::new(&mut m, PlantEquipmentKind::Boiler);
        assert!(WaterHeaterHeatPump::new(&mut m, boiler).is_none());
    }

    #[test]
    fn add_to_node_series_and_remove() {
        let mut m = Model::new();
        let l = PlantLoop::new(&mut m);
        let pump = PlantEquipment::new(&mut m, PlantEquipmentKind::Pump);
        let inlet = l.supply_inlet_node(&m).unwrap();
        assert!(pump.add_to_node(&mut m, inlet));
        // inlet -> pump -> node -> splitter ...
        assert_eq!(l.supply_components(&m).len(), 7);
        assert_eq!(l.supply_components(&m)[1], pump.id());
        assert_eq!(pump.plant_loop(&m), Some(l));

        assert!(!pump.add_to_node(&mut m, inlet));
        assert!(pump.remove_from_loop(&mut m));
        assert_eq!(l.supply_components(&m).len(), 5);
        assert!(!m.is_connected(pump.id()));
    }

    #[test]
    fn add_to_outlet_node_goes_in_front() {
        let mut m = Model::new();
        let l = PlantLoop::new(&mut m);
        let pipe = PlantEquipment::new(&mut m, PlantEquipmentKind::Pipe);
        let outlet = l.supply_outlet_node(&m).unwrap();
        assert!(pipe.add_to_node(&mut m, outlet));
        let comps = l.supply_components(&m);
        assert_eq!(comps[comps.len() - 2], pipe.id());
        assert_eq!(comps.last(), Some(&outlet.id()));
    }
}
