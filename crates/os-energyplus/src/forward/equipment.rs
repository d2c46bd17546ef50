//! Plant equipment records.
//!
//! Port pair 0 maps to the supply, use or load side nodes of a record and
//! pair 1 to its condenser, source or loop-demand side nodes.

use os_core::Handle;
use os_idf::{RecordType, Value};
use os_model::{GeneratorMicroTurbine, PlantEquipment, PlantEquipmentKind, WaterHeaterHeatPump};

use super::Context;
use crate::error::TranslateResult;

const DEFAULT_FUEL: &str = "NaturalGas";
const DEFAULT_BOILER_EFFICIENCY: f64 = 0.8;
const DEFAULT_CHILLER_COP: f64 = 5.5;
const DEFAULT_PUMP_HEAD: f64 = 179_352.0;
const DEFAULT_SOURCE_TEMPERATURE: f64 = 10.0;
const DEFAULT_TANK_MAXIMUM_TEMPERATURE: f64 = 82.2;

/// Write the inlet and outlet node names of one port pair.
fn set_pair(
    cx: &mut Context<'_>,
    h: Handle,
    eq: PlantEquipment,
    pair: u32,
    inlet_field: &str,
    outlet_field: &str,
) -> TranslateResult<()> {
    let inlet = cx.inlet_name(eq.id(), pair);
    let outlet = cx.outlet_name(eq.id(), pair);
    cx.set_text(h, inlet_field, &inlet)?;
    cx.set_text(h, outlet_field, &outlet)
}

pub(crate) fn translate_plant_equipment(
    cx: &mut Context<'_>,
    eq: PlantEquipment,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let Some(kind) = eq.kind(model) else {
        return Ok(None);
    };
    let name = cx.name_of(eq.id());
    let flow = eq.design_flow_rate(model);
    let capacity = eq.capacity(model);

    let h = match kind {
        PlantEquipmentKind::Boiler => {
            let h = cx.new_record(RecordType::BoilerHotWater, &name)?;
            cx.set_text(h, "Fuel Type", DEFAULT_FUEL)?;
            cx.set_sizable(h, "Nominal Capacity", capacity)?;
            cx.set(h, "Nominal Thermal Efficiency", Value::Real(DEFAULT_BOILER_EFFICIENCY))?;
            cx.set_sizable(h, "Design Water Flow Rate", flow)?;
            set_pair(cx, h, eq, 0, "Boiler Water Inlet Node Name", "Boiler Water Outlet Node Name")?;
            h
        }
        PlantEquipmentKind::DistrictHeating => {
            let h = cx.new_record(RecordType::DistrictHeating, &name)?;
            set_pair(cx, h, eq, 0, "Hot Water Inlet Node Name", "Hot Water Outlet Node Name")?;
            cx.set_sizable(h, "Nominal Capacity", capacity)?;
            h
        }
        PlantEquipmentKind::DistrictCooling => {
            let h = cx.new_record(RecordType::DistrictCooling, &name)?;
            set_pair(
                cx,
                h,
                eq,
                0,
                "Chilled Water Inlet Node Name",
                "Chilled Water Outlet Node Name",
            )?;
            cx.set_sizable(h, "Nominal Capacity", capacity)?;
            h
        }
        PlantEquipmentKind::ChillerElectricEir => {
            let h = cx.new_record(RecordType::ChillerElectricEir, &name)?;
            cx.set_sizable(h, "Reference Capacity", capacity)?;
            cx.set(h, "Reference COP", Value::Real(DEFAULT_CHILLER_COP))?;
            cx.set_sizable(h, "Reference Chilled Water Flow Rate", flow)?;
            set_pair(
                cx,
                h,
                eq,
                0,
                "Chilled Water Inlet Node Name",
                "Chilled Water Outlet Node Name",
            )?;
            set_pair(cx, h, eq, 1, "Condenser Inlet Node Name", "Condenser Outlet Node Name")?;
            h
        }
        PlantEquipmentKind::ChillerAbsorption => {
            let h = cx.new_record(RecordType::ChillerAbsorption, &name)?;
            cx.set_sizable(h, "Nominal Capacity", capacity)?;
            cx.set_sizable(h, "Design Chilled Water Flow Rate", flow)?;
            set_pair(
                cx,
                h,
                eq,
                0,
                "Chilled Water Inlet Node Name",
                "Chilled Water Outlet Node Name",
            )?;
            set_pair(cx, h, eq, 1, "Condenser Inlet Node Name", "Condenser Outlet Node Name")?;
            h
        }
        PlantEquipmentKind::CoolingTowerSingleSpeed => {
            let h = cx.new_record(RecordType::CoolingTowerSingleSpeed, &name)?;
            set_pair(cx, h, eq, 0, "Water Inlet Node Name", "Water Outlet Node Name")?;
            cx.set_sizable(h, "Design Water Flow Rate", flow)?;
            cx.set(h, "Design Air Flow Rate", Value::Autosize)?;
            h
        }
        PlantEquipmentKind::FluidCooler => {
            let h = cx.new_record(RecordType::FluidCoolerSingleSpeed, &name)?;
            set_pair(cx, h, eq, 0, "Water Inlet Node Name", "Water Outlet Node Name")?;
            cx.set_sizable(h, "Design Water Flow Rate", flow)?;
            h
        }
        PlantEquipmentKind::GroundHeatExchangerVertical => {
            let h = cx.new_record(RecordType::GroundHeatExchangerSystem, &name)?;
            set_pair(cx, h, eq, 0, "Inlet Node Name", "Outlet Node Name")?;
            if let Some(flow) = flow {
                cx.set(h, "Design Flow Rate", Value::Real(flow))?;
            }
            h
        }
        PlantEquipmentKind::HeatExchangerFluidToFluid => {
            let h = cx.new_record(RecordType::HeatExchangerFluidToFluid, &name)?;
            let always_on = cx.always_on()?;
            cx.set_text(h, "Availability Schedule Name", &always_on)?;
            set_pair(
                cx,
                h,
                eq,
                1,
                "Loop Demand Side Inlet Node Name",
                "Loop Demand Side Outlet Node Name",
            )?;
            cx.set(h, "Loop Demand Side Design Flow Rate", Value::Autosize)?;
            set_pair(
                cx,
                h,
                eq,
                0,
                "Loop Supply Side Inlet Node Name",
                "Loop Supply Side Outlet Node Name",
            )?;
            cx.set_sizable(h, "Loop Supply Side Design Flow Rate", flow)?;
            cx.set_text(h, "Heat Exchange Model Type", "Ideal")?;
            cx.set(h, "Heat Exchanger U-Factor Times Area Value", Value::Autosize)?;
            let control = eq.control_type(model).unwrap_or("UncontrolledOn").to_string();
            cx.set_text(h, "Control Type", &control)?;
            h
        }
        PlantEquipmentKind::ThermalStorageIce => {
            let h = cx.new_record(RecordType::ThermalStorageIceDetailed, &name)?;
            let always_on = cx.always_on()?;
            cx.set_text(h, "Availability Schedule Name", &always_on)?;
            set_pair(cx, h, eq, 0, "Inlet Node Name", "Outlet Node Name")?;
            h
        }
        PlantEquipmentKind::ThermalStorageChilledWater => {
            let h = cx.new_record(RecordType::ThermalStorageChilledWaterStratified, &name)?;
            set_pair(cx, h, eq, 0, "Use Side Inlet Node Name", "Use Side Outlet Node Name")?;
            cx.set_sizable(h, "Use Side Design Flow Rate", flow)?;
            set_pair(cx, h, eq, 1, "Source Side Inlet Node Name", "Source Side Outlet Node Name")?;
            cx.set(h, "Source Side Design Flow Rate", Value::Autosize)?;
            h
        }
        PlantEquipmentKind::SolarCollector => {
            let h = cx.new_record(RecordType::SolarCollectorFlatPlateWater, &name)?;
            set_pair(cx, h, eq, 0, "Inlet Node Name", "Outlet Node Name")?;
            if let Some(flow) = flow {
                cx.set(h, "Maximum Flow Rate", Value::Real(flow))?;
            }
            h
        }
        PlantEquipmentKind::HeatPumpWaterToWaterHeating
        | PlantEquipmentKind::HeatPumpWaterToWaterCooling => {
            let (ty, capacity_field) = if kind == PlantEquipmentKind::HeatPumpWaterToWaterHeating {
                (
                    RecordType::HeatPumpWaterToWaterEquationFitHeating,
                    "Reference Heating Capacity",
                )
            } else {
                (
                    RecordType::HeatPumpWaterToWaterEquationFitCooling,
                    "Reference Cooling Capacity",
                )
            };
            let h = cx.new_record(ty, &name)?;
            set_pair(cx, h, eq, 1, "Source Side Inlet Node Name", "Source Side Outlet Node Name")?;
            set_pair(cx, h, eq, 0, "Load Side Inlet Node Name", "Load Side Outlet Node Name")?;
            cx.set_sizable(h, "Reference Load Side Flow Rate", flow)?;
            cx.set(h, "Reference Source Side Flow Rate", Value::Autosize)?;
            cx.set_sizable(h, capacity_field, capacity)?;
            h
        }
        PlantEquipmentKind::WaterHeaterMixed => {
            let h = cx.new_record(RecordType::WaterHeaterMixed, &name)?;
            cx.set(h, "Tank Volume", Value::Autosize)?;
            cx.set(
                h,
                "Maximum Temperature Limit",
                Value::Real(DEFAULT_TANK_MAXIMUM_TEMPERATURE),
            )?;
            cx.set_text(h, "Heater Control Type", "Cycle")?;
            cx.set_sizable(h, "Heater Maximum Capacity", capacity)?;
            cx.set_text(h, "Heater Fuel Type", DEFAULT_FUEL)?;
            cx.set(h, "Heater Thermal Efficiency", Value::Real(DEFAULT_BOILER_EFFICIENCY))?;
            set_pair(cx, h, eq, 0, "Use Side Inlet Node Name", "Use Side Outlet Node Name")?;
            cx.set_sizable(h, "Use Side Design Flow Rate", flow)?;
            set_pair(cx, h, eq, 1, "Source Side Inlet Node Name", "Source Side Outlet Node Name")?;
            cx.set(h, "Source Side Design Flow Rate", Value::Autosize)?;
            h
        }
        PlantEquipmentKind::MicroTurbineHeatRecovery => {
            // the heat recovery loop connection lives on the generator record
            return match eq.generator(model) {
                Some(generator) => Ok(cx.translate(generator.id())),
                None => {
                    cx.warn(Some(eq.id()), "heat recovery module has no generator; skipped");
                    Ok(None)
                }
            };
        }
        PlantEquipmentKind::PlantComponentTemperatureSource => {
            let h = cx.new_record(RecordType::PlantComponentTemperatureSource, &name)?;
            set_pair(cx, h, eq, 0, "Inlet Node", "Outlet Node")?;
            cx.set_sizable(h, "Design Volume Flow Rate", flow)?;
            cx.set_text(h, "Temperature Specification Type", "Constant")?;
            cx.set(h, "Source Temperature", Value::Real(DEFAULT_SOURCE_TEMPERATURE))?;
            h
        }
        PlantEquipmentKind::PlantComponentUserDefined => {
            let h = cx.new_record(RecordType::PlantComponentUserDefined, &name)?;
            cx.set(h, "Number of Plant Loop Connections", Value::Integer(1))?;
            set_pair(
                cx,
                h,
                eq,
                0,
                "Plant Connection 1 Inlet Node Name",
                "Plant Connection 1 Outlet Node Name",
            )?;
            h
        }
        PlantEquipmentKind::Pump => {
            let h = cx.new_record(RecordType::PumpVariableSpeed, &name)?;
            set_pair(cx, h, eq, 0, "Inlet Node Name", "Outlet Node Name")?;
            cx.set_sizable(h, "Design Maximum Flow Rate", flow)?;
            cx.set(h, "Design Pump Head", Value::Real(DEFAULT_PUMP_HEAD))?;
            cx.set(h, "Design Power Consumption", Value::Autosize)?;
            h
        }
        PlantEquipmentKind::Pipe => {
            let h = cx.new_record(RecordType::PipeAdiabatic, &name)?;
            set_pair(cx, h, eq, 0, "Inlet Node Name", "Outlet Node Name")?;
            h
        }
    };
    Ok(Some(h))
}

/// The generator record also carries its heat recovery module's plant
/// connection.
pub(crate) fn translate_generator(
    cx: &mut Context<'_>,
    generator: GeneratorMicroTurbine,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let name = cx.name_of(generator.id());
    let h = cx.new_record(RecordType::GeneratorMicroTurbine, &name)?;
    if let Some(output) = generator.reference_electrical_power_output(model) {
        cx.set(h, "Reference Electrical Power Output", Value::Real(output))?;
    }
    cx.set_text(h, "Fuel Type", DEFAULT_FUEL)?;
    if let Some(hr) = generator.heat_recovery(model) {
        set_pair(
            cx,
            h,
            hr,
            0,
            "Heat Recovery Water Inlet Node Name",
            "Heat Recovery Water Outlet Node Name",
        )?;
        if let Some(flow) = hr.design_flow_rate(model) {
            cx.set(h, "Reference Heat Recovery Water Flow Rate", Value::Real(flow))?;
        }
    }
    Ok(Some(h))
}

pub(crate) fn translate_heat_pump_water_heater(
    cx: &mut Context<'_>,
    hpwh: WaterHeaterHeatPump,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let name = cx.name_of(hpwh.id());
    let Some(tank) = hpwh.tank(model) else {
        cx.warn(Some(hpwh.id()), "heat pump water heater has no tank; skipped");
        return Ok(None);
    };
    let tank_name = cx
        .translate(tank.id())
        .and_then(|t| cx.record_ref(t))
        .map(|(_, n)| n)
        .unwrap_or_else(|| cx.name_of(tank.id()));

    let h = cx.new_record(RecordType::WaterHeaterHeatPumpPumpedCondenser, &name)?;
    let always_on = cx.always_on()?;
    cx.set_text(h, "Availability Schedule Name", &always_on)?;
    cx.set(h, "Condenser Water Flow Rate", Value::Autosize)?;
    cx.set(h, "Evaporator Air Flow Rate", Value::Autosize)?;
    let inlet_air = if hpwh.thermal_zone(model).is_some() {
        "ZoneAirOnly"
    } else {
        "OutdoorAirOnly"
    };
    cx.set_text(h, "Inlet Air Configuration", inlet_air)?;
    cx.set_text(h, "Tank Object Type", RecordType::WaterHeaterMixed.keyword())?;
    cx.set_text(h, "Tank Name", &tank_name)?;
    set_pair(
        cx,
        h,
        tank,
        0,
        "Tank Use Side Inlet Node Name",
        "Tank Use Side Outlet Node Name",
    )?;
    Ok(Some(h))
}
