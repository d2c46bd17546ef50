//! Plant equipment operation schemes.
//!
//! A loop with authored schemes is written as authored. A loop without any
//! gets synthesized defaults: supply equipment is classified by what it
//! does to the loop, heating, cooling and uncontrolled lists are built from
//! that, and equipment with a managed setpoint on its outlet node goes into
//! a component setpoint scheme.

use std::collections::HashSet;

use os_core::{Handle, ObjectId};
use os_idf::{RecordType, Value};
use os_model::{
    Model, Node, ObjectType, OperationScheme, OperationSchemeKind, PlantEquipment,
    PlantEquipmentKind, PlantLoop, Schedule,
};
use tracing::debug;

use super::Context;
use crate::error::{TranslateError, TranslateResult};

/// Range written into every synthesized load scheme, in watts.
const DEFAULT_LOAD_RANGE: (f64, f64) = (0.0, 1.0e9);

/// What a supply component does to its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Heating,
    Cooling,
    Both,
    None,
}

/// Classify a supply-side component. Anything that is not plant
/// equipment is [`ComponentType::None`].
pub fn component_type(model: &Model, comp: ObjectId) -> ComponentType {
    component_type_guarded(model, comp, &mut Vec::new())
}

/// Heating if the loop's supply side only heats, cooling if it only cools,
/// none if it does neither, both otherwise.
pub fn plant_loop_type(model: &Model, lp: PlantLoop) -> ComponentType {
    plant_loop_type_guarded(model, lp, &mut Vec::new())
}

// Water heaters and heat exchangers classify through the loop on their
// other side; `visiting` stops a pair of loops from recursing forever.
fn plant_loop_type_guarded(model: &Model, lp: PlantLoop, visiting: &mut Vec<ObjectId>) -> ComponentType {
    if visiting.contains(&lp.id()) {
        return ComponentType::None;
    }
    visiting.push(lp.id());
    let mut heating = false;
    let mut cooling = false;
    for comp in lp.supply_components(model) {
        match component_type_guarded(model, comp, visiting) {
            ComponentType::Heating => heating = true,
            ComponentType::Cooling => cooling = true,
            ComponentType::Both | ComponentType::None => {}
        }
    }
    visiting.pop();
    match (heating, cooling) {
        (false, false) => ComponentType::None,
        (true, false) => ComponentType::Heating,
        (false, true) => ComponentType::Cooling,
        (true, true) => ComponentType::Both,
    }
}

fn secondary_loop_type(model: &Model, eq: PlantEquipment, visiting: &mut Vec<ObjectId>) -> Option<ComponentType> {
    eq.secondary_plant_loop(model)
        .map(|lp| plant_loop_type_guarded(model, lp, visiting))
}

fn component_type_guarded(model: &Model, comp: ObjectId, visiting: &mut Vec<ObjectId>) -> ComponentType {
    let Some(eq) = PlantEquipment::from_id(model, comp) else {
        return ComponentType::None;
    };
    let Some(kind) = eq.kind(model) else {
        return ComponentType::None;
    };
    match kind {
        PlantEquipmentKind::Boiler
        | PlantEquipmentKind::DistrictHeating
        | PlantEquipmentKind::SolarCollector
        | PlantEquipmentKind::HeatPumpWaterToWaterHeating
        | PlantEquipmentKind::MicroTurbineHeatRecovery => ComponentType::Heating,
        PlantEquipmentKind::ChillerElectricEir
        | PlantEquipmentKind::ChillerAbsorption
        | PlantEquipmentKind::ThermalStorageChilledWater
        | PlantEquipmentKind::DistrictCooling
        | PlantEquipmentKind::CoolingTowerSingleSpeed
        | PlantEquipmentKind::FluidCooler
        | PlantEquipmentKind::HeatPumpWaterToWaterCooling => ComponentType::Cooling,
        PlantEquipmentKind::ThermalStorageIce
        | PlantEquipmentKind::GroundHeatExchangerVertical
        | PlantEquipmentKind::PlantComponentTemperatureSource
        | PlantEquipmentKind::PlantComponentUserDefined => ComponentType::Both,
        PlantEquipmentKind::HeatExchangerFluidToFluid => {
            let control = eq.control_type(model).unwrap_or_default();
            if control.starts_with("HeatingSetpoint") {
                ComponentType::Heating
            } else if control.starts_with("CoolingSetpoint")
                || control == "CoolingDifferentialOnOff"
            {
                ComponentType::Cooling
            } else if control.starts_with("DualDeadband") {
                ComponentType::Both
            } else if control == "UncontrolledOn" {
                secondary_loop_type(model, eq, visiting).unwrap_or(ComponentType::None)
            } else {
                ComponentType::Both
            }
        }
        PlantEquipmentKind::WaterHeaterMixed => match eq.capacity(model) {
            Some(c) if c == 0.0 => {
                if let Some(t) = secondary_loop_type(model, eq, visiting) {
                    t
                } else if eq.containing_zone_hvac_component(model).is_some() {
                    ComponentType::Heating
                } else {
                    ComponentType::None
                }
            }
            _ => ComponentType::Heating,
        },
        PlantEquipmentKind::Pump | PlantEquipmentKind::Pipe => ComponentType::None,
    }
}

/// Supply equipment of `lp`, skipping nodes and connectors.
fn supply_equipment(model: &Model, lp: PlantLoop) -> Vec<ObjectId> {
    lp.supply_components_between(model, None, None, Some(ObjectType::PlantEquipment))
}

pub fn heating_components(model: &Model, lp: PlantLoop) -> Vec<ObjectId> {
    supply_equipment(model, lp)
        .into_iter()
        .filter(|c| component_type(model, *c) == ComponentType::Heating)
        .collect()
}

pub fn cooling_components(model: &Model, lp: PlantLoop) -> Vec<ObjectId> {
    supply_equipment(model, lp)
        .into_iter()
        .filter(|c| component_type(model, *c) == ComponentType::Cooling)
        .collect()
}

/// Equipment that serves either mode and is not already controlled
/// through a setpoint.
pub fn uncontrolled_components(model: &Model, lp: PlantLoop) -> Vec<ObjectId> {
    supply_equipment(model, lp)
        .into_iter()
        .filter(|c| {
            component_type(model, *c) == ComponentType::Both && !is_setpoint_component(model, lp, *c)
        })
        .collect()
}

pub fn setpoint_components(model: &Model, lp: PlantLoop) -> Vec<ObjectId> {
    supply_equipment(model, lp)
        .into_iter()
        .filter(|c| is_setpoint_component(model, lp, *c))
        .collect()
}

/// The first node downstream of `comp` is not the supply outlet and has a
/// setpoint manager.
pub fn is_setpoint_component(model: &Model, lp: PlantLoop, comp: ObjectId) -> bool {
    let Some(outlet) = lp.supply_outlet_node(model) else {
        return false;
    };
    lp.supply_components_between(model, Some(comp), None, Some(ObjectType::Node))
        .first()
        .and_then(|n| Node::from_id(model, *n))
        .is_some_and(|n| n != outlet && !n.setpoint_managers(model).is_empty())
}

/// Object an operation scheme names for `comp`: the wrapping zone
/// component of a water heater tank, otherwise `comp` itself.
pub fn operation_scheme_component(model: &Model, comp: ObjectId) -> ObjectId {
    PlantEquipment::from_id(model, comp)
        .and_then(|e| e.containing_zone_hvac_component(model))
        .map_or(comp, |hpwh| hpwh.id())
}

/// Node feeding `comp` on the supply side.
pub fn inlet_node(model: &Model, lp: PlantLoop, comp: ObjectId) -> Option<ObjectId> {
    let path = lp.supply_components_between(model, None, Some(comp), None);
    let node = *path.len().checked_sub(2).and_then(|i| path.get(i))?;
    model.is_type(node, ObjectType::Node).then_some(node)
}

/// Node fed by `comp` on the supply side.
pub fn outlet_node(model: &Model, lp: PlantLoop, comp: ObjectId) -> Option<ObjectId> {
    let path = lp.supply_components_between(model, Some(comp), None, None);
    let node = *path.get(1)?;
    model.is_type(node, ObjectType::Node).then_some(node)
}

/// Design flow written into a component setpoint row; `None` is autosized.
/// District plants, ice storage, user-defined components and wrapped tanks
/// never report one.
pub fn flow_rate(model: &Model, comp: ObjectId) -> Option<f64> {
    let eq = PlantEquipment::from_id(model, comp)?;
    if eq.containing_zone_hvac_component(model).is_some() {
        return None;
    }
    match eq.kind(model)? {
        PlantEquipmentKind::DistrictHeating
        | PlantEquipmentKind::DistrictCooling
        | PlantEquipmentKind::ThermalStorageIce
        | PlantEquipmentKind::PlantComponentUserDefined => None,
        _ => eq.design_flow_rate(model),
    }
}

/// Append one `(type, name)` row per component, naming each through
/// [`operation_scheme_component`].
fn push_equipment_rows(cx: &mut Context<'_>, list: Handle, comps: &[ObjectId]) -> TranslateResult<()> {
    let mut seen = HashSet::new();
    for comp in comps {
        let target = operation_scheme_component(cx.model, *comp);
        let Some((keyword, name)) = cx.translate(target).and_then(|h| cx.record_ref(h)) else {
            continue;
        };
        if seen.insert((keyword, name.clone())) {
            cx.push(list, vec![Value::text(keyword), Value::text(name)])?;
        }
    }
    Ok(())
}

fn scheme_keyword(kind: OperationSchemeKind) -> RecordType {
    match kind {
        OperationSchemeKind::HeatingLoad => RecordType::PlantEquipmentOperationHeatingLoad,
        OperationSchemeKind::CoolingLoad => RecordType::PlantEquipmentOperationCoolingLoad,
        OperationSchemeKind::Uncontrolled => RecordType::PlantEquipmentOperationUncontrolled,
    }
}

/// An authored scheme with one equipment list per load range.
pub(crate) fn translate_authored_scheme(
    cx: &mut Context<'_>,
    scheme: OperationScheme,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let Some(kind) = scheme.kind(model) else {
        return Ok(None);
    };
    let name = cx.name_of(scheme.id());
    let ranges = scheme.load_ranges(model);

    let h = cx.new_record(scheme_keyword(kind), &name)?;
    match kind {
        OperationSchemeKind::HeatingLoad | OperationSchemeKind::CoolingLoad => {
            for (i, range) in ranges.iter().enumerate() {
                let list_name = format!("{name} Equipment List {}", i + 1);
                let list = cx.new_record(RecordType::PlantEquipmentList, &list_name)?;
                push_equipment_rows(cx, list, &range.equipment)?;
                cx.push(
                    h,
                    vec![
                        Value::Real(range.lower),
                        Value::Real(range.upper),
                        Value::text(list_name),
                    ],
                )?;
            }
        }
        OperationSchemeKind::Uncontrolled => {
            let list_name = format!("{name} Equipment List");
            let list = cx.new_record(RecordType::PlantEquipmentList, &list_name)?;
            let equipment: Vec<ObjectId> = ranges.into_iter().flat_map(|r| r.equipment).collect();
            push_equipment_rows(cx, list, &equipment)?;
            cx.set_text(h, "Equipment List Name", &list_name)?;
        }
    }
    Ok(Some(h))
}

/// Add a `(type, name, schedule)` row to the loop's scheme list.
fn push_scheme_row(
    cx: &mut Context<'_>,
    top: Handle,
    scheme: Handle,
    schedule: &str,
) -> TranslateResult<()> {
    let Some((keyword, name)) = cx.record_ref(scheme) else {
        return Ok(());
    };
    cx.push(
        top,
        vec![Value::text(keyword), Value::text(name), Value::text(schedule)],
    )
}

fn authored(
    cx: &mut Context<'_>,
    top: Handle,
    scheme: OperationScheme,
    schedule: Option<Schedule>,
) -> TranslateResult<()> {
    let schedule = cx.schedule_name(schedule)?;
    if let Some(h) = cx.translate(scheme.id()) {
        push_scheme_row(cx, top, h, &schedule)?;
    }
    Ok(())
}

/// Synthesized heating or cooling load scheme covering `comps` over the
/// whole load range.
fn default_load_scheme(
    cx: &mut Context<'_>,
    top: Handle,
    loop_name: &str,
    label: &str,
    kind: OperationSchemeKind,
    comps: &[ObjectId],
) -> TranslateResult<()> {
    let list_name = format!("{loop_name} {label} Equipment List");
    let list = cx.new_record(RecordType::PlantEquipmentList, &list_name)?;
    push_equipment_rows(cx, list, comps)?;

    let scheme = cx.new_record(scheme_keyword(kind), &format!("{loop_name} {label} Operation Scheme"))?;
    let (lower, upper) = DEFAULT_LOAD_RANGE;
    cx.push(
        scheme,
        vec![Value::Real(lower), Value::Real(upper), Value::text(list_name)],
    )?;
    let always_on = cx.always_on()?;
    push_scheme_row(cx, top, scheme, &always_on)
}

fn default_uncontrolled_scheme(
    cx: &mut Context<'_>,
    top: Handle,
    loop_name: &str,
    comps: &[ObjectId],
) -> TranslateResult<()> {
    let list_name = format!("{loop_name} Uncontrolled Equipment List");
    let list = cx.new_record(RecordType::PlantEquipmentList, &list_name)?;
    push_equipment_rows(cx, list, comps)?;

    let scheme = cx.new_record(
        RecordType::PlantEquipmentOperationUncontrolled,
        &format!("{loop_name} Uncontrolled Operation Scheme"),
    )?;
    cx.set_text(scheme, "Equipment List Name", &list_name)?;
    let always_on = cx.always_on()?;
    push_scheme_row(cx, top, scheme, &always_on)
}

/// One row per setpoint component: its demand calculation and setpoint
/// nodes, flow rate and operation type.
fn setpoint_scheme(
    cx: &mut Context<'_>,
    top: Handle,
    lp: PlantLoop,
    loop_name: &str,
    comps: &[ObjectId],
) -> TranslateResult<()> {
    let model = cx.model;
    let scheme = cx.new_record(
        RecordType::PlantEquipmentOperationComponentSetpoint,
        &format!("{loop_name} Setpoint Operation Scheme"),
    )?;
    for comp in comps {
        let target = operation_scheme_component(model, *comp);
        let Some((keyword, name)) = cx.translate(target).and_then(|h| cx.record_ref(h)) else {
            continue;
        };
        // a supply component always sits between two nodes
        let incomplete = |what| TranslateError::Incomplete {
            object: cx.name_of(*comp),
            what,
        };
        let demand_node = inlet_node(model, lp, *comp).ok_or_else(|| incomplete("inlet node"))?;
        let setpoint_node = outlet_node(model, lp, *comp).ok_or_else(|| incomplete("outlet node"))?;
        let (demand_node, setpoint_node) = (cx.name_of(demand_node), cx.name_of(setpoint_node));
        let flow = flow_rate(model, *comp).map_or(Value::Autosize, Value::Real);
        let operation = match component_type(model, *comp) {
            ComponentType::Heating => "Heating",
            ComponentType::Cooling => "Cooling",
            ComponentType::Both | ComponentType::None => "Dual",
        };
        cx.push(
            scheme,
            vec![
                Value::text(keyword),
                Value::text(name),
                Value::text(demand_node),
                Value::text(setpoint_node),
                flow,
                Value::text(operation),
            ],
        )?;
    }
    let schedule = cx.schedule_name(lp.component_setpoint_operation_scheme_schedule(model))?;
    push_scheme_row(cx, top, scheme, &schedule)
}

/// Write `PlantEquipmentOperationSchemes` for `lp` and everything it
/// references. Returns the record's name.
pub(crate) fn translate_plant_schemes(cx: &mut Context<'_>, lp: PlantLoop) -> TranslateResult<String> {
    let model = cx.model;
    let loop_name = cx.name_of(lp.id());
    let top_name = format!("{loop_name} Operation Schemes");
    let top = cx.new_record(RecordType::PlantEquipmentOperationSchemes, &top_name)?;

    let mut apply_default = true;
    if let Some(s) = lp.plant_equipment_operation_cooling_load(model) {
        authored(cx, top, s, lp.plant_equipment_operation_cooling_load_schedule(model))?;
        apply_default = false;
    }
    if let Some(s) = lp.plant_equipment_operation_heating_load(model) {
        authored(cx, top, s, lp.plant_equipment_operation_heating_load_schedule(model))?;
        apply_default = false;
    }
    if let Some(s) = lp.primary_plant_equipment_operation_scheme(model) {
        authored(cx, top, s, lp.primary_plant_equipment_operation_scheme_schedule(model))?;
        apply_default = false;
        let setpoint = setpoint_components(model, lp);
        if !setpoint.is_empty() {
            setpoint_scheme(cx, top, lp, &loop_name, &setpoint)?;
        }
    }

    if apply_default {
        let heating = heating_components(model, lp);
        let cooling = cooling_components(model, lp);
        let uncontrolled = uncontrolled_components(model, lp);
        let setpoint = setpoint_components(model, lp);
        debug!(
            plant_loop = %loop_name,
            heating = heating.len(),
            cooling = cooling.len(),
            uncontrolled = uncontrolled.len(),
            setpoint = setpoint.len(),
            "default operation schemes"
        );
        if !heating.is_empty() {
            default_load_scheme(
                cx,
                top,
                &loop_name,
                "Heating",
                OperationSchemeKind::HeatingLoad,
                &heating,
            )?;
        }
        if !cooling.is_empty() {
            default_load_scheme(
                cx,
                top,
                &loop_name,
                "Cooling",
                OperationSchemeKind::CoolingLoad,
                &cooling,
            )?;
        }
        if !uncontrolled.is_empty() {
            default_uncontrolled_scheme(cx, top, &loop_name, &uncontrolled)?;
        }
        if !setpoint.is_empty() {
            setpoint_scheme(cx, top, lp, &loop_name, &setpoint)?;
        }
    }
    Ok(top_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use os_model::{GeneratorMicroTurbine, WaterHeaterHeatPump};

    fn on_supply(model: &mut Model, lp: PlantLoop, kind: PlantEquipmentKind) -> PlantEquipment {
        let eq = PlantEquipment::new(model, kind);
        assert!(lp.add_supply_branch_for_component(model, eq));
        eq
    }

    #[test]
    fn fixed_kinds_classify() {
        let mut m = Model::new();
        let lp = PlantLoop::new(&mut m);
        let boiler = on_supply(&mut m, lp, PlantEquipmentKind::Boiler);
        let tower = on_supply(&mut m, lp, PlantEquipmentKind::CoolingTowerSingleSpeed);
        let ground = on_supply(&mut m, lp, PlantEquipmentKind::GroundHeatExchangerVertical);
        let pipe = on_supply(&mut m, lp, PlantEquipmentKind::Pipe);

        assert_eq!(component_type(&m, boiler.id()), ComponentType::Heating);
        assert_eq!(component_type(&m, tower.id()), ComponentType::Cooling);
        assert_eq!(component_type(&m, ground.id()), ComponentType::Both);
        assert_eq!(component_type(&m, pipe.id()), ComponentType::None);
        assert_eq!(plant_loop_type(&m, lp), ComponentType::Both);
    }

    #[test]
    fn heat_exchanger_follows_control_type() {
        let mut m = Model::new();
        let lp = PlantLoop::new(&mut m);
        let hx = on_supply(&mut m, lp, PlantEquipmentKind::HeatExchangerFluidToFluid);

        // uncontrolled with nothing on the other side
        assert_eq!(component_type(&m, hx.id()), ComponentType::None);

        let source = PlantLoop::new(&mut m);
        assert!(source.add_demand_branch_for_component(&mut m, hx));
        on_supply(&mut m, source, PlantEquipmentKind::DistrictCooling);
        assert_eq!(component_type(&m, hx.id()), ComponentType::Cooling);

        assert!(hx.set_control_type(&mut m, "HeatingSetpointModulated"));
        assert_eq!(component_type(&m, hx.id()), ComponentType::Heating);
        assert!(hx.set_control_type(&mut m, "CoolingSetpointOnOffWithComponentOverride"));
        assert_eq!(component_type(&m, hx.id()), ComponentType::Cooling);
        assert!(hx.set_control_type(&mut m, "DualDeadbandSetpointOnOff"));
        assert_eq!(component_type(&m, hx.id()), ComponentType::Both);
        assert!(hx.set_control_type(&mut m, "OperationSchemeOnOff"));
        assert_eq!(component_type(&m, hx.id()), ComponentType::Both);
    }

    #[test]
    fn water_heater_without_capacity() {
        let mut m = Model::new();
        let lp = PlantLoop::new(&mut m);
        let tank = on_supply(&mut m, lp, PlantEquipmentKind::WaterHeaterMixed);
        assert_eq!(component_type(&m, tank.id()), ComponentType::Heating);

        assert!(tank.set_capacity(&mut m, 0.0));
        assert_eq!(component_type(&m, tank.id()), ComponentType::None);

        let source = PlantLoop::new(&mut m);
        assert!(source.add_demand_branch_for_component(&mut m, tank));
        on_supply(&mut m, source, PlantEquipmentKind::Boiler);
        assert_eq!(component_type(&m, tank.id()), ComponentType::Heating);
    }

    #[test]
    fn wrapped_tank_is_named_by_its_container() {
        let mut m = Model::new();
        let lp = PlantLoop::new(&mut m);
        let tank = on_supply(&mut m, lp, PlantEquipmentKind::WaterHeaterMixed);
        assert!(tank.set_capacity(&mut m, 0.0));
        let hpwh = WaterHeaterHeatPump::new(&mut m, tank).unwrap();

        assert_eq!(component_type(&m, tank.id()), ComponentType::Heating);
        assert_eq!(operation_scheme_component(&m, tank.id()), hpwh.id());
        assert_eq!(flow_rate(&m, tank.id()), None);
        assert_eq!(heating_components(&m, lp), vec![tank.id()]);
    }

    #[test]
    fn looped_heat_exchangers_do_not_recurse() {
        let mut m = Model::new();
        let a = PlantLoop::new(&mut m);
        let b = PlantLoop::new(&mut m);
        let hx_a = on_supply(&mut m, a, PlantEquipmentKind::HeatExchangerFluidToFluid);
        let hx_b = on_supply(&mut m, b, PlantEquipmentKind::HeatExchangerFluidToFluid);
        assert!(b.add_demand_branch_for_component(&mut m, hx_a));
        assert!(a.add_demand_branch_for_component(&mut m, hx_b));
        assert_eq!(component_type(&m, hx_a.id()), ComponentType::None);
        assert_eq!(plant_loop_type(&m, a), ComponentType::None);
    }

    #[test]
    fn heat_recovery_reports_a_flow_and_heats() {
        let mut m = Model::new();
        let lp = PlantLoop::new(&mut m);
        let generator = GeneratorMicroTurbine::new(&mut m);
        let hr = generator.create_heat_recovery(&mut m);
        assert!(lp.add_supply_branch_for_component(&mut m, hr));
        assert!(hr.set_design_flow_rate(&mut m, 0.002));
        assert_eq!(component_type(&m, hr.id()), ComponentType::Heating);
        assert_eq!(flow_rate(&m, hr.id()), Some(0.002));
    }

    #[test]
    fn component_nodes_bracket_the_component() {
        let mut m = Model::new();
        let lp = PlantLoop::new(&mut m);
        let boiler = on_supply(&mut m, lp, PlantEquipmentKind::Boiler);
        let inlet = inlet_node(&m, lp, boiler.id()).unwrap();
        let outlet = outlet_node(&m, lp, boiler.id()).unwrap();
        assert_eq!(m.outlet_object(inlet, 0), Some(boiler.id()));
        assert_eq!(m.inlet_object(outlet, 0), Some(boiler.id()));
        assert!(!is_setpoint_component(&m, lp, boiler.id()));
    }
}
