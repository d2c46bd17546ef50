//! Air loops: the loop record, supply and return paths, zone splitter and
//! mixer, plenums and air terminals.

use os_core::{Handle, ObjectId};
use os_idf::{RecordType, Value};
use os_model::{
    AirLoopHVAC, AirTerminal, AirTerminalKind, Mixer, ReturnPlenum, Splitter, SupplyPlenum,
};

use super::{zone_air_node_name, Context};
use crate::error::{TranslateError, TranslateResult};

/// Node name an air path writes for `id`. A direct-air terminal has no
/// inlet node, so its outlet node stands in for it.
fn path_node_name(cx: &Context<'_>, id: ObjectId) -> String {
    match AirTerminal::from_id(cx.model, id) {
        Some(t) if t.is_direct_air(cx.model) => cx.outlet_name(id, 0),
        _ => cx.name_of(id),
    }
}

pub(crate) fn translate_air_loop(
    cx: &mut Context<'_>,
    lp: AirLoopHVAC,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let name = cx.name_of(lp.id());
    let incomplete = |what| TranslateError::Incomplete {
        object: name.clone(),
        what,
    };
    let supply_inlet = lp.supply_inlet_node(model).ok_or_else(|| incomplete("supply inlet node"))?;
    let supply_outlet = lp
        .supply_outlet_node(model)
        .ok_or_else(|| incomplete("supply outlet node"))?;
    let demand_inlet = lp.demand_inlet_node(model).ok_or_else(|| incomplete("demand inlet node"))?;
    let demand_outlet = lp
        .demand_outlet_node(model)
        .ok_or_else(|| incomplete("demand outlet node"))?;
    let splitter = lp.zone_splitter(model).ok_or_else(|| incomplete("zone splitter"))?;
    let mixer = lp.zone_mixer(model).ok_or_else(|| incomplete("zone mixer"))?;

    let supply_inlet_name = cx.name_of(supply_inlet.id());
    let supply_outlet_name = cx.name_of(supply_outlet.id());
    let demand_inlet_name = cx.name_of(demand_inlet.id());
    let demand_outlet_name = cx.name_of(demand_outlet.id());

    let h = cx.new_record(RecordType::AirLoopHvac, &name)?;
    cx.set_sizable(h, "Design Supply Air Flow Rate", lp.design_supply_air_flow_rate(model))?;
    cx.set_text(h, "Supply Side Inlet Node Name", &supply_inlet_name)?;
    cx.set_text(h, "Demand Side Outlet Node Name", &demand_outlet_name)?;
    cx.set_text(h, "Demand Side Inlet Node Names", &demand_inlet_name)?;
    cx.set_text(h, "Supply Side Outlet Node Names", &supply_outlet_name)?;

    // supply side equipment is out of scope; one empty main branch
    let branch_name = format!("{name} Main Branch");
    cx.new_record(RecordType::Branch, &branch_name)?;
    let branch_list = format!("{name} Supply Branches");
    let bl = cx.new_record(RecordType::BranchList, &branch_list)?;
    cx.push(bl, vec![Value::text(branch_name)])?;
    cx.set_text(h, "Branch List Name", &branch_list)?;

    let splitter_name = cx.name_of(splitter.id());
    let zs = cx.new_record(RecordType::AirLoopHvacZoneSplitter, &splitter_name)?;
    let inlet = splitter
        .inlet_object(model)
        .map(|i| cx.name_of(i))
        .unwrap_or_default();
    cx.set_text(zs, "Inlet Node Name", &inlet)?;
    for outlet in splitter.outlet_objects(model) {
        let node = path_node_name(cx, outlet);
        cx.push(zs, vec![Value::text(node)])?;
    }

    let mixer_name = cx.name_of(mixer.id());
    let zm = cx.new_record(RecordType::AirLoopHvacZoneMixer, &mixer_name)?;
    let outlet = mixer
        .outlet_object(model)
        .map(|o| cx.name_of(o))
        .unwrap_or_default();
    cx.set_text(zm, "Outlet Node Name", &outlet)?;
    for inlet in mixer.inlet_objects(model) {
        let node = cx.name_of(inlet);
        cx.push(zm, vec![Value::text(node)])?;
    }

    let supply_path = cx.new_record(RecordType::AirLoopHvacSupplyPath, &format!("{name} Supply Path"))?;
    cx.set_text(supply_path, "Supply Air Path Inlet Node Name", &demand_inlet_name)?;
    cx.push(
        supply_path,
        vec![
            Value::text(RecordType::AirLoopHvacZoneSplitter.keyword()),
            Value::text(splitter_name),
        ],
    )?;
    for plenum in lp.supply_plenums(model) {
        if let Some((keyword, plenum_name)) = cx.translate(plenum.id()).and_then(|p| cx.record_ref(p)) {
            cx.push(supply_path, vec![Value::text(keyword), Value::text(plenum_name)])?;
        }
    }

    let return_path = cx.new_record(RecordType::AirLoopHvacReturnPath, &format!("{name} Return Path"))?;
    cx.set_text(return_path, "Return Air Path Outlet Node Name", &demand_outlet_name)?;
    for plenum in lp.return_plenums(model) {
        if let Some((keyword, plenum_name)) = cx.translate(plenum.id()).and_then(|p| cx.record_ref(p)) {
            cx.push(return_path, vec![Value::text(keyword), Value::text(plenum_name)])?;
        }
    }
    cx.push(
        return_path,
        vec![
            Value::text(RecordType::AirLoopHvacZoneMixer.keyword()),
            Value::text(mixer_name),
        ],
    )?;

    for terminal in lp.air_terminals(model) {
        cx.translate(terminal.id());
    }
    Ok(Some(h))
}

/// Name of the zone backing a plenum, or a warning when it has none.
fn plenum_zone_name(cx: &mut Context<'_>, plenum: ObjectId, zone: Option<ObjectId>) -> String {
    match zone {
        Some(z) => cx.name_of(z),
        None => {
            cx.warn(Some(plenum), "plenum has no thermal zone");
            String::new()
        }
    }
}

pub(crate) fn translate_supply_plenum(
    cx: &mut Context<'_>,
    plenum: SupplyPlenum,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let name = cx.name_of(plenum.id());
    let zone = plenum_zone_name(cx, plenum.id(), plenum.thermal_zone(model).map(|z| z.id()));
    let inlet = cx.inlet_name(plenum.id(), 0);

    let h = cx.new_record(RecordType::AirLoopHvacSupplyPlenum, &name)?;
    cx.set_text(h, "Zone Name", &zone)?;
    if !zone.is_empty() {
        cx.set_text(h, "Zone Node Name", &zone_air_node_name(&zone))?;
    }
    cx.set_text(h, "Inlet Node Name", &inlet)?;
    for outlet in plenum.outlet_objects(model) {
        let node = path_node_name(cx, outlet);
        cx.push(h, vec![Value::text(node)])?;
    }
    Ok(Some(h))
}

pub(crate) fn translate_return_plenum(
    cx: &mut Context<'_>,
    plenum: ReturnPlenum,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let name = cx.name_of(plenum.id());
    let zone = plenum_zone_name(cx, plenum.id(), plenum.thermal_zone(model).map(|z| z.id()));
    let outlet = cx.outlet_name(plenum.id(), 0);

    let h = cx.new_record(RecordType::AirLoopHvacReturnPlenum, &name)?;
    cx.set_text(h, "Zone Name", &zone)?;
    if !zone.is_empty() {
        cx.set_text(h, "Zone Node Name", &zone_air_node_name(&zone))?;
    }
    cx.set_text(h, "Outlet Node Name", &outlet)?;
    for inlet in plenum.inlet_objects(model) {
        let node = cx.name_of(inlet);
        cx.push(h, vec![Value::text(node)])?;
    }
    Ok(Some(h))
}

/// A constant volume terminal comes back wrapped in its air distribution
/// unit, which is what a zone equipment list names. A direct-air terminal
/// is listed as itself.
pub(crate) fn translate_terminal(
    cx: &mut Context<'_>,
    terminal: AirTerminal,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let Some(kind) = terminal.kind(model) else {
        return Ok(None);
    };
    let name = cx.name_of(terminal.id());
    let schedule = cx.schedule_name(terminal.availability_schedule(model))?;
    let outlet = cx.outlet_name(terminal.id(), 0);
    let flow = terminal.maximum_air_flow_rate(model);

    match kind {
        AirTerminalKind::ConstantVolumeNoReheat => {
            let inlet = cx.inlet_name(terminal.id(), 0);
            let h = cx.new_record(RecordType::AirTerminalSingleDuctConstantVolumeNoReheat, &name)?;
            cx.set_text(h, "Availability Schedule Name", &schedule)?;
            cx.set_text(h, "Air Inlet Node Name", &inlet)?;
            cx.set_text(h, "Air Outlet Node Name", &outlet)?;
            cx.set_sizable(h, "Maximum Air Flow Rate", flow)?;

            let adu = cx.new_record(
                RecordType::ZoneHvacAirDistributionUnit,
                &format!("{name} Air Distribution Unit"),
            )?;
            cx.set_text(adu, "Air Distribution Unit Outlet Node Name", &outlet)?;
            cx.set_text(
                adu,
                "Air Terminal Object Type",
                RecordType::AirTerminalSingleDuctConstantVolumeNoReheat.keyword(),
            )?;
            cx.set_text(adu, "Air Terminal Name", &name)?;
            Ok(Some(adu))
        }
        AirTerminalKind::Uncontrolled => {
            let h = cx.new_record(RecordType::AirTerminalSingleDuctUncontrolled, &name)?;
            cx.set_text(h, "Availability Schedule Name", &schedule)?;
            cx.set_text(h, "Zone Supply Air Node Name", &outlet)?;
            cx.set_sizable(h, "Maximum Air Flow Rate", flow)?;
            Ok(Some(h))
        }
    }
}
