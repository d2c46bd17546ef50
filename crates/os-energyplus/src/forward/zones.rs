//! Zones, their equipment connections and zone equipment.

use os_core::{Handle, ObjectId};
use os_idf::{RecordType, Value};
use os_model::{AirTerminal, ThermalZone, ZoneHVACEquipment};

use super::{zone_air_node_name, Context};
use crate::error::TranslateResult;

/// Terminal feeding `zone`: the zone's inlet node is the terminal outlet.
fn zone_terminal(cx: &Context<'_>, zone: ThermalZone) -> Option<AirTerminal> {
    let node = cx.model.inlet_object(zone.id(), 0)?;
    let upstream = cx.model.inlet_object(node, 0)?;
    AirTerminal::from_id(cx.model, upstream)
}

pub(crate) fn translate_zone(
    cx: &mut Context<'_>,
    zone: ThermalZone,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let name = cx.name_of(zone.id());
    let h = cx.new_record(RecordType::Zone, &name)?;
    if let Some(m) = zone.multiplier(model) {
        cx.set(h, "Multiplier", Value::Integer(m))?;
    }
    if zone.is_plenum(model) {
        return Ok(Some(h));
    }

    let mut equipment: Vec<ObjectId> = Vec::new();
    if let Some(t) = zone_terminal(cx, zone) {
        equipment.push(t.id());
    }
    equipment.extend(zone.equipment(model));
    let on_air_loop = zone.air_loop_hvac(model).is_some();
    if equipment.is_empty() && !on_air_loop {
        return Ok(Some(h));
    }

    let list_name = format!("{name} Equipment List");
    let list = cx.new_record(RecordType::ZoneHvacEquipmentList, &list_name)?;
    cx.set_text(list, "Load Distribution Scheme", "SequentialLoad")?;
    let mut sequence = 0;
    for e in equipment {
        let Some((keyword, record_name)) = cx.translate(e).and_then(|r| cx.record_ref(r)) else {
            continue;
        };
        sequence += 1;
        cx.push(
            list,
            vec![
                Value::text(keyword),
                Value::text(record_name),
                Value::Integer(sequence),
                Value::Integer(sequence),
            ],
        )?;
    }

    let connections = cx.new_unnamed(RecordType::ZoneHvacEquipmentConnections);
    cx.set_text(connections, "Zone Name", &name)?;
    cx.set_text(connections, "Zone Conditioning Equipment List Name", &list_name)?;
    cx.set_text(connections, "Zone Air Node Name", &zone_air_node_name(&name))?;
    if on_air_loop {
        let inlet = cx.inlet_name(zone.id(), 0);
        let outlet = cx.outlet_name(zone.id(), 0);
        cx.set_text(connections, "Zone Air Inlet Node or NodeList Name", &inlet)?;
        cx.set_text(connections, "Zone Return Air Node or NodeList Name", &outlet)?;
    }
    Ok(Some(h))
}

pub(crate) fn translate_baseboard(
    cx: &mut Context<'_>,
    baseboard: ZoneHVACEquipment,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let name = cx.name_of(baseboard.id());
    let h = cx.new_record(RecordType::ZoneHvacBaseboardConvectiveElectric, &name)?;
    let always_on = cx.always_on()?;
    cx.set_text(h, "Availability Schedule Name", &always_on)?;
    cx.set_text(h, "Heating Design Capacity Method", "HeatingDesignCapacity")?;
    cx.set_sizable(h, "Heating Design Capacity", baseboard.heating_capacity(model))?;
    cx.set(h, "Efficiency", Value::Real(1.0))?;
    Ok(Some(h))
}
