use os_core::Handle;
use os_idf::{RecordType, Value};
use os_model::SetpointManager;

use super::{zone_air_node_name, Context};
use crate::error::TranslateResult;

pub(crate) fn translate_setpoint_manager(
    cx: &mut Context<'_>,
    spm: SetpointManager,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let Some(node) = spm.node(model) else {
        cx.warn(Some(spm.id()), "setpoint manager is not on a node; skipped");
        return Ok(None);
    };
    let name = cx.name_of(spm.id());
    let node_name = cx.name_of(node.id());

    if !spm.is_single_zone_reheat(model) {
        let schedule = cx.schedule_name(spm.schedule(model))?;
        let h = cx.new_record(RecordType::SetpointManagerScheduled, &name)?;
        let variable = spm.control_variable(model).unwrap_or("Temperature").to_string();
        cx.set_text(h, "Control Variable", &variable)?;
        cx.set_text(h, "Schedule Name", &schedule)?;
        cx.set_text(h, "Setpoint Node or NodeList Name", &node_name)?;
        return Ok(Some(h));
    }

    let h = cx.new_record(RecordType::SetpointManagerSingleZoneReheat, &name)?;
    cx.set_text(h, "Control Variable", "Temperature")?;
    if let Some(t) = spm.minimum_supply_air_temperature(model) {
        cx.set(h, "Minimum Supply Air Temperature", Value::Real(t))?;
    }
    if let Some(t) = spm.maximum_supply_air_temperature(model) {
        cx.set(h, "Maximum Supply Air Temperature", Value::Real(t))?;
    }
    match spm.control_zone(model) {
        Some(zone) => {
            let zone_name = cx.name_of(zone.id());
            let zone_inlet = cx.inlet_name(zone.id(), 0);
            cx.set_text(h, "Control Zone Name", &zone_name)?;
            cx.set_text(h, "Zone Node Name", &zone_air_node_name(&zone_name))?;
            cx.set_text(h, "Zone Inlet Node Name", &zone_inlet)?;
        }
        None => cx.warn(Some(spm.id()), "single zone reheat manager has no control zone"),
    }
    cx.set_text(h, "Setpoint Node or NodeList Name", &node_name)?;
    Ok(Some(h))
}
