//! Plant loops: the loop record, its branches and connectors, and the
//! operation schemes.

use os_core::{Handle, ObjectId};
use os_idf::{RecordType, Value};
use os_model::{ConnectorMixer, ConnectorSplitter, Model, Node, ObjectType, PlantLoop, Port};

use super::{operation_schemes, Context};
use crate::error::{TranslateError, TranslateResult};

/// Ports visited walking downstream from `at` until `stop` (excluded) or
/// the end of the line.
fn chain(model: &Model, mut at: Port, stop: Option<ObjectId>) -> Vec<Port> {
    let mut out = Vec::new();
    while Some(at.object) != stop && out.len() <= model.len() {
        out.push(at);
        match model.downstream_port(at.object, at.index) {
            Some(next) => at = next,
            None => break,
        }
    }
    out
}

/// Write one `Branch` from the objects in `ports`. A branch without
/// equipment gets an adiabatic pipe between its end nodes.
fn emit_branch(cx: &mut Context<'_>, name: &str, ports: &[Port]) -> TranslateResult<String> {
    let model = cx.model;
    let h = cx.new_record(RecordType::Branch, name)?;
    let mut components = 0;
    for port in ports {
        if model.is_type(port.object, ObjectType::Node) {
            continue;
        }
        let Some((keyword, record_name)) = cx.translate(port.object).and_then(|r| cx.record_ref(r))
        else {
            continue;
        };
        let inlet = cx.inlet_name(port.object, port.index);
        let outlet = cx.outlet_name(port.object, port.index);
        cx.push(
            h,
            vec![
                Value::text(keyword),
                Value::text(record_name),
                Value::text(inlet),
                Value::text(outlet),
            ],
        )?;
        components += 1;
    }

    if components == 0 {
        let pipe_name = format!("{name} Pipe");
        let nodes: Vec<ObjectId> = ports
            .iter()
            .map(|p| p.object)
            .filter(|o| model.is_type(*o, ObjectType::Node))
            .collect();
        let inlet = nodes.first().map(|n| cx.name_of(*n)).unwrap_or_default();
        let outlet = match nodes.last() {
            Some(n) if nodes.len() > 1 => cx.name_of(*n),
            _ => format!("{pipe_name} Outlet Node"),
        };
        let pipe = cx.new_record(RecordType::PipeAdiabatic, &pipe_name)?;
        cx.set_text(pipe, "Inlet Node Name", &inlet)?;
        cx.set_text(pipe, "Outlet Node Name", &outlet)?;
        cx.push(
            h,
            vec![
                Value::text(RecordType::PipeAdiabatic.keyword()),
                Value::text(pipe_name),
                Value::text(inlet),
                Value::text(outlet),
            ],
        )?;
    }
    Ok(name.to_string())
}

/// Names of the branch list and connector list written for one side.
struct SideLists {
    branch_list: String,
    connector_list: String,
}

fn translate_side(
    cx: &mut Context<'_>,
    prefix: &str,
    inlet: Node,
    splitter: ConnectorSplitter,
    mixer: ConnectorMixer,
) -> TranslateResult<SideLists> {
    let model = cx.model;

    let inlet_branch = emit_branch(
        cx,
        &format!("{prefix} Inlet Branch"),
        &chain(model, Port::new(inlet.id(), 0), Some(splitter.id())),
    )?;
    let mut branches = Vec::new();
    for (i, port) in model.outlet_ports(splitter.id()).into_iter().enumerate() {
        let Some(head) = model.downstream_port(splitter.id(), port) else {
            continue;
        };
        let ports = chain(model, head, Some(mixer.id()));
        branches.push(emit_branch(cx, &format!("{prefix} Branch {}", i + 1), &ports)?);
    }
    let outlet_ports = model
        .downstream_port(mixer.id(), 0)
        .map(|p| chain(model, p, None))
        .unwrap_or_default();
    let outlet_branch = emit_branch(cx, &format!("{prefix} Outlet Branch"), &outlet_ports)?;

    let splitter_name = cx.name_of(splitter.id());
    let s = cx.new_record(RecordType::ConnectorSplitter, &splitter_name)?;
    cx.set_text(s, "Inlet Branch Name", &inlet_branch)?;
    for b in &branches {
        cx.push(s, vec![Value::text(b.as_str())])?;
    }
    let mixer_name = cx.name_of(mixer.id());
    let m = cx.new_record(RecordType::ConnectorMixer, &mixer_name)?;
    cx.set_text(m, "Outlet Branch Name", &outlet_branch)?;
    for b in &branches {
        cx.push(m, vec![Value::text(b.as_str())])?;
    }

    let connector_list = format!("{prefix} Connector List");
    let c = cx.new_record(RecordType::ConnectorList, &connector_list)?;
    cx.set_text(c, "Connector 1 Object Type", RecordType::ConnectorSplitter.keyword())?;
    cx.set_text(c, "Connector 1 Name", &splitter_name)?;
    cx.set_text(c, "Connector 2 Object Type", RecordType::ConnectorMixer.keyword())?;
    cx.set_text(c, "Connector 2 Name", &mixer_name)?;

    let branch_list = format!("{prefix} Branches");
    let l = cx.new_record(RecordType::BranchList, &branch_list)?;
    for b in std::iter::once(&inlet_branch)
        .chain(&branches)
        .chain(std::iter::once(&outlet_branch))
    {
        cx.push(l, vec![Value::text(b.as_str())])?;
    }
    Ok(SideLists {
        branch_list,
        connector_list,
    })
}

pub(crate) fn translate_plant_loop(
    cx: &mut Context<'_>,
    lp: PlantLoop,
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
    let (supply_splitter, supply_mixer) = lp
        .supply_splitter(model)
        .zip(lp.supply_mixer(model))
        .ok_or_else(|| incomplete("supply connectors"))?;
    let (demand_splitter, demand_mixer) = lp
        .demand_splitter(model)
        .zip(lp.demand_mixer(model))
        .ok_or_else(|| incomplete("demand connectors"))?;

    let h = cx.new_record(RecordType::PlantLoop, &name)?;
    let fluid = lp.fluid_type(model).unwrap_or("Water").to_string();
    cx.set_text(h, "Fluid Type", &fluid)?;
    let supply_outlet_name = cx.name_of(supply_outlet.id());
    cx.set_text(h, "Loop Temperature Setpoint Node Name", &supply_outlet_name)?;
    if let Some(t) = lp.maximum_loop_temperature(model) {
        cx.set(h, "Maximum Loop Temperature", Value::Real(t))?;
    }
    if let Some(t) = lp.minimum_loop_temperature(model) {
        cx.set(h, "Minimum Loop Temperature", Value::Real(t))?;
    }
    cx.set_sizable(h, "Maximum Loop Flow Rate", lp.maximum_loop_flow_rate(model))?;
    cx.set(h, "Minimum Loop Flow Rate", Value::Real(0.0))?;
    cx.set(h, "Plant Loop Volume", Value::Autosize)?;
    let supply_inlet_name = cx.name_of(supply_inlet.id());
    cx.set_text(h, "Plant Side Inlet Node Name", &supply_inlet_name)?;
    cx.set_text(h, "Plant Side Outlet Node Name", &supply_outlet_name)?;
    let demand_inlet_name = cx.name_of(demand_inlet.id());
    let demand_outlet_name = cx.name_of(demand_outlet.id());
    cx.set_text(h, "Demand Side Inlet Node Name", &demand_inlet_name)?;
    cx.set_text(h, "Demand Side Outlet Node Name", &demand_outlet_name)?;
    if let Some(scheme) = lp.load_distribution_scheme(model) {
        let scheme = scheme.to_string();
        cx.set_text(h, "Load Distribution Scheme", &scheme)?;
    }

    let supply = translate_side(
        cx,
        &format!("{name} Supply"),
        supply_inlet,
        supply_splitter,
        supply_mixer,
    )?;
    cx.set_text(h, "Plant Side Branch List Name", &supply.branch_list)?;
    cx.set_text(h, "Plant Side Connector List Name", &supply.connector_list)?;
    let demand = translate_side(
        cx,
        &format!("{name} Demand"),
        demand_inlet,
        demand_splitter,
        demand_mixer,
    )?;
    cx.set_text(h, "Demand Side Branch List Name", &demand.branch_list)?;
    cx.set_text(h, "Demand Side Connector List Name", &demand.connector_list)?;

    let schemes = operation_schemes::translate_plant_schemes(cx, lp)?;
    cx.set_text(h, "Plant Equipment Operation Scheme Name", &schemes)?;
    Ok(Some(h))
}
