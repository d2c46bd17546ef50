//! Whole-model forward translation scenarios.

use chrono::{Duration, NaiveDate};
use os_energyplus::{ForwardTranslator, Level, TranslationOutput};
use os_idf::{Record, RecordType, Workspace};
use os_model::{
    AirLoopHVAC, AirTerminal, AirTerminalKind, GeneratorMicroTurbine, Model, Node,
    OperationScheme, OperationSchemeKind, PlantEquipment, PlantEquipmentKind, PlantLoop, Schedule,
    SetpointManager, ThermalZone, ZoneHVACEquipment,
};
use os_schedule::TimeSeries;
use proptest::prelude::*;

fn named_loop(m: &mut Model, name: &str) -> PlantLoop {
    let lp = PlantLoop::new(m);
    m.set_name(lp.id(), name);
    lp
}

fn on_branch(m: &mut Model, lp: PlantLoop, kind: PlantEquipmentKind, name: &str) -> PlantEquipment {
    let eq = PlantEquipment::new(m, kind);
    m.set_name(eq.id(), name);
    assert!(lp.add_supply_branch_for_component(m, eq));
    eq
}

fn record<'a>(ws: &'a Workspace, ty: RecordType, name: &str) -> &'a Record {
    ws.object_by_type_and_name(ty, name)
        .unwrap_or_else(|| panic!("missing {} '{name}'", ty.keyword()))
}

/// Value of `field` in every extensible group of `r`.
fn column<'a>(r: &'a Record, field: &str) -> Vec<&'a str> {
    (0..r.group_count())
        .filter_map(|g| r.group_string(g, field))
        .collect()
}

fn list_names<'a>(out: &'a TranslationOutput, list: &str) -> Vec<&'a str> {
    out.workspace
        .object_by_type_and_name(RecordType::PlantEquipmentList, list)
        .map(|r| column(r, "Equipment Name"))
        .unwrap_or_default()
}

#[test]
fn default_schemes_split_equipment_by_role() {
    let mut m = Model::new();
    let lp = named_loop(&mut m, "Mixed Loop");
    on_branch(&mut m, lp, PlantEquipmentKind::Boiler, "Boiler A");
    on_branch(&mut m, lp, PlantEquipmentKind::ChillerElectricEir, "Chiller A");
    on_branch(&mut m, lp, PlantEquipmentKind::GroundHeatExchangerVertical, "Ground HX");

    let out = ForwardTranslator::default().translate_model(&m);
    assert_eq!(out.errors().count(), 0, "{:?}", out.diagnostics);

    let heating = list_names(&out, "Mixed Loop Heating Equipment List");
    let cooling = list_names(&out, "Mixed Loop Cooling Equipment List");
    let uncontrolled = list_names(&out, "Mixed Loop Uncontrolled Equipment List");
    assert_eq!(heating, vec!["Boiler A"]);
    assert_eq!(cooling, vec!["Chiller A"]);
    assert_eq!(uncontrolled, vec!["Ground HX"]);

    let top = record(&out.workspace, RecordType::PlantEquipmentOperationSchemes, "Mixed Loop Operation Schemes");
    assert_eq!(
        column(top, "Control Scheme Object Type"),
        vec![
            "PlantEquipmentOperation:HeatingLoad",
            "PlantEquipmentOperation:CoolingLoad",
            "PlantEquipmentOperation:Uncontrolled",
        ]
    );
    assert!(column(top, "Control Scheme Schedule Name")
        .iter()
        .all(|s| *s == "Always On Discrete"));
    assert!(out
        .workspace
        .object_by_type_and_name(RecordType::PlantEquipmentOperationComponentSetpoint, "Mixed Loop Setpoint Operation Scheme")
        .is_none());

    // each scheme is listed once, each piece of equipment in one list
    let schemes = column(top, "Control Scheme Name");
    assert_eq!(schemes.len(), 3);
    for scheme in &schemes {
        assert_eq!(schemes.iter().filter(|s| *s == scheme).count(), 1);
    }
    let lists = out.workspace.objects_by_type(RecordType::PlantEquipmentList);
    assert_eq!(lists.len(), 3);
    for name in ["Boiler A", "Chiller A", "Ground HX"] {
        let holders = lists
            .iter()
            .filter(|l| column(l, "Equipment Name").contains(&name))
            .count();
        assert_eq!(holders, 1, "{name}");
    }

    let plant = record(&out.workspace, RecordType::PlantLoop, "Mixed Loop");
    assert_eq!(
        plant.get_string("Plant Equipment Operation Scheme Name"),
        Some("Mixed Loop Operation Schemes")
    );
}

#[test]
fn failed_plant_loop_leaves_no_partial_records() {
    let mut m = Model::new();
    let lp = named_loop(&mut m, "Broken Loop");
    let boiler = on_branch(&mut m, lp, PlantEquipmentKind::Boiler, "Boiler A");

    // wire the boiler straight onto the splitter, dropping its inlet node
    let node = m.inlet_object(boiler.id(), 0).unwrap();
    m.disconnect_inlet(boiler.id(), 0);
    let feed = m.disconnect_inlet(node, 0).unwrap();
    m.connect(feed.object, feed.index, boiler.id(), 0);

    let outlet = m
        .outlet_object(boiler.id(), 0)
        .and_then(|n| Node::from_id(&m, n))
        .unwrap();
    let setpoint = Schedule::constant(&mut m, 80.0).unwrap();
    let spm = SetpointManager::new_scheduled(&mut m, "Temperature", setpoint).unwrap();
    assert!(spm.add_to_node(&mut m, outlet));

    let out = ForwardTranslator::default().translate_model(&m);
    let errors: Vec<_> = out.errors().collect();
    assert_eq!(errors.len(), 1, "{:?}", out.diagnostics);
    assert_eq!(errors[0].object.as_deref(), Some("Broken Loop"));
    assert_eq!(errors[0].message, "Boiler A is missing its inlet node");

    let ws = &out.workspace;
    for ty in [
        RecordType::PlantLoop,
        RecordType::BranchList,
        RecordType::ConnectorList,
        RecordType::PlantEquipmentOperationSchemes,
        RecordType::PlantEquipmentOperationComponentSetpoint,
        RecordType::PlantEquipmentList,
    ] {
        assert!(ws.objects_by_type(ty).is_empty(), "{}", ty.keyword());
    }
}

#[test]
fn heat_recovery_setpoint_row_names_the_generator() {
    let mut m = Model::new();
    let lp = named_loop(&mut m, "HR Loop");
    let generator = GeneratorMicroTurbine::new(&mut m);
    m.set_name(generator.id(), "Micro Turbine");
    let hr = generator.create_heat_recovery(&mut m);
    assert!(lp.add_supply_branch_for_component(&mut m, hr));
    assert!(hr.set_design_flow_rate(&mut m, 0.002));

    let outlet = m
        .outlet_object(hr.id(), 0)
        .and_then(|n| Node::from_id(&m, n))
        .unwrap();
    let setpoint = Schedule::constant(&mut m, 60.0).unwrap();
    let spm = SetpointManager::new_scheduled(&mut m, "Temperature", setpoint).unwrap();
    assert!(spm.add_to_node(&mut m, outlet));

    let out = ForwardTranslator::default().translate_model(&m);
    let scheme = record(
        &out.workspace,
        RecordType::PlantEquipmentOperationComponentSetpoint,
        "HR Loop Setpoint Operation Scheme",
    );
    assert_eq!(column(scheme, "Equipment Object Type"), vec!["Generator:MicroTurbine"]);
    assert_eq!(column(scheme, "Equipment Name"), vec!["Micro Turbine"]);
    assert_eq!(column(scheme, "Operation Type"), vec!["Heating"]);
    assert_eq!(scheme.groups()[0][4].as_real(), Some(0.002));

    let outlet_name = m.name(outlet.id()).unwrap();
    assert_eq!(column(scheme, "Setpoint Node Name"), vec![outlet_name]);
    let spm_record = out
        .workspace
        .objects_by_type(RecordType::SetpointManagerScheduled)
        .into_iter()
        .next()
        .unwrap();
    assert_eq!(spm_record.get_string("Setpoint Node or NodeList Name"), Some(outlet_name));

    // still heating equipment, so the heating default list carries it too
    assert_eq!(list_names(&out, "HR Loop Heating Equipment List"), vec!["Micro Turbine"]);
}

#[test]
fn authored_schemes_replace_defaults() {
    let mut m = Model::new();
    let lp = named_loop(&mut m, "HW Loop");
    let small = on_branch(&mut m, lp, PlantEquipmentKind::Boiler, "Small Boiler");
    let large = on_branch(&mut m, lp, PlantEquipmentKind::Boiler, "Large Boiler");

    let scheme = OperationScheme::new(&mut m, OperationSchemeKind::HeatingLoad);
    m.set_name(scheme.id(), "Staged Heating");
    assert!(scheme.add_equipment(&mut m, large));
    assert!(scheme.add_load_range(&mut m, 25_000.0, &[small]));
    assert!(lp.set_plant_equipment_operation_heating_load(&mut m, scheme));

    let out = ForwardTranslator::default().translate_model(&m);
    let top = record(&out.workspace, RecordType::PlantEquipmentOperationSchemes, "HW Loop Operation Schemes");
    assert_eq!(column(top, "Control Scheme Name"), vec!["Staged Heating"]);

    let authored = record(&out.workspace, RecordType::PlantEquipmentOperationHeatingLoad, "Staged Heating");
    assert_eq!(authored.group_count(), 2);
    assert_eq!(authored.groups()[0][1].as_real(), Some(25_000.0));
    assert_eq!(list_names(&out, "Staged Heating Equipment List 1"), vec!["Small Boiler"]);
    assert_eq!(list_names(&out, "Staged Heating Equipment List 2"), vec!["Large Boiler"]);
    assert!(list_names(&out, "HW Loop Heating Equipment List").is_empty());
}

#[test]
fn plant_branches_and_connectors() {
    let mut m = Model::new();
    let lp = named_loop(&mut m, "CHW");
    on_branch(&mut m, lp, PlantEquipmentKind::ChillerElectricEir, "Chiller 1");
    on_branch(&mut m, lp, PlantEquipmentKind::ChillerElectricEir, "Chiller 2");

    let out = ForwardTranslator::default().translate_model(&m);
    let ws = &out.workspace;
    let supply = record(ws, RecordType::BranchList, "CHW Supply Branches");
    assert_eq!(
        column(supply, "Branch Name"),
        vec!["CHW Supply Inlet Branch", "CHW Supply Branch 1", "CHW Supply Branch 2", "CHW Supply Outlet Branch"]
    );
    let branch = record(ws, RecordType::Branch, "CHW Supply Branch 2");
    assert_eq!(column(branch, "Component Name"), vec!["Chiller 2"]);

    // the demand side has no equipment, so every branch holds a pipe
    let demand_branch = record(ws, RecordType::Branch, "CHW Demand Branch 1");
    assert_eq!(column(demand_branch, "Component Object Type"), vec!["Pipe:Adiabatic"]);
    assert!(ws.object_by_type_and_name(RecordType::PipeAdiabatic, "CHW Demand Branch 1 Pipe").is_some());
    assert_eq!(ws.objects_by_type(RecordType::ConnectorList).len(), 2);
}

#[test]
fn orphan_equipment_is_reported() {
    let mut m = Model::new();
    let boiler = PlantEquipment::new(&mut m, PlantEquipmentKind::Boiler);
    m.set_name(boiler.id(), "Loose Boiler");
    let out = ForwardTranslator::default().translate_model(&m);
    let warning = out.warnings().next().unwrap();
    assert_eq!(warning.object.as_deref(), Some("Loose Boiler"));
    assert!(out.workspace.objects_by_type(RecordType::BoilerHotWater).is_empty());
}

#[test]
fn air_loop_with_plenums() {
    let mut m = Model::new();
    let air = AirLoopHVAC::new(&mut m);
    m.set_name(air.id(), "AHU");
    let zones: Vec<ThermalZone> = ["East", "West"]
        .iter()
        .map(|n| {
            let z = ThermalZone::new(&mut m);
            m.set_name(z.id(), n);
            z
        })
        .collect();
    for z in &zones {
        let t = AirTerminal::new(&mut m, AirTerminalKind::ConstantVolumeNoReheat);
        assert!(air.add_branch_for_zone(&mut m, *z, Some(t)));
    }
    let ceiling = ThermalZone::new(&mut m);
    m.set_name(ceiling.id(), "Ceiling");
    let floor = ThermalZone::new(&mut m);
    m.set_name(floor.id(), "Floor");
    for z in &zones {
        assert!(z.set_supply_plenum(&mut m, floor));
        assert!(z.set_return_plenum(&mut m, ceiling));
    }
    let baseboard = ZoneHVACEquipment::new(&mut m);
    assert!(baseboard.add_to_thermal_zone(&mut m, zones[0]));

    let reheat = SetpointManager::new_single_zone_reheat(&mut m);
    let supply_outlet = air.supply_outlet_node(&m).unwrap();
    assert!(reheat.add_to_node(&mut m, supply_outlet));

    let out = ForwardTranslator::default().translate_model(&m);
    assert_eq!(out.errors().count(), 0, "{:?}", out.diagnostics);
    let ws = &out.workspace;

    assert_eq!(ws.objects_by_type(RecordType::Zone).len(), 4);
    // plenum zones get no equipment connections
    assert_eq!(ws.objects_by_type(RecordType::ZoneHvacEquipmentConnections).len(), 2);
    assert_eq!(ws.objects_by_type(RecordType::ZoneHvacAirDistributionUnit).len(), 2);

    let east = record(ws, RecordType::ZoneHvacEquipmentList, "East Equipment List");
    assert_eq!(
        column(east, "Zone Equipment Object Type"),
        vec!["ZoneHVAC:AirDistributionUnit", "ZoneHVAC:Baseboard:Convective:Electric"]
    );

    let supply_path = record(ws, RecordType::AirLoopHvacSupplyPath, "AHU Supply Path");
    assert_eq!(
        column(supply_path, "Component Object Type"),
        vec!["AirLoopHVAC:ZoneSplitter", "AirLoopHVAC:SupplyPlenum"]
    );
    let return_path = record(ws, RecordType::AirLoopHvacReturnPath, "AHU Return Path");
    assert_eq!(
        column(return_path, "Component Object Type"),
        vec!["AirLoopHVAC:ReturnPlenum", "AirLoopHVAC:ZoneMixer"]
    );
    let plenum = ws.objects_by_type(RecordType::AirLoopHvacSupplyPlenum)[0];
    assert_eq!(plenum.get_string("Zone Name"), Some("Floor"));
    assert_eq!(plenum.group_count(), 2);

    let szr = ws.objects_by_type(RecordType::SetpointManagerSingleZoneReheat)[0];
    assert_eq!(szr.get_string("Control Zone Name"), Some("East"));
    assert_eq!(szr.get_string("Zone Node Name"), Some("East Zone Air Node"));
}

#[test]
fn interval_schedule_becomes_compact() {
    let mut m = Model::new();
    let start = NaiveDate::from_ymd_opt(2009, 1, 1)
        .unwrap()
        .and_hms_opt(1, 0, 0)
        .unwrap();
    let values: Vec<f64> = (0..24).map(|h| if (8..18).contains(&h) { 1.0 } else { 0.0 }).collect();
    let series = TimeSeries::fixed(start, Duration::hours(1), values).unwrap();
    let schedule = Schedule::from_time_series(&mut m, &series).unwrap();
    m.set_name(schedule.id(), "Office Hours");

    let out = ForwardTranslator::default().translate_model(&m);
    let compact = record(&out.workspace, RecordType::ScheduleCompact, "Office Hours");
    let fields = column(compact, "Field");
    assert_eq!(fields.first(), Some(&"Through: 1/1"));
    assert!(fields.iter().all(|f| *f != "Until: 00:00"));
    assert_eq!(fields.last(), Some(&"0"));

    let text = out.to_idf(true);
    assert!(text.contains("Schedule:Compact,"));
    assert!(text.contains("!- Field 1"));
}

#[test]
fn diagnostics_serialize() {
    let mut m = Model::new();
    PlantEquipment::new(&mut m, PlantEquipmentKind::Pump);
    let out = ForwardTranslator::default().translate_model(&m);
    let json = serde_json::to_string(&out.diagnostics).unwrap();
    assert!(json.contains("\"Warn\""));
    assert!(out.diagnostics.iter().all(|d| d.level == Level::Warn));
}

proptest! {
    #[test]
    fn equipment_lands_in_at_most_one_default_list(
        kinds in proptest::collection::vec(
            proptest::sample::select(PlantEquipmentKind::ALL.to_vec()),
            1..8,
        )
    ) {
        let mut m = Model::new();
        let lp = named_loop(&mut m, "Loop");
        for (i, kind) in kinds.iter().enumerate() {
            on_branch(&mut m, lp, *kind, &format!("Equipment {i}"));
        }
        let out = ForwardTranslator::default().translate_model(&m);

        let mut seen: Vec<&str> = Vec::new();
        for list in [
            "Loop Heating Equipment List",
            "Loop Cooling Equipment List",
            "Loop Uncontrolled Equipment List",
        ] {
            for name in list_names(&out, list) {
                prop_assert!(!seen.contains(&name), "{name} listed twice");
                seen.push(name);
            }
        }
    }
}
