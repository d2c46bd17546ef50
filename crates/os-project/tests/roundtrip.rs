use chrono::NaiveDate;
use os_project::schema::*;
use os_project::{load, load_json, load_yaml, save_json, save_yaml, validate_project};

fn small_project() -> Project {
    let mut project = Project::new("Roundtrip");
    project.schedules.push(ScheduleDef {
        id: "occ".to_string(),
        name: "Occupancy".to_string(),
        kind: ScheduleKind::FixedInterval {
            start: NaiveDate::from_ymd_opt(2009, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            interval_min: 60,
            values: vec![0.0, 0.5, 1.0],
        },
    });
    project.zones.push(ZoneDef {
        id: "z1".to_string(),
        name: "Zone 1".to_string(),
        multiplier: 3,
        ideal_air_loads: true,
        equipment: vec![ZoneEquipmentDef::Baseboard {
            id: "bb".to_string(),
            name: "Baseboard".to_string(),
            heating_capacity_w: None,
        }],
    });
    project.plant_loops.push(PlantLoopDef {
        id: "hw".to_string(),
        name: "Hot Water".to_string(),
        fluid: "Water".to_string(),
        max_temperature_c: Some(90.0),
        min_temperature_c: None,
        max_flow_m3s: None,
        load_distribution: Some("UniformLoad".to_string()),
        supply_branches: vec![EquipmentDef {
            id: "b1".to_string(),
            name: "Boiler".to_string(),
            kind: EquipmentKind::Boiler,
            design_flow_m3s: Some(0.002),
            capacity_w: Some(40_000.0),
            control_type: None,
        }],
        series: vec![],
        demand_branches: vec![],
        setpoint_managers: vec![],
        heating_scheme: Some(SchemeDef {
            name: "Heating".to_string(),
            kind: SchemeKind::HeatingLoad,
            schedule_id: Some("occ".to_string()),
            equipment: vec!["b1".to_string()],
            ranges: vec![],
        }),
        cooling_scheme: None,
        primary_scheme: None,
        setpoint_scheme_schedule_id: None,
    });
    project
}

#[test]
fn roundtrip_yaml_empty_project() {
    let project = Project::new("Empty Project");
    validate_project(&project).unwrap();

    let path = std::env::temp_dir().join("os_project_roundtrip_empty.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_yaml_small_project() {
    let project = small_project();
    let path = std::env::temp_dir().join("os_project_roundtrip_small.yaml");
    save_yaml(&path, &project).unwrap();
    assert_eq!(load_yaml(&path).unwrap(), project);
}

#[test]
fn roundtrip_json_picks_format_by_extension() {
    let project = small_project();
    let path = std::env::temp_dir().join("os_project_roundtrip_small.json");
    save_json(&path, &project).unwrap();
    assert_eq!(load_json(&path).unwrap(), project);
    assert_eq!(load(&path).unwrap(), project);
}

#[test]
fn invalid_project_is_not_saved() {
    let mut project = small_project();
    project.zones[0].multiplier = 0;
    let path = std::env::temp_dir().join("os_project_roundtrip_invalid.yaml");
    assert!(save_yaml(&path, &project).is_err());
}

#[test]
fn omitted_fields_take_defaults() {
    let yaml = "version: 1\nname: Sparse\nzones:\n  - id: z\n    name: Z\n";
    let project: Project = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(project.year, 2009);
    assert_eq!(project.zones[0].multiplier, 1);
    assert!(project.options.emit_field_comments);
    validate_project(&project).unwrap();
}
