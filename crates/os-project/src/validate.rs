//! Project validation logic.

use std::collections::{HashMap, HashSet};

use crate::schema::{
    AirLoopDef, AirSetpointDef, EquipmentDef, EquipmentKind, PlantLoopDef, Project, ScheduleDef,
    ScheduleKind, SchemeDef, SchemeKind, ZoneDef, ZoneEquipmentDef,
};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(id: &str, context: impl Into<String>) -> ValidationError {
    ValidationError::MissingReference {
        id: id.to_string(),
        context: context.into(),
    }
}

fn insert_unique<'a>(
    seen: &mut HashSet<&'a str>,
    id: &'a str,
    context: &str,
) -> Result<(), ValidationError> {
    if seen.insert(id) {
        Ok(())
    } else {
        Err(ValidationError::DuplicateId {
            id: id.to_string(),
            context: context.to_string(),
        })
    }
}

fn check_size(field: &str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(invalid(field, v, "must be finite and non-negative")),
        _ => Ok(()),
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }
    if !(1..=9999).contains(&project.year) {
        return Err(invalid("year", project.year, "must be between 1 and 9999"));
    }

    let mut schedule_ids = HashSet::new();
    for schedule in &project.schedules {
        insert_unique(&mut schedule_ids, &schedule.id, "schedules")?;
        validate_schedule(schedule)?;
    }

    let mut zone_ids = HashSet::new();
    for zone in &project.zones {
        insert_unique(&mut zone_ids, &zone.id, "zones")?;
        if zone.multiplier < 1 {
            return Err(invalid(format!("zone '{}' multiplier", zone.id), zone.multiplier, "must be at least 1"));
        }
    }

    // plant equipment and zone equipment share one id space
    let mut equipment: HashMap<&str, EquipmentKind> = HashMap::new();
    let mut equipment_ids = HashSet::new();
    for def in project.equipment() {
        insert_unique(&mut equipment_ids, &def.id, "equipment")?;
        validate_equipment(def)?;
        equipment.insert(def.id.as_str(), def.kind);
    }
    let mut wrapped_tanks = HashSet::new();
    for zone in &project.zones {
        validate_zone_equipment(zone, &equipment, &mut equipment_ids, &mut wrapped_tanks)?;
    }

    let mut loop_ids = HashSet::new();
    let mut demand_used = HashSet::new();
    for lp in &project.plant_loops {
        insert_unique(&mut loop_ids, &lp.id, "plant_loops")?;
        validate_plant_loop(lp, &equipment, &schedule_ids, &mut demand_used)?;
    }

    let mut air_loop_ids = HashSet::new();
    let mut served = HashSet::new();
    let plenum_zones: HashSet<&str> = project
        .air_loops
        .iter()
        .flat_map(|l| &l.branches)
        .flat_map(|b| [b.supply_plenum_zone_id.as_deref(), b.return_plenum_zone_id.as_deref()])
        .flatten()
        .collect();
    for air in &project.air_loops {
        insert_unique(&mut air_loop_ids, &air.id, "air_loops")?;
        validate_air_loop(air, &zone_ids, &schedule_ids, &plenum_zones, &mut served)?;
    }
    for zone in &project.zones {
        if plenum_zones.contains(zone.id.as_str()) && !zone.equipment.is_empty() {
            return Err(invalid(
                format!("zone '{}' equipment", zone.id),
                zone.equipment.len(),
                "plenum zones take no equipment",
            ));
        }
    }

    Ok(())
}

fn validate_schedule(schedule: &ScheduleDef) -> Result<(), ValidationError> {
    let field = |what: &str| format!("schedule '{}' {what}", schedule.id);
    let finite = |values: &[f64]| match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(invalid(field("values"), values[i], "must be finite")),
        None => Ok(()),
    };
    match &schedule.kind {
        ScheduleKind::Constant { value } => {
            if !value.is_finite() {
                return Err(invalid(field("value"), value, "must be finite"));
            }
        }
        ScheduleKind::FixedInterval {
            interval_min,
            values,
            ..
        } => {
            if *interval_min <= 0 {
                return Err(invalid(field("interval_min"), interval_min, "must be positive"));
            }
            if values.is_empty() {
                return Err(invalid(field("values"), 0, "must not be empty"));
            }
            finite(values)?;
        }
        ScheduleKind::VariableInterval { start, times, values } => {
            if times.is_empty() || times.len() != values.len() {
                return Err(invalid(
                    field("times"),
                    times.len(),
                    "must be non-empty and match the number of values",
                ));
            }
            if times.windows(2).any(|w| w[1] <= w[0]) || start.is_some_and(|s| times[0] <= s) {
                return Err(invalid(field("times"), times.len(), "must be strictly increasing"));
            }
            finite(values)?;
        }
    }
    Ok(())
}

fn validate_equipment(def: &EquipmentDef) -> Result<(), ValidationError> {
    check_size(&format!("equipment '{}' design_flow_m3s", def.id), def.design_flow_m3s)?;
    check_size(&format!("equipment '{}' capacity_w", def.id), def.capacity_w)?;
    if def.control_type.is_some() && def.kind != EquipmentKind::HeatExchangerFluidToFluid {
        return Err(invalid(
            format!("equipment '{}' control_type", def.id),
            def.control_type.as_deref().unwrap_or_default(),
            "only heat exchangers take a control type",
        ));
    }
    Ok(())
}

fn validate_zone_equipment<'a>(
    zone: &'a ZoneDef,
    equipment: &HashMap<&str, EquipmentKind>,
    ids: &mut HashSet<&'a str>,
    wrapped_tanks: &mut HashSet<&'a str>,
) -> Result<(), ValidationError> {
    for eq in &zone.equipment {
        insert_unique(ids, eq.id(), "equipment")?;
        match eq {
            ZoneEquipmentDef::Baseboard {
                id,
                heating_capacity_w,
                ..
            } => check_size(&format!("equipment '{id}' heating_capacity_w"), *heating_capacity_w)?,
            ZoneEquipmentDef::HeatPumpWaterHeater { tank_id, .. } => {
                match equipment.get(tank_id.as_str()) {
                    None => return Err(missing(tank_id, format!("zone '{}' heat pump tank_id", zone.id))),
                    Some(EquipmentKind::WaterHeaterMixed) => {}
                    Some(_) => {
                        return Err(invalid(
                            format!("zone '{}' tank_id", zone.id),
                            tank_id,
                            "must name a WaterHeaterMixed",
                        ));
                    }
                }
                if !wrapped_tanks.insert(tank_id.as_str()) {
                    return Err(invalid("tank_id", tank_id, "tank already wrapped by another heat pump"));
                }
            }
        }
    }
    Ok(())
}

fn validate_plant_loop<'a>(
    lp: &'a PlantLoopDef,
    equipment: &HashMap<&str, EquipmentKind>,
    schedules: &HashSet<&str>,
    demand_used: &mut HashSet<&'a str>,
) -> Result<(), ValidationError> {
    check_size(&format!("plant loop '{}' max_flow_m3s", lp.id), lp.max_flow_m3s)?;
    if let (Some(lo), Some(hi)) = (lp.min_temperature_c, lp.max_temperature_c) {
        if lo > hi {
            return Err(invalid(
                format!("plant loop '{}' min_temperature_c", lp.id),
                lo,
                "must not exceed max_temperature_c",
            ));
        }
    }

    let own: HashSet<&str> = lp
        .supply_branches
        .iter()
        .chain(&lp.series)
        .map(|e| e.id.as_str())
        .collect();

    for id in &lp.demand_branches {
        let kind = equipment
            .get(id.as_str())
            .ok_or_else(|| missing(id, format!("plant loop '{}' demand_branches", lp.id)))?;
        if kind.model_kind().pair_count() != 2 || own.contains(id.as_str()) {
            return Err(invalid(
                format!("plant loop '{}' demand_branches", lp.id),
                id,
                "must be two-pair equipment supplied by another loop",
            ));
        }
        if !demand_used.insert(id.as_str()) {
            return Err(invalid("demand_branches", id, "already on a demand side"));
        }
    }

    for spm in &lp.setpoint_managers {
        if let Some(eq) = &spm.equipment_id {
            if !own.contains(eq.as_str()) {
                return Err(missing(eq, format!("setpoint manager '{}' equipment_id", spm.id)));
            }
        }
        if !schedules.contains(spm.schedule_id.as_str()) {
            return Err(missing(&spm.schedule_id, format!("setpoint manager '{}' schedule_id", spm.id)));
        }
    }

    let slots = [
        ("heating_scheme", &lp.heating_scheme, Some(SchemeKind::HeatingLoad)),
        ("cooling_scheme", &lp.cooling_scheme, Some(SchemeKind::CoolingLoad)),
        ("primary_scheme", &lp.primary_scheme, None),
    ];
    for (slot, scheme, required) in slots {
        if let Some(scheme) = scheme {
            validate_scheme(lp, slot, scheme, required, &own, schedules)?;
        }
    }
    if let Some(id) = &lp.setpoint_scheme_schedule_id {
        if !schedules.contains(id.as_str()) {
            return Err(missing(id, format!("plant loop '{}' setpoint_scheme_schedule_id", lp.id)));
        }
    }
    Ok(())
}

fn validate_scheme(
    lp: &PlantLoopDef,
    slot: &str,
    scheme: &SchemeDef,
    required: Option<SchemeKind>,
    own: &HashSet<&str>,
    schedules: &HashSet<&str>,
) -> Result<(), ValidationError> {
    let context = format!("plant loop '{}' {slot}", lp.id);
    if required.is_some_and(|k| k != scheme.kind) {
        return Err(invalid(format!("{context} kind"), format!("{:?}", scheme.kind), "does not fit the slot"));
    }
    if scheme.kind == SchemeKind::Uncontrolled && !scheme.ranges.is_empty() {
        return Err(invalid(format!("{context} ranges"), scheme.ranges.len(), "uncontrolled schemes have one range"));
    }
    if let Some(id) = &scheme.schedule_id {
        if !schedules.contains(id.as_str()) {
            return Err(missing(id, format!("{context} schedule_id")));
        }
    }
    let mut previous = 0.0;
    for range in &scheme.ranges {
        if !range.upper_w.is_finite() || range.upper_w <= previous {
            return Err(invalid(format!("{context} upper_w"), range.upper_w, "ranges must increase"));
        }
        previous = range.upper_w;
    }
    for id in scheme
        .equipment
        .iter()
        .chain(scheme.ranges.iter().flat_map(|r| &r.equipment))
    {
        if !own.contains(id.as_str()) {
            return Err(missing(id, format!("{context} equipment")));
        }
    }
    Ok(())
}

fn validate_air_loop<'a>(
    air: &'a AirLoopDef,
    zones: &HashSet<&str>,
    schedules: &HashSet<&str>,
    plenum_zones: &HashSet<&str>,
    served: &mut HashSet<&'a str>,
) -> Result<(), ValidationError> {
    check_size(
        &format!("air loop '{}' design_supply_air_flow_m3s", air.id),
        air.design_supply_air_flow_m3s,
    )?;
    let context = |what: &str| format!("air loop '{}' {what}", air.id);
    for branch in &air.branches {
        if !zones.contains(branch.zone_id.as_str()) {
            return Err(missing(&branch.zone_id, context("zone_id")));
        }
        if plenum_zones.contains(branch.zone_id.as_str()) {
            return Err(invalid(context("zone_id"), &branch.zone_id, "zone is used as a plenum"));
        }
        if !served.insert(branch.zone_id.as_str()) {
            return Err(invalid(context("zone_id"), &branch.zone_id, "zone already has an air loop branch"));
        }
        for plenum in [&branch.supply_plenum_zone_id, &branch.return_plenum_zone_id]
            .into_iter()
            .flatten()
        {
            if !zones.contains(plenum.as_str()) {
                return Err(missing(plenum, context("plenum zone")));
            }
        }
        if let Some(t) = &branch.terminal {
            check_size(&context("terminal max_flow_m3s"), t.max_flow_m3s)?;
            if let Some(id) = &t.availability_schedule_id {
                if !schedules.contains(id.as_str()) {
                    return Err(missing(id, context("terminal availability_schedule_id")));
                }
            }
        }
    }
    match &air.supply_setpoint {
        Some(AirSetpointDef::Scheduled { schedule_id, .. }) => {
            if !schedules.contains(schedule_id.as_str()) {
                return Err(missing(schedule_id, context("supply_setpoint schedule_id")));
            }
        }
        Some(AirSetpointDef::SingleZoneReheat {
            control_zone_id,
            min_supply_c,
            max_supply_c,
            ..
        }) => {
            if let Some(z) = control_zone_id {
                if !air.branches.iter().any(|b| &b.zone_id == z) {
                    return Err(missing(z, context("supply_setpoint control_zone_id")));
                }
            }
            if !(min_supply_c.is_finite() && max_supply_c.is_finite() && min_supply_c <= max_supply_c) {
                return Err(invalid(context("supply_setpoint min_supply_c"), min_supply_c, "must not exceed max_supply_c"));
            }
        }
        None => {}
    }
    Ok(())
}
