//! Turns a validated [`Project`] into an object-graph [`Model`].

use std::collections::HashMap;

use chrono::Duration;
use os_model::{
    AirLoopHVAC, AirTerminal, GeneratorMicroTurbine, Model, ModelError, ModelResult, Node,
    OperationScheme, PlantEquipment, PlantLoop, Schedule, SetpointManager, ThermalZone,
    WaterHeaterHeatPump, ZoneHVACEquipment,
};
use os_schedule::TimeSeries;
use tracing::{debug, info};

use crate::schema::{
    AirLoopDef, AirSetpointDef, EquipmentDef, EquipmentKind, PlantLoopDef, Project, ScheduleDef,
    ScheduleKind, SchemeDef, ZoneDef, ZoneEquipmentDef,
};

fn rejected(what: impl Into<String>) -> ModelError {
    ModelError::Rejected { what: what.into() }
}

fn ensure(ok: bool, what: impl FnOnce() -> String) -> ModelResult<()> {
    if ok { Ok(()) } else { Err(rejected(what())) }
}

/// Build a model from `project`. The project should already have passed
/// [`crate::validate_project`]; anything the model still refuses comes back
/// as [`ModelError::Rejected`].
pub fn build_model(project: &Project) -> ModelResult<Model> {
    let mut builder = Builder {
        model: Model::new(),
        schedules: HashMap::new(),
        zones: HashMap::new(),
        equipment: HashMap::new(),
        loops: HashMap::new(),
    };
    builder.model.set_calendar_year(project.year);

    for def in &project.schedules {
        builder.schedule(def)?;
    }
    for def in &project.zones {
        builder.zone(def)?;
    }
    for def in &project.plant_loops {
        builder.plant_loop(def)?;
    }
    // demand sides reference equipment owned by other loops
    for def in &project.plant_loops {
        builder.demand_branches(def)?;
    }
    for def in &project.zones {
        builder.zone_equipment(def)?;
    }
    for def in &project.plant_loops {
        builder.plant_controls(def)?;
    }
    for def in &project.air_loops {
        builder.air_loop(def)?;
    }

    info!(
        project = %project.name,
        objects = builder.model.len(),
        "built model"
    );
    Ok(builder.model)
}

struct Builder<'p> {
    model: Model,
    schedules: HashMap<&'p str, Schedule>,
    zones: HashMap<&'p str, ThermalZone>,
    /// Keyed by equipment id; a micro turbine maps to its heat recovery.
    equipment: HashMap<&'p str, PlantEquipment>,
    loops: HashMap<&'p str, PlantLoop>,
}

impl<'p> Builder<'p> {
    fn lookup<T: Copy>(map: &HashMap<&'p str, T>, id: &str, what: &str) -> ModelResult<T> {
        map.get(id)
            .copied()
            .ok_or_else(|| rejected(format!("unknown {what} '{id}'")))
    }

    fn schedule(&mut self, def: &'p ScheduleDef) -> ModelResult<()> {
        let schedule = match &def.kind {
            ScheduleKind::Constant { value } => Schedule::constant(&mut self.model, *value)?,
            ScheduleKind::FixedInterval {
                start,
                interval_min,
                values,
            } => {
                let series = TimeSeries::fixed(*start, Duration::minutes(*interval_min), values.clone())?;
                Schedule::from_time_series(&mut self.model, &series)?
            }
            ScheduleKind::VariableInterval { start, times, values } => {
                let series = match start {
                    Some(start) => TimeSeries::variable(*start, times.clone(), values.clone())?,
                    None => TimeSeries::from_points(times.clone(), values.clone())?,
                };
                Schedule::from_time_series(&mut self.model, &series)?
            }
        };
        self.model.set_name(schedule.id(), &def.name);
        self.schedules.insert(&def.id, schedule);
        Ok(())
    }

    fn zone(&mut self, def: &'p ZoneDef) -> ModelResult<()> {
        let zone = ThermalZone::new(&mut self.model);
        self.model.set_name(zone.id(), &def.name);
        ensure(zone.set_multiplier(&mut self.model, def.multiplier), || {
            format!("zone '{}' multiplier {}", def.id, def.multiplier)
        })?;
        if def.ideal_air_loads {
            zone.set_use_ideal_air_loads(&mut self.model, true);
        }
        self.zones.insert(&def.id, zone);
        Ok(())
    }

    fn plant_equipment(&mut self, def: &'p EquipmentDef) -> ModelResult<PlantEquipment> {
        let eq = if def.kind == EquipmentKind::MicroTurbine {
            let generator = GeneratorMicroTurbine::new(&mut self.model);
            self.model.set_name(generator.id(), &def.name);
            let heat_recovery = generator.create_heat_recovery(&mut self.model);
            self.model
                .set_name(heat_recovery.id(), &format!("{} Heat Recovery", def.name));
            heat_recovery
        } else {
            let eq = PlantEquipment::new(&mut self.model, def.kind.model_kind());
            self.model.set_name(eq.id(), &def.name);
            eq
        };

        if let Some(flow) = def.design_flow_m3s {
            ensure(eq.set_design_flow_rate(&mut self.model, flow), || {
                format!("equipment '{}' design flow {flow}", def.id)
            })?;
        }
        if let Some(capacity) = def.capacity_w {
            ensure(eq.set_capacity(&mut self.model, capacity), || {
                format!("equipment '{}' capacity {capacity}", def.id)
            })?;
        }
        if let Some(control) = &def.control_type {
            ensure(eq.set_control_type(&mut self.model, control), || {
                format!("equipment '{}' control type '{control}'", def.id)
            })?;
        }
        self.equipment.insert(&def.id, eq);
        Ok(eq)
    }

    fn plant_loop(&mut self, def: &'p PlantLoopDef) -> ModelResult<()> {
        let lp = PlantLoop::new(&mut self.model);
        self.model.set_name(lp.id(), &def.name);
        let m = &mut self.model;
        ensure(lp.set_fluid_type(m, &def.fluid), || {
            format!("plant loop '{}' fluid '{}'", def.id, def.fluid)
        })?;
        if let Some(t) = def.max_temperature_c {
            ensure(lp.set_maximum_loop_temperature(m, t), || {
                format!("plant loop '{}' maximum temperature {t}", def.id)
            })?;
        }
        if let Some(t) = def.min_temperature_c {
            ensure(lp.set_minimum_loop_temperature(m, t), || {
                format!("plant loop '{}' minimum temperature {t}", def.id)
            })?;
        }
        if let Some(flow) = def.max_flow_m3s {
            ensure(lp.set_maximum_loop_flow_rate(m, flow), || {
                format!("plant loop '{}' maximum flow {flow}", def.id)
            })?;
        }
        if let Some(scheme) = &def.load_distribution {
            ensure(lp.set_load_distribution_scheme(m, scheme), || {
                format!("plant loop '{}' load distribution '{scheme}'", def.id)
            })?;
        }

        for eq_def in &def.supply_branches {
            let eq = self.plant_equipment(eq_def)?;
            ensure(lp.add_supply_branch_for_component(&mut self.model, eq), || {
                format!("supply branch for '{}' on '{}'", eq_def.id, def.id)
            })?;
        }

        // each insertion lands right after the inlet node, so go backwards
        let mut series = Vec::with_capacity(def.series.len());
        for eq_def in &def.series {
            series.push((eq_def, self.plant_equipment(eq_def)?));
        }
        for (eq_def, eq) in series.into_iter().rev() {
            let inlet = lp
                .supply_inlet_node(&self.model)
                .ok_or_else(|| rejected(format!("plant loop '{}' has no supply inlet", def.id)))?;
            ensure(eq.add_to_node(&mut self.model, inlet), || {
                format!("series equipment '{}' on '{}'", eq_def.id, def.id)
            })?;
        }

        debug!(plant_loop = %def.name, branches = def.supply_branches.len(), "built plant loop");
        self.loops.insert(&def.id, lp);
        Ok(())
    }

    fn demand_branches(&mut self, def: &'p PlantLoopDef) -> ModelResult<()> {
        let lp = Self::lookup(&self.loops, &def.id, "plant loop")?;
        for id in &def.demand_branches {
            let eq = Self::lookup(&self.equipment, id, "equipment")?;
            ensure(lp.add_demand_branch_for_component(&mut self.model, eq), || {
                format!("demand branch for '{id}' on '{}'", def.id)
            })?;
        }
        Ok(())
    }

    fn zone_equipment(&mut self, def: &'p ZoneDef) -> ModelResult<()> {
        let zone = Self::lookup(&self.zones, &def.id, "zone")?;
        for eq in &def.equipment {
            let added = match eq {
                ZoneEquipmentDef::Baseboard {
                    name,
                    heating_capacity_w,
                    ..
                } => {
                    let baseboard = ZoneHVACEquipment::new(&mut self.model);
                    self.model.set_name(baseboard.id(), name);
                    if let Some(capacity) = heating_capacity_w {
                        ensure(baseboard.set_heating_capacity(&mut self.model, *capacity), || {
                            format!("baseboard '{}' capacity {capacity}", eq.id())
                        })?;
                    }
                    baseboard.add_to_thermal_zone(&mut self.model, zone)
                }
                ZoneEquipmentDef::HeatPumpWaterHeater { name, tank_id, .. } => {
                    let tank = Self::lookup(&self.equipment, tank_id, "tank")?;
                    let hpwh = WaterHeaterHeatPump::new(&mut self.model, tank)
                        .ok_or_else(|| rejected(format!("heat pump '{}' tank '{tank_id}'", eq.id())))?;
                    self.model.set_name(hpwh.id(), name);
                    hpwh.add_to_thermal_zone(&mut self.model, zone)
                }
            };
            ensure(added, || format!("zone equipment '{}' in '{}'", eq.id(), def.id))?;
        }
        Ok(())
    }

    fn plant_controls(&mut self, def: &'p PlantLoopDef) -> ModelResult<()> {
        let lp = Self::lookup(&self.loops, &def.id, "plant loop")?;

        for spm_def in &def.setpoint_managers {
            let schedule = Self::lookup(&self.schedules, &spm_def.schedule_id, "schedule")?;
            let spm = SetpointManager::new_scheduled(&mut self.model, &spm_def.control_variable, schedule)
                .ok_or_else(|| {
                    rejected(format!(
                        "setpoint manager '{}' control variable '{}'",
                        spm_def.id, spm_def.control_variable
                    ))
                })?;
            self.model.set_name(spm.id(), &spm_def.name);
            let node = match &spm_def.equipment_id {
                Some(id) => {
                    let eq = Self::lookup(&self.equipment, id, "equipment")?;
                    self.model
                        .outlet_object(eq.id(), 0)
                        .and_then(|n| Node::from_id(&self.model, n))
                }
                None => lp.supply_outlet_node(&self.model),
            }
            .ok_or_else(|| rejected(format!("setpoint manager '{}' has no node", spm_def.id)))?;
            ensure(spm.add_to_node(&mut self.model, node), || {
                format!("setpoint manager '{}' node", spm_def.id)
            })?;
        }

        if let Some(def) = &def.heating_scheme {
            let (scheme, schedule) = self.scheme(def)?;
            ensure(lp.set_plant_equipment_operation_heating_load(&mut self.model, scheme), || {
                format!("heating scheme '{}'", def.name)
            })?;
            if let Some(s) = schedule {
                lp.set_plant_equipment_operation_heating_load_schedule(&mut self.model, s);
            }
        }
        if let Some(def) = &def.cooling_scheme {
            let (scheme, schedule) = self.scheme(def)?;
            ensure(lp.set_plant_equipment_operation_cooling_load(&mut self.model, scheme), || {
                format!("cooling scheme '{}'", def.name)
            })?;
            if let Some(s) = schedule {
                lp.set_plant_equipment_operation_cooling_load_schedule(&mut self.model, s);
            }
        }
        if let Some(def) = &def.primary_scheme {
            let (scheme, schedule) = self.scheme(def)?;
            ensure(lp.set_primary_plant_equipment_operation_scheme(&mut self.model, scheme), || {
                format!("primary scheme '{}'", def.name)
            })?;
            if let Some(s) = schedule {
                lp.set_primary_plant_equipment_operation_scheme_schedule(&mut self.model, s);
            }
        }
        if let Some(id) = &def.setpoint_scheme_schedule_id {
            let schedule = Self::lookup(&self.schedules, id, "schedule")?;
            lp.set_component_setpoint_operation_scheme_schedule(&mut self.model, schedule);
        }
        Ok(())
    }

    fn scheme(&mut self, def: &SchemeDef) -> ModelResult<(OperationScheme, Option<Schedule>)> {
        let scheme = OperationScheme::new(&mut self.model, def.kind.model_kind());
        self.model.set_name(scheme.id(), &def.name);
        for id in &def.equipment {
            let eq = Self::lookup(&self.equipment, id, "equipment")?;
            ensure(scheme.add_equipment(&mut self.model, eq), || {
                format!("scheme '{}' equipment '{id}'", def.name)
            })?;
        }
        for range in &def.ranges {
            let equipment = range
                .equipment
                .iter()
                .map(|id| Self::lookup(&self.equipment, id, "equipment"))
                .collect::<ModelResult<Vec<_>>>()?;
            ensure(scheme.add_load_range(&mut self.model, range.upper_w, &equipment), || {
                format!("scheme '{}' load range {}", def.name, range.upper_w)
            })?;
        }
        let schedule = def
            .schedule_id
            .as_deref()
            .map(|id| Self::lookup(&self.schedules, id, "schedule"))
            .transpose()?;
        Ok((scheme, schedule))
    }

    fn air_loop(&mut self, def: &'p AirLoopDef) -> ModelResult<()> {
        let air = AirLoopHVAC::new(&mut self.model);
        self.model.set_name(air.id(), &def.name);
        if let Some(flow) = def.design_supply_air_flow_m3s {
            ensure(air.set_design_supply_air_flow_rate(&mut self.model, flow), || {
                format!("air loop '{}' design flow {flow}", def.id)
            })?;
        }

        for branch in &def.branches {
            let zone = Self::lookup(&self.zones, &branch.zone_id, "zone")?;
            let terminal = match &branch.terminal {
                Some(t) => {
                    let terminal = AirTerminal::new(&mut self.model, t.kind.model_kind());
                    self.model.set_name(terminal.id(), &t.name);
                    if let Some(flow) = t.max_flow_m3s {
                        ensure(terminal.set_maximum_air_flow_rate(&mut self.model, flow), || {
                            format!("terminal '{}' flow {flow}", t.name)
                        })?;
                    }
                    if let Some(id) = &t.availability_schedule_id {
                        let schedule = Self::lookup(&self.schedules, id, "schedule")?;
                        terminal.set_availability_schedule(&mut self.model, schedule);
                    }
                    Some(terminal)
                }
                None => None,
            };
            ensure(air.add_branch_for_zone(&mut self.model, zone, terminal), || {
                format!("air loop '{}' branch for zone '{}'", def.id, branch.zone_id)
            })?;
        }

        // plenums go in once every zone has its branch
        for branch in &def.branches {
            let zone = Self::lookup(&self.zones, &branch.zone_id, "zone")?;
            if let Some(id) = &branch.supply_plenum_zone_id {
                let plenum = Self::lookup(&self.zones, id, "zone")?;
                ensure(zone.set_supply_plenum(&mut self.model, plenum), || {
                    format!("supply plenum '{id}' for zone '{}'", branch.zone_id)
                })?;
            }
            if let Some(id) = &branch.return_plenum_zone_id {
                let plenum = Self::lookup(&self.zones, id, "zone")?;
                ensure(zone.set_return_plenum(&mut self.model, plenum), || {
                    format!("return plenum '{id}' for zone '{}'", branch.zone_id)
                })?;
            }
        }

        if let Some(setpoint) = &def.supply_setpoint {
            let spm = match setpoint {
                AirSetpointDef::Scheduled {
                    name,
                    control_variable,
                    schedule_id,
                } => {
                    let schedule = Self::lookup(&self.schedules, schedule_id, "schedule")?;
                    let spm = SetpointManager::new_scheduled(&mut self.model, control_variable, schedule)
                        .ok_or_else(|| rejected(format!("setpoint manager '{name}' control variable '{control_variable}'")))?;
                    self.model.set_name(spm.id(), name);
                    spm
                }
                AirSetpointDef::SingleZoneReheat {
                    name,
                    control_zone_id,
                    min_supply_c,
                    max_supply_c,
                } => {
                    let spm = SetpointManager::new_single_zone_reheat(&mut self.model);
                    self.model.set_name(spm.id(), name);
                    ensure(
                        spm.set_supply_air_temperature_limits(&mut self.model, *min_supply_c, *max_supply_c),
                        || format!("setpoint manager '{name}' limits {min_supply_c}..{max_supply_c}"),
                    )?;
                    if let Some(id) = control_zone_id {
                        let zone = Self::lookup(&self.zones, id, "zone")?;
                        spm.set_control_zone(&mut self.model, zone);
                    }
                    spm
                }
            };
            let node = air
                .supply_outlet_node(&self.model)
                .ok_or_else(|| rejected(format!("air loop '{}' has no supply outlet", def.id)))?;
            ensure(spm.add_to_node(&mut self.model, node), || {
                format!("supply setpoint on air loop '{}'", def.id)
            })?;
        }

        debug!(air_loop = %def.name, zones = def.branches.len(), "built air loop");
        Ok(())
    }
}
