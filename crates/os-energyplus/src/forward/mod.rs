//! Model to IDF translation.
//!
//! Each model object maps to at most one primary record, created on first
//! request and remembered for the rest of the run. Loops emit the records
//! that only exist in IDF (branches, connectors, paths, operation schemes)
//! while they are translated.

mod air_loop;
mod equipment;
pub mod operation_schemes;
mod plant_loop;
mod schedules;
mod setpoints;
mod zones;

use std::collections::HashMap;

use os_core::{Handle, ObjectId};
use os_idf::{write_idf, RecordType, Value, Workspace};
use os_model::{
    AirLoopHVAC, AirTerminal, GeneratorMicroTurbine, Model, ObjectType, OperationScheme,
    PlantEquipment, PlantLoop, ReturnPlenum, Schedule, SetpointManager, SupplyPlenum,
    ThermalZone, WaterHeaterHeatPump, ZoneHVACEquipment,
};
use tracing::{debug, info, warn};

use crate::diagnostics::{Diagnostic, Level};
use crate::error::TranslateResult;
use crate::options::ForwardTranslatorOptions;

#[derive(Debug, Clone, Default)]
pub struct ForwardTranslator {
    options: ForwardTranslatorOptions,
}

/// Records produced by one run plus everything worth telling the user.
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    pub workspace: Workspace,
    pub diagnostics: Vec<Diagnostic>,
}

impl TranslationOutput {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Warn)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Error)
    }

    pub fn to_idf(&self, comments: bool) -> String {
        write_idf(&self.workspace, comments)
    }
}

impl ForwardTranslator {
    pub fn new(options: ForwardTranslatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ForwardTranslatorOptions {
        &self.options
    }

    /// Translate every object of `model`. Objects that fail are left out of
    /// the workspace and reported in the diagnostics.
    pub fn translate_model(&self, model: &Model) -> TranslationOutput {
        info!(objects = model.len(), "forward translation started");
        let mut cx = Context::new(model, &self.options);
        cx.run();
        let output = cx.finish();
        info!(
            records = output.workspace.len(),
            warnings = output.warnings().count(),
            errors = output.errors().count(),
            "forward translation finished"
        );
        output
    }
}

/// State of one translation run.
pub(crate) struct Context<'a> {
    pub(crate) model: &'a Model,
    pub(crate) options: &'a ForwardTranslatorOptions,
    pub(crate) workspace: Workspace,
    diagnostics: Vec<Diagnostic>,
    mapped: HashMap<ObjectId, Option<Handle>>,
    /// Records made by the translations still in progress, innermost last.
    pending: Vec<Handle>,
    always_on: Option<String>,
}

impl<'a> Context<'a> {
    fn new(model: &'a Model, options: &'a ForwardTranslatorOptions) -> Self {
        Self {
            model,
            options,
            workspace: Workspace::new(),
            diagnostics: Vec::new(),
            mapped: HashMap::new(),
            pending: Vec::new(),
            always_on: None,
        }
    }

    fn run(&mut self) {
        const ORDER: &[ObjectType] = &[
            ObjectType::Schedule,
            ObjectType::ThermalZone,
            ObjectType::PlantLoop,
            ObjectType::AirLoopHvac,
            ObjectType::SetpointManager,
            ObjectType::ZoneHvacEquipment,
            ObjectType::WaterHeaterHeatPump,
            ObjectType::GeneratorMicroTurbine,
        ];
        for ty in ORDER {
            for id in self.model.objects_of_type(*ty) {
                self.translate(id);
            }
        }

        // plant equipment is emitted by the branches holding it
        for id in self.model.objects_of_type(ObjectType::PlantEquipment) {
            if self.mapped.contains_key(&id) {
                continue;
            }
            let on_loop = PlantEquipment::from_id(self.model, id).is_some_and(|e| {
                e.plant_loop(self.model).is_some() || e.secondary_plant_loop(self.model).is_some()
            });
            if !on_loop {
                self.warn(Some(id), "not connected to any plant loop; skipped");
            }
        }
    }

    fn finish(self) -> TranslationOutput {
        TranslationOutput {
            workspace: self.workspace,
            diagnostics: self.diagnostics,
        }
    }

    /// Primary record of `id`, translating it on first use.
    ///
    /// A failed translation takes back every record it made. Records of
    /// objects it translated along the way stay, since those succeeded.
    pub(crate) fn translate(&mut self, id: ObjectId) -> Option<Handle> {
        if let Some(known) = self.mapped.get(&id) {
            return *known;
        }
        self.mapped.insert(id, None);
        let mark = self.pending.len();
        let result = match self.dispatch(id) {
            Ok(handle) => handle,
            Err(e) => {
                let dropped = self.pending.split_off(mark);
                for h in dropped.into_iter().rev() {
                    self.workspace.remove_record(h);
                }
                self.error(Some(id), e.to_string());
                None
            }
        };
        self.pending.truncate(mark);
        self.mapped.insert(id, result);
        result
    }

    fn dispatch(&mut self, id: ObjectId) -> TranslateResult<Option<Handle>> {
        let model = self.model;
        let Some(ty) = model.object_type(id) else {
            return Ok(None);
        };
        debug!(object = %id, object_type = ty.as_str(), "translate");
        match ty {
            ObjectType::Schedule => match Schedule::from_id(model, id) {
                Some(s) => schedules::translate_schedule(self, s),
                None => Ok(None),
            },
            ObjectType::ThermalZone => match ThermalZone::from_id(model, id) {
                Some(z) => zones::translate_zone(self, z),
                None => Ok(None),
            },
            ObjectType::ZoneHvacEquipment => match ZoneHVACEquipment::from_id(model, id) {
                Some(b) => zones::translate_baseboard(self, b),
                None => Ok(None),
            },
            ObjectType::PlantLoop => match PlantLoop::from_id(model, id) {
                Some(lp) => plant_loop::translate_plant_loop(self, lp),
                None => Ok(None),
            },
            ObjectType::PlantEquipment => match PlantEquipment::from_id(model, id) {
                Some(e) => equipment::translate_plant_equipment(self, e),
                None => Ok(None),
            },
            ObjectType::GeneratorMicroTurbine => match GeneratorMicroTurbine::from_id(model, id) {
                Some(g) => equipment::translate_generator(self, g),
                None => Ok(None),
            },
            ObjectType::WaterHeaterHeatPump => match WaterHeaterHeatPump::from_id(model, id) {
                Some(h) => equipment::translate_heat_pump_water_heater(self, h),
                None => Ok(None),
            },
            ObjectType::OperationScheme => match OperationScheme::from_id(model, id) {
                Some(s) => operation_schemes::translate_authored_scheme(self, s),
                None => Ok(None),
            },
            ObjectType::AirLoopHvac => match AirLoopHVAC::from_id(model, id) {
                Some(lp) => air_loop::translate_air_loop(self, lp),
                None => Ok(None),
            },
            ObjectType::AirTerminal => match AirTerminal::from_id(model, id) {
                Some(t) => air_loop::translate_terminal(self, t),
                None => Ok(None),
            },
            ObjectType::SupplyPlenum => match SupplyPlenum::from_id(model, id) {
                Some(p) => air_loop::translate_supply_plenum(self, p),
                None => Ok(None),
            },
            ObjectType::ReturnPlenum => match ReturnPlenum::from_id(model, id) {
                Some(p) => air_loop::translate_return_plenum(self, p),
                None => Ok(None),
            },
            ObjectType::SetpointManager => match SetpointManager::from_id(model, id) {
                Some(s) => setpoints::translate_setpoint_manager(self, s),
                None => Ok(None),
            },
            // written by the loop that owns them
            ObjectType::Node
            | ObjectType::ConnectorSplitter
            | ObjectType::ConnectorMixer
            | ObjectType::ZoneSplitter
            | ObjectType::ZoneMixer => Ok(None),
        }
    }

    pub(crate) fn warn(&mut self, object: Option<ObjectId>, message: impl Into<String>) {
        let d = Diagnostic::warn(object.map(|id| self.name_of(id)), message);
        warn!("{d}");
        self.diagnostics.push(d);
    }

    pub(crate) fn error(&mut self, object: Option<ObjectId>, message: impl Into<String>) {
        let d = Diagnostic::error(object.map(|id| self.name_of(id)), message);
        warn!("{d}");
        self.diagnostics.push(d);
    }

    /// Model name of `id`; empty for unknown objects.
    pub(crate) fn name_of(&self, id: ObjectId) -> String {
        self.model.name(id).unwrap_or_default().to_string()
    }

    /// Name of the object wired to inlet `pair` of `id`.
    pub(crate) fn inlet_name(&self, id: ObjectId, pair: u32) -> String {
        self.model
            .inlet_object(id, pair)
            .map(|o| self.name_of(o))
            .unwrap_or_default()
    }

    pub(crate) fn outlet_name(&self, id: ObjectId, pair: u32) -> String {
        self.model
            .outlet_object(id, pair)
            .map(|o| self.name_of(o))
            .unwrap_or_default()
    }

    pub(crate) fn new_record(&mut self, ty: RecordType, name: &str) -> TranslateResult<Handle> {
        let h = self.workspace.create_named(ty, name)?;
        self.pending.push(h);
        Ok(h)
    }

    /// Record type without a name field.
    pub(crate) fn new_unnamed(&mut self, ty: RecordType) -> Handle {
        let h = self.workspace.create_record(ty);
        self.pending.push(h);
        h
    }

    pub(crate) fn set(&mut self, h: Handle, field: &str, value: Value) -> TranslateResult<()> {
        Ok(self.workspace.set_field_by_name(h, field, value)?)
    }

    pub(crate) fn set_text(&mut self, h: Handle, field: &str, text: &str) -> TranslateResult<()> {
        self.set(h, field, Value::text(text))
    }

    /// `None` is written as `Autosize`.
    pub(crate) fn set_sizable(
        &mut self,
        h: Handle,
        field: &str,
        value: Option<f64>,
    ) -> TranslateResult<()> {
        self.set(h, field, value.map_or(Value::Autosize, Value::Real))
    }

    pub(crate) fn push(&mut self, h: Handle, values: Vec<Value>) -> TranslateResult<()> {
        self.workspace.push_group(h, values)?;
        Ok(())
    }

    /// IDF keyword and name of a translated record.
    pub(crate) fn record_ref(&self, h: Handle) -> Option<(&'static str, String)> {
        let record = self.workspace.record(h)?;
        Some((
            record.record_type().keyword(),
            record.name().unwrap_or_default().to_string(),
        ))
    }

    /// Name of the shared constant 1.0 schedule, created on first use.
    pub(crate) fn always_on(&mut self) -> TranslateResult<String> {
        if let Some(name) = &self.always_on {
            return Ok(name.clone());
        }
        // shared by every object, so it outlives a failed translation
        let name = self.options.always_on_schedule_name.clone();
        let h = self.workspace.create_named(RecordType::ScheduleConstant, &name)?;
        self.set(h, "Hourly Value", Value::Real(1.0))?;
        self.always_on = Some(name.clone());
        Ok(name)
    }

    /// Record name for an optional schedule reference. A missing or
    /// untranslatable schedule falls back to always-on.
    pub(crate) fn schedule_name(&mut self, schedule: Option<Schedule>) -> TranslateResult<String> {
        let Some(schedule) = schedule else {
            return self.always_on();
        };
        match self.translate(schedule.id()).and_then(|h| self.record_ref(h)) {
            Some((_, name)) => Ok(name),
            None => {
                self.warn(
                    Some(schedule.id()),
                    "schedule could not be translated; always on used instead",
                );
                self.always_on()
            }
        }
    }
}

/// Zone air node name written for a zone record.
pub(crate) fn zone_air_node_name(zone_name: &str) -> String {
    format!("{zone_name} Zone Air Node")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_on_is_created_once() {
        let model = Model::new();
        let options = ForwardTranslatorOptions::default();
        let mut cx = Context::new(&model, &options);
        let a = cx.always_on().unwrap();
        let b = cx.schedule_name(None).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            cx.workspace
                .objects_by_type(RecordType::ScheduleConstant)
                .len(),
            1
        );
    }

    #[test]
    fn empty_model_translates_to_empty_workspace() {
        let out = ForwardTranslator::default().translate_model(&Model::new());
        assert!(out.workspace.is_empty());
        assert!(out.diagnostics.is_empty());
    }
}
