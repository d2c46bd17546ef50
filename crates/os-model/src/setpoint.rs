//! Setpoint managers attached to nodes.

use os_core::ObjectId;
use tracing::debug;

use crate::connectors::handle;
use crate::hvac::{LoopRef, Node, Side};
use crate::model::Model;
use crate::objects::{ObjectKind, ObjectType, SetpointManagerData};
use crate::schedule::Schedule;
use crate::thermal_zone::ThermalZone;

pub const CONTROL_VARIABLES: &[&str] = &[
    "Temperature",
    "MaximumTemperature",
    "MinimumTemperature",
    "HumidityRatio",
    "MaximumHumidityRatio",
    "MinimumHumidityRatio",
    "MassFlowRate",
    "MaximumMassFlowRate",
    "MinimumMassFlowRate",
];

handle!(SetpointManager);

impl SetpointManager {
    /// Follows `schedule` for `control_variable`.
    pub fn new_scheduled(model: &mut Model, control_variable: &str, schedule: Schedule) -> Option<Self> {
        let keyword = CONTROL_VARIABLES
            .iter()
            .find(|k| k.eq_ignore_ascii_case(control_variable))?;
        if !model.is_type(schedule.id(), ObjectType::Schedule) {
            return None;
        }
        Some(SetpointManager(model.add_object(ObjectKind::SetpointManager(
            SetpointManagerData::Scheduled {
                control_variable: keyword.to_string(),
                schedule: schedule.id(),
                node: None,
            },
        ))))
    }

    /// Supply air temperature reset from one control zone; air loop supply
    /// nodes only.
    pub fn new_single_zone_reheat(model: &mut Model) -> Self {
        SetpointManager(model.add_object(ObjectKind::SetpointManager(
            SetpointManagerData::SingleZoneReheat {
                control_zone: None,
                minimum_supply_air_temperature: -99.0,
                maximum_supply_air_temperature: 99.0,
                node: None,
            },
        )))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model
            .is_type(id, ObjectType::SetpointManager)
            .then_some(SetpointManager(id))
    }

    pub fn is_single_zone_reheat(self, model: &Model) -> bool {
        matches!(
            model.spm_data(self.0),
            Some(SetpointManagerData::SingleZoneReheat { .. })
        )
    }

    pub fn control_variable(self, model: &Model) -> Option<&str> {
        model.spm_data(self.0).map(SetpointManagerData::control_variable)
    }

    pub fn schedule(self, model: &Model) -> Option<Schedule> {
        match model.spm_data(self.0)? {
            SetpointManagerData::Scheduled { schedule, .. } => Some(Schedule(*schedule)),
            SetpointManagerData::SingleZoneReheat { .. } => None,
        }
    }

    /// Attached node, if it still exists.
    pub fn node(self, model: &Model) -> Option<Node> {
        model
            .spm_data(self.0)?
            .node()
            .filter(|n| model.is_type(*n, ObjectType::Node))
            .map(Node)
    }

    /// Attach to `node`, replacing any manager there with the same control
    /// variable.
    pub fn add_to_node(self, model: &mut Model, node: Node) -> bool {
        if !model.is_type(node.id(), ObjectType::Node) || !model.contains(self.0) {
            return false;
        }
        let air_supply = match model.loop_of(node.id()) {
            Some((LoopRef::Air(lp), Side::Supply)) => Some(lp),
            _ => None,
        };
        if self.is_single_zone_reheat(model) && air_supply.is_none() {
            return false;
        }

        self.detach(model);
        let variable = self.control_variable(model).unwrap_or_default().to_string();
        let replaced: Vec<ObjectId> = node
            .setpoint_managers(model)
            .into_iter()
            .filter(|s| s.control_variable(model) == Some(variable.as_str()))
            .map(SetpointManager::id)
            .collect();
        for old in replaced {
            debug!(node = %node.id(), replaced = %old, "replace setpoint manager");
            SetpointManager(old).remove(model);
        }

        if let Some(n) = model.node_data_mut(node.id()) {
            n.setpoint_managers.push(self.0);
        }
        if let Some(d) = model.spm_data_mut(self.0) {
            d.set_node(Some(node.id()));
        }

        if let Some(lp) = air_supply {
            if self.is_single_zone_reheat(model) && self.control_zone(model).is_none() {
                if let Some(zone) = lp.thermal_zones(model).first() {
                    self.set_control_zone(model, *zone);
                }
            }
        }
        true
    }

    fn detach(self, model: &mut Model) {
        let Some(old) = model.spm_data(self.0).and_then(SetpointManagerData::node) else {
            return;
        };
        if let Some(n) = model.node_data_mut(old) {
            n.setpoint_managers.retain(|s| *s != self.0);
        }
        if let Some(d) = model.spm_data_mut(self.0) {
            d.set_node(None);
        }
    }

    pub fn remove(self, model: &mut Model) {
        self.detach(model);
        model.remove_object(self.0);
    }

    pub fn control_zone(self, model: &Model) -> Option<ThermalZone> {
        match model.spm_data(self.0)? {
            SetpointManagerData::SingleZoneReheat { control_zone, .. } => control_zone.map(ThermalZone),
            SetpointManagerData::Scheduled { .. } => None,
        }
    }

    pub fn set_control_zone(self, model: &mut Model, zone: ThermalZone) -> bool {
        if !model.is_type(zone.id(), ObjectType::ThermalZone) {
            return false;
        }
        match model.spm_data_mut(self.0) {
            Some(SetpointManagerData::SingleZoneReheat { control_zone, .. }) => {
                *control_zone = Some(zone.id());
                true
            }
            _ => false,
        }
    }

    pub fn reset_control_zone(self, model: &mut Model) {
        if let Some(SetpointManagerData::SingleZoneReheat { control_zone, .. }) =
            model.spm_data_mut(self.0)
        {
            *control_zone = None;
        }
    }

    pub fn minimum_supply_air_temperature(self, model: &Model) -> Option<f64> {
        match model.spm_data(self.0)? {
            SetpointManagerData::SingleZoneReheat {
                minimum_supply_air_temperature,
                ..
            } => Some(*minimum_supply_air_temperature),
            SetpointManagerData::Scheduled { .. } => None,
        }
    }

    pub fn maximum_supply_air_temperature(self, model: &Model) -> Option<f64> {
        match model.spm_data(self.0)? {
            SetpointManagerData::SingleZoneReheat {
                maximum_supply_air_temperature,
                ..
            } => Some(*maximum_supply_air_temperature),
            SetpointManagerData::Scheduled { .. } => None,
        }
    }

    /// Both limits at once; the minimum must not exceed the maximum.
    pub fn set_supply_air_temperature_limits(self, model: &mut Model, minimum: f64, maximum: f64) -> bool {
        if !minimum.is_finite() || !maximum.is_finite() || minimum > maximum {
            return false;
        }
        match model.spm_data_mut(self.0) {
            Some(SetpointManagerData::SingleZoneReheat {
                minimum_supply_air_temperature,
                maximum_supply_air_temperature,
                ..
            }) => {
                *minimum_supply_air_temperature = minimum;
                *maximum_supply_air_temperature = maximum;
                true
            }
            _ => false,
        }
    }
}
