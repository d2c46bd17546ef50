//! Single-duct air terminals in front of a zone.

use os_core::ObjectId;
use tracing::debug;

use crate::connectors::handle;
use crate::hvac::{insert_at_node, LoopRef, Node, Side};
use crate::model::Model;
use crate::objects::{AirTerminalData, AirTerminalKind, Branching, ObjectKind, ObjectType};
use crate::schedule::Schedule;

handle!(AirTerminal);

impl AirTerminal {
    pub fn new(model: &mut Model, kind: AirTerminalKind) -> Self {
        AirTerminal(model.add_object(ObjectKind::AirTerminal(AirTerminalData {
            kind,
            maximum_air_flow_rate: None,
            availability_schedule: None,
        })))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model.is_type(id, ObjectType::AirTerminal).then_some(AirTerminal(id))
    }

    pub fn kind(self, model: &Model) -> Option<AirTerminalKind> {
        model.terminal_data(self.0).map(|t| t.kind)
    }

    /// Direct-air terminals have no inlet node of their own.
    pub fn is_direct_air(self, model: &Model) -> bool {
        self.kind(model) == Some(AirTerminalKind::Uncontrolled)
    }

    pub fn maximum_air_flow_rate(self, model: &Model) -> Option<f64> {
        model.terminal_data(self.0)?.maximum_air_flow_rate
    }

    pub fn is_maximum_air_flow_rate_autosized(self, model: &Model) -> bool {
        model
            .terminal_data(self.0)
            .is_some_and(|t| t.maximum_air_flow_rate.is_none())
    }

    pub fn set_maximum_air_flow_rate(self, model: &mut Model, value: f64) -> bool {
        value.is_finite()
            && value >= 0.0
            && model
                .terminal_data_mut(self.0)
                .map(|t| t.maximum_air_flow_rate = Some(value))
                .is_some()
    }

    pub fn autosize_maximum_air_flow_rate(self, model: &mut Model) {
        if let Some(t) = model.terminal_data_mut(self.0) {
            t.maximum_air_flow_rate = None;
        }
    }

    pub fn availability_schedule(self, model: &Model) -> Option<Schedule> {
        model.terminal_data(self.0)?.availability_schedule.map(Schedule)
    }

    pub fn set_availability_schedule(self, model: &mut Model, schedule: Schedule) -> bool {
        model.is_type(schedule.id(), ObjectType::Schedule)
            && model
                .terminal_data_mut(self.0)
                .map(|t| t.availability_schedule = Some(schedule.id()))
                .is_some()
    }

    /// Unconnected copy with the same fields.
    pub fn clone_terminal(self, model: &mut Model) -> Option<AirTerminal> {
        let data = model.terminal_data(self.0)?.clone();
        let copy = AirTerminal(model.add_object(ObjectKind::AirTerminal(data)));
        debug!(from = %self.0, to = %copy.0, "clone air terminal");
        Some(copy)
    }

    /// Insert in front of the zone fed by `node`. `node` must be a zone
    /// inlet on an air loop demand side, directly behind a splitter.
    pub fn add_to_node(self, model: &mut Model, node: Node) -> bool {
        if !model.contains(self.0) || model.is_connected(self.0) {
            return false;
        }
        if !matches!(model.loop_of(node.id()), Some((LoopRef::Air(_), Side::Demand))) {
            return false;
        }
        let feeds_zone = node
            .outlet_object(model)
            .is_some_and(|o| model.is_type(o, ObjectType::ThermalZone));
        let Some(feed) = model.upstream_port(node.id(), 0) else {
            return false;
        };
        let behind_splitter = model
            .object_type(feed.object)
            .is_some_and(|t| t.branching() == Branching::Splitter);
        if !feeds_zone || !behind_splitter {
            return false;
        }

        if self.is_direct_air(model) {
            // splitter -> terminal -> node -> zone
            model.disconnect_inlet(node.id(), 0);
            model.connect(feed.object, feed.index, self.0, 0);
            model.connect(self.0, 0, node.id(), 0);
            debug!(terminal = %self.0, node = %node.id(), "add direct air terminal");
            true
        } else {
            insert_at_node(model, self.0, 0, node)
        }
    }
}
