//! Plant loops: a supply side and a demand side, each
//! `inlet node -> splitter -> branches -> mixer -> outlet node`.

use os_core::ObjectId;
use tracing::debug;

use crate::connectors::{handle, ConnectorMixer, ConnectorSplitter, Mixer, Splitter};
use crate::equipment::PlantEquipment;
use crate::hvac::{Node, Side};
use crate::model::Model;
use crate::objects::{ObjectKind, ObjectType, OperationSchemeKind, PlantLoopData};
use crate::schedule::Schedule;
use crate::scheme::OperationScheme;

handle!(PlantLoop);

pub const FLUID_TYPES: &[&str] = &["Water", "Steam"];
pub const LOAD_DISTRIBUTION_SCHEMES: &[&str] = &[
    "Optimal",
    "SequentialLoad",
    "UniformLoad",
    "UniformPLR",
    "SequentialUniformPLR",
];

/// Build `inlet -> splitter -> node -> mixer -> outlet` and return its ids.
fn build_side(model: &mut Model) -> [ObjectId; 4] {
    let inlet = Node::new(model).id();
    let splitter = model.add_object(ObjectKind::ConnectorSplitter);
    let branch = Node::new(model).id();
    let mixer = model.add_object(ObjectKind::ConnectorMixer);
    let outlet = Node::new(model).id();
    model.connect(inlet, 0, splitter, 0);
    model.connect(splitter, 0, branch, 0);
    model.connect(branch, 0, mixer, 0);
    model.connect(mixer, 0, outlet, 0);
    [inlet, splitter, mixer, outlet]
}

fn keyword(options: &[&str], value: &str) -> Option<String> {
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(value))
        .map(|o| o.to_string())
}

impl PlantLoop {
    pub fn new(model: &mut Model) -> Self {
        let [supply_inlet, supply_splitter, supply_mixer, supply_outlet] = build_side(model);
        let [demand_inlet, demand_splitter, demand_mixer, demand_outlet] = build_side(model);
        let data = PlantLoopData {
            supply_inlet,
            supply_outlet,
            supply_splitter,
            supply_mixer,
            demand_inlet,
            demand_outlet,
            demand_splitter,
            demand_mixer,
            fluid_type: "Water".to_string(),
            maximum_loop_temperature: 100.0,
            minimum_loop_temperature: 0.0,
            maximum_loop_flow_rate: None,
            load_distribution_scheme: "Optimal".to_string(),
            heating_load_scheme: None,
            heating_load_schedule: None,
            cooling_load_scheme: None,
            cooling_load_schedule: None,
            primary_scheme: None,
            primary_schedule: None,
            component_setpoint_schedule: None,
        };
        PlantLoop(model.add_object(ObjectKind::PlantLoop(Box::new(data))))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model.is_type(id, ObjectType::PlantLoop).then_some(PlantLoop(id))
    }

    fn data(self, model: &Model) -> Option<&PlantLoopData> {
        model.plant_loop_data(self.0).map(|b| b.as_ref())
    }

    fn data_mut(self, model: &mut Model) -> Option<&mut PlantLoopData> {
        model.plant_loop_data_mut(self.0).map(|b| b.as_mut())
    }

    pub fn supply_inlet_node(self, model: &Model) -> Option<Node> {
        self.data(model).map(|d| Node(d.supply_inlet))
    }

    pub fn supply_outlet_node(self, model: &Model) -> Option<Node> {
        self.data(model).map(|d| Node(d.supply_outlet))
    }

    pub fn demand_inlet_node(self, model: &Model) -> Option<Node> {
        self.data(model).map(|d| Node(d.demand_inlet))
    }

    pub fn demand_outlet_node(self, model: &Model) -> Option<Node> {
        self.data(model).map(|d| Node(d.demand_outlet))
    }

    pub fn supply_splitter(self, model: &Model) -> Option<ConnectorSplitter> {
        self.data(model).map(|d| ConnectorSplitter(d.supply_splitter))
    }

    pub fn supply_mixer(self, model: &Model) -> Option<ConnectorMixer> {
        self.data(model).map(|d| ConnectorMixer(d.supply_mixer))
    }

    pub fn demand_splitter(self, model: &Model) -> Option<ConnectorSplitter> {
        self.data(model).map(|d| ConnectorSplitter(d.demand_splitter))
    }

    pub fn demand_mixer(self, model: &Model) -> Option<ConnectorMixer> {
        self.data(model).map(|d| ConnectorMixer(d.demand_mixer))
    }

    fn splitter_mixer(self, model: &Model, side: Side) -> Option<(ConnectorSplitter, ConnectorMixer)> {
        match side {
            Side::Supply => Some((self.supply_splitter(model)?, self.supply_mixer(model)?)),
            Side::Demand => Some((self.demand_splitter(model)?, self.demand_mixer(model)?)),
        }
    }

    /// Supply inlet node through supply outlet node.
    pub fn supply_components(self, model: &Model) -> Vec<ObjectId> {
        self.supply_components_between(model, None, None, None)
    }

    /// Supply-side walk from `start` (default inlet node) to `end` (default
    /// outlet node), optionally keeping one object type.
    pub fn supply_components_between(
        self,
        model: &Model,
        start: Option<ObjectId>,
        end: Option<ObjectId>,
        filter: Option<ObjectType>,
    ) -> Vec<ObjectId> {
        let (Some(inlet), Some(outlet)) = (self.supply_inlet_node(model), self.supply_outlet_node(model))
        else {
            return Vec::new();
        };
        walk(model, start.unwrap_or(inlet.id()), end.unwrap_or(outlet.id()), filter)
    }

    pub fn demand_components(self, model: &Model) -> Vec<ObjectId> {
        self.demand_components_between(model, None, None, None)
    }

    pub fn demand_components_between(
        self,
        model: &Model,
        start: Option<ObjectId>,
        end: Option<ObjectId>,
        filter: Option<ObjectType>,
    ) -> Vec<ObjectId> {
        let (Some(inlet), Some(outlet)) = (self.demand_inlet_node(model), self.demand_outlet_node(model))
        else {
            return Vec::new();
        };
        walk(model, start.unwrap_or(inlet.id()), end.unwrap_or(outlet.id()), filter)
    }

    /// Put `comp` on a new parallel supply branch.
    pub fn add_supply_branch_for_component(self, model: &mut Model, comp: PlantEquipment) -> bool {
        self.add_branch_for_component(model, Side::Supply, comp)
    }

    /// Put `comp` on a new parallel demand branch; two-pair equipment uses
    /// its demand-side pair.
    pub fn add_demand_branch_for_component(self, model: &mut Model, comp: PlantEquipment) -> bool {
        self.add_branch_for_component(model, Side::Demand, comp)
    }

    fn add_branch_for_component(self, model: &mut Model, side: Side, comp: PlantEquipment) -> bool {
        let Some((splitter, mixer)) = self.splitter_mixer(model, side) else {
            return false;
        };
        let pair = comp.pair_for_side(model, side);
        if model.upstream_port(comp.id(), pair).is_some() {
            return false;
        }

        // a lone empty branch is splitter -> node -> mixer; reuse its node
        let placeholder = if model.components_between(splitter.id(), mixer.id()).len() == 3 {
            splitter.outlet_object(model, 0).map(Node)
        } else {
            None
        };
        let (node, created) = match placeholder {
            Some(node) => (node, false),
            None => {
                let node = Node::new(model);
                let outlet = splitter.next_outlet_port(model);
                let inlet = mixer.next_inlet_port(model);
                model.connect(splitter.id(), outlet, node.id(), 0);
                model.connect(node.id(), 0, mixer.id(), inlet);
                (node, true)
            }
        };

        if comp.add_to_node(model, node) {
            debug!(plant_loop = %self.0, comp = %comp.id(), ?side, "add branch for component");
            return true;
        }
        if created {
            if let Some(b) = splitter.branch_index_for_outlet_object(model, node.id()) {
                splitter.remove_port_for_branch(model, b);
            }
            if let Some(b) = mixer.branch_index_for_inlet_object(model, node.id()) {
                mixer.remove_port_for_branch(model, b);
            }
            model.remove_object(node.id());
        }
        false
    }

    pub fn remove_supply_branch_with_component(self, model: &mut Model, comp: PlantEquipment) -> bool {
        self.remove_branch_with_component(model, Side::Supply, comp)
    }

    pub fn remove_demand_branch_with_component(self, model: &mut Model, comp: PlantEquipment) -> bool {
        self.remove_branch_with_component(model, Side::Demand, comp)
    }

    fn remove_branch_with_component(self, model: &mut Model, side: Side, comp: PlantEquipment) -> bool {
        let Some((splitter, mixer)) = self.splitter_mixer(model, side) else {
            return false;
        };
        let heads = splitter.outlet_objects(model);
        let Some(branch) = heads
            .iter()
            .map(|head| {
                let mut comps = model.components_between(*head, mixer.id());
                comps.pop();
                comps
            })
            .find(|comps| comps.contains(&comp.id()))
        else {
            return false;
        };
        let (Some(&head), Some(&tail)) = (branch.first(), branch.last()) else {
            return false;
        };

        if let Some(b) = splitter.branch_index_for_outlet_object(model, head) {
            splitter.remove_port_for_branch(model, b);
        }
        if let Some(b) = mixer.branch_index_for_inlet_object(model, tail) {
            mixer.remove_port_for_branch(model, b);
        }
        for id in branch {
            if model.is_type(id, ObjectType::Node) {
                model.remove_object(id);
            } else {
                let p = PlantEquipment(id).pair_for_side(model, side);
                model.disconnect_inlet(id, p);
                model.disconnect_outlet(id, p);
            }
        }

        if splitter.outlet_objects(model).is_empty() {
            let node = Node::new(model);
            model.connect(splitter.id(), 0, node.id(), 0);
            model.connect(node.id(), 0, mixer.id(), 0);
        }
        debug!(plant_loop = %self.0, comp = %comp.id(), ?side, "remove branch with component");
        true
    }

    // ---- fields ------------------------------------------------------

    pub fn fluid_type(self, model: &Model) -> Option<&str> {
        self.data(model).map(|d| d.fluid_type.as_str())
    }

    pub fn set_fluid_type(self, model: &mut Model, value: &str) -> bool {
        let Some(v) = keyword(FLUID_TYPES, value) else {
            return false;
        };
        self.data_mut(model).map(|d| d.fluid_type = v).is_some()
    }

    pub fn maximum_loop_temperature(self, model: &Model) -> Option<f64> {
        self.data(model).map(|d| d.maximum_loop_temperature)
    }

    pub fn set_maximum_loop_temperature(self, model: &mut Model, value: f64) -> bool {
        value.is_finite()
            && self
                .data_mut(model)
                .map(|d| d.maximum_loop_temperature = value)
                .is_some()
    }

    pub fn minimum_loop_temperature(self, model: &Model) -> Option<f64> {
        self.data(model).map(|d| d.minimum_loop_temperature)
    }

    pub fn set_minimum_loop_temperature(self, model: &mut Model, value: f64) -> bool {
        value.is_finite()
            && self
                .data_mut(model)
                .map(|d| d.minimum_loop_temperature = value)
                .is_some()
    }

    /// `None` when autosized.
    pub fn maximum_loop_flow_rate(self, model: &Model) -> Option<f64> {
        self.data(model)?.maximum_loop_flow_rate
    }

    pub fn is_maximum_loop_flow_rate_autosized(self, model: &Model) -> bool {
        self.data(model).is_some_and(|d| d.maximum_loop_flow_rate.is_none())
    }

    pub fn set_maximum_loop_flow_rate(self, model: &mut Model, value: f64) -> bool {
        value.is_finite()
            && value >= 0.0
            && self
                .data_mut(model)
                .map(|d| d.maximum_loop_flow_rate = Some(value))
                .is_some()
    }

    pub fn autosize_maximum_loop_flow_rate(self, model: &mut Model) {
        if let Some(d) = self.data_mut(model) {
            d.maximum_loop_flow_rate = None;
        }
    }

    pub fn load_distribution_scheme(self, model: &Model) -> Option<&str> {
        self.data(model).map(|d| d.load_distribution_scheme.as_str())
    }

    pub fn set_load_distribution_scheme(self, model: &mut Model, value: &str) -> bool {
        let Some(v) = keyword(LOAD_DISTRIBUTION_SCHEMES, value) else {
            return false;
        };
        self.data_mut(model)
            .map(|d| d.load_distribution_scheme = v)
            .is_some()
    }

    // ---- authored operation schemes ------------------------------------

    pub fn plant_equipment_operation_heating_load(self, model: &Model) -> Option<OperationScheme> {
        self.data(model)?.heating_load_scheme.map(OperationScheme)
    }

    pub fn set_plant_equipment_operation_heating_load(
        self,
        model: &mut Model,
        scheme: OperationScheme,
    ) -> bool {
        if scheme.kind(model) != Some(OperationSchemeKind::HeatingLoad) {
            return false;
        }
        self.data_mut(model)
            .map(|d| d.heating_load_scheme = Some(scheme.id()))
            .is_some()
    }

    pub fn plant_equipment_operation_heating_load_schedule(self, model: &Model) -> Option<Schedule> {
        self.data(model)?.heating_load_schedule.map(Schedule)
    }

    pub fn set_plant_equipment_operation_heating_load_schedule(
        self,
        model: &mut Model,
        schedule: Schedule,
    ) -> bool {
        model.is_type(schedule.id(), ObjectType::Schedule)
            && self
                .data_mut(model)
                .map(|d| d.heating_load_schedule = Some(schedule.id()))
                .is_some()
    }

    pub fn plant_equipment_operation_cooling_load(self, model: &Model) -> Option<OperationScheme> {
        self.data(model)?.cooling_load_scheme.map(OperationScheme)
    }

    pub fn set_plant_equipment_operation_cooling_load(
        self,
        model: &mut Model,
        scheme: OperationScheme,
    ) -> bool {
        if scheme.kind(model) != Some(OperationSchemeKind::CoolingLoad) {
            return false;
        }
        self.data_mut(model)
            .map(|d| d.cooling_load_scheme = Some(scheme.id()))
            .is_some()
    }

    pub fn plant_equipment_operation_cooling_load_schedule(self, model: &Model) -> Option<Schedule> {
        self.data(model)?.cooling_load_schedule.map(Schedule)
    }

    pub fn set_plant_equipment_operation_cooling_load_schedule(
        self,
        model: &mut Model,
        schedule: Schedule,
    ) -> bool {
        model.is_type(schedule.id(), ObjectType::Schedule)
            && self
                .data_mut(model)
                .map(|d| d.cooling_load_schedule = Some(schedule.id()))
                .is_some()
    }

    pub fn primary_plant_equipment_operation_scheme(self, model: &Model) -> Option<OperationScheme> {
        self.data(model)?.primary_scheme.map(OperationScheme)
    }

    pub fn set_primary_plant_equipment_operation_scheme(
        self,
        model: &mut Model,
        scheme: OperationScheme,
    ) -> bool {
        scheme.kind(model).is_some()
            && self
                .data_mut(model)
                .map(|d| d.primary_scheme = Some(scheme.id()))
                .is_some()
    }

    pub fn primary_plant_equipment_operation_scheme_schedule(self, model: &Model) -> Option<Schedule> {
        self.data(model)?.primary_schedule.map(Schedule)
    }

    pub fn set_primary_plant_equipment_operation_scheme_schedule(
        self,
        model: &mut Model,
        schedule: Schedule,
    ) -> bool {
        model.is_type(schedule.id(), ObjectType::Schedule)
            && self
                .data_mut(model)
                .map(|d| d.primary_schedule = Some(schedule.id()))
                .is_some()
    }

    pub fn component_setpoint_operation_scheme_schedule(self, model: &Model) -> Option<Schedule> {
        self.data(model)?.component_setpoint_schedule.map(Schedule)
    }

    pub fn set_component_setpoint_operation_scheme_schedule(
        self,
        model: &mut Model,
        schedule: Schedule,
    ) -> bool {
        model.is_type(schedule.id(), ObjectType::Schedule)
            && self
                .data_mut(model)
                .map(|d| d.component_setpoint_schedule = Some(schedule.id()))
                .is_some()
    }

    /// Drop every authored scheme so defaults are synthesized again.
    pub fn reset_operation_schemes(self, model: &mut Model) {
        if let Some(d) = self.data_mut(model) {
            d.heating_load_scheme = None;
            d.cooling_load_scheme = None;
            d.primary_scheme = None;
        }
    }
}

fn walk(model: &Model, start: ObjectId, end: ObjectId, filter: Option<ObjectType>) -> Vec<ObjectId> {
    match filter {
        Some(ty) => model.components_between_of_type(start, end, ty),
        None => model.components_between(start, end),
    }
}
