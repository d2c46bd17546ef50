//! Loop membership and in-series insertion shared by every straight
//! component.

use os_core::ObjectId;
use tracing::debug;

use crate::air_loop::AirLoopHVAC;
use crate::connectors::handle;
use crate::model::Model;
use crate::objects::{NodeData, ObjectKind, ObjectType};
use crate::plant_loop::PlantLoop;
use crate::setpoint::SetpointManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Supply,
    Demand,
}

/// Either kind of loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopRef {
    Plant(PlantLoop),
    Air(AirLoopHVAC),
}

impl LoopRef {
    pub fn id(self) -> ObjectId {
        match self {
            LoopRef::Plant(l) => l.id(),
            LoopRef::Air(l) => l.id(),
        }
    }

    pub fn inlet_node(self, model: &Model, side: Side) -> Option<Node> {
        match (self, side) {
            (LoopRef::Plant(l), Side::Supply) => l.supply_inlet_node(model),
            (LoopRef::Plant(l), Side::Demand) => l.demand_inlet_node(model),
            (LoopRef::Air(l), Side::Supply) => l.supply_inlet_node(model),
            (LoopRef::Air(l), Side::Demand) => l.demand_inlet_node(model),
        }
    }

    pub fn outlet_node(self, model: &Model, side: Side) -> Option<Node> {
        match (self, side) {
            (LoopRef::Plant(l), Side::Supply) => l.supply_outlet_node(model),
            (LoopRef::Plant(l), Side::Demand) => l.demand_outlet_node(model),
            (LoopRef::Air(l), Side::Supply) => l.supply_outlet_node(model),
            (LoopRef::Air(l), Side::Demand) => l.demand_outlet_node(model),
        }
    }

    pub fn components(self, model: &Model, side: Side) -> Vec<ObjectId> {
        match (self.inlet_node(model, side), self.outlet_node(model, side)) {
            (Some(a), Some(b)) => model.components_between(a.id(), b.id()),
            _ => Vec::new(),
        }
    }
}

impl Model {
    pub fn plant_loops(&self) -> Vec<PlantLoop> {
        self.objects_of_type(ObjectType::PlantLoop)
            .into_iter()
            .map(PlantLoop)
            .collect()
    }

    pub fn air_loops(&self) -> Vec<AirLoopHVAC> {
        self.objects_of_type(ObjectType::AirLoopHvac)
            .into_iter()
            .map(AirLoopHVAC)
            .collect()
    }

    /// First loop side whose path passes through `id`.
    pub fn loop_of(&self, id: ObjectId) -> Option<(LoopRef, Side)> {
        let loops = self
            .plant_loops()
            .into_iter()
            .map(LoopRef::Plant)
            .chain(self.air_loops().into_iter().map(LoopRef::Air));
        for lp in loops {
            for side in [Side::Supply, Side::Demand] {
                if lp.components(self, side).contains(&id) {
                    return Some((lp, side));
                }
            }
        }
        None
    }

    /// Whether `id` is the outlet node of any loop side.
    pub fn is_loop_outlet_node(&self, id: ObjectId) -> bool {
        let plant = self.plant_loops().into_iter().any(|l| {
            l.supply_outlet_node(self).map(Node::id) == Some(id)
                || l.demand_outlet_node(self).map(Node::id) == Some(id)
        });
        plant
            || self.air_loops().into_iter().any(|l| {
                l.supply_outlet_node(self).map(Node::id) == Some(id)
                    || l.demand_outlet_node(self).map(Node::id) == Some(id)
            })
    }
}

handle!(
    /// Pass-through junction; the only legal attachment point for new
    /// components and branches.
    Node
);

impl Node {
    pub fn new(model: &mut Model) -> Self {
        Node(model.add_object(ObjectKind::Node(NodeData::default())))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model.is_type(id, ObjectType::Node).then_some(Node(id))
    }

    pub fn inlet_object(self, model: &Model) -> Option<ObjectId> {
        model.inlet_object(self.0, 0)
    }

    pub fn outlet_object(self, model: &Model) -> Option<ObjectId> {
        model.outlet_object(self.0, 0)
    }

    pub fn setpoint_managers(self, model: &Model) -> Vec<SetpointManager> {
        model
            .node_data(self.0)
            .map(|n| n.setpoint_managers.iter().copied().map(SetpointManager).collect())
            .unwrap_or_default()
    }

    pub fn add_setpoint_manager(self, model: &mut Model, spm: SetpointManager) -> bool {
        spm.add_to_node(model, self)
    }
}

/// Insert `comp` (through its port pair `pair`) in series at `node`.
///
/// On a side's outlet node the component goes in front of the node:
/// `up -> new node -> comp -> node`. Anywhere else it goes behind it:
/// `node -> comp -> new node -> down`. Returns `false` without touching
/// the graph when the node is unusable or the pair is already wired.
pub(crate) fn insert_at_node(model: &mut Model, comp: ObjectId, pair: u32, node: Node) -> bool {
    if !model.is_type(node.0, ObjectType::Node) || !model.contains(comp) {
        return false;
    }
    if model.upstream_port(comp, pair).is_some() || model.downstream_port(comp, pair).is_some() {
        return false;
    }
    let Some((lp, side)) = model.loop_of(node.0) else {
        return false;
    };
    let at_outlet = lp.outlet_node(model, side) == Some(node);

    if at_outlet {
        let Some(up) = model.upstream_port(node.0, 0) else {
            return false;
        };
        model.disconnect_inlet(node.0, 0);
        let fresh = Node::new(model);
        model.connect(up.object, up.index, fresh.0, 0);
        model.connect(fresh.0, 0, comp, pair);
        model.connect(comp, pair, node.0, 0);
    } else {
        let Some(down) = model.downstream_port(node.0, 0) else {
            return false;
        };
        model.disconnect_outlet(node.0, 0);
        let fresh = Node::new(model);
        model.connect(node.0, 0, comp, pair);
        model.connect(comp, pair, fresh.0, 0);
        model.connect(fresh.0, 0, down.object, down.index);
    }
    debug!(%comp, pair, node = %node.0, at_outlet, "insert component at node");
    true
}

/// Reverse of [`insert_at_node`] for a component sitting between two nodes:
/// the component and one of its nodes leave the loop, the gap is closed.
pub(crate) fn remove_from_series(model: &mut Model, comp: ObjectId, pair: u32) -> bool {
    let (Some(up), Some(down)) = (
        model.upstream_port(comp, pair),
        model.downstream_port(comp, pair),
    ) else {
        return false;
    };
    let up_is_node = model.is_type(up.object, ObjectType::Node);
    let down_is_node = model.is_type(down.object, ObjectType::Node);
    let down_is_outlet = model.is_loop_outlet_node(down.object);

    model.disconnect_inlet(comp, pair);
    model.disconnect_outlet(comp, pair);
    if down_is_node && !down_is_outlet {
        // drop the node behind the component
        if let Some(next) = model.disconnect_outlet(down.object, 0) {
            model.connect(up.object, up.index, next.object, next.index);
        }
        model.remove_object(down.object);
    } else if up_is_node {
        if let Some(prev) = model.disconnect_inlet(up.object, 0) {
            model.connect(prev.object, prev.index, down.object, down.index);
        }
        model.remove_object(up.object);
    } else {
        model.connect(up.object, up.index, down.object, down.index);
    }
    debug!(%comp, pair, "remove component from series");
    true
}
