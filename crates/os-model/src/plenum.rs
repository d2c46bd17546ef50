//! Supply and return plenums: zone-backed splitters and mixers spliced into
//! air loop zone branches.

use os_core::ObjectId;
use tracing::debug;

use crate::air_loop::AirLoopHVAC;
use crate::connectors::{handle, Mixer, Splitter};
use crate::hvac::{LoopRef, Node, Side};
use crate::model::Model;
use crate::objects::{Branching, ObjectKind, ObjectType, PlenumData};
use crate::terminal::AirTerminal;
use crate::thermal_zone::ThermalZone;

handle!(
    /// Splitter fed by the zone splitter, feeding one or more zone branches.
    SupplyPlenum
);
handle!(
    /// Mixer collecting one or more zone branches ahead of the zone mixer.
    ReturnPlenum
);

impl Splitter for SupplyPlenum {
    fn id(&self) -> ObjectId {
        self.0
    }
}

impl Mixer for ReturnPlenum {
    fn id(&self) -> ObjectId {
        self.0
    }
}

/// Whether `zone` may back `plenum` (or a plenum not created yet): not the
/// zone of any other plenum, no zone equipment, no ideal air loads, not
/// served by an air loop.
pub(crate) fn zone_can_back(model: &Model, plenum: Option<ObjectId>, zone: ThermalZone) -> bool {
    if !model.is_type(zone.id(), ObjectType::ThermalZone) {
        return false;
    }
    let taken = model
        .objects_of_type(ObjectType::SupplyPlenum)
        .into_iter()
        .chain(model.objects_of_type(ObjectType::ReturnPlenum))
        .any(|p| Some(p) != plenum && model.plenum_zone(p) == Some(zone.id()));
    !taken && zone.can_be_plenum(model)
}

/// Straight objects walked from `start` until a branching object, in walk
/// order, with the branching object that stopped the walk.
fn straight_run(model: &Model, start: ObjectId, downstream: bool) -> (Vec<ObjectId>, Option<ObjectId>) {
    let mut run = Vec::new();
    let mut current = start;
    loop {
        let next = if downstream {
            model.downstream_port(current, 0)
        } else {
            model.upstream_port(current, 0)
        };
        let Some(next) = next else {
            return (run, None);
        };
        match model.object_type(next.object).map(|t| t.branching()) {
            Some(Branching::Straight) => {
                run.push(next.object);
                current = next.object;
            }
            _ => return (run, Some(next.object)),
        }
    }
}

fn serves_zone(model: &Model, run: &[ObjectId]) -> bool {
    run.iter().any(|o| model.is_type(*o, ObjectType::ThermalZone))
}

fn air_demand_loop(model: &Model, node: Node) -> Option<AirLoopHVAC> {
    if !model.is_type(node.id(), ObjectType::Node) {
        return None;
    }
    match model.loop_of(node.id()) {
        Some((LoopRef::Air(lp), Side::Demand)) => Some(lp),
        _ => None,
    }
}

fn plenum_loop(model: &Model, plenum: ObjectId) -> Option<AirLoopHVAC> {
    match model.loop_of(plenum) {
        Some((LoopRef::Air(lp), Side::Demand)) => Some(lp),
        _ => None,
    }
}

impl SupplyPlenum {
    pub fn new(model: &mut Model) -> Self {
        SupplyPlenum(model.add_object(ObjectKind::SupplyPlenum(PlenumData::default())))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model.is_type(id, ObjectType::SupplyPlenum).then_some(SupplyPlenum(id))
    }

    pub fn thermal_zone(self, model: &Model) -> Option<ThermalZone> {
        model.plenum_zone(self.0).map(ThermalZone)
    }

    /// Back the plenum with `zone`. Re-setting the current zone succeeds.
    pub fn set_thermal_zone(self, model: &mut Model, zone: ThermalZone) -> bool {
        if self.thermal_zone(model) == Some(zone) {
            return true;
        }
        if !zone_can_back(model, Some(self.0), zone) {
            return false;
        }
        model.set_plenum_zone(self.0, Some(zone.id()));
        true
    }

    pub fn reset_thermal_zone(self, model: &mut Model) {
        model.set_plenum_zone(self.0, None);
    }

    pub fn air_loop_hvac(self, model: &Model) -> Option<AirLoopHVAC> {
        plenum_loop(model, self.0)
    }

    /// Splice into the branch starting at `node`, right behind the zone
    /// splitter. A direct-air terminal between splitter and node is carried
    /// along with the branch.
    ///
    /// The first branch gets a fresh inlet node between splitter and plenum;
    /// later branches on the same loop hand their splitter port over to the
    /// plenum.
    pub fn add_to_node(self, model: &mut Model, node: Node) -> bool {
        let Some(lp) = air_demand_loop(model, node) else {
            return false;
        };
        let current = self.air_loop_hvac(model);
        if current.is_some_and(|c| c != lp) {
            return false;
        }
        // off every loop, a plenum must be unwired to take its first branch
        if current.is_none() && model.is_connected(self.0) {
            return false;
        }
        let Some(splitter) = lp.zone_splitter(model) else {
            return false;
        };

        // the branch entry is the node, or the direct-air terminal feeding it
        let Some(up) = node.inlet_object(model) else {
            return false;
        };
        let entry = match AirTerminal::from_id(model, up) {
            Some(t) if t.is_direct_air(model) => t.id(),
            _ => node.id(),
        };
        let Some(feed) = model.upstream_port(entry, 0) else {
            return false;
        };
        if feed.object != splitter.id() {
            return false;
        }
        if model
            .outlet_object(node.id(), 0)
            .is_some_and(|o| model.is_type(o, ObjectType::SupplyPlenum))
        {
            return false;
        }
        let (run, _) = straight_run(model, entry, true);
        if !model.is_type(entry, ObjectType::ThermalZone) && !serves_zone(model, &run) {
            return false;
        }

        if current.is_none() {
            model.disconnect_inlet(entry, 0);
            let inlet = Node::new(model);
            model.connect(splitter.id(), feed.index, inlet.id(), 0);
            model.connect(inlet.id(), 0, self.0, 0);
            let port = self.next_outlet_port(model);
            model.connect(self.0, port, entry, 0);
        } else {
            splitter.remove_port_for_branch(model, feed.index);
            let port = self.next_outlet_port(model);
            model.connect(self.0, port, entry, 0);
        }
        debug!(plenum = %self.0, node = %node.id(), first = current.is_none(), "add supply plenum branch");
        true
    }

    /// Hand every branch back to the zone splitter, drop the plenum's inlet
    /// node and the plenum itself.
    pub fn remove(self, model: &mut Model) {
        if let Some(lp) = self.air_loop_hvac(model) {
            if let Some(splitter) = lp.zone_splitter(model) {
                let branches = self.outlet_objects(model);
                for b in (0..branches.len() as u32).rev() {
                    self.remove_port_for_branch(model, b);
                }
                if let Some(inlet) = self.inlet_object(model) {
                    if let Some(port) = splitter.branch_index_for_outlet_object(model, inlet) {
                        splitter.remove_port_for_branch(model, port);
                    }
                    model.remove_object(inlet);
                }
                for entry in branches {
                    let port = splitter.next_outlet_port(model);
                    model.connect(splitter.id(), port, entry, 0);
                }
            }
        }
        debug!(plenum = %self.0, "remove supply plenum");
        model.remove_object(self.0);
    }
}

impl ReturnPlenum {
    pub fn new(model: &mut Model) -> Self {
        ReturnPlenum(model.add_object(ObjectKind::ReturnPlenum(PlenumData::default())))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model.is_type(id, ObjectType::ReturnPlenum).then_some(ReturnPlenum(id))
    }

    pub fn thermal_zone(self, model: &Model) -> Option<ThermalZone> {
        model.plenum_zone(self.0).map(ThermalZone)
    }

    pub fn set_thermal_zone(self, model: &mut Model, zone: ThermalZone) -> bool {
        if self.thermal_zone(model) == Some(zone) {
            return true;
        }
        if !zone_can_back(model, Some(self.0), zone) {
            return false;
        }
        model.set_plenum_zone(self.0, Some(zone.id()));
        true
    }

    pub fn reset_thermal_zone(self, model: &mut Model) {
        model.set_plenum_zone(self.0, None);
    }

    pub fn air_loop_hvac(self, model: &Model) -> Option<AirLoopHVAC> {
        plenum_loop(model, self.0)
    }

    /// Splice into the branch ending at `node`, right ahead of the zone
    /// mixer.
    ///
    /// Preconditions, each refused without touching the graph: `node` is a
    /// node of this model on some air loop's demand side; the plenum is not
    /// on a different loop; the zone mixer is directly downstream of `node`;
    /// no return plenum is directly upstream; the branch through `node`
    /// serves a zone.
    pub fn add_to_node(self, model: &mut Model, node: Node) -> bool {
        let Some(lp) = air_demand_loop(model, node) else {
            return false;
        };
        let current = self.air_loop_hvac(model);
        if current.is_some_and(|c| c != lp) {
            return false;
        }
        if current.is_none() && model.is_connected(self.0) {
            return false;
        }
        let Some(mixer) = lp.zone_mixer(model) else {
            return false;
        };
        let Some(drain) = model.downstream_port(node.id(), 0) else {
            return false;
        };
        if drain.object != mixer.id() {
            return false;
        }
        if node
            .inlet_object(model)
            .is_some_and(|o| model.is_type(o, ObjectType::ReturnPlenum))
        {
            return false;
        }
        let (run, _) = straight_run(model, node.id(), false);
        if !serves_zone(model, &run) {
            return false;
        }

        if current.is_none() {
            model.disconnect_outlet(node.id(), 0);
            let outlet = Node::new(model);
            let port = self.next_inlet_port(model);
            model.connect(node.id(), 0, self.0, port);
            model.connect(self.0, 0, outlet.id(), 0);
            model.connect(outlet.id(), 0, mixer.id(), drain.index);
        } else {
            mixer.remove_port_for_branch(model, drain.index);
            let port = self.next_inlet_port(model);
            model.connect(node.id(), 0, self.0, port);
        }
        debug!(plenum = %self.0, node = %node.id(), first = current.is_none(), "add return plenum branch");
        true
    }

    /// Hand every branch back to the zone mixer, drop the plenum's outlet
    /// node and the plenum itself.
    pub fn remove(self, model: &mut Model) {
        if let Some(lp) = self.air_loop_hvac(model) {
            if let Some(mixer) = lp.zone_mixer(model) {
                let branches = self.inlet_objects(model);
                for b in (0..branches.len() as u32).rev() {
                    self.remove_port_for_branch(model, b);
                }
                if let Some(outlet) = self.outlet_object(model) {
                    if let Some(port) = mixer.branch_index_for_inlet_object(model, outlet) {
                        mixer.remove_port_for_branch(model, port);
                    }
                    model.remove_object(outlet);
                }
                for exit in branches {
                    let port = mixer.next_inlet_port(model);
                    model.connect(exit, 0, mixer.id(), port);
                }
            }
        }
        debug!(plenum = %self.0, "remove return plenum");
        model.remove_object(self.0);
    }
}
