//! Air loops: a supply path from inlet to outlet node, and a demand side
//! `inlet -> zone splitter -> zone branches -> zone mixer -> outlet`.

use os_core::ObjectId;
use tracing::debug;

use crate::connectors::{handle, Mixer, Splitter, ZoneMixer, ZoneSplitter};
use crate::hvac::Node;
use crate::model::Model;
use crate::objects::{AirLoopData, ObjectKind, ObjectType};
use crate::plenum::{ReturnPlenum, SupplyPlenum};
use crate::setpoint::SetpointManager;
use crate::terminal::AirTerminal;
use crate::thermal_zone::ThermalZone;

handle!(AirLoopHVAC);

impl AirLoopHVAC {
    pub fn new(model: &mut Model) -> Self {
        let supply_inlet = Node::new(model).id();
        let supply_outlet = Node::new(model).id();
        model.connect(supply_inlet, 0, supply_outlet, 0);

        let demand_inlet = Node::new(model).id();
        let zone_splitter = model.add_object(ObjectKind::ZoneSplitter);
        let placeholder = Node::new(model).id();
        let zone_mixer = model.add_object(ObjectKind::ZoneMixer);
        let demand_outlet = Node::new(model).id();
        model.connect(demand_inlet, 0, zone_splitter, 0);
        model.connect(zone_splitter, 0, placeholder, 0);
        model.connect(placeholder, 0, zone_mixer, 0);
        model.connect(zone_mixer, 0, demand_outlet, 0);

        AirLoopHVAC(model.add_object(ObjectKind::AirLoopHvac(AirLoopData {
            supply_inlet,
            supply_outlet,
            demand_inlet,
            demand_outlet,
            zone_splitter,
            zone_mixer,
            design_supply_air_flow_rate: None,
        })))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model.is_type(id, ObjectType::AirLoopHvac).then_some(AirLoopHVAC(id))
    }

    fn data(self, model: &Model) -> Option<&AirLoopData> {
        model.air_loop_data(self.0)
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

    pub fn zone_splitter(self, model: &Model) -> Option<ZoneSplitter> {
        self.data(model).map(|d| ZoneSplitter(d.zone_splitter))
    }

    pub fn zone_mixer(self, model: &Model) -> Option<ZoneMixer> {
        self.data(model).map(|d| ZoneMixer(d.zone_mixer))
    }

    pub fn design_supply_air_flow_rate(self, model: &Model) -> Option<f64> {
        self.data(model)?.design_supply_air_flow_rate
    }

    pub fn is_design_supply_air_flow_rate_autosized(self, model: &Model) -> bool {
        self.data(model)
            .is_some_and(|d| d.design_supply_air_flow_rate.is_none())
    }

    pub fn set_design_supply_air_flow_rate(self, model: &mut Model, value: f64) -> bool {
        value.is_finite()
            && value >= 0.0
            && model
                .air_loop_data_mut(self.0)
                .map(|d| d.design_supply_air_flow_rate = Some(value))
                .is_some()
    }

    pub fn autosize_design_supply_air_flow_rate(self, model: &mut Model) {
        if let Some(d) = model.air_loop_data_mut(self.0) {
            d.design_supply_air_flow_rate = None;
        }
    }

    pub fn supply_components(self, model: &Model) -> Vec<ObjectId> {
        match (self.supply_inlet_node(model), self.supply_outlet_node(model)) {
            (Some(a), Some(b)) => model.components_between(a.id(), b.id()),
            _ => Vec::new(),
        }
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
        let start = start.unwrap_or(inlet.id());
        let end = end.unwrap_or(outlet.id());
        match filter {
            Some(ty) => model.components_between_of_type(start, end, ty),
            None => model.components_between(start, end),
        }
    }

    pub fn thermal_zones(self, model: &Model) -> Vec<ThermalZone> {
        self.demand_components_between(model, None, None, Some(ObjectType::ThermalZone))
            .into_iter()
            .map(ThermalZone)
            .collect()
    }

    pub fn supply_plenums(self, model: &Model) -> Vec<SupplyPlenum> {
        self.demand_components_between(model, None, None, Some(ObjectType::SupplyPlenum))
            .into_iter()
            .map(SupplyPlenum)
            .collect()
    }

    pub fn return_plenums(self, model: &Model) -> Vec<ReturnPlenum> {
        self.demand_components_between(model, None, None, Some(ObjectType::ReturnPlenum))
            .into_iter()
            .map(ReturnPlenum)
            .collect()
    }

    pub fn air_terminals(self, model: &Model) -> Vec<AirTerminal> {
        self.demand_components_between(model, None, None, Some(ObjectType::AirTerminal))
            .into_iter()
            .map(AirTerminal)
            .collect()
    }

    fn supply_outlet_reheat_managers(self, model: &Model) -> Vec<SetpointManager> {
        self.supply_outlet_node(model)
            .map(|n| n.setpoint_managers(model))
            .unwrap_or_default()
            .into_iter()
            .filter(|s| s.is_single_zone_reheat(model))
            .collect()
    }

    /// Give `zone` its own branch, optionally behind `terminal`.
    ///
    /// Without a terminal the last terminal on the loop is cloned, unless
    /// the loop has plenums. The zone leaves any other air loop first and
    /// stops using ideal air loads. Plenum zones and terminals already in
    /// use are refused.
    pub fn add_branch_for_zone(
        self,
        model: &mut Model,
        zone: ThermalZone,
        terminal: Option<AirTerminal>,
    ) -> bool {
        let (Some(splitter), Some(mixer)) = (self.zone_splitter(model), self.zone_mixer(model)) else {
            return false;
        };
        if !model.is_type(zone.id(), ObjectType::ThermalZone) || zone.is_plenum(model) {
            return false;
        }
        if let Some(t) = terminal {
            if !model.is_type(t.id(), ObjectType::AirTerminal) || model.is_connected(t.id()) {
                return false;
            }
        }

        if let Some(old) = zone.air_loop_hvac(model) {
            old.remove_branch_for_zone(model, zone);
        }
        zone.set_use_ideal_air_loads(model, false);

        let terminal = match terminal {
            Some(t) => Some(t),
            None if self.supply_plenums(model).is_empty() && self.return_plenums(model).is_empty() => {
                match self.air_terminals(model).last() {
                    Some(last) => last.clone_terminal(model),
                    None => None,
                }
            }
            None => None,
        };

        // a lone empty branch is splitter -> node -> mixer; reuse its node
        let placeholder = if model.components_between(splitter.id(), mixer.id()).len() == 3 {
            splitter.outlet_object(model, 0).map(Node)
        } else {
            None
        };
        let node = match placeholder {
            Some(node) => node,
            None => {
                let node = Node::new(model);
                let outlet = splitter.next_outlet_port(model);
                let inlet = mixer.next_inlet_port(model);
                model.connect(splitter.id(), outlet, node.id(), 0);
                model.connect(node.id(), 0, mixer.id(), inlet);
                node
            }
        };

        // node -> zone -> zone outlet node -> mixer
        let Some(drain) = model.disconnect_outlet(node.id(), 0) else {
            panic!("zone branch node {} has no outlet", node.id());
        };
        let zone_outlet = Node::new(model);
        model.connect(node.id(), 0, zone.id(), 0);
        model.connect(zone.id(), 0, zone_outlet.id(), 0);
        model.connect(zone_outlet.id(), 0, drain.object, drain.index);

        if let Some(t) = terminal {
            let added = t.add_to_node(model, node);
            assert!(added, "terminal {} refused a fresh zone branch", t.id());
        }

        for spm in self.supply_outlet_reheat_managers(model) {
            if spm.control_zone(model).is_none() {
                spm.set_control_zone(model, zone);
            }
        }
        debug!(air_loop = %self.0, zone = %zone.id(), "add branch for zone");
        true
    }

    /// Drop the branch serving `zone`: plenums first, then every branch
    /// object except the zone itself.
    pub fn remove_branch_for_zone(self, model: &mut Model, zone: ThermalZone) -> bool {
        if zone.air_loop_hvac(model) != Some(self) {
            return false;
        }
        let (Some(splitter), Some(mixer)) = (self.zone_splitter(model), self.zone_mixer(model)) else {
            return false;
        };
        zone.remove_supply_plenum(model);
        zone.remove_return_plenum(model);

        let (splitter_id, mixer_id) = (splitter.id(), mixer.id());
        let Some((head, _)) = model.walk_upstream_until(zone.id(), 0, |o| o == splitter_id) else {
            panic!("zone {} is not fed by its loop's zone splitter", zone.id());
        };
        let Some((tail, _)) = model.walk_downstream_until(zone.id(), 0, |o| o == mixer_id) else {
            panic!("zone {} does not drain to its loop's zone mixer", zone.id());
        };
        let branch = model.components_between(head, tail);

        if let Some(b) = splitter.branch_index_for_outlet_object(model, head) {
            splitter.remove_port_for_branch(model, b);
        }
        if let Some(b) = mixer.branch_index_for_inlet_object(model, tail) {
            mixer.remove_port_for_branch(model, b);
        }
        for id in branch {
            if id == zone.id() {
                model.disconnect_inlet(id, 0);
                model.disconnect_outlet(id, 0);
            } else {
                model.remove_object(id);
            }
        }

        for spm in self.supply_outlet_reheat_managers(model) {
            if spm.control_zone(model) == Some(zone) {
                spm.reset_control_zone(model);
            }
        }

        if splitter.outlet_objects(model).is_empty() {
            let node = Node::new(model);
            model.connect(splitter.id(), 0, node.id(), 0);
            model.connect(node.id(), 0, mixer.id(), 0);
        }
        debug!(air_loop = %self.0, zone = %zone.id(), "remove branch for zone");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::AirTerminalKind;

    #[test]
    fn new_loop_layout() {
        let mut m = Model::new();
        let air = AirLoopHVAC::new(&mut m);
        assert_eq!(air.supply_components(&m).len(), 2);
        assert_eq!(air.demand_components(&m).len(), 5);
    }

    #[test]
    fn zone_branch_without_terminal() {
        let mut m = Model::new();
        let air = AirLoopHVAC::new(&mut m);
        let zone = ThermalZone::new(&mut m);
        assert!(air.add_branch_for_zone(&mut m, zone, None));
        assert_eq!(air.demand_components(&m).len(), 7);
        assert_eq!(zone.air_loop_hvac(&m), Some(air));
        assert!(air.remove_branch_for_zone(&mut m, zone));
        assert_eq!(air.demand_components(&m).len(), 5);
        assert!(m.contains(zone.id()));
        assert_eq!(zone.air_loop_hvac(&m), None);
    }

    #[test]
    fn terminal_is_cloned_for_the_next_zone() {
        let mut m = Model::new();
        let air = AirLoopHVAC::new(&mut m);
        let z1 = ThermalZone::new(&mut m);
        let z2 = ThermalZone::new(&mut m);
        let t = AirTerminal::new(&mut m, AirTerminalKind::ConstantVolumeNoReheat);

        assert!(air.add_branch_for_zone(&mut m, z1, Some(t)));
        assert_eq!(air.demand_components(&m).len(), 9);
        assert!(air.add_branch_for_zone(&mut m, z2, None));
        assert_eq!(air.demand_components(&m).len(), 14);
        assert_eq!(air.air_terminals(&m).len(), 2);

        // terminal already wired
        let z3 = ThermalZone::new(&mut m);
        assert!(!air.add_branch_for_zone(&mut m, z3, Some(t)));

        assert!(air.remove_branch_for_zone(&mut m, z2));
        assert_eq!(air.demand_components(&m).len(), 9);
        assert!(air.remove_branch_for_zone(&mut m, z1));
        assert_eq!(air.demand_components(&m).len(), 5);
        assert!(!m.contains(t.id()));
    }

    #[test]
    fn direct_air_terminal_has_no_inlet_node() {
        let mut m = Model::new();
        let air = AirLoopHVAC::new(&mut m);
        let zone = ThermalZone::new(&mut m);
        let t = AirTerminal::new(&mut m, AirTerminalKind::Uncontrolled);
        assert!(air.add_branch_for_zone(&mut m, zone, Some(t)));
        let splitter = air.zone_splitter(&m).unwrap();
        assert_eq!(splitter.outlet_objects(&m), vec![t.id()]);
        assert_eq!(air.demand_components(&m).len(), 8);
        assert!(air.remove_branch_for_zone(&mut m, zone));
        assert_eq!(air.demand_components(&m).len(), 5);
    }

    #[test]
    fn zone_moves_between_loops() {
        let mut m = Model::new();
        let a = AirLoopHVAC::new(&mut m);
        let b = AirLoopHVAC::new(&mut m);
        let zone = ThermalZone::new(&mut m);
        zone.set_use_ideal_air_loads(&mut m, true);
        assert!(a.add_branch_for_zone(&mut m, zone, None));
        assert!(!zone.use_ideal_air_loads(&m));
        assert!(b.add_branch_for_zone(&mut m, zone, None));
        assert_eq!(zone.air_loop_hvac(&m), Some(b));
        assert_eq!(a.demand_components(&m).len(), 5);
    }

    #[test]
    fn reheat_manager_tracks_control_zone() {
        let mut m = Model::new();
        let air = AirLoopHVAC::new(&mut m);
        let z1 = ThermalZone::new(&mut m);
        let z2 = ThermalZone::new(&mut m);
        let spm = SetpointManager::new_single_zone_reheat(&mut m);

        assert!(air.add_branch_for_zone(&mut m, z1, None));
        let outlet = air.supply_outlet_node(&m).unwrap();
        assert!(spm.add_to_node(&mut m, outlet));
        assert_eq!(spm.control_zone(&m), Some(z1));

        assert!(air.add_branch_for_zone(&mut m, z2, None));
        assert_eq!(spm.control_zone(&m), Some(z1));
        assert!(air.remove_branch_for_zone(&mut m, z2));
        assert_eq!(spm.control_zone(&m), Some(z1));
        assert!(air.remove_branch_for_zone(&mut m, z1));
        assert_eq!(spm.control_zone(&m), None);
    }
}
