//! Thermal zones: air loop branch endpoints, zone equipment hosts and
//! plenum backing spaces.

use os_core::ObjectId;
use tracing::debug;

use crate::air_loop::AirLoopHVAC;
use crate::connectors::{handle, Mixer, Splitter};
use crate::hvac::{LoopRef, Node, Side};
use crate::model::Model;
use crate::objects::{ObjectKind, ObjectType, ThermalZoneData};
use crate::plenum::{zone_can_back, ReturnPlenum, SupplyPlenum};
use crate::terminal::AirTerminal;

handle!(ThermalZone);

impl ThermalZone {
    pub fn new(model: &mut Model) -> Self {
        ThermalZone(model.add_object(ObjectKind::ThermalZone(ThermalZoneData {
            equipment: Vec::new(),
            use_ideal_air_loads: false,
            multiplier: 1,
        })))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model.is_type(id, ObjectType::ThermalZone).then_some(ThermalZone(id))
    }

    pub fn multiplier(self, model: &Model) -> Option<i64> {
        model.zone_data(self.0).map(|z| z.multiplier)
    }

    pub fn set_multiplier(self, model: &mut Model, value: i64) -> bool {
        value >= 1 && model.zone_data_mut(self.0).map(|z| z.multiplier = value).is_some()
    }

    /// Zone HVAC equipment serving this zone, in the order added.
    pub fn equipment(self, model: &Model) -> Vec<ObjectId> {
        model
            .zone_data(self.0)
            .map(|z| z.equipment.clone())
            .unwrap_or_default()
    }

    /// Attach zone equipment (a baseboard or a heat pump water heater) not
    /// serving any other zone. Plenum zones take no equipment.
    pub fn add_equipment(self, model: &mut Model, equipment: ObjectId) -> bool {
        if !model.contains(self.0) || self.is_plenum(model) {
            return false;
        }
        let free = match model.kind(equipment) {
            Some(ObjectKind::ZoneHvacEquipment(d)) => d.zone.is_none(),
            Some(ObjectKind::WaterHeaterHeatPump(d)) => d.zone.is_none(),
            _ => false,
        };
        if !free {
            return false;
        }
        match model.kind_mut(equipment) {
            Some(ObjectKind::ZoneHvacEquipment(d)) => d.zone = Some(self.0),
            Some(ObjectKind::WaterHeaterHeatPump(d)) => d.zone = Some(self.0),
            _ => {}
        }
        if let Some(z) = model.zone_data_mut(self.0) {
            z.equipment.push(equipment);
        }
        true
    }

    pub fn remove_equipment(self, model: &mut Model, equipment: ObjectId) -> bool {
        let Some(z) = model.zone_data_mut(self.0) else {
            return false;
        };
        let before = z.equipment.len();
        z.equipment.retain(|e| *e != equipment);
        if z.equipment.len() == before {
            return false;
        }
        match model.kind_mut(equipment) {
            Some(ObjectKind::ZoneHvacEquipment(d)) => d.zone = None,
            Some(ObjectKind::WaterHeaterHeatPump(d)) => d.zone = None,
            _ => {}
        }
        true
    }

    pub fn use_ideal_air_loads(self, model: &Model) -> bool {
        model.zone_data(self.0).is_some_and(|z| z.use_ideal_air_loads)
    }

    /// Plenum zones cannot use ideal air loads.
    pub fn set_use_ideal_air_loads(self, model: &mut Model, value: bool) -> bool {
        if value && self.is_plenum(model) {
            return false;
        }
        model
            .zone_data_mut(self.0)
            .map(|z| z.use_ideal_air_loads = value)
            .is_some()
    }

    /// Air loop whose demand side runs through this zone.
    pub fn air_loop_hvac(self, model: &Model) -> Option<AirLoopHVAC> {
        match model.loop_of(self.0)? {
            (LoopRef::Air(lp), Side::Demand) => Some(lp),
            _ => None,
        }
    }

    /// Whether some plenum is backed by this zone.
    pub fn is_plenum(self, model: &Model) -> bool {
        model
            .objects_of_type(ObjectType::SupplyPlenum)
            .into_iter()
            .chain(model.objects_of_type(ObjectType::ReturnPlenum))
            .any(|p| model.plenum_zone(p) == Some(self.0))
    }

    /// No zone equipment, no ideal air loads, not on an air loop.
    pub fn can_be_plenum(self, model: &Model) -> bool {
        model.zone_data(self.0).is_some_and(|z| {
            z.equipment.is_empty() && !z.use_ideal_air_loads
        }) && self.air_loop_hvac(model).is_none()
    }

    /// Supply plenum directly upstream on this zone's branch.
    pub fn supply_plenum(self, model: &Model) -> Option<SupplyPlenum> {
        let (_, stop) = model.walk_upstream_until(self.0, 0, |o| {
            !matches!(
                model.object_type(o),
                Some(ObjectType::Node | ObjectType::AirTerminal)
            )
        })?;
        SupplyPlenum::from_id(model, stop)
    }

    /// Return plenum directly downstream on this zone's branch.
    pub fn return_plenum(self, model: &Model) -> Option<ReturnPlenum> {
        let (_, stop) = model.walk_downstream_until(self.0, 0, |o| {
            !model.is_type(o, ObjectType::Node)
        })?;
        ReturnPlenum::from_id(model, stop)
    }

    /// First object of this zone's branch behind the zone splitter or
    /// supply plenum.
    fn branch_entry(self, model: &Model) -> Option<ObjectId> {
        let (entry, _) = model.walk_upstream_until(self.0, 0, |o| {
            !matches!(
                model.object_type(o),
                Some(ObjectType::Node | ObjectType::AirTerminal)
            )
        })?;
        Some(entry)
    }

    /// Last object of this zone's branch ahead of the zone mixer or return
    /// plenum.
    fn branch_exit(self, model: &Model) -> Option<ObjectId> {
        let (exit, _) = model.walk_downstream_until(self.0, 0, |o| {
            !model.is_type(o, ObjectType::Node)
        })?;
        Some(exit)
    }

    /// Route this zone's supply air through a plenum backed by
    /// `plenum_zone`, reusing that zone's supply plenum when it already
    /// serves this loop.
    pub fn set_supply_plenum(self, model: &mut Model, plenum_zone: ThermalZone) -> bool {
        if plenum_zone == self {
            return false;
        }
        let Some(lp) = self.air_loop_hvac(model) else {
            return false;
        };
        let existing = model
            .objects_of_type(ObjectType::SupplyPlenum)
            .into_iter()
            .find(|p| model.plenum_zone(*p) == Some(plenum_zone.id()))
            .map(SupplyPlenum);
        match existing {
            Some(p) => {
                if self.supply_plenum(model) == Some(p) {
                    return true;
                }
                if p.air_loop_hvac(model).is_some_and(|l| l != lp) {
                    return false;
                }
            }
            None => {
                if !zone_can_back(model, None, plenum_zone) {
                    return false;
                }
            }
        }

        // detaching from the old plenum must not outlive a refused splice
        let before = model.clone();
        self.remove_supply_plenum(model);
        let plenum = match existing {
            Some(p) => p,
            None => {
                let p = SupplyPlenum::new(model);
                p.set_thermal_zone(model, plenum_zone);
                p
            }
        };
        // a direct-air terminal has no inlet node; hand the plenum its outlet node
        let node = self.branch_entry(model).and_then(|entry| match AirTerminal::from_id(model, entry) {
            Some(t) => model.outlet_object(t.id(), 0).map(Node),
            None => Some(Node(entry)),
        });
        let added = node.is_some_and(|n| plenum.add_to_node(model, n));
        if !added {
            *model = before;
        }
        debug!(zone = %self.0, plenum = %plenum.id(), added, "set supply plenum");
        added
    }

    /// Mirror of [`ThermalZone::set_supply_plenum`] on the return side.
    pub fn set_return_plenum(self, model: &mut Model, plenum_zone: ThermalZone) -> bool {
        if plenum_zone == self {
            return false;
        }
        let Some(lp) = self.air_loop_hvac(model) else {
            return false;
        };
        let existing = model
            .objects_of_type(ObjectType::ReturnPlenum)
            .into_iter()
            .find(|p| model.plenum_zone(*p) == Some(plenum_zone.id()))
            .map(ReturnPlenum);
        match existing {
            Some(p) => {
                if self.return_plenum(model) == Some(p) {
                    return true;
                }
                if p.air_loop_hvac(model).is_some_and(|l| l != lp) {
                    return false;
                }
            }
            None => {
                if !zone_can_back(model, None, plenum_zone) {
                    return false;
                }
            }
        }

        let before = model.clone();
        self.remove_return_plenum(model);
        let plenum = match existing {
            Some(p) => p,
            None => {
                let p = ReturnPlenum::new(model);
                p.set_thermal_zone(model, plenum_zone);
                p
            }
        };
        let added = match self.branch_exit(model) {
            Some(exit) => plenum.add_to_node(model, Node(exit)),
            None => false,
        };
        if !added {
            *model = before;
        }
        debug!(zone = %self.0, plenum = %plenum.id(), added, "set return plenum");
        added
    }

    /// Take this zone's branch off its supply plenum; the plenum goes away
    /// with its last branch.
    pub fn remove_supply_plenum(self, model: &mut Model) -> bool {
        let Some(plenum) = self.supply_plenum(model) else {
            return false;
        };
        let Some(lp) = self.air_loop_hvac(model) else {
            return false;
        };
        if plenum.outlet_objects(model).len() <= 1 {
            plenum.remove(model);
            return true;
        }
        let (Some(entry), Some(splitter)) = (self.branch_entry(model), lp.zone_splitter(model)) else {
            return false;
        };
        if let Some(b) = plenum.branch_index_for_outlet_object(model, entry) {
            plenum.remove_port_for_branch(model, b);
        }
        let port = splitter.next_outlet_port(model);
        model.connect(splitter.id(), port, entry, 0);
        true
    }

    pub fn remove_return_plenum(self, model: &mut Model) -> bool {
        let Some(plenum) = self.return_plenum(model) else {
            return false;
        };
        let Some(lp) = self.air_loop_hvac(model) else {
            return false;
        };
        if plenum.inlet_objects(model).len() <= 1 {
            plenum.remove(model);
            return true;
        }
        let (Some(exit), Some(mixer)) = (self.branch_exit(model), lp.zone_mixer(model)) else {
            return false;
        };
        if let Some(b) = plenum.branch_index_for_inlet_object(model, exit) {
            plenum.remove_port_for_branch(model, b);
        }
        let port = mixer.next_inlet_port(model);
        model.connect(exit, 0, mixer.id(), port);
        true
    }
}
