//! The object arena and its port connection table.

use std::collections::HashMap;

use os_core::{Handle, ObjectId};
use tracing::debug;

use crate::objects::{
    AirLoopData, AirTerminalData, GeneratorData, HeatPumpWaterHeaterData, NodeData, ObjectKind,
    ObjectType, OperationSchemeData, PlantEquipmentData, PlantLoopData, ScheduleData,
    SetpointManagerData, ThermalZoneData, ZoneHvacData,
};

/// Default calendar year: a non-leap year starting on a Thursday.
pub const DEFAULT_CALENDAR_YEAR: i32 = 2009;

/// One side of a wired connection: an object and a port index.
///
/// Inlet and outlet ports are numbered independently. Which one a `Port`
/// names follows from the map it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port {
    pub object: ObjectId,
    pub index: u32,
}

impl Port {
    pub fn new(object: ObjectId, index: u32) -> Self {
        Self { object, index }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectData {
    handle: Handle,
    name: String,
    pub(crate) kind: ObjectKind,
}

impl ObjectData {
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }
}

/// Owns every model object; handles index into it.
///
/// Connections are stored once per direction: `downstream` maps an outlet
/// port to the inlet port it feeds, `upstream` is the exact inverse.
#[derive(Debug, Clone)]
pub struct Model {
    objects: Vec<Option<ObjectData>>,
    downstream: HashMap<Port, Port>,
    upstream: HashMap<Port, Port>,
    calendar_year: i32,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            downstream: HashMap::new(),
            upstream: HashMap::new(),
            calendar_year: DEFAULT_CALENDAR_YEAR,
        }
    }

    pub fn calendar_year(&self) -> i32 {
        self.calendar_year
    }

    pub fn set_calendar_year(&mut self, year: i32) {
        self.calendar_year = year;
    }

    /// Insert an object under a generated unique name.
    pub(crate) fn add_object(&mut self, kind: ObjectKind) -> ObjectId {
        let id = ObjectId::from_index(self.objects.len() as u32);
        let ty = kind.object_type();
        let name = self.generated_name(ty, kind.default_name());
        debug!(object_type = ty.as_str(), %id, %name, "add object");
        self.objects.push(Some(ObjectData {
            handle: Handle::new(),
            name,
            kind,
        }));
        id
    }

    /// Drop an object and every connection touching it.
    pub(crate) fn remove_object(&mut self, id: ObjectId) {
        self.disconnect_all(id);
        if let Some(slot) = self.objects.get_mut(id.index() as usize) {
            if let Some(data) = slot.take() {
                debug!(object_type = data.object_type().as_str(), %id, name = %data.name, "remove object");
            }
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectData> {
        self.objects.get(id.index() as usize)?.as_ref()
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut ObjectData> {
        self.objects.get_mut(id.index() as usize)?.as_mut()
    }

    pub fn kind(&self, id: ObjectId) -> Option<&ObjectKind> {
        self.object(id).map(|o| &o.kind)
    }

    pub(crate) fn kind_mut(&mut self, id: ObjectId) -> Option<&mut ObjectKind> {
        self.object_mut(id).map(|o| &mut o.kind)
    }

    pub fn object_type(&self, id: ObjectId) -> Option<ObjectType> {
        self.object(id).map(ObjectData::object_type)
    }

    pub fn is_type(&self, id: ObjectId, ty: ObjectType) -> bool {
        self.object_type(id) == Some(ty)
    }

    pub fn handle(&self, id: ObjectId) -> Option<Handle> {
        self.object(id).map(ObjectData::handle)
    }

    pub fn name(&self, id: ObjectId) -> Option<&str> {
        self.object(id).map(ObjectData::name)
    }

    /// Rename an object. A name already used by another object of the same
    /// type gets a numeric suffix; the name actually assigned is returned.
    pub fn set_name(&mut self, id: ObjectId, name: &str) -> Option<String> {
        let ty = self.object_type(id)?;
        let taken = |m: &Model, candidate: &str| {
            m.iter()
                .any(|(other, o)| other != id && o.object_type() == ty && o.name == candidate)
        };
        let mut assigned = name.to_string();
        let mut n = 1;
        while taken(self, &assigned) {
            assigned = format!("{name} {n}");
            n += 1;
        }
        if let Some(o) = self.object_mut(id) {
            o.name = assigned.clone();
        }
        Some(assigned)
    }

    fn generated_name(&self, ty: ObjectType, prefix: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{prefix} {n}");
            if !self
                .iter()
                .any(|(_, o)| o.object_type() == ty && o.name == candidate)
            {
                return candidate;
            }
            n += 1;
        }
    }

    /// Live objects in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectData)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.as_ref().map(|o| (ObjectId::from_index(i as u32), o)))
    }

    pub fn objects_of_type(&self, ty: ObjectType) -> Vec<ObjectId> {
        self.iter()
            .filter(|(_, o)| o.object_type() == ty)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn object_by_name(&self, ty: ObjectType, name: &str) -> Option<ObjectId> {
        self.iter()
            .find(|(_, o)| o.object_type() == ty && o.name == name)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- connections -------------------------------------------------

    /// Wire `source`'s outlet port to `target`'s inlet port.
    ///
    /// # Panics
    /// If either port is already connected. Callers must disconnect first;
    /// an occupied port here means a graph invariant was broken upstream.
    pub fn connect(&mut self, source: ObjectId, outlet: u32, target: ObjectId, inlet: u32) {
        let from = Port::new(source, outlet);
        let to = Port::new(target, inlet);
        assert!(
            !self.downstream.contains_key(&from),
            "outlet port {outlet} of object {source} is already connected"
        );
        assert!(
            !self.upstream.contains_key(&to),
            "inlet port {inlet} of object {target} is already connected"
        );
        assert!(
            self.contains(source) && self.contains(target),
            "connect between objects that are not in the model"
        );
        debug!(%source, outlet, %target, inlet, "connect");
        self.downstream.insert(from, to);
        self.upstream.insert(to, from);
    }

    /// Break the connection leaving an outlet port, returning its far end.
    pub fn disconnect_outlet(&mut self, object: ObjectId, outlet: u32) -> Option<Port> {
        let to = self.downstream.remove(&Port::new(object, outlet))?;
        self.upstream.remove(&to);
        Some(to)
    }

    /// Break the connection entering an inlet port, returning its far end.
    pub fn disconnect_inlet(&mut self, object: ObjectId, inlet: u32) -> Option<Port> {
        let from = self.upstream.remove(&Port::new(object, inlet))?;
        self.downstream.remove(&from);
        Some(from)
    }

    pub(crate) fn disconnect_all(&mut self, object: ObjectId) {
        for p in self.outlet_ports(object) {
            self.disconnect_outlet(object, p);
        }
        for p in self.inlet_ports(object) {
            self.disconnect_inlet(object, p);
        }
    }

    pub fn downstream_port(&self, object: ObjectId, outlet: u32) -> Option<Port> {
        self.downstream.get(&Port::new(object, outlet)).copied()
    }

    pub fn upstream_port(&self, object: ObjectId, inlet: u32) -> Option<Port> {
        self.upstream.get(&Port::new(object, inlet)).copied()
    }

    /// Object fed by the given outlet port.
    pub fn outlet_object(&self, object: ObjectId, outlet: u32) -> Option<ObjectId> {
        self.downstream_port(object, outlet).map(|p| p.object)
    }

    /// Object feeding the given inlet port.
    pub fn inlet_object(&self, object: ObjectId, inlet: u32) -> Option<ObjectId> {
        self.upstream_port(object, inlet).map(|p| p.object)
    }

    /// Connected outlet port indices, ascending.
    pub fn outlet_ports(&self, object: ObjectId) -> Vec<u32> {
        let mut ports: Vec<u32> = self
            .downstream
            .keys()
            .filter(|p| p.object == object)
            .map(|p| p.index)
            .collect();
        ports.sort_unstable();
        ports
    }

    /// Connected inlet port indices, ascending.
    pub fn inlet_ports(&self, object: ObjectId) -> Vec<u32> {
        let mut ports: Vec<u32> = self
            .upstream
            .keys()
            .filter(|p| p.object == object)
            .map(|p| p.index)
            .collect();
        ports.sort_unstable();
        ports
    }

    pub fn is_connected(&self, object: ObjectId) -> bool {
        !self.outlet_ports(object).is_empty() || !self.inlet_ports(object).is_empty()
    }
}

/// Typed read and write access to one `ObjectKind` variant.
macro_rules! kind_accessors {
    ($get:ident, $get_mut:ident, $variant:ident, $ty:ty) => {
        impl Model {
            pub(crate) fn $get(&self, id: ObjectId) -> Option<&$ty> {
                match self.kind(id)? {
                    ObjectKind::$variant(data) => Some(data),
                    _ => None,
                }
            }

            #[allow(dead_code)]
            pub(crate) fn $get_mut(&mut self, id: ObjectId) -> Option<&mut $ty> {
                match self.kind_mut(id)? {
                    ObjectKind::$variant(data) => Some(data),
                    _ => None,
                }
            }
        }
    };
}

kind_accessors!(node_data, node_data_mut, Node, NodeData);
kind_accessors!(plant_loop_data, plant_loop_data_mut, PlantLoop, Box<PlantLoopData>);
kind_accessors!(air_loop_data, air_loop_data_mut, AirLoopHvac, AirLoopData);
kind_accessors!(zone_data, zone_data_mut, ThermalZone, ThermalZoneData);
kind_accessors!(terminal_data, terminal_data_mut, AirTerminal, AirTerminalData);
kind_accessors!(equipment_data, equipment_data_mut, PlantEquipment, PlantEquipmentData);
kind_accessors!(generator_data, generator_data_mut, GeneratorMicroTurbine, GeneratorData);
kind_accessors!(hpwh_data, hpwh_data_mut, WaterHeaterHeatPump, HeatPumpWaterHeaterData);
kind_accessors!(zone_hvac_data, zone_hvac_data_mut, ZoneHvacEquipment, ZoneHvacData);
kind_accessors!(spm_data, spm_data_mut, SetpointManager, SetpointManagerData);
kind_accessors!(schedule_data, schedule_data_mut, Schedule, ScheduleData);
kind_accessors!(scheme_data, scheme_data_mut, OperationScheme, OperationSchemeData);

impl Model {
    pub(crate) fn plenum_zone(&self, id: ObjectId) -> Option<ObjectId> {
        match self.kind(id)? {
            ObjectKind::SupplyPlenum(p) | ObjectKind::ReturnPlenum(p) => p.thermal_zone,
            _ => None,
        }
    }

    pub(crate) fn set_plenum_zone(&mut self, id: ObjectId, zone: Option<ObjectId>) {
        if let Some(ObjectKind::SupplyPlenum(p) | ObjectKind::ReturnPlenum(p)) = self.kind_mut(id) {
            p.thermal_zone = zone;
        }
    }
}
