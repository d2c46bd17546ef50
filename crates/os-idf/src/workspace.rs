//! Handle-addressed collection of records.

use std::collections::HashMap;

use os_core::Handle;
use tracing::debug;

use crate::error::{IdfError, IdfResult};
use crate::idd::{FieldKind, RecordType};
use crate::record::{Record, Value};

/// In-memory table of records, kept in insertion order.
///
/// Duplicate names within one type are allowed here; uniqueness is the
/// model layer's concern.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    records: Vec<Record>,
    by_handle: HashMap<Handle, usize>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Create an empty record and return its handle.
    pub fn create_record(&mut self, record_type: RecordType) -> Handle {
        let record = Record::new(record_type);
        let handle = record.handle();
        debug!(record_type = record_type.keyword(), %handle, "create record");
        self.by_handle.insert(handle, self.records.len());
        self.records.push(record);
        handle
    }

    /// Create a named record in one step.
    pub fn create_named(&mut self, record_type: RecordType, name: &str) -> IdfResult<Handle> {
        let handle = self.create_record(record_type);
        if record_type.descriptor().has_name {
            self.set_field(handle, 0, Value::text(name))?;
        }
        Ok(handle)
    }

    /// Take a record out; the rest keep their order.
    pub fn remove_record(&mut self, handle: Handle) -> Option<Record> {
        let i = self.by_handle.remove(&handle)?;
        let record = self.records.remove(i);
        for index in self.by_handle.values_mut() {
            if *index > i {
                *index -= 1;
            }
        }
        debug!(record_type = record.record_type().keyword(), %handle, "remove record");
        Some(record)
    }

    pub fn record(&self, handle: Handle) -> Option<&Record> {
        self.by_handle.get(&handle).map(|&i| &self.records[i])
    }

    fn record_mut(&mut self, handle: Handle) -> IdfResult<&mut Record> {
        let i = *self
            .by_handle
            .get(&handle)
            .ok_or(IdfError::UnknownHandle(handle))?;
        Ok(&mut self.records[i])
    }

    /// Set a fixed field; out-of-domain values fail with a validation error
    /// and leave the record unchanged.
    pub fn set_field(&mut self, handle: Handle, index: usize, value: Value) -> IdfResult<()> {
        self.record_mut(handle)?.set_field(index, value)
    }

    pub fn set_field_by_name(&mut self, handle: Handle, name: &str, value: Value) -> IdfResult<()> {
        let record = self.record_mut(handle)?;
        let d = record.descriptor();
        let index = d.field_index(name).ok_or_else(|| IdfError::UnknownField {
            keyword: d.keyword,
            name: name.to_string(),
        })?;
        record.set_field(index, value)
    }

    /// Append an empty extensible group and return its index.
    pub fn push_extensible_group(&mut self, handle: Handle) -> IdfResult<usize> {
        self.record_mut(handle)?.push_group(Vec::new())
    }

    /// Append an extensible group with the given leading values.
    pub fn push_group(&mut self, handle: Handle, values: Vec<Value>) -> IdfResult<usize> {
        self.record_mut(handle)?.push_group(values)
    }

    pub fn set_group_field(
        &mut self,
        handle: Handle,
        group: usize,
        index: usize,
        value: Value,
    ) -> IdfResult<()> {
        self.record_mut(handle)?
            .set_group_field(group, index, value)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// All records of one type, in insertion order.
    pub fn objects_by_type(&self, record_type: RecordType) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| r.record_type() == record_type)
            .collect()
    }

    /// First record of the given type whose name matches, ignoring ASCII case.
    pub fn object_by_type_and_name(&self, record_type: RecordType, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| {
            r.record_type() == record_type
                && r.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    /// Resolve a cross-reference field to the record it names.
    pub fn get_target(&self, handle: Handle, index: usize) -> Option<Handle> {
        let record = self.record(handle)?;
        let def = record.descriptor().fields.get(index)?;
        let name = record.field(index)?.as_str()?;
        self.resolve(def.kind, name)
    }

    /// Resolve a cross-reference field inside an extensible group.
    pub fn get_group_target(&self, handle: Handle, group: usize, index: usize) -> Option<Handle> {
        let record = self.record(handle)?;
        let def = record.descriptor().extensible.get(index)?;
        let name = record.groups().get(group)?.get(index)?.as_str()?;
        self.resolve(def.kind, name)
    }

    fn resolve(&self, kind: FieldKind, name: &str) -> Option<Handle> {
        let FieldKind::Reference(targets) = kind else {
            return None;
        };
        targets
            .iter()
            .find_map(|t| self.object_by_type_and_name(*t, name))
            .map(Record::handle)
    }

    pub(crate) fn insert(&mut self, record: Record) {
        self.by_handle.insert(record.handle(), self.records.len());
        self.records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn create_and_lookup_by_type() {
        let mut ws = Workspace::new();
        let a = ws.create_named(RecordType::Zone, "Zone A").unwrap();
        let _ = ws.create_named(RecordType::BoilerHotWater, "Boiler").unwrap();
        let b = ws.create_named(RecordType::Zone, "Zone B").unwrap();

        let zones: Vec<Handle> = ws
            .objects_by_type(RecordType::Zone)
            .into_iter()
            .map(Record::handle)
            .collect();
        assert_eq!(zones, vec![a, b]);
        assert_eq!(ws.len(), 3);
    }

    #[test]
    fn removed_record_leaves_the_rest_addressable() {
        let mut ws = Workspace::new();
        let a = ws.create_named(RecordType::Zone, "Zone A").unwrap();
        let b = ws.create_named(RecordType::Zone, "Zone B").unwrap();
        let c = ws.create_named(RecordType::Zone, "Zone C").unwrap();

        let gone = ws.remove_record(b).unwrap();
        assert_eq!(gone.name(), Some("Zone B"));
        assert!(ws.remove_record(b).is_none());
        assert!(ws.record(b).is_none());
        assert_eq!(ws.record(c).unwrap().name(), Some("Zone C"));
        assert_eq!(ws.object_by_type_and_name(RecordType::Zone, "Zone A").map(Record::handle), Some(a));
        assert_eq!(ws.len(), 2);
    }

    #[test]
    fn duplicate_names_are_permitted() {
        let mut ws = Workspace::new();
        ws.create_named(RecordType::Zone, "Same").unwrap();
        ws.create_named(RecordType::Zone, "Same").unwrap();
        assert_eq!(ws.objects_by_type(RecordType::Zone).len(), 2);
    }

    #[test]
    fn get_target_follows_reference() {
        let mut ws = Workspace::new();
        let sched = ws
            .create_named(RecordType::ScheduleConstant, "Always On")
            .unwrap();
        let hx = ws
            .create_named(RecordType::HeatExchangerFluidToFluid, "HX")
            .unwrap();
        ws.set_field_by_name(hx, "Availability Schedule Name", Value::text("always on"))
            .unwrap();

        assert_eq!(ws.get_target(hx, 1), Some(sched));
        // Not a reference field
        assert_eq!(ws.get_target(hx, 0), None);
    }

    #[test]
    fn get_group_target_follows_reference() {
        let mut ws = Workspace::new();
        let list = ws
            .create_named(RecordType::PlantEquipmentList, "List")
            .unwrap();
        let boiler = ws
            .create_named(RecordType::BoilerHotWater, "Boiler 1")
            .unwrap();
        let g = ws
            .push_group(
                list,
                vec![Value::text("Boiler:HotWater"), Value::text("Boiler 1")],
            )
            .unwrap();
        assert_eq!(ws.get_group_target(list, g, 1), Some(boiler));
    }

    #[test]
    fn missing_target_is_none() {
        let mut ws = Workspace::new();
        let hx = ws
            .create_named(RecordType::HeatExchangerFluidToFluid, "HX")
            .unwrap();
        ws.set_field_by_name(hx, "Availability Schedule Name", Value::text("Nope"))
            .unwrap();
        assert_eq!(ws.get_target(hx, 1), None);
    }

    #[test]
    fn set_field_rejects_illegal_choice() {
        let mut ws = Workspace::new();
        let h = ws
            .create_named(RecordType::PlantEquipmentOperationComponentSetpoint, "S")
            .unwrap();
        let g = ws.push_extensible_group(h).unwrap();
        let err = ws
            .set_group_field(h, g, 5, Value::text("Sideways"))
            .unwrap_err();
        assert!(matches!(
            err,
            IdfError::Validation(ValidationError::IllegalChoice { .. })
        ));
        assert!(ws.set_group_field(h, g, 5, Value::text("dual")).is_ok());
        assert_eq!(ws.record(h).unwrap().group_string(g, "Operation Type"), Some("Dual"));
    }

    #[test]
    fn unknown_field_name_is_an_error() {
        let mut ws = Workspace::new();
        let h = ws.create_record(RecordType::Zone);
        assert!(matches!(
            ws.set_field_by_name(h, "Color", Value::text("red")),
            Err(IdfError::UnknownField { .. })
        ));
    }

    #[test]
    fn groups_rejected_on_fixed_types() {
        let mut ws = Workspace::new();
        let h = ws.create_record(RecordType::BoilerHotWater);
        assert!(matches!(
            ws.push_extensible_group(h),
            Err(IdfError::NotExtensible { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn name_lookup_ignores_ascii_case(name in "[A-Za-z][A-Za-z0-9]{0,20}") {
            let mut ws = Workspace::new();
            let h = ws.create_named(RecordType::Zone, &name).unwrap();
            let upper = ws.object_by_type_and_name(RecordType::Zone, &name.to_ascii_uppercase());
            prop_assert_eq!(upper.map(Record::handle), Some(h));
            prop_assert!(ws
                .object_by_type_and_name(RecordType::ScheduleConstant, &name)
                .is_none());
        }
    }
}
