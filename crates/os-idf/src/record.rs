//! Record values and the record container itself.

use std::fmt;

use os_core::{format_real, Handle};

use crate::error::{IdfError, IdfResult, ValidationError};
use crate::idd::{FieldDef, FieldKind, RecordDescriptor, RecordType};

/// One typed cell of a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Real(f64),
    Integer(i64),
    /// The `Autosize` keyword on an autosizable real field.
    Autosize,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Parse IDF text into a value of the given field kind.
    pub fn parse(raw: &str, kind: FieldKind) -> Result<Value, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Value::Empty);
        }
        match kind {
            FieldKind::Alpha | FieldKind::Choice(_) | FieldKind::Reference(_) => {
                Ok(Value::text(raw))
            }
            FieldKind::Real { autosizable } => {
                if raw.eq_ignore_ascii_case("autosize") || raw.eq_ignore_ascii_case("autocalculate")
                {
                    if autosizable {
                        Ok(Value::Autosize)
                    } else {
                        Err(format!("'{raw}' is not allowed here"))
                    }
                } else {
                    raw.parse::<f64>()
                        .map(Value::Real)
                        .map_err(|_| format!("'{raw}' is not a number"))
                }
            }
            FieldKind::Integer => raw
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| format!("'{raw}' is not an integer")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Real(v) => f.write_str(&format_real(*v)),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Autosize => f.write_str("Autosize"),
        }
    }
}

/// Check a value against a field's declared domain, canonicalizing choice keywords.
pub(crate) fn validate(
    keyword: &'static str,
    def: &FieldDef,
    value: Value,
) -> Result<Value, ValidationError> {
    let wrong = |expected: &'static str| ValidationError::WrongKind {
        keyword,
        field: def.name,
        expected,
    };
    if value.is_empty() {
        return Ok(Value::Empty);
    }
    match (def.kind, value) {
        (FieldKind::Alpha | FieldKind::Reference(_), Value::Text(s)) => Ok(Value::Text(s)),
        (FieldKind::Alpha | FieldKind::Reference(_), _) => Err(wrong("text")),
        (FieldKind::Choice(keys), Value::Text(s)) => {
            match keys.iter().find(|k| k.eq_ignore_ascii_case(s.trim())) {
                Some(k) => Ok(Value::text(*k)),
                None => Err(ValidationError::IllegalChoice {
                    keyword,
                    field: def.name,
                    value: s,
                }),
            }
        }
        (FieldKind::Choice(_), _) => Err(wrong("a keyword")),
        (FieldKind::Real { .. }, Value::Real(v)) => {
            if v.is_finite() {
                Ok(Value::Real(v))
            } else {
                Err(ValidationError::NonFinite {
                    keyword,
                    field: def.name,
                    value: v,
                })
            }
        }
        (FieldKind::Real { .. }, Value::Integer(i)) => Ok(Value::Real(i as f64)),
        (FieldKind::Real { autosizable: true }, Value::Autosize) => Ok(Value::Autosize),
        (FieldKind::Real { autosizable: false }, Value::Autosize) => {
            Err(ValidationError::NotAutosizable {
                keyword,
                field: def.name,
            })
        }
        (FieldKind::Real { .. }, Value::Text(_)) => Err(wrong("a number")),
        (FieldKind::Integer, Value::Integer(i)) => Ok(Value::Integer(i)),
        (FieldKind::Integer, _) => Err(wrong("an integer")),
        (_, Value::Empty) => Ok(Value::Empty),
    }
}

/// A flat, typed record: fixed fields followed by repeating groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    handle: Handle,
    record_type: RecordType,
    fields: Vec<Value>,
    groups: Vec<Vec<Value>>,
}

impl Record {
    pub(crate) fn new(record_type: RecordType) -> Self {
        let len = record_type.descriptor().fields.len();
        Self {
            handle: Handle::new(),
            record_type,
            fields: vec![Value::Empty; len],
            groups: Vec::new(),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn descriptor(&self) -> &'static RecordDescriptor {
        self.record_type.descriptor()
    }

    /// The record's name, when its type is named and the field is set.
    pub fn name(&self) -> Option<&str> {
        if !self.descriptor().has_name {
            return None;
        }
        self.fields.first().and_then(Value::as_str)
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Value> {
        self.descriptor()
            .field_index(name)
            .and_then(|i| self.fields.get(i))
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.field_by_name(name).and_then(Value::as_str)
    }

    pub fn get_real(&self, name: &str) -> Option<f64> {
        self.field_by_name(name).and_then(Value::as_real)
    }

    pub fn groups(&self) -> &[Vec<Value>] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Field of an extensible group, looked up by name.
    pub fn group_string(&self, group: usize, name: &str) -> Option<&str> {
        let i = self.descriptor().group_field_index(name)?;
        self.groups.get(group)?.get(i).and_then(Value::as_str)
    }

    pub(crate) fn set_field(&mut self, index: usize, value: Value) -> IdfResult<()> {
        let d = self.descriptor();
        let def = d.fields.get(index).ok_or(IdfError::FieldIndex {
            keyword: d.keyword,
            index,
            len: d.fields.len(),
        })?;
        self.fields[index] = validate(d.keyword, def, value)?;
        Ok(())
    }

    pub(crate) fn push_group(&mut self, values: Vec<Value>) -> IdfResult<usize> {
        let d = self.descriptor();
        if !d.is_extensible() {
            return Err(IdfError::NotExtensible { keyword: d.keyword });
        }
        if values.len() > d.extensible.len() {
            return Err(IdfError::FieldIndex {
                keyword: d.keyword,
                index: values.len() - 1,
                len: d.extensible.len(),
            });
        }
        let mut group = vec![Value::Empty; d.extensible.len()];
        for (slot, (def, value)) in group.iter_mut().zip(d.extensible.iter().zip(values)) {
            *slot = validate(d.keyword, def, value)?;
        }
        self.groups.push(group);
        Ok(self.groups.len() - 1)
    }

    pub(crate) fn set_group_field(
        &mut self,
        group: usize,
        index: usize,
        value: Value,
    ) -> IdfResult<()> {
        let d = self.descriptor();
        let count = self.groups.len();
        let slots = self.groups.get_mut(group).ok_or(IdfError::GroupIndex {
            keyword: d.keyword,
            group,
            count,
        })?;
        let def = d.extensible.get(index).ok_or(IdfError::FieldIndex {
            keyword: d.keyword,
            index,
            len: d.extensible.len(),
        })?;
        slots[index] = validate(d.keyword, def, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_is_canonicalized() {
        let mut r = Record::new(RecordType::BoilerHotWater);
        r.set_field(1, Value::text("naturalgas")).unwrap();
        assert_eq!(r.get_string("Fuel Type"), Some("NaturalGas"));
    }

    #[test]
    fn out_of_domain_choice_is_rejected() {
        let mut r = Record::new(RecordType::BoilerHotWater);
        let err = r.set_field(1, Value::text("Wood")).unwrap_err();
        assert!(matches!(
            err,
            IdfError::Validation(ValidationError::IllegalChoice { .. })
        ));
        assert!(r.field(1).unwrap().is_empty());
    }

    #[test]
    fn autosize_only_on_autosizable_fields() {
        let mut r = Record::new(RecordType::BoilerHotWater);
        assert!(r.set_field(2, Value::Autosize).is_ok());
        assert!(r.set_field(3, Value::Autosize).is_err());
    }

    #[test]
    fn non_finite_real_is_rejected() {
        let mut r = Record::new(RecordType::ScheduleConstant);
        assert!(r.set_field(2, Value::Real(f64::NAN)).is_err());
        assert!(r.set_field(2, Value::Real(1.0)).is_ok());
    }

    #[test]
    fn group_push_is_all_or_nothing() {
        let mut r = Record::new(RecordType::PlantEquipmentOperationComponentSetpoint);
        let bad = vec![
            Value::text("Boiler:HotWater"),
            Value::text("Boiler 1"),
            Value::Empty,
            Value::Empty,
            Value::Autosize,
            Value::text("Sideways"),
        ];
        assert!(r.push_group(bad).is_err());
        assert_eq!(r.group_count(), 0);
    }

    #[test]
    fn unnamed_type_has_no_name() {
        let mut r = Record::new(RecordType::ZoneHvacEquipmentConnections);
        r.set_field(0, Value::text("Zone 1")).unwrap();
        assert_eq!(r.name(), None);
    }

    #[test]
    fn value_parse_by_kind() {
        let real = FieldKind::Real { autosizable: true };
        assert_eq!(Value::parse("Autosize", real), Ok(Value::Autosize));
        assert_eq!(Value::parse(" 2.5 ", real), Ok(Value::Real(2.5)));
        assert_eq!(Value::parse("", real), Ok(Value::Empty));
        assert!(Value::parse("abc", real).is_err());
        assert_eq!(Value::parse("3", FieldKind::Integer), Ok(Value::Integer(3)));
    }
}
