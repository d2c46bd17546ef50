//! User-authored plant equipment operation schemes.

use os_core::ObjectId;

use crate::connectors::handle;
use crate::equipment::PlantEquipment;
use crate::model::Model;
use crate::objects::{LoadRange, ObjectKind, ObjectType, OperationSchemeData, OperationSchemeKind};

/// Upper bound of the default load range, in watts.
pub const MAXIMUM_LOAD: f64 = 1.0e9;

handle!(
    /// Load-range dispatch for plant equipment. A new scheme has a single
    /// empty range `[0, 1e9]`.
    OperationScheme
);

impl OperationScheme {
    pub fn new(model: &mut Model, kind: OperationSchemeKind) -> Self {
        OperationScheme(model.add_object(ObjectKind::OperationScheme(OperationSchemeData {
            kind,
            ranges: vec![LoadRange {
                lower: 0.0,
                upper: MAXIMUM_LOAD,
                equipment: Vec::new(),
            }],
        })))
    }

    pub fn from_id(model: &Model, id: ObjectId) -> Option<Self> {
        model
            .is_type(id, ObjectType::OperationScheme)
            .then_some(OperationScheme(id))
    }

    pub fn kind(self, model: &Model) -> Option<OperationSchemeKind> {
        model.scheme_data(self.0).map(|d| d.kind)
    }

    pub fn load_ranges(self, model: &Model) -> Vec<LoadRange> {
        model
            .scheme_data(self.0)
            .map(|d| d.ranges.clone())
            .unwrap_or_default()
    }

    /// Append `equipment` to the last (highest) range.
    pub fn add_equipment(self, model: &mut Model, equipment: PlantEquipment) -> bool {
        if !model.is_type(equipment.id(), ObjectType::PlantEquipment) {
            return false;
        }
        let Some(range) = model
            .scheme_data_mut(self.0)
            .and_then(|d| d.ranges.last_mut())
        else {
            return false;
        };
        if range.equipment.contains(&equipment.id()) {
            return false;
        }
        range.equipment.push(equipment.id());
        true
    }

    /// Split the range containing `upper` so a new range ends there and
    /// holds `equipment`. The range above keeps its equipment.
    pub fn add_load_range(self, model: &mut Model, upper: f64, equipment: &[PlantEquipment]) -> bool {
        if !upper.is_finite() || upper <= 0.0 || upper >= MAXIMUM_LOAD {
            return false;
        }
        if equipment
            .iter()
            .any(|e| !model.is_type(e.id(), ObjectType::PlantEquipment))
        {
            return false;
        }
        let Some(data) = model.scheme_data_mut(self.0) else {
            return false;
        };
        let Some(i) = data
            .ranges
            .iter()
            .position(|r| r.lower < upper && upper < r.upper)
        else {
            return false;
        };
        let lower = data.ranges[i].lower;
        data.ranges[i].lower = upper;
        data.ranges.insert(
            i,
            LoadRange {
                lower,
                upper,
                equipment: equipment.iter().map(|e| e.id()).collect(),
            },
        );
        true
    }
}
