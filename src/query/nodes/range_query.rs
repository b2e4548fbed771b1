//! Range query - numeric, date and lexicographic ranges

use roaring::RoaringBitmap;

use crate::models::FieldValue;
use crate::query::context::QueryContext;
use crate::query::types::{Clause, RangeBounds, RangeValue};
use crate::schema::{date_value_millis, FieldType};

/// Query that matches documents with field values in a range
///
/// Bounds are compared against the stored value: numerically for integer
/// and float fields, as instants for date fields (falling back to string
/// order when either side is not a date), and lexicographically for text
/// and keyword fields. Boolean and geo fields never match.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeQuery {
    /// Field to query
    pub field: String,
    /// Range bounds
    pub bounds: RangeBounds,
}

impl RangeQuery {
    /// Create a new range query with no bounds
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            bounds: RangeBounds::default(),
        }
    }

    /// Set greater than or equal bound
    pub fn gte(mut self, value: impl Into<RangeValue>) -> Self {
        self.bounds.gte = Some(value.into());
        self
    }

    /// Set greater than bound
    pub fn gt(mut self, value: impl Into<RangeValue>) -> Self {
        self.bounds.gt = Some(value.into());
        self
    }

    /// Set less than or equal bound
    pub fn lte(mut self, value: impl Into<RangeValue>) -> Self {
        self.bounds.lte = Some(value.into());
        self
    }

    /// Set less than bound
    pub fn lt(mut self, value: impl Into<RangeValue>) -> Self {
        self.bounds.lt = Some(value.into());
        self
    }

    /// Whether a stored value falls inside the bounds
    pub fn contains(&self, field_type: &FieldType, value: &FieldValue) -> bool {
        match field_type {
            FieldType::Integer | FieldType::Float => value
                .as_f64()
                .and_then(|v| self.bounds.contains_f64(v))
                .unwrap_or(false),
            FieldType::Date => date_value_millis(value)
                .and_then(|millis| self.bounds.contains_millis(millis))
                .unwrap_or_else(|| self.bounds.contains_str(&value.display_string())),
            FieldType::Text { .. } | FieldType::Keyword => {
                self.bounds.contains_str(&value.display_string())
            }
            FieldType::Boolean | FieldType::GeoPoint => false,
        }
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        let field_type = match ctx.field_type(&self.field) {
            Some(field_type) => field_type,
            None => return Clause::empty(),
        };

        let matches: RoaringBitmap = ctx
            .field_values(&self.field)
            .into_iter()
            .filter(|(_, value)| self.contains(field_type, value))
            .map(|(docno, _)| docno.as_u32())
            .collect();
        Clause::constant(matches, 1.0)
    }
}
