//! Schema and field type system
//!
//! - Field types (text, keyword, integer, float, boolean, date, geo_point)
//! - The field mapping table with type inference for unseen fields

mod field_type;
mod mapping;

pub use field_type::{date_value_millis, parse_date_millis, FieldType};
pub use mapping::FieldMappings;
