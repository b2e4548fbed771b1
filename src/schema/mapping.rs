//! Field mapping table
//!
//! Maps field names to declared types. Unseen fields are inferred from their
//! first value and keep that type for the lifetime of the field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::field_type::FieldType;
use crate::error::{QuarryError, Result};
use crate::models::Document;
use crate::tokenizer::AnalyzerMode;

/// Field name → type table
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMappings {
    fields: BTreeMap<String, FieldType>,
}

impl FieldMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FieldMappings::put`] for tests and setup code
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Result<Self> {
        self.put(name, field_type)?;
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&FieldType> {
        self.fields.get(field)
    }

    /// Declare a field type
    ///
    /// Returns `true` when the field was newly mapped. Re-declaring the same
    /// type is a no-op; declaring a different one is a [`QuarryError::MappingConflict`].
    pub fn put(&mut self, name: impl Into<String>, field_type: FieldType) -> Result<bool> {
        let name = name.into();
        if name.is_empty() || name.contains(':') || name == "id" {
            return Err(QuarryError::InvalidDocument(format!(
                "invalid field name `{name}`"
            )));
        }
        match self.fields.get(&name) {
            Some(existing) if *existing == field_type => Ok(false),
            Some(existing) => Err(QuarryError::MappingConflict {
                field: name,
                existing: existing.to_string(),
                requested: field_type.to_string(),
            }),
            None => {
                self.fields.insert(name, field_type);
                Ok(true)
            }
        }
    }

    /// Validate a document against the table without mutating it
    ///
    /// Returns the mappings to add for fields seen for the first time.
    pub fn resolve(
        &self,
        doc: &Document,
        default_analyzer: AnalyzerMode,
        date_detection: bool,
    ) -> Result<Vec<(String, FieldType)>> {
        let mut inferred = Vec::new();
        for (name, value) in &doc.fields {
            match self.fields.get(name) {
                Some(field_type) => field_type.validate(name, value)?,
                None => {
                    let field_type = FieldType::infer(value, default_analyzer, date_detection);
                    field_type.validate(name, value)?;
                    inferred.push((name.clone(), field_type));
                }
            }
        }
        Ok(inferred)
    }

    /// Record mappings produced by [`FieldMappings::resolve`]
    pub fn apply(&mut self, inferred: Vec<(String, FieldType)>) {
        for (name, field_type) in inferred {
            self.fields.entry(name).or_insert(field_type);
        }
    }

    /// Fields searched by multi-field matches when none are named
    pub fn text_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, field_type)| field_type.supports_fulltext())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldType)> {
        self.fields.iter().map(|(name, field_type)| (name.as_str(), field_type))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
