//! Compiled deployment template
//!
//! Generated resources are deep-merged into the template's `Resources`
//! section, so a fragment whose logical ID already exists overwrites the
//! overlapping fields of the earlier definition.

mod merge;

pub use merge::deep_merge;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::alarms::AlarmResource;

pub const RESOURCES_KEY: &str = "Resources";

/// Template document, kept as raw JSON so unrelated sections pass through
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template {
    document: Map<String, Value>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: Map<String, Value>) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// The `Resources` section, if present and an object
    pub fn resources(&self) -> Option<&Map<String, Value>> {
        self.document.get(RESOURCES_KEY).and_then(Value::as_object)
    }

    /// Look up a resource by logical ID
    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.resources().and_then(|r| r.get(logical_id))
    }

    /// The `Resources` section, created empty when missing
    fn resources_value_mut(&mut self) -> Result<&mut Value, TemplateError> {
        let resources = self
            .document
            .entry(RESOURCES_KEY)
            .or_insert_with(|| Value::Object(Map::new()));

        if !resources.is_object() {
            return Err(TemplateError::ResourcesNotObject(
                json_type_name(resources).to_string(),
            ));
        }
        Ok(resources)
    }

    /// Deep-merge a single-key resource fragment into `Resources`
    pub fn merge_fragment(&mut self, fragment: Value) -> Result<(), TemplateError> {
        if !fragment.is_object() {
            return Err(TemplateError::FragmentNotObject(
                json_type_name(&fragment).to_string(),
            ));
        }
        deep_merge(self.resources_value_mut()?, fragment);
        Ok(())
    }

    /// Merge compiled alarms in order
    pub fn merge_resources(&mut self, resources: &[AlarmResource]) -> Result<usize, TemplateError> {
        for resource in resources {
            if self.resource(&resource.logical_id).is_some() {
                tracing::debug!(
                    logical_id = %resource.logical_id,
                    "Merging over existing resource"
                );
            }
            self.merge_fragment(resource.to_fragment()?)?;
        }
        Ok(resources.len())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template Resources must be an object, found {0}")]
    ResourcesNotObject(String),

    #[error("Resource fragment must be an object, found {0}")]
    FragmentNotObject(String),

    #[error("Failed to serialize resource: {0}")]
    Serialize(#[from] serde_json::Error),
}
