use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::alarms::AlarmSpec;

/// Key of the alarm block under the service's `custom` section
pub const SETTINGS_KEY: &str = "sqs-alarms";

/// The `custom.sqs-alarms` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginSettings {
    #[serde(default)]
    pub alarms: Vec<AlarmSpec>,
    /// Stages to deploy alarms on; all stages when unset or not a list
    #[serde(
        default,
        deserialize_with = "stage_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub stages: Option<Vec<String>>,
}

/// Only arrays restrict stages; non-string entries never match a stage
fn stage_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(stage) => Some(stage),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

impl PluginSettings {
    /// Read the block out of `custom`, `None` when it is absent or null
    pub fn from_custom(custom: &Map<String, Value>) -> Result<Option<Self>, serde_json::Error> {
        match custom.get(SETTINGS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(Self::deserialize(value)?)),
        }
    }

    pub fn applies_to_stage(&self, stage: &str) -> bool {
        match &self.stages {
            Some(stages) => stages.iter().any(|s| s == stage),
            None => true,
        }
    }
}
