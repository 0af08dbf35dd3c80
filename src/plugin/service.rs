//! Service configuration as handed over by the deployment tool

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ConfigError;
use crate::template::Template;

pub const DEFAULT_STAGE: &str = "dev";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SERVICE_PATH: &str = "serverless.json";

/// Service document path: command-line argument, then `SQS_ALARMS_SERVICE`,
/// then the default
pub fn service_path(arg: Option<String>, env_value: Option<String>) -> String {
    arg.or_else(|| non_blank(env_value))
        .unwrap_or_else(|| DEFAULT_SERVICE_PATH.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Service document
///
/// Only the parts the alarm hook touches are typed; everything else is kept
/// in `extra` so the document can be written back unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Map<String, Value>>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceConfig {
    /// Parse a service document from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a service document from a JSON file
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json_str(&contents)
    }

    /// Compiled template the generated resources are merged into
    pub fn template(&self) -> &Template {
        &self.provider.compiled_template
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(rename = "compiledCloudFormationTemplate", default)]
    pub compiled_template: Template,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage and region for the current deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    pub stage: String,
    pub region: String,
}

impl DeployOptions {
    pub fn new(stage: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            region: region.into(),
        }
    }

    /// Explicit values win, then the provider's, then the defaults
    pub fn resolve(
        stage: Option<String>,
        region: Option<String>,
        provider: &ProviderConfig,
    ) -> Self {
        let stage = stage
            .or_else(|| provider.stage.clone())
            .unwrap_or_else(|| DEFAULT_STAGE.to_string());
        let region = region
            .or_else(|| provider.region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        Self { stage, region }
    }

    /// Resolve from environment variables
    /// SQS_ALARMS_STAGE=dev
    /// SQS_ALARMS_REGION=eu-west-1
    pub fn from_env(provider: &ProviderConfig) -> Self {
        Self::from_vars(
            std::env::var("SQS_ALARMS_STAGE").ok(),
            std::env::var("SQS_ALARMS_REGION").ok(),
            provider,
        )
    }

    /// Resolve from raw variable values; blank values count as unset
    pub fn from_vars(
        stage: Option<String>,
        region: Option<String>,
        provider: &ProviderConfig,
    ) -> Self {
        Self::resolve(non_blank(stage), non_blank(region), provider)
    }
}
