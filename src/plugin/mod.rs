//! Deployment-tool integration
//!
//! Reads the `custom.sqs-alarms` block from a service document, applies the
//! stage filter and merges the compiled alarms into the provider's compiled
//! template.

pub mod hook;
pub mod service;
pub mod settings;

pub use hook::{HookOutcome, SqsAlarmsPlugin, COMPILE_EVENTS_HOOK};
pub use service::{DeployOptions, ProviderConfig, ServiceConfig};
pub use settings::{PluginSettings, SETTINGS_KEY};

use crate::template::TemplateError;

/// Errors loading the service document
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Invalid sqs-alarms settings: {0}")]
    Settings(#[source] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}
