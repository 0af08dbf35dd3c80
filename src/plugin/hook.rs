//! Deployment lifecycle hook

use super::service::{DeployOptions, ServiceConfig};
use super::settings::PluginSettings;
use super::PluginError;
use crate::alarms::compile;

/// Lifecycle event the alarm hook runs on
pub const COMPILE_EVENTS_HOOK: &str = "package:compileEvents";

/// What a hook run did to the template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// No `sqs-alarms` block in the service
    NotConfigured,
    /// Current stage is not in the configured stage list
    SkippedStage,
    /// Number of alarm resources merged
    Compiled(usize),
}

/// Adds queue alarms to the service's compiled template
pub struct SqsAlarmsPlugin {
    options: DeployOptions,
}

impl SqsAlarmsPlugin {
    pub fn new(options: DeployOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    /// Lifecycle events this plugin handles
    pub fn hooks(&self) -> &'static [&'static str] {
        &[COMPILE_EVENTS_HOOK]
    }

    /// Dispatch a lifecycle event; `None` for events the plugin ignores
    pub fn run_hook(
        &self,
        event: &str,
        service: &mut ServiceConfig,
    ) -> Result<Option<HookOutcome>, PluginError> {
        match event {
            COMPILE_EVENTS_HOOK => self.before_deploy_resources(service).map(Some),
            _ => Ok(None),
        }
    }

    /// Compile the configured alarms and merge them into the template
    pub fn before_deploy_resources(
        &self,
        service: &mut ServiceConfig,
    ) -> Result<HookOutcome, PluginError> {
        let settings = match &service.custom {
            Some(custom) => PluginSettings::from_custom(custom).map_err(PluginError::Settings)?,
            None => None,
        };

        let Some(settings) = settings else {
            tracing::debug!("No sqs-alarms configuration, skipping");
            return Ok(HookOutcome::NotConfigured);
        };

        if !settings.applies_to_stage(&self.options.stage) {
            tracing::info!(
                stage = %self.options.stage,
                "Not deploying alarms on stage {}",
                self.options.stage
            );
            return Ok(HookOutcome::SkippedStage);
        }

        let resources = compile(&settings.alarms, &self.options.region);
        let merged = service
            .provider
            .compiled_template
            .merge_resources(&resources)?;

        tracing::info!(
            alarms = settings.alarms.len(),
            resources = merged,
            region = %self.options.region,
            "Compiled SQS alarms"
        );

        Ok(HookOutcome::Compiled(merged))
    }
}
