//! sqs-alarms CLI
//!
//! Run with: cargo run -- [service.json]
//!
//! Reads a service document, adds the configured SQS alarms to its compiled
//! template and prints the template to stdout.
//!
//! Environment variables:
//! - SQS_ALARMS_SERVICE: Service document path when no argument is given (default: serverless.json)
//! - SQS_ALARMS_STAGE: Deployment stage (default: provider.stage, then dev)
//! - SQS_ALARMS_REGION: Deployment region (default: provider.region, then us-east-1)
//! - RUST_LOG: Log level (default: info)

use sqs_alarms::plugin::service::service_path;
use sqs_alarms::plugin::{DeployOptions, HookOutcome, ServiceConfig, SqsAlarmsPlugin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqs_alarms=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = service_path(
        std::env::args().nth(1),
        std::env::var("SQS_ALARMS_SERVICE").ok(),
    );

    let mut service = ServiceConfig::from_path(&path).await?;
    let options = DeployOptions::from_env(&service.provider);

    tracing::info!("sqs-alarms configuration:");
    tracing::info!("  Service: {}", path);
    tracing::info!("  Stage: {}", options.stage);
    tracing::info!("  Region: {}", options.region);

    let plugin = SqsAlarmsPlugin::new(options);
    match plugin.before_deploy_resources(&mut service)? {
        HookOutcome::NotConfigured => tracing::warn!("No custom.sqs-alarms block found"),
        HookOutcome::SkippedStage => {}
        HookOutcome::Compiled(count) => tracing::info!("Added {} alarm resources", count),
    }

    println!("{}", serde_json::to_string_pretty(service.template())?);
    Ok(())
}
