//! sqs-alarms: CloudFormation alarms for SQS queue backlogs
//!
//! Compiles declarative alarm specs into `AWS::CloudWatch::Alarm` resources
//! watching `ApproximateNumberOfMessagesVisible`, one per threshold, and
//! merges them into a deployment template.
//!
//! # Features
//!
//! - **Threshold shorthand**: bare numbers or records with namespace, period
//!   and evaluation-period overrides
//! - **Alphanumeric logical IDs**: derived from the queue name and threshold
//! - **Missing-data treatment**: one policy for all thresholds or one per index
//! - **OK notifications**: on by default, can be turned off per queue
//! - **Stage filtering**: only deploy alarms on listed stages
//!
//! # Example
//!
//! ```
//! use sqs_alarms::alarms::{compile, AlarmSpec, MissingDataSource};
//!
//! let spec = AlarmSpec::new("orders-queue", "ops-alerts", vec![10.0.into(), 100.0.into()])
//!     .with_name("orders")
//!     .with_treat_missing_data(MissingDataSource::uniform("notBreaching"));
//!
//! let resources = compile(&[spec], "eu-west-1");
//! assert_eq!(resources[0].logical_id, "ordersqueueMessageAlarm10");
//! assert_eq!(resources[1].properties().alarm_name.as_deref(), Some("orders-orders-queue-100"));
//! ```

pub mod alarms;
pub mod plugin;
pub mod template;

// Re-export commonly used types
pub use alarms::{compile, compile_alarm, AlarmResource, AlarmSpec, MissingDataPolicy};
pub use plugin::{DeployOptions, ServiceConfig, SqsAlarmsPlugin};
pub use template::{Template, TemplateError};
