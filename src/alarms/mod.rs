//! SQS backlog alarms
//!
//! Turns declarative alarm specs into `AWS::CloudWatch::Alarm` resources,
//! one per configured threshold.

pub mod compiler;
pub mod config;
pub mod resource;

pub use compiler::{alarm_name, compile, compile_alarm, logical_id, resolve_missing_data};
pub use config::{
    AlarmSpec, MissingDataPolicy, MissingDataSource, StructuredThreshold, Threshold,
    ThresholdEntry, ThresholdValue,
};
pub use resource::{AlarmProperties, AlarmResource, Dimension, TopicArn};
