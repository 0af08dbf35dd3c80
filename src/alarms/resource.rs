//! CloudFormation alarm resource types
//!
//! Optional properties are `None` until set through the `with_*` methods and
//! are left out of the serialized output entirely.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::json;

use super::config::{MissingDataPolicy, Threshold, ThresholdValue};

pub const RESOURCE_TYPE: &str = "AWS::CloudWatch::Alarm";
pub const METRIC_NAME: &str = "ApproximateNumberOfMessagesVisible";
pub const STATISTIC: &str = "Sum";
pub const COMPARISON_OPERATOR: &str = "GreaterThanOrEqualToThreshold";
pub const QUEUE_DIMENSION: &str = "QueueName";
/// Pseudo parameter the template engine resolves to the deploying account
pub const ACCOUNT_ID_REF: &str = "AWS::AccountId";

/// One generated alarm, keyed by its logical ID
///
/// Serializes as a single-entry map `{ logical_id: definition }`, ready to be
/// merged into a template's `Resources` section.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmResource {
    pub logical_id: String,
    pub definition: ResourceDefinition,
}

impl AlarmResource {
    pub fn new(logical_id: impl Into<String>, properties: AlarmProperties) -> Self {
        Self {
            logical_id: logical_id.into(),
            definition: ResourceDefinition {
                resource_type: RESOURCE_TYPE,
                properties,
            },
        }
    }

    pub fn properties(&self) -> &AlarmProperties {
        &self.definition.properties
    }

    /// Convert to a JSON fragment
    pub fn to_fragment(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for AlarmResource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.logical_id, &self.definition)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDefinition {
    #[serde(rename = "Type")]
    pub resource_type: &'static str,
    #[serde(rename = "Properties")]
    pub properties: AlarmProperties,
}

/// `Properties` block of an `AWS::CloudWatch::Alarm`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlarmProperties {
    pub alarm_description: String,
    pub namespace: String,
    pub metric_name: &'static str,
    pub dimensions: Vec<Dimension>,
    pub statistic: &'static str,
    pub period: u64,
    pub evaluation_periods: u64,
    pub threshold: ThresholdValue,
    pub comparison_operator: &'static str,
    pub alarm_actions: Vec<TopicArn>,
    #[serde(rename = "OKActions", skip_serializing_if = "Option::is_none")]
    pub ok_actions: Option<Vec<TopicArn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treat_missing_data: Option<MissingDataPolicy>,
}

impl AlarmProperties {
    /// Required properties for a backlog alarm on `queue`
    pub fn new(threshold: &Threshold, queue: &str, action: TopicArn) -> Self {
        Self {
            alarm_description: format!(
                "Alarm if queue contains more than {} messages",
                threshold.value
            ),
            namespace: threshold.namespace.clone(),
            metric_name: METRIC_NAME,
            dimensions: vec![Dimension::queue(queue)],
            statistic: STATISTIC,
            period: threshold.period,
            evaluation_periods: threshold.evaluation_periods,
            threshold: threshold.value,
            comparison_operator: COMPARISON_OPERATOR,
            alarm_actions: vec![action],
            ok_actions: None,
            alarm_name: None,
            treat_missing_data: None,
        }
    }

    /// Notify `action` when the alarm returns to OK
    pub fn with_ok_action(mut self, action: TopicArn) -> Self {
        self.ok_actions = Some(vec![action]);
        self
    }

    pub fn with_alarm_name(mut self, name: impl Into<String>) -> Self {
        self.alarm_name = Some(name.into());
        self
    }

    pub fn with_treat_missing_data(mut self, policy: MissingDataPolicy) -> Self {
        self.treat_missing_data = Some(policy);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn queue(queue: &str) -> Self {
        Self {
            name: QUEUE_DIMENSION.to_string(),
            value: queue.to_string(),
        }
    }
}

/// SNS topic ARN assembled at deploy time
///
/// The account ID is not known when compiling, so the ARN is emitted as an
/// `Fn::Join` around a `Ref` to the account pseudo parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicArn {
    pub region: String,
    pub topic: String,
}

impl TopicArn {
    pub fn new(region: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            topic: topic.into(),
        }
    }
}

impl Serialize for TopicArn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        json!({
            "Fn::Join": [
                "",
                [
                    format!("arn:aws:sns:{}:", self.region),
                    { "Ref": ACCOUNT_ID_REF },
                    format!(":{}", self.topic),
                ]
            ]
        })
        .serialize(serializer)
    }
}
