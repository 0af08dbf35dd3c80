//! Alarm configuration types

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Namespace used when a threshold does not name one
pub const DEFAULT_NAMESPACE: &str = "AWS/SQS";
/// Metric period in seconds used when a threshold does not set one
pub const DEFAULT_PERIOD: u64 = 60;
/// Evaluation periods used when a threshold does not set them
pub const DEFAULT_EVALUATION_PERIODS: u64 = 1;

/// Alarm definition for a single queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSpec {
    /// Name of the monitored queue
    pub queue: String,
    /// SNS topic notified on breach
    pub topic: String,
    /// Breach levels, one alarm each
    pub thresholds: Vec<ThresholdEntry>,
    /// Human-readable alarm family name
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// Missing-data treatment, uniform or per threshold
    #[serde(
        default,
        deserialize_with = "lenient::missing_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub treat_missing_data: Option<MissingDataSource>,
    /// Whether recovery also notifies the topic; present values are read
    /// for truthiness, so `0`, `""` and `null` all disable it
    #[serde(
        default,
        deserialize_with = "lenient::truthy",
        skip_serializing_if = "Option::is_none"
    )]
    pub ok_alerts: Option<bool>,
}

impl AlarmSpec {
    /// Create a new alarm spec
    pub fn new(
        queue: impl Into<String>,
        topic: impl Into<String>,
        thresholds: Vec<ThresholdEntry>,
    ) -> Self {
        Self {
            queue: queue.into(),
            topic: topic.into(),
            thresholds,
            name: None,
            treat_missing_data: None,
            ok_alerts: None,
        }
    }

    /// Set the alarm family name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the missing-data treatment
    pub fn with_treat_missing_data(mut self, source: MissingDataSource) -> Self {
        self.treat_missing_data = Some(source);
        self
    }

    /// Enable or disable OK notifications
    pub fn with_ok_alerts(mut self, ok_alerts: bool) -> Self {
        self.ok_alerts = Some(ok_alerts);
        self
    }

    /// OK notifications are on unless explicitly disabled
    pub fn ok_alerts_enabled(&self) -> bool {
        self.ok_alerts.unwrap_or(true)
    }

    /// The family name, if set and non-empty
    pub fn alarm_family(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Numeric breach level
///
/// Integral values render and serialize without a fractional part, so a
/// threshold of `3` produces `MessageAlarm3` and `"Threshold": 3`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct ThresholdValue(f64);

impl ThresholdValue {
    // 2^53, the largest range where every integer is exact in an f64
    const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    /// The value as an integer when it has no fractional part
    pub fn as_integer(&self) -> Option<i64> {
        if self.0.fract() == 0.0 && self.0.abs() <= Self::MAX_EXACT_INT {
            Some(self.0 as i64)
        } else {
            None
        }
    }
}

impl From<f64> for ThresholdValue {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ThresholdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_integer() {
            Some(i) => write!(f, "{}", i),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for ThresholdValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_integer() {
            Some(i) => serializer.serialize_i64(i),
            None => serializer.serialize_f64(self.0),
        }
    }
}

/// Threshold as written in configuration: a bare number or a full record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdEntry {
    Numeric(ThresholdValue),
    Structured(StructuredThreshold),
}

impl ThresholdEntry {
    /// Bare numeric threshold with every other field defaulted
    pub fn numeric(value: f64) -> Self {
        ThresholdEntry::Numeric(ThresholdValue(value))
    }

    /// Resolve to the canonical form, applying defaults
    pub fn normalize(&self) -> Threshold {
        match self {
            ThresholdEntry::Numeric(value) => Threshold::with_defaults(*value),
            ThresholdEntry::Structured(s) => Threshold {
                value: s.value,
                // Empty and zero count as unset
                namespace: s
                    .namespace
                    .clone()
                    .filter(|ns| !ns.is_empty())
                    .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
                period: s.period.filter(|p| *p > 0).unwrap_or(DEFAULT_PERIOD),
                evaluation_periods: s
                    .evaluation_periods
                    .filter(|p| *p > 0)
                    .unwrap_or(DEFAULT_EVALUATION_PERIODS),
            },
        }
    }
}

impl From<f64> for ThresholdEntry {
    fn from(value: f64) -> Self {
        ThresholdEntry::numeric(value)
    }
}

impl From<StructuredThreshold> for ThresholdEntry {
    fn from(threshold: StructuredThreshold) -> Self {
        ThresholdEntry::Structured(threshold)
    }
}

/// Threshold record with per-threshold overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredThreshold {
    pub value: ThresholdValue,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub period: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub evaluation_periods: Option<u64>,
}

impl StructuredThreshold {
    pub fn new(value: f64) -> Self {
        Self {
            value: ThresholdValue(value),
            namespace: None,
            period: None,
            evaluation_periods: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_period(mut self, period: u64) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_evaluation_periods(mut self, evaluation_periods: u64) -> Self {
        self.evaluation_periods = Some(evaluation_periods);
        self
    }
}

/// Canonical threshold with all defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub value: ThresholdValue,
    pub namespace: String,
    pub period: u64,
    pub evaluation_periods: u64,
}

impl Threshold {
    pub fn with_defaults(value: ThresholdValue) -> Self {
        Self {
            value,
            namespace: DEFAULT_NAMESPACE.to_string(),
            period: DEFAULT_PERIOD,
            evaluation_periods: DEFAULT_EVALUATION_PERIODS,
        }
    }
}

/// How an alarm treats periods without data points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingDataPolicy {
    Missing,
    Ignore,
    Breaching,
    NotBreaching,
}

impl MissingDataPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingDataPolicy::Missing => "missing",
            MissingDataPolicy::Ignore => "ignore",
            MissingDataPolicy::Breaching => "breaching",
            MissingDataPolicy::NotBreaching => "notBreaching",
        }
    }

    /// Parse a policy name; unrecognized names yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "missing" => Some(MissingDataPolicy::Missing),
            "ignore" => Some(MissingDataPolicy::Ignore),
            "breaching" => Some(MissingDataPolicy::Breaching),
            "notBreaching" => Some(MissingDataPolicy::NotBreaching),
            _ => None,
        }
    }

    pub fn all() -> &'static [MissingDataPolicy] {
        &[
            MissingDataPolicy::Missing,
            MissingDataPolicy::Ignore,
            MissingDataPolicy::Breaching,
            MissingDataPolicy::NotBreaching,
        ]
    }
}

impl fmt::Display for MissingDataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where each threshold's missing-data treatment comes from
///
/// Entries are kept as written and only validated on lookup, so an
/// unrecognized name drops the treatment for that threshold alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MissingDataSource {
    /// One policy for every threshold
    Uniform(String),
    /// Policies aligned by index with the thresholds
    PerIndex(Vec<Option<String>>),
}

impl MissingDataSource {
    pub fn uniform(policy: impl Into<String>) -> Self {
        MissingDataSource::Uniform(policy.into())
    }

    pub fn per_index<I, S>(policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MissingDataSource::PerIndex(policies.into_iter().map(|p| Some(p.into())).collect())
    }

    /// Validated policy for the threshold at `index`
    pub fn policy_at(&self, index: usize) -> Option<MissingDataPolicy> {
        let raw = match self {
            MissingDataSource::Uniform(policy) => Some(policy.as_str()),
            MissingDataSource::PerIndex(policies) => {
                policies.get(index).and_then(|p| p.as_deref())
            }
        };
        raw.and_then(MissingDataPolicy::parse)
    }

    /// Interpret arbitrary JSON; anything that is not a non-empty string or
    /// an array counts as unset, and non-string array entries as holes.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) if !s.is_empty() => {
                Some(MissingDataSource::Uniform(s.clone()))
            }
            serde_json::Value::Array(items) => Some(MissingDataSource::PerIndex(
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )),
            _ => None,
        }
    }
}

/// Readers for optional fields: a value of the wrong shape reads as unset
/// instead of failing the whole document
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::MissingDataSource;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    /// Non-negative whole numbers, also as `300.0` or `"300"`
    pub fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f as u64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let enabled = match Value::deserialize(deserializer)? {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        };
        Ok(Some(enabled))
    }

    pub fn missing_data<'de, D>(deserializer: D) -> Result<Option<MissingDataSource>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(MissingDataSource::from_json(&Value::deserialize(deserializer)?))
    }
}
