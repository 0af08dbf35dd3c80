//! Alarm spec to CloudFormation resource compiler
//!
//! Compilation is pure: no I/O, no shared state, and identical input always
//! yields identical output. Invalid optional settings are dropped from the
//! output rather than reported.

use rayon::prelude::*;

use super::config::{AlarmSpec, MissingDataPolicy, MissingDataSource, ThresholdValue};
use super::resource::{AlarmProperties, AlarmResource, TopicArn};

/// Suffix between the stripped queue name and the threshold value
pub const LOGICAL_ID_SUFFIX: &str = "MessageAlarm";

/// Logical ID for the alarm on `queue` at `value`
///
/// Template logical IDs must be alphanumeric, so everything outside
/// `[0-9A-Za-z]` is removed from the queue name. Two thresholds that end up
/// with the same ID are not disambiguated; the later one wins on merge.
pub fn logical_id(queue: &str, value: ThresholdValue) -> String {
    let stripped: String = queue.chars().filter(char::is_ascii_alphanumeric).collect();
    format!("{}{}{}", stripped, LOGICAL_ID_SUFFIX, value)
}

/// Human alarm name: `<name>-<queue>-<value>`
pub fn alarm_name(family: &str, queue: &str, value: ThresholdValue) -> String {
    format!("{}-{}-{}", family, queue, value)
}

/// Missing-data treatment for the threshold at `index`, if any
pub fn resolve_missing_data(
    source: Option<&MissingDataSource>,
    index: usize,
) -> Option<MissingDataPolicy> {
    source.and_then(|s| s.policy_at(index))
}

/// Compile one alarm spec into one resource per threshold, in order
pub fn compile_alarm(spec: &AlarmSpec, region: &str) -> Vec<AlarmResource> {
    let action = TopicArn::new(region, spec.topic.as_str());

    spec.thresholds
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let threshold = entry.normalize();
            let mut properties = AlarmProperties::new(&threshold, &spec.queue, action.clone());

            if spec.ok_alerts_enabled() {
                properties = properties.with_ok_action(action.clone());
            }

            if let Some(family) = spec.alarm_family() {
                properties =
                    properties.with_alarm_name(alarm_name(family, &spec.queue, threshold.value));
            }

            if let Some(policy) = resolve_missing_data(spec.treat_missing_data.as_ref(), i) {
                properties = properties.with_treat_missing_data(policy);
            }

            AlarmResource::new(logical_id(&spec.queue, threshold.value), properties)
        })
        .collect()
}

/// Compile every spec, flattened in spec order then threshold order
///
/// Specs are independent, so they are compiled in parallel; the collected
/// output keeps input order.
pub fn compile(specs: &[AlarmSpec], region: &str) -> Vec<AlarmResource> {
    specs
        .par_iter()
        .flat_map_iter(|spec| compile_alarm(spec, region))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarms::config::{StructuredThreshold, ThresholdEntry};
    use crate::alarms::resource::RESOURCE_TYPE;
    use serde_json::json;

    fn base_spec() -> AlarmSpec {
        AlarmSpec::new(
            "test-queue",
            "test-topic",
            vec![1.0.into(), 2.0.into(), 3.0.into()],
        )
    }

    fn ids(resources: &[AlarmResource]) -> Vec<&str> {
        resources.iter().map(|r| r.logical_id.as_str()).collect()
    }

    #[test]
    fn test_logical_id_strips_non_alphanumeric() {
        assert_eq!(
            logical_id("test-queue", ThresholdValue::new(3.0)),
            "testqueueMessageAlarm3"
        );
        assert_eq!(
            logical_id("my_queue.fifo", ThresholdValue::new(10.0)),
            "myqueuefifoMessageAlarm10"
        );
        assert_eq!(
            logical_id("Q-ü-1 ", ThresholdValue::new(1.0)),
            "Q1MessageAlarm1"
        );
        assert_eq!(logical_id("---", ThresholdValue::new(1.0)), "MessageAlarm1");
    }

    #[test]
    fn test_compile_basic_thresholds() {
        let resources = compile_alarm(&base_spec(), "test-region");

        assert_eq!(
            ids(&resources),
            vec![
                "testqueueMessageAlarm1",
                "testqueueMessageAlarm2",
                "testqueueMessageAlarm3"
            ]
        );

        for (resource, value) in resources.iter().zip([1.0, 2.0, 3.0]) {
            let props = resource.properties();
            assert_eq!(resource.definition.resource_type, RESOURCE_TYPE);
            assert_eq!(props.threshold.get(), value);
            assert_eq!(
                props.alarm_description,
                format!("Alarm if queue contains more than {} messages", value as i64)
            );
            assert_eq!(props.dimensions[0].value, "test-queue");
        }
    }

    #[test]
    fn test_alarm_actions_reference_topic() {
        let resources = compile_alarm(&base_spec(), "test-region");
        let fragment = resources[0].to_fragment().unwrap();

        assert_eq!(
            fragment["testqueueMessageAlarm1"]["Properties"]["AlarmActions"],
            json!([{
                "Fn::Join": ["", ["arn:aws:sns:test-region:", { "Ref": "AWS::AccountId" }, ":test-topic"]]
            }])
        );
    }

    #[test]
    fn test_ok_actions_default_on() {
        for spec in [base_spec(), base_spec().with_ok_alerts(true)] {
            let resources = compile_alarm(&spec, "r");
            assert!(resources.iter().all(|r| r.properties().ok_actions.is_some()));
        }
    }

    #[test]
    fn test_ok_actions_disabled() {
        let resources = compile_alarm(&base_spec().with_ok_alerts(false), "r");
        assert!(resources.iter().all(|r| r.properties().ok_actions.is_none()));

        let fragment = resources[2].to_fragment().unwrap();
        let props = fragment["testqueueMessageAlarm3"]["Properties"]
            .as_object()
            .unwrap();
        assert!(!props.contains_key("OKActions"));
    }

    #[test]
    fn test_alarm_name() {
        let named = compile_alarm(&base_spec().with_name("alarm"), "r");
        assert_eq!(
            named[2].properties().alarm_name.as_deref(),
            Some("alarm-test-queue-3")
        );

        let unnamed = compile_alarm(&base_spec(), "r");
        assert!(unnamed.iter().all(|r| r.properties().alarm_name.is_none()));
    }

    #[test]
    fn test_treat_missing_data_uniform() {
        let spec = base_spec().with_treat_missing_data(MissingDataSource::uniform("notBreaching"));
        let resources = compile_alarm(&spec, "r");
        assert!(resources
            .iter()
            .all(|r| r.properties().treat_missing_data == Some(MissingDataPolicy::NotBreaching)));
    }

    #[test]
    fn test_treat_missing_data_invalid_uniform() {
        let spec = base_spec().with_treat_missing_data(MissingDataSource::uniform("invalid"));
        let resources = compile_alarm(&spec, "r");
        assert!(resources
            .iter()
            .all(|r| r.properties().treat_missing_data.is_none()));
    }

    #[test]
    fn test_treat_missing_data_per_index() {
        let spec = base_spec().with_treat_missing_data(MissingDataSource::per_index([
            "notBreaching",
            "breaching",
            "ignore",
        ]));
        let policies: Vec<_> = compile_alarm(&spec, "r")
            .iter()
            .map(|r| r.properties().treat_missing_data)
            .collect();

        assert_eq!(
            policies,
            vec![
                Some(MissingDataPolicy::NotBreaching),
                Some(MissingDataPolicy::Breaching),
                Some(MissingDataPolicy::Ignore)
            ]
        );
    }

    #[test]
    fn test_treat_missing_data_shorter_than_thresholds() {
        let spec = base_spec()
            .with_treat_missing_data(MissingDataSource::per_index(["notBreaching", "breaching"]));
        let policies: Vec<_> = compile_alarm(&spec, "r")
            .iter()
            .map(|r| r.properties().treat_missing_data)
            .collect();

        assert_eq!(
            policies,
            vec![
                Some(MissingDataPolicy::NotBreaching),
                Some(MissingDataPolicy::Breaching),
                None
            ]
        );
    }

    #[test]
    fn test_treat_missing_data_skips_invalid_entries() {
        let spec = base_spec().with_treat_missing_data(MissingDataSource::per_index([
            "notBreaching",
            "invalid",
            "missing",
        ]));
        let policies: Vec<_> = compile_alarm(&spec, "r")
            .iter()
            .map(|r| r.properties().treat_missing_data)
            .collect();

        assert_eq!(
            policies,
            vec![
                Some(MissingDataPolicy::NotBreaching),
                None,
                Some(MissingDataPolicy::Missing)
            ]
        );
    }

    #[test]
    fn test_structured_thresholds() {
        let spec = AlarmSpec::new(
            "test-queue",
            "test-topic",
            vec![
                StructuredThreshold::new(1.0).with_period(5).with_evaluation_periods(1).into(),
                StructuredThreshold::new(3.0)
                    .with_period(5)
                    .with_evaluation_periods(1)
                    .with_namespace("test")
                    .into(),
            ],
        );
        let resources = compile_alarm(&spec, "r");

        let first = resources[0].properties();
        assert_eq!(first.namespace, "AWS/SQS");
        assert_eq!(first.period, 5);

        let props = resources[1].properties();
        assert_eq!(resources[1].logical_id, "testqueueMessageAlarm3");
        assert_eq!(props.period, 5);
        assert_eq!(props.evaluation_periods, 1);
        assert_eq!(props.namespace, "test");
        assert_eq!(props.threshold.get(), 3.0);
    }

    #[test]
    fn test_fractional_threshold() {
        let spec = AlarmSpec::new("q", "t", vec![ThresholdEntry::numeric(1.5)]).with_name("n");
        let resources = compile_alarm(&spec, "r");

        assert_eq!(resources[0].logical_id, "qMessageAlarm1.5");
        assert_eq!(resources[0].properties().alarm_name.as_deref(), Some("n-q-1.5"));
    }

    #[test]
    fn test_empty_inputs() {
        let spec = AlarmSpec::new("q", "t", vec![]);
        assert!(compile_alarm(&spec, "r").is_empty());
        assert!(compile(&[], "r").is_empty());
    }

    #[test]
    fn test_compile_preserves_spec_order() {
        let second = AlarmSpec::new("test-queue-2", "test-topic", vec![1.0.into(), 2.0.into()]);
        let resources = compile(&[base_spec(), second], "r");

        assert_eq!(
            ids(&resources),
            vec![
                "testqueueMessageAlarm1",
                "testqueueMessageAlarm2",
                "testqueueMessageAlarm3",
                "testqueue2MessageAlarm1",
                "testqueue2MessageAlarm2"
            ]
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let specs = vec![
            base_spec().with_name("a"),
            base_spec().with_treat_missing_data(MissingDataSource::uniform("ignore")),
        ];
        assert_eq!(compile(&specs, "r"), compile(&specs, "r"));
    }

    #[test]
    fn test_colliding_ids_are_kept() {
        let spec = AlarmSpec::new("a-b", "t", vec![1.0.into()]);
        let other = AlarmSpec::new("ab", "t", vec![1.0.into()]);
        let resources = compile(&[spec, other], "r");

        assert_eq!(ids(&resources), vec!["abMessageAlarm1", "abMessageAlarm1"]);
    }
}
