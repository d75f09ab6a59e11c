use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Envelope returned by `GET <base>/rest/gui_config/job.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfigResponse {
    #[serde(default)]
    pub config: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Job {
    pub job_name: String,
    #[serde(default)]
    pub sub_tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    pub use_module: String,
    #[serde(default)]
    pub gui_config: Vec<FieldSpec>,
}

/// One configurable input in a task's form. `original_default` is only
/// populated once a cached override has been applied; it keeps the
/// server-supplied value so "Restore Defaults" can undo the override
/// without re-fetching the schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldSpec {
    Text {
        param: String,
        #[serde(default)]
        label: String,
        #[serde(default)]
        default: String,
        #[serde(default)]
        original_default: Option<String>,
    },
    Checkbox {
        param: String,
        #[serde(default)]
        label: String,
        #[serde(default, deserialize_with = "truthy_bool")]
        default: bool,
        #[serde(default)]
        original_default: Option<bool>,
    },
}

impl FieldSpec {
    pub fn param(&self) -> &str {
        match self {
            Self::Text { param, .. } | Self::Checkbox { param, .. } => param,
        }
    }

}

/// Outcome of `POST <base>/rest/job/trigger/<job_name>.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub msg: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// The trigger endpoint reuses `state` as a severity. Only an explicit
    /// success spelling may render as success; everything unknown is a
    /// failure.
    pub fn from_state(state: &str) -> Self {
        match state {
            "success" | "succeed" => Self::Success,
            "warning" => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// The backend writes checkbox defaults as whatever its templates had on
/// hand: real booleans, `0`/`1` numbers, or `"0"`/`"1"` strings.
pub(crate) fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(text) => !matches!(text.as_str(), "" | "0"),
        _ => true,
    }
}

fn truthy_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_truthy(&value))
}

#[cfg(test)]
mod tests {
    use super::{FieldSpec, Job, NoticeLevel, TriggerResponse, value_truthy};
    use serde_json::json;

    #[test]
    fn job_schema_deserializes_tagged_fields() {
        let raw = json!({
            "job_name": "sync",
            "sub_tasks": [{
                "use_module": "Sync::Image",
                "gui_config": [
                    { "param": "domain_name", "label": "Domain", "type": "text", "default": "base" },
                    { "param": "enabled", "label": "Enabled", "type": "checkbox", "default": 1 }
                ]
            }]
        });

        let job: Job = serde_json::from_value(raw).expect("schema should parse");
        assert_eq!(job.job_name, "sync");
        assert_eq!(job.sub_tasks.len(), 1);

        let fields = &job.sub_tasks[0].gui_config;
        assert_eq!(
            fields[0],
            FieldSpec::Text {
                param: "domain_name".to_string(),
                label: "Domain".to_string(),
                default: "base".to_string(),
                original_default: None,
            }
        );
        assert_eq!(
            fields[1],
            FieldSpec::Checkbox {
                param: "enabled".to_string(),
                label: "Enabled".to_string(),
                default: true,
                original_default: None,
            }
        );
    }

    #[test]
    fn checkbox_defaults_accept_perl_truthiness() {
        for (raw, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("1"), true),
            (json!("0"), false),
            (json!(""), false),
            (json!("on"), true),
            (json!(null), false),
        ] {
            assert_eq!(value_truthy(&raw), expected, "input {raw}");
        }
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        let raw = json!({ "param": "x", "label": "X", "type": "dropdown", "default": "" });
        assert!(serde_json::from_value::<FieldSpec>(raw).is_err());
    }

    #[test]
    fn notice_level_never_promotes_failure_states() {
        assert_eq!(NoticeLevel::from_state("success"), NoticeLevel::Success);
        assert_eq!(NoticeLevel::from_state("succeed"), NoticeLevel::Success);
        assert_eq!(NoticeLevel::from_state("warning"), NoticeLevel::Warning);
        assert_eq!(NoticeLevel::from_state("error"), NoticeLevel::Error);
        assert_eq!(NoticeLevel::from_state("danger"), NoticeLevel::Error);
        assert_eq!(NoticeLevel::from_state(""), NoticeLevel::Error);
    }

    #[test]
    fn trigger_response_tolerates_missing_fields() {
        let outcome: TriggerResponse = serde_json::from_str("{}").expect("empty body parses");
        assert_eq!(outcome.state, "");
        assert_eq!(outcome.msg, "");
    }
}
