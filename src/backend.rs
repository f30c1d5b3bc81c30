//! Contract of the ConfigCat client consumed by the provider.
//!
//! Rule evaluation, configuration polling and caching happen behind [`FlagClient`]. The provider
//! only sees the [`EvaluationDetails`] returned for each evaluation.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::Attributes;

/// A setting value as stored in the ConfigCat config JSON.
///
/// Structured values are stored as JSON-encoded strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean setting.
    Bool(bool),
    /// Whole number setting.
    Int(i64),
    /// Decimal number setting.
    Float(f64),
    /// Text setting.
    String(String),
}

impl SettingValue {
    /// Name of the value type as reported in logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Int(_) => "int",
            SettingValue::Float(_) => "float",
            SettingValue::String(_) => "string",
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Float(v) => write!(f, "{v}"),
            SettingValue::String(v) => f.write_str(v),
        }
    }
}

/// The user object ConfigCat evaluates targeting rules against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier of the user.
    pub identifier: String,
    /// Email address, used by email-based targeting rules.
    pub email: Option<String>,
    /// Country, used by country-based targeting rules.
    pub country: Option<String>,
    /// Custom attributes.
    pub custom: Attributes,
}

/// Targeting rule that matched during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingRule {
    /// Position of the rule within the setting.
    pub index: usize,
}

/// Percentage option that matched during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageOption {
    /// Position of the option within its rule or setting.
    pub index: usize,
    /// Share of users served by this option, 0 to 100.
    pub percentage: u8,
}

/// Outcome of a single flag evaluation returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDetails {
    /// Key of the evaluated setting.
    pub key: String,
    /// Evaluated value. Holds the default passed to the backend if evaluation failed.
    pub value: SettingValue,
    /// Variation id of the evaluated value.
    pub variation_id: Option<String>,
    /// `true` if `value` is the default passed to the backend.
    pub is_default_value: bool,
    /// Description of the evaluation error, if any.
    pub error: Option<String>,
    /// User the setting was evaluated for.
    pub user: Option<User>,
    /// When the configuration used for the evaluation was fetched.
    pub fetch_time: Option<DateTime<Utc>>,
    /// Targeting rule that matched, if any.
    pub matched_targeting_rule: Option<Arc<TargetingRule>>,
    /// Percentage option that matched, if any.
    pub matched_percentage_option: Option<Arc<PercentageOption>>,
}

impl EvaluationDetails {
    /// Details of a successful evaluation that served the setting's default rule.
    pub fn new(key: impl Into<String>, value: SettingValue, variation_id: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
            variation_id,
            is_default_value: false,
            error: None,
            user: None,
            fetch_time: None,
            matched_targeting_rule: None,
            matched_percentage_option: None,
        }
    }

    /// Details of a failed evaluation, carrying the default value passed to the backend.
    pub fn from_error(
        key: impl Into<String>,
        default_value: SettingValue,
        error: impl Into<String>,
    ) -> Self {
        Self {
            is_default_value: true,
            error: Some(error.into()),
            ..Self::new(key, default_value, None)
        }
    }
}

/// A ConfigCat client.
///
/// Implementations must be safe to call concurrently from multiple threads. Polling, caching and
/// retries are the implementation's responsibility.
pub trait FlagClient: Send + Sync {
    /// Evaluate `key` for `user`, falling back to `default_value` on error.
    ///
    /// Failures are reported through [`EvaluationDetails::error`], never by panicking.
    fn get_value_details(
        &self,
        key: &str,
        default_value: SettingValue,
        user: Option<&User>,
    ) -> EvaluationDetails;

    /// Release resources held by the client (background pollers, connections).
    ///
    /// Closing an already closed client must be a no-op.
    fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::{EvaluationDetails, SettingValue};

    #[test]
    fn setting_value_keeps_json_types_apart() {
        let values: Vec<SettingValue> = serde_json::from_str(r#"[true, 5, 1.2, "test"]"#).unwrap();

        assert_eq!(
            values,
            vec![
                SettingValue::Bool(true),
                SettingValue::Int(5),
                SettingValue::Float(1.2),
                SettingValue::String("test".to_owned()),
            ]
        );
    }

    #[test]
    fn error_details_carry_default() {
        let details = EvaluationDetails::from_error("flag", false.into(), "boom");

        assert_eq!(details.value, SettingValue::Bool(false));
        assert!(details.is_default_value);
        assert_eq!(details.error.as_deref(), Some("boom"));
        assert_eq!(details.variation_id, None);
    }
}
