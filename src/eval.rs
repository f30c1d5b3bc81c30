use crate::{
    ErrorCode, EvaluationContext, EvaluationDetails, Reason, ResolutionDetails, SettingValue,
    StructuredValue, User,
};

/// Part of the error ConfigCat reports when the requested key is missing from the config JSON.
const KEY_NOT_FOUND_MARKER: &str = "key was not found in config JSON";

/// Attribute copied to [`User::email`].
const EMAIL_ATTRIBUTE: &str = "Email";
/// Attribute copied to [`User::country`].
const COUNTRY_ATTRIBUTE: &str = "Country";

/// A flag value type with a matching [`SettingValue`] variant.
pub(crate) trait FlagValue: Sized {
    fn into_setting_value(self) -> SettingValue;

    /// Extract the value, or return the setting value back if it holds another type.
    fn from_setting_value(value: SettingValue) -> Result<Self, SettingValue>;
}

impl FlagValue for bool {
    fn into_setting_value(self) -> SettingValue {
        SettingValue::Bool(self)
    }

    fn from_setting_value(value: SettingValue) -> Result<Self, SettingValue> {
        match value {
            SettingValue::Bool(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FlagValue for String {
    fn into_setting_value(self) -> SettingValue {
        SettingValue::String(self)
    }

    fn from_setting_value(value: SettingValue) -> Result<Self, SettingValue> {
        match value {
            SettingValue::String(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FlagValue for i64 {
    fn into_setting_value(self) -> SettingValue {
        SettingValue::Int(self)
    }

    fn from_setting_value(value: SettingValue) -> Result<Self, SettingValue> {
        match value {
            SettingValue::Int(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FlagValue for f64 {
    fn into_setting_value(self) -> SettingValue {
        SettingValue::Float(self)
    }

    fn from_setting_value(value: SettingValue) -> Result<Self, SettingValue> {
        match value {
            SettingValue::Float(v) => Ok(v),
            other => Err(other),
        }
    }
}

/// Convert an evaluation context to a ConfigCat user.
///
/// Returns `None` if there's nothing to target on, in which case ConfigCat serves the rules that
/// don't depend on the user.
pub(crate) fn context_to_user(context: Option<&EvaluationContext>) -> Option<User> {
    let context = context.filter(|context| !context.is_empty())?;

    let string_attribute = |name: &str| {
        context
            .attributes
            .get(name)
            .and_then(|value| value.as_str())
            .map(str::to_owned)
    };

    Some(User {
        identifier: context.targeting_key.clone().unwrap_or_default(),
        email: string_attribute(EMAIL_ATTRIBUTE),
        country: string_attribute(COUNTRY_ATTRIBUTE),
        custom: context.attributes.clone(),
    })
}

/// Map a ConfigCat error description to an error code.
///
/// ConfigCat has no structured error kind, so this depends on the wording of its messages.
pub(crate) fn classify_error(error: &str) -> ErrorCode {
    if error.contains(KEY_NOT_FOUND_MARKER) {
        ErrorCode::FlagNotFound
    } else {
        ErrorCode::General
    }
}

pub(crate) fn produce_reason(details: &EvaluationDetails) -> Reason {
    if details.error.is_some() {
        return Reason::Error;
    }

    if details.matched_targeting_rule.is_some() || details.matched_percentage_option.is_some() {
        return Reason::TargetingMatch;
    }

    Reason::Default
}

/// Turn evaluation details of a scalar flag into a resolution.
pub(crate) fn resolve_scalar<T: FlagValue>(
    details: EvaluationDetails,
    default_value: T,
) -> ResolutionDetails<T> {
    let reason = produce_reason(&details);
    let EvaluationDetails {
        key,
        value,
        variation_id,
        error,
        ..
    } = details;

    let value = match T::from_setting_value(value) {
        Ok(value) => value,
        Err(actual) => {
            log::warn!(target: "configcat",
                       flag_key:display = key,
                       actual_type = actual.type_name();
                       "flag value has an unexpected type");
            return ResolutionDetails::error(default_value, ErrorCode::TypeMismatch, None);
        }
    };

    if let Some(error) = error {
        let code = classify_error(&error);
        log::warn!(target: "configcat",
                   flag_key:display = key,
                   error_code = code.as_str();
                   "error occurred while evaluating a flag: {}", error);
        return ResolutionDetails::error(default_value, code, Some(error));
    }

    ResolutionDetails::new(value, variation_id, reason)
}

/// Turn evaluation details of a flag holding a JSON-encoded string into a resolution.
///
/// Backend errors are not classified here. A failed evaluation serves the empty string, which
/// surfaces as a parse error.
pub(crate) fn resolve_structured(
    details: EvaluationDetails,
    default_value: StructuredValue,
) -> ResolutionDetails<StructuredValue> {
    let reason = produce_reason(&details);
    let EvaluationDetails {
        key,
        value,
        variation_id,
        ..
    } = details;

    let payload = match String::from_setting_value(value) {
        Ok(payload) => payload,
        Err(actual) => {
            log::warn!(target: "configcat",
                       flag_key:display = key,
                       actual_type = actual.type_name();
                       "flag value has an unexpected type");
            return ResolutionDetails::error(default_value, ErrorCode::TypeMismatch, None);
        }
    };

    let parsed = serde_json::from_str::<serde_json::Value>(&payload)
        .map_err(|err| err.to_string())
        .and_then(|json| {
            StructuredValue::try_from(json).map_err(|other| {
                format!(
                    "expected a JSON object or array, found {}",
                    json_kind(&other)
                )
            })
        });

    match parsed {
        Ok(value) => ResolutionDetails::new(value, variation_id, reason),
        Err(message) => {
            log::warn!(target: "configcat",
                       flag_key:display = key;
                       "unable to parse flag value as JSON: {}", message);
            ResolutionDetails::error(default_value, ErrorCode::TypeMismatch, Some(message))
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
