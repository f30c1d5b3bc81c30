use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a flag resolved to the returned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// The flag's default rule was served. No targeting rule or percentage option matched.
    Default,
    /// A targeting rule or a percentage option matched the subject.
    TargetingMatch,
    /// The flag could not be resolved and the caller's default value was returned.
    Error,
}

impl Reason {
    /// Canonical name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Default => "DEFAULT",
            Reason::TargetingMatch => "TARGETING_MATCH",
            Reason::Error => "ERROR",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a failed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The flag key is missing from the config JSON.
    FlagNotFound,
    /// The flag value doesn't have the requested type.
    TypeMismatch,
    /// Any other error reported by the backend.
    General,
}

impl ErrorCode {
    /// Canonical name of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FlagNotFound => "FLAG_NOT_FOUND",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::General => "GENERAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error part of a [`ResolutionDetails`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable description, if any.
    pub message: Option<String>,
}

/// Result of resolving a single flag.
///
/// `value` always holds a value of the requested type: on error it is the caller's default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDetails<T> {
    /// Resolved value.
    pub value: T,
    /// Variation id of the resolved value.
    pub variant: Option<String>,
    /// Why the flag resolved to `value`.
    pub reason: Reason,
    /// Set if and only if the resolution failed with a classified error.
    pub error: Option<ResolutionError>,
}

impl<T> ResolutionDetails<T> {
    /// A successful resolution.
    pub fn new(value: T, variant: Option<String>, reason: Reason) -> Self {
        Self {
            value,
            variant,
            reason,
            error: None,
        }
    }

    /// A failed resolution carrying the caller's `default_value`.
    pub fn error(default_value: T, code: ErrorCode, message: Option<String>) -> Self {
        Self {
            value: default_value,
            variant: None,
            reason: Reason::Error,
            error: Some(ResolutionError { code, message }),
        }
    }

    /// Error code of a failed resolution.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }

    /// Error message of a failed resolution.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.message.as_deref())
    }

    /// Map `value` using the `f` function, keeping the remaining fields.
    pub fn map<T2, F: FnOnce(T) -> T2>(self, f: F) -> ResolutionDetails<T2> {
        ResolutionDetails {
            value: f(self.value),
            variant: self.variant,
            reason: self.reason,
            error: self.error,
        }
    }
}

/// Value of a structured flag: a JSON object or a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredValue {
    /// A JSON object.
    Mapping(serde_json::Map<String, serde_json::Value>),
    /// A JSON array.
    Sequence(Vec<serde_json::Value>),
}

impl StructuredValue {
    /// An empty JSON object.
    pub fn empty_mapping() -> Self {
        Self::Mapping(serde_json::Map::new())
    }

    /// Get a field of a mapping.
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        match self {
            Self::Mapping(map) => map.get(field),
            Self::Sequence(_) => None,
        }
    }
}

impl TryFrom<serde_json::Value> for StructuredValue {
    type Error = serde_json::Value;

    /// Returns the original value back if it's neither an object nor an array.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Self::Mapping(map)),
            serde_json::Value::Array(seq) => Ok(Self::Sequence(seq)),
            other => Err(other),
        }
    }
}

impl From<StructuredValue> for serde_json::Value {
    fn from(value: StructuredValue) -> Self {
        match value {
            StructuredValue::Mapping(map) => serde_json::Value::Object(map),
            StructuredValue::Sequence(seq) => serde_json::Value::Array(seq),
        }
    }
}
