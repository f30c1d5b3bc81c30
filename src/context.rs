use std::collections::HashMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

/// Attributes of the subject being evaluated, keyed by attribute name.
///
/// # Examples
/// ```
/// # use configcat_openfeature_provider::{Attributes, ContextValue};
/// let attributes = [
///     ("Email".to_owned(), "john@example.com".into()),
///     ("age".to_owned(), 30.into()),
///     ("is_premium_member".to_owned(), true.into()),
/// ].into_iter().collect::<Attributes>();
/// ```
pub type Attributes = HashMap<String, ContextValue>;

/// Value of an evaluation context attribute.
#[derive(Debug, Serialize, Deserialize, PartialEq, From, Clone)]
#[serde(untagged)]
pub enum ContextValue {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
    /// A list of values.
    List(Vec<ContextValue>),
    /// A nested structure.
    Struct(HashMap<String, ContextValue>),
}

impl ContextValue {
    /// Return the string slice if the value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

/// Data about the subject a flag is evaluated for.
///
/// Evaluation contexts are created by the caller for each evaluation and are never stored by the
/// provider.
///
/// ```
/// # use configcat_openfeature_provider::EvaluationContext;
/// let context = EvaluationContext::default()
///     .with_targeting_key("user-1")
///     .with_attribute("Country", "Hungary");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    /// Unique identifier of the subject.
    #[serde(default)]
    pub targeting_key: Option<String>,
    /// Custom attributes of the subject.
    #[serde(default)]
    pub attributes: Attributes,
}

impl EvaluationContext {
    /// Set the targeting key.
    pub fn with_targeting_key(mut self, targeting_key: impl Into<String>) -> Self {
        self.targeting_key = Some(targeting_key.into());
        self
    }

    /// Add an attribute, replacing any previous value with the same name.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns `true` if the context carries neither a targeting key nor attributes.
    ///
    /// An empty targeting key counts as absent.
    pub fn is_empty(&self) -> bool {
        self.targeting_key.as_deref().map_or(true, str::is_empty) && self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextValue, EvaluationContext};

    #[test]
    fn empty_targeting_key_counts_as_absent() {
        assert!(EvaluationContext::default().is_empty());
        assert!(EvaluationContext::default().with_targeting_key("").is_empty());
        assert!(!EvaluationContext::default()
            .with_targeting_key("")
            .with_attribute("plan", "free")
            .is_empty());
    }

    #[test]
    fn parses_nested_attributes() {
        let context: EvaluationContext = serde_json::from_str(
            r#"
              {
                "targetingKey": "user-1",
                "attributes": {
                  "age": 42,
                  "ratio": 0.5,
                  "beta": true,
                  "tags": ["a", "b"],
                  "address": { "city": "Budapest" }
                }
              }
            "#,
        )
        .unwrap();

        assert_eq!(context.targeting_key.as_deref(), Some("user-1"));
        assert_eq!(context.attributes["age"], ContextValue::Int(42));
        assert_eq!(context.attributes["ratio"], ContextValue::Float(0.5));
        assert_eq!(context.attributes["beta"], ContextValue::Bool(true));
        assert_eq!(
            context.attributes["tags"],
            ContextValue::List(vec!["a".into(), "b".into()])
        );
        assert!(matches!(context.attributes["address"], ContextValue::Struct(_)));
    }
}
