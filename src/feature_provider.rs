use serde::{Deserialize, Serialize};

use crate::{EvaluationContext, ResolutionDetails, StructuredValue};

/// Descriptive information about a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Name of the provider.
    pub name: String,
}

impl ProviderMetadata {
    /// Create metadata for a provider called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A source of feature flag values that can be plugged into a feature flagging API.
///
/// Resolve functions never fail: errors are reported in the `error` field of
/// [`ResolutionDetails`] and the caller's default value is returned instead.
pub trait FeatureProvider: Send + Sync {
    /// Information about the provider.
    fn metadata(&self) -> &ProviderMetadata;

    /// Release resources held by the provider.
    ///
    /// Resolving flags after shutdown is a misuse with provider-defined results.
    fn shutdown(&self) {}

    /// Resolve a boolean flag.
    fn resolve_bool_value(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<bool>;

    /// Resolve a string flag.
    fn resolve_string_value(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<String>;

    /// Resolve an integer flag.
    fn resolve_int_value(
        &self,
        flag_key: &str,
        default_value: i64,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<i64>;

    /// Resolve a floating-point flag.
    fn resolve_float_value(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<f64>;

    /// Resolve a structured (JSON object or array) flag.
    fn resolve_struct_value(
        &self,
        flag_key: &str,
        default_value: StructuredValue,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<StructuredValue>;
}
