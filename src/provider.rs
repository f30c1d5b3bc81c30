use std::sync::Arc;

use crate::{
    eval::{context_to_user, resolve_scalar, resolve_structured, FlagValue},
    ClientOptions, ClientRegistry, Connect, EvaluationContext, EvaluationDetails, FeatureProvider,
    FlagClient, ProviderMetadata, ResolutionDetails, Result, SettingValue, StructuredValue,
};

/// Name reported by [`ConfigCatProvider::metadata`].
pub const PROVIDER_NAME: &str = "ConfigCatProvider";

/// A [`FeatureProvider`] resolving flags with a ConfigCat client.
///
/// The provider holds nothing but a handle to the client, so it can be shared between threads
/// and resolve calls can run concurrently.
///
/// # Examples
/// ```
/// # use std::sync::Arc;
/// # use configcat_openfeature_provider::*;
/// # struct MyClient;
/// # impl FlagClient for MyClient {
/// #     fn get_value_details(&self, key: &str, default_value: SettingValue, _user: Option<&User>) -> EvaluationDetails {
/// #         EvaluationDetails::new(key, true.into(), Some("v-enabled".to_owned()))
/// #     }
/// #     fn close(&self) {}
/// # }
/// let provider = ConfigCatProvider::from_client(Arc::new(MyClient));
///
/// let details = provider.resolve_bool_value("enabledFeature", false, None);
/// assert!(details.value);
/// assert_eq!(details.reason, Reason::Default);
/// ```
pub struct ConfigCatProvider {
    client: Arc<dyn FlagClient>,
    /// SDK key the client is registered under in [`ClientRegistry::global`].
    sdk_key: Option<String>,
    metadata: ProviderMetadata,
}

impl ConfigCatProvider {
    /// Create a provider using the shared client for `sdk_key`.
    ///
    /// If there is no client for `sdk_key` yet, `connector` creates one with `options`. Otherwise
    /// the existing client is reused and `options` are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK key or options are invalid, or if `connector` fails.
    pub fn new(
        sdk_key: &str,
        options: Option<ClientOptions>,
        connector: impl Connect,
    ) -> Result<Self> {
        let client = ClientRegistry::global().acquire(sdk_key, options.as_ref(), &connector)?;
        Ok(Self {
            client,
            sdk_key: Some(sdk_key.to_owned()),
            metadata: ProviderMetadata::new(PROVIDER_NAME),
        })
    }

    /// Create a provider using `client` directly, bypassing the shared client registry.
    pub fn from_client(client: Arc<dyn FlagClient>) -> Self {
        Self {
            client,
            sdk_key: None,
            metadata: ProviderMetadata::new(PROVIDER_NAME),
        }
    }

    /// The underlying ConfigCat client.
    pub fn client(&self) -> &Arc<dyn FlagClient> {
        &self.client
    }

    fn resolve<T: FlagValue + Clone>(
        &self,
        flag_key: &str,
        default_value: T,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<T> {
        let user = context_to_user(context);
        let details = self.client.get_value_details(
            flag_key,
            default_value.clone().into_setting_value(),
            user.as_ref(),
        );
        log_evaluation(flag_key, &details);
        resolve_scalar(details, default_value)
    }
}

fn log_evaluation(flag_key: &str, details: &EvaluationDetails) {
    log::trace!(target: "configcat",
                flag_key,
                value:display = details.value,
                variation_id:debug = details.variation_id,
                fetch_time:debug = details.fetch_time;
                "evaluated a flag");
}

impl FeatureProvider for ConfigCatProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn shutdown(&self) {
        self.client.close();
        if let Some(sdk_key) = &self.sdk_key {
            ClientRegistry::global().release(sdk_key, &self.client);
        }
    }

    fn resolve_bool_value(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<bool> {
        self.resolve(flag_key, default_value, context)
    }

    fn resolve_string_value(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<String> {
        self.resolve(flag_key, default_value, context)
    }

    fn resolve_int_value(
        &self,
        flag_key: &str,
        default_value: i64,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<i64> {
        self.resolve(flag_key, default_value, context)
    }

    fn resolve_float_value(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<f64> {
        self.resolve(flag_key, default_value, context)
    }

    fn resolve_struct_value(
        &self,
        flag_key: &str,
        default_value: StructuredValue,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<StructuredValue> {
        let user = context_to_user(context);
        // Structured values are stored as JSON strings. Asking for a string keeps the client from
        // converting the value.
        let details = self.client.get_value_details(
            flag_key,
            SettingValue::String(String::new()),
            user.as_ref(),
        );
        log_evaluation(flag_key, &details);
        resolve_structured(details, default_value)
    }
}
