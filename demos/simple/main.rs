use std::{collections::HashMap, sync::Arc};

use configcat_openfeature_provider::{
    ClientOptions, ConfigCatProvider, EvaluationContext, EvaluationDetails, FeatureProvider,
    FlagClient, Result, SettingValue, TargetingRule, User,
};

/// A toy client serving fixed values. Users with a `@example.com` email get `true` for every
/// boolean flag.
struct StaticClient {
    values: HashMap<&'static str, SettingValue>,
}

impl FlagClient for StaticClient {
    fn get_value_details(
        &self,
        key: &str,
        default_value: SettingValue,
        user: Option<&User>,
    ) -> EvaluationDetails {
        let Some(value) = self.values.get(key) else {
            return EvaluationDetails::from_error(
                key,
                default_value,
                format!("Failed to evaluate setting '{key}' (the key was not found in config JSON)."),
            );
        };

        let internal = user
            .and_then(|user| user.email.as_deref())
            .is_some_and(|email| email.ends_with("@example.com"));
        if internal && matches!(value, SettingValue::Bool(_)) {
            let mut details =
                EvaluationDetails::new(key, SettingValue::Bool(true), Some("v-internal".to_owned()));
            details.matched_targeting_rule = Some(Arc::new(TargetingRule { index: 0 }));
            return details;
        }

        EvaluationDetails::new(key, value.clone(), Some(format!("v-{key}")))
    }

    fn close(&self) {}
}

fn connect(_sdk_key: &str, _options: &ClientOptions) -> Result<Arc<dyn FlagClient>> {
    Ok(Arc::new(StaticClient {
        values: HashMap::from([
            ("isAwesomeFeatureEnabled", SettingValue::Bool(false)),
            ("maxItems", SettingValue::Int(25)),
            (
                "theme",
                SettingValue::String(r#"{"color": "dark", "density": "compact"}"#.to_owned()),
            ),
        ]),
    }))
}

pub fn main() -> Result<()> {
    env_logger::init();

    let provider = ConfigCatProvider::new(
        "configcat-sdk-1/PKDVCLf-Hq-h-kCzMp-L7Q/HhOWfwVtZ0mb30i9wi17GQ",
        None,
        connect,
    )?;

    let context = EvaluationContext::default()
        .with_targeting_key("user-1")
        .with_attribute("Email", "jane@example.com");

    let enabled = provider.resolve_bool_value("isAwesomeFeatureEnabled", false, Some(&context));
    println!("isAwesomeFeatureEnabled: {:?}", enabled);

    let max_items = provider.resolve_int_value("maxItems", 10, None);
    println!("maxItems: {:?}", max_items);

    let theme = provider.resolve_struct_value(
        "theme",
        configcat_openfeature_provider::StructuredValue::empty_mapping(),
        None,
    );
    println!("theme: {:?}", theme);

    let missing = provider.resolve_string_value("missing", "fallback".to_owned(), None);
    println!("missing: {:?}", missing);

    provider.shutdown();
    Ok(())
}
