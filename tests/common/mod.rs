//! A ConfigCat client serving flags from a local JSON file, standing in for the real client with
//! local-only flag overrides.

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use chrono::Utc;
use configcat_openfeature_provider::{
    ClientOptions, ConfigCatProvider, Error, EvaluationDetails, FlagClient, OverrideBehavior,
    PercentageOption, Result, SettingValue, TargetingRule, User,
};
use serde::Deserialize;

pub const TEST_DATA: &str = "tests/data/test_json_complex.json";

#[derive(Debug, Deserialize)]
struct FlagFile {
    flags: HashMap<String, Setting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Setting {
    value: SettingValue,
    variation_id: String,
    #[serde(default)]
    targeting_rules: Vec<Rule>,
    #[serde(default)]
    percentage_options: Vec<PercentageRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Rule {
    comparison_attribute: String,
    one_of: Vec<String>,
    value: SettingValue,
    variation_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PercentageRule {
    percentage: u8,
    value: SettingValue,
    variation_id: String,
}

impl Rule {
    fn matches(&self, user: &User) -> bool {
        let attribute = match self.comparison_attribute.as_str() {
            "Identifier" => Some(user.identifier.as_str()),
            "Email" => user.email.as_deref(),
            "Country" => user.country.as_deref(),
            custom => user.custom.get(custom).and_then(|value| value.as_str()),
        };
        attribute.is_some_and(|attribute| self.one_of.iter().any(|v| v == attribute))
    }
}

/// Serves flags from a file. Evaluation after `close()` fails like a disposed client.
pub struct LocalFileClient {
    flags: HashMap<String, Setting>,
    closed: AtomicBool,
    pub evaluations: AtomicUsize,
}

impl LocalFileClient {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file: FlagFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        Ok(Self {
            flags: file.flags,
            closed: AtomicBool::new(false),
            evaluations: AtomicUsize::new(0),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn key_not_found(&self, key: &str, default_value: &SettingValue) -> String {
        let mut keys = self.flags.keys().map(|k| format!("'{k}'")).collect::<Vec<_>>();
        keys.sort();
        format!(
            "Failed to evaluate setting '{key}' (the key was not found in config JSON). \
             Returning the `default_value` parameter that you specified in your application: \
             '{default_value}'. Available keys: [{}].",
            keys.join(", ")
        )
    }
}

impl FlagClient for LocalFileClient {
    fn get_value_details(
        &self,
        key: &str,
        default_value: SettingValue,
        user: Option<&User>,
    ) -> EvaluationDetails {
        self.evaluations.fetch_add(1, Ordering::SeqCst);

        if self.is_closed() {
            return EvaluationDetails::from_error(
                key,
                default_value,
                "The client has already been closed.",
            );
        }

        let Some(setting) = self.flags.get(key) else {
            let error = self.key_not_found(key, &default_value);
            return EvaluationDetails::from_error(key, default_value, error);
        };

        let mut details = EvaluationDetails::new(
            key,
            setting.value.clone(),
            Some(setting.variation_id.clone()),
        );
        details.user = user.cloned();
        details.fetch_time = Some(Utc::now());

        let Some(user) = user else {
            return details;
        };

        if let Some((index, rule)) = setting
            .targeting_rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(user))
        {
            details.value = rule.value.clone();
            details.variation_id = Some(rule.variation_id.clone());
            details.matched_targeting_rule = Some(Arc::new(TargetingRule { index }));
            return details;
        }

        if !setting.percentage_options.is_empty() {
            let bucket = user.identifier.bytes().map(u32::from).sum::<u32>() % 100;
            let mut upper = 0;
            for (index, option) in setting.percentage_options.iter().enumerate() {
                upper += u32::from(option.percentage);
                if bucket < upper {
                    details.value = option.value.clone();
                    details.variation_id = Some(option.variation_id.clone());
                    details.matched_percentage_option = Some(Arc::new(PercentageOption {
                        index,
                        percentage: option.percentage,
                    }));
                    break;
                }
            }
        }

        details
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Connector creating [`LocalFileClient`]s from the flag overrides in the options.
pub fn local_file_connector(
    _sdk_key: &str,
    options: &ClientOptions,
) -> Result<Arc<dyn FlagClient>> {
    let path = options
        .get_flag_overrides()
        .map(|overrides| overrides.file_path.clone())
        .unwrap_or_else(|| TEST_DATA.into());
    let client = LocalFileClient::open(path).map_err(Error::backend)?;
    Ok(Arc::new(client))
}

pub fn local_only_options() -> ClientOptions {
    let mut options = ClientOptions::default();
    options.flag_overrides(TEST_DATA, OverrideBehavior::LocalOnly);
    options
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A provider backed by its own [`LocalFileClient`].
pub fn provider() -> (ConfigCatProvider, Arc<LocalFileClient>) {
    init_logger();
    let client = Arc::new(LocalFileClient::open(TEST_DATA).unwrap());
    (ConfigCatProvider::from_client(client.clone()), client)
}
