use std::{path::PathBuf, time::Duration};

use url::Url;

use crate::{Error, Result};

/// How the client keeps its config JSON up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollingMode {
    /// Fetch the config JSON in the background every `interval`.
    AutoPoll {
        /// Time between two fetches.
        interval: Duration,
    },
    /// Fetch the config JSON on evaluation once the cached copy is older than `cache_ttl`.
    LazyLoad {
        /// How long a fetched config JSON is considered fresh.
        cache_ttl: Duration,
    },
    /// Only fetch the config JSON when explicitly asked to.
    ManualPoll,
}

impl Default for PollingMode {
    fn default() -> Self {
        PollingMode::AutoPoll {
            interval: Duration::from_secs(60),
        }
    }
}

/// Where the config JSON is downloaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataGovernance {
    /// Use the global CDN.
    #[default]
    Global,
    /// Use CDN nodes in the EU only.
    EuOnly,
}

/// How local flag overrides are combined with the remote config JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideBehavior {
    /// Use only the local overrides. The remote config JSON is never fetched.
    LocalOnly,
    /// Merge both sources, preferring local values.
    LocalOverRemote,
    /// Merge both sources, preferring remote values.
    RemoteOverLocal,
}

/// Flag overrides loaded from a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagOverrides {
    /// Path of the JSON file holding the overrides.
    pub file_path: PathBuf,
    /// How overrides are combined with remote values.
    pub behavior: OverrideBehavior,
}

/// Configuration handed to the ConfigCat client when the provider creates it.
///
/// The provider only validates these options. Their meaning is defined by the client.
///
/// ```
/// # use std::time::Duration;
/// # use configcat_openfeature_provider::{ClientOptions, PollingMode};
/// let mut options = ClientOptions::default();
/// options
///     .polling_mode(PollingMode::LazyLoad { cache_ttl: Duration::from_secs(300) })
///     .request_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub(crate) base_url: Option<String>,
    pub(crate) polling_mode: PollingMode,
    pub(crate) data_governance: DataGovernance,
    pub(crate) request_timeout: Duration,
    pub(crate) offline: bool,
    pub(crate) flag_overrides: Option<FlagOverrides>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            polling_mode: PollingMode::default(),
            data_governance: DataGovernance::default(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            offline: false,
            flag_overrides: None,
        }
    }
}

impl ClientOptions {
    /// Default timeout of a config JSON download.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Override base URL for API calls, e.g. to point at a ConfigCat proxy. Clients should use
    /// the default setting in most cases.
    pub fn base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the polling mode.
    pub fn polling_mode(&mut self, polling_mode: PollingMode) -> &mut Self {
        self.polling_mode = polling_mode;
        self
    }

    /// Restrict where the config JSON is downloaded from.
    pub fn data_governance(&mut self, data_governance: DataGovernance) -> &mut Self {
        self.data_governance = data_governance;
        self
    }

    /// Set the timeout of a config JSON download.
    pub fn request_timeout(&mut self, request_timeout: Duration) -> &mut Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Start the client without network access.
    pub fn offline(&mut self, offline: bool) -> &mut Self {
        self.offline = offline;
        self
    }

    /// Load flag overrides from a local file.
    pub fn flag_overrides(
        &mut self,
        file_path: impl Into<PathBuf>,
        behavior: OverrideBehavior,
    ) -> &mut Self {
        self.flag_overrides = Some(FlagOverrides {
            file_path: file_path.into(),
            behavior,
        });
        self
    }

    /// Custom base URL, if set.
    pub fn get_base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Polling mode.
    pub fn get_polling_mode(&self) -> &PollingMode {
        &self.polling_mode
    }

    /// Data governance.
    pub fn get_data_governance(&self) -> DataGovernance {
        self.data_governance
    }

    /// Config JSON download timeout.
    pub fn get_request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Whether the client starts offline.
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Local flag overrides, if any.
    pub fn get_flag_overrides(&self) -> Option<&FlagOverrides> {
        self.flag_overrides.as_ref()
    }

    /// `true` if flags come exclusively from local overrides.
    pub(crate) fn is_local_only(&self) -> bool {
        matches!(
            self.flag_overrides,
            Some(FlagOverrides {
                behavior: OverrideBehavior::LocalOnly,
                ..
            })
        )
    }

    /// Parse the custom base URL, if any.
    pub(crate) fn parsed_base_url(&self) -> Result<Option<Url>> {
        self.base_url
            .as_deref()
            .map(|base_url| Url::parse(base_url).map_err(Error::InvalidBaseUrl))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ClientOptions, OverrideBehavior, PollingMode};
    use crate::Error;

    #[test]
    fn defaults() {
        let options = ClientOptions::default();

        assert_eq!(options.get_base_url(), None);
        assert_eq!(
            options.get_polling_mode(),
            &PollingMode::AutoPoll {
                interval: Duration::from_secs(60)
            }
        );
        assert_eq!(options.get_request_timeout(), Duration::from_secs(30));
        assert!(!options.is_offline());
        assert!(!options.is_local_only());
    }

    #[test]
    fn local_only_overrides() {
        let mut options = ClientOptions::default();
        options.flag_overrides("tests/data/test_json_complex.json", OverrideBehavior::LocalOnly);
        assert!(options.is_local_only());

        options.flag_overrides("overrides.json", OverrideBehavior::LocalOverRemote);
        assert!(!options.is_local_only());
    }

    #[test]
    fn rejects_invalid_base_url() {
        let mut options = ClientOptions::default();
        options.base_url("not a url");

        assert!(matches!(
            options.parsed_base_url(),
            Err(Error::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn accepts_valid_base_url() {
        let mut options = ClientOptions::default();
        options.base_url("https://proxy.example.com/configcat");

        let url = options.parsed_base_url().unwrap().unwrap();
        assert_eq!(url.host_str(), Some("proxy.example.com"));
    }
}
