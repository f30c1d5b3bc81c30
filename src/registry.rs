use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
};

use regex::Regex;

use crate::{ClientOptions, Error, FlagClient, Result};

/// Creates ConfigCat clients for the [`ClientRegistry`].
///
/// Implemented for closures, so a connector can be supplied inline:
///
/// ```
/// # use std::sync::Arc;
/// # use configcat_openfeature_provider::{ClientOptions, Connect, FlagClient, Result};
/// fn connector() -> impl Connect {
///     |sdk_key: &str, options: &ClientOptions| -> Result<Arc<dyn FlagClient>> {
///         unimplemented!("build a client for {sdk_key}")
///     }
/// }
/// ```
pub trait Connect {
    /// Create a new client for `sdk_key`.
    fn connect(&self, sdk_key: &str, options: &ClientOptions) -> Result<Arc<dyn FlagClient>>;
}

impl<T: Fn(&str, &ClientOptions) -> Result<Arc<dyn FlagClient>>> Connect for T {
    fn connect(&self, sdk_key: &str, options: &ClientOptions) -> Result<Arc<dyn FlagClient>> {
        self(sdk_key, options)
    }
}

/// Shared ConfigCat clients, one per SDK key.
///
/// Creating several clients for the same SDK key would multiply background polling, so providers
/// acquire their client here and release it on shutdown.
#[derive(Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<String, Arc<dyn FlagClient>>>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`ConfigCatProvider::new`](crate::ConfigCatProvider::new).
    pub fn global() -> &'static ClientRegistry {
        static GLOBAL: OnceLock<ClientRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ClientRegistry::new)
    }

    /// Return the client registered for `sdk_key`, creating it with `connector` if there is none.
    ///
    /// `options` only apply when a new client is created.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSdkKey`] if `sdk_key` is malformed.
    /// - [`Error::InvalidBaseUrl`] if `options` holds a malformed base URL.
    /// - Any error returned by `connector`.
    pub fn acquire(
        &self,
        sdk_key: &str,
        options: Option<&ClientOptions>,
        connector: &dyn Connect,
    ) -> Result<Arc<dyn FlagClient>> {
        let mut clients = self.clients.lock().map_err(|_| Error::RegistryPoisoned)?;

        if let Some(client) = clients.get(sdk_key) {
            if options.is_some() {
                log::warn!(target: "configcat", sdk_key:display = mask_sdk_key(sdk_key);
                           "there is an existing client instance for the specified SDK key, the specified options are ignored");
            }
            return Ok(client.clone());
        }

        let default_options = ClientOptions::default();
        let options = options.unwrap_or(&default_options);

        let custom_base_url = options.parsed_base_url()?.is_some();
        if sdk_key.is_empty()
            || (!options.is_local_only() && !is_valid_sdk_key(sdk_key, custom_base_url))
        {
            return Err(Error::InvalidSdkKey(sdk_key.to_owned()));
        }

        let client = connector.connect(sdk_key, options)?;
        log::debug!(target: "configcat", sdk_key:display = mask_sdk_key(sdk_key); "created client");
        clients.insert(sdk_key.to_owned(), client.clone());
        Ok(client)
    }

    /// Remove `client` from the registry.
    ///
    /// Does nothing if `sdk_key` has been re-registered with another client in the meantime.
    pub fn release(&self, sdk_key: &str, client: &Arc<dyn FlagClient>) {
        // A poisoned lock leaves the entry in place. There's nothing useful to do about it during
        // shutdown.
        let Ok(mut clients) = self.clients.lock() else {
            return;
        };
        if clients
            .get(sdk_key)
            .is_some_and(|registered| Arc::ptr_eq(registered, client))
        {
            clients.remove(sdk_key);
            log::debug!(target: "configcat", sdk_key:display = mask_sdk_key(sdk_key); "released client");
        }
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.lock().map_or(0, |clients| clients.len())
    }

    /// Returns `true` if no client is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_valid_sdk_key(sdk_key: &str, custom_base_url: bool) -> bool {
    static SDK_KEY: OnceLock<Regex> = OnceLock::new();
    static PROXY_SDK_KEY: OnceLock<Regex> = OnceLock::new();

    let sdk_key_re = SDK_KEY.get_or_init(|| {
        Regex::new(r"^(configcat-sdk-1/)?[^/]{22}/[^/]{22}$").expect("valid SDK key regex")
    });
    if sdk_key_re.is_match(sdk_key) {
        return true;
    }

    custom_base_url
        && PROXY_SDK_KEY
            .get_or_init(|| Regex::new(r"^configcat-proxy/.+$").expect("valid proxy key regex"))
            .is_match(sdk_key)
}

/// Hide most of the SDK key in logs.
fn mask_sdk_key(sdk_key: &str) -> String {
    let visible = sdk_key.len().min(6);
    let start = sdk_key.len() - visible;
    match sdk_key.get(start..) {
        Some(tail) => format!("{}{}", "*".repeat(start), tail),
        None => "*".repeat(sdk_key.len()),
    }
}
