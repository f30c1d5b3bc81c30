use std::sync::Arc;

use thiserror::Error;

/// Result of provider construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring a ConfigCat client for the provider.
///
/// Flag evaluation never fails with an `Error`. Evaluation problems are reported through
/// [`ResolutionDetails`](crate::ResolutionDetails) instead.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// SDK key is empty or doesn't have the expected format.
    #[error("SDK Key `{0}` is invalid")]
    InvalidSdkKey(String),
    /// Invalid `base_url` in [`ClientOptions`](crate::ClientOptions).
    #[error("invalid base_url configuration")]
    InvalidBaseUrl(#[source] url::ParseError),
    /// A thread panicked while holding the shared client registry lock.
    #[error("client registry lock is poisoned")]
    RegistryPoisoned,
    /// The backend refused to create a client.
    // Backend errors are not necessarily clonable, so we're wrapping them in an Arc.
    #[error(transparent)]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an error raised by the backend while creating a client.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
