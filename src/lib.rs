//! An OpenFeature provider for ConfigCat, a feature flag and configuration management service.
//!
//! # Overview
//!
//! [`ConfigCatProvider`] implements the [`FeatureProvider`] interface on top of a ConfigCat
//! client. Each resolve function converts the caller's [`EvaluationContext`] into a ConfigCat
//! [`User`], asks the client to evaluate the flag and turns the returned [`EvaluationDetails`]
//! into [`ResolutionDetails`].
//!
//! The ConfigCat client is reached through the [`FlagClient`] trait. Clients are shared per SDK
//! key through the [`ClientRegistry`]: providers created with the same SDK key reuse one client,
//! and [`FeatureProvider::shutdown`] releases it.
//!
//! # Error Handling
//!
//! Resolving a flag never fails. If the flag is missing, has an unexpected type or the client
//! reports an error, the caller's default value is returned with [`Reason::Error`] and an
//! [`ErrorCode`].
//!
//! Only provider construction can fail, with an [`Error`].
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate with the `configcat`
//! target. Consider integrating a `log`-compatible logger implementation for better visibility
//! into flag evaluation.
//!
//! # Examples
//!
//! A runnable example can be found in the `demos/simple` directory of the crate repository.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

pub mod backend;
mod context;
mod error;
mod eval;
mod feature_provider;
mod options;
mod provider;
mod registry;
mod resolution;

pub use backend::{
    EvaluationDetails, FlagClient, PercentageOption, SettingValue, TargetingRule, User,
};
pub use context::{Attributes, ContextValue, EvaluationContext};
pub use error::{Error, Result};
pub use feature_provider::{FeatureProvider, ProviderMetadata};
pub use options::{ClientOptions, DataGovernance, FlagOverrides, OverrideBehavior, PollingMode};
pub use provider::{ConfigCatProvider, PROVIDER_NAME};
pub use registry::{ClientRegistry, Connect};
pub use resolution::{ErrorCode, Reason, ResolutionDetails, ResolutionError, StructuredValue};
