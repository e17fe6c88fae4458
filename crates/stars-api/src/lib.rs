#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Client for the GitHub Stars GraphQL API.
//!
//! [`StarsAdapter`] is the entry point: it normalizes request fields, optionally probes
//! user-supplied URLs, executes the GraphQL operation with retries and folds every outcome
//! into a [`ResultEnvelope`].

pub mod adapter;
pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod normalize;
pub mod observe;
pub mod operation;
mod queries;
pub mod retry;
pub mod url_check;

pub use adapter::StarsAdapter;
pub use config::{StarsApiConfig, UrlPolicy, UrlValidationConfig};
pub use envelope::ResultEnvelope;
pub use error::ApiError;
pub use executor::{HttpExecutor, RequestExecutor};
pub use normalize::{AliasNormalizer, ContributionType, Platform};
pub use observe::{Observer, TracingObserver};
pub use operation::OperationRequest;
pub use retry::RetryPolicy;
pub use url_check::{HttpUrlValidator, UrlValidator};
