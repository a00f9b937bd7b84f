//! Fetcher configuration.

use std::collections::BTreeMap;

use crate::dispatch::Dispatch;
use crate::transport::default_user_agent;

/// Default cap on the pages a discovering fetch follows after the first.
pub const DEFAULT_MAX_DISCOVERED_PAGES: u32 = 1000;

/// Configuration for a [`Fetcher`](crate::Fetcher).
///
/// # Example
///
/// ```
/// use pagefetch::{Dispatch, FetcherConfig};
///
/// let config = FetcherConfig::builder()
///     .header("Accept", "application/vnd.github+json")
///     .user_agent("my-app/1.0")
///     .build();
///
/// assert_eq!(config.base_headers["Accept"], "application/vnd.github+json");
/// assert!(!config.dispatch.is_serialized());
/// ```
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Headers added to every request. A descriptor's own headers win.
    pub base_headers: BTreeMap<String, String>,
    /// Completion delivery policy.
    pub dispatch: Dispatch,
    /// User agent for transports built from this config.
    pub user_agent: String,
    /// Most pages a discovering fetch requests after the first one.
    pub max_discovered_pages: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_headers: BTreeMap::new(),
            dispatch: Dispatch::Inline,
            user_agent: default_user_agent().to_string(),
            max_discovered_pages: DEFAULT_MAX_DISCOVERED_PAGES,
        }
    }
}

impl FetcherConfig {
    /// Create a new config builder
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder::default()
    }
}

/// Builder for [`FetcherConfig`].
#[derive(Debug, Default)]
pub struct FetcherConfigBuilder {
    config: FetcherConfig,
}

impl FetcherConfigBuilder {
    /// Add a header sent with every request
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.base_headers.insert(key.into(), value.into());
        self
    }

    /// Set the completion delivery policy
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.config.dispatch = dispatch;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Cap the pages a discovering fetch follows after the first
    pub fn max_discovered_pages(mut self, max: u32) -> Self {
        self.config.max_discovered_pages = max;
        self
    }

    /// Build the config
    pub fn build(self) -> FetcherConfig {
        self.config
    }
}
