use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::config::Region;
use std::time::Duration;
use tracing::debug;

/// How long to poll for a table to reach a state after create or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl WaitPolicy {
    /// `max_attempts` is raised to 1 so a wait always checks the table at least once.
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Number of describe calls a wait makes, never zero.
    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Poll every 3 s, at most 20 times.
    pub fn table_exists() -> Self {
        Self::new(Duration::from_secs(3), 20)
    }

    /// Poll every 2 s, at most 20 times.
    pub fn table_not_exists() -> Self {
        Self::new(Duration::from_secs(2), 20)
    }
}

/// Client configuration, resolved once when the façade is built.
///
/// Credentials are never held here: they come from the SDK's default chain
/// (environment, shared credentials file, profile, instance role).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrudConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Custom endpoint, e.g. `http://localhost:8000` for DynamoDB Local.
    pub endpoint_url: Option<String>,
    /// `None` returns from `create_table` as soon as the request is accepted.
    pub create_wait: Option<WaitPolicy>,
    /// `None` returns from `delete_table` as soon as the request is accepted.
    pub delete_wait: Option<WaitPolicy>,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            endpoint_url: None,
            create_wait: Some(WaitPolicy::table_exists()),
            delete_wait: Some(WaitPolicy::table_not_exists()),
        }
    }
}

impl CrudConfig {
    /// Reads a `.env` file if present, then `AWS_PROFILE` and `AWS_ENDPOINT_URL`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            profile: non_empty_var("AWS_PROFILE"),
            endpoint_url: non_empty_var("AWS_ENDPOINT_URL"),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_waits(mut self, create: Option<WaitPolicy>, delete: Option<WaitPolicy>) -> Self {
        self.create_wait = create;
        self.delete_wait = delete;
        self
    }

    /// Resolves the SDK configuration: explicit region first, then the default chain.
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let region = RegionProviderChain::first_try(self.region.clone().map(Region::new))
            .or_default_provider();

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;
        debug!(region = ?sdk_config.region(), "loaded AWS SDK configuration");
        sdk_config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
