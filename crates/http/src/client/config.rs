//! Client configuration

use std::time::Duration;

/// Connection settings for [`super::StoreClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Environment variable overriding the API base URL.
    pub const BASE_URL_ENV: &'static str = "MEDSTORE_API_BASE_URL";

    /// Fallback base URL when the environment does not provide one.
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8080/api/v1";

    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var(Self::BASE_URL_ENV)
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());
        Self {
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
