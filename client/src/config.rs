use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const DEFAULT_URL: &str = "http://localhost:8080";

pub const ENV_URL: &str = "FRAMES_URL";
pub const ENV_API_KEY: &str = "FRAMES_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "FRAMES_TIMEOUT_SECS";
pub const ENV_MAX_IN_MESSAGE: &str = "FRAMES_MAX_IN_MESSAGE";

/// Connection settings for the frames server.
///
/// `timeout` of `None` disables the request timeout, which suits long
/// streaming reads. `max_in_message` is the default row limit per written
/// message (0 = whole table in one message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub url: String,
    pub api_key: Option<String>,
    #[serde(with = "timeout_secs")]
    pub timeout: Option<Duration>,
    pub max_in_message: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            api_key: None,
            timeout: None,
            max_in_message: 0,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_in_message(mut self, rows: usize) -> Self {
        self.max_in_message = rows;
        self
    }

    /// Load from `FRAMES_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL) {
            config.url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.is_empty()) {
            config.api_key = Some(key);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = Some(Duration::from_secs(parse_env(ENV_TIMEOUT_SECS, &secs)?));
        }
        if let Some(rows) = lookup(ENV_MAX_IN_MESSAGE) {
            config.max_in_message = parse_env(ENV_MAX_IN_MESSAGE, &rows)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ClientError::Config("url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Config(format!("url {:?} is not http(s)", self.url)));
        }
        Ok(())
    }

    /// `url` without trailing slashes, ready for path joins.
    pub fn base_url(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ClientError> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{key}={raw:?} is not a non-negative integer")))
}

mod timeout_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        value.map(|d| d.as_secs()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}
