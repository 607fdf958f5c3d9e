use crate::domain::model::Credential;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::ConfigError;
use crate::utils::validation::validate_url;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use url::Url;

/// Shared HTTP plumbing: base URL, bearer header, optional timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::build(base_url, Client::builder())
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Self::build(config.base_url(), builder)
    }

    fn build(base_url: &str, builder: reqwest::ClientBuilder) -> Result<Self, ConfigError> {
        validate_url("api.base_url", base_url)?;
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = builder.build().map_err(|e| ConfigError::InvalidValue {
            field: "api".to_string(),
            value: base_url.to_string(),
            reason: format!("HTTP client could not be built: {}", e),
        })?;
        Ok(Self { client, base_url })
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn get(&self, url: Url, credential: &Credential) -> RequestBuilder {
        tracing::debug!("📡 GET {}", url);
        self.client.get(url).bearer_auth(credential.bearer())
    }

    pub fn put_json<T: Serialize + ?Sized>(
        &self,
        url: Url,
        credential: &Credential,
        body: &T,
    ) -> RequestBuilder {
        tracing::debug!("📡 PUT {}", url);
        self.client
            .put(url)
            .bearer_auth(credential.bearer())
            .json(body)
    }
}

/// `Err` carries the status code of a non-2xx response.
pub fn check_status(response: &Response) -> Result<(), u16> {
    let status = response.status();
    tracing::debug!("📡 {} -> {}", response.url(), status);
    if status.is_success() {
        Ok(())
    } else {
        Err(status.as_u16())
    }
}
