use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BeehiveConfig;
use crate::error::{BeehiveError, BeehiveResult};
use crate::models::Credential;
use crate::sync::FetchError;

use super::endpoints::{Endpoint, Mount};

/// Thin wrapper over `reqwest` that knows the base URL and how to attach the bearer
/// credential. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    root_url: Url,
    timeout: Duration,
}

/// The `{message}` / `{error}` envelope most write endpoints answer with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiMessage {
    pub fn text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> BeehiveResult<Self> {
        let base_url = parse_base("api.base_url", base_url)?;
        let mut root_url = base_url.clone();
        root_url.set_path("/");
        root_url.set_query(None);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("beehive/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            root_url,
            timeout,
        })
    }

    /// Overrides where root-mounted endpoints resolve. Defaults to the base URL's origin.
    pub fn with_root_url(mut self, root_url: &str) -> BeehiveResult<Self> {
        self.root_url = parse_base("api.root_url", root_url)?;
        Ok(self)
    }

    pub fn from_config(config: &BeehiveConfig) -> BeehiveResult<Self> {
        let client = Self::new(&config.api.base_url, config.request_timeout())?;
        match config.api.root_url.as_deref() {
            Some(root_url) if !root_url.is_empty() => client.with_root_url(root_url),
            _ => Ok(client),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> Url {
        let mut url = match endpoint.mount() {
            Mount::Api => self.base_url.clone(),
            Mount::Root => self.root_url.clone(),
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(endpoint.segments());
        }
        url
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        query: &[(&str, String)],
        credential: &Credential,
    ) -> Result<T, FetchError> {
        let request = self.client.get(self.url_for(endpoint)).query(query);
        let response = self.send(endpoint, request, credential).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    pub async fn get_message(
        &self,
        endpoint: &Endpoint,
        credential: &Credential,
    ) -> Result<ApiMessage, FetchError> {
        let request = self.client.get(self.url_for(endpoint));
        let response = self.send(endpoint, request, credential).await?;
        Ok(read_message(response).await)
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        body: &B,
        credential: &Credential,
    ) -> Result<ApiMessage, FetchError> {
        let request = self.client.post(self.url_for(endpoint)).json(body);
        let response = self.send(endpoint, request, credential).await?;
        Ok(read_message(response).await)
    }

    pub async fn post_form(
        &self,
        endpoint: &Endpoint,
        fields: &[(&str, String)],
        credential: &Credential,
    ) -> Result<ApiMessage, FetchError> {
        let request = self.client.post(self.url_for(endpoint)).form(fields);
        let response = self.send(endpoint, request, credential).await?;
        Ok(read_message(response).await)
    }

    pub async fn post_multipart(
        &self,
        endpoint: &Endpoint,
        form: reqwest::multipart::Form,
        credential: &Credential,
    ) -> Result<ApiMessage, FetchError> {
        let request = self.client.post(self.url_for(endpoint)).multipart(form);
        let response = self.send(endpoint, request, credential).await?;
        Ok(read_message(response).await)
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        request: RequestBuilder,
        credential: &Credential,
    ) -> Result<Response, FetchError> {
        let response = request
            .header("Authorization", credential.authorization_header())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout)
                } else {
                    FetchError::from(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint = %endpoint, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&body)
            .ok()
            .and_then(|m| m.text().map(str::to_string))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        warn!(
            endpoint = %endpoint,
            status = status.as_u16(),
            message = %message,
            "Request returned non-success status"
        );
        Err(FetchError::transport(Some(status.as_u16()), message))
    }
}

fn parse_base(key: &str, raw: &str) -> BeehiveResult<Url> {
    let url = Url::parse(raw).map_err(|e| BeehiveError::InvalidConfigValue {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(BeehiveError::InvalidConfigValue {
            key: key.to_string(),
            message: "Must be a hierarchical http(s) URL".to_string(),
        });
    }
    Ok(url)
}

async fn read_message(response: Response) -> ApiMessage {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str(&body).unwrap_or_default()
}
