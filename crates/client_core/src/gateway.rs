use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::ContactId,
    error::{ApiError, ErrorCode},
    protocol::{Contact, ContactPatch, NewContact},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GatewayConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid contacts endpoint '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        source: reqwest::Error,
    },
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: Method,
        url: String,
        status: u16,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl GatewayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::InvalidUrl { .. } | GatewayError::Client(_) => ErrorCode::Internal,
            GatewayError::Transport { .. } => ErrorCode::Transport,
            GatewayError::Status { status, .. } => ErrorCode::from_status(*status),
            GatewayError::Decode { .. } => ErrorCode::Decode,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code(), self.to_string())
    }
}

#[async_trait]
pub trait ContactGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<Contact>, GatewayError>;
    async fn get(&self, id: ContactId) -> Result<Contact, GatewayError>;
    async fn create(&self, contact: &NewContact) -> Result<Contact, GatewayError>;
    async fn update(&self, id: ContactId, patch: &ContactPatch) -> Result<Contact, GatewayError>;
    /// Backends answer a delete with the removed record or with an empty body.
    async fn delete(&self, id: ContactId) -> Result<Option<Contact>, GatewayError>;
}

pub struct HttpContactGateway {
    http: Client,
    collection_url: String,
    auth_token: Option<String>,
}

impl HttpContactGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let collection_url = config
            .collection_url()
            .map_err(|source| GatewayError::InvalidUrl {
                url: config.base_url.clone(),
                source,
            })?;
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(GatewayError::Client)?;
        Ok(Self {
            http,
            collection_url: collection_url.to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: ContactId) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        builder: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        debug!(%method, url, "sending contacts request");
        let response = builder
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            warn!(%method, url, status = status.as_u16(), "contacts request rejected");
            return Err(GatewayError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn body_bytes(
        method: Method,
        url: &str,
        response: Response,
    ) -> Result<Vec<u8>, GatewayError> {
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|source| GatewayError::Transport {
                method,
                url: url.to_string(),
                source,
            })
    }

    async fn decode<T: DeserializeOwned>(
        method: Method,
        url: &str,
        response: Response,
    ) -> Result<T, GatewayError> {
        let bytes = Self::body_bytes(method, url, response).await?;
        serde_json::from_slice(&bytes).map_err(|source| GatewayError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ContactGateway for HttpContactGateway {
    async fn list(&self) -> Result<Vec<Contact>, GatewayError> {
        let url = self.collection_url.clone();
        let response = self
            .send(Method::GET, &url, self.request(Method::GET, &url))
            .await?;
        Self::decode(Method::GET, &url, response).await
    }

    async fn get(&self, id: ContactId) -> Result<Contact, GatewayError> {
        let url = self.item_url(id);
        let response = self
            .send(Method::GET, &url, self.request(Method::GET, &url))
            .await?;
        Self::decode(Method::GET, &url, response).await
    }

    async fn create(&self, contact: &NewContact) -> Result<Contact, GatewayError> {
        let url = self.collection_url.clone();
        let response = self
            .send(
                Method::POST,
                &url,
                self.request(Method::POST, &url).json(contact),
            )
            .await?;
        Self::decode(Method::POST, &url, response).await
    }

    async fn update(&self, id: ContactId, patch: &ContactPatch) -> Result<Contact, GatewayError> {
        let url = self.item_url(id);
        let response = self
            .send(Method::PUT, &url, self.request(Method::PUT, &url).json(patch))
            .await?;
        Self::decode(Method::PUT, &url, response).await
    }

    async fn delete(&self, id: ContactId) -> Result<Option<Contact>, GatewayError> {
        let url = self.item_url(id);
        let response = self
            .send(Method::DELETE, &url, self.request(Method::DELETE, &url))
            .await?;
        let bytes = Self::body_bytes(Method::DELETE, &url, response).await?;
        Ok(deleted_record(&bytes))
    }
}

/// An empty body, `{}` or anything that is not a contact means "no echo".
fn deleted_record(bytes: &[u8]) -> Option<Contact> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
