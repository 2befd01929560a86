use std::{fmt, future::Future, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::{PropertyId, SessionUser},
    error::{ApiError, ApiException},
    protocol::{CurrentUserResponse, LoginRequest, LoginResponse, SubmitPropertyResponse},
};
use thiserror::Error;
use tracing::{debug, info};

pub mod catalog;
pub mod config;
pub mod login_form;
pub mod navigation;
pub mod property_form;
pub mod session;
pub mod validation;

pub use config::{load_settings, ClientSettings};
pub use login_form::{LoginForm, LoginOutcome, SimulatedAuthenticator};
pub use navigation::{visible_menu, MenuEntry, NavigationController, Presentation};
pub use property_form::{Attachment, PropertyForm, PropertyListing, SubmitOutcome};
pub use session::{Session, SessionController, SessionInit};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} answered with status {status}: {source}")]
    Api {
        url: String,
        status: StatusCode,
        #[source]
        source: ApiException,
    },
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} timed out after {timeout:?}")]
    TimedOut {
        operation: &'static str,
        timeout: Duration,
    },
    #[error("cannot read attachment {path}: {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves who is looking at the page. `None` means nobody is signed in.
#[async_trait]
pub trait CurrentUserSource: Send + Sync {
    async fn fetch_current_user(&self) -> Result<Option<SessionUser>>;
}

#[async_trait]
pub trait PropertySubmitter: Send + Sync {
    async fn submit_property(&self, listing: &PropertyListing) -> Result<PropertyId>;
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<()>;
}

/// Moves the user to another page once a controller is done with them.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str);
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bounds a collaborator call. Expiry is reported as [`ClientError::TimedOut`].
pub async fn with_timeout<T>(
    operation: &'static str,
    timeout: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::TimedOut { operation, timeout }.into()),
    }
}

pub struct RoomzyHttpClient {
    http: Client,
    server_url: String,
}

impl RoomzyHttpClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> std::result::Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            server_url: settings.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub async fn get_current_user(&self) -> std::result::Result<Option<SessionUser>, ClientError> {
        let url = format!("{}/api/fetch-user", self.server_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { url, status });
        }
        if status != StatusCode::OK {
            debug!(%status, "fetch-user: no content, treating as guest");
            return Ok(None);
        }

        let body: CurrentUserResponse = response
            .json()
            .await
            .map_err(|source| ClientError::Decode { url, source })?;
        Ok(body.payload)
    }

    pub async fn post_property(
        &self,
        listing: &PropertyListing,
    ) -> std::result::Result<PropertyId, ClientError> {
        let url = format!("{}/api/properties", self.server_url);
        let response = self
            .http
            .post(&url)
            .json(&listing.to_submission())
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        let response = Self::check_status(url.clone(), response).await?;

        let body: SubmitPropertyResponse = response
            .json()
            .await
            .map_err(|source| ClientError::Decode { url, source })?;
        info!(
            property_id = body.property_id.0,
            images = listing.images.len(),
            "property registered"
        );
        Ok(body.property_id)
    }

    pub async fn post_login(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<Option<SessionUser>, ClientError> {
        let url = format!("{}/api/login", self.server_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
            })
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        let response = Self::check_status(url.clone(), response).await?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|source| ClientError::Decode { url, source })?;
        Ok(body.payload)
    }

    /// Folds a non-success response into an error, using the backend's error envelope when the
    /// body carries one.
    async fn check_status(
        url: String,
        response: reqwest::Response,
    ) -> std::result::Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match response.json::<ApiError>().await {
            Ok(api_error) => Err(ClientError::Api {
                url,
                status,
                source: api_error.into(),
            }),
            Err(_) => Err(ClientError::Status { url, status }),
        }
    }
}

#[async_trait]
impl CurrentUserSource for RoomzyHttpClient {
    async fn fetch_current_user(&self) -> Result<Option<SessionUser>> {
        Ok(self.get_current_user().await?)
    }
}

#[async_trait]
impl PropertySubmitter for RoomzyHttpClient {
    async fn submit_property(&self, listing: &PropertyListing) -> Result<PropertyId> {
        Ok(self.post_property(listing).await?)
    }
}

#[async_trait]
impl Authenticator for RoomzyHttpClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        let user = self.post_login(credentials).await?;
        debug!(signed_in = user.is_some(), "login accepted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
