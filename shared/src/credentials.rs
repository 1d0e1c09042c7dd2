use crate::error::AuthError;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
// Tokens this close to expiry are fetched again.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// OAuth2 access tokens for the Firestore and FCM REST APIs.
pub enum GoogleCredentials {
    Static(String),
    MetadataServer(MetadataServerTokens),
}

impl fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoogleCredentials::Static(_) => write!(f, "GoogleCredentials::Static(<redacted>)"),
            GoogleCredentials::MetadataServer(tokens) => {
                write!(f, "GoogleCredentials::MetadataServer({})", tokens.endpoint)
            }
        }
    }
}

impl GoogleCredentials {
    /// Uses the supplied token if there is one, otherwise the metadata server.
    pub fn from_token_or_metadata(
        token: Option<String>,
        metadata_endpoint: String,
        http_client: Client,
    ) -> Self {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => GoogleCredentials::Static(token),
            None => GoogleCredentials::MetadataServer(MetadataServerTokens::new(
                metadata_endpoint,
                http_client,
            )),
        }
    }

    pub async fn access_token(&self) -> Result<String, AuthError> {
        match self {
            GoogleCredentials::Static(token) => Ok(token.clone()),
            GoogleCredentials::MetadataServer(tokens) => tokens.access_token().await,
        }
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

pub struct MetadataServerTokens {
    endpoint: String,
    http_client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataServerTokens {
    pub fn new(endpoint: String, http_client: Client) -> Self {
        Self {
            endpoint,
            http_client,
            cached: Mutex::new(None),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + EXPIRY_MARGIN < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http_client
            .get(format!("{}{}", self.endpoint, TOKEN_PATH))
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!("Fetched access token valid for {}s", token.expires_in);

        // a lifetime past what Instant can represent is used once, not cached
        *cached = Instant::now()
            .checked_add(Duration::from_secs(token.expires_in))
            .map(|expires_at| CachedToken {
                value: token.access_token.clone(),
                expires_at,
            });

        Ok(token.access_token)
    }
}
