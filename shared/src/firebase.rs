use crate::credentials::GoogleCredentials;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;

pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com/v1";
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal";
pub const DEFAULT_DATABASE: &str = "(default)";

/// Process-wide Firebase context, built once before the first invocation
/// and shared by every adapter.
#[derive(Debug, Clone)]
pub struct FirebaseApp {
    pub project_id: String,
    pub database: String,
    pub firestore_endpoint: String,
    pub fcm_endpoint: String,
    http_client: Client,
    credentials: Arc<GoogleCredentials>,
}

impl FirebaseApp {
    pub fn new(project_id: String, http_client: Client, credentials: GoogleCredentials) -> Self {
        Self {
            project_id,
            database: DEFAULT_DATABASE.to_string(),
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
            fcm_endpoint: DEFAULT_FCM_ENDPOINT.to_string(),
            http_client,
            credentials: Arc::new(credentials),
        }
    }

    pub fn with_database(mut self, database: String) -> Self {
        self.database = database;
        self
    }

    pub fn with_firestore_endpoint(mut self, endpoint: String) -> Self {
        self.firestore_endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_fcm_endpoint(mut self, endpoint: String) -> Self {
        self.fcm_endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// `.../projects/{project}/databases/{database}/documents`
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.firestore_endpoint, self.project_id, self.database
        )
    }

    pub fn messages_send_url(&self) -> String {
        format!(
            "{}/projects/{}/messages:send",
            self.fcm_endpoint, self.project_id
        )
    }

    pub(crate) async fn authorized_post(
        &self,
        url: &str,
    ) -> Result<RequestBuilder, crate::error::AuthError> {
        let token = self.credentials.access_token().await?;
        Ok(self.http_client.post(url).bearer_auth(token))
    }
}
