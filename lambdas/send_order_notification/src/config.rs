use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use shared::firebase::{
    DEFAULT_DATABASE, DEFAULT_FCM_ENDPOINT, DEFAULT_FIRESTORE_ENDPOINT, DEFAULT_METADATA_ENDPOINT,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Figment(#[from] figment::Error),
    #[error("{0} must be set to a non-empty value")]
    Missing(&'static str),
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Config {
    pub firebase_project_id: String,
    pub recipient_email: String,
    pub firestore_database: String,
    pub users_collection: String,
    pub include_order_id: bool,
    pub firestore_endpoint: String,
    pub fcm_endpoint: String,
    pub metadata_endpoint: String,
    pub google_access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            firebase_project_id: String::new(),
            recipient_email: String::new(),
            firestore_database: DEFAULT_DATABASE.to_string(),
            users_collection: "users".to_string(),
            include_order_id: false,
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
            fcm_endpoint: DEFAULT_FCM_ENDPOINT.to_string(),
            metadata_endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
            google_access_token: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("APP_"))
            .merge(Env::raw().only(&["GOOGLE_ACCESS_TOKEN"]))
            .extract()?;

        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.firebase_project_id.trim().is_empty() {
            return Err(ConfigError::Missing("APP_FIREBASE_PROJECT_ID"));
        }
        if self.recipient_email.trim().is_empty() {
            return Err(ConfigError::Missing("APP_RECIPIENT_EMAIL"));
        }
        if self.users_collection.trim().is_empty() {
            return Err(ConfigError::Missing("APP_USERS_COLLECTION"));
        }
        Ok(self)
    }
}
