use crate::{
    core::{User, UserRepository},
    error::RepositoryError,
    firebase::FirebaseApp,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const EMAIL_FIELD: &str = "email";
const FCM_TOKEN_FIELD: &str = "fcmToken";

#[derive(Debug)]
pub struct FirestoreUserRepository {
    app: FirebaseApp,
    collection: String,
}

impl FirestoreUserRepository {
    pub fn new(app: FirebaseApp, collection: String) -> Self {
        Self { app, collection }
    }

    fn email_query(&self, email: &str) -> Value {
        json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": EMAIL_FIELD },
                        "op": "EQUAL",
                        "value": { "stringValue": email }
                    }
                },
                "limit": 1
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct RunQueryResponse {
    document: Option<FirestoreDocument>,
}

/// A document in the Firestore REST representation, where every field is
/// a typed value such as `{"stringValue": "..."}`.
#[derive(Debug, Deserialize)]
pub struct FirestoreDocument {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl FirestoreDocument {
    pub fn string_field(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|value| value.get("stringValue"))
            .and_then(Value::as_str)
    }
}

#[async_trait]
impl UserRepository for FirestoreUserRepository {
    #[tracing::instrument(skip(self, email), fields(collection = %self.collection))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let url = format!("{}:runQuery", self.app.documents_url());
        let response = self
            .app
            .authorized_post(&url)
            .await?
            .json(&self.email_query(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let results: Vec<RunQueryResponse> = response.json().await?;

        // elements without a document only carry the read time
        results
            .into_iter()
            .find_map(|result| result.document)
            .map(User::try_from)
            .transpose()
    }
}

impl TryFrom<FirestoreDocument> for User {
    type Error = RepositoryError;

    fn try_from(document: FirestoreDocument) -> Result<Self, Self::Error> {
        let email = document
            .string_field(EMAIL_FIELD)
            .ok_or_else(|| RepositoryError::MalformedDocument {
                name: document.name.clone(),
                reason: "email is missing or not a string".to_string(),
            })?
            .to_string();
        // null, non-string and missing tokens all read as no token
        let fcm_token = document.string_field(FCM_TOKEN_FIELD).map(str::to_string);

        Ok(User::new(email, fcm_token))
    }
}
