use crate::{
    core::{NotificationMessage, PushNotifier},
    error::DeliveryError,
    firebase::FirebaseApp,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct FcmPushNotifier {
    app: FirebaseApp,
}

impl FcmPushNotifier {
    pub fn new(app: FirebaseApp) -> Self {
        Self { app }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a NotificationMessage,
}

#[derive(Deserialize)]
struct SendResponse {
    name: String,
}

#[async_trait]
impl PushNotifier for FcmPushNotifier {
    #[tracing::instrument("send fcm message", skip(self, message), fields(
        messaging.operation.name = "send",
        messaging.destination = "fcm",
        messaging.message.id = tracing::field::Empty,
    ))]
    async fn send(&self, message: &NotificationMessage) -> Result<String, DeliveryError> {
        let response = self
            .app
            .authorized_post(&self.app.messages_send_url())
            .await?
            .json(&SendRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let sent: SendResponse = response.json().await?;
        tracing::Span::current().record("messaging.message.id", sent.name.as_str());

        Ok(sent.name)
    }
}

#[cfg(test)]
mod tests {
    use super::FcmPushNotifier;
    use crate::{
        core::{NotificationMessage, PushNotifier},
        credentials::GoogleCredentials,
        error::DeliveryError,
        firebase::FirebaseApp,
    };
    use mockito::Matcher;
    use reqwest::Client;
    use serde_json::json;

    const SEND_PATH: &str = "/projects/demo-project/messages:send";

    fn notifier(server: &mockito::Server) -> FcmPushNotifier {
        let app = FirebaseApp::new(
            "demo-project".to_string(),
            Client::new(),
            GoogleCredentials::Static("test-token".to_string()),
        )
        .with_fcm_endpoint(server.url());
        FcmPushNotifier::new(app)
    }

    #[tokio::test]
    async fn when_fcm_accepts_should_return_message_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", SEND_PATH)
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::Json(json!({
                "message": {
                    "token": "TOKEN-ABC",
                    "notification": {
                        "title": "New Order Received!",
                        "body": "Order has been placed."
                    }
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"projects/demo-project/messages/0:1500415314455276%31bd1c9631bd1c96"}"#)
            .create_async()
            .await;

        let message = NotificationMessage::order_received("TOKEN-ABC", None);
        let name = notifier(&server).send(&message).await.unwrap();

        assert_eq!(
            name,
            "projects/demo-project/messages/0:1500415314455276%31bd1c9631bd1c96"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn when_token_is_unregistered_should_report_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", SEND_PATH)
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"status":"NOT_FOUND","message":"Requested entity was not found."}}"#)
            .create_async()
            .await;

        let message = NotificationMessage::order_received("STALE-TOKEN", None);
        let result = notifier(&server).send(&message).await;

        match result {
            Err(DeliveryError::Rejected { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("NOT_FOUND"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
