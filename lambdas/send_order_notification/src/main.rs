use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::event_handler::{function_handler, notification_counter, HandlerDeps};
use lambda_runtime::{run, service_fn, Error};
use shared::{
    adapters::FirestoreUserRepository, credentials::GoogleCredentials, fcm::FcmPushNotifier,
    firebase::FirebaseApp,
};

mod config;
mod event_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let otel_guard = Arc::new(shared::observability::init_otel()?);
    let config = Config::load()?;

    let http_client = shared::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let credentials = GoogleCredentials::from_token_or_metadata(
        config.google_access_token,
        config.metadata_endpoint,
        http_client.clone(),
    );
    let firebase = FirebaseApp::new(config.firebase_project_id, http_client, credentials)
        .with_database(config.firestore_database)
        .with_firestore_endpoint(config.firestore_endpoint)
        .with_fcm_endpoint(config.fcm_endpoint);

    tracing::info!(
        project_id = %firebase.project_id,
        database = %firebase.database,
        "Firebase context initialised"
    );

    let handler_deps = HandlerDeps {
        user_repo: FirestoreUserRepository::new(firebase.clone(), config.users_collection),
        notifier: FcmPushNotifier::new(firebase),
        recipient_email: config.recipient_email,
        include_order_id: config.include_order_id,
        notification_counter: notification_counter(),
    };

    run(service_fn(|event| async {
        let res = function_handler(&handler_deps, event).await;

        otel_guard.flush();

        res
    }))
    .await
}
