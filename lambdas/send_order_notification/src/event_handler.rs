use cloudevents::{AttributesReader, Data};
use lambda_runtime::{Error, LambdaEvent};
use opentelemetry::{global, metrics::Counter, KeyValue};
use serde::Serialize;
use serde_json::Value;
use shared::{
    core::{NotificationMessage, PushNotifier, UserRepository},
    observability::add_span_link_from,
};

const ORDERS_COLLECTION: &str = "orders";
const DOCUMENT_CREATED_TYPES: [&str; 2] = [
    "google.cloud.firestore.document.v1.created",
    "google.cloud.firestore.document.v1.created.withAuthContext",
];

pub(crate) struct HandlerDeps<R: UserRepository, N: PushNotifier> {
    pub user_repo: R,
    pub notifier: N,
    pub recipient_email: String,
    pub include_order_id: bool,
    pub notification_counter: Counter<u64>,
}

/// `order_notifications`, one increment per invocation tagged with its outcome.
pub(crate) fn notification_counter() -> Counter<u64> {
    global::meter("send_order_notification")
        .u64_counter("order_notifications")
        .build()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub(crate) enum NotificationOutcome {
    Sent { message_id: String },
    NoUserFound,
    TokenMissing,
    DeliveryFailed,
    LookupFailed,
    Ignored,
}

impl NotificationOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            NotificationOutcome::Sent { .. } => "sent",
            NotificationOutcome::NoUserFound => "no_user_found",
            NotificationOutcome::TokenMissing => "token_missing",
            NotificationOutcome::DeliveryFailed => "delivery_failed",
            NotificationOutcome::LookupFailed => "lookup_failed",
            NotificationOutcome::Ignored => "ignored",
        }
    }
}

/// A document created under `orders/{orderId}`.
#[derive(Debug)]
struct OrderCreated {
    order_id: String,
}

impl TryFrom<&cloudevents::Event> for OrderCreated {
    type Error = String;

    fn try_from(event: &cloudevents::Event) -> Result<Self, Self::Error> {
        if !DOCUMENT_CREATED_TYPES.contains(&event.ty()) {
            return Err(format!("unexpected event type {}", event.ty()));
        }

        let path = document_path(event).ok_or("event does not name a document")?;
        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(ORDERS_COLLECTION), Some(order_id), None) if !order_id.is_empty() => {
                Ok(OrderCreated {
                    order_id: order_id.to_string(),
                })
            }
            _ => Err(format!("document {} is not an order", path)),
        }
    }
}

/// The created document's path relative to the database root, taken from
/// the `document` extension, the subject, or the snapshot name in that order.
fn document_path(event: &cloudevents::Event) -> Option<String> {
    if let Some(document) = event.extension("document") {
        return Some(document.to_string());
    }
    if let Some(subject) = event.subject() {
        return Some(subject.trim_start_matches("documents/").to_string());
    }
    match event.data() {
        Some(Data::Json(data)) => data
            .pointer("/value/name")
            .and_then(Value::as_str)
            .and_then(|name| name.split_once("/documents/"))
            .map(|(_, path)| path.to_string()),
        _ => None,
    }
}

#[tracing::instrument(skip(deps, event), fields(request_id = %event.context.request_id))]
pub(crate) async fn function_handler<R: UserRepository, N: PushNotifier>(
    deps: &HandlerDeps<R, N>,
    event: LambdaEvent<Value>,
) -> Result<NotificationOutcome, Error> {
    let outcome = match serde_json::from_value::<cloudevents::Event>(event.payload) {
        Ok(cloud_event) => {
            add_span_link_from(&tracing::Span::current(), &cloud_event);
            match OrderCreated::try_from(&cloud_event) {
                Ok(order) => notify_recipient(deps, &order).await,
                Err(reason) => {
                    tracing::warn!("Ignoring event {}: {}", cloud_event.id(), reason);
                    NotificationOutcome::Ignored
                }
            }
        }
        Err(e) => {
            tracing::warn!("Ignoring payload that is not a CloudEvent: {:?}", e);
            NotificationOutcome::Ignored
        }
    };

    deps.notification_counter
        .add(1, &[KeyValue::new("outcome", outcome.as_str())]);

    // failures stay inside the handler so the trigger always completes
    Ok(outcome)
}

#[tracing::instrument("process order_created", skip(deps, order), fields(order.id = %order.order_id))]
async fn notify_recipient<R: UserRepository, N: PushNotifier>(
    deps: &HandlerDeps<R, N>,
    order: &OrderCreated,
) -> NotificationOutcome {
    let user = match deps.user_repo.find_user_by_email(&deps.recipient_email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::info!("No user found with the given email.");
            return NotificationOutcome::NoUserFound;
        }
        Err(e) => {
            tracing::error!("Error looking up user: {}", e);
            return NotificationOutcome::LookupFailed;
        }
    };

    let Some(token) = user.push_token() else {
        tracing::info!("FCM token not found for the user.");
        return NotificationOutcome::TokenMissing;
    };

    let order_id = deps.include_order_id.then_some(order.order_id.as_str());
    let message = NotificationMessage::order_received(token, order_id);

    match deps.notifier.send(&message).await {
        Ok(message_id) => {
            tracing::info!(message_id = %message_id, "Notification sent successfully!");
            NotificationOutcome::Sent { message_id }
        }
        Err(e) => {
            tracing::error!("Error sending notification: {}", e);
            NotificationOutcome::DeliveryFailed
        }
    }
}
