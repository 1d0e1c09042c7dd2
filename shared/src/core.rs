use crate::error::{DeliveryError, RepositoryError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[cfg(any(test, feature = "mocks"))]
use mockall::automock;

pub const ORDER_RECEIVED_TITLE: &str = "New Order Received!";
pub const ORDER_PLACED_BODY: &str = "Order has been placed.";

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait UserRepository: Debug {
    /// Returns the first user whose email matches, if any.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait PushNotifier: Debug {
    /// Sends one message and returns the message name assigned by the delivery service.
    async fn send(&self, message: &NotificationMessage) -> Result<String, DeliveryError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub email: String,
    pub fcm_token: Option<String>,
}

impl User {
    pub fn new(email: String, fcm_token: Option<String>) -> Self {
        Self { email, fcm_token }
    }

    /// The device token, or `None` when it is absent or empty.
    pub fn push_token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationMessage {
    pub token: String,
    pub notification: Notification,
}

impl NotificationMessage {
    pub fn new(token: String, title: String, body: String) -> Self {
        Self {
            token,
            notification: Notification { title, body },
        }
    }

    pub fn order_received(token: &str, order_id: Option<&str>) -> Self {
        let body = match order_id {
            Some(order_id) => format!("Order {} has been placed.", order_id),
            None => ORDER_PLACED_BODY.to_string(),
        };
        Self::new(token.to_string(), ORDER_RECEIVED_TITLE.to_string(), body)
    }
}
