pub mod adapters;
pub mod core;
pub mod credentials;
pub mod error;
pub mod fcm;
pub mod firebase;
pub mod observability;

pub use reqwest::Client;
