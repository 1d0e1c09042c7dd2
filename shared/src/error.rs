use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("metadata server request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("metadata server returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("firestore request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("firestore returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed user document {name}: {reason}")]
    MalformedDocument { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("fcm request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("fcm rejected message with {status}: {body}")]
    Rejected { status: u16, body: String },
}
