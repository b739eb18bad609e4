use thiserror::Error;

/// Failure kinds surfaced by the core services. Validation, conflict, and
/// auth failures carry a message fit for direct display; storage failures
/// are surfaced generically and the detail goes to the log.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(String),

    /// Free unlock budget is spent and no subscription is active. The
    /// caller is expected to present a subscription offer.
    #[error("free unlocks exhausted, subscription required")]
    SubscriptionRequired,

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Storage(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Storage(e.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
