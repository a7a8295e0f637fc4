use thiserror::Error;

/// Failure reported by a [`RemoteClient`](crate::client::RemoteClient).
///
/// `NotFound` must stay distinguishable from transport failures: the
/// reconciler treats it as "the object is gone", not as an error.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("object not found: {object_type}/{id}")]
    NotFound { object_type: String, id: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("API error ({status}): {summary}")]
    Api { status: u16, summary: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
