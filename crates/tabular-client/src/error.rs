use thiserror::Error;

/// Errors raised while talking to the upstream PostgREST instance.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("resource '{0}' not found")]
    NotFound(String),

    #[error("resource '{resource_id}' has been permanently deleted on {deleted_at}{dataset_note}")]
    Gone {
        resource_id: String,
        deleted_at: String,
        dataset_note: String,
    },

    #[error("upstream returned {status}")]
    Upstream { status: u16, body: serde_json::Value },

    #[error("upstream table '{table}' holds {total} rows, exceeding the export limit of {max}")]
    TooLarge { table: String, total: u64, max: u64 },

    #[error("connection to upstream failed: {0}")]
    Connection(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Connection(err.to_string())
    }
}

impl ClientError {
    pub fn status_code(&self) -> u16 {
        match self {
            ClientError::NotFound(_) => 404,
            ClientError::Gone { .. } => 410,
            ClientError::Upstream { status, .. } => *status,
            ClientError::TooLarge { .. } => 403,
            ClientError::Connection(_) => 503,
        }
    }
}
