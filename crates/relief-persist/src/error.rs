/// Errors that can occur while writing persisted state.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("store rejected key '{key}': {message}")]
    Store { key: String, message: String },

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}
