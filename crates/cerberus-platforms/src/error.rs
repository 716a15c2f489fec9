use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("normalization error for {source_id}: {reason}")]
    Normalization { source_id: String, reason: String },

    #[error("invalid number in {field}: \"{value}\"")]
    InvalidNumber { field: String, value: String },
}
