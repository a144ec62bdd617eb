use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No record stored under '{key}'.")]
    NotFound { key: String },
    #[error("Serialization error during {context}: {source}")]
    Serialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Deserialization error during {context}: {source}")]
    Deserialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("SQLite error during {context}: {source}")]
    Sqlite {
        context: &'static str,
        #[source]
        source: tokio_rusqlite::Error,
    },
}
