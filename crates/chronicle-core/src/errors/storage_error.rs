/// Storage-layer errors for the backing audit store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("audit log corruption detected: {details}")]
    CorruptionDetected { details: String },
}
