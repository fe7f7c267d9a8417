//! Error types for the runner.
//!
//! Only startup and I/O on the bridge streams are fatal. Malformed inbound
//! lines and per-message engine failures are logged and skipped.

/// Errors that stop the runner.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Reading the inbound stream or writing the outbound stream failed.
    #[error("bridge I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An outbound frame could not be serialized.
    #[error("bridge encode error: {source}")]
    Encode {
        /// The underlying serializer error.
        #[from]
        source: serde_json::Error,
    },

    /// A global tracing subscriber was already installed.
    #[error("logging init error: {source}")]
    Logging {
        /// The underlying subscriber error.
        #[from]
        source: tracing_subscriber::util::TryInitError,
    },

    /// The outbound writer task ended abnormally.
    #[error("outbound writer failed: {source}")]
    Writer {
        /// The join error from the writer task.
        #[from]
        source: tokio::task::JoinError,
    },
}
