//! Error types for the drop engine.
//!
//! Only chat-surface failures escape the core. Ledger, config, and admin
//! problems are turned into log lines or user-facing replies where they
//! happen.

use crate::surface::SurfaceError;

/// Errors returned by [`DropCoordinator`](crate::DropCoordinator) and
/// [`CommandHandler`](crate::CommandHandler).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The chat surface failed to carry out a request.
    #[error("chat surface error: {source}")]
    Surface {
        /// The underlying surface error.
        #[from]
        source: SurfaceError,
    },
}
