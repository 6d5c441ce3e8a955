use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for an audit run. Unreadable script files are skipped at
/// the extraction site and never surface here.
#[derive(Debug, Error)]
pub enum AuditError {
    /// No files matched any inventory pattern. Terminal for the run.
    #[error("no scripts matched [{patterns}] under {root}")]
    EmptyInventory { root: PathBuf, patterns: String },

    /// One relation's upsert batch was rejected by the store.
    #[error("load failed for relation {relation}: {message}")]
    LoadFailure { relation: &'static str, message: String },

    /// Operator declined the destructive-rebuild confirmation.
    #[error("rebuild declined by operator")]
    RebuildDeclined,
}
