use std::path::PathBuf;

/// Per-run context threaded explicitly through every stage: the identity of
/// the audited host and the root of the scanned tree.
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub host: String,
    pub root: PathBuf,
}

impl AuditContext {
    pub fn new(host: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        AuditContext { host: host.into(), root: root.into() }
    }
}
