//! Dedup and self-reference policy for the raw extraction streams.

use scriptmap_core::relations::{ConnectionRow, DependencyRow};
use std::collections::BTreeSet;

/// Full-tuple dedup plus removal of edges where a script lists itself as the
/// target (exact, case-sensitive name match). Output order is deterministic:
/// (host, script, target) ascending.
pub fn normalize_dependencies(raw: Vec<DependencyRow>) -> Vec<DependencyRow> {
    raw.into_iter()
        .filter(|r| r.target != r.script)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Full-tuple dedup; self-reference is not applicable to external resources.
pub fn normalize_connections(raw: Vec<ConnectionRow>) -> Vec<ConnectionRow> {
    raw.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}
