//! Aggregation workflow: collected -> packaged -> (transported) -> unpacked
//! -> loaded -> purged. Loads are idempotent, so replay order only affects
//! the documented Schedule collapse.

use crate::bundle::{discover_bundles, BundleTransport};
use crate::flatfile::{read_snapshot, write_snapshot};
use anyhow::Result;
use scriptmap_core::relations::Snapshot;
use scriptmap_core::store::{LoadReport, RelationBatch, RelationalStore};
use std::path::{Path, PathBuf};

/// Lifecycle position of one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleState {
    Collected,
    Packaged,
    Unpacked,
    Loaded,
    Purged,
}

/// collected -> packaged: write the snapshot's flat files into `out_dir`,
/// pack them under the host's bundle name, then delete the loose flat files.
pub fn package_snapshot(
    transport: &dyn BundleTransport,
    host: &str,
    snap: &Snapshot,
    out_dir: &Path,
    spool: &Path,
) -> Result<PathBuf> {
    let files = write_snapshot(out_dir, snap)?;
    std::fs::create_dir_all(spool)?;
    let artifact = transport.pack(host, &files, spool)?;
    for file in &files {
        std::fs::remove_file(file)?;
    }
    Ok(artifact)
}

/// Load one snapshot relation by relation. Schema creation runs first so
/// every table exists even when its source is empty. A failed batch is
/// reported for its relation and the remaining relations still load.
pub fn load_snapshot<S: RelationalStore + ?Sized>(store: &S, snap: &Snapshot) -> Vec<LoadReport> {
    let mut reports = Vec::new();
    if let Err(e) = store.create_schema() {
        // without a schema nothing below can succeed; report per relation
        for batch in RelationBatch::from_snapshot(snap) {
            reports.push(LoadReport::failed(batch.relation(), e.to_string()));
        }
        return reports;
    }
    for batch in RelationBatch::from_snapshot(snap) {
        match store.upsert_batch(&batch) {
            Ok(rows) => reports.push(LoadReport::ok(batch.relation(), rows)),
            Err(e) => reports.push(LoadReport::failed(batch.relation(), e.to_string())),
        }
    }
    reports
}

/// unpacked -> loaded -> purged for one artifact. The bundle is purged only
/// after every relation loaded cleanly; a partial failure leaves it in the
/// spool for replay.
pub fn load_bundle<S: RelationalStore + ?Sized>(
    store: &S,
    transport: &dyn BundleTransport,
    artifact: &Path,
    work: &Path,
) -> Result<(Vec<LoadReport>, BundleState)> {
    let files = transport.unpack(artifact, work)?;
    let snap = read_snapshot(work)?;
    let reports = load_snapshot(store, &snap);
    if reports.iter().any(|r| r.error.is_some()) {
        return Ok((reports, BundleState::Loaded));
    }
    for file in files {
        std::fs::remove_file(file)?;
    }
    transport.purge(artifact)?;
    Ok((reports, BundleState::Purged))
}

/// Replay every bundle in the spool through the loader. Used by the full
/// rebuild after the store has been reset.
pub fn replay_bundles<S: RelationalStore + ?Sized>(
    store: &S,
    transport: &dyn BundleTransport,
    spool: &Path,
    work: &Path,
) -> Result<Vec<(PathBuf, Vec<LoadReport>)>> {
    let mut outcomes = Vec::new();
    for artifact in discover_bundles(spool)? {
        let (reports, _) = load_bundle(store, transport, &artifact, work)?;
        outcomes.push((artifact, reports));
    }
    Ok(outcomes)
}
