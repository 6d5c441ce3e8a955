//! Pipe-delimited flat relation files: one tuple per line, one file per
//! relation, UTF-8.

use anyhow::Result;
use scriptmap_core::relations::{Relation, Snapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .from_path(path)?;
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .from_path(path)?;
    let mut rows = Vec::new();
    for rec in rdr.deserialize() {
        rows.push(rec?);
    }
    Ok(rows)
}

/// Materialize a snapshot as one flat file per relation inside `dir`.
/// Returns the paths written, in schema order.
pub fn write_snapshot(dir: &Path, snap: &Snapshot) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(Relation::ALL.len());
    for rel in Relation::ALL {
        let path = dir.join(rel.flat_file());
        match rel {
            Relation::Locations => write_rows(&path, &snap.locations)?,
            Relation::Projects => write_rows(&path, &snap.projects)?,
            Relation::Dependencies => write_rows(&path, &snap.dependencies)?,
            Relation::Connections => write_rows(&path, &snap.connections)?,
            Relation::Schedules => write_rows(&path, &snap.schedules)?,
        }
        written.push(path);
    }
    Ok(written)
}

/// Read a snapshot back from a directory of flat files. A missing file
/// reads as an empty relation so partial bundles still load.
pub fn read_snapshot(dir: &Path) -> Result<Snapshot> {
    let mut snap = Snapshot::default();
    for rel in Relation::ALL {
        let path = dir.join(rel.flat_file());
        if !path.exists() {
            continue;
        }
        match rel {
            Relation::Locations => snap.locations = read_rows(&path)?,
            Relation::Projects => snap.projects = read_rows(&path)?,
            Relation::Dependencies => snap.dependencies = read_rows(&path)?,
            Relation::Connections => snap.connections = read_rows(&path)?,
            Relation::Schedules => snap.schedules = read_rows(&path)?,
        }
    }
    Ok(snap)
}
