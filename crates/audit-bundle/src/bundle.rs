//! Transport contract: a named artifact carrying one snapshot's flat files
//! between hosts. The mechanism is swappable; the workflow only sees the
//! contract.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub trait BundleTransport {
    /// Package flat files under a host-derived artifact name inside `spool`.
    /// Returns the artifact path.
    fn pack(&self, host: &str, files: &[PathBuf], spool: &Path) -> Result<PathBuf>;

    /// Materialize an artifact's files into `work`. Returns the file paths.
    fn unpack(&self, artifact: &Path, work: &Path) -> Result<Vec<PathBuf>>;

    /// Remove a consumed artifact.
    fn purge(&self, artifact: &Path) -> Result<()>;
}

/// Deterministic artifact name for one host's snapshot.
pub fn bundle_name(host: &str) -> String {
    format!("audit_{host}")
}

/// Directory-backed transport: the artifact is a host-named directory of
/// the flat files.
pub struct DirBundle;

impl BundleTransport for DirBundle {
    fn pack(&self, host: &str, files: &[PathBuf], spool: &Path) -> Result<PathBuf> {
        let artifact = spool.join(bundle_name(host));
        std::fs::create_dir_all(&artifact)?;
        for file in files {
            let name = file
                .file_name()
                .with_context(|| format!("not a file: {}", file.display()))?;
            std::fs::copy(file, artifact.join(name))?;
        }
        Ok(artifact)
    }

    fn unpack(&self, artifact: &Path, work: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(work)?;
        let mut files = Vec::new();
        for entry in std::fs::read_dir(artifact)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let dest = work.join(entry.file_name());
            std::fs::copy(entry.path(), &dest)?;
            files.push(dest);
        }
        files.sort();
        Ok(files)
    }

    fn purge(&self, artifact: &Path) -> Result<()> {
        std::fs::remove_dir_all(artifact)?;
        Ok(())
    }
}

/// Every bundle artifact present in the spool, sorted by name.
pub fn discover_bundles(spool: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if !spool.exists() {
        return Ok(found);
    }
    for entry in std::fs::read_dir(spool)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with("audit_") {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn pack_unpack_purge_moves_flat_files() {
        let out = tempfile::tempdir().unwrap();
        let spool = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let f = out.path().join("dependencies.psv");
        fs::write(&f, "h1|a.sh|b.sh\n").unwrap();

        let transport = DirBundle;
        let artifact = transport.pack("h1", &[f], spool.path()).unwrap();
        assert!(artifact.ends_with("audit_h1"));

        let files = transport.unpack(&artifact, &work.path().join("in")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "h1|a.sh|b.sh\n");

        transport.purge(&artifact).unwrap();
        assert!(!artifact.exists());
    }

    #[test]
    fn discover_lists_only_bundle_artifacts() {
        let spool = tempfile::tempdir().unwrap();
        fs::create_dir(spool.path().join("audit_h2")).unwrap();
        fs::create_dir(spool.path().join("audit_h1")).unwrap();
        fs::create_dir(spool.path().join("scratch")).unwrap();
        let found = discover_bundles(spool.path()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["audit_h1", "audit_h2"]);
    }
}
