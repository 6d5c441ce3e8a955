//! Script inventory: filename-pattern walk with hidden-path exclusion, plus
//! directory-derived project namespaces.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use scriptmap_core::relations::{LocationRow, ProjectRow};
use scriptmap_core::{AuditContext, AuditError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compile filename patterns into one matcher.
pub fn build_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p)?);
    }
    Ok(builder.build()?)
}

/// Walk the context root and collect absolute paths whose final segment
/// matches one of the patterns. Any path containing a hidden (dot-prefixed)
/// segment is excluded. Zero matches is terminal for the run and reported
/// with the pattern list attempted.
pub fn scan_scripts(ctx: &AuditContext, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let matcher = build_matcher(patterns)?;
    let mut found = Vec::new();
    let walker = WalkDir::new(&ctx.root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
    for entry in walker {
        // unreadable directory entries are skipped, not fatal
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.is_match(Path::new(entry.file_name())) {
            found.push(entry.into_path());
        }
    }
    if found.is_empty() {
        return Err(AuditError::EmptyInventory {
            root: ctx.root.clone(),
            patterns: patterns.join(","),
        }
        .into());
    }
    found.sort();
    Ok(found)
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Bare script name of a path (final segment).
pub fn script_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Namespace of a script: its containing directory with the scan-root prefix
/// replaced by the host identifier. Scripts in the same directory share the
/// string; sibling directories get distinct strings even when names collide.
pub fn namespace_for(ctx: &AuditContext, script: &Path) -> String {
    let dir = script.parent().unwrap_or_else(|| Path::new(""));
    let rel = dir.strip_prefix(&ctx.root).unwrap_or(dir);
    if rel.as_os_str().is_empty() {
        ctx.host.clone()
    } else {
        format!("{}|{}", ctx.host, rel.display())
    }
}

/// One ScriptLocation row per inventoried path.
pub fn location_rows(ctx: &AuditContext, paths: &[PathBuf]) -> Vec<LocationRow> {
    paths
        .iter()
        .map(|p| LocationRow {
            host: ctx.host.clone(),
            script: script_name(p),
            path: p.display().to_string(),
        })
        .collect()
}

/// One ProjectMembership row per inventoried path.
pub fn project_rows(ctx: &AuditContext, paths: &[PathBuf]) -> Vec<ProjectRow> {
    paths
        .iter()
        .map(|p| ProjectRow {
            host: ctx.host.clone(),
            script: script_name(p),
            namespace: namespace_for(ctx, p),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn patterns() -> Vec<String> {
        vec!["*.sh".to_string(), "*.pl".to_string()]
    }

    #[test]
    fn scan_finds_matching_files_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("jobs")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("jobs/nightly.sh"), "echo hi\n").unwrap();
        fs::write(dir.path().join("jobs/report.pl"), "print 1;\n").unwrap();
        fs::write(dir.path().join("jobs/readme.txt"), "no\n").unwrap();
        fs::write(dir.path().join(".git/hook.sh"), "echo no\n").unwrap();

        let ctx = AuditContext::new("hostA", dir.path());
        let found = scan_scripts(&ctx, &patterns()).unwrap();
        let names: Vec<String> = found.iter().map(|p| script_name(p)).collect();
        assert_eq!(names, vec!["nightly.sh", "report.pl"]);
    }

    #[test]
    fn empty_inventory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden/only.sh"), "echo\n").unwrap();

        let ctx = AuditContext::new("hostA", dir.path());
        let err = scan_scripts(&ctx, &patterns()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::EmptyInventory { .. })
        ));
    }

    #[test]
    fn namespace_replaces_root_with_host() {
        let ctx = AuditContext::new("H", "/home/x");
        let ns = namespace_for(&ctx, Path::new("/home/x/proj/a/b/f.sh"));
        assert_eq!(ns, "H|proj/a/b");
    }

    #[test]
    fn namespace_at_root_is_bare_host() {
        let ctx = AuditContext::new("H", "/home/x");
        let ns = namespace_for(&ctx, Path::new("/home/x/f.sh"));
        assert_eq!(ns, "H");
    }

    #[test]
    fn sibling_directories_get_distinct_namespaces() {
        let ctx = AuditContext::new("H", "/srv");
        let a = namespace_for(&ctx, Path::new("/srv/billing/run.sh"));
        let b = namespace_for(&ctx, Path::new("/srv/reports/run.sh"));
        assert_ne!(a, b);
    }
}
