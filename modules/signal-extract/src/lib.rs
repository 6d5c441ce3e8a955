//! Heuristic signal extraction over script bodies. Precision is deliberately
//! sacrificed for recall: a name in a string literal matches the same as a
//! genuine invocation, and there is no "parse error", only "no match".

use regex::Regex;
use scriptmap_core::catalog::{
    LOCAL_FALLBACK, REMOTE_KEYWORDS, SCRIPT_EXTENSIONS, SKIP_DEPENDENCY_EXTENSIONS,
};
use scriptmap_core::relations::{ConnectionRow, DependencyRow};
use scriptmap_core::AuditContext;
use std::path::{Path, PathBuf};

const COMMENT_MARKER: char = '#';

/// Compiled matcher rules. Built once per run from the extension and keyword
/// catalogs; the vocabulary stays data.
pub struct SignalRules {
    dependency: Regex,
    email: Regex,
    url: Regex,
    dotted_quad: Regex,
    keyword: Regex,
    skip_dep_suffixes: Vec<String>,
}

impl SignalRules {
    pub fn new(
        extensions: &[&str],
        skip_dep_extensions: &[&str],
        keywords: &[&str],
    ) -> Result<Self, regex::Error> {
        // a script token: 2+ word chars after a non-word char, a dot, a
        // recognized extension, then whitespace
        let dependency =
            Regex::new(&format!(r"\W(\w{{2,}}\.(?:{}))\s", extensions.join("|")))?;
        let email = Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+")?;
        let url = Regex::new(r#"https?://[^\s"']+"#)?;
        let dotted_quad = Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b")?;
        let keyword = Regex::new(&format!(r"\b(?:{})\b", keywords.join("|")))?;
        Ok(SignalRules {
            dependency,
            email,
            url,
            dotted_quad,
            keyword,
            skip_dep_suffixes: skip_dep_extensions.iter().map(|e| format!(".{e}")).collect(),
        })
    }

    pub fn default_rules() -> Self {
        Self::new(SCRIPT_EXTENSIONS, SKIP_DEPENDENCY_EXTENSIONS, REMOTE_KEYWORDS)
            .expect("built-in rules")
    }

    /// Whether a script name belongs to the class excluded from dependency
    /// extraction. Connection extraction still runs for these files.
    pub fn skips_dependencies(&self, script: &str) -> bool {
        self.skip_dep_suffixes.iter().any(|s| script.ends_with(s.as_str()))
    }
}

/// Drop lines whose first non-whitespace character is the comment marker.
/// The survivors are rejoined newline-terminated so a token at end of line
/// still has trailing whitespace, and newline-prefixed so a token at column
/// zero still follows a non-word character.
fn active_text(content: &str) -> String {
    let mut text = String::with_capacity(content.len() + 1);
    text.push('\n');
    for line in content.lines() {
        if line.trim_start().starts_with(COMMENT_MARKER) {
            continue;
        }
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// Extract both signal classes from one script file. Unreadable files
/// (permissions, dangling links) are silently skipped.
pub fn extract_file(
    ctx: &AuditContext,
    rules: &SignalRules,
    path: &Path,
) -> (Vec<DependencyRow>, Vec<ConnectionRow>) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return (Vec::new(), Vec::new()),
    };
    let script = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let text = active_text(&content);

    let mut deps = Vec::new();
    if !rules.skips_dependencies(&script) {
        for cap in rules.dependency.captures_iter(&text) {
            deps.push(DependencyRow {
                host: ctx.host.clone(),
                script: script.clone(),
                target: cap[1].to_string(),
            });
        }
    }

    let mut conns = Vec::new();
    for line in text.lines() {
        let mut resources: Vec<String> = Vec::new();
        for m in rules.email.find_iter(line) {
            resources.push(m.as_str().to_string());
        }
        for m in rules.url.find_iter(line) {
            resources.push(m.as_str().to_string());
        }
        for m in rules.dotted_quad.find_iter(line) {
            resources.push(m.as_str().to_string());
        }
        // keyword with no address token on the line: still evidence of an
        // external interaction
        if resources.is_empty() && rules.keyword.is_match(line) {
            resources.push(LOCAL_FALLBACK.to_string());
        }
        for resource in resources {
            conns.push(ConnectionRow {
                host: ctx.host.clone(),
                script: script.clone(),
                resource,
            });
        }
    }
    (deps, conns)
}

/// Extract over a full inventory, concatenating the raw streams.
pub fn extract_all(
    ctx: &AuditContext,
    rules: &SignalRules,
    paths: &[PathBuf],
) -> (Vec<DependencyRow>, Vec<ConnectionRow>) {
    let mut deps = Vec::new();
    let mut conns = Vec::new();
    for path in paths {
        let (d, c) = extract_file(ctx, rules, path);
        deps.extend(d);
        conns.extend(c);
    }
    (deps, conns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn ctx() -> AuditContext {
        AuditContext::new("hostA", "/tmp")
    }

    fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn dependency_token_requires_extension_and_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_script(&dir, "main.sh", "run ./cleanup.sh now\nload stats.pl\n");
        let rules = SignalRules::default_rules();
        let (deps, _) = extract_file(&ctx(), &rules, &p);
        let targets: Vec<&str> = deps.iter().map(|d| d.target.as_str()).collect();
        assert_eq!(targets, vec!["cleanup.sh", "stats.pl"]);
    }

    #[test]
    fn comment_lines_are_dropped_before_matching() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_script(&dir, "main.sh", "# calls legacy.sh \n  # ssh backup\necho ok\n");
        let rules = SignalRules::default_rules();
        let (deps, conns) = extract_file(&ctx(), &rules, &p);
        assert!(deps.is_empty());
        assert!(conns.is_empty());
    }

    #[test]
    fn transfer_line_yields_remote_identity() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_script(&dir, "push.sh", "cp report.csv user@host.example.com:/data\n");
        let rules = SignalRules::default_rules();
        let (_, conns) = extract_file(&ctx(), &rules, &p);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].resource, "user@host.example.com");
    }

    #[test]
    fn bare_keyword_falls_back_to_localhost() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_script(&dir, "tunnel.sh", "ssh \n");
        let rules = SignalRules::default_rules();
        let (_, conns) = extract_file(&ctx(), &rules, &p);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].resource, "localhost");
    }

    #[test]
    fn keyword_with_address_records_the_address() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_script(&dir, "sync.sh", "rsync -a build/ 10.1.2.3:/srv/drop\n");
        let rules = SignalRules::default_rules();
        let (_, conns) = extract_file(&ctx(), &rules, &p);
        let resources: Vec<&str> = conns.iter().map(|c| c.resource.as_str()).collect();
        assert_eq!(resources, vec!["10.1.2.3"]);
    }

    #[test]
    fn urls_are_captured() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_script(&dir, "fetch.sh", "curl https://feeds.example.com/daily.xml\n");
        let rules = SignalRules::default_rules();
        let (_, conns) = extract_file(&ctx(), &rules, &p);
        assert!(conns.iter().any(|c| c.resource == "https://feeds.example.com/daily.xml"));
    }

    #[test]
    fn skip_class_suppresses_dependencies_but_not_connections() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_script(&dir, "dump.sql", "-- refs loader.sh \nselect 1; call loader.sh now\nmysql somedb\n");
        let rules = SignalRules::default_rules();
        let (deps, conns) = extract_file(&ctx(), &rules, &p);
        assert!(deps.is_empty());
        assert!(conns.iter().any(|c| c.resource == "localhost"));
    }

    #[test]
    fn unreadable_file_is_silently_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let rules = SignalRules::default_rules();
        let (deps, conns) = extract_file(&ctx(), &rules, &dir.path().join("missing.sh"));
        assert!(deps.is_empty());
        assert!(conns.is_empty());
    }

    #[test]
    fn token_at_line_edges_still_matches() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_script(&dir, "edge.sh", "first.sh\nthen more\n");
        let rules = SignalRules::default_rules();
        let (deps, _) = extract_file(&ctx(), &rules, &p);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].target, "first.sh");
    }
}
