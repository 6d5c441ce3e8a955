//! Extraction vocabulary, kept as data so the heuristics stay extensible.

/// Default filename patterns for the inventory scan: script extensions plus
/// build-definition filenames.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "*.sh", "*.ksh", "*.csh", "*.pl", "*.py", "*.awk", "*.sql", "[Mm]akefile",
];

/// Extensions recognized by the dependency token rule.
pub const SCRIPT_EXTENSIONS: &[&str] = &["sh", "ksh", "csh", "pl", "py", "awk", "sql"];

/// Extensions whose files skip dependency extraction entirely. Generated
/// exports reference names they never invoke.
pub const SKIP_DEPENDENCY_EXTENSIONS: &[&str] = &["sql"];

/// Remote-access and transfer vocabulary: remote shells, file transfer,
/// database clients, mail senders. A keyword alone is evidence of an
/// external interaction even when no address appears on the line.
pub const REMOTE_KEYWORDS: &[&str] = &[
    "ssh", "scp", "sftp", "rsync", "ftp", "sqlplus", "mysql", "psql", "isql",
    "sendmail", "mailx", "mail",
];

/// Resource recorded when a remote-access keyword matches with no address
/// token on the same line.
pub const LOCAL_FALLBACK: &str = "localhost";
