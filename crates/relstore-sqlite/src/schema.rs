pub const MIG_0001_INIT: &str = r#"
BEGIN;

CREATE TABLE runs (
  run_id       TEXT PRIMARY KEY,
  host         TEXT NOT NULL,
  started_at   TEXT NOT NULL,
  finished_at  TEXT,
  row_count    INTEGER DEFAULT 0
);

CREATE TABLE script_locations (
  host    TEXT NOT NULL,
  script  TEXT NOT NULL,
  path    TEXT NOT NULL,
  PRIMARY KEY (host, script, path)
);

CREATE TABLE project_members (
  host       TEXT NOT NULL,
  script     TEXT NOT NULL,
  namespace  TEXT NOT NULL,
  PRIMARY KEY (host, script, namespace)
);

CREATE TABLE dependencies (
  host    TEXT NOT NULL,
  script  TEXT NOT NULL,
  target  TEXT NOT NULL,
  PRIMARY KEY (host, script, target)
);

CREATE TABLE connections (
  host      TEXT NOT NULL,
  script    TEXT NOT NULL,
  resource  TEXT NOT NULL,
  PRIMARY KEY (host, script, resource)
);

CREATE TABLE schedules (
  host          TEXT NOT NULL,
  script        TEXT NOT NULL,
  minute        TEXT NOT NULL,
  hour          TEXT NOT NULL,
  day_of_month  TEXT NOT NULL,
  month         TEXT NOT NULL,
  day_of_week   TEXT NOT NULL,
  PRIMARY KEY (host, script)
);

CREATE INDEX idx_dependencies_target ON dependencies(target);
CREATE INDEX idx_connections_resource ON connections(resource);
CREATE INDEX idx_members_namespace ON project_members(namespace);

COMMIT;
"#;

/// Relation tables in drop order for a destructive rebuild.
pub const ALL_TABLES: &[&str] = &[
    "runs",
    "script_locations",
    "project_members",
    "dependencies",
    "connections",
    "schedules",
];
