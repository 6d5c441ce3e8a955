use anyhow::{anyhow, Result};
use audit_bundle::{load_snapshot, package_snapshot, replay_bundles, write_snapshot, DirBundle};
use clap::{Parser, Subcommand, ValueEnum};
use relstore_sqlite::{Db, RunMeta};
use scriptmap_core::catalog::DEFAULT_PATTERNS;
use scriptmap_core::relations::Snapshot;
use scriptmap_core::store::LoadReport;
use scriptmap_core::{AuditContext, AuditError};
use std::io::Write;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json, Jsonl }

mod config;

#[derive(Debug, Parser)]
#[command(name = "scriptmap", version, about = "Fleet script inventory and dependency audit")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./scriptmap.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Extract scheduled jobs from the host's job table
    Schedule {
        /// Saved job table to parse instead of `crontab -l`
        #[arg(long)]
        crontab: Option<PathBuf>,
        /// Host identity recorded in every row (default: hostname)
        #[arg(long)]
        host: Option<String>,
        /// Write rows as a pipe-delimited flat file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Full audit: scan, extract, normalize, write flat relation files
    Audit {
        /// Scan root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        host: Option<String>,
        /// Filename patterns, comma separated (default: built-in catalog)
        #[arg(long)]
        patterns: Option<String>,
        /// Directory for the flat relation files
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Saved job table to parse instead of `crontab -l`
        #[arg(long)]
        crontab: Option<PathBuf>,
        /// Package the flat files as a bundle in the spool directory
        #[arg(long, default_value_t = false)]
        pack: bool,
        /// Spool directory for bundles
        #[arg(long, value_name = "DIR")]
        spool: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Full audit plus load into the relational store
    Load {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        patterns: Option<String>,
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        crontab: Option<PathBuf>,
        /// SQLite database path
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Discard the store and replay every bundle in the spool
    Rebuild {
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,
        #[arg(long, value_name = "DIR")]
        spool: Option<PathBuf>,
        /// Skip the confirmation prompt
        #[arg(long, default_value_t = false)]
        yes: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the store schema
    Schema {
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,
    },
}

fn hostname_best_effort() -> String {
    std::process::Command::new("hostname")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".into())
}

fn parse_patterns(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect()
}

/// Job table content from a saved file or crontab(1). A missing table is a
/// note, not a failure: the audit proceeds with an empty Schedule relation.
fn read_job_table(crontab: Option<&Path>) -> Option<String> {
    match crontab {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("warning: cannot read {}: {}", path.display(), e);
                None
            }
        },
        None => match schedule_scan::read_crontab() {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("note: no job table ({e})");
                None
            }
        },
    }
}

/// scan -> extract -> normalize, with the independent schedule pass.
fn run_audit(ctx: &AuditContext, patterns: &[String], crontab: Option<&Path>) -> Result<Snapshot> {
    let paths = inventory::scan_scripts(ctx, patterns)?;
    let rules = signal_extract::SignalRules::default_rules();
    let (raw_deps, raw_conns) = signal_extract::extract_all(ctx, &rules, &paths);
    Ok(Snapshot {
        locations: inventory::location_rows(ctx, &paths),
        projects: inventory::project_rows(ctx, &paths),
        dependencies: normalize::normalize_dependencies(raw_deps),
        connections: normalize::normalize_connections(raw_conns),
        schedules: match read_job_table(crontab) {
            Some(table) => schedule_scan::parse_crontab(ctx, &table),
            None => Vec::new(),
        },
    })
}

fn print_snapshot_summary(ctx: &AuditContext, snap: &Snapshot, dest: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!(
                "{}: {} scripts, {} projects, {} dependencies, {} connections, {} schedules -> {}",
                ctx.host,
                snap.locations.len(),
                snap.projects.len(),
                snap.dependencies.len(),
                snap.connections.len(),
                snap.schedules.len(),
                dest,
            );
        }
        OutputFormat::Json | OutputFormat::Jsonl => {
            let obj = serde_json::json!({
                "host": ctx.host,
                "root": ctx.root,
                "locations": snap.locations.len(),
                "projects": snap.projects.len(),
                "dependencies": snap.dependencies.len(),
                "connections": snap.connections.len(),
                "schedules": snap.schedules.len(),
                "dest": dest,
            });
            println!("{}", obj);
        }
    }
}

fn print_reports(reports: &[LoadReport], format: OutputFormat) {
    for r in reports {
        match format {
            OutputFormat::Text => match &r.error {
                None => println!("{}: {} rows", r.relation.table(), r.rows),
                Some(e) => println!("{}: FAILED: {}", r.relation.table(), e),
            },
            OutputFormat::Json | OutputFormat::Jsonl => {
                let obj = serde_json::json!({
                    "relation": r.relation.table(),
                    "rows": r.rows,
                    "error": r.error,
                });
                println!("{}", obj);
            }
        }
    }
}

fn fail_if_any(reports: &[LoadReport]) -> Result<()> {
    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        return Err(anyhow!("{failed} relation(s) failed to load"));
    }
    Ok(())
}

fn confirm_rebuild(db: &Path) -> Result<()> {
    eprint!("rebuild discards the store at {}; type 'yes' to continue: ", db.display());
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    if line.trim() != "yes" {
        return Err(AuditError::RebuildDeclined.into());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded_cfg = config::load_config(cli.config.as_deref());
    let cfg_audit = loaded_cfg.as_ref().and_then(|c| c.audit.clone()).unwrap_or_default();
    let cfg_store = loaded_cfg.as_ref().and_then(|c| c.store.clone()).unwrap_or_default();
    match cli.command {
        Commands::Version => {
            println!("scriptmap {} (core {})", env!("CARGO_PKG_VERSION"), scriptmap_core::version());
        }
        Commands::Schedule { crontab, host, out, format } => {
            let host = host.or(cfg_audit.host).unwrap_or_else(hostname_best_effort);
            let ctx = AuditContext::new(host, ".");
            let crontab = crontab.or(cfg_audit.crontab);
            let table = read_job_table(crontab.as_deref()).unwrap_or_default();
            let rows = schedule_scan::parse_crontab(&ctx, &table);
            if let Some(path) = out {
                audit_bundle::write_rows(&path, &rows)?;
                println!("{} schedule rows -> {}", rows.len(), path.display());
                return Ok(());
            }
            for r in &rows {
                match format {
                    OutputFormat::Text => println!(
                        "{}|{}|{}|{}|{}|{}|{}",
                        r.host, r.script, r.minute, r.hour, r.day_of_month, r.month, r.day_of_week
                    ),
                    OutputFormat::Json | OutputFormat::Jsonl => {
                        println!("{}", serde_json::to_string(r)?);
                    }
                }
            }
        }
        Commands::Audit { root, host, patterns, out_dir, crontab, pack, spool, format } => {
            let root = root.or(cfg_audit.root).unwrap_or_else(|| PathBuf::from("."));
            let host = host.or(cfg_audit.host).unwrap_or_else(hostname_best_effort);
            let patterns = patterns
                .map(|s| parse_patterns(&s))
                .or(cfg_audit.patterns)
                .unwrap_or_else(default_patterns);
            let out_dir =
                out_dir.or(cfg_audit.out_dir).unwrap_or_else(|| PathBuf::from("audit_out"));
            let crontab = crontab.or(cfg_audit.crontab);
            // absolute paths in the flat output; keeps namespace stripping exact
            let root = root.canonicalize().unwrap_or(root);
            let ctx = AuditContext::new(host, root);
            let snap = run_audit(&ctx, &patterns, crontab.as_deref())?;
            if pack {
                let spool = spool.or(cfg_audit.spool).unwrap_or_else(|| PathBuf::from("bundles"));
                let artifact = package_snapshot(&DirBundle, &ctx.host, &snap, &out_dir, &spool)?;
                print_snapshot_summary(&ctx, &snap, &artifact.display().to_string(), format);
            } else {
                write_snapshot(&out_dir, &snap)?;
                print_snapshot_summary(&ctx, &snap, &out_dir.display().to_string(), format);
            }
        }
        Commands::Load { root, host, patterns, out_dir, crontab, db, format } => {
            let root = root.or(cfg_audit.root).unwrap_or_else(|| PathBuf::from("."));
            let host = host.or(cfg_audit.host).unwrap_or_else(hostname_best_effort);
            let patterns = patterns
                .map(|s| parse_patterns(&s))
                .or(cfg_audit.patterns)
                .unwrap_or_else(default_patterns);
            let out_dir =
                out_dir.or(cfg_audit.out_dir).unwrap_or_else(|| PathBuf::from("audit_out"));
            let crontab = crontab.or(cfg_audit.crontab);
            let db_path = db.or(cfg_store.db).unwrap_or_else(|| PathBuf::from("scriptmap.db"));
            let root = root.canonicalize().unwrap_or(root);
            let ctx = AuditContext::new(host, root);
            let snap = run_audit(&ctx, &patterns, crontab.as_deref())?;
            write_snapshot(&out_dir, &snap)?;

            let store = Db::open_or_create(&db_path)?;
            let meta = RunMeta {
                run_id: Uuid::new_v4(),
                host: ctx.host.clone(),
                started_at: now_rfc3339(),
            };
            let run_id = store.begin_run(&meta)?;
            let reports = load_snapshot(&store, &snap);
            let loaded: usize = reports.iter().filter(|r| r.error.is_none()).map(|r| r.rows).sum();
            store.finish_run(&run_id, &now_rfc3339(), loaded as i64)?;
            print_reports(&reports, format);
            fail_if_any(&reports)?;
        }
        Commands::Rebuild { db, spool, yes, format } => {
            let db_path = db.or(cfg_store.db).unwrap_or_else(|| PathBuf::from("scriptmap.db"));
            let spool = spool.or(cfg_audit.spool).unwrap_or_else(|| PathBuf::from("bundles"));
            if !yes {
                confirm_rebuild(&db_path)?;
            }
            let store = Db::open_or_create(&db_path)?;
            store.reset()?;
            let work = spool.join(".replay");
            let outcomes = replay_bundles(&store, &DirBundle, &spool, &work)?;
            let _ = std::fs::remove_dir_all(&work);
            if outcomes.is_empty() {
                println!("no bundles in {}", spool.display());
                return Ok(());
            }
            let mut all_reports = Vec::new();
            for (artifact, reports) in outcomes {
                match format {
                    OutputFormat::Text => println!("replayed {}", artifact.display()),
                    OutputFormat::Json | OutputFormat::Jsonl => {
                        println!("{}", serde_json::json!({ "replayed": artifact }));
                    }
                }
                print_reports(&reports, format);
                all_reports.extend(reports);
            }
            fail_if_any(&all_reports)?;
        }
        Commands::Schema { db } => {
            let db_path = db.or(cfg_store.db).unwrap_or_else(|| PathBuf::from("scriptmap.db"));
            let store = Db::open_or_create(&db_path)?;
            use scriptmap_core::store::RelationalStore;
            println!("{}", store.dump_schema()?);
        }
    }
    Ok(())
}
