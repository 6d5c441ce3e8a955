use crate::{Db, RunMeta};
use anyhow::Result;
use rusqlite::params;
use scriptmap_core::relations::{
    ConnectionRow, DependencyRow, LocationRow, ProjectRow, ScheduleRow,
};
use scriptmap_core::store::{RelationBatch, RelationalStore};
use uuid::Uuid;

impl Db {
    pub fn begin_run(&self, meta: &RunMeta) -> Result<Uuid> {
        self.conn.execute(
            "INSERT INTO runs(run_id, host, started_at) VALUES (?,?,?)",
            params![meta.run_id.to_string(), meta.host, meta.started_at],
        )?;
        Ok(meta.run_id)
    }

    pub fn finish_run(&self, run_id: &Uuid, finished_at: &str, row_count: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE runs SET finished_at=?, row_count=? WHERE run_id=?",
            params![finished_at, row_count, run_id.to_string()],
        )?;
        Ok(())
    }

    fn upsert_locations(&self, rows: &[LocationRow]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO script_locations(host,script,path) VALUES (?,?,?)
                 ON CONFLICT(host,script,path) DO NOTHING",
            )?;
            for r in rows {
                stmt.execute(params![r.host, r.script, r.path])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn upsert_projects(&self, rows: &[ProjectRow]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO project_members(host,script,namespace) VALUES (?,?,?)
                 ON CONFLICT(host,script,namespace) DO NOTHING",
            )?;
            for r in rows {
                stmt.execute(params![r.host, r.script, r.namespace])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn upsert_dependencies(&self, rows: &[DependencyRow]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO dependencies(host,script,target) VALUES (?,?,?)
                 ON CONFLICT(host,script,target) DO NOTHING",
            )?;
            for r in rows {
                stmt.execute(params![r.host, r.script, r.target])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn upsert_connections(&self, rows: &[ConnectionRow]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO connections(host,script,resource) VALUES (?,?,?)
                 ON CONFLICT(host,script,resource) DO NOTHING",
            )?;
            for r in rows {
                stmt.execute(params![r.host, r.script, r.resource])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Narrow key: a script scheduled more than once collapses to the
    /// last-loaded entry. Accepted lossy behavior, not a bug.
    fn upsert_schedules(&self, rows: &[ScheduleRow]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO schedules(host,script,minute,hour,day_of_month,month,day_of_week)
                 VALUES (?,?,?,?,?,?,?)
                 ON CONFLICT(host,script) DO UPDATE SET
                   minute=excluded.minute, hour=excluded.hour,
                   day_of_month=excluded.day_of_month, month=excluded.month,
                   day_of_week=excluded.day_of_week",
            )?;
            for r in rows {
                stmt.execute(params![
                    r.host,
                    r.script,
                    r.minute,
                    r.hour,
                    r.day_of_month,
                    r.month,
                    r.day_of_week
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

impl RelationalStore for Db {
    fn create_schema(&self) -> Result<()> {
        // open_or_create already migrated; re-check is cheap and keeps the
        // contract honest for stores handed in by callers
        let exists: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name='script_locations'",
            [],
            |r| r.get(0),
        )?;
        if exists == 0 {
            self.conn.execute_batch(crate::schema::MIG_0001_INIT)?;
        }
        Ok(())
    }

    fn upsert_batch(&self, batch: &RelationBatch) -> Result<usize> {
        match batch {
            RelationBatch::Locations(rows) => self.upsert_locations(rows),
            RelationBatch::Projects(rows) => self.upsert_projects(rows),
            RelationBatch::Dependencies(rows) => self.upsert_dependencies(rows),
            RelationBatch::Connections(rows) => self.upsert_connections(rows),
            RelationBatch::Schedules(rows) => self.upsert_schedules(rows),
        }
    }

    fn dump_schema(&self) -> Result<String> {
        self.schema_ddl()
    }
}
