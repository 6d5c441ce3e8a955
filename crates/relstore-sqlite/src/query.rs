use crate::Db;
use anyhow::Result;
use rusqlite::params;
use scriptmap_core::relations::Relation;

impl Db {
    /// Row count of one relation table.
    pub fn count(&self, relation: Relation) -> Result<i64> {
        let n: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", relation.table()),
            [],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    /// Stored schedule fields for one (host, script), if present.
    pub fn schedule_fields(&self, host: &str, script: &str) -> Result<Option<Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT minute, hour, day_of_month, month, day_of_week
             FROM schedules WHERE host=? AND script=?",
        )?;
        let mut rows = stmt.query(params![host, script])?;
        match rows.next()? {
            Some(row) => {
                let mut fields = Vec::with_capacity(5);
                for i in 0..5 {
                    fields.push(row.get::<_, String>(i)?);
                }
                Ok(Some(fields))
            }
            None => Ok(None),
        }
    }

    /// DDL of every user table and index, for introspection.
    pub fn schema_ddl(&self) -> Result<String> {
        let mut stmt = self.conn.prepare(
            "SELECT sql FROM sqlite_master
             WHERE sql IS NOT NULL AND name NOT LIKE 'sqlite_%'
             ORDER BY type DESC, name",
        )?;
        let ddl: Vec<String> = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        Ok(ddl.join(";\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptmap_core::relations::{DependencyRow, ScheduleRow};
    use scriptmap_core::store::{RelationBatch, RelationalStore};

    fn test_db(dir: &tempfile::TempDir) -> Db {
        Db::open_or_create(dir.path().join("audit.db")).unwrap()
    }

    fn dep(script: &str, target: &str) -> DependencyRow {
        DependencyRow { host: "h1".into(), script: script.into(), target: target.into() }
    }

    fn sched(script: &str, minute: &str, hour: &str) -> ScheduleRow {
        ScheduleRow {
            host: "h1".into(),
            script: script.into(),
            minute: minute.into(),
            hour: hour.into(),
            day_of_month: "*".into(),
            month: "*".into(),
            day_of_week: "*".into(),
        }
    }

    #[test]
    fn schema_exists_even_with_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);
        db.create_schema().unwrap();
        for rel in Relation::ALL {
            assert_eq!(db.count(rel).unwrap(), 0);
        }
    }

    #[test]
    fn reloading_the_same_batch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);
        let batch = RelationBatch::Dependencies(vec![dep("a.sh", "b.sh"), dep("a.sh", "c.sh")]);
        db.upsert_batch(&batch).unwrap();
        db.upsert_batch(&batch).unwrap();
        assert_eq!(db.count(Relation::Dependencies).unwrap(), 2);
    }

    #[test]
    fn schedule_collapses_to_last_loaded_entry() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);
        db.upsert_batch(&RelationBatch::Schedules(vec![sched("job.sh", "00", "01")])).unwrap();
        db.upsert_batch(&RelationBatch::Schedules(vec![sched("job.sh", "30", "23")])).unwrap();
        assert_eq!(db.count(Relation::Schedules).unwrap(), 1);
        let fields = db.schedule_fields("h1", "job.sh").unwrap().unwrap();
        assert_eq!(fields, vec!["30", "23", "*", "*", "*"]);
    }

    #[test]
    fn composite_key_admits_distinct_details() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);
        let batch = RelationBatch::Dependencies(vec![dep("a.sh", "b.sh"), dep("a.sh", "c.sh")]);
        db.upsert_batch(&batch).unwrap();
        assert_eq!(db.count(Relation::Dependencies).unwrap(), 2);
    }

    #[test]
    fn reset_discards_rows_and_recreates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);
        db.upsert_batch(&RelationBatch::Dependencies(vec![dep("a.sh", "b.sh")])).unwrap();
        db.reset().unwrap();
        assert_eq!(db.count(Relation::Dependencies).unwrap(), 0);
    }

    #[test]
    fn schema_dump_names_every_relation() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);
        let ddl = db.dump_schema().unwrap();
        for rel in Relation::ALL {
            assert!(ddl.contains(rel.table()), "missing {}", rel.table());
        }
    }
}
