//! Capability contract for the long-lived relational store. Any SQL engine
//! that can express composite-key upserts satisfies it.

use anyhow::Result;

use crate::relations::{
    ConnectionRow, DependencyRow, LocationRow, ProjectRow, Relation, ScheduleRow, Snapshot,
};

pub trait RelationalStore {
    /// Create all relation tables. Idempotent; runs even when every source
    /// relation is empty so consumers can rely on table existence.
    fn create_schema(&self) -> Result<()>;

    /// Upsert one relation's rows. A primary-key collision replaces the
    /// existing row's non-key columns, so replaying a snapshot is idempotent.
    /// Returns the number of rows written.
    fn upsert_batch(&self, batch: &RelationBatch) -> Result<usize>;

    /// Render the store's DDL for introspection.
    fn dump_schema(&self) -> Result<String>;
}

/// One relation's rows, typed for dispatch to the store.
#[derive(Debug, Clone)]
pub enum RelationBatch {
    Locations(Vec<LocationRow>),
    Projects(Vec<ProjectRow>),
    Dependencies(Vec<DependencyRow>),
    Connections(Vec<ConnectionRow>),
    Schedules(Vec<ScheduleRow>),
}

impl RelationBatch {
    pub fn relation(&self) -> Relation {
        match self {
            RelationBatch::Locations(_) => Relation::Locations,
            RelationBatch::Projects(_) => Relation::Projects,
            RelationBatch::Dependencies(_) => Relation::Dependencies,
            RelationBatch::Connections(_) => Relation::Connections,
            RelationBatch::Schedules(_) => Relation::Schedules,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RelationBatch::Locations(rows) => rows.len(),
            RelationBatch::Projects(rows) => rows.len(),
            RelationBatch::Dependencies(rows) => rows.len(),
            RelationBatch::Connections(rows) => rows.len(),
            RelationBatch::Schedules(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split a snapshot into per-relation batches in schema order.
    pub fn from_snapshot(snap: &Snapshot) -> Vec<RelationBatch> {
        vec![
            RelationBatch::Locations(snap.locations.clone()),
            RelationBatch::Projects(snap.projects.clone()),
            RelationBatch::Dependencies(snap.dependencies.clone()),
            RelationBatch::Connections(snap.connections.clone()),
            RelationBatch::Schedules(snap.schedules.clone()),
        ]
    }
}

/// Outcome of loading one relation. A failed batch is reported here and the
/// run continues with the remaining relations.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub relation: Relation,
    pub rows: usize,
    pub error: Option<String>,
}

impl LoadReport {
    pub fn ok(relation: Relation, rows: usize) -> Self {
        LoadReport { relation, rows, error: None }
    }

    pub fn failed(relation: Relation, message: String) -> Self {
        LoadReport { relation, rows: 0, error: Some(message) }
    }
}
