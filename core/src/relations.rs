//! Row types for the five normalized relations and the snapshot bundle of a
//! single run. Field order doubles as the deterministic sort order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationRow {
    pub host: String,
    pub script: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectRow {
    pub host: String,
    pub script: String,
    pub namespace: String,
}

/// Directed edge: `script` textually references `target`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyRow {
    pub host: String,
    pub script: String,
    pub target: String,
}

/// Directed edge to a non-script external resource (hostname, address,
/// mail identity, URL, or the localhost fallback).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub host: String,
    pub script: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub host: String,
    pub script: String,
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Locations,
    Projects,
    Dependencies,
    Connections,
    Schedules,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::Locations,
        Relation::Projects,
        Relation::Dependencies,
        Relation::Connections,
        Relation::Schedules,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Relation::Locations => "script_locations",
            Relation::Projects => "project_members",
            Relation::Dependencies => "dependencies",
            Relation::Connections => "connections",
            Relation::Schedules => "schedules",
        }
    }

    /// File name of this relation inside a flat snapshot or bundle.
    pub fn flat_file(self) -> &'static str {
        match self {
            Relation::Locations => "locations.psv",
            Relation::Projects => "projects.psv",
            Relation::Dependencies => "dependencies.psv",
            Relation::Connections => "connections.psv",
            Relation::Schedules => "schedules.psv",
        }
    }
}

/// All normalized rows produced by one host's run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub locations: Vec<LocationRow>,
    pub projects: Vec<ProjectRow>,
    pub dependencies: Vec<DependencyRow>,
    pub connections: Vec<ConnectionRow>,
    pub schedules: Vec<ScheduleRow>,
}

impl Snapshot {
    pub fn row_count(&self) -> usize {
        self.locations.len()
            + self.projects.len()
            + self.dependencies.len()
            + self.connections.len()
            + self.schedules.len()
    }
}
