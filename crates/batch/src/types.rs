//! Core types for batch operations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::time::Duration;

/// Reference to an entity touched by an operation
///
/// `source` is whatever locates the entity for the operation (a repository
/// for installs, an identifier for removals).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub source: String,
    pub version: String,
}

impl EntityRef {
    pub fn new(source: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.source)
        } else {
            write!(f, "{}@{}", self.source, self.version)
        }
    }
}

/// Why a pair failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Entry is unknown to the source it is resolved against
    NotFound,
    /// Remote side is throttling requests
    RateLimited,
    /// Transport failure talking to a remote
    Network,
    /// Local filesystem failure
    Io,
    /// Anything else
    Other,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::RateLimited => "rate limited",
            Self::Network => "network",
            Self::Io => "io",
            Self::Other => "error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A failed (target, entry) pair with the captured error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(flatten)]
    pub entity: EntityRef,
    pub kind: FailureKind,
    pub error: String,
}

impl Failure {
    pub fn new(entity: EntityRef, kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            entity,
            kind,
            error: error.into(),
        }
    }
}

/// State of a single (target, entry) pair
///
/// Every pair starts `Pending` and ends in exactly one of the other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Pending,
    Skipped,
    Applied,
    Failed,
}

/// Terminal outcome of a (target, entry) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The side effect was performed (installed, removed, executed)
    Applied(EntityRef),
    /// Nothing to do, the target already matches
    Skipped { entity: EntityRef, reason: String },
    /// The side effect failed
    Failed(Failure),
}

impl Outcome {
    pub fn skipped(entity: EntityRef, reason: impl Into<String>) -> Self {
        Self::Skipped {
            entity,
            reason: reason.into(),
        }
    }

    pub fn state(&self) -> PairState {
        match self {
            Self::Applied(_) => PairState::Applied,
            Self::Skipped { .. } => PairState::Skipped,
            Self::Failed(_) => PairState::Failed,
        }
    }

    pub fn entity(&self) -> &EntityRef {
        match self {
            Self::Applied(entity) | Self::Skipped { entity, .. } => entity,
            Self::Failed(failure) => &failure.entity,
        }
    }
}

/// Aggregated outcomes for one target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub succeeded: Vec<EntityRef>,
    pub skipped: usize,
    pub failed: Vec<Failure>,
    /// Wall time spent on this target
    #[serde(skip)]
    pub elapsed: Duration,
}

impl TargetReport {
    /// Fold an outcome into the report
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Applied(entity) => self.succeeded.push(entity),
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed(failure) => self.failed.push(failure),
        }
    }

    /// Number of pairs that reached a terminal state
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped + self.failed.len()
    }

    /// Check if no pair failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-target reports keyed by target name, ordered by name
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct BatchReport {
    targets: BTreeMap<String, TargetReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target's report
    ///
    /// Targets are keyed by name. A second target with the same name is keyed
    /// `name (location)` so neither report is lost.
    pub fn insert(&mut self, name: &str, location: &str, report: TargetReport) {
        let key = if self.targets.contains_key(name) {
            format!("{name} ({location})")
        } else {
            name.to_string()
        };
        self.targets.insert(key, report);
    }

    pub fn get(&self, name: &str) -> Option<&TargetReport> {
        self.targets.get(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, TargetReport> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn succeeded_count(&self) -> usize {
        self.targets.values().map(|r| r.succeeded.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.targets.values().map(|r| r.skipped).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.targets.values().map(|r| r.failed.len()).sum()
    }

    /// Check if every target finished without failures
    pub fn is_success(&self) -> bool {
        self.targets.values().all(TargetReport::is_success)
    }
}

impl<'a> IntoIterator for &'a BatchReport {
    type Item = (&'a String, &'a TargetReport);
    type IntoIter = btree_map::Iter<'a, String, TargetReport>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

/// How targets are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One target at a time, in the order given
    #[default]
    Sequential,
    /// Up to `jobs` targets at once; entries within a target stay sequential
    Parallel { jobs: usize },
}
