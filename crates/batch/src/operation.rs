//! Operation and target traits

use crate::types::{Failure, Outcome};

/// Something an operation runs against
pub trait BatchTarget: Sync {
    /// Display name, used as the report key
    fn name(&self) -> &str;

    /// Where the target lives, used to disambiguate equal names
    fn location(&self) -> String;
}

/// An idempotent operation applied to every entry of every target
///
/// Implementations report per-pair errors through `Err(Failure)`; the
/// executor records them and moves on to the next entry.
pub trait Operation: Sync {
    type Target: BatchTarget;
    type Entry: Send + Sync;

    /// Short verb for logging (e.g. "install")
    fn name(&self) -> &'static str;

    /// Entries to process for one target
    ///
    /// An error here fails the whole target and is recorded as a single
    /// failure in its report.
    fn entries(&self, target: &Self::Target) -> Result<Vec<Self::Entry>, Failure>;

    /// Human-readable description of an entry
    fn describe(&self, entry: &Self::Entry) -> String;

    /// Apply the operation to one (target, entry) pair
    fn apply(&self, target: &Self::Target, entry: &Self::Entry) -> Result<Outcome, Failure>;
}
