//! # Batch
//!
//! A small engine for applying an idempotent operation across many targets.
//!
//! ## Core Concepts
//!
//! - **Target**: Something an operation runs against (a vault, a directory)
//! - **Operation**: Lists entries per target and applies itself to each pair
//! - **Outcome**: The terminal state of a pair: applied, skipped or failed
//! - **BatchReport**: Per-target results, ordered by target name
//!
//! Every (target, entry) pair is processed exactly once. A failing pair is
//! recorded and the batch moves on, so one broken target never hides the
//! results of the others.
//!
//! ## Example
//!
//! ```ignore
//! use batch::{execute, ExecutionMode, NoProgress};
//!
//! let report = execute(&op, &targets, ExecutionMode::Sequential, &mut NoProgress)?;
//! for (name, result) in &report {
//!     println!("{name}: {} applied", result.succeeded.len());
//! }
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`Selector`]: Narrows a list of candidates, interactively or not

pub mod context;
pub mod error;
pub mod executor;
pub mod operation;
pub mod types;

// Re-export main types at crate root
pub use context::{NoProgress, ProgressCallback, SelectAll, SelectError, Selector, select_subset};
pub use error::{BatchError, Result};
pub use executor::execute;
pub use operation::{BatchTarget, Operation};
pub use types::{
    BatchReport, EntityRef, ExecutionMode, Failure, FailureKind, Outcome, PairState, TargetReport,
};
