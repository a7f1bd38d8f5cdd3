//! Error types for batch execution

use thiserror::Error;

/// Precondition failures that stop a batch before it starts
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("No targets to run against")]
    NoTargets,

    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, BatchError>;
