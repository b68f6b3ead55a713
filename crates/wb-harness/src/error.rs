use std::fmt;

use wb_runtime::{ConsistencyError, RuntimeError};

/// Alias for `Result<T, HarnessError>`.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors raised by the harness itself.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// `create_world` was called while a world is still active.
    #[error("a world is already active; destroy it before creating another")]
    WorldAlreadyActive,

    /// An operation that needs an active world found none.
    #[error("no world is active")]
    NoActiveWorld,

    /// A failure reported by the runtime.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The world failed consistency validation.
    #[error("world failed consistency validation: {0}")]
    Consistency(#[from] ConsistencyError),
}

/// Aggregate of every failure collected during best-effort teardown.
///
/// Teardown keeps going past individual failures so the global state
/// restores always run; whatever failed along the way is carried here
/// with the originating conditions intact.
#[derive(Debug)]
pub struct TeardownError {
    failures: Vec<HarnessError>,
}

impl TeardownError {
    pub(crate) fn new(failures: Vec<HarnessError>) -> Self {
        Self { failures }
    }

    /// The collected failures, in the order teardown hit them.
    pub fn failures(&self) -> &[HarnessError] {
        &self.failures
    }
}

impl fmt::Display for TeardownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "teardown completed with {} failure(s):", self.failures.len())?;
        for failure in &self.failures {
            write!(f, " [{failure}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for TeardownError {}
