use std::fmt;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, NnError>;

#[derive(Debug, Error)]
pub enum NnError {
    /// An operand's size or shape does not fit the operation.
    /// Always caused by caller-supplied data; never retried.
    #[error("dimension mismatch in {op}: expected {expected}, got {actual}")]
    DimensionMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more pipeline stages failed while streaming.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("failed to spawn pipeline worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Why a single stage stopped.
#[derive(Debug, Error)]
pub enum StageFailureCause {
    #[error("{0}")]
    Layer(Box<NnError>),

    #[error("layer panicked: {0}")]
    Panic(String),
}

/// A failure recorded by one pipeline stage.
#[derive(Debug)]
pub struct StageFailure {
    /// Zero-based index of the layer the stage was running.
    pub stage: usize,
    /// `Layer::name()` of that layer.
    pub layer: String,
    pub cause: StageFailureCause,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {} ({}): {}", self.stage, self.layer, self.cause)
    }
}

/// Every stage failure observed during one streaming run, ordered by stage.
#[derive(Debug)]
pub struct PipelineError {
    failures: Vec<StageFailure>,
}

impl PipelineError {
    pub fn new(mut failures: Vec<StageFailure>) -> PipelineError {
        failures.sort_by_key(|failure| failure.stage);
        PipelineError { failures }
    }

    pub fn failures(&self) -> &[StageFailure] {
        &self.failures
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pipeline stage(s) failed", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineError {}
