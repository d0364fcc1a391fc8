use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("partition {partition}: starting permutation has length {actual}, expected {expected}")]
    PartitionMismatch {
        partition: usize,
        expected: usize,
        actual: usize,
    },
    #[error("partition {partition} failed: {message}")]
    WorkerFailed { partition: usize, message: String },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    pub fn worker_failed(partition: usize, source: Error) -> Self {
        Self::WorkerFailed {
            partition,
            message: source.to_string(),
        }
    }
}
