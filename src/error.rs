//! Error types for the benchmark.

use thiserror::Error;

use crate::corners::Corner;

/// How a failure should be handled by the process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller misuse, detected before any collective is entered.
    Config,
    /// The operand matrix would not fit the memory budget.
    ResourceExhausted,
    /// A collective or point-to-point operation failed. Fatal for the group.
    Communication,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid N: {0} (must be at least 1)")]
    InvalidDimension(usize),

    #[error("invalid iteration count: {0} (must be at least 1)")]
    InvalidIterations(usize),

    #[error("invalid process count: {0} (must be at least 1)")]
    InvalidProcessCount(usize),

    #[error("rank {rank} out of range for a group of {size}")]
    InvalidRank { rank: usize, size: usize },

    #[error("output block is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    BlockShape {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("N={n} needs {bytes} bytes for B, over the {limit}-byte memory guard")]
    MemoryBudget { n: usize, bytes: u128, limit: u64 },

    #[error("rows [{offset}, {}) fall outside an {n}-row matrix", offset + count)]
    RowsOutOfBounds { offset: usize, count: usize, n: usize },

    #[error("N={n} gives {elements} elements for B, more than one broadcast can carry")]
    MessageTooLarge { n: usize, elements: u128 },

    #[error("communication failure: {0}")]
    Communication(String),

    #[error("rank {rank} owns {corner} but never computed it")]
    MissingCorner { corner: Corner, rank: usize },

    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    /// Classify the error by how the group must react to it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidDimension(_)
            | Error::InvalidIterations(_)
            | Error::InvalidProcessCount(_)
            | Error::InvalidRank { .. }
            | Error::BlockShape { .. }
            | Error::RowsOutOfBounds { .. }
            | Error::Logging(_) => ErrorKind::Config,
            Error::MemoryBudget { .. } | Error::MessageTooLarge { .. } => {
                ErrorKind::ResourceExhausted
            }
            Error::Communication(_) | Error::MissingCorner { .. } => ErrorKind::Communication,
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Config => 1,
            ErrorKind::ResourceExhausted => 2,
            ErrorKind::Communication => 3,
        }
    }

    /// Whether the whole group has to be torn down rather than exiting rank by rank.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Communication
    }
}

pub type Result<T> = std::result::Result<T, Error>;
