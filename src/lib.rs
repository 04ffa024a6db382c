pub mod benchmark;
pub mod collector;
pub mod comm;
pub mod config;
pub mod corners;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod partition;

pub use benchmark::{BenchReport, Benchmark};
pub use comm::GroupComm;
pub use config::BenchConfig;
pub use corners::{BoundaryCorners, Corner, CornerSlots};
pub use error::{Error, ErrorKind, Result};
pub use matrix::Matrix;
pub use partition::{owner_of_row, row_block_partition, RankContext, RowRange};
