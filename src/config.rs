//! Command-line configuration.

use clap::Parser;

use crate::error::{Error, Result};
use crate::matrix::DEFAULT_MEMORY_LIMIT;

#[derive(Debug, Parser)]
#[command(name = "rowblock-gemm")]
#[command(about = "Row-block distributed dense matrix multiply benchmark")]
#[command(version)]
pub struct Cli {
    /// Dimension of the square matrices.
    pub n: usize,

    /// Number of timed iterations.
    #[arg(long, default_value_t = 1)]
    pub iters: usize,

    /// Largest operand matrix footprint allowed, in bytes.
    #[arg(long, default_value_t = DEFAULT_MEMORY_LIMIT)]
    pub memory_limit: u64,

    /// Log level for the coordinator (overridden by RUST_LOG).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Validated run parameters from the parsed flags
    pub fn bench_config(&self) -> Result<BenchConfig> {
        let config = BenchConfig {
            n: self.n,
            iters: self.iters,
            memory_limit: self.memory_limit,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parameters of one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    pub n: usize,
    pub iters: usize,
    pub memory_limit: u64,
}

impl BenchConfig {
    /// Config with the default memory guard
    pub fn new(n: usize, iters: usize) -> Self {
        BenchConfig {
            n,
            iters,
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }

    /// Override the memory guard, in bytes
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit = bytes;
        self
    }

    /// Reject N or iteration counts below 1
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::InvalidDimension(self.n));
        }
        if self.iters == 0 {
            return Err(Error::InvalidIterations(self.iters));
        }
        Ok(())
    }
}
