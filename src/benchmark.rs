//! Timed distributed multiply: broadcast B, compute local rows, gather corners.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::collector::collect_corners;
use crate::comm::GroupComm;
use crate::config::BenchConfig;
use crate::corners::{BoundaryCorners, CornerSlots};
use crate::error::Result;
use crate::matrix::{check_memory_budget, compute_local_block, fill_operand, Matrix};
use crate::partition::{RankContext, COORDINATOR};

/// Relative error under which the gathered corners count as correct.
pub const VERIFY_TOLERANCE: f64 = 1e-9;

/// Outcome of a run, produced on the coordinator only.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    pub n: usize,
    pub iters: usize,
    pub ranks: usize,
    /// Mean wall time of one iteration.
    pub elapsed: Duration,
    pub corners: BoundaryCorners,
}

impl BenchReport {
    /// Floating-point operations in one N x N x N multiply.
    pub fn flops(&self) -> f64 {
        let n = self.n as f64;
        2.0 * n * n * n
    }

    /// Throughput in GFLOP/s, or 0 when no time was measured.
    pub fn gflops(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.flops() / (secs * 1e9)
        } else {
            0.0
        }
    }

    /// Mean iteration time in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Largest relative deviation of the corners from their analytical values
    pub fn relative_error(&self) -> f64 {
        self.corners
            .max_relative_error(&BoundaryCorners::expected(self.n))
    }

    /// Whether the corners match within [`VERIFY_TOLERANCE`]
    pub fn verified(&self) -> bool {
        self.relative_error() <= VERIFY_TOLERANCE
    }
}

pub struct Benchmark<'a, C: GroupComm> {
    comm: &'a C,
    ctx: RankContext,
    config: BenchConfig,
}

impl<'a, C: GroupComm> Benchmark<'a, C> {
    /// Validate `config` against the group. Nothing is communicated yet, so a
    /// failure here lets every rank exit without entering a collective.
    pub fn new(comm: &'a C, config: BenchConfig) -> Result<Self> {
        config.validate()?;
        let ctx = comm.context()?;
        Ok(Benchmark { comm, ctx, config })
    }

    /// Run the benchmark on this rank.
    pub fn run(&self) -> Result<Option<BenchReport>> {
        let BenchConfig {
            n,
            iters,
            memory_limit,
        } = self.config;
        let ctx = &self.ctx;

        if ctx.is_coordinator() {
            info!(n, iters, ranks = ctx.size, dist = "row-block", "benchmark start");
        }

        check_memory_budget(n, memory_limit)?;

        let mut b = Matrix::new(n, n);
        if ctx.is_coordinator() {
            fill_operand(&mut b);
        }
        self.comm.broadcast(COORDINATOR, &mut b.data)?;

        let range = ctx.row_range(n);
        debug!(
            rank = ctx.rank,
            offset = range.offset,
            count = range.count,
            "local row range"
        );
        let mut block = Matrix::new(range.count, n);
        let mut owned = CornerSlots::default();

        self.comm.barrier()?;
        let start = Instant::now();
        for _ in 0..iters {
            owned = compute_local_block(&b, range, &mut block)?;
            self.comm.barrier()?;
        }
        let elapsed = start.elapsed().div_f64(iters as f64);

        let corners = collect_corners(self.comm, ctx, n, &owned)?;
        let Some(corners) = corners else {
            return Ok(None);
        };

        let report = BenchReport {
            n,
            iters,
            ranks: ctx.size,
            elapsed,
            corners,
        };
        info!(
            c00 = corners.top_left,
            c0n = corners.top_right,
            cn0 = corners.bottom_left,
            cnn = corners.bottom_right,
            "boundary corners"
        );
        info!(
            elapsed_ms = report.elapsed_ms(),
            flops = report.flops(),
            gflops = report.gflops(),
            verified = report.verified(),
            "benchmark done"
        );
        Ok(Some(report))
    }
}
