//! Row-block distribution of an N x N matrix over P ranks.
//!
//! The first `N % P` ranks own `N / P + 1` rows each and the rest own
//! `N / P`, so row counts across ranks never differ by more than one.

use crate::error::{Error, Result};

/// The rank that gathers results and reports.
pub const COORDINATOR: usize = 0;

/// Half-open interval `[offset, offset + count)` of global row indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowRange {
    pub offset: usize,
    pub count: usize,
}

impl RowRange {
    /// Create a range of `count` rows starting at `offset`
    pub fn new(offset: usize, count: usize) -> Self {
        RowRange { offset, count }
    }

    /// One past the last owned row.
    pub fn end(&self) -> usize {
        self.offset + self.count
    }

    /// Whether the range owns no rows
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether global `row` lies in the range
    pub fn contains(&self, row: usize) -> bool {
        row >= self.offset && row < self.end()
    }

    /// Global row indices in this range.
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.offset..self.end()
    }
}

/// Rank and group size of the calling process.
///
/// Passed explicitly to everything that behaves differently per rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankContext {
    pub rank: usize,
    pub size: usize,
}

impl RankContext {
    /// Validate `rank` against a group of `size` processes
    pub fn new(rank: usize, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidProcessCount(size));
        }
        if rank >= size {
            return Err(Error::InvalidRank { rank, size });
        }
        Ok(RankContext { rank, size })
    }

    /// Whether this rank gathers and reports results
    pub fn is_coordinator(&self) -> bool {
        self.rank == COORDINATOR
    }

    /// Rows of an `n`-row matrix owned by this rank.
    pub fn row_range(&self, n: usize) -> RowRange {
        row_block_partition(n, self.size, self.rank)
    }

    /// Whether this rank owns global `row` of an `n`-row matrix
    pub fn owns_row(&self, n: usize, row: usize) -> bool {
        owner_of_row(n, self.size, row) == self.rank
    }
}

/// Row range owned by `rank` when `n` rows are split across `p` ranks.
///
/// Returns an empty range at offset 0 when `p` is zero.
pub fn row_block_partition(n: usize, p: usize, rank: usize) -> RowRange {
    if p == 0 {
        return RowRange::default();
    }
    let base = n / p;
    let rem = n % p;
    if rank < rem {
        RowRange::new(rank * (base + 1), base + 1)
    } else {
        RowRange::new(rem * (base + 1) + (rank - rem) * base, base)
    }
}

/// Rank owning global `row`; the inverse of [`row_block_partition`].
///
/// Out-of-range rows and `p == 0` resolve to rank 0, so callers must check
/// `row < n` themselves.
pub fn owner_of_row(n: usize, p: usize, row: usize) -> usize {
    if row >= n || p == 0 {
        return 0;
    }
    let base = n / p;
    let rem = n % p;
    let threshold = (base + 1) * rem;
    if row < threshold {
        return row / (base + 1);
    }
    // base > 0 here: with base == 0 every row lies below the threshold.
    rem + (row - threshold) / base
}
