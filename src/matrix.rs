use crate::corners::{Corner, CornerSlots};
use crate::error::{Error, Result};
use crate::partition::RowRange;

/// Default cap on the operand matrix footprint: 1 GiB.
pub const DEFAULT_MEMORY_LIMIT: u64 = 1 << 30;

/// Largest element count one MPI message can carry (an `i32` count).
pub const MAX_MESSAGE_ELEMENTS: u128 = i32::MAX as u128;

const F64_BYTES: u128 = std::mem::size_of::<f64>() as u128;

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub data: Vec<f64>,
    pub rows: usize,
    pub cols: usize,
}

impl Matrix {
    /// Create a zero-filled matrix with the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from row-major data
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }
        Some(Matrix { data, rows, cols })
    }

    /// The `n x n` benchmark operand B, with B(k, j) = 1 / (j + 1).
    pub fn operand(n: usize) -> Self {
        let mut b = Matrix::new(n, n);
        fill_operand(&mut b);
        b
    }

    /// Get a value at a specific position
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// Get a row as a slice
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.data[start..start + self.cols])
    }
}

/// Overwrite `b` with B(k, j) = 1 / (j + 1). Every row is identical.
pub fn fill_operand(b: &mut Matrix) {
    let cols = b.cols;
    if cols == 0 {
        return;
    }
    for row in b.data.chunks_exact_mut(cols) {
        for (j, value) in row.iter_mut().enumerate() {
            *value = 1.0 / (j + 1) as f64;
        }
    }
}

/// Elements in an `n x n` operand, saturating at `u128::MAX`.
pub fn operand_elements(n: usize) -> u128 {
    let n = n as u128;
    n.saturating_mul(n)
}

/// Bytes needed to hold an `n x n` operand of `f64`, saturating at `u128::MAX`.
pub fn operand_bytes(n: usize) -> u128 {
    operand_elements(n).saturating_mul(F64_BYTES)
}

/// True when the operand for `n` would need more than `limit_bytes`.
///
/// Depends only on `n`, so every rank reaches the same verdict on its own.
pub fn exceeds_memory_budget(n: usize, limit_bytes: u64) -> bool {
    operand_bytes(n) > limit_bytes as u128
}

/// True when the operand for `n` cannot be broadcast as a single message.
pub fn exceeds_message_limit(n: usize) -> bool {
    operand_elements(n) > MAX_MESSAGE_ELEMENTS
}

/// Reject `n` before anything is allocated or communicated, whatever the
/// configured byte budget.
pub fn check_memory_budget(n: usize, limit_bytes: u64) -> Result<()> {
    if exceeds_memory_budget(n, limit_bytes) {
        return Err(Error::MemoryBudget {
            n,
            bytes: operand_bytes(n),
            limit: limit_bytes,
        });
    }
    if exceeds_message_limit(n) {
        return Err(Error::MessageTooLarge {
            n,
            elements: operand_elements(n),
        });
    }
    Ok(())
}

/// Compute rows `range` of C = A * B into `out`, where A(i, k) = i + 1 is
/// never stored.
///
/// `out` must be `range.count x b.cols`; row `r` of `out` holds global row
/// `range.offset + r`. The full inner product is evaluated even though A's
/// rows are constant, so the work matches the 2N^3 FLOPs that get reported.
///
/// Returns the corners of C that fall inside `range`.
pub fn compute_local_block(b: &Matrix, range: RowRange, out: &mut Matrix) -> Result<CornerSlots> {
    let n = b.cols;
    if b.rows != n || n == 0 {
        return Err(Error::InvalidDimension(n));
    }
    if out.rows != range.count || out.cols != n {
        return Err(Error::BlockShape {
            rows: out.rows,
            cols: out.cols,
            expected_rows: range.count,
            expected_cols: n,
        });
    }
    if range.end() > n {
        return Err(Error::RowsOutOfBounds {
            offset: range.offset,
            count: range.count,
            n,
        });
    }

    for (local, i_glob) in range.rows().enumerate() {
        let a_ik = (i_glob + 1) as f64;
        let out_row = &mut out.data[local * n..(local + 1) * n];
        for (j, c_ij) in out_row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a_ik * b.data[k * n + j];
            }
            *c_ij = sum;
        }
    }

    let mut corners = CornerSlots::default();
    for corner in Corner::ALL {
        let (row, col) = corner.position(n);
        if range.contains(row) {
            corners.set(corner, out.data[(row - range.offset) * n + col]);
        }
    }
    Ok(corners)
}
