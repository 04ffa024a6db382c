//! The four boundary elements of the product matrix.

use std::fmt;

/// One of the four extreme entries of C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Collection order. Senders and the coordinator both walk it front to back.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Global `(row, col)` of this corner in an `n x n` matrix.
    ///
    /// Panics if `n` is zero; callers validate `n` first.
    pub fn position(self, n: usize) -> (usize, usize) {
        let last = n - 1;
        match self {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (0, last),
            Corner::BottomLeft => (last, 0),
            Corner::BottomRight => (last, last),
        }
    }

    /// Global row of this corner. Same precondition as [`Corner::position`].
    pub fn row(self, n: usize) -> usize {
        self.position(n).0
    }

    fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        };
        f.write_str(name)
    }
}

/// Corner values a single rank holds: `Some` only for corners whose row it owns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerSlots {
    slots: [Option<f64>; 4],
}

impl CornerSlots {
    /// Value held for `corner`, if this rank owns it
    pub fn get(&self, corner: Corner) -> Option<f64> {
        self.slots[corner.index()]
    }

    /// Record the value of `corner`
    pub fn set(&mut self, corner: Corner, value: f64) {
        self.slots[corner.index()] = Some(value);
    }

    /// Whether `corner` has a value
    pub fn is_present(&self, corner: Corner) -> bool {
        self.get(corner).is_some()
    }

    /// All four values, or `None` while any corner is still missing.
    pub fn complete(&self) -> Option<BoundaryCorners> {
        Some(BoundaryCorners {
            top_left: self.get(Corner::TopLeft)?,
            top_right: self.get(Corner::TopRight)?,
            bottom_left: self.get(Corner::BottomLeft)?,
            bottom_right: self.get(Corner::BottomRight)?,
        })
    }

    /// Corners currently held, in collection order.
    pub fn present(&self) -> impl Iterator<Item = Corner> + '_ {
        Corner::ALL
            .into_iter()
            .filter(move |c| self.is_present(*c))
    }
}

/// All four corners of C, as gathered on the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCorners {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_left: f64,
    pub bottom_right: f64,
}

impl BoundaryCorners {
    /// Analytical corners for A(i, k) = i + 1 and B(k, j) = 1 / (j + 1):
    /// C(i, j) = (i + 1) * n / (j + 1). `n` must be at least 1.
    pub fn expected(n: usize) -> Self {
        let value = |corner: Corner| {
            let (i, j) = corner.position(n);
            (i + 1) as f64 * n as f64 / (j + 1) as f64
        };
        BoundaryCorners {
            top_left: value(Corner::TopLeft),
            top_right: value(Corner::TopRight),
            bottom_left: value(Corner::BottomLeft),
            bottom_right: value(Corner::BottomRight),
        }
    }

    /// Value of `corner`
    pub fn get(&self, corner: Corner) -> f64 {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    /// Largest relative deviation from `reference` over the four corners.
    pub fn max_relative_error(&self, reference: &BoundaryCorners) -> f64 {
        Corner::ALL
            .into_iter()
            .map(|c| {
                let want = reference.get(c);
                let got = self.get(c);
                if want == 0.0 {
                    got.abs()
                } else {
                    ((got - want) / want).abs()
                }
            })
            .fold(0.0, f64::max)
    }
}
