//! Dense distance matrix with an infeasible-edge sentinel.

use crate::error::{GaError, Result};

/// Distance value marking an edge that cannot be traversed.
///
/// Matches the marker used by the city distance datasets the engine was
/// built for.
pub const INFEASIBLE_DISTANCE: f64 = 100_000.0;

/// A dense n×n distance matrix stored in row-major order.
///
/// Distances are non-negative. Any entry equal to [`sentinel`](Self::sentinel)
/// marks an infeasible edge; routes using it are penalized by the fitness
/// evaluator instead of being summed.
///
/// # Examples
///
/// ```
/// use u_genroute::distance::DistanceMatrix;
///
/// let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (3.0, 4.0), (0.0, 8.0)]);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
    sentinel: f64,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
            sentinel: INFEASIBLE_DISTANCE,
        }
    }

    /// Computes a Euclidean distance matrix from planar coordinates.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy) = (points[i].0 - points[j].0, points[i].1 - points[j].1);
                let d = (dx * dx + dy * dy).sqrt();
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Creates a distance matrix from explicit rows.
    ///
    /// Fails if the rows do not form a square matrix or any entry is
    /// negative or NaN.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(GaError::InvalidParameter(format!(
                    "distance matrix row {i} has {} entries, expected {size}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Self::from_data(size, data)
    }

    /// Creates a distance matrix from a flat row-major grid.
    pub fn from_data(size: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != size * size {
            return Err(GaError::InvalidParameter(format!(
                "distance data has {} entries, expected {}",
                data.len(),
                size * size
            )));
        }
        if let Some(pos) = data.iter().position(|d| d.is_nan() || *d < 0.0) {
            return Err(GaError::InvalidParameter(format!(
                "distance ({}, {}) must be a non-negative number",
                pos / size,
                pos % size
            )));
        }
        Ok(Self {
            data,
            size,
            sentinel: INFEASIBLE_DISTANCE,
        })
    }

    /// Replaces the value that marks infeasible edges.
    pub fn with_sentinel(mut self, sentinel: f64) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Returns the distance from node `from` to node `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from node `from` to node `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Marks the edge `from -> to` as infeasible.
    pub fn forbid(&mut self, from: usize, to: usize) {
        let sentinel = self.sentinel;
        self.set(from, to, sentinel);
    }

    /// Number of nodes in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The infeasible-edge marker.
    pub fn sentinel(&self) -> f64 {
        self.sentinel
    }

    /// Returns `true` if the edge `from -> to` carries the sentinel.
    pub fn is_infeasible(&self, from: usize, to: usize) -> bool {
        self.get(from, to) == self.sentinel
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}
