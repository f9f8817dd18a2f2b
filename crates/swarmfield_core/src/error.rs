//! Error types for swarmfield_core.
//!
//! Kernel operations themselves are total. These errors only surface from
//! checked constructors, where malformed grids or cell sizes are rejected
//! before any stencil runs.

use thiserror::Error;

/// Construction-time validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Buffer length does not match `cols * rows`
    #[error("field length {len} does not match {cols}x{rows}")]
    DimensionMismatch { cols: usize, rows: usize, len: usize },

    /// A grid with zero columns or rows
    #[error("grid dimensions must be non-zero, got {cols}x{rows}")]
    EmptyGrid { cols: usize, rows: usize },

    /// Cell size that is zero, negative or not finite
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f64),
}

/// Result type alias for swarmfield_core constructors.
pub type Result<T> = std::result::Result<T, KernelError>;

impl KernelError {
    /// Checks that a cell size can be used to floor-divide world coordinates.
    pub fn check_cell_size(cell_size: f64) -> Result<()> {
        if cell_size.is_finite() && cell_size > 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidCellSize(cell_size))
        }
    }
}
