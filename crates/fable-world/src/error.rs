//! Error types for the `fable-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

/// Errors that can occur during grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A coordinate lies outside the grid.
    #[error("cell ({row}, {col}) is outside the {height}x{width} grid")]
    OutOfBounds {
        /// Requested row.
        row: u32,
        /// Requested column.
        col: u32,
        /// Grid height.
        height: u32,
        /// Grid width.
        width: u32,
    },

    /// Grid dimensions are unusable (zero, or too many cells to address).
    #[error("invalid grid dimensions {height}x{width}")]
    InvalidDimensions {
        /// Requested height.
        height: u32,
        /// Requested width.
        width: u32,
    },

    /// A world parameter is out of range.
    #[error("invalid world configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong.
        reason: String,
    },

    /// A food quantity would have gone below zero or overflowed.
    #[error("arithmetic overflow in food accounting")]
    ArithmeticOverflow,
}
