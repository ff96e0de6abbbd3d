use thiserror::Error;

use crate::shape::Axis;

/// Reasons a [`TableauBuilder`](crate::builder::TableauBuilder) may refuse to build.
///
/// These are contract violations on the puzzle input and are always reported at build time.
/// A puzzle which builds but cannot be solved is not an error; see [`SolveOutcome`](crate::solver::SolveOutcome).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The grid size is outside of [`MIN_SIZE`](crate::grid::MIN_SIZE)..=[`MAX_SIZE`](crate::grid::MAX_SIZE).
    #[error("grid size {size} is out of range {min}..={max}")]
    SizeOutOfRange {
        /// The requested side.
        size: usize,
        /// Smallest supported side.
        min: usize,
        /// Largest supported side.
        max: usize,
    },
    /// No hint counts were given to the builder.
    #[error("no aisle counts were supplied")]
    MissingCounts,
    /// The count array does not hold one count per aisle.
    #[error("expected {expected} aisle counts, got {actual}")]
    CountLength {
        /// `6n` for size `n`.
        expected: usize,
        /// Length of the array given.
        actual: usize,
    },
    /// The per-axis sums of the count array disagree.
    #[error("aisle counts must sum equally on every axis, got x={x} y={y} z={z}")]
    AxisSumMismatch {
        /// Sum over the X aisles.
        x: usize,
        /// Sum over the Y aisles.
        y: usize,
        /// Sum over the Z aisles.
        z: usize,
    },
    /// A single aisle asks for more channel tiles than it holds.
    #[error("aisle {axis}{index} asks for {count} channel tiles but holds only {tile_count}")]
    CountOutOfRange {
        /// Axis of the offending aisle.
        axis: Axis,
        /// Index of the offending aisle.
        index: usize,
        /// The count asked for.
        count: usize,
        /// Tiles the aisle holds.
        tile_count: usize,
    },
    /// A coordinate triple does not satisfy `x + y + z = 0`.
    #[error("({x},{y},{z}) is not a valid cube coordinate")]
    MalformedCoordinates {
        /// Given x.
        x: i32,
        /// Given y.
        y: i32,
        /// Given z.
        z: i32,
    },
}
