#![warn(missing_docs)]

//! # `thalweg`
//!
//! A solver for river puzzles drawn on a hexagon cut into triangles.
//! Every triangular tile is either part of a single winding channel or dry land. Each row of tiles along each of the
//! three axes (an "aisle") is labelled with how many of its tiles carry the channel, and the channel must run as one
//! unbranched path which enters and leaves the hexagon through its border.
//!
//! Begin with a [`TableauBuilder`], giving it the side length of the hexagon and the aisle counts.
//! Build it into a [`Tableau`], then either call [`solve()`](Tableau::solve), consuming the tableau and yielding it back
//! as far as it could be solved, or wrap it in a [`SolverState`] to control which rules run and inspect why each tile was
//! resolved.
//!
//! ```
//! use thalweg::TableauBuilder;
//!
//! let tableau = TableauBuilder::new(1).with_counts(&[1, 1, 0, 2, 2, 0]).build().unwrap();
//! let (solved, outcome) = tableau.solve();
//! assert!(outcome.solved);
//! assert_eq!(solved.thalweg().path().map(|path| path.len()), Some(2));
//! ```
//!
//! # Internals
//! There is no search. The solver is a work list of deductions: every tile, edge, and aisle starts Unknown and is
//! resolved at most once, to Channel or Empty. Each resolution wakes the [rules](rules) registered for that kind of
//! component, and each rule proposes only resolutions it can prove from what is already known.
//!
//! Coordinates are cube coordinates scaled by three, so that tile centres and lattice vertices are all integral.
//! A tile is identified by its centre, an edge by its two end vertices, and an aisle by its axis and index.
//!
//! Connectivity is tracked incrementally by the [`Thalweg`](thalweg::Thalweg): every Channel edge links its two tiles
//! into a segment, segments merge as they meet, and a Channel edge on the border caps a segment with an exit.
//! The puzzle is solved once a single segment holds every channel tile and both exits.

pub use builder::TableauBuilder;
pub use component::{ComponentId, ComponentKind};
pub use coordinates::Coordinates;
pub use error::BuildError;
pub use resolution::{Resolution, Resolvable};
pub use solver::{Reason, SolveOutcome, SolverConfig, SolverState};
pub use tableau::Tableau;

/// Rows of tiles and their hint counters.
pub mod aisle;
/// Construction of a [`Tableau`] from puzzle input.
pub mod builder;
/// Handles on the parts of a tableau.
pub mod component;
/// Scaled cube coordinates on the triangle lattice.
pub mod coordinates;
/// Sides of tiles.
pub mod edge;
/// Errors raised while building a puzzle.
pub mod error;
/// Geometry of the hexagonal grid.
pub mod grid;
/// The write-once tri-state every component carries.
pub mod resolution;
/// Deduction rules.
pub mod rules;
/// Axes, tile orientations, and turning.
pub mod shape;
/// The work list which drives the rules.
pub mod solver;
/// The puzzle under solution.
pub mod tableau;
/// Ends of the channel.
pub mod termination;
/// Incremental connectivity of the channel.
pub mod thalweg;
/// Triangular tiles.
pub mod tile;
mod tests;
