use std::fmt::{Display, Formatter};

use crate::coordinates::Coordinates;
use crate::resolution::{Resolution, Resolvable};
use crate::shape::Axis;

/// Identifies an aisle by its axis and its index along that axis, counted from the low side.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AisleId {
    /// Axis whose lattice lines bound this aisle.
    pub axis: Axis,
    /// Position on that axis, from 0 at the low margin.
    pub index: usize,
}

impl AisleId {
    /// Identify aisle `index` of `axis`.
    pub const fn new(axis: Axis, index: usize) -> Self {
        Self { axis, index }
    }
}

impl Display for AisleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.axis, self.index)
    }
}

/// A row of tiles between two adjacent lattice lines of one axis, carrying one hint count.
///
/// The counters here are kept current by [`Tableau`](crate::tableau::Tableau) as member tiles resolve.
/// The aisle itself resolves once every member tile has: `Channel` if it holds any channel tile, `Empty` otherwise.
#[derive(Clone, Debug)]
pub struct Aisle {
    id: AisleId,
    // sorted along id.axis.next()
    tiles: Vec<Coordinates>,
    channel_tile_count: usize,
    unresolved_tile_count: usize,
    resolved_channel_tile_count: usize,
    resolved_empty_tile_count: usize,
    margin: bool,
    resolution: Resolution,
}

impl Aisle {
    pub(crate) fn new(id: AisleId, tiles: Vec<Coordinates>, channel_tile_count: usize, margin: bool) -> Self {
        Self {
            id,
            unresolved_tile_count: tiles.len(),
            tiles,
            channel_tile_count,
            resolved_channel_tile_count: 0,
            resolved_empty_tile_count: 0,
            margin,
            resolution: Resolution::Unknown,
        }
    }

    /// This aisle's id.
    pub fn id(&self) -> AisleId {
        self.id
    }

    /// Member tile centres, sorted by their coordinate on the axis after this aisle's.
    pub fn tiles(&self) -> &[Coordinates] {
        &self.tiles
    }

    /// Number of tiles in this aisle.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// The hint: how many member tiles the channel passes through.
    pub fn channel_tile_count(&self) -> usize {
        self.channel_tile_count
    }

    /// How many member tiles the channel avoids.
    pub fn empty_tile_count(&self) -> usize {
        self.tile_count() - self.channel_tile_count
    }

    /// Member tiles still Unknown.
    pub fn unresolved_tile_count(&self) -> usize {
        self.unresolved_tile_count
    }

    /// Member tiles resolved Channel so far.
    pub fn resolved_channel_tile_count(&self) -> usize {
        self.resolved_channel_tile_count
    }

    /// Member tiles resolved Empty so far.
    pub fn resolved_empty_tile_count(&self) -> usize {
        self.resolved_empty_tile_count
    }

    /// Channel tiles still to be found among the unresolved members.
    pub fn unresolved_channel_count(&self) -> usize {
        self.channel_tile_count.saturating_sub(self.resolved_channel_tile_count)
    }

    /// Empty tiles still to be found among the unresolved members.
    pub fn unresolved_empty_count(&self) -> usize {
        self.empty_tile_count().saturating_sub(self.resolved_empty_tile_count)
    }

    /// Whether this is the first or last aisle on its axis, running along the border.
    pub fn is_margin(&self) -> bool {
        self.margin
    }

    /// Whether the resolved members already contradict the hint.
    pub fn is_overfull(&self) -> bool {
        self.resolved_channel_tile_count > self.channel_tile_count
            || self.resolved_empty_tile_count > self.empty_tile_count()
    }

    /// Account for one member tile resolving.
    /// Returns `true` if that was the last unresolved member.
    pub(crate) fn notify_tile_resolution(&mut self, resolution: Resolution) -> bool {
        match resolution {
            Resolution::Unknown => unreachable!("aisle {} notified of a tile resolving to Unknown", self.id),
            Resolution::Channel => self.resolved_channel_tile_count += 1,
            Resolution::Empty => self.resolved_empty_tile_count += 1,
        }

        self.unresolved_tile_count = self.unresolved_tile_count.checked_sub(1)
            .unwrap_or_else(|| panic!("aisle {} resolved more tiles than it holds", self.id));

        self.unresolved_tile_count == 0
    }

    /// The resolution this aisle takes on once complete.
    pub(crate) fn completed_resolution(&self) -> Resolution {
        if self.channel_tile_count > 0 { Resolution::Channel } else { Resolution::Empty }
    }
}

impl Resolvable for Aisle {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn resolution_mut(&mut self) -> &mut Resolution {
        &mut self.resolution
    }
}
