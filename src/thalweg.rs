use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use tracing::debug;

use crate::coordinates::{Coordinates, EdgeKey};
use crate::edge::Edge;
use crate::resolution::Resolvable;
use crate::rules::EXIT_COUNT;
use crate::shape::turn;
use crate::termination::Termination;

/// Anything which can sit in a [`Segment`]: a channel tile, or one of the two ends of the channel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Linkable {
    /// A channel tile, by its centre.
    Tile(Coordinates),
    /// An exit.
    Termination(Termination),
}

impl Linkable {
    /// Where this link sits; a termination lies just outside the grid.
    pub fn coordinates(&self) -> Coordinates {
        match self {
            Self::Tile(centre) => *centre,
            Self::Termination(termination) => termination.coordinates(),
        }
    }

    /// Whether this link is an exit.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Termination(_))
    }

    /// The centre, for a tile link.
    pub fn tile(&self) -> Option<Coordinates> {
        match self {
            Self::Tile(centre) => Some(*centre),
            Self::Termination(_) => None,
        }
    }
}

/// Stable name of a [`Segment`] for as long as it is not absorbed.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SegmentId(usize);

impl Display for SegmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A run of linked channel tiles, possibly capped at either end by a [`Termination`].
///
/// Segments only grow: they are created with two links, extended one link at a time, and merged into one another.
#[derive(Clone, Debug)]
pub struct Segment {
    id: SegmentId,
    links: VecDeque<Linkable>,
    tile_count: usize,
    termination_count: usize,
    rotation: i32,
}

impl Segment {
    fn new(id: SegmentId, first: Linkable, last: Linkable) -> Self {
        let mut segment = Self {
            id,
            links: VecDeque::with_capacity(2),
            tile_count: 0,
            termination_count: 0,
            rotation: 0,
        };
        segment.push(first, true);
        segment.push(last, true);
        segment
    }

    /// This segment's id.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Every link in order, terminations included.
    pub fn links(&self) -> impl DoubleEndedIterator<Item=&Linkable> {
        self.links.iter()
    }

    /// Centres of the member tiles, in link order.
    pub fn tiles(&self) -> impl Iterator<Item=Coordinates> + '_ {
        self.links.iter().filter_map(Linkable::tile)
    }

    /// Number of links, terminations included.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// One end.
    pub fn first(&self) -> &Linkable {
        &self.links[0]
    }

    /// The other end.
    pub fn last(&self) -> &Linkable {
        &self.links[self.links.len() - 1]
    }

    /// Number of tile links.
    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Number of exits at the ends, 0 to 2.
    pub fn termination_count(&self) -> usize {
        self.termination_count
    }

    /// Sum of the turns taken at every interior link, in sixths of a revolution.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// The rotation this segment would total if its last link were joined back to its first.
    ///
    /// A simple loop always totals [`FULL_REVOLUTION`](crate::shape::FULL_REVOLUTION) in magnitude.
    /// Returns [`None`] for a segment too short to close.
    pub fn closing_rotation(&self) -> Option<i32> {
        let n = self.links.len();
        if n < 3 {
            return None;
        }

        let first = self.links[0].coordinates();
        let last = self.links[n - 1].coordinates();
        Some(self.rotation
            + turn(self.links[n - 2].coordinates(), last, first)
            + turn(last, first, self.links[1].coordinates()))
    }

    /// The tile at an end of this segment which is not capped by a termination.
    /// With no terminations the last tile is given.
    pub fn free_end(&self) -> Option<Coordinates> {
        match (self.first(), self.last()) {
            (Linkable::Termination(_), Linkable::Termination(_)) => None,
            (Linkable::Termination(_), last) => last.tile(),
            (first, _) if self.last().is_terminal() => first.tile(),
            (_, last) => last.tile(),
        }
    }

    /// End tiles which may still be extended.
    pub fn open_ends(&self) -> Vec<Coordinates> {
        let mut ends = vec![];
        if let Linkable::Tile(first) = self.first() {
            ends.push(*first);
        }
        if let Linkable::Tile(last) = self.last() {
            if self.links.len() > 1 && !ends.contains(last) {
                ends.push(*last);
            }
        }
        ends
    }

    fn push(&mut self, link: Linkable, at_last: bool) {
        let n = self.links.len();
        if n >= 1 {
            let end = if at_last { self.links[n - 1] } else { self.links[0] };
            if end.is_terminal() {
                panic!("segment {} cannot grow past termination at {}", self.id, end.coordinates());
            }
        }

        if n >= 2 {
            self.rotation += if at_last {
                turn(self.links[n - 2].coordinates(), self.links[n - 1].coordinates(), link.coordinates())
            } else {
                turn(link.coordinates(), self.links[0].coordinates(), self.links[1].coordinates())
            };
        }

        match link {
            Linkable::Tile(_) => self.tile_count += 1,
            Linkable::Termination(_) => self.termination_count += 1,
        }

        if at_last {
            self.links.push_back(link)
        } else {
            self.links.push_front(link)
        }
    }

    fn add_to_last(&mut self, link: Linkable) {
        self.push(link, true)
    }

    fn add_to_first(&mut self, link: Linkable) {
        self.push(link, false)
    }
}

/// What a call to [`Thalweg::try_link`] did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkOutcome {
    /// The edge was linked before.
    AlreadyLinked,
    /// Both tiles were unlinked and now form a new segment.
    Created(SegmentId),
    /// One tile joined the end of an existing segment.
    Extended(SegmentId),
    /// Two segments joined; `absorbed` no longer exists.
    Merged {
        /// The segment which now holds both.
        survivor: SegmentId,
        /// The segment which was emptied into `survivor`.
        absorbed: SegmentId,
    },
    /// A termination was attached to the segment.
    Terminated(SegmentId),
    /// The edge cannot be part of any single channel; nothing was linked.
    Contradiction(Contradiction),
}

impl LinkOutcome {
    /// Whether the thalweg changed.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::AlreadyLinked | Self::Contradiction(_))
    }
}

/// A Channel edge which the thalweg refused, proving the puzzle has no solution along the current resolutions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Contradiction {
    /// The channel would leave the grid a third time.
    ExtraExit {
        /// The refused border edge.
        edge: EdgeKey,
    },
    /// The edge would branch off `at`, which already carries the channel in and out.
    Branch {
        /// The tile which would branch.
        at: Coordinates,
        /// The segment holding it.
        segment: SegmentId,
    },
    /// The edge would join two tiles of the same segment into a loop.
    Loop {
        /// The segment which would close.
        segment: SegmentId,
    },
}

impl Display for Contradiction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtraExit { edge } => write!(f, "{} to {} would be a third exit", edge.0, edge.1),
            Self::Branch { at, segment } => write!(f, "the channel would branch at {at} in segment {segment}"),
            Self::Loop { segment } => write!(f, "segment {segment} would close into a loop"),
        }
    }
}

/// Incremental tracker of the channel's connectivity, built from Channel edges as they resolve.
#[derive(Clone, Debug)]
pub struct Thalweg {
    segments: BTreeMap<SegmentId, Segment>,
    // keyed by linkable coordinates; terminations lie outside the grid so never collide with tiles
    membership: HashMap<Coordinates, SegmentId>,
    exits: Vec<Termination>,
    channel_total: usize,
    linked_tile_count: usize,
    next_id: usize,
}

impl Thalweg {
    /// An empty thalweg for a channel of `channel_total` tiles.
    pub fn new(channel_total: usize) -> Self {
        Self {
            segments: BTreeMap::new(),
            membership: HashMap::new(),
            exits: Vec::with_capacity(2),
            channel_total,
            linked_tile_count: 0,
            next_id: 0,
        }
    }

    /// Live segments, in id order.
    pub fn segments(&self) -> impl Iterator<Item=&Segment> {
        self.segments.values()
    }

    /// The live segment `id`, if it has not been absorbed.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// Number of live segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The segment holding the tile centred on `centre`.
    pub fn segment_of(&self, centre: Coordinates) -> Option<&Segment> {
        self.membership.get(&centre).and_then(|id| self.segments.get(id))
    }

    /// Whether the tile centred on `centre` is linked.
    pub fn contains(&self, centre: Coordinates) -> bool {
        self.membership.contains_key(&centre)
    }

    /// Terminations attached so far, in order of discovery.
    pub fn exits(&self) -> &[Termination] {
        &self.exits
    }

    /// Number of channel tiles the finished channel must visit.
    pub fn channel_total(&self) -> usize {
        self.channel_total
    }

    /// Tiles that are members of some segment.
    pub fn linked_tile_count(&self) -> usize {
        self.linked_tile_count
    }

    /// Channel tiles not yet in any segment.
    pub fn unlinked_tile_count(&self) -> usize {
        self.channel_total.saturating_sub(self.linked_tile_count)
    }

    /// One segment, holding every channel tile and both exits.
    pub fn is_solved(&self) -> bool {
        self.linked_tile_count == self.channel_total && self.exits.len() == EXIT_COUNT && self.segments.len() == 1
    }

    /// The channel from one exit to the other, once solved.
    pub fn path(&self) -> Option<Vec<Coordinates>> {
        if !self.is_solved() {
            return None;
        }

        self.segments.values().next().map(|segment| segment.tiles().collect())
    }

    /// Record that `edge` now carries the channel.
    ///
    /// An edge which no single channel could use (a third exit, a branch, or a loop) is refused with
    /// [`LinkOutcome::Contradiction`], leaving the thalweg untouched.
    ///
    /// # Panics
    /// If `edge` is not Channel.
    pub fn try_link(&mut self, edge: &Edge) -> LinkOutcome {
        assert!(edge.resolution().is_channel(), "edge {:?} linked while {}", edge.key(), edge.resolution());
        self.link(edge).unwrap_or_else(LinkOutcome::Contradiction)
    }

    fn link(&mut self, edge: &Edge) -> Result<LinkOutcome, Contradiction> {
        if let Some(inside) = edge.inside() {
            let outside = edge.outside()
                .unwrap_or_else(|| unreachable!("border edge {:?} has no outside centre", edge.key()));
            return self.terminate(inside, Termination::new(outside, edge.key()));
        }

        let (Some(minus), Some(plus)) = (edge.minus(), edge.plus()) else {
            unreachable!("interior edge {:?} is missing a tile", edge.key())
        };

        match (self.membership.get(&minus).copied(), self.membership.get(&plus).copied()) {
            (Some(a), Some(b)) if a == b => self.relink(a, minus, plus),
            (Some(a), Some(b)) => self.merge((a, minus), (b, plus)),
            (Some(a), None) => self.extend(a, minus, Linkable::Tile(plus)),
            (None, Some(b)) => self.extend(b, plus, Linkable::Tile(minus)),
            (None, None) => Ok(self.create(Linkable::Tile(minus), Linkable::Tile(plus))),
        }
    }

    /// Both tiles are already in segment `id`, which is only consistent if they are linked to each other.
    fn relink(&self, id: SegmentId, a: Coordinates, b: Coordinates) -> Result<LinkOutcome, Contradiction> {
        let adjacent = self.segments.get(&id)
            .is_some_and(|segment| segment.links().tuple_windows().any(|(x, y)| {
                let pair = (x.coordinates(), y.coordinates());
                pair == (a, b) || pair == (b, a)
            }));

        if adjacent {
            Ok(LinkOutcome::AlreadyLinked)
        } else {
            Err(Contradiction::Loop { segment: id })
        }
    }

    fn terminate(&mut self, inside: Coordinates, termination: Termination) -> Result<LinkOutcome, Contradiction> {
        if self.membership.contains_key(&termination.coordinates()) {
            return Ok(LinkOutcome::AlreadyLinked);
        }
        if self.exits.len() >= EXIT_COUNT {
            return Err(Contradiction::ExtraExit { edge: termination.edge() });
        }

        let outcome = match self.membership.get(&inside).copied() {
            Some(id) => match self.extend(id, inside, Linkable::Termination(termination))? {
                LinkOutcome::Extended(id) => LinkOutcome::Terminated(id),
                other => other,
            },
            None => match self.create(Linkable::Tile(inside), Linkable::Termination(termination)) {
                LinkOutcome::Created(id) => LinkOutcome::Terminated(id),
                other => other,
            },
        };

        self.exits.push(termination);
        Ok(outcome)
    }

    /// Whether `at` ends segment `id`, so that it may grow there.
    fn check_end(&self, id: SegmentId, at: Coordinates) -> Result<(), Contradiction> {
        let segment = self.segments.get(&id)
            .unwrap_or_else(|| panic!("segment {id} is not registered"));
        if segment.first().coordinates() == at || segment.last().coordinates() == at {
            Ok(())
        } else {
            Err(Contradiction::Branch { at, segment: id })
        }
    }

    fn register(&mut self, link: Linkable, id: SegmentId) {
        if let Some(existing) = self.membership.insert(link.coordinates(), id) {
            panic!("{} is already linked in segment {existing}", link.coordinates());
        }

        if !link.is_terminal() {
            self.linked_tile_count += 1;
        }
    }

    fn create(&mut self, first: Linkable, last: Linkable) -> LinkOutcome {
        let id = SegmentId(self.next_id);
        self.next_id += 1;

        self.register(first, id);
        self.register(last, id);
        self.segments.insert(id, Segment::new(id, first, last));

        LinkOutcome::Created(id)
    }

    fn extend(&mut self, id: SegmentId, at: Coordinates, link: Linkable) -> Result<LinkOutcome, Contradiction> {
        self.check_end(id, at)?;
        self.register(link, id);

        let segment = self.segments.get_mut(&id)
            .unwrap_or_else(|| panic!("segment {id} is not registered"));
        if segment.last().coordinates() == at {
            segment.add_to_last(link);
        } else {
            segment.add_to_first(link);
        }

        Ok(LinkOutcome::Extended(id))
    }

    fn merge(&mut self, a: (SegmentId, Coordinates), b: (SegmentId, Coordinates)) -> Result<LinkOutcome, Contradiction> {
        self.check_end(a.0, a.1)?;
        self.check_end(b.0, b.1)?;

        let (len_a, len_b) = (self.segments[&a.0].len(), self.segments[&b.0].len());
        let ((survivor, survivor_at), (absorbed, absorbed_at)) = if len_a >= len_b { (a, b) } else { (b, a) };

        let Some(mut taken) = self.segments.remove(&absorbed) else {
            panic!("segment {absorbed} is not registered");
        };

        // walk the absorbed links outwards from the joining end
        let links: Vec<Linkable> = if taken.first().coordinates() == absorbed_at {
            taken.links.drain(..).collect()
        } else if taken.last().coordinates() == absorbed_at {
            taken.links.drain(..).rev().collect()
        } else {
            unreachable!("{absorbed_at} is in the middle of segment {absorbed}");
        };

        let segment = self.segments.get_mut(&survivor)
            .unwrap_or_else(|| panic!("segment {survivor} is not registered"));
        let at_last = if segment.last().coordinates() == survivor_at {
            true
        } else if segment.first().coordinates() == survivor_at {
            false
        } else {
            unreachable!("{survivor_at} is in the middle of segment {survivor}");
        };

        for link in links {
            segment.push(link, at_last);
            self.membership.insert(link.coordinates(), survivor);
        }

        debug!(%survivor, %absorbed, tiles = segment.tile_count(), "merged segments");
        Ok(LinkOutcome::Merged { survivor, absorbed })
    }
}
