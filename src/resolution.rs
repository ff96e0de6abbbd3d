use strum::{Display, VariantArray};

/// The tri-state classification of a tile, edge, or aisle.
///
/// Resolutions are write-once: a component leaves [`Unknown`](Resolution::Unknown) at most one time and never changes again.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub enum Resolution {
    /// Not yet decided.
    #[default]
    Unknown,
    /// Part of the river.
    Channel,
    /// Land, or for an edge, not crossed by the river.
    Empty,
}

impl Resolution {
    /// Whether this is [`Resolution::Unknown`].
    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }

    /// Whether this is [`Resolution::Channel`].
    #[inline]
    pub fn is_channel(self) -> bool {
        self == Self::Channel
    }

    /// Whether this is [`Resolution::Empty`].
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

/// Components carrying a write-once [`Resolution`].
pub trait Resolvable {
    /// The current resolution.
    fn resolution(&self) -> Resolution;

    #[doc(hidden)]
    fn resolution_mut(&mut self) -> &mut Resolution;

    /// Move from [`Resolution::Unknown`] to `target`.
    ///
    /// Returns `true` only if the resolution changed.
    /// Asking for `Unknown`, or asking anything of an already resolved component, does nothing and returns `false`.
    fn try_resolve(&mut self, target: Resolution) -> bool {
        if target.is_unknown() || !self.resolution().is_unknown() {
            return false;
        }

        *self.resolution_mut() = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Cell(Resolution);

    impl Resolvable for Cell {
        fn resolution(&self) -> Resolution {
            self.0
        }

        fn resolution_mut(&mut self) -> &mut Resolution {
            &mut self.0
        }
    }

    #[test]
    fn write_once() {
        let mut cell = Cell::default();
        assert!(!cell.try_resolve(Resolution::Unknown));
        assert!(cell.try_resolve(Resolution::Empty));
        assert!(!cell.try_resolve(Resolution::Channel));
        assert!(!cell.try_resolve(Resolution::Empty));
        assert_eq!(cell.resolution(), Resolution::Empty);
    }

    #[test]
    fn displays_by_name() {
        assert_eq!(Resolution::Channel.to_string(), "Channel");
    }
}
