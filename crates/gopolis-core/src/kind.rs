//! Bitmask taxonomy of event categories.
//!
//! Each bit names one orthogonal category. A message carries the union of
//! the categories it belongs to; a subscription names the categories it
//! requires. Routing is a subset test, so one coarse message such as
//! `UPDATE | POSITION | VELOCITY` satisfies an `UPDATE | POSITION`
//! subscription and an `UPDATE | POSITION | VELOCITY` subscription alike.
//!
//! ```
//! use gopolis_core::kind::EventKind;
//!
//! let msg = EventKind::ADD | EventKind::POSITION | EventKind::VELOCITY;
//! assert!(msg.contains(EventKind::POSITION));
//! assert!(!EventKind::POSITION.contains(EventKind::POSITION | EventKind::VELOCITY));
//! assert!(msg.intersects(EventKind::VELOCITY | EventKind::GEOMETRY));
//! ```

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Event categories, composable with `|`.
    ///
    /// | Group | Flags |
    /// |-------|-------|
    /// | process | [`TICK`](Self::TICK), [`QUIT`](Self::QUIT), [`ERROR`](Self::ERROR) |
    /// | input | [`RESIZE`](Self::RESIZE), [`KEY`](Self::KEY), [`MOUSE`](Self::MOUSE) |
    /// | entity | [`ADD`](Self::ADD), [`UPDATE`](Self::UPDATE), [`REMOVE`](Self::REMOVE) |
    /// | component | [`POSITION`](Self::POSITION), [`VELOCITY`](Self::VELOCITY), [`GEOMETRY`](Self::GEOMETRY) |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct EventKind: u32 {
        // process
        const TICK     = 1 << 0;
        const QUIT     = 1 << 1;
        const ERROR    = 1 << 2;

        // input
        const RESIZE   = 1 << 3;
        const KEY      = 1 << 4;
        const MOUSE    = 1 << 5;

        // entity
        const ADD      = 1 << 6;
        const UPDATE   = 1 << 7;
        const REMOVE   = 1 << 8;

        // components
        const POSITION = 1 << 9;
        const VELOCITY = 1 << 10;
        const GEOMETRY = 1 << 11;
    }
}

impl EventKind {
    /// Does a message with these flags satisfy a subscription on `mask`?
    ///
    /// Same as [`contains`](Self::contains), named for the routing question.
    #[inline]
    pub fn satisfies(self, mask: EventKind) -> bool {
        self.contains(mask)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_distinct() {
        let all: Vec<EventKind> = EventKind::all().iter().collect();
        assert_eq!(all.len(), 12);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!a.intersects(*b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn contains_is_subset() {
        let msg = EventKind::UPDATE | EventKind::POSITION | EventKind::VELOCITY | EventKind::GEOMETRY;
        assert!(msg.contains(EventKind::UPDATE));
        assert!(msg.contains(EventKind::UPDATE | EventKind::POSITION));
        assert!(msg.contains(msg));
        assert!(!msg.contains(EventKind::ADD));
        assert!(!(EventKind::UPDATE | EventKind::POSITION).contains(msg));
    }

    #[test]
    fn empty_mask_is_satisfied_by_everything() {
        assert!(EventKind::TICK.satisfies(EventKind::empty()));
        assert!(EventKind::empty().satisfies(EventKind::empty()));
    }

    #[test]
    fn intersects_any_overlap() {
        let a = EventKind::KEY | EventKind::MOUSE;
        assert!(a.intersects(EventKind::MOUSE | EventKind::RESIZE));
        assert!(!a.intersects(EventKind::RESIZE));
        assert!(!a.intersects(EventKind::empty()));
    }

    #[test]
    fn display_lists_names() {
        assert_eq!((EventKind::ADD | EventKind::POSITION).to_string(), "ADD|POSITION");
        assert_eq!(EventKind::TICK.to_string(), "TICK");
        assert_eq!(EventKind::empty().to_string(), "NONE");
    }
}
