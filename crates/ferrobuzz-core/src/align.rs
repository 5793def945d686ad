//! Date intersection of two independently indexed series.
//!
//! Mention days include weekends and market holidays while price days skip
//! them; price days can also fall outside the scraped window. Only days
//! present in both survive.

use crate::DateSeries;

/// Both inputs re-indexed to their shared dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned<A, B> {
    pub left: DateSeries<A>,
    pub right: DateSeries<B>,
}

impl<A, B> Aligned<A, B> {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Intersect the date keys of `left` and `right`, preserving ascending order.
///
/// An empty intersection is not an error here; callers decide whether it is fatal.
pub fn align<A: Clone, B: Clone>(left: &DateSeries<A>, right: &DateSeries<B>) -> Aligned<A, B> {
    Aligned {
        left: left.filter_dates(|date| right.contains(&date)),
        right: right.filter_dates(|date| left.contains(&date)),
    }
}
