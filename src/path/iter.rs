use std::iter::FusedIterator;

use super::Segment;

/// Walks a segment chain from a root down to its leaf.
#[derive(Clone, Debug)]
pub struct SegmentIter<'a> {
    next: Option<&'a Segment>,
}

impl<'a> SegmentIter<'a> {
    pub fn new(root: &'a Segment) -> Self {
        Self { next: Some(root) }
    }
}

impl<'a> Iterator for SegmentIter<'a> {
    type Item = &'a Segment;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.child();
        Some(current)
    }
}

impl FusedIterator for SegmentIter<'_> {}

#[cfg(test)]
mod test {
    use crate::path::{IndexSegment, NameSegment, Segment};

    #[test]
    fn walks_to_the_leaf() {
        let root: Segment = NameSegment::new(
            "a",
            false,
            Some(IndexSegment::new(0, Some(NameSegment::leaf("b").into())).unwrap().into()),
        )
        .into();

        let mut iter = root.iter();
        assert!(iter.next().unwrap().is_named());
        assert!(iter.next().unwrap().is_indexed());
        assert_eq!(iter.next().unwrap().as_name().unwrap().name(), "b");
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn restarts_from_the_same_root() {
        let root: Segment = NameSegment::new("a", false, Some(NameSegment::leaf("b").into())).into();
        let first = root.iter().collect::<Vec<_>>();
        let second = root.iter().collect::<Vec<_>>();
        assert_eq!(first.len(), 2);
        assert!(first.iter().zip(&second).all(|(a, b)| std::ptr::eq(*a, *b)));
    }
}
