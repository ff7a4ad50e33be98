use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use super::escape;
use super::{FieldPathError, SegmentIter};

/// What kind of container a segment addresses, derived from its child.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "proptest"), derive(proptest_derive::Arbitrary))]
pub enum SegmentType {
    /// The child is a named segment.
    Dictionary,
    /// The child is an index segment.
    Array,
    /// There is no child.
    Leaf,
}

/// One step of a field path.
///
/// Every segment exclusively owns the rest of the chain below it, so a chain is acyclic and
/// can't be shared. Segments are immutable once built.
#[derive(Clone, Debug)]
pub enum Segment {
    Name(NameSegment),
    Index(IndexSegment),
}

/// A map key step, e.g. `b` in `a.b`.
pub struct NameSegment {
    name: String,
    quoted: bool,
    child: Option<Box<Segment>>,
}

/// An array position step, e.g. `[3]` in `a[3]`. An index of `-1` is unbound and written `[]`.
pub struct IndexSegment {
    index: isize,
    child: Option<Box<Segment>>,
}

impl NameSegment {
    pub fn new(name: impl Into<String>, quoted: bool, child: Option<Segment>) -> Self {
        Self {
            name: name.into(),
            quoted,
            child: child.map(Box::new),
        }
    }

    /// A name segment without a child.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, false, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this segment is written between quotes even when the caller doesn't ask for it.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    pub fn child(&self) -> Option<&Segment> {
        self.child.as_deref()
    }

    /// Resolves backslash escapes, including `\uXXXX` (surrogate pairs are combined).
    pub fn unescape(raw: &str) -> Result<String, FieldPathError> {
        escape::unescape(raw)
    }

    /// Strips a matching pair of `"` or `` ` `` delimiters, then resolves escapes.
    pub fn unquote(raw: &str) -> Result<String, FieldPathError> {
        escape::unquote(raw)
    }

    fn write_segment(&self, output: &mut String, quote: bool) {
        let quote = quote || self.quoted;
        if quote {
            output.push('"');
        }
        escape::write_escaped(output, &self.name, !quote);
        if quote {
            output.push('"');
        }
    }

    fn folded_name(&self) -> impl Iterator<Item = char> + '_ {
        self.name.chars().flat_map(char::to_lowercase)
    }
}

impl IndexSegment {
    /// The index used for `[]`.
    pub const UNBOUND: isize = -1;

    pub fn new(index: isize, child: Option<Segment>) -> Result<Self, FieldPathError> {
        if index < Self::UNBOUND {
            return Err(FieldPathError::InvalidIndex { index });
        }
        Ok(Self {
            index,
            child: child.map(Box::new),
        })
    }

    pub fn unbound(child: Option<Segment>) -> Self {
        Self {
            index: Self::UNBOUND,
            child: child.map(Box::new),
        }
    }

    pub fn index(&self) -> isize {
        self.index
    }

    pub fn has_index(&self) -> bool {
        self.index != Self::UNBOUND
    }

    pub fn child(&self) -> Option<&Segment> {
        self.child.as_deref()
    }

    fn write_segment(&self, output: &mut String) {
        output.push('[');
        if self.has_index() {
            output.push_str(&self.index.to_string());
        }
        output.push(']');
    }
}

impl Segment {
    pub fn child(&self) -> Option<&Segment> {
        match self {
            Segment::Name(segment) => segment.child(),
            Segment::Index(segment) => segment.child(),
        }
    }

    pub fn segment_type(&self) -> SegmentType {
        match self.child() {
            None => SegmentType::Leaf,
            Some(Segment::Index(_)) => SegmentType::Array,
            Some(Segment::Name(_)) => SegmentType::Dictionary,
        }
    }

    pub fn is_dictionary(&self) -> bool {
        self.segment_type() == SegmentType::Dictionary
    }

    pub fn is_array(&self) -> bool {
        self.segment_type() == SegmentType::Array
    }

    pub fn is_leaf(&self) -> bool {
        self.segment_type() == SegmentType::Leaf
    }

    pub fn is_last_path(&self) -> bool {
        self.child().is_none()
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Segment::Name(_))
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    pub fn as_name(&self) -> Option<&NameSegment> {
        match self {
            Segment::Name(segment) => Some(segment),
            Segment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<&IndexSegment> {
        match self {
            Segment::Index(segment) => Some(segment),
            Segment::Name(_) => None,
        }
    }

    /// Iterates over this segment and everything below it.
    pub fn iter(&self) -> SegmentIter<'_> {
        SegmentIter::new(self)
    }

    /// Renders this segment only, without its child.
    pub fn write_segment(&self, output: &mut String, quote: bool) {
        match self {
            Segment::Name(segment) => segment.write_segment(output, quote),
            Segment::Index(segment) => segment.write_segment(output),
        }
    }

    /// Renders this segment and everything below it.
    pub fn as_path_str(&self, quote: bool) -> String {
        let mut output = String::new();
        for (i, segment) in self.iter().enumerate() {
            if i != 0 && segment.is_named() {
                output.push('.');
            }
            segment.write_segment(&mut output, quote);
        }
        output
    }

    /// Compares this segment alone, ignoring the children.
    pub fn segment_eq(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Name(a), Segment::Name(b)) => a.folded_name().eq(b.folded_name()),
            (Segment::Index(a), Segment::Index(b)) => a.index == b.index,
            _ => false,
        }
    }

    /// Orders this segment alone, ignoring the children. Names sort before indexes.
    pub fn segment_cmp(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (Segment::Name(a), Segment::Name(b)) => a.folded_name().cmp(b.folded_name()),
            (Segment::Index(a), Segment::Index(b)) => a.index.cmp(&b.index),
            (Segment::Name(_), Segment::Index(_)) => Ordering::Less,
            (Segment::Index(_), Segment::Name(_)) => Ordering::Greater,
        }
    }

    fn segment_hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Segment::Name(segment) => {
                state.write_u8(0);
                for c in segment.folded_name() {
                    c.hash(state);
                }
                state.write_u8(0xff);
            }
            Segment::Index(segment) => {
                state.write_u8(1);
                segment.index.hash(state);
            }
        }
    }

    /// A copy of this chain with `segment` attached below its deepest segment.
    pub fn with_appended(&self, segment: Segment) -> Segment {
        let mut parts = self.iter().map(Detached::from).collect::<Vec<_>>();
        parts.push(Detached::from(&segment));
        link(parts, segment.child().cloned()).unwrap_or(segment)
    }
}

/// A segment with its child cut off, used to build chains bottom-up.
#[derive(Clone, Debug)]
pub(crate) enum Detached {
    Name { name: String, quoted: bool },
    Index(isize),
}

impl Detached {
    pub(crate) fn attach(self, child: Option<Segment>) -> Segment {
        match self {
            Detached::Name { name, quoted } => Segment::Name(NameSegment::new(name, quoted, child)),
            Detached::Index(index) => Segment::Index(IndexSegment {
                index,
                child: child.map(Box::new),
            }),
        }
    }
}

impl From<&Segment> for Detached {
    fn from(segment: &Segment) -> Self {
        match segment {
            Segment::Name(segment) => Detached::Name {
                name: segment.name.clone(),
                quoted: segment.quoted,
            },
            Segment::Index(segment) => Detached::Index(segment.index),
        }
    }
}

/// Copies the chain starting at `segment` one segment at a time.
fn clone_chain(segment: &Segment) -> Option<Segment> {
    link(segment.iter().map(Detached::from).collect(), None)
}

/// Frees the chain below a segment one segment at a time.
fn unlink(mut next: Option<Box<Segment>>) {
    while let Some(mut segment) = next {
        next = segment.take_child();
    }
}

impl Segment {
    fn take_child(&mut self) -> Option<Box<Segment>> {
        match self {
            Segment::Name(segment) => segment.child.take(),
            Segment::Index(segment) => segment.child.take(),
        }
    }
}

// Chains can be far deeper than the call stack, so nothing below recurses into the child.

impl Clone for NameSegment {
    fn clone(&self) -> Self {
        Self::new(
            self.name.clone(),
            self.quoted,
            self.child().and_then(clone_chain),
        )
    }
}

impl Clone for IndexSegment {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            child: self.child().and_then(clone_chain).map(Box::new),
        }
    }
}

impl Drop for NameSegment {
    fn drop(&mut self) {
        unlink(self.child.take());
    }
}

impl Drop for IndexSegment {
    fn drop(&mut self) {
        unlink(self.child.take());
    }
}

impl fmt::Debug for NameSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameSegment")
            .field("name", &self.name)
            .field("quoted", &self.quoted)
            .field("child", &self.child().map(|child| child.as_path_str(true)))
            .finish()
    }
}

impl fmt::Debug for IndexSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexSegment")
            .field("index", &self.index)
            .field("child", &self.child().map(|child| child.as_path_str(true)))
            .finish()
    }
}

/// Links `parts` into a chain, top to bottom, with `tail` hanging below the last part.
///
/// Indexes must already be validated.
pub(crate) fn link(parts: Vec<Detached>, tail: Option<Segment>) -> Option<Segment> {
    parts
        .into_iter()
        .rev()
        .fold(tail, |child, part| Some(part.attach(child)))
}

impl From<NameSegment> for Segment {
    fn from(segment: NameSegment) -> Self {
        Segment::Name(segment)
    }
}

impl From<IndexSegment> for Segment {
    fn from(segment: IndexSegment) -> Self {
        Segment::Index(segment)
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        let mut a = self.iter();
        let mut b = other.iter();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if std::ptr::eq(x, y) => return true,
                (Some(x), Some(y)) if x.segment_eq(y) => continue,
                _ => return false,
            }
        }
    }
}

impl Eq for Segment {}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.iter();
        let mut b = other.iter();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) => match x.segment_cmp(y) {
                    Ordering::Equal => continue,
                    ordering => return ordering,
                },
            }
        }
    }
}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut depth = 0usize;
        for segment in self.iter() {
            segment.segment_hash(state);
            depth += 1;
        }
        state.write_usize(depth);
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_path_str(true))
    }
}
