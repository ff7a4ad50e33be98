use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
#[cfg(any(test, feature = "proptest"))]
use proptest::prelude::*;
use tracing::{debug, trace};

use super::escape;
use super::parser::Parser;
use super::segment::{self, Detached};
use super::{FieldPathError, IndexSegment, NameSegment, Segment, SegmentIter};

static EMPTY: Lazy<FieldPath> =
    Lazy::new(|| FieldPath::from_segment(NameSegment::leaf("").into()));

/// An immutable, parsed field path.
///
/// The segment chain lives behind an [`Arc`], so cloning a path is cheap and the same path can
/// be read from many threads. Equality, ordering and hashing are canonical: quoting is ignored
/// and names are compared case-insensitively.
///
/// With the `serde` feature a path is (de)serialized as its quoted text form.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct FieldPath {
    root: Arc<Segment>,
}

/// One element of a path built with [`field_path!`](crate::field_path).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathElement<'a> {
    Field(&'a str),
    Index(usize),
    /// `[]`
    Unbound,
}

impl<'a> From<&'a str> for PathElement<'a> {
    fn from(field: &'a str) -> Self {
        PathElement::Field(field)
    }
}

impl<'a> From<&'a String> for PathElement<'a> {
    fn from(field: &'a String) -> Self {
        PathElement::Field(field.as_str())
    }
}

impl From<usize> for PathElement<'_> {
    fn from(index: usize) -> Self {
        PathElement::Index(index)
    }
}

impl From<PathElement<'_>> for Detached {
    fn from(element: PathElement<'_>) -> Self {
        match element {
            PathElement::Field(name) => Detached::Name {
                name: name.to_owned(),
                quoted: false,
            },
            PathElement::Index(index) => Detached::Index(isize::try_from(index).unwrap_or(isize::MAX)),
            PathElement::Unbound => Detached::Index(IndexSegment::UNBOUND),
        }
    }
}

impl FieldPath {
    /// A path with `root` as its first segment. An empty root gives the [empty](Self::empty)
    /// path.
    pub fn new(root: NameSegment) -> Self {
        Self::from_segment(Segment::Name(root)).canonicalize()
    }

    /// The root must be a name segment.
    fn from_segment(root: Segment) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    /// Builds a path from pre-split elements. Nothing is parsed or unescaped.
    pub fn from_elements<'a>(
        root: &str,
        elements: impl IntoIterator<Item = PathElement<'a>>,
    ) -> Self {
        let parts = elements.into_iter().map(Detached::from).collect();
        Self::new(NameSegment::new(root, false, segment::link(parts, None)))
    }

    /// The canonical empty path. Every empty path parses to this instance.
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    pub fn is_empty(&self) -> bool {
        *self == *EMPTY
    }

    /// Whether both values share the same segment chain.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.root, &b.root)
    }

    /// Parses the text form of a path.
    pub fn parse_from(path: &str) -> Result<Self, FieldPathError> {
        if path.is_empty() {
            return Ok(Self::empty());
        }

        let root = Parser::new(path).parse().map_err(|error| {
            debug!(message = "Unable to parse field path.", path = %path, %error);
            error
        })?;

        Ok(Self::new(root))
    }

    fn canonicalize(self) -> Self {
        if !Self::ptr_eq(&self, &EMPTY) && self.is_empty() {
            trace!(message = "Field path canonicalized to the empty path.", path = %self);
            return Self::empty();
        }
        self
    }

    pub fn root(&self) -> &Segment {
        &self.root
    }

    /// Same as [`FieldPath::root`].
    pub fn get_root_segment(&self) -> &Segment {
        self.root()
    }

    pub fn iter(&self) -> SegmentIter<'_> {
        self.root.iter()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// Renders the path. With `quote` set, every name segment is quoted; otherwise only the ones
    /// that were quoted when parsed or built.
    pub fn as_path_str(&self, quote: bool) -> String {
        self.root.as_path_str(quote)
    }

    /// Renders the path as a single JSON string literal, e.g. for use as an object key.
    pub fn as_json_str(&self) -> String {
        format!("\"{}\"", self.as_path_str(false).replace('"', "\\\""))
    }

    /// A new path with `parent` as its first segment. A quoted `parent` is unquoted first.
    pub fn with_field_prefix(&self, parent: &str) -> Result<Self, FieldPathError> {
        let (name, quoted) = if escape::is_quoted(parent) {
            (escape::unquote(parent)?, true)
        } else {
            (parent.to_owned(), false)
        };

        let child = (!self.is_empty()).then(|| self.root().clone());
        Ok(Self::new(NameSegment::new(name, quoted, child)))
    }

    pub fn with_field_appended(&self, field: &str) -> Self {
        self.with_segment_appended(NameSegment::leaf(field).into())
    }

    pub fn with_index_appended(&self, index: isize) -> Result<Self, FieldPathError> {
        let segment = IndexSegment::new(index, None)?;
        Ok(self.with_segment_appended(segment.into()))
    }

    /// A new path with `segment` (and its children) attached below the deepest segment.
    pub fn with_segment_appended(&self, segment: Segment) -> Self {
        match segment {
            Segment::Name(root) if self.is_empty() => Self::new(root),
            segment => Self::from_segment(self.root.with_appended(segment)),
        }
    }

    /// The part of this path below `ancestor`.
    ///
    /// Returns the empty path when both are equal, and `None` when `ancestor` is not a prefix
    /// of this path or the remainder would start with an index.
    pub fn after_ancestor(&self, ancestor: &FieldPath) -> Option<FieldPath> {
        if Self::ptr_eq(self, ancestor) {
            return Some(Self::empty());
        }
        if ancestor.is_empty() {
            return Some(self.clone());
        }

        let mut ours = self.iter();
        let mut theirs = ancestor.iter();
        loop {
            match (ours.next(), theirs.next()) {
                (Some(a), Some(b)) if a.segment_eq(b) => continue,
                (None, None) => return Some(Self::empty()),
                (Some(Segment::Name(rest)), None) => {
                    return Some(Self::new(rest.clone()))
                }
                _ => return None,
            }
        }
    }

    /// The first segment of this path that `ancestor` doesn't cover.
    ///
    /// The root of the empty path is returned when both are equal.
    pub fn segment_after_ancestor(&self, ancestor: &FieldPath) -> Option<&Segment> {
        if ancestor.is_empty() {
            return Some(self.root());
        }

        let mut ours = self.iter();
        let mut theirs = ancestor.iter();
        loop {
            match (ours.next(), theirs.next()) {
                (Some(a), Some(b)) if a.segment_eq(b) => continue,
                (None, None) => return Some(EMPTY.root()),
                (Some(rest), None) => return Some(rest),
                _ => return None,
            }
        }
    }

    /// Whether this path is `other` or one of its descendants.
    pub fn is_at_or_below(&self, other: &FieldPath) -> bool {
        other.is_prefix_of(self)
    }

    /// Whether this path is `other` or one of its ancestors.
    pub fn is_at_or_above(&self, other: &FieldPath) -> bool {
        self.is_prefix_of(other)
    }

    fn is_prefix_of(&self, other: &FieldPath) -> bool {
        if Self::ptr_eq(self, other) || self.is_empty() {
            return true;
        }

        let mut theirs = other.iter();
        self.iter()
            .all(|ours| theirs.next().is_some_and(|segment| ours.segment_eq(segment)))
    }

    #[cfg(any(test, feature = "arbitrary", feature = "proptest"))]
    fn from_parts(parts: Vec<Detached>) -> Option<Self> {
        match segment::link(parts, None)? {
            root @ Segment::Name(_) => Some(Self::from_segment(root).canonicalize()),
            Segment::Index(_) => None,
        }
    }
}

impl Default for FieldPath {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for FieldPath {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.root == other.root
    }
}

impl Eq for FieldPath {}

impl PartialOrd for FieldPath {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldPath {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.root.cmp(&other.root)
    }
}

impl Hash for FieldPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.hash(state);
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_path_str(false))
    }
}

impl Debug for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldPath")
            .field(&self.as_path_str(true))
            .finish()
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Self::parse_from(src)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = FieldPathError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Self::parse_from(src)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = FieldPathError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Self::parse_from(&src)
    }
}

impl From<NameSegment> for FieldPath {
    fn from(root: NameSegment) -> Self {
        Self::new(root)
    }
}

impl<'a> IntoIterator for &'a FieldPath {
    type Item = &'a Segment;
    type IntoIter = SegmentIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The quoted form, which always parses back to an equal path.
impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.as_path_str(true)
    }
}

#[cfg(any(test, feature = "arbitrary"))]
impl quickcheck::Arbitrary for FieldPath {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        fn name(g: &mut quickcheck::Gen) -> Detached {
            Detached::Name {
                name: <String as quickcheck::Arbitrary>::arbitrary(g),
                quoted: <bool as quickcheck::Arbitrary>::arbitrary(g),
            }
        }

        let depth = <usize as quickcheck::Arbitrary>::arbitrary(g) % 6;
        let mut parts = vec![name(g)];
        for _ in 0..depth {
            if <bool as quickcheck::Arbitrary>::arbitrary(g) {
                let index = <u8 as quickcheck::Arbitrary>::arbitrary(g) % 20;
                parts.push(Detached::Index(isize::from(index) - 1));
            } else {
                parts.push(name(g));
            }
        }
        Self::from_parts(parts).unwrap_or_default()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let mut parts = self.iter().map(Detached::from).collect::<Vec<_>>();
        parts.pop();
        Box::new(Self::from_parts(parts).into_iter())
    }
}

#[cfg(any(test, feature = "proptest"))]
impl Arbitrary for FieldPath {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        let name = ("(?s).{0,8}", any::<bool>());
        let part = prop_oneof![
            name.clone()
                .prop_map(|(name, quoted)| Detached::Name { name, quoted }),
            (-1isize..100).prop_map(Detached::Index),
        ];

        (name, prop::collection::vec(part, 0..8))
            .prop_map(|((name, quoted), mut parts)| {
                parts.insert(0, Detached::Name { name, quoted });
                FieldPath::from_parts(parts).unwrap_or_default()
            })
            .boxed()
    }
}
