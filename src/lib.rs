#![deny(warnings)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(unused_allocation)]
#![deny(unused_extern_crates)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![allow(clippy::module_name_repetitions)]

//! Field paths are dotted / bracketed addresses into nested documents, such as `a.b[3].c`.
//!
//! This crate parses them into an immutable chain of [`Segment`]s wrapped by a [`FieldPath`],
//! compares them canonically (ignoring quoting and case), and renders them back to text.
//!
//! ```
//! use field_path::{FieldPath, QuoteMode};
//!
//! let path = FieldPath::parse_from("a.b[3].c").unwrap();
//! assert_eq!(path.as_path_str(true), r#""a"."b"[3]."c""#);
//! assert_eq!(field_path::serialize_field_path(&path, QuoteMode::Json), r#""a.b[3].c""#);
//! ```

pub mod path;

pub use path::{
    parse_field_path, serialize_field_path, FieldPath, FieldPathError, IndexSegment, NameSegment,
    PathElement, QuoteMode, Segment, SegmentIter, SegmentType, SyntaxErrorKind,
};
