//! The generic token type indexed by a [`crate::SuffixTree`].
//!
//! The teacher crate this module is descended from fixed the alphabet to a
//! small byte range up front (`Alphabet`, with a precomputed rank table so
//! children of a node could be stored in a dense `SmallVec`). An online
//! generalized suffix tree that is meant to index arbitrary token streams
//! (bytes, `char`, or application-defined event types) can't assume such a
//! range exists, so there is no `Alphabet` type here at all: any type that
//! is cheap to compare, clone and hash is a valid symbol.

use std::fmt::Debug;
use std::hash::Hash;

/// A single token of an indexed sequence.
///
/// `Clone` rather than `Copy` so that heavier token types (small enums
/// wrapping a `String`, for instance) are usable; the tree only ever clones
/// symbols when building the key of a child map, never per comparison.
pub trait Symbol: Eq + Hash + Clone + Debug {}

impl<T: Eq + Hash + Clone + Debug> Symbol for T {}
