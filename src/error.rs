//! The one recoverable, typed failure mode the query layer exposes.
//!
//! Everything else the tree's invariants rule out (a split position past an
//! edge's end, an active edge missing from its node's children, stealing an
//! edge that turns out not to be open) is a bug, not a runtime condition a
//! caller can sensibly react to, so those stay `assert!`/`debug_assert!`
//! panics rather than `Result`s, matching how the teacher crate treats its
//! own invariants (`unwrap()`/`panic!()` in `root_node`/`internal_node`).

use thiserror::Error;

/// Failure of a query method, as opposed to a plain "not found" result.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum QueryError {
    /// An empty pattern was passed to a method that does not special-case
    /// it (see [`crate::SuffixTree::contains`] for the one method that
    /// does, and its documented convention for the empty pattern).
    #[error("empty pattern is not a valid argument to this query")]
    EmptyPattern,
}
