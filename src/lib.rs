//! An online generalized suffix tree.
//!
//! "Generalized" because one tree indexes any number of sequences at
//! once; "online" because each sequence grows one symbol at a time via
//! [`SuffixTree::extend`] — there is no offline "feed me the whole string,
//! then build" step, and no sequence ever has to be finished before
//! another one starts.
//!
//! ```
//! use ogst::SuffixTree;
//!
//! let mut tree = SuffixTree::new();
//! tree.extend_all("s0", b"banana".iter().copied());
//! tree.extend_all("s1", b"bandana".iter().copied());
//!
//! assert!(tree.contains(b"ana").present);
//! assert!(!tree.contains(b"xyz").present);
//! ```

pub mod alphabet;
pub mod error;
pub mod sequence;
pub mod tree;

pub use alphabet::Symbol;
pub use error::QueryError;
pub use sequence::SequenceId;
pub use tree::{EdgeView, Occurrences, PatternOccurrence, SuffixTree};
