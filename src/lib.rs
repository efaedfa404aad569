//! A compressed, self-indexed store for integer (subject, predicate, object) triples that answers
//! basic graph patterns with a worst-case-optimal leapfrog triejoin.
//!
//! The whole index is a *ring*: three Burrows–Wheeler-transformed columns of the triple relation,
//! one per attribute, whose cumulative-count arrays chain into a cycle. Backward search on the
//! cycle realizes all six attribute orderings (SPO, SOP, PSO, POS, OSP, OPS), so every triple
//! pattern is a constant number of range computations and join variables can be eliminated in any
//! order.
//!
//! # Example
//! ```
//! use rdf_ring::query::{parse_query, LeapfrogJoin};
//! use rdf_ring::{Ring, Triple};
//!
//! let ring: Ring = Ring::new(vec![Triple::new(1, 1, 2), Triple::new(1, 2, 3), Triple::new(3, 1, 2)]);
//! let query = parse_query("?x 1 2 .").unwrap();
//! let mut join = LeapfrogJoin::new(&query.patterns, &ring);
//! assert_eq!(join.join(None, None).len(), 2);
//! ```
//!
//! The index is immutable once built; [`Ring::serialize_into`] and [`Ring::deserialize_from`]
//! round-trip it through a byte stream. The `build-index` and `query-index` binaries wrap the
//! library for batch use.

/// Wrappers around the succinct building blocks: bit-vector flavours and the wavelet matrix.
pub mod containers;

/// Plain-text loader for integer triple files.
pub mod dataset;

/// Query evaluation: triple patterns, leapfrog iterators, the variable order and the join driver.
pub mod query;

/// The ring index itself: BWT columns, intervals and the navigation operations.
pub mod ring;

pub use crate::query::{LeapfrogJoin, PatternIter, Term, TriplePattern};
pub use crate::ring::{CRing, Ring, RingSel, RingVariant};

/// Subject, predicate or object ID, starting at 1.
/// Subjects and objects share one ID space; predicates use a disjoint one.
/// The value 0 is reserved: operations return it to signal "no value here".
pub type Id = usize;

/// Identifier of a query variable, scoped to a single query.
pub type VarId = u8;

/// One triple of the relation, held as raw integer IDs.
///
/// The derived ordering is lexicographic on (S, P, O), which is the first of the three sort
/// passes of the index construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub s: Id,
    pub p: Id,
    pub o: Id,
}

impl Triple {
    pub const fn new(s: Id, p: Id, o: Id) -> Self {
        Triple { s, p, o }
    }
}
