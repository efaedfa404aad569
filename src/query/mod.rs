//! Query evaluation over the ring: patterns, per-pattern iterators, the variable order and the
//! leapfrog triejoin driver, plus the query-file parser.

mod gao;
mod iterator;
mod join;
mod parser;
mod pattern;

pub use gao::join_order;
pub use iterator::PatternIter;
pub use join::{LeapfrogJoin, Tuple};
pub use parser::{parse_query, Error as ParseError, Query};
pub use pattern::{Term, TriplePattern};
