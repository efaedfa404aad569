//! The ring index: three BWT columns whose C arrays chain into a cycle.
//!
//! Column roles, fixed by the construction sort orders:
//! - `bwt_o` holds the O values of the relation sorted by (S, P, O); its blocks are subjects.
//! - `bwt_p` holds the P values sorted by (O, S, P); its blocks are objects.
//! - `bwt_s` holds the S values sorted by (P, O, S); its blocks are predicates.
//!
//! A backward step on one column plus the next column's C offset descends one trie edge, and the
//! cycle `bwt_o -> bwt_p -> bwt_s -> bwt_o` closes after three steps. That is what lets three
//! columns serve all six attribute orderings: an interval of rows with some attributes fixed
//! always lives in the column whose values are the next free attribute.

mod bwt;
mod interval;

pub use bwt::Bwt;
pub use interval::BwtInterval;

use std::fmt;
use std::io::{Read, Write};

use bytesize::ByteSize;
use log::debug;

use crate::containers::{read_u64, write_u64, BitSeq, PlainBits, SelectBits, SparseBits, WaveletMatrix};
use crate::{Id, Triple};

const MAGIC: &[u8; 4] = b"RING";
const FORMAT_VERSION: u8 = 1;

/// The bit-vector flavour an index was built with. Stored in the file header so every on-disk
/// format is self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingVariant {
    /// Plain bit vectors, seeks through `inverse_select`. The default.
    Plain,
    /// Elias–Fano compressed bit vectors, smallest and slowest.
    Compressed,
    /// Plain bit vectors with select hints, seeks through `select_next` strides.
    PlainSelect,
}

impl RingVariant {
    pub(crate) fn tag(self) -> u8 {
        match self {
            RingVariant::Plain => 1,
            RingVariant::Compressed => 2,
            RingVariant::PlainSelect => 3,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(RingVariant::Plain),
            2 => Some(RingVariant::Compressed),
            3 => Some(RingVariant::PlainSelect),
            _ => None,
        }
    }

    /// The variant named by a CLI argument or an index file extension.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ring" => Some(RingVariant::Plain),
            "c-ring" => Some(RingVariant::Compressed),
            "ring-sel" => Some(RingVariant::PlainSelect),
            _ => None,
        }
    }
}

impl fmt::Display for RingVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RingVariant::Plain => "ring",
            RingVariant::Compressed => "c-ring",
            RingVariant::PlainSelect => "ring-sel",
        })
    }
}

/// The error type for building and (de)serializing rings.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("succinct payload is corrupt: {0}")]
    Succinct(#[source] anyhow::Error),
    #[error("not a ring index (bad magic)")]
    BadMagic,
    #[error("unsupported index format version {0}")]
    BadVersion(u8),
    #[error("unknown index flavour tag {0}")]
    UnknownFlavour(u8),
    #[error("index flavour mismatch: file holds a {found}, expected a {expected}")]
    FlavourMismatch { found: RingVariant, expected: RingVariant },
}

pub type Result<T> = core::result::Result<T, Error>;

/// The compressed triple index. `B` selects the bit-vector flavour of the three columns.
#[derive(Debug, Clone)]
pub struct Ring<B: BitSeq = PlainBits> {
    bwt_s: Bwt<B>,
    bwt_p: Bwt<B>,
    bwt_o: Bwt<B>,
    max_s: Id,
    max_p: Id,
    max_o: Id,
    n_triples: usize,
}

/// Compressed flavour, the `c-ring` of the CLI.
pub type CRing = Ring<SparseBits>;
/// Select-hinted flavour, the `ring-sel` of the CLI.
pub type RingSel = Ring<SelectBits>;

impl<B: BitSeq> Ring<B> {
    /// Builds the index over the given triples. IDs must be positive; the input order is
    /// irrelevant and duplicates must have been removed by the caller.
    pub fn new(mut triples: Vec<Triple>) -> Self {
        debug_assert!(triples.iter().all(|t| t.s > 0 && t.p > 0 && t.o > 0));
        let n = triples.len();
        let max_p = triples.iter().map(|t| t.p).max().unwrap_or(0);
        let max_so = triples.iter().map(|t| t.s.max(t.o)).max().unwrap_or(0);
        debug!("indexing {n} triples (sigma_SO = {max_so}, sigma_P = {max_p})");
        let so_width = WaveletMatrix::<B>::needed_width(max_so);

        // B_O: sort by (S, P, O), emit O; blocks are subjects.
        triples.sort_unstable();
        let c_o = c_array(&histogram(triples.iter().map(|t| t.s), max_so), n);
        let column: Vec<Id> = std::iter::once(0).chain(triples.iter().map(|t| t.o)).collect();
        let bwt_o = Bwt::new(&column, &c_o, so_width);

        // B_P: stable sort by O on top of the previous pass gives (O, S, P); blocks are objects.
        triples.sort_by_key(|t| t.o);
        let c_p = c_array(&histogram(triples.iter().map(|t| t.o), max_so), n);
        let column: Vec<Id> = std::iter::once(0).chain(triples.iter().map(|t| t.p)).collect();
        let bwt_p = Bwt::new(&column, &c_p, WaveletMatrix::<B>::needed_width(max_p));

        // B_S: stable sort by P gives (P, O, S); blocks are predicates.
        triples.sort_by_key(|t| t.p);
        let c_s = c_array(&histogram(triples.iter().map(|t| t.p), max_p), n);
        let column: Vec<Id> = std::iter::once(0).chain(triples.iter().map(|t| t.s)).collect();
        let bwt_s = Bwt::new(&column, &c_s, so_width);

        let ring = Ring { bwt_s, bwt_p, bwt_o, max_s: max_so, max_p, max_o: max_so, n_triples: n };
        debug!("ring built: {}", ByteSize(ring.size_in_bytes() as u64));
        ring
    }

    pub fn variant(&self) -> RingVariant {
        expected_variant::<B>()
    }

    pub fn n_triples(&self) -> usize {
        self.n_triples
    }

    pub fn max_s(&self) -> Id {
        self.max_s
    }

    pub fn max_p(&self) -> Id {
        self.max_p
    }

    pub fn max_o(&self) -> Id {
        self.max_o
    }

    /// Recursive size in bytes on the heap.
    pub fn size_in_bytes(&self) -> usize {
        self.bwt_s.size_in_bytes() + self.bwt_p.size_in_bytes() + self.bwt_o.size_in_bytes()
    }

    /// The full row range of any column, the top of every trie.
    pub fn open(&self) -> BwtInterval {
        BwtInterval::new(1, self.n_triples)
    }

    // ---- fan-out: fixing the first attribute of an ordering ----

    /// Rows of subject `s`, an interval in `bwt_o`.
    pub fn down_s(&self, s: Id) -> BwtInterval {
        let (l, r) = self.bwt_o.backward_search_1_interval(s);
        BwtInterval::new(l, r)
    }

    /// Rows of predicate `p`, an interval in `bwt_s`.
    pub fn down_p(&self, p: Id) -> BwtInterval {
        let (l, r) = self.bwt_s.backward_search_1_interval(p);
        BwtInterval::new(l, r)
    }

    /// Rows of object `o`, an interval in `bwt_p`.
    pub fn down_o(&self, o: Id) -> BwtInterval {
        let (l, r) = self.bwt_p.backward_search_1_interval(o);
        BwtInterval::new(l, r)
    }

    // ---- one-step descents along the cycle ----

    /// From a subject interval in `bwt_o`, fix object `o`; lands in `bwt_p`.
    pub fn down_s_o(&self, i: &BwtInterval, o: Id) -> BwtInterval {
        step(self.bwt_o.backward_step(i.left(), i.right(), o), self.bwt_p.get_c(o))
    }

    /// From an object interval in `bwt_p`, fix predicate `p`; lands in `bwt_s`.
    pub fn down_o_p(&self, i: &BwtInterval, p: Id) -> BwtInterval {
        step(self.bwt_p.backward_step(i.left(), i.right(), p), self.bwt_s.get_c(p))
    }

    /// From a predicate interval in `bwt_s`, fix subject `s`; lands in `bwt_o`.
    pub fn down_p_s(&self, i: &BwtInterval, s: Id) -> BwtInterval {
        step(self.bwt_s.backward_step(i.left(), i.right(), s), self.bwt_o.get_c(s))
    }

    // ---- skip descents: fixing the middle attribute of an ordering ----
    //
    // The sub-interval of the pair (bound, fixed) inside the already-open block. Its offset is
    // the number of occurrences of the bound value before the fixed value's block in the counting
    // column, which the preceding leap usually left in the interval cache.

    /// From the subject interval of `s` in `bwt_o`, fix predicate `p`; stays in `bwt_o`.
    pub fn down_s_p(&self, i: &BwtInterval, s: Id, p: Id) -> BwtInterval {
        skip_step(i, &self.bwt_s, s, p)
    }

    /// From the predicate interval of `p` in `bwt_s`, fix object `o`; stays in `bwt_s`.
    pub fn down_p_o(&self, i: &BwtInterval, p: Id, o: Id) -> BwtInterval {
        skip_step(i, &self.bwt_p, p, o)
    }

    /// From the object interval of `o` in `bwt_p`, fix subject `s`; stays in `bwt_p`.
    pub fn down_o_s(&self, i: &BwtInterval, o: Id, s: Id) -> BwtInterval {
        skip_step(i, &self.bwt_o, o, s)
    }

    // ---- minimum and successor per attribute ----
    //
    // The easy directions are a range minimum or range successor on the column the interval
    // lives in. The hard directions (the free attribute two steps ahead in the cycle) stride
    // over C blocks of the counting column and memoize their position in the interval cache.

    pub fn min_s(&self, i: &BwtInterval) -> Id {
        self.bwt_s.min_in_range(i.left(), i.right())
    }

    pub fn next_s(&self, i: &BwtInterval, lb: Id) -> Id {
        if lb > self.max_s {
            return 0;
        }
        self.bwt_s.range_next_value(lb, i.left(), i.right())
    }

    pub fn min_s_in_p(&self, i: &BwtInterval) -> Id {
        self.min_s(i)
    }

    pub fn next_s_in_p(&self, i: &BwtInterval, lb: Id) -> Id {
        self.next_s(i, lb)
    }

    pub fn min_s_in_po(&self, i: &BwtInterval) -> Id {
        self.min_s(i)
    }

    pub fn next_s_in_po(&self, i: &BwtInterval, lb: Id) -> Id {
        self.next_s(i, lb)
    }

    pub fn min_p(&self, i: &BwtInterval) -> Id {
        self.bwt_p.min_in_range(i.left(), i.right())
    }

    pub fn next_p(&self, i: &BwtInterval, lb: Id) -> Id {
        if lb > self.max_p {
            return 0;
        }
        self.bwt_p.range_next_value(lb, i.left(), i.right())
    }

    pub fn min_p_in_o(&self, i: &BwtInterval) -> Id {
        self.min_p(i)
    }

    pub fn next_p_in_o(&self, i: &BwtInterval, lb: Id) -> Id {
        self.next_p(i, lb)
    }

    pub fn min_p_in_so(&self, i: &BwtInterval) -> Id {
        self.min_p(i)
    }

    pub fn next_p_in_so(&self, i: &BwtInterval, lb: Id) -> Id {
        self.next_p(i, lb)
    }

    pub fn min_o(&self, i: &BwtInterval) -> Id {
        self.bwt_o.min_in_range(i.left(), i.right())
    }

    pub fn next_o(&self, i: &BwtInterval, lb: Id) -> Id {
        if lb > self.max_o {
            return 0;
        }
        self.bwt_o.range_next_value(lb, i.left(), i.right())
    }

    pub fn min_o_in_s(&self, i: &BwtInterval) -> Id {
        self.min_o(i)
    }

    pub fn next_o_in_s(&self, i: &BwtInterval, lb: Id) -> Id {
        self.next_o(i, lb)
    }

    pub fn min_o_in_sp(&self, i: &BwtInterval) -> Id {
        self.min_o(i)
    }

    pub fn next_o_in_sp(&self, i: &BwtInterval, lb: Id) -> Id {
        self.next_o(i, lb)
    }

    // ---- the hard directions ----

    /// Smallest predicate co-occurring with subject `s`; `i` is the subject interval in `bwt_o`.
    pub fn min_p_in_s(&self, i: &mut BwtInterval, s: Id) -> Id {
        self.next_p_in_s(i, s, 1)
    }

    /// Least predicate `>= lb` co-occurring with subject `s`.
    pub fn next_p_in_s(&self, i: &mut BwtInterval, s: Id, lb: Id) -> Id {
        if lb > self.max_p {
            return 0;
        }
        let found = if B::FAST_SELECT {
            self.bwt_s.select_next(lb, s, i.len()).map(|(pos, r)| (self.bwt_s.block_of(pos), r))
        } else {
            self.hard_fallback(&self.bwt_s, &self.bwt_o, &self.bwt_p, i, lb, s)
        };
        finish_hard(i, found)
    }

    /// Smallest subject co-occurring with object `o`; `i` is the object interval in `bwt_p`.
    pub fn min_s_in_o(&self, i: &mut BwtInterval, o: Id) -> Id {
        self.next_s_in_o(i, o, 1)
    }

    /// Least subject `>= lb` co-occurring with object `o`.
    pub fn next_s_in_o(&self, i: &mut BwtInterval, o: Id, lb: Id) -> Id {
        if lb > self.max_s {
            return 0;
        }
        let found = if B::FAST_SELECT {
            self.bwt_o.select_next(lb, o, i.len()).map(|(pos, r)| (self.bwt_o.block_of(pos), r))
        } else {
            self.hard_fallback(&self.bwt_o, &self.bwt_p, &self.bwt_s, i, lb, o)
        };
        finish_hard(i, found)
    }

    /// Smallest object co-occurring with predicate `p`; `i` is the predicate interval in `bwt_s`.
    pub fn min_o_in_p(&self, i: &mut BwtInterval, p: Id) -> Id {
        self.next_o_in_p(i, p, 1)
    }

    /// Least object `>= lb` co-occurring with predicate `p`.
    pub fn next_o_in_p(&self, i: &mut BwtInterval, p: Id, lb: Id) -> Id {
        if lb > self.max_o {
            return 0;
        }
        let found = if B::FAST_SELECT {
            self.bwt_p.select_next(lb, p, i.len()).map(|(pos, r)| (self.bwt_p.block_of(pos), r))
        } else {
            self.hard_fallback(&self.bwt_p, &self.bwt_s, &self.bwt_o, i, lb, p)
        };
        finish_hard(i, found)
    }

    // Select-free route to the same answer: the r-th row of the interval is the first one whose
    // free attribute reaches `lb`; `inverse_select` on the interval's column and one access on
    // the next column of the cycle read that attribute off.
    fn hard_fallback(
        &self, count_col: &Bwt<B>, interval_col: &Bwt<B>, value_col: &Bwt<B>, i: &BwtInterval, lb: Id, bound: Id,
    ) -> Option<(Id, usize)> {
        let r = count_col.block_rank(lb, bound);
        if r >= i.len() {
            return None;
        }
        let (k, mid) = interval_col.inverse_select(i.left() + r);
        Some((value_col.access(value_col.get_c(mid) + k), r))
    }

    // ---- enumeration ----

    pub fn all_s_in_range(&self, i: &BwtInterval) -> Vec<Id> {
        self.bwt_s.values_in_range(i.left(), i.right())
    }

    pub fn all_p_in_range(&self, i: &BwtInterval) -> Vec<Id> {
        self.bwt_p.values_in_range(i.left(), i.right())
    }

    pub fn all_o_in_range(&self, i: &BwtInterval) -> Vec<Id> {
        self.bwt_o.values_in_range(i.left(), i.right())
    }

    // ---- direct interval resolution for multi-constant patterns ----

    /// Rows of the pair (s, p): an interval in `bwt_o` where the objects of `s p ?o` live.
    pub fn interval_sp(&self, s: Id, p: Id) -> BwtInterval {
        if s == 0 || p == 0 || s > self.max_s || p > self.max_p {
            return BwtInterval::empty();
        }
        let ranks = self.bwt_s.backward_search_1_rank(p, s);
        interval(self.bwt_o.backward_search_2_interval(s, ranks))
    }

    /// Rows of the pair (s, o): an interval in `bwt_p` where the predicates of `s ?p o` live.
    pub fn interval_so(&self, s: Id, o: Id) -> BwtInterval {
        if s == 0 || o == 0 || s > self.max_s || o > self.max_o {
            return BwtInterval::empty();
        }
        let ranks = self.bwt_o.backward_search_1_rank(s, o);
        interval(self.bwt_p.backward_search_2_interval(o, ranks))
    }

    /// Rows of the pair (p, o): an interval in `bwt_s` where the subjects of `?s p o` live.
    pub fn interval_po(&self, p: Id, o: Id) -> BwtInterval {
        if p == 0 || o == 0 || p > self.max_p || o > self.max_o {
            return BwtInterval::empty();
        }
        let ranks = self.bwt_p.backward_search_1_rank(o, p);
        interval(self.bwt_s.backward_search_2_interval(p, ranks))
    }

    /// The single row of the triple (s, p, o), empty if the triple is not in the relation.
    pub fn interval_spo(&self, s: Id, p: Id, o: Id) -> BwtInterval {
        if s == 0 || p == 0 || o == 0 || s > self.max_s || p > self.max_p || o > self.max_o {
            return BwtInterval::empty();
        }
        let ranks = self.bwt_p.backward_search_1_rank(o, p);
        let ranks = self.bwt_s.backward_search_2_rank(p, s, ranks);
        interval(self.bwt_o.backward_search_2_interval(s, ranks))
    }

    // ---- the LF cycle ----
    //
    // Each column stores the C array of the ordering it is sorted by, so the classic LF step
    // pairs a row's value with the *next* column's C. Three steps return to the start, one
    // ordering rotation per step; `tests::lf_cycle` checks the period.

    /// Row of `bwt_p` holding the triple that row `i` of `bwt_o` holds.
    pub fn lf_s(&self, i: usize) -> usize {
        let (r, o) = self.bwt_o.inverse_select(i);
        self.bwt_p.get_c(o) + r
    }

    /// Row of `bwt_s` holding the triple that row `i` of `bwt_p` holds.
    pub fn lf_o(&self, i: usize) -> usize {
        let (r, p) = self.bwt_p.inverse_select(i);
        self.bwt_s.get_c(p) + r
    }

    /// Row of `bwt_o` holding the triple that row `i` of `bwt_s` holds.
    pub fn lf_p(&self, i: usize) -> usize {
        let (r, s) = self.bwt_s.inverse_select(i);
        self.bwt_o.get_c(s) + r
    }

    // ---- persistence ----

    /// Writes the index: a header naming the flavour, the three columns S, P, O, then the four
    /// size words. Byte-for-byte reproducible for a given input.
    pub fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(MAGIC)?;
        writer.write_all(&[FORMAT_VERSION, self.variant().tag()])?;
        let mut written = MAGIC.len() + 2;
        written += self.bwt_s.serialize_into(writer).map_err(Error::Succinct)?;
        written += self.bwt_p.serialize_into(writer).map_err(Error::Succinct)?;
        written += self.bwt_o.serialize_into(writer).map_err(Error::Succinct)?;
        for field in [self.max_s, self.max_p, self.max_o, self.n_triples] {
            written += write_u64(writer, field).map_err(Error::Succinct)?;
        }
        Ok(written)
    }

    /// Reads an index written by [`Ring::serialize_into`]. The flavour recorded in the file must
    /// match `B`.
    pub fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; 6];
        reader.read_exact(&mut header)?;
        if &header[..4] != MAGIC {
            return Err(Error::BadMagic);
        }
        if header[4] != FORMAT_VERSION {
            return Err(Error::BadVersion(header[4]));
        }
        let found = RingVariant::from_tag(header[5]).ok_or(Error::UnknownFlavour(header[5]))?;
        let expected = expected_variant::<B>();
        if found != expected {
            return Err(Error::FlavourMismatch { found, expected });
        }
        let bwt_s = Bwt::deserialize_from(reader).map_err(Error::Succinct)?;
        let bwt_p = Bwt::deserialize_from(reader).map_err(Error::Succinct)?;
        let bwt_o = Bwt::deserialize_from(reader).map_err(Error::Succinct)?;
        let max_s = read_u64(reader).map_err(Error::Succinct)?;
        let max_p = read_u64(reader).map_err(Error::Succinct)?;
        let max_o = read_u64(reader).map_err(Error::Succinct)?;
        let n_triples = read_u64(reader).map_err(Error::Succinct)?;
        let ring = Ring { bwt_s, bwt_p, bwt_o, max_s, max_p, max_o, n_triples };
        debug!("ring loaded: {} triples, {}", n_triples, ByteSize(ring.size_in_bytes() as u64));
        Ok(ring)
    }
}

fn expected_variant<B: BitSeq>() -> RingVariant {
    match (B::COMPRESSED, B::FAST_SELECT) {
        (true, _) => RingVariant::Compressed,
        (false, true) => RingVariant::PlainSelect,
        (false, false) => RingVariant::Plain,
    }
}

fn interval((l, r): (usize, usize)) -> BwtInterval {
    BwtInterval::new(l, r)
}

fn step(ranks: (usize, usize), c: usize) -> BwtInterval {
    if ranks.1 <= ranks.0 {
        return BwtInterval::empty();
    }
    BwtInterval::new(c + ranks.0, c + ranks.1 - 1)
}

fn skip_step<B: BitSeq>(i: &BwtInterval, count_col: &Bwt<B>, bound: Id, fixed: Id) -> BwtInterval {
    let below = count_col.block_rank(fixed, bound);
    let start = match i.cache() {
        Some((value, rank)) if value == fixed => rank,
        _ => below,
    };
    let n = count_col.block_rank(fixed + 1, bound) - below;
    if n == 0 {
        return BwtInterval::empty();
    }
    BwtInterval::new(i.left() + start, i.left() + start + n - 1)
}

fn finish_hard(i: &mut BwtInterval, found: Option<(Id, usize)>) -> Id {
    match found {
        Some((value, rank)) => {
            i.set_cache(value, rank);
            value
        }
        None => 0,
    }
}

// C array from a block histogram: [0, C[1] = 1, .., C[sigma], n + 1]. Blocks are 1-based; the
// leading 0 is the dummy entry of the sentinel symbol.
fn c_array(hist: &[usize], n: usize) -> Vec<usize> {
    let sigma = hist.len() - 1;
    if sigma == 0 {
        return vec![0, n + 1];
    }
    let mut c = Vec::with_capacity(sigma + 2);
    c.push(0);
    let mut cur = 1;
    c.push(cur);
    for v in 2..=sigma {
        cur += hist[v - 1];
        c.push(cur);
    }
    c.push(n + 1);
    c
}

fn histogram(values: impl Iterator<Item = Id>, max: Id) -> Vec<usize> {
    let mut hist = vec![0usize; max + 1];
    for v in values {
        hist[v] += 1;
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // T = {(1,1,2), (1,1,3), (1,2,2), (2,1,3), (2,2,3)}; sigma_SO = 3, sigma_P = 2.
    pub fn tiny<B: BitSeq>() -> Ring<B> {
        crate::tests::init();
        Ring::new(vec![
            Triple::new(1, 1, 2),
            Triple::new(1, 1, 3),
            Triple::new(1, 2, 2),
            Triple::new(2, 1, 3),
            Triple::new(2, 2, 3),
        ])
    }

    #[test]
    fn fan_out() {
        let ring: Ring = tiny();
        assert_eq!(ring.n_triples(), 5);
        assert_eq!((ring.max_s(), ring.max_p(), ring.max_o()), (3, 2, 3));
        // subject blocks in bwt_o: s=1 rows [1,3], s=2 rows [4,5], s=3 empty
        assert_eq!((ring.down_s(1).left(), ring.down_s(1).right()), (1, 3));
        assert_eq!((ring.down_s(2).left(), ring.down_s(2).right()), (4, 5));
        assert!(ring.down_s(3).is_empty());
        // predicate blocks in bwt_s: p=1 rows [1,3], p=2 rows [4,5]
        assert_eq!((ring.down_p(1).left(), ring.down_p(1).right()), (1, 3));
        assert_eq!((ring.down_p(2).left(), ring.down_p(2).right()), (4, 5));
        // object blocks in bwt_p: o=1 empty, o=2 rows [1,2], o=3 rows [3,5]
        assert!(ring.down_o(1).is_empty());
        assert_eq!((ring.down_o(2).left(), ring.down_o(2).right()), (1, 2));
        assert_eq!((ring.down_o(3).left(), ring.down_o(3).right()), (3, 5));
    }

    #[test]
    fn full_ranges() {
        let ring: Ring = tiny();
        let open = ring.open();
        assert_eq!(ring.min_s(&open), 1);
        assert_eq!(ring.next_s(&open, 2), 2);
        assert_eq!(ring.next_s(&open, 3), 0); // 3 never occurs as a subject
        assert_eq!(ring.next_s(&open, 4), 0); // beyond sigma
        assert_eq!(ring.min_p(&open), 1);
        assert_eq!(ring.next_p(&open, 3), 0);
        assert_eq!(ring.min_o(&open), 2);
        assert_eq!(ring.next_o(&open, 1), 2); // lower bound below the range minimum
        assert_eq!(ring.all_o_in_range(&open), vec![2, 3]);
    }

    #[test]
    fn descend_spo() {
        let ring: Ring = tiny();
        // ?x 1 2: fix o = 2, then p = 1, leap the subject
        let i_p = ring.down_o(2);
        assert_eq!(ring.min_p_in_o(&i_p), 1);
        let i_s = ring.down_o_p(&i_p, 1);
        assert_eq!(ring.min_s_in_po(&i_s), 1);
        assert_eq!(ring.next_s_in_po(&i_s, 2), 0);
        // s = 2: objects of subject 2 are {3}
        let i_o = ring.down_s(2);
        assert_eq!(ring.min_o_in_s(&i_o), 3);
        assert_eq!(ring.next_o_in_s(&i_o, 4), 0);
        // (s, o) = (2, 3): predicates {1, 2}
        let i_p = ring.down_s_o(&i_o, 3);
        assert_eq!(ring.min_p_in_so(&i_p), 1);
        assert_eq!(ring.next_p_in_so(&i_p, 2), 2);
    }

    fn hard_directions<B: BitSeq>() {
        let ring: Ring<B> = tiny();
        // predicates of subject 1 are {1, 2}, of subject 2 are {1, 2}
        let mut i = ring.down_s(1);
        assert_eq!(ring.min_p_in_s(&mut i, 1), 1);
        assert_eq!(ring.next_p_in_s(&mut i, 1, 2), 2);
        assert_eq!(ring.next_p_in_s(&mut i, 1, 3), 0);
        // the cached stride must line up with the matching skip descent:
        // (s, p) = (1, 2) covers the single triple (1, 2, 2)
        let mut i = ring.down_s(1);
        assert_eq!(ring.next_p_in_s(&mut i, 1, 2), 2);
        let pair = ring.down_s_p(&i, 1, 2);
        assert_eq!(ring.all_o_in_range(&pair), vec![2]);
        // subjects of object 3 are {1, 2}
        let mut i = ring.down_o(3);
        assert_eq!(ring.min_s_in_o(&mut i, 3), 1);
        assert_eq!(ring.next_s_in_o(&mut i, 3, 2), 2);
        assert_eq!(ring.next_s_in_o(&mut i, 3, 3), 0);
        let pair = ring.down_o_s(&i, 3, 2);
        assert_eq!(ring.all_p_in_range(&pair), vec![1, 2]);
        // objects of predicate 2 are {2, 3}
        let mut i = ring.down_p(2);
        assert_eq!(ring.min_o_in_p(&mut i, 2), 2);
        assert_eq!(ring.next_o_in_p(&mut i, 2, 3), 3);
        assert_eq!(ring.next_o_in_p(&mut i, 2, 4), 0);
        let pair = ring.down_p_o(&i, 2, 3);
        assert_eq!(ring.all_s_in_range(&pair), vec![2]);
    }

    #[test]
    fn hard_directions_fallback() {
        hard_directions::<PlainBits>();
        hard_directions::<SparseBits>();
    }

    #[test]
    fn hard_directions_stride() {
        hard_directions::<SelectBits>();
    }

    #[test]
    fn skip_descent_without_cache() {
        let ring: Ring = tiny();
        // no preceding leap: the offset is recomputed from block_rank
        let i = ring.down_s(1);
        let pair = ring.down_s_p(&i, 1, 1);
        assert_eq!(ring.all_o_in_range(&pair), vec![2, 3]);
        let pair = ring.down_s_p(&i, 1, 2);
        assert_eq!(ring.all_o_in_range(&pair), vec![2]);
    }

    #[test]
    fn pair_intervals() {
        let ring: Ring = tiny();
        assert_eq!(ring.all_o_in_range(&ring.interval_sp(1, 1)), vec![2, 3]);
        assert_eq!(ring.all_p_in_range(&ring.interval_so(2, 3)), vec![1, 2]);
        assert_eq!(ring.all_s_in_range(&ring.interval_po(2, 3)), vec![2]);
        assert!(ring.interval_sp(3, 1).is_empty());
        assert!(ring.interval_po(1, 1).is_empty());
        assert!(ring.interval_sp(9, 1).is_empty()); // beyond sigma
        assert_eq!(ring.interval_spo(1, 2, 2).len(), 1);
        assert!(ring.interval_spo(1, 2, 3).is_empty());
    }

    #[test]
    fn lf_cycle() {
        let ring: Ring = tiny();
        for i in 1..=ring.n_triples() {
            let j = ring.lf_p(ring.lf_o(ring.lf_s(i)));
            assert_eq!(j, i, "LF cycle broken at row {i}");
        }
    }

    #[test]
    fn empty_relation() {
        crate::tests::init();
        let ring: Ring = Ring::new(Vec::new());
        assert_eq!(ring.n_triples(), 0);
        assert!(ring.open().is_empty());
        assert_eq!(ring.min_s(&ring.open()), 0);
        assert_eq!(ring.next_o(&ring.open(), 1), 0);
    }

    #[test]
    fn variants_agree() {
        let plain: Ring = tiny();
        let sel: RingSel = tiny();
        let open = plain.open();
        for lb in 1..=4 {
            assert_eq!(plain.next_o(&open, lb), sel.next_o(&sel.open(), lb));
        }
        assert_eq!(plain.variant(), RingVariant::Plain);
        assert_eq!(sel.variant(), RingVariant::PlainSelect);
        assert_eq!(tiny::<SparseBits>().variant(), RingVariant::Compressed);
    }
}
