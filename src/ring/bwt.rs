//! One BWT column: a wavelet matrix over the attribute values plus the C array of the attribute
//! the column is sorted by.
//!
//! The C array is a bit vector with ones at positions `C[v] + v`, so both directions are a single
//! rank or select: `C[v] = select1(v) - v` and the block containing a column position `p` is
//! `rank1(select0(p)) - 1`. The C bits always use the select-hinted plain flavour; only the
//! wavelet matrix varies with the index flavour.

use std::io::{Read, Write};

use crate::containers::{BitSeq, SelectBits, WaveletMatrix};
use crate::Id;

#[derive(Debug, Clone)]
pub struct Bwt<B: BitSeq> {
    seq: WaveletMatrix<B>,
    c: SelectBits,
}

impl<B: BitSeq> Bwt<B> {
    /// Builds the column from the value sequence (sentinel 0 at position 0 included) and the C
    /// vector `[0, C[1], .., C[sigma], n + 1]`.
    pub fn new(column: &[Id], c: &[usize], width: u32) -> Self {
        let last = c[c.len() - 1];
        let mut bits = vec![false; last + 1 + c.len()];
        for (v, &start) in c.iter().enumerate() {
            bits[start + v] = true;
        }
        Bwt { seq: WaveletMatrix::new(column, width), c: SelectBits::from_bits(&bits) }
    }

    /// Column length, including the sentinel at position 0.
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Start position of block `v`, i.e. the first row whose sort attribute equals `v`.
    pub fn get_c(&self, v: Id) -> usize {
        self.c.select1(v).expect("symbol beyond the column alphabet") - v
    }

    /// The block a column position belongs to: the `v` with `C[v] <= pos < C[v + 1]`.
    pub fn block_of(&self, pos: usize) -> Id {
        self.c.rank1(self.c.select0(pos).expect("position beyond the column length")) - 1
    }

    /// Number of rows in block `v`.
    pub fn n_elems(&self, v: Id) -> usize {
        self.get_c(v + 1) - self.get_c(v)
    }

    /// Occurrences of `v` in rows `[0, pos)`.
    pub fn rank(&self, pos: usize, v: Id) -> usize {
        self.seq.rank(pos, v)
    }

    /// Occurrences of `v` in all rows before block `b`.
    pub fn block_rank(&self, b: Id, v: Id) -> usize {
        self.seq.rank(self.get_c(b), v)
    }

    /// Row of the (k+1)-th occurrence of `v`.
    pub fn select(&self, k: usize, v: Id) -> Option<usize> {
        self.seq.select(k, v)
    }

    /// `(rank, value)` at a row; see [`WaveletMatrix::inverse_select`].
    pub fn inverse_select(&self, pos: usize) -> (usize, Id) {
        self.seq.inverse_select(pos)
    }

    /// The value stored at a row.
    pub fn access(&self, pos: usize) -> Id {
        self.seq.access(pos)
    }

    /// One backward-search step: the rank range of `v` within the inclusive row range `[l, r]`,
    /// returned half-open as `(rank(l, v), rank(r + 1, v))`. Equal bounds mean `v` does not occur
    /// there.
    pub fn backward_step(&self, l: usize, r: usize, v: Id) -> (usize, usize) {
        (self.seq.rank(l, v), self.seq.rank(r + 1, v))
    }

    /// Backward search for a pattern of length one: block `v` as an inclusive row interval.
    pub fn backward_search_1_interval(&self, v: Id) -> (usize, usize) {
        (self.get_c(v), self.get_c(v + 1) - 1)
    }

    /// Rank range of `s` within block `v`, half-open.
    pub fn backward_search_1_rank(&self, v: Id, s: Id) -> (usize, usize) {
        (self.seq.rank(self.get_c(v), s), self.seq.rank(self.get_c(v + 1), s))
    }

    /// Second backward-search step: a half-open rank range mapped into block `v`, as an inclusive
    /// row interval.
    pub fn backward_search_2_interval(&self, v: Id, ranks: (usize, usize)) -> (usize, usize) {
        let c = self.get_c(v);
        (c + ranks.0, c + ranks.1 - 1)
    }

    /// Second backward-search step keeping ranks: occurrences of `s` within the slice of block
    /// `v` given by `ranks`, half-open.
    pub fn backward_search_2_rank(&self, v: Id, s: Id, ranks: (usize, usize)) -> (usize, usize) {
        let c = self.get_c(v);
        (self.seq.rank(c + ranks.0, s), self.seq.rank(c + ranks.1, s))
    }

    /// First occurrence of `v` at or after the start of block `b`, with its occurrence rank.
    /// `None` once the rank reaches `n_elems`, the caller's bound on occurrences of `v`.
    pub fn select_next(&self, b: Id, v: Id, n_elems: usize) -> Option<(usize, usize)> {
        let r = self.block_rank(b, v);
        if r >= n_elems {
            return None;
        }
        self.seq.select(r, v).map(|pos| (pos, r))
    }

    /// Smallest value in the inclusive row range, 0 when the range is empty.
    pub fn min_in_range(&self, l: usize, r: usize) -> Id {
        if l > r {
            return 0;
        }
        self.seq.range_min(l, r)
    }

    /// Least value `>= x` in the inclusive row range, 0 when there is none.
    pub fn range_next_value(&self, x: Id, l: usize, r: usize) -> Id {
        if l > r {
            return 0;
        }
        self.seq.range_next_value(x, l, r).unwrap_or(0)
    }

    /// Distinct values in the inclusive row range, ascending.
    pub fn values_in_range(&self, l: usize, r: usize) -> Vec<Id> {
        if l > r {
            return Vec::new();
        }
        self.seq.values_in_range(l, r)
    }

    pub fn size_in_bytes(&self) -> usize {
        self.seq.size_in_bytes() + self.c.size_in_bytes()
    }

    pub fn serialize_into<W: Write>(&self, writer: &mut W) -> anyhow::Result<usize> {
        Ok(self.seq.serialize_into(writer)? + self.c.serialize_into(writer)?)
    }

    pub fn deserialize_from<R: Read>(reader: &mut R) -> anyhow::Result<Self> {
        let seq = WaveletMatrix::deserialize_from(reader)?;
        let c = SelectBits::deserialize_from(reader)?;
        Ok(Bwt { seq, c })
    }
}
