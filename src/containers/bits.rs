//! Bit-vector flavours the index can be instantiated with.

use std::fmt::Debug;
use std::io::{Read, Write};

use sucds::bit_vectors::{Access, Rank, Rank9Sel, SArray, Select};
use sucds::Serializable;

/// A static bit sequence with rank and select support.
///
/// This is the single point where the index touches a concrete succinct representation. Three
/// flavours exist:
/// - [`PlainBits`]: uncompressed, constant-time rank, logarithmic select;
/// - [`SelectBits`]: uncompressed with select hints, constant-time rank *and* select;
/// - [`SparseBits`]: Elias–Fano compressed, smaller and slower.
///
/// `FAST_SELECT` advertises whether per-symbol select is cheap enough for the stride-based seek
/// paths of the ring; flavours without it answer those seeks through an `inverse_select` detour
/// instead.
pub trait BitSeq: Debug + Clone + Send + Sync + Sized {
    /// Whether select is constant time and the stride seek paths should use it.
    const FAST_SELECT: bool;

    /// Whether the representation is compressed rather than plain.
    const COMPRESSED: bool;

    /// Builds the sequence from plain bits.
    fn from_bits(bits: &[bool]) -> Self;

    /// Number of bits.
    fn len(&self) -> usize;

    /// Whether the sequence holds no bits.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of set bits.
    fn num_ones(&self) -> usize;

    /// The bit at `pos`.
    fn access(&self, pos: usize) -> bool;

    /// Number of set bits strictly before `pos`.
    fn rank1(&self, pos: usize) -> usize;

    /// Number of unset bits strictly before `pos`.
    fn rank0(&self, pos: usize) -> usize {
        pos - self.rank1(pos)
    }

    /// Position of the (k+1)-th set bit. The default resolves it by binary search over `rank1`,
    /// which any flavour supports.
    fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.num_ones() {
            return None;
        }
        let (mut lo, mut hi) = (0, self.len());
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.rank1(mid) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(lo)
    }

    /// Position of the (k+1)-th unset bit, by the same binary search over `rank0`.
    fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.len() - self.num_ones() {
            return None;
        }
        let (mut lo, mut hi) = (0, self.len());
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.rank0(mid) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(lo)
    }

    /// Heap footprint in bytes.
    fn size_in_bytes(&self) -> usize;

    fn serialize_into<W: Write>(&self, writer: &mut W) -> anyhow::Result<usize>;

    fn deserialize_from<R: Read>(reader: &mut R) -> anyhow::Result<Self>;
}

/// Rank9 bit vector without select hints. Select queries fall back to binary search, so the ring
/// uses the `inverse_select` seek paths with this flavour.
#[derive(Debug, Clone)]
pub struct PlainBits {
    inner: Rank9Sel,
    len: usize,
    ones: usize,
}

impl BitSeq for PlainBits {
    const FAST_SELECT: bool = false;
    const COMPRESSED: bool = false;

    fn from_bits(bits: &[bool]) -> Self {
        let ones = bits.iter().filter(|&&b| b).count();
        PlainBits { inner: Rank9Sel::from_bits(bits.iter().copied()), len: bits.len(), ones }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn num_ones(&self) -> usize {
        self.ones
    }

    fn access(&self, pos: usize) -> bool {
        self.inner.access(pos).expect("bit position out of bounds")
    }

    fn rank1(&self, pos: usize) -> usize {
        self.inner.rank1(pos).expect("rank position out of bounds")
    }

    fn select1(&self, k: usize) -> Option<usize> {
        self.inner.select1(k)
    }

    fn select0(&self, k: usize) -> Option<usize> {
        self.inner.select0(k)
    }

    fn size_in_bytes(&self) -> usize {
        self.inner.size_in_bytes() + 2 * std::mem::size_of::<usize>()
    }

    fn serialize_into<W: Write>(&self, writer: &mut W) -> anyhow::Result<usize> {
        serialize_with_lengths(&self.inner, self.len, self.ones, writer)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> anyhow::Result<Self> {
        let (inner, len, ones) = deserialize_with_lengths(reader)?;
        Ok(PlainBits { inner, len, ones })
    }
}

/// Rank9 bit vector with select hints on both bit values: constant-time rank and select.
/// The only flavour with `FAST_SELECT`, backing the `ring-sel` index variant.
#[derive(Debug, Clone)]
pub struct SelectBits {
    inner: Rank9Sel,
    len: usize,
    ones: usize,
}

impl BitSeq for SelectBits {
    const FAST_SELECT: bool = true;
    const COMPRESSED: bool = false;

    fn from_bits(bits: &[bool]) -> Self {
        let ones = bits.iter().filter(|&&b| b).count();
        let inner = Rank9Sel::from_bits(bits.iter().copied()).select1_hints().select0_hints();
        SelectBits { inner, len: bits.len(), ones }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn num_ones(&self) -> usize {
        self.ones
    }

    fn access(&self, pos: usize) -> bool {
        self.inner.access(pos).expect("bit position out of bounds")
    }

    fn rank1(&self, pos: usize) -> usize {
        self.inner.rank1(pos).expect("rank position out of bounds")
    }

    fn select1(&self, k: usize) -> Option<usize> {
        self.inner.select1(k)
    }

    fn select0(&self, k: usize) -> Option<usize> {
        self.inner.select0(k)
    }

    fn size_in_bytes(&self) -> usize {
        self.inner.size_in_bytes() + 2 * std::mem::size_of::<usize>()
    }

    fn serialize_into<W: Write>(&self, writer: &mut W) -> anyhow::Result<usize> {
        serialize_with_lengths(&self.inner, self.len, self.ones, writer)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> anyhow::Result<Self> {
        let (inner, len, ones) = deserialize_with_lengths(reader)?;
        Ok(SelectBits { inner, len, ones })
    }
}

/// Elias–Fano compressed bit vector, the `c-ring` flavour. Rank support is enabled at
/// construction; select over zeros goes through the trait's binary-search default and the ring
/// routes its stride seeks through `inverse_select` instead.
#[derive(Debug, Clone)]
pub struct SparseBits {
    inner: SArray,
    len: usize,
    ones: usize,
}

impl BitSeq for SparseBits {
    const FAST_SELECT: bool = false;
    const COMPRESSED: bool = true;

    fn from_bits(bits: &[bool]) -> Self {
        let ones = bits.iter().filter(|&&b| b).count();
        SparseBits { inner: SArray::from_bits(bits.iter().copied()).enable_rank(), len: bits.len(), ones }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn num_ones(&self) -> usize {
        self.ones
    }

    fn access(&self, pos: usize) -> bool {
        // membership through rank, the one primitive Elias–Fano always answers
        self.rank1(pos + 1) > self.rank1(pos)
    }

    fn rank1(&self, pos: usize) -> usize {
        self.inner.rank1(pos).expect("rank position out of bounds")
    }

    fn select1(&self, k: usize) -> Option<usize> {
        self.inner.select1(k)
    }

    fn size_in_bytes(&self) -> usize {
        self.inner.size_in_bytes() + 2 * std::mem::size_of::<usize>()
    }

    fn serialize_into<W: Write>(&self, writer: &mut W) -> anyhow::Result<usize> {
        serialize_with_lengths(&self.inner, self.len, self.ones, writer)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> anyhow::Result<Self> {
        let (inner, len, ones) = deserialize_with_lengths(reader)?;
        Ok(SparseBits { inner, len, ones })
    }
}

fn serialize_with_lengths<T: Serializable, W: Write>(
    inner: &T, len: usize, ones: usize, writer: &mut W,
) -> anyhow::Result<usize> {
    let mut written = super::write_u64(writer, len)?;
    written += super::write_u64(writer, ones)?;
    written += inner.serialize_into(&mut *writer)?;
    Ok(written)
}

fn deserialize_with_lengths<T: Serializable, R: Read>(reader: &mut R) -> anyhow::Result<(T, usize, usize)> {
    let len = super::read_u64(reader)?;
    let ones = super::read_u64(reader)?;
    let inner = T::deserialize_from(&mut *reader)?;
    Ok((inner, len, ones))
}
