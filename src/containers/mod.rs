//! Uniform facade over the succinct primitives the index is built from.
//!
//! The columns of the ring need a bit vector with rank/select and a wavelet matrix with a handful
//! of range extensions (range minimum, range successor, range distinct, inverse select). The bit
//! vectors come from [`sucds`]; the wavelet matrix is assembled here on top of them because the
//! one shipped with `sucds` does not expose the range operations.

mod bits;
mod wavelet;

pub use bits::{BitSeq, PlainBits, SelectBits, SparseBits};
pub use wavelet::WaveletMatrix;

use std::io::{Read, Write};

/// Writes a `usize` as a little-endian u64, the word encoding used throughout the index format.
pub(crate) fn write_u64<W: Write>(writer: &mut W, value: usize) -> anyhow::Result<usize> {
    writer.write_all(&(value as u64).to_le_bytes())?;
    Ok(std::mem::size_of::<u64>())
}

/// Reads a little-endian u64 written by [`write_u64`].
pub(crate) fn read_u64<R: Read>(reader: &mut R) -> anyhow::Result<usize> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf) as usize)
}
