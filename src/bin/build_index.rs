//! Builds a ring index from a plain-text triple file.
//!
//! `build-index <dataset> <ring|c-ring|ring-sel>` writes `<dataset>.<type>`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use bytesize::ByteSize;
use clap::{Parser, ValueEnum};

use rdf_ring::containers::{BitSeq, PlainBits, SelectBits, SparseBits};
use rdf_ring::{dataset, Ring, RingVariant, Triple};

#[derive(Parser)]
#[command(name = "build-index", version, about = "Build a ring index over integer (S, P, O) triples")]
struct Args {
    /// Dataset file: one `S P O` triple of unsigned integers per line
    dataset: PathBuf,
    /// Index flavour; decides the bit-vector representation
    #[arg(value_enum)]
    variant: Variant,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    /// Plain bit vectors
    Ring,
    /// Compressed bit vectors
    CRing,
    /// Plain bit vectors with select support
    RingSel,
}

impl From<Variant> for RingVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Ring => RingVariant::Plain,
            Variant::CRing => RingVariant::Compressed,
            Variant::RingSel => RingVariant::PlainSelect,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let file = File::open(&args.dataset).with_context(|| format!("cannot open {}", args.dataset.display()))?;
    let triples = dataset::read_triples(BufReader::new(file))
        .with_context(|| format!("cannot read {}", args.dataset.display()))?;
    println!("indexing {} triples", triples.len());

    let variant = RingVariant::from(args.variant);
    let output = PathBuf::from(format!("{}.{variant}", args.dataset.display()));
    match variant {
        RingVariant::Plain => build::<PlainBits>(triples, &output),
        RingVariant::Compressed => build::<SparseBits>(triples, &output),
        RingVariant::PlainSelect => build::<SelectBits>(triples, &output),
    }
}

fn build<B: BitSeq>(triples: Vec<Triple>, output: &Path) -> Result<()> {
    let started = Instant::now();
    let ring: Ring<B> = Ring::new(triples);
    println!("index built in {:.2?}, {} in memory", started.elapsed(), ByteSize(ring.size_in_bytes() as u64));

    let file = File::create(output).with_context(|| format!("cannot create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let written = ring.serialize_into(&mut writer).with_context(|| format!("cannot write {}", output.display()))?;
    writer.flush().with_context(|| format!("cannot write {}", output.display()))?;
    println!("index saved to {} ({})", output.display(), ByteSize(written as u64));
    Ok(())
}
