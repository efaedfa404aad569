//! Runs a batch of basic graph patterns against a ring index.
//!
//! `query-index <index-file> <queries-file>` prints one CSV line per query to stdout:
//! `idx;nresults;nanoseconds`. Results are capped at 1,000 per query and search time at 600
//! seconds. The index flavour is taken from the file extension and cross-checked against the
//! header on load.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use bytesize::ByteSize;
use clap::Parser;
use log::info;

use rdf_ring::containers::BitSeq;
use rdf_ring::query::{parse_query, LeapfrogJoin};
use rdf_ring::{Ring, RingVariant};

const RESULT_LIMIT: usize = 1000;
const TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Parser)]
#[command(name = "query-index", version, about = "Evaluate basic graph patterns over a ring index")]
struct Args {
    /// Index file produced by build-index; the extension names its flavour
    index: PathBuf,
    /// Query file: one `.`-separated list of triple patterns per line
    queries: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let extension = args.index.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let Some(variant) = RingVariant::from_name(extension) else {
        bail!("index type `{extension}` is not supported (expected ring, c-ring or ring-sel)");
    };
    match variant {
        RingVariant::Plain => run::<rdf_ring::containers::PlainBits>(&args.index, &args.queries),
        RingVariant::Compressed => run::<rdf_ring::containers::SparseBits>(&args.index, &args.queries),
        RingVariant::PlainSelect => run::<rdf_ring::containers::SelectBits>(&args.index, &args.queries),
    }
}

fn run<B: BitSeq>(index: &Path, queries: &Path) -> Result<()> {
    let file = File::open(index).with_context(|| format!("cannot open {}", index.display()))?;
    let ring: Ring<B> =
        Ring::deserialize_from(&mut BufReader::new(file)).with_context(|| format!("cannot load {}", index.display()))?;
    info!("index loaded, {} in memory", ByteSize(ring.size_in_bytes() as u64));

    let file = File::open(queries).with_context(|| format!("cannot open {}", queries.display()))?;
    let mut idx = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let query = parse_query(&line).with_context(|| format!("query {idx} is malformed"))?;
        let started = Instant::now();
        let mut join = LeapfrogJoin::new(&query.patterns, &ring);
        let results = join.join(Some(RESULT_LIMIT), Some(TIMEOUT));
        let elapsed = started.elapsed().as_nanos();
        println!("{idx};{};{elapsed}", results.len());
        idx += 1;
    }
    Ok(())
}
