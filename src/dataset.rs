//! Loader for the plain-text dataset format: one triple per line, three whitespace-separated
//! unsigned integers `S P O`. Blank lines are skipped, so a trailing newline never injects a
//! spurious triple.

use std::io::BufRead;

use log::debug;

use crate::Triple;

/// The error type for dataset loading.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected three unsigned integers, got `{text}`")]
    Malformed { line: usize, text: String },
    #[error("line {line}: triple IDs must be positive")]
    ZeroId { line: usize },
}

/// Reads every triple from the reader until EOF.
pub fn read_triples<R: BufRead>(reader: R) -> Result<Vec<Triple>, Error> {
    let mut triples = Vec::new();
    for (at, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let mut fields = text.split_whitespace();
        let parsed = |token: Option<&str>| token.and_then(|t| t.parse::<usize>().ok());
        let (s, p, o) = match (parsed(fields.next()), parsed(fields.next()), parsed(fields.next())) {
            (Some(s), Some(p), Some(o)) => (s, p, o),
            _ => return Err(Error::Malformed { line: at + 1, text: text.to_owned() }),
        };
        if fields.next().is_some() {
            return Err(Error::Malformed { line: at + 1, text: text.to_owned() });
        }
        if s == 0 || p == 0 || o == 0 {
            return Err(Error::ZeroId { line: at + 1 });
        }
        triples.push(Triple::new(s, p, o));
    }
    debug!("read {} triples", triples.len());
    Ok(triples)
}
