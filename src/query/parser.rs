//! Parser for the one-query-per-line text format.
//!
//! A query is a `.`-separated list of triple patterns; a pattern is three whitespace-separated
//! terms. A term starting with `?` names a variable — its first occurrence in the query assigns
//! the next free ID — and anything else must parse as an unsigned integer constant.

use crate::{Id, VarId};

use super::{Term, TriplePattern};

/// A parsed query: the patterns plus the variable names in ID order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub patterns: Vec<TriplePattern>,
    pub var_names: Vec<String>,
}

/// The error type for query parsing.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("pattern `{0}` does not have exactly three terms")]
    TermCount(String),
    #[error("`{0}` is neither a variable nor an unsigned integer")]
    Constant(String),
    #[error("query uses more than {} variables", VarId::MAX as usize + 1)]
    TooManyVariables,
    #[error("query has no patterns")]
    Empty,
}

/// Parses one query line.
pub fn parse_query(line: &str) -> Result<Query, Error> {
    let mut patterns = Vec::new();
    let mut var_names: Vec<String> = Vec::new();
    for part in line.split('.') {
        let part = part.trim();
        if part.is_empty() {
            continue; // tolerate the trailing dot
        }
        let terms: Vec<&str> = part.split_whitespace().collect();
        if terms.len() != 3 {
            return Err(Error::TermCount(part.to_owned()));
        }
        patterns.push(TriplePattern::new(
            parse_term(terms[0], &mut var_names)?,
            parse_term(terms[1], &mut var_names)?,
            parse_term(terms[2], &mut var_names)?,
        ));
    }
    if patterns.is_empty() {
        return Err(Error::Empty);
    }
    Ok(Query { patterns, var_names })
}

fn parse_term(token: &str, var_names: &mut Vec<String>) -> Result<Term, Error> {
    match token.strip_prefix('?') {
        Some(name) => {
            if let Some(id) = var_names.iter().position(|known| known == name) {
                return Ok(Term::Variable(id as VarId));
            }
            if var_names.len() > VarId::MAX as usize {
                return Err(Error::TooManyVariables);
            }
            var_names.push(name.to_owned());
            Ok(Term::Variable((var_names.len() - 1) as VarId))
        }
        None => token.parse::<Id>().map(Term::Constant).map_err(|_| Error::Constant(token.to_owned())),
    }
}
