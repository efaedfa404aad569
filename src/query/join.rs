//! The leapfrog triejoin driver.
//!
//! Eliminates one variable per recursion level, in the order the planner chose. At each level the
//! candidate value is the agreement of `leap` across every iterator mentioning the variable; on
//! agreement the value is bound in all of them and the search recurses. A variable mentioned by a
//! single pattern that is already in its last level skips the intersection entirely and streams
//! the distinct values of its interval.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::containers::BitSeq;
use crate::ring::Ring;
use crate::{Id, VarId};

use super::{gao, PatternIter, TriplePattern};

/// One result row: the variables in elimination order with their values.
pub type Tuple = Vec<(VarId, Id)>;

pub struct LeapfrogJoin<'a, B: BitSeq> {
    iterators: Vec<PatternIter<'a, B>>,
    var_iterators: HashMap<VarId, Vec<usize>>,
    gao: Vec<VarId>,
    empty: bool,
}

impl<'a, B: BitSeq> LeapfrogJoin<'a, B> {
    /// Builds the per-pattern iterators and the variable order. A pattern whose constants do not
    /// occur voids the query before any search step.
    pub fn new(patterns: &[TriplePattern], ring: &'a Ring<B>) -> Self {
        Self::build(patterns, ring, None)
    }

    /// Like [`LeapfrogJoin::new`] but with a caller-supplied variable order. The result multiset
    /// does not depend on the order; primarily a differential-testing hook.
    pub fn with_order(patterns: &[TriplePattern], ring: &'a Ring<B>, order: Vec<VarId>) -> Self {
        Self::build(patterns, ring, Some(order))
    }

    fn build(patterns: &[TriplePattern], ring: &'a Ring<B>, order: Option<Vec<VarId>>) -> Self {
        let mut iterators = Vec::with_capacity(patterns.len());
        let mut var_iterators: HashMap<VarId, Vec<usize>> = HashMap::new();
        for (at, &pattern) in patterns.iter().enumerate() {
            let iterator = PatternIter::new(pattern, ring);
            if iterator.is_empty() {
                return LeapfrogJoin { iterators: Vec::new(), var_iterators, gao: Vec::new(), empty: true };
            }
            for var in pattern.variables() {
                var_iterators.entry(var).or_default().push(at);
            }
            iterators.push(iterator);
        }
        let gao = match order {
            Some(order) => {
                debug_assert!(order.iter().all(|v| var_iterators.contains_key(v)));
                debug_assert_eq!(order.len(), var_iterators.len());
                order
            }
            None => gao::join_order(patterns, &iterators),
        };
        LeapfrogJoin { iterators, var_iterators, gao, empty: false }
    }

    /// The variable order the search will use.
    pub fn gao(&self) -> &[VarId] {
        &self.gao
    }

    /// Runs the join. `limit` caps the number of result tuples and `timeout` the wall-clock
    /// search time; hitting either stops the search and returns what was found so far.
    pub fn join(&mut self, limit: Option<usize>, timeout: Option<Duration>) -> Vec<Tuple> {
        let mut results = Vec::new();
        if self.empty {
            return results;
        }
        let started = Instant::now();
        let mut tuple: Tuple = vec![(0, 0); self.gao.len()];
        self.search(0, &mut tuple, &mut results, started, limit, timeout);
        results
    }

    // Returns false to unwind the whole search once a stop condition fired.
    fn search(
        &mut self, level: usize, tuple: &mut Tuple, results: &mut Vec<Tuple>, started: Instant,
        limit: Option<usize>, timeout: Option<Duration>,
    ) -> bool {
        if let Some(timeout) = timeout {
            if started.elapsed() > timeout {
                return false;
            }
        }
        if let Some(limit) = limit {
            if results.len() >= limit {
                return false;
            }
        }
        if level == self.gao.len() {
            results.push(tuple.clone());
            return true;
        }
        let var = self.gao[level];
        let at = self.var_iterators[&var].clone();
        if at.len() == 1 && self.iterators[at[0]].in_last_level() {
            for c in self.iterators[at[0]].seek_all(var) {
                tuple[level] = (var, c);
                self.iterators[at[0]].down(var, c);
                if !self.search(level + 1, tuple, results, started, limit, timeout) {
                    return false;
                }
                self.iterators[at[0]].up(var);
            }
        } else {
            let mut c = self.seek(&at, var, None);
            while c != 0 {
                tuple[level] = (var, c);
                for &i in &at {
                    self.iterators[i].down(var, c);
                }
                if !self.search(level + 1, tuple, results, started, limit, timeout) {
                    return false;
                }
                for &i in &at {
                    self.iterators[i].up(var);
                }
                c = self.seek(&at, var, Some(c + 1));
            }
        }
        true
    }

    // Leapfrog intersection: raise the floor to the largest leap until every iterator agrees.
    // `floor` of `None` asks each iterator for its minimum. Returns 0 on empty intersection.
    fn seek(&mut self, at: &[usize], var: VarId, mut floor: Option<Id>) -> Id {
        let mut c_min = Id::MAX;
        let mut c_max = 0;
        loop {
            for &i in at {
                let c = match floor {
                    None => self.iterators[i].leap(var),
                    Some(floor) => self.iterators[i].leap_from(var, floor),
                };
                if c == 0 {
                    return 0;
                }
                c_max = c_max.max(c);
                c_min = c_min.min(c);
                floor = Some(c_max);
            }
            if c_min == c_max {
                return c_min;
            }
            c_min = Id::MAX;
            c_max = 0;
        }
    }
}
