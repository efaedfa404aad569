//! The global attribute order: which variable the join eliminates at each level.
//!
//! Greedy, cardinality-driven: a variable's weight is the smallest interval size among the
//! patterns that mention it, and variables shared between patterns come before variables occurring
//! in a single one. Within the shared prefix the order follows the co-occurrence graph so that
//! every variable joins against one already emitted, draining a min-heap of neighbours by weight.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use crate::containers::BitSeq;
use crate::VarId;

use super::{PatternIter, TriplePattern};

struct VarInfo {
    name: VarId,
    weight: usize,
    n_triples: usize,
    related: BTreeSet<VarId>,
}

/// Computes the variable order for the given patterns and their freshly built iterators.
pub fn join_order<B: BitSeq>(patterns: &[TriplePattern], iterators: &[PatternIter<'_, B>]) -> Vec<VarId> {
    debug_assert_eq!(patterns.len(), iterators.len());

    // 1. One record per variable: minimum weight, pattern count, co-occurring variables.
    let mut info: Vec<VarInfo> = Vec::new();
    let mut position: HashMap<VarId, usize> = HashMap::new();
    for (pattern, iter) in patterns.iter().zip(iterators) {
        let size = iter.interval_size();
        let vars = pattern.variables();
        for &var in &vars {
            match position.get(&var) {
                Some(&at) => {
                    let record = &mut info[at];
                    record.n_triples += 1;
                    record.weight = record.weight.min(size);
                }
                None => {
                    position.insert(var, info.len());
                    info.push(VarInfo { name: var, weight: size, n_triples: 1, related: BTreeSet::new() });
                }
            }
        }
        for &a in &vars {
            for &b in &vars {
                if a != b {
                    info[position[&a]].related.insert(b);
                }
            }
        }
    }

    // 2. Shared variables before lonely ones, lighter before heavier; the stable sort keeps
    //    first-seen order on ties.
    info.sort_by_key(|record| (record.n_triples == 1, record.weight));
    let lonely_start = info.iter().position(|record| record.n_triples == 1).unwrap_or(info.len());
    for (at, record) in info.iter().enumerate() {
        position.insert(record.name, at);
    }

    // 3. Emit the shared prefix component-wise, then the lonely suffix in sorted order.
    let mut order = Vec::with_capacity(info.len());
    let mut picked = vec![false; info.len()];
    for at in 0..lonely_start {
        if picked[at] {
            continue;
        }
        picked[at] = true;
        order.push(info[at].name);
        let mut heap: BinaryHeap<Reverse<(usize, VarId)>> = BinaryHeap::new();
        fill_heap(info[at].name, &info, &position, &mut picked, &mut heap);
        while let Some(Reverse((_, var))) = heap.pop() {
            order.push(var);
            fill_heap(var, &info, &position, &mut picked, &mut heap);
        }
    }
    for record in &info[lonely_start..] {
        order.push(record.name);
    }
    order
}

// Queues the not-yet-picked shared neighbours of `var`, keyed by weight.
fn fill_heap(
    var: VarId, info: &[VarInfo], position: &HashMap<VarId, usize>, picked: &mut [bool],
    heap: &mut BinaryHeap<Reverse<(usize, VarId)>>,
) {
    for &rel in &info[position[&var]].related {
        let at = position[&rel];
        if !picked[at] && info[at].n_triples > 1 {
            picked[at] = true;
            heap.push(Reverse((info[at].weight, rel)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Term::{Constant as C, Variable as V};
    use crate::{Ring, Triple};
    use pretty_assertions::assert_eq;

    fn ring() -> Ring {
        crate::tests::init();
        Ring::new(vec![
            Triple::new(1, 1, 2),
            Triple::new(1, 1, 3),
            Triple::new(1, 2, 2),
            Triple::new(2, 1, 3),
            Triple::new(2, 2, 3),
        ])
    }

    fn order_of(ring: &Ring, patterns: &[TriplePattern]) -> Vec<VarId> {
        let iterators: Vec<_> = patterns.iter().map(|&p| PatternIter::new(p, ring)).collect();
        join_order(patterns, &iterators)
    }

    #[test]
    fn shared_variables_come_first() {
        let ring = ring();
        // ?x joins both patterns, ?y and ?z are lonely
        let patterns =
            [TriplePattern::new(V(0), C(1), V(1)), TriplePattern::new(V(0), C(2), V(2))];
        let order = order_of(&ring, &patterns);
        assert_eq!(order[0], 0);
        assert_eq!(order.len(), 3);
        assert!(order[1..].contains(&1) && order[1..].contains(&2));
    }

    #[test]
    fn lighter_seed_wins() {
        let ring = ring();
        // pattern 0 has 5 rows, pattern 1 has 2: ?y's weight is smaller than ?x's is not —
        // both shared vars take the min over their patterns, the seed is the lightest record
        let patterns =
            [TriplePattern::new(V(0), V(1), V(2)), TriplePattern::new(V(0), C(2), V(2))];
        let order = order_of(&ring, &patterns);
        // ?x and ?z both weigh 2 (the second pattern), ?y weighs 5 and is lonely
        assert_eq!(order[2], 1);
        assert_eq!(order[0], 0); // tie between ?x and ?z broken by first appearance
        assert_eq!(order[1], 2);
    }

    #[test]
    fn lonely_suffix_sorted_by_weight() {
        let ring = ring();
        let patterns =
            [TriplePattern::new(C(1), C(1), V(0)), TriplePattern::new(V(1), V(2), V(3))];
        let order = order_of(&ring, &patterns);
        // ?0 (2 rows) precedes the variables of the open pattern (5 rows each)
        assert_eq!(order[0], 0);
        assert_eq!(&order[1..], &[1, 2, 3]);
    }
}
