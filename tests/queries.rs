//! End-to-end query behaviour, checked against a brute-force evaluator.

use std::collections::{BTreeMap, BTreeSet};

use pretty_assertions::assert_eq;

use rdf_ring::containers::{BitSeq, PlainBits, SelectBits, SparseBits};
use rdf_ring::query::{parse_query, LeapfrogJoin, Term, TriplePattern};
use rdf_ring::{Id, Ring, Triple, VarId};

/// One normalized result row: bindings sorted by variable ID.
type Row = Vec<(VarId, Id)>;

fn tiny() -> Vec<Triple> {
    vec![
        Triple::new(1, 1, 2),
        Triple::new(1, 1, 3),
        Triple::new(1, 2, 2),
        Triple::new(2, 1, 3),
        Triple::new(2, 2, 3),
    ]
}

fn run<B: BitSeq>(ring: &Ring<B>, query: &str) -> BTreeSet<Row> {
    let query = parse_query(query).expect("test query must parse");
    let results = LeapfrogJoin::new(&query.patterns, ring).join(None, None);
    let rows: BTreeSet<Row> = results
        .iter()
        .map(|tuple| {
            let mut row = tuple.clone();
            row.sort_unstable();
            row
        })
        .collect();
    assert_eq!(rows.len(), results.len(), "duplicate tuples in {query:?}");
    rows
}

fn brute_force(patterns: &[TriplePattern], data: &[Triple]) -> BTreeSet<Row> {
    fn bind(term: Term, value: Id, binding: &mut BTreeMap<VarId, Id>, added: &mut Vec<VarId>) -> bool {
        match term {
            Term::Constant(c) => c == value,
            Term::Variable(v) => match binding.get(&v) {
                Some(&bound) => bound == value,
                None => {
                    binding.insert(v, value);
                    added.push(v);
                    true
                }
            },
        }
    }
    fn rec(
        patterns: &[TriplePattern], data: &[Triple], binding: &mut BTreeMap<VarId, Id>, out: &mut BTreeSet<Row>,
    ) {
        let Some((pattern, rest)) = patterns.split_first() else {
            out.insert(binding.iter().map(|(&v, &c)| (v, c)).collect());
            return;
        };
        for t in data {
            let mut added = Vec::new();
            if bind(pattern.s, t.s, binding, &mut added)
                && bind(pattern.p, t.p, binding, &mut added)
                && bind(pattern.o, t.o, binding, &mut added)
            {
                rec(rest, data, binding, out);
            }
            for v in added {
                binding.remove(&v);
            }
        }
    }
    let mut out = BTreeSet::new();
    rec(patterns, data, &mut BTreeMap::new(), &mut out);
    out
}

fn differential<B: BitSeq>(data: &[Triple], query: &str) {
    let ring: Ring<B> = Ring::new(data.to_vec());
    let patterns = parse_query(query).expect("test query must parse").patterns;
    assert_eq!(run(&ring, query), brute_force(&patterns, data), "query {query:?}");
}

fn row(bindings: &[(VarId, Id)]) -> Row {
    bindings.to_vec()
}

#[test]
fn single_constant_pattern() {
    let ring: Ring = Ring::new(tiny());
    // scenario: ?x 1 2 -> {?x = 1}
    assert_eq!(run(&ring, "?x 1 2"), BTreeSet::from([row(&[(0, 1)])]));
}

#[test]
fn two_variable_pattern() {
    let ring: Ring = Ring::new(tiny());
    // scenario: ?x ?y 3 -> {(1,1), (2,1), (2,2)}
    let expected = BTreeSet::from([row(&[(0, 1), (1, 1)]), row(&[(0, 2), (1, 1)]), row(&[(0, 2), (1, 2)])]);
    assert_eq!(run(&ring, "?x ?y 3"), expected);
}

#[test]
fn all_variables_enumerates_the_relation() {
    let ring: Ring = Ring::new(tiny());
    let rows = run(&ring, "?x ?y ?z");
    assert_eq!(rows.len(), 5);
    let as_triples: BTreeSet<Triple> =
        rows.iter().map(|row| Triple::new(row[0].1, row[1].1, row[2].1)).collect();
    assert_eq!(as_triples, tiny().into_iter().collect());
}

#[test]
fn two_pattern_join() {
    let ring: Ring = Ring::new(tiny());
    // scenario: ?x 1 ?y . ?x 2 ?y -> {(1,2), (2,3)}
    let expected = BTreeSet::from([row(&[(0, 1), (1, 2)]), row(&[(0, 2), (1, 3)])]);
    assert_eq!(run(&ring, "?x 1 ?y . ?x 2 ?y"), expected);
}

#[test]
fn two_pattern_chain() {
    let ring: Ring = Ring::new(tiny());
    // ?x 1 ?y . ?y 2 ?z: object 2 of (1,1,2) is the only subject with predicate 2 reachable,
    // chaining to (2,2,3)
    let expected = BTreeSet::from([row(&[(0, 1), (1, 2), (2, 3)])]);
    assert_eq!(run(&ring, "?x 1 ?y . ?y 2 ?z"), expected);
    let patterns = parse_query("?x 1 ?y . ?y 2 ?z").unwrap().patterns;
    assert_eq!(run(&ring, "?x 1 ?y . ?y 2 ?z"), brute_force(&patterns, &tiny()));
}

#[test]
fn triangle_matches_brute_force() {
    differential::<PlainBits>(&tiny(), "?x ?p1 ?y . ?y ?p2 ?z . ?z ?p3 ?x");
    differential::<SelectBits>(&tiny(), "?x ?p1 ?y . ?y ?p2 ?z . ?z ?p3 ?x");
}

#[test]
fn every_triple_round_trips() {
    let data = tiny();
    let ring: Ring = Ring::new(data.clone());
    for t in &data {
        let (s, p, o) = (t.s, t.p, t.o);
        assert_eq!(run(&ring, &format!("{s} {p} {o}")).len(), 1, "full lookup of {t:?}");
        assert!(run(&ring, &format!("?x {p} {o}")).contains(&row(&[(0, s)])));
        assert!(run(&ring, &format!("{s} ?x {o}")).contains(&row(&[(0, p)])));
        assert!(run(&ring, &format!("{s} {p} ?x")).contains(&row(&[(0, o)])));
    }
    // one-constant queries equal the projections of the relation
    for query in ["1 ?a ?b", "2 ?a ?b", "?a 1 ?b", "?a 2 ?b", "?a ?b 2", "?a ?b 3"] {
        let patterns = parse_query(query).unwrap().patterns;
        assert_eq!(run(&ring, query), brute_force(&patterns, &data), "projection {query}");
    }
}

#[test]
fn missing_constants_mean_empty_results() {
    let ring: Ring = Ring::new(tiny());
    assert!(run(&ring, "3 ?p ?o").is_empty()); // 3 is an object, never a subject
    assert!(run(&ring, "?s ?p 1").is_empty()); // 1 is never an object
    assert!(run(&ring, "9 9 9").is_empty()); // beyond every alphabet
    assert!(run(&ring, "?x 1 ?y . ?x 9 ?y").is_empty());
}

// A deterministic scattering of triples, dense enough that joins actually meet.
fn pseudo_random_data(n: usize, max_so: Id, max_p: Id) -> Vec<Triple> {
    let mut x: u64 = 0x9e3779b97f4a7c15;
    let mut step = || {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (x >> 33) as usize
    };
    let mut set = BTreeSet::new();
    while set.len() < n {
        set.insert(Triple::new(1 + step() % max_so, 1 + step() % max_p, 1 + step() % max_so));
    }
    set.into_iter().collect()
}

#[test]
fn random_data_differential() {
    let data = pseudo_random_data(150, 12, 4);
    for query in [
        "?x ?y ?z",
        "?x 1 ?y",
        "?x ?p 7",
        "4 ?p ?o",
        "?x 1 ?y . ?x 2 ?z",
        "?x 1 ?y . ?y 1 ?z",
        "?x 1 ?y . ?y 2 ?z . ?z 3 ?x",
        "?x ?p ?y . ?y ?q ?x",
        "?x 2 ?y . ?x 3 ?y",
        "?x 1 3 . ?x ?p ?y",
        "2 1 ?o . ?o ?p ?z",
    ] {
        differential::<PlainBits>(&data, query);
        differential::<SparseBits>(&data, query);
        differential::<SelectBits>(&data, query);
    }
}

fn permutations(vars: &[VarId]) -> Vec<Vec<VarId>> {
    if vars.len() <= 1 {
        return vec![vars.to_vec()];
    }
    let mut out = Vec::new();
    for (at, &v) in vars.iter().enumerate() {
        let mut rest = vars.to_vec();
        rest.remove(at);
        for mut tail in permutations(&rest) {
            tail.insert(0, v);
            out.push(tail);
        }
    }
    out
}

#[test]
fn any_variable_order_gives_the_same_rows() {
    let data = pseudo_random_data(120, 10, 3);
    let ring: Ring = Ring::new(data);
    for query in ["?x 1 ?y . ?y 2 ?z", "?x ?p ?y . ?y ?q ?x", "?x 1 ?y . ?x 2 ?z"] {
        let query = parse_query(query).unwrap();
        let vars: Vec<VarId> = (0..query.var_names.len() as VarId).collect();
        let baseline: BTreeSet<Row> = LeapfrogJoin::new(&query.patterns, &ring)
            .join(None, None)
            .into_iter()
            .map(|mut row| {
                row.sort_unstable();
                row
            })
            .collect();
        for order in permutations(&vars) {
            let rows: BTreeSet<Row> = LeapfrogJoin::with_order(&query.patterns, &ring, order.clone())
                .join(None, None)
                .into_iter()
                .map(|mut row| {
                    row.sort_unstable();
                    row
                })
                .collect();
            assert_eq!(rows, baseline, "forced order {order:?}");
        }
    }
}

#[test]
fn empty_relation_answers_everything_with_nothing() {
    let ring: Ring = Ring::new(Vec::new());
    assert!(run(&ring, "?x ?y ?z").is_empty());
    assert!(run(&ring, "1 2 3").is_empty());
}
