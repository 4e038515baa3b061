//! Randomised checks that the incrementally maintained closure agrees
//! with a from-scratch reachability computation over the accepted
//! edges, and that it stays a partial order.
use proptest::prelude::*;
use type_lattice::{Type, TypeLattice};

/// Declares `count` types, then feeds `edges` (as index pairs) to
/// `add_supertype`.  Returns the lattice, the types, and the edges
/// that were accepted.
fn build(count: usize, edges: &[(usize, usize)]) -> (TypeLattice, Vec<Type>, Vec<(usize, usize)>) {
    let mut lattice = TypeLattice::new();
    let types: Vec<Type> = (0..count)
        .map(|i| lattice.add_type(&format!("t{}", i)))
        .collect();

    let mut accepted = Vec::new();
    for &(sub, sup) in edges {
        let (sub, sup) = (sub % count, sup % count);
        if lattice.add_supertype(types[sub], types[sup]) {
            accepted.push((sub, sup));
        }
    }

    (lattice, types, accepted)
}

/// Floyd-Warshall reachability over `edges`, reflexive.
fn reachability(count: usize, edges: &[(usize, usize)]) -> Vec<Vec<bool>> {
    let mut reach = vec![vec![false; count]; count];
    for (i, row) in reach.iter_mut().enumerate() {
        row[i] = true;
    }

    for &(sub, sup) in edges {
        reach[sub][sup] = true;
    }

    for k in 0..count {
        for i in 0..count {
            for j in 0..count {
                if reach[i][k] && reach[k][j] {
                    reach[i][j] = true;
                }
            }
        }
    }

    reach
}

fn edges_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..9).prop_flat_map(|count| {
        (
            Just(count),
            prop::collection::vec((0..count, 0..count), 0..24),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_matches_reachability((count, edges) in edges_strategy()) {
        let (lattice, types, accepted) = build(count, &edges);
        let reach = reachability(count, &accepted);

        for i in 0..count {
            for j in 0..count {
                prop_assert_eq!(lattice.subtype(types[i], types[j]), reach[i][j]);
            }
        }
    }

    #[test]
    fn prop_partial_order((count, edges) in edges_strategy()) {
        let (lattice, types, _) = build(count, &edges);

        for &a in &types {
            prop_assert!(lattice.subtype(a, a));
            prop_assert!(lattice.subtype(a, Type::OBJECT));
            prop_assert!(!lattice.subtype(Type::OBJECT, a));

            for &b in &types {
                if a != b {
                    // Antisymmetry: no cycle ever got through.
                    prop_assert!(!(lattice.subtype(a, b) && lattice.subtype(b, a)));
                }

                for &c in &types {
                    if lattice.subtype(a, b) && lattice.subtype(b, c) {
                        prop_assert!(lattice.subtype(a, c));
                    }
                }
            }
        }
    }

    #[test]
    fn prop_reverse_edge_rejected((count, edges) in edges_strategy()) {
        let (mut lattice, types, accepted) = build(count, &edges);

        for &(sub, sup) in &accepted {
            if sub == sup {
                continue;
            }

            let before: Vec<bool> = types
                .iter()
                .flat_map(|&a| types.iter().map(move |&b| (a, b)))
                .map(|(a, b)| lattice.subtype(a, b))
                .collect();

            prop_assert!(!lattice.add_supertype(types[sup], types[sub]));

            let after: Vec<bool> = types
                .iter()
                .flat_map(|&a| types.iter().map(move |&b| (a, b)))
                .map(|(a, b)| lattice.subtype(a, b))
                .collect();
            prop_assert_eq!(before, after);
        }
    }

    #[test]
    fn prop_union_contains_components(
        (count, edges) in edges_strategy(),
        picks in prop::collection::vec(0usize..64, 1..5),
    ) {
        let (mut lattice, types, _) = build(count, &edges);
        let members: Vec<Type> = picks.iter().map(|i| types[i % count]).collect();
        let union = lattice.union_type(members.clone()).expect("non-empty");

        for &member in &members {
            prop_assert!(lattice.subtype(member, union));
        }

        prop_assert!(lattice.subtype(union, Type::OBJECT));
    }
}
