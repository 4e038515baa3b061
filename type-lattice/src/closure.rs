//! The strict subtype relation between simple types is materialised
//! as a pair of adjacency rows per type: the types above it, and the
//! types below it.  Keeping both directions lets us extend the
//! transitive closure by touching only the affected pairs when a new
//! edge is declared, while queries stay a single hash lookup.
//!
//! Indices are positions in the owning lattice's entry table.  Rows
//! for union entries exist but always remain empty.
use rustc_hash::FxHashSet;

#[derive(Clone, Debug, Default)]
pub struct Closure {
    /// `above[i]` holds every `j` such that `i` is a strict subtype of `j`.
    above: Vec<FxHashSet<usize>>,
    /// Transpose of `above`.
    below: Vec<FxHashSet<usize>>,
}

impl Closure {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure rows exist for all indices below `len`.
    pub fn grow(&mut self, len: usize) {
        if self.above.len() < len {
            self.above.resize_with(len, FxHashSet::default);
            self.below.resize_with(len, FxHashSet::default);
        }
    }

    /// Returns true iff `sub` is known to be a (reflexive) subtype of `sup`.
    #[inline]
    #[must_use]
    pub fn contains(&self, sub: usize, sup: usize) -> bool {
        sub == sup || self.above.get(sub).map_or(false, |row| row.contains(&sup))
    }

    /// Records that `sub` is a strict subtype of `sup`, along with
    /// every pair transitivity implies: everything at or below `sub`
    /// is now below everything at or above `sup`.
    ///
    /// The caller must have checked that `sup` is not already below
    /// `sub`; otherwise the relation would stop being antisymmetric.
    ///
    /// Returns the number of pairs added to the relation.
    pub fn insert(&mut self, sub: usize, sup: usize) -> usize {
        debug_assert!(!self.contains(sup, sub));
        self.grow(sub.max(sup) + 1);

        let mut lower: Vec<usize> = self.below[sub].iter().copied().collect();
        lower.push(sub);
        let mut upper: Vec<usize> = self.above[sup].iter().copied().collect();
        upper.push(sup);

        let mut added = 0;
        for &k in &lower {
            for &l in &upper {
                if self.above[k].insert(l) {
                    self.below[l].insert(k);
                    added += 1;
                }
            }
        }

        added
    }

    /// Returns the strict supertypes of `index`, in no particular order.
    pub fn above(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.above.get(index).into_iter().flatten().copied()
    }

    /// Returns the strict subtypes of `index`, in no particular order.
    pub fn below(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.below.get(index).into_iter().flatten().copied()
    }
}

#[test]
fn test_closure_transitive() {
    let mut closure = Closure::new();
    closure.grow(4);

    assert_eq!(closure.insert(1, 2), 1);
    assert_eq!(closure.insert(2, 3), 2);
    assert!(closure.contains(1, 3));
    assert!(!closure.contains(3, 1));

    // 0 < 1 implies 0 < 2 and 0 < 3.
    assert_eq!(closure.insert(0, 1), 3);
    assert!(closure.contains(0, 3));

    let mut above: Vec<_> = closure.above(0).collect();
    above.sort();
    assert_eq!(above, vec![1, 2, 3]);

    let mut below: Vec<_> = closure.below(3).collect();
    below.sort();
    assert_eq!(below, vec![0, 1, 2]);
}

#[test]
fn test_closure_reflexive() {
    let closure = Closure::new();

    // Reflexivity holds even for indices without a row.
    assert!(closure.contains(7, 7));
    assert!(!closure.contains(7, 8));
}

#[test]
fn test_closure_redundant_edge() {
    let mut closure = Closure::new();

    closure.insert(0, 1);
    closure.insert(1, 2);
    // Already implied.
    assert_eq!(closure.insert(0, 2), 0);
}
