//! Explicit variable-to-term mappings, used for syntactic
//! substitution and for grounding action schemas.
use super::Term;
use super::Variable;
use std::collections::BTreeMap;
use std::iter::FromIterator;

/// A `Substitution` maps (plain or step-scoped) variables to terms.
/// It is ordered so that iteration, and thus everything derived from
/// it, is reproducible.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Substitution {
    map: BTreeMap<Term, Term>,
}

impl Substitution {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `variable` to `value`, and returns the previous value, if
    /// any.  Mapping a name has no effect on substitution: names are
    /// never replaced.
    pub fn insert<V: Into<Term>>(&mut self, variable: V, value: Term) -> Option<Term> {
        let variable = variable.into();
        debug_assert!(variable.is_variable());
        self.map.insert(variable, value)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, variable: Term) -> Option<Term> {
        self.map.get(&variable).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Term, Term)> + '_ {
        self.map.iter().map(|(k, v)| (*k, *v))
    }

    /// Returns a copy of this substitution that also maps `variable`
    /// to `value`.
    #[must_use]
    pub fn extended<V: Into<Term>>(&self, variable: V, value: Term) -> Substitution {
        let mut ret = self.clone();
        ret.insert(variable, value);
        ret
    }

    /// Returns a copy of this substitution that leaves `bound` alone,
    /// e.g., the parameters of a quantifier we're about to enter.
    #[must_use]
    pub fn without(&self, bound: &[Variable]) -> Substitution {
        let mut ret = self.clone();
        for variable in bound {
            ret.map.remove(&Term::Variable(*variable));
        }

        ret
    }
}

impl FromIterator<(Term, Term)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (Term, Term)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

#[test]
fn test_without() {
    use super::Name;

    let x = Variable::from_index(0);
    let y = Variable::from_index(1);
    let a = Term::Name(Name::from_index(0));

    let substitution: Substitution = vec![(Term::Variable(x), a), (Term::Variable(y), a)]
        .into_iter()
        .collect();
    assert_eq!(substitution.len(), 2);

    let inner = substitution.without(&[x]);
    assert_eq!(inner.len(), 1);
    assert_eq!(inner.get(Term::Variable(x)), None);
    assert_eq!(inner.get(Term::Variable(y)), Some(a));
    // The original is untouched.
    assert_eq!(substitution.get(Term::Variable(x)), Some(a));
}

#[test]
fn test_extended() {
    use super::Name;

    let x = Variable::from_index(0);
    let a = Term::Name(Name::from_index(0));
    let b = Term::Name(Name::from_index(1));

    let base = Substitution::new().extended(x, a);
    let shadowed = base.extended(x, b);

    assert_eq!(base.get(Term::Variable(x)), Some(a));
    assert_eq!(shadowed.get(Term::Variable(x)), Some(b));
    assert_eq!(shadowed.iter().count(), 1);
}
