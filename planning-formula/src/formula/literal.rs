//! Atoms, their signed views, and the binding literals over two terms.
use crate::predicate::Predicate;
use crate::term::Term;
use std::rc::Rc;

/// When a literal of a durative action must hold.  Non-durative
/// contexts use `OverAll` throughout.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FormulaTime {
    AtStart,
    AtEnd,
    OverAll,
}

impl Default for FormulaTime {
    fn default() -> Self {
        FormulaTime::OverAll
    }
}

/// `predicate(terms...)`, tagged with the time it refers to.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Atom {
    predicate: Predicate,
    terms: Vec<Term>,
    when: FormulaTime,
}

impl Atom {
    /// Returns an untimed (`OverAll`) atom.
    #[must_use]
    pub fn new(predicate: Predicate, terms: Vec<Term>) -> Self {
        Self::timed(predicate, terms, FormulaTime::OverAll)
    }

    #[must_use]
    pub fn timed(predicate: Predicate, terms: Vec<Term>, when: FormulaTime) -> Self {
        Self {
            predicate,
            terms,
            when,
        }
    }

    #[inline]
    #[must_use]
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    #[inline]
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[inline]
    #[must_use]
    pub fn when(&self) -> FormulaTime {
        self.when
    }

    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(|term| term.is_name())
    }
}

/// Returns `atom` with every term passed through `fun`, sharing the
/// original when nothing changes.
pub(crate) fn map_atom<F>(atom: &Rc<Atom>, fun: F) -> Rc<Atom>
where
    F: Fn(Term) -> Term,
{
    let terms: Vec<Term> = atom.terms.iter().map(|term| fun(*term)).collect();
    if terms.as_slice() == atom.terms() {
        return Rc::clone(atom);
    }

    Rc::new(Atom {
        predicate: atom.predicate,
        terms,
        when: atom.when,
    })
}

/// A signed atom: the only place negation may appear.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Literal {
    atom: Rc<Atom>,
    positive: bool,
}

impl Literal {
    #[must_use]
    pub fn positive(atom: Atom) -> Self {
        Self::from_rc(Rc::new(atom), true)
    }

    #[must_use]
    pub fn negative(atom: Atom) -> Self {
        Self::from_rc(Rc::new(atom), false)
    }

    pub(crate) fn from_rc(atom: Rc<Atom>, positive: bool) -> Self {
        Self { atom, positive }
    }

    #[inline]
    #[must_use]
    pub fn atom(&self) -> &Atom {
        &self.atom
    }

    pub(crate) fn shared_atom(&self) -> &Rc<Atom> {
        &self.atom
    }

    #[inline]
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    #[inline]
    #[must_use]
    pub fn predicate(&self) -> Predicate {
        self.atom.predicate()
    }

    #[must_use]
    pub fn negate(&self) -> Literal {
        Self::from_rc(Rc::clone(&self.atom), !self.positive)
    }
}

/// The two terms of an equality or inequality.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BindingLiteral {
    left: Term,
    right: Term,
}

impl BindingLiteral {
    pub(crate) fn new(left: Term, right: Term) -> Self {
        Self { left, right }
    }

    #[inline]
    #[must_use]
    pub fn left(&self) -> Term {
        self.left
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> Term {
        self.right
    }
}
