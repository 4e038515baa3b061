//! Queries and rewrites used by plan search: dropping static literals,
//! separating a formula from a threatening literal, coarse duplicate
//! detection, and the requirement a negation assumes.
use super::Atom;
use super::Formula;
use super::Literal;
use super::Quantified;
use crate::collaborator::Domain;
use crate::requirement::Requirement;
use crate::vocabulary::Vocabulary;

impl Formula {
    /// Assumes every literal over a static predicate of `domain` holds.
    ///
    /// Static literals are decided by the initial state, so callers
    /// only apply this to formulas they have already checked against
    /// it, e.g., action preconditions after grounding.
    #[must_use]
    pub fn strip_static<D>(&self, domain: &D) -> Formula
    where
        D: Domain + ?Sized,
    {
        match self {
            Formula::Atom(atom) | Formula::Negation(atom) if domain.is_static(atom.predicate()) => {
                Formula::True
            }
            Formula::True
            | Formula::False
            | Formula::Atom(_)
            | Formula::Negation(_)
            | Formula::Equality(_)
            | Formula::Inequality(_) => self.clone(),
            Formula::Conjunction(connective) => Formula::conjunction(
                connective
                    .operands()
                    .iter()
                    .map(|operand| operand.strip_static(domain)),
            ),
            Formula::Disjunction(connective) => Formula::disjunction(
                connective
                    .operands()
                    .iter()
                    .map(|operand| operand.strip_static(domain)),
            ),
            Formula::Exists(quantified) => Formula::exists(
                quantified.parameters().to_vec(),
                quantified.body().strip_static(domain),
            ),
            Formula::Forall(quantified) => Formula::forall(
                quantified.parameters().to_vec(),
                quantified.body().strip_static(domain),
            ),
        }
    }

    /// Returns a condition under which this formula cannot assert
    /// `literal`: for a literal with the same sign and predicate, one
    /// of the argument pairs must differ.  Anything else never
    /// overlaps `literal`, and separates into `TRUE`.
    #[must_use]
    pub fn separate(&self, literal: &Literal, vocabulary: &Vocabulary) -> Formula {
        match self {
            Formula::Atom(atom) => separate_atom(atom, true, literal, vocabulary),
            Formula::Negation(atom) => separate_atom(atom, false, literal, vocabulary),
            Formula::True
            | Formula::False
            | Formula::Equality(_)
            | Formula::Inequality(_) => Formula::True,
            Formula::Conjunction(connective) => Formula::conjunction(
                connective
                    .operands()
                    .iter()
                    .map(|operand| operand.separate(literal, vocabulary)),
            ),
            Formula::Disjunction(connective) => Formula::disjunction(
                connective
                    .operands()
                    .iter()
                    .map(|operand| operand.separate(literal, vocabulary)),
            ),
            Formula::Exists(quantified) => Formula::exists(
                quantified.parameters().to_vec(),
                quantified.body().separate(literal, vocabulary),
            ),
            Formula::Forall(quantified) => Formula::forall(
                quantified.parameters().to_vec(),
                quantified.body().separate(literal, vocabulary),
            ),
        }
    }

    /// Structural comparison up to `Term::equivalent`: the same shape,
    /// the same predicates, and pairwise equivalent terms.  Any two
    /// variables are equivalent, so this is coarser than equality up to
    /// renaming.
    #[must_use]
    pub fn equivalent(&self, other: &Formula) -> bool {
        match (self, other) {
            (Formula::True, Formula::True) | (Formula::False, Formula::False) => true,
            (Formula::Atom(a), Formula::Atom(b)) | (Formula::Negation(a), Formula::Negation(b)) => {
                equivalent_atoms(a, b)
            }
            (Formula::Equality(a), Formula::Equality(b))
            | (Formula::Inequality(a), Formula::Inequality(b)) => {
                a.left().equivalent(b.left()) && a.right().equivalent(b.right())
            }
            (Formula::Conjunction(a), Formula::Conjunction(b))
            | (Formula::Disjunction(a), Formula::Disjunction(b)) => {
                a.operands().len() == b.operands().len()
                    && a
                        .operands()
                        .iter()
                        .zip(b.operands())
                        .all(|(x, y)| x.equivalent(y))
            }
            (Formula::Exists(a), Formula::Exists(b)) | (Formula::Forall(a), Formula::Forall(b)) => {
                equivalent_quantified(a, b)
            }
            _ => false,
        }
    }

    /// Returns the requirement that licenses negating this formula, if
    /// any.
    #[must_use]
    pub fn negation_requirement(&self) -> Option<Requirement> {
        match self {
            Formula::True | Formula::False => None,
            Formula::Atom(_) | Formula::Negation(_) => Some(Requirement::NegativePreconditions),
            Formula::Equality(_) | Formula::Inequality(_) => Some(Requirement::Equality),
            Formula::Conjunction(_) | Formula::Disjunction(_) => {
                Some(Requirement::DisjunctivePreconditions)
            }
            Formula::Exists(_) => Some(Requirement::UniversalPreconditions),
            Formula::Forall(_) => Some(Requirement::ExistentialPreconditions),
        }
    }
}

fn separate_atom(
    atom: &Atom,
    positive: bool,
    literal: &Literal,
    vocabulary: &Vocabulary,
) -> Formula {
    let other = literal.atom();

    if positive != literal.is_positive()
        || atom.predicate() != other.predicate()
        || atom.terms().len() != other.terms().len()
    {
        return Formula::True;
    }

    Formula::disjunction(
        atom.terms()
            .iter()
            .zip(other.terms())
            .map(|(mine, theirs)| Formula::inequality(*mine, *theirs, vocabulary)),
    )
}

fn equivalent_atoms(a: &Atom, b: &Atom) -> bool {
    a.predicate() == b.predicate()
        && a.terms().len() == b.terms().len()
        && a
            .terms()
            .iter()
            .zip(b.terms())
            .all(|(x, y)| x.equivalent(*y))
}

fn equivalent_quantified(a: &Quantified, b: &Quantified) -> bool {
    a.parameters().len() == b.parameters().len() && a.body().equivalent(b.body())
}

#[cfg(test)]
use super::test_support::Blocks;
#[cfg(test)]
use super::FormulaKind;
#[cfg(test)]
use crate::term::Term;

#[test]
fn test_strip_static() {
    let w = Blocks::new();
    let v = &w.vocabulary;

    assert_eq!(w.fixed(w.x).strip_static(v), Formula::True);
    assert_eq!(w.fixed(w.x).negate().strip_static(v), Formula::True);
    assert_eq!(
        (w.fixed(w.x) & w.clear(w.x)).strip_static(v),
        w.clear(w.x)
    );
    assert_eq!(
        (w.fixed(w.x) | w.clear(w.x)).strip_static(v),
        Formula::True
    );

    let equality = Formula::equality(w.x.into(), w.a.into(), v);
    assert_eq!(equality.strip_static(v), equality);

    // The binder goes with the only literal that used it.
    let quantified = Formula::exists(vec![w.x], w.fixed(w.x) & w.clear(w.y));
    assert_eq!(quantified.strip_static(v), w.clear(w.y));
}

#[test]
fn test_separate() {
    let w = Blocks::new();
    let v = &w.vocabulary;
    let on_ab = w.on(w.a, w.b).literal().expect("atom");

    assert_eq!(
        w.on(w.x, w.y).separate(&on_ab, v),
        Formula::inequality(w.x.into(), w.a.into(), v)
            | Formula::inequality(w.y.into(), w.b.into(), v)
    );
    // Only the variable position can differ.
    assert_eq!(
        w.on(w.a, w.y).separate(&on_ab, v),
        Formula::inequality(w.y.into(), w.b.into(), v)
    );
    assert_eq!(w.on(w.a, w.b).separate(&on_ab, v), Formula::False);
    assert_eq!(w.on(w.b, w.y).separate(&on_ab, v), Formula::True);

    // Different sign or predicate never overlaps.
    assert_eq!(w.on(w.x, w.y).negate().separate(&on_ab, v), Formula::True);
    assert_eq!(w.clear(w.x).separate(&on_ab, v), Formula::True);
    assert_eq!(
        w.on(w.x, w.y)
            .negate()
            .separate(&on_ab.negate(), v)
            .kind(),
        FormulaKind::Disjunction
    );

    // Connectives keep their shape.
    let both = (w.on(w.a, w.y) & w.clear(w.x)).separate(&on_ab, v);
    assert_eq!(both, Formula::inequality(w.y.into(), w.b.into(), v));
    let either = (w.on(w.a, w.y) | w.on(w.a, w.b)).separate(&on_ab, v);
    assert_eq!(either, Formula::inequality(w.y.into(), w.b.into(), v));
}

#[test]
fn test_equivalent_is_coarse() {
    let w = Blocks::new();
    let v = &w.vocabulary;

    assert!(w.on(w.x, w.a).equivalent(&w.on(w.y, w.a)));
    assert!(w.on(w.x, w.y).equivalent(&w.on(w.y, w.x)));
    assert!(!w.on(w.x, w.a).equivalent(&w.on(w.x, w.b)));
    assert!(!w.on(w.x, w.a).equivalent(&w.on(w.a, w.x)));
    assert!(!w.on(w.x, w.y).equivalent(&w.on(w.x, w.y).negate()));
    assert!(!w.clear(w.x).equivalent(&w.fixed(w.x)));

    let x = Term::from(w.x);
    let y = Term::from(w.y);
    assert!(
        Formula::equality(x, w.a.into(), v).equivalent(&Formula::equality(y, w.a.into(), v))
    );
    assert!(
        !Formula::equality(x, w.a.into(), v).equivalent(&Formula::inequality(y, w.a.into(), v))
    );

    assert!((w.clear(w.x) & w.clear(w.a)).equivalent(&(w.clear(w.y) & w.clear(w.a))));
    assert!(!(w.clear(w.x) & w.clear(w.a)).equivalent(&(w.clear(w.a) & w.clear(w.x))));
    assert!(Formula::exists(vec![w.x], w.clear(w.x))
        .equivalent(&Formula::exists(vec![w.y], w.clear(w.y))));
    assert!(!Formula::exists(vec![w.x], w.clear(w.x))
        .equivalent(&Formula::forall(vec![w.y], w.clear(w.y))));
    assert!(Formula::True.equivalent(&Formula::True));
    assert!(!Formula::True.equivalent(&Formula::False));
}

#[test]
fn test_negation_requirement() {
    let w = Blocks::new();
    let v = &w.vocabulary;

    assert_eq!(Formula::True.negation_requirement(), None);
    assert_eq!(
        w.clear(w.a).negation_requirement(),
        Some(Requirement::NegativePreconditions)
    );
    assert_eq!(
        Formula::equality(w.x.into(), w.a.into(), v).negation_requirement(),
        Some(Requirement::Equality)
    );
    assert_eq!(
        (w.clear(w.a) & w.clear(w.b)).negation_requirement(),
        Some(Requirement::DisjunctivePreconditions)
    );
    assert_eq!(
        Formula::exists(vec![w.x], w.clear(w.x)).negation_requirement(),
        Some(Requirement::UniversalPreconditions)
    );
}
