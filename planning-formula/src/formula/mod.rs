//! Formulas are kept in negation normal form by construction: the
//! only negation node wraps a single atom, and negating anything else
//! pushes the negation inwards (De Morgan for connectives, duality for
//! quantifiers, a flip for literals, a swap for the two constants).
//!
//! Connectives and quantifiers can only be built through the smart
//! constructors on `Formula`, which flatten nested connectives of the
//! same kind, absorb constants, and drop quantifier parameters that
//! don't occur free in the body.  Every other operation (substitution,
//! instantiation, static literal elimination, separation) goes back
//! through these constructors, so its result is simplified the same
//! way.
//!
//! Formulas are immutable values.  Sub-formulas are shared through
//! `Rc`, so cloning a formula is cheap and rewriting one only
//! allocates along the paths that change.
mod analysis;
mod display;
mod heuristic;
mod instantiate;
mod literal;

pub use display::FormulaDisplay;
pub use literal::Atom;
pub use literal::BindingLiteral;
pub use literal::FormulaTime;
pub use literal::Literal;

pub(crate) use literal::map_atom;

use crate::term::Term;
use crate::term::Variable;
use crate::vocabulary::Vocabulary;
use std::collections::BTreeSet;
use std::ops::BitAnd;
use std::ops::BitOr;
use std::ops::Not;
use std::rc::Rc;

/// The operands of a conjunction or disjunction: at least two, none of
/// them a constant or a connective of the same kind.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Connective {
    operands: Rc<[Formula]>,
}

impl Connective {
    #[inline]
    #[must_use]
    pub fn operands(&self) -> &[Formula] {
        &self.operands
    }
}

/// The parameters and body of a quantified formula.  Every parameter
/// occurs free in the body, and the body is never a constant.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Quantified {
    parameters: Vec<Variable>,
    body: Formula,
}

impl Quantified {
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[Variable] {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn body(&self) -> &Formula {
        &self.body
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Formula {
    True,
    False,
    Atom(Rc<Atom>),
    Negation(Rc<Atom>),
    Equality(BindingLiteral),
    Inequality(BindingLiteral),
    Conjunction(Connective),
    Disjunction(Connective),
    Exists(Rc<Quantified>),
    Forall(Rc<Quantified>),
}

/// The shape of a formula, without its contents.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FormulaKind {
    Constant,
    Atom,
    Negation,
    Equality,
    Inequality,
    Conjunction,
    Disjunction,
    Exists,
    Forall,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Junction {
    And,
    Or,
}

impl Junction {
    fn identity(self) -> Formula {
        match self {
            Junction::And => Formula::True,
            Junction::Or => Formula::False,
        }
    }

    fn absorbing(self) -> Formula {
        self.identity().negate()
    }

    fn wrap(self, operands: Vec<Formula>) -> Formula {
        let connective = Connective {
            operands: operands.into(),
        };

        match self {
            Junction::And => Formula::Conjunction(connective),
            Junction::Or => Formula::Disjunction(connective),
        }
    }

    /// Flattens `operands` into a single connective, absorbing
    /// constants along the way.
    fn join<I>(self, operands: I) -> Formula
    where
        I: IntoIterator<Item = Formula>,
    {
        let mut flat = Vec::new();

        for operand in operands {
            match (self, operand) {
                (Junction::And, Formula::True) | (Junction::Or, Formula::False) => {}
                (Junction::And, Formula::False) => return Formula::False,
                (Junction::Or, Formula::True) => return Formula::True,
                (Junction::And, Formula::Conjunction(inner))
                | (Junction::Or, Formula::Disjunction(inner)) => {
                    flat.extend(inner.operands.iter().cloned())
                }
                (_, other) => flat.push(other),
            }
        }

        match flat.len() {
            0 => self.identity(),
            1 => flat.swap_remove(0),
            _ => self.wrap(flat),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Quantifier {
    Exists,
    Forall,
}

impl Quantifier {
    fn bind(self, parameters: Vec<Variable>, body: Formula) -> Formula {
        if body.is_constant() {
            return body;
        }

        let free = body.free_variables();
        let mut kept: Vec<Variable> = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            if free.contains(&parameter) && !kept.contains(&parameter) {
                kept.push(parameter);
            }
        }

        if kept.is_empty() {
            return body;
        }

        self.wrap(kept, body)
    }

    /// Builds the node as is; callers guarantee the invariants on
    /// `Quantified`.
    fn wrap(self, parameters: Vec<Variable>, body: Formula) -> Formula {
        let quantified = Rc::new(Quantified { parameters, body });

        match self {
            Quantifier::Exists => Formula::Exists(quantified),
            Quantifier::Forall => Formula::Forall(quantified),
        }
    }
}

impl Formula {
    #[must_use]
    pub fn atom(atom: Atom) -> Formula {
        Formula::Atom(Rc::new(atom))
    }

    #[must_use]
    pub fn negation(atom: Atom) -> Formula {
        Formula::Negation(Rc::new(atom))
    }

    /// Returns the formula `left = right`, or a constant when the
    /// answer is already known: `TRUE` for the same term twice, and
    /// `FALSE` for two distinct names or terms of incompatible types.
    #[must_use]
    pub fn equality(left: Term, right: Term, vocabulary: &Vocabulary) -> Formula {
        if left == right {
            return Formula::True;
        }

        if left.is_name() && right.is_name() {
            return Formula::False;
        }

        if !vocabulary.compatible_terms(left, right) {
            return Formula::False;
        }

        Formula::Equality(BindingLiteral::new(left, right))
    }

    /// Returns the formula `left != right`, the negation of
    /// `equality(left, right)`.
    #[must_use]
    pub fn inequality(left: Term, right: Term, vocabulary: &Vocabulary) -> Formula {
        if left == right {
            return Formula::False;
        }

        if left.is_name() && right.is_name() {
            return Formula::True;
        }

        if !vocabulary.compatible_terms(left, right) {
            return Formula::True;
        }

        Formula::Inequality(BindingLiteral::new(left, right))
    }

    pub fn conjunction<I>(operands: I) -> Formula
    where
        I: IntoIterator<Item = Formula>,
    {
        Junction::And.join(operands)
    }

    pub fn disjunction<I>(operands: I) -> Formula
    where
        I: IntoIterator<Item = Formula>,
    {
        Junction::Or.join(operands)
    }

    /// Returns `exists parameters. body`, minus the parameters that
    /// don't occur free in `body`.  If none are left, that's just
    /// `body`.
    #[must_use]
    pub fn exists(parameters: Vec<Variable>, body: Formula) -> Formula {
        Quantifier::Exists.bind(parameters, body)
    }

    #[must_use]
    pub fn forall(parameters: Vec<Variable>, body: Formula) -> Formula {
        Quantifier::Forall.bind(parameters, body)
    }

    /// Returns the negation of this formula, in negation normal form.
    ///
    /// The result is built directly rather than through the smart
    /// constructors: negation maps a simplified formula to a simplified
    /// formula, and negating twice gives back the original, node for
    /// node.
    #[must_use]
    pub fn negate(&self) -> Formula {
        match self {
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            Formula::Atom(atom) => Formula::Negation(Rc::clone(atom)),
            Formula::Negation(atom) => Formula::Atom(Rc::clone(atom)),
            Formula::Equality(binding) => Formula::Inequality(*binding),
            Formula::Inequality(binding) => Formula::Equality(*binding),
            Formula::Conjunction(connective) => {
                Junction::Or.wrap(connective.operands.iter().map(Formula::negate).collect())
            }
            Formula::Disjunction(connective) => {
                Junction::And.wrap(connective.operands.iter().map(Formula::negate).collect())
            }
            Formula::Exists(quantified) => Quantifier::Forall.wrap(
                quantified.parameters.clone(),
                quantified.body.negate(),
            ),
            Formula::Forall(quantified) => Quantifier::Exists.wrap(
                quantified.parameters.clone(),
                quantified.body.negate(),
            ),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FormulaKind {
        match self {
            Formula::True | Formula::False => FormulaKind::Constant,
            Formula::Atom(_) => FormulaKind::Atom,
            Formula::Negation(_) => FormulaKind::Negation,
            Formula::Equality(_) => FormulaKind::Equality,
            Formula::Inequality(_) => FormulaKind::Inequality,
            Formula::Conjunction(_) => FormulaKind::Conjunction,
            Formula::Disjunction(_) => FormulaKind::Disjunction,
            Formula::Exists(_) => FormulaKind::Exists,
            Formula::Forall(_) => FormulaKind::Forall,
        }
    }

    /// Returns the signed atom for an atom or a negation.
    #[must_use]
    pub fn literal(&self) -> Option<Literal> {
        match self {
            Formula::Atom(atom) => Some(Literal::from_rc(Rc::clone(atom), true)),
            Formula::Negation(atom) => Some(Literal::from_rc(Rc::clone(atom), false)),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        matches!(self, Formula::True)
    }

    #[inline]
    #[must_use]
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Formula::False)
    }

    #[inline]
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.kind() == FormulaKind::Constant
    }

    /// Returns the plain variables that occur free in this formula.
    #[must_use]
    pub fn free_variables(&self) -> BTreeSet<Variable> {
        self.free_terms()
            .into_iter()
            .filter_map(|term| match term {
                Term::Variable(variable) => Some(variable),
                _ => None,
            })
            .collect()
    }

    /// Returns true iff no variable, plain or step-scoped, occurs free
    /// in this formula.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.free_terms().is_empty()
    }

    fn free_terms(&self) -> BTreeSet<Term> {
        let mut bound = Vec::new();
        let mut ret = BTreeSet::new();

        self.collect_free_terms(&mut bound, &mut ret);
        ret
    }

    fn collect_free_terms(&self, bound: &mut Vec<Variable>, acc: &mut BTreeSet<Term>) {
        fn visit(term: Term, bound: &[Variable], acc: &mut BTreeSet<Term>) {
            match term {
                Term::Name(_) => {}
                Term::Variable(variable) if bound.contains(&variable) => {}
                other => {
                    acc.insert(other);
                }
            }
        }

        match self {
            Formula::True | Formula::False => {}
            Formula::Atom(atom) | Formula::Negation(atom) => {
                for term in atom.terms() {
                    visit(*term, bound, acc);
                }
            }
            Formula::Equality(binding) | Formula::Inequality(binding) => {
                visit(binding.left(), bound, acc);
                visit(binding.right(), bound, acc);
            }
            Formula::Conjunction(connective) | Formula::Disjunction(connective) => {
                for operand in connective.operands() {
                    operand.collect_free_terms(bound, acc);
                }
            }
            Formula::Exists(quantified) | Formula::Forall(quantified) => {
                let depth = bound.len();

                bound.extend_from_slice(&quantified.parameters);
                quantified.body.collect_free_terms(bound, acc);
                bound.truncate(depth);
            }
        }
    }
}

impl From<bool> for Formula {
    fn from(value: bool) -> Formula {
        if value {
            Formula::True
        } else {
            Formula::False
        }
    }
}

impl From<Literal> for Formula {
    fn from(literal: Literal) -> Formula {
        let positive = literal.is_positive();
        let atom = Rc::clone(literal.shared_atom());

        if positive {
            Formula::Atom(atom)
        } else {
            Formula::Negation(atom)
        }
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Formula {
        self.negate()
    }
}

impl BitAnd for Formula {
    type Output = Formula;

    fn bitand(self, other: Formula) -> Formula {
        Formula::conjunction(vec![self, other])
    }
}

impl BitOr for Formula {
    type Output = Formula;

    fn bitor(self, other: Formula) -> Formula {
        Formula::disjunction(vec![self, other])
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::predicate::Predicate;
    use crate::term::Name;
    use type_lattice::Type;

    /// A tiny blocksworld: `block` and `ball` are unrelated, `on` and
    /// `clear` are over blocks, and `fixed` is static.
    pub(crate) struct Blocks {
        pub(crate) vocabulary: Vocabulary,
        pub(crate) block: Type,
        pub(crate) ball: Type,
        pub(crate) on: Predicate,
        pub(crate) clear: Predicate,
        pub(crate) fixed: Predicate,
        pub(crate) a: Name,
        pub(crate) b: Name,
        pub(crate) c: Name,
        pub(crate) red: Name,
        pub(crate) x: Variable,
        pub(crate) y: Variable,
        pub(crate) z: Variable,
    }

    impl Blocks {
        pub(crate) fn new() -> Self {
            let mut vocabulary = Vocabulary::new();
            let block = vocabulary.types_mut().add_type("block");
            let ball = vocabulary.types_mut().add_type("ball");
            let on = vocabulary.add_predicate("on", vec![block, block]);
            let clear = vocabulary.add_predicate("clear", vec![block]);
            let fixed = vocabulary.add_predicate("fixed", vec![block]);
            vocabulary.predicates_mut().make_dynamic(on);
            vocabulary.predicates_mut().make_dynamic(clear);

            let a = vocabulary.add_name("a", block);
            let b = vocabulary.add_name("b", block);
            let c = vocabulary.add_name("c", block);
            let red = vocabulary.add_name("red", ball);
            let x = vocabulary.add_variable("x", block);
            let y = vocabulary.add_variable("y", block);
            let z = vocabulary.add_variable("z", ball);

            Self {
                vocabulary,
                block,
                ball,
                on,
                clear,
                fixed,
                a,
                b,
                c,
                red,
                x,
                y,
                z,
            }
        }

        pub(crate) fn on<L: Into<Term>, R: Into<Term>>(&self, left: L, right: R) -> Formula {
            Formula::atom(Atom::new(self.on, vec![left.into(), right.into()]))
        }

        pub(crate) fn clear<T: Into<Term>>(&self, term: T) -> Formula {
            Formula::atom(Atom::new(self.clear, vec![term.into()]))
        }

        pub(crate) fn fixed<T: Into<Term>>(&self, term: T) -> Formula {
            Formula::atom(Atom::new(self.fixed, vec![term.into()]))
        }
    }
}

#[cfg(test)]
use test_support::Blocks;

#[test]
fn test_constant_absorption() {
    let w = Blocks::new();
    let p = w.clear(w.a);

    assert_eq!(Formula::conjunction(vec![Formula::True, p.clone()]), p);
    assert_eq!(Formula::conjunction(vec![Formula::False, p.clone()]), Formula::False);
    assert_eq!(Formula::disjunction(vec![Formula::False, p.clone()]), p);
    assert_eq!(Formula::disjunction(vec![p.clone(), Formula::True]), Formula::True);
    assert_eq!(Formula::conjunction(Vec::new()), Formula::True);
    assert_eq!(Formula::disjunction(Vec::new()), Formula::False);
}

#[test]
fn test_flattening() {
    let w = Blocks::new();
    let p = w.clear(w.a);
    let q = w.clear(w.b);
    let r = w.clear(w.c);

    let nested = (p.clone() & q.clone()) & r.clone();
    match &nested {
        Formula::Conjunction(connective) => {
            assert_eq!(connective.operands(), &[p.clone(), q.clone(), r.clone()][..])
        }
        other => panic!("expected a conjunction, got {:?}", other),
    }

    // A disjunction inside a conjunction stays put.
    let mixed = p.clone() & (q.clone() | r.clone());
    assert_eq!(mixed.kind(), FormulaKind::Conjunction);
    if let Formula::Conjunction(connective) = &mixed {
        assert_eq!(connective.operands().len(), 2);
        assert_eq!(connective.operands()[1].kind(), FormulaKind::Disjunction);
    }
}

#[test]
fn test_negation_normal_form() {
    let w = Blocks::new();
    let ab = w.on(w.a, w.b);
    let bc = w.on(w.b, w.c);

    let formula = !ab.clone() & !bc.clone();
    match &formula {
        Formula::Conjunction(connective) => {
            for operand in connective.operands() {
                assert_eq!(operand.kind(), FormulaKind::Negation);
            }
        }
        other => panic!("expected a conjunction, got {:?}", other),
    }

    assert_eq!(formula.negate(), ab | bc);
}

#[test]
fn test_double_negation() {
    let w = Blocks::new();
    let x = Term::from(w.x);
    let y = Term::from(w.y);
    let formulas = vec![
        Formula::True,
        Formula::False,
        w.on(x, y),
        !w.on(x, y),
        Formula::equality(x, y, &w.vocabulary),
        Formula::inequality(x, y, &w.vocabulary),
        w.on(x, y) & w.clear(x),
        w.on(x, y) | !w.clear(y),
        Formula::exists(vec![w.x], w.on(x, y) & w.clear(x)),
        Formula::forall(vec![w.x, w.y], w.on(x, y) | w.clear(x)),
    ];

    for formula in formulas {
        assert_eq!(formula.negate().negate(), formula);
        assert_ne!(formula.negate(), formula);
    }
}

#[test]
fn test_quantifier_duality() {
    let w = Blocks::new();
    let body = w.on(w.x, w.y);
    let exists = Formula::exists(vec![w.x], body.clone());

    match exists.negate() {
        Formula::Forall(quantified) => {
            assert_eq!(quantified.parameters(), &[w.x]);
            assert_eq!(quantified.body(), &body.negate());
        }
        other => panic!("expected a universal, got {:?}", other),
    }
}

#[test]
fn test_unused_binder_elided() {
    let w = Blocks::new();
    let p = w.on(w.a, w.y);

    assert_eq!(Formula::exists(vec![w.x], p.clone()), p);
    assert_eq!(Formula::forall(Vec::new(), p.clone()), p);
    assert_eq!(Formula::forall(vec![w.x], Formula::True), Formula::True);

    // Unused parameters go, used ones stay, each once.
    match Formula::exists(vec![w.x, w.y, w.y], p) {
        Formula::Exists(quantified) => assert_eq!(quantified.parameters(), &[w.y]),
        other => panic!("expected an existential, got {:?}", other),
    }
}

#[test]
fn test_equality_folding() {
    let w = Blocks::new();
    let v = &w.vocabulary;
    let a = Term::from(w.a);
    let b = Term::from(w.b);
    let x = Term::from(w.x);
    let z = Term::from(w.z);
    let red = Term::from(w.red);

    assert_eq!(Formula::equality(a, a, v), Formula::True);
    assert_eq!(Formula::equality(a, b, v), Formula::False);
    assert_eq!(Formula::equality(x, x, v), Formula::True);
    // block and ball have nothing in common.
    assert_eq!(v.type_of(z), w.ball);
    assert_eq!(Formula::equality(x, z, v), Formula::False);
    assert_eq!(Formula::equality(x, red, v), Formula::False);
    assert_eq!(Formula::equality(x, a, v).kind(), FormulaKind::Equality);

    assert_eq!(Formula::inequality(a, a, v), Formula::False);
    assert_eq!(Formula::inequality(a, b, v), Formula::True);
    assert_eq!(Formula::inequality(x, z, v), Formula::True);
    assert_eq!(Formula::inequality(x, a, v).kind(), FormulaKind::Inequality);
    assert_eq!(
        Formula::equality(x, a, v).negate(),
        Formula::inequality(x, a, v)
    );
}

#[test]
fn test_free_variables() {
    let w = Blocks::new();
    let formula = Formula::exists(vec![w.x], w.on(w.x, w.y)) & w.clear(w.x);

    let free: Vec<Variable> = formula.free_variables().into_iter().collect();
    let mut expected = vec![w.x, w.y];
    expected.sort();
    assert_eq!(free, expected);
    assert!(!formula.is_ground());

    let closed = Formula::forall(vec![w.x, w.y], formula);
    assert!(closed.free_variables().is_empty());
    assert!(closed.is_ground());
    assert!(w.on(w.a, w.b).is_ground());
}

#[test]
fn test_literal_view() {
    let w = Blocks::new();
    let atom = w.on(w.a, w.b);
    let literal = atom.literal().expect("atoms are literals");

    assert!(literal.is_positive());
    assert_eq!(literal.predicate(), w.on);
    assert_eq!(Formula::from(literal.negate()), atom.negate());
    assert_eq!(Formula::from(literal), atom);
    assert!((atom.clone() & w.clear(w.a)).literal().is_none());
    assert_eq!(Formula::from(true), Formula::True);
    assert!(Formula::from(false).is_contradiction());
}
