//! Making formulas more concrete: syntactic substitution,
//! specialisation to a plan step, resolution against a binding store,
//! and full grounding against a problem's initial state.
//!
//! None of these can fail.  An input we can't decide yields a less
//! simplified result.
use super::map_atom;
use super::Atom;
use super::BindingLiteral;
use super::Formula;
use super::Junction;
use super::Quantified;
use crate::collaborator::Bindings;
use crate::collaborator::Problem;
use crate::term::Name;
use crate::term::StepId;
use crate::term::Substitution;
use crate::term::Term;
use crate::term::Variable;
use crate::vocabulary::Vocabulary;
use std::rc::Rc;
use tracing::debug;

impl Formula {
    /// Replaces the free variables mapped by `substitution`.  The only
    /// simplification is what the constructors do on their own, e.g.,
    /// an equality between two names folds to a constant.
    ///
    /// Variables bound by a quantifier inside `self` are left alone, and
    /// binders are never renamed: the mapped values must not mention
    /// variables bound inside the formula.
    #[must_use]
    pub fn substitute(&self, substitution: &Substitution, vocabulary: &Vocabulary) -> Formula {
        if substitution.is_empty() {
            return self.clone();
        }

        self.rewrite(
            &|term: Term| term.substitute(substitution),
            &|left: Term, right: Term, positive: bool| {
                binding_formula(left, right, positive, vocabulary)
            },
            &[],
        )
    }

    /// Specialises every free variable to `step`.  Bound variables stay
    /// plain: they are renamed when the quantifier is expanded.
    #[must_use]
    pub fn instantiate_step(&self, step: StepId) -> Formula {
        self.rewrite(
            &|term: Term| term.instantiate(step),
            &|left: Term, right: Term, positive: bool| {
                let binding = BindingLiteral::new(left, right);
                if positive {
                    Formula::Equality(binding)
                } else {
                    Formula::Inequality(binding)
                }
            },
            &[],
        )
    }

    /// Resolves terms to the names `bindings` forces them to, and folds
    /// the equalities and inequalities that `bindings` already decides.
    #[must_use]
    pub fn instantiate_bindings<B>(&self, bindings: &B, vocabulary: &Vocabulary) -> Formula
    where
        B: Bindings + ?Sized,
    {
        self.rewrite(
            &|term: Term| bindings.binding(term),
            &|left: Term, right: Term, positive: bool| {
                if bindings.equal(left, right) {
                    Formula::from(positive)
                } else if bindings.distinct(left, right) {
                    Formula::from(!positive)
                } else {
                    binding_formula(left, right, positive, vocabulary)
                }
            },
            &[],
        )
    }

    /// Grounds this formula under `substitution`.
    ///
    /// Literals over static predicates are decided against `problem`'s
    /// initial state: a ground one by lookup, and a partially ground
    /// one is false when no initial fact matches its names.  Quantifiers
    /// expand over the objects compatible with each parameter's type;
    /// with no such object, `exists` is false and `forall` is true.
    #[must_use]
    pub fn instantiate_ground<P>(
        &self,
        substitution: &Substitution,
        problem: &P,
        vocabulary: &Vocabulary,
    ) -> Formula
    where
        P: Problem + ?Sized,
    {
        match self {
            Formula::True | Formula::False => self.clone(),
            Formula::Atom(atom) => ground_literal(atom, true, substitution, problem),
            Formula::Negation(atom) => ground_literal(atom, false, substitution, problem),
            Formula::Equality(binding) => binding_formula(
                binding.left().substitute(substitution),
                binding.right().substitute(substitution),
                true,
                vocabulary,
            ),
            Formula::Inequality(binding) => binding_formula(
                binding.left().substitute(substitution),
                binding.right().substitute(substitution),
                false,
                vocabulary,
            ),
            Formula::Conjunction(connective) => Formula::conjunction(
                connective
                    .operands()
                    .iter()
                    .map(|operand| operand.instantiate_ground(substitution, problem, vocabulary)),
            ),
            Formula::Disjunction(connective) => Formula::disjunction(
                connective
                    .operands()
                    .iter()
                    .map(|operand| operand.instantiate_ground(substitution, problem, vocabulary)),
            ),
            Formula::Exists(quantified) => {
                expand(Junction::Or, quantified, substitution, problem, vocabulary)
            }
            Formula::Forall(quantified) => {
                expand(Junction::And, quantified, substitution, problem, vocabulary)
            }
        }
    }

    /// Rebuilds this formula with `map` applied to every free term, and
    /// `binding` building the equalities (`true`) and inequalities
    /// (`false`).
    pub(super) fn rewrite<M, E>(&self, map: &M, binding: &E, bound: &[Variable]) -> Formula
    where
        M: Fn(Term) -> Term,
        E: Fn(Term, Term, bool) -> Formula,
    {
        let apply = |term: Term| match term {
            Term::Variable(variable) if bound.contains(&variable) => term,
            _ => map(term),
        };

        match self {
            Formula::True | Formula::False => self.clone(),
            Formula::Atom(atom) => Formula::Atom(map_atom(atom, &apply)),
            Formula::Negation(atom) => Formula::Negation(map_atom(atom, &apply)),
            Formula::Equality(literal) => {
                binding(apply(literal.left()), apply(literal.right()), true)
            }
            Formula::Inequality(literal) => {
                binding(apply(literal.left()), apply(literal.right()), false)
            }
            Formula::Conjunction(connective) => Formula::conjunction(
                connective
                    .operands()
                    .iter()
                    .map(|operand| operand.rewrite(map, binding, bound)),
            ),
            Formula::Disjunction(connective) => Formula::disjunction(
                connective
                    .operands()
                    .iter()
                    .map(|operand| operand.rewrite(map, binding, bound)),
            ),
            Formula::Exists(quantified) => {
                let (parameters, body) = rewrite_body(quantified, map, binding, bound);
                Formula::exists(parameters, body)
            }
            Formula::Forall(quantified) => {
                let (parameters, body) = rewrite_body(quantified, map, binding, bound);
                Formula::forall(parameters, body)
            }
        }
    }
}

fn rewrite_body<M, E>(
    quantified: &Quantified,
    map: &M,
    binding: &E,
    bound: &[Variable],
) -> (Vec<Variable>, Formula)
where
    M: Fn(Term) -> Term,
    E: Fn(Term, Term, bool) -> Formula,
{
    let mut inner = bound.to_vec();
    inner.extend_from_slice(quantified.parameters());

    (
        quantified.parameters().to_vec(),
        quantified.body().rewrite(map, binding, &inner),
    )
}

fn binding_formula(left: Term, right: Term, positive: bool, vocabulary: &Vocabulary) -> Formula {
    if positive {
        Formula::equality(left, right, vocabulary)
    } else {
        Formula::inequality(left, right, vocabulary)
    }
}

fn ground_literal<P>(
    atom: &Rc<Atom>,
    positive: bool,
    substitution: &Substitution,
    problem: &P,
) -> Formula
where
    P: Problem + ?Sized,
{
    let atom = map_atom(atom, |term| term.substitute(substitution));

    if problem.is_static(atom.predicate()) {
        let pattern: Vec<Option<Name>> = atom.terms().iter().map(|term| term.as_name()).collect();
        let matched = problem.matches_initially(atom.predicate(), &pattern);

        if atom.is_ground() {
            return Formula::from(matched == positive);
        }

        // Some variables left.  If nothing in the initial state even
        // matches the names we have, the atom can never hold.
        if !matched {
            return Formula::from(!positive);
        }
    }

    if positive {
        Formula::Atom(atom)
    } else {
        Formula::Negation(atom)
    }
}

/// Expands a quantifier into the `junction` of its instances, one for
/// each assignment of compatible objects to its parameters.
fn expand<P>(
    junction: Junction,
    quantified: &Quantified,
    substitution: &Substitution,
    problem: &P,
    vocabulary: &Vocabulary,
) -> Formula
where
    P: Problem + ?Sized,
{
    let absorbing = junction.absorbing();
    let mut instances = Vec::new();

    for assignment in Assignments::new(quantified.parameters(), substitution, problem, vocabulary) {
        let instance = quantified
            .body()
            .instantiate_ground(&assignment, problem, vocabulary);
        if instance == absorbing {
            return instance;
        }

        instances.push(instance);
    }

    debug!(?junction, count = instances.len(), "expanded quantifier");
    junction.join(instances)
}

/// Enumerates every assignment of compatible objects to a list of
/// parameters, each on top of a base substitution.  A parameter with
/// no compatible object means there is no assignment at all.
pub(super) struct Assignments<'a> {
    parameters: &'a [Variable],
    domains: Vec<Vec<Name>>,
    base: Substitution,
    // The next assignment to yield, as one index per domain.  `None`
    // once we're done.
    indices: Option<Vec<usize>>,
}

impl<'a> Assignments<'a> {
    pub(super) fn new<P>(
        parameters: &'a [Variable],
        base: &Substitution,
        problem: &P,
        vocabulary: &Vocabulary,
    ) -> Self
    where
        P: Problem + ?Sized,
    {
        let domains: Vec<Vec<Name>> = parameters
            .iter()
            .map(|parameter| {
                problem.compatible_objects(vocabulary.terms().variable_type(*parameter))
            })
            .collect();
        let indices = if domains.iter().any(Vec::is_empty) {
            None
        } else {
            Some(vec![0; domains.len()])
        };

        Self {
            parameters,
            domains,
            base: base.without(parameters),
            indices,
        }
    }
}

impl Iterator for Assignments<'_> {
    type Item = Substitution;

    fn next(&mut self) -> Option<Substitution> {
        let indices = self.indices.as_mut()?;
        let mut assignment = self.base.clone();

        let positions = self.parameters.iter().zip(&self.domains).zip(&*indices);
        for ((parameter, domain), index) in positions {
            assignment.insert(*parameter, Term::Name(domain[*index]));
        }

        // Advance the odometer, least significant parameter first.
        let mut exhausted = true;
        for (index, domain) in indices.iter_mut().zip(&self.domains) {
            *index += 1;
            if *index < domain.len() {
                exhausted = false;
                break;
            }

            *index = 0;
        }

        if exhausted {
            self.indices = None;
        }

        Some(assignment)
    }
}

#[cfg(test)]
use super::test_support::Blocks;
#[cfg(test)]
use super::FormulaKind;
#[cfg(test)]
use crate::problem::InitialState;
#[cfg(test)]
use std::collections::BTreeMap;
#[cfg(test)]
use std::collections::BTreeSet;

/// Bindings where some terms are bound to names, and some pairs are
/// known to differ.
#[cfg(test)]
#[derive(Default)]
struct FixedBindings {
    values: BTreeMap<Term, Name>,
    distinct: Vec<(Term, Term)>,
}

#[cfg(test)]
impl Bindings for FixedBindings {
    fn equal(&self, left: Term, right: Term) -> bool {
        self.binding(left) == self.binding(right)
    }

    fn distinct(&self, left: Term, right: Term) -> bool {
        let (l, r) = (self.binding(left), self.binding(right));

        (l.is_name() && r.is_name() && l != r)
            || self.distinct.contains(&(left, right))
            || self.distinct.contains(&(right, left))
    }

    fn values(&self, term: Term) -> Option<BTreeSet<Name>> {
        self.values
            .get(&term)
            .map(|name| std::iter::once(*name).collect())
    }
}

#[test]
fn test_substitute() {
    let w = Blocks::new();
    let v = &w.vocabulary;
    let x = Term::from(w.x);
    let y = Term::from(w.y);

    let mut substitution = Substitution::new();
    substitution.insert(w.x, Term::Name(w.a));

    assert_eq!(
        w.on(x, y).substitute(&substitution, v),
        w.on(w.a, w.y)
    );
    assert_eq!(
        (!w.clear(x) & w.clear(y)).substitute(&substitution, v),
        !w.clear(w.a) & w.clear(w.y)
    );

    // Equalities between names fold.
    substitution.insert(w.y, Term::Name(w.b));
    assert_eq!(
        Formula::equality(x, y, v).substitute(&substitution, v),
        Formula::False
    );
    assert_eq!(
        Formula::inequality(x, y, v).substitute(&substitution, v),
        Formula::True
    );
    assert_eq!(w.clear(x).substitute(&Substitution::new(), v), w.clear(x));
}

#[test]
fn test_substitute_respects_binders() {
    let w = Blocks::new();
    let v = &w.vocabulary;

    let mut substitution = Substitution::new();
    substitution.insert(w.x, Term::Name(w.a));
    substitution.insert(w.y, Term::Name(w.b));

    let formula = Formula::exists(vec![w.x], w.on(w.x, w.y));
    assert_eq!(
        formula.substitute(&substitution, v),
        Formula::exists(vec![w.x], w.on(w.x, w.b))
    );
}

#[test]
fn test_instantiate_step() {
    let w = Blocks::new();
    let step = StepId::new(4);
    let x4 = Term::from(w.x.instantiate(step));
    let y4 = Term::from(w.y.instantiate(step));

    let formula = w.on(w.x, w.a) & Formula::inequality(w.x.into(), w.y.into(), &w.vocabulary);
    let first = formula.instantiate_step(step);
    let second = formula.instantiate_step(step);

    assert_eq!(first, second);
    assert_eq!(
        first,
        w.on(x4, w.a) & Formula::inequality(x4, y4, &w.vocabulary)
    );
    assert_eq!(first.instantiate_step(step), first);
    assert_ne!(first, formula.instantiate_step(StepId::new(5)));
    assert!(first.free_variables().is_empty());
    assert!(!first.is_ground());

    // Only free variables are specialised.
    let quantified = Formula::forall(vec![w.x], w.on(w.x, w.y));
    assert_eq!(
        quantified.instantiate_step(step),
        Formula::forall(vec![w.x], w.on(w.x, y4))
    );
}

#[test]
fn test_instantiate_bindings() {
    let w = Blocks::new();
    let v = &w.vocabulary;
    let x = Term::from(w.x);
    let y = Term::from(w.y);

    let mut bindings = FixedBindings::default();
    bindings.values.insert(x, w.a);

    assert_eq!(w.clear(x).instantiate_bindings(&bindings, v), w.clear(w.a));
    assert_eq!(
        Formula::equality(x, Term::from(w.a), v).instantiate_bindings(&bindings, v),
        Formula::True
    );
    assert_eq!(
        Formula::inequality(x, Term::from(w.b), v).instantiate_bindings(&bindings, v),
        Formula::True
    );

    // Undecided binding literals survive, over the bound names.
    let undecided = Formula::equality(x, y, v).instantiate_bindings(&bindings, v);
    assert_eq!(undecided, Formula::equality(Term::from(w.a), y, v));
    assert_eq!(undecided.kind(), FormulaKind::Equality);

    bindings.distinct.push((y, Term::from(w.a)));
    assert_eq!(
        (Formula::equality(x, y, v) | w.clear(y)).instantiate_bindings(&bindings, v),
        w.clear(y)
    );
}

#[test]
fn test_ground_static_literals() {
    let mut w = Blocks::new();
    let above = w.vocabulary.add_predicate("above", vec![w.block, w.block]);
    let mut init = InitialState::new(&w.vocabulary);
    init.insert(w.fixed, vec![w.a]);
    init.insert(above, vec![w.a, w.b]);

    let v = &w.vocabulary;
    let at = |name: Name| {
        let mut substitution = Substitution::new();
        substitution.insert(w.x, Term::Name(name));
        substitution
    };

    assert_eq!(w.fixed(w.x).instantiate_ground(&at(w.a), &init, v), Formula::True);
    assert_eq!(w.fixed(w.x).instantiate_ground(&at(w.b), &init, v), Formula::False);
    assert_eq!(
        w.fixed(w.x).negate().instantiate_ground(&at(w.b), &init, v),
        Formula::True
    );

    // Partially ground static literals are false when nothing
    // matches, and kept otherwise.
    let partial = Formula::atom(Atom::new(above, vec![w.x.into(), w.y.into()]));
    assert_eq!(
        partial.instantiate_ground(&at(w.b), &init, v),
        Formula::False
    );
    assert_eq!(
        partial.instantiate_ground(&at(w.a), &init, v),
        Formula::atom(Atom::new(above, vec![w.a.into(), w.y.into()]))
    );

    // Dynamic literals are only substituted.
    assert_eq!(
        w.on(w.x, w.y).instantiate_ground(&at(w.a), &init, v),
        w.on(w.a, w.y)
    );
}

#[test]
fn test_ground_quantifiers() {
    let mut w = Blocks::new();
    let table = w.vocabulary.types_mut().add_type("table");
    let t = w.vocabulary.add_variable("t", table);
    let mut init = InitialState::new(&w.vocabulary);
    init.insert(w.fixed, vec![w.a]);

    let v = &w.vocabulary;
    let none = Substitution::new();

    assert_eq!(
        Formula::exists(vec![w.x], w.fixed(w.x)).instantiate_ground(&none, &init, v),
        Formula::True
    );
    assert_eq!(
        Formula::forall(vec![w.x], w.fixed(w.x)).instantiate_ground(&none, &init, v),
        Formula::False
    );
    assert_eq!(
        Formula::forall(vec![w.x], w.clear(w.x)).instantiate_ground(&none, &init, v),
        w.clear(w.a) & w.clear(w.b) & w.clear(w.c)
    );
    assert_eq!(
        Formula::exists(vec![w.z], Formula::equality(w.z.into(), w.red.into(), v))
            .instantiate_ground(&none, &init, v),
        Formula::True
    );

    // Nothing is a table.
    assert_eq!(
        Formula::exists(vec![t], w.clear(t)).instantiate_ground(&none, &init, v),
        Formula::False
    );
    assert_eq!(
        Formula::forall(vec![t], w.clear(t)).instantiate_ground(&none, &init, v),
        Formula::True
    );

    let nested = Formula::forall(vec![w.x, w.y], w.on(w.x, w.y) | w.fixed(w.x));
    let ground = nested.instantiate_ground(&none, &init, v);
    assert!(ground.is_ground());
    assert_eq!(ground.kind(), FormulaKind::Conjunction);
    if let Formula::Conjunction(connective) = &ground {
        // The three instances with x = a are true.
        assert_eq!(connective.operands().len(), 6);
    }
}
