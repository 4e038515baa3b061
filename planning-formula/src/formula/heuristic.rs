//! Heuristic estimates of formulas, from a planning graph's estimates
//! of their literals.
use super::instantiate::Assignments;
use super::BindingLiteral;
use super::Formula;
use super::FormulaTime;
use super::Literal;
use super::Quantified;
use crate::collaborator::Bindings;
use crate::collaborator::PlanningGraph;
use crate::collaborator::Problem;
use crate::heuristic::HeuristicValue;
use crate::term::Substitution;
use crate::term::Term;
use crate::vocabulary::Vocabulary;
use std::rc::Rc;
use tracing::trace;

impl Formula {
    /// Returns the estimated cost of achieving this formula.
    ///
    /// Literals are looked up in `graph`; conjunctions combine their
    /// operands with the graph's merge, disjunctions take the cheapest
    /// operand, and quantified formulas are expanded over the objects
    /// of `graph`'s problem first.
    #[must_use]
    pub fn heuristic_value<G>(
        &self,
        graph: &G,
        bindings: Option<&dyn Bindings>,
        vocabulary: &Vocabulary,
    ) -> HeuristicValue
    where
        G: PlanningGraph + ?Sized,
    {
        self.heuristic_values(graph, bindings, vocabulary).0
    }

    /// Returns the estimated cost of achieving this formula, and that
    /// of achieving its `at start` literals only.
    #[must_use]
    pub fn heuristic_values<G>(
        &self,
        graph: &G,
        bindings: Option<&dyn Bindings>,
        vocabulary: &Vocabulary,
    ) -> (HeuristicValue, HeuristicValue)
    where
        G: PlanningGraph + ?Sized,
    {
        match self {
            Formula::True => (HeuristicValue::ZERO, HeuristicValue::ZERO),
            Formula::False => (HeuristicValue::INFINITE, HeuristicValue::INFINITE),
            Formula::Atom(atom) | Formula::Negation(atom) => {
                let positive = matches!(self, Formula::Atom(_));
                let literal = Literal::from_rc(Rc::clone(atom), positive);

                let h = graph.literal_value(&literal, bindings);
                trace!(?h, predicate = ?literal.predicate(), "literal estimate");

                let hs = if literal.atom().when() == FormulaTime::AtStart {
                    h
                } else {
                    HeuristicValue::ZERO
                };
                (h, hs)
            }
            Formula::Equality(binding) => {
                let h = binding_value(binding, bindings, |b, l, r| b.distinct(l, r));
                (h, h)
            }
            Formula::Inequality(binding) => {
                let h = binding_value(binding, bindings, |b, l, r| b.equal(l, r));
                (h, h)
            }
            Formula::Conjunction(connective) => {
                let merge = graph.merge();
                let mut h = HeuristicValue::ZERO;
                let mut hs = HeuristicValue::ZERO;

                for operand in connective.operands() {
                    let (oh, ohs) = operand.heuristic_values(graph, bindings, vocabulary);
                    h = h.merge(oh, merge);
                    hs = hs.merge(ohs, merge);
                }

                (h, hs)
            }
            Formula::Disjunction(connective) => {
                let mut h = HeuristicValue::INFINITE;
                let mut hs = HeuristicValue::INFINITE;

                for operand in connective.operands() {
                    let (oh, ohs) = operand.heuristic_values(graph, bindings, vocabulary);
                    h = h.min(oh);
                    hs = hs.min(ohs);
                }

                (h, hs)
            }
            Formula::Exists(quantified) => {
                Formula::disjunction(instances(quantified, graph.problem(), vocabulary))
                    .heuristic_values(graph, bindings, vocabulary)
            }
            Formula::Forall(quantified) => {
                Formula::conjunction(instances(quantified, graph.problem(), vocabulary))
                    .heuristic_values(graph, bindings, vocabulary)
            }
        }
    }
}

/// The cost of a binding literal: nothing, unless `bindings` already
/// rules it out.
fn binding_value<F>(
    binding: &BindingLiteral,
    bindings: Option<&dyn Bindings>,
    contradicted: F,
) -> HeuristicValue
where
    F: Fn(&dyn Bindings, Term, Term) -> bool,
{
    match bindings {
        Some(store) if contradicted(store, binding.left(), binding.right()) => {
            HeuristicValue::INFINITE
        }
        _ => HeuristicValue::ZERO,
    }
}

/// Instantiates the body of `quantified` for every assignment of
/// `problem`'s objects to its parameters.
fn instances(
    quantified: &Quantified,
    problem: &dyn Problem,
    vocabulary: &Vocabulary,
) -> Vec<Formula> {
    Assignments::new(
        quantified.parameters(),
        &Substitution::new(),
        problem,
        vocabulary,
    )
    .map(|assignment| quantified.body().substitute(&assignment, vocabulary))
    .collect()
}

#[cfg(test)]
use super::test_support::Blocks;
#[cfg(test)]
use super::Atom;
#[cfg(test)]
use crate::heuristic::CostMerge;
#[cfg(test)]
use crate::predicate::Predicate;
#[cfg(test)]
use crate::problem::InitialState;
#[cfg(test)]
use crate::term::Name;
#[cfg(test)]
use std::collections::BTreeSet;
#[cfg(test)]
use std::collections::HashMap;

/// A planning graph that knows the cost of a few literals, and
/// considers every other literal unreachable.
#[cfg(test)]
struct TableGraph<'a> {
    costs: HashMap<(Predicate, Vec<Term>, bool), f32>,
    merge: CostMerge,
    problem: InitialState<'a>,
}

#[cfg(test)]
impl<'a> TableGraph<'a> {
    fn new(problem: InitialState<'a>, merge: CostMerge) -> Self {
        Self {
            costs: HashMap::new(),
            merge,
            problem,
        }
    }

    fn set(&mut self, formula: &Formula, cost: f32) {
        let literal = formula.literal().expect("a literal");
        self.costs.insert(
            (literal.predicate(), literal.atom().terms().to_vec(), literal.is_positive()),
            cost,
        );
    }
}

#[cfg(test)]
impl PlanningGraph for TableGraph<'_> {
    fn literal_value(
        &self,
        literal: &Literal,
        _bindings: Option<&dyn Bindings>,
    ) -> HeuristicValue {
        let key = (
            literal.predicate(),
            literal.atom().terms().to_vec(),
            literal.is_positive(),
        );

        match self.costs.get(&key) {
            Some(cost) if *cost == 0.0 => HeuristicValue::ZERO,
            Some(cost) => HeuristicValue::new(*cost, 1, *cost),
            None => HeuristicValue::INFINITE,
        }
    }

    fn merge(&self) -> CostMerge {
        self.merge
    }

    fn problem(&self) -> &dyn Problem {
        &self.problem
    }
}

#[cfg(test)]
struct Distinct;

#[cfg(test)]
impl Bindings for Distinct {
    fn equal(&self, left: Term, right: Term) -> bool {
        left == right
    }

    fn distinct(&self, left: Term, right: Term) -> bool {
        left != right
    }

    fn values(&self, _term: Term) -> Option<BTreeSet<Name>> {
        None
    }
}

#[test]
fn test_literals_and_connectives() {
    let w = Blocks::new();
    let v = &w.vocabulary;
    let mut graph = TableGraph::new(InitialState::new(v), CostMerge::Additive);
    graph.set(&w.clear(w.a), 1.0);
    graph.set(&w.clear(w.b), 2.0);
    graph.set(&w.on(w.a, w.b), 0.0);

    assert_eq!(Formula::True.heuristic_value(&graph, None, v), HeuristicValue::ZERO);
    assert!(Formula::False.heuristic_value(&graph, None, v).is_infinite());
    assert_eq!(
        w.clear(w.a).heuristic_value(&graph, None, v),
        HeuristicValue::new(1.0, 1, 1.0)
    );
    assert!(w.clear(w.c).heuristic_value(&graph, None, v).is_infinite());

    let both = w.clear(w.a) & w.clear(w.b) & w.on(w.a, w.b);
    assert_eq!(
        both.heuristic_value(&graph, None, v),
        HeuristicValue::new(3.0, 2, 2.0)
    );
    assert_eq!(
        (w.clear(w.a) | w.clear(w.b) | w.clear(w.c)).heuristic_value(&graph, None, v),
        HeuristicValue::new(1.0, 1, 1.0)
    );
    assert!((w.clear(w.a) & w.clear(w.c))
        .heuristic_value(&graph, None, v)
        .is_infinite());

    graph.merge = CostMerge::Max;
    assert_eq!(
        both.heuristic_value(&graph, None, v),
        HeuristicValue::new(2.0, 1, 2.0)
    );
}

#[test]
fn test_at_start_estimate() {
    let w = Blocks::new();
    let v = &w.vocabulary;
    let mut graph = TableGraph::new(InitialState::new(v), CostMerge::Additive);
    graph.set(&w.clear(w.a), 1.0);
    graph.set(&w.clear(w.b), 2.0);

    let start = Formula::atom(Atom::timed(
        w.clear,
        vec![w.a.into()],
        FormulaTime::AtStart,
    ));
    let end = Formula::atom(Atom::timed(w.clear, vec![w.b.into()], FormulaTime::AtEnd));

    let (h, hs) = (start & end).heuristic_values(&graph, None, v);
    assert_eq!(h, HeuristicValue::new(3.0, 2, 2.0));
    assert_eq!(hs, HeuristicValue::new(1.0, 1, 1.0));
}

#[test]
fn test_binding_literals() {
    let w = Blocks::new();
    let v = &w.vocabulary;
    let graph = TableGraph::new(InitialState::new(v), CostMerge::Additive);
    let equality = Formula::equality(w.x.into(), w.a.into(), v);
    let inequality = Formula::inequality(w.x.into(), w.a.into(), v);

    assert!(equality.heuristic_value(&graph, None, v).is_zero());
    assert!(equality
        .heuristic_value(&graph, Some(&Distinct), v)
        .is_infinite());
    assert!(inequality
        .heuristic_value(&graph, Some(&Distinct), v)
        .is_zero());
}

#[test]
fn test_quantifiers_expand_over_objects() {
    let w = Blocks::new();
    let v = &w.vocabulary;
    let mut graph = TableGraph::new(InitialState::new(v), CostMerge::Additive);
    graph.set(&w.clear(w.a), 1.0);
    graph.set(&w.clear(w.b), 2.0);
    graph.set(&w.clear(w.c), 4.0);

    assert_eq!(
        Formula::exists(vec![w.x], w.clear(w.x)).heuristic_value(&graph, None, v),
        HeuristicValue::new(1.0, 1, 1.0)
    );
    assert_eq!(
        Formula::forall(vec![w.x], w.clear(w.x)).heuristic_value(&graph, None, v),
        HeuristicValue::new(7.0, 3, 4.0)
    );
}
