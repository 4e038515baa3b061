//! The formula core consumes a handful of services it does not
//! implement: a variable binding store maintained by plan search, the
//! domain and problem registries, and a planning graph heuristic.
//! These traits are the whole contract.
use crate::formula::Literal;
use crate::heuristic::CostMerge;
use crate::heuristic::HeuristicValue;
use crate::predicate::Predicate;
use crate::term::Name;
use crate::term::Term;
use std::collections::BTreeSet;
use type_lattice::Type;

/// Codesignation and non-codesignation constraints on terms.
pub trait Bindings {
    /// Returns true iff `left` and `right` are forced to denote the
    /// same object.
    fn equal(&self, left: Term, right: Term) -> bool;

    /// Returns true iff `left` and `right` are forced to denote
    /// different objects.
    fn distinct(&self, left: Term, right: Term) -> bool;

    /// Returns the names `term` may still denote, or `None` when
    /// nothing is known.
    fn values(&self, term: Term) -> Option<BTreeSet<Name>>;

    /// Returns the name `term` is bound to, or `term` itself when it
    /// may still denote more than one object.
    fn binding(&self, term: Term) -> Term {
        if term.is_name() {
            return term;
        }

        match self.values(term) {
            Some(values) if values.len() == 1 => values
                .into_iter()
                .next()
                .map_or(term, Term::Name),
            _ => term,
        }
    }
}

/// What grounding needs to know about a domain.
pub trait Domain {
    /// Returns true iff no action effect mentions `predicate`.
    fn is_static(&self, predicate: Predicate) -> bool;
}

/// What grounding needs to know about a problem.
pub trait Problem: Domain {
    /// Returns true iff some initial fact for `predicate` matches
    /// `pattern`, where `None` matches any object.
    fn matches_initially(&self, predicate: Predicate, pattern: &[Option<Name>]) -> bool;

    /// Returns every object whose type is a subtype of `ty`.
    fn compatible_objects(&self, ty: Type) -> Vec<Name>;
}

/// A relaxed planning graph, queried for literal costs.
pub trait PlanningGraph {
    /// Returns the estimate for `literal` at the graph's fixpoint.
    fn literal_value(&self, literal: &Literal, bindings: Option<&dyn Bindings>) -> HeuristicValue;

    /// How conjunct estimates combine.
    fn merge(&self) -> CostMerge {
        CostMerge::Additive
    }

    /// The problem the graph was built for, whose objects quantified
    /// formulas expand over.
    fn problem(&self) -> &dyn Problem;
}
