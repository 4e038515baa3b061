//! The semantic core of a PDDL front end: typed terms, predicates and
//! formulas over a `type_lattice::TypeLattice`, and the machinery that
//! makes lifted formulas concrete.
//!
//! All symbols of a domain and its problems live in a `Vocabulary`;
//! terms and predicates are `Copy` handles into it, and formulas are
//! immutable values in negation normal form.  Plan search, the binding
//! store and the planning graph heuristic are outside this crate: they
//! meet it through the traits in `collaborator`.
mod collaborator;
mod context;
mod diagnostics;
mod error;
mod formula;
mod heuristic;
mod predicate;
mod problem;
mod requirement;
mod term;
mod vocabulary;

pub use collaborator::Bindings;
pub use collaborator::Domain;
pub use collaborator::PlanningGraph;
pub use collaborator::Problem;
pub use context::ParseContext;
pub use diagnostics::Diagnostic;
pub use diagnostics::Diagnostics;
pub use diagnostics::WarningLevel;
pub use error::FormulaError;
pub use error::Severity;
pub use formula::Atom;
pub use formula::BindingLiteral;
pub use formula::Connective;
pub use formula::Formula;
pub use formula::FormulaDisplay;
pub use formula::FormulaKind;
pub use formula::FormulaTime;
pub use formula::Literal;
pub use formula::Quantified;
pub use heuristic::CostMerge;
pub use heuristic::HeuristicValue;
pub use predicate::Predicate;
pub use predicate::PredicateTable;
pub use problem::InitialState;
pub use requirement::Requirement;
pub use term::Name;
pub use term::StepId;
pub use term::StepVariable;
pub use term::Substitution;
pub use term::Term;
pub use term::TermDisplay;
pub use term::TermTable;
pub use term::Variable;
pub use vocabulary::Vocabulary;

pub use type_lattice::LatticeError;
pub use type_lattice::Type;
pub use type_lattice::TypeLattice;
