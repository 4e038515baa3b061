//! Terms are the arguments of atoms and binding literals: constant
//! names, variables, and step-scoped variables.  All three are `Copy`
//! handles; their names and types live in a `TermTable` that outlives
//! every formula referring to them, so formulas can be compared and
//! hashed without touching strings.
//!
//! A lifted action schema mentions plain variables.  Binding that
//! schema to a plan step specialises each variable to a
//! `StepVariable`, which pairs the original variable with the step
//! identifier.  The pairing is a value, not an allocation: two
//! instantiations of the same variable at the same step are the same
//! term.
mod substitution;
mod symbol;
mod table;

pub use substitution::Substitution;
pub use symbol::Name;
pub use symbol::StepId;
pub use symbol::StepVariable;
pub use symbol::Term;
pub use symbol::Variable;
pub use table::TermDisplay;
pub use table::TermTable;
