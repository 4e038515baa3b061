use thiserror::Error;

/// Errors reported by `TypeLattice` operations that cannot fall back
/// to a boolean answer.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LatticeError {
    /// A union type must have at least one component.
    #[error("union of zero types")]
    EmptyUnion,
}
