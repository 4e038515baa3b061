use crate::requirement::Requirement;
use thiserror::Error;
use type_lattice::LatticeError;

/// How bad a reported problem is.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    /// Processing continues unchanged.
    Warning,
    /// The offending construct is replaced by a safe default, and
    /// processing continues so further problems surface.
    Error,
    /// No safe default exists: stop processing the current input.
    Fatal,
}

/// Problems found while building types, terms and formulas.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FormulaError {
    #[error("type `{name}` used before declaration")]
    ImplicitType { name: String },

    #[error("constant `{name}` used before declaration")]
    ImplicitConstant { name: String },

    #[error("predicate `{name}` used before declaration")]
    ImplicitPredicate { name: String },

    #[error("assuming `{requirement}` requirement")]
    AssumedRequirement { requirement: Requirement },

    #[error("argument {position} of `{predicate}` has type `{actual}`, expected `{expected}`")]
    ArgumentType {
        predicate: String,
        position: usize,
        actual: String,
        expected: String,
    },

    #[error("`{predicate}` takes {expected} arguments, got {actual}")]
    Arity {
        predicate: String,
        expected: usize,
        actual: usize,
    },

    #[error("`{left}` of type `{left_type}` can never equal `{right}` of type `{right_type}`")]
    IncompatibleEquality {
        left: String,
        left_type: String,
        right: String,
        right_type: String,
    },

    #[error("`{supertype}` is already a subtype of `{subtype}`")]
    CyclicTypeHierarchy { subtype: String, supertype: String },

    #[error("free variable `?{name}`")]
    FreeVariable { name: String },

    #[error("repeated parameter `?{name}`")]
    RepeatedParameter { name: String },

    #[error("parameter `?{name}` shadows an enclosing variable")]
    ShadowingParameter { name: String },

    #[error("{0}")]
    Lattice(#[from] LatticeError),

    #[error("`{feature}` is not supported")]
    Unsupported { feature: String },
}

impl FormulaError {
    #[must_use]
    pub fn severity(&self) -> Severity {
        use FormulaError::*;

        match self {
            ImplicitType { .. }
            | ImplicitConstant { .. }
            | ImplicitPredicate { .. }
            | AssumedRequirement { .. } => Severity::Warning,
            ArgumentType { .. }
            | Arity { .. }
            | IncompatibleEquality { .. }
            | CyclicTypeHierarchy { .. }
            | FreeVariable { .. }
            | RepeatedParameter { .. }
            | ShadowingParameter { .. }
            | Lattice(_) => Severity::Error,
            Unsupported { .. } => Severity::Fatal,
        }
    }
}

#[test]
fn test_severity() {
    assert_eq!(
        FormulaError::ImplicitType {
            name: "block".into()
        }
        .severity(),
        Severity::Warning
    );
    assert_eq!(
        FormulaError::Lattice(LatticeError::EmptyUnion).severity(),
        Severity::Error
    );
    assert_eq!(
        FormulaError::Unsupported {
            feature: ":fluents".into()
        }
        .severity(),
        Severity::Fatal
    );
    assert!(Severity::Warning < Severity::Error);
}

#[test]
fn test_messages() {
    let error = FormulaError::Arity {
        predicate: "on".into(),
        expected: 2,
        actual: 3,
    };
    assert_eq!(error.to_string(), "`on` takes 2 arguments, got 3");

    let error = FormulaError::AssumedRequirement {
        requirement: Requirement::Equality,
    };
    assert_eq!(error.to_string(), "assuming `:equality` requirement");
}
