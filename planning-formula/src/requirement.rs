//! PDDL requirement flags.  Formulas only care about the flags that
//! license their connectives; the parsing context uses them to warn
//! when a domain relies on a feature it never declared.
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Requirement {
    Strips,
    Typing,
    NegativePreconditions,
    DisjunctivePreconditions,
    Equality,
    ExistentialPreconditions,
    UniversalPreconditions,
    QuantifiedPreconditions,
    ConditionalEffects,
    Adl,
    DurativeActions,
    NumericFluents,
    ContinuousEffects,
}

impl Requirement {
    const ALL: [Requirement; 13] = [
        Requirement::Strips,
        Requirement::Typing,
        Requirement::NegativePreconditions,
        Requirement::DisjunctivePreconditions,
        Requirement::Equality,
        Requirement::ExistentialPreconditions,
        Requirement::UniversalPreconditions,
        Requirement::QuantifiedPreconditions,
        Requirement::ConditionalEffects,
        Requirement::Adl,
        Requirement::DurativeActions,
        Requirement::NumericFluents,
        Requirement::ContinuousEffects,
    ];

    /// Returns the PDDL keyword, with its leading colon.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Requirement::Strips => ":strips",
            Requirement::Typing => ":typing",
            Requirement::NegativePreconditions => ":negative-preconditions",
            Requirement::DisjunctivePreconditions => ":disjunctive-preconditions",
            Requirement::Equality => ":equality",
            Requirement::ExistentialPreconditions => ":existential-preconditions",
            Requirement::UniversalPreconditions => ":universal-preconditions",
            Requirement::QuantifiedPreconditions => ":quantified-preconditions",
            Requirement::ConditionalEffects => ":conditional-effects",
            Requirement::Adl => ":adl",
            Requirement::DurativeActions => ":durative-actions",
            Requirement::NumericFluents => ":fluents",
            Requirement::ContinuousEffects => ":continuous-effects",
        }
    }

    /// Parses a keyword, with or without its leading colon.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Requirement> {
        let wanted = keyword.trim_start_matches(':');
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.keyword().trim_start_matches(':') == wanted)
    }

    /// Returns this requirement and every requirement it implies.
    #[must_use]
    pub fn implied(self) -> Vec<Requirement> {
        use Requirement::*;

        match self {
            QuantifiedPreconditions => vec![
                QuantifiedPreconditions,
                ExistentialPreconditions,
                UniversalPreconditions,
            ],
            Adl => vec![
                Adl,
                Strips,
                Typing,
                NegativePreconditions,
                DisjunctivePreconditions,
                Equality,
                QuantifiedPreconditions,
                ExistentialPreconditions,
                UniversalPreconditions,
                ConditionalEffects,
            ],
            other => vec![other],
        }
    }

    /// Returns false for features we recognise but cannot represent.
    #[must_use]
    pub fn is_supported(self) -> bool {
        !matches!(
            self,
            Requirement::NumericFluents | Requirement::ContinuousEffects
        )
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[test]
fn test_keywords() {
    for requirement in Requirement::ALL.iter() {
        assert_eq!(
            Requirement::from_keyword(requirement.keyword()),
            Some(*requirement)
        );
    }

    assert_eq!(
        Requirement::from_keyword("typing"),
        Some(Requirement::Typing)
    );
    assert_eq!(Requirement::from_keyword(":timed-initial-literals"), None);
}

#[test]
fn test_implied() {
    let adl = Requirement::Adl.implied();
    assert!(adl.contains(&Requirement::UniversalPreconditions));
    assert!(adl.contains(&Requirement::Equality));
    assert_eq!(Requirement::Typing.implied(), vec![Requirement::Typing]);
    assert!(!Requirement::NumericFluents.is_supported());
    assert!(Requirement::Adl.is_supported());
}
