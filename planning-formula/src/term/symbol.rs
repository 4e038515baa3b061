use super::Substitution;

/// A constant (object) symbol.  Names are interned by the `TermTable`,
/// so two names are equal iff they denote the same object.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name(u32);

impl Name {
    #[inline]
    pub(crate) fn from_index(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A variable of a predicate signature, action parameter list, or
/// quantifier.  Every declaration yields a fresh variable, even when
/// the name is reused.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Variable(u32);

impl Variable {
    #[inline]
    pub(crate) fn from_index(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Specialises this variable to the plan step `step`.
    #[inline]
    #[must_use]
    pub fn instantiate(self, step: StepId) -> StepVariable {
        StepVariable {
            variable: self,
            step,
        }
    }
}

/// Identifies a step in a partial plan.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StepId(u32);

impl StepId {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

/// A variable bound to a specific plan step.  Only
/// `Variable::instantiate` builds these.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StepVariable {
    variable: Variable,
    step: StepId,
}

impl StepVariable {
    #[inline]
    #[must_use]
    pub fn variable(self) -> Variable {
        self.variable
    }

    #[inline]
    #[must_use]
    pub fn step(self) -> StepId {
        self.step
    }
}

/// A term is a name, or one of the two flavours of variable.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Term {
    Name(Name),
    Variable(Variable),
    Step(StepVariable),
}

impl Term {
    #[inline]
    #[must_use]
    pub fn is_name(self) -> bool {
        matches!(self, Term::Name(_))
    }

    /// Returns true for plain and step-scoped variables alike.
    #[inline]
    #[must_use]
    pub fn is_variable(self) -> bool {
        !self.is_name()
    }

    #[inline]
    #[must_use]
    pub fn as_name(self) -> Option<Name> {
        match self {
            Term::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the variable this term mentions, looking through step
    /// instantiation.
    #[must_use]
    pub fn base_variable(self) -> Option<Variable> {
        match self {
            Term::Name(_) => None,
            Term::Variable(variable) => Some(variable),
            Term::Step(step) => Some(step.variable()),
        }
    }

    /// Replaces this term if `substitution` maps it.  Names are never
    /// substituted.
    #[must_use]
    pub fn substitute(self, substitution: &Substitution) -> Term {
        if self.is_name() {
            return self;
        }

        substitution.get(self).unwrap_or(self)
    }

    /// Specialises a plain variable to `step`; other terms are
    /// unchanged.
    #[must_use]
    pub fn instantiate(self, step: StepId) -> Term {
        match self {
            Term::Variable(variable) => Term::Step(variable.instantiate(step)),
            other => other,
        }
    }

    /// Coarse equivalence for duplicate detection: the same name, or
    /// any two variables, whichever variables they are.
    #[must_use]
    pub fn equivalent(self, other: Term) -> bool {
        match (self, other) {
            (Term::Name(a), Term::Name(b)) => a == b,
            (a, b) => a.is_variable() && b.is_variable(),
        }
    }
}

impl From<Name> for Term {
    fn from(name: Name) -> Self {
        Term::Name(name)
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::Variable(variable)
    }
}

impl From<StepVariable> for Term {
    fn from(step: StepVariable) -> Self {
        Term::Step(step)
    }
}

#[test]
fn test_step_instantiation_canonical() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hash;
    use std::hash::Hasher;

    let x = Variable::from_index(3);
    let first = Term::Variable(x).instantiate(StepId::new(7));
    let second = Term::Variable(x).instantiate(StepId::new(7));

    assert_eq!(first, second);
    assert_ne!(first, Term::Variable(x).instantiate(StepId::new(8)));
    assert_eq!(first.base_variable(), Some(x));

    let mut h0 = DefaultHasher::new();
    let mut h1 = DefaultHasher::new();
    first.hash(&mut h0);
    second.hash(&mut h1);
    assert_eq!(h0.finish(), h1.finish());

    // Instantiating again is a no-op.
    assert_eq!(first.instantiate(StepId::new(9)), first);
}

#[test]
fn test_names_not_instantiated() {
    let a = Term::Name(Name::from_index(0));

    assert_eq!(a.instantiate(StepId::new(1)), a);
    assert_eq!(a.base_variable(), None);
    assert_eq!(a.as_name(), Some(Name::from_index(0)));
}

#[test]
fn test_equivalent_is_coarse() {
    let a = Term::Name(Name::from_index(0));
    let b = Term::Name(Name::from_index(1));
    let x = Term::Variable(Variable::from_index(0));
    let y = Term::Variable(Variable::from_index(1));
    let y1 = y.instantiate(StepId::new(1));

    assert!(a.equivalent(a));
    assert!(!a.equivalent(b));
    assert!(!a.equivalent(x));
    assert!(!x.equivalent(a));
    // Any two variables are equivalent.
    assert!(x.equivalent(y));
    assert!(x.equivalent(y1));
}

#[test]
fn test_substitute() {
    let a = Term::Name(Name::from_index(0));
    let b = Term::Name(Name::from_index(1));
    let x = Term::Variable(Variable::from_index(0));
    let y = Term::Variable(Variable::from_index(1));

    let mut substitution = Substitution::new();
    substitution.insert(x, a);

    assert_eq!(x.substitute(&substitution), a);
    assert_eq!(y.substitute(&substitution), y);
    assert_eq!(b.substitute(&substitution), b);
}
