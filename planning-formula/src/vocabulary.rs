//! A `Vocabulary` bundles the three symbol arenas of a planning
//! domain (types, terms, predicates) so formula operations can take a
//! single context argument instead of reaching for global tables.
use crate::collaborator::Domain;
use crate::predicate::Predicate;
use crate::predicate::PredicateTable;
use crate::term::Name;
use crate::term::Term;
use crate::term::TermTable;
use crate::term::Variable;
use type_lattice::Type;
use type_lattice::TypeLattice;

#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    types: TypeLattice,
    terms: TermTable,
    predicates: PredicateTable,
}

impl Vocabulary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn types(&self) -> &TypeLattice {
        &self.types
    }

    #[cfg(not(tarpaulin_include))]
    pub fn types_mut(&mut self) -> &mut TypeLattice {
        &mut self.types
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn terms(&self) -> &TermTable {
        &self.terms
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn predicates(&self) -> &PredicateTable {
        &self.predicates
    }

    #[cfg(not(tarpaulin_include))]
    pub fn predicates_mut(&mut self) -> &mut PredicateTable {
        &mut self.predicates
    }

    /// Interns the constant `name` of type `ty`, refining its type if
    /// it already exists.
    pub fn add_name(&mut self, name: &str, ty: Type) -> Name {
        self.terms.add_name(name, ty, &mut self.types)
    }

    pub fn add_variable(&mut self, name: &str, ty: Type) -> Variable {
        self.terms.add_variable(name, ty)
    }

    pub fn add_predicate(&mut self, name: &str, parameters: Vec<Type>) -> Predicate {
        self.predicates.add_predicate(name, parameters)
    }

    #[must_use]
    pub fn type_of(&self, term: Term) -> Type {
        self.terms.type_of(term)
    }

    /// Returns true iff `left` and `right` could denote the same
    /// object, as far as their types are concerned.
    #[must_use]
    pub fn compatible_terms(&self, left: Term, right: Term) -> bool {
        self.types
            .compatible(self.type_of(left), self.type_of(right))
    }
}

impl Domain for Vocabulary {
    fn is_static(&self, predicate: Predicate) -> bool {
        self.predicates.is_static(predicate)
    }
}

#[test]
fn test_compatible_terms() {
    let mut vocabulary = Vocabulary::new();
    let block = vocabulary.types_mut().add_type("block");
    let table = vocabulary.types_mut().add_type("table");
    let ball = vocabulary.types_mut().add_type("ball");
    assert!(vocabulary.types_mut().add_supertype(block, table));

    let a = Term::Name(vocabulary.add_name("a", block));
    let x = Term::Variable(vocabulary.add_variable("x", table));
    let y = Term::Variable(vocabulary.add_variable("y", ball));

    assert!(vocabulary.compatible_terms(a, x));
    assert!(vocabulary.compatible_terms(x, a));
    assert!(!vocabulary.compatible_terms(a, y));
    assert_eq!(vocabulary.type_of(a), block);
}
