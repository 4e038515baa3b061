//! A reference `Problem`: the initial state of a planning problem, as
//! a set of ground atoms over a `Vocabulary`.
use crate::collaborator::Domain;
use crate::collaborator::Problem;
use crate::predicate::Predicate;
use crate::term::Name;
use crate::vocabulary::Vocabulary;
use std::collections::HashMap;
use std::collections::HashSet;
use type_lattice::Type;

pub struct InitialState<'a> {
    vocabulary: &'a Vocabulary,
    facts: HashMap<Predicate, HashSet<Vec<Name>>>,
}

impl<'a> InitialState<'a> {
    #[must_use]
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self {
            vocabulary,
            facts: HashMap::new(),
        }
    }

    /// Adds the fact `predicate(arguments...)`.  Returns false, and
    /// stores nothing, if it was already known or does not have one
    /// argument per parameter of `predicate`.
    pub fn insert(&mut self, predicate: Predicate, arguments: Vec<Name>) -> bool {
        if arguments.len() != self.vocabulary.predicates().arity(predicate) {
            return false;
        }

        self.facts.entry(predicate).or_default().insert(arguments)
    }

    #[must_use]
    pub fn holds(&self, predicate: Predicate, arguments: &[Name]) -> bool {
        self.facts
            .get(&predicate)
            .map_or(false, |facts| facts.contains(arguments))
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn vocabulary(&self) -> &'a Vocabulary {
        self.vocabulary
    }
}

impl Domain for InitialState<'_> {
    fn is_static(&self, predicate: Predicate) -> bool {
        self.vocabulary.predicates().is_static(predicate)
    }
}

impl Problem for InitialState<'_> {
    fn matches_initially(&self, predicate: Predicate, pattern: &[Option<Name>]) -> bool {
        let facts = match self.facts.get(&predicate) {
            Some(facts) => facts,
            None => return false,
        };

        if pattern.iter().all(Option::is_some) {
            let arguments: Vec<Name> = pattern.iter().flatten().copied().collect();
            return facts.contains(&arguments);
        }

        facts.iter().any(|fact| {
            fact.len() == pattern.len()
                && fact
                    .iter()
                    .zip(pattern)
                    .all(|(actual, wanted)| wanted.map_or(true, |name| name == *actual))
        })
    }

    fn compatible_objects(&self, ty: Type) -> Vec<Name> {
        let terms = self.vocabulary.terms();
        let types = self.vocabulary.types();

        terms
            .names()
            .filter(|name| types.subtype(terms.name_type(*name), ty))
            .collect()
    }
}

#[test]
fn test_matches_initially() {
    let mut vocabulary = Vocabulary::new();
    let block = vocabulary.types_mut().add_type("block");
    let on = vocabulary.add_predicate("on", vec![block, block]);
    let a = vocabulary.add_name("a", block);
    let b = vocabulary.add_name("b", block);
    let c = vocabulary.add_name("c", block);

    let mut init = InitialState::new(&vocabulary);
    assert!(init.insert(on, vec![a, b]));
    assert!(!init.insert(on, vec![a, b]));

    assert!(init.holds(on, &[a, b]));
    assert!(!init.holds(on, &[b, a]));
    assert!(init.matches_initially(on, &[Some(a), Some(b)]));
    assert!(!init.matches_initially(on, &[Some(b), Some(a)]));
    assert!(init.matches_initially(on, &[Some(a), None]));
    assert!(init.matches_initially(on, &[None, None]));
    assert!(!init.matches_initially(on, &[Some(c), None]));
}

#[test]
fn test_compatible_objects() {
    let mut vocabulary = Vocabulary::new();
    let block = vocabulary.types_mut().add_type("block");
    let table = vocabulary.types_mut().add_type("table");
    let ball = vocabulary.types_mut().add_type("ball");
    assert!(vocabulary.types_mut().add_supertype(block, table));

    let a = vocabulary.add_name("a", block);
    let t = vocabulary.add_name("t", table);
    let z = vocabulary.add_name("z", ball);

    let init = InitialState::new(&vocabulary);
    assert_eq!(init.compatible_objects(block), vec![a]);
    assert_eq!(init.compatible_objects(table), vec![a, t]);
    assert_eq!(init.compatible_objects(Type::OBJECT), vec![a, t, z]);
}

#[test]
fn test_insert_checks_arity() {
    let mut vocabulary = Vocabulary::new();
    let block = vocabulary.types_mut().add_type("block");
    let on = vocabulary.add_predicate("on", vec![block, block]);
    let a = vocabulary.add_name("a", block);
    let b = vocabulary.add_name("b", block);

    let mut init = InitialState::new(&vocabulary);
    assert!(!init.insert(on, vec![a]));
    assert!(!init.insert(on, vec![a, b, a]));
    assert!(!init.holds(on, &[a]));
    assert!(!init.matches_initially(on, &[None, None]));

    assert!(init.insert(on, vec![a, b]));
    assert!(init.matches_initially(on, &[None, None]));
}
