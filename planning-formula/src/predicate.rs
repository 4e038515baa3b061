//! Predicate symbols, their signatures, and whether any action can
//! change their extension.
use crate::collaborator::Domain;
use indexmap::IndexMap;
use std::convert::TryFrom;
use type_lattice::Type;

/// A handle to a predicate declared in a `PredicateTable`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Predicate(u32);

impl Predicate {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Signature {
    name: String,
    parameters: Vec<Type>,
    dynamic: bool,
}

/// The `PredicateTable` maps predicate names to their parameter types.
///
/// A predicate is static until `make_dynamic` is called for it, which
/// should happen once for every predicate that appears in an action
/// effect.
#[derive(Clone, Debug, Default)]
pub struct PredicateTable {
    by_name: IndexMap<String, Predicate>,
    signatures: Vec<Signature>,
}

impl PredicateTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` with the given parameter types.  The first
    /// declaration is canonical: declaring the same name again returns
    /// the existing predicate, and leaves its signature alone.
    pub fn add_predicate(&mut self, name: &str, parameters: Vec<Type>) -> Predicate {
        if let Some(existing) = self.find_predicate(name) {
            return existing;
        }

        let ret = Predicate(u32::try_from(self.signatures.len()).expect("Too many predicates"));
        self.signatures.push(Signature {
            name: name.to_string(),
            parameters,
            dynamic: false,
        });
        self.by_name.insert(name.to_string(), ret);
        ret
    }

    #[must_use]
    pub fn find_predicate(&self, name: &str) -> Option<Predicate> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, predicate: Predicate) -> &str {
        &self.signatures[predicate.index()].name
    }

    #[must_use]
    pub fn parameters(&self, predicate: Predicate) -> &[Type] {
        &self.signatures[predicate.index()].parameters
    }

    #[must_use]
    pub fn arity(&self, predicate: Predicate) -> usize {
        self.parameters(predicate).len()
    }

    /// Marks `predicate` as modified by some action effect.
    pub fn make_dynamic(&mut self, predicate: Predicate) {
        self.signatures[predicate.index()].dynamic = true;
    }

    /// Returns true iff no action effect mentions `predicate`.
    #[must_use]
    pub fn is_static(&self, predicate: Predicate) -> bool {
        !self.signatures[predicate.index()].dynamic
    }

    /// Iterates over all predicates, in declaration order.
    pub fn predicates(&self) -> impl Iterator<Item = Predicate> + '_ {
        self.by_name.values().copied()
    }
}

impl Domain for PredicateTable {
    fn is_static(&self, predicate: Predicate) -> bool {
        PredicateTable::is_static(self, predicate)
    }
}

#[test]
fn test_canonical_declaration() {
    let mut table = PredicateTable::new();

    let on = table.add_predicate("on", vec![Type::OBJECT, Type::OBJECT]);
    let clear = table.add_predicate("clear", vec![Type::OBJECT]);
    assert_ne!(on, clear);

    // Redeclaring keeps the first signature.
    assert_eq!(table.add_predicate("on", vec![Type::OBJECT]), on);
    assert_eq!(table.arity(on), 2);
    assert_eq!(table.name(clear), "clear");
    assert_eq!(table.find_predicate("on"), Some(on));
    assert_eq!(table.find_predicate("holding"), None);
    assert_eq!(table.predicates().collect::<Vec<_>>(), vec![on, clear]);
}

#[test]
fn test_static_until_effect() {
    let mut table = PredicateTable::new();
    let on = table.add_predicate("on", vec![Type::OBJECT, Type::OBJECT]);
    let smaller = table.add_predicate("smaller", vec![Type::OBJECT, Type::OBJECT]);

    assert!(table.is_static(on));
    table.make_dynamic(on);
    assert!(!table.is_static(on));
    assert!(Domain::is_static(&table, smaller));
}
