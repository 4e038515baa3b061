//! The `TermTable` is the arena behind `Name` and `Variable` handles.
use super::Name;
use super::Term;
use super::Variable;
use indexmap::IndexMap;
use std::convert::TryFrom;
use std::fmt;
use type_lattice::Type;
use type_lattice::TypeLattice;

#[derive(Clone, Debug)]
struct Symbol {
    name: String,
    ty: Type,
}

/// Owns the names and types of every constant and variable of a
/// domain and its problems.  Entries are never removed.
#[derive(Clone, Debug, Default)]
pub struct TermTable {
    by_name: IndexMap<String, Name>,
    names: Vec<Symbol>,
    variables: Vec<Symbol>,
}

impl TermTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns the constant `name` with type `ty`.
    ///
    /// Declaring an existing name again does not create a new name; it
    /// refines the existing name's type instead (see `add_type`).
    pub fn add_name(&mut self, name: &str, ty: Type, lattice: &mut TypeLattice) -> Name {
        if let Some(existing) = self.find_name(name) {
            self.add_type(existing, ty, lattice);
            return existing;
        }

        let ret = Name::from_index(u32::try_from(self.names.len()).expect("Too many names"));
        self.names.push(Symbol {
            name: name.to_string(),
            ty,
        });
        self.by_name.insert(name.to_string(), ret);
        ret
    }

    /// Records that `name` is also of type `ty`.  When the two types
    /// are compatible, the name keeps the more specific one; otherwise
    /// its type becomes their union.
    pub fn add_type(&mut self, name: Name, ty: Type, lattice: &mut TypeLattice) {
        let current = self.names[name.index()].ty;
        let updated = match lattice.most_specific(current, ty) {
            Some(specific) => specific,
            None => lattice.union_type(vec![current, ty]).unwrap_or(current),
        };

        self.names[name.index()].ty = updated;
    }

    #[must_use]
    pub fn find_name(&self, name: &str) -> Option<Name> {
        self.by_name.get(name).copied()
    }

    /// Returns a fresh variable.  A leading `?` in `name` is dropped.
    pub fn add_variable(&mut self, name: &str, ty: Type) -> Variable {
        let ret =
            Variable::from_index(u32::try_from(self.variables.len()).expect("Too many variables"));
        self.variables.push(Symbol {
            name: name.trim_start_matches('?').to_string(),
            ty,
        });
        ret
    }

    #[must_use]
    pub fn name_type(&self, name: Name) -> Type {
        self.names[name.index()].ty
    }

    #[must_use]
    pub fn variable_type(&self, variable: Variable) -> Type {
        self.variables[variable.index()].ty
    }

    /// Returns the type of `term`.  Step-scoped variables have the
    /// type of the variable they instantiate.
    #[must_use]
    pub fn type_of(&self, term: Term) -> Type {
        match term {
            Term::Name(name) => self.name_type(name),
            Term::Variable(variable) => self.variable_type(variable),
            Term::Step(step) => self.variable_type(step.variable()),
        }
    }

    #[must_use]
    pub fn name_str(&self, name: Name) -> &str {
        &self.names[name.index()].name
    }

    #[must_use]
    pub fn variable_str(&self, variable: Variable) -> &str {
        &self.variables[variable.index()].name
    }

    /// Iterates over all names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.by_name.values().copied()
    }

    /// Returns a `Display`able view of `term`: `a`, `?x`, or `?x(3)`
    /// for `?x` at step 3.
    #[must_use]
    pub fn display(&self, term: Term) -> TermDisplay<'_> {
        TermDisplay { table: self, term }
    }
}

pub struct TermDisplay<'a> {
    table: &'a TermTable,
    term: Term,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::Name(name) => write!(f, "{}", self.table.name_str(name)),
            Term::Variable(variable) => write!(f, "?{}", self.table.variable_str(variable)),
            Term::Step(step) => write!(
                f,
                "?{}({})",
                self.table.variable_str(step.variable()),
                step.step().get()
            ),
        }
    }
}

#[test]
fn test_name_interning() {
    let mut lattice = TypeLattice::new();
    let block = lattice.add_type("block");
    let mut table = TermTable::new();

    let a = table.add_name("a", block, &mut lattice);
    let b = table.add_name("b", block, &mut lattice);
    assert_ne!(a, b);
    assert_eq!(table.add_name("a", block, &mut lattice), a);
    assert_eq!(table.find_name("b"), Some(b));
    assert_eq!(table.find_name("c"), None);
    assert_eq!(table.names().collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(table.display(Term::Name(a)).to_string(), "a");
}

#[test]
fn test_name_type_refinement() {
    let mut lattice = TypeLattice::new();
    let block = lattice.add_type("block");
    let table_type = lattice.add_type("table");
    let ball = lattice.add_type("ball");
    assert!(lattice.add_supertype(block, table_type));

    let mut table = TermTable::new();
    let a = table.add_name("a", type_lattice::Type::OBJECT, &mut lattice);

    // Compatible declarations keep the most specific type.
    table.add_type(a, table_type, &mut lattice);
    assert_eq!(table.name_type(a), table_type);
    table.add_type(a, block, &mut lattice);
    assert_eq!(table.name_type(a), block);
    table.add_type(a, table_type, &mut lattice);
    assert_eq!(table.name_type(a), block);

    // An incompatible declaration widens to a union.
    table.add_name("a", ball, &mut lattice);
    let widened = table.name_type(a);
    assert!(lattice.is_union(widened));
    assert!(lattice.subtype(block, widened));
    assert!(lattice.subtype(ball, widened));
}

#[test]
fn test_variables_are_fresh() {
    use super::StepId;

    let mut lattice = TypeLattice::new();
    let block = lattice.add_type("block");
    let mut table = TermTable::new();

    let x0 = table.add_variable("?x", block);
    let x1 = table.add_variable("x", block);
    assert_ne!(x0, x1);
    assert_eq!(table.variable_str(x0), "x");
    assert_eq!(table.type_of(Term::Variable(x1)), block);
    assert_eq!(table.type_of(Term::Step(x1.instantiate(StepId::new(2)))), block);
    assert_eq!(table.display(Term::Variable(x0)).to_string(), "?x");
    assert_eq!(
        table
            .display(Term::Step(x0.instantiate(StepId::new(3))))
            .to_string(),
        "?x(3)"
    );
}
