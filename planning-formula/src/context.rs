//! The state a front end threads through domain and problem
//! declarations: the vocabulary being built, the diagnostics for the
//! current declaration unit, the variables in scope, and the declared
//! requirements.
//!
//! Every checked constructor returns `Result`, but only fatal problems
//! come back as `Err`.  Everything else is recorded in the diagnostics
//! and replaced with a safe default, so parsing can go on and surface
//! more problems.
use crate::diagnostics::Diagnostics;
use crate::diagnostics::WarningLevel;
use crate::error::FormulaError;
use crate::formula::Atom;
use crate::formula::Formula;
use crate::formula::FormulaTime;
use crate::predicate::Predicate;
use crate::requirement::Requirement;
use crate::term::Name;
use crate::term::Term;
use crate::term::Variable;
use crate::vocabulary::Vocabulary;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::debug;
use type_lattice::Type;

#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    vocabulary: Vocabulary,
    diagnostics: Diagnostics,
    // Innermost scope last.
    scopes: Vec<IndexMap<String, Variable>>,
    requirements: BTreeSet<Requirement>,
}

impl ParseContext {
    #[must_use]
    pub fn new(level: WarningLevel) -> Self {
        Self {
            diagnostics: Diagnostics::new(level),
            ..Self::default()
        }
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Ends parsing, and returns the vocabulary with the diagnostics
    /// of the last declaration unit.
    #[must_use]
    pub fn into_parts(self) -> (Vocabulary, Diagnostics) {
        (self.vocabulary, self.diagnostics)
    }

    /// Starts a new declaration unit, and returns the diagnostics of
    /// the previous one.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        let level = self.diagnostics.level();
        std::mem::replace(&mut self.diagnostics, Diagnostics::new(level))
    }

    /// Declares `requirement` and everything it implies.
    ///
    /// # Errors
    ///
    /// Returns `Err` for requirements we can't support.
    pub fn require(&mut self, requirement: Requirement) -> Result<(), FormulaError> {
        if !requirement.is_supported() {
            return self.diagnostics.report(FormulaError::Unsupported {
                feature: requirement.keyword().to_string(),
            });
        }

        self.requirements.extend(requirement.implied());
        Ok(())
    }

    #[must_use]
    pub fn requires(&self, requirement: Requirement) -> bool {
        self.requirements.contains(&requirement)
    }

    /// Warns, once, about relying on an undeclared requirement.
    fn assume(&mut self, requirement: Requirement) -> Result<(), FormulaError> {
        if self.requires(requirement) {
            return Ok(());
        }

        self.requirements.extend(requirement.implied());
        self.diagnostics
            .report(FormulaError::AssumedRequirement { requirement })
    }

    /// Declares the simple type `name`.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn declare_type(&mut self, name: &str) -> Result<Type, FormulaError> {
        self.assume(Requirement::Typing)?;
        Ok(self.vocabulary.types_mut().add_type(name))
    }

    /// Declares that `supertype` is a supertype of `subtype`.  Returns
    /// false, and reports an error, when that would make the hierarchy
    /// cyclic.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn declare_supertype(
        &mut self,
        subtype: Type,
        supertype: Type,
    ) -> Result<bool, FormulaError> {
        if self.vocabulary.types_mut().add_supertype(subtype, supertype) {
            return Ok(true);
        }

        let types = self.vocabulary.types();
        let error = FormulaError::CyclicTypeHierarchy {
            subtype: types.display(subtype).to_string(),
            supertype: types.display(supertype).to_string(),
        };
        self.diagnostics.report(error)?;
        Ok(false)
    }

    /// Returns the union of `types`; an empty union is an error, and
    /// defaults to `object`.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn either(&mut self, types: Vec<Type>) -> Result<Type, FormulaError> {
        match self.vocabulary.types_mut().union_type(types) {
            Ok(ty) => Ok(ty),
            Err(error) => {
                self.diagnostics.report(error.into())?;
                Ok(Type::OBJECT)
            }
        }
    }

    pub fn declare_constant(&mut self, name: &str, ty: Type) -> Name {
        self.vocabulary.add_name(name, ty)
    }

    /// Declares `name` with the given parameter types.  The first
    /// declaration of a name wins.
    pub fn declare_predicate(&mut self, name: &str, parameters: Vec<Type>) -> Predicate {
        self.vocabulary.add_predicate(name, parameters)
    }

    /// Records that an action effect mentions `predicate`.
    pub fn declare_effect(&mut self, predicate: Predicate) {
        self.vocabulary.predicates_mut().make_dynamic(predicate);
    }

    /// Returns the type called `name`, declaring it (with a warning)
    /// if needed.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn lookup_type(&mut self, name: &str) -> Result<Type, FormulaError> {
        if let Some(ty) = self.vocabulary.types().find_type(name) {
            return Ok(ty);
        }

        self.diagnostics.report(FormulaError::ImplicitType {
            name: name.to_string(),
        })?;
        self.declare_type(name)
    }

    /// Returns the constant called `name`, declaring it as an `object`
    /// (with a warning) if needed.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn lookup_constant(&mut self, name: &str) -> Result<Name, FormulaError> {
        if let Some(constant) = self.vocabulary.terms().find_name(name) {
            return Ok(constant);
        }

        self.diagnostics.report(FormulaError::ImplicitConstant {
            name: name.to_string(),
        })?;
        Ok(self.declare_constant(name, Type::OBJECT))
    }

    /// Returns the predicate called `name`.  An undeclared predicate is
    /// declared (with a warning) over `arity` objects, and this first
    /// occurrence becomes its declaration.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn lookup_predicate(
        &mut self,
        name: &str,
        arity: usize,
    ) -> Result<Predicate, FormulaError> {
        if let Some(predicate) = self.vocabulary.predicates().find_predicate(name) {
            return Ok(predicate);
        }

        self.diagnostics.report(FormulaError::ImplicitPredicate {
            name: name.to_string(),
        })?;
        Ok(self.declare_predicate(name, vec![Type::OBJECT; arity]))
    }

    /// Returns the innermost variable in scope called `name`.  A free
    /// variable is an error, and yields a fresh `object` variable.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn lookup_variable(&mut self, name: &str) -> Result<Variable, FormulaError> {
        let name = name.trim_start_matches('?');
        let found = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied());
        if let Some(variable) = found {
            return Ok(variable);
        }

        self.diagnostics.report(FormulaError::FreeVariable {
            name: name.to_string(),
        })?;
        Ok(self.vocabulary.add_variable(name, Type::OBJECT))
    }

    /// Opens a scope with fresh variables for `parameters`, and
    /// returns them.  A parameter repeated within the list is an error
    /// and is skipped; one that shadows an enclosing variable is an
    /// error, but still declared.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn push_scope(
        &mut self,
        parameters: &[(&str, Type)],
    ) -> Result<Vec<Variable>, FormulaError> {
        let mut scope = IndexMap::new();

        for (name, ty) in parameters {
            let name = name.trim_start_matches('?');

            if scope.contains_key(name) {
                self.diagnostics.report(FormulaError::RepeatedParameter {
                    name: name.to_string(),
                })?;
                continue;
            }

            if self.scopes.iter().any(|outer| outer.contains_key(name)) {
                self.diagnostics.report(FormulaError::ShadowingParameter {
                    name: name.to_string(),
                })?;
            }

            scope.insert(name.to_string(), self.vocabulary.add_variable(name, *ty));
        }

        debug!(depth = self.scopes.len() + 1, count = scope.len(), "pushed scope");
        let ret = scope.values().copied().collect();
        self.scopes.push(scope);
        Ok(ret)
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Returns the atom `predicate(terms...)` at time `when`.
    ///
    /// The wrong number of arguments is an error, and yields `FALSE`.
    /// An argument whose type isn't a subtype of the parameter's is an
    /// error too, but the atom is still built.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn atom(
        &mut self,
        predicate: Predicate,
        terms: Vec<Term>,
        when: FormulaTime,
    ) -> Result<Formula, FormulaError> {
        let predicates = self.vocabulary.predicates();
        let name = predicates.name(predicate).to_string();

        if terms.len() != predicates.arity(predicate) {
            let error = FormulaError::Arity {
                predicate: name,
                expected: predicates.arity(predicate),
                actual: terms.len(),
            };
            self.diagnostics.report(error)?;
            return Ok(Formula::False);
        }

        let types = self.vocabulary.types();
        let mismatches: Vec<FormulaError> = terms
            .iter()
            .zip(predicates.parameters(predicate))
            .enumerate()
            .filter(|(_, (term, expected))| {
                !types.subtype(self.vocabulary.type_of(**term), **expected)
            })
            .map(|(position, (term, expected))| FormulaError::ArgumentType {
                predicate: name.clone(),
                position: position + 1,
                actual: types.display(self.vocabulary.type_of(*term)).to_string(),
                expected: types.display(*expected).to_string(),
            })
            .collect();

        for error in mismatches {
            self.diagnostics.report(error)?;
        }

        Ok(Formula::atom(Atom::timed(predicate, terms, when)))
    }

    /// Returns `left = right`.  Terms of incompatible types are an
    /// error, and yield `FALSE`.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn equality(&mut self, left: Term, right: Term) -> Result<Formula, FormulaError> {
        self.binding(left, right, true)
    }

    /// Returns `left != right`.  Terms of incompatible types are an
    /// error, and yield `TRUE`.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn inequality(&mut self, left: Term, right: Term) -> Result<Formula, FormulaError> {
        self.binding(left, right, false)
    }

    fn binding(
        &mut self,
        left: Term,
        right: Term,
        positive: bool,
    ) -> Result<Formula, FormulaError> {
        self.assume(Requirement::Equality)?;

        if !self.vocabulary.compatible_terms(left, right) {
            let terms = self.vocabulary.terms();
            let types = self.vocabulary.types();
            let error = FormulaError::IncompatibleEquality {
                left: terms.display(left).to_string(),
                left_type: types.display(terms.type_of(left)).to_string(),
                right: terms.display(right).to_string(),
                right_type: types.display(terms.type_of(right)).to_string(),
            };
            self.diagnostics.report(error)?;
            return Ok(Formula::from(!positive));
        }

        Ok(if positive {
            Formula::equality(left, right, &self.vocabulary)
        } else {
            Formula::inequality(left, right, &self.vocabulary)
        })
    }

    /// Returns the negation of `formula`, warning about the
    /// requirement that takes.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn negation(&mut self, formula: &Formula) -> Result<Formula, FormulaError> {
        if let Some(requirement) = formula.negation_requirement() {
            self.assume(requirement)?;
        }

        Ok(formula.negate())
    }

    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn disjunction(&mut self, operands: Vec<Formula>) -> Result<Formula, FormulaError> {
        self.assume(Requirement::DisjunctivePreconditions)?;
        Ok(Formula::disjunction(operands))
    }

    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn exists(
        &mut self,
        parameters: Vec<Variable>,
        body: Formula,
    ) -> Result<Formula, FormulaError> {
        self.assume(Requirement::ExistentialPreconditions)?;
        Ok(Formula::exists(parameters, body))
    }

    /// # Errors
    ///
    /// Only returns `Err` for fatal problems.
    pub fn forall(
        &mut self,
        parameters: Vec<Variable>,
        body: Formula,
    ) -> Result<Formula, FormulaError> {
        self.assume(Requirement::UniversalPreconditions)?;
        Ok(Formula::forall(parameters, body))
    }

    /// Reports the use of a language feature we can't represent.
    ///
    /// # Errors
    ///
    /// Always returns `Err`: there is no safe default.
    pub fn unsupported(&mut self, feature: &str) -> Result<(), FormulaError> {
        self.diagnostics.report(FormulaError::Unsupported {
            feature: feature.to_string(),
        })
    }
}

#[cfg(test)]
fn blocks() -> (ParseContext, Type, Predicate) {
    let mut context = ParseContext::new(WarningLevel::Warn);
    context.require(Requirement::Adl).expect("supported");

    let block = context.declare_type("block").expect("not fatal");
    let on = context.declare_predicate("on", vec![block, block]);
    (context, block, on)
}

#[test]
fn test_requirements() {
    let mut context = ParseContext::default();

    context.require(Requirement::QuantifiedPreconditions).expect("supported");
    assert!(context.requires(Requirement::ExistentialPreconditions));
    assert!(context.requires(Requirement::UniversalPreconditions));
    assert!(!context.requires(Requirement::Typing));

    let err = context
        .require(Requirement::NumericFluents)
        .expect_err("fatal");
    assert_eq!(
        err,
        FormulaError::Unsupported {
            feature: ":fluents".into()
        }
    );
    assert!(context.unsupported(":continuous-effects").is_err());
    assert_eq!(context.diagnostics().errors().count(), 2);
}

#[test]
fn test_assumed_requirement_warns_once() {
    let mut context = ParseContext::default();

    context.declare_type("block").expect("not fatal");
    context.declare_type("ball").expect("not fatal");
    assert_eq!(context.diagnostics().warnings().count(), 1);
    assert!(context.requires(Requirement::Typing));
}

#[test]
fn test_implicit_declarations() {
    let (mut context, block, _) = blocks();

    assert_eq!(context.lookup_type("block"), Ok(block));
    let table = context.lookup_type("table").expect("not fatal");
    assert_ne!(table, block);

    let a = context.lookup_constant("a").expect("not fatal");
    assert_eq!(context.vocabulary().terms().name_type(a), Type::OBJECT);

    let holding = context.lookup_predicate("holding", 1).expect("not fatal");
    assert_eq!(context.vocabulary().predicates().arity(holding), 1);
    // The first occurrence is the declaration.
    assert_eq!(context.lookup_predicate("holding", 2), Ok(holding));
    assert_eq!(context.vocabulary().predicates().arity(holding), 1);

    assert_eq!(context.diagnostics().warnings().count(), 3);
    assert!(!context.diagnostics().has_errors());
}

#[test]
fn test_scopes() {
    let (mut context, block, _) = blocks();

    let outer = context
        .push_scope(&[("?x", block), ("?y", block), ("?x", block)])
        .expect("not fatal");
    assert_eq!(outer.len(), 2);
    assert_eq!(context.diagnostics().errors().count(), 1);

    let inner = context.push_scope(&[("?x", Type::OBJECT)]).expect("not fatal");
    assert_eq!(context.diagnostics().errors().count(), 2);
    assert_eq!(context.lookup_variable("?x"), Ok(inner[0]));
    assert_eq!(context.lookup_variable("y"), Ok(outer[1]));

    context.pop_scope();
    assert_eq!(context.lookup_variable("?x"), Ok(outer[0]));

    context.pop_scope();
    let free = context.lookup_variable("?x").expect("not fatal");
    assert!(!outer.contains(&free));
    assert_eq!(context.diagnostics().errors().count(), 3);
}

#[test]
fn test_atom_checks() {
    let (mut context, block, on) = blocks();
    let a = context.declare_constant("a", block);
    let b = context.declare_constant("b", block);
    let thing = context.declare_constant("thing", Type::OBJECT);

    let ok = context
        .atom(on, vec![a.into(), b.into()], FormulaTime::OverAll)
        .expect("not fatal");
    assert_eq!(ok.kind(), crate::formula::FormulaKind::Atom);
    assert!(!context.diagnostics().has_errors());

    let short = context
        .atom(on, vec![a.into()], FormulaTime::OverAll)
        .expect("not fatal");
    assert_eq!(short, Formula::False);

    let mistyped = context
        .atom(on, vec![thing.into(), b.into()], FormulaTime::AtStart)
        .expect("not fatal");
    assert_eq!(mistyped.kind(), crate::formula::FormulaKind::Atom);
    assert_eq!(context.diagnostics().errors().count(), 2);
}

#[test]
fn test_checked_connectives() {
    let (mut context, block, on) = blocks();
    let ball = context.declare_type("ball").expect("not fatal");
    let a = context.declare_constant("a", block);
    let red = context.declare_constant("red", ball);
    let x = context.push_scope(&[("?x", block)]).expect("not fatal")[0];

    let incompatible = context
        .equality(Term::from(x), Term::from(red))
        .expect("not fatal");
    assert_eq!(incompatible, Formula::False);
    assert_eq!(
        context
            .inequality(Term::from(x), Term::from(red))
            .expect("not fatal"),
        Formula::True
    );
    assert_eq!(context.diagnostics().errors().count(), 2);

    let atom = context
        .atom(on, vec![x.into(), a.into()], FormulaTime::OverAll)
        .expect("not fatal");
    let negated = context.negation(&atom).expect("not fatal");
    assert_eq!(negated, atom.negate());

    let quantified = context.exists(vec![x], negated).expect("not fatal");
    assert_eq!(quantified.kind(), crate::formula::FormulaKind::Exists);
    context.pop_scope();

    // Everything was licensed by `:adl`.
    assert_eq!(context.diagnostics().warnings().count(), 0);
}

#[test]
fn test_cyclic_hierarchy() {
    let (mut context, block, _) = blocks();
    let table = context.declare_type("table").expect("not fatal");

    assert_eq!(context.declare_supertype(block, table), Ok(true));
    assert_eq!(context.declare_supertype(table, block), Ok(false));
    assert!(context.vocabulary().types().subtype(block, table));
    assert!(!context.vocabulary().types().subtype(table, block));

    assert_eq!(context.either(Vec::new()), Ok(Type::OBJECT));
    assert_eq!(context.either(vec![block]), Ok(block));
    assert_eq!(context.diagnostics().errors().count(), 2);

    let previous = context.take_diagnostics();
    assert_eq!(previous.len(), 2);
    assert!(context.diagnostics().is_empty());
}
