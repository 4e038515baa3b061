//! End-to-end walks through the public API, the way a PDDL front end
//! and a partial order planner would drive it.
use planning_formula::{
    Atom, Bindings, Domain, Formula, FormulaError, FormulaKind, FormulaTime, InitialState, Name,
    ParseContext, Requirement, Severity, StepId, Substitution, Term, Type, TypeLattice,
    WarningLevel,
};
use std::collections::BTreeSet;

#[test]
fn test_subtype_edge() {
    let mut lattice = TypeLattice::new();
    let block = lattice.add_type("block");
    let table = lattice.add_type("table");

    assert!(lattice.add_supertype(block, table));
    assert!(lattice.subtype(block, table));
    assert!(!lattice.subtype(table, block));
}

#[test]
fn test_union_contains_components() {
    let mut lattice = TypeLattice::new();
    let block = lattice.add_type("block");
    let table = lattice.add_type("table");

    let either = lattice.union_type(vec![block, table]).expect("non-empty");
    assert!(lattice.subtype(block, either));
    assert!(lattice.subtype(table, either));
    assert!(lattice.subtype(either, Type::OBJECT));
    assert_eq!(lattice.display(either).to_string(), "(either block table)");
}

#[test]
fn test_argument_type_mismatch_is_recorded() {
    let mut context = ParseContext::new(WarningLevel::Warn);
    context.require(Requirement::Typing).expect("supported");
    let block = context.declare_type("block").expect("not fatal");
    let table = context.declare_type("table").expect("not fatal");
    assert_eq!(context.declare_supertype(block, table), Ok(true));
    let on = context.declare_predicate("on", vec![block, table]);

    let parameters = context
        .push_scope(&[("?x", table), ("?y", block)])
        .expect("not fatal");
    let atom = context
        .atom(
            on,
            parameters.iter().map(|variable| Term::from(*variable)).collect(),
            FormulaTime::OverAll,
        )
        .expect("not fatal");
    context.pop_scope();

    // `?x` is a table where a block is expected; `?y` is a block,
    // which is also a table.
    assert_eq!(atom.kind(), FormulaKind::Atom);
    let errors: Vec<_> = context.diagnostics().errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].severity(), Severity::Error);
    assert_eq!(
        errors[0].error(),
        &FormulaError::ArgumentType {
            predicate: "on".into(),
            position: 1,
            actual: "table".into(),
            expected: "block".into(),
        }
    );
    assert_eq!(
        atom.display(context.vocabulary()).to_string(),
        "(on ?x ?y)"
    );
}

#[test]
fn test_negated_conjunction_stays_in_normal_form() {
    let mut context = ParseContext::new(WarningLevel::Warn);
    let on = context.lookup_predicate("on", 2).expect("not fatal");
    let a = context.lookup_constant("a").expect("not fatal");
    let b = context.lookup_constant("b").expect("not fatal");
    let c = context.lookup_constant("c").expect("not fatal");

    let ab = context
        .atom(on, vec![a.into(), b.into()], FormulaTime::OverAll)
        .expect("not fatal");
    let bc = context
        .atom(on, vec![b.into(), c.into()], FormulaTime::OverAll)
        .expect("not fatal");
    let not_ab = context.negation(&ab).expect("not fatal");
    let not_bc = context.negation(&bc).expect("not fatal");

    let formula = not_ab & not_bc;
    match &formula {
        Formula::Conjunction(connective) => {
            assert_eq!(connective.operands().len(), 2);
            for operand in connective.operands() {
                assert_eq!(operand.kind(), FormulaKind::Negation);
            }
        }
        other => panic!("expected a conjunction, got {:?}", other),
    }

    assert_eq!(
        formula.display(context.vocabulary()).to_string(),
        "(and (not (on a b)) (not (on b c)))"
    );
    // One implicit predicate, three implicit constants, and one
    // assumed `:negative-preconditions`.
    assert_eq!(context.diagnostics().warnings().count(), 5);
    assert!(!context.diagnostics().has_errors());
}

#[test]
fn test_unused_binder_is_elided() {
    let mut context = ParseContext::new(WarningLevel::Silent);
    let clear = context.lookup_predicate("clear", 1).expect("not fatal");
    let a = context.lookup_constant("a").expect("not fatal");
    let body = context
        .atom(clear, vec![a.into()], FormulaTime::OverAll)
        .expect("not fatal");

    let x = context
        .push_scope(&[("?x", Type::OBJECT)])
        .expect("not fatal");
    let quantified = context.exists(x, body.clone()).expect("not fatal");
    context.pop_scope();

    assert_eq!(quantified, body);
    assert!(context.diagnostics().is_empty());
}

#[test]
fn test_incompatible_equality_collapses() {
    let mut context = ParseContext::new(WarningLevel::Warn);
    context.require(Requirement::Adl).expect("supported");
    let block = context.declare_type("block").expect("not fatal");
    let ball = context.declare_type("ball").expect("not fatal");
    let a = context.declare_constant("a", block);
    let red = context.declare_constant("red", ball);

    let vocabulary = context.vocabulary();
    assert_eq!(
        Formula::equality(a.into(), red.into(), vocabulary),
        Formula::False
    );

    let equality = context.equality(a.into(), red.into()).expect("not fatal");
    assert_eq!(equality, Formula::False);
    assert!(context.diagnostics().has_errors());
}

#[test]
fn test_strict_warnings_fail_the_unit() {
    let mut context = ParseContext::new(WarningLevel::Strict);
    context.lookup_constant("a").expect("not fatal");

    let diagnostics = context.take_diagnostics();
    let reports = diagnostics.finish().expect_err("escalated");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].to_string(), "error: constant `a` used before declaration");

    // The next unit starts clean.
    assert!(context.diagnostics().is_empty());
    assert!(context.require(Requirement::ContinuousEffects).is_err());
}

/// A binding store where step variables are bound to names, and
/// nothing else is known.
struct StepBindings {
    bound: Vec<(Term, Name)>,
}

impl Bindings for StepBindings {
    fn equal(&self, left: Term, right: Term) -> bool {
        self.binding(left) == self.binding(right)
    }

    fn distinct(&self, left: Term, right: Term) -> bool {
        let (left, right) = (self.binding(left), self.binding(right));
        left.is_name() && right.is_name() && left != right
    }

    fn values(&self, term: Term) -> Option<BTreeSet<Name>> {
        self.bound
            .iter()
            .find(|(bound, _)| *bound == term)
            .map(|(_, name)| std::iter::once(*name).collect())
    }
}

/// Blocksworld `stack` precondition, instantiated at a plan step,
/// resolved against bindings, then grounded against the initial state.
#[test]
fn test_precondition_lifecycle() {
    let mut context = ParseContext::new(WarningLevel::Warn);
    context.require(Requirement::Adl).expect("supported");
    let block = context.declare_type("block").expect("not fatal");
    let on = context.declare_predicate("on", vec![block, block]);
    let clear = context.declare_predicate("clear", vec![block]);
    let heavy = context.declare_predicate("heavy", vec![block]);
    context.declare_effect(on);
    context.declare_effect(clear);

    let a = context.declare_constant("a", block);
    let b = context.declare_constant("b", block);

    let parameters = context
        .push_scope(&[("?x", block), ("?y", block)])
        .expect("not fatal");
    let (x, y) = (Term::from(parameters[0]), Term::from(parameters[1]));
    let clear_x = context
        .atom(clear, vec![x], FormulaTime::AtStart)
        .expect("not fatal");
    let clear_y = context
        .atom(clear, vec![y], FormulaTime::OverAll)
        .expect("not fatal");
    let heavy_x = context
        .atom(heavy, vec![x], FormulaTime::OverAll)
        .expect("not fatal");
    let not_heavy_x = context.negation(&heavy_x).expect("not fatal");
    let distinct = context.inequality(x, y).expect("not fatal");
    context.pop_scope();
    assert!(context.diagnostics().is_empty());

    let precondition = Formula::conjunction(vec![clear_x, clear_y, not_heavy_x, distinct]);
    let (vocabulary, _) = context.into_parts();
    assert!(vocabulary.is_static(heavy));
    assert!(!vocabulary.is_static(clear));
    assert_eq!(
        precondition.display(&vocabulary).to_string(),
        "(and (at start (clear ?x)) (clear ?y) (not (heavy ?x)) (not (= ?x ?y)))"
    );

    // Bind the schema to step 1.
    let step = StepId::new(1);
    let instance = precondition.instantiate_step(step);
    assert_eq!(instance, precondition.instantiate_step(step));
    assert!(instance.free_variables().is_empty());
    assert!(instance.equivalent(&precondition));

    let x1 = Term::from(parameters[0].instantiate(step));
    let y1 = Term::from(parameters[1].instantiate(step));
    let bindings = StepBindings {
        bound: vec![(x1, a), (y1, b)],
    };
    let resolved = instance.instantiate_bindings(&bindings, &vocabulary);
    assert_eq!(
        resolved.display(&vocabulary).to_string(),
        "(and (at start (clear a)) (clear b) (not (heavy a)))"
    );

    // `heavy` is static, and `a` is not heavy initially.
    let mut init = InitialState::new(&vocabulary);
    init.insert(heavy, vec![b]);
    let substitution: Substitution = vec![(x, Term::from(a)), (y, Term::from(b))]
        .into_iter()
        .collect();
    let ground = precondition.instantiate_ground(&substitution, &init, &vocabulary);
    assert_eq!(
        ground.display(&vocabulary).to_string(),
        "(and (at start (clear a)) (clear b))"
    );
    assert_eq!(ground, resolved.strip_static(&vocabulary));

    // Stacking b on a instead violates the static precondition.
    let swapped: Substitution = vec![(x, Term::from(b)), (y, Term::from(a))]
        .into_iter()
        .collect();
    assert_eq!(
        precondition.instantiate_ground(&swapped, &init, &vocabulary),
        Formula::False
    );

    // An effect asserting `clear(b)` overlaps both `clear` literals,
    // unless neither parameter is `b`.
    let threat = Formula::atom(Atom::new(clear, vec![b.into()]))
        .literal()
        .expect("atom");
    assert_eq!(
        precondition.separate(&threat, &vocabulary).display(&vocabulary).to_string(),
        "(and (not (= ?x b)) (not (= ?y b)))"
    );
}
