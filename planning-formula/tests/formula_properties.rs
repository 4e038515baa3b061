//! Randomised checks of the algebraic laws the formula constructors
//! promise: negation normal form, involutive negation, De Morgan,
//! constant absorption, and deterministic instantiation.
use planning_formula::{
    Atom, Formula, InitialState, Predicate, StepId, Substitution, Term, Variable, Vocabulary,
};
use proptest::prelude::*;

const TERMS: usize = 6;
const VARIABLES: usize = 3;

/// A formula as plain data, so proptest can generate and shrink it
/// without a vocabulary.
#[derive(Clone, Debug)]
enum Recipe {
    Constant(bool),
    Atom {
        predicate: usize,
        arguments: Vec<usize>,
        positive: bool,
    },
    Binding(usize, usize, bool),
    And(Vec<Recipe>),
    Or(Vec<Recipe>),
    Exists(usize, Box<Recipe>),
    Forall(usize, Box<Recipe>),
}

/// Three blocks, three block variables, `on/2` and `clear/1`.
struct World {
    vocabulary: Vocabulary,
    predicates: [(Predicate, usize); 2],
    terms: Vec<Term>,
    variables: Vec<Variable>,
}

impl World {
    fn new() -> Self {
        let mut vocabulary = Vocabulary::new();
        let block = vocabulary.types_mut().add_type("block");
        let on = vocabulary.add_predicate("on", vec![block, block]);
        let clear = vocabulary.add_predicate("clear", vec![block]);

        let mut terms: Vec<Term> = ["a", "b", "c"]
            .iter()
            .map(|name| Term::Name(vocabulary.add_name(name, block)))
            .collect();
        let variables: Vec<Variable> = ["x", "y", "z"]
            .iter()
            .map(|name| vocabulary.add_variable(name, block))
            .collect();
        terms.extend(variables.iter().map(|variable| Term::Variable(*variable)));

        Self {
            vocabulary,
            predicates: [(on, 2), (clear, 1)],
            terms,
            variables,
        }
    }

    fn build(&self, recipe: &Recipe) -> Formula {
        match recipe {
            Recipe::Constant(value) => Formula::from(*value),
            Recipe::Atom {
                predicate,
                arguments,
                positive,
            } => {
                let (predicate, arity) = self.predicates[*predicate];
                let terms = arguments[..arity].iter().map(|i| self.terms[*i]).collect();
                let atom = Atom::new(predicate, terms);

                if *positive {
                    Formula::atom(atom)
                } else {
                    Formula::negation(atom)
                }
            }
            Recipe::Binding(left, right, positive) => {
                let (left, right) = (self.terms[*left], self.terms[*right]);

                if *positive {
                    Formula::equality(left, right, &self.vocabulary)
                } else {
                    Formula::inequality(left, right, &self.vocabulary)
                }
            }
            Recipe::And(operands) => Formula::conjunction(operands.iter().map(|op| self.build(op))),
            Recipe::Or(operands) => Formula::disjunction(operands.iter().map(|op| self.build(op))),
            Recipe::Exists(variable, body) => {
                Formula::exists(vec![self.variables[*variable]], self.build(body))
            }
            Recipe::Forall(variable, body) => {
                Formula::forall(vec![self.variables[*variable]], self.build(body))
            }
        }
    }
}

fn recipe() -> impl Strategy<Value = Recipe> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Recipe::Constant),
        (0..2usize, prop::collection::vec(0..TERMS, 2), any::<bool>()).prop_map(
            |(predicate, arguments, positive)| Recipe::Atom {
                predicate,
                arguments,
                positive,
            }
        ),
        (0..TERMS, 0..TERMS, any::<bool>())
            .prop_map(|(left, right, positive)| Recipe::Binding(left, right, positive)),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Recipe::And),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Recipe::Or),
            (0..VARIABLES, inner.clone())
                .prop_map(|(variable, body)| Recipe::Exists(variable, Box::new(body))),
            (0..VARIABLES, inner)
                .prop_map(|(variable, body)| Recipe::Forall(variable, Box::new(body))),
        ]
    })
}

/// Checks the shape every constructed formula must have.
fn well_formed(formula: &Formula) -> bool {
    match formula {
        Formula::Conjunction(connective) => {
            connective.operands().len() >= 2
                && connective.operands().iter().all(|operand| {
                    !operand.is_constant()
                        && !matches!(operand, Formula::Conjunction(_))
                        && well_formed(operand)
                })
        }
        Formula::Disjunction(connective) => {
            connective.operands().len() >= 2
                && connective.operands().iter().all(|operand| {
                    !operand.is_constant()
                        && !matches!(operand, Formula::Disjunction(_))
                        && well_formed(operand)
                })
        }
        Formula::Exists(quantified) | Formula::Forall(quantified) => {
            let free = quantified.body().free_variables();

            !quantified.parameters().is_empty()
                && quantified
                    .parameters()
                    .iter()
                    .all(|parameter| free.contains(parameter))
                && !quantified.body().is_constant()
                && well_formed(quantified.body())
        }
        _ => true,
    }
}

proptest! {
    #[test]
    fn prop_constructors_are_well_formed(recipe in recipe()) {
        let world = World::new();
        let formula = world.build(&recipe);

        prop_assert!(well_formed(&formula));
        prop_assert!(well_formed(&formula.negate()));
    }

    #[test]
    fn prop_double_negation(recipe in recipe()) {
        let world = World::new();
        let formula = world.build(&recipe);

        prop_assert_eq!(formula.negate().negate(), formula);
    }

    #[test]
    fn prop_de_morgan(left in recipe(), right in recipe()) {
        let world = World::new();
        let f = world.build(&left);
        let g = world.build(&right);

        prop_assert_eq!(
            (f.clone() & g.clone()).negate(),
            f.negate() | g.negate()
        );
        prop_assert_eq!(
            (f.clone() | g.clone()).negate(),
            f.negate() & g.negate()
        );
    }

    #[test]
    fn prop_constant_absorption(recipe in recipe()) {
        let world = World::new();
        let formula = world.build(&recipe);

        let and = |operands: Vec<Formula>| Formula::conjunction(operands);
        let or = |operands: Vec<Formula>| Formula::disjunction(operands);

        prop_assert_eq!(and(vec![Formula::True, formula.clone()]), formula.clone());
        prop_assert_eq!(and(vec![formula.clone(), Formula::False]), Formula::False);
        prop_assert_eq!(or(vec![Formula::False, formula.clone()]), formula.clone());
        prop_assert_eq!(or(vec![formula, Formula::True]), Formula::True);
    }

    #[test]
    fn prop_instantiation_deterministic(recipe in recipe(), step in 0u32..4) {
        let world = World::new();
        let formula = world.build(&recipe);
        let step = StepId::new(step);

        let first = formula.instantiate_step(step);
        prop_assert_eq!(&first, &formula.instantiate_step(step));
        prop_assert_eq!(&first.instantiate_step(step), &first);
        prop_assert!(first.free_variables().is_empty());
        prop_assert!(well_formed(&first));
        prop_assert!(first.equivalent(&formula));
    }

    #[test]
    fn prop_empty_substitution_is_identity(recipe in recipe()) {
        let world = World::new();
        let formula = world.build(&recipe);

        let substituted = formula.substitute(&Substitution::new(), &world.vocabulary);
        prop_assert_eq!(substituted, formula.clone());
        prop_assert!(formula.equivalent(&formula));
    }

    #[test]
    fn prop_closed_static_formulas_ground_to_constants(recipe in recipe()) {
        let world = World::new();
        let formula = Formula::forall(world.variables.clone(), world.build(&recipe));

        // Nothing is dynamic, so the initial state decides everything.
        let (on, _) = world.predicates[0];
        let (clear, _) = world.predicates[1];
        let names: Vec<_> = world.terms.iter().filter_map(|term| term.as_name()).collect();
        let mut init = InitialState::new(&world.vocabulary);
        init.insert(on, vec![names[0], names[1]]);
        init.insert(clear, vec![names[2]]);

        let ground = formula.instantiate_ground(&Substitution::new(), &init, &world.vocabulary);
        prop_assert!(ground.is_constant(), "{:?}", ground);
    }
}
