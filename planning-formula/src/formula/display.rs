//! PDDL rendering.  `TRUE` and `FALSE` print as the empty conjunction
//! and disjunction, which is how PDDL spells them.
use super::Atom;
use super::BindingLiteral;
use super::Formula;
use super::FormulaTime;
use super::Quantified;
use crate::vocabulary::Vocabulary;
use std::fmt;

pub struct FormulaDisplay<'a> {
    formula: &'a Formula,
    vocabulary: &'a Vocabulary,
}

impl Formula {
    /// Returns a `Display`able view of this formula, with symbol names
    /// looked up in `vocabulary`.
    #[must_use]
    pub fn display<'a>(&'a self, vocabulary: &'a Vocabulary) -> FormulaDisplay<'a> {
        FormulaDisplay {
            formula: self,
            vocabulary,
        }
    }
}

impl FormulaDisplay<'_> {
    fn nested<'b>(&'b self, formula: &'b Formula) -> FormulaDisplay<'b> {
        FormulaDisplay {
            formula,
            vocabulary: self.vocabulary,
        }
    }

    fn write_atom(&self, f: &mut fmt::Formatter<'_>, atom: &Atom, positive: bool) -> fmt::Result {
        let (open, close) = match atom.when() {
            FormulaTime::AtStart => ("(at start ", ")"),
            FormulaTime::AtEnd => ("(at end ", ")"),
            FormulaTime::OverAll => ("", ""),
        };

        f.write_str(open)?;
        if !positive {
            f.write_str("(not ")?;
        }

        write!(f, "({}", self.vocabulary.predicates().name(atom.predicate()))?;
        for term in atom.terms() {
            write!(f, " {}", self.vocabulary.terms().display(*term))?;
        }
        f.write_str(")")?;

        if !positive {
            f.write_str(")")?;
        }
        f.write_str(close)
    }

    fn write_binding(
        &self,
        f: &mut fmt::Formatter<'_>,
        binding: &BindingLiteral,
        positive: bool,
    ) -> fmt::Result {
        let terms = self.vocabulary.terms();
        let equality = format!(
            "(= {} {})",
            terms.display(binding.left()),
            terms.display(binding.right())
        );

        if positive {
            f.write_str(&equality)
        } else {
            write!(f, "(not {})", equality)
        }
    }

    fn write_connective(
        &self,
        f: &mut fmt::Formatter<'_>,
        keyword: &str,
        operands: &[Formula],
    ) -> fmt::Result {
        write!(f, "({}", keyword)?;
        for operand in operands {
            write!(f, " {}", self.nested(operand))?;
        }
        f.write_str(")")
    }

    fn write_quantified(
        &self,
        f: &mut fmt::Formatter<'_>,
        keyword: &str,
        quantified: &Quantified,
    ) -> fmt::Result {
        let terms = self.vocabulary.terms();
        let types = self.vocabulary.types();

        write!(f, "({} (", keyword)?;
        for (i, parameter) in quantified.parameters().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }

            write!(
                f,
                "?{} - {}",
                terms.variable_str(*parameter),
                types.display(terms.variable_type(*parameter))
            )?;
        }
        write!(f, ") {})", self.nested(quantified.body()))
    }
}

impl fmt::Display for FormulaDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formula {
            Formula::True => f.write_str("(and)"),
            Formula::False => f.write_str("(or)"),
            Formula::Atom(atom) => self.write_atom(f, atom, true),
            Formula::Negation(atom) => self.write_atom(f, atom, false),
            Formula::Equality(binding) => self.write_binding(f, binding, true),
            Formula::Inequality(binding) => self.write_binding(f, binding, false),
            Formula::Conjunction(connective) => {
                self.write_connective(f, "and", connective.operands())
            }
            Formula::Disjunction(connective) => {
                self.write_connective(f, "or", connective.operands())
            }
            Formula::Exists(quantified) => self.write_quantified(f, "exists", quantified),
            Formula::Forall(quantified) => self.write_quantified(f, "forall", quantified),
        }
    }
}

#[test]
fn test_display() {
    use super::test_support::Blocks;
    use crate::term::StepId;
    use crate::term::Term;

    let w = Blocks::new();
    let v = &w.vocabulary;

    assert_eq!(Formula::True.display(v).to_string(), "(and)");
    assert_eq!(Formula::False.display(v).to_string(), "(or)");
    assert_eq!(w.on(w.a, w.b).display(v).to_string(), "(on a b)");
    assert_eq!(
        (!w.on(w.a, w.x) & w.clear(w.y)).display(v).to_string(),
        "(and (not (on a ?x)) (clear ?y))"
    );
    assert_eq!(
        Formula::inequality(Term::from(w.x), Term::from(w.a), v)
            .display(v)
            .to_string(),
        "(not (= ?x a))"
    );
    assert_eq!(
        Formula::exists(vec![w.x], w.on(w.x, w.y) | w.clear(w.x))
            .display(v)
            .to_string(),
        "(exists (?x - block) (or (on ?x ?y) (clear ?x)))"
    );

    let timed = Formula::negation(Atom::timed(
        w.clear,
        vec![Term::from(w.x.instantiate(StepId::new(3)))],
        FormulaTime::AtStart,
    ));
    assert_eq!(timed.display(v).to_string(), "(at start (not (clear ?x(3))))");
}
