use indexmap::IndexMap;

use crate::term::{Atom, Rule, Term, Variable};

/// Returns a copy of `rule` with every variable renamed apart.
///
/// Fresh variables are numbered from `counter` upwards; the same source
/// variable maps to the same fresh variable everywhere in the rule. The
/// returned counter is one past the last number used, so threading it into
/// the next call guarantees the two copies share no variables.
#[must_use]
pub fn standardize(rule: &Rule, counter: usize) -> (Rule, usize) {
    let mut mapping: IndexMap<Variable, Variable> = IndexMap::new();
    let mut next = counter;

    let mut rename = |atom: &Atom| -> Atom {
        Atom {
            predicate: atom.predicate.clone(),
            args: atom
                .args
                .iter()
                .map(|term| match term {
                    Term::Constant(_) => term.clone(),
                    Term::Variable(var) => Term::Variable(
                        mapping
                            .entry(var.clone())
                            .or_insert_with(|| {
                                let fresh = Variable::Fresh(next);
                                next += 1;
                                fresh
                            })
                            .clone(),
                    ),
                })
                .collect(),
        }
    };

    let premises = rule.premises.iter().map(&mut rename).collect();
    let conclusion = rename(&rule.conclusion);
    (Rule::new(premises, conclusion), next)
}
