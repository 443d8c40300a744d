use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::error::{Result, StructureError};
use crate::input::RuleSpec;
use crate::matcher::FactStore;
use crate::term::{Atom, Rule, Variable};

/// An append-only collection of facts and rules.
///
/// Rules (facts included) are kept in the order they were added. Every fact
/// is ground, and no two facts are structurally equal.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    rules: Vec<Rule>,
    facts: FactStore,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a checked rule or fact.
    ///
    /// A fact that is already present is not added again.
    ///
    /// # Errors
    ///
    /// Returns a [`StructureError`] if the rule fails [`check_rule`].
    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        self.push_checked(self.rules.len(), rule)
    }

    fn push_checked(&mut self, index: usize, rule: Rule) -> Result<()> {
        check_rule(index, &rule)?;
        if rule.is_fact() {
            self.insert_fact(rule.conclusion);
        } else {
            self.rules.push(rule);
        }
        Ok(())
    }

    /// Adds a ground fact without checks. Returns false if it was already present.
    pub(crate) fn insert_fact(&mut self, fact: Atom) -> bool {
        if self.facts.insert(fact.clone()) {
            self.rules.push(Rule::fact(fact));
            true
        } else {
            false
        }
    }

    /// All rules and facts in order
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The fact set
    #[must_use]
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    /// Returns true if `fact` is present
    #[must_use]
    pub fn contains(&self, fact: &Atom) -> bool {
        self.facts.contains(fact)
    }

    /// Returns every fact with the given predicate
    #[must_use]
    pub fn get_facts(&self, predicate: &str) -> Vec<Atom> {
        self.facts
            .iter()
            .filter(|fact| fact.predicate == predicate)
            .cloned()
            .collect()
    }
}

/// Builds a knowledge base from caller-supplied records.
///
/// # Errors
///
/// Returns the first [`StructureError`] found; nothing is built in that case.
pub fn build_knowledge_base<'a>(specs: impl IntoIterator<Item = &'a RuleSpec>) -> Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::new();
    for (index, spec) in specs.into_iter().enumerate() {
        let premises = spec
            .premises
            .iter()
            .map(|premise| premise.to_atom_in(index))
            .collect::<Result<Vec<_>>>()?;
        let conclusion = spec.conclusion.to_atom_in(index)?;
        kb.push_checked(index, Rule::new(premises, conclusion))?;
    }
    debug!(
        "Built knowledge base with {} facts and {} rules",
        kb.facts.len(),
        kb.rules.len() - kb.facts.len()
    );
    Ok(kb)
}

/// Checks the structural invariants the engine relies on:
/// - a fact contains no variables
/// - every conclusion variable appears in some premise
/// - a predicate is used with one arity throughout the rule
///
/// # Errors
///
/// Returns the violated invariant as a [`StructureError`], labelled with `index`.
pub fn check_rule(index: usize, rule: &Rule) -> Result<()> {
    if rule.is_fact() {
        if let Some(var) = rule.conclusion.variables().next() {
            return Err(StructureError::NonGroundFact {
                rule: index,
                predicate: rule.conclusion.predicate.clone(),
                variable: var.to_string(),
            });
        }
    } else {
        let body_vars: IndexSet<&Variable> =
            rule.premises.iter().flat_map(Atom::variables).collect();
        if let Some(var) = rule
            .conclusion
            .variables()
            .find(|var| !body_vars.contains(var))
        {
            return Err(StructureError::UnboundHeadVariable {
                rule: index,
                predicate: rule.conclusion.predicate.clone(),
                variable: var.to_string(),
            });
        }
    }

    let mut arities: IndexMap<&str, usize> = IndexMap::new();
    for atom in rule.atoms() {
        let expected = *arities.entry(atom.predicate.as_str()).or_insert(atom.arity());
        if expected != atom.arity() {
            return Err(StructureError::ArityMismatch {
                rule: index,
                predicate: atom.predicate.clone(),
                expected,
                found: atom.arity(),
            });
        }
    }

    Ok(())
}
