use indexmap::{IndexMap, IndexSet};

use crate::term::{Atom, Rule, Substitution, Term};
use crate::unify::unify;

/// Index for fast fact lookup by argument position and value
#[derive(Debug, Clone, Default)]
struct PredicateIndex {
    /// Every fact with this predicate and arity, as positions in the store
    all: Vec<usize>,
    /// For each argument position, maps a constant to the facts holding it there.
    /// For `Parent(John, Mary), Parent(John, Tom), Parent(Mary, Sue)`:
    /// - Position 0: `{"John" -> [0, 1], "Mary" -> [2]}`
    /// - Position 1: `{"Mary" -> [0], "Tom" -> [1], "Sue" -> [2]}`
    by_position: Vec<IndexMap<String, Vec<usize>>>,
}

impl PredicateIndex {
    fn new(arity: usize) -> Self {
        Self {
            all: Vec::new(),
            by_position: (0..arity).map(|_| IndexMap::new()).collect(),
        }
    }

    fn add_fact(&mut self, slot: usize, fact: &Atom) {
        self.all.push(slot);
        for (pos, term) in fact.args.iter().enumerate() {
            if let Term::Constant(value) = term {
                self.by_position[pos]
                    .entry(value.clone())
                    .or_default()
                    .push(slot);
            }
        }
    }

    /// Get facts that hold a specific value at a given position
    fn get_facts_by_position(&self, position: usize, value: &str) -> &[usize] {
        self.by_position
            .get(position)
            .and_then(|pos_map| pos_map.get(value))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// The deduplicated set of ground facts, in the order they were added
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: IndexSet<Atom>,
    /// Predicate name -> arity -> index
    indexes: IndexMap<String, IndexMap<usize, PredicateIndex>>,
}

impl FactStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fact. Returns false if a structurally equal fact is already present.
    pub fn insert(&mut self, fact: Atom) -> bool {
        if self.facts.contains(&fact) {
            return false;
        }
        let index = self
            .indexes
            .entry(fact.predicate.clone())
            .or_default()
            .entry(fact.arity())
            .or_insert_with(|| PredicateIndex::new(fact.arity()));
        let (slot, _) = self.facts.insert_full(fact);
        index.add_fact(slot, &self.facts[slot]);
        true
    }

    /// Returns true if a structurally equal fact is present
    #[must_use]
    pub fn contains(&self, fact: &Atom) -> bool {
        self.facts.contains(fact)
    }

    /// Number of facts
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if there are no facts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates over the facts in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.facts.iter()
    }

    /// Returns the facts that could unify with `pattern` under `binding`.
    ///
    /// Facts with another predicate or arity are skipped. Among the argument
    /// positions holding a constant (directly or through `binding`), the one
    /// with the fewest facts is used; otherwise every fact of the predicate is
    /// returned. Filtering never drops a fact that would unify.
    pub fn candidates<'a>(
        &'a self,
        pattern: &Atom,
        binding: &Substitution,
    ) -> impl Iterator<Item = &'a Atom> + 'a {
        let slots: &[usize] = self
            .indexes
            .get(&pattern.predicate)
            .and_then(|by_arity| by_arity.get(&pattern.arity()))
            .map_or(&[][..], |index| {
                pattern
                    .args
                    .iter()
                    .enumerate()
                    .filter_map(|(pos, term)| match binding.resolve(term) {
                        Term::Constant(value) => Some(index.get_facts_by_position(pos, &value)),
                        Term::Variable(_) => None,
                    })
                    .min_by_key(|slots| slots.len())
                    .unwrap_or(index.all.as_slice())
            });
        slots.iter().map(move |&slot| &self.facts[slot])
    }
}

impl<'a> IntoIterator for &'a FactStore {
    type Item = &'a Atom;
    type IntoIter = indexmap::set::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

/// Finds every substitution under which all premises of `rule` hold in `facts`.
///
/// The premises are joined left to right: starting from the empty
/// substitution, each partial substitution is extended by unifying the next
/// premise against every candidate fact, and an extension is kept only if it
/// agrees with every binding already in the partial substitution. Bindings
/// found for a later premise are not pushed back into premises already
/// matched; for conjunctions of flat atoms this loses no matches.
///
/// A rule with no premises yields the single empty substitution.
#[must_use]
pub fn match_rule(rule: &Rule, facts: &FactStore) -> Vec<Substitution> {
    rule.premises
        .iter()
        .try_fold(vec![Substitution::new()], |matches, premise| {
            let extended: Vec<Substitution> = matches
                .iter()
                .flat_map(|partial| {
                    facts.candidates(premise, partial).filter_map(move |fact| {
                        unify(premise, fact, partial.clone())
                            .filter(|theta| theta.is_consistent_with(partial))
                    })
                })
                .collect();

            // Early return once no combination survives
            if extended.is_empty() {
                None
            } else {
                Some(extended)
            }
        })
        .unwrap_or_default()
}
