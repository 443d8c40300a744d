//! Caller-facing records for rules, atoms and whole programs.
//!
//! With the `serde` feature these deserialize from documents such as
//!
//! ```json
//! {
//!   "rules": [
//!     { "conclusion": { "predicate": "Parent", "args": ["John", "Mary"] } },
//!     { "premises": [ { "predicate": "Parent", "args": ["x", { "var": "y" }] },
//!                     { "predicate": "Parent", "args": [{ "var": "y" }, "z"] } ],
//!       "conclusion": { "predicate": "Grandparent", "args": ["x", "z"] } }
//!   ],
//!   "queries": [ { "predicate": "Grandparent", "args": ["John", "Sue"] } ]
//! }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::ChainerConfig;
use crate::error::{Result, StructureError};
use crate::term::{Atom, Term};

/// An explicitly tagged argument
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TaggedArg {
    /// A variable, whatever its spelling
    Var(String),
    /// A constant, whatever its spelling
    Const(String),
}

/// One argument of an [`AtomSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ArgSpec {
    /// A bare symbol, classified by [`Term::classify`]
    Bare(String),
    /// A symbol with an explicit variable/constant tag
    Tagged(TaggedArg),
    /// A nested predicate application. Always rejected.
    Compound(AtomSpec),
}

impl From<&str> for ArgSpec {
    fn from(symbol: &str) -> Self {
        ArgSpec::Bare(symbol.to_string())
    }
}

/// A predicate application as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AtomSpec {
    /// Predicate name; empty means missing
    #[cfg_attr(feature = "serde", serde(default))]
    pub predicate: String,
    /// Argument list; `None` means missing, `Some(vec![])` is a zero-arity atom
    #[cfg_attr(feature = "serde", serde(default))]
    pub args: Option<Vec<ArgSpec>>,
}

impl AtomSpec {
    /// Builds an atom record from bare symbols
    pub fn new<S: AsRef<str>>(predicate: &str, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            predicate: predicate.to_string(),
            args: Some(args.into_iter().map(|a| ArgSpec::from(a.as_ref())).collect()),
        }
    }

    /// Converts to an [`Atom`], checking its structure
    ///
    /// # Errors
    ///
    /// Returns a [`StructureError`] for a missing predicate or argument list,
    /// an empty argument, or a compound argument.
    pub fn to_atom(&self) -> Result<Atom> {
        self.to_atom_in(0)
    }

    pub(crate) fn to_atom_in(&self, rule: usize) -> Result<Atom> {
        if self.predicate.is_empty() {
            return Err(StructureError::MissingPredicate { rule });
        }
        let args = self
            .args
            .as_ref()
            .ok_or_else(|| StructureError::MissingArguments {
                rule,
                predicate: self.predicate.clone(),
            })?;

        let terms = args
            .iter()
            .enumerate()
            .map(|(position, arg)| {
                let term = match arg {
                    ArgSpec::Bare(symbol) => Term::classify(symbol),
                    ArgSpec::Tagged(TaggedArg::Var(name)) => Term::var(name.as_str()),
                    ArgSpec::Tagged(TaggedArg::Const(name)) => Term::constant(name.as_str()),
                    ArgSpec::Compound(inner) => {
                        return Err(StructureError::CompoundArgument {
                            rule,
                            predicate: self.predicate.clone(),
                            argument: inner.predicate.clone(),
                            position,
                        })
                    }
                };
                match &term {
                    Term::Constant(name) if name.is_empty() => Err(StructureError::EmptyArgument {
                        rule,
                        predicate: self.predicate.clone(),
                        position,
                    }),
                    Term::Variable(crate::term::Variable::Named(name)) if name.is_empty() => {
                        Err(StructureError::EmptyArgument {
                            rule,
                            predicate: self.predicate.clone(),
                            position,
                        })
                    }
                    _ => Ok(term),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Atom::new(self.predicate.as_str(), terms))
    }
}

/// A rule as supplied by the caller. No premises makes it a fact.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleSpec {
    /// Conditions, all of which must hold
    #[cfg_attr(feature = "serde", serde(default))]
    pub premises: Vec<AtomSpec>,
    /// The derived atom; missing means an atom with no predicate
    #[cfg_attr(feature = "serde", serde(default))]
    pub conclusion: AtomSpec,
}

impl RuleSpec {
    /// A fact
    #[must_use]
    pub fn fact(conclusion: AtomSpec) -> Self {
        Self {
            premises: Vec::new(),
            conclusion,
        }
    }

    /// A rule with premises
    #[must_use]
    pub fn rule(premises: Vec<AtomSpec>, conclusion: AtomSpec) -> Self {
        Self {
            premises,
            conclusion,
        }
    }
}

/// A complete input document: rules, the queries to ask, and engine settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    /// Facts and rules, in order
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: Vec<RuleSpec>,
    /// Queries, each answered against a fresh copy of the knowledge base
    #[cfg_attr(feature = "serde", serde(default))]
    pub queries: Vec<AtomSpec>,
    /// Engine settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: ChainerConfig,
}
