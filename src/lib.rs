//! # Hornlog
//!
//! A forward-chaining entailment engine for first-order Horn rules over
//! constants and variables.
//!
//! ## Features
//!
//! - Unification with explicitly tagged variables and constants
//! - Rules renamed apart before every use, so recursive rules can be reused
//! - Saturation to a fixpoint with early exit once the query is proved
//! - Rule documents in JSON (`serde` feature) or a small text syntax (`parsing` feature)
//!
//! The rule language has no function symbols, so the set of derivable facts
//! is finite and saturation always terminates.
//!
//! ## Example
//!
//! ```rust
//! use hornlog::{build_knowledge_base, entails, Atom, AtomSpec, RuleSpec, Term};
//!
//! let kb = build_knowledge_base(&[
//!     RuleSpec::fact(AtomSpec::new("Parent", ["John", "Mary"])),
//!     RuleSpec::fact(AtomSpec::new("Parent", ["Mary", "Sue"])),
//!     RuleSpec::rule(
//!         vec![AtomSpec::new("Parent", ["x", "y"]), AtomSpec::new("Parent", ["y", "z"])],
//!         AtomSpec::new("Grandparent", ["x", "z"]),
//!     ),
//! ])
//! .unwrap();
//!
//! let query = Atom::new("Grandparent", [Term::constant("John"), Term::constant("Sue")]);
//! assert!(entails(&kb, &query).proved);
//! ```

/// Engine settings.
pub mod config;
/// Saturation engine.
pub mod engine;
/// Error types.
pub mod error;
pub mod input;
/// Knowledge base construction and checks.
pub mod knowledge_base;
/// Premise matching and the fact index.
pub mod matcher;
#[cfg(feature = "parsing")]
pub mod parser;
/// Variable renaming.
pub mod standardize;
/// Terms, atoms, rules and substitutions.
pub mod term;
pub mod unify;

pub use config::ChainerConfig;
pub use engine::{entails, entails_with, EntailmentResult, ForwardChainer, Status};
pub use error::{ParseError, StructureError};
pub use input::{ArgSpec, AtomSpec, Program, RuleSpec, TaggedArg};
pub use knowledge_base::{build_knowledge_base, KnowledgeBase};
pub use matcher::{match_rule, FactStore};
#[cfg(feature = "parsing")]
pub use parser::{parse_atom, parse_program};
pub use standardize::standardize;
pub use term::{Atom, Rule, Substitution, Term, Variable};
pub use unify::{unify, Unify};
