//! Error types for hornlog

use thiserror::Error;

/// A caller-supplied rule or atom that cannot enter a knowledge base.
///
/// `rule` is the position of the offending rule in the caller's input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// An atom without a predicate name
    #[error("rule {rule}: atom has no predicate")]
    MissingPredicate {
        /// Index of the offending rule
        rule: usize,
    },

    /// An atom without an argument list
    #[error("rule {rule}: atom `{predicate}` has no argument list")]
    MissingArguments {
        /// Index of the offending rule
        rule: usize,
        /// Predicate of the offending atom
        predicate: String,
    },

    /// An argument that is the empty string
    #[error("rule {rule}: atom `{predicate}` has an empty argument at position {position}")]
    EmptyArgument {
        /// Index of the offending rule
        rule: usize,
        /// Predicate of the offending atom
        predicate: String,
        /// Argument position
        position: usize,
    },

    /// An argument that is itself a predicate application
    #[error("rule {rule}: atom `{predicate}` has a compound argument `{argument}` at position {position}")]
    CompoundArgument {
        /// Index of the offending rule
        rule: usize,
        /// Predicate of the offending atom
        predicate: String,
        /// Predicate of the nested atom
        argument: String,
        /// Argument position
        position: usize,
    },

    /// The same predicate used with two different arities inside one rule
    #[error("rule {rule}: predicate `{predicate}` used with arity {expected} and {found}")]
    ArityMismatch {
        /// Index of the offending rule
        rule: usize,
        /// The predicate
        predicate: String,
        /// Arity of the first use
        expected: usize,
        /// Arity of the conflicting use
        found: usize,
    },

    /// A fact containing a variable
    #[error("rule {rule}: fact `{predicate}` contains variable `{variable}`")]
    NonGroundFact {
        /// Index of the offending rule
        rule: usize,
        /// Predicate of the fact
        predicate: String,
        /// The variable
        variable: String,
    },

    /// A conclusion variable that no premise binds
    #[error("rule {rule}: variable `{variable}` appears in conclusion `{predicate}` but not in any premise")]
    UnboundHeadVariable {
        /// Index of the offending rule
        rule: usize,
        /// Predicate of the conclusion
        predicate: String,
        /// The variable
        variable: String,
    },
}

/// Failure to read the text rule syntax
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at line {line}, column {column}: unexpected `{found}`")]
pub struct ParseError {
    /// Byte offset of the first unparsed character
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, in characters
    pub column: usize,
    /// The rest of the offending line
    pub found: String,
}

impl ParseError {
    /// Locates `offset` within `input`. An offset past the end or inside a
    /// character is moved back to the nearest character boundary.
    #[must_use]
    pub fn at(input: &str, offset: usize) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = input[line_start..offset].chars().count() + 1;
        let found = input[offset..].lines().next().unwrap_or_default().trim_end();
        let found = if found.is_empty() { "end of input" } else { found };
        Self {
            offset,
            line,
            column,
            found: found.to_string(),
        }
    }
}

/// Convenience alias for structural checks
pub type Result<T> = std::result::Result<T, StructureError>;
