//! Text syntax for rules and queries.
//!
//! ```text
//! % comments run to the end of the line
//! Parent(John, Mary).
//! Parent(x, y) & Parent(y, z) -> Grandparent(x, z).
//! ?- Grandparent(John, Sue).
//! ```
//!
//! Arguments are bare symbols classified by their first character. An atom
//! written without parentheses has no arguments.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{char, multispace1, satisfy},
    combinator::{all_consuming, map, opt, recognize, value},
    multi::{many0, many0_count, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};

use crate::error::ParseError;
use crate::input::{ArgSpec, AtomSpec, Program, RuleSpec};

enum Clause {
    Rule(RuleSpec),
    Query(AtomSpec),
}

/// Whitespace and `%` comments
fn skip(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            value((), multispace1),
            value((), pair(char('%'), take_till(|c: char| c == '\n'))),
        ))),
    )(input)
}

fn token<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(skip, inner, skip)
}

fn symbol(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_alphanumeric() || c == '_'),
        many0_count(satisfy(|c| c.is_alphanumeric() || c == '_')),
    ))(input)
}

fn argument(input: &str) -> IResult<&str, ArgSpec> {
    map(atom, |inner| match inner.args {
        None => ArgSpec::Bare(inner.predicate),
        Some(_) => ArgSpec::Compound(inner),
    })(input)
}

/// An atom; `args` is `None` when the parentheses are absent
fn atom(input: &str) -> IResult<&str, AtomSpec> {
    map(
        pair(
            token(symbol),
            opt(delimited(
                token(char('(')),
                separated_list0(token(char(',')), argument),
                token(char(')')),
            )),
        ),
        |(predicate, args)| AtomSpec {
            predicate: predicate.to_string(),
            args,
        },
    )(input)
}

/// An atom in clause position, where missing parentheses mean zero arguments
fn clause_atom(input: &str) -> IResult<&str, AtomSpec> {
    map(atom, |mut spec| {
        spec.args.get_or_insert_with(Vec::new);
        spec
    })(input)
}

fn fact(input: &str) -> IResult<&str, RuleSpec> {
    map(clause_atom, RuleSpec::fact)(input)
}

fn rule(input: &str) -> IResult<&str, RuleSpec> {
    map(
        tuple((
            separated_list1(token(char('&')), clause_atom),
            token(tag("->")),
            clause_atom,
        )),
        |(premises, _, conclusion)| RuleSpec::rule(premises, conclusion),
    )(input)
}

fn clause(input: &str) -> IResult<&str, Clause> {
    terminated(
        alt((
            map(preceded(token(tag("?-")), clause_atom), Clause::Query),
            map(rule, Clause::Rule),
            map(fact, Clause::Rule),
        )),
        token(char('.')),
    )(input)
}

/// Parses a whole program.
///
/// Structural checks (compound arguments, arity, groundness of facts) are
/// left to [`build_knowledge_base`](crate::build_knowledge_base).
///
/// # Errors
///
/// Returns a [`ParseError`] locating the first clause that does not parse.
pub fn parse_program(input: &str) -> Result<Program, ParseError> {
    let (_, clauses) = all_consuming(terminated(many0(clause), skip))(input)
        .finish()
        .map_err(|err: nom::error::Error<&str>| {
            ParseError::at(input, input.len() - err.input.len())
        })?;

    let mut program = Program::default();
    for clause in clauses {
        match clause {
            Clause::Rule(rule) => program.rules.push(rule),
            Clause::Query(query) => program.queries.push(query),
        }
    }
    Ok(program)
}

/// Parses a single atom such as `Grandparent(John, who)`
///
/// # Errors
///
/// Returns a [`ParseError`] if the input is not exactly one atom.
pub fn parse_atom(input: &str) -> Result<AtomSpec, ParseError> {
    all_consuming(clause_atom)(input)
        .finish()
        .map(|(_, atom)| atom)
        .map_err(|err: nom::error::Error<&str>| {
            ParseError::at(input, input.len() - err.input.len())
        })
}
