use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

/// Argument storage for an atom. Most predicates are binary or smaller.
pub type Args = SmallVec<[Term; 4]>;

/// A logic variable
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Variable {
    /// A variable named by the caller (e.g., `x`, `y`)
    Named(String),
    /// A variable introduced by standardization, numbered from the engine's counter
    Fresh(usize),
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Named(name) => f.write_str(name),
            Variable::Fresh(n) => write!(f, "v{n}"),
        }
    }
}

/// A term is either a constant or a variable. There are no function symbols.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A concrete symbol (e.g., `"John"`, `"Mary"`)
    Constant(String),
    /// A variable that can be unified with any term
    Variable(Variable),
}

impl Term {
    /// Creates a constant term
    #[must_use]
    pub fn constant(name: impl Into<String>) -> Self {
        Term::Constant(name.into())
    }

    /// Creates a caller-named variable term
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(Variable::Named(name.into()))
    }

    /// Classifies a bare symbol by the lexical convention: a lowercase or `_`
    /// first character makes a variable, anything else is a constant.
    ///
    /// `_` counts as a variable start, unlike a strictly lowercase-only rule
    /// where `_x` would be a constant. Use [`Term::constant`] (or a tagged
    /// argument in input records) to get a constant spelled with a leading `_`.
    #[must_use]
    pub fn classify(symbol: &str) -> Self {
        match symbol.chars().next() {
            Some(c) if c.is_lowercase() || c == '_' => Term::var(symbol),
            _ => Term::constant(symbol),
        }
    }

    /// Returns true for constants
    #[must_use]
    pub fn is_ground(&self) -> bool {
        matches!(self, Term::Constant(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(name) => f.write_str(name),
            Term::Variable(var) => write!(f, "{var}"),
        }
    }
}

/// A predicate applied to terms (e.g., `Parent(John, x)`)
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Atom {
    /// The name of the predicate (e.g., `"Parent"`)
    pub predicate: String,
    /// The arguments of the predicate, in order
    pub args: Args,
}

impl Atom {
    /// Creates an atom from a predicate name and its arguments
    pub fn new(predicate: impl Into<String>, args: impl IntoIterator<Item = Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Number of arguments
    #[must_use]
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Returns true when no argument is a variable
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    /// Iterates over the variables of the atom, repeats included
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.args.iter().filter_map(|term| match term {
            Term::Variable(var) => Some(var),
            Term::Constant(_) => None,
        })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.predicate)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// A Horn rule (e.g., `Parent(x, y) & Parent(y, z) -> Grandparent(x, z)`).
/// A rule with no premises is a fact.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Rule {
    /// The conditions that must all hold
    pub premises: Vec<Atom>,
    /// The atom derived when the premises hold
    pub conclusion: Atom,
}

impl Rule {
    /// Creates a rule
    #[must_use]
    pub fn new(premises: Vec<Atom>, conclusion: Atom) -> Self {
        Self {
            premises,
            conclusion,
        }
    }

    /// Creates a fact, i.e. a rule without premises
    #[must_use]
    pub fn fact(conclusion: Atom) -> Self {
        Self::new(Vec::new(), conclusion)
    }

    /// Returns true if the rule has no premises
    #[must_use]
    pub fn is_fact(&self) -> bool {
        self.premises.is_empty()
    }

    /// Iterates over every atom of the rule, premises first
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.premises.iter().chain(std::iter::once(&self.conclusion))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, premise) in self.premises.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{premise}")?;
        }
        if !self.premises.is_empty() {
            f.write_str(" -> ")?;
        }
        write!(f, "{}", self.conclusion)
    }
}

/// A consistent set of variable bindings, kept in binding order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: IndexMap<Variable, Term>,
}

impl Substitution {
    /// Creates an empty substitution
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a variable, replacing any previous binding
    pub fn bind(&mut self, var: Variable, value: Term) {
        self.bindings.insert(var, value);
    }

    /// Returns the direct binding of a variable
    #[must_use]
    pub fn get(&self, var: &Variable) -> Option<&Term> {
        self.bindings.get(var)
    }

    /// Number of bound variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over the bindings in the order they were made
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.bindings.iter()
    }

    /// Follows variable-to-variable bindings until reaching a constant or an
    /// unbound variable.
    ///
    /// Bindings never form a cycle because the unifier resolves both sides
    /// before binding, so the walk is bounded by the number of bindings.
    #[must_use]
    pub fn resolve(&self, term: &Term) -> Term {
        let mut current = term;
        for _ in 0..=self.bindings.len() {
            match current {
                Term::Variable(var) => match self.bindings.get(var) {
                    Some(next) => current = next,
                    None => break,
                },
                Term::Constant(_) => break,
            }
        }
        current.clone()
    }

    /// Instantiates an atom under this substitution
    #[must_use]
    pub fn apply(&self, atom: &Atom) -> Atom {
        Atom {
            predicate: atom.predicate.clone(),
            args: atom.args.iter().map(|arg| self.resolve(arg)).collect(),
        }
    }

    /// Checks that every variable bound in `earlier` resolves to the same
    /// value here
    #[must_use]
    pub fn is_consistent_with(&self, earlier: &Substitution) -> bool {
        earlier.bindings.iter().all(|(var, value)| {
            if self.bindings.contains_key(var) {
                self.resolve(&Term::Variable(var.clone())) == earlier.resolve(value)
            } else {
                true
            }
        })
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (var, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{var}/{value}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<(Variable, Term)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (Variable, Term)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}
