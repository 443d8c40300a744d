//! Structural unification of terms and atoms.
//!
//! Terms are flat (constants and variables only), so no occurs-check is
//! performed. A variable can only ever be bound to a constant or to another
//! variable, never to a term that contains it. Callers must not introduce
//! nested compound terms; the knowledge base builder rejects them.

use crate::term::{Atom, Substitution, Term, Variable};

/// Values that can be unified under a substitution
pub trait Unify {
    /// Extends `subst` so that `self` and `other` become identical, or returns
    /// `None` if they cannot be made identical
    fn unify_with(&self, other: &Self, subst: Substitution) -> Option<Substitution>;
}

/// Unifies `x` and `y`, threading `subst` through.
///
/// Neither input is modified. On success the returned substitution extends
/// `subst`.
pub fn unify<T: Unify + ?Sized>(x: &T, y: &T, subst: Substitution) -> Option<Substitution> {
    x.unify_with(y, subst)
}

impl Unify for Term {
    fn unify_with(&self, other: &Self, subst: Substitution) -> Option<Substitution> {
        if self == other {
            return Some(subst);
        }
        match (self, other) {
            (Term::Variable(var), _) => unify_variable(var, other, subst),
            (_, Term::Variable(var)) => unify_variable(var, self, subst),
            (Term::Constant(_), Term::Constant(_)) => None,
        }
    }
}

impl Unify for Atom {
    fn unify_with(&self, other: &Self, subst: Substitution) -> Option<Substitution> {
        if self.predicate != other.predicate || self.arity() != other.arity() {
            return None;
        }
        self.args
            .iter()
            .zip(&other.args)
            .try_fold(subst, |subst, (a, b)| a.unify_with(b, subst))
    }
}

/// Binds `var` to `value` unless either side is already bound, in which case
/// the bound value is unified instead
fn unify_variable(var: &Variable, value: &Term, mut subst: Substitution) -> Option<Substitution> {
    if let Some(bound) = subst.get(var).cloned() {
        return bound.unify_with(value, subst);
    }
    if let Term::Variable(other) = value {
        if let Some(bound) = subst.get(other).cloned() {
            return Term::Variable(var.clone()).unify_with(&bound, subst);
        }
    }
    subst.bind(var.clone(), value.clone());
    Some(subst)
}
