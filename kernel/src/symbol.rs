//! # Symbols and rewrite rules
//!
//! A `Symbol` is either *static* (an opaque constant, never rewritten) or
//! *definable* (carries an ordered, append-only list of `Rule`s fired by the
//! evaluator's Rewrite transition, §4.2). §3.2.

use crate::term::{ArgListBinder, NaryBinder, TermPtr};
use std::cell::RefCell;
use std::rc::Rc;

/// A rewrite rule `lhs --> rhs` (§3.2). `lhs` unbinds into the argument list
/// the defined symbol's head expects; `rhs` unbinds (with the same
/// substitution) into the replacement term.
///
/// `arity` and `pattern_count` name two distinct quantities that the
/// `ArgListBinder`'s own `arity` field conflates (see its doc comment):
/// `arity` is `lhs.args.len()`, the length of the argument list and thus the
/// minimum evaluator-stack depth required to attempt firing this rule;
/// `pattern_count` is the number of pattern variables the LHS binds, i.e.
/// `lhs.arity`. These differ whenever a pattern nests more than one variable
/// under a single argument — e.g. `proof (imp p q) --> proof p -> proof q`
/// has `arity == 1` (one argument, `imp p q`) but `pattern_count == 2` (`p`
/// and `q`).
#[derive(Clone, Debug)]
pub struct Rule {
    pub lhs: ArgListBinder,
    pub rhs: NaryBinder,
    pub arity: usize,
    pub pattern_count: usize,
}

impl Rule {
    /// Builds a rule from an already-closed LHS/RHS pair of matching
    /// pattern-variable count.
    pub fn new(lhs: ArgListBinder, rhs: NaryBinder) -> Self {
        debug_assert_eq!(lhs.arity, rhs.arity, "Rule::new: lhs/rhs pattern-variable count mismatch");
        let pattern_count = lhs.arity;
        let arity = lhs.args.len();
        Rule { lhs, rhs, arity, pattern_count }
    }
}

/// What kind of symbol a `SymbolInfo` describes.
#[derive(Debug)]
pub enum SymbolKind {
    /// An opaque constant: referenced, but never rewritten.
    Static,
    /// A definable symbol with its (append-only, declaration-ordered) list
    /// of rewrite rules.
    Definable { rules: RefCell<Vec<Rc<Rule>>> },
}

impl SymbolKind {
    /// `true` iff this is a `Definable` symbol.
    pub fn is_definable(&self) -> bool {
        matches!(self, SymbolKind::Definable { .. })
    }
}

/// The record a `Signature` stores for each registered symbol: `{name, type,
/// origin-module}` plus, for definable symbols, the rule list (§3.2).
#[derive(Debug)]
pub struct SymbolInfo {
    pub name: Rc<str>,
    pub module: Rc<str>,
    pub ty: TermPtr,
    pub kind: SymbolKind,
}

impl SymbolInfo {
    /// Appends `rule` to this symbol's rule list, in declaration order.
    /// Only meaningful for `Definable` symbols; a `Static` symbol has
    /// nothing to append to, which is a caller error (checked, not panicked,
    /// by `Signature::add_rule` via the `SymbolId` the caller already holds
    /// from a `declare_definable` call).
    pub fn push_rule(&self, rule: Rule) -> bool {
        match &self.kind {
            SymbolKind::Definable { rules } => {
                rules.borrow_mut().push(Rc::new(rule));
                true
            }
            SymbolKind::Static => false,
        }
    }

    /// The rule list, in declaration order, or an empty slice for a static
    /// symbol.
    pub fn rules(&self) -> Vec<Rc<Rule>> {
        match &self.kind {
            SymbolKind::Definable { rules } => rules.borrow().clone(),
            SymbolKind::Static => Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ident::VarId;
    use crate::signature::Signature;
    use crate::term::{Binder, Term};

    #[test]
    fn arity_is_the_argument_list_length_not_the_pattern_variable_count() {
        // proof (imp p q) --> proof p -> proof q: one argument, `imp p q`,
        // nesting two pattern variables.
        let mut sig = Signature::new();
        let imp = sig.declare_static("hol", "imp", Term::type_sort());
        let proof = sig.declare_definable("hol", "proof", Term::type_sort());

        let p: VarId = 0;
        let q: VarId = 1;
        let lhs_args = vec![Term::app(Term::app(Term::symbol(imp), Term::var(p)), Term::var(q))];
        let (lhs, closed) = ArgListBinder::bind_many(&[p, q], lhs_args);
        assert!(closed);
        let rhs_body = Term::prod(
            Term::app(Term::symbol(proof), Term::var(p)),
            Binder::new("_", Term::app(Term::symbol(proof), Term::var(q))),
        );
        let rhs = NaryBinder::bind_many(&[p, q], rhs_body);
        let rule = Rule::new(lhs, rhs);

        assert_eq!(rule.arity, 1, "one argument (imp p q) consumed from the stack");
        assert_eq!(rule.pattern_count, 2, "two pattern variables (p, q) bound by that argument");
    }
}
