//! # Terms
//!
//! The term grammar of the λΠ-modulo calculus:
//!
//! ```text
//!     s,t ::= x | Type | Kind | c | Πx:A. B | λx:A. t | s t | ?u[e] | #i | _
//! ```
//!
//! Terms are represented locally-nameless: a bound variable still under its
//! binder is a de Bruijn index (`BVar`), while a variable that has been
//! "opened" (via `Binder::unbind`) becomes a free identifier (`Var`) unique to
//! the evaluation that opened it. This sidesteps the capture problem that a
//! name-carrying representation would otherwise hand to the binder service
//! (`binder.rs`) to solve case-by-case.
//!
//! As with any term representation built from recursive node types, the
//! majority of term-*processing* (substitution, α-equivalence, free-variable
//! computation) is not implemented in this module but in `binder.rs`, which
//! operates on the shapes declared here. This module only builds and
//! decomposes terms.

use crate::{
    handle::{tags, Handle},
    ident::VarId,
};
use std::rc::Rc;

////////////////////////////////////////////////////////////////////////////////
// Aliases.
////////////////////////////////////////////////////////////////////////////////

/// A reference-counted pointer to a term. Terms are immutable by contract
/// (see `Term`'s own documentation for the narrow exceptions), so sharing a
/// `TermPtr` between multiple parents is always safe.
pub type TermPtr = Rc<Term>;

/// A handle identifying a registered symbol in a `Signature`.
pub type SymbolId = Handle<tags::Symbol>;

/// A handle identifying a metavariable owned by a `Kernel`.
pub type MetaId = Handle<tags::Meta>;

////////////////////////////////////////////////////////////////////////////////
// Sorts.
////////////////////////////////////////////////////////////////////////////////

/// The two sorts of the calculus: the universe of types, and the super-sort
/// classifying `Type` itself.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Sort {
    /// The universe of ordinary types.
    Type,
    /// The super-sort classifying `Type`.
    Kind,
}

////////////////////////////////////////////////////////////////////////////////
// Binders.
////////////////////////////////////////////////////////////////////////////////

/// A single-variable binder, underlying `Term::Prod` and `Term::Abst`. The
/// body is locally-nameless: `BVar(0)` inside `body` refers to this binder's
/// variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Binder {
    /// An advisory name used only for printing; α-equivalence ignores it.
    pub name_hint: Rc<str>,
    /// The body term, with `BVar(0)` denoting this binder's variable.
    pub body: TermPtr,
}

impl Binder {
    /// Builds a binder directly from a name hint and a body already expressed
    /// relative to this binder (i.e. already closed over its bound
    /// variable). Used when reifying a term built by `binder::close`.
    pub fn new<T>(name_hint: T, body: TermPtr) -> Self
    where
        T: Into<Rc<str>>,
    {
        Binder {
            name_hint: name_hint.into(),
            body,
        }
    }

    /// A single binder is always closed: building one never requires the
    /// bound variable to actually occur in the body (a constant function
    /// `λx:A. c` is perfectly well-formed), so there is nothing to fail to
    /// capture. This accessor exists so that `Binder` uniformly exposes the
    /// `name_hint`/`is_closed` contract §4.1 describes for "each binder",
    /// mirroring `NaryBinder::is_closed`, where the flag is not vacuous.
    #[inline]
    pub fn is_closed(&self) -> bool {
        true
    }
}

/// A multiple-variable binder whose body is a single term, used for a rule's
/// `rhs` and for a metavariable's solution (§3.2, §3.3).
#[derive(Clone, Debug, PartialEq)]
pub struct NaryBinder {
    /// The number of variables this binder abstracts over.
    pub arity: usize,
    /// Advisory per-slot name hints, `name_hints.len() == arity`.
    pub name_hints: Vec<Rc<str>>,
    /// The body, with `BVar(k)` for `k < arity` denoting slot `arity - 1 - k`
    /// (the outermost-bound variable carries the highest index, the
    /// standard telescope convention).
    pub body: TermPtr,
    /// Whether every free variable abstracted over by `bind_many` was
    /// actually captured, i.e. the body has no free `Var` left outside the
    /// bound set. See `binder::bind_many`.
    pub closed: bool,
}

/// A multiple-variable binder whose body is an *ordered list* of terms, used
/// only for a rule's `lhs` (§3.2): unbinding it yields the argument list the
/// defined symbol's head expects.
#[derive(Clone, Debug)]
pub struct ArgListBinder {
    /// The number of pattern variables this binder abstracts over. This is
    /// *not* the same quantity as the defined symbol's argument-list length
    /// (`args.len()`): a nested pattern like `imp p q` binds two pattern
    /// variables under a single argument. The argument-list length — the
    /// evaluator-stack depth a rule needs to fire — is tracked separately,
    /// on `symbol::Rule::arity` (§3.2).
    pub arity: usize,
    /// Advisory per-slot name hints, `name_hints.len() == arity`.
    pub name_hints: Vec<Rc<str>>,
    /// The argument-pattern list, each element referencing `BVar(k)` for
    /// `k < arity` under the same telescope convention as `NaryBinder`.
    pub args: Vec<TermPtr>,
}

////////////////////////////////////////////////////////////////////////////////
// Terms, proper.
////////////////////////////////////////////////////////////////////////////////

/// Terms of the λΠ-modulo calculus.
///
/// Terms are immutable by contract, with two narrowly-scoped exceptions
/// (§4.2, §4.4): argument cells (`evaluator::Cell`) memoize a term's whnf,
/// and `conversion::eq_syntax` may rewrite a parent's cached child pointer
/// after unfolding it. Neither exception changes a term's meaning, only its
/// representation.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// A free (opened) variable, identified by the identifier `unbind`
    /// allocated for it.
    Var(VarId),
    /// A bound variable still under its binder, as a de Bruijn index: `0`
    /// refers to the nearest enclosing binder.
    BVar(u32),
    /// A sort (`Type` or `Kind`).
    Sort(Sort),
    /// A reference to a registered symbol (static or definable).
    Symbol(SymbolId),
    /// A dependent product `Πx:A. B`: the domain term and the binder of `B`.
    Prod(TermPtr, Binder),
    /// An abstraction `λx:A. t`: the domain term and the binder of `t`. The
    /// domain is retained even though β-reduction ignores it, since it
    /// participates in equality (§3.1).
    Abst(TermPtr, Binder),
    /// An application of a function term to an argument term.
    App(TermPtr, TermPtr),
    /// A metavariable instance: a handle paired with the environment (an
    /// ordered sequence of terms) that will close its eventual solution.
    Meta(MetaId, Vec<TermPtr>),
    /// A pattern tag, a small non-negative integer standing in for a
    /// yet-to-be-bound pattern variable. Appears only in terms produced by
    /// `ArgListBinder::instantiate_with_tags` during matching (§4.3); never
    /// in an ambient program term.
    TPat(usize),
    /// A wildcard, matching anything without recording a binding.
    Wildcard,
}

impl Term {
    /// Builds a free variable term.
    #[inline]
    pub fn var(id: VarId) -> TermPtr {
        Rc::new(Term::Var(id))
    }

    /// Builds a bound (de Bruijn) variable term.
    #[inline]
    pub fn bvar(index: u32) -> TermPtr {
        Rc::new(Term::BVar(index))
    }

    /// Builds the `Type` sort.
    #[inline]
    pub fn type_sort() -> TermPtr {
        Rc::new(Term::Sort(Sort::Type))
    }

    /// Builds the `Kind` sort.
    #[inline]
    pub fn kind_sort() -> TermPtr {
        Rc::new(Term::Sort(Sort::Kind))
    }

    /// Builds a reference to a registered symbol.
    #[inline]
    pub fn symbol(id: SymbolId) -> TermPtr {
        Rc::new(Term::Symbol(id))
    }

    /// Builds a dependent product `Πx:domain. binder.body`.
    #[inline]
    pub fn prod(domain: TermPtr, binder: Binder) -> TermPtr {
        Rc::new(Term::Prod(domain, binder))
    }

    /// Builds an abstraction `λx:domain. binder.body`.
    #[inline]
    pub fn abst(domain: TermPtr, binder: Binder) -> TermPtr {
        Rc::new(Term::Abst(domain, binder))
    }

    /// Builds an application of `left` to `right`. Does not check that
    /// `left` has functional type; that is assumed to be done upstream by
    /// the typechecker collaborator.
    #[inline]
    pub fn app(left: TermPtr, right: TermPtr) -> TermPtr {
        Rc::new(Term::App(left, right))
    }

    /// Builds a left-associated application of `head` to `args`, in order.
    pub fn apply_all(head: TermPtr, args: Vec<TermPtr>) -> TermPtr {
        args.into_iter().fold(head, Term::app)
    }

    /// Builds a metavariable instance.
    #[inline]
    pub fn meta(id: MetaId, env: Vec<TermPtr>) -> TermPtr {
        Rc::new(Term::Meta(id, env))
    }

    /// Builds a pattern tag.
    #[inline]
    pub fn pattern_tag(index: usize) -> TermPtr {
        Rc::new(Term::TPat(index))
    }

    /// Builds a wildcard.
    #[inline]
    pub fn wildcard() -> TermPtr {
        Rc::new(Term::Wildcard)
    }

    /// Returns `Some(id)` iff the term is a free variable.
    pub fn split_var(&self) -> Option<VarId> {
        if let Term::Var(id) = self {
            Some(*id)
        } else {
            None
        }
    }

    /// Returns `Some((left, right))` iff the term is an application.
    pub fn split_app(&self) -> Option<(&TermPtr, &TermPtr)> {
        if let Term::App(left, right) = self {
            Some((left, right))
        } else {
            None
        }
    }

    /// Returns `Some((domain, binder))` iff the term is a dependent product.
    pub fn split_prod(&self) -> Option<(&TermPtr, &Binder)> {
        if let Term::Prod(domain, binder) = self {
            Some((domain, binder))
        } else {
            None
        }
    }

    /// Returns `Some((domain, binder))` iff the term is an abstraction.
    pub fn split_abst(&self) -> Option<(&TermPtr, &Binder)> {
        if let Term::Abst(domain, binder) = self {
            Some((domain, binder))
        } else {
            None
        }
    }

    /// Returns `Some((id, env))` iff the term is a metavariable instance.
    pub fn split_meta(&self) -> Option<(MetaId, &[TermPtr])> {
        if let Term::Meta(id, env) = self {
            Some((*id, env.as_slice()))
        } else {
            None
        }
    }

    /// Returns `Some(id)` iff the term is a symbol reference.
    pub fn split_symbol(&self) -> Option<SymbolId> {
        if let Term::Symbol(id) = self {
            Some(*id)
        } else {
            None
        }
    }

    /// Returns `true` iff the term is a free variable.
    #[inline]
    pub fn is_var(&self) -> bool {
        self.split_var().is_some()
    }

    /// Returns `true` iff the term is an application.
    #[inline]
    pub fn is_app(&self) -> bool {
        self.split_app().is_some()
    }

    /// Returns `true` iff the term is a metavariable instance.
    #[inline]
    pub fn is_meta(&self) -> bool {
        self.split_meta().is_some()
    }

    /// Returns `true` iff the term is a wildcard.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Term::Wildcard)
    }

    /// Returns `true` iff the term is a pattern tag.
    #[inline]
    pub fn is_pattern_tag(&self) -> bool {
        matches!(self, Term::TPat(_))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn term_test0() {
        let t = Term::var(3);
        assert_eq!(t.split_var(), Some(3));
        assert!(t.is_var());
    }

    #[test]
    pub fn term_test1() {
        let f = Term::var(0);
        let x = Term::var(1);
        let app = Term::app(f.clone(), x.clone());
        let (l, r) = app.split_app().unwrap();
        assert!(Rc::ptr_eq(l, &f));
        assert!(Rc::ptr_eq(r, &x));
    }

    #[test]
    pub fn term_test2() {
        let head = Term::var(0);
        let args = vec![Term::var(1), Term::var(2), Term::var(3)];
        let applied = Term::apply_all(head, args);
        // ((head 1) 2) 3
        let (outer_l, outer_r) = applied.split_app().unwrap();
        assert_eq!(**outer_r, Term::Var(3));
        let (mid_l, mid_r) = outer_l.split_app().unwrap();
        assert_eq!(**mid_r, Term::Var(2));
        let (inner_l, inner_r) = mid_l.split_app().unwrap();
        assert_eq!(**inner_r, Term::Var(1));
        assert_eq!(**inner_l, Term::Var(0));
    }

    #[test]
    pub fn term_test3() {
        let binder = Binder::new("x", Term::bvar(0));
        assert!(binder.is_closed());
        assert_eq!(&*binder.name_hint, "x");
    }
}
