//! # Binder service
//!
//! Capture-avoiding substitution, α-equivalence, and the safely-closing
//! construction of `NaryBinder`/`ArgListBinder` values from open terms
//! (§4.1). Terms are locally-nameless (`term.rs`), which reduces the whole
//! substitution algebra to two primitive tree walks:
//!
//! - `open_body`: replace the binder's own bound variable (`BVar` at the
//!   current depth) with a concrete term. Used by `Binder::substitute`,
//!   `Binder::unbind`/`unbind2`, and `NaryBinder::instantiate`.
//! - `close_body`: replace occurrences of a set of free variables with the
//!   `BVar` indices that bind them. Used by `NaryBinder::bind_many` and
//!   `ArgListBinder::bind_many`.
//!
//! Neither walk ever shifts indices: a term spliced in by `open_body` is
//! self-contained (its own `BVar`s refer to its own binders, not to the
//! position it is spliced into), so no renumbering is needed at the splice
//! point. This is the usual payoff of representing free variables as atoms
//! (`Term::Var`) instead of raw de Bruijn indices.

use crate::{
    ident::{VarId, VarIdSource},
    term::{ArgListBinder, Binder, NaryBinder, Term, TermPtr},
};
use std::collections::HashMap;

////////////////////////////////////////////////////////////////////////////////
// Opening: replacing bound variables with concrete terms.
////////////////////////////////////////////////////////////////////////////////

/// Replaces every `BVar(depth)` in `term` with `repl`, descending under
/// nested binders by incrementing `depth`. `BVar`s below `depth` refer to a
/// binder introduced during the walk itself and are left untouched.
fn open_body(term: &TermPtr, depth: u32, repl: &TermPtr) -> TermPtr {
    match &**term {
        Term::BVar(k) if *k == depth => repl.clone(),
        Term::BVar(_)
        | Term::Var(_)
        | Term::Sort(_)
        | Term::Symbol(_)
        | Term::TPat(_)
        | Term::Wildcard => term.clone(),
        Term::Prod(domain, binder) => Term::prod(
            open_body(domain, depth, repl),
            Binder::new(binder.name_hint.clone(), open_body(&binder.body, depth + 1, repl)),
        ),
        Term::Abst(domain, binder) => Term::abst(
            open_body(domain, depth, repl),
            Binder::new(binder.name_hint.clone(), open_body(&binder.body, depth + 1, repl)),
        ),
        Term::App(left, right) => Term::app(open_body(left, depth, repl), open_body(right, depth, repl)),
        Term::Meta(id, env) => Term::meta(*id, env.iter().map(|e| open_body(e, depth, repl)).collect()),
    }
}

/// Substitutes `binder`'s bound variable with `repl` throughout its body.
/// The single β-style substitution of §4.1.
pub fn substitute(binder: &Binder, repl: &TermPtr) -> TermPtr {
    open_body(&binder.body, 0, repl)
}

/// Opens `binder` into a fresh free variable and the corresponding body.
pub fn unbind(fresh: &VarIdSource, binder: &Binder) -> (VarId, TermPtr) {
    let v = fresh.fresh();
    (v, substitute(binder, &Term::var(v)))
}

/// Opens two binders, sharing a single fresh variable between them, so their
/// bodies become directly comparable by a structural term equality.
pub fn unbind2(fresh: &VarIdSource, b1: &Binder, b2: &Binder) -> (VarId, TermPtr, TermPtr) {
    let v = fresh.fresh();
    let repl = Term::var(v);
    (v, open_body(&b1.body, 0, &repl), open_body(&b2.body, 0, &repl))
}

/// Compares two binders by unbinding them with a shared fresh variable and
/// delegating to `term_eq` on the resulting bodies (§4.1).
pub fn eq_binder<F>(term_eq: F, fresh: &VarIdSource, b1: &Binder, b2: &Binder) -> bool
where
    F: FnOnce(&TermPtr, &TermPtr) -> bool,
{
    let (_, t1, t2) = unbind2(fresh, b1, b2);
    term_eq(&t1, &t2)
}

/// Instantiates a `NaryBinder` of arity `k`, replacing `BVar(i)` for `i < k`
/// with `env[k - 1 - i]` (the telescope convention documented on
/// `NaryBinder::body`), and leaving any other `BVar` (bound by an enclosing
/// binder outside this one) untouched.
fn open_body_multi(term: &TermPtr, depth: u32, arity: u32, env: &[TermPtr]) -> TermPtr {
    match &**term {
        Term::BVar(k) if *k >= depth && *k < depth + arity => {
            let slot = arity - 1 - (*k - depth);
            env[slot as usize].clone()
        }
        Term::BVar(_)
        | Term::Var(_)
        | Term::Sort(_)
        | Term::Symbol(_)
        | Term::TPat(_)
        | Term::Wildcard => term.clone(),
        Term::Prod(domain, binder) => Term::prod(
            open_body_multi(domain, depth, arity, env),
            Binder::new(
                binder.name_hint.clone(),
                open_body_multi(&binder.body, depth + 1, arity, env),
            ),
        ),
        Term::Abst(domain, binder) => Term::abst(
            open_body_multi(domain, depth, arity, env),
            Binder::new(
                binder.name_hint.clone(),
                open_body_multi(&binder.body, depth + 1, arity, env),
            ),
        ),
        Term::App(left, right) => Term::app(
            open_body_multi(left, depth, arity, env),
            open_body_multi(right, depth, arity, env),
        ),
        Term::Meta(id, mvenv) => Term::meta(
            *id,
            mvenv.iter().map(|e| open_body_multi(e, depth, arity, env)).collect(),
        ),
    }
}

impl NaryBinder {
    /// Instantiates this binder's body by substituting every slot with the
    /// corresponding element of `env` (`env.len()` must equal `self.arity`).
    pub fn instantiate(&self, env: &[TermPtr]) -> TermPtr {
        debug_assert_eq!(env.len(), self.arity, "NaryBinder::instantiate: arity mismatch");
        open_body_multi(&self.body, 0, self.arity as u32, env)
    }
}

impl ArgListBinder {
    /// Instantiates every pattern-variable slot of this binder with a
    /// `Term::TPat` tag `0..arity`, yielding the ordered list of pattern
    /// terms the rewrite matcher matches against the evaluator stack (§4.3
    /// step 2).
    pub fn instantiate_with_tags(&self) -> Vec<TermPtr> {
        let env: Vec<TermPtr> = (0..self.arity).map(Term::pattern_tag).collect();
        self.args
            .iter()
            .map(|a| open_body_multi(a, 0, self.arity as u32, &env))
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Closing: replacing free variables with bound ones.
////////////////////////////////////////////////////////////////////////////////

/// Replaces every `Term::Var` found in `mapping` with the `BVar` it is bound
/// to (offset by the current nesting `depth`), leaving any other free
/// variable alone. Returns the rewritten term alongside whether every free
/// variable encountered was in `mapping` (i.e. none escaped).
fn close_body(term: &TermPtr, depth: u32, mapping: &HashMap<VarId, u32>) -> (TermPtr, bool) {
    match &**term {
        Term::Var(id) => match mapping.get(id) {
            Some(&slot) => (Term::bvar(depth + slot), true),
            None => (term.clone(), false),
        },
        Term::BVar(_) | Term::Sort(_) | Term::Symbol(_) | Term::TPat(_) | Term::Wildcard => {
            (term.clone(), true)
        }
        Term::Prod(domain, binder) => {
            let (domain, c1) = close_body(domain, depth, mapping);
            let (body, c2) = close_body(&binder.body, depth + 1, mapping);
            (Term::prod(domain, Binder::new(binder.name_hint.clone(), body)), c1 && c2)
        }
        Term::Abst(domain, binder) => {
            let (domain, c1) = close_body(domain, depth, mapping);
            let (body, c2) = close_body(&binder.body, depth + 1, mapping);
            (Term::abst(domain, Binder::new(binder.name_hint.clone(), body)), c1 && c2)
        }
        Term::App(left, right) => {
            let (left, c1) = close_body(left, depth, mapping);
            let (right, c2) = close_body(right, depth, mapping);
            (Term::app(left, right), c1 && c2)
        }
        Term::Meta(id, env) => {
            let mut closed = true;
            let env = env
                .iter()
                .map(|e| {
                    let (e, c) = close_body(e, depth, mapping);
                    closed &= c;
                    e
                })
                .collect();
            (Term::meta(*id, env), closed)
        }
    }
}

/// Builds the `slot` assignment `vars[i] -> arity - 1 - i`, the telescope
/// convention shared by `NaryBinder` and `ArgListBinder`.
fn slot_mapping(vars: &[VarId]) -> HashMap<VarId, u32> {
    let arity = vars.len() as u32;
    vars.iter()
        .enumerate()
        .map(|(i, &v)| (v, arity - 1 - i as u32))
        .collect()
}

fn default_name_hints(arity: usize) -> Vec<std::rc::Rc<str>> {
    (0..arity).map(|i| format!("x{}", i).into()).collect()
}

impl NaryBinder {
    /// Attempts to build a closed `NaryBinder` abstracting `vars` (in order)
    /// over `body`. `closed` reports whether every free variable of `body`
    /// was among `vars` (§4.1).
    pub fn bind_many(vars: &[VarId], body: TermPtr) -> NaryBinder {
        let mapping = slot_mapping(vars);
        let (body, closed) = close_body(&body, 0, &mapping);
        NaryBinder {
            arity: vars.len(),
            name_hints: default_name_hints(vars.len()),
            body,
            closed,
        }
    }
}

impl ArgListBinder {
    /// Attempts to build a closed `ArgListBinder` abstracting `vars` (in
    /// order) over an ordered argument list.
    pub fn bind_many(vars: &[VarId], args: Vec<TermPtr>) -> (ArgListBinder, bool) {
        let mapping = slot_mapping(vars);
        let mut closed = true;
        let args = args
            .into_iter()
            .map(|a| {
                let (a, c) = close_body(&a, 0, &mapping);
                closed &= c;
                a
            })
            .collect();
        (
            ArgListBinder {
                arity: vars.len(),
                name_hints: default_name_hints(vars.len()),
                args,
            },
            closed,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::Sort;

    #[test]
    fn substitute_replaces_bound_variable() {
        let fresh = VarIdSource::new();
        let (v, body) = unbind(&fresh, &Binder::new("x", Term::bvar(0)));
        assert_eq!(body.split_var(), Some(v));
    }

    #[test]
    fn substitute_skips_inner_binder() {
        // λy. (BVar(1) BVar(0)) — outer binder's variable is BVar(1) once
        // under the inner λ.
        let inner = Binder::new("y", Term::app(Term::bvar(1), Term::bvar(0)));
        let outer_body = Term::abst(Term::type_sort(), inner);
        let outer = Binder::new("x", outer_body);
        let repl = Term::var(42);
        let result = substitute(&outer, &repl);
        let (_, inner_binder) = result.split_abst().unwrap();
        let (l, r) = inner_binder.body.split_app().unwrap();
        assert_eq!(l.split_var(), Some(42));
        assert!(matches!(**r, Term::BVar(0)));
    }

    #[test]
    fn unbind2_shares_one_fresh_variable() {
        let fresh = VarIdSource::new();
        let b1 = Binder::new("x", Term::bvar(0));
        let b2 = Binder::new("x", Term::app(Term::bvar(0), Term::bvar(0)));
        let (v, t1, t2) = unbind2(&fresh, &b1, &b2);
        assert_eq!(t1.split_var(), Some(v));
        let (l, r) = t2.split_app().unwrap();
        assert_eq!(l.split_var(), Some(v));
        assert_eq!(r.split_var(), Some(v));
    }

    #[test]
    fn eq_binder_delegates_to_term_eq() {
        let fresh = VarIdSource::new();
        let b1 = Binder::new("x", Term::bvar(0));
        let b2 = Binder::new("y", Term::bvar(0));
        assert!(eq_binder(|a, b| a.split_var() == b.split_var(), &fresh, &b1, &b2));
    }

    #[test]
    fn nary_binder_bind_many_round_trips() {
        let x: VarId = 10;
        let y: VarId = 11;
        // body = x y, closing over [x, y]
        let body = Term::app(Term::var(x), Term::var(y));
        let binder = NaryBinder::bind_many(&[x, y], body);
        assert!(binder.closed);
        assert_eq!(binder.arity, 2);
        let env = vec![Term::var(100), Term::var(200)];
        let result = binder.instantiate(&env);
        let (l, r) = result.split_app().unwrap();
        assert_eq!(l.split_var(), Some(100));
        assert_eq!(r.split_var(), Some(200));
    }

    #[test]
    fn nary_binder_bind_many_reports_escaping_variable() {
        let x: VarId = 1;
        let y: VarId = 2;
        let body = Term::app(Term::var(x), Term::var(y));
        // Only closing over x: y escapes.
        let binder = NaryBinder::bind_many(&[x], body);
        assert!(!binder.closed);
    }

    #[test]
    fn arg_list_binder_instantiate_with_tags() {
        let x: VarId = 1;
        let y: VarId = 2;
        let args = vec![Term::var(x), Term::app(Term::var(x), Term::var(y))];
        let (binder, closed) = ArgListBinder::bind_many(&[x, y], args);
        assert!(closed);
        let pats = binder.instantiate_with_tags();
        assert_eq!(pats.len(), 2);
        assert!(matches!(*pats[0], Term::TPat(0)));
        let (l, r) = pats[1].split_app().unwrap();
        assert!(matches!(**l, Term::TPat(0)));
        assert!(matches!(**r, Term::TPat(1)));
    }

    #[test]
    fn prod_and_abst_domain_is_also_closed_over() {
        let x: VarId = 5;
        let body = Term::prod(Term::var(x), Binder::new("_", Term::type_sort()));
        let binder = NaryBinder::bind_many(&[x], body);
        assert!(binder.closed);
        let (domain, _) = binder.body.split_prod().unwrap();
        assert!(matches!(**domain, Term::BVar(0)));
    }

    #[test]
    fn sort_is_unaffected_by_closing_or_opening() {
        let fresh = VarIdSource::new();
        let b = Binder::new("x", Term::kind_sort());
        let (_, body) = unbind(&fresh, &b);
        assert!(matches!(*body, Term::Sort(Sort::Kind)));
    }
}
