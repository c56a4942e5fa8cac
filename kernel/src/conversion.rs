//! # Conversion (C6) — equality modulo β and rewriting
//!
//! `eq_modulo` (§4.4) interleaves the cheap syntactic fast path (`eq_syntax`)
//! with weak-head expansion (`evaluator::whnf_stk`), over a worklist of term
//! pairs rather than a naive recursive descent, so that stack
//! synchronization (step 3) and constraint postponement (step 4) apply
//! uniformly at every depth, not just the top pair.

use crate::{
    binder, engine::Kernel, evaluator, signature::Signature, term::Term, term::TermPtr, unifier,
};
use log::trace;
use std::rc::Rc;

/// Unfolds `t` if it is a solved metavariable, repeating until it is not
/// (a solution may itself be, after instantiation, another solved meta).
fn unfold_meta_shallow(kernel: &Kernel, t: &TermPtr) -> TermPtr {
    if let Term::Meta(id, env) = &**t {
        if let Some(solution) = kernel.meta_solution(*id) {
            let unfolded = solution.instantiate(env);
            return unfold_meta_shallow(kernel, &unfolded);
        }
    }
    t.clone()
}

/// Structural α-equivalence with per-step metavariable unfolding, and
/// opportunistic unification when one side is an unsolved metavariable
/// (§4.4). This is the cheap fast path `eq_modulo` tries before resorting to
/// weak-head expansion.
pub fn eq_syntax(kernel: &Kernel, sig: &Signature, a: &TermPtr, b: &TermPtr) -> bool {
    let a = unfold_meta_shallow(kernel, a);
    let b = unfold_meta_shallow(kernel, b);
    if Rc::ptr_eq(&a, &b) {
        return true;
    }
    match (&*a, &*b) {
        (Term::Var(x), Term::Var(y)) => x == y,
        (Term::BVar(x), Term::BVar(y)) => x == y,
        (Term::Sort(x), Term::Sort(y)) => x == y,
        (Term::Symbol(x), Term::Symbol(y)) => x == y,
        (Term::Wildcard, Term::Wildcard) => true,
        (Term::TPat(x), Term::TPat(y)) => x == y,
        (Term::App(f1, x1), Term::App(f2, x2)) => {
            eq_syntax(kernel, sig, f1, f2) && eq_syntax(kernel, sig, x1, x2)
        }
        (Term::Prod(d1, bd1), Term::Prod(d2, bd2)) => {
            eq_syntax(kernel, sig, d1, d2)
                && binder::eq_binder(|x, y| eq_syntax(kernel, sig, x, y), kernel.var_ids(), bd1, bd2)
        }
        (Term::Abst(d1, bd1), Term::Abst(d2, bd2)) => {
            eq_syntax(kernel, sig, d1, d2)
                && binder::eq_binder(|x, y| eq_syntax(kernel, sig, x, y), kernel.var_ids(), bd1, bd2)
        }
        (Term::Meta(id1, env1), Term::Meta(id2, env2)) if id1 == id2 && env1.len() == env2.len() => {
            env1.iter().zip(env2.iter()).all(|(x, y)| eq_syntax(kernel, sig, x, y))
        }
        (Term::Meta(id, env), _) => unifier::unify(kernel, *id, env, &b),
        (_, Term::Meta(id, env)) => unifier::unify(kernel, *id, env, &a),
        _ => false,
    }
}

/// Decides equality of `a` and `b` modulo β-reduction and `sig`'s rewrite
/// rules (§4.4). Reads `kernel`'s constraint slot (set up by
/// `Kernel::with_constraints`) at every worklist pair, not just the
/// outermost one (§9's resolved open question).
pub fn eq_modulo(kernel: &Kernel, sig: &Signature, a: &TermPtr, b: &TermPtr) -> bool {
    let mut worklist: Vec<(TermPtr, TermPtr)> = vec![(a.clone(), b.clone())];
    while let Some((x, y)) = worklist.pop() {
        // Step 1: cheap fast path.
        if eq_syntax(kernel, sig, &x, &y) {
            continue;
        }
        // Step 2: weak-head expansion of both sides.
        let (head_a, stack_a) = evaluator::whnf_stk(kernel, sig, x);
        let (head_b, stack_b) = evaluator::whnf_stk(kernel, sig, y);
        trace!(target: "kernel::conversion", "Comparing whnf heads (stacks of length {} / {}).", stack_a.len(), stack_b.len());

        // Step 3: stack synchronization.
        let (cmp_a, cmp_b) = if stack_a.len() == stack_b.len() {
            for (ca, cb) in stack_a.iter().zip(stack_b.iter()) {
                worklist.push((ca.get(), cb.get()));
            }
            (head_a, head_b)
        } else {
            (evaluator::to_term(head_a, stack_a), evaluator::to_term(head_b, stack_b))
        };

        // Step 4: head comparison.
        match (&*cmp_a, &*cmp_b) {
            (Term::Abst(d1, bd1), Term::Abst(d2, bd2)) | (Term::Prod(d1, bd1), Term::Prod(d2, bd2)) => {
                worklist.push((d1.clone(), d2.clone()));
                let (_, t1, t2) = binder::unbind2(kernel.var_ids(), bd1, bd2);
                worklist.push((t1, t2));
            }
            _ => {
                if eq_syntax(kernel, sig, &cmp_a, &cmp_b) {
                    // already equal, nothing to enqueue
                } else if kernel.add_constraint(cmp_a.clone(), cmp_b.clone()) {
                    trace!(target: "kernel::conversion", "Deferred mismatched heads as a constraint.");
                } else {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::Kernel;
    use crate::signature::Signature;
    use crate::term::Binder;

    #[test]
    fn reflexive_on_a_closed_term() {
        let kernel = Kernel::new();
        let sig = Signature::new();
        let t = Term::app(Term::type_sort(), Term::kind_sort());
        assert!(eq_modulo(&kernel, &sig, &t, &t));
    }

    #[test]
    fn alpha_equivalence_ignores_name_hints() {
        let kernel = Kernel::new();
        let sig = Signature::new();
        let a = Term::abst(Term::type_sort(), Binder::new("x", Term::bvar(0)));
        let b = Term::abst(Term::type_sort(), Binder::new("y", Term::bvar(0)));
        assert!(eq_modulo(&kernel, &sig, &a, &b));
    }

    #[test]
    fn beta_equal_terms_are_eq_modulo() {
        let kernel = Kernel::new();
        let sig = Signature::new();
        let p = Term::var(7);
        let lhs = Term::app(
            Term::abst(Term::type_sort(), Binder::new("x", Term::bvar(0))),
            p.clone(),
        );
        assert!(eq_modulo(&kernel, &sig, &lhs, &p));
    }

    #[test]
    fn distinct_static_symbols_are_not_equal() {
        let kernel = Kernel::new();
        let mut sig = Signature::new();
        let a = sig.declare_static("m", "a", Term::type_sort());
        let b = sig.declare_static("m", "b", Term::type_sort());
        assert!(!eq_modulo(&kernel, &sig, &Term::symbol(a), &Term::symbol(b)));
    }

    #[test]
    fn constraint_mode_defers_instead_of_failing() {
        let kernel = Kernel::new();
        let mut sig = Signature::new();
        let a = sig.declare_static("m", "a", Term::type_sort());
        let b = sig.declare_static("m", "b", Term::type_sort());
        let (result, constraints) = kernel.eq_modulo_constr(&sig, &Term::symbol(a), &Term::symbol(b));
        assert!(result);
        assert_eq!(constraints.len(), 1);
    }

    #[test]
    fn without_constraint_mode_mismatched_heads_fail() {
        let kernel = Kernel::new();
        let mut sig = Signature::new();
        let a = sig.declare_static("m", "a", Term::type_sort());
        let b = sig.declare_static("m", "b", Term::type_sort());
        assert!(!kernel.eq_modulo(&sig, &Term::symbol(a), &Term::symbol(b)));
    }
}
