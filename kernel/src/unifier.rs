//! # Unifier (C7)
//!
//! First-order unification of a metavariable against a term, parameterized
//! by the metavariable's local environment (§4.5): occurs-check, then a
//! Miller-pattern scope check via `binder::bind_many`. No postponement logic
//! lives here — that is `Kernel::with_constraints`/`add_constraint`'s job;
//! `unify` only ever returns a decisive `true`/`false`.

use crate::{
    binder,
    engine::Kernel,
    kernel_panic::META_ALREADY_SOLVED,
    term::{MetaId, NaryBinder, Term, TermPtr},
};
use log::trace;

/// Scans `t` for an occurrence of metavariable `meta`, unfolding any other
/// solved metavariable encountered along the way. Binders are entered by
/// substituting their bound variable with the `Kind` sort, a neutral
/// placeholder: we only care whether `meta` occurs, not what the body
/// otherwise evaluates to, so no fresh-variable machinery is needed here
/// (§4.5 step 2).
fn occurs(kernel: &Kernel, meta: MetaId, t: &TermPtr) -> bool {
    match &**t {
        Term::Meta(id, env) => {
            if *id == meta {
                return true;
            }
            if env.iter().any(|e| occurs(kernel, meta, e)) {
                return true;
            }
            if let Some(solution) = kernel.meta_solution(*id) {
                let unfolded = solution.instantiate(env);
                return occurs(kernel, meta, &unfolded);
            }
            false
        }
        Term::Prod(domain, binder) | Term::Abst(domain, binder) => {
            occurs(kernel, meta, domain) || occurs(kernel, meta, &binder::substitute(binder, &Term::kind_sort()))
        }
        Term::App(l, r) => occurs(kernel, meta, l) || occurs(kernel, meta, r),
        Term::Var(_) | Term::BVar(_) | Term::Sort(_) | Term::Symbol(_) | Term::TPat(_) | Term::Wildcard => false,
    }
}

/// Attempts to solve `meta[env] = t` (§4.5).
///
/// # Panics
///
/// Panics if `meta` is already solved — callers are required to check
/// `is_solved` first (a caller error, not a recoverable one, §7).
pub fn unify(kernel: &Kernel, meta: MetaId, env: &[TermPtr], t: &TermPtr) -> bool {
    if kernel.is_meta_solved(meta) {
        panic!(META_ALREADY_SOLVED);
    }

    if occurs(kernel, meta, t) {
        trace!(target: "kernel::unifier", "Occurs-check failed for meta {}.", meta);
        return false;
    }

    let vars: Option<Vec<_>> = env.iter().map(|e| e.split_var()).collect();
    let vars = match vars {
        Some(vars) => vars,
        None => {
            trace!(target: "kernel::unifier", "Environment of meta {} is not a Miller pattern.", meta);
            return false;
        }
    };

    let solution: NaryBinder = NaryBinder::bind_many(&vars, t.clone());
    if !solution.closed {
        trace!(target: "kernel::unifier", "Candidate solution for meta {} escapes its scope.", meta);
        return false;
    }

    trace!(target: "kernel::unifier", "Committing solution for meta {}.", meta);
    kernel.set_meta_solution(meta, solution);
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::Kernel;
    use crate::ident::VarId;

    #[test]
    fn unify_commits_a_miller_pattern_solution() {
        let kernel = Kernel::new();
        let x: VarId = 10;
        let y: VarId = 11;
        let meta = kernel.new_meta();
        let env = vec![Term::var(x), Term::var(y)];
        // Build `eq a x y` as the target term.
        let a = Term::var(99);
        let target = Term::app(Term::app(Term::app(Term::var(1000), a.clone()), Term::var(x)), Term::var(y));
        assert!(unify(&kernel, meta, &env, &target));
        assert!(kernel.is_meta_solved(meta));

        let solution = kernel.meta_solution(meta).unwrap();
        let instantiated = solution.instantiate(&[Term::var(x), Term::var(y)]);
        assert!(instantiated.split_app().is_some());
    }

    #[test]
    fn occurs_check_rejects_self_referential_solution() {
        let kernel = Kernel::new();
        let meta = kernel.new_meta();
        let f = Term::var(5);
        let target = Term::app(f, Term::meta(meta, Vec::new()));
        assert!(!unify(&kernel, meta, &[], &target));
        assert!(!kernel.is_meta_solved(meta));
    }

    #[test]
    fn non_variable_environment_is_rejected() {
        let kernel = Kernel::new();
        let meta = kernel.new_meta();
        let env = vec![Term::type_sort()];
        assert!(!unify(&kernel, meta, &env, &Term::var(1)));
    }

    #[test]
    fn escaping_free_variable_is_rejected() {
        let kernel = Kernel::new();
        let x: VarId = 1;
        let y: VarId = 2;
        let meta = kernel.new_meta();
        // y is free in the target but not in env: should fail to close.
        let target = Term::app(Term::var(x), Term::var(y));
        assert!(!unify(&kernel, meta, &[Term::var(x)], &target));
    }

    #[test]
    #[should_panic(expected = "already-solved")]
    fn unify_on_an_already_solved_meta_panics() {
        let kernel = Kernel::new();
        let meta = kernel.new_meta();
        assert!(unify(&kernel, meta, &[], &Term::type_sort()));
        let _ = unify(&kernel, meta, &[], &Term::type_sort());
    }
}
