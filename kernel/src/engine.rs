//! # Kernel
//!
//! `Kernel` is the per-evaluation object that owns everything §5 calls
//! "shared mutable state within one evaluation" except the evaluator's
//! argument cells (those are owned by the call, not the kernel): the
//! metavariable store, the fresh free-variable counter, and the
//! constraint-postponement slot. It is deliberately *not* a global — §9's
//! design note rules that out explicitly — so that multiple independent
//! evaluations (e.g. concurrent test cases) never share state by accident.

use crate::{
    conversion, evaluator,
    ident::{VarId, VarIdSource},
    meta::MetaStore,
    signature::Signature,
    term::{MetaId, NaryBinder, TermPtr},
    unifier,
};
use std::cell::RefCell;

/// The constraint-postponement slot (§4.4, §5). `Active` accumulates
/// deferred `(a, b)` pairs that `eq_modulo` could not decide directly; a
/// `with_constraints` call is the only way to activate it, and it always
/// restores the prior state on every exit path, including when `f` panics
/// unwinds through it (via `Drop`, see `ConstraintGuard`).
enum ConstraintState {
    Inactive,
    Active(Vec<(TermPtr, TermPtr)>),
}

/// The kernel object: metavariable store, fresh-variable source, and
/// constraint slot. Owns no `Signature` — a `Signature` is a separate,
/// independently-constructed object (§6), passed by reference to every
/// operation that needs to consult it.
pub struct Kernel {
    metas: MetaStore,
    var_ids: VarIdSource,
    constraints: RefCell<ConstraintState>,
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Kernel {
            metas: MetaStore::new(),
            var_ids: VarIdSource::new(),
            constraints: RefCell::new(ConstraintState::Inactive),
        }
    }

    /// Allocates a fresh, unsolved metavariable (§6).
    pub fn new_meta(&self) -> MetaId {
        self.metas.new_meta()
    }

    /// `true` iff `id` already has a solution (§3.3).
    pub fn is_solved(&self, id: MetaId) -> bool {
        self.metas.is_solved(id)
    }

    pub(crate) fn is_meta_solved(&self, id: MetaId) -> bool {
        self.is_solved(id)
    }

    pub(crate) fn meta_solution(&self, id: MetaId) -> Option<NaryBinder> {
        self.metas.solution(id)
    }

    pub(crate) fn set_meta_solution(&self, id: MetaId, solution: NaryBinder) {
        self.metas.set_solution(id, solution)
    }

    pub(crate) fn var_ids(&self) -> &VarIdSource {
        &self.var_ids
    }

    pub(crate) fn fresh_var(&self) -> VarId {
        self.var_ids.fresh()
    }

    /// Attempts `meta[env] = term` (§4.5, §6).
    pub fn instantiate(&self, meta: MetaId, env: &[TermPtr], term: &TermPtr) -> bool {
        unifier::unify(self, meta, env, term)
    }

    /// Computes the weak-head normal form of `t` against `sig`'s rewrite
    /// rules (§4.2, §6).
    pub fn whnf(&self, sig: &Signature, t: &TermPtr) -> TermPtr {
        evaluator::whnf(self, sig, t)
    }

    /// Decides equality of `a` and `b` modulo β and `sig`'s rewrite rules
    /// (§4.4, §6), in regular (non-postponing) mode.
    pub fn eq_modulo(&self, sig: &Signature, a: &TermPtr, b: &TermPtr) -> bool {
        conversion::eq_modulo(self, sig, a, b)
    }

    /// As `eq_modulo`, but runs with the constraint slot active: any head
    /// mismatch that would otherwise fail the comparison is instead
    /// recorded and returned alongside the (still meaningful) boolean
    /// result (§4.4, §6).
    pub fn eq_modulo_constr(&self, sig: &Signature, a: &TermPtr, b: &TermPtr) -> (bool, Vec<(TermPtr, TermPtr)>) {
        self.with_constraints(|| conversion::eq_modulo(self, sig, a, b))
    }

    /// Activates the constraint slot for the duration of `f`, returning
    /// `f`'s result paired with whatever constraints accumulated. The prior
    /// slot state is restored afterwards, via an RAII guard so a panic
    /// unwinding through `f` still restores it (§5: "a scoped acquire/release
    /// on all exit paths, including failure").
    pub(crate) fn with_constraints<F, R>(&self, f: F) -> (R, Vec<(TermPtr, TermPtr)>)
    where
        F: FnOnce() -> R,
    {
        struct Guard<'a> {
            slot: &'a RefCell<ConstraintState>,
            prior: Option<ConstraintState>,
        }
        impl<'a> Drop for Guard<'a> {
            fn drop(&mut self) {
                if let Some(prior) = self.prior.take() {
                    *self.slot.borrow_mut() = prior;
                }
            }
        }

        let prior = std::mem::replace(&mut *self.constraints.borrow_mut(), ConstraintState::Active(Vec::new()));
        let guard = Guard {
            slot: &self.constraints,
            prior: Some(prior),
        };
        let result = f();
        let collected = match std::mem::replace(&mut *self.constraints.borrow_mut(), ConstraintState::Inactive) {
            ConstraintState::Active(pairs) => pairs,
            ConstraintState::Inactive => Vec::new(),
        };
        drop(guard);
        (result, collected)
    }

    /// Records `(a, b)` as a deferred constraint iff the slot is active;
    /// returns whether it was (§4.4).
    pub(crate) fn add_constraint(&self, a: TermPtr, b: TermPtr) -> bool {
        match &mut *self.constraints.borrow_mut() {
            ConstraintState::Active(pairs) => {
                pairs.push((a, b));
                true
            }
            ConstraintState::Inactive => false,
        }
    }
}
