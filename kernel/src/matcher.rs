//! # Rewrite matcher (C5)
//!
//! Higher-order pattern matching of a rule's LHS against the evaluator's
//! stack (§4.3). `try_rule` is the per-rule entry point `evaluator::whnf_stk`
//! calls for each candidate rule, in declaration order, stopping at the
//! first success (tie-break, §4.3/§9).

use crate::{
    engine::Kernel,
    evaluator::{Cell, Stack},
    kernel_panic::MALFORMED_PATTERN_STACK,
    signature::Signature,
    symbol::Rule,
    term::{Term, TermPtr},
};
use log::trace;
use std::rc::Rc;

/// Attempts to fire `rule` against `stack`. On success, returns the
/// rewritten head and the remaining (unconsumed) stack.
pub fn try_rule(kernel: &Kernel, sig: &Signature, rule: &Rule, stack: &Stack) -> Option<(TermPtr, Stack)> {
    if rule.arity > stack.len() {
        return None;
    }
    // The evaluator stack's top (next to consume) sits at the end of the
    // Vec; the rule's pattern list is in natural left-to-right argument
    // order, so position i of the pattern list lines up with
    // stack[len - 1 - i].
    let consumed_len = stack.len();
    let patterns = rule.lhs.instantiate_with_tags();
    let mut env: Vec<Option<TermPtr>> = vec![None; rule.pattern_count];
    for (i, pattern) in patterns.iter().enumerate() {
        let cell = &stack[consumed_len - 1 - i];
        if !matching(kernel, sig, &mut env, pattern, cell) {
            trace!(target: "kernel::matcher", "Rule attempt failed at argument {}.", i);
            return None;
        }
    }
    trace!(target: "kernel::matcher", "Rule matched (arity {}).", rule.arity);
    let bindings: Vec<TermPtr> = env
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.unwrap_or_else(|| Term::pattern_tag(i)))
        .collect();
    let rewritten = rule.rhs.instantiate(&bindings);
    let remaining = stack[..consumed_len - rule.arity].to_vec();
    Some((rewritten, remaining))
}

/// Tests pattern `p` against the term currently held by `cell`, recording
/// any fresh pattern-tag binding into `env` (§4.3).
fn matching(kernel: &Kernel, sig: &Signature, env: &mut [Option<TermPtr>], p: &TermPtr, cell: &Rc<Cell>) -> bool {
    match &**p {
        Term::TPat(i) if env[*i].is_none() => {
            trace!(target: "kernel::matcher::pattern", "Binding fresh pattern tag {} without forcing.", i);
            env[*i] = Some(cell.get());
            return true;
        }
        Term::Wildcard => return true,
        Term::Meta(_, _) => panic!(MALFORMED_PATTERN_STACK),
        _ => {}
    }

    let forced = crate::evaluator::whnf(kernel, sig, &cell.get());
    cell.set(forced.clone());

    match (&**p, &*forced) {
        (Term::TPat(i), _) => {
            let bound = env[*i].clone().expect("already-bound pattern tag must have a binding");
            crate::conversion::eq_modulo(kernel, sig, &bound, &forced)
        }
        (Term::Prod(d1, b1), Term::Prod(d2, b2)) | (Term::Abst(d1, b1), Term::Abst(d2, b2)) => {
            if !matching(kernel, sig, env, d1, &Rc::new(Cell::new(d2.clone()))) {
                return false;
            }
            let (_, p_body, t_body) = crate::binder::unbind2(kernel.var_ids(), b1, b2);
            matching(kernel, sig, env, &p_body, &Rc::new(Cell::new(t_body)))
        }
        (Term::App(f1, a1), Term::App(f2, a2)) => {
            matching(kernel, sig, env, f1, &Rc::new(Cell::new(f2.clone())))
                && matching(kernel, sig, env, a1, &Rc::new(Cell::new(a2.clone())))
        }
        (Term::Sort(s1), Term::Sort(s2)) => s1 == s2,
        (Term::Var(v1), Term::Var(v2)) => v1 == v2,
        (Term::Symbol(s1), Term::Symbol(s2)) => s1 == s2,
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::Kernel;
    use crate::signature::Signature;
    use crate::term::{ArgListBinder, NaryBinder};

    #[test]
    fn arity_short_stack_rejects() {
        let kernel = Kernel::new();
        let mut sig = Signature::new();
        let f = sig.declare_definable("m", "f", Term::type_sort());
        let x: crate::ident::VarId = 0;
        let (lhs, _) = ArgListBinder::bind_many(&[x], vec![Term::var(x)]);
        let rhs = NaryBinder::bind_many(&[x], Term::var(x));
        let rule = Rule::new(lhs, rhs);
        let stack: Stack = Vec::new();
        let _ = f;
        assert!(try_rule(&kernel, &sig, &rule, &stack).is_none());
    }

    #[test]
    fn identity_rule_fires_and_rewrites_to_the_argument() {
        let kernel = Kernel::new();
        let sig = Signature::new();
        let x: crate::ident::VarId = 0;
        let (lhs, closed_lhs) = ArgListBinder::bind_many(&[x], vec![Term::var(x)]);
        assert!(closed_lhs);
        let rhs = NaryBinder::bind_many(&[x], Term::var(x));
        let rule = Rule::new(lhs, rhs);
        let arg = Term::var(42);
        let stack: Stack = vec![Rc::new(Cell::new(arg.clone()))];
        let (result, remaining) = try_rule(&kernel, &sig, &rule, &stack).unwrap();
        assert_eq!(result.split_var(), arg.split_var());
        assert!(remaining.is_empty());
    }
}
