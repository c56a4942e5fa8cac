//! # Evaluator — weak-head normalization (C4)
//!
//! An abstract machine over state `(head, stack)`, applying the four
//! transitions of §4.2 in order until none applies. An **argument cell**
//! (`Cell`) is an interior-mutable holder of a term, shared between the
//! evaluator and the rewrite matcher (`matcher.rs`) so that normalizing an
//! argument once (to test a pattern) is visible to every later consumer of
//! that same cell — the one place this kernel mutates a term subgraph
//! (§4.2, §5), and always with an equal-modulo replacement.

use crate::{
    engine::Kernel,
    signature::Signature,
    symbol::SymbolKind,
    term::{Term, TermPtr},
};
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

/// A mutable holder of a term, shared by every consumer of one evaluator
/// stack position.
#[derive(Debug)]
pub struct Cell(RefCell<TermPtr>);

impl Cell {
    pub fn new(t: TermPtr) -> Self {
        Cell(RefCell::new(t))
    }

    /// The cell's current contents.
    pub fn get(&self) -> TermPtr {
        self.0.borrow().clone()
    }

    /// Overwrites the cell's contents. Used only to write back an
    /// equal-modulo normal form (§4.2's sharing optimization).
    pub fn set(&self, t: TermPtr) {
        *self.0.borrow_mut() = t;
    }
}

/// An evaluator stack: argument cells, topmost (next to be consumed) at the
/// end of the `Vec`, matching the order in which `Push` builds it and `β`
/// drains it.
pub type Stack = Vec<Rc<Cell>>;

/// Runs the abstract machine of §4.2 to a fixed point, starting from `head`
/// with an empty stack.
pub fn whnf_stk(kernel: &Kernel, sig: &Signature, mut head: TermPtr) -> (TermPtr, Stack) {
    let mut stack: Stack = Vec::new();
    loop {
        match &*head.clone() {
            // Unfold: a resolved metavariable is replaced by its solution's
            // instantiation.
            Term::Meta(id, env) => {
                if let Some(solution) = kernel.meta_solution(*id) {
                    trace!(target: "kernel::evaluator", "Unfold: meta {} resolved.", id);
                    head = solution.instantiate(env);
                    continue;
                }
                break;
            }
            // Push: peel an application, pushing its argument as a fresh
            // cell and continuing on the function.
            Term::App(f, x) => {
                trace!(target: "kernel::evaluator", "Push: descending into application head.");
                stack.push(Rc::new(Cell::new(x.clone())));
                head = f.clone();
                continue;
            }
            // β: an abstraction applied to at least one stack argument
            // consumes it, substituting the argument into the body.
            Term::Abst(_, binder) if !stack.is_empty() => {
                let arg = stack.pop().unwrap();
                trace!(target: "kernel::evaluator", "Beta: substituting stack argument into abstraction body.");
                head = crate::binder::substitute(binder, &arg.get());
                continue;
            }
            // Rewrite: a definable symbol with a stack deep enough for one
            // of its rules tries each rule in declaration order.
            Term::Symbol(id) => {
                let info = sig.info(*id);
                if let SymbolKind::Definable { .. } = &info.kind {
                    let rules = info.rules();
                    let mut fired = false;
                    for rule in rules.iter() {
                        if let Some((new_head, new_stack)) = crate::matcher::try_rule(kernel, sig, rule, &stack) {
                            trace!(target: "kernel::evaluator", "Rewrite: rule fired for symbol {}.", id);
                            head = new_head;
                            stack = new_stack;
                            fired = true;
                            break;
                        }
                    }
                    if fired {
                        continue;
                    }
                }
                break;
            }
            _ => break,
        }
    }
    (head, stack)
}

/// Reifies an `(head, stack)` state back into a single term, left-folding
/// application nodes over the cells' contents in application order.
pub fn to_term(head: TermPtr, stack: Stack) -> TermPtr {
    stack.iter().rev().fold(head, |acc, cell| Term::app(acc, cell.get()))
}

/// Computes the weak-head normal form of `t`.
pub fn whnf(kernel: &Kernel, sig: &Signature, t: &TermPtr) -> TermPtr {
    let (head, stack) = whnf_stk(kernel, sig, t.clone());
    to_term(head, stack)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::Kernel;
    use crate::signature::Signature;
    use crate::term::Binder;

    #[test]
    fn beta_reduces_an_application() {
        let kernel = Kernel::new();
        let sig = Signature::new();
        // (λx. x) p
        let id_fn = Term::abst(Term::type_sort(), Binder::new("x", Term::bvar(0)));
        let p = Term::var(999);
        let applied = Term::app(id_fn, p.clone());
        let result = whnf(&kernel, &sig, &applied);
        assert_eq!(result.split_var(), p.split_var());
    }

    #[test]
    fn whnf_of_a_sort_is_itself() {
        let kernel = Kernel::new();
        let sig = Signature::new();
        let t = Term::type_sort();
        assert!(Rc::ptr_eq(&whnf(&kernel, &sig, &t), &t));
    }

    #[test]
    fn whnf_is_idempotent_on_a_static_application() {
        let kernel = Kernel::new();
        let mut sig = Signature::new();
        let c = sig.declare_static("m", "c", Term::type_sort());
        let t = Term::app(Term::symbol(c), Term::var(1));
        let once = whnf(&kernel, &sig, &t);
        let twice = whnf(&kernel, &sig, &once);
        assert!(Rc::ptr_eq(&once, &twice) || format!("{:?}", once) == format!("{:?}", twice));
    }
}
