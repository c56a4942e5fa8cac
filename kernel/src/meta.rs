//! # Metavariable store
//!
//! A metavariable is `{key, solution: optional multiple-binder}` (§3.3): the
//! key is a stable handle used for identity and diagnostics, the solution is
//! written at most once and is final thereafter. `MetaStore` is the
//! per-`Kernel` table of these, addressed by `MetaId` handle (`handle.rs`)
//! exactly as `Signature` addresses symbols.

use crate::{handle::tags, kernel_panic::META_ALREADY_SOLVED, term::NaryBinder, term::MetaId};
use std::cell::RefCell;

struct MetaSlot {
    solution: Option<NaryBinder>,
}

/// Owns every metavariable created during one `Kernel`'s lifetime. Creation
/// is on-demand (§3.4); a solution, once set, is never cleared or replaced.
#[derive(Default)]
pub struct MetaStore {
    slots: RefCell<Vec<MetaSlot>>,
}

impl MetaStore {
    pub fn new() -> Self {
        MetaStore {
            slots: RefCell::new(Vec::new()),
        }
    }

    /// Allocates a new, unsolved metavariable and returns its handle.
    pub fn new_meta(&self) -> MetaId {
        let mut slots = self.slots.borrow_mut();
        let id: MetaId = slots.len().into();
        slots.push(MetaSlot { solution: None });
        id
    }

    /// `true` iff the metavariable named by `id` has a solution.
    pub fn is_solved(&self, id: MetaId) -> bool {
        self.slots.borrow()[*id].solution.is_some()
    }

    /// The metavariable's solution, if any (cloned: `NaryBinder` is a cheap,
    /// `Rc`-backed structure).
    pub fn solution(&self, id: MetaId) -> Option<NaryBinder> {
        self.slots.borrow()[*id].solution.clone()
    }

    /// Commits `solution` as the final value of metavariable `id`.
    ///
    /// # Panics
    ///
    /// Panics (a kernel bug, not a recoverable error — §7) if `id` is
    /// already solved; callers must check `is_solved` first.
    pub fn set_solution(&self, id: MetaId, solution: NaryBinder) {
        let mut slots = self.slots.borrow_mut();
        let slot = &mut slots[*id];
        if slot.solution.is_some() {
            panic!(META_ALREADY_SOLVED);
        }
        slot.solution = Some(solution);
    }
}

// Re-exported so callers can name the handle tag without reaching into
// `handle::tags` directly.
pub use tags::Meta as MetaTag;
