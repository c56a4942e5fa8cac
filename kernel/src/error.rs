//! # Kernel error codes
//!
//! Error codes, used for reporting why a kernel operation failed back to the
//! typechecker or CLI collaborator. Unlike a kernel panic (see
//! `kernel_panic`), every variant here names a condition the caller is meant
//! to anticipate and handle.

use std::fmt::{Display, Error as DisplayError, Formatter};

/// Recoverable error conditions surfaced by the kernel.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum KernelError {
    /// A signature lookup (`Signature::resolve`) failed to find a symbol
    /// under the requested module path and name. Fatal to the current
    /// command.
    UnresolvedSymbol,
    /// A user rule's LHS, after pattern-tag substitution, contains a
    /// non-pattern (e.g. a metavariable in pattern position). Fatal.
    PatternIllFormed,
    /// `eq_modulo` returned `false` in regular (non-constraint) mode; a
    /// non-fatal typecheck failure to be surfaced to the caller.
    ConversionMismatch,
    /// `unify` failed either the occurs-check or the Miller-pattern scope
    /// check. The caller decides whether to recover (e.g. by postponing in
    /// constraint mode) or propagate the failure.
    OccursOrScope,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), DisplayError> {
        match self {
            KernelError::UnresolvedSymbol => write!(f, "UnresolvedSymbol"),
            KernelError::PatternIllFormed => write!(f, "PatternIllFormed"),
            KernelError::ConversionMismatch => write!(f, "ConversionMismatch"),
            KernelError::OccursOrScope => write!(f, "OccursOrScope"),
        }
    }
}

impl std::error::Error for KernelError {}
