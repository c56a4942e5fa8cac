//! # Kernel panic messages
//!
//! Most kernel operations report failure through `KernelError`: a signature
//! lookup miss, a malformed pattern, a failed conversion, are all ordinary
//! outcomes a caller is expected to handle. Some failures, though, indicate
//! that an internal invariant has been violated by the kernel itself or by a
//! trusted collaborator that did not uphold its side of a contract (e.g.
//! calling `unify` on an already-solved metavariable). Those cases are
//! unrecoverable and abort at runtime with a *kernel panic*, using one of the
//! messages below.

/// Produced when `Unifier::unify` is called on a metavariable whose solution
/// is already set. Callers are required to check `Meta::is_solved` first.
pub const META_ALREADY_SOLVED: &str =
    "Kernel invariant failed: attempted to solve an already-solved metavariable.";

/// Produced when the fresh free-variable or fresh metavariable-id generator
/// exhausts the `u64` identifier space.
pub const FRESH_IDENTIFIER_EXHAUSTED: &str =
    "Kernel invariant failed: fresh identifiers have been exhausted.";

/// Produced when a `Handle` is dereferenced against a signature that does not
/// contain a registered symbol under that handle.
pub const DANGLING_SYMBOL_HANDLE: &str =
    "Kernel invariant failed: dangling symbol handle.";

/// Produced when the rewrite matcher finds a metavariable occupying a pattern
/// position after LHS tag-substitution; this can only happen if a rule was
/// registered without going through the pattern well-formedness check.
pub const MALFORMED_PATTERN_STACK: &str =
    "Kernel invariant failed: metavariable encountered in pattern position during matching.";
