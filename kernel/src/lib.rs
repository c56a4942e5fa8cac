//! # A λΠ-modulo kernel
//!
//! A type-checking and reduction kernel for a dependently-typed λ-calculus
//! with user-defined rewrite rules: term representation, weak-head
//! normalization under β and a user-extensible rewrite relation, equality of
//! terms modulo that relation, and first-order unification of metavariables
//! parameterized by a local environment.
//!
//! The nucleus is deliberately small (§2 of the design document budgets it
//! at roughly 600-1400 lines): a parser for surface syntax, a
//! signature/module loader, and a typechecker sit around it but are out of
//! scope for this crate, which consumes an already-built `Signature` (see
//! `signature`) and exposes `whnf`/`eq_modulo`/`instantiate` as its public
//! surface (`engine::Kernel`).
//!
//! Note: this library is the trusted reduction/conversion core a
//! typechecker is built on top of.

pub mod binder;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod handle;
pub mod ident;
pub mod kernel_panic;
pub mod matcher;
pub mod meta;
pub mod render;
pub mod signature;
pub mod symbol;
pub mod term;
pub mod unifier;

pub use engine::Kernel;
pub use error::KernelError;
pub use render::render;
pub use signature::Signature;
pub use symbol::{Rule, SymbolInfo, SymbolKind};
pub use term::{
    ArgListBinder, Binder, MetaId, NaryBinder, Sort, SymbolId, Term, TermPtr,
};
