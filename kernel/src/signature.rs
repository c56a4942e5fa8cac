//! # Signature
//!
//! The registry mapping symbol identities to their type and (for definable
//! symbols) their rewrite-rule list (§3.2, C3). Lookup is by `(module,
//! name)` pair; once registered, a symbol's `SymbolId` is its physical
//! identity for the lifetime of the signature — `Signature::resolve` always
//! returns the same handle for the same `(module, name)` pair, which is
//! exactly the O(1) comparison §3.1 requires of symbol references.
//!
//! `kernel::signature::blob` additionally provides the `byteorder`-encoded
//! wire format named in §6/§12 for the "opaque blob produced by the loader".

use crate::{
    error::KernelError,
    kernel_panic::DANGLING_SYMBOL_HANDLE,
    symbol::{Rule, SymbolInfo, SymbolKind},
    term::{SymbolId, Term, TermPtr},
};
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;

/// The symbol registry. Owns every `SymbolInfo` ever declared against it;
/// declarations are append-only (mirroring the rule lists they contain).
#[derive(Default)]
pub struct Signature {
    symbols: Vec<SymbolInfo>,
    index: HashMap<(String, String), SymbolId>,
}

impl Signature {
    pub fn new() -> Self {
        Signature {
            symbols: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Looks up a previously-declared symbol by module path and name.
    pub fn resolve(&self, module: &str, name: &str) -> Result<SymbolId, KernelError> {
        self.index
            .get(&(module.to_string(), name.to_string()))
            .copied()
            .ok_or(KernelError::UnresolvedSymbol)
    }

    /// Declares a new static (non-rewritable) symbol, returning its handle.
    pub fn declare_static(&mut self, module: &str, name: &str, ty: TermPtr) -> SymbolId {
        self.declare(module, name, ty, SymbolKind::Static)
    }

    /// Declares a new definable symbol (with an initially empty rule list),
    /// returning its handle.
    pub fn declare_definable(&mut self, module: &str, name: &str, ty: TermPtr) -> SymbolId {
        self.declare(
            module,
            name,
            ty,
            SymbolKind::Definable {
                rules: Default::default(),
            },
        )
    }

    fn declare(&mut self, module: &str, name: &str, ty: TermPtr, kind: SymbolKind) -> SymbolId {
        let module_rc: Rc<str> = module.into();
        let name_rc: Rc<str> = name.into();
        let id: SymbolId = self.symbols.len().into();
        self.symbols.push(SymbolInfo {
            name: name_rc,
            module: module_rc,
            ty,
            kind,
        });
        self.index.insert((module.to_string(), name.to_string()), id);
        info!("Symbol registered: {} (handle {}).", self.symbols[*id].name, id);
        id
    }

    /// The `SymbolInfo` registered under `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a symbol in this signature — a dangling
    /// handle is a caller error, never a recoverable condition (§7).
    pub fn info(&self, id: SymbolId) -> &SymbolInfo {
        self.symbols.get(*id).unwrap_or_else(|| panic!(DANGLING_SYMBOL_HANDLE))
    }

    /// Appends `rule` to `id`'s rule list (append-only, §3.2/§3.4).
    ///
    /// Validates the rule's LHS (after pattern-tag substitution) against
    /// §7's `PatternIllFormed` condition before registering it: a
    /// metavariable occupying a pattern position indicates the rule was
    /// built incorrectly by the (out-of-scope) typechecker collaborator.
    ///
    /// Returns `UnresolvedSymbol`-flavoured failure only in the sense that a
    /// caller handing a non-definable handle here is also a usage error; we
    /// surface it as `PatternIllFormed` is wrong for that case, so instead a
    /// static-symbol handle is rejected via kernel panic, matching the
    /// "dangling/ill-kinded handle" contract `info` already enforces.
    pub fn add_rule(&self, id: SymbolId, rule: Rule) -> Result<(), KernelError> {
        validate_pattern(&rule.lhs.args)?;
        let info = self.info(id);
        if !info.push_rule(rule) {
            panic!(DANGLING_SYMBOL_HANDLE);
        }
        debug!("Rule added to symbol {} (handle {}).", info.name, id);
        Ok(())
    }

    /// Iterates the module/name pairs of every registered symbol, in
    /// declaration order. Used by `signature::blob::encode`.
    pub fn entries(&self) -> impl Iterator<Item = &SymbolInfo> {
        self.symbols.iter()
    }
}

/// Scans a rule's tag-substituted LHS argument patterns for a stray
/// metavariable (§4.3's "a metavariable appearing ... during matching is a
/// kernel bug", surfaced here as the recoverable `PatternIllFormed` at
/// registration time rather than deferred to a panic mid-match).
fn validate_pattern(args: &[TermPtr]) -> Result<(), KernelError> {
    fn scan(t: &TermPtr) -> Result<(), KernelError> {
        match &**t {
            Term::Meta(_, _) => Err(KernelError::PatternIllFormed),
            Term::Prod(domain, binder) | Term::Abst(domain, binder) => {
                scan(domain)?;
                scan(&binder.body)
            }
            Term::App(l, r) => {
                scan(l)?;
                scan(r)
            }
            Term::Var(_) | Term::BVar(_) | Term::Sort(_) | Term::Symbol(_) | Term::TPat(_) | Term::Wildcard => {
                Ok(())
            }
        }
    }
    for a in args {
        scan(a)?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Signature blob encoding (§12).
////////////////////////////////////////////////////////////////////////////////

pub mod blob {
    //! A length-prefixed, little-endian encoding of a signature's symbol
    //! table: for each entry, a kind tag, a name hash, a module hash, and a
    //! rule-count arity. Reconstructing full symbol *types* from the blob is
    //! a parser/loader concern (§1 scopes surface syntax out); what this
    //! format preserves is exactly what §6 asks for — "loading
    //! re-establishes physical identity of previously-linked symbols" — by
    //! re-emitting handles in the same declaration order the blob was
    //! produced from.

    use super::Signature;
    use crate::{error::KernelError, symbol::SymbolKind};
    use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::io::{Cursor, Read, Write};

    const KIND_STATIC: u8 = 0;
    const KIND_DEFINABLE: u8 = 1;

    /// One decoded symbol-table entry.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct SymbolBlobEntry {
        pub is_definable: bool,
        pub name_hash: u64,
        pub module_hash: u64,
        pub rule_count: u32,
    }

    fn hash_str(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Encodes `sig`'s symbol table into the blob format described above.
    pub fn encode(sig: &Signature) -> Vec<u8> {
        let mut out = Vec::new();
        let entries: Vec<_> = sig.entries().collect();
        out.write_u32::<LittleEndian>(entries.len() as u32)
            .expect("writing to a Vec<u8> cannot fail");
        for info in entries {
            let (kind, rule_count) = match &info.kind {
                SymbolKind::Static => (KIND_STATIC, 0u32),
                SymbolKind::Definable { rules } => (KIND_DEFINABLE, rules.borrow().len() as u32),
            };
            out.write_u8(kind).unwrap();
            out.write_u64::<LittleEndian>(hash_str(&info.name)).unwrap();
            out.write_u64::<LittleEndian>(hash_str(&info.module)).unwrap();
            out.write_u32::<LittleEndian>(rule_count).unwrap();
        }
        out
    }

    /// Decodes a blob produced by `encode` back into its entry list.
    pub fn decode(bytes: &[u8]) -> Result<Vec<SymbolBlobEntry>, KernelError> {
        let mut cursor = Cursor::new(bytes);
        let count = read_u32(&mut cursor)?;
        let mut out = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let kind = read_u8(&mut cursor)?;
            let name_hash = read_u64(&mut cursor)?;
            let module_hash = read_u64(&mut cursor)?;
            let rule_count = read_u32(&mut cursor)?;
            out.push(SymbolBlobEntry {
                is_definable: kind == KIND_DEFINABLE,
                name_hash,
                module_hash,
                rule_count,
            });
        }
        Ok(out)
    }

    fn read_u8<R: Read>(r: &mut R) -> Result<u8, KernelError> {
        r.read_u8().map_err(|_| KernelError::UnresolvedSymbol)
    }
    fn read_u32<R: Read>(r: &mut R) -> Result<u32, KernelError> {
        r.read_u32::<LittleEndian>().map_err(|_| KernelError::UnresolvedSymbol)
    }
    fn read_u64<R: Read>(r: &mut R) -> Result<u64, KernelError> {
        r.read_u64::<LittleEndian>().map_err(|_| KernelError::UnresolvedSymbol)
    }

}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::Term;

    #[test]
    fn resolve_finds_a_declared_symbol() {
        let mut sig = Signature::new();
        let id = sig.declare_static("hol", "bool", Term::type_sort());
        assert_eq!(sig.resolve("hol", "bool").unwrap(), id);
    }

    #[test]
    fn resolve_reports_unresolved_symbol() {
        let sig = Signature::new();
        assert_eq!(sig.resolve("hol", "bool").unwrap_err(), KernelError::UnresolvedSymbol);
    }

    #[test]
    fn add_rule_appends_in_declaration_order() {
        let mut sig = Signature::new();
        let proof = sig.declare_definable("hol", "proof", Term::type_sort());
        let lhs = crate::term::ArgListBinder {
            arity: 0,
            name_hints: Vec::new(),
            args: vec![Term::symbol(proof)],
        };
        let rhs = crate::term::NaryBinder::bind_many(&[], Term::type_sort());
        sig.add_rule(proof, Rule::new(lhs.clone(), rhs.clone())).unwrap();
        sig.add_rule(proof, Rule::new(lhs, rhs)).unwrap();
        assert_eq!(sig.info(proof).rules().len(), 2);
    }

    #[test]
    fn add_rule_rejects_meta_in_pattern_position() {
        let mut sig = Signature::new();
        let proof = sig.declare_definable("hol", "proof", Term::type_sort());
        let bad_lhs = crate::term::ArgListBinder {
            arity: 0,
            name_hints: Vec::new(),
            args: vec![Term::meta(0usize.into(), Vec::new())],
        };
        let rhs = crate::term::NaryBinder::bind_many(&[], Term::type_sort());
        let err = sig.add_rule(proof, Rule::new(bad_lhs, rhs)).unwrap_err();
        assert_eq!(err, KernelError::PatternIllFormed);
    }
}
