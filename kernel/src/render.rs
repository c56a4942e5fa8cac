//! # Diagnostic pretty-printer
//!
//! `render(term) -> String`, a debug-oriented rendering hook (§6): not part
//! of the kernel's semantics, used only to produce readable trace/error
//! output. Symbol references render as their bare handle (`handle.rs`'s
//! `Display` impls already give the "N (symbol handle)" shape for ad hoc
//! debugging; `render` instead renders the handle's integer compactly,
//! matching the template's short, debug-oriented `Display` style).

use crate::term::{Sort, Term, TermPtr};

/// Renders `term` as a compact, human-readable string for diagnostics.
pub fn render(term: &TermPtr) -> String {
    render_at(term, 0)
}

fn render_at(term: &TermPtr, depth: u32) -> String {
    match &**term {
        Term::Var(id) => format!("v{}", id),
        Term::BVar(k) => format!("#{}", k),
        Term::Sort(Sort::Type) => "Type".to_string(),
        Term::Sort(Sort::Kind) => "Kind".to_string(),
        Term::Symbol(id) => format!("c{}", **id),
        Term::Prod(domain, binder) => format!(
            "Π{}:{}. {}",
            binder.name_hint,
            render_at(domain, depth + 1),
            render_at(&binder.body, depth + 1)
        ),
        Term::Abst(domain, binder) => format!(
            "λ{}:{}. {}",
            binder.name_hint,
            render_at(domain, depth + 1),
            render_at(&binder.body, depth + 1)
        ),
        Term::App(f, x) => format!("({} {})", render_at(f, depth + 1), render_at(x, depth + 1)),
        Term::Meta(id, env) => {
            let env_str: Vec<String> = env.iter().map(|e| render_at(e, depth + 1)).collect();
            format!("?{}[{}]", **id, env_str.join(", "))
        }
        Term::TPat(i) => format!("#pat{}", i),
        Term::Wildcard => "_".to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::Binder;

    #[test]
    fn renders_sorts() {
        assert_eq!(render(&Term::type_sort()), "Type");
        assert_eq!(render(&Term::kind_sort()), "Kind");
    }

    #[test]
    fn renders_an_application() {
        let t = Term::app(Term::var(1), Term::var(2));
        assert_eq!(render(&t), "(v1 v2)");
    }

    #[test]
    fn renders_an_abstraction_with_its_name_hint() {
        let t = Term::abst(Term::type_sort(), Binder::new("x", Term::bvar(0)));
        assert_eq!(render(&t), "λx:Type. #0");
    }
}
