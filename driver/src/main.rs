//! # Entry point for the driver application
//!
//! Builds the embedded HOL theory excerpt (§14 of the design document — no
//! surface-syntax parser exists in this workspace, §1) and exercises the
//! kernel's `whnf`/`eq_modulo`/`instantiate` operations against it, printing
//! the outcome of each §8 scenario.

use anyhow::{bail, Result};
use clap::{App, Arg};
use kernel::{ArgListBinder, Binder, Kernel, NaryBinder, Rule, Signature, SymbolId, Term};
use log::{info, LevelFilter};
use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// Useful constants.
////////////////////////////////////////////////////////////////////////////////

const APPLICATION_NAME: &str = "Lambda-Pi-modulo driver.";
const ABOUT_MESSAGE: &str = "Exercises the kernel's whnf/eq_modulo/instantiate operations against an embedded HOL theory excerpt.";
const AUTHOR_LIST: &str = "The Lambda-Pi Development Team.";
const VERSION_NUMBER: &str = "0.1.0";

/// The five debug-trace targets named in §6, as the `--trace` flag's
/// selectable values.
const TRACE_TARGETS: &[(&str, &str)] = &[
    ("eval", "kernel::evaluator"),
    ("equa", "kernel::conversion"),
    ("matc", "kernel::matcher"),
    ("unif", "kernel::unifier"),
    ("patt", "kernel::matcher::pattern"),
];

const SCENARIO_NAMES: &[&str] = &[
    "beta",
    "rule-firing",
    "definition-unfolding",
    "partial-application",
    "meta-instantiation",
    "occurs-check",
];

////////////////////////////////////////////////////////////////////////////////
// Command-line parsing.
////////////////////////////////////////////////////////////////////////////////

/// Captures the command line arguments passed to the program.
struct CommandLineArguments {
    /// An optional path to a surface-syntax theory file. No parser exists
    /// yet (§1), so this is read only to report that it was ignored.
    theory_path: Option<PathBuf>,
    /// The subset of `TRACE_TARGETS` keys requested via `--trace`.
    trace_targets: Vec<String>,
    /// The single scenario requested via `--scenario`, or `None` to run all
    /// of them.
    scenario: Option<String>,
}

/// Parses the command line arguments of the program.
fn parse_command_line_arguments() -> CommandLineArguments {
    let app = App::new(APPLICATION_NAME)
        .about(ABOUT_MESSAGE)
        .version(VERSION_NUMBER)
        .author(AUTHOR_LIST)
        .arg(
            Arg::new("theory")
                .long("theory")
                .takes_value(true)
                .about("Path to a surface-syntax theory file (reserved for a future parser; ignored for now)"),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .takes_value(true)
                .about("Comma-separated subset of eval,equa,matc,unif,patt to trace at trace level"),
        )
        .arg(
            Arg::new("scenario")
                .long("scenario")
                .takes_value(true)
                .about("Run only the named §8 scenario instead of all of them"),
        );

    let matches = app.get_matches();

    let theory_path = matches.value_of("theory").map(PathBuf::from);
    let trace_targets = matches
        .value_of("trace")
        .map(|s| s.split(',').map(|t| t.trim().to_string()).collect())
        .unwrap_or_default();
    let scenario = matches.value_of("scenario").map(String::from);

    CommandLineArguments {
        theory_path,
        trace_targets,
        scenario,
    }
}

/// Builds an `env_logger` filtering on the requested `--trace` targets, each
/// resolved against `TRACE_TARGETS`'s target-module mapping (§11/§13).
/// Unknown targets are reported and skipped rather than rejected outright.
fn configure_logging(requested: &[String]) {
    let mut builder = env_logger::Builder::from_default_env();
    for target in requested {
        match TRACE_TARGETS.iter().find(|(key, _)| key == target) {
            Some((_, module)) => {
                builder.filter_module(module, LevelFilter::Trace);
            }
            None => eprintln!("Unknown trace target '{}' (expected one of eval,equa,matc,unif,patt).", target),
        }
    }
    builder.init();
}

////////////////////////////////////////////////////////////////////////////////
// The embedded HOL theory excerpt (§14).
////////////////////////////////////////////////////////////////////////////////

/// Everything the HOL excerpt's signature needs, plus the symbol handles the
/// scenarios reference directly. Built directly through the signature API,
/// exactly as a real loader would after parsing:
///
/// ```text
/// bool   : Type.
/// imp    : bool -> bool -> bool.
/// arr    : bool -> bool -> bool.
/// forall : Type -> (bool -> bool) -> bool.
/// eq     : bool -> bool -> bool -> bool.
/// def proof : bool -> Type.
/// [p, q] proof (imp p q) --> proof p -> proof q.
/// def term  : bool -> Type.
/// [a, b] term (arr a b) --> term a -> term b.
/// def true  := forall bool (p => imp p p).
/// ```
struct Hol {
    sig: Signature,
    bool_ty: SymbolId,
    imp: SymbolId,
    arr: SymbolId,
    forall: SymbolId,
    eq: SymbolId,
    proof: SymbolId,
    term: SymbolId,
    hol_true: SymbolId,
}

fn build_hol() -> Hol {
    let mut sig = Signature::new();

    let bool_ty = sig.declare_static("hol", "bool", Term::type_sort());
    let imp = sig.declare_static("hol", "imp", Term::type_sort());
    let arr = sig.declare_static("hol", "arr", Term::type_sort());
    let forall = sig.declare_static("hol", "forall", Term::type_sort());
    let eq = sig.declare_static("hol", "eq", Term::type_sort());
    let proof = sig.declare_definable("hol", "proof", Term::type_sort());
    let term = sig.declare_definable("hol", "term", Term::type_sort());
    let hol_true = sig.declare_definable("hol", "true", Term::symbol(bool_ty));

    // [p, q] proof (imp p q) --> proof p -> proof q.
    {
        let p: kernel::ident::VarId = 1000;
        let q: kernel::ident::VarId = 1001;
        let lhs_args = vec![Term::app(Term::app(Term::symbol(imp), Term::var(p)), Term::var(q))];
        let (lhs, closed) = ArgListBinder::bind_many(&[p, q], lhs_args);
        debug_assert!(closed);
        let rhs_body = Term::prod(
            Term::app(Term::symbol(proof), Term::var(p)),
            Binder::new("_", Term::app(Term::symbol(proof), Term::var(q))),
        );
        let rhs = NaryBinder::bind_many(&[p, q], rhs_body);
        sig.add_rule(proof, Rule::new(lhs, rhs)).expect("embedded theory's own rule must be well-formed");
    }

    // [a, b] term (arr a b) --> term a -> term b.
    {
        let a: kernel::ident::VarId = 2000;
        let b: kernel::ident::VarId = 2001;
        let lhs_args = vec![Term::app(Term::app(Term::symbol(arr), Term::var(a)), Term::var(b))];
        let (lhs, closed) = ArgListBinder::bind_many(&[a, b], lhs_args);
        debug_assert!(closed);
        let rhs_body = Term::prod(
            Term::app(Term::symbol(term), Term::var(a)),
            Binder::new("_", Term::app(Term::symbol(term), Term::var(b))),
        );
        let rhs = NaryBinder::bind_many(&[a, b], rhs_body);
        sig.add_rule(term, Rule::new(lhs, rhs)).expect("embedded theory's own rule must be well-formed");
    }

    // def true := forall bool (p => imp p p).
    {
        let body = Term::app(
            Term::app(Term::symbol(forall), Term::symbol(bool_ty)),
            Term::abst(
                Term::symbol(bool_ty),
                Binder::new("p", Term::app(Term::app(Term::symbol(imp), Term::bvar(0)), Term::bvar(0))),
            ),
        );
        let lhs = ArgListBinder { arity: 0, name_hints: Vec::new(), args: Vec::new() };
        let rhs = NaryBinder::bind_many(&[], body);
        sig.add_rule(hol_true, Rule::new(lhs, rhs)).expect("embedded theory's own rule must be well-formed");
    }

    Hol { sig, bool_ty, imp, arr, forall, eq, proof, term, hol_true }
}

////////////////////////////////////////////////////////////////////////////////
// §8 scenarios.
////////////////////////////////////////////////////////////////////////////////

fn scenario_beta(kernel: &Kernel, hol: &Hol) -> Result<()> {
    let p = Term::var(1);
    let t = Term::app(
        Term::abst(Term::symbol(hol.bool_ty), Binder::new("x", Term::bvar(0))),
        p.clone(),
    );
    let result = kernel.whnf(&hol.sig, &t);
    if result.split_var() != p.split_var() {
        bail!("scenario_beta: whnf((\\x:bool. x) p) did not reduce to p");
    }
    println!("beta: (\\x:bool. x) p ~> {}", kernel::render(&result));
    Ok(())
}

fn scenario_rule_firing(kernel: &Kernel, hol: &mut Hol) -> Result<()> {
    let a = hol.sig.declare_static("hol", "A", Term::symbol(hol.bool_ty));
    let b = hol.sig.declare_static("hol", "B", Term::symbol(hol.bool_ty));
    let imp_ab = Term::app(Term::app(Term::symbol(hol.imp), Term::symbol(a)), Term::symbol(b));
    let proof_imp_ab = Term::app(Term::symbol(hol.proof), imp_ab);
    let result = kernel.whnf(&hol.sig, &proof_imp_ab);
    if result.split_prod().is_none() {
        bail!("scenario_rule_firing: whnf(proof (imp A B)) did not reduce to a product");
    }
    println!("rule-firing: proof (imp A B) ~> {}", kernel::render(&result));
    Ok(())
}

fn scenario_definition_unfolding(kernel: &Kernel, hol: &Hol) -> Result<()> {
    let expected = Term::app(
        Term::app(Term::symbol(hol.forall), Term::symbol(hol.bool_ty)),
        Term::abst(
            Term::symbol(hol.bool_ty),
            Binder::new("p", Term::app(Term::app(Term::symbol(hol.imp), Term::bvar(0)), Term::bvar(0))),
        ),
    );
    if !kernel.eq_modulo(&hol.sig, &Term::symbol(hol.hol_true), &expected) {
        bail!("scenario_definition_unfolding: true is not eq_modulo forall bool (p => imp p p)");
    }
    println!("definition-unfolding: true =~= forall bool (p => imp p p)");
    Ok(())
}

fn scenario_partial_application(kernel: &Kernel, hol: &Hol) -> Result<()> {
    let arr_bool_bool = Term::app(
        Term::app(Term::symbol(hol.arr), Term::symbol(hol.bool_ty)),
        Term::symbol(hol.bool_ty),
    );
    let term_arr_bool_bool = Term::app(Term::symbol(hol.term), arr_bool_bool);
    let whnf_result = kernel.whnf(&hol.sig, &term_arr_bool_bool);
    if whnf_result.split_prod().is_none() {
        bail!("scenario_partial_application: whnf(term (arr bool bool)) did not reduce to a product");
    }
    println!("partial-application: term (arr bool bool) ~> {}", kernel::render(&whnf_result));
    Ok(())
}

fn scenario_meta_instantiation(kernel: &Kernel, hol: &mut Hol) -> Result<()> {
    let a = hol.sig.declare_static("hol", "A", Term::symbol(hol.bool_ty));
    let b = hol.sig.declare_static("hol", "B", Term::symbol(hol.bool_ty));
    let x: kernel::ident::VarId = 10;
    let y: kernel::ident::VarId = 11;
    let u = kernel.new_meta();
    let target = Term::app(
        Term::app(Term::app(Term::symbol(hol.eq), Term::symbol(a)), Term::var(x)),
        Term::var(y),
    );
    if !kernel.instantiate(u, &[Term::var(x), Term::var(y)], &target) {
        bail!("scenario_meta_instantiation: failed to instantiate u[x,y] := eq a x y");
    }
    let instance = Term::meta(u, vec![Term::symbol(a), Term::symbol(b)]);
    println!("meta-instantiation: ?u[A,B] ~> {}", kernel::render(&kernel.whnf(&hol.sig, &instance)));
    Ok(())
}

fn scenario_occurs_check(kernel: &Kernel, hol: &mut Hol) -> Result<()> {
    let f = hol.sig.declare_static("hol", "f", Term::symbol(hol.bool_ty));
    let u = kernel.new_meta();
    let target = Term::app(Term::symbol(f), Term::meta(u, Vec::new()));
    if kernel.instantiate(u, &[], &target) {
        bail!("scenario_occurs_check: unify(u, [], f ?u[]) should have failed the occurs check");
    }
    println!("occurs-check: unify(u, [], f ?u[]) correctly rejected");
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Entry point.
////////////////////////////////////////////////////////////////////////////////

fn main() -> Result<()> {
    let command_line_args = parse_command_line_arguments();
    configure_logging(&command_line_args.trace_targets);

    if let Some(path) = &command_line_args.theory_path {
        info!(
            "--theory {} given, but no surface-syntax parser is implemented in this workspace (§1); using the embedded HOL excerpt instead.",
            path.display()
        );
    }

    let kernel = Kernel::new();
    let mut hol = build_hol();

    let selected = command_line_args.scenario.as_deref();
    if let Some(name) = selected {
        if !SCENARIO_NAMES.contains(&name) {
            bail!("unknown scenario '{}' (expected one of {})", name, SCENARIO_NAMES.join(", "));
        }
    }

    let run = |name: &str| selected.is_none() || selected == Some(name);

    if run("beta") {
        scenario_beta(&kernel, &hol)?;
    }
    if run("rule-firing") {
        scenario_rule_firing(&kernel, &mut hol)?;
    }
    if run("definition-unfolding") {
        scenario_definition_unfolding(&kernel, &hol)?;
    }
    if run("partial-application") {
        scenario_partial_application(&kernel, &hol)?;
    }
    if run("meta-instantiation") {
        scenario_meta_instantiation(&kernel, &mut hol)?;
    }
    if run("occurs-check") {
        scenario_occurs_check(&kernel, &mut hol)?;
    }

    Ok(())
}
