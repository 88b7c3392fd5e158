//! Input builders shared by the benchmarks.
//!
//! Each builder produces a workload whose size grows linearly in `n`, so
//! the divan argument lists read as problem sizes.

use lamina_infer::InferenceContext;
use lamina_term::{Name, Term, Variable, bind, combinators};
use lamina_types::{Judgment, Monotype, TypeConstant, function};

/// `(id (id (... (id c))))` with `n` applications of the identity.
pub fn identity_tower(n: usize) -> Term<Name> {
    (0..n).fold(Term::constant("c"), |acc, _| {
        Term::app(combinators::identity().into(), acc)
    })
}

/// `n` nested single-binder abstractions whose innermost body applies every
/// binder, left to right, to a free `z`.
pub fn nested_abstraction(n: usize) -> Term<Name> {
    let names: Vec<String> = (0..n).map(|i| format!("x{i}")).collect();
    let body = names
        .iter()
        .fold(Term::var("z"), |acc, name| Term::app(acc, Term::var(name)));
    names.iter().rev().fold(body, |acc, name| {
        bind([Variable::named(name)]).in_body(acc).into()
    })
}

/// A right-nested function type of `n` arrows ending in `last`. Parameters
/// are variables `a0 ..` when `vars` is set and `Int` otherwise.
pub fn arrow_chain(n: usize, vars: bool, last: Monotype<Name>) -> Monotype<Name> {
    (0..n).rev().fold(last, |acc, i| {
        let param = if vars {
            Monotype::var(&format!("a{i}"))
        } else {
            Monotype::constant("Int")
        };
        function(param, acc)
    })
}

/// `Pair` applications nested `n` deep on the left, all variables distinct.
pub fn pair_spine(n: usize, prefix: &str) -> Monotype<Name> {
    (0..n).fold(Monotype::var(&format!("{prefix}0")), |acc, i| {
        Monotype::app(
            TypeConstant::plain("Pair"),
            vec![acc, Monotype::var(&format!("{prefix}{}", i + 1))],
        )
    })
}

/// Runs `n` nested `let id_i = λy . y in ...` proofs, applying every
/// binding to `0` in the innermost body. Returns `None` as soon as a step
/// fails to conclude.
pub fn let_tower(cxt: &mut InferenceContext<Name>, n: usize) -> Option<Judgment<Name>> {
    cxt.add(Name::new("0"), Monotype::constant("Int"));

    let mut pending = Vec::with_capacity(n);
    for i in 0..n {
        let abs = cxt.abs(Name::new("y"));
        let y = cxt.var("y").into_judgment()?;
        let id = abs.discharge(cxt, &y).into_judgment()?;
        pending.push(cxt.let_in(Name::new(format!("id{i}")), &id));
    }

    let mut body = cxt.var("0").into_judgment()?;
    for i in 0..n {
        let id = cxt.var(&format!("id{i}")).into_judgment()?;
        body = cxt.app(&id, &body).into_judgment()?;
    }

    while let Some(binding) = pending.pop() {
        body = binding.discharge(cxt, &body).into_judgment()?;
    }
    Some(body)
}
