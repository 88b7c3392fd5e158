//! Stock closed terms: identity, Church booleans and the Y combinator.

use crate::{Function, InstructionHead, Nameable, Term, Variable, bind};

fn v<N: Nameable>(name: &str) -> Variable<N> {
    Variable::named(name)
}

fn t<N: Nameable>(name: &str) -> Term<N> {
    Term::var(name)
}

/// `λx . x`
pub fn identity<N: Nameable>() -> Function<N> {
    bind([v("x")]).in_body(t("x"))
}

/// `λx . y`, with `y` free.
pub fn constant<N: Nameable>() -> Function<N> {
    bind([v("x")]).in_body(t("y"))
}

/// `λt f . t`
pub fn church_true<N: Nameable>() -> Function<N> {
    bind([v("t"), v("f")]).in_body(t("t"))
}

/// `λt f . f`
pub fn church_false<N: Nameable>() -> Function<N> {
    bind([v("t"), v("f")]).in_body(t("f"))
}

/// `λa b . a true b`
pub fn or<N: Nameable>() -> Function<N> {
    bind([v("a"), v("b")]).in_body(Term::app_many(
        t("a"),
        [church_true().into(), t("b")],
    ))
}

/// `λa b . a b false`
pub fn and<N: Nameable>() -> Function<N> {
    bind([v("a"), v("b")]).in_body(Term::app_many(
        t("a"),
        [t("b"), church_false().into()],
    ))
}

/// `λa . a false true`
pub fn not<N: Nameable>() -> Function<N> {
    bind([v("a")]).in_body(Term::app_many(
        t("a"),
        [church_false().into(), church_true().into()],
    ))
}

/// `λc t e . c t e`
pub fn if_then_else<N: Nameable>() -> Function<N> {
    bind([v("c"), v("t"), v("e")]).in_body(Term::app_many(t("c"), [t("t"), t("e")]))
}

/// `λf . (λx . f (x x)) (λx . f (x x))`
pub fn y<N: Nameable>() -> Function<N> {
    let half = || -> Term<N> {
        bind([v("x")])
            .in_body(Term::app(t("f"), Term::app(t("x"), t("x"))))
            .into()
    };
    bind([v("f")]).in_body(Term::app(half(), half()))
}

/// Two-argument instruction answering Church `true` when its forced
/// arguments are strictly equal and `false` otherwise.
pub fn strict_equality<N: Nameable + 'static>() -> InstructionHead<N> {
    InstructionHead::new("strictEquality", 2, |args| {
        let lhs = args.arg(0).clone();
        let rhs = args.arg(1);
        Ok(if lhs.strict_eq(rhs) {
            church_true().into()
        } else {
            church_false().into()
        })
    })
}
