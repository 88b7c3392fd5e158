//! Substitution and the explicit reduction trampoline.
//!
//! A reduction step returns `(term, again)`; callers keep stepping while
//! `again` is set. Only the operator spine of an application is ever
//! forced, so an unused operand is never evaluated.

use crate::{Nameable, Term, Variable};

impl<N: Nameable> Term<N> {
    /// Substitutes `term` for every occurrence of `var`.
    ///
    /// The flag reports whether the result exposes a redex on its operator
    /// spine. Shifting `term` for the surrounding binders is the caller's
    /// job; abstractions passed on the way down shift both `var` and `term`.
    pub fn replace(&self, var: &Variable<N>, term: &Term<N>) -> (Term<N>, bool) {
        match self {
            Term::Var(v) if v == var => (term.clone(), false),
            Term::Var(_) | Term::Const(_) => (self.clone(), false),
            Term::Abs(f) => {
                let (f, again) = f.replace(var, term);
                (Term::Abs(f), again)
            }
            Term::App(l, r) => {
                let (left, lcheck) = l.replace(var, term);
                let (right, _) = r.replace(var, term);
                let again = lcheck || left.is_applicable();
                (Term::app(left, right), again)
            }
            Term::List(es) => (
                Term::List(es.iter().map(|e| e.replace(var, term).0).collect()),
                false,
            ),
            Term::Instr(i) => (Term::Instr(i.map_args(|a| a.replace(var, term).0)), false),
            Term::Let(l) => (Term::Let(l.map(|t| t.replace(var, term).0)), false),
            Term::Rec(r) => (Term::Rec(r.map(|t| t.replace(var, term).0)), false),
        }
    }

    /// One trampoline step.
    pub fn again(&self) -> (Term<N>, bool) {
        match self {
            Term::App(l, r) => {
                let (left, lcheck) = l.again();
                if lcheck {
                    return (Term::app(left, (**r).clone()), true);
                }
                match &left {
                    Term::Abs(f) => f.again_apply(r),
                    Term::Instr(i) => (i.do_application((**r).clone()), false),
                    _ => (Term::app(left, (**r).clone()), false),
                }
            }
            Term::Instr(i) if i.is_call_ready() => (i.call_or_fault(), false),
            _ => (self.clone(), false),
        }
    }

    /// Forces the term just far enough to expose its head.
    pub fn force(&self) -> Term<N> {
        match self {
            Term::App(l, r) => {
                let left = l.force();
                if left.is_applicable() {
                    left.do_application((**r).clone())
                } else {
                    Term::app(left, (**r).clone())
                }
            }
            Term::Instr(i) if i.is_call_ready() => i.call_or_fault(),
            Term::Let(l) => Term::Let(l.map(Term::force)),
            Term::Rec(r) => Term::Rec(r.map(Term::force)),
            _ => self.clone(),
        }
    }

    /// Applies an applicable term to `arg`; anything else becomes a plain
    /// application node.
    pub fn do_application(&self, arg: Term<N>) -> Term<N> {
        match self {
            Term::Abs(f) => f.apply(arg),
            Term::Instr(i) => i.do_application(arg),
            _ => Term::app(self.clone(), arg),
        }
    }

    /// Forces repeatedly until the head stops changing. Diverges exactly
    /// when the term has no head normal form.
    pub fn normalize_head(&self) -> Term<N> {
        let mut current = self.force();
        loop {
            let next = current.force();
            if next.strict_eq(&current) {
                return next;
            }
            current = next;
        }
    }
}
