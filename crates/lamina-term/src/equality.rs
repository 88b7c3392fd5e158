//! Syntactic and computational term equality.

use crate::{Nameable, Term, TermContext};

impl<N: Nameable> Term<N> {
    /// Literal tree equality, depths included. Never forces.
    pub fn strict_eq(&self, other: &Term<N>) -> bool {
        match (self, other) {
            (Term::Var(a), Term::Var(b)) => a == b,
            (Term::Abs(f), Term::Abs(g)) => f.strict_eq(g),
            (Term::App(l1, r1), Term::App(l2, r2)) => l1.strict_eq(l2) && r1.strict_eq(r2),
            (Term::Const(a), Term::Const(b)) => a.name.name() == b.name.name(),
            (Term::List(xs), Term::List(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.strict_eq(y))
            }
            (Term::Instr(a), Term::Instr(b)) => a.strict_eq(b),
            (Term::Let(a), Term::Let(b)) => {
                a.form == b.form
                    && a.name.name.name() == b.name.name.name()
                    && a.assignment.strict_eq(&b.assignment)
                    && a.body.strict_eq(&b.body)
            }
            (Term::Rec(a), Term::Rec(b)) => {
                a.defs.len() == b.defs.len()
                    && a.defs.iter().zip(&b.defs).all(|(x, y)| {
                        x.name.name.name() == y.name.name.name()
                            && x.assignment.strict_eq(&y.assignment)
                    })
                    && a.body.strict_eq(&b.body)
            }
            _ => false,
        }
    }

    /// Computational equality.
    ///
    /// Both sides are forced first. Abstractions are compared extensionally
    /// by applying each to the context's placeholder until neither yields
    /// an abstraction.
    pub fn equals(&self, cxt: &TermContext<N>, other: &Term<N>) -> bool {
        let lhs = self.force();
        let rhs = other.force();
        match (&lhs, &rhs) {
            (Term::Abs(f), Term::Abs(g)) => {
                let placeholder = cxt.placeholder();
                f.free_apply_through(&placeholder)
                    .equals(cxt, &g.free_apply_through(&placeholder))
            }
            (Term::App(l1, r1), Term::App(l2, r2)) => l1.equals(cxt, l2) && r1.equals(cxt, r2),
            (Term::List(xs), Term::List(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.equals(cxt, y))
            }
            (Term::Instr(a), Term::Instr(b)) => {
                a.head().same_as(b.head())
                    && a.args().len() == b.args().len()
                    && a.args().iter().zip(b.args()).all(|(x, y)| x.equals(cxt, y))
            }
            (Term::Let(a), Term::Let(b)) => {
                a.name.name.name() == b.name.name.name()
                    && a.assignment.equals(cxt, &b.assignment)
                    && a.body.equals(cxt, &b.body)
            }
            (Term::Rec(a), Term::Rec(b)) => {
                a.defs.len() == b.defs.len()
                    && a.defs.iter().zip(&b.defs).all(|(x, y)| {
                        x.name.name.name() == y.name.name.name()
                            && x.assignment.equals(cxt, &y.assignment)
                    })
                    && a.body.equals(cxt, &b.body)
            }
            _ => lhs.strict_eq(&rhs),
        }
    }
}

impl<N: Nameable> PartialEq for Term<N> {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}
