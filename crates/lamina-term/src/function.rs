use crate::shift::Shift;
use crate::{Constant, Nameable, Term, Variable};

/// Abstraction over `k >= 1` binders, outermost first.
///
/// Binder `i` (0-based) is referred to in the body at depth `k - i`.
#[derive(Debug, Clone)]
pub struct Function<N> {
    vars: Vec<Variable<N>>,
    body: Box<Term<N>>,
}

/// Binders waiting for a body; see [`bind`].
#[derive(Debug, Clone)]
pub struct Binders<N> {
    vars: Vec<Variable<N>>,
}

/// Starts an abstraction: `bind([x, y]).in_body(t)` is `λx y . t`.
pub fn bind<N: Nameable>(vars: impl IntoIterator<Item = Variable<N>>) -> Binders<N> {
    Binders {
        vars: vars.into_iter().collect(),
    }
}

impl<N: Nameable> Binders<N> {
    /// Binds every free occurrence of each binder's name in `body`.
    ///
    /// Occurrences of other names are free: unassigned ones receive the
    /// first free depth and already-free ones are pushed past the new
    /// binders. When two binders share a name the innermost wins.
    pub fn in_body(self, body: Term<N>) -> Function<N> {
        assert!(
            !self.vars.is_empty(),
            "an abstraction needs at least one binder"
        );
        let k = self.vars.len();
        let body = body.bind_names(&self.vars, 0);
        let vars = self
            .vars
            .into_iter()
            .enumerate()
            .map(|(i, v)| Variable {
                name: v.name,
                depth: k - i,
            })
            .collect();
        Function {
            vars,
            body: Box::new(body),
        }
    }
}

impl<N: Nameable> Function<N> {
    pub fn vars(&self) -> &[Variable<N>] {
        &self.vars
    }

    pub fn body(&self) -> &Term<N> {
        &self.body
    }

    /// Number of binders.
    pub fn arity(&self) -> usize {
        self.vars.len()
    }

    fn with_body(&self, body: Term<N>) -> Self {
        Self {
            vars: self.vars.clone(),
            body: Box::new(body),
        }
    }

    /// Rebuilds binder depths for a fresh binder list.
    fn from_parts(names: Vec<N>, body: Term<N>) -> Self {
        let k = names.len();
        let vars = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Variable { name, depth: k - i })
            .collect();
        Self {
            vars,
            body: Box::new(body),
        }
    }

    /// Drops the outermost binder, or returns the bare body if it was the last.
    fn peel(&self, body: Term<N>) -> Term<N> {
        if self.arity() > 1 {
            Term::Abs(Self {
                vars: self.vars[1..].to_vec(),
                body: Box::new(body),
            })
        } else {
            body
        }
    }

    pub(crate) fn shift(&self, shift: Shift) -> Self {
        self.with_body(self.body.shift(shift.under(self.arity())))
    }

    pub(crate) fn bind_names(&self, binders: &[Variable<N>], offset: usize) -> Self {
        self.with_body(self.body.bind_names(binders, offset + self.arity()))
    }

    pub(crate) fn find(&self, var: &Variable<N>) -> bool {
        self.body.find(&var.shifted(Shift::up(self.arity())))
    }

    pub(crate) fn body_abstract(&self, var: &Variable<N>, name: &Constant<N>) -> Self {
        let var = var.shifted(Shift::up(self.arity()));
        self.with_body(self.body.body_abstract(&var, name))
    }

    pub(crate) fn replace(&self, var: &Variable<N>, term: &Term<N>) -> (Self, bool) {
        let up = Shift::up(self.arity());
        let (body, again) = self.body.replace(&var.shifted(up), &term.shift(up));
        (self.with_body(body), again)
    }

    /// One beta step: substitutes `arg` for the outermost binder and reduces
    /// the result until no further reduction is flagged.
    pub fn apply(&self, arg: Term<N>) -> Term<N> {
        let k = self.arity();
        let arg = arg.prepare_as_rhs().shift(Shift::up(k));
        let (body, mut again) = self.body.replace(&self.vars[0], &arg);
        let mut result = body.shift(Shift::new(k, -1));
        while again {
            (result, again) = result.again();
        }
        self.peel(result)
    }

    /// Single-step form of [`Function::apply`] used by the trampoline: the
    /// argument is already in place and the again flag is handed back.
    pub fn again_apply(&self, arg: &Term<N>) -> (Term<N>, bool) {
        let k = self.arity();
        let (body, again) = self.body.replace(&self.vars[0], &arg.shift(Shift::up(k)));
        (self.peel(body.shift(Shift::new(k, -1))), again)
    }

    /// Collapses `λx1..xk . (g xk)` when `xk` does not occur in `g`.
    ///
    /// The remaining binders `x1..x(k-1)` are flattened together with `g`'s
    /// own binders when `g` is an abstraction. Any other shape comes back
    /// unchanged.
    pub fn eta_reduce(&self) -> Term<N> {
        let Term::App(left, right) = &*self.body else {
            return Term::Abs(self.clone());
        };
        let innermost = &self.vars[self.arity() - 1];
        let matches_innermost = matches!(&**right, Term::Var(v) if v == innermost);
        if !matches_innermost || left.find(innermost) {
            return Term::Abs(self.clone());
        }

        let outer: Vec<N> = self.vars[..self.arity() - 1]
            .iter()
            .map(|v| v.name.clone())
            .collect();
        let g = left.shift(Shift::new(1, -1));
        match g {
            Term::Abs(inner) => {
                let mut names = outer;
                names.extend(inner.vars.iter().map(|v| v.name.clone()));
                Term::Abs(Self::from_parts(names, *inner.body))
            }
            other if outer.is_empty() => other,
            other => Term::Abs(Self::from_parts(outer, other)),
        }
    }

    /// Applies the abstraction to the `_` placeholder until something other
    /// than an abstraction comes out.
    pub fn free_apply_through(&self, placeholder: &Variable<N>) -> Term<N> {
        let mut result = self.apply(Term::Var(placeholder.clone()));
        while let Term::Abs(g) = &result {
            result = g.apply(Term::Var(placeholder.clone()));
        }
        result
    }

    pub(crate) fn strict_eq(&self, other: &Self) -> bool {
        self.vars == other.vars && self.body.strict_eq(&other.body)
    }
}
