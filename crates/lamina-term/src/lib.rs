//! De Bruijn-indexed lambda terms.
//!
//! A [`Term`] is a closed sum of variables, multi-binder abstractions,
//! applications, constants, strict lists, native instructions and let
//! forms. Every transformation returns a new term; nothing is mutated in
//! place.
//!
//! Depth convention for [`Variable`]: `0` means the occurrence has not been
//! assigned a binder yet, `1..=k` refers to the `k` nearest enclosing
//! binders (innermost is `1`), and anything larger is free with respect to
//! every enclosing abstraction. All depth arithmetic goes through
//! [`shift::Shift`].

use std::fmt;

pub mod combinators;
pub mod context;
mod equality;
mod function;
mod instruction;
pub mod list;
pub mod notation;
mod reduce;
pub mod shift;

pub use context::{TermContext, TermError};
pub use function::{Binders, Function, bind};
pub use instruction::{Action, Instruction, InstructionArgs, InstructionHead};
pub use notation::Notation;
pub use shift::Shift;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Anything that can report a canonical name.
///
/// Contexts mint fresh names through `From<String>`. Equality must agree
/// with [`Nameable::name`].
pub trait Nameable: Clone + fmt::Debug + PartialEq + From<String> {
    fn name(&self) -> &str;
}

/// Plain string identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(pub String);

impl Name {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Nameable for Name {
    fn name(&self) -> &str {
        &self.0
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Nameable for String {
    fn name(&self) -> &str {
        self
    }
}

pub(crate) fn make_name<N: Nameable>(s: &str) -> N {
    N::from(s.to_string())
}

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

/// A variable occurrence together with its binding depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable<N> {
    pub name: N,
    pub depth: usize,
}

impl<N: Nameable> Variable<N> {
    /// An occurrence with no binder assigned yet.
    pub fn new(name: N) -> Self {
        Self { name, depth: 0 }
    }

    pub fn named(name: &str) -> Self {
        Self::new(make_name(name))
    }

    pub fn at(name: &str, depth: usize) -> Self {
        Self {
            name: make_name(name),
            depth,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.depth == 0
    }

    pub fn shifted(&self, shift: Shift) -> Self {
        Self {
            name: self.name.clone(),
            depth: shift.depth(self.depth),
        }
    }

    /// Rewrites this occurrence for [`Binders::in_body`] when it sits under
    /// `offset` binders of the body being abstracted.
    pub(crate) fn bind_to(&self, binders: &[Variable<N>], offset: usize) -> Self {
        if !self.is_unassigned() && self.depth <= offset {
            return self.clone();
        }
        let k = binders.len();
        let matched = binders
            .iter()
            .rposition(|b| b.name.name() == self.name.name());
        let depth = match matched {
            Some(i) => offset + (k - i),
            None if self.is_unassigned() => offset + k + 1,
            None => self.depth + k,
        };
        Self {
            name: self.name.clone(),
            depth,
        }
    }
}

/// An opaque named leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant<N> {
    pub name: N,
}

impl<N: Nameable> Constant<N> {
    pub fn new(name: N) -> Self {
        Self { name }
    }

    pub fn named(name: &str) -> Self {
        Self::new(make_name(name))
    }
}

// ---------------------------------------------------------------------------
// Let forms
// ---------------------------------------------------------------------------

/// Surface form of a [`LetIn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetForm {
    /// `let x = a in b`
    Let,
    /// `b where x = a`
    Where,
}

/// A named local definition. The name is a constant, not a de Bruijn binder.
#[derive(Debug, Clone)]
pub struct LetIn<N> {
    pub name: Constant<N>,
    pub assignment: Box<Term<N>>,
    pub body: Box<Term<N>>,
    pub form: LetForm,
}

impl<N: Nameable> LetIn<N> {
    pub(crate) fn map(&self, mut f: impl FnMut(&Term<N>) -> Term<N>) -> Self {
        Self {
            name: self.name.clone(),
            assignment: Box::new(f(&self.assignment)),
            body: Box::new(f(&self.body)),
            form: self.form,
        }
    }
}

/// One `name = assignment` definition of a [`RecIn`].
#[derive(Debug, Clone)]
pub struct Def<N> {
    pub name: Constant<N>,
    pub assignment: Term<N>,
}

impl<N: Nameable> Def<N> {
    pub fn new(name: Constant<N>, assignment: Term<N>) -> Self {
        Self { name, assignment }
    }
}

/// Mutually recursive definitions scoped over a body:
/// `rec f = a and g = b in body`. Every name is visible in every
/// assignment and in the body.
#[derive(Debug, Clone)]
pub struct RecIn<N> {
    pub defs: Vec<Def<N>>,
    pub body: Box<Term<N>>,
}

impl<N: Nameable> RecIn<N> {
    pub fn names(&self) -> impl Iterator<Item = &Constant<N>> {
        self.defs.iter().map(|d| &d.name)
    }

    /// Whether one of the definitions is named `name`.
    pub fn defines(&self, name: &str) -> bool {
        self.names().any(|c| c.name.name() == name)
    }

    pub(crate) fn map(&self, mut f: impl FnMut(&Term<N>) -> Term<N>) -> Self {
        Self {
            defs: self
                .defs
                .iter()
                .map(|d| Def::new(d.name.clone(), f(&d.assignment)))
                .collect(),
            body: Box::new(f(&self.body)),
        }
    }
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// A lambda-calculus term.
#[derive(Debug, Clone)]
pub enum Term<N> {
    /// A variable occurrence.
    Var(Variable<N>),
    /// Simultaneous abstraction over one or more binders.
    Abs(Function<N>),
    /// Operator applied to a single operand.
    App(Box<Term<N>>, Box<Term<N>>),
    /// An opaque named constant.
    Const(Constant<N>),
    /// A strict sequence of terms.
    List(Vec<Term<N>>),
    /// A native operation with a fixed arity.
    Instr(Instruction<N>),
    /// A named local definition.
    Let(LetIn<N>),
    /// Mutually recursive local definitions.
    Rec(RecIn<N>),
}

impl<N: Nameable> Term<N> {
    pub fn var(name: &str) -> Self {
        Term::Var(Variable::named(name))
    }

    pub fn var_at(name: &str, depth: usize) -> Self {
        Term::Var(Variable::at(name, depth))
    }

    pub fn constant(name: &str) -> Self {
        Term::Const(Constant::named(name))
    }

    pub fn app(left: Term<N>, right: Term<N>) -> Self {
        Term::App(Box::new(left), Box::new(right))
    }

    /// Left-nested application: `app_many(f, [a, b])` is `((f a) b)`.
    pub fn app_many(head: Term<N>, args: impl IntoIterator<Item = Term<N>>) -> Self {
        args.into_iter().fold(head, Term::app)
    }

    pub fn list(elems: impl IntoIterator<Item = Term<N>>) -> Self {
        Term::List(elems.into_iter().collect())
    }

    pub fn let_in(name: Constant<N>, assignment: Term<N>, body: Term<N>) -> Self {
        Term::Let(LetIn {
            name,
            assignment: Box::new(assignment),
            body: Box::new(body),
            form: LetForm::Let,
        })
    }

    pub fn where_in(name: Constant<N>, assignment: Term<N>, body: Term<N>) -> Self {
        Term::Let(LetIn {
            name,
            assignment: Box::new(assignment),
            body: Box::new(body),
            form: LetForm::Where,
        })
    }

    /// `rec d1 and d2 .. in body`.
    ///
    /// # Panics
    /// When `defs` is empty.
    pub fn rec_in(defs: Vec<Def<N>>, body: Term<N>) -> Self {
        assert!(!defs.is_empty(), "a rec needs at least one definition");
        Term::Rec(RecIn {
            defs,
            body: Box::new(body),
        })
    }

    /// Whether the term can consume an argument directly.
    pub fn is_applicable(&self) -> bool {
        matches!(self, Term::Abs(_) | Term::Instr(_))
    }

    pub fn as_function(&self) -> Option<&Function<N>> {
        match self {
            Term::Abs(f) => Some(f),
            _ => None,
        }
    }

    /// Adds `delta` to the depth of every variable deeper than `threshold`.
    pub fn update_vars(&self, threshold: usize, delta: isize) -> Self {
        self.shift(Shift::new(threshold, delta))
    }

    pub fn shift(&self, shift: Shift) -> Self {
        match self {
            Term::Var(v) => Term::Var(v.shifted(shift)),
            Term::Abs(f) => Term::Abs(f.shift(shift)),
            Term::App(l, r) => Term::app(l.shift(shift), r.shift(shift)),
            Term::Const(_) => self.clone(),
            Term::List(es) => Term::List(es.iter().map(|e| e.shift(shift)).collect()),
            Term::Instr(i) => Term::Instr(i.map_args(|a| a.shift(shift))),
            Term::Let(l) => Term::Let(l.map(|t| t.shift(shift))),
            Term::Rec(r) => Term::Rec(r.map(|t| t.shift(shift))),
        }
    }

    /// Gives unassigned variables depth 1 so they stay free once the term is
    /// inserted as an argument. Abstractions are left as they are.
    pub fn prepare_as_rhs(&self) -> Self {
        match self {
            Term::Var(v) if v.is_unassigned() => Term::Var(Variable {
                name: v.name.clone(),
                depth: 1,
            }),
            Term::Var(_) | Term::Abs(_) | Term::Const(_) => self.clone(),
            Term::App(l, r) => Term::app(l.prepare_as_rhs(), r.prepare_as_rhs()),
            Term::List(es) => Term::List(es.iter().map(Term::prepare_as_rhs).collect()),
            Term::Instr(i) => Term::Instr(i.map_args(Term::prepare_as_rhs)),
            Term::Let(l) => Term::Let(l.map(Term::prepare_as_rhs)),
            Term::Rec(r) => Term::Rec(r.map(Term::prepare_as_rhs)),
        }
    }

    /// Rewrites free occurrences for the binders of an enclosing
    /// abstraction; `offset` counts the binders already passed.
    pub(crate) fn bind_names(&self, binders: &[Variable<N>], offset: usize) -> Self {
        match self {
            Term::Var(v) => Term::Var(v.bind_to(binders, offset)),
            Term::Abs(f) => Term::Abs(f.bind_names(binders, offset)),
            Term::App(l, r) => Term::app(
                l.bind_names(binders, offset),
                r.bind_names(binders, offset),
            ),
            Term::Const(_) => self.clone(),
            Term::List(es) => Term::List(es.iter().map(|e| e.bind_names(binders, offset)).collect()),
            Term::Instr(i) => Term::Instr(i.map_args(|a| a.bind_names(binders, offset))),
            Term::Let(l) => Term::Let(l.map(|t| t.bind_names(binders, offset))),
            Term::Rec(r) => Term::Rec(r.map(|t| t.bind_names(binders, offset))),
        }
    }

    /// Replaces every `Const(name)` with `var`, stopping at lets and recs
    /// that rebind `name`.
    pub fn body_abstract(&self, var: &Variable<N>, name: &Constant<N>) -> Self {
        match self {
            Term::Const(c) if c.name.name() == name.name.name() => Term::Var(var.clone()),
            Term::Var(_) | Term::Const(_) => self.clone(),
            Term::Abs(f) => Term::Abs(f.body_abstract(var, name)),
            Term::App(l, r) => Term::app(l.body_abstract(var, name), r.body_abstract(var, name)),
            Term::List(es) => Term::List(es.iter().map(|e| e.body_abstract(var, name)).collect()),
            Term::Instr(i) => Term::Instr(i.map_args(|a| a.body_abstract(var, name))),
            Term::Let(l) if l.name.name.name() == name.name.name() => self.clone(),
            Term::Let(l) => Term::Let(l.map(|t| t.body_abstract(var, name))),
            Term::Rec(r) if r.defines(name.name.name()) => self.clone(),
            Term::Rec(r) => Term::Rec(r.map(|t| t.body_abstract(var, name))),
        }
    }

    /// Whether `var` (name and depth) occurs in the term.
    pub fn find(&self, var: &Variable<N>) -> bool {
        match self {
            Term::Var(v) => v == var,
            Term::Abs(f) => f.find(var),
            Term::App(l, r) => l.find(var) || r.find(var),
            Term::Const(_) => false,
            Term::List(es) => es.iter().any(|e| e.find(var)),
            Term::Instr(i) => i.args().iter().any(|a| a.find(var)),
            Term::Let(l) => l.assignment.find(var) || l.body.find(var),
            Term::Rec(r) => r.defs.iter().any(|d| d.assignment.find(var)) || r.body.find(var),
        }
    }

    /// Variables deeper than `threshold`, in left-to-right order.
    pub fn extract_variables(&self, threshold: usize) -> Vec<Variable<N>> {
        let mut out = Vec::new();
        self.extract_into(threshold, &mut out);
        out
    }

    fn extract_into(&self, threshold: usize, out: &mut Vec<Variable<N>>) {
        match self {
            Term::Var(v) => {
                if v.depth > threshold {
                    out.push(v.clone());
                }
            }
            Term::Abs(f) => f.body().extract_into(threshold + f.arity(), out),
            Term::App(l, r) => {
                l.extract_into(threshold, out);
                r.extract_into(threshold, out);
            }
            Term::Const(_) => {}
            Term::List(es) => es.iter().for_each(|e| e.extract_into(threshold, out)),
            Term::Instr(i) => i.args().iter().for_each(|a| a.extract_into(threshold, out)),
            Term::Let(l) => {
                l.assignment.extract_into(threshold, out);
                l.body.extract_into(threshold, out);
            }
            Term::Rec(r) => {
                r.defs.iter().for_each(|d| d.assignment.extract_into(threshold, out));
                r.body.extract_into(threshold, out);
            }
        }
    }

    /// Every identifier in the term, binders included, left to right.
    pub fn collect(&self) -> Vec<N> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<N>) {
        match self {
            Term::Var(v) => out.push(v.name.clone()),
            Term::Abs(f) => {
                out.extend(f.vars().iter().map(|v| v.name.clone()));
                f.body().collect_into(out);
            }
            Term::App(l, r) => {
                l.collect_into(out);
                r.collect_into(out);
            }
            Term::Const(c) => out.push(c.name.clone()),
            Term::List(es) => es.iter().for_each(|e| e.collect_into(out)),
            Term::Instr(i) => i.args().iter().for_each(|a| a.collect_into(out)),
            Term::Let(l) => {
                out.push(l.name.name.clone());
                l.assignment.collect_into(out);
                l.body.collect_into(out);
            }
            Term::Rec(r) => {
                for d in &r.defs {
                    out.push(d.name.name.clone());
                    d.assignment.collect_into(out);
                }
                r.body.collect_into(out);
            }
        }
    }

    /// Flattens containers into their elements; every other term is a leaf.
    pub fn flatten(&self) -> Vec<Term<N>> {
        match self {
            Term::List(es) => es.iter().flat_map(Term::flatten).collect(),
            Term::Instr(i) => i.args().iter().flat_map(Term::flatten).collect(),
            Term::Let(l) => {
                let mut out = vec![Term::Const(l.name.clone()), (*l.assignment).clone()];
                out.extend(l.body.flatten());
                out
            }
            Term::Rec(r) => {
                let mut out: Vec<Term<N>> = r
                    .defs
                    .iter()
                    .flat_map(|d| [Term::Const(d.name.clone()), d.assignment.clone()])
                    .collect();
                out.extend(r.body.flatten());
                out
            }
            _ => vec![self.clone()],
        }
    }

    /// Renders the term with depths, e.g. `λx . x[1]`.
    pub fn strict_string(&self) -> String {
        notation::render(self, &Notation::default(), true)
    }

    /// Renders the term with caller-supplied glyphs.
    pub fn display_with<'a>(&'a self, notation: &'a Notation) -> notation::Rendered<'a, N> {
        notation::Rendered {
            term: self,
            notation,
        }
    }
}

impl<N: Nameable> From<Function<N>> for Term<N> {
    fn from(f: Function<N>) -> Self {
        Term::Abs(f)
    }
}

impl<N: Nameable> From<Variable<N>> for Term<N> {
    fn from(v: Variable<N>) -> Self {
        Term::Var(v)
    }
}

impl<N: Nameable> From<Constant<N>> for Term<N> {
    fn from(c: Constant<N>) -> Self {
        Term::Const(c)
    }
}

impl<N: Nameable> From<Instruction<N>> for Term<N> {
    fn from(i: Instruction<N>) -> Self {
        Term::Instr(i)
    }
}

impl<N: Nameable> fmt::Display for Term<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&notation::render(self, &Notation::default(), false))
    }
}
