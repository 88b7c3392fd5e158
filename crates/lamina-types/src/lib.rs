//! Type representations for lamina.
//!
//! Monotypes are variables, constants, constructor applications and
//! dependent type instances. A [`Polytype`] quantifies over type variables
//! (`forall`), and a [`DependentType`] quantifies over expression-level
//! kind variables (`mapval`). Expression indices are [`lamina_term::Term`]s.

use std::fmt;

use lamina_term::{Nameable, Term, TermContext, Variable};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Name of the non-binding wildcard binder.
pub const WILDCARD: &str = "_";

/// Bound-context tag of variables that no inference session owns.
pub const UNBOUND_CONTEXT: i32 = -1;

/// A type variable, tagged with the inference session that created it.
///
/// Two variables are the same only when both name and context agree.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeVariable<N> {
    pub name: N,
    pub context: i32,
}

impl<N: Nameable> TypeVariable<N> {
    pub fn new(name: N) -> Self {
        Self { name, context: 0 }
    }

    pub fn named(name: &str) -> Self {
        Self::new(N::from(name.to_string()))
    }

    /// The `_` binder; instantiating it substitutes nothing.
    pub fn wildcard() -> Self {
        Self::named(WILDCARD)
    }

    pub fn bound_in(mut self, context: i32) -> Self {
        self.context = context;
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.name.name() == WILDCARD
    }

    /// `name#context`, unique across sessions.
    pub fn key(&self) -> String {
        format!("{}#{}", self.name.name(), self.context)
    }
}

/// How a constant is printed when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantStyle {
    /// `(Array a)`
    Plain,
    /// `(a -> b)`; bare, the constant prints as `(->)`.
    Infix,
    /// The name is split at `split_at` and wraps the parameters: `[a]`.
    Enclosing { split_at: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeConstant<N> {
    pub name: N,
    pub style: ConstantStyle,
}

impl<N: Nameable> TypeConstant<N> {
    pub fn plain(name: &str) -> Self {
        Self::styled(name, ConstantStyle::Plain)
    }

    pub fn infix(name: &str) -> Self {
        Self::styled(name, ConstantStyle::Infix)
    }

    /// `enclosing("[]", 1)` prints its parameter as `[a]`.
    pub fn enclosing(name: &str, split_at: usize) -> Self {
        assert!(
            split_at <= name.len() && name.is_char_boundary(split_at),
            "cannot split enclosing constant `{name}` at {split_at}"
        );
        Self::styled(name, ConstantStyle::Enclosing { split_at })
    }

    fn styled(name: &str, style: ConstantStyle) -> Self {
        Self {
            name: N::from(name.to_string()),
            style,
        }
    }
}

// ---------------------------------------------------------------------------
// Stock constructors
// ---------------------------------------------------------------------------

pub const ARROW: &str = "->";
pub const PAIR: &str = "&";
pub const UNION: &str = "|";

/// `a -> b`
pub fn function<N: Nameable>(a: Monotype<N>, b: Monotype<N>) -> Monotype<N> {
    Monotype::app(TypeConstant::infix(ARROW), vec![a, b])
}

/// `a & b`
pub fn cons<N: Nameable>(a: Monotype<N>, b: Monotype<N>) -> Monotype<N> {
    Monotype::app(TypeConstant::infix(PAIR), vec![a, b])
}

/// `a | b`
pub fn join<N: Nameable>(a: Monotype<N>, b: Monotype<N>) -> Monotype<N> {
    Monotype::app(TypeConstant::infix(UNION), vec![a, b])
}

/// `[a]`
pub fn list<N: Nameable>(a: Monotype<N>) -> Monotype<N> {
    Monotype::app(TypeConstant::enclosing("[]", 1), vec![a])
}

// ---------------------------------------------------------------------------
// Monotypes
// ---------------------------------------------------------------------------

/// A constant applied to type parameters.
#[derive(Debug, Clone)]
pub struct Application<N> {
    pub head: TypeConstant<N>,
    pub params: Vec<Monotype<N>>,
}

impl<N: Nameable> Application<N> {
    pub fn new(head: TypeConstant<N>, params: Vec<Monotype<N>>) -> Self {
        Self { head, params }
    }

    /// Appends more parameters to the same head.
    pub fn apply(mut self, params: impl IntoIterator<Item = Monotype<N>>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn replace(&self, var: &TypeVariable<N>, with: &Monotype<N>) -> Self {
        Self {
            head: self.head.clone(),
            params: self.params.iter().map(|p| p.replace(var, with)).collect(),
        }
    }

    fn collect_free(&self, out: &mut Vec<TypeVariable<N>>) {
        for p in &self.params {
            p.collect_free(out);
        }
    }

    fn map_params(&self, f: impl FnMut(&Monotype<N>) -> Monotype<N>) -> Self {
        Self {
            head: self.head.clone(),
            params: self.params.iter().map(f).collect(),
        }
    }
}

/// Judgment `(term: kind)` placed in a dependent index.
#[derive(Debug, Clone)]
pub struct IndexJudgment<N> {
    pub term: Term<N>,
    pub kind: Monotype<N>,
}

impl<N: Nameable> IndexJudgment<N> {
    pub fn new(term: Term<N>, kind: Monotype<N>) -> Self {
        Self { term, kind }
    }
}

impl<N: Nameable> PartialEq for IndexJudgment<N> {
    fn eq(&self, other: &Self) -> bool {
        self.term.strict_eq(&other.term) && self.kind == other.kind
    }
}

/// A type function indexed by expressions: `(Array a; n)`.
#[derive(Debug, Clone)]
pub struct DependentTypeInstance<N> {
    pub function: Application<N>,
    pub index: Vec<IndexJudgment<N>>,
}

impl<N: Nameable> DependentTypeInstance<N> {
    pub fn new(function: Application<N>, index: Vec<IndexJudgment<N>>) -> Self {
        Self { function, index }
    }

    pub fn replace(&self, var: &TypeVariable<N>, with: &Monotype<N>) -> Self {
        self.map_types(|m| m.replace(var, with))
    }

    /// Applies `f` to every type inside, leaving index terms alone.
    pub fn map_types(&self, mut f: impl FnMut(&Monotype<N>) -> Monotype<N>) -> Self {
        Self {
            function: self.function.map_params(&mut f),
            index: self
                .index
                .iter()
                .map(|j| IndexJudgment::new(j.term.clone(), f(&j.kind)))
                .collect(),
        }
    }

    /// Turns the trailing variable indices back into `mapval` binders:
    /// `(Array a; n)` with `n: Uint` becomes `mapval (n: Uint) . (Array a)`.
    /// Without a trailing variable index the instance is returned as is.
    pub fn generalize_index(&self) -> Type<N> {
        let split = self
            .index
            .iter()
            .rposition(|j| !matches!(j.term, Term::Var(_)))
            .map_or(0, |i| i + 1);
        if split == self.index.len() {
            return Type::Mono(Monotype::Instance(self.clone()));
        }
        let binders = self.index[split..]
            .iter()
            .filter_map(|j| match &j.term {
                Term::Var(v) => Some((v.clone(), j.kind.clone())),
                _ => None,
            })
            .collect();
        Type::Dependent(DependentType {
            binders,
            instance: Self::new(self.function.clone(), self.index[..split].to_vec()),
        })
    }

    fn collect_free(&self, out: &mut Vec<TypeVariable<N>>) {
        self.function.collect_free(out);
        for j in &self.index {
            j.kind.collect_free(out);
        }
    }
}

#[derive(Debug, Clone)]
pub enum Monotype<N> {
    Var(TypeVariable<N>),
    Const(TypeConstant<N>),
    App(Application<N>),
    Instance(DependentTypeInstance<N>),
}

impl<N: Nameable> Monotype<N> {
    pub fn var(name: &str) -> Self {
        Monotype::Var(TypeVariable::named(name))
    }

    pub fn constant(name: &str) -> Self {
        Monotype::Const(TypeConstant::plain(name))
    }

    pub fn app(head: TypeConstant<N>, params: Vec<Monotype<N>>) -> Self {
        Monotype::App(Application::new(head, params))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Monotype::Var(_))
    }

    pub fn as_variable(&self) -> Option<&TypeVariable<N>> {
        match self {
            Monotype::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Head name and parameters. Variables and constants have no
    /// parameters; an instance splits as its type function.
    pub fn split(&self) -> (&str, &[Monotype<N>]) {
        match self {
            Monotype::Var(v) => (v.name.name(), &[]),
            Monotype::Const(c) => (c.name.name(), &[]),
            Monotype::App(a) => (a.head.name.name(), &a.params),
            Monotype::Instance(d) => (d.function.head.name.name(), &d.function.params),
        }
    }

    /// `self[var := with]`
    pub fn replace(&self, var: &TypeVariable<N>, with: &Monotype<N>) -> Self {
        match self {
            Monotype::Var(v) if v == var => with.clone(),
            Monotype::Var(_) | Monotype::Const(_) => self.clone(),
            Monotype::App(a) => Monotype::App(a.replace(var, with)),
            Monotype::Instance(d) => Monotype::Instance(d.replace(var, with)),
        }
    }

    /// Simultaneous substitution; the first matching variable wins.
    pub fn replace_all(&self, vars: &[TypeVariable<N>], with: &[Monotype<N>]) -> Self {
        assert_eq!(vars.len(), with.len(), "replace_all needs one type per variable");
        match self {
            Monotype::Var(v) => vars
                .iter()
                .position(|w| w == v)
                .map_or_else(|| self.clone(), |i| with[i].clone()),
            Monotype::Const(_) => self.clone(),
            Monotype::App(a) => Monotype::App(a.map_params(|p| p.replace_all(vars, with))),
            Monotype::Instance(d) => Monotype::Instance(d.map_types(|m| m.replace_all(vars, with))),
        }
    }

    /// Free type variables in first-occurrence order, without duplicates.
    pub fn free_variables(&self) -> Vec<TypeVariable<N>> {
        let mut out = Vec::new();
        self.collect_free(&mut out);
        out
    }

    fn collect_free(&self, out: &mut Vec<TypeVariable<N>>) {
        match self {
            Monotype::Var(v) => {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
            Monotype::Const(_) => {}
            Monotype::App(a) => a.collect_free(out),
            Monotype::Instance(d) => d.collect_free(out),
        }
    }

    /// Whether `var` occurs strictly inside this type. A variable does not
    /// occur in itself.
    pub fn occurs(&self, var: &TypeVariable<N>) -> bool {
        !self.is_variable() && self.free_variables().contains(var)
    }

    pub fn generalize(self) -> Polytype<N> {
        Type::Mono(self).generalize()
    }
}

impl<N: Nameable> PartialEq for Application<N> {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.params == other.params
    }
}

impl<N: Nameable> PartialEq for DependentTypeInstance<N> {
    fn eq(&self, other: &Self) -> bool {
        self.function == other.function && self.index == other.index
    }
}

/// Structural equality on (head, parameters).
impl<N: Nameable> PartialEq for Monotype<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Monotype::Var(a), Monotype::Var(b)) => a == b,
            (Monotype::Const(a), Monotype::Const(b)) => a == b,
            (Monotype::App(a), Monotype::App(b)) => a == b,
            (Monotype::Instance(a), Monotype::Instance(b)) => a == b,
            _ => false,
        }
    }
}

impl<N: Nameable> From<TypeVariable<N>> for Monotype<N> {
    fn from(v: TypeVariable<N>) -> Self {
        Monotype::Var(v)
    }
}

impl<N: Nameable> From<TypeConstant<N>> for Monotype<N> {
    fn from(c: TypeConstant<N>) -> Self {
        Monotype::Const(c)
    }
}

impl<N: Nameable> From<Application<N>> for Monotype<N> {
    fn from(a: Application<N>) -> Self {
        Monotype::App(a)
    }
}

impl<N: Nameable> From<DependentTypeInstance<N>> for Monotype<N> {
    fn from(d: DependentTypeInstance<N>) -> Self {
        Monotype::Instance(d)
    }
}

// ---------------------------------------------------------------------------
// Dependent types
// ---------------------------------------------------------------------------

/// `mapval (a: A) (b: B) . (F x)`: a type function waiting for expression
/// indices. Instantiated binders are recorded in `instance.index`.
#[derive(Debug, Clone)]
pub struct DependentType<N> {
    binders: Vec<(Variable<N>, Monotype<N>)>,
    instance: DependentTypeInstance<N>,
}

impl<N: Nameable> DependentType<N> {
    /// # Panics
    /// When `binders` is empty.
    pub fn new(binders: Vec<(Variable<N>, Monotype<N>)>, function: Application<N>) -> Self {
        assert!(!binders.is_empty(), "a dependent type needs at least one kind binder");
        Self {
            binders,
            instance: DependentTypeInstance::new(function, Vec::new()),
        }
    }

    pub fn binders(&self) -> &[(Variable<N>, Monotype<N>)] {
        &self.binders
    }

    pub fn function(&self) -> &Application<N> {
        &self.instance.function
    }

    /// Indexes the first binder by `e`. Once every binder is indexed the
    /// result is a [`DependentTypeInstance`].
    pub fn instantiate_kind(&self, e: Term<N>) -> Type<N> {
        let (_, kind) = &self.binders[0];
        let mut instance = self.instance.clone();
        instance.index.push(IndexJudgment::new(e, kind.clone()));
        if self.binders.len() == 1 {
            return Type::Mono(Monotype::Instance(instance));
        }
        Type::Dependent(Self {
            binders: self.binders[1..].to_vec(),
            instance,
        })
    }

    /// Indexes every remaining binder by a fresh term variable.
    pub fn free_index(&self, cxt: &mut TermContext<N>) -> DependentTypeInstance<N> {
        self.index_with(|_| Term::Var(cxt.new_var()))
    }

    /// Indexes every remaining binder by its own variable.
    pub fn kind_instantiation(&self) -> DependentTypeInstance<N> {
        self.index_with(|v| Term::Var(v.clone()))
    }

    fn index_with(&self, mut f: impl FnMut(&Variable<N>) -> Term<N>) -> DependentTypeInstance<N> {
        let mut instance = self.instance.clone();
        for (v, kind) in &self.binders {
            instance.index.push(IndexJudgment::new(f(v), kind.clone()));
        }
        instance
    }

    pub fn replace(&self, var: &TypeVariable<N>, with: &Monotype<N>) -> Self {
        Self {
            binders: self
                .binders
                .iter()
                .map(|(v, kind)| (v.clone(), kind.replace(var, with)))
                .collect(),
            instance: self.instance.replace(var, with),
        }
    }

    fn replace_all(&self, vars: &[TypeVariable<N>], with: &[Monotype<N>]) -> Self {
        Self {
            binders: self
                .binders
                .iter()
                .map(|(v, kind)| (v.clone(), kind.replace_all(vars, with)))
                .collect(),
            instance: self.instance.map_types(|m| m.replace_all(vars, with)),
        }
    }

    fn collect_free(&self, out: &mut Vec<TypeVariable<N>>) {
        for (_, kind) in &self.binders {
            kind.collect_free(out);
        }
        self.instance.collect_free(out);
    }
}

impl<N: Nameable> PartialEq for DependentType<N> {
    fn eq(&self, other: &Self) -> bool {
        self.binders.len() == other.binders.len()
            && self
                .binders
                .iter()
                .zip(&other.binders)
                .all(|((v, a), (w, b))| v == w && a == b)
            && self.instance == other.instance
    }
}

// ---------------------------------------------------------------------------
// Polytypes
// ---------------------------------------------------------------------------

/// `forall a b . T`. The body is never itself a polytype.
#[derive(Debug, Clone)]
pub struct Polytype<N> {
    binders: Vec<TypeVariable<N>>,
    body: Box<Type<N>>,
}

impl<N: Nameable> Polytype<N> {
    /// Binds `binders` over `body`, merging a polytype body's binders
    /// after the new ones.
    pub fn new(binders: Vec<TypeVariable<N>>, body: Type<N>) -> Self {
        match body {
            Type::Poly(inner) => {
                let mut binders = binders;
                binders.extend(inner.binders);
                Self {
                    binders,
                    body: inner.body,
                }
            }
            body => Self {
                binders,
                body: Box::new(body),
            },
        }
    }

    /// A polytype with no binders; semantically the body itself.
    pub fn mono(body: Type<N>) -> Self {
        Self::new(Vec::new(), body)
    }

    pub fn binders(&self) -> &[TypeVariable<N>] {
        &self.binders
    }

    pub fn body(&self) -> &Type<N> {
        &self.body
    }

    pub fn into_body(self) -> Type<N> {
        *self.body
    }

    /// Substitutes `m` for the outermost binder. A `_` binder substitutes
    /// nothing. Returns the body once the last binder is consumed.
    pub fn instantiate(&self, m: &Monotype<N>) -> Type<N> {
        let Some((first, rest)) = self.binders.split_first() else {
            return (*self.body).clone();
        };
        let body = if first.is_wildcard() {
            (*self.body).clone()
        } else {
            self.body.replace(first, m)
        };
        if rest.is_empty() {
            body
        } else {
            Type::Poly(Self {
                binders: rest.to_vec(),
                body: Box::new(body),
            })
        }
    }

    /// Instantiates the leading binders with `ms`, in order.
    ///
    /// # Panics
    /// When more types than binders are supplied.
    pub fn specialize(&self, ms: &[Monotype<N>]) -> Type<N> {
        assert!(
            ms.len() <= self.binders.len(),
            "cannot specialize {} binders with {} types",
            self.binders.len(),
            ms.len()
        );
        let mut current = Type::Poly(self.clone());
        for m in ms {
            current = match current {
                Type::Poly(p) => p.instantiate(m),
                other => other,
            };
        }
        current
    }

    /// Free variables of the body not bound here.
    pub fn free_variables(&self) -> Vec<TypeVariable<N>> {
        self.body
            .free_variables()
            .into_iter()
            .filter(|v| !self.binders.contains(v))
            .collect()
    }
}

impl<N: Nameable> PartialEq for Polytype<N> {
    /// Alpha-equivalence: both bodies are instantiated with the same
    /// placeholders before comparing. Placeholder names share a prefix no
    /// variable of either body starts with.
    fn eq(&self, other: &Self) -> bool {
        if self.binders.len() != other.binders.len() {
            return false;
        }
        let mut taken = self.body.free_variables();
        taken.extend(other.body.free_variables());
        let mut prefix = WILDCARD.to_string();
        while taken.iter().any(|v| v.name.name().starts_with(&prefix)) {
            prefix.push_str(WILDCARD);
        }
        let placeholders: Vec<Monotype<N>> = (0..self.binders.len())
            .map(|i| {
                Monotype::Var(TypeVariable::named(&format!("{prefix}{i}")).bound_in(UNBOUND_CONTEXT))
            })
            .collect();
        self.body.replace_all(&self.binders, &placeholders)
            == other.body.replace_all(&other.binders, &placeholders)
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Type<N> {
    Mono(Monotype<N>),
    Dependent(DependentType<N>),
    Poly(Polytype<N>),
}

impl<N: Nameable> Type<N> {
    pub fn as_monotype(&self) -> Option<&Monotype<N>> {
        match self {
            Type::Mono(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_polytype(&self) -> Option<&Polytype<N>> {
        match self {
            Type::Poly(p) => Some(p),
            _ => None,
        }
    }

    /// Views any type as a polytype, with no binders unless it is one.
    pub fn into_polytype(self) -> Polytype<N> {
        match self {
            Type::Poly(p) => p,
            other => Polytype::mono(other),
        }
    }

    /// Binds the `_` wildcard over the type. Polytypes are returned as is.
    pub fn generalize(self) -> Polytype<N> {
        match self {
            Type::Poly(p) => p,
            other => Polytype::new(vec![TypeVariable::wildcard()], other),
        }
    }

    /// `self[var := with]`; a polytype binding `var` shadows it.
    pub fn replace(&self, var: &TypeVariable<N>, with: &Monotype<N>) -> Self {
        match self {
            Type::Mono(m) => Type::Mono(m.replace(var, with)),
            Type::Dependent(d) => Type::Dependent(d.replace(var, with)),
            Type::Poly(p) if p.binders.contains(var) => self.clone(),
            Type::Poly(p) => Type::Poly(Polytype {
                binders: p.binders.clone(),
                body: Box::new(p.body.replace(var, with)),
            }),
        }
    }

    pub fn replace_all(&self, vars: &[TypeVariable<N>], with: &[Monotype<N>]) -> Self {
        match self {
            Type::Mono(m) => Type::Mono(m.replace_all(vars, with)),
            Type::Dependent(d) => Type::Dependent(d.replace_all(vars, with)),
            Type::Poly(p) => {
                let (vars, with): (Vec<_>, Vec<_>) = vars
                    .iter()
                    .zip(with)
                    .filter(|(v, _)| !p.binders.contains(v))
                    .map(|(v, m)| (v.clone(), m.clone()))
                    .unzip();
                Type::Poly(Polytype {
                    binders: p.binders.clone(),
                    body: Box::new(p.body.replace_all(&vars, &with)),
                })
            }
        }
    }

    pub fn free_variables(&self) -> Vec<TypeVariable<N>> {
        match self {
            Type::Mono(m) => m.free_variables(),
            Type::Dependent(d) => {
                let mut out = Vec::new();
                d.collect_free(&mut out);
                out
            }
            Type::Poly(p) => p.free_variables(),
        }
    }
}

impl<N: Nameable> PartialEq for Type<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Mono(a), Type::Mono(b)) => a == b,
            (Type::Dependent(a), Type::Dependent(b)) => a == b,
            (Type::Poly(a), Type::Poly(b)) => a == b,
            _ => false,
        }
    }
}

impl<N: Nameable> From<Monotype<N>> for Type<N> {
    fn from(m: Monotype<N>) -> Self {
        Type::Mono(m)
    }
}

impl<N: Nameable> From<DependentType<N>> for Type<N> {
    fn from(d: DependentType<N>) -> Self {
        Type::Dependent(d)
    }
}

impl<N: Nameable> From<Polytype<N>> for Type<N> {
    fn from(p: Polytype<N>) -> Self {
        if p.binders.is_empty() {
            *p.body
        } else {
            Type::Poly(p)
        }
    }
}

// ---------------------------------------------------------------------------
// Judgments
// ---------------------------------------------------------------------------

/// `term: type`
#[derive(Debug, Clone)]
pub struct Judgment<N> {
    pub term: Term<N>,
    pub ty: Type<N>,
}

impl<N: Nameable> Judgment<N> {
    pub fn new(term: Term<N>, ty: impl Into<Type<N>>) -> Self {
        Self {
            term,
            ty: ty.into(),
        }
    }
}

impl<N: Nameable> PartialEq for Judgment<N> {
    fn eq(&self, other: &Self) -> bool {
        self.term.strict_eq(&other.term) && self.ty == other.ty
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl<N: Nameable> fmt::Display for TypeVariable<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.name())
    }
}

impl<N: Nameable> fmt::Display for TypeConstant<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            ConstantStyle::Infix => write!(f, "({})", self.name.name()),
            ConstantStyle::Plain | ConstantStyle::Enclosing { .. } => f.write_str(self.name.name()),
        }
    }
}

impl<N: Nameable> Application<N> {
    /// The application without its outer grouping: `a -> b`, `Array a`.
    fn write_inner(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.head.name.name();
        match (self.head.style, self.params.as_slice()) {
            (_, []) => write!(f, "{}", self.head),
            (ConstantStyle::Infix, [only]) => write!(f, "{} {only}", self.head),
            (ConstantStyle::Infix, [first, rest @ ..]) => {
                write!(f, "{first} {name} ")?;
                write_joined(f, rest, " ")
            }
            (ConstantStyle::Enclosing { .. }, params) => write_joined(f, params, " "),
            (ConstantStyle::Plain, params) => {
                write!(f, "{name} ")?;
                write_joined(f, params, " ")
            }
        }
    }
}

impl<N: Nameable> fmt::Display for Application<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return write!(f, "{}", self.head);
        }
        let (open, close) = match self.head.style {
            ConstantStyle::Enclosing { split_at } => self.head.name.name().split_at(split_at),
            _ => ("(", ")"),
        };
        f.write_str(open)?;
        self.write_inner(f)?;
        f.write_str(close)
    }
}

impl<N: Nameable> fmt::Display for DependentTypeInstance<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        self.function.write_inner(f)?;
        if !self.index.is_empty() {
            f.write_str("; ")?;
            let terms: Vec<&Term<N>> = self.index.iter().map(|j| &j.term).collect();
            write_joined(f, &terms, " ")?;
        }
        f.write_str(")")
    }
}

impl<N: Nameable> fmt::Display for IndexJudgment<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}: {})", self.term, self.kind)
    }
}

impl<N: Nameable> fmt::Display for Monotype<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Monotype::Var(v) => write!(f, "{v}"),
            Monotype::Const(c) => write!(f, "{c}"),
            Monotype::App(a) => write!(f, "{a}"),
            Monotype::Instance(d) => write!(f, "{d}"),
        }
    }
}

impl<N: Nameable> fmt::Display for DependentType<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mapval ")?;
        for (i, (v, kind)) in self.binders.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "({}: {kind})", v.name.name())?;
        }
        f.write_str(" . ")?;
        if self.instance.index.is_empty() {
            write!(f, "{}", self.instance.function)
        } else {
            write!(f, "{}", self.instance)
        }
    }
}

impl<N: Nameable> fmt::Display for Polytype<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.binders.is_empty() {
            return write!(f, "{}", self.body);
        }
        f.write_str("forall ")?;
        write_joined(f, &self.binders, " ")?;
        write!(f, " . {}", self.body)
    }
}

impl<N: Nameable> fmt::Display for Type<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Mono(m) => write!(f, "{m}"),
            Type::Dependent(d) => write!(f, "{d}"),
            Type::Poly(p) => write!(f, "{p}"),
        }
    }
}

impl<N: Nameable> fmt::Display for Judgment<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.term, self.ty)
    }
}
