//! Per-session type context.
//!
//! A [`TypeContext`] owns the equivalence classes built by unification,
//! a parallel map for expression-level index variables, the fresh-variable
//! counter, and the stack the type-algebra rules operate on.
//!
//! Classes are keyed by variable only: `find` on a non-variable returns it
//! unchanged. There is no path compression and no rollback; a failed
//! unification keeps the unions it made before failing.

use std::collections::BTreeMap;
use std::fmt;

use lamina_term::{Nameable, Term, TermContext, Variable};
use lamina_types::{
    Application, DependentTypeInstance, IndexJudgment, Monotype, Polytype, Type, TypeVariable,
    cons, function, join,
};

use crate::error::AlgebraError;
use crate::status::Status;
use crate::trace::{UnifyAction, UnifyStep};

#[derive(Debug)]
pub struct TypeContext<N> {
    context_number: i32,
    next_var: u32,
    /// Variable key -> representative.
    classes: BTreeMap<String, Monotype<N>>,
    /// Index variable key -> representative term.
    kinds: BTreeMap<String, Term<N>>,
    stack: Vec<Type<N>>,
    /// When true, unification steps are recorded.
    tracing: bool,
    unify_trace: Vec<UnifyStep>,
}

#[derive(Debug, Clone, Copy)]
enum Expect {
    Monotype,
    Polytype,
    Any,
}

fn kind_key<N: Nameable>(v: &Variable<N>) -> String {
    format!("{}[{}]", v.name.name(), v.depth)
}

/// A plain application counts as an instance with no indices.
fn index_count<N>(m: &Monotype<N>) -> usize {
    match m {
        Monotype::Instance(d) => d.index.len(),
        _ => 0,
    }
}

impl<N: Nameable> Default for TypeContext<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Nameable> TypeContext<N> {
    pub fn new() -> Self {
        Self::with_var_offset(0)
    }

    /// Start fresh-variable numbering at `offset` (for deterministic tests).
    pub fn with_var_offset(offset: u32) -> Self {
        Self {
            context_number: 0,
            next_var: offset,
            classes: BTreeMap::new(),
            kinds: BTreeMap::new(),
            stack: Vec::new(),
            tracing: false,
            unify_trace: Vec::new(),
        }
    }

    /// Tags every variable this context creates with `number`.
    pub fn with_context_number(mut self, number: i32) -> Self {
        self.context_number = number;
        self
    }

    /// A child context starting from the parent's classes and counter.
    /// The two evolve independently afterwards; the stack is not shared.
    pub fn inherit(parent: &Self) -> Self {
        Self {
            context_number: parent.context_number,
            next_var: parent.next_var,
            classes: parent.classes.clone(),
            kinds: parent.kinds.clone(),
            stack: Vec::new(),
            tracing: false,
            unify_trace: Vec::new(),
        }
    }

    pub fn context_number(&self) -> i32 {
        self.context_number
    }

    /// A fresh variable named `$<n>`.
    pub fn new_var(&mut self) -> TypeVariable<N> {
        let n = self.next_var;
        self.next_var += 1;
        TypeVariable::named(&format!("${n}")).bound_in(self.context_number)
    }

    pub fn fresh(&mut self) -> Monotype<N> {
        Monotype::Var(self.new_var())
    }

    // -----------------------------------------------------------------------
    // Equivalence classes
    // -----------------------------------------------------------------------

    /// Representative of `m`'s class, or `m` itself when unmapped.
    pub fn find(&self, m: &Monotype<N>) -> Monotype<N> {
        let mut current = m.clone();
        loop {
            let next = match &current {
                Monotype::Var(v) => self.classes.get(&v.key()),
                _ => None,
            };
            match next {
                Some(rep) if *rep != current => current = rep.clone(),
                _ => return current,
            }
        }
    }

    /// Representative of an index term's class.
    pub fn find_kind(&self, e: &Term<N>) -> Term<N> {
        let mut current = e.clone();
        loop {
            let next = match &current {
                Term::Var(v) => self.kinds.get(&kind_key(v)),
                _ => None,
            };
            match next {
                Some(rep) if !rep.strict_eq(&current) => current = rep.clone(),
                _ => return current,
            }
        }
    }

    /// `m` with every variable replaced by its representative, recursively.
    pub fn resolve(&self, m: &Monotype<N>) -> Monotype<N> {
        match self.find(m) {
            Monotype::App(a) => Monotype::App(self.resolve_application(&a)),
            Monotype::Instance(d) => Monotype::Instance(DependentTypeInstance::new(
                self.resolve_application(&d.function),
                d.index
                    .iter()
                    .map(|j| IndexJudgment::new(self.find_kind(&j.term), self.resolve(&j.kind)))
                    .collect(),
            )),
            other => other,
        }
    }

    fn resolve_application(&self, a: &Application<N>) -> Application<N> {
        Application::new(a.head.clone(), a.params.iter().map(|p| self.resolve(p)).collect())
    }

    /// Declares `a` and `b` the same type; the variable side joins the
    /// other side's class.
    ///
    /// # Panics
    /// When neither side is a type variable.
    pub fn union(&mut self, a: &Monotype<N>, b: &Monotype<N>) {
        match (a, b) {
            (Monotype::Var(v), _) => {
                self.classes.insert(v.key(), b.clone());
            }
            (_, Monotype::Var(v)) => {
                self.classes.insert(v.key(), a.clone());
            }
            _ => panic!("cannot union two non-variable types `{a}` and `{b}`"),
        }
    }

    // -----------------------------------------------------------------------
    // Unification
    // -----------------------------------------------------------------------

    /// Makes `a` and `b` the same type, or reports why they cannot be.
    pub fn unify(&mut self, a: &Monotype<N>, b: &Monotype<N>) -> Status {
        let ta = self.find(a);
        let tb = self.find(b);
        if ta == tb {
            self.push_unify_step(UnifyAction::Identity, &ta, &tb, "same representative".into());
            return Status::Ok;
        }
        match (&ta, &tb) {
            (Monotype::Var(v), _) => self.bind(v, &ta, &tb),
            (_, Monotype::Var(v)) => self.bind(v, &tb, &ta),
            _ => self.decompose(&ta, &tb),
        }
    }

    fn bind(&mut self, var: &TypeVariable<N>, from: &Monotype<N>, to: &Monotype<N>) -> Status {
        let resolved = self.resolve(to);
        if resolved.occurs(var) {
            self.push_unify_step(
                UnifyAction::OccursCheck,
                from,
                &resolved,
                format!("{var} occurs in {resolved}"),
            );
            return Status::OccursCheckFailed;
        }
        self.push_unify_step(UnifyAction::Bind, from, to, format!("{var} := {to}"));
        self.union(from, to);
        Status::Ok
    }

    fn decompose(&mut self, a: &Monotype<N>, b: &Monotype<N>) -> Status {
        let (a_name, a_params) = a.split();
        let (b_name, b_params) = b.split();
        if a_name != b_name {
            self.push_unify_step(
                UnifyAction::Error,
                a,
                b,
                format!("`{a_name}` is not `{b_name}`"),
            );
            return Status::ConstantMismatch;
        }
        if a_params.len() != b_params.len() {
            self.push_unify_step(
                UnifyAction::Error,
                a,
                b,
                format!(
                    "`{a_name}` applied to {} and {} parameters",
                    a_params.len(),
                    b_params.len()
                ),
            );
            return Status::ParamLengthMismatch;
        }
        let (a_indices, b_indices) = (index_count(a), index_count(b));
        if a_indices != b_indices {
            self.push_unify_step(
                UnifyAction::Error,
                a,
                b,
                format!("{a_indices} and {b_indices} indices"),
            );
            return Status::ParamLengthMismatch;
        }
        self.push_unify_step(
            UnifyAction::Decompose,
            a,
            b,
            format!("unify the parameters of `{a_name}` pairwise"),
        );
        for (pa, pb) in a_params.iter().zip(b_params) {
            let status = self.unify(pa, pb);
            if status.not_ok() {
                return status;
            }
        }
        match (a, b) {
            (Monotype::Instance(x), Monotype::Instance(y)) => self.unify_indices(x, y),
            _ => Status::Ok,
        }
    }

    fn unify_indices(
        &mut self,
        a: &DependentTypeInstance<N>,
        b: &DependentTypeInstance<N>,
    ) -> Status {
        for (ja, jb) in a.index.iter().zip(&b.index) {
            let status = self.unify_kind(&ja.term, &jb.term);
            if status.not_ok() {
                return status;
            }
            let status = self.unify(&ja.kind, &jb.kind);
            if status.not_ok() {
                return status;
            }
        }
        Status::Ok
    }

    /// Unifies two index terms through the kind map. Non-variable indices
    /// must be computationally equal.
    pub fn unify_kind(&mut self, a: &Term<N>, b: &Term<N>) -> Status {
        let ta = self.find_kind(a);
        let tb = self.find_kind(b);
        if ta.strict_eq(&tb) {
            self.push_unify_step(UnifyAction::Identity, &ta, &tb, "same index".into());
            return Status::Ok;
        }
        match (&ta, &tb) {
            (Term::Var(v), _) => {
                self.push_unify_step(UnifyAction::BindIndex, &ta, &tb, format!("{ta} := {tb}"));
                self.kinds.insert(kind_key(v), tb.clone());
                Status::Ok
            }
            (_, Term::Var(v)) => {
                self.push_unify_step(UnifyAction::BindIndex, &tb, &ta, format!("{tb} := {ta}"));
                self.kinds.insert(kind_key(v), ta.clone());
                Status::Ok
            }
            _ if ta.equals(&TermContext::new(), &tb) => {
                self.push_unify_step(UnifyAction::Identity, &ta, &tb, "equal indices".into());
                Status::Ok
            }
            _ => {
                self.push_unify_step(UnifyAction::Error, &ta, &tb, "indices differ".into());
                Status::KindMismatch
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tracing
    // -----------------------------------------------------------------------

    /// Enable unification tracing.
    pub fn enable_tracing(&mut self) {
        self.tracing = true;
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// The unification trace (empty if tracing was not enabled).
    pub fn unify_trace(&self) -> &[UnifyStep] {
        &self.unify_trace
    }

    pub fn take_unify_trace(&mut self) -> Vec<UnifyStep> {
        std::mem::take(&mut self.unify_trace)
    }

    fn push_unify_step(
        &mut self,
        action: UnifyAction,
        left: &impl fmt::Display,
        right: &impl fmt::Display,
        detail: String,
    ) {
        if self.tracing {
            let step = self.unify_trace.len() + 1;
            self.unify_trace.push(UnifyStep {
                step,
                action,
                left: left.to_string(),
                right: right.to_string(),
                detail,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Stack
    // -----------------------------------------------------------------------

    pub fn push(&mut self, t: impl Into<Type<N>>) {
        self.stack.push(t.into());
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn peek(&self) -> Option<&Type<N>> {
        self.stack.last()
    }

    pub fn pop(&mut self) -> Result<Type<N>, AlgebraError> {
        self.expect_top(1, Expect::Any)?;
        self.stack.pop().ok_or(AlgebraError::StackUnderflow {
            needed: 1,
            available: 0,
        })
    }

    pub fn pop_monotype(&mut self) -> Result<Monotype<N>, AlgebraError> {
        self.expect_top(1, Expect::Monotype)?;
        match self.stack.pop() {
            Some(Type::Mono(m)) => Ok(m),
            _ => unreachable!("top of stack checked to be a monotype"),
        }
    }

    /// Pops `n` monotypes, top first. Nothing is popped unless all `n` are
    /// monotypes.
    pub fn pop_monotypes(&mut self, n: usize) -> Result<Vec<Monotype<N>>, AlgebraError> {
        self.expect_top(n, Expect::Monotype)?;
        Ok((0..n)
            .filter_map(|_| match self.stack.pop() {
                Some(Type::Mono(m)) => Some(m),
                _ => None,
            })
            .collect())
    }

    pub fn pop_polytype(&mut self) -> Result<Polytype<N>, AlgebraError> {
        self.expect_top(1, Expect::Polytype)?;
        match self.stack.pop() {
            Some(Type::Poly(p)) => Ok(p),
            _ => unreachable!("top of stack checked to be a polytype"),
        }
    }

    /// Pops `n` types viewed as polytypes, top first. Non-polytypes have no
    /// binders.
    pub fn pop_as_polytypes(&mut self, n: usize) -> Result<Vec<Polytype<N>>, AlgebraError> {
        self.expect_top(n, Expect::Any)?;
        Ok((0..n)
            .filter_map(|_| self.stack.pop().map(Type::into_polytype))
            .collect())
    }

    fn expect_top(&self, n: usize, expect: Expect) -> Result<(), AlgebraError> {
        let available = self.stack.len();
        if available < n {
            return Err(AlgebraError::StackUnderflow {
                needed: n,
                available,
            });
        }
        for t in &self.stack[available - n..] {
            match (expect, t) {
                (Expect::Any, _) | (Expect::Monotype, Type::Mono(_)) | (Expect::Polytype, Type::Poly(_)) => {}
                (Expect::Monotype, other) => return Err(AlgebraError::ExpectedMonotype(other.to_string())),
                (Expect::Polytype, other) => return Err(AlgebraError::ExpectedPolytype(other.to_string())),
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Type algebra
    // -----------------------------------------------------------------------

    fn require(&mut self, a: &Monotype<N>, b: &Monotype<N>) -> Result<(), AlgebraError> {
        match self.unify(a, b) {
            Status::Ok => Ok(()),
            status => Err(AlgebraError::Unification {
                status,
                left: self.resolve(a).to_string(),
                right: self.resolve(b).to_string(),
            }),
        }
    }

    /// Function elimination: `a ~ b -> v`, giving `v`.
    pub fn apply_types(&mut self, a: &Monotype<N>, b: &Monotype<N>) -> Result<Monotype<N>, AlgebraError> {
        let v = self.fresh();
        self.require(a, &function(b.clone(), v.clone()))?;
        Ok(self.find(&v))
    }

    /// Function introduction over a fresh domain: `v -> t`.
    pub fn abstract_type(&mut self, t: &Monotype<N>) -> Monotype<N> {
        function(self.fresh(), t.clone())
    }

    /// `a & b`
    pub fn cons_types(&self, a: &Monotype<N>, b: &Monotype<N>) -> Monotype<N> {
        cons(a.clone(), b.clone())
    }

    /// First projection: `a ~ v1 & v2`, giving `v1`.
    pub fn head(&mut self, a: &Monotype<N>) -> Result<Monotype<N>, AlgebraError> {
        let (v1, v2) = (self.fresh(), self.fresh());
        self.require(a, &cons(v1.clone(), v2))?;
        Ok(self.find(&v1))
    }

    /// Second projection: `a ~ v1 & v2`, giving `v2`.
    pub fn tail(&mut self, a: &Monotype<N>) -> Result<Monotype<N>, AlgebraError> {
        let (v1, v2) = (self.fresh(), self.fresh());
        self.require(a, &cons(v1, v2.clone()))?;
        Ok(self.find(&v2))
    }

    /// Widens `t` to `t | v` for a fresh `v`.
    pub fn disjoin(&mut self, t: &Monotype<N>) -> Monotype<N> {
        join(t.clone(), self.fresh())
    }

    /// `a | b`
    pub fn expand(&self, a: &Monotype<N>, b: &Monotype<N>) -> Monotype<N> {
        join(a.clone(), b.clone())
    }

    /// Case analysis: `a ~ v1 | v2`, `b ~ v1 -> v3`, `c ~ v2 -> v3`,
    /// giving `v3`.
    pub fn realize(
        &mut self,
        a: &Monotype<N>,
        b: &Monotype<N>,
        c: &Monotype<N>,
    ) -> Result<Monotype<N>, AlgebraError> {
        let (v1, v2, v3) = (self.fresh(), self.fresh(), self.fresh());
        self.require(a, &join(v1.clone(), v2.clone()))?;
        self.require(b, &function(v1, v3.clone()))?;
        self.require(c, &function(v2, v3.clone()))?;
        Ok(self.find(&v3))
    }

    /// `q` in the context of `p`; `q` is unwrapped when it binds nothing.
    pub fn contextualize(&self, _p: Polytype<N>, q: Polytype<N>) -> Type<N> {
        Type::from(q)
    }

    /// Instantiates every binder of `t` with a fresh variable and indexes a
    /// dependent body by its own kind variables.
    pub fn declare(&mut self, t: &Type<N>) -> Monotype<N> {
        let mut current = t.clone();
        loop {
            match current {
                Type::Poly(p) => {
                    let v = self.fresh();
                    current = p.instantiate(&v);
                }
                Type::Dependent(d) => return Monotype::Instance(d.kind_instantiation()),
                Type::Mono(m) => return m,
            }
        }
    }
}
