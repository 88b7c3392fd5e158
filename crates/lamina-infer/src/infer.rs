//! Natural-deduction inference rules.
//!
//! Rules are driven one at a time by the caller, in proof order. Each rule
//! returns a [`Conclusion`]; failures also append a [`Report`] so a whole
//! proof attempt can surface every problem before [`InferenceContext::finish`].
//!
//! ```text
//!   x: σ ∈ Γ    t = Inst(σ)          Γ ⊢ e0: t0    Γ ⊢ e1: t1    t0 = t1 -> t2
//!   ----------------------- Var      ------------------------------------------ App
//!          Γ ⊢ x: t                                Γ ⊢ (e0 e1): t2
//!
//!   Γ, x: t0 ⊢ e: t1                 Γ ⊢ e0: t0    Γ, x: Gen(t0) ⊢ e1: t1
//!   ------------------------ Abs     ------------------------------------ Let
//!   Γ ⊢ (λx . e): t0 -> t1               Γ ⊢ let x = e0 in e1: t1
//! ```
//!
//! `Abs` and `Let` extend Γ before their last premise is known, so they hand
//! back a discharge value that the caller completes with the body judgment.

use lamina_diag::{Diagnostic, DiagnosticError};
use lamina_term::{Constant, Nameable, Term, TermContext, bind};
use lamina_types::{Judgment, Monotype, Polytype, Type, TypeVariable, function};

use crate::context::TypeContext;
use crate::report::{Conclusion, Report};
use crate::status::Status;
use crate::symbol::SymbolTable;
use crate::trace::{InferRule, InferStep, UnifyStep};

pub const VAR: &str = "Var";
pub const APP: &str = "App";
pub const ABS: &str = "Abs";
pub const LET: &str = "Let";

#[derive(Debug)]
pub struct InferenceContext<N> {
    symbols: SymbolTable<N>,
    types: TypeContext<N>,
    terms: TermContext<N>,
    reports: Vec<Report<N>>,
    tracing: bool,
    infer_trace: Vec<InferStep>,
}

impl<N: Nameable> Default for InferenceContext<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Nameable> InferenceContext<N> {
    pub fn new() -> Self {
        Self::with_var_offsets(0, 0)
    }

    /// Start fresh type and term variable numbering at the given offsets.
    pub fn with_var_offsets(type_offset: u32, term_offset: u32) -> Self {
        Self {
            symbols: SymbolTable::new(),
            types: TypeContext::with_var_offset(type_offset),
            terms: TermContext::with_var_offset(term_offset),
            reports: Vec::new(),
            tracing: false,
            infer_trace: Vec::new(),
        }
    }

    pub fn type_context(&self) -> &TypeContext<N> {
        &self.types
    }

    pub fn type_context_mut(&mut self) -> &mut TypeContext<N> {
        &mut self.types
    }

    pub fn term_context(&self) -> &TermContext<N> {
        &self.terms
    }

    pub fn term_context_mut(&mut self) -> &mut TermContext<N> {
        &mut self.terms
    }

    pub fn symbols(&self) -> &SymbolTable<N> {
        &self.symbols
    }

    // -----------------------------------------------------------------------
    // Context Γ
    // -----------------------------------------------------------------------

    /// Adds `name: ty` to Γ, shadowing any earlier judgment for `name`.
    pub fn add(&mut self, name: N, ty: impl Into<Type<N>>) {
        self.symbols.add(name, ty);
    }

    pub fn get(&self, name: &str) -> Option<&Judgment<N>> {
        self.symbols.get(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.symbols.remove(name)
    }

    pub fn remove_later(&mut self, name: N) {
        self.symbols.remove_later(name);
    }

    pub fn flush_removals(&mut self) {
        self.symbols.flush_removals();
    }

    pub fn find(&self, m: &Monotype<N>) -> Monotype<N> {
        self.types.find(m)
    }

    pub fn unify(&mut self, a: &Monotype<N>, b: &Monotype<N>) -> Status {
        self.types.unify(a, b)
    }

    // -----------------------------------------------------------------------
    // Inst and Gen
    // -----------------------------------------------------------------------

    /// Replaces every `forall` binder with a fresh type variable and every
    /// `mapval` binder with a fresh term variable. A `_` binder is never
    /// substituted.
    pub fn instantiate(&mut self, sigma: &Type<N>) -> Monotype<N> {
        let sigma = sigma.clone().into_polytype();
        let binders: Vec<TypeVariable<N>> = sigma
            .binders()
            .iter()
            .filter(|b| !b.is_wildcard())
            .cloned()
            .collect();
        let fresh: Vec<Monotype<N>> = binders.iter().map(|_| self.types.fresh()).collect();
        let body = match sigma.body() {
            Type::Dependent(d) => Type::Mono(Monotype::Instance(d.free_index(&mut self.terms))),
            other => other.clone(),
        };
        match body.replace_all(&binders, &fresh) {
            Type::Mono(m) => m,
            other => unreachable!("instantiated body `{other}` still binds variables"),
        }
    }

    /// Binds the variables of `t` that are not free in Γ. Trailing variable
    /// indices of a dependent instance become `mapval` binders.
    pub fn generalize(&self, t: &Monotype<N>) -> Polytype<N> {
        let t = self.types.resolve(t);
        let body = match &t {
            Monotype::Instance(d) => d.generalize_index(),
            other => Type::Mono(other.clone()),
        };
        let env = self.environment_variables();
        let vars: Vec<TypeVariable<N>> = t
            .free_variables()
            .into_iter()
            .filter(|v| !env.contains(v))
            .collect();
        if vars.is_empty() {
            body.generalize()
        } else {
            Polytype::new(vars, body)
        }
    }

    /// Free type variables of Γ, through the current classes.
    fn environment_variables(&self) -> Vec<TypeVariable<N>> {
        let mut out: Vec<TypeVariable<N>> = Vec::new();
        for judgment in self.symbols.judgments() {
            for v in judgment.ty.free_variables() {
                for w in self.types.resolve(&Monotype::Var(v)).free_variables() {
                    if !out.contains(&w) {
                        out.push(w);
                    }
                }
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    /// [Var]: looks `name` up in Γ and instantiates its type.
    pub fn var(&mut self, name: &str) -> Conclusion<N> {
        let Some(judgment) = self.symbols.get(name).cloned() else {
            self.reports
                .push(Report::name_not_in_context(VAR, Term::constant(name)));
            return Conclusion::cannot_conclude(Status::NameNotInContext);
        };
        let t = self.instantiate(&judgment.ty);
        let rule = match judgment.ty {
            Type::Mono(_) => InferRule::VarLookup,
            Type::Dependent(_) | Type::Poly(_) => InferRule::Instantiate,
        };
        self.push_infer_step(&judgment.term, &t, rule, || {
            format!("{name}: {}", judgment.ty)
        });
        Conclusion::conclude(judgment.term, t)
    }

    /// [App]: `t0 = t1 -> t2` for a fresh `t2`. Premises with binders are
    /// instantiated first.
    pub fn app(&mut self, j0: &Judgment<N>, j1: &Judgment<N>) -> Conclusion<N> {
        let t0 = self.instantiate(&j0.ty);
        let t1 = self.instantiate(&j1.ty);
        let t2 = self.types.fresh();
        let expected = function(t1, t2.clone());
        let status = self.types.unify(&t0, &expected);
        if status.not_ok() {
            self.reports
                .push(Report::new(APP, status, vec![j0.clone(), j1.clone()]));
            return Conclusion::cannot_conclude(status);
        }
        let term = Term::app(j0.term.clone(), j1.term.clone());
        let ty = self.types.find(&t2);
        self.push_infer_step(&term, &ty, InferRule::Call, || format!("{t0} = {expected}"));
        Conclusion::conclude(term, ty)
    }

    /// [Abs]: adds `param: t0` for a fresh `t0` until the body is discharged.
    pub fn abs(&mut self, param: N) -> AbsDischarge<N> {
        let domain = self.types.fresh();
        self.symbols.add(param.clone(), domain.clone());
        AbsDischarge { param, domain }
    }

    /// [Let]: adds `name: Gen(t0)` until the body is discharged.
    pub fn let_in(&mut self, name: N, bound: &Judgment<N>) -> LetDischarge<N> {
        let t0 = self.instantiate(&bound.ty);
        let sigma = self.generalize(&t0);
        self.push_infer_step(&bound.term, &sigma, InferRule::LetGen, || {
            format!("{} := Gen({t0})", name.name())
        });
        self.symbols.add(name.clone(), sigma);
        LetDischarge {
            name,
            assignment: bound.term.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Reports
    // -----------------------------------------------------------------------

    pub fn reports(&self) -> &[Report<N>] {
        &self.reports
    }

    pub fn push_report(&mut self, report: Report<N>) {
        self.reports.push(report);
    }

    pub fn has_errors(&self) -> bool {
        !self.reports.is_empty()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.reports.iter().map(Report::to_diagnostic).collect()
    }

    /// Fails with every recorded report, in the order they were made.
    pub fn finish(&self) -> Result<(), DiagnosticError> {
        if self.reports.is_empty() {
            Ok(())
        } else {
            Err(DiagnosticError::multiple(self.diagnostics()))
        }
    }

    // -----------------------------------------------------------------------
    // Tracing
    // -----------------------------------------------------------------------

    /// Records concluded rules and unification steps.
    pub fn enable_tracing(&mut self) {
        self.tracing = true;
        self.types.enable_tracing();
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    pub fn infer_trace(&self) -> &[InferStep] {
        &self.infer_trace
    }

    pub fn take_infer_trace(&mut self) -> Vec<InferStep> {
        std::mem::take(&mut self.infer_trace)
    }

    pub fn unify_trace(&self) -> &[UnifyStep] {
        self.types.unify_trace()
    }

    fn push_infer_step(
        &mut self,
        term: &Term<N>,
        ty: &impl std::fmt::Display,
        rule: InferRule,
        detail: impl FnOnce() -> String,
    ) {
        if self.tracing {
            self.infer_trace.push(InferStep {
                expr: term.to_string(),
                ty: ty.to_string(),
                rule,
                detail: detail(),
            });
        }
    }
}

/// The open premise of an [Abs] rule.
#[derive(Debug, Clone)]
#[must_use = "the parameter stays in scope until the abstraction is discharged"]
pub struct AbsDischarge<N> {
    param: N,
    domain: Monotype<N>,
}

impl<N: Nameable> AbsDischarge<N> {
    pub fn param(&self) -> &N {
        &self.param
    }

    /// The type `param` was given.
    pub fn domain(&self) -> &Monotype<N> {
        &self.domain
    }

    /// Removes `param` from Γ and concludes `(λparam . e): t0 -> t1` from
    /// the body judgment `e: t1`. Occurrences of `param` in `e` become a
    /// fresh bound variable.
    pub fn discharge(self, cxt: &mut InferenceContext<N>, body: &Judgment<N>) -> Conclusion<N> {
        cxt.symbols.remove(self.param.name());
        let range = cxt.instantiate(&body.ty);
        let v = cxt.terms.new_var();
        let e = body.term.body_abstract(&v, &Constant::new(self.param));
        let term = Term::Abs(bind([v]).in_body(e));
        let ty = function(self.domain, range);
        cxt.push_infer_step(&term, &ty, InferRule::Lambda, || format!("{body}"));
        Conclusion::conclude(term, ty)
    }
}

/// The open premise of a [Let] rule.
#[derive(Debug, Clone)]
#[must_use = "the name stays in scope until the let is discharged"]
pub struct LetDischarge<N> {
    name: N,
    assignment: Term<N>,
}

impl<N: Nameable> LetDischarge<N> {
    pub fn name(&self) -> &N {
        &self.name
    }

    /// Removes the name from Γ and concludes `let name = e0 in e1` with the
    /// body's type.
    pub fn discharge(self, cxt: &mut InferenceContext<N>, body: &Judgment<N>) -> Conclusion<N> {
        cxt.symbols.remove(self.name.name());
        let term = Term::let_in(Constant::new(self.name), self.assignment, body.term.clone());
        cxt.push_infer_step(&term, &body.ty, InferRule::Let, || format!("{body}"));
        Conclusion::conclude(term, body.ty.clone())
    }
}
