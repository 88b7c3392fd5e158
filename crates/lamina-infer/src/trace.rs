//! Tracing types for inference observability.
//!
//! These capture step-by-step traces of unification and of concluded
//! inference rules. Tracing is opt-in via `TypeContext::enable_tracing()`
//! and `InferenceContext::enable_tracing()`; nothing is recorded otherwise.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Unification trace
// ---------------------------------------------------------------------------

/// A single step in a unification trace.
#[derive(Debug, Clone, Serialize)]
pub struct UnifyStep {
    pub step: usize,
    pub action: UnifyAction,
    pub left: String,
    pub right: String,
    pub detail: String,
}

/// What action was taken during a unification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnifyAction {
    /// Both sides already share a representative.
    Identity,
    /// Structural recursion over the parameters of the same constant.
    Decompose,
    /// A type variable joined the other side's class (e.g. $0 := Int).
    Bind,
    /// An expression-level index variable joined the other side's class.
    BindIndex,
    /// Occurs check fired.
    OccursCheck,
    /// Unification failed.
    Error,
}

// ---------------------------------------------------------------------------
// Inference trace
// ---------------------------------------------------------------------------

/// A single concluded inference rule.
#[derive(Debug, Clone, Serialize)]
pub struct InferStep {
    pub expr: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub rule: InferRule,
    pub detail: String,
}

/// Which inference rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InferRule {
    VarLookup,
    Instantiate,
    Call,
    Lambda,
    Let,
    LetGen,
}
