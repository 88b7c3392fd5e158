//! Unification, the type-algebra stack machine, and the inference rules
//! built on them.
//!
//! This crate implements:
//! - Union-find style unification over [`lamina_types::Monotype`], with an
//!   occurs check and a separate class map for dependent indices
//! - A process-wide, extensible table of type-algebra rules operating on a
//!   per-context type stack
//! - Var/App/Abs/Let rules over a shadowing symbol table, with let
//!   generalization and failure reports lowered to diagnostics

pub mod context;
pub mod error;
pub mod infer;
pub mod report;
pub mod rules;
pub mod status;
pub mod symbol;
pub mod trace;

pub use context::TypeContext;
pub use error::AlgebraError;
pub use infer::{AbsDischarge, InferenceContext, LetDischarge};
pub use report::{Conclusion, Report};
pub use rules::{Rule, RuleId, register_rule, rule_id, rule_name};
pub use status::Status;
pub use symbol::{Symbol, SymbolTable};

// Re-export for convenience.
pub use lamina_diag::{Category, Diagnostic, DiagnosticError};

#[cfg(test)]
mod prop_tests;
#[cfg(test)]
mod unify_tests;
