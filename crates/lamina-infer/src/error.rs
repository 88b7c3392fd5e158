//! Errors raised by the type-algebra stack machine.

use lamina_diag::{Category, Diagnostic};

use crate::status::Status;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraError {
    #[error("no type-algebra rule has id {0}")]
    UnknownRule(usize),
    #[error("no type-algebra rule is named `{0}`")]
    UnknownRuleName(String),
    #[error("a type-algebra rule named `{0}` is already registered")]
    RuleAlreadyRegistered(String),
    #[error("rule needs {needed} types on the stack, found {available}")]
    StackUnderflow { needed: usize, available: usize },
    #[error("expected a monotype on the stack, found `{0}`")]
    ExpectedMonotype(String),
    #[error("expected a polytype on the stack, found `{0}`")]
    ExpectedPolytype(String),
    #[error("cannot unify `{left}` with `{right}` ({status})")]
    Unification {
        status: Status,
        left: String,
        right: String,
    },
}

impl AlgebraError {
    pub fn category(&self) -> Category {
        match self {
            AlgebraError::UnknownRule(_)
            | AlgebraError::UnknownRuleName(_)
            | AlgebraError::RuleAlreadyRegistered(_) => Category::RuleRegistry,
            AlgebraError::StackUnderflow { .. }
            | AlgebraError::ExpectedMonotype(_)
            | AlgebraError::ExpectedPolytype(_) => Category::StackMismatch,
            AlgebraError::Unification { status, .. } => {
                status.category().unwrap_or(Category::ConstantMismatch)
            }
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let category = self.category();
        Diagnostic::error(category, self.to_string()).with_help(category.example_fix())
    }
}
