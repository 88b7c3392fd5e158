//! Outcome of a unification or an inference rule.

use std::fmt;

use lamina_diag::Category;
use serde::Serialize;

/// Result status of a rule application. Anything but `Ok` is terminal for
/// that application only; the context stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Ok,
    /// Constants at the same position have different names.
    ConstantMismatch,
    /// Applications of the same constant have different parameter counts.
    ParamLengthMismatch,
    /// A variable would be bound to a type containing it.
    OccursCheckFailed,
    /// A name has no judgment in the symbol table.
    NameNotInContext,
    /// Two dependent indices are neither variables nor equal terms.
    KindMismatch,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    pub fn not_ok(self) -> bool {
        !self.is_ok()
    }

    /// Diagnostic category of a failing status; `None` for `Ok`.
    pub fn category(self) -> Option<Category> {
        match self {
            Status::Ok => None,
            Status::ConstantMismatch => Some(Category::ConstantMismatch),
            Status::ParamLengthMismatch => Some(Category::ParamLengthMismatch),
            Status::OccursCheckFailed => Some(Category::OccursCheck),
            Status::NameNotInContext => Some(Category::UndefinedName),
            Status::KindMismatch => Some(Category::KindMismatch),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "Ok",
            Status::ConstantMismatch => "ConstantMismatch",
            Status::ParamLengthMismatch => "ParamLengthMismatch",
            Status::OccursCheckFailed => "OccursCheckFailed",
            Status::NameNotInContext => "NameNotInContext",
            Status::KindMismatch => "KindMismatch",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
