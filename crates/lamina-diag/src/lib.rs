//! Structured diagnostics for the lamina inference core.
//!
//! Inference rules never format text themselves: they record reports, and
//! reports are lowered into the [`Diagnostic`] values defined here. How a
//! diagnostic list is presented (or whether it aborts a translation) is up
//! to the caller.

use std::fmt;

// ---------------------------------------------------------------------------
// Diagnostic severity and categories
// ---------------------------------------------------------------------------

/// How severe a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Broad category for diagnostics. Used for filtering and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Two type constructors at the same position have different names.
    ConstantMismatch,
    /// Two applications of the same constructor have different parameter counts.
    ParamLengthMismatch,
    /// A type variable would have to contain itself.
    OccursCheck,
    /// A name was used that has no judgment in scope.
    UndefinedName,
    /// Two expression-level indices of a dependent type disagree.
    KindMismatch,
    /// A type-algebra rule found the wrong kind of type on the stack.
    StackMismatch,
    /// A type-algebra rule id or name is unknown or already taken.
    RuleRegistry,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::ConstantMismatch,
        Category::ParamLengthMismatch,
        Category::OccursCheck,
        Category::UndefinedName,
        Category::KindMismatch,
        Category::StackMismatch,
        Category::RuleRegistry,
    ];

    pub fn all() -> &'static [Category] {
        &Self::ALL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::ConstantMismatch => "constant_mismatch",
            Category::ParamLengthMismatch => "param_length_mismatch",
            Category::OccursCheck => "occurs_check",
            Category::UndefinedName => "undefined_name",
            Category::KindMismatch => "kind_mismatch",
            Category::StackMismatch => "stack_mismatch",
            Category::RuleRegistry => "rule_registry",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Category::ConstantMismatch => "E0001",
            Category::ParamLengthMismatch => "E0002",
            Category::OccursCheck => "E0003",
            Category::UndefinedName => "E0004",
            Category::KindMismatch => "E0005",
            Category::StackMismatch => "E0101",
            Category::RuleRegistry => "E0102",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::ConstantMismatch => "Two types have different head constructors.",
            Category::ParamLengthMismatch => {
                "A type constructor is applied to a different number of parameters."
            }
            Category::OccursCheck => "A type variable occurs inside the type it is bound to.",
            Category::UndefinedName => "A referenced name has no judgment in the context.",
            Category::KindMismatch => "The expression indices of a dependent type disagree.",
            Category::StackMismatch => "A type-algebra rule popped a type of the wrong shape.",
            Category::RuleRegistry => "A type-algebra rule is missing or registered twice.",
        }
    }

    pub fn example_fix(self) -> &'static str {
        match self {
            Category::ConstantMismatch => "Check the argument against the function's domain.",
            Category::ParamLengthMismatch => {
                "Apply the constructor to the number of parameters it declares."
            }
            Category::OccursCheck => "Break the self-application or add an annotation.",
            Category::UndefinedName => "Bind the name with a let or lambda before using it.",
            Category::KindMismatch => "Make the dependent indices agree, or use a variable index.",
            Category::StackMismatch => "Push monotypes for monotype rules and polytypes for polytype rules.",
            Category::RuleRegistry => "Register the rule once and dispatch by the id it returns.",
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A structured diagnostic message.
///
/// Diagnostics carry the rule that failed and the rendered judgments
/// involved; there is no source location at this layer.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Stable diagnostic code (e.g. E0001).
    pub code: Option<String>,
    pub severity: Severity,
    pub category: Category,
    /// Primary message: what went wrong.
    pub message: String,
    /// Inference or algebra rule that produced this diagnostic.
    pub rule: Option<String>,
    /// Rendered judgments or types involved, in premise order.
    pub notes: Vec<String>,
    /// Suggested fix, if any.
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self {
            code: Some(category.code().to_string()),
            severity: Severity::Error,
            category,
            message: message.into(),
            rule: None,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(category, message)
        }
    }

    pub fn during(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        if let Some(code) = &self.code {
            write!(f, "{prefix}[{code}]: {}", self.message)?;
        } else {
            write!(f, "{prefix}: {}", self.message)?;
        }
        if let Some(rule) = &self.rule {
            write!(f, "\n  rule: {rule}")?;
        }
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error type for crates that produce diagnostics
// ---------------------------------------------------------------------------

/// Error type wrapping one or more diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", .0.first().map(|d| d.to_string()).unwrap_or_default())]
pub struct DiagnosticError(pub Vec<Diagnostic>);

impl DiagnosticError {
    pub fn single(diag: Diagnostic) -> Self {
        Self(vec![diag])
    }

    pub fn multiple(diags: Vec<Diagnostic>) -> Self {
        Self(diags)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_builder() {
        let diag = Diagnostic::error(Category::ConstantMismatch, "Int does not unify with Bool")
            .during("App")
            .with_note("f: Int -> Int")
            .with_note("true: Bool")
            .with_help("pass an Int");

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_deref(), Some("E0001"));
        assert_eq!(diag.category, Category::ConstantMismatch);
        assert_eq!(diag.rule.as_deref(), Some("App"));
        assert_eq!(diag.notes.len(), 2);
        assert!(diag.help.unwrap().contains("Int"));
    }

    #[test]
    fn diagnostic_display() {
        let diag = Diagnostic::error(Category::UndefinedName, "x is not in the context")
            .during("Var")
            .with_note("x");
        let s = format!("{diag}");
        assert!(s.starts_with("error[E0004]: x is not in the context"));
        assert!(s.contains("\n  rule: Var"));
        assert!(s.contains("\n  note: x"));
    }

    #[test]
    fn warning_keeps_category_code() {
        let diag = Diagnostic::warning(Category::KindMismatch, "index differs");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code.as_deref(), Some("E0005"));
        assert!(diag.to_string().starts_with("warning[E0005]"));
    }

    #[test]
    fn error_displays_first_diagnostic() {
        let err = DiagnosticError::multiple(vec![
            Diagnostic::error(Category::OccursCheck, "first"),
            Diagnostic::error(Category::OccursCheck, "second"),
        ]);
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.to_string(), "error[E0003]: first");
    }

    #[test]
    fn category_metadata_is_stable_and_unique() {
        let mut codes = std::collections::BTreeSet::new();
        for cat in Category::all() {
            assert!(!cat.as_str().is_empty());
            assert!(!cat.description().is_empty());
            assert!(!cat.example_fix().is_empty());
            assert!(
                codes.insert(cat.code()),
                "duplicate diagnostic code detected: {}",
                cat.code()
            );
        }
    }
}
