//! Rule outcomes: conclusions and failure reports.

use std::fmt;

use lamina_diag::{Category, Diagnostic};
use lamina_term::{Nameable, Term};
use lamina_types::{Judgment, Type};

use crate::status::Status;

/// Why an inference rule failed, with the premises it was given.
#[derive(Debug, Clone)]
pub struct Report<N> {
    /// Rule name, e.g. `App`.
    pub rule: String,
    pub status: Status,
    pub judgments: Vec<Judgment<N>>,
    /// The offending term when no judgment exists for it.
    pub subject: Option<Term<N>>,
}

impl<N: Nameable> Report<N> {
    /// # Panics
    /// When `status` is `Ok`.
    pub fn new(rule: impl Into<String>, status: Status, judgments: Vec<Judgment<N>>) -> Self {
        assert!(status.not_ok(), "a report needs a failing status");
        Self {
            rule: rule.into(),
            status,
            judgments,
            subject: None,
        }
    }

    /// `name` had no judgment in scope.
    pub fn name_not_in_context(rule: impl Into<String>, name: Term<N>) -> Self {
        Self {
            rule: rule.into(),
            status: Status::NameNotInContext,
            judgments: Vec::new(),
            subject: Some(name),
        }
    }

    pub fn category(&self) -> Category {
        self.status.category().unwrap_or(Category::ConstantMismatch)
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let category = self.category();
        let message = match (&self.subject, self.status) {
            (Some(name), Status::NameNotInContext) => format!("`{name}` is not in the context"),
            (Some(subject), status) => format!("{status} at `{subject}`"),
            (None, status) => format!("{} during {}", status_message(status), self.rule),
        };
        let diag = self
            .judgments
            .iter()
            .fold(Diagnostic::error(category, message).during(&self.rule), |d, j| {
                d.with_note(j.to_string())
            });
        diag.with_help(category.example_fix())
    }
}

fn status_message(status: Status) -> &'static str {
    match status {
        Status::Ok => "no error",
        Status::ConstantMismatch => "type constants do not match",
        Status::ParamLengthMismatch => "type parameter counts do not match",
        Status::OccursCheckFailed => "a type variable occurs in its own binding",
        Status::NameNotInContext => "a name is not in the context",
        Status::KindMismatch => "dependent indices do not match",
    }
}

impl<N: Nameable> fmt::Display for Report<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.status)?;
        if let Some(subject) = &self.subject {
            write!(f, ": {subject}")?;
        }
        for j in &self.judgments {
            write!(f, "\n  {j}")?;
        }
        Ok(())
    }
}

/// The result of one inference rule: a judgment, or a failing status.
#[derive(Debug, Clone)]
pub struct Conclusion<N> {
    judgment: Option<Judgment<N>>,
    pub status: Status,
}

impl<N: Nameable> Conclusion<N> {
    pub fn conclude(term: Term<N>, ty: impl Into<Type<N>>) -> Self {
        Self {
            judgment: Some(Judgment::new(term, ty)),
            status: Status::Ok,
        }
    }

    /// # Panics
    /// When `status` is `Ok`.
    pub fn cannot_conclude(status: Status) -> Self {
        assert!(status.not_ok(), "a failed conclusion needs a failing status");
        Self {
            judgment: None,
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn judgment(&self) -> Option<&Judgment<N>> {
        self.judgment.as_ref()
    }

    pub fn into_judgment(self) -> Option<Judgment<N>> {
        self.judgment
    }
}

impl<N: Nameable> fmt::Display for Conclusion<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.judgment {
            Some(j) if self.status.is_ok() => write!(f, "{j}"),
            _ => f.write_str("_: ⊥"),
        }
    }
}
