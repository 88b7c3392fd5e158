//! Term-level session state: fresh variables and the global name table.

use std::collections::BTreeMap;

use crate::{Constant, Nameable, Term, Variable};

/// Errors from the name table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TermError {
    #[error("`{0}` is already defined")]
    AlreadyDefined(String),
    #[error("`{0}` is not defined")]
    NotDefined(String),
    #[error("`{0}` already has a declared inverse")]
    InverseAlreadyDeclared(String),
}

/// Fresh term variables plus named definitions and their inverses.
#[derive(Debug, Clone)]
pub struct TermContext<N> {
    next_var: u32,
    table: BTreeMap<String, Term<N>>,
    inverses: BTreeMap<String, Constant<N>>,
}

impl<N: Nameable> Default for TermContext<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Nameable> TermContext<N> {
    pub fn new() -> Self {
        Self::with_var_offset(0)
    }

    /// Start fresh-variable numbering at `offset` (for deterministic tests).
    pub fn with_var_offset(offset: u32) -> Self {
        Self {
            next_var: offset,
            table: BTreeMap::new(),
            inverses: BTreeMap::new(),
        }
    }

    /// A fresh unassigned variable named `$e<n>`.
    pub fn new_var(&mut self) -> Variable<N> {
        let n = self.next_var;
        self.next_var += 1;
        Variable::named(&format!("$e{n}"))
    }

    /// The `_` placeholder fed to abstractions by extensional equality.
    pub fn placeholder(&self) -> Variable<N> {
        Variable::named("_")
    }

    pub fn add_name(&mut self, name: &Constant<N>, term: Term<N>) -> Result<(), TermError> {
        let key = name.name.name();
        if self.table.contains_key(key) {
            return Err(TermError::AlreadyDefined(key.to_string()));
        }
        self.table.insert(key.to_string(), term);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Term<N>> {
        self.table.get(name)
    }

    /// Declares `f` and `inverse` as inverses of each other. Both must be
    /// defined and neither may have an inverse already.
    pub fn declare_inverse(&mut self, f: &Constant<N>, inverse: &Constant<N>) -> Result<(), TermError> {
        for c in [f, inverse] {
            if !self.table.contains_key(c.name.name()) {
                return Err(TermError::NotDefined(c.name.name().to_string()));
            }
        }
        for c in [f, inverse] {
            if self.inverses.contains_key(c.name.name()) {
                return Err(TermError::InverseAlreadyDeclared(c.name.name().to_string()));
            }
        }
        self.inverses
            .insert(f.name.name().to_string(), inverse.clone());
        self.inverses
            .insert(inverse.name.name().to_string(), f.clone());
        Ok(())
    }

    /// Definition of the inverse of a constant term, if one was declared.
    pub fn inverse(&self, term: &Term<N>) -> Option<&Term<N>> {
        let Term::Const(c) = term else {
            return None;
        };
        let inverse = self.inverses.get(c.name.name())?;
        self.table.get(inverse.name.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Name, combinators};

    type Cxt = TermContext<Name>;

    #[test]
    fn fresh_variables_are_numbered_and_unassigned() {
        let mut cxt = Cxt::with_var_offset(3);
        let a = cxt.new_var();
        let b = cxt.new_var();
        assert_eq!(a.name.as_str(), "$e3");
        assert_eq!(b.name.as_str(), "$e4");
        assert!(a.is_unassigned());
    }

    #[test]
    fn redefining_a_name_fails() {
        let mut cxt = Cxt::new();
        let id = Constant::named("id");
        cxt.add_name(&id, combinators::identity().into()).unwrap();
        let err = cxt.add_name(&id, Term::constant("x")).unwrap_err();
        assert_eq!(err, TermError::AlreadyDefined("id".into()));
        assert_eq!(err.to_string(), "`id` is already defined");
    }

    #[test]
    fn inverses_resolve_both_ways() {
        let mut cxt = Cxt::new();
        let enc = Constant::named("encode");
        let dec = Constant::named("decode");
        cxt.add_name(&enc, Term::constant("E")).unwrap();
        cxt.add_name(&dec, Term::constant("D")).unwrap();
        cxt.declare_inverse(&enc, &dec).unwrap();

        assert_eq!(cxt.inverse(&Term::Const(enc.clone())), Some(&Term::constant("D")));
        assert_eq!(cxt.inverse(&Term::Const(dec.clone())), Some(&Term::constant("E")));
        assert_eq!(
            cxt.declare_inverse(&dec, &enc),
            Err(TermError::InverseAlreadyDeclared("decode".into()))
        );
    }

    #[test]
    fn inverse_requires_definitions() {
        let mut cxt = Cxt::new();
        let f = Constant::named("f");
        let g = Constant::named("g");
        cxt.add_name(&f, Term::constant("F")).unwrap();
        assert_eq!(cxt.declare_inverse(&f, &g), Err(TermError::NotDefined("g".into())));
        assert!(cxt.inverse(&Term::constant("f")).is_none());
    }
}
