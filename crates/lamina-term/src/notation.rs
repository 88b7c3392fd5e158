//! Rendering glyphs for terms.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::{LetForm, Nameable, Term};

/// Glyphs used when printing terms. Missing fields fall back to the
/// defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notation {
    pub binder: String,
    pub to: String,
    pub apply: String,
    pub list_open: String,
    pub list_close: String,
    pub list_sep: String,
    pub let_head: String,
    pub let_in: String,
    pub where_infix: String,
    pub rec_head: String,
    pub rec_and: String,
    pub group_open: String,
    pub group_close: String,
}

impl Default for Notation {
    fn default() -> Self {
        Self {
            binder: "λ".into(),
            to: " . ".into(),
            apply: " ".into(),
            list_open: "[".into(),
            list_close: "]".into(),
            list_sep: ", ".into(),
            let_head: "let ".into(),
            let_in: " in ".into(),
            where_infix: " where ".into(),
            rec_head: "rec ".into(),
            rec_and: " and ".into(),
            group_open: "(".into(),
            group_close: ")".into(),
        }
    }
}

/// A term paired with the notation to print it in.
pub struct Rendered<'a, N> {
    pub(crate) term: &'a Term<N>,
    pub(crate) notation: &'a Notation,
}

impl<N: Nameable> fmt::Display for Rendered<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self.term, self.notation, false))
    }
}

pub(crate) fn render<N: Nameable>(term: &Term<N>, n: &Notation, strict: bool) -> String {
    let mut out = String::new();
    write_term(&mut out, term, n, strict);
    out
}

fn write_var<N: Nameable>(out: &mut String, name: &N, depth: usize, strict: bool) {
    out.push_str(name.name());
    if strict {
        let _ = write!(out, "[{depth}]");
    }
}

fn write_term<N: Nameable>(out: &mut String, term: &Term<N>, n: &Notation, strict: bool) {
    match term {
        Term::Var(v) => write_var(out, &v.name, v.depth, strict),
        Term::Const(c) => out.push_str(c.name.name()),
        Term::Abs(func) => {
            out.push_str(&n.group_open);
            out.push_str(&n.binder);
            for (i, v) in func.vars().iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_var(out, &v.name, v.depth, strict);
            }
            out.push_str(&n.to);
            write_term(out, func.body(), n, strict);
            out.push_str(&n.group_close);
        }
        Term::App(l, r) => {
            out.push_str(&n.group_open);
            write_term(out, l, n, strict);
            out.push_str(&n.apply);
            write_term(out, r, n, strict);
            out.push_str(&n.group_close);
        }
        Term::List(es) => {
            out.push_str(&n.list_open);
            for (i, e) in es.iter().enumerate() {
                if i > 0 {
                    out.push_str(&n.list_sep);
                }
                write_term(out, e, n, strict);
            }
            out.push_str(&n.list_close);
        }
        Term::Instr(instr) => {
            let _ = write!(out, "instruction[{}", instr.head().name());
            for arg in instr.args() {
                out.push(' ');
                write_term(out, arg, n, strict);
            }
            for _ in instr.args().len()..instr.head().arity() {
                out.push_str(" _");
            }
            out.push(']');
        }
        Term::Let(l) => {
            out.push_str(&n.group_open);
            match l.form {
                LetForm::Let => {
                    out.push_str(&n.let_head);
                    out.push_str(l.name.name.name());
                    out.push_str(" = ");
                    write_term(out, &l.assignment, n, strict);
                    out.push_str(&n.let_in);
                    write_term(out, &l.body, n, strict);
                }
                LetForm::Where => {
                    write_term(out, &l.body, n, strict);
                    out.push_str(&n.where_infix);
                    out.push_str(l.name.name.name());
                    out.push_str(" = ");
                    write_term(out, &l.assignment, n, strict);
                }
            }
            out.push_str(&n.group_close);
        }
        Term::Rec(r) => {
            out.push_str(&n.group_open);
            out.push_str(&n.rec_head);
            for (i, d) in r.defs.iter().enumerate() {
                if i > 0 {
                    out.push_str(&n.rec_and);
                }
                out.push_str(d.name.name.name());
                out.push_str(" = ");
                write_term(out, &d.assignment, n, strict);
            }
            out.push_str(&n.let_in);
            write_term(out, &r.body, n, strict);
            out.push_str(&n.group_close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constant, Def, Name, Variable, bind};

    type T = Term<Name>;

    #[test]
    fn default_notation_renders_abstractions() {
        let x = Variable::<Name>::named("x");
        let f: T = bind([x.clone()]).in_body(Term::Var(x)).into();
        assert_eq!(f.to_string(), "(λx . x)");
        assert_eq!(f.strict_string(), "(λx[1] . x[1])");
    }

    #[test]
    fn custom_notation_is_used() {
        let notation = Notation {
            binder: "\\".into(),
            to: " -> ".into(),
            ..Notation::default()
        };
        let x = Variable::<Name>::named("x");
        let f: T = bind([x.clone()]).in_body(T::app(Term::Var(x), T::constant("c"))).into();
        assert_eq!(f.display_with(&notation).to_string(), "(\\x -> (x c))");
    }

    #[test]
    fn lets_and_wheres_render_in_their_own_order() {
        let name = Constant::named("x");
        let l = T::let_in(name.clone(), T::constant("a"), T::constant("b"));
        let w = T::where_in(name, T::constant("a"), T::constant("b"));
        assert_eq!(l.to_string(), "(let x = a in b)");
        assert_eq!(w.to_string(), "(b where x = a)");
    }

    #[test]
    fn recs_join_definitions_with_and() {
        let r = T::rec_in(
            vec![
                Def::new(Constant::named("f"), T::constant("g")),
                Def::new(Constant::named("g"), T::constant("f")),
            ],
            T::constant("f"),
        );
        assert_eq!(r.to_string(), "(rec f = g and g = f in f)");
    }

    #[test]
    fn notation_deserializes_with_defaults() {
        let notation: Notation = serde_json::from_str(r#"{"binder": "fn "}"#).unwrap();
        assert_eq!(notation.binder, "fn ");
        assert_eq!(notation.to, " . ");
    }
}
