use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::{Constant, Nameable, Term};

/// Native body of an instruction. An `Err` (or a panic) is a fault.
pub type Action<N> =
    Arc<dyn Fn(&mut InstructionArgs<N>) -> Result<Term<N>, String> + Send + Sync>;

/// Name, arity and native action shared by every instance of an instruction.
#[derive(Clone)]
pub struct InstructionHead<N> {
    name: String,
    arity: usize,
    action: Option<Action<N>>,
}

impl<N: Nameable> InstructionHead<N> {
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        action: impl Fn(&mut InstructionArgs<N>) -> Result<Term<N>, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            action: Some(Arc::new(action)),
        }
    }

    /// A head with no native action. Instances collect arguments but never
    /// become call-ready.
    pub fn opaque(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            action: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// A fresh, unapplied instance.
    pub fn instance(&self) -> Instruction<N> {
        Instruction {
            head: self.clone(),
            args: Vec::with_capacity(self.arity),
        }
    }

    pub(crate) fn same_as(&self, other: &Self) -> bool {
        self.name == other.name
            && self.arity == other.arity
            && self.action.is_some() == other.action.is_some()
    }
}

impl<N> fmt::Debug for InstructionHead<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionHead")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// A partially (or fully) applied instruction.
#[derive(Debug, Clone)]
pub struct Instruction<N> {
    head: InstructionHead<N>,
    args: Vec<Term<N>>,
}

/// Arguments as seen by a native action.
#[derive(Debug)]
pub struct InstructionArgs<N> {
    args: Vec<Term<N>>,
}

impl<N: Nameable> InstructionArgs<N> {
    /// The forced argument at `index` (0-based).
    ///
    /// # Panics
    /// When the argument does not exist.
    pub fn arg(&mut self, index: usize) -> &Term<N> {
        let count = self.args.len();
        let Some(slot) = self.args.get_mut(index) else {
            panic!("instruction argument {index} requested but only {count} received");
        };
        *slot = slot.force();
        slot
    }

    /// The forced argument at `position` (1-based).
    pub fn at(&mut self, position: usize) -> &Term<N> {
        assert!(position >= 1, "argument positions start at 1");
        self.arg(position - 1)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Arguments exactly as received, unforced.
    pub fn raw(&self) -> &[Term<N>] {
        &self.args
    }
}

impl<N: Nameable> Instruction<N> {
    /// An instance with `args` already received.
    ///
    /// # Panics
    /// When more arguments than the arity are supplied.
    pub fn with_args(head: InstructionHead<N>, args: Vec<Term<N>>) -> Self {
        assert!(
            args.len() <= head.arity,
            "instruction {} takes {} arguments, got {}",
            head.name,
            head.arity,
            args.len()
        );
        Self { head, args }
    }

    pub fn head(&self) -> &InstructionHead<N> {
        &self.head
    }

    pub fn args(&self) -> &[Term<N>] {
        &self.args
    }

    pub fn is_call_ready(&self) -> bool {
        self.args.len() == self.head.arity && self.head.action.is_some()
    }

    pub(crate) fn map_args(&self, f: impl FnMut(&Term<N>) -> Term<N>) -> Self {
        Self {
            head: self.head.clone(),
            args: self.args.iter().map(f).collect(),
        }
    }

    fn invoke(&self) -> Result<Term<N>, String> {
        let Some(action) = &self.head.action else {
            return Err(format!("instruction {} has no action", self.head.name));
        };
        let mut args = InstructionArgs {
            args: self.args.clone(),
        };
        match panic::catch_unwind(AssertUnwindSafe(|| action(&mut args))) {
            Ok(result) => result,
            Err(payload) => Err(panic_message(payload.as_ref())),
        }
    }

    /// Runs the native action.
    ///
    /// On a fault either `handler` receives the failure text and `Err(None)`
    /// is returned, or, with no handler, `Err(Some(c))` carries a constant
    /// named by the failure text.
    pub fn try_call(&self, handler: Option<&mut dyn FnMut(&str)>) -> Result<Term<N>, Option<Term<N>>> {
        match self.invoke() {
            Ok(term) => Ok(term),
            Err(message) => match handler {
                Some(handler) => {
                    handler(&message);
                    Err(None)
                }
                None => Err(Some(Term::Const(Constant::named(&message)))),
            },
        }
    }

    /// Result of the call, or the fault constant.
    pub(crate) fn call_or_fault(&self) -> Term<N> {
        self.invoke()
            .unwrap_or_else(|message| Term::Const(Constant::named(&message)))
    }

    /// Feeds one more argument, calling the action once the arity is reached.
    ///
    /// # Panics
    /// When an opaque instance already holds all of its arguments.
    pub fn do_application(&self, arg: Term<N>) -> Term<N> {
        if self.is_call_ready() {
            return Term::app(self.call_or_fault(), arg).force();
        }
        assert!(
            self.args.len() < self.head.arity,
            "instruction {} takes {} arguments, got {}",
            self.head.name,
            self.head.arity,
            self.args.len() + 1
        );
        let mut next = self.clone();
        next.args.push(arg);
        if next.is_call_ready() {
            next.call_or_fault()
        } else {
            Term::Instr(next)
        }
    }

    pub(crate) fn strict_eq(&self, other: &Self) -> bool {
        self.head.same_as(&other.head)
            && self.args.len() == other.args.len()
            && self
                .args
                .iter()
                .zip(&other.args)
                .all(|(a, b)| a.strict_eq(b))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "instruction panicked".to_string()
    }
}
