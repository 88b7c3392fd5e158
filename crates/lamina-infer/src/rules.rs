//! The shared type-algebra rule table.
//!
//! Rules are plain functions over a [`TypeContext`]: each pops its operands
//! from the context stack and returns one type, which the dispatcher pushes.
//! The table is process-wide, one per identifier type, and guarded by a
//! mutex. Entries are append-only; the lock is released before a rule runs.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex, PoisonError};

use lamina_term::Nameable;
use lamina_types::Type;
use serde::Serialize;

use crate::context::TypeContext;
use crate::error::AlgebraError;

/// A type-algebra operation.
pub type Rule<N> = fn(&mut TypeContext<N>) -> Result<Type<N>, AlgebraError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RuleId(pub usize);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule#{}", self.0)
    }
}

pub const APPLICATION: &str = "application";
pub const ABSTRACTION: &str = "abstraction";
pub const CONSTRUCTION: &str = "construction";
pub const HEAD_SEPARATION: &str = "head-separation";
pub const TAIL_SEPARATION: &str = "tail-separation";
pub const DISJUNCTION: &str = "disjunction";
pub const EXPANSION: &str = "expansion";
pub const REALIZATION: &str = "realization";
pub const CONTEXTUALIZATION: &str = "contextualization";
pub const INSTANTIATION: &str = "instantiation";
pub const GENERALIZATION: &str = "generalization";

impl RuleId {
    pub const APPLICATION: RuleId = RuleId(0);
    pub const ABSTRACTION: RuleId = RuleId(1);
    pub const CONSTRUCTION: RuleId = RuleId(2);
    pub const HEAD_SEPARATION: RuleId = RuleId(3);
    pub const TAIL_SEPARATION: RuleId = RuleId(4);
    pub const DISJUNCTION: RuleId = RuleId(5);
    pub const EXPANSION: RuleId = RuleId(6);
    pub const REALIZATION: RuleId = RuleId(7);
    pub const CONTEXTUALIZATION: RuleId = RuleId(8);
    pub const INSTANTIATION: RuleId = RuleId(9);
    pub const GENERALIZATION: RuleId = RuleId(10);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct RuleTable<N> {
    rules: Vec<(String, Rule<N>)>,
}

impl<N: Nameable + 'static> RuleTable<N> {
    fn builtin() -> Self {
        let rules: [(&str, Rule<N>); 11] = [
            (APPLICATION, application),
            (ABSTRACTION, abstraction),
            (CONSTRUCTION, construction),
            (HEAD_SEPARATION, head_separation),
            (TAIL_SEPARATION, tail_separation),
            (DISJUNCTION, disjunction),
            (EXPANSION, expansion),
            (REALIZATION, realization),
            (CONTEXTUALIZATION, contextualization),
            (INSTANTIATION, instantiation),
            (GENERALIZATION, generalization),
        ];
        Self {
            rules: rules
                .into_iter()
                .map(|(name, rule)| (name.to_string(), rule))
                .collect(),
        }
    }

    fn id_of(&self, name: &str) -> Option<RuleId> {
        self.rules.iter().position(|(n, _)| n == name).map(RuleId)
    }
}

static REGISTRY: LazyLock<Mutex<HashMap<TypeId, Box<dyn Any + Send>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn with_table<N: Nameable + 'static, R>(f: impl FnOnce(&mut RuleTable<N>) -> R) -> R {
    // Entries are only appended, so a poisoned table is still consistent.
    let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    let entry = registry
        .entry(TypeId::of::<N>())
        .or_insert_with(|| Box::new(RuleTable::<N>::builtin()));
    let Some(table) = entry.downcast_mut::<RuleTable<N>>() else {
        unreachable!("rule table stored under a foreign type id")
    };
    f(table)
}

/// Adds a rule under a new name and returns its id.
pub fn register_rule<N: Nameable + 'static>(
    name: &str,
    rule: Rule<N>,
) -> Result<RuleId, AlgebraError> {
    with_table::<N, _>(|table| {
        if table.id_of(name).is_some() {
            return Err(AlgebraError::RuleAlreadyRegistered(name.to_string()));
        }
        table.rules.push((name.to_string(), rule));
        Ok(RuleId(table.rules.len() - 1))
    })
}

pub fn rule_id<N: Nameable + 'static>(name: &str) -> Option<RuleId> {
    with_table::<N, _>(|table| table.id_of(name))
}

pub fn rule_name<N: Nameable + 'static>(id: RuleId) -> Option<String> {
    with_table::<N, _>(|table| table.rules.get(id.0).map(|(name, _)| name.clone()))
}

fn lookup<N: Nameable + 'static>(id: RuleId) -> Option<Rule<N>> {
    with_table::<N, _>(|table| table.rules.get(id.0).map(|(_, rule)| *rule))
}

impl<N: Nameable + 'static> TypeContext<N> {
    /// Runs a rule and pushes its result. On error nothing is pushed.
    pub fn apply_rule(&mut self, id: RuleId) -> Result<(), AlgebraError> {
        let rule = lookup::<N>(id).ok_or(AlgebraError::UnknownRule(id.0))?;
        let result = rule(self)?;
        self.push(result);
        Ok(())
    }

    pub fn apply_named_rule(&mut self, name: &str) -> Result<(), AlgebraError> {
        let id = rule_id::<N>(name).ok_or_else(|| AlgebraError::UnknownRuleName(name.to_string()))?;
        self.apply_rule(id)
    }
}

// ---------------------------------------------------------------------------
// Built-in rules
// ---------------------------------------------------------------------------

// Operands are popped top first: for `[.., a, b]`, `ms[0]` is `b`.

fn application<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let ms = cxt.pop_monotypes(2)?;
    cxt.apply_types(&ms[1], &ms[0]).map(Type::Mono)
}

fn abstraction<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let m = cxt.pop_monotype()?;
    Ok(Type::Mono(cxt.abstract_type(&m)))
}

fn construction<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let ms = cxt.pop_monotypes(2)?;
    Ok(Type::Mono(cxt.cons_types(&ms[1], &ms[0])))
}

fn head_separation<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let m = cxt.pop_monotype()?;
    cxt.head(&m).map(Type::Mono)
}

fn tail_separation<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let m = cxt.pop_monotype()?;
    cxt.tail(&m).map(Type::Mono)
}

fn disjunction<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let m = cxt.pop_monotype()?;
    Ok(Type::Mono(cxt.disjoin(&m)))
}

fn expansion<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let ms = cxt.pop_monotypes(2)?;
    Ok(Type::Mono(cxt.expand(&ms[1], &ms[0])))
}

fn realization<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let ms = cxt.pop_monotypes(3)?;
    cxt.realize(&ms[2], &ms[1], &ms[0]).map(Type::Mono)
}

fn contextualization<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let mut ps = cxt.pop_as_polytypes(2)?.into_iter();
    match (ps.next(), ps.next()) {
        (Some(q), Some(p)) => Ok(cxt.contextualize(p, q)),
        _ => unreachable!("two polytypes were popped"),
    }
}

fn instantiation<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let m = cxt.pop_monotype()?;
    match cxt.pop_polytype() {
        Ok(p) => Ok(p.instantiate(&m)),
        Err(e) => {
            cxt.push(m);
            Err(e)
        }
    }
}

fn generalization<N: Nameable>(cxt: &mut TypeContext<N>) -> Result<Type<N>, AlgebraError> {
    let t = cxt.pop()?;
    Ok(Type::Poly(t.generalize()))
}
