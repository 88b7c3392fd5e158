//! Property tests for unification and the rule layer using proptest.
//!
//! Key properties:
//!
//! 1. Unification reflexivity: unify(t, t) always succeeds
//! 2. Consistency: after a successful unify(a, b), resolve(a) == resolve(b)
//! 3. Occurs check: unifying Var(x) with a type containing Var(x) fails
//! 4. Resolution terminates and never yields an infinite type
//! 5. Head of a constructed pair is its first component
//! 6. Inst(Gen(t)) renames every free variable of t

use proptest::prelude::*;

use lamina_term::Name;
use lamina_types::{Monotype, Type, TypeConstant, TypeVariable, function, list};

use crate::context::TypeContext;
use crate::infer::InferenceContext;
use crate::rules::RuleId;
use crate::status::Status;

type M = Monotype<Name>;

// ---------------------------------------------------------------------------
// Strategies for generating types
// ---------------------------------------------------------------------------

const VAR_POOL: &[&str] = &["a", "b", "c", "d", "e"];
const CONST_POOL: &[&str] = &["Int", "Bool", "Str"];

fn arb_var() -> impl Strategy<Value = M> {
    prop::sample::select(VAR_POOL).prop_map(M::var)
}

fn arb_monotype(depth: u32) -> BoxedStrategy<M> {
    let leaf = prop_oneof![
        2 => arb_var(),
        1 => prop::sample::select(CONST_POOL).prop_map(M::constant),
    ];
    if depth == 0 {
        return leaf.boxed();
    }
    let inner = arb_monotype(depth - 1);
    prop_oneof![
        2 => leaf,
        1 => (inner.clone(), inner.clone()).prop_map(|(a, b)| function(a, b)),
        1 => inner.clone().prop_map(list),
        1 => prop::collection::vec(inner, 1..3)
            .prop_map(|ps| M::app(TypeConstant::plain("Pair"), ps)),
    ]
    .boxed()
}

/// Pairs sharing variables, so some unify and some do not.
fn arb_pair() -> impl Strategy<Value = (M, M)> {
    (arb_monotype(3), arb_monotype(3))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn unify_is_reflexive(t in arb_monotype(4)) {
        let mut cxt = TypeContext::<Name>::new();
        prop_assert_eq!(cxt.unify(&t, &t), Status::Ok);
    }

    #[test]
    fn successful_unification_is_consistent((a, b) in arb_pair()) {
        let mut cxt = TypeContext::<Name>::new();
        if cxt.unify(&a, &b).is_ok() {
            prop_assert_eq!(cxt.resolve(&a), cxt.resolve(&b));
        }
    }

    #[test]
    fn occurs_check_fires(v in prop::sample::select(VAR_POOL), rest in arb_monotype(2)) {
        let mut cxt = TypeContext::<Name>::new();
        let containing = function(Monotype::var(v), rest);
        prop_assert_eq!(cxt.unify(&Monotype::var(v), &containing), Status::OccursCheckFailed);
        prop_assert_eq!(cxt.find(&Monotype::var(v)), Monotype::var(v));
    }

    #[test]
    fn resolution_terminates_after_any_unification(pairs in prop::collection::vec(arb_pair(), 1..5)) {
        let mut cxt = TypeContext::<Name>::new();
        for (a, b) in &pairs {
            let _ = cxt.unify(a, b);
        }
        for name in VAR_POOL {
            let resolved = cxt.resolve(&Monotype::var(name));
            prop_assert!(!resolved.occurs(&TypeVariable::named(name)));
        }
    }

    #[test]
    fn head_of_pair_is_first_component(a in arb_monotype(2), b in arb_monotype(2)) {
        let mut cxt = TypeContext::<Name>::new();
        cxt.push(a.clone());
        cxt.push(b);
        cxt.apply_rule(RuleId::CONSTRUCTION).unwrap();
        cxt.apply_rule(RuleId::HEAD_SEPARATION).unwrap();
        let top = cxt.pop_monotype().unwrap();
        prop_assert_eq!(cxt.resolve(&top), cxt.resolve(&a));
    }

    #[test]
    fn instantiation_renames_generalized_variables(t in arb_monotype(3)) {
        let mut cxt = InferenceContext::<Name>::new();
        let sigma = cxt.generalize(&t);
        let inst = cxt.instantiate(&Type::Poly(sigma));
        let before = t.free_variables();
        let after = inst.free_variables();
        prop_assert_eq!(before.len(), after.len());
        prop_assert!(after.iter().all(|v| v.name.as_str().starts_with('$')));
    }
}
