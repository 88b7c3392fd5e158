use lamina_term::{Name, Term};
use lamina_types::{
    Application, DependentTypeInstance, IndexJudgment, Monotype, Polytype, Type, TypeConstant,
    TypeVariable, cons, function, join, list,
};

use crate::context::TypeContext;
use crate::error::AlgebraError;
use crate::rules::{self, RuleId, register_rule, rule_id, rule_name};
use crate::status::Status;
use crate::trace::UnifyAction;

type M = Monotype<Name>;

fn var(name: &str) -> M {
    Monotype::var(name)
}

fn con(name: &str) -> M {
    Monotype::constant(name)
}

fn app(head: &str, params: Vec<M>) -> M {
    Monotype::app(TypeConstant::plain(head), params)
}

fn tv(name: &str) -> TypeVariable<Name> {
    TypeVariable::named(name)
}

fn forall(binders: &[&str], body: M) -> Type<Name> {
    Type::Poly(Polytype::new(
        binders.iter().map(|b| tv(b)).collect(),
        Type::Mono(body),
    ))
}

/// `(Array a; i)` with `i: Uint`
fn indexed(param: M, index: Term<Name>) -> M {
    Monotype::Instance(DependentTypeInstance::new(
        Application::new(TypeConstant::plain("Array"), vec![param]),
        vec![IndexJudgment::new(index, con("Uint"))],
    ))
}

fn cxt() -> TypeContext<Name> {
    TypeContext::new()
}

fn top(cxt: &TypeContext<Name>) -> String {
    cxt.peek().map(ToString::to_string).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Find and unify
// ---------------------------------------------------------------------------

#[test]
fn find_without_classes_is_identity() {
    let cxt = cxt();
    for m in [var("a"), con("Int"), app("MyType", vec![var("b")])] {
        assert_eq!(cxt.find(&m), m);
    }
}

#[test]
fn unify_variable_with_constant() {
    let mut cxt = cxt();
    assert_eq!(cxt.unify(&var("a"), &con("Int")), Status::Ok);
    assert_eq!(cxt.find(&var("a")), con("Int"));
    assert_eq!(cxt.find(&con("Int")), con("Int"));
}

#[test]
fn unify_constant_with_variable_binds_the_variable() {
    let mut cxt = cxt();
    assert_eq!(cxt.unify(&con("Int"), &var("a")), Status::Ok);
    assert_eq!(cxt.find(&var("a")), con("Int"));
}

#[test]
fn unify_two_variables() {
    let mut cxt = cxt();
    assert_eq!(cxt.unify(&var("a"), &var("b")), Status::Ok);
    assert_eq!(cxt.find(&var("a")), var("b"));
    assert_eq!(cxt.find(&var("b")), var("b"));
    // Already in one class; no cycle is introduced.
    assert_eq!(cxt.unify(&var("b"), &var("a")), Status::Ok);
    assert_eq!(cxt.find(&var("a")), var("b"));
}

#[test]
fn constant_mismatch_leaves_both_sides_unmapped() {
    let mut cxt = cxt();
    assert_eq!(cxt.unify(&con("Int"), &con("Bool")), Status::ConstantMismatch);
    assert_eq!(cxt.find(&con("Int")), con("Int"));
    assert_eq!(cxt.find(&con("Bool")), con("Bool"));
}

#[test]
fn head_mismatch_is_reported_before_parameters() {
    let mut cxt = cxt();
    let status = cxt.unify(
        &app("MyOtherType", vec![var("a")]),
        &app("MyType", vec![var("b")]),
    );
    assert_eq!(status, Status::ConstantMismatch);
    assert_eq!(cxt.find(&var("a")), var("a"));
    assert_eq!(cxt.find(&var("b")), var("b"));
}

#[test]
fn parameter_count_mismatch() {
    let mut cxt = cxt();
    let status = cxt.unify(
        &app("MyType", vec![var("a"), var("b")]),
        &app("MyType", vec![var("b")]),
    );
    assert_eq!(status, Status::ParamLengthMismatch);
    assert_eq!(cxt.find(&var("a")), var("a"));
}

#[test]
fn parameters_unify_pairwise() {
    let mut cxt = cxt();
    let status = cxt.unify(&app("MyType", vec![var("a")]), &app("MyType", vec![var("b")]));
    assert_eq!(status, Status::Ok);
    assert_eq!(cxt.find(&var("a")), var("b"));
}

#[test]
fn occurs_check_rejects_infinite_types() {
    let mut cxt = cxt();
    let status = cxt.unify(&var("a"), &app("MyType", vec![var("a")]));
    assert_eq!(status, Status::OccursCheckFailed);
    assert_eq!(cxt.find(&var("a")), var("a"));
}

#[test]
fn occurs_check_looks_through_classes() {
    let mut cxt = cxt();
    assert_eq!(cxt.unify(&var("b"), &function(var("a"), con("Int"))), Status::Ok);
    assert_eq!(cxt.unify(&var("a"), &app("List", vec![var("b")])), Status::OccursCheckFailed);
}

#[test]
fn chains_resolve_to_the_last_representative() {
    let mut cxt = cxt();
    assert!(cxt.unify(&var("a"), &var("b")).is_ok());
    assert!(cxt.unify(&var("b"), &var("c")).is_ok());
    assert!(cxt.unify(&var("c"), &con("Int")).is_ok());
    assert_eq!(cxt.find(&var("a")), con("Int"));
}

#[test]
fn resolve_substitutes_inside_applications() {
    let mut cxt = cxt();
    assert!(cxt.unify(&var("a"), &function(var("b"), con("Int"))).is_ok());
    assert!(cxt.unify(&var("b"), &con("Bool")).is_ok());
    assert_eq!(cxt.find(&var("a")).to_string(), "(b -> Int)");
    assert_eq!(cxt.resolve(&var("a")).to_string(), "(Bool -> Int)");
}

#[test]
fn failed_unification_keeps_earlier_unions() {
    let mut cxt = cxt();
    let status = cxt.unify(
        &function(var("a"), con("Int")),
        &function(con("Bool"), con("Str")),
    );
    assert_eq!(status, Status::ConstantMismatch);
    assert_eq!(cxt.find(&var("a")), con("Bool"));
}

#[test]
#[should_panic(expected = "cannot union two non-variable types")]
fn union_of_two_constants_is_a_contract_violation() {
    cxt().union(&con("Int"), &con("Bool"));
}

// ---------------------------------------------------------------------------
// Variables and context numbers
// ---------------------------------------------------------------------------

#[test]
fn fresh_variables_are_numbered_from_the_offset() {
    let mut cxt = TypeContext::<Name>::with_var_offset(7);
    assert_eq!(cxt.fresh().to_string(), "$7");
    assert_eq!(cxt.fresh().to_string(), "$8");
}

#[test]
fn context_numbers_keep_sessions_apart() {
    let mut a = TypeContext::<Name>::new();
    let mut b = TypeContext::<Name>::new().with_context_number(3);
    let va = a.new_var();
    let vb = b.new_var();
    assert_eq!(va.to_string(), vb.to_string());
    assert_ne!(va, vb);
    assert_eq!(vb.key(), "$0#3");
    assert_eq!(b.context_number(), 3);

    assert!(a.unify(&Monotype::Var(va.clone()), &con("Int")).is_ok());
    assert_eq!(a.find(&Monotype::Var(vb)), Monotype::Var(TypeVariable::named("$0").bound_in(3)));
}

#[test]
fn inherited_contexts_evolve_independently() {
    let mut parent = cxt();
    let _ = parent.fresh();
    assert!(parent.unify(&var("a"), &con("Int")).is_ok());
    parent.push(con("Int"));

    let mut child = TypeContext::inherit(&parent);
    assert_eq!(child.find(&var("a")), con("Int"));
    assert_eq!(child.stack_len(), 0);
    assert_eq!(child.fresh().to_string(), "$1");

    assert!(child.unify(&var("b"), &con("Bool")).is_ok());
    assert_eq!(parent.find(&var("b")), var("b"));
}

// ---------------------------------------------------------------------------
// Dependent indices
// ---------------------------------------------------------------------------

#[test]
fn variable_indices_join_the_other_side() {
    let mut cxt = cxt();
    let left = indexed(var("a"), Term::var("n"));
    let right = indexed(con("Int"), Term::constant("3"));
    assert_eq!(cxt.unify(&left, &right), Status::Ok);
    assert_eq!(cxt.find(&var("a")), con("Int"));
    assert!(cxt.find_kind(&Term::var("n")).strict_eq(&Term::constant("3")));
    assert_eq!(cxt.resolve(&left).to_string(), "(Array Int; 3)");
}

#[test]
fn different_constant_indices_mismatch() {
    let mut cxt = cxt();
    let left = indexed(var("a"), Term::constant("2"));
    let right = indexed(var("a"), Term::constant("3"));
    assert_eq!(cxt.unify(&left, &right), Status::KindMismatch);
}

#[test]
fn instances_do_not_unify_with_unindexed_applications() {
    let mut cxt = cxt();
    let instance = indexed(var("a"), Term::var("n"));
    let plain = Monotype::app(TypeConstant::plain("Array"), vec![con("Int")]);
    assert_eq!(cxt.unify(&instance, &plain), Status::ParamLengthMismatch);
    assert_eq!(cxt.unify(&plain, &instance), Status::ParamLengthMismatch);
    assert_eq!(cxt.find(&var("a")), var("a"));
}

#[test]
fn equal_indices_unify() {
    let mut cxt = cxt();
    let left = indexed(var("a"), Term::constant("2"));
    let right = indexed(con("Int"), Term::constant("2"));
    assert_eq!(cxt.unify(&left, &right), Status::Ok);
}

#[test]
fn kind_classes_chain() {
    let mut cxt = cxt();
    assert!(cxt.unify_kind(&Term::var("n"), &Term::var("m")).is_ok());
    assert!(cxt.unify_kind(&Term::var("m"), &Term::constant("0")).is_ok());
    assert!(cxt.find_kind(&Term::var("n")).strict_eq(&Term::constant("0")));
    assert_eq!(
        cxt.unify_kind(&Term::var("n"), &Term::constant("1")),
        Status::KindMismatch
    );
}

// ---------------------------------------------------------------------------
// Type-algebra rules
// ---------------------------------------------------------------------------

#[test]
fn builtin_rules_have_stable_ids() {
    let expected = [
        (rules::APPLICATION, RuleId::APPLICATION),
        (rules::ABSTRACTION, RuleId::ABSTRACTION),
        (rules::CONSTRUCTION, RuleId::CONSTRUCTION),
        (rules::HEAD_SEPARATION, RuleId::HEAD_SEPARATION),
        (rules::TAIL_SEPARATION, RuleId::TAIL_SEPARATION),
        (rules::DISJUNCTION, RuleId::DISJUNCTION),
        (rules::EXPANSION, RuleId::EXPANSION),
        (rules::REALIZATION, RuleId::REALIZATION),
        (rules::CONTEXTUALIZATION, RuleId::CONTEXTUALIZATION),
        (rules::INSTANTIATION, RuleId::INSTANTIATION),
        (rules::GENERALIZATION, RuleId::GENERALIZATION),
    ];
    for (name, id) in expected {
        assert_eq!(rule_id::<Name>(name), Some(id), "{name}");
        assert_eq!(rule_name::<Name>(id).as_deref(), Some(name));
    }
}

#[test]
fn application_rule_eliminates_a_function() {
    let mut cxt = cxt();
    cxt.push(function(con("Int"), con("Bool")));
    cxt.push(con("Int"));
    cxt.apply_rule(RuleId::APPLICATION).unwrap();
    assert_eq!(cxt.stack_len(), 1);
    assert_eq!(top(&cxt), "Bool");
}

#[test]
fn application_rule_reports_unification_failures() {
    let mut cxt = cxt();
    cxt.push(con("Int"));
    cxt.push(con("Int"));
    let err = cxt.apply_rule(RuleId::APPLICATION).unwrap_err();
    assert_eq!(
        err,
        AlgebraError::Unification {
            status: Status::ConstantMismatch,
            left: "Int".into(),
            right: "(Int -> $0)".into(),
        }
    );
    assert_eq!(cxt.stack_len(), 0);
}

#[test]
fn abstraction_rule_adds_a_fresh_domain() {
    let mut cxt = cxt();
    cxt.push(con("Int"));
    cxt.apply_named_rule(rules::ABSTRACTION).unwrap();
    assert_eq!(top(&cxt), "($0 -> Int)");
}

#[test]
fn pairs_construct_and_separate() {
    let mut cxt = cxt();
    cxt.push(con("Int"));
    cxt.push(con("Bool"));
    cxt.apply_rule(RuleId::CONSTRUCTION).unwrap();
    assert_eq!(top(&cxt), "(Int & Bool)");

    let pair = cxt.peek().and_then(Type::as_monotype).cloned().unwrap();
    cxt.apply_rule(RuleId::HEAD_SEPARATION).unwrap();
    assert_eq!(top(&cxt), "Int");

    cxt.push(pair);
    cxt.apply_rule(RuleId::TAIL_SEPARATION).unwrap();
    assert_eq!(top(&cxt), "Bool");
    assert_eq!(cxt.stack_len(), 2);
}

#[test]
fn head_of_a_variable_constrains_it() {
    let mut cxt = TypeContext::<Name>::with_var_offset(10);
    cxt.push(var("p"));
    cxt.apply_rule(RuleId::HEAD_SEPARATION).unwrap();
    assert_eq!(top(&cxt), "$10");
    assert_eq!(cxt.find(&var("p")).to_string(), "($10 & $11)");
}

#[test]
fn disjunction_and_expansion_build_unions() {
    let mut cxt = cxt();
    cxt.push(con("Int"));
    cxt.apply_rule(RuleId::DISJUNCTION).unwrap();
    assert_eq!(top(&cxt), "(Int | $0)");

    let mut cxt = TypeContext::<Name>::new();
    cxt.push(con("Int"));
    cxt.push(con("Bool"));
    cxt.apply_rule(RuleId::EXPANSION).unwrap();
    assert_eq!(top(&cxt), "(Int | Bool)");
}

#[test]
fn realization_joins_branch_results() {
    let mut cxt = cxt();
    cxt.push(join(con("Int"), con("Bool")));
    cxt.push(function(con("Int"), con("Str")));
    cxt.push(function(con("Bool"), var("r")));
    cxt.apply_rule(RuleId::REALIZATION).unwrap();
    assert_eq!(cxt.stack_len(), 1);
    assert_eq!(cxt.resolve(cxt.peek().and_then(Type::as_monotype).unwrap()), con("Str"));
    assert_eq!(cxt.find(&var("r")), con("Str"));
}

#[test]
fn realization_rejects_mismatched_branches() {
    let mut cxt = cxt();
    cxt.push(join(con("Int"), con("Bool")));
    cxt.push(function(con("Int"), con("Str")));
    cxt.push(function(con("Int"), con("Str")));
    let err = cxt.apply_rule(RuleId::REALIZATION).unwrap_err();
    assert!(matches!(
        err,
        AlgebraError::Unification {
            status: Status::ConstantMismatch,
            ..
        }
    ));
}

#[test]
fn generalization_then_instantiation() {
    let mut cxt = cxt();
    cxt.push(con("Int"));
    cxt.apply_rule(RuleId::GENERALIZATION).unwrap();
    assert_eq!(top(&cxt), "forall _ . Int");

    cxt.push(forall(&["a"], function(var("a"), var("a"))));
    cxt.push(con("Bool"));
    cxt.apply_rule(RuleId::INSTANTIATION).unwrap();
    assert_eq!(top(&cxt), "(Bool -> Bool)");
    assert_eq!(cxt.stack_len(), 2);
}

#[test]
fn instantiation_needs_a_polytype_below() {
    let mut cxt = cxt();
    cxt.push(con("Int"));
    cxt.push(con("Bool"));
    let err = cxt.apply_rule(RuleId::INSTANTIATION).unwrap_err();
    assert_eq!(err, AlgebraError::ExpectedPolytype("Int".into()));
    assert_eq!(cxt.stack_len(), 2);
    assert_eq!(top(&cxt), "Bool");
}

#[test]
fn contextualization_keeps_the_top_polytype() {
    let mut cxt = cxt();
    cxt.push(forall(&["b"], var("b")));
    cxt.push(forall(&["a"], list(var("a"))));
    cxt.apply_rule(RuleId::CONTEXTUALIZATION).unwrap();
    assert_eq!(top(&cxt), "forall a . [a]");

    cxt.push(con("Int"));
    cxt.apply_rule(RuleId::CONTEXTUALIZATION).unwrap();
    assert_eq!(cxt.peek(), Some(&Type::Mono(con("Int"))));
}

#[test]
fn underflow_pops_nothing() {
    let mut cxt = cxt();
    cxt.push(con("Int"));
    let err = cxt.apply_rule(RuleId::APPLICATION).unwrap_err();
    assert_eq!(
        err,
        AlgebraError::StackUnderflow {
            needed: 2,
            available: 1
        }
    );
    assert_eq!(cxt.stack_len(), 1);
}

#[test]
fn monotype_rules_reject_polytypes() {
    let mut cxt = cxt();
    cxt.push(con("Int"));
    cxt.push(forall(&["a"], var("a")));
    let err = cxt.apply_rule(RuleId::CONSTRUCTION).unwrap_err();
    assert_eq!(err, AlgebraError::ExpectedMonotype("forall a . a".into()));
    assert_eq!(cxt.stack_len(), 2);
}

#[test]
fn unknown_rules_are_errors() {
    let mut cxt = cxt();
    assert_eq!(
        cxt.apply_rule(RuleId(9_999)).unwrap_err(),
        AlgebraError::UnknownRule(9_999)
    );
    assert_eq!(
        cxt.apply_named_rule("no-such-rule").unwrap_err(),
        AlgebraError::UnknownRuleName("no-such-rule".into())
    );
}

fn listing(cxt: &mut TypeContext<Name>) -> Result<Type<Name>, AlgebraError> {
    let m = cxt.pop_monotype()?;
    Ok(Type::Mono(list(m)))
}

#[test]
fn registered_rules_dispatch_by_id() {
    let id = register_rule::<Name>("unify-tests-listing", listing).unwrap();
    assert!(id.0 > RuleId::GENERALIZATION.0);
    assert_eq!(rule_id::<Name>("unify-tests-listing"), Some(id));
    assert_eq!(rule_name::<Name>(id).as_deref(), Some("unify-tests-listing"));

    let mut cxt = cxt();
    cxt.push(con("Int"));
    cxt.apply_rule(id).unwrap();
    assert_eq!(top(&cxt), "[Int]");

    assert_eq!(
        register_rule::<Name>("unify-tests-listing", listing).unwrap_err(),
        AlgebraError::RuleAlreadyRegistered("unify-tests-listing".into())
    );
    assert!(register_rule::<Name>(rules::APPLICATION, listing).is_err());
}

#[test]
fn direct_helpers_mirror_the_rules() {
    let mut cxt = cxt();
    let pair = cxt.cons_types(&con("Int"), &con("Bool"));
    assert_eq!(cxt.tail(&pair).unwrap(), con("Bool"));
    assert_eq!(
        cxt.apply_types(&function(con("Int"), con("Bool")), &con("Int"))
            .unwrap(),
        con("Bool")
    );
    assert_eq!(cxt.expand(&con("A"), &con("B")), join(con("A"), con("B")));
    assert_eq!(cxt.stack_len(), 0);
}

#[test]
fn declare_instantiates_every_binder() {
    let mut cxt = cxt();
    let sigma = forall(&["a", "b"], function(var("a"), var("b")));
    assert_eq!(cxt.declare(&sigma).to_string(), "($0 -> $1)");
    assert_eq!(cxt.declare(&Type::Mono(con("Int"))), con("Int"));
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

#[test]
fn tracing_is_off_by_default() {
    let mut cxt = cxt();
    assert!(cxt.unify(&var("a"), &con("Int")).is_ok());
    assert!(cxt.unify_trace().is_empty());
}

#[test]
fn tracing_records_each_step() {
    let mut cxt = cxt();
    cxt.enable_tracing();
    assert!(cxt.is_tracing());
    let status = cxt.unify(
        &function(var("a"), con("Int")),
        &function(con("Bool"), var("a")),
    );
    assert_eq!(status, Status::ConstantMismatch);

    let actions: Vec<UnifyAction> = cxt.unify_trace().iter().map(|s| s.action).collect();
    assert_eq!(
        actions,
        vec![UnifyAction::Decompose, UnifyAction::Bind, UnifyAction::Error]
    );
    let steps: Vec<usize> = cxt.unify_trace().iter().map(|s| s.step).collect();
    assert_eq!(steps, vec![1, 2, 3]);

    let json = serde_json::to_value(&cxt.unify_trace()[1]).unwrap();
    assert_eq!(json["action"], "bind");
    assert_eq!(json["detail"], "a := Bool");

    assert_eq!(cxt.take_unify_trace().len(), 3);
    assert!(cxt.unify_trace().is_empty());
}

#[test]
fn occurs_check_is_traced() {
    let mut cxt = cxt();
    cxt.enable_tracing();
    let _ = cxt.unify(&var("a"), &cons(var("a"), con("Int")));
    assert_eq!(
        cxt.unify_trace().last().map(|s| s.action),
        Some(UnifyAction::OccursCheck)
    );
}
