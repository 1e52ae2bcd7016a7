//! Behavioral laws of the SMT-LIB backend that hold without a solver.
//!
//! Ground formulas are evaluated by a model with no definitions; sessions
//! that need a satisfiable check use a solver with a fixed answer.

use std::rc::Rc;

use num_bigint::BigInt;
use proptest::prelude::*;
use smtwrap_api::{
    FloatingPointRoundingMode, FloatingPointType, ProverEnvironment, ShutdownNotifier, Value,
};
use smtwrap_smtlib::{Definition, Script, Sort, Term};
use smtwrap_solver::{
    ContextConfig, SmtlibCachingModel, SmtlibModel, SmtlibSessionModel, SolverBackend,
    SolverConfig, SolverContext, SolverError, SolverKind, SolverModel, SolverResult,
    StringTheoryKind,
};

/// Answers every check with the same result.
struct FixedAnswer(SolverResult);

impl SolverBackend for FixedAnswer {
    fn check_sat_interruptible(
        &self,
        _script: &Script,
        _notifier: &ShutdownNotifier,
    ) -> Result<SolverResult, SolverError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> String {
        "fixed".to_string()
    }
}

fn context_with(theory: StringTheoryKind, answer: SolverResult) -> SolverContext {
    let config = ContextConfig::new(SolverConfig::new(SolverKind::Z3, "z3".into()))
        .with_string_theory(theory);
    SolverContext::with_solver(config, Rc::new(FixedAnswer(answer)))
}

fn context(theory: StringTheoryKind) -> SolverContext {
    context_with(theory, SolverResult::Unsat)
}

/// Model with no assignments: evaluates ground formulas only.
fn ground_model(context: &SolverContext) -> SmtlibSessionModel {
    SmtlibSessionModel::new(Rc::clone(context.creator()), SmtlibModel::default())
}

// ---- String length is additive under every adapter ----

proptest! {
    #[test]
    fn length_of_concat_is_sum_of_lengths(a in "[ -~]{0,8}", b in "\\PC{0,8}") {
        for theory in [
            StringTheoryKind::Strings,
            StringTheoryKind::Sequences,
            StringTheoryKind::ConcatOnly,
        ] {
            let context = context(theory);
            let smgr = context.strings();
            let imgr = context.integers();
            let a_f = smgr.make_string(&a).unwrap();
            let b_f = smgr.make_string(&b).unwrap();
            let joined = smgr.length(&smgr.concat(&a_f, &b_f).unwrap()).unwrap();
            let sum = imgr
                .add(&smgr.length(&a_f).unwrap(), &smgr.length(&b_f).unwrap())
                .unwrap();

            let model = ground_model(&context);
            let expected = BigInt::from(a.chars().count() + b.chars().count());
            prop_assert_eq!(model.evaluate_integer(&joined), Some(expected.clone()));
            prop_assert_eq!(model.evaluate_integer(&sum), Some(expected));
        }
    }
}

// ---- Caching model ----

#[test]
fn caching_model_lists_once_and_leaves_unassigned_symbols_absent() {
    let answer = SolverResult::Sat(Some(SolverModel::with_definitions(vec![Definition {
        name: "x".to_string(),
        params: Vec::new(),
        sort: Sort::Int,
        body: Term::int(4),
    }])));
    let context = context_with(StringTheoryKind::Strings, answer);
    let imgr = context.integers();
    let x = imgr.make_variable("x").unwrap();
    let unassigned = imgr.make_variable("z").unwrap();

    let mut prover = context.new_prover();
    prover
        .add_constraint(&imgr.greater_than(&x, &imgr.make_number(3).unwrap()).unwrap())
        .unwrap();
    assert!(!prover.is_unsat().unwrap());
    let model = SmtlibCachingModel::new(prover.model().unwrap());

    let first = model.as_list().unwrap();
    let second = model.as_list().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].value(), &Value::Integer(BigInt::from(4)));
    assert_eq!(model.evaluate(&unassigned), None);
    assert_eq!(model.evaluate(&unassigned), None);
    assert_eq!(model.evaluate(&x), Some(Value::Integer(BigInt::from(4))));
}

// ---- Floating-point sign ----

#[test]
fn negation_flips_the_sign_of_everything_but_nan() {
    let context = context(StringTheoryKind::Strings);
    let fpmgr = context.floating_points();
    let single = FloatingPointType::single_precision();
    let model = ground_model(&context);
    let negative = |x: f64| {
        let f = fpmgr.make_number(x, single).unwrap();
        let is_negative = model.evaluate_boolean(&fpmgr.is_negative(&f).unwrap());
        let negated = fpmgr.negate(&f).unwrap();
        let negated_is_negative = model.evaluate_boolean(&fpmgr.is_negative(&negated).unwrap());
        (is_negative, negated_is_negative)
    };

    for x in [-1.0, -2.0, -0.0, f64::NEG_INFINITY] {
        assert_eq!(negative(x), (Some(true), Some(false)), "value {x}");
    }
    for x in [1.0, 2.0, 0.0, f64::INFINITY] {
        assert_eq!(negative(x), (Some(false), Some(true)), "value {x}");
    }
    assert_eq!(negative(f64::NAN), (Some(false), Some(false)));
}

// ---- Rounding to integral ----

#[test]
fn rounding_table() {
    use FloatingPointRoundingMode::*;

    // value, toward zero, toward positive, toward negative, ties-to-even, ties-away
    let table: [(f64, [f64; 5]); 15] = [
        (0.0, [0.0, 0.0, 0.0, 0.0, 0.0]),
        (1.0, [1.0, 1.0, 1.0, 1.0, 1.0]),
        (-1.0, [-1.0, -1.0, -1.0, -1.0, -1.0]),
        (1.1, [1.0, 2.0, 1.0, 1.0, 1.0]),
        (1.5, [1.0, 2.0, 1.0, 2.0, 2.0]),
        (1.9, [1.0, 2.0, 1.0, 2.0, 2.0]),
        (10.1, [10.0, 11.0, 10.0, 10.0, 10.0]),
        (10.5, [10.0, 11.0, 10.0, 10.0, 11.0]),
        (10.9, [10.0, 11.0, 10.0, 11.0, 11.0]),
        (-1.1, [-1.0, -1.0, -2.0, -1.0, -1.0]),
        (-1.5, [-1.0, -1.0, -2.0, -2.0, -2.0]),
        (-1.9, [-1.0, -1.0, -2.0, -2.0, -2.0]),
        (-10.1, [-10.0, -10.0, -11.0, -10.0, -10.0]),
        (-10.5, [-10.0, -10.0, -11.0, -10.0, -11.0]),
        (-10.9, [-10.0, -10.0, -11.0, -11.0, -11.0]),
    ];
    let modes = [
        TowardZero,
        TowardPositive,
        TowardNegative,
        NearestTiesToEven,
        NearestTiesAway,
    ];

    let context = context(StringTheoryKind::Strings);
    let fpmgr = context.floating_points();
    let double = FloatingPointType::double_precision();
    let model = ground_model(&context);
    for (value, expected) in table {
        let f = fpmgr.make_number(value, double).unwrap();
        for (rm, want) in modes.into_iter().zip(expected) {
            let rounded = fpmgr.round(&f, rm).unwrap();
            assert_eq!(
                model.evaluate(&rounded),
                Some(Value::Float(want)),
                "round({value}, {rm:?})"
            );
        }
    }
}

// ---- IEEE bits ----

proptest! {
    #[test]
    fn single_precision_bits_match_the_host(bits in any::<u32>()) {
        let x = f32::from_bits(bits);
        prop_assume!(x.is_finite());

        let context = context(StringTheoryKind::Strings);
        let fpmgr = context.floating_points();
        let single = FloatingPointType::single_precision();
        let model = ground_model(&context);

        let f = fpmgr.make_number(f64::from(x), single).unwrap();
        let raw = fpmgr.to_ieee_bitvector(&f).unwrap();
        prop_assert_eq!(model.evaluate_bitvector(&raw), Some(BigInt::from(x.to_bits())));

        let back = fpmgr.from_ieee_bitvector(&raw, single).unwrap();
        prop_assert_eq!(model.evaluate(&back), Some(Value::Float(f64::from(x))));
    }
}
