mod common;

use common::{int, runtime};
use luxcore::{
    ast::{BinaryOperator, RoutineKind},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::Runtime,
            function::{adapter::FunctionCall, core::INTERNAL_FUNCTIONS},
        },
        store::core::{Class, Owner, Payload, SymbolId},
        value::{
            complex::ComplexNumber,
            core::{Array, ArrayData, Scalar},
        },
    },
};

fn call(rt: &mut Runtime, name: &str, args: &[SymbolId]) -> Result<SymbolId, RuntimeError> {
    let node = rt.call(name, args).unwrap();
    rt.eval(node)
}

fn call_scalar(rt: &mut Runtime, name: &str, arg: Scalar) -> Scalar {
    let arg = rt.scalar(arg).unwrap();
    let result = call(rt, name, &[arg]).unwrap_or_else(|e| panic!("{name}({arg}) failed: {e}"));
    rt.scalar_value(result).unwrap()
}

/// Defines `name(x)` whose body is `x op value`.
fn define_affine(rt: &mut Runtime, name: &str, op: BinaryOperator, value: i32) -> SymbolId {
    let f = rt.define_routine(RoutineKind::Function, name, &["x"], &[]).unwrap();
    let x = rt.routine_variable(f, "x").unwrap();
    let value = int(rt, value);
    let body = rt.binary_op(op, x, value).unwrap();
    rt.set_routine_body(f, &[body]).unwrap();
    f
}

#[test]
fn float_functions_promote_integers_to_float() {
    let mut rt = runtime();
    assert_eq!(call_scalar(&mut rt, "sqrt", Scalar::Int32(16)), Scalar::Float(4.0));
    assert_eq!(call_scalar(&mut rt, "exp", Scalar::Double(0.0)), Scalar::Double(1.0));
    assert_eq!(call_scalar(&mut rt, "ln", Scalar::Double(1.0)), Scalar::Double(0.0));
    assert_eq!(call_scalar(&mut rt, "cos", Scalar::Byte(0)), Scalar::Float(1.0));

    let Scalar::CDouble(root) =
        call_scalar(&mut rt, "sqrt", Scalar::CDouble(ComplexNumber::new(-9.0, 0.0)))
    else {
        panic!("expected a complex result");
    };
    assert!(root.real.abs() < 1e-12);
    assert!((root.imaginary - 3.0).abs() < 1e-12);
}

#[test]
fn complex_parts_and_magnitudes() {
    let mut rt = runtime();
    let z = Scalar::CFloat(ComplexNumber::new(1.0, 2.0));
    assert_eq!(call_scalar(&mut rt, "real", z), Scalar::Float(1.0));
    assert_eq!(call_scalar(&mut rt, "imaginary", z), Scalar::Float(2.0));
    assert_eq!(call_scalar(&mut rt, "imaginary", Scalar::Double(3.0)), Scalar::Double(0.0));
    assert_eq!(call_scalar(&mut rt, "conjugate", Scalar::CDouble(ComplexNumber::new(1.0, 2.0))),
               Scalar::CDouble(ComplexNumber::new(1.0, -2.0)));
    assert_eq!(call_scalar(&mut rt, "abs", Scalar::Int32(-5)), Scalar::Int32(5));

    let a = rt.array(&[2], ArrayData::Int16(vec![-3, 4])).unwrap();
    let result = call(&mut rt, "abs", &[a]).unwrap();
    assert_eq!(rt.array_value(result).unwrap().data(), &ArrayData::Int16(vec![3, 4]));
}

#[test]
fn reductions_and_shape_queries() {
    let mut rt = runtime();
    let halves = rt.array(&[2], ArrayData::Float(vec![0.5, 1.5])).unwrap();
    let sum = call(&mut rt, "total", &[halves]).unwrap();
    assert_eq!(rt.scalar_value(sum).unwrap(), Scalar::Float(2.0));

    let text = rt.string("héllo").unwrap();
    let count = call(&mut rt, "num_elem", &[text]).unwrap();
    assert_eq!(rt.scalar_value(count).unwrap(), Scalar::Int32(5));

    let grid = rt.array(&[2, 3], ArrayData::Int32(vec![0; 6])).unwrap();
    let dims = call(&mut rt, "dimen", &[grid]).unwrap();
    let dims = rt.array_value(dims).unwrap();
    assert_eq!(dims.dims(), &[2]);
    assert_eq!(dims.data(), &ArrayData::Int32(vec![2, 3]));

    let counted = call(&mut rt, "indgen", &[grid]).unwrap();
    let counted = rt.array_value(counted).unwrap();
    assert_eq!(counted.dims(), &[2, 3]);
    assert_eq!(counted.data(), &ArrayData::Int32((0..6).collect()));
}

#[test]
fn internal_calls_check_names_and_arity() {
    let mut rt = runtime();
    let a = int(&mut rt, 1);
    let b = int(&mut rt, 2);

    assert!(INTERNAL_FUNCTIONS.contains(&"dimen"));
    assert_eq!(rt.call("nope", &[a]),
               Err(RuntimeError::UnknownFunction { name: "nope".to_string() }));
    assert_eq!(call(&mut rt, "sqrt", &[a, b]),
               Err(RuntimeError::ArgumentCountMismatch { name:  "sqrt".to_string(),
                                                         found: 2, }));

    let s = rt.string("x").unwrap();
    assert!(matches!(call(&mut rt, "sqrt", &[s]),
                     Err(RuntimeError::IllegalClass { class: Class::String, .. })));
}

#[test]
fn internal_call_arguments_are_evaluated_first() {
    let mut rt = runtime();
    let a = rt.array(&[3], ArrayData::Int32(vec![1, 2, 3])).unwrap();
    let two = int(&mut rt, 2);
    let doubled = rt.binary_op(BinaryOperator::Mul, a, two).unwrap();
    let before = rt.store().live_count();

    let sum = call(&mut rt, "total", &[doubled]).unwrap();
    assert_eq!(rt.scalar_value(sum).unwrap(), Scalar::Int32(12));
    // the call node plus its result
    assert_eq!(rt.store().live_count(), before + 2);
}

#[test]
fn user_functions_return_their_last_value() {
    let mut rt = runtime();
    let f = rt.define_routine(RoutineKind::Function, "f", &["x"], &[]).unwrap();
    let x = rt.routine_variable(f, "x").unwrap();
    let one = int(&mut rt, 1);
    let two = int(&mut rt, 2);
    let first = rt.binary_op(BinaryOperator::Add, x, one).unwrap();
    let last = rt.binary_op(BinaryOperator::Mul, x, two).unwrap();
    rt.set_routine_body(f, &[first, last]).unwrap();

    let seven = int(&mut rt, 7);
    let node = rt.call_routine(f, &[seven]).unwrap();
    let result = rt.eval(node).unwrap();
    assert_eq!(rt.scalar_value(result).unwrap(), Scalar::Int32(14));
    assert_eq!(rt.store().payload(x).unwrap(), &Payload::Undefined);
}

#[test]
fn nested_calls_see_their_own_arguments() {
    let mut rt = runtime();
    let f = define_affine(&mut rt, "tenfold", BinaryOperator::Mul, 10);
    let two = int(&mut rt, 2);
    let inner = rt.call_routine(f, &[two]).unwrap();
    let outer = rt.call_routine(f, &[inner]).unwrap();

    let result = rt.eval(outer).unwrap();
    assert_eq!(rt.scalar_value(result).unwrap(), Scalar::Int32(200));
}

#[test]
fn routine_misuse_is_reported() {
    let mut rt = runtime();
    let sub = rt.define_routine(RoutineKind::Subroutine, "show", &["x"], &[]).unwrap();
    let one = int(&mut rt, 1);
    let node = rt.call_routine(sub, &[one]).unwrap();
    assert!(matches!(rt.eval(node),
                     Err(RuntimeError::IllegalClass { class: Class::Routine, .. })));

    let empty = rt.define_routine(RoutineKind::Function, "empty", &[], &[]).unwrap();
    let node = rt.call_routine(empty, &[]).unwrap();
    assert_eq!(rt.eval(node),
               Err(RuntimeError::UndefinedSymbol { name: "empty".to_string() }));

    let f = define_affine(&mut rt, "inc", BinaryOperator::Add, 1);
    let two = int(&mut rt, 2);
    let node = rt.call_routine(f, &[one, two]).unwrap();
    assert_eq!(rt.eval(node),
               Err(RuntimeError::ArgumentCountMismatch { name:  "inc".to_string(),
                                                         found: 2, }));

    let node = rt.call_routine(f, &[]).unwrap();
    assert_eq!(rt.eval(node),
               Err(RuntimeError::UndefinedSymbol { name: "x".to_string() }));
}

#[test]
fn subroutines_run_without_leaking() {
    let mut rt = runtime();
    let sub = rt.define_routine(RoutineKind::Subroutine, "work", &["x"], &[]).unwrap();
    let x = rt.routine_variable(sub, "x").unwrap();
    let three = int(&mut rt, 3);
    let body = rt.binary_op(BinaryOperator::Pow, x, three).unwrap();
    rt.set_routine_body(sub, &[body]).unwrap();

    let arg = rt.array(&[2], ArrayData::Double(vec![1.0, 2.0])).unwrap();
    let before = rt.store().live_count();
    rt.call_subroutine(sub, &[arg]).unwrap();
    assert_eq!(rt.store().live_count(), before);
    assert_eq!(rt.store().payload(x).unwrap(), &Payload::Undefined);
}

#[test]
fn adapter_calls_user_and_internal_functions() {
    let mut rt = runtime();
    define_affine(&mut rt, "shift", BinaryOperator::Sub, 4);

    let shift = FunctionCall::new(&rt, "shift", 1).unwrap();
    assert_eq!(shift.name(), "shift");
    let ten = int(&mut rt, 10);
    assert_eq!(shift.call(&mut rt, &[ten]).unwrap(), 6.0);

    let sqrt = FunctionCall::new(&rt, "sqrt", 1).unwrap();
    let x = rt.scalar(Scalar::Double(2.25)).unwrap();
    let before = rt.store().live_count();
    assert_eq!(sqrt.call(&mut rt, &[x]).unwrap(), 1.5);
    assert_eq!(rt.store().live_count(), before);
}

#[test]
fn adapter_rejects_bad_calls() {
    let mut rt = runtime();
    define_affine(&mut rt, "shift", BinaryOperator::Sub, 4);

    assert_eq!(FunctionCall::new(&rt, "shift", 2),
               Err(RuntimeError::ArgumentCountMismatch { name:  "shift".to_string(),
                                                         found: 2, }));
    assert_eq!(FunctionCall::new(&rt, "sqrt", 3),
               Err(RuntimeError::ArgumentCountMismatch { name:  "sqrt".to_string(),
                                                         found: 3, }));
    assert_eq!(FunctionCall::new(&rt, "fit", 1),
               Err(RuntimeError::UnknownFunction { name: "fit".to_string() }));

    let sqrt = FunctionCall::new(&rt, "sqrt", 1).unwrap();
    let z = rt.scalar(Scalar::CDouble(ComplexNumber::new(-1.0, 0.0))).unwrap();
    assert_eq!(sqrt.call(&mut rt, &[z]),
               Err(RuntimeError::NonNumericResult { name: "sqrt".to_string() }));
    assert_eq!(sqrt.call(&mut rt, &[z, z]),
               Err(RuntimeError::ArgumentCountMismatch { name:  "sqrt".to_string(),
                                                         found: 2, }));
}

#[test]
fn adapter_accepts_only_numeric_arguments() {
    let mut rt = runtime();
    define_affine(&mut rt, "shift", BinaryOperator::Sub, 4);
    let shift = FunctionCall::new(&rt, "shift", 1).unwrap();

    let text = rt.string("ten").unwrap();
    let words = rt.array(&[2], ArrayData::String(vec!["a".to_string(), "b".to_string()]))
                  .unwrap();
    let one = int(&mut rt, 1);
    let list = rt.clist(&[one]).unwrap();
    let before = rt.store().live_count();

    for (arg, class) in [(text, Class::String), (words, Class::Array), (list, Class::CList)] {
        assert!(matches!(shift.call(&mut rt, &[arg]),
                         Err(RuntimeError::IllegalClass { class: c, .. }) if c == class),
                "{class:?}");
    }
    assert_eq!(rt.store().live_count(), before);
}

#[test]
fn adapter_leaves_temporary_arguments_intact() {
    let mut rt = runtime();
    let g = rt.define_routine(RoutineKind::Function, "g", &["x"], &[]).unwrap();
    let x = rt.routine_variable(g, "x").unwrap();
    let two = int(&mut rt, 2);
    let doubled = rt.binary_op(BinaryOperator::Mul, x, two).unwrap();
    let body = rt.call("total", &[doubled]).unwrap();
    rt.set_routine_body(g, &[body]).unwrap();

    let arg = rt.store_mut()
                .allocate_temp(Payload::Array(Array::from_vec(vec![1_i32, 2, 3])))
                .unwrap();
    let before = rt.store().live_count();

    let call = FunctionCall::new(&rt, "g", 1).unwrap();
    assert_eq!(call.call(&mut rt, &[arg]).unwrap(), 12.0);
    assert_eq!(call.call(&mut rt, &[arg]).unwrap(), 12.0);

    assert_eq!(rt.array_value(arg).unwrap().data(), &ArrayData::Int32(vec![1, 2, 3]));
    assert_eq!(rt.store().get(arg).unwrap().owner(), Owner::Temporary(1));
    assert_eq!(rt.store().live_count(), before);
}
