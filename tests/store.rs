mod common;

use common::{int, runtime};
use luxcore::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Runtime, RuntimeConfig},
        store::core::{Class, Owner, Payload, SymbolStore},
        types::ElementType,
        value::core::{ArrayData, Scalar},
    },
};

#[test]
fn sweep_deletes_only_marked_temporaries() {
    common::init_tracing();
    let mut store = SymbolStore::default();
    let named = store.define_named("keep", Scalar::Int32(1).into()).unwrap();
    let a = store.allocate_temp(Scalar::Int32(2).into()).unwrap();
    let b = store.allocate_temp(Scalar::Int32(3).into()).unwrap();
    assert_eq!(store.temporaries_at_current_level(), 2);

    store.unmark(b);
    store.sweep_marked();

    assert!(store.contains(named));
    assert!(!store.contains(a));
    assert!(store.contains(b));
    assert_eq!(store.temporaries_at_current_level(), 0);
}

#[test]
fn embedded_temporaries_survive_their_scope() {
    common::init_tracing();
    let mut store = SymbolStore::default();
    let (list, member) = {
        let mut member = None;
        let list = store.with_temp_scope(|store| {
                             let m = store.allocate_temp(Scalar::Int32(7).into())?;
                             let list = store.allocate_temp(Payload::CList(vec![m]))?;
                             store.embed(m, list)?;
                             member = Some(m);
                             Ok(list)
                         })
                         .unwrap();
        (list, member.unwrap())
    };

    assert!(store.contains(list));
    assert!(store.contains(member));
    assert_eq!(store.get(member).unwrap().owner(), Owner::Container(list));

    store.delete(list);
    assert!(!store.contains(member));
}

#[test]
fn failed_scopes_release_their_temporaries() {
    common::init_tracing();
    let mut store = SymbolStore::default();
    let before = store.live_count();

    let outcome = store.with_temp_scope(|store| {
                           store.allocate_temp(Scalar::Int32(1).into())?;
                           Err(RuntimeError::NotImplemented { feature: "test" })
                       });

    assert!(outcome.is_err());
    assert_eq!(store.live_count(), before);
}

#[test]
fn evaluation_leaves_only_its_result() {
    let mut rt = runtime();
    let a = rt.array(&[3], ArrayData::Int32(vec![1, 2, 3])).unwrap();
    let b = int(&mut rt, 2);
    let sum = rt.binary_op(BinaryOperator::Add, a, b).unwrap();
    let product = rt.binary_op(BinaryOperator::Mul, sum, sum).unwrap();
    let root = rt.binary_op(BinaryOperator::Sub, product, a).unwrap();
    let before = rt.store().live_count();

    let result = rt.eval(root).unwrap();
    assert_eq!(rt.array_value(result).unwrap().data(), &ArrayData::Int32(vec![8, 14, 22]));
    assert_eq!(rt.store().live_count(), before + 1);
    assert_eq!(rt.store().temporaries_at_current_level(), 1);
    assert_eq!(rt.store().get(result).unwrap().owner(), Owner::Temporary(1));
}

#[test]
fn evaluation_errors_leave_nothing_behind() {
    let mut rt = runtime();
    let a = rt.array(&[2], ArrayData::Float(vec![1.0, 2.0])).unwrap();
    let b = int(&mut rt, 2);
    let sum = rt.binary_op(BinaryOperator::Add, a, b).unwrap();
    let bad = rt.binary_op(BinaryOperator::And, sum, b).unwrap();
    let before = rt.store().live_count();

    assert!(rt.eval(bad).is_err());
    assert_eq!(rt.store().live_count(), before);
    assert_eq!(rt.store().temporaries_at_current_level(), 0);
}

#[test]
fn capacity_is_enforced_and_slots_are_reused() {
    common::init_tracing();
    let mut rt = Runtime::with_config(RuntimeConfig::default().symbol_capacity(3));
    let a = int(&mut rt, 1);
    int(&mut rt, 2);
    int(&mut rt, 3);

    assert_eq!(rt.scalar(Scalar::Int32(4)),
               Err(RuntimeError::OutOfSymbols { capacity: 3 }));

    rt.store_mut().delete(a);
    let reused = int(&mut rt, 5);
    assert_eq!(reused, a);
}

#[test]
fn named_variables_keep_their_id_when_redefined() {
    let mut rt = runtime();
    let x = rt.define("x", Scalar::Int32(1).into()).unwrap();
    let again = rt.define("x", Scalar::Double(2.5).into()).unwrap();

    assert_eq!(x, again);
    assert_eq!(rt.store().lookup("x").unwrap(), x);
    assert_eq!(rt.scalar_value(x).unwrap(), Scalar::Double(2.5));
    assert_eq!(rt.store().get(x).unwrap().name(), Some("x"));

    rt.store_mut().delete(x);
    assert_eq!(rt.store().lookup("x"),
               Err(RuntimeError::UndefinedSymbol { name: "x".to_string() }));
}

#[test]
fn redefinition_releases_owned_members() {
    let mut rt = runtime();
    let one = int(&mut rt, 1);
    let two = int(&mut rt, 2);
    let list = rt.define("pair", Payload::CList(vec![one, two])).unwrap();
    assert_eq!(rt.store().get(one).unwrap().owner(), Owner::Container(list));

    rt.define("pair", Scalar::Int32(0).into()).unwrap();
    assert!(!rt.store().contains(one));
    assert!(!rt.store().contains(two));
}

#[test]
fn assignment_moves_temporaries_and_copies_values() {
    let mut rt = runtime();
    let a = rt.array(&[2], ArrayData::Int32(vec![1, 2])).unwrap();
    let one = int(&mut rt, 1);
    let sum = rt.binary_op(BinaryOperator::Add, a, one).unwrap();
    let before = rt.store().live_count();

    let x = rt.assign("x", sum).unwrap();
    assert_eq!(rt.array_value(x).unwrap().data(), &ArrayData::Int32(vec![2, 3]));
    assert_eq!(rt.store().live_count(), before + 1);
    assert_eq!(rt.store().temporaries_at_current_level(), 0);

    let y = rt.assign("y", x).unwrap();
    assert_ne!(x, y);
    rt.define("x", Scalar::Int32(0).into()).unwrap();
    assert_eq!(rt.array_value(y).unwrap().data(), &ArrayData::Int32(vec![2, 3]));
}

#[test]
fn casts_narrow_like_as() {
    let mut rt = runtime();
    let x = rt.scalar(Scalar::Double(-3.9)).unwrap();
    let y = rt.cast(x, ElementType::Int16).unwrap();
    assert_eq!(rt.scalar_value(y).unwrap(), Scalar::Int16(-3));

    let a = rt.array(&[3], ArrayData::Double(vec![1.5, 300.0, -2.0])).unwrap();
    let b = rt.cast(a, ElementType::Byte).unwrap();
    assert_eq!(rt.array_value(b).unwrap().data(), &ArrayData::Byte(vec![1, 255, 0]));

    let s = rt.string("text").unwrap();
    assert_eq!(rt.cast(s, ElementType::Double),
               Err(RuntimeError::IllegalClass { class:     Class::String,
                                                operation: "convert" }));
}

#[test]
fn undefined_variables_cannot_be_evaluated() {
    let mut rt = runtime();
    let u = rt.define("u", Payload::Undefined).unwrap();
    assert_eq!(rt.eval(u),
               Err(RuntimeError::UndefinedSymbol { name: "u".to_string() }));
}

#[test]
fn duplicates_are_deep_copies() {
    let mut rt = runtime();
    let one = int(&mut rt, 1);
    let list = rt.clist(&[one]).unwrap();

    let copy = rt.store_mut().duplicate(list).unwrap();
    let Payload::CList(members) = rt.store().payload(copy).unwrap().clone() else {
        panic!("expected a list");
    };
    assert_ne!(members[0], one);
    assert_eq!(rt.scalar_value(members[0]).unwrap(), Scalar::Int32(1));
    assert_eq!(rt.store().get(members[0]).unwrap().owner(), Owner::Container(copy));
}
