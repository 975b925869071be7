mod common;

use common::{int, runtime};
use luxcore::{
    ast::{BinaryOperator, Link, RoutineKind},
    error::RuntimeError,
    interpreter::{
        evaluator::core::Runtime,
        store::core::{Class, Owner, Payload, Range, RangeBound, SymbolId},
        value::core::{ArrayData, Scalar},
    },
};

fn tag(name: &str) -> Link {
    Link::Tag(name.to_string())
}

fn extract(rt: &mut Runtime, target: SymbolId, links: Vec<Link>) -> Result<SymbolId, RuntimeError> {
    let access = rt.extract(target, links).unwrap();
    rt.eval(access)
}

fn matrix(rt: &mut Runtime) -> SymbolId {
    rt.array(&[3, 2], ArrayData::Int32((0..6).collect())).unwrap()
}

fn span(rt: &mut Runtime, start: i32, end: i32) -> SymbolId {
    let start = int(rt, start);
    let end = int(rt, end);
    rt.range(RangeBound::at(start), RangeBound::at(end)).unwrap()
}

#[test]
fn range_members_are_its_endpoints() {
    let mut rt = runtime();
    let one = int(&mut rt, 1);
    let two = int(&mut rt, 2);
    let range = rt.range(RangeBound::at(one), RangeBound::from_end(two)).unwrap();

    let zero = int(&mut rt, 0);
    assert_eq!(extract(&mut rt, range, vec![Link::Subscript(vec![zero])]).unwrap(), one);
    assert_eq!(extract(&mut rt, range, vec![tag("1")]).unwrap(), two);

    let index = int(&mut rt, 2);
    assert_eq!(extract(&mut rt, range, vec![Link::Subscript(vec![index])]),
               Err(RuntimeError::SubscriptOutOfRange { index: 2, size: 2 }));
}

#[test]
fn range_endpoints_are_written_back_in_their_encoding() {
    let mut rt = runtime();
    let one = int(&mut rt, 1);
    let two = int(&mut rt, 2);
    let range = rt.range(RangeBound::at(one), RangeBound::from_end(two)).unwrap();
    let four = int(&mut rt, 4);
    let five = int(&mut rt, 5);

    rt.range_endpoint_for_write(range, 0, four).unwrap();
    rt.range_endpoint_for_write(range, 1, five).unwrap();
    let Payload::Range(r) = rt.store().payload(range).unwrap().clone() else {
        panic!("expected a range");
    };
    assert_eq!(r.start, RangeBound::at(four));
    assert_eq!(r.end, RangeBound::from_end(five));
    assert!(!rt.store().contains(one));

    assert!(matches!(rt.range_endpoint_for_write(range, 2, four),
                     Err(RuntimeError::SubscriptOutOfRange { index: 2, size: 2 })));
}

#[test]
fn lists_take_keys_and_positions() {
    let mut rt = runtime();
    let a = int(&mut rt, 1);
    let b = rt.string("x").unwrap();
    let c = int(&mut rt, 3);
    let list = rt.list(&[(Some("a"), a), (Some("b"), b), (None, c)]).unwrap();

    let two = int(&mut rt, 2);
    assert_eq!(extract(&mut rt, list, vec![Link::Subscript(vec![two])]).unwrap(), c);
    let key = rt.string("a").unwrap();
    assert_eq!(extract(&mut rt, list, vec![Link::Subscript(vec![key])]).unwrap(), a);
    assert_eq!(extract(&mut rt, list, vec![tag("missing")]),
               Err(RuntimeError::NoSuchMember { name:  "missing".to_string(),
                                                class: Class::List, }));

    let clist = rt.clist(&[a, c]).unwrap();
    let one = int(&mut rt, 1);
    assert_eq!(extract(&mut rt, clist, vec![Link::Subscript(vec![one])]).unwrap(), c);
    let five = int(&mut rt, 5);
    assert_eq!(extract(&mut rt, clist, vec![Link::Subscript(vec![five])]),
               Err(RuntimeError::SubscriptOutOfRange { index: 5, size: 2 }));
}

#[test]
fn members_computed_on_evaluation_survive_extraction() {
    let mut rt = runtime();
    let a = rt.array(&[2], ArrayData::Int32(vec![1, 2])).unwrap();
    let ten = int(&mut rt, 10);
    let sum = rt.binary_op(BinaryOperator::Mul, a, ten).unwrap();
    let list = rt.list(&[(Some("scaled"), sum)]).unwrap();
    let access = rt.extract(list, vec![tag("scaled")]).unwrap();
    let before = rt.store().live_count();

    let result = rt.eval(access).unwrap();
    assert_eq!(rt.array_value(result).unwrap().data(), &ArrayData::Int32(vec![10, 20]));
    assert_eq!(rt.store().get(result).unwrap().owner(), Owner::Temporary(1));
    assert_eq!(rt.store().live_count(), before + 1);
}

#[test]
fn enum_members_are_fresh_long_scalars() {
    let mut rt = runtime();
    let colors = rt.enumeration(&[("red", 1), ("green", 2), ("blue", 4)]).unwrap();

    let blue = extract(&mut rt, colors, vec![tag("blue")]).unwrap();
    assert_eq!(rt.scalar_value(blue).unwrap(), Scalar::Int32(4));
    assert!(rt.store().get(blue).unwrap().owner().is_temporary());

    let one = int(&mut rt, 1);
    let green = extract(&mut rt, colors, vec![Link::Subscript(vec![one])]).unwrap();
    assert_eq!(rt.scalar_value(green).unwrap(), Scalar::Int32(2));

    assert!(matches!(extract(&mut rt, colors, vec![tag("mauve")]),
                     Err(RuntimeError::NoSuchMember { class: Class::Enum, .. })));
}

fn nested_struct(rt: &mut Runtime) -> SymbolId {
    let values = rt.array(&[3], ArrayData::Int32(vec![10, 20, 30])).unwrap();
    let inner = rt.structure(&[("b", values)]).unwrap();
    let five = int(rt, 5);
    let one = int(rt, 1);
    let list = rt.list(&[(Some("k"), one)]).unwrap();
    rt.structure(&[("a", five), ("inner", inner), ("l", list)]).unwrap()
}

#[test]
fn struct_chains_walk_members_and_subscripts() {
    let mut rt = runtime();
    let s = nested_struct(&mut rt);

    let five = extract(&mut rt, s, vec![tag("a")]).unwrap();
    assert_eq!(rt.scalar_value(five).unwrap(), Scalar::Int32(5));

    let one = int(&mut rt, 1);
    let twenty =
        extract(&mut rt, s, vec![tag("inner"), tag("b"), Link::Subscript(vec![one])]).unwrap();
    assert_eq!(rt.scalar_value(twenty).unwrap(), Scalar::Int32(20));

    let k = extract(&mut rt, s, vec![tag("l"), tag("k")]).unwrap();
    assert_eq!(rt.scalar_value(k).unwrap(), Scalar::Int32(1));
}

#[test]
fn struct_cursor_records_the_path() {
    let mut rt = runtime();
    let s = nested_struct(&mut rt);
    let one = int(&mut rt, 1);

    let (cursor, consumed) = rt.struct_cursor(s,
                                              &[tag("inner"),
                                                tag("b"),
                                                Link::Subscript(vec![one])])
                               .unwrap();
    assert_eq!(consumed, 3);
    let Payload::StructPtr(ptr) = rt.store().payload(cursor).unwrap().clone() else {
        panic!("expected a struct pointer");
    };
    assert_eq!(ptr.target, s);
    assert_eq!(ptr.path.iter().map(|step| step.member).collect::<Vec<_>>(), [1, 0]);
    assert_eq!(ptr.path[1].subscripts, Some(vec![one]));
}

#[test]
fn struct_subscripts_are_restricted() {
    let mut rt = runtime();
    let s = nested_struct(&mut rt);
    let zero = int(&mut rt, 0);
    let one = int(&mut rt, 1);

    assert_eq!(extract(&mut rt,
                       s,
                       vec![tag("inner"),
                            tag("b"),
                            Link::Subscript(vec![zero]),
                            Link::Subscript(vec![one])]),
               Err(RuntimeError::RepeatedSubscript { member: "b".to_string() }));
    assert_eq!(extract(&mut rt, s, vec![Link::Subscript(vec![zero])]),
               Err(RuntimeError::NotImplemented { feature: "structure-pointer subscripting" }));
    assert_eq!(extract(&mut rt, s, vec![tag("zzz")]),
               Err(RuntimeError::NoSuchMember { name:  "zzz".to_string(),
                                                class: Class::Struct, }));
}

#[test]
fn routine_tags_name_variables() {
    let mut rt = runtime();
    let f = rt.define_routine(RoutineKind::Function, "f", &["x"], &["tmp"]).unwrap();

    let x = extract(&mut rt, f, vec![tag("x")]).unwrap();
    assert_eq!(x, rt.routine_variable(f, "x").unwrap());
    let tmp = extract(&mut rt, f, vec![tag("tmp")]).unwrap();
    assert_eq!(rt.store().get(tmp).unwrap().name(), Some("tmp"));
    assert!(matches!(extract(&mut rt, f, vec![tag("y")]),
                     Err(RuntimeError::NoSuchMember { class: Class::Routine, .. })));
}

#[test]
fn array_subscripts_select_elements() {
    let mut rt = runtime();
    let m = matrix(&mut rt);
    let one = int(&mut rt, 1);

    let element = rt.subscript(m, &[one, one]).unwrap();
    assert_eq!(rt.scalar_value(element).unwrap(), Scalar::Int32(4));

    let rows = span(&mut rt, 0, 2);
    let column = rt.subscript(m, &[rows, one]).unwrap();
    let column = rt.array_value(column).unwrap();
    assert_eq!(column.dims(), &[3]);
    assert_eq!(column.data(), &ArrayData::Int32(vec![3, 4, 5]));

    let picks = rt.array(&[2], ArrayData::Int32(vec![5, 0])).unwrap();
    let picked = rt.subscript(m, &[picks]).unwrap();
    assert_eq!(rt.array_value(picked).unwrap().data(), &ArrayData::Int32(vec![5, 0]));
}

#[test]
fn range_subscripts_sum_and_redirect() {
    let mut rt = runtime();
    let m = matrix(&mut rt);
    let zero = int(&mut rt, 0);
    let two = int(&mut rt, 2);
    let summed = rt.node(Payload::Range(Range { start:    RangeBound::at(zero),
                                                end:      RangeBound::at(two),
                                                sum:      true,
                                                redirect: None, }))
                   .unwrap();
    let columns = span(&mut rt, 0, 1);

    let sums = rt.subscript(m, &[summed, columns]).unwrap();
    let sums = rt.array_value(sums).unwrap();
    assert_eq!(sums.dims(), &[2]);
    assert_eq!(sums.data(), &ArrayData::Int32(vec![3, 12]));

    let start = int(&mut rt, 0);
    let end = int(&mut rt, 2);
    let moved = rt.node(Payload::Range(Range { start:    RangeBound::at(start),
                                               end:      RangeBound::at(end),
                                               sum:      false,
                                               redirect: Some(1), }))
                  .unwrap();
    let transposed = rt.subscript(m, &[moved, columns]).unwrap();
    let transposed = rt.array_value(transposed).unwrap();
    assert_eq!(transposed.dims(), &[2, 3]);
    assert_eq!(transposed.data(), &ArrayData::Int32(vec![0, 3, 1, 4, 2, 5]));
}

#[test]
fn from_end_ranges_count_back_from_the_last_element() {
    let mut rt = runtime();
    let a = rt.array(&[5], ArrayData::Int32(vec![10, 11, 12, 13, 14])).unwrap();
    let one = int(&mut rt, 1);
    let two = int(&mut rt, 2);
    let range = rt.range(RangeBound::from_end(two), RangeBound::from_end(one)).unwrap();

    let tail = extract(&mut rt, a, vec![Link::Subscript(vec![range])]).unwrap();
    assert_eq!(rt.array_value(tail).unwrap().data(), &ArrayData::Int32(vec![12, 13]));
}

#[test]
fn bad_array_subscripts_are_reported() {
    let mut rt = runtime();
    let m = matrix(&mut rt);
    let ten = int(&mut rt, 10);
    let one = int(&mut rt, 1);

    assert_eq!(rt.subscript(m, &[ten]),
               Err(RuntimeError::SubscriptOutOfRange { index: 10, size: 6 }));
    assert!(matches!(rt.subscript(m, &[one, one, one]),
                     Err(RuntimeError::InvalidSubscript { .. })));
    let text = rt.string("no").unwrap();
    assert!(matches!(rt.subscript(m, &[text]), Err(RuntimeError::InvalidSubscript { .. })));
}

#[test]
fn string_subscripts_take_substrings() {
    let mut rt = runtime();
    let hello = rt.string("hello").unwrap();

    let middle = span(&mut rt, 1, 3);
    let part = rt.subscript(hello, &[middle]).unwrap();
    assert_eq!(rt.string_value(part).unwrap(), "ell");

    let zero = int(&mut rt, 0);
    let first = rt.subscript(hello, &[zero]).unwrap();
    assert_eq!(rt.string_value(first).unwrap(), "h");
}
