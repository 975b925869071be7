mod common;

use common::runtime;
use luxcore::{
    ast::BinaryOperator,
    interpreter::{
        types::{ElementType, combined_type_for_operator, promote},
        value::core::Scalar,
    },
    util::num::{famod, fasmod, iamod, iasmod, ifloor_div},
};
use proptest::{prelude::*, sample::select};

fn numeric_type() -> impl Strategy<Value = ElementType> {
    select(ElementType::NUMERIC.to_vec())
}

fn operator_where(keep: fn(BinaryOperator) -> bool) -> impl Strategy<Value = BinaryOperator> {
    select(BinaryOperator::ALL.into_iter().filter(|&op| keep(op)).collect::<Vec<_>>())
}

fn evaluate(op: BinaryOperator, left: Scalar, right: Scalar) -> Scalar {
    let mut rt = runtime();
    let l = rt.scalar(left).unwrap();
    let r = rt.scalar(right).unwrap();
    let node = rt.binary_op(op, l, r).unwrap();
    let result = rt.eval(node).unwrap();
    rt.scalar_value(result).unwrap()
}

proptest! {
    #[test]
    fn promotion_picks_the_wider_operand(a in numeric_type(), b in numeric_type()) {
        let p = promote(a, b);
        prop_assert!(p == a || p == b);
        prop_assert!(p >= a && p >= b);
        prop_assert_eq!(p, promote(b, a));
    }

    #[test]
    fn commutative_operators_have_symmetric_result_types(op in operator_where(BinaryOperator::is_commutative),
                                                          a in numeric_type(),
                                                          b in numeric_type()) {
        prop_assert_eq!(combined_type_for_operator(op, a, b), combined_type_for_operator(op, b, a));
    }

    #[test]
    fn comparisons_always_yield_int32(op in operator_where(BinaryOperator::is_comparison),
                                       a in numeric_type(),
                                       b in numeric_type()) {
        prop_assert_eq!(combined_type_for_operator(op, a, b), Some(ElementType::Int32));
    }

    #[test]
    fn widening_through_double_is_lossless(i in any::<i32>(), f in -1.0e30_f32..1.0e30) {
        let wide = Scalar::Int32(i).cast(ElementType::Double).unwrap();
        prop_assert_eq!(wide.cast(ElementType::Int32), Some(Scalar::Int32(i)));

        let wide = Scalar::Float(f).cast(ElementType::Double).unwrap();
        prop_assert_eq!(wide.cast(ElementType::Float), Some(Scalar::Float(f)));
    }

    #[test]
    fn integer_floor_division_and_modulus_agree(x in -1_000_000_i64..1_000_000,
                                                y in (-1000_i64..1000).prop_filter("nonzero", |y| *y != 0)) {
        let q = ifloor_div(x, y);
        let r = iamod(x, y);
        prop_assert_eq!(q * y + r, x);
        prop_assert!(r == 0 || (r < 0) == (y < 0));
        prop_assert!(r.abs() < y.abs());

        let s = iasmod(x, y);
        prop_assert_eq!((x - s) % y, 0);
        prop_assert!(2 * s > -y.abs() && 2 * s <= y.abs());
    }

    #[test]
    fn float_remainders_stay_in_range(x in -1.0e6_f64..1.0e6, y in 1.0e-3_f64..1.0e3) {
        let r = famod(x, y);
        prop_assert!((0.0..y).contains(&r));

        let r = famod(x, -y);
        prop_assert!(r <= 0.0 && r > -y);

        let s = fasmod(x, y);
        prop_assert!(s > -y / 2.0 && s <= y / 2.0);
    }

    #[test]
    fn float_floor_division_and_modulus_agree(x in -1.0e6_f64..1.0e6,
                                              y in prop_oneof![-1.0e3_f64..-1.0e-3, 1.0e-3_f64..1.0e3]) {
        let Scalar::Double(q) = evaluate(BinaryOperator::IntDivFloor, Scalar::Double(x), Scalar::Double(y))
        else {
            panic!("expected a double quotient");
        };
        let Scalar::Double(r) = evaluate(BinaryOperator::Mod, Scalar::Double(x), Scalar::Double(y))
        else {
            panic!("expected a double remainder");
        };
        prop_assert_eq!(q, q.round());
        prop_assert!((q * y + r - x).abs() <= 4.0 * f64::EPSILON * (x.abs() + y.abs()),
                     "{} // {} = {}, remainder {}", x, y, q, r);
    }

    #[test]
    fn integer_addition_wraps_and_commutes(a in any::<i32>(), b in any::<i32>()) {
        let sum = evaluate(BinaryOperator::Add, Scalar::Int32(a), Scalar::Int32(b));
        prop_assert_eq!(sum, Scalar::Int32(a.wrapping_add(b)));
        prop_assert_eq!(evaluate(BinaryOperator::Add, Scalar::Int32(b), Scalar::Int32(a)), sum);
    }

    #[test]
    fn max_and_min_pick_an_operand(a in any::<i16>(), b in -1.0e4_f64..1.0e4) {
        let (left, right) = (Scalar::Int16(a), Scalar::Double(b));
        prop_assert_eq!(evaluate(BinaryOperator::Max, left, right),
                        Scalar::Double(f64::from(a).max(b)));
        prop_assert_eq!(evaluate(BinaryOperator::Min, left, right),
                        Scalar::Double(f64::from(a).min(b)));
    }
}
