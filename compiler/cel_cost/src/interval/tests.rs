use super::*;

#[test]
fn test_add_saturates_at_max() {
    let a = Interval::exact(u64::MAX - 1);
    let b = Interval::exact(2);
    assert_eq!(a.add(b), Interval::exact(u64::MAX));
}

#[test]
fn test_multiply_saturates_at_max() {
    let a = Interval::exact(u64::MAX);
    let b = Interval::exact(2);
    assert_eq!(a.multiply(b), Interval::exact(u64::MAX));
}

#[test]
fn test_union_widens_to_cover_both() {
    let a = Interval::new(1, 3);
    let b = Interval::new(2, 10);
    assert_eq!(a.union(b), Interval::new(1, 10));
}

#[test]
fn test_multiply_by_cost_factor_rounds_up() {
    let a = Interval::exact(3);
    assert_eq!(a.multiply_by_cost_factor(0.1), Interval::exact(1));
}

#[test]
fn test_multiply_by_cost_factor_zero_floors_to_zero() {
    let a = Interval::exact(100);
    assert_eq!(a.multiply_by_cost_factor(0.0), Interval::ZERO);
}

#[test]
fn test_multiply_by_cost_factor_saturates_at_max() {
    let a = Interval::exact(u64::MAX / 2);
    assert_eq!(a.multiply_by_cost_factor(100.0), Interval::exact(u64::MAX));
}
