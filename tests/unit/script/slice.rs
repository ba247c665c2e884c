use super::*;

#[test]
fn index_counts_from_the_end_when_negative() {
    assert_eq!(resolve_index(0, 5), Ok(0));
    assert_eq!(resolve_index(-1, 5), Ok(4));
    assert!(resolve_index(5, 5).is_err());
    assert!(resolve_index(-6, 5).is_err());
}

#[test]
fn forward_slices_clamp_bounds() {
    assert_eq!(resolve_slice(None, None, None, 4), Ok(vec![0, 1, 2, 3]));
    assert_eq!(resolve_slice(Some(1), Some(3), None, 4), Ok(vec![1, 2]));
    assert_eq!(resolve_slice(Some(-2), None, None, 4), Ok(vec![2, 3]));
    assert_eq!(resolve_slice(Some(10), None, None, 4), Ok(vec![]));
    assert_eq!(resolve_slice(Some(-10), Some(100), Some(2), 5), Ok(vec![0, 2, 4]));
}

#[test]
fn backward_slices_follow_python() {
    assert_eq!(resolve_slice(None, None, Some(-1), 4), Ok(vec![3, 2, 1, 0]));
    assert_eq!(resolve_slice(Some(2), None, Some(-2), 5), Ok(vec![2, 0]));
    assert_eq!(resolve_slice(Some(-1), Some(-3), Some(-1), 5), Ok(vec![4, 3]));
    assert_eq!(resolve_slice(Some(9), Some(2), Some(-3), 5), Ok(vec![4]));
}

#[test]
fn zero_step_is_an_error() {
    assert!(resolve_slice(None, None, Some(0), 3).is_err());
}

#[test]
fn full_covers_axis() {
    assert_eq!(full(3), vec![0, 1, 2]);
}
