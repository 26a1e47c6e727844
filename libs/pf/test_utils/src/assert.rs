use pf_rs::model::drive_node::DriveNode;
use pf_rs::model::tree_like::TreeLike;

#[macro_export]
macro_rules! assert_matches (
    ($actual:expr, $expected:pat) => {
        // Only compute actual once
        let actual_value = $actual;
        match actual_value {
            $expected => {},
            _ => panic!("assertion failed: {:?} did not match expectation", actual_value)
        }
    }
);

pub fn ids_equal_ignore_order(left: &[&str], right: &[&str]) {
    let mut left = left.to_vec();
    let mut right = right.to_vec();
    left.sort_unstable();
    right.sort_unstable();
    assert_eq!(left, right);
}

/// No folder in `roots` sits beneath another.
pub fn disjoint(roots: &[&DriveNode]) {
    for (i, outer) in roots.iter().enumerate() {
        for (j, inner) in roots.iter().enumerate() {
            if i != j {
                assert!(
                    !outer.contains(&inner.id),
                    "{} is nested under {}",
                    inner.id,
                    outer.id
                );
            }
        }
    }
}
