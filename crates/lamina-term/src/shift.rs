//! De Bruijn depth shifting.
//!
//! Every operation that moves a term into or out of a binder's scope goes
//! through [`Shift`]; nothing else in the crate touches depth arithmetic.

/// "Add `delta` to every depth above `threshold`."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shift {
    pub threshold: usize,
    pub delta: isize,
}

impl Shift {
    pub fn new(threshold: usize, delta: isize) -> Self {
        Self { threshold, delta }
    }

    /// Shift for a term about to sit under `binders` more binders.
    pub fn up(binders: usize) -> Self {
        Self::new(0, binders as isize)
    }

    /// The same shift seen from inside `binders` further binders.
    pub fn under(self, binders: usize) -> Self {
        Self {
            threshold: self.threshold + binders,
            delta: self.delta,
        }
    }

    /// New depth of one occurrence.
    ///
    /// Depths at or below the threshold are bound and stay put; unassigned
    /// occurrences (depth 0) never move. A shift that would push a free
    /// occurrence to depth 0 or below is a contract violation.
    pub fn depth(self, depth: usize) -> usize {
        if depth <= self.threshold {
            return depth;
        }
        match depth.checked_add_signed(self.delta) {
            Some(shifted) if shifted > 0 => shifted,
            _ => panic!(
                "de Bruijn depth {depth} shifted by {} above {} leaves the free range",
                self.delta, self.threshold
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn bound_and_unassigned_depths_do_not_move() {
        let shift = Shift::new(2, 5);
        assert_eq!(shift.depth(0), 0);
        assert_eq!(shift.depth(1), 1);
        assert_eq!(shift.depth(2), 2);
        assert_eq!(shift.depth(3), 8);
    }

    #[test]
    fn under_raises_threshold_only() {
        assert_eq!(Shift::new(1, -1).under(3), Shift::new(4, -1));
        assert_eq!(Shift::up(2), Shift::new(0, 2));
    }

    #[test]
    #[should_panic(expected = "leaves the free range")]
    fn shifting_a_free_depth_to_zero_panics() {
        Shift::new(0, -1).depth(1);
    }

    proptest! {
        #[test]
        fn shift_up_then_down_is_identity(depth in 0usize..64, threshold in 0usize..16, delta in 0isize..16) {
            let up = Shift::new(threshold, delta);
            let down = Shift::new(threshold + delta as usize, -delta);
            let moved = up.depth(depth);
            // Depths above the threshold land above threshold + delta, so the
            // inverse shift catches exactly the occurrences that moved.
            prop_assert_eq!(down.depth(moved), depth);
        }

        #[test]
        fn shift_is_monotone(a in 0usize..64, b in 0usize..64, threshold in 0usize..16, delta in 0isize..16) {
            let shift = Shift::new(threshold, delta);
            if a <= b {
                prop_assert!(shift.depth(a) <= shift.depth(b));
            }
        }

        #[test]
        fn zero_delta_is_identity(depth in 0usize..64, threshold in 0usize..16) {
            prop_assert_eq!(Shift::new(threshold, 0).depth(depth), depth);
        }
    }
}
