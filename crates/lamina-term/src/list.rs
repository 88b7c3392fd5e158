//! Operations on strict term lists.

use crate::{Nameable, Term};

/// The forced first element, or `None` for an empty list.
pub fn head<N: Nameable>(elems: &[Term<N>]) -> Option<Term<N>> {
    elems.first().map(Term::force)
}

/// Everything after the first element; empty for lists of length 0 or 1.
pub fn tail<N: Nameable>(elems: &[Term<N>]) -> Vec<Term<N>> {
    elems.get(1..).map(<[Term<N>]>::to_vec).unwrap_or_default()
}

pub fn cons<N: Nameable>(head: Term<N>, tail: &[Term<N>]) -> Term<N> {
    let mut elems = Vec::with_capacity(tail.len() + 1);
    elems.push(head);
    elems.extend_from_slice(tail);
    Term::List(elems)
}
