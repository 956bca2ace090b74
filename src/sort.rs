use std::cmp::Ordering;

use crate::{
    ast::{Direction, Order},
    transform::WorkingRow,
};

/// Sorts rows in place by `order`; a no-op without one.
///
/// The sort is stable: rows equal on every key keep their relative order.
pub fn sort(rows: &mut [WorkingRow<'_>], order: Option<&Order>) {
    if let Some(order) = order {
        rows.sort_by(|a, b| compare_rows(a, b, order));
    }
}

/// Compares two rows key by key; the first key that differs decides.
pub fn compare_rows(a: &WorkingRow<'_>, b: &WorkingRow<'_>, order: &Order) -> Ordering {
    for key in &order.keys {
        let ordering = match (a.get(key), b.get(key)) {
            (Some(x), Some(y)) => x.compare(y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return match order.direction {
                Direction::Up => ordering,
                Direction::Down => ordering.reverse(),
            };
        }
    }
    Ordering::Equal
}
