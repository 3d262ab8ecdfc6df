//! Multi-column sort with dense priorities and a three-step toggle cycle.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, trace};

use crate::data::datatable::DataRow;
use crate::data::datavalue_compare::compare_datavalues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub key: String,
    pub direction: SortDirection,
    /// Dense 0-based rank, lower is compared first
    pub priority: usize,
}

impl SortKey {
    pub fn new(key: impl Into<String>, direction: SortDirection, priority: usize) -> Self {
        Self {
            key: key.into(),
            direction,
            priority,
        }
    }
}

/// Advance `key` through asc -> desc -> removed, leaving other keys in place.
///
/// A new key is appended with the lowest precedence. Removing a key closes
/// the gap so priorities stay `0..n`.
pub fn toggle(sort: &[SortKey], key: &str) -> Vec<SortKey> {
    let mut next = sort.to_vec();
    if key.is_empty() {
        return next;
    }

    match next.iter().position(|entry| entry.key == key) {
        None => {
            let priority = next.len();
            next.push(SortKey::new(key, SortDirection::Asc, priority));
        }
        Some(index) if next[index].direction == SortDirection::Asc => {
            next[index].direction = SortDirection::Desc;
        }
        Some(index) => {
            let removed = next.remove(index).priority;
            for entry in next.iter_mut().filter(|entry| entry.priority > removed) {
                entry.priority -= 1;
            }
        }
    }

    debug!(target: "sort", "toggle {} -> {}", key, describe(&next));
    next
}

/// Sort keys in the order they are compared
pub fn by_priority(sort: &[SortKey]) -> Vec<&SortKey> {
    let mut keys: Vec<&SortKey> = sort.iter().collect();
    keys.sort_by_key(|entry| entry.priority);
    keys
}

/// Compare two rows key by key. Nulls and ties defer to the next key.
pub fn compare_rows(a: &DataRow, b: &DataRow, keys: &[&SortKey]) -> Ordering {
    for entry in keys {
        let left = a.get(&entry.key);
        let right = b.get(&entry.key);
        if left.is_null() || right.is_null() {
            continue;
        }
        match compare_datavalues(left, right) {
            Ordering::Equal => continue,
            ordering => return entry.direction.apply(ordering),
        }
    }
    Ordering::Equal
}

/// Stable in-place ordering of row positions
pub fn sort_indices(indices: &mut [usize], rows: &[DataRow], sort: &[SortKey]) {
    if sort.is_empty() {
        return;
    }
    let keys = by_priority(sort);
    merge_sort(indices, &|&a: &usize, &b: &usize| {
        compare_rows(&rows[a], &rows[b], &keys)
    });
    trace!(target: "sort", "sorted {} rows by {}", indices.len(), describe(sort));
}

const INSERTION_THRESHOLD: usize = 16;

/// Stable merge sort.
///
/// Skipping null keys makes `compare_rows` a non-transitive relation, which
/// `slice::sort_by` is allowed to reject with a panic. This sort only ever
/// asks "is right strictly less than left" and so tolerates it.
fn merge_sort<T: Copy, F>(items: &mut [T], compare: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    let len = items.len();
    if len <= INSERTION_THRESHOLD {
        for i in 1..len {
            let mut j = i;
            while j > 0 && compare(&items[j], &items[j - 1]) == Ordering::Less {
                items.swap(j, j - 1);
                j -= 1;
            }
        }
        return;
    }

    let mid = len / 2;
    merge_sort(&mut items[..mid], compare);
    merge_sort(&mut items[mid..], compare);

    let left = items[..mid].to_vec();
    let right = items[mid..].to_vec();
    let (mut l, mut r) = (0, 0);
    for slot in items.iter_mut() {
        let take_right =
            l == left.len() || (r < right.len() && compare(&right[r], &left[l]) == Ordering::Less);
        if take_right {
            *slot = right[r];
            r += 1;
        } else {
            *slot = left[l];
            l += 1;
        }
    }
}

/// Sorted copy of `rows`
pub fn sort_rows(rows: &[DataRow], sort: &[SortKey]) -> Vec<DataRow> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    sort_indices(&mut indices, rows, sort);
    indices.into_iter().map(|index| rows[index].clone()).collect()
}

/// Human readable form, e.g. `name asc, age desc`
pub fn describe(sort: &[SortKey]) -> String {
    if sort.is_empty() {
        return "(none)".to_string();
    }
    by_priority(sort)
        .iter()
        .map(|entry| format!("{} {}", entry.key, entry.direction))
        .collect::<Vec<_>>()
        .join(", ")
}
