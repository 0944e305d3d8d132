//! Group keys and row partitioning.
//!
//! Groups are derived from a single stable sort of the row indices by group
//! key. Both the emitted keys and the row-to-group assignment come from that
//! one ordering, so they cannot drift apart.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use serde::Serialize;

use super::dataset::Column;

// =============================================================================
// GroupValue / GroupKey
// =============================================================================

/// The value of one grouping column for one group.
///
/// Numbers are ordered with [`f64::total_cmp`]. Keys built by [`Partition`]
/// are canonicalized first, so NaN keys form one group after every other
/// number and `-0.0` groups with `0.0`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GroupValue {
    Number(f64),
    Text(String),
}

impl GroupValue {
    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Text(_) => 1,
        }
    }
}

impl PartialEq for GroupValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupValue {}

impl PartialOrd for GroupValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for GroupValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for GroupValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for GroupValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One value per grouping column, in grouping-column order.
///
/// Keys compare lexicographically. The implicit group of an ungrouped
/// dataset has the empty key.
pub type GroupKey = Vec<GroupValue>;

// =============================================================================
// Partition
// =============================================================================

/// A group: its key and the range it occupies in [`Partition::order`].
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: GroupKey,
    pub rows: Range<usize>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Row partition of a dataset by its grouping columns.
///
/// `order` holds the original row indices sorted by group key (stable, so
/// rows keep their relative order inside a group). Each [`Group`] covers a
/// contiguous range of `order`, and groups are listed in ascending key
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    order: Vec<usize>,
    groups: Vec<Group>,
}

impl Partition {
    /// Partition `n_rows` rows by the values of `key_columns`.
    ///
    /// With no key columns the result is one group with the empty key
    /// covering every row, in original order.
    pub fn from_columns(key_columns: &[&Column], n_rows: usize) -> Self {
        let keys: Vec<GroupKey> = (0..n_rows)
            .map(|row| key_columns.iter().map(|col| value_at(col, row)).collect())
            .collect();

        let mut order: Vec<usize> = (0..n_rows).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

        let mut groups: Vec<Group> = Vec::new();
        for (pos, &row) in order.iter().enumerate() {
            match groups.last_mut() {
                Some(group) if group.key == keys[row] => group.rows.end = pos + 1,
                _ => groups.push(Group {
                    key: keys[row].clone(),
                    rows: pos..pos + 1,
                }),
            }
        }

        if groups.is_empty() && key_columns.is_empty() {
            groups.push(Group {
                key: GroupKey::new(),
                rows: 0..0,
            });
        }

        Self { order, groups }
    }

    /// Original row indices in canonical group order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Groups in canonical key order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Original row indices belonging to `group`.
    pub fn rows_of(&self, group: &Group) -> &[usize] {
        &self.order[group.rows.clone()]
    }
}

/// Map values that compare equal as floats onto one bit pattern, so `-0.0`
/// joins `0.0` and every NaN joins one NaN group.
fn canonical_number(v: f64) -> f64 {
    if v.is_nan() {
        f64::NAN
    } else if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn value_at(column: &Column, row: usize) -> GroupValue {
    match column {
        Column::Numeric(values) => GroupValue::Number(canonical_number(values[row])),
        Column::Text(values) => GroupValue::Text(values[row].clone()),
    }
}

// =============================================================================
// Tests
// =============================================================================
