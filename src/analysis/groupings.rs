/// Hierarchical grouping of flat records.
///
/// `Grouper` takes a flat list of `Record`s and an ordered key path
/// (outermost field first) and builds a `GroupNode` tree: one level of
/// `Nested` maps per field, with `Terminal` lists of records at the leaves.
/// `flatten` walks that tree depth-first and hands the records back as one
/// list, so records sharing a key prefix end up contiguous.
///
/// Partitioning is stable. Within a bucket records keep their input order.
/// By default (`KeyOrder::Natural`) bucket keys keep first-occurrence order,
/// except number keys, which are sorted ascending, so a numeric level such
/// as `id` comes out in value order.
///
/// The end-to-end test at the bottom of this module runs the six-record
/// sample through `steamid → website → id`, which is the demonstration the
/// binary prints by default.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::GroupError;
use crate::model::{GroupKey, Record};

// ---------------------------------------------------------------------------
// Key ordering
// ---------------------------------------------------------------------------

/// Order of the buckets produced at each grouping level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    /// Non-number keys keep first-occurrence order. Number keys are sorted
    /// ascending among the positions number keys occupy.
    #[default]
    Natural,
    /// Buckets appear in the order their key was first seen.
    FirstOccurrence,
    /// Buckets sorted by `GroupKey::ascending_cmp`; ties keep first-occurrence order.
    Ascending,
}

// ---------------------------------------------------------------------------
// Grouping tree
// ---------------------------------------------------------------------------

/// One node of the grouping tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupNode {
    /// Records with no further grouping applied.
    Terminal(Vec<Record>),
    /// Buckets keyed by the value of the field grouped at this level.
    Nested(IndexMap<GroupKey, GroupNode>),
}

impl GroupNode {
    /// Applies one more grouping level: every `Terminal` leaf is partitioned
    /// on `field`. Nested maps are rebuilt in their existing order.
    pub fn regroup(self, field: &str, order: KeyOrder) -> Result<GroupNode, GroupError> {
        match self {
            GroupNode::Terminal(records) => Ok(GroupNode::Nested(group_by(records, field, order)?)),
            GroupNode::Nested(children) => children
                .into_iter()
                .map(|(key, child)| Ok((key, child.regroup(field, order)?)))
                .collect::<Result<IndexMap<_, _>, GroupError>>()
                .map(GroupNode::Nested),
        }
    }

    /// Concatenates every terminal group, depth-first, in map order.
    pub fn flatten(self) -> Vec<Record> {
        let mut out = Vec::with_capacity(self.record_count());
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Record>) {
        match self {
            GroupNode::Terminal(records) => out.extend(records),
            GroupNode::Nested(children) => {
                for (_, child) in children {
                    child.flatten_into(out);
                }
            }
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            GroupNode::Terminal(records) => records.len(),
            GroupNode::Nested(children) => children.values().map(GroupNode::record_count).sum(),
        }
    }

    /// Number of terminal groups in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            GroupNode::Terminal(_) => 1,
            GroupNode::Nested(children) => children.values().map(GroupNode::leaf_count).sum(),
        }
    }

    /// Number of `Nested` levels above the deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            GroupNode::Terminal(_) => 0,
            GroupNode::Nested(children) => {
                1 + children.values().map(GroupNode::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Terminal groups serialize as arrays of records. A nested level serializes
/// as an array of `{"key": <value>, "group": <node>}` entries, with
/// `{"missing": true, "group": ..}` for the `Missing` bucket, so keys keep
/// their JSON type and never collide.
impl Serialize for GroupNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupNode::Terminal(records) => {
                let mut seq = serializer.serialize_seq(Some(records.len()))?;
                for record in records {
                    seq.serialize_element(record)?;
                }
                seq.end()
            }
            GroupNode::Nested(children) => {
                let mut seq = serializer.serialize_seq(Some(children.len()))?;
                for (key, group) in children {
                    seq.serialize_element(&Bucket { key, group })?;
                }
                seq.end()
            }
        }
    }
}

struct Bucket<'a> {
    key: &'a GroupKey,
    group: &'a GroupNode,
}

impl Serialize for Bucket<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self.key.to_value() {
            Some(value) => map.serialize_entry("key", &value)?,
            None => map.serialize_entry("missing", &true)?,
        }
        map.serialize_entry("group", self.group)?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Partitions `records` on the value of `field`.
///
/// Each bucket holds its records in input order. Records without the field
/// share the `GroupKey::Missing` bucket.
pub fn group_by(
    records: Vec<Record>,
    field: &str,
    order: KeyOrder,
) -> Result<IndexMap<GroupKey, GroupNode>, GroupError> {
    let mut buckets: IndexMap<GroupKey, Vec<Record>> = IndexMap::new();

    for record in records {
        let key = record.key_for(field)?;
        buckets.entry(key).or_default().push(record);
    }

    let entries: Vec<(GroupKey, Vec<Record>)> = match order {
        KeyOrder::FirstOccurrence => buckets.into_iter().collect(),
        KeyOrder::Natural => sort_number_slots(buckets.into_iter().collect()),
        KeyOrder::Ascending => {
            // IndexMap::sort_by is stable
            buckets.sort_by(|a, _, b, _| a.ascending_cmp(b));
            buckets.into_iter().collect()
        }
    };

    Ok(entries
        .into_iter()
        .map(|(key, records)| (key, GroupNode::Terminal(records)))
        .collect())
}

/// Sorts the `GroupKey::Number` entries ascending by value, leaving every
/// other entry where it was. Numbers only move between slots that already
/// held a number.
fn sort_number_slots(entries: Vec<(GroupKey, Vec<Record>)>) -> Vec<(GroupKey, Vec<Record>)> {
    let mut slots: Vec<Option<(GroupKey, Vec<Record>)>> = entries.into_iter().map(Some).collect();

    let number_slots: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, entry)| matches!(entry, Some((GroupKey::Number(_), _))))
        .map(|(i, _)| i)
        .collect();

    let mut numbers: Vec<(GroupKey, Vec<Record>)> =
        number_slots.iter().filter_map(|&i| slots[i].take()).collect();
    numbers.sort_by(|(a, _), (b, _)| a.ascending_cmp(b));

    for (slot, entry) in number_slots.into_iter().zip(numbers) {
        slots[slot] = Some(entry);
    }

    slots.into_iter().flatten().collect()
}

/// Groups records by an ordered list of fields and flattens the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouper {
    fields: Vec<String>,
    key_order: KeyOrder,
}

impl Grouper {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Grouper {
            fields: fields.into_iter().map(Into::into).collect(),
            key_order: KeyOrder::default(),
        }
    }

    pub fn with_key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn key_order(&self) -> KeyOrder {
        self.key_order
    }

    /// Builds the full grouping tree, one level per field. With no fields the
    /// tree is a single terminal group holding the input as-is.
    pub fn build_tree(&self, records: Vec<Record>) -> Result<GroupNode, GroupError> {
        self.fields
            .iter()
            .try_fold(GroupNode::Terminal(records), |node, field| {
                let next = node.regroup(field, self.key_order)?;
                debug!(field = %field, groups = next.leaf_count(), "grouping pass complete");
                Ok(next)
            })
    }

    /// `build_tree` followed by `flatten`.
    pub fn apply(&self, records: Vec<Record>) -> Result<Vec<Record>, GroupError> {
        Ok(self.build_tree(records)?.flatten())
    }
}

/// Shorthand for `Grouper::new`: `group(["a", "b"]).apply(rows)`.
pub fn group<I, S>(fields: I) -> Grouper
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Grouper::new(fields)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
