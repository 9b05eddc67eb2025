/// Integration tests for hierarchical grouping
///
/// These tests verify:
/// 1. The demonstration sample comes out as 0,2,1,5,3,4
/// 2. Records are neither dropped, duplicated, nor altered
/// 3. Records sharing any key prefix are contiguous
/// 4. Records sharing the full key path keep input order
/// 5. An empty key path is the identity
///
/// Run with: cargo test --test grouping_properties

use std::collections::HashSet;

use proptest::prelude::*;
use rowgroup::input::{parse_records, sample_rows, SAMPLE_FIELDS};
use rowgroup::{group, GroupKey, GroupNode, Grouper, KeyOrder, Record};
use serde_json::{json, Map, Value};

const FIELDS: [&str; 3] = ["region", "kind", "tier"];

fn id_of(record: &Record) -> u64 {
    record
        .get("id")
        .and_then(Value::as_u64)
        .expect("generated records carry an id")
}

fn key_prefix(record: &Record, fields: &[&str]) -> Vec<GroupKey> {
    fields
        .iter()
        .map(|f| record.key_for(f).expect("generated values are scalars"))
        .collect()
}

/// A grouping value: a few strings, a few numbers, null, or absent.
fn value_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        prop::sample::select(vec!["x", "y", "z"]).prop_map(|s| Some(json!(s))),
        (0u8..3).prop_map(|n| Some(json!(n))),
    ]
}

fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(prop::collection::vec(value_strategy(), FIELDS.len()), 0..40).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(id, values)| {
                    let mut fields = Map::new();
                    fields.insert("id".to_string(), json!(id));
                    for (name, value) in FIELDS.iter().zip(values) {
                        if let Some(value) = value {
                            fields.insert(name.to_string(), value);
                        }
                    }
                    Record::new(fields)
                })
                .collect()
        },
    )
}

fn key_order_strategy() -> impl Strategy<Value = KeyOrder> {
    prop_oneof![
        Just(KeyOrder::Natural),
        Just(KeyOrder::FirstOccurrence),
        Just(KeyOrder::Ascending),
    ]
}

// --- End-to-end sample ---------------------------------------------------------

#[test]
fn test_sample_end_to_end_order() {
    let out = group(SAMPLE_FIELDS).apply(sample_rows()).unwrap();
    let ids: Vec<u64> = out.iter().map(id_of).collect();
    assert_eq!(ids, vec![0, 2, 1, 5, 3, 4]);
}

#[test]
fn test_sample_output_keeps_record_shape() {
    let out = group(SAMPLE_FIELDS).apply(sample_rows()).unwrap();
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(
        value,
        json!([
            { "id": 0, "steamid": "2", "website": "a" },
            { "id": 2, "steamid": "2", "website": "a" },
            { "id": 1, "steamid": "2", "website": "b" },
            { "id": 5, "steamid": "2", "website": "b" },
            { "id": 3, "steamid": "1", "website": "b" },
            { "id": 4, "steamid": "0", "website": "b" }
        ])
    );
}

#[test]
fn test_shuffled_ids_come_out_ascending_within_group() {
    let records = parse_records(
        r#"[
            {"id": 5, "steamid": "2", "website": "a"},
            {"id": 3, "steamid": "2", "website": "a"},
            {"id": 4, "steamid": "1", "website": "b"}
        ]"#,
    )
    .unwrap();
    let out = group(SAMPLE_FIELDS).apply(records).unwrap();
    let ids: Vec<u64> = out.iter().map(id_of).collect();
    assert_eq!(ids, vec![3, 5, 4]);
}

#[test]
fn test_parsed_input_with_missing_fields_groups_under_sentinel() {
    let records = parse_records(
        r#"[
            {"id": 0, "team": "red"},
            {"id": 1},
            {"id": 2, "team": "blue"},
            {"id": 3, "team": "red"},
            {"id": 4}
        ]"#,
    )
    .unwrap();

    let tree = group(["team"]).build_tree(records).unwrap();
    let GroupNode::Nested(buckets) = &tree else {
        panic!("one grouping field should give a nested root");
    };
    let keys: Vec<String> = buckets.keys().map(ToString::to_string).collect();
    assert_eq!(keys, vec!["red", "<missing>", "blue"]);

    let ids: Vec<u64> = tree.flatten().iter().map(id_of).collect();
    assert_eq!(ids, vec![0, 3, 1, 4, 2]);
}

// --- Properties ---------------------------------------------------------------

proptest! {
    /// Property: output is a permutation of the input with every record unchanged
    #[test]
    fn prop_records_preserved(records in records_strategy(), order in key_order_strategy()) {
        let out = Grouper::new(FIELDS).with_key_order(order).apply(records.clone()).unwrap();
        prop_assert_eq!(out.len(), records.len());

        let mut sorted = out.clone();
        sorted.sort_by_key(id_of);
        prop_assert_eq!(sorted, records);
    }

    /// Property: for every prefix of the key path, equal prefixes form one run
    #[test]
    fn prop_prefix_groups_contiguous(records in records_strategy(), order in key_order_strategy()) {
        let out = Grouper::new(FIELDS).with_key_order(order).apply(records).unwrap();

        for k in 1..=FIELDS.len() {
            let mut finished: HashSet<Vec<GroupKey>> = HashSet::new();
            let mut current: Option<Vec<GroupKey>> = None;
            for record in &out {
                let prefix = key_prefix(record, &FIELDS[..k]);
                if current.as_ref() != Some(&prefix) {
                    prop_assert!(
                        !finished.contains(&prefix),
                        "prefix {:?} of length {} reappeared after its run ended", prefix, k
                    );
                    if let Some(done) = current.take() {
                        finished.insert(done);
                    }
                    current = Some(prefix);
                }
            }
        }
    }

    /// Property: records with identical keys keep input order
    #[test]
    fn prop_stable_within_full_key(records in records_strategy(), order in key_order_strategy()) {
        let out = Grouper::new(["region", "kind"]).with_key_order(order).apply(records).unwrap();

        for window in out.windows(2) {
            if key_prefix(&window[0], &["region", "kind"]) == key_prefix(&window[1], &["region", "kind"]) {
                prop_assert!(id_of(&window[0]) < id_of(&window[1]));
            }
        }
    }

    /// Property: first-occurrence order puts outermost keys in the order first seen
    #[test]
    fn prop_outer_keys_in_first_occurrence_order(records in records_strategy()) {
        let mut expected: Vec<GroupKey> = Vec::new();
        for record in &records {
            let key = record.key_for("region").unwrap();
            if !expected.contains(&key) {
                expected.push(key);
            }
        }

        let out = group(FIELDS)
            .with_key_order(KeyOrder::FirstOccurrence)
            .apply(records)
            .unwrap();
        let mut seen: Vec<GroupKey> = Vec::new();
        for record in &out {
            let key = record.key_for("region").unwrap();
            if seen.last() != Some(&key) {
                seen.push(key);
            }
        }
        prop_assert_eq!(seen, expected);
    }

    /// Property: by default number keys come out ascending and the other keys
    /// in first-occurrence order
    #[test]
    fn prop_natural_order_sorts_numbers_only(records in records_strategy()) {
        let mut first_seen: Vec<GroupKey> = Vec::new();
        for record in &records {
            let key = record.key_for("region").unwrap();
            if !first_seen.contains(&key) {
                first_seen.push(key);
            }
        }

        let out = group(FIELDS).apply(records).unwrap();
        let mut seen: Vec<GroupKey> = Vec::new();
        for record in &out {
            let key = record.key_for("region").unwrap();
            if seen.last() != Some(&key) {
                seen.push(key);
            }
        }

        let numbers: Vec<f64> = seen.iter().filter_map(|k| match k {
            GroupKey::Number(n) => n.as_f64(),
            _ => None,
        }).collect();
        prop_assert!(numbers.windows(2).all(|w| w[0] < w[1]), "numbers out of order: {:?}", numbers);

        let others: Vec<&GroupKey> = seen.iter().filter(|k| !matches!(k, GroupKey::Number(_))).collect();
        let expected: Vec<&GroupKey> = first_seen.iter().filter(|k| !matches!(k, GroupKey::Number(_))).collect();
        prop_assert_eq!(others, expected);
    }

    /// Property: an empty key path returns the input untouched
    #[test]
    fn prop_empty_key_path_is_identity(records in records_strategy()) {
        let out = Grouper::new(Vec::<String>::new()).apply(records.clone()).unwrap();
        prop_assert_eq!(out, records);
    }

    /// Property: the tree accounts for every record
    #[test]
    fn prop_tree_record_count_matches_input(records in records_strategy()) {
        let tree = group(FIELDS).build_tree(records.clone()).unwrap();
        prop_assert_eq!(tree.record_count(), records.len());
        if !records.is_empty() {
            prop_assert_eq!(tree.depth(), FIELDS.len());
        }
    }
}
