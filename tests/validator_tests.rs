mod common;

use common::{sample_catalog, sample_sections, validation_error};
use insight_query::{
    ApplyKeys, DatasetDescriptor, DatasetKind, QueryError, Value, validate,
};
use serde_json::json;

fn descriptors() -> Vec<DatasetDescriptor> {
    vec![
        DatasetDescriptor {
            id: "sections".into(),
            kind: DatasetKind::Sections,
            row_count: 8,
        },
        DatasetDescriptor {
            id: "rooms".into(),
            kind: DatasetKind::Rooms,
            row_count: 5,
        },
    ]
}

// ============================================================================
// Top-level shape
// ============================================================================

#[test]
fn test_minimal_query_is_valid() {
    let query = json!({
        "WHERE": {},
        "OPTIONS": { "COLUMNS": ["sections_dept"] }
    });
    let validated = validate(&query, &descriptors()).unwrap();
    assert_eq!(validated.dataset.id, "sections");
    assert!(validated.apply_keys.is_empty());
}

#[test]
fn test_query_must_be_object() {
    let catalog = sample_catalog();
    validation_error(&catalog, json!("SELECT *"));
    validation_error(&catalog, json!(null));
    validation_error(&catalog, json!([]));
}

#[test]
fn test_excess_top_level_key() {
    let msg = validation_error(
        &sample_catalog(),
        json!({
            "WHERE": {},
            "OPTIONS": { "COLUMNS": ["sections_dept"] },
            "LIMIT": 10
        }),
    );
    assert!(msg.contains("LIMIT"));
}

#[test]
fn test_missing_where() {
    let msg = validation_error(
        &sample_catalog(),
        json!({ "OPTIONS": { "COLUMNS": ["sections_dept"] } }),
    );
    assert!(msg.contains("WHERE"));
}

#[test]
fn test_where_must_be_object() {
    validation_error(
        &sample_catalog(),
        json!({ "WHERE": [], "OPTIONS": { "COLUMNS": ["sections_dept"] } }),
    );
}

#[test]
fn test_missing_options() {
    let msg = validation_error(&sample_catalog(), json!({ "WHERE": {} }));
    assert!(msg.contains("OPTIONS"));
}

#[test]
fn test_columns_missing_empty_or_not_array() {
    let catalog = sample_catalog();
    validation_error(&catalog, json!({ "WHERE": {}, "OPTIONS": {} }));
    validation_error(&catalog, json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": [] } }));
    validation_error(
        &catalog,
        json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": "sections_dept" } }),
    );
}

#[test]
fn test_transformations_must_be_object() {
    validation_error(
        &sample_catalog(),
        json!({
            "WHERE": {},
            "OPTIONS": { "COLUMNS": ["sections_dept"] },
            "TRANSFORMATIONS": []
        }),
    );
}

// ============================================================================
// Dataset resolution and field membership
// ============================================================================

#[test]
fn test_unknown_dataset() {
    let msg = validation_error(
        &sample_catalog(),
        json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": ["courses_dept"] } }),
    );
    assert!(msg.contains("courses"));
}

#[test]
fn test_rooms_dataset_resolved_from_first_column() {
    let query = json!({
        "WHERE": {},
        "OPTIONS": { "COLUMNS": ["rooms_shortname", "rooms_seats"] }
    });
    let validated = validate(&query, &descriptors()).unwrap();
    assert_eq!(validated.dataset.kind, DatasetKind::Rooms);
}

#[test]
fn test_field_from_other_kind() {
    // seats is a rooms field
    validation_error(
        &sample_catalog(),
        json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": ["sections_dept", "sections_seats"] } }),
    );
}

#[test]
fn test_columns_across_two_datasets() {
    let msg = validation_error(
        &sample_catalog(),
        json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": ["sections_dept", "rooms_seats"] } }),
    );
    assert!(msg.contains("more than one dataset"));
}

#[test]
fn test_where_across_two_datasets() {
    validation_error(
        &sample_catalog(),
        json!({
            "WHERE": { "GT": { "rooms_seats": 10 } },
            "OPTIONS": { "COLUMNS": ["sections_dept"] }
        }),
    );
}

#[test]
fn test_unqualified_column() {
    validation_error(
        &sample_catalog(),
        json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": ["sections_dept", "avg"] } }),
    );
}

#[test]
fn test_column_with_extra_separator() {
    validation_error(
        &sample_catalog(),
        json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": ["sections_dept_x"] } }),
    );
}

// ============================================================================
// OPTIONS
// ============================================================================

#[test]
fn test_invalid_options_key() {
    validation_error(
        &sample_catalog(),
        json!({
            "WHERE": {},
            "OPTIONS": { "COLUMNS": ["sections_dept"], "LIMIT": 1 }
        }),
    );
}

#[test]
fn test_order_key_must_be_in_columns() {
    let msg = validation_error(
        &sample_catalog(),
        json!({
            "WHERE": {},
            "OPTIONS": { "COLUMNS": ["sections_dept"], "ORDER": "sections_avg" }
        }),
    );
    assert!(msg.contains("ORDER"));
}

#[test]
fn test_order_object_keys_must_be_in_columns() {
    validation_error(
        &sample_catalog(),
        json!({
            "WHERE": {},
            "OPTIONS": {
                "COLUMNS": ["sections_dept"],
                "ORDER": { "dir": "UP", "keys": ["sections_dept", "sections_avg"] }
            }
        }),
    );
}

#[test]
fn test_order_object_shape() {
    let catalog = sample_catalog();
    let with_order = |order: serde_json::Value| {
        json!({
            "WHERE": {},
            "OPTIONS": { "COLUMNS": ["sections_dept"], "ORDER": order }
        })
    };

    validation_error(&catalog, with_order(json!({ "dir": "SIDEWAYS", "keys": ["sections_dept"] })));
    validation_error(&catalog, with_order(json!({ "keys": ["sections_dept"] })));
    validation_error(&catalog, with_order(json!({ "dir": "UP" })));
    validation_error(&catalog, with_order(json!({ "dir": "UP", "keys": [] })));
    validation_error(
        &catalog,
        with_order(json!({ "dir": "UP", "keys": ["sections_dept"], "extra": true })),
    );
    validation_error(&catalog, with_order(json!(["sections_dept"])));
    validation_error(&catalog, with_order(json!(3)));
}

// ============================================================================
// TRANSFORMATIONS
// ============================================================================

fn grouped(group: serde_json::Value, apply: serde_json::Value, columns: serde_json::Value) -> serde_json::Value {
    json!({
        "WHERE": {},
        "OPTIONS": { "COLUMNS": columns },
        "TRANSFORMATIONS": { "GROUP": group, "APPLY": apply }
    })
}

#[test]
fn test_apply_keys_are_collected_in_order() {
    let query = grouped(
        json!(["sections_dept"]),
        json!([
            { "maxAvg": { "MAX": "sections_avg" } },
            { "sections": { "COUNT": "sections_uuid" } }
        ]),
        json!(["sections_dept", "maxAvg", "sections"]),
    );
    let validated = validate(&query, &descriptors()).unwrap();
    assert_eq!(validated.apply_keys.iter().collect::<Vec<_>>(), vec!["maxAvg", "sections"]);
}

#[test]
fn test_missing_group_or_apply() {
    let catalog = sample_catalog();
    validation_error(
        &catalog,
        json!({
            "WHERE": {},
            "OPTIONS": { "COLUMNS": ["sections_dept"] },
            "TRANSFORMATIONS": { "GROUP": ["sections_dept"] }
        }),
    );
    validation_error(
        &catalog,
        json!({
            "WHERE": {},
            "OPTIONS": { "COLUMNS": ["sections_dept"] },
            "TRANSFORMATIONS": { "APPLY": [] }
        }),
    );
}

#[test]
fn test_group_and_apply_must_be_arrays() {
    let catalog = sample_catalog();
    validation_error(&catalog, grouped(json!("sections_dept"), json!([]), json!(["sections_dept"])));
    validation_error(&catalog, grouped(json!(["sections_dept"]), json!({}), json!(["sections_dept"])));
    validation_error(&catalog, grouped(json!([]), json!([]), json!(["sections_dept"])));
}

#[test]
fn test_empty_apply_is_allowed() {
    let query = grouped(json!(["sections_dept"]), json!([]), json!(["sections_dept"]));
    assert!(validate(&query, &descriptors()).is_ok());
}

#[test]
fn test_duplicate_apply_key() {
    let msg = validation_error(
        &sample_catalog(),
        grouped(
            json!(["sections_dept"]),
            json!([
                { "best": { "MAX": "sections_avg" } },
                { "best": { "MIN": "sections_avg" } }
            ]),
            json!(["sections_dept", "best"]),
        ),
    );
    assert!(msg.contains("Duplicate"));
}

#[test]
fn test_apply_key_with_underscore_or_empty() {
    let catalog = sample_catalog();
    validation_error(
        &catalog,
        grouped(
            json!(["sections_dept"]),
            json!([{ "max_avg": { "MAX": "sections_avg" } }]),
            json!(["sections_dept"]),
        ),
    );
    validation_error(
        &catalog,
        grouped(
            json!(["sections_dept"]),
            json!([{ "": { "MAX": "sections_avg" } }]),
            json!(["sections_dept"]),
        ),
    );
}

#[test]
fn test_apply_rule_with_two_keys() {
    validation_error(
        &sample_catalog(),
        grouped(
            json!(["sections_dept"]),
            json!([{ "a": { "MAX": "sections_avg" }, "b": { "MIN": "sections_avg" } }]),
            json!(["sections_dept"]),
        ),
    );
}

#[test]
fn test_apply_body_must_have_one_known_token() {
    let catalog = sample_catalog();
    validation_error(
        &catalog,
        grouped(
            json!(["sections_dept"]),
            json!([{ "x": { "MAX": "sections_avg", "MIN": "sections_avg" } }]),
            json!(["sections_dept"]),
        ),
    );
    validation_error(
        &catalog,
        grouped(
            json!(["sections_dept"]),
            json!([{ "x": { "MEDIAN": "sections_avg" } }]),
            json!(["sections_dept"]),
        ),
    );
    validation_error(
        &catalog,
        grouped(
            json!(["sections_dept"]),
            json!([{ "x": {} }]),
            json!(["sections_dept"]),
        ),
    );
}

#[test]
fn test_numeric_tokens_reject_string_fields() {
    let catalog = sample_catalog();
    for token in ["MAX", "MIN", "AVG", "SUM"] {
        let msg = validation_error(
            &catalog,
            grouped(
                json!(["sections_dept"]),
                json!([{ "x": { token: "sections_instructor" } }]),
                json!(["sections_dept"]),
            ),
        );
        assert!(msg.contains(token), "{} should be named in '{}'", token, msg);
    }
}

#[test]
fn test_count_accepts_string_fields() {
    let query = grouped(
        json!(["sections_dept"]),
        json!([{ "instructors": { "COUNT": "sections_instructor" } }]),
        json!(["sections_dept", "instructors"]),
    );
    assert!(validate(&query, &descriptors()).is_ok());
}

#[test]
fn test_column_outside_group_with_transformations() {
    let msg = validation_error(
        &sample_catalog(),
        grouped(
            json!(["sections_dept"]),
            json!([]),
            json!(["sections_dept", "sections_avg"]),
        ),
    );
    assert!(msg.contains("GROUP or APPLY"));
}

#[test]
fn test_apply_key_unknown_without_transformations() {
    validation_error(
        &sample_catalog(),
        json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": ["sections_dept", "maxAvg"] } }),
    );
}

#[test]
fn test_order_by_apply_key_not_in_columns() {
    let query = json!({
        "WHERE": {},
        "OPTIONS": { "COLUMNS": ["sections_dept"], "ORDER": "maxAvg" },
        "TRANSFORMATIONS": {
            "GROUP": ["sections_dept"],
            "APPLY": [{ "maxAvg": { "MAX": "sections_avg" } }]
        }
    });
    assert!(validate(&query, &descriptors()).is_ok());
}

#[test]
fn test_apply_key_named_like_group_field() {
    let query = json!({
        "WHERE": {},
        "OPTIONS": {
            "COLUMNS": ["sections_dept", "dept"],
            "ORDER": { "dir": "DOWN", "keys": ["dept", "sections_dept"] }
        },
        "TRANSFORMATIONS": {
            "GROUP": ["sections_dept"],
            "APPLY": [{ "dept": { "COUNT": "sections_uuid" } }]
        }
    });
    let rows = sample_catalog().perform_query(&query).unwrap();

    let summary: Vec<(Value, Value)> = rows
        .iter()
        .map(|r| (r["sections_dept"].clone(), r["dept"].clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Value::from("cpsc"), Value::Integer(3)),
            (Value::from("math"), Value::Integer(2)),
            (Value::from("phys"), Value::Integer(1)),
            (Value::from("epse"), Value::Integer(1)),
            (Value::from("cpen"), Value::Integer(1)),
        ]
    );
    assert!(rows.iter().all(|r| r.len() == 2));
}

#[test]
fn test_group_field_from_other_dataset() {
    validation_error(
        &sample_catalog(),
        grouped(json!(["rooms_shortname"]), json!([]), json!(["sections_dept"])),
    );
}

#[test]
fn test_apply_keys_accumulator() {
    let keys = ApplyKeys::default().declare("a").unwrap().declare("b").unwrap();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains("a"));
    assert!(matches!(keys.clone().declare("a"), Err(QueryError::Validation(_))));
    assert!(matches!(keys.declare("c_d"), Err(QueryError::Validation(_))));
}

#[test]
fn test_validation_happens_before_rows_are_read() {
    use insight_query::{DatasetSource, Row, compile_and_execute};
    use std::cell::Cell;
    use std::sync::Arc;

    struct CountingSource {
        reads: Cell<usize>,
        rows: Arc<[Row]>,
    }

    impl DatasetSource for CountingSource {
        fn list_datasets(&self) -> Vec<DatasetDescriptor> {
            descriptors()
        }

        fn rows(&self, _id: &str) -> Option<Arc<[Row]>> {
            self.reads.set(self.reads.get() + 1);
            Some(Arc::clone(&self.rows))
        }
    }

    let source = CountingSource {
        reads: Cell::new(0),
        rows: sample_sections().into(),
    };

    let bad = json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": ["sections_dept", "rooms_seats"] } });
    assert!(matches!(
        compile_and_execute(&bad, &source),
        Err(QueryError::Validation(_))
    ));
    assert_eq!(source.reads.get(), 0);

    let good = json!({ "WHERE": {}, "OPTIONS": { "COLUMNS": ["sections_dept"] } });
    assert_eq!(compile_and_execute(&good, &source).unwrap().len(), 8);
    assert_eq!(source.reads.get(), 1);
}
