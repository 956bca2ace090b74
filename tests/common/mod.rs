//! Shared fixtures for integration tests
#![allow(dead_code)]

use insight_query::{Catalog, DatasetKind, ResultRow, Row, Value};
use serde_json::Value as JsonValue;

/// A sections row with every schema field filled in.
pub fn section(uuid: &str, dept: &str, id: &str, avg: f64, year: i64) -> Row {
    let mut row = Row::new();
    row.insert("uuid".into(), Value::String(uuid.into()));
    row.insert("dept".into(), Value::String(dept.into()));
    row.insert("id".into(), Value::String(id.into()));
    row.insert("instructor".into(), Value::String("smith, john".into()));
    row.insert("title".into(), Value::String(format!("{} {}", dept, id)));
    row.insert("avg".into(), Value::Float(avg));
    row.insert("pass".into(), Value::Integer(100));
    row.insert("fail".into(), Value::Integer(5));
    row.insert("audit".into(), Value::Integer(0));
    row.insert("year".into(), Value::Integer(year));
    row
}

/// A rooms row with every schema field filled in.
pub fn room(shortname: &str, number: &str, seats: i64, furniture: &str) -> Row {
    let mut row = Row::new();
    row.insert("fullname".into(), Value::String(format!("{} Building", shortname)));
    row.insert("shortname".into(), Value::String(shortname.into()));
    row.insert("number".into(), Value::String(number.into()));
    row.insert("name".into(), Value::String(format!("{}_{}", shortname, number)));
    row.insert("address".into(), Value::String("2329 West Mall".into()));
    row.insert("type".into(), Value::String("Small Group".into()));
    row.insert("furniture".into(), Value::String(furniture.into()));
    row.insert("href".into(), Value::String(format!("http://rooms/{}-{}", shortname, number)));
    row.insert("lat".into(), Value::Float(49.26));
    row.insert("lon".into(), Value::Float(-123.25));
    row.insert("seats".into(), Value::Integer(seats));
    row
}

/// Replace one field of a row.
pub fn with(mut row: Row, field: &str, value: impl Into<Value>) -> Row {
    row.insert(field.to_string(), value.into());
    row
}

pub fn sample_sections() -> Vec<Row> {
    vec![
        section("1", "cpsc", "110", 78.5, 2015),
        section("2", "cpsc", "210", 82.25, 2016),
        section("3", "cpsc", "310", 90.0, 2015),
        section("4", "math", "100", 65.0, 2015),
        section("5", "math", "101", 71.75, 2016),
        section("6", "phys", "101", 88.0, 2014),
        section("7", "cpen", "211", 79.0, 2016),
        section("8", "epse", "421", 95.5, 2014),
    ]
}

pub fn sample_rooms() -> Vec<Row> {
    vec![
        room("DMP", "110", 120, "Classroom-Fixed Tables/Movable Chairs"),
        room("DMP", "201", 40, "Classroom-Movable Tables & Chairs"),
        room("ANGU", "098", 260, "Classroom-Fixed Tablets"),
        room("ANGU", "232", 16, "Classroom-Movable Tables & Chairs"),
        room("WOOD", "2", 503, "Classroom-Fixed Tablets"),
    ]
}

/// Catalog holding `sections` and `rooms` built from the sample rows.
pub fn sample_catalog() -> Catalog {
    let catalog = Catalog::new();
    catalog
        .add_dataset("sections", DatasetKind::Sections, sample_sections())
        .expect("sections should load");
    catalog
        .add_dataset("rooms", DatasetKind::Rooms, sample_rooms())
        .expect("rooms should load");
    catalog
}

pub fn catalog_with(id: &str, kind: DatasetKind, rows: Vec<Row>) -> Catalog {
    let catalog = Catalog::new();
    catalog.add_dataset(id, kind, rows).expect("dataset should load");
    catalog
}

/// Run a query and return the error message, panicking if it succeeds.
pub fn validation_error(catalog: &Catalog, query: JsonValue) -> String {
    match catalog.perform_query(&query) {
        Err(insight_query::QueryError::Validation(msg)) => msg,
        Err(other) => panic!("expected a validation error, got {:?}", other),
        Ok(rows) => panic!("expected a validation error, got {} rows", rows.len()),
    }
}

/// String values of `column` across result rows, in order.
pub fn strings(rows: &[ResultRow], column: &str) -> Vec<String> {
    rows.iter()
        .map(|r| match r.get(column) {
            Some(Value::String(s)) => s.clone(),
            other => panic!("expected string in {}, got {:?}", column, other),
        })
        .collect()
}

/// Numeric values of `column` across result rows, in order.
pub fn numbers(rows: &[ResultRow], column: &str) -> Vec<f64> {
    rows.iter()
        .map(|r| {
            r.get(column)
                .and_then(Value::as_float)
                .unwrap_or_else(|| panic!("expected number in {}", column))
        })
        .collect()
}
