//! Documentation content for the insight CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Filters,
    Options,
    Transformations,
    Fields,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "filters" | "filter" | "where" => Some(Self::Filters),
            "options" | "columns" | "order" => Some(Self::Options),
            "transformations" | "group" | "apply" => Some(Self::Transformations),
            "fields" | "schema" | "datasets" => Some(Self::Fields),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"INSIGHT QUERY DOCUMENTATION

Queries are JSON documents run against one loaded dataset of course sections
or campus rooms. The dataset is picked by the prefix of the first COLUMNS entry.

DOCUMENTATION CATEGORIES

  filters           WHERE: AND, OR, NOT, GT, LT, EQ, IS and wildcards
  options           COLUMNS and ORDER
  transformations   GROUP and APPLY (MAX, MIN, AVG, SUM, COUNT)
  fields            Field names of the sections and rooms schemas
  errors            What makes a query invalid

QUICK REFERENCE

  {"WHERE": {}, "OPTIONS": {"COLUMNS": ["sections_dept"]}}

  sections_avg        Qualified field: <datasetId>_<field>
  maxAvg              Apply key: no underscore, declared in APPLY

Run 'insight doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Filters) => Ok(FILTERS_DOC),
        Some(DocCategory::Options) => Ok(OPTIONS_DOC),
        Some(DocCategory::Transformations) => Ok(TRANSFORMATIONS_DOC),
        Some(DocCategory::Fields) => Ok(FIELDS_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const FILTERS_DOC: &str = r#"FILTERS - The WHERE Clause

MATCH EVERYTHING
  "WHERE": {}

LOGIC
  {"AND": [FILTER, ...]}    Every child matches (non-empty list)
  {"OR":  [FILTER, ...]}    Some child matches (non-empty list)
  {"NOT": FILTER}           The single child does not match

NUMERIC COMPARISON (numeric fields only, number literal)
  {"GT": {"sections_avg": 90}}
  {"LT": {"rooms_seats": 50}}
  {"EQ": {"sections_year": 2015}}

STRING COMPARISON (string fields only, string literal)
  {"IS": {"sections_dept": "cpsc"}}     Exact match
  {"IS": {"sections_dept": "cp*"}}      Starts with "cp"
  {"IS": {"sections_dept": "*sc"}}      Ends with "sc"
  {"IS": {"sections_dept": "*ps*"}}     Contains "ps"

  Constraints:
    - Every filter object has exactly one key
    - * may only appear at the start and/or end of an IS value
"#;

const OPTIONS_DOC: &str = r#"OPTIONS - Projection and Ordering

COLUMNS
  "COLUMNS": ["sections_dept", "sections_avg"]
    Non-empty list of qualified fields or apply keys, in output order.

ORDER
  "ORDER": "sections_avg"
    Ascending by one key.

  "ORDER": {"dir": "DOWN", "keys": ["sections_avg", "sections_dept"]}
    dir is UP or DOWN. Later keys break ties of earlier ones; rows equal on
    every key keep their relative order.

  Constraints:
    - ORDER keys must appear in COLUMNS or be apply keys
    - At most 5000 rows are returned; larger results are an error
"#;

const TRANSFORMATIONS_DOC: &str = r#"TRANSFORMATIONS - Grouping and Aggregation

  "TRANSFORMATIONS": {
    "GROUP": ["sections_dept"],
    "APPLY": [{"maxAvg": {"MAX": "sections_avg"}}]
  }

GROUP
  Non-empty list of fields. One output row per distinct combination.

APPLY
  MAX, MIN    Largest / smallest value (numeric fields)
  SUM         Sum, rounded to 2 decimal places (numeric fields)
  AVG         Mean, rounded to 2 decimal places (numeric fields)
  COUNT       Number of distinct values (any field)

  Constraints:
    - Apply keys are non-empty, contain no underscore, and are unique
    - With TRANSFORMATIONS, every COLUMNS entry is a GROUP field or apply key
"#;

const FIELDS_DOC: &str = r#"FIELDS - Dataset Schemas

SECTIONS
  string:   dept, id, instructor, title, uuid
  numeric:  avg, pass, fail, audit, year

ROOMS
  string:   fullname, shortname, number, name, address, type, furniture, href
  numeric:  lat, lon, seats

DATASET FILES
  {"id": "sections", "kind": "sections", "rows": [{"dept": "cpsc", ...}, ...]}
  A file may also hold an array of such objects.
"#;

const ERRORS_DOC: &str = r#"ERRORS - Invalid Queries

A query is rejected before any row is read when:
  - it has keys other than WHERE, OPTIONS, TRANSFORMATIONS
  - WHERE or OPTIONS is missing, or COLUMNS is empty
  - the first column names a dataset that is not loaded
  - a field does not exist for the dataset's kind
  - a field references a second dataset
  - a filter object has zero or several keys
  - GT/LT/EQ target a string field, or IS a numeric one
  - an IS value has * in the middle
  - GROUP or APPLY is missing, or an apply key is invalid or repeated
  - MAX/MIN/AVG/SUM target a string field
  - an ORDER key is not in COLUMNS or APPLY

A query that would return more than 5000 rows fails after running.
"#;
