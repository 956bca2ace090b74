//! Static row schemas for the two dataset kinds.
//!
//! Every dataset is one of two kinds, and each kind has a closed set of
//! fields split into string-valued and numeric-valued columns. The field
//! names of the two kinds are disjoint.

use std::fmt;

/// Type class of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Number-valued; comparable with `GT`, `LT`, `EQ`
    Numeric,
    /// String-valued; comparable with `IS`
    String,
}

/// A named column of a dataset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

const fn string(name: &'static str) -> Field {
    Field { name, ty: FieldType::String }
}

const fn numeric(name: &'static str) -> Field {
    Field { name, ty: FieldType::Numeric }
}

const SECTION_FIELDS: &[Field] = &[
    string("dept"),
    string("id"),
    string("instructor"),
    string("title"),
    string("uuid"),
    numeric("avg"),
    numeric("pass"),
    numeric("fail"),
    numeric("audit"),
    numeric("year"),
];

const ROOM_FIELDS: &[Field] = &[
    string("fullname"),
    string("shortname"),
    string("number"),
    string("name"),
    string("address"),
    string("type"),
    string("furniture"),
    string("href"),
    numeric("lat"),
    numeric("lon"),
    numeric("seats"),
];

/// One of the two fixed row schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Academic course sections
    Sections,
    /// Campus rooms
    Rooms,
}

impl DatasetKind {
    /// Parse a kind name as it appears in dataset files.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sections" | "courses" => Some(Self::Sections),
            "rooms" => Some(Self::Rooms),
            _ => None,
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            DatasetKind::Sections => SECTION_FIELDS,
            DatasetKind::Rooms => ROOM_FIELDS,
        }
    }

    /// Look up a field of this kind by its unqualified name.
    pub fn field(self, name: &str) -> Option<Field> {
        self.fields().iter().copied().find(|f| f.name == name)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Sections => write!(f, "sections"),
            DatasetKind::Rooms => write!(f, "rooms"),
        }
    }
}

/// What the engine knows about a loaded dataset without touching its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDescriptor {
    pub id: String,
    pub kind: DatasetKind,
    pub row_count: usize,
}
