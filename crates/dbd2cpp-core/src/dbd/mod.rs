//! Structured form of a DBD definition document.
//!
//! A document declares every column of a table once (`COLUMNS`) and then lists
//! one or more version blocks, each tying a set of layout hashes and builds to
//! an ordered field layout.

mod parse;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::build::{Build, BuildRange};

pub use parse::parse_definitions;

/// Semantic type of a column, shared by every version of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    String,
    LocString,
    /// Anything the document declares that the generator has no mapping for.
    Other(String),
}

impl ColumnType {
    pub fn from_token(token: &str) -> Self {
        match token {
            "int" => ColumnType::Int,
            "float" => ColumnType::Float,
            "string" => ColumnType::String,
            "locstring" => ColumnType::LocString,
            other => ColumnType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::LocString => "locstring",
            ColumnType::Other(s) => s,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub ty: ColumnType,
    pub foreign: Option<ForeignKey>,
    /// `false` when the document marks the name with a trailing `?`.
    pub verified: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    /// Bit width for integer fields; 0 when the layout gives none.
    pub size: u32,
    pub is_signed: bool,
    /// 0 for scalar fields.
    pub arr_length: u32,
    pub is_id: bool,
    pub is_relation: bool,
    pub is_non_inline: bool,
    pub comment: Option<String>,
}

impl FieldDefinition {
    pub fn is_array(&self) -> bool {
        self.arr_length != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDefinition {
    pub layout_hashes: Vec<String>,
    pub builds: Vec<Build>,
    pub build_ranges: Vec<BuildRange>,
    pub comments: Vec<String>,
    pub fields: Vec<FieldDefinition>,
}

impl VersionDefinition {
    pub fn applies_to(&self, build: &Build) -> bool {
        self.builds.contains(build) || self.build_ranges.iter().any(|r| r.contains(build))
    }

    pub fn canonical_layout_hash(&self) -> Option<&str> {
        self.layout_hashes.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseDefinitions {
    /// Declaration order of the `COLUMNS` block.
    columns: Vec<ColumnDefinition>,
    #[serde(skip)]
    by_name: BTreeMap<String, usize>,
    /// Declaration order; the resolver's fallback depends on it.
    pub versions: Vec<VersionDefinition>,
}

impl DatabaseDefinitions {
    pub fn new(versions: Vec<VersionDefinition>) -> Self {
        DatabaseDefinitions {
            versions,
            ..DatabaseDefinitions::default()
        }
    }

    /// Appends a column; returns it back when the name is already declared.
    pub fn push_column(&mut self, column: ColumnDefinition) -> Result<(), ColumnDefinition> {
        if self.by_name.contains_key(&column.name) {
            return Err(column);
        }
        self.by_name.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.by_name.get(name).map(|&idx| &self.columns[idx])
    }
}
