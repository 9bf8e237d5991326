//! Mapping from column semantics to C++ type tokens and DB2 field kinds.

use serde::{Deserialize, Serialize};

use crate::dbd::{ColumnDefinition, ColumnType, FieldDefinition};
use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// Storage kind tag shared by the reflection-metadata and load-descriptor tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Byte,
    Short,
    Int,
    Long,
    String,
    StringNotLocalized,
    Float,
}

impl FieldKind {
    pub fn tag(self) -> &'static str {
        match self {
            FieldKind::Byte => "FT_BYTE",
            FieldKind::Short => "FT_SHORT",
            FieldKind::Int => "FT_INT",
            FieldKind::Long => "FT_LONG",
            FieldKind::String => "FT_STRING",
            FieldKind::StringNotLocalized => "FT_STRING_NOT_LOCALIZED",
            FieldKind::Float => "FT_FLOAT",
        }
    }
}

/// Which table a kind is computed for. Load descriptors never distinguish
/// localized strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTable {
    Metadata,
    LoadInfo,
}

fn invalid_size(field: &FieldDefinition) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::D2C0130InvalidFieldSize,
        format!("field {:?} has integer size {}", field.name, field.size),
    )
}

fn unsupported_type(field: &FieldDefinition, column: &ColumnDefinition) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::D2C0120UnsupportedColumnType,
        format!(
            "unable to construct a C++ type for field {:?} from column type {:?}",
            field.name,
            column.ty.as_str()
        ),
    )
}

pub fn field_kind(
    field: &FieldDefinition,
    column: &ColumnDefinition,
    table: KindTable,
) -> Result<FieldKind, Diagnostic> {
    match &column.ty {
        ColumnType::Int => match field.size {
            8 => Ok(FieldKind::Byte),
            16 => Ok(FieldKind::Short),
            32 => Ok(FieldKind::Int),
            64 => Ok(FieldKind::Long),
            _ => Err(invalid_size(field)),
        },
        ColumnType::String => Ok(match table {
            KindTable::Metadata => FieldKind::StringNotLocalized,
            KindTable::LoadInfo => FieldKind::String,
        }),
        ColumnType::LocString => Ok(FieldKind::String),
        ColumnType::Float => Ok(FieldKind::Float),
        ColumnType::Other(_) => Err(unsupported_type(field, column)),
    }
}

fn fixed_array(elem: &str, len: u32) -> String {
    format!("std::array<{elem}, {len}>")
}

/// C++ type token for one field of a struct declaration.
pub fn field_type(
    field: &FieldDefinition,
    column: &ColumnDefinition,
    localize_strings: bool,
) -> Result<String, Diagnostic> {
    // Non-inline relations are stored as plain 32-bit keys whatever the column says.
    if field.is_relation && field.is_non_inline {
        return Ok(if field.is_array() {
            fixed_array("int32", field.arr_length)
        } else {
            "int32".to_string()
        });
    }

    let scalar = match &column.ty {
        ColumnType::Int => {
            let base = match field.size {
                8 => "int8",
                16 => "int16",
                32 => "int32",
                64 => "int64",
                _ => return Err(invalid_size(field)),
            };
            if field.is_signed {
                base.to_string()
            } else {
                format!("u{base}")
            }
        }
        ColumnType::String => "char const*".to_string(),
        ColumnType::LocString => {
            if field.is_array() {
                return Err(Diagnostic::error(
                    DiagnosticCode::D2C0140UnsupportedLocalizedArray,
                    format!(
                        "field {:?} is a localized string array of length {}",
                        field.name, field.arr_length
                    ),
                ));
            }
            return Ok(if localize_strings {
                "LocalizedString".to_string()
            } else {
                format!("string[{}]", field.arr_length)
            });
        }
        ColumnType::Float => "float".to_string(),
        ColumnType::Other(_) => return Err(unsupported_type(field, column)),
    };

    Ok(if field.is_array() {
        fixed_array(&scalar, field.arr_length)
    } else {
        scalar
    })
}
