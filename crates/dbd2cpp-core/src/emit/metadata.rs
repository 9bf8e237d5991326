use serde::Serialize;

use crate::assemble::{CompilationResult, EmittedColumn};
use crate::dbd::ColumnType;
use crate::diagnostics::Diagnostic;
use crate::types::{field_kind, FieldKind, KindTable};

use super::{meta_struct_name, INDENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetaRow {
    pub kind: FieldKind,
    pub array_length: u32,
    /// Value needs sign- or locale-aware handling.
    pub signed: bool,
}

/// Positions and counts of the `DB2Meta` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reflection {
    pub index_field: i32,
    pub parent_index_field: i32,
    pub field_count: u32,
    pub file_field_count: u32,
    pub rows: Vec<MetaRow>,
}

fn meta_signed(c: &EmittedColumn) -> bool {
    !c.field.is_id
        && (c.field.is_signed
            || matches!(
                c.column.ty,
                ColumnType::Float | ColumnType::String | ColumnType::LocString
            ))
}

/// Folds the ordered columns into the reflection record.
///
/// A non-inline ID carries no storage: it gets no row and is removed from both
/// counts. A non-inline relation keeps its row but is removed from the file
/// field count.
pub fn reflect(result: &CompilationResult) -> Result<Reflection, Diagnostic> {
    let total = result.columns.len() as u32;
    let mut acc = Reflection {
        index_field: -1,
        parent_index_field: -1,
        field_count: total,
        file_field_count: total,
        rows: Vec::with_capacity(result.columns.len()),
    };

    for (i, c) in result.columns.iter().enumerate() {
        let field = &c.field;
        if field.is_id {
            if field.is_non_inline {
                acc.field_count -= 1;
                acc.file_field_count -= 1;
                acc.index_field = -1;
                continue;
            }
            acc.index_field = acc.rows.len() as i32;
        }

        if field.is_relation {
            // `i` counts declared columns, including a skipped non-inline ID.
            let shift = if acc.index_field == -1 { -1 } else { 0 };
            acc.parent_index_field = i as i32 + shift;
            if field.is_non_inline {
                acc.file_field_count -= 1;
            }
        }

        acc.rows.push(MetaRow {
            kind: field_kind(field, &c.column, KindTable::Metadata)?,
            array_length: field.arr_length.max(1),
            signed: meta_signed(c),
        });
    }
    Ok(acc)
}

pub fn render_metadata(result: &CompilationResult) -> Result<String, Diagnostic> {
    let r = reflect(result)?;
    let i2 = INDENT.repeat(2);
    let i3 = INDENT.repeat(3);

    let mut out = String::new();
    out.push_str(&format!("struct {}\n{{\n", meta_struct_name(&result.table_name)));
    out.push_str(&format!("{INDENT}static DB2Meta const* Instance()\n{INDENT}{{\n"));
    out.push_str(&format!(
        "{i2}static constexpr DB2MetaField fields[{}] =\n{i2}{{\n",
        r.rows.len()
    ));
    for row in &r.rows {
        out.push_str(&format!(
            "{i3}{{ {}, {}, {} }},\n",
            row.kind.tag(),
            row.array_length,
            row.signed
        ));
    }
    out.push_str(&format!("{i2}}};\n\n"));
    out.push_str(&format!(
        "{i2}static constexpr DB2Meta instance({}, {}, {}, {}, 0x{}, fields, {});\n",
        result.file_data_id,
        r.index_field,
        r.field_count,
        r.file_field_count,
        result.layout_hash,
        r.parent_index_field
    ));
    out.push_str(&format!("{i2}return &instance;\n{INDENT}}}\n}};\n"));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{compile_table, CompileOptions};
    use crate::dbd::parse_definitions;

    fn reflect_layout(fields: &str) -> Reflection {
        let doc = format!(
            "COLUMNS\nint ID\nint ParentID\nint Value\nstring Name\nlocstring Title_lang\nfloat Scale\n\nLAYOUT 0BADF00D\n{fields}"
        );
        let defs = parse_definitions(&doc).expect("parse");
        let r = compile_table(&defs, "Thing", None, 0, &CompileOptions::default())
            .expect("compile");
        reflect(&r).expect("reflect")
    }

    #[test]
    fn neither_id_nor_relation() {
        let r = reflect_layout("Value<u16>\nName\n");
        assert_eq!((r.index_field, r.parent_index_field), (-1, -1));
        assert_eq!((r.field_count, r.file_field_count), (2, 2));
        assert_eq!(r.rows.len(), 2);
    }

    #[test]
    fn inline_id_only() {
        let r = reflect_layout("Value<u16>\n$id$ID<32>\nName\n");
        assert_eq!((r.index_field, r.parent_index_field), (1, -1));
        assert_eq!((r.field_count, r.file_field_count), (3, 3));
        assert!(!r.rows[1].signed, "IDs are never flagged signed");
    }

    #[test]
    fn non_inline_id_is_skipped() {
        let r = reflect_layout("$noninline,id$ID<32>\nValue<u16>\nName\n");
        assert_eq!(r.index_field, -1);
        assert_eq!((r.field_count, r.file_field_count), (2, 2));
        assert_eq!(r.rows.len(), 2);
        assert_eq!(r.rows[0].kind, FieldKind::Short);
    }

    #[test]
    fn relation_only_shifts_back_one() {
        let r = reflect_layout("Value<u16>\nName\n$relation$ParentID<32>\n");
        assert_eq!((r.index_field, r.parent_index_field), (-1, 1));
        assert_eq!((r.field_count, r.file_field_count), (3, 3));
    }

    #[test]
    fn inline_id_and_relation() {
        let r = reflect_layout("$id$ID<32>\nValue<u16>\n$relation$ParentID<32>\n");
        assert_eq!((r.index_field, r.parent_index_field), (0, 2));
        assert_eq!((r.field_count, r.file_field_count), (3, 3));
    }

    #[test]
    fn non_inline_id_and_non_inline_relation() {
        let r = reflect_layout(
            "$noninline,id$ID<32>\nValue<u16>\nName\n$noninline,relation$ParentID<32>\n",
        );
        assert_eq!((r.index_field, r.parent_index_field), (-1, 2));
        assert_eq!((r.field_count, r.file_field_count), (3, 2));
        assert_eq!(r.rows.len(), 3);
    }

    #[test]
    fn signed_flag_covers_floats_and_strings() {
        let r = reflect_layout("Value<u32>\nName\nTitle_lang\nScale\nParentID<32>\n");
        let flags: Vec<bool> = r.rows.iter().map(|row| row.signed).collect();
        assert_eq!(flags, vec![false, true, true, true, true]);
        assert_eq!(r.rows[1].kind, FieldKind::StringNotLocalized);
        assert_eq!(r.rows[2].kind, FieldKind::String);
    }
}
