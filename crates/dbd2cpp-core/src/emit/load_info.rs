use serde::Serialize;

use crate::assemble::CompilationResult;
use crate::diagnostics::Diagnostic;
use crate::names::screaming_snake;
use crate::types::{field_kind, FieldKind, KindTable};

use super::{meta_struct_name, INDENT};

/// Prefix of the prepared-statement identifier a load descriptor points at.
pub const HOTFIX_STATEMENT_PREFIX: &str = "HOTFIX_SEL_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadRow {
    pub signed: bool,
    pub kind: FieldKind,
    pub name: String,
}

/// One row per storage column: array fields become `<name>1..=<name>N`.
pub fn load_info_rows(result: &CompilationResult) -> Result<Vec<LoadRow>, Diagnostic> {
    let mut rows = Vec::new();
    for c in &result.columns {
        let kind = field_kind(&c.field, &c.column, KindTable::LoadInfo)?;
        let signed = !c.field.is_id && c.field.is_signed;
        if c.field.is_array() {
            for n in 1..=c.field.arr_length {
                rows.push(LoadRow {
                    signed,
                    kind,
                    name: format!("{}{n}", c.name),
                });
            }
        } else {
            rows.push(LoadRow {
                signed,
                kind,
                name: c.name.clone(),
            });
        }
    }
    Ok(rows)
}

pub fn render_load_info(result: &CompilationResult) -> Result<String, Diagnostic> {
    let rows = load_info_rows(result)?;
    let i2 = INDENT.repeat(2);

    let mut out = String::new();
    out.push_str(&format!("struct {}LoadInfo\n{{\n", result.table_name));
    out.push_str(&format!(
        "{INDENT}static constexpr DB2FieldMeta Fields[{}] =\n{INDENT}{{\n",
        rows.len()
    ));
    for row in &rows {
        out.push_str(&format!(
            "{i2}{{ {}, {}, \"{}\" }},\n",
            row.signed,
            row.kind.tag(),
            row.name
        ));
    }
    out.push_str(&format!("{INDENT}}};\n\n"));
    out.push_str(&format!(
        "{INDENT}static constexpr DB2LoadInfo Instance{{ Fields, {}, &{}::Instance, {HOTFIX_STATEMENT_PREFIX}{} }};\n",
        rows.len(),
        meta_struct_name(&result.table_name),
        screaming_snake(&result.table_name)
    ));
    out.push_str("};\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{compile_table, CompileOptions};
    use crate::dbd::parse_definitions;

    fn compiled(fields: &str) -> CompilationResult {
        let doc = format!(
            "COLUMNS\nint ID\nint flags\nlocstring Name_lang\nstring Icon\n\nLAYOUT 00000001\n{fields}"
        );
        let defs = parse_definitions(&doc).expect("parse");
        compile_table(&defs, "SpellEffect", None, 0, &CompileOptions::default())
            .expect("compile")
    }

    #[test]
    fn arrays_explode_into_numbered_rows() {
        let rows = load_info_rows(&compiled("$id$ID<32>\nflags<32>[3]\n")).expect("rows");
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ID", "flags1", "flags2", "flags3"]);
        assert!(!rows[0].signed, "ID forced unsigned");
        assert!(rows[1].signed);
    }

    #[test]
    fn strings_collapse_to_one_kind() {
        let rows = load_info_rows(&compiled("Name_lang\nIcon\n")).expect("rows");
        assert_eq!(rows[0].kind, FieldKind::String);
        assert_eq!(rows[1].kind, FieldKind::String);
        assert_eq!(rows[0].name, "Name");
    }

    #[test]
    fn renders_descriptor_record() {
        let text = render_load_info(&compiled("$noninline,id$ID<32>\nflags<u16>[2]\n"))
            .expect("render");
        assert_eq!(
            text,
            "struct SpellEffectLoadInfo
{
    static constexpr DB2FieldMeta Fields[3] =
    {
        { false, FT_INT, \"ID\" },
        { false, FT_SHORT, \"flags1\" },
        { false, FT_SHORT, \"flags2\" },
    };

    static constexpr DB2LoadInfo Instance{ Fields, 3, &SpellEffectMeta::Instance, HOTFIX_SEL_SPELL_EFFECT };
};
"
        );
    }
}
