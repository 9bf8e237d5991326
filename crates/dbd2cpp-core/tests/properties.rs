//! Cross-artifact laws checked over every version block of the fixtures.

use std::path::PathBuf;

use dbd2cpp_core::dbd::parse_definitions;
use dbd2cpp_core::emit::{load_info_rows, reflect};
use dbd2cpp_core::{compile_table, render_all, Build, CompilationResult, CompileOptions, EmitOptions};

fn spell_effect_builds() -> Vec<CompilationResult> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/SpellEffect.dbd");
    let text = std::fs::read_to_string(path).expect("read fixture");
    let defs = parse_definitions(&text).expect("parse");
    ["9.2.7.45745", "10.0.2.45969", "10.0.5.47000"]
        .iter()
        .map(|b| {
            let build: Build = b.parse().expect("build");
            compile_table(&defs, "SpellEffect", Some(&build), 0, &CompileOptions::default())
                .expect("compile")
        })
        .collect()
}

#[test]
fn field_count_bounds() {
    for result in spell_effect_builds() {
        let r = reflect(&result).expect("reflect");
        let total = result.columns.len() as u32;
        let non_inline_ids = result
            .columns
            .iter()
            .filter(|c| c.field.is_id && c.field.is_non_inline)
            .count() as u32;
        let non_inline_relations = result
            .columns
            .iter()
            .filter(|c| c.field.is_relation && c.field.is_non_inline && !c.field.is_id)
            .count() as u32;

        assert!(r.file_field_count <= r.field_count && r.field_count <= total);
        assert_eq!(total - r.field_count, non_inline_ids);
        assert_eq!(r.field_count - r.file_field_count, non_inline_relations);
        assert_eq!(r.rows.len() as u32, r.field_count);
    }
}

#[test]
fn load_rows_expand_arrays() {
    for result in spell_effect_builds() {
        let expected: u32 = result
            .columns
            .iter()
            .map(|c| c.field.arr_length.max(1))
            .sum();
        let rows = load_info_rows(&result).expect("rows");
        assert_eq!(rows.len() as u32, expected);
    }
}

#[test]
fn artifacts_follow_field_order() {
    for result in spell_effect_builds() {
        let out = render_all(&result, &EmitOptions::default()).expect("render");

        let struct_names: Vec<&str> = out
            .structure
            .lines()
            .filter(|l| l.starts_with("    "))
            .filter_map(|l| l.split_once(';').map(|(decl, _)| decl))
            .filter_map(|decl| decl.rsplit(' ').next())
            .collect();
        let column_names: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(struct_names, column_names);

        let load_names: Vec<String> = load_info_rows(&result)
            .expect("rows")
            .into_iter()
            .map(|r| r.name)
            .collect();
        let mut expected = Vec::new();
        for c in &result.columns {
            if c.field.arr_length == 0 {
                expected.push(c.name.clone());
            } else {
                expected.extend((1..=c.field.arr_length).map(|n| format!("{}{n}", c.name)));
            }
        }
        assert_eq!(load_names, expected);
    }
}

#[test]
fn non_inline_id_only_loses_its_metadata_row() {
    let defs = parse_definitions("COLUMNS\nint ID\nint Value\n\nLAYOUT 00000001\n$noninline,id$ID<32>\nValue<32>\n")
        .expect("parse");
    let result = compile_table(&defs, "Thing", None, 0, &CompileOptions::default()).expect("compile");
    let r = reflect(&result).expect("reflect");
    assert_eq!(r.rows.len(), 1);
    assert_eq!(r.index_field, -1);
    assert_eq!((r.field_count, r.file_field_count), (1, 1));
    assert_eq!(load_info_rows(&result).expect("rows").len(), 2);
}
