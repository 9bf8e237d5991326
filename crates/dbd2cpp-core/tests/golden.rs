use std::path::PathBuf;

use dbd2cpp_core::diagnostics::DiagnosticCode;
use dbd2cpp_core::{compile_document, render_all, Build, CompileOptions, EmitOptions};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture(name)).expect("read fixture")
}

fn golden(name: &str) -> String {
    std::fs::read_to_string(fixture("golden").join(name)).expect("read golden file")
}

#[test]
fn spell_effect_10_0_2_matches_golden_artifacts() {
    let build: Build = "10.0.2.45969".parse().expect("build");
    let result = compile_document(
        &read_fixture("SpellEffect.dbd"),
        "SpellEffect",
        Some(&build),
        1349477,
        &CompileOptions::default(),
    )
    .expect("compile SpellEffect");
    assert_eq!(result.layout_hash, "E3B8A8B2");

    let out = render_all(&result, &EmitOptions::default()).expect("render");
    assert_eq!(out.structure, golden("SpellEffect.structure.h"));
    assert_eq!(out.metadata, golden("SpellEffect.metadata.h"));
    assert_eq!(out.load_info, golden("SpellEffect.loadinfo.h"));
}

#[test]
fn rendered_hash_is_canonical_layout_hash() {
    let doc = read_fixture("SpellEffect.dbd");
    for (build, hash) in [
        (Some("9.2.7.45745"), "6B1F6A9C"),
        (Some("10.0.2.45969"), "E3B8A8B2"),
        (Some("10.0.5.47000"), "8F3D1B77"),
        (None, "8F3D1B77"),
    ] {
        let build: Option<Build> = build.map(|b| b.parse().expect("build"));
        let result = compile_document(
            &doc,
            "SpellEffect",
            build.as_ref(),
            0,
            &CompileOptions::default(),
        )
        .expect("compile");
        let out = render_all(&result, &EmitOptions::default()).expect("render");
        assert!(
            out.metadata.contains(&format!(", 0x{hash}, fields, ")),
            "{}",
            out.metadata
        );
    }
}

#[test]
fn compilation_is_deterministic() {
    let doc = read_fixture("SpellEffect.dbd");
    let build: Build = "10.0.2.45969".parse().expect("build");
    let render = || {
        let result = compile_document(
            &doc,
            "SpellEffect",
            Some(&build),
            7,
            &CompileOptions::default(),
        )
        .expect("compile");
        render_all(&result, &EmitOptions::default()).expect("render")
    };
    assert_eq!(render(), render());
}

#[test]
fn unsupported_column_type_fails_the_whole_table() {
    let err = compile_document(
        &read_fixture("Broken.dbd"),
        "Broken",
        None,
        0,
        &CompileOptions::default(),
    )
    .expect_err("blob column");
    assert_eq!(err.code, DiagnosticCode::D2C0120UnsupportedColumnType);
    assert!(err.message.contains("blob"), "{}", err.message);
}
