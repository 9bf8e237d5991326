use serde::{Deserialize, Serialize};

use crate::build::Build;
use crate::dbd::{parse_definitions, ColumnDefinition, DatabaseDefinitions, FieldDefinition};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::names::normalize_field_name;
use crate::resolve::resolve_version;
use crate::types::field_type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Emit scalar `locstring` fields as `LocalizedString` rather than `string[N]`.
    pub localize_strings: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            localize_strings: true,
        }
    }
}

/// One field of the resolved layout, with its C++ spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedColumn {
    pub name: String,
    pub ty: String,
    /// Space-joined `ID` / `Relation` / `Non-inline` markers; empty when none apply.
    pub comment: String,
    pub field: FieldDefinition,
    pub column: ColumnDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationResult {
    pub table_name: String,
    pub layout_hash: String,
    /// 0 when the listfile does not know the table.
    pub file_data_id: u32,
    /// Field order of the resolved version block; never reordered.
    pub columns: Vec<EmittedColumn>,
    pub source_sha256: Option<String>,
}

fn flags_comment(field: &FieldDefinition) -> String {
    let mut flags: Vec<&str> = Vec::new();
    if field.is_id {
        flags.push("ID");
    }
    if field.is_relation {
        flags.push("Relation");
    }
    if field.is_non_inline {
        flags.push("Non-inline");
    }
    flags.join(" ")
}

/// Resolves the version block for `build` and maps each of its fields to an
/// emitted column.
pub fn compile_table(
    defs: &DatabaseDefinitions,
    table_name: &str,
    build: Option<&Build>,
    file_data_id: u32,
    options: &CompileOptions,
) -> Result<CompilationResult, Diagnostic> {
    let version = resolve_version(defs, build)?;
    let layout_hash = version
        .canonical_layout_hash()
        .ok_or_else(|| {
            Diagnostic::error(
                DiagnosticCode::D2C0901InternalBug,
                "resolved version lost its layout hash",
            )
        })?
        .to_string();

    // Every field must name a declared column before anything is mapped.
    let resolved: Vec<(&FieldDefinition, &ColumnDefinition)> = version
        .fields
        .iter()
        .map(|field| {
            defs.column(&field.name)
                .map(|column| (field, column))
                .ok_or_else(|| {
                    Diagnostic::error(
                        DiagnosticCode::D2C0110UnknownColumn,
                        format!(
                            "table {table_name}: field {:?} has no COLUMNS entry",
                            field.name
                        ),
                    )
                })
        })
        .collect::<Result<_, _>>()?;

    let mut columns = Vec::with_capacity(resolved.len());
    for (field, column) in resolved {
        columns.push(EmittedColumn {
            name: normalize_field_name(&field.name, &column.ty),
            ty: field_type(field, column, options.localize_strings)?,
            comment: flags_comment(field),
            field: field.clone(),
            column: column.clone(),
        });
    }

    log::debug!(
        "compiled {table_name}: layout {layout_hash}, {} columns",
        columns.len()
    );
    Ok(CompilationResult {
        table_name: table_name.to_string(),
        layout_hash,
        file_data_id,
        columns,
        source_sha256: None,
    })
}

/// Parses a raw definition document and compiles it.
pub fn compile_document(
    document: &[u8],
    table_name: &str,
    build: Option<&Build>,
    file_data_id: u32,
    options: &CompileOptions,
) -> Result<CompilationResult, Diagnostic> {
    let text = std::str::from_utf8(document).map_err(|e| {
        Diagnostic::error(
            DiagnosticCode::D2C0001ParseError,
            format!("definition for {table_name} is not UTF-8: {e}"),
        )
    })?;
    let defs = parse_definitions(text)?;
    let mut result = compile_table(&defs, table_name, build, file_data_id, options)?;
    result.source_sha256 = Some(crate::util::document_sha256(document));
    Ok(result)
}
