//! Text renderers for the three C++ artifacts of one compiled table.
//!
//! All three consume the same [`CompilationResult`] independently and never
//! reorder its columns.

mod load_info;
mod metadata;
mod structure;

use serde::{Deserialize, Serialize};

use crate::assemble::CompilationResult;
use crate::diagnostics::Diagnostic;

pub use load_info::{load_info_rows, render_load_info, LoadRow, HOTFIX_STATEMENT_PREFIX};
pub use metadata::{reflect, render_metadata, MetaRow, Reflection};
pub use structure::render_structure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructStyle {
    #[default]
    Plain,
    /// Types, names and comments aligned in columns.
    Padded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmitOptions {
    pub struct_style: StructStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifacts {
    pub structure: String,
    pub metadata: String,
    pub load_info: String,
}

const INDENT: &str = "    ";

/// Renders every artifact or none of them.
pub fn render_all(result: &CompilationResult, options: &EmitOptions) -> Result<Artifacts, Diagnostic> {
    let structure = render_structure(result, options.struct_style);
    let metadata = render_metadata(result)?;
    let load_info = render_load_info(result)?;
    Ok(Artifacts {
        structure,
        metadata,
        load_info,
    })
}

fn meta_struct_name(table_name: &str) -> String {
    format!("{table_name}Meta")
}
