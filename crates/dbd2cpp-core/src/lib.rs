//! Compiles WoWDBDefs table definitions into C++ declarations: the row
//! structure, the `DB2Meta` reflection record and the `DB2LoadInfo` field
//! descriptor table.
//!
//! ```
//! use dbd2cpp_core::{compile_document, render_all, CompileOptions, EmitOptions};
//!
//! let dbd = b"COLUMNS\nint ID\nfloat Scale\n\nLAYOUT 0A1B2C3D\n$id$ID<32>\nScale\n";
//! let result = compile_document(dbd, "Thing", None, 0, &CompileOptions::default())?;
//! let out = render_all(&result, &EmitOptions::default())?;
//! assert!(out.structure.starts_with("struct ThingEntry"));
//! # Ok::<(), dbd2cpp_core::diagnostics::Diagnostic>(())
//! ```

pub mod build;
pub mod dbd;
pub mod diagnostics;
pub mod display_names;
pub mod emit;
pub mod listfile;
pub mod names;
pub mod resolve;
pub mod types;

mod assemble;
mod util;

pub use assemble::{
    compile_document, compile_table, CompilationResult, CompileOptions, EmittedColumn,
};
pub use build::Build;
pub use emit::{render_all, Artifacts, EmitOptions, StructStyle};
