use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Resolve,
    Assemble,
    Emit,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticCode {
    D2C0001ParseError,
    D2C0002InvalidBuild,
    D2C0100UnresolvedVersion,
    D2C0110UnknownColumn,
    D2C0120UnsupportedColumnType,
    D2C0130InvalidFieldSize,
    D2C0140UnsupportedLocalizedArray,
    D2C0901InternalBug,
}

impl DiagnosticCode {
    pub fn code_str(self) -> &'static str {
        match self {
            DiagnosticCode::D2C0001ParseError => "D2C0001",
            DiagnosticCode::D2C0002InvalidBuild => "D2C0002",
            DiagnosticCode::D2C0100UnresolvedVersion => "D2C0100",
            DiagnosticCode::D2C0110UnknownColumn => "D2C0110",
            DiagnosticCode::D2C0120UnsupportedColumnType => "D2C0120",
            DiagnosticCode::D2C0130InvalidFieldSize => "D2C0130",
            DiagnosticCode::D2C0140UnsupportedLocalizedArray => "D2C0140",
            DiagnosticCode::D2C0901InternalBug => "D2C0901",
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            DiagnosticCode::D2C0001ParseError => "failed to parse definition document",
            DiagnosticCode::D2C0002InvalidBuild => "invalid build string",
            DiagnosticCode::D2C0100UnresolvedVersion => {
                "no version definition with a layout hash applies"
            }
            DiagnosticCode::D2C0110UnknownColumn => "field references an unknown column",
            DiagnosticCode::D2C0120UnsupportedColumnType => "unsupported column type",
            DiagnosticCode::D2C0130InvalidFieldSize => "invalid integer field size",
            DiagnosticCode::D2C0140UnsupportedLocalizedArray => {
                "localized string arrays are not supported"
            }
            DiagnosticCode::D2C0901InternalBug => "internal dbd2cpp bug",
        }
    }

    pub fn default_help(self) -> Option<&'static str> {
        match self {
            DiagnosticCode::D2C0002InvalidBuild => {
                Some("Builds have four components, like 10.0.2.45969.")
            }
            DiagnosticCode::D2C0100UnresolvedVersion => Some(
                "Check that the definition has a LAYOUT line for the requested build, or omit the build to use the latest version.",
            ),
            DiagnosticCode::D2C0110UnknownColumn => {
                Some("Every field in a version block must be declared in the COLUMNS block.")
            }
            DiagnosticCode::D2C0130InvalidFieldSize => Some("Integer sizes must be 8, 16, 32 or 64."),
            DiagnosticCode::D2C0901InternalBug => Some(
                "This is a bug in dbd2cpp. Please report it with the definition document.",
            ),
            _ => None,
        }
    }

    pub fn stage(self) -> Stage {
        match self {
            DiagnosticCode::D2C0001ParseError | DiagnosticCode::D2C0002InvalidBuild => Stage::Parse,
            DiagnosticCode::D2C0100UnresolvedVersion => Stage::Resolve,
            DiagnosticCode::D2C0110UnknownColumn
            | DiagnosticCode::D2C0120UnsupportedColumnType
            | DiagnosticCode::D2C0130InvalidFieldSize
            | DiagnosticCode::D2C0140UnsupportedLocalizedArray => Stage::Assemble,
            DiagnosticCode::D2C0901InternalBug => Stage::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub stage: Stage,
    pub severity: Severity,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            stage: code.stage(),
            severity: Severity::Error,
            message: message.into(),
            help: code.default_help().map(|s| s.to_string()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?}: {}",
            self.code.code_str(),
            self.stage,
            self.severity,
            self.message
        )?;
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

pub fn render_diagnostics_md() -> String {
    let mut rows: Vec<(&'static str, Stage, &'static str, &'static str)> = all_codes()
        .iter()
        .map(|code| {
            (
                code.code_str(),
                code.stage(),
                code.default_message(),
                code.default_help().unwrap_or(""),
            )
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    out.push_str("# dbd2cpp diagnostics catalog\n\n");
    out.push_str("This document is generated from `crates/dbd2cpp-core/src/diagnostics.rs`.\n\n");
    out.push_str("| Code | Stage | Message | Help |\n");
    out.push_str("| ---- | ----- | ------- | ---- |\n");
    for (code, stage, msg, help) in rows {
        out.push_str(&format!("| {code} | {stage:?} | {msg} | {help} |\n"));
    }
    out
}

fn all_codes() -> &'static [DiagnosticCode] {
    &[
        DiagnosticCode::D2C0001ParseError,
        DiagnosticCode::D2C0002InvalidBuild,
        DiagnosticCode::D2C0100UnresolvedVersion,
        DiagnosticCode::D2C0110UnknownColumn,
        DiagnosticCode::D2C0120UnsupportedColumnType,
        DiagnosticCode::D2C0130InvalidFieldSize,
        DiagnosticCode::D2C0140UnsupportedLocalizedArray,
        DiagnosticCode::D2C0901InternalBug,
    ]
}
