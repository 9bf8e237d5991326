use crate::build::{Build, BuildRange};
use crate::diagnostics::{Diagnostic, DiagnosticCode};

use super::{
    ColumnDefinition, ColumnType, DatabaseDefinitions, FieldDefinition, ForeignKey,
    VersionDefinition,
};

fn parse_error(lno: usize, message: impl AsRef<str>) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::D2C0001ParseError,
        format!("line {lno}: {}", message.as_ref()),
    )
}

/// Parses the text of a `.dbd` document.
pub fn parse_definitions(src: &str) -> Result<DatabaseDefinitions, Diagnostic> {
    let mut lines = src
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end()))
        .peekable();

    while let Some((_, line)) = lines.peek() {
        if !line.is_empty() {
            break;
        }
        lines.next();
    }

    match lines.next() {
        Some((_, "COLUMNS")) => {}
        Some((lno, other)) => {
            return Err(parse_error(lno, format!("expected COLUMNS, got {other:?}")));
        }
        None => return Err(parse_error(1, "empty definition document")),
    }

    let mut defs = DatabaseDefinitions::default();
    for (lno, line) in lines.by_ref() {
        if line.is_empty() {
            break;
        }
        let column = parse_column_line(lno, line)?;
        if let Err(dup) = defs.push_column(column) {
            return Err(parse_error(lno, format!("duplicate column {:?}", dup.name)));
        }
    }

    let mut current: Option<VersionDefinition> = None;
    for (lno, line) in lines {
        if line.is_empty() {
            if let Some(v) = current.take() {
                defs.versions.push(v);
            }
            continue;
        }
        let v = current.get_or_insert_with(VersionDefinition::default);

        if let Some(rest) = header(line, "LAYOUT") {
            let before = v.layout_hashes.len();
            v.layout_hashes.extend(
                rest.split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string),
            );
            if v.layout_hashes.len() == before {
                return Err(parse_error(lno, "LAYOUT line lists no hashes"));
            }
        } else if let Some(rest) = header(line, "BUILD") {
            let mut any = false;
            for item in rest.split(',').map(str::trim).filter(|b| !b.is_empty()) {
                any = true;
                if item.contains('-') {
                    let range: BuildRange = item
                        .parse()
                        .map_err(|e: Diagnostic| parse_error(lno, e.message))?;
                    v.build_ranges.push(range);
                } else {
                    let build: Build = item
                        .parse()
                        .map_err(|e: Diagnostic| parse_error(lno, e.message))?;
                    v.builds.push(build);
                }
            }
            if !any {
                return Err(parse_error(lno, "BUILD line lists no builds"));
            }
        } else if let Some(rest) = header(line, "COMMENT") {
            v.comments.push(rest.to_string());
        } else {
            v.fields.push(parse_field_line(lno, line)?);
        }
    }
    if let Some(v) = current {
        defs.versions.push(v);
    }

    log::debug!(
        "parsed definition: {} columns, {} versions",
        defs.columns().len(),
        defs.versions.len()
    );
    Ok(defs)
}

/// Text after a version-block keyword, when `line` starts with one.
fn header<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn split_comment(line: &str) -> (&str, Option<String>) {
    match line.split_once("//") {
        Some((body, comment)) => (body.trim(), Some(comment.trim().to_string())),
        None => (line.trim(), None),
    }
}

fn parse_column_line(lno: usize, line: &str) -> Result<ColumnDefinition, Diagnostic> {
    let (body, comment) = split_comment(line);
    let Some((type_tok, name_tok)) = body.split_once(' ') else {
        return Err(parse_error(lno, format!("expected '<type> <name>', got {body:?}")));
    };

    let (ty, foreign) = match type_tok.split_once('<') {
        Some((ty, rest)) => {
            let Some(key) = rest.strip_suffix('>') else {
                return Err(parse_error(lno, format!("unterminated foreign key in {type_tok:?}")));
            };
            let Some((table, column)) = key.split_once("::") else {
                return Err(parse_error(lno, format!("expected <Table::Column>, got {key:?}")));
            };
            (
                ty,
                Some(ForeignKey {
                    table: table.to_string(),
                    column: column.to_string(),
                }),
            )
        }
        None => (type_tok, None),
    };

    let name_tok = name_tok.trim();
    let (name, verified) = match name_tok.strip_suffix('?') {
        Some(name) => (name, false),
        None => (name_tok, true),
    };
    if name.is_empty() {
        return Err(parse_error(lno, "column name is empty"));
    }

    Ok(ColumnDefinition {
        name: name.to_string(),
        ty: ColumnType::from_token(ty),
        foreign,
        verified,
        comment,
    })
}

fn parse_field_line(lno: usize, line: &str) -> Result<FieldDefinition, Diagnostic> {
    let (mut body, comment) = split_comment(line);
    let mut field = FieldDefinition {
        comment,
        ..FieldDefinition::default()
    };

    if let Some(rest) = body.strip_prefix('$') {
        let Some((annotations, rest)) = rest.split_once('$') else {
            return Err(parse_error(lno, "unterminated annotation list"));
        };
        for ann in annotations.split(',').map(str::trim) {
            match ann {
                "id" => field.is_id = true,
                "relation" => field.is_relation = true,
                "noninline" => field.is_non_inline = true,
                other => log::debug!("line {lno}: ignoring annotation {other:?}"),
            }
        }
        body = rest;
    }

    let name_end = body.find(['<', '[']).unwrap_or(body.len());
    let name = body[..name_end].trim();
    if name.is_empty() {
        return Err(parse_error(lno, "field name is empty"));
    }
    field.name = name.to_string();
    let mut rest = &body[name_end..];

    if let Some(after) = rest.strip_prefix('<') {
        let Some((size, after)) = after.split_once('>') else {
            return Err(parse_error(lno, format!("unterminated size in {body:?}")));
        };
        let (signed, digits) = match size.strip_prefix('u') {
            Some(digits) => (false, digits),
            None => (true, size),
        };
        field.is_signed = signed;
        field.size = digits
            .parse()
            .map_err(|_| parse_error(lno, format!("invalid field size {size:?}")))?;
        rest = after;
    }

    if let Some(after) = rest.strip_prefix('[') {
        let Some((len, after)) = after.split_once(']') else {
            return Err(parse_error(lno, format!("unterminated array length in {body:?}")));
        };
        field.arr_length = len
            .parse()
            .map_err(|_| parse_error(lno, format!("invalid array length {len:?}")))?;
        rest = after;
    }

    if !rest.trim().is_empty() {
        return Err(parse_error(lno, format!("unexpected trailing text {:?}", rest.trim())));
    }
    Ok(field)
}
