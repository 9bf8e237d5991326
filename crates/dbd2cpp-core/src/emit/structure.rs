use crate::assemble::CompilationResult;

use super::{StructStyle, INDENT};

const MIN_TYPE_WIDTH: usize = 6;
const MIN_NAME_WIDTH: usize = 20;

/// `struct <Table>Entry { ... };`, one member per column.
pub fn render_structure(result: &CompilationResult, style: StructStyle) -> String {
    let (type_width, name_width) = match style {
        StructStyle::Plain => (0, 0),
        StructStyle::Padded => column_widths(result),
    };

    let mut out = String::new();
    out.push_str(&format!("struct {}Entry\n{{\n", result.table_name));
    for c in &result.columns {
        let member = format!("{};", c.name);
        let mut line = format!("{INDENT}{:<type_width$} {:<name_width$}", c.ty, member);
        if !c.comment.is_empty() {
            if style == StructStyle::Plain {
                line.push(' ');
            }
            line.push_str("// ");
            line.push_str(&c.comment);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str("};\n");
    out
}

/// Widths grow to one past any type or name longer than the current width,
/// so the longest member's `;` butts against its comment.
fn column_widths(result: &CompilationResult) -> (usize, usize) {
    let mut type_width = MIN_TYPE_WIDTH;
    let mut name_width = MIN_NAME_WIDTH;
    for c in &result.columns {
        if c.ty.len() > type_width {
            type_width = c.ty.len() + 1;
        }
        if c.name.len() > name_width {
            name_width = c.name.len() + 1;
        }
    }
    (type_width, name_width)
}
