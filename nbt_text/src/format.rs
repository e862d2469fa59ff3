use std::fmt::Write;

use nbt::{Tag, Value};

/// Formats a tag as indented, human-readable text.
///
/// The root prints as `name: value`, or just the value when unnamed.
pub fn to_text(tag: &Tag) -> String {
    let mut output = String::new();
    if !tag.name().is_empty() {
        format_key(&mut output, tag.name());
        output.push_str(": ");
    }
    format_value(&mut output, tag.value(), 0);
    output
}

/// Formats a value with the given indentation level.
fn format_value(output: &mut String, value: &Value, indent: usize) {
    let indent_str = "  ".repeat(indent);

    match value {
        Value::End => output.push_str("end"),
        Value::Byte(n) => write!(output, "{n}b").unwrap(),
        Value::Short(n) => write!(output, "{n}s").unwrap(),
        Value::Int(n) => write!(output, "{n}").unwrap(),
        Value::Long(n) => write!(output, "{n}L").unwrap(),
        Value::Float(n) => write!(output, "{n:?}f").unwrap(),
        Value::Double(n) => write!(output, "{n:?}d").unwrap(),
        Value::String(s) => format_string_literal(output, s),
        Value::ByteArray(items) => format_array(output, "B", items.iter().map(|b| format!("{b}b"))),
        Value::IntArray(items) => format_array(output, "I", items.iter().map(|i| i.to_string())),
        Value::LongArray(items) => format_array(output, "L", items.iter().map(|l| format!("{l}L"))),

        Value::List(list) => {
            output.push('[');
            if list.is_empty() {
                output.push(']');
            } else {
                output.push('\n');
                for element in list {
                    output.push_str(&indent_str);
                    output.push_str("  ");
                    format_value(output, element, indent + 1);
                    output.push_str(",\n");
                }
                output.push_str(&indent_str);
                output.push(']');
            }
        }

        Value::Compound(compound) => {
            output.push('{');
            if compound.is_empty() {
                output.push('}');
            } else {
                output.push('\n');
                for (name, child) in compound.iter() {
                    output.push_str(&indent_str);
                    output.push_str("  ");
                    format_key(output, name);
                    output.push_str(": ");
                    format_value(output, child, indent + 1);
                    output.push_str(",\n");
                }
                output.push_str(&indent_str);
                output.push('}');
            }
        }
    }
}

fn format_array(output: &mut String, prefix: &str, items: impl Iterator<Item = String>) {
    write!(output, "[{prefix};").unwrap();
    for (i, item) in items.enumerate() {
        output.push_str(if i == 0 { " " } else { ", " });
        output.push_str(&item);
    }
    output.push(']');
}

/// Keys made only of letters, digits and `_-.+` print bare.
fn format_key(output: &mut String, key: &str) {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'));
    if bare {
        output.push_str(key);
    } else {
        format_string_literal(output, key);
    }
}

/// Formats a string as a quoted literal with escapes.
fn format_string_literal(output: &mut String, s: &str) {
    output.push('"');
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_ascii_control() => {
                write!(output, "\\x{:02x}", c as u32).unwrap();
            }
            c => output.push(c),
        }
    }
    output.push('"');
}
