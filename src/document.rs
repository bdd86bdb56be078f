//! GraphQL operation documents built from document-oriented field models.
//!
//! Argument values are JavaScript template placeholders reading
//! `bundle.inputData`, so the text is meant to be embedded in a template
//! literal inside the generated `perform` function. Children of a wrapper
//! promoted by [`flatten`](crate::fields::flatten) are read from the top
//! level; other children are read from inside their parent's object.

use heck::ToUpperCamelCase;

use crate::error::GenError;
use crate::fields::{InputField, OutputField, is_flattened};
use crate::types::OperationKind;

const INDENT: &str = "  ";
const INPUT_DATA: &str = "bundle.inputData";

/// What the operation selects from its result.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    /// The root field returns a scalar; no selection set is written.
    Scalar,
    /// The root field returns an object. An empty list selects `__typename`
    /// so the document stays valid.
    Fields(&'a [OutputField]),
}

/// Builds a document for `kind` (`"query"` or `"mutation"`). An empty output
/// list is treated as a scalar result.
pub fn build_document(
    kind: &str,
    operation_name: &str,
    inputs: &[InputField],
    outputs: &[OutputField],
) -> Result<String, GenError> {
    let kind: OperationKind = kind.parse()?;
    let selection = if outputs.is_empty() {
        Selection::Scalar
    } else {
        Selection::Fields(outputs)
    };
    Ok(build_operation(kind, operation_name, inputs, selection))
}

pub fn build_operation(
    kind: OperationKind,
    operation_name: &str,
    inputs: &[InputField],
    selection: Selection<'_>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{kind} {} {{\n",
        operation_name.to_upper_camel_case()
    ));
    out.push_str(INDENT);
    out.push_str(operation_name);

    if !inputs.is_empty() {
        out.push_str("(\n");
        write_arguments(&mut out, inputs, 2, INPUT_DATA, is_flattened(inputs));
        out.push_str(INDENT);
        out.push(')');
    }

    match selection {
        Selection::Scalar => out.push('\n'),
        Selection::Fields(fields) => {
            out.push_str(" {\n");
            if fields.is_empty() {
                out.push_str(&format!("{}__typename\n", INDENT.repeat(2)));
            }
            for field in fields {
                let name = field.field.as_deref().unwrap_or(field.key.as_str());
                out.push_str(&format!("{}{name}\n", INDENT.repeat(2)));
            }
            out.push_str(&format!("{INDENT}}}\n"));
        }
    }

    out.push('}');
    out
}

fn write_arguments(
    out: &mut String,
    fields: &[InputField],
    level: usize,
    base: &str,
    promoted: bool,
) {
    let indent = INDENT.repeat(level);
    for field in fields {
        let name = field.graphql_name();
        if field.children.is_empty() {
            out.push_str(&format!("{indent}{name}: {}\n", placeholder(field, base)));
        } else {
            let child_base = if promoted {
                base.to_string()
            } else {
                format!("{base}.{}?", field.platform_key())
            };
            out.push_str(&format!("{indent}{name}: {{\n"));
            write_arguments(out, &field.children, level + 1, &child_base, false);
            out.push_str(&format!("{indent}}}\n"));
        }
    }
}

/// Template expression reading the field's value at run time. Lists are
/// JSON encoded, string values are quoted (enum literals are not), and
/// optional values fall back to an empty string or `null`.
fn placeholder(field: &InputField, base: &str) -> String {
    let path = format!("{base}.{}", field.platform_key());
    let quoted = field.choices.is_empty()
        && field.field_type.is_some_and(|t| t.is_string_like());

    if field.list {
        return if field.required {
            format!("${{JSON.stringify({path})}}")
        } else {
            format!("${{JSON.stringify({path} ?? null)}}")
        };
    }
    match (quoted, field.required) {
        (true, true) => format!("\"${{{path}}}\""),
        (true, false) => format!("\"${{{path} ?? ''}}\""),
        (false, true) => format!("${{{path}}}"),
        (false, false) => format!("${{{path} ?? null}}"),
    }
}
