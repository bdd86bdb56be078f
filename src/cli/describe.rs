use comfy_table::Cell;
use serde::Serialize;

use crate::fields::{FieldBuilder, InputField, OutputField, Target, flatten};
use crate::resolve::Resolver;

use super::render::{TableRow, clip_for_table, render_output, terminal_width};
use super::{Cli, DescribeArgs, OutputFormat};

pub(super) fn run_describe(cli: &Cli, args: &DescribeArgs) -> anyhow::Result<()> {
    let (config, schema) = super::load_inputs(cli)?;
    let root = schema.operation(args.kind, &args.name)?;
    let builder = FieldBuilder::new(Resolver::new(&schema, &config));
    let inputs = flatten(builder.input_fields(&root.args, Target::Platform)?);
    let outputs = builder.output_fields(&root.ty, &args.name, Target::Platform)?;

    if cli.output == OutputFormat::Json {
        let s = serde_json::to_string_pretty(&Description {
            kind: args.kind.to_string(),
            name: &args.name,
            inputs: &inputs,
            outputs: &outputs,
        })?;
        println!("{s}");
        return Ok(());
    }

    let mut rows = Vec::new();
    push_input_rows(&mut rows, &inputs);
    rows.extend(outputs.iter().map(|f| FieldRow {
        direction: "output",
        key: f.key.clone(),
        label: f.label.clone(),
        field_type: f.field_type.to_string(),
        required: f.required,
        help_text: f.help_text.clone().unwrap_or_default(),
    }));
    render_output(cli, rows)
}

#[derive(Debug, Serialize)]
struct Description<'a> {
    kind: String,
    name: &'a str,
    inputs: &'a [InputField],
    outputs: &'a [OutputField],
}

fn push_input_rows(rows: &mut Vec<FieldRow>, fields: &[InputField]) {
    for f in fields {
        rows.push(FieldRow {
            direction: "input",
            key: f.key.clone(),
            label: f.label.clone(),
            field_type: match (f.field_type, f.list) {
                (Some(t), true) => format!("[{t}]"),
                (Some(t), false) => t.to_string(),
                (None, _) => String::new(),
            },
            required: f.required,
            help_text: if f.choices.is_empty() {
                f.help_text.clone().unwrap_or_default()
            } else {
                f.choices.join(" | ")
            },
        });
        push_input_rows(rows, &f.children);
    }
}

#[derive(Debug, Clone, Serialize)]
struct FieldRow {
    direction: &'static str,
    key: String,
    label: String,
    #[serde(rename = "type")]
    field_type: String,
    required: bool,
    help_text: String,
}

impl TableRow for FieldRow {
    const HEADERS: &'static [&'static str] = &["", "key", "label", "type", "required", "help"];

    fn cells(&self) -> Vec<Cell> {
        let help_width = terminal_width()
            .map(|w| usize::from(w / 3))
            .unwrap_or(40)
            .max(12);
        vec![
            Cell::new(self.direction),
            Cell::new(&self.key),
            Cell::new(&self.label),
            Cell::new(&self.field_type),
            Cell::new(if self.required { "yes" } else { "" }),
            Cell::new(clip_for_table(&self.help_text, help_width)),
        ]
    }
}
