//! JavaScript text for generated action modules and their Jest tests.

use heck::ToLowerCamelCase;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::generate::{GeneratedAction, ResultShape};
use crate::sample;
use crate::types::ActionType;

/// Module and test file contents for one action.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAction {
    pub action_type: ActionType,
    pub key: String,
    pub module: String,
    pub test: String,
}

pub fn render(
    action: &GeneratedAction,
    config: &Config,
    timestamp: &str,
) -> serde_json::Result<RenderedAction> {
    Ok(RenderedAction {
        action_type: action.action_type,
        key: action.key.clone(),
        module: render_module(action, config, timestamp)?,
        test: render_test(action, config, timestamp)?,
    })
}

/// Variable the module is bound to in the entry file, e.g. `usersTrigger`.
pub fn module_ident(action_type: ActionType, key: &str) -> String {
    format!("{key}_{action_type}").to_lower_camel_case()
}

/// Copies `source_field` into `id` on the record, or on every record of a
/// list.
pub fn id_mapping_expression(result_var: &str, source_field: &str, is_list: bool) -> String {
    if is_list {
        format!("{result_var}.map((item) => ({{ ...item, id: item.{source_field} }}))")
    } else {
        format!("{{ ...{result_var}, id: {result_var}.{source_field} }}")
    }
}

/// What `perform` returns. Triggers and searches always resolve to an array;
/// creates resolve to the record itself.
pub fn result_expression(action: &GeneratedAction, result_var: &str) -> String {
    let mapped = |is_list: bool| match &action.id_source {
        Some(source) => id_mapping_expression(result_var, source, is_list),
        None => result_var.to_string(),
    };
    let key = &action.key;
    match (action.action_type.returns_list(), action.result_shape) {
        (true, ResultShape::List) => mapped(true),
        (true, ResultShape::Object) => format!("{result_var} ? [{}] : []", mapped(false)),
        (true, ResultShape::Scalar) => format!("[{{ {key}: {result_var} }}]"),
        (false, ResultShape::List) => mapped(true),
        (false, ResultShape::Object) => mapped(false),
        (false, ResultShape::Scalar) => format!("{{ {key}: {result_var} }}"),
    }
}

/// Pretty JSON whose continuation lines are indented by `indent` spaces, for
/// embedding after a property name.
fn js_value<T: Serialize + ?Sized>(value: &T, indent: usize) -> serde_json::Result<String> {
    let text = serde_json::to_string_pretty(value)?;
    let pad = format!("\n{}", " ".repeat(indent));
    Ok(text.lines().collect::<Vec<_>>().join(&pad))
}

pub fn render_module(
    action: &GeneratedAction,
    config: &Config,
    timestamp: &str,
) -> serde_json::Result<String> {
    let url_env_var = &config.request.url_env_var;
    let headers = js_value(&config.request.headers, 4)?;
    let document = &action.document;
    let key = &action.key;
    let result = result_expression(action, "result");

    let key_literal = serde_json::to_string(key)?;
    let noun = serde_json::to_string(&action.noun)?;
    let label = serde_json::to_string(&action.label)?;
    let description = serde_json::to_string(&action.description)?;
    let inputs = js_value(&action.inputs, 4)?;
    let outputs = js_value(&action.outputs, 4)?;
    let sample = js_value(&sample::to_json(&action.output_sample, timestamp), 4)?;

    Ok(format!(
        r#"const perform = async (z, bundle) => {{
  const response = await z.request({{
    url: process.env.{url_env_var},
    method: 'POST',
    headers: {headers},
    body: {{
      query: `{document}`,
    }},
  }});

  if (response.data.errors && response.data.errors.length) {{
    const message = response.data.errors.map((e) => e.message).join('; ');
    throw new z.errors.Error(message, 'GraphQLError', response.status);
  }}

  const result = response.data.data.{key};
  return {result};
}};

module.exports = {{
  key: {key_literal},
  noun: {noun},
  display: {{
    label: {label},
    description: {description},
  }},
  operation: {{
    perform,
    inputFields: {inputs},
    outputFields: {outputs},
    sample: {sample},
  }},
}};
"#
    ))
}

/// `testBundle` with the input sample merged under `inputData`. Values
/// already present in the configured bundle take precedence.
pub fn test_bundle(action: &GeneratedAction, config: &Config, timestamp: &str) -> Value {
    let mut input_data = sample::to_json_map(&action.input_sample, timestamp);
    if let Some(Value::Object(configured)) = config.test_bundle.get("inputData") {
        for (k, v) in configured {
            input_data.insert(k.clone(), v.clone());
        }
    }

    let mut bundle = match &config.test_bundle {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    bundle.insert("inputData".to_string(), Value::Object(input_data));
    Value::Object(bundle)
}

pub fn render_test(
    action: &GeneratedAction,
    config: &Config,
    timestamp: &str,
) -> serde_json::Result<String> {
    let section = action.action_type.section();
    let key = &action.key;
    let key_literal = serde_json::to_string(key)?;
    let bundle = js_value(&test_bundle(action, config, timestamp), 4)?;
    let assertion = if action.action_type.returns_list() {
        "expect(Array.isArray(results)).toBe(true);"
    } else {
        "expect(results).toBeDefined();"
    };

    Ok(format!(
        r#"const zapier = require('zapier-platform-core');

const App = require('../../index');

const appTester = zapier.createAppTester(App);
zapier.tools.env.inject();

describe('{section}.{key}', () => {{
  it('should run {section}.{key}', async () => {{
    const bundle = {bundle};

    const results = await appTester(App.{section}[{key_literal}].operation.perform, bundle);
    {assertion}
  }});
}});
"#
    ))
}
