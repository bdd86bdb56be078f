//! Turns one root field into everything needed to write an action.

use serde::Serialize;

use crate::config::Config;
use crate::document::{Selection, build_operation};
use crate::error::GenError;
use crate::fields::{FieldBuilder, InputField, OutputField, Target, flatten, label_for};
use crate::resolve::Resolver;
use crate::sample::{SampleData, synthesize_inputs, synthesize_outputs};
use crate::schema::Schema;
use crate::types::ActionType;

/// Shape of the value found under `data.<operation>` in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultShape {
    List,
    Object,
    Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAction {
    pub action_type: ActionType,
    /// Root field name; also the action key.
    pub key: String,
    pub noun: String,
    pub label: String,
    pub description: String,
    pub document: String,
    pub inputs: Vec<InputField>,
    pub outputs: Vec<OutputField>,
    pub input_sample: SampleData,
    pub output_sample: SampleData,
    pub result_shape: ResultShape,
    /// Field copied into `id` on every result record, from `idMap`.
    pub id_source: Option<String>,
}

pub fn generate(
    schema: &Schema,
    config: &Config,
    action_type: ActionType,
    operation_name: &str,
) -> Result<GeneratedAction, GenError> {
    let kind = action_type.operation_kind();
    let root = schema.operation(kind, operation_name)?;
    if action_type == ActionType::Search && root.args.is_empty() {
        return Err(GenError::MissingArguments(operation_name.to_string()));
    }

    let resolver = Resolver::new(schema, config);
    let builder = FieldBuilder::new(resolver);
    let returned = resolver.resolve(&root.ty, Some(operation_name))?;
    let result_shape = if returned.scalar_type.is_some() {
        ResultShape::Scalar
    } else if returned.is_list {
        ResultShape::List
    } else {
        ResultShape::Object
    };

    let document = {
        let inputs = builder.input_fields(&root.args, Target::Document)?;
        let outputs = builder.output_fields(&root.ty, operation_name, Target::Document)?;
        let selection = match result_shape {
            ResultShape::Scalar => Selection::Scalar,
            ResultShape::List | ResultShape::Object => Selection::Fields(&outputs),
        };
        build_operation(kind, operation_name, &inputs, selection)
    };

    let inputs = flatten(builder.input_fields(&root.args, Target::Platform)?);
    let outputs = builder.output_fields(&root.ty, operation_name, Target::Platform)?;
    let input_sample = synthesize_inputs(config, &inputs)?;
    let output_sample = synthesize_outputs(config, &outputs)?;

    let label = label_for(operation_name);
    let description = root
        .description
        .clone()
        .unwrap_or_else(|| default_description(action_type, &label));

    Ok(GeneratedAction {
        action_type,
        key: operation_name.to_string(),
        noun: label_for(&returned.type_name),
        label,
        description,
        document,
        inputs,
        outputs,
        input_sample,
        output_sample,
        result_shape,
        id_source: builder.id_source(&returned).map(str::to_string),
    })
}

fn default_description(action_type: ActionType, label: &str) -> String {
    match action_type {
        ActionType::Trigger => format!("Triggers on {label}."),
        ActionType::Search => format!("Finds {label}."),
        ActionType::Create => format!("Creates {label}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleValue;
    use crate::testing::{fixture, test_config};

    #[test]
    fn dragons_trigger() {
        let schema = fixture();
        let config = test_config();
        let action = generate(&schema, &config, ActionType::Trigger, "dragons").unwrap();

        assert_eq!(action.key, "dragons");
        assert_eq!(action.label, "Dragons");
        assert_eq!(action.noun, "Dragon");
        assert_eq!(action.description, "Triggers on Dragons.");
        assert_eq!(action.result_shape, ResultShape::List);
        assert!(action.inputs.is_empty());
        assert!(!action.document.contains('('));
        assert_eq!(action.outputs[0].key, "id");
        assert_eq!(action.output_sample["id"], SampleValue::String("1".into()));
        assert_eq!(action.id_source, None);
    }

    #[test]
    fn root_description_wins() {
        let schema = fixture();
        let config = test_config();
        let action = generate(&schema, &config, ActionType::Search, "rocket").unwrap();
        assert_eq!(action.description, "Fetch a single rocket");
        assert_eq!(action.result_shape, ResultShape::Object);
    }

    #[test]
    fn search_without_arguments_fails() {
        let schema = fixture();
        let config = test_config();
        let err = generate(&schema, &config, ActionType::Search, "dragons").unwrap_err();
        assert!(matches!(err, GenError::MissingArguments(ref name) if name == "dragons"));
    }

    #[test]
    fn create_looks_up_mutations() {
        let schema = fixture();
        let config = test_config();
        let err = generate(&schema, &config, ActionType::Create, "dragons").unwrap_err();
        assert!(matches!(err, GenError::UnknownOperation { .. }));
    }

    #[test]
    fn wrapper_argument_is_flattened_for_the_platform_only() {
        let schema = fixture();
        let config = test_config();
        let action = generate(&schema, &config, ActionType::Create, "delete_users").unwrap();

        let keys: Vec<_> = action.inputs.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["where__id", "where__name", "where__rocket"]);
        assert!(action.inputs.iter().all(|f| f.children.is_empty()));
        assert!(action.document.contains("    where: {\n"));
        assert!(action.document.contains("bundle.inputData.where__id"));
    }

    #[test]
    fn id_mapped_mutation_response() {
        let schema = fixture();
        let mut config = test_config();
        config
            .id_map
            .insert("users_mutation_response".to_string(), "affected_rows".to_string());
        let action = generate(&schema, &config, ActionType::Create, "delete_users").unwrap();

        assert_eq!(action.id_source.as_deref(), Some("affected_rows"));
        assert_eq!(action.result_shape, ResultShape::Object);
        let keys: Vec<_> = action.outputs.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["id", "affected_rows"]);
        // The document selects only real fields.
        assert!(!action.document.contains("    id\n"));
    }

    #[test]
    fn scalar_mutation() {
        let schema = fixture();
        let config = test_config();
        let action = generate(&schema, &config, ActionType::Create, "ping").unwrap();
        assert_eq!(action.result_shape, ResultShape::Scalar);
        assert!(action.outputs.is_empty());
        assert!(action.output_sample.is_empty());
        assert_eq!(
            action.input_sample["message"],
            SampleValue::String("Something".into())
        );
    }

    #[test]
    fn unmapped_scalar_aborts_generation() {
        let schema = fixture();
        let config = test_config();
        let err = generate(&schema, &config, ActionType::Trigger, "metadata").unwrap_err();
        assert!(matches!(err, GenError::UnmappedScalarType { ref type_name, .. } if type_name == "jsonb"));
    }

    #[test]
    fn generation_is_deterministic() {
        let schema = fixture();
        let config = test_config();
        let a = generate(&schema, &config, ActionType::Trigger, "users").unwrap();
        let b = generate(&schema, &config, ActionType::Trigger, "users").unwrap();
        assert_eq!(a, b);
    }
}
