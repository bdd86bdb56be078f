//! Zapier input/output field models built from resolved GraphQL types.

use heck::ToTitleCase;
use serde::Serialize;

use crate::error::GenError;
use crate::resolve::{Resolver, TypeDetails};
use crate::schema::{InputValue, TypeRef};
use crate::types::FieldType;

/// Key of the field Zapier treats as the record identifier.
pub const ID_FIELD: &str = "id";

/// Which consumer a field list is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Keys shown to Zapier: `name`, or `parent__name` for children.
    Platform,
    /// Keys used to write the GraphQL document: dot-joined paths with the
    /// literal GraphQL name in `field`.
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub label: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub list: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InputField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputField {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl InputField {
    /// Name the field is sent under in `bundle.inputData`: the immediate
    /// parent and the field joined by `__`, or the bare name at top level.
    pub fn platform_key(&self) -> String {
        let mut segments = self.key.rsplit('.');
        let name = segments.next().unwrap_or(self.key.as_str());
        match segments.next() {
            Some(parent) => format!("{parent}__{name}"),
            None => name.to_string(),
        }
    }

    /// Literal GraphQL name, falling back to the last key segment.
    pub fn graphql_name(&self) -> &str {
        self.field
            .as_deref()
            .unwrap_or_else(|| terminal_segment(&self.key))
    }
}

/// `user_full_name` → `User Full Name`, `firstName` → `First Name`.
pub fn label_for(name: &str) -> String {
    name.to_title_case()
}

/// Last segment of a key: the part after the final `.`, then after the
/// first `__`, so a child named `_and` keeps its leading underscore.
pub fn terminal_segment(key: &str) -> &str {
    let last = key.rsplit('.').next().unwrap_or(key);
    last.split_once("__").map_or(last, |(_, child)| child)
}

/// Name of a field within its sibling group: `key` without the parent's
/// `parent__` or `parent.` prefix.
fn local_name<'k>(key: &'k str, parent: Option<&str>) -> &'k str {
    parent
        .and_then(|p| key.strip_prefix(p))
        .and_then(|rest| rest.strip_prefix("__").or_else(|| rest.strip_prefix('.')))
        .unwrap_or(key)
}

fn field_key(target: Target, parent: Option<&str>, name: &str) -> String {
    match (target, parent) {
        (_, None) => name.to_string(),
        (Target::Platform, Some(parent)) => format!("{parent}__{name}"),
        (Target::Document, Some(parent)) => format!("{parent}.{name}"),
    }
}

trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for InputField {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Keyed for OutputField {
    fn key(&self) -> &str {
        &self.key
    }
}

fn sort_by_local_name<T: Keyed>(fields: &mut [T], parent: Option<&str>) {
    fields.sort_by(|a, b| {
        let (a, b) = (local_name(a.key(), parent), local_name(b.key(), parent));
        (a != ID_FIELD)
            .cmp(&(b != ID_FIELD))
            .then_with(|| a.cmp(b))
    });
}

/// Orders inputs `id` first, then by name within the parent, recursing into
/// children. Leaves the order untouched when `sort` is false.
pub fn sort_inputs(fields: Vec<InputField>, sort: bool) -> Vec<InputField> {
    sort_input_group(fields, None, sort)
}

fn sort_input_group(
    mut fields: Vec<InputField>,
    parent: Option<&str>,
    sort: bool,
) -> Vec<InputField> {
    if !sort {
        return fields;
    }
    sort_by_local_name(&mut fields, parent);
    for field in &mut fields {
        let children = std::mem::take(&mut field.children);
        field.children = sort_input_group(children, Some(&field.key), sort);
    }
    fields
}

pub fn sort_outputs(mut fields: Vec<OutputField>, sort: bool) -> Vec<OutputField> {
    if sort {
        sort_by_local_name(&mut fields, None);
    }
    fields
}

/// True when `fields` is a lone wrapper whose children [`flatten`] promotes.
pub fn is_flattened(fields: &[InputField]) -> bool {
    fields.len() == 1 && !fields[0].children.is_empty()
}

/// Promotes the children of a lone wrapper field (typically a single
/// `input` argument) to the top level.
pub fn flatten(mut fields: Vec<InputField>) -> Vec<InputField> {
    if is_flattened(&fields) {
        return fields.remove(0).children;
    }
    fields
}

#[derive(Debug, Clone, Copy)]
pub struct FieldBuilder<'a> {
    resolver: Resolver<'a>,
}

impl<'a> FieldBuilder<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }

    fn sort(&self) -> bool {
        self.resolver.config().sort_fields
    }

    /// One field per argument. Fields that resolve to neither a scalar nor an
    /// expandable object (nesting past the depth limit, unions) are dropped.
    pub fn input_fields(
        &self,
        args: &[InputValue],
        target: Target,
    ) -> Result<Vec<InputField>, GenError> {
        let mut fields = Vec::new();
        for arg in args {
            let mut details = self
                .resolver
                .resolve_with_children(&arg.ty, Some(&arg.name), 0)?;
            if let Some(description) = &arg.description {
                details.description = Some(description.clone());
            }
            if let Some(field) = self.input_field(&arg.name, &details, None, target) {
                fields.push(field);
            }
        }
        Ok(sort_inputs(fields, self.sort()))
    }

    fn input_field(
        &self,
        name: &str,
        details: &TypeDetails,
        parent: Option<&str>,
        target: Target,
    ) -> Option<InputField> {
        let mut field = InputField {
            key: field_key(target, parent, name),
            field: (target == Target::Document).then(|| name.to_string()),
            label: label_for(name),
            field_type: None,
            required: details.is_required,
            list: false,
            help_text: None,
            choices: Vec::new(),
            children: Vec::new(),
        };

        if details.has_children() {
            let children: Vec<_> = details
                .children
                .iter()
                .filter_map(|(child_name, child)| {
                    self.input_field(child_name, child, Some(name), target)
                })
                .collect();
            if children.is_empty() {
                return None;
            }
            field.children = sort_input_group(children, Some(&field.key), self.sort());
            return Some(field);
        }

        let field_type = details.scalar_type?;
        field.field_type = Some(field_type);
        field.list = details.is_list;
        field.help_text = details.description.clone();
        field.choices = details.enum_values.clone();
        Some(field)
    }

    /// Scalar fields of the operation's return type. For [`Target::Platform`]
    /// an `id` field is added when the type is in `idMap` and has none.
    pub fn output_fields(
        &self,
        return_type: &TypeRef,
        operation: &str,
        target: Target,
    ) -> Result<Vec<OutputField>, GenError> {
        let details = self
            .resolver
            .resolve_with_children(return_type, Some(operation), 0)?;

        let mut fields: Vec<OutputField> = details
            .children
            .iter()
            .filter_map(|(name, child)| {
                Some(OutputField {
                    key: name.clone(),
                    field: (target == Target::Document).then(|| name.clone()),
                    label: label_for(name),
                    field_type: child.scalar_type?,
                    required: child.is_required,
                    help_text: child.description.clone(),
                })
            })
            .collect();

        if let Some(source) = self.id_source(&details) {
            if !fields.iter().any(|f| f.key == source) {
                return Err(GenError::UnknownIdSource {
                    type_name: details.type_name.clone(),
                    field: source.to_string(),
                });
            }
            if target == Target::Platform && !fields.iter().any(|f| f.key == ID_FIELD) {
                fields.push(OutputField {
                    key: ID_FIELD.to_string(),
                    field: None,
                    label: label_for(ID_FIELD),
                    field_type: FieldType::String,
                    required: false,
                    help_text: None,
                });
            }
        }

        Ok(sort_outputs(fields, self.sort()))
    }

    /// The `idMap` source field configured for the resolved type, if any.
    pub fn id_source(&self, details: &TypeDetails) -> Option<&'a str> {
        self.resolver
            .config()
            .id_map
            .get(&details.type_name)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::schema::Schema;
    use crate::testing::{fixture, test_config};
    use crate::types::OperationKind;

    fn inputs(schema: &Schema, config: &Config, kind: OperationKind, op: &str, target: Target) -> Vec<InputField> {
        let field = schema.operation(kind, op).unwrap();
        FieldBuilder::new(Resolver::new(schema, config))
            .input_fields(&field.args, target)
            .unwrap()
    }

    fn outputs(schema: &Schema, config: &Config, kind: OperationKind, op: &str, target: Target) -> Vec<OutputField> {
        let field = schema.operation(kind, op).unwrap();
        FieldBuilder::new(Resolver::new(schema, config))
            .output_fields(&field.ty, op, target)
            .unwrap()
    }

    fn keys<T: Keyed>(fields: &[T]) -> Vec<&str> {
        fields.iter().map(Keyed::key).collect()
    }

    fn assert_sorted(fields: &[InputField]) {
        let segments: Vec<_> = fields.iter().map(|f| terminal_segment(&f.key)).collect();
        let rest = match segments.iter().position(|s| *s == ID_FIELD) {
            Some(0) => &segments[1..],
            Some(i) => panic!("id at position {i} in {segments:?}"),
            None => &segments[..],
        };
        assert!(rest.windows(2).all(|w| w[0] <= w[1]), "{segments:?}");
        for f in fields {
            assert_sorted(&f.children);
        }
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(label_for("user_full_name"), "User Full Name");
        assert_eq!(label_for("firstName"), "First Name");
        assert_eq!(label_for("id"), "Id");
    }

    #[test]
    fn terminal_segment_splits_paths_and_namespaces() {
        assert_eq!(terminal_segment("where.name"), "name");
        assert_eq!(terminal_segment("where__name"), "name");
        assert_eq!(terminal_segment("where___and"), "_and");
        assert_eq!(terminal_segment("limit"), "limit");
    }

    fn leaf(key: &str) -> InputField {
        InputField {
            key: key.to_string(),
            field: None,
            label: label_for(key),
            field_type: Some(FieldType::String),
            required: false,
            list: false,
            help_text: None,
            choices: Vec::new(),
            children: Vec::new(),
        }
    }

    #[test]
    fn children_sort_by_their_own_name() {
        let mut parent = leaf("where");
        parent.field_type = None;
        parent.children = vec![leaf("where__a"), leaf("where___z"), leaf("where___id"), leaf("where__id")];

        let sorted = sort_inputs(vec![parent], true);
        assert_eq!(
            keys(&sorted[0].children),
            ["where__id", "where___id", "where___z", "where__a"]
        );
    }

    #[test]
    fn dragon_outputs_are_sorted_scalars() {
        let schema = fixture();
        let config = test_config();
        let fields = outputs(&schema, &config, OperationKind::Query, "dragons", Target::Platform);
        assert_eq!(
            keys(&fields),
            [
                "id",
                "active",
                "crew_capacity",
                "description",
                "dry_mass_kg",
                "first_flight",
                "name",
                "wikipedia"
            ]
        );
        assert_eq!(fields[0].field_type, FieldType::String);
        assert_eq!(fields[2].field_type, FieldType::Integer);
        assert_eq!(fields[2].label, "Crew Capacity");
    }

    #[test]
    fn sorting_can_be_disabled() {
        let schema = fixture();
        let mut config = test_config();
        config.sort_fields = false;
        let fields = outputs(&schema, &config, OperationKind::Query, "dragons", Target::Platform);
        assert_eq!(keys(&fields)[..3], ["wikipedia", "name", "id"]);
    }

    #[test]
    fn object_arguments_become_parents() {
        let schema = fixture();
        let config = test_config();
        let fields = inputs(&schema, &config, OperationKind::Query, "users", Target::Platform);
        assert_eq!(keys(&fields), ["limit", "where"]);

        let limit = &fields[0];
        assert_eq!(limit.field_type, Some(FieldType::Integer));
        assert!(!limit.required);

        let parent = &fields[1];
        assert_eq!(parent.field_type, None);
        assert_eq!(parent.help_text, None);
        assert_eq!(keys(&parent.children), ["where__id", "where__name", "where__rocket"]);
        assert_eq!(parent.children[1].label, "Name");
        assert_sorted(&fields);
    }

    #[test]
    fn document_target_uses_paths() {
        let schema = fixture();
        let config = test_config();
        let fields = inputs(&schema, &config, OperationKind::Query, "users", Target::Document);
        let child = &fields[1].children[0];
        assert_eq!(child.key, "where.id");
        assert_eq!(child.field.as_deref(), Some("id"));
        assert_eq!(child.platform_key(), "where__id");
        assert_eq!(fields[0].platform_key(), "limit");
    }

    #[test]
    fn single_wrapper_argument_is_flattened() {
        let schema = fixture();
        let config = test_config();
        let fields = inputs(&schema, &config, OperationKind::Mutation, "delete_users", Target::Platform);
        assert_eq!(keys(&fields), ["where"]);

        let flat = flatten(fields.clone());
        assert_eq!(flat, fields[0].children);
        assert_eq!(keys(&flat), ["where__id", "where__name", "where__rocket"]);
    }

    #[test]
    fn flatten_leaves_multiple_fields_alone() {
        let schema = fixture();
        let config = test_config();
        let fields = inputs(&schema, &config, OperationKind::Query, "users", Target::Platform);
        assert_eq!(flatten(fields.clone()), fields);
    }

    #[test]
    fn nesting_never_exceeds_one_level() {
        let schema = fixture();
        let config = test_config();
        let fields = inputs(&schema, &config, OperationKind::Mutation, "launch_rocket", Target::Platform);
        assert_eq!(keys(&fields), ["name", "payload"]);
        assert!(fields[0].required);

        let payload = &fields[1];
        assert_eq!(keys(&payload.children), ["payload__mass_kg", "payload__orbit"]);
        assert!(payload.children[0].required);
        assert!(payload.children.iter().all(|c| c.children.is_empty()));
    }

    #[test]
    fn enum_arguments_carry_choices() {
        let schema = fixture();
        let config = test_config();
        let fields = inputs(&schema, &config, OperationKind::Query, "rockets", Target::Platform);
        assert_eq!(keys(&fields), ["limit", "offset", "order"]);
        let order = &fields[2];
        assert_eq!(order.choices, ["desc", "asc"]);
        assert_eq!(order.field_type, Some(FieldType::String));
        assert_eq!(order.help_text.as_deref(), Some("column ordering options"));
    }

    #[test]
    fn list_arguments_are_marked() {
        let schema = Schema::from_sdl("type Query { things(ids: [ID!]!): [String] }").unwrap();
        let config = test_config();
        let fields = inputs(&schema, &config, OperationKind::Query, "things", Target::Platform);
        assert!(fields[0].list);
        assert!(fields[0].required);
    }

    #[test]
    fn id_map_adds_platform_id_field() {
        let schema = fixture();
        let mut config = test_config();
        config
            .id_map
            .insert("users_mutation_response".to_string(), "affected_rows".to_string());

        let platform = outputs(&schema, &config, OperationKind::Mutation, "delete_users", Target::Platform);
        assert_eq!(keys(&platform), ["id", "affected_rows"]);
        assert_eq!(platform[0].field_type, FieldType::String);
        assert!(platform[1].required);

        let document = outputs(&schema, &config, OperationKind::Mutation, "delete_users", Target::Document);
        assert_eq!(keys(&document), ["affected_rows"]);
    }

    #[test]
    fn id_map_with_non_scalar_source_fails() {
        let schema = fixture();
        let mut config = test_config();
        config
            .id_map
            .insert("users_mutation_response".to_string(), "returning".to_string());
        let field = schema.operation(OperationKind::Mutation, "delete_users").unwrap();
        let err = FieldBuilder::new(Resolver::new(&schema, &config))
            .output_fields(&field.ty, "delete_users", Target::Platform)
            .unwrap_err();
        assert!(matches!(err, GenError::UnknownIdSource { ref field, .. } if field == "returning"));
    }

    #[test]
    fn scalar_return_type_has_no_outputs() {
        let schema = fixture();
        let config = test_config();
        assert!(outputs(&schema, &config, OperationKind::Mutation, "ping", Target::Platform).is_empty());
    }

    #[test]
    fn serializes_platform_shape() {
        let schema = fixture();
        let config = test_config();
        let fields = inputs(&schema, &config, OperationKind::Query, "rockets", Target::Platform);
        let json = serde_json::to_value(&fields[2]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "order",
                "label": "Order",
                "type": "string",
                "required": false,
                "helpText": "column ordering options",
                "choices": ["desc", "asc"]
            })
        );
    }
}
