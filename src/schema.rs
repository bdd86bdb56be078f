use std::collections::BTreeMap;

use anyhow::Context;
use graphql_parser::schema::{Definition, Document, Type, TypeDefinition, TypeExtension};
use serde::Deserialize;
use serde_json::Value;

use crate::error::GenError;
use crate::types::OperationKind;

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        Self::NonNull(Box::new(inner))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub args: Vec<InputValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Scalar,
    Object(Vec<FieldDef>),
    Interface(Vec<FieldDef>),
    Union(Vec<String>),
    Enum(Vec<String>),
    InputObject(Vec<InputValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: String,
    pub description: Option<String>,
    pub kind: TypeKind,
}

/// A declared member of an object, interface or input object type.
#[derive(Debug, Clone, Copy)]
pub struct Member<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub ty: &'a TypeRef,
}

impl NamedType {
    /// Declared fields in order, or `None` for types without fields.
    pub fn members(&self) -> Option<Vec<Member<'_>>> {
        match &self.kind {
            TypeKind::Object(fields) | TypeKind::Interface(fields) => Some(
                fields
                    .iter()
                    .map(|f| Member {
                        name: &f.name,
                        description: f.description.as_deref(),
                        ty: &f.ty,
                    })
                    .collect(),
            ),
            TypeKind::InputObject(fields) => Some(
                fields
                    .iter()
                    .map(|f| Member {
                        name: &f.name,
                        description: f.description.as_deref(),
                        ty: &f.ty,
                    })
                    .collect(),
            ),
            TypeKind::Scalar | TypeKind::Union(_) | TypeKind::Enum(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    query_type: String,
    mutation_type: Option<String>,
    types: BTreeMap<String, NamedType>,
}

impl Schema {
    pub fn get(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    /// Looks up a root field on the query or mutation type.
    pub fn operation(&self, kind: OperationKind, name: &str) -> Result<&FieldDef, GenError> {
        let root = match kind {
            OperationKind::Query => Some(self.query_type.as_str()),
            OperationKind::Mutation => self.mutation_type.as_deref(),
        };
        root.and_then(|root| self.types.get(root))
            .and_then(|t| match &t.kind {
                TypeKind::Object(fields) => fields.iter().find(|f| f.name == name),
                _ => None,
            })
            .ok_or_else(|| GenError::UnknownOperation {
                kind,
                name: name.to_string(),
            })
    }

    pub fn from_sdl(src: &str) -> anyhow::Result<Self> {
        let doc: Document<String> =
            graphql_parser::parse_schema(src).map_err(|e| anyhow::anyhow!("parse error: {e}"))?;

        let mut query_type = "Query".to_string();
        let mut mutation_type = "Mutation".to_string();
        let mut types = builtin_scalars();
        let mut extensions = Vec::new();

        for def in doc.definitions {
            match def {
                Definition::SchemaDefinition(schema) => {
                    if let Some(q) = schema.query {
                        query_type = q;
                    }
                    if let Some(m) = schema.mutation {
                        mutation_type = m;
                    }
                }
                Definition::TypeDefinition(def) => {
                    let named = named_type_from_sdl(def);
                    types.insert(named.name.clone(), named);
                }
                Definition::TypeExtension(ext) => extensions.push(ext),
                Definition::DirectiveDefinition(_) => {}
            }
        }
        // Extensions may appear before the type they extend.
        for ext in extensions {
            extend_type(&mut types, ext);
        }

        let mutation_type = types.contains_key(&mutation_type).then_some(mutation_type);
        Ok(Self {
            query_type,
            mutation_type,
            types,
        })
    }

    /// Accepts a full introspection response (`{"data": {"__schema": …}}`)
    /// or the bare `__schema` object.
    pub fn from_introspection(value: &Value) -> anyhow::Result<Self> {
        let raw = value
            .pointer("/data/__schema")
            .or_else(|| value.get("__schema"))
            .unwrap_or(value);
        let raw: IntrospectionSchema =
            serde_json::from_value(raw.clone()).context("unexpected introspection shape")?;

        let mut types = builtin_scalars();
        for t in raw.types {
            if t.name.starts_with("__") {
                continue;
            }
            let named = t.into_named_type()?;
            types.insert(named.name.clone(), named);
        }

        Ok(Self {
            query_type: raw
                .query_type
                .map(|t| t.name)
                .unwrap_or_else(|| "Query".to_string()),
            mutation_type: raw.mutation_type.map(|t| t.name),
            types,
        })
    }
}

fn builtin_scalars() -> BTreeMap<String, NamedType> {
    BUILTIN_SCALARS
        .iter()
        .map(|name| {
            (
                name.to_string(),
                NamedType {
                    name: name.to_string(),
                    description: None,
                    kind: TypeKind::Scalar,
                },
            )
        })
        .collect()
}

fn type_ref_from_sdl(ty: &Type<String>) -> TypeRef {
    match ty {
        Type::NamedType(n) => TypeRef::Named(n.clone()),
        Type::ListType(inner) => TypeRef::list(type_ref_from_sdl(inner)),
        Type::NonNullType(inner) => TypeRef::non_null(type_ref_from_sdl(inner)),
    }
}

fn input_values_from_sdl(values: Vec<graphql_parser::schema::InputValue<String>>) -> Vec<InputValue> {
    values
        .into_iter()
        .map(|v| InputValue {
            ty: type_ref_from_sdl(&v.value_type),
            name: v.name,
            description: v.description,
        })
        .collect()
}

fn fields_from_sdl(fields: Vec<graphql_parser::schema::Field<String>>) -> Vec<FieldDef> {
    fields
        .into_iter()
        .map(|f| FieldDef {
            ty: type_ref_from_sdl(&f.field_type),
            args: input_values_from_sdl(f.arguments),
            name: f.name,
            description: f.description,
        })
        .collect()
}

fn named_type_from_sdl(def: TypeDefinition<String>) -> NamedType {
    match def {
        TypeDefinition::Scalar(s) => NamedType {
            name: s.name,
            description: s.description,
            kind: TypeKind::Scalar,
        },
        TypeDefinition::Object(o) => NamedType {
            name: o.name,
            description: o.description,
            kind: TypeKind::Object(fields_from_sdl(o.fields)),
        },
        TypeDefinition::Interface(i) => NamedType {
            name: i.name,
            description: i.description,
            kind: TypeKind::Interface(fields_from_sdl(i.fields)),
        },
        TypeDefinition::Union(u) => NamedType {
            name: u.name,
            description: u.description,
            kind: TypeKind::Union(u.types),
        },
        TypeDefinition::Enum(e) => NamedType {
            name: e.name,
            description: e.description,
            kind: TypeKind::Enum(e.values.into_iter().map(|v| v.name).collect()),
        },
        TypeDefinition::InputObject(i) => NamedType {
            name: i.name,
            description: i.description,
            kind: TypeKind::InputObject(input_values_from_sdl(i.fields)),
        },
    }
}

/// Appends the members of an `extend` definition to the declared type.
fn extend_type(types: &mut BTreeMap<String, NamedType>, ext: TypeExtension<String>) {
    let (name, added) = match ext {
        TypeExtension::Scalar(s) => (s.name, None),
        TypeExtension::Object(o) => (o.name, Some(TypeKind::Object(fields_from_sdl(o.fields)))),
        TypeExtension::Interface(i) => (i.name, Some(TypeKind::Interface(fields_from_sdl(i.fields)))),
        TypeExtension::Union(u) => (u.name, Some(TypeKind::Union(u.types))),
        TypeExtension::Enum(e) => (
            e.name,
            Some(TypeKind::Enum(e.values.into_iter().map(|v| v.name).collect())),
        ),
        TypeExtension::InputObject(i) => (
            i.name,
            Some(TypeKind::InputObject(input_values_from_sdl(i.fields))),
        ),
    };
    let Some(added) = added else {
        return;
    };
    let Some(target) = types.get_mut(&name) else {
        tracing::warn!(type_name = %name, "ignoring extension of undeclared type");
        return;
    };
    match (&mut target.kind, added) {
        (TypeKind::Object(fields), TypeKind::Object(more))
        | (TypeKind::Interface(fields), TypeKind::Interface(more)) => fields.extend(more),
        (TypeKind::Union(names), TypeKind::Union(more))
        | (TypeKind::Enum(names), TypeKind::Enum(more)) => names.extend(more),
        (TypeKind::InputObject(fields), TypeKind::InputObject(more)) => fields.extend(more),
        _ => tracing::warn!(type_name = %name, "ignoring extension of a different kind"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionSchema {
    query_type: Option<IntrospectionName>,
    mutation_type: Option<IntrospectionName>,
    types: Vec<IntrospectionType>,
}

#[derive(Debug, Deserialize)]
struct IntrospectionName {
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum IntrospectionKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionType {
    kind: IntrospectionKind,
    name: String,
    description: Option<String>,
    fields: Option<Vec<IntrospectionField>>,
    input_fields: Option<Vec<IntrospectionInputValue>>,
    enum_values: Option<Vec<IntrospectionName>>,
    possible_types: Option<Vec<IntrospectionTypeRef>>,
}

#[derive(Debug, Deserialize)]
struct IntrospectionField {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    ty: IntrospectionTypeRef,
}

#[derive(Debug, Deserialize)]
struct IntrospectionInputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    ty: IntrospectionTypeRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionTypeRef {
    kind: IntrospectionKind,
    name: Option<String>,
    of_type: Option<Box<IntrospectionTypeRef>>,
}

impl IntrospectionTypeRef {
    fn to_type_ref(&self) -> anyhow::Result<TypeRef> {
        match self.kind {
            IntrospectionKind::List | IntrospectionKind::NonNull => {
                let inner = self
                    .of_type
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("wrapper type without ofType"))?
                    .to_type_ref()?;
                Ok(if self.kind == IntrospectionKind::List {
                    TypeRef::list(inner)
                } else {
                    TypeRef::non_null(inner)
                })
            }
            _ => self
                .name
                .clone()
                .map(TypeRef::Named)
                .ok_or_else(|| anyhow::anyhow!("named type reference without a name")),
        }
    }
}

impl IntrospectionInputValue {
    fn into_input_value(self) -> anyhow::Result<InputValue> {
        Ok(InputValue {
            ty: self
                .ty
                .to_type_ref()
                .with_context(|| format!("in input value `{}`", self.name))?,
            name: self.name,
            description: self.description,
        })
    }
}

impl IntrospectionType {
    fn into_named_type(self) -> anyhow::Result<NamedType> {
        let name = self.name;
        let kind = match self.kind {
            IntrospectionKind::Scalar => TypeKind::Scalar,
            IntrospectionKind::Object | IntrospectionKind::Interface => {
                let mut fields = Vec::new();
                for f in self.fields.unwrap_or_default() {
                    let args = f
                        .args
                        .into_iter()
                        .map(IntrospectionInputValue::into_input_value)
                        .collect::<anyhow::Result<Vec<_>>>()?;
                    fields.push(FieldDef {
                        ty: f
                            .ty
                            .to_type_ref()
                            .with_context(|| format!("in field `{name}.{}`", f.name))?,
                        args,
                        name: f.name,
                        description: f.description,
                    });
                }
                if self.kind == IntrospectionKind::Object {
                    TypeKind::Object(fields)
                } else {
                    TypeKind::Interface(fields)
                }
            }
            IntrospectionKind::Union => TypeKind::Union(
                self.possible_types
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|t| t.name)
                    .collect(),
            ),
            IntrospectionKind::Enum => TypeKind::Enum(
                self.enum_values
                    .unwrap_or_default()
                    .into_iter()
                    .map(|v| v.name)
                    .collect(),
            ),
            IntrospectionKind::InputObject => TypeKind::InputObject(
                self.input_fields
                    .unwrap_or_default()
                    .into_iter()
                    .map(IntrospectionInputValue::into_input_value)
                    .collect::<anyhow::Result<Vec<_>>>()?,
            ),
            IntrospectionKind::List | IntrospectionKind::NonNull => {
                anyhow::bail!("type `{name}` is a wrapper kind at the top level")
            }
        };
        Ok(NamedType {
            name,
            description: self.description,
            kind,
        })
    }
}
