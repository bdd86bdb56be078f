//! Resolution of GraphQL type references into [`TypeDetails`].
//!
//! Depth is tracked in one place only: [`Resolver::resolve_with_children`]
//! expands object and input types while `depth < MAX_FIELD_DEPTH`. Every
//! consumer downstream walks the already truncated tree, so self-referential
//! types terminate without any visited-set bookkeeping.

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::GenError;
use crate::schema::{NamedType, Schema, TypeKind, TypeRef};
use crate::types::FieldType;

/// Zapier accepts flat fields or a single level of children.
pub const MAX_FIELD_DEPTH: usize = 1;

/// One resolved type position.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDetails {
    pub field_name: Option<String>,
    /// Innermost named type after stripping list and non-null wrappers.
    pub type_name: String,
    pub scalar_type: Option<FieldType>,
    pub is_list: bool,
    pub is_required: bool,
    pub description: Option<String>,
    pub enum_values: Vec<String>,
    pub children: IndexMap<String, TypeDetails>,
}

impl TypeDetails {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    schema: &'a Schema,
    config: &'a Config,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a Schema, config: &'a Config) -> Self {
        Self { schema, config }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn resolve(&self, ty: &TypeRef, field_name: Option<&str>) -> Result<TypeDetails, GenError> {
        let mut is_list = false;
        let mut is_required = false;
        let mut current = ty;
        let type_name = loop {
            match current {
                TypeRef::List(inner) => {
                    is_list = true;
                    current = &**inner;
                }
                TypeRef::NonNull(inner) => {
                    is_required = true;
                    current = &**inner;
                }
                TypeRef::Named(name) => break name,
            }
        };
        let field = || field_name.unwrap_or(type_name.as_str()).to_string();

        let named = self
            .schema
            .get(type_name)
            .ok_or_else(|| GenError::UnresolvedType {
                type_name: type_name.clone(),
                field: field(),
            })?;

        let (scalar_type, enum_values) = match &named.kind {
            TypeKind::Scalar => {
                let mapped = self.config.scalar_map.get(type_name).copied().ok_or_else(|| {
                    GenError::UnmappedScalarType {
                        type_name: type_name.clone(),
                        field: field(),
                    }
                })?;
                (Some(mapped), Vec::new())
            }
            TypeKind::Enum(values) => (Some(FieldType::String), values.clone()),
            TypeKind::Object(_)
            | TypeKind::Interface(_)
            | TypeKind::InputObject(_)
            | TypeKind::Union(_) => (None, Vec::new()),
        };

        Ok(TypeDetails {
            field_name: field_name.map(str::to_string),
            type_name: type_name.clone(),
            scalar_type,
            is_list,
            is_required,
            description: named.description.clone(),
            enum_values,
            children: IndexMap::new(),
        })
    }

    /// Resolves `ty` and, below [`MAX_FIELD_DEPTH`], every declared field of
    /// an object or input type. A field's own description replaces the
    /// description of its type.
    pub fn resolve_with_children(
        &self,
        ty: &TypeRef,
        field_name: Option<&str>,
        depth: usize,
    ) -> Result<TypeDetails, GenError> {
        let mut details = self.resolve(ty, field_name)?;
        if depth >= MAX_FIELD_DEPTH {
            return Ok(details);
        }

        let Some(members) = self
            .schema
            .get(&details.type_name)
            .and_then(NamedType::members)
        else {
            return Ok(details);
        };

        for member in members {
            let mut child = self.resolve_with_children(member.ty, Some(member.name), depth + 1)?;
            if let Some(description) = member.description {
                child.description = Some(description.to_string());
            }
            details.children.insert(member.name.to_string(), child);
        }
        Ok(details)
    }
}
