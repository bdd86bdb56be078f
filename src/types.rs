use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::GenError;

/// Field type labels understood by the Zapier platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Text,
    Integer,
    Number,
    Boolean,
    Datetime,
    File,
    Password,
    Copy,
    Code,
}

impl FieldType {
    /// Values of these types are sent as quoted GraphQL string literals.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            FieldType::String
                | FieldType::Text
                | FieldType::Password
                | FieldType::Code
                | FieldType::Datetime
                | FieldType::File
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
            FieldType::File => "file",
            FieldType::Password => "password",
            FieldType::Copy => "copy",
            FieldType::Code => "code",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OperationKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(OperationKind::Query),
            "mutation" => Ok(OperationKind::Mutation),
            other => Err(GenError::InvalidOperationKind(other.to_string())),
        }
    }
}

/// The kind of Zapier action being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Trigger,
    Search,
    Create,
}

impl ActionType {
    pub fn operation_kind(self) -> OperationKind {
        match self {
            ActionType::Trigger | ActionType::Search => OperationKind::Query,
            ActionType::Create => OperationKind::Mutation,
        }
    }

    /// Key of the entry-file object the action is registered under. Also the
    /// directory generated modules live in.
    pub fn section(self) -> &'static str {
        match self {
            ActionType::Trigger => "triggers",
            ActionType::Search => "searches",
            ActionType::Create => "creates",
        }
    }

    /// Zapier expects triggers and searches to resolve to arrays.
    pub fn returns_list(self) -> bool {
        matches!(self, ActionType::Trigger | ActionType::Search)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Trigger => "trigger",
            ActionType::Search => "search",
            ActionType::Create => "create",
        };
        write!(f, "{s}")
    }
}
