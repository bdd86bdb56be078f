//! Generates Zapier platform actions (triggers, searches and creates) from a
//! GraphQL schema.
//!
//! [`generate::generate`] is the entry point: it resolves a root field,
//! builds the Zapier field models, and synthesises the GraphQL document and
//! sample data. [`action`] renders the result as JavaScript and
//! [`scaffold`] writes it into a project.

pub mod action;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod fields;
pub mod generate;
pub mod introspection;
pub mod ops;
pub mod resolve;
pub mod sample;
pub mod scaffold;
pub mod schema;
pub mod types;

#[cfg(test)]
mod testing;
