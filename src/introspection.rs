use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::ops;
use crate::schema::Schema;

/// Where the schema comes from.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Live endpoint, queried with the introspection query.
    Http {
        url: String,
        headers: IndexMap<String, String>,
    },
    /// `.json` files hold an introspection result; anything else is SDL.
    File(PathBuf),
}

pub fn load_schema(source: &SchemaSource) -> anyhow::Result<Schema> {
    match source {
        SchemaSource::File(path) => {
            tracing::debug!(path = %path.display(), "reading schema file");
            let s = fs::read_to_string(path)
                .with_context(|| format!("failed to read schema {}", path.display()))?;
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json {
                let value: Value = serde_json::from_str(&s)
                    .with_context(|| format!("{} is not valid JSON", path.display()))?;
                Schema::from_introspection(&value)
            } else {
                Schema::from_sdl(&s).with_context(|| format!("in {}", path.display()))
            }
        }
        SchemaSource::Http { url, headers } => {
            let body = introspect(url, headers)?;
            Schema::from_introspection(&body)
        }
    }
}

fn introspect(url: &str, headers: &IndexMap<String, String>) -> anyhow::Result<Value> {
    tracing::info!(%url, "introspecting schema");
    let http = reqwest::blocking::Client::new();
    let mut req = http.post(url).json(&json!({
        "operationName": ops::INTROSPECTION_OPERATION,
        "query": ops::INTROSPECTION,
        "variables": {}
    }));
    for (name, value) in headers {
        req = req.header(name.as_str(), value.as_str());
    }

    let resp = req
        .send()
        .with_context(|| format!("introspection request to {url} failed"))?;
    let status = resp.status();
    let text = resp.text().context("failed to read introspection response")?;
    let body: Value = match serde_json::from_str(&text) {
        Ok(body) => body,
        Err(_) if !status.is_success() => anyhow::bail!("graphql http error {status}"),
        Err(e) => return Err(e).context("introspection response is not JSON"),
    };

    if let Some(msg) = format_graphql_error(&body) {
        anyhow::bail!("{msg}");
    }
    if !status.is_success() {
        anyhow::bail!("graphql http error {status}");
    }
    Ok(body)
}

pub(crate) fn format_graphql_error(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    let first = errors.first()?;
    let message = first.get("message").and_then(|m| m.as_str()).unwrap_or("");
    let code = first
        .get("extensions")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str());

    if message.is_empty() && code.is_none() {
        return None;
    }

    let mut out = String::from("graphql error");
    if let Some(c) = code {
        out.push_str(&format!(" ({c})"));
    }
    if !message.is_empty() {
        out.push_str(&format!(": {message}"));
    }
    Some(out)
}
