use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenError;
use crate::types::FieldType;

pub const CONFIG_FILE_NAME: &str = ".zapiergraphql.json";

/// Generator settings. Built once per run and passed by reference to every
/// stage; nothing mutates it after [`Config::validate`] succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub request: RequestConfig,
    pub scalar_map: IndexMap<String, FieldType>,
    pub id_map: IndexMap<String, String>,
    pub sort_fields: bool,
    pub sample_field_values: SampleFieldValues,
    pub test_bundle: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestConfig {
    /// Name of the environment variable holding the API URL.
    pub url_env_var: String,
    pub headers: IndexMap<String, String>,
}

/// Configured sample values, matched case-insensitively against field keys.
/// Within each map the first matching entry in declaration order wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SampleFieldValues {
    pub exact: IndexMap<String, Value>,
    pub starting_with: IndexMap<String, Value>,
    pub ending_with: IndexMap<String, Value>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            url_env_var: "API_URL".to_string(),
            headers,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let scalar_map = [
            ("String", FieldType::String),
            ("ID", FieldType::String),
            ("Int", FieldType::Integer),
            ("Float", FieldType::Number),
            ("Boolean", FieldType::Boolean),
            ("Date", FieldType::Datetime),
            ("DateTime", FieldType::Datetime),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            request: RequestConfig::default(),
            scalar_map,
            id_map: IndexMap::new(),
            sort_fields: true,
            sample_field_values: SampleFieldValues::default(),
            test_bundle: serde_json::json!({ "authData": {}, "inputData": {} }),
        }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(s).context("config is not valid JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GenError> {
        if !is_env_var_name(&self.request.url_env_var) {
            return Err(GenError::InvalidConfig(format!(
                "request.urlEnvVar `{}` is not a valid environment variable name",
                self.request.url_env_var
            )));
        }

        for (type_name, field) in &self.id_map {
            if field.trim().is_empty() {
                return Err(GenError::InvalidConfig(format!(
                    "idMap entry for `{type_name}` has an empty field name"
                )));
            }
        }

        let samples = &self.sample_field_values;
        for (pattern, value) in samples
            .exact
            .iter()
            .chain(&samples.starting_with)
            .chain(&samples.ending_with)
        {
            if !matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
                return Err(GenError::InvalidConfig(format!(
                    "sample value for `{pattern}` must be a string, number or boolean"
                )));
            }
        }

        if !self.test_bundle.is_object() {
            return Err(GenError::InvalidConfig(
                "testBundle must be a JSON object".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_env_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE_NAME)
}

/// Loads the config at `path`, falling back to defaults when the file does
/// not exist.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = Config::from_json_str(&s)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut s = serde_json::to_string_pretty(config)?;
    s.push('\n');
    fs::write(path, s).with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = Config::from_json_str(r#"{"idMap": {"Dragon": "dragon_id"}}"#).unwrap();
        assert_eq!(config.request.url_env_var, "API_URL");
        assert_eq!(config.scalar_map.get("Int"), Some(&FieldType::Integer));
        assert_eq!(config.id_map.get("Dragon").map(String::as_str), Some("dragon_id"));
        assert!(config.sort_fields);
    }

    #[test]
    fn scalar_map_replaces_defaults() {
        let config = Config::from_json_str(r#"{"scalarMap": {"uuid": "string"}}"#).unwrap();
        assert_eq!(config.scalar_map.len(), 1);
        assert!(config.scalar_map.get("String").is_none());
    }

    #[test]
    fn sample_values_keep_declaration_order() {
        let config = Config::from_json_str(
            r#"{"sampleFieldValues": {"startingWith": {"zeta": 1, "alpha": 2, "mid": 3}}}"#,
        )
        .unwrap();
        let keys: Vec<_> = config
            .sample_field_values
            .starting_with
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_bad_env_var_name() {
        let err = Config::from_json_str(r#"{"request": {"urlEnvVar": "1-url"}}"#).unwrap_err();
        assert!(format!("{err:#}").contains("urlEnvVar"));
    }

    #[test]
    fn rejects_structured_sample_values() {
        let err =
            Config::from_json_str(r#"{"sampleFieldValues": {"exact": {"tags": ["a"]}}}"#)
                .unwrap_err();
        assert!(format!("{err:#}").contains("tags"));
    }

    #[test]
    fn rejects_unknown_field_type() {
        assert!(Config::from_json_str(r#"{"scalarMap": {"uuid": "guid"}}"#).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = config_path(&tmp.path().join("project"));
        let mut config = Config::default();
        config.sort_fields = false;
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }
}
