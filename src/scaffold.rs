use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::action::{RenderedAction, module_ident};
use crate::types::ActionType;

pub const ENTRY_FILE: &str = "index.js";

/// Where an action's module and test live inside a Zapier project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPaths {
    pub module: PathBuf,
    pub test: PathBuf,
}

impl ActionPaths {
    pub fn new(project_dir: &Path, action_type: ActionType, key: &str) -> Self {
        let section = action_type.section();
        Self {
            module: project_dir.join(section).join(format!("{key}.js")),
            test: project_dir
                .join("test")
                .join(section)
                .join(format!("{key}.test.js")),
        }
    }
}

/// Writes the module and test, replacing existing files, and registers the
/// action in the entry file when the project has one. Returns every path
/// that was written.
pub fn write_action(project_dir: &Path, rendered: &RenderedAction) -> anyhow::Result<Vec<PathBuf>> {
    let paths = ActionPaths::new(project_dir, rendered.action_type, &rendered.key);
    write_file(&paths.module, &rendered.module)?;
    write_file(&paths.test, &rendered.test)?;
    let mut written = vec![paths.module, paths.test];

    let entry = project_dir.join(ENTRY_FILE);
    if !entry.exists() {
        tracing::warn!(path = %entry.display(), "entry file not found, action not registered");
        return Ok(written);
    }
    let source = fs::read_to_string(&entry)
        .with_context(|| format!("failed to read {}", entry.display()))?;
    let updated = register_action(&source, rendered.action_type, &rendered.key)
        .with_context(|| format!("failed to register action in {}", entry.display()))?;
    if updated != source {
        fs::write(&entry, updated)
            .with_context(|| format!("failed to write {}", entry.display()))?;
        tracing::info!(path = %entry.display(), key = %rendered.key, "registered action");
        written.push(entry);
    }
    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Adds the `require` for the action and its entry in the matching section
/// object. Running it again on its own output changes nothing.
pub fn register_action(entry_source: &str, action_type: ActionType, key: &str) -> anyhow::Result<String> {
    let section = action_type.section();
    let ident = module_ident(action_type, key);
    let require_line = format!("const {ident} = require('./{section}/{key}');");
    let entry_line = format!("[{ident}.key]: {ident},");

    let mut lines: Vec<String> = entry_source.lines().map(str::to_string).collect();

    if !lines.iter().any(|l| l.trim() == require_line) {
        let exports = lines
            .iter()
            .position(|l| l.contains("module.exports"))
            .unwrap_or(lines.len());
        let at = lines[..exports]
            .iter()
            .rposition(|l| l.contains("require("))
            .map_or(0, |i| i + 1);
        lines.insert(at, require_line);
    }

    if !lines.iter().any(|l| l.trim() == entry_line) {
        let header = lines
            .iter()
            .position(|l| is_section_start(l, section))
            .ok_or_else(|| anyhow::anyhow!("no `{section}` object in entry file"))?;
        let line = lines[header].trim_end().to_string();
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();

        match line.rfind("{}") {
            Some(pos) => {
                lines[header] = format!("{}{{", &line[..pos]);
                lines.insert(header + 1, format!("{indent}  {entry_line}"));
                lines.insert(header + 2, format!("{indent}}}{}", &line[pos + 2..]));
            }
            None => lines.insert(header + 1, format!("{indent}  {entry_line}")),
        }
    }

    let mut out = lines.join("\n");
    if entry_source.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn is_section_start(line: &str, section: &str) -> bool {
    let trimmed = line.trim_start();
    let rest = trimmed
        .strip_prefix(section)
        .or_else(|| {
            trimmed
                .strip_prefix('"')
                .and_then(|r| r.strip_prefix(section))
                .and_then(|r| r.strip_prefix('"'))
        })
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|r| r.strip_prefix(section))
                .and_then(|r| r.strip_prefix('\''))
        });
    rest.map(str::trim_start)
        .is_some_and(|r| r.starts_with(':') && r.contains('{'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = "\
const authentication = require('./authentication');

module.exports = {
  version: require('./package.json').version,
  platformVersion: require('zapier-platform-core').version,
  authentication,
  triggers: {},
  searches: {},
  creates: {
    [existingCreate.key]: existingCreate,
  },
};
";

    #[test]
    fn paths_follow_section_layout() {
        let paths = ActionPaths::new(Path::new("app"), ActionType::Search, "rocket");
        assert_eq!(paths.module, Path::new("app/searches/rocket.js"));
        assert_eq!(paths.test, Path::new("app/test/searches/rocket.test.js"));
    }

    #[test]
    fn registers_into_empty_section() {
        let out = register_action(ENTRY, ActionType::Trigger, "dragons").unwrap();
        assert_eq!(
            out,
            "\
const authentication = require('./authentication');
const dragonsTrigger = require('./triggers/dragons');

module.exports = {
  version: require('./package.json').version,
  platformVersion: require('zapier-platform-core').version,
  authentication,
  triggers: {
    [dragonsTrigger.key]: dragonsTrigger,
  },
  searches: {},
  creates: {
    [existingCreate.key]: existingCreate,
  },
};
"
        );
    }

    #[test]
    fn registers_into_populated_section() {
        let out = register_action(ENTRY, ActionType::Create, "delete_users").unwrap();
        assert!(out.contains(
            "  creates: {\n    [deleteUsersCreate.key]: deleteUsersCreate,\n    [existingCreate.key]: existingCreate,\n  },"
        ));
        assert!(out.contains("const deleteUsersCreate = require('./creates/delete_users');\n"));
    }

    #[test]
    fn registration_is_idempotent() {
        let once = register_action(ENTRY, ActionType::Search, "rocket").unwrap();
        let twice = register_action(&once, ActionType::Search, "rocket").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn same_key_in_two_sections_gets_two_idents() {
        let out = register_action(ENTRY, ActionType::Trigger, "users").unwrap();
        let out = register_action(&out, ActionType::Search, "users").unwrap();
        assert!(out.contains("const usersTrigger = require('./triggers/users');"));
        assert!(out.contains("const usersSearch = require('./searches/users');"));
    }

    #[test]
    fn requires_go_first_without_existing_requires() {
        let src = "module.exports = {\n  triggers: {},\n};\n";
        let out = register_action(src, ActionType::Trigger, "dragons").unwrap();
        assert!(out.starts_with("const dragonsTrigger = require('./triggers/dragons');\nmodule.exports"));
    }

    #[test]
    fn missing_section_is_an_error() {
        let src = "module.exports = {\n  triggers: {},\n};\n";
        let err = register_action(src, ActionType::Create, "ping").unwrap_err();
        assert!(err.to_string().contains("creates"));
    }

    #[test]
    fn write_action_creates_files_and_registers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ENTRY_FILE), ENTRY).unwrap();
        let rendered = RenderedAction {
            action_type: ActionType::Trigger,
            key: "dragons".to_string(),
            module: "module.exports = {};\n".to_string(),
            test: "describe('x', () => {});\n".to_string(),
        };

        let written = write_action(dir.path(), &rendered).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(
            fs::read_to_string(dir.path().join("triggers/dragons.js")).unwrap(),
            rendered.module
        );
        assert!(dir.path().join("test/triggers/dragons.test.js").exists());
        let entry = fs::read_to_string(dir.path().join(ENTRY_FILE)).unwrap();
        assert!(entry.contains("[dragonsTrigger.key]: dragonsTrigger,"));

        // A second run rewrites the files but leaves the entry file alone.
        let written = write_action(dir.path(), &rendered).unwrap();
        assert_eq!(written.len(), 2);
    }

    #[test]
    fn write_action_without_entry_file() {
        let dir = tempfile::tempdir().unwrap();
        let rendered = RenderedAction {
            action_type: ActionType::Create,
            key: "ping".to_string(),
            module: String::new(),
            test: String::new(),
        };
        let written = write_action(dir.path(), &rendered).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("creates/ping.js").exists());
    }
}
