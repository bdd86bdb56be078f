use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Cell;
use serde::Serialize;

use crate::action;
use crate::config::{Config, config_path, load_config, save_config};
use crate::generate::generate;
use crate::introspection::{SchemaSource, load_schema};
use crate::scaffold::{ActionPaths, write_action};
use crate::schema::Schema;
use crate::types::{ActionType, OperationKind};

mod describe;
mod render;
use render::{KeyValueRow, TableRow, render_output};

#[derive(Debug, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "zapier-graphql")]
#[command(about = "Generate Zapier triggers, searches and creates from a GraphQL schema", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub output: OutputFormat,

    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Print generated files instead of writing them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Root of the Zapier integration (where `index.js` lives).
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Config file (defaults to `.zapiergraphql.json` in the project dir).
    #[arg(long, global = true, env = "ZAPIER_GRAPHQL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read the schema from a file instead of introspecting the API.
    /// `.json` files are introspection results, anything else is SDL.
    #[arg(long, global = true, env = "ZAPIER_GRAPHQL_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// GraphQL endpoint. Defaults to the variable named by `request.urlEnvVar`.
    #[arg(long, global = true)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write a default config file.
    Init(InitArgs),
    /// Generate a trigger from a query.
    Trigger(OperationArgs),
    /// Generate a search from a query.
    Search(OperationArgs),
    /// Generate a create from a mutation.
    Create(OperationArgs),
    /// Show the Zapier fields an operation maps to.
    Describe(DescribeArgs),
    Version,
}

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct OperationArgs {
    /// Root field name, e.g. `dragons`.
    pub name: String,
}

#[derive(Debug, Clone, Args)]
pub struct DescribeArgs {
    #[arg(value_enum)]
    pub kind: OperationKind,
    pub name: String,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Version => {
            println!("zapier-graphql {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Init(args) => run_init(&cli, args),
        Command::Trigger(args) => run_generate(&cli, ActionType::Trigger, &args.name),
        Command::Search(args) => run_generate(&cli, ActionType::Search, &args.name),
        Command::Create(args) => run_generate(&cli, ActionType::Create, &args.name),
        Command::Describe(args) => describe::run_describe(&cli, args),
    }
}

impl TableRow for KeyValueRow {
    const HEADERS: &'static [&'static str] = &["key", "value"];

    fn cells(&self) -> Vec<Cell> {
        vec![Cell::new(&self.key), Cell::new(&self.value)]
    }
}

fn should_color(cli: &Cli) -> bool {
    match cli.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

fn config_file(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .unwrap_or_else(|| config_path(&cli.project_dir))
}

fn run_init(cli: &Cli, args: &InitArgs) -> anyhow::Result<()> {
    let path = config_file(cli);
    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    let config = Config::default();
    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    save_config(&path, &config)?;
    tracing::info!(path = %path.display(), "wrote config");
    render_output(
        cli,
        vec![KeyValueRow {
            key: "config".to_string(),
            value: path.display().to_string(),
        }],
    )
}

fn schema_source(cli: &Cli, config: &Config) -> anyhow::Result<SchemaSource> {
    if let Some(path) = &cli.schema {
        return Ok(SchemaSource::File(path.clone()));
    }
    let url = match &cli.url {
        Some(url) => url.clone(),
        None => {
            let var = &config.request.url_env_var;
            std::env::var(var).with_context(|| {
                format!("no schema source: pass --schema or --url, or set {var}")
            })?
        }
    };
    Ok(SchemaSource::Http {
        url,
        headers: config.request.headers.clone(),
    })
}

fn load_inputs(cli: &Cli) -> anyhow::Result<(Config, Schema)> {
    let config = load_config(&config_file(cli))?;
    let schema = load_schema(&schema_source(cli, &config)?)?;
    Ok((config, schema))
}

fn run_generate(cli: &Cli, action_type: ActionType, name: &str) -> anyhow::Result<()> {
    let (config, schema) = load_inputs(cli)?;
    let generated = generate(&schema, &config, action_type, name)
        .with_context(|| format!("failed to generate {action_type} `{name}`"))?;
    tracing::debug!(key = %generated.key, "generated action");

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let rendered = action::render(&generated, &config, &timestamp)?;

    if cli.dry_run {
        let paths = ActionPaths::new(&cli.project_dir, action_type, &rendered.key);
        println!("// {}", paths.module.display());
        println!("{}", rendered.module);
        println!("// {}", paths.test.display());
        print!("{}", rendered.test);
        return Ok(());
    }

    let written = write_action(&cli.project_dir, &rendered)?;
    let rows = written
        .into_iter()
        .map(|path| KeyValueRow {
            key: "written".to_string(),
            value: path.display().to_string(),
        })
        .collect::<Vec<_>>();
    render_output(cli, rows)
}
