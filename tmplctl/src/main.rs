//! # tmplctl
//!
//! Command-line front end for settings templates: check a template, dump what
//! it resolves to, export its defaults, or replay value changes through the
//! synchronization engine.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use env_logger::Env;
use serde_json::Value;
use tmplsync::{Dispatcher, Engine, EngineConfig, Template};

#[macro_use]
extern crate log;

mod report;

#[derive(Parser)]
#[command(name = "tmplctl")]
#[command(about = "Check settings templates and replay value changes")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report construction errors and warnings of a template
    Check {
        /// Template file (.json or .toml)
        template: PathBuf,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Print the resolved settings and groups
    Dump {
        /// Template file (.json or .toml)
        template: PathBuf,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Print the template defaults as a config document
    Export {
        /// Template file (.json or .toml)
        template: PathBuf,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value_t = Format::Toml)]
        format: Format,
    },

    /// Replay value changes in order and print every update
    #[command(after_help = "\
Examples:
  tmplctl set settings.toml General.autosave=true
  tmplctl set settings.json Process.maxThreads=0 Appearance.theme=Dark --cascade")]
    Set {
        /// Template file (.json or .toml)
        template: PathBuf,

        /// Changes as PATH=VALUE; VALUE is read as JSON, or as a plain string
        #[arg(required = true, value_name = "PATH=VALUE")]
        changes: Vec<String>,

        /// Engine configuration file (.json or .toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Re-submit changes of nested group parents
        #[arg(long)]
        cascade: bool,
    },

    /// Print the JSON Schema of the engine configuration file
    EngineSchema,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn ext(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Check { template, strict } => {
            let checked = Template::from_path(&template)?;
            report::print_diagnostics(&template, &checked);
            let failed = !checked.is_ok() || (strict && !checked.warnings.is_empty());
            Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Dump { template, format } => {
            let template = load(&template)?;
            let value = report::dump_value(&template)?;
            println!("{}", report::render(value, format.ext())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Export { template, format } => {
            let template = load(&template)?;
            let engine = Engine::new(template, Dispatcher::new(), EngineConfig::default());
            println!("{}", report::render(engine.config_json(), format.ext())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Set {
            template,
            changes,
            config,
            cascade,
        } => {
            let template = load(&template)?;
            let config = match config {
                Some(path) => EngineConfig::from_path(&path)
                    .with_context(|| format!("loading engine config {}", path.display()))?,
                None => EngineConfig::default(),
            };
            let dispatcher = pass_through(&template);
            let mut engine = Engine::new(template, dispatcher, config);
            replay(&mut engine, &changes, cascade)
        }
        Commands::EngineSchema => {
            let schema = schemars::schema_for!(EngineConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load a template, refusing one with construction errors.
fn load(path: &Path) -> anyhow::Result<Template> {
    let checked = Template::from_path(path)?;
    if !checked.is_ok() {
        report::print_diagnostics(path, &checked);
        bail!(
            "{} has {} construction error(s), run `tmplctl check` for details",
            path.display(),
            checked.errors.len()
        );
    }
    for warning in &checked.warnings {
        warn!("{warning}");
    }
    Ok(checked.value)
}

/// Callables are host code; accept every value and do nothing.
fn pass_through(template: &Template) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    for (_, setting) in template.settings().iter() {
        for name in &setting.validators {
            if !dispatcher.has_validator(&name.0) {
                debug!("validator `{name}` replaced by a pass-through");
                dispatcher.register_validator(name.0.clone(), |_: &Value| Ok(()));
            }
        }
        for name in &setting.actions {
            if !dispatcher.has_action(&name.0) {
                debug!("action `{name}` replaced by a pass-through");
                dispatcher.register_action(name.0.clone(), |_: &Value| Ok(()));
            }
        }
    }
    dispatcher
}

fn replay(engine: &mut Engine, changes: &[String], cascade: bool) -> anyhow::Result<ExitCode> {
    let mut code = ExitCode::SUCCESS;
    for change in changes {
        let Some((path, raw)) = change.split_once('=') else {
            bail!("expected PATH=VALUE, got `{change}`");
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        let result = if cascade {
            engine.on_value_changed_cascading(path, value)
        } else {
            engine.on_value_changed(path, value)
        };
        match result {
            Ok(outcome) => report::print_outcome(change, &outcome),
            Err(e) => {
                println!("{} {change}: {e}", "rejected".red().bold());
                code = ExitCode::FAILURE;
            }
        }
    }
    Ok(code)
}
