//! Minimal CLI: learn → profile report, get → field value
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use camel_snake_struct::{emit_profile, Field, Schema, Settings, StructType, TypeId};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// read JSON through camelCase/snake_case accessors and learn per-field type profiles
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// learn a named type from example documents and print its type profile
    Learn(LearnOut),
    /// read a dotted accessor path from each document
    Get(GetOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// name-resolution settings (.json); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct LearnOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// name of the learned top-level type
    #[arg(long, default_value = "Root")]
    type_name: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// print a human-readable summary instead of JSON
    #[arg(long)]
    summary: bool,
}

#[derive(clap::Parser, Debug)]
struct GetOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// dotted accessor path; numeric segments index lists (e.g. data.0.user_name)
    #[arg(long, short)]
    path: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn settings(&self) -> Result<Settings> {
        match self.config.as_ref() {
            Some(path) => Settings::load(path).with_context(|| format!("loading {}", path.display())),
            None => Ok(Settings::default()),
        }
    }

    fn load_process(&self, mut apply: impl FnMut(Value) -> Result<()>) -> Result<()> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        for source_path in source_paths {
            for document in self.read_documents(&source_path)? {
                let Some(document) = self.select(document) else {
                    tracing::warn!(path = %source_path.display(), "json pointer matched nothing");
                    continue;
                };
                match self.jq_expr.as_ref() {
                    None => apply(document)?,
                    Some(jq_expr) => {
                        let outputs = crate::jq_exec::run_filter(jq_expr, &document).with_context(|| {
                            format!("applying jq expression to {}", source_path.display())
                        })?;
                        for output in outputs {
                            apply(output)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn read_documents(&self, source_path: &Path) -> Result<Vec<Value>> {
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read source file {}", source_path.display()))?;
        if !self.ndjson {
            let value = serde_json::from_str(&source)
                .with_context(|| format!("failed to parse JSON source file {}", source_path.display()))?;
            return Ok(vec![value]);
        }
        source
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(ix, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("failed to parse line {} of {}", ix + 1, source_path.display()))
            })
            .collect()
    }

    fn select(&self, document: Value) -> Option<Value> {
        match self.json_pointer.as_deref() {
            None => Some(document),
            Some(pointer) => document.pointer(pointer).cloned(),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Learn(target) => {
                let schema = Schema::with_settings(target.input_settings.settings()?);
                let ty = schema.declare(&target.type_name);

                let mut learned = 0usize;
                target.input_settings.load_process(|value| {
                    match value {
                        Value::Object(map) => {
                            ty.example(map)?;
                            learned += 1;
                        }
                        other => tracing::warn!(kind = %kind_of(&other), "skipping non-object document"),
                    }
                    Ok(())
                })?;
                tracing::info!(documents = learned, type_name = %target.type_name, "learned examples");

                let id = ty.id().context("learned type has no id")?;
                let output = if target.summary {
                    render_summary(&schema, id)
                } else {
                    let report = emit_profile(&schema, id).context("learned type missing from schema")?;
                    serde_json::to_string_pretty(&report)?
                };
                write_output(target.out.as_deref(), &output)
            }
            Command::Get(target) => {
                let schema = Schema::with_settings(target.input_settings.settings()?);
                let root = schema.root();
                let path: Vec<&str> = target.path.split('.').filter(|s| !s.is_empty()).collect();
                if path.is_empty() {
                    bail!("empty accessor path");
                }
                target.input_settings.load_process(|value| {
                    let result = read_path(root, value, &path)?;
                    println!("{}", serde_json::to_string(&result)?);
                    Ok(())
                })
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_path(root: StructType<'_>, document: Value, path: &[&str]) -> Result<Value> {
    let instance = root.from_value(document);
    resolve_path(&Field::Struct(instance), path)
}

fn resolve_path(field: &Field<'_>, path: &[&str]) -> Result<Value> {
    let Some((segment, rest)) = path.split_first() else {
        return Ok(field.to_value());
    };
    if let (Ok(index), Some(items)) = (segment.parse::<usize>(), field.as_list()) {
        return match items.get(index) {
            Some(item) => resolve_path(item, rest),
            None => Ok(Value::Null),
        };
    }
    let next = field.get(segment)?;
    resolve_path(&next, rest)
}

fn render_summary(schema: &Schema, id: TypeId) -> String {
    let mut out = String::new();
    let mut pending = vec![id];
    while let Some(id) = pending.pop() {
        let Some(ty) = schema.named_type(id) else {
            continue;
        };
        out.push_str(&format!("{}\n", ty.name.bold()));
        for (name, field) in ty.profile.iter() {
            let labels: Vec<String> = field.categories().iter().map(|c| c.label(schema)).collect();
            let array = if field.is_array() { " []".yellow().to_string() } else { String::new() };
            out.push_str(&format!("  {}: {}{}\n", name.cyan(), labels.join(" | "), array));
        }
        pending.extend(ty.subtypes.values().rev());
    }
    out
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, contents).with_context(|| format!("writing {}", out.display()))
        }
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern {pattern}"))? {
            out.push(entry?);
        }
        if out.len() == before {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}
