//! CLI tool for schema validation and engine exercise.
//!
//! Loads a schema file (a JSON array of table configs), validates and
//! registers it against a fresh engine, and can run a synthetic CRUD
//! workflow to inspect engine behavior from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use sheet_db_core::schema::{normalize_fields, NormalizedField};
use sheet_db_core::{Database, DbConfig, FieldType, ListOptions, TableConfig};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a schema file and print the normalized table layout
    Validate {
        /// Path to a JSON array of table configs
        schema: PathBuf,
    },
    /// Register the schema and run a synthetic CRUD workflow
    Exercise {
        /// Path to a JSON array of table configs
        schema: PathBuf,
        /// Records to insert per table
        #[arg(long, default_value_t = 5)]
        records: usize,
        /// Database name used for log context
        #[arg(long, default_value = "sheetdb")]
        database: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    match args.command {
        Command::Validate { schema } => validate(&schema),
        Command::Exercise {
            schema,
            records,
            database,
        } => exercise(&schema, records, &database),
    }
}

fn load_schema(path: &Path) -> anyhow::Result<Vec<TableConfig>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).context("schema file must be a JSON array of table configs")
}

fn validate(path: &Path) -> anyhow::Result<()> {
    let configs = load_schema(path)?;
    for config in &configs {
        let fields = normalize_fields(&config.table_name, &config.fields)
            .with_context(|| format!("table {}", config.table_name))?;
        println!(
            "{} (history: {})",
            config.table_name, config.history_table_name
        );
        for (index, field) in fields.iter().enumerate() {
            let mut notes = Vec::new();
            if field.default.is_some() {
                notes.push("default");
            }
            if field.treat_null_as_missing {
                notes.push("null-as-missing");
            }
            if field.treat_empty_string_as_missing {
                notes.push("empty-as-missing");
            }
            let notes = if notes.is_empty() {
                String::new()
            } else {
                format!(" [{}]", notes.join(", "))
            };
            println!(
                "  col {}: {} {}{notes}",
                index + 2,
                field.name,
                field.field_type.name()
            );
        }
    }
    println!("{} table config(s) OK", configs.len());
    Ok(())
}

fn exercise(path: &Path, records: usize, database: &str) -> anyhow::Result<()> {
    let configs = load_schema(path)?;
    let db = Database::init(DbConfig {
        database_name: database.to_string(),
        ..DbConfig::default()
    });

    for config in &configs {
        let response = db.create_table(config);
        if !response.is_success() {
            bail!(
                "create_table {} failed: {}",
                config.table_name,
                response.error.unwrap_or_default()
            );
        }
    }
    tracing::info!(tables = configs.len(), "schema registered");

    for config in &configs {
        let key_order: Vec<String> = config.fields.iter().map(|f| f.name.clone()).collect();
        let fields = normalize_fields(&config.table_name, &config.fields)?;

        for index in 0..records {
            let payload = synthetic_record(&fields, index);
            let created = db.create(&config.table_name, &payload, &key_order);
            if created.status != 200 {
                bail!(
                    "create into {} failed: {}",
                    config.table_name,
                    created.error.unwrap_or_default()
                );
            }
        }

        let listed = db.get_all(&config.table_name, &ListOptions::default(), false);
        let count = listed
            .data
            .as_ref()
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        println!("{}: {count} row(s)", config.table_name);
    }

    Ok(())
}

/// Builds a payload covering every field that has no default.
fn synthetic_record(fields: &[NormalizedField], index: usize) -> Value {
    let mut payload = Map::new();
    for field in fields {
        if field.default.is_some() {
            continue;
        }
        let value = match field.field_type {
            FieldType::String => json!(format!("sample {index}")),
            FieldType::Number => json!(index as u64),
            FieldType::Boolean => json!(index % 2 == 0),
            FieldType::Date => {
                json!(OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_default())
            }
        };
        payload.insert(field.name.clone(), value);
    }
    Value::Object(payload)
}
