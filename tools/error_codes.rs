//! Database code table CLI
//!
//! Prints the effective mapping from database machine codes to public
//! responses and validates override files before they are deployed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use error_shield::application::classify::{status_label, DatabaseCodeTable};
use error_shield::infrastructure::code_table_loader::{load_code_table, read_overrides};

#[derive(Parser)]
#[command(name = "error-codes")]
#[command(about = "Inspect and validate the database error code table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective code table
    Show {
        /// Override file (TOML or YAML) layered on the built-in table
        #[arg(short, long, env = "ERROR_CODE_TABLE")]
        overrides: Option<PathBuf>,
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate an override file without starting the service
    Check {
        /// Path to the override file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { overrides, json } => {
            let table = load_code_table(overrides.as_deref())
                .context("Failed to load code table")?;
            if json {
                print_json(&table)?;
            } else {
                print_table(&table);
            }
        }
        Commands::Check { file } => {
            let overrides = read_overrides(&file)
                .with_context(|| format!("Failed to parse {:?}", file))?;
            let count = overrides.codes.len();
            let builtin = DatabaseCodeTable::builtin();
            let replaced: Vec<String> = overrides
                .codes
                .keys()
                .filter(|code| builtin.lookup(code).is_some())
                .cloned()
                .collect();

            builtin
                .clone()
                .with_overrides(overrides)
                .with_context(|| format!("Invalid entries in {:?}", file))?;

            println!("{:?}: {} entries OK", file, count);
            if !replaced.is_empty() {
                println!("Replaces built-in codes: {}", replaced.join(", "));
            }
        }
    }

    Ok(())
}

fn print_table(table: &DatabaseCodeTable) {
    println!("{:<34} {:>6}  {:<22} MESSAGE", "CODE", "STATUS", "LABEL");
    for (code, mapping) in table.iter() {
        let label = axum::http::StatusCode::from_u16(mapping.status)
            .map(status_label)
            .unwrap_or("Error");
        println!(
            "{:<34} {:>6}  {:<22} {}",
            code, mapping.status, label, mapping.message
        );
    }
}

fn print_json(table: &DatabaseCodeTable) -> Result<()> {
    let entries: serde_json::Map<String, serde_json::Value> = table
        .iter()
        .map(|(code, mapping)| {
            serde_json::to_value(mapping).map(|value| (code.to_string(), value))
        })
        .collect::<Result<_, _>>()?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
