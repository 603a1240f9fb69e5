//! CLI entry point for gormgen

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gormgen::config::{FailurePolicy, GenConfig};

#[derive(Parser)]
#[command(name = "gormgen")]
#[command(about = "Generate Go gorm model files from MySQL table schemas")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to schema file, `.sql` DDL or `.json` (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Output root directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Package directory below the output root (overrides config)
    #[arg(short, long)]
    package: Option<String>,

    /// Database name written to file headers
    #[arg(long)]
    db_name: Option<String>,

    /// Template override file or directory
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Stop at the first table that fails
    #[arg(long)]
    fail_fast: bool,

    /// Skip running the formatter over the output
    #[arg(long)]
    no_format: bool,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one model file per table
    Generate,
    /// Inspect schema (show loaded tables for debugging)
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = if let Some(config_path) = &cli.config {
        GenConfig::from_file(config_path)?
    } else {
        GenConfig::load(None)?
    };

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(package) = cli.package {
        config.package_name = package;
    }
    if let Some(db_name) = cli.db_name {
        config.db_name = Some(db_name);
    }
    if let Some(templates) = cli.templates {
        config.template_file = Some(templates);
    }
    if cli.fail_fast {
        config.failure_policy = FailurePolicy::FailFast;
    }
    if cli.no_format {
        config.run_formatter = false;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    // Validate configuration
    config.validate()?;

    if let Some(Commands::Inspect) = &cli.command {
        return inspect_schema(&config);
    }

    info!("Generating code from schema: {:?}", config.schema_file);

    let paths = gormgen::generate(&config)?;

    if config.dry_run {
        println!("Dry run mode - would generate:");
        for path in &paths {
            println!("  {}", path.display());
        }
        return Ok(());
    }

    info!("Code generation completed successfully ({} files)", paths.len());
    Ok(())
}

fn inspect_schema(config: &GenConfig) -> Result<()> {
    let schema = gormgen::schema::load_schema(&config.schema_file)?;

    println!("Loaded {} tables:\n", schema.len());
    for (table, columns) in &schema {
        println!("Table: {}", table);
        println!("  Columns:");
        for col in columns {
            let key = if col.column_key.is_empty() {
                String::new()
            } else {
                format!(" [{}]", col.column_key)
            };
            let extra = if col.extra.is_empty() {
                String::new()
            } else {
                format!(" {}", col.extra)
            };
            println!("    - {} {}{}{}", col.column_name, col.data_type, key, extra);
            if !col.default_value.is_empty() {
                println!("      DEFAULT {}", col.default_value);
            }
            if !col.comment.is_empty() {
                println!("      COMMENT {:?}", col.comment);
            }
        }
        println!();
    }

    Ok(())
}
