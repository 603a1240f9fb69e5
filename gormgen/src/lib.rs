//! gormgen: Generate Go gorm model files from MySQL table schemas
//!
//! This crate provides both a CLI tool and a library. It reads a schema, either
//! MySQL DDL parsed with `sqlparser-rs` or a JSON dump of table columns, and
//! writes one Go source file per table containing:
//!
//! - a model struct with `json` and `gorm` field tags
//! - gorm helpers (`TableName`, `Create`, `Save`, list and key lookups)
//!
//! Each file is rendered from three sections (`header`, `struct`, `obj_api`),
//! any of which can be replaced by a user template.
//!
//! # Usage in build.rs
//!
//! ```rust,ignore
//! fn main() {
//!     gormgen::GeneratorBuilder::new("schema.sql")
//!         .output_dir(std::env::var("OUT_DIR").unwrap())
//!         .package_name("models")
//!         .skip_format()
//!         .generate()
//!         .expect("Failed to generate models");
//!
//!     println!("cargo:rerun-if-changed=schema.sql");
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! gormgen --schema schema.sql --output ./internal --package models generate
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod schema;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use codegen::{Generator, TemplateSet};
pub use config::{CodeConfig, FailurePolicy, GenConfig, PrimaryKeyPolicy};
pub use error::{CodegenError, Phase, Result};

/// Main entry point for code generation.
///
/// Returns the paths of the generated files, or of the files that would be
/// generated in dry run mode.
pub fn generate(config: &GenConfig) -> Result<Vec<PathBuf>> {
    let schema = schema::load_schema(&config.schema_file)?;
    info!("Found {} tables", schema.len());

    let schema = filter_tables(schema, &config.include_tables, &config.exclude_tables);
    debug!(
        "After filtering: {} tables (include={}, exclude={})",
        schema.len(),
        config.include_tables,
        config.exclude_tables
    );

    let code_config = config.code_config()?;
    let generator = Generator::new(&code_config, &config.output_dir)?
        .failure_policy(config.failure_policy)
        .keep_partial_output(config.keep_partial_output);

    if config.dry_run {
        let paths = schema
            .keys()
            .map(|table| generator.artifact_path(table))
            .collect();
        return Ok(paths);
    }

    let db_name = config.db_name();
    info!("Generating models for {} in {:?}", db_name, generator.package_dir());
    let paths = generator.generate_all(&db_name, &schema)?;

    if config.run_formatter {
        codegen::format_output(&generator.package_dir(), &config.format_command)?;
    }

    info!("Code generation complete");
    Ok(paths)
}

/// Filter tables based on include/exclude patterns
fn filter_tables(tables: schema::DbSchema, include: &str, exclude: &str) -> schema::DbSchema {
    let include_all = include.trim() == "*" || include.trim().is_empty();
    let include_set: HashSet<String> = if include_all {
        HashSet::new()
    } else {
        include.split(',').map(|s| s.trim().to_string()).collect()
    };
    let exclude_set: HashSet<String> = exclude
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    tables
        .into_iter()
        .filter(|(name, _)| {
            let included = include_all || include_set.contains(name);
            let excluded = exclude_set.contains(name);
            included && !excluded
        })
        .collect()
}

/// Builder pattern for easy configuration in build.rs
pub struct GeneratorBuilder {
    config: GenConfig,
}

impl GeneratorBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: GenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Set the output root; files go to `<dir>/<package_name>`
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the package directory, e.g. `models` or `internal/models`
    pub fn package_name(mut self, name: &str) -> Self {
        self.config.package_name = name.to_string();
        self
    }

    /// Set the database name written to file headers
    pub fn db_name(mut self, name: &str) -> Self {
        self.config.db_name = Some(name.to_string());
        self
    }

    /// Set tables to include
    pub fn include_tables(mut self, tables: &[&str]) -> Self {
        self.config.include_tables = tables.join(",");
        self
    }

    /// Set tables to exclude
    pub fn exclude_tables(mut self, tables: &[&str]) -> Self {
        self.config.exclude_tables = tables.join(",");
        self
    }

    /// Use section overrides from a template file or directory
    pub fn templates(mut self, path: impl AsRef<Path>) -> Self {
        self.config.template_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn primary_key_policy(mut self, policy: PrimaryKeyPolicy) -> Self {
        self.config.primary_key_policy = policy;
        self
    }

    /// Stop at the first failing table
    pub fn fail_fast(mut self) -> Self {
        self.config.failure_policy = FailurePolicy::FailFast;
        self
    }

    /// Keep partially written files of failed tables
    pub fn keep_partial_output(mut self) -> Self {
        self.config.keep_partial_output = true;
        self
    }

    /// Do not run the formatter after generation
    pub fn skip_format(mut self) -> Self {
        self.config.run_formatter = false;
        self
    }

    /// Set the formatter command, invoked as `<command> -w <dir>`
    pub fn format_command(mut self, command: &str) -> Self {
        self.config.format_command = command.to_string();
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    /// Generate the code
    pub fn generate(self) -> Result<Vec<PathBuf>> {
        generate(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDescriptor, DbSchema};
    use std::fs;

    fn tables() -> DbSchema {
        ["users", "orders", "migrations"]
            .into_iter()
            .map(|t| (t.to_string(), vec![ColumnDescriptor::new("id", "int64")]))
            .collect()
    }

    fn names(schema: &DbSchema) -> Vec<&str> {
        schema.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_filter_tables() {
        assert_eq!(names(&filter_tables(tables(), "*", "")), vec!["users", "orders", "migrations"]);
        assert_eq!(names(&filter_tables(tables(), "orders, users", "")), vec!["users", "orders"]);
        assert_eq!(names(&filter_tables(tables(), "*", "migrations")), vec!["users", "orders"]);
        assert_eq!(names(&filter_tables(tables(), "", "users,orders")), vec!["migrations"]);
    }

    fn write_schema(dir: &Path) -> PathBuf {
        let path = dir.join("shop.sql");
        fs::write(
            &path,
            "CREATE TABLE users (id BIGINT PRIMARY KEY, name VARCHAR(64) NOT NULL);\n\
             CREATE TABLE migrations (version INT NOT NULL);\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_builder_generates_files() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_schema(dir.path());
        let out = dir.path().join("out");

        let paths = GeneratorBuilder::new(&schema)
            .output_dir(&out)
            .exclude_tables(&["migrations"])
            .skip_format()
            .generate()
            .unwrap();

        assert_eq!(paths, vec![out.join("models/users.go")]);
        let users = fs::read_to_string(&paths[0]).unwrap();
        assert!(users.contains("// Source: `shop`.`users`"));
        assert!(!out.join("models/migrations.go").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_schema(dir.path());
        let out = dir.path().join("out");

        let paths = GeneratorBuilder::new(&schema)
            .output_dir(&out)
            .package_name("internal/models")
            .dry_run()
            .generate()
            .unwrap();

        assert_eq!(
            paths,
            vec![
                out.join("internal/models/users.go"),
                out.join("internal/models/migrations.go"),
            ]
        );
        assert!(!out.exists());
    }

    #[test]
    fn test_formatter_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_schema(dir.path());

        let err = GeneratorBuilder::new(&schema)
            .output_dir(dir.path().join("out"))
            .format_command("gormgen-no-such-formatter")
            .generate()
            .unwrap_err();
        assert!(matches!(err, CodegenError::Format { .. }));
    }
}
