//! Configuration settings for gormgen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::code_config::{CodeConfig, FailurePolicy, PrimaryKeyPolicy};
use super::defaults;
use crate::codegen::TemplateSet;
use crate::error::{CodegenError, Result};

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    /// Path to the schema file (`.sql` DDL or `.json` dump)
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Database name recorded in generated headers (defaults to the schema file stem)
    #[serde(default)]
    pub db_name: Option<String>,

    /// Tables to include (comma-separated, or "*" for all)
    #[serde(default = "default_include_tables")]
    pub include_tables: String,

    /// Tables to exclude (comma-separated)
    #[serde(default = "default_exclude_tables")]
    pub exclude_tables: String,

    /// Root directory; generated files go to `<output_dir>/<package_name>`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Package directory, whose last segment is the Go package name
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Template overrides: a `{{#define}}` file or a directory of `<section>.tmpl` files
    #[serde(default)]
    pub template_file: Option<PathBuf>,

    /// Handling of tables with several primary key columns
    #[serde(default)]
    pub primary_key_policy: PrimaryKeyPolicy,

    /// Whether one failing table stops the run
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Keep partially written files of tables that failed to render
    #[serde(default = "default_keep_partial_output")]
    pub keep_partial_output: bool,

    /// Run the formatter over the package directory after generation
    #[serde(default = "default_run_formatter")]
    pub run_formatter: bool,

    /// Formatter command, invoked as `<command> -w <dir>`
    #[serde(default = "default_format_command")]
    pub format_command: String,

    /// Dry run mode - preview without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_include_tables() -> String {
    defaults::INCLUDE_TABLES.to_string()
}
fn default_exclude_tables() -> String {
    defaults::EXCLUDE_TABLES.to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_package_name() -> String {
    defaults::PACKAGE_NAME.to_string()
}
fn default_keep_partial_output() -> bool {
    defaults::KEEP_PARTIAL_OUTPUT
}
fn default_run_formatter() -> bool {
    defaults::RUN_FORMATTER
}
fn default_format_command() -> String {
    defaults::FORMAT_COMMAND.to_string()
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            db_name: None,
            include_tables: default_include_tables(),
            exclude_tables: default_exclude_tables(),
            output_dir: default_output_dir(),
            package_name: default_package_name(),
            template_file: None,
            primary_key_policy: PrimaryKeyPolicy::default(),
            failure_policy: FailurePolicy::default(),
            keep_partial_output: default_keep_partial_output(),
            run_formatter: default_run_formatter(),
            format_command: default_format_command(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl GenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            // Try default locations
            builder = builder.add_source(File::with_name("gormgen").required(false));
        }

        // Override with environment variables (GORMGEN_*), e.g. GORMGEN_PACKAGE_NAME
        builder = builder.add_source(Environment::with_prefix("GORMGEN").prefix_separator("_"));

        let config: GenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Database name for generated headers
    pub fn db_name(&self) -> String {
        self.db_name.clone().unwrap_or_else(|| {
            self.schema_file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    /// Build the immutable per-run config, loading template overrides
    pub fn code_config(&self) -> Result<CodeConfig> {
        let mut code_config = CodeConfig::new(self.package_name.clone())
            .with_primary_key_policy(self.primary_key_policy);
        if let Some(path) = &self.template_file {
            code_config = code_config.with_templates(TemplateSet::from_path(path)?);
        }
        Ok(code_config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "schema_file is required".into(),
            ));
        }

        if !self.schema_file.exists() {
            return Err(CodegenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        if self.package_name.trim_matches('/').is_empty() {
            return Err(CodegenError::ValidationError(
                "package_name is required".into(),
            ));
        }

        if let Some(path) = &self.template_file {
            if !path.exists() {
                return Err(CodegenError::ValidationError(format!(
                    "Template file not found: {}",
                    path.display()
                )));
            }
        }

        if self.run_formatter && self.format_command.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "format_command is required when run_formatter is true".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenConfig::default();
        assert_eq!(config.include_tables, "*");
        assert_eq!(config.package_name, "models");
        assert_eq!(config.format_command, "gofmt");
        assert!(config.run_formatter);
        assert!(!config.keep_partial_output);
        assert_eq!(config.failure_policy, FailurePolicy::CollectAll);
        assert_eq!(config.primary_key_policy, PrimaryKeyPolicy::Omit);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_validation_missing_schema() {
        let config = GenConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_package() {
        let schema = tempfile::NamedTempFile::new().unwrap();
        let mut config = GenConfig::default_with_schema(schema.path().to_path_buf());
        assert!(config.validate().is_ok());

        config.package_name = "/".to_string();
        assert!(matches!(
            config.validate(),
            Err(CodegenError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
            schema_file = "test.sql"
            package_name = "internal/models"
            primary_key_policy = "reject"
            failure_policy = "fail_fast"
            run_formatter = false
            log_level = "debug"
        "#;
        let config: GenConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.primary_key_policy, PrimaryKeyPolicy::Reject);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert!(!config.run_formatter);
        assert_eq!(config.db_name(), "test");
        assert_eq!(config.package_name, "internal/models");
    }

    #[test]
    fn test_from_file_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gormgen.toml");
        std::fs::write(&path, "schema_file = [").unwrap();
        assert!(matches!(
            GenConfig::from_file(&path),
            Err(CodegenError::ConfigError(_))
        ));
    }

    #[test]
    fn test_code_config_loads_templates() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("custom.tmpl");
        std::fs::write(&templates, "{{#define \"struct\"}}x{{/define}}").unwrap();

        let config = GenConfig {
            template_file: Some(templates),
            primary_key_policy: PrimaryKeyPolicy::LastWins,
            ..Default::default()
        };
        let code_config = config.code_config().unwrap();
        assert_eq!(code_config.package_name, "models");
        assert_eq!(code_config.primary_key_policy, PrimaryKeyPolicy::LastWins);
        assert!(code_config.templates.unwrap().lookup("struct").is_some());
    }
}
