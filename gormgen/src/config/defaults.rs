//! Default configuration values - single source of truth

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Default root directory the package directory is created in
pub const OUTPUT_DIR: &str = ".";

/// Default package (directory and Go package name) for generated models
pub const PACKAGE_NAME: &str = "models";

/// Extension of generated files
pub const FILE_EXTENSION: &str = "go";

/// Whether to run the formatter after generation by default
pub const RUN_FORMATTER: bool = true;

/// Default formatter command, invoked as `<command> -w <package dir>`
pub const FORMAT_COMMAND: &str = "gofmt";

/// Whether to keep partially written files of failed tables by default
pub const KEEP_PARTIAL_OUTPUT: bool = false;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;
