//! Schema descriptors handed to the generator by introspection

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key classification marking a primary key column
pub const PRIMARY_KEY: &str = "PRI";

/// Key classification marking a unique column
pub const UNIQUE_KEY: &str = "UNI";

/// Extra attribute marking an auto-increment column
pub const AUTO_INCREMENT: &str = "auto_increment";

/// One column of a table, with its type already mapped to a Go type name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name as declared in the database
    pub column_name: String,

    /// Go type of the column (e.g. `int64`, `*string`, `time.Time`)
    pub data_type: String,

    /// Key classification: `PRI`, `UNI` or empty
    #[serde(default)]
    pub column_key: String,

    /// Extra attribute, e.g. `auto_increment`
    #[serde(default)]
    pub extra: String,

    /// Default value expression, empty when none
    #[serde(default)]
    pub default_value: String,

    /// Column comment, empty when none
    #[serde(default)]
    pub comment: String,
}

impl ColumnDescriptor {
    pub fn new(column_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }

    pub fn key(mut self, column_key: impl Into<String>) -> Self {
        self.column_key = column_key.into();
        self
    }

    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Columns of one table, in declaration order
pub type TableSchema = Vec<ColumnDescriptor>;

/// Tables of one database, in declaration order
pub type DbSchema = IndexMap<String, TableSchema>;
