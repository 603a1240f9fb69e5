//! Model builder - turns a table schema into the data the templates render

use serde::Serialize;
use tracing::warn;

use crate::config::{CodeConfig, PrimaryKeyPolicy};
use crate::error::{CodegenError, Result};
use crate::schema::{ColumnDescriptor, TableSchema, AUTO_INCREMENT, PRIMARY_KEY, UNIQUE_KEY};

use super::naming::{normalize, to_instance_name, to_type_name};

/// Timestamp columns managed outside of gorm's column mapping
pub const AUDIT_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Methods the built-in object API declares on the model type. Go does not
/// allow a field and a method of the same name.
pub const RESERVED_FIELD_NAMES: [&str; 5] = ["TableName", "Create", "Save", "Update", "Delete"];

/// Suffix appended to field names that collide with a reserved method
pub const RESERVED_FIELD_SUFFIX: &str = "_";

/// One struct field, derived from one column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelField {
    pub name: String,
    pub column_name: String,
    #[serde(rename = "Type")]
    pub type_name: String,
    pub tag: String,
    pub is_primary_key: bool,
    pub is_unique_key: bool,
    pub is_auto_increment: bool,
    pub default_value: String,
    pub extra: String,
    pub comment: String,
}

impl ModelField {
    fn from_column(column: &ColumnDescriptor) -> Self {
        Self {
            name: field_name(&column.column_name),
            column_name: column.column_name.clone(),
            type_name: column.data_type.clone(),
            tag: build_tag(&column.column_name),
            is_primary_key: column.column_key.eq_ignore_ascii_case(PRIMARY_KEY),
            is_unique_key: column.column_key.eq_ignore_ascii_case(UNIQUE_KEY),
            is_auto_increment: column.extra.eq_ignore_ascii_case(AUTO_INCREMENT),
            default_value: column.default_value.clone(),
            extra: column.extra.clone(),
            comment: single_line(&column.comment),
        }
    }

    /// Whether this field is one of the audit timestamp columns
    pub fn is_audit_column(&self) -> bool {
        AUDIT_COLUMNS.contains(&self.column_name.as_str())
    }
}

/// Exported field name of a column, moved off the reserved method names
fn field_name(column_name: &str) -> String {
    let name = normalize(column_name, true);
    if RESERVED_FIELD_NAMES.contains(&name.as_str()) {
        warn!(
            "Column {:?} maps to reserved name {}, using {}{}",
            column_name, name, name, RESERVED_FIELD_SUFFIX
        );
        format!("{}{}", name, RESERVED_FIELD_SUFFIX)
    } else {
        name
    }
}

/// Build the struct tag for a column: `json` key first, then the gorm mapping.
///
/// Audit columns are excluded from gorm's column mapping with `gorm:"-"`.
pub fn build_tag(column_name: &str) -> String {
    let json_tag = format!("json:\"{}\"", column_name);
    let gorm_tag = if AUDIT_COLUMNS.contains(&column_name) {
        "gorm:\"-\"".to_string()
    } else {
        format!("gorm:\"column:{}\"", column_name)
    };
    format!("`{} {}`", json_tag, gorm_tag)
}

/// Comments are emitted as `//` line comments, so line breaks are folded
fn single_line(comment: &str) -> String {
    comment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Everything needed to render one table
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMeta<'a> {
    /// Exported type name, e.g. `UserProfile`
    pub name: String,
    /// Unexported instance name, e.g. `userProfile`
    pub lower_name: String,
    pub db_name: String,
    pub table_name: String,
    /// Fields in column order
    pub fields: Vec<ModelField>,
    primary_index: Option<usize>,
    unique_indexes: Vec<usize>,
    pub config: &'a CodeConfig,
}

impl<'a> ModelMeta<'a> {
    /// Build the model of one table.
    ///
    /// Produces exactly one field per column, in column order. Which field
    /// becomes the primary key when several columns are marked `PRI` is
    /// decided by the config's [`PrimaryKeyPolicy`].
    pub fn build(
        db_name: &str,
        table_name: &str,
        schema: &TableSchema,
        config: &'a CodeConfig,
    ) -> Result<Self> {
        let fields: Vec<ModelField> = schema.iter().map(ModelField::from_column).collect();

        let primary: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_primary_key)
            .map(|(i, _)| i)
            .collect();

        let primary_index = match (primary.as_slice(), config.primary_key_policy) {
            ([], _) => None,
            ([only], _) => Some(*only),
            (_, PrimaryKeyPolicy::Omit) => None,
            (_, PrimaryKeyPolicy::LastWins) => primary.last().copied(),
            (_, PrimaryKeyPolicy::Reject) => {
                return Err(CodegenError::AmbiguousPrimaryKey {
                    table: table_name.to_string(),
                    columns: primary
                        .iter()
                        .map(|&i| fields[i].column_name.clone())
                        .collect(),
                });
            }
        };

        let unique_indexes = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_unique_key)
            .map(|(i, _)| i)
            .collect();

        Ok(Self {
            name: to_type_name(table_name),
            lower_name: to_instance_name(table_name),
            db_name: db_name.to_string(),
            table_name: table_name.to_string(),
            fields,
            primary_index,
            unique_indexes,
            config,
        })
    }

    /// The primary key field, when exactly one was resolved
    pub fn primary_field(&self) -> Option<&ModelField> {
        self.primary_index.map(|i| &self.fields[i])
    }

    /// Fields of columns marked `UNI`, in column order
    pub fn unique_fields(&self) -> impl Iterator<Item = &ModelField> {
        self.unique_indexes.iter().map(|&i| &self.fields[i])
    }

    /// Whether any field type refers to the `time` package
    pub fn needs_time_import(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.type_name.trim_start_matches(['*', '[', ']']).starts_with("time."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_profile() -> TableSchema {
        vec![
            ColumnDescriptor::new("id", "int64")
                .key("PRI")
                .extra("auto_increment"),
            ColumnDescriptor::new("user_name", "string")
                .key("uni")
                .comment("shown\non the profile"),
            ColumnDescriptor::new("created_at", "time.Time"),
            ColumnDescriptor::new("updated_at", "time.Time"),
        ]
    }

    #[test]
    fn test_build_names_and_order() {
        let config = CodeConfig::default();
        let model = ModelMeta::build("app", "user_profile", &user_profile(), &config).unwrap();

        assert_eq!(model.name, "UserProfile");
        assert_eq!(model.lower_name, "userProfile");
        assert_eq!(model.db_name, "app");
        assert_eq!(model.table_name, "user_profile");
        let names: Vec<&str> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Id", "UserName", "CreatedAt", "UpdatedAt"]);
        let columns: Vec<&str> = model.fields.iter().map(|f| f.column_name.as_str()).collect();
        assert_eq!(columns, vec!["id", "user_name", "created_at", "updated_at"]);
    }

    #[test]
    fn test_key_and_extra_classification_ignores_case() {
        let config = CodeConfig::default();
        let model = ModelMeta::build("app", "user_profile", &user_profile(), &config).unwrap();

        let id = &model.fields[0];
        assert!(id.is_primary_key);
        assert!(id.is_auto_increment);
        assert!(!id.is_unique_key);

        let user_name = &model.fields[1];
        assert!(user_name.is_unique_key);
        assert!(!user_name.is_primary_key);
        assert!(!user_name.is_auto_increment);
        assert_eq!(user_name.comment, "shown on the profile");

        let uniques: Vec<&str> = model.unique_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(uniques, vec!["UserName"]);
    }

    #[test]
    fn test_tags() {
        assert_eq!(build_tag("id"), "`json:\"id\" gorm:\"column:id\"`");
        assert_eq!(build_tag("created_at"), "`json:\"created_at\" gorm:\"-\"`");
        assert_eq!(build_tag("updated_at"), "`json:\"updated_at\" gorm:\"-\"`");
        // Only exact audit names are excluded
        assert_eq!(
            build_tag("Created_At"),
            "`json:\"Created_At\" gorm:\"column:Created_At\"`"
        );
    }

    #[test]
    fn test_every_non_audit_tag_binds_its_column() {
        let config = CodeConfig::default();
        let model = ModelMeta::build("app", "user_profile", &user_profile(), &config).unwrap();
        for field in &model.fields {
            assert!(field.tag.starts_with("`json:\""));
            if field.is_audit_column() {
                assert!(field.tag.contains("gorm:\"-\""));
            } else {
                assert!(field
                    .tag
                    .contains(&format!("gorm:\"column:{}\"", field.column_name)));
            }
        }
    }

    #[test]
    fn test_reserved_field_names_are_suffixed() {
        let config = CodeConfig::default();
        let schema = vec![
            ColumnDescriptor::new("id", "int64").key("PRI"),
            ColumnDescriptor::new("table_name", "string"),
            ColumnDescriptor::new("save", "bool"),
            ColumnDescriptor::new("deleted", "bool"),
        ];
        let model = ModelMeta::build("app", "jobs", &schema, &config).unwrap();

        let names: Vec<&str> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Id", "TableName_", "Save_", "Deleted"]);
        // Tags still bind the original column
        assert_eq!(
            model.fields[1].tag,
            "`json:\"table_name\" gorm:\"column:table_name\"`"
        );
    }

    #[test]
    fn test_single_primary_key() {
        let config = CodeConfig::default();
        let model = ModelMeta::build("app", "user_profile", &user_profile(), &config).unwrap();
        assert_eq!(model.primary_field().map(|f| f.name.as_str()), Some("Id"));
    }

    #[test]
    fn test_no_primary_key() {
        let config = CodeConfig::default();
        let schema = vec![ColumnDescriptor::new("message", "string")];
        let model = ModelMeta::build("app", "audit_log", &schema, &config).unwrap();
        assert!(model.primary_field().is_none());
    }

    fn composite() -> TableSchema {
        vec![
            ColumnDescriptor::new("order_id", "int64").key("PRI"),
            ColumnDescriptor::new("product_id", "int64").key("PRI"),
            ColumnDescriptor::new("quantity", "int32"),
        ]
    }

    #[test]
    fn test_multiple_primary_keys_omit() {
        let config = CodeConfig::default();
        let model = ModelMeta::build("shop", "order_items", &composite(), &config).unwrap();
        assert!(model.primary_field().is_none());
        assert!(model.fields[0].is_primary_key);
        assert!(model.fields[1].is_primary_key);
    }

    #[test]
    fn test_multiple_primary_keys_last_wins() {
        let config = CodeConfig::default().with_primary_key_policy(PrimaryKeyPolicy::LastWins);
        let model = ModelMeta::build("shop", "order_items", &composite(), &config).unwrap();
        assert_eq!(
            model.primary_field().map(|f| f.column_name.as_str()),
            Some("product_id")
        );
    }

    #[test]
    fn test_multiple_primary_keys_reject() {
        let config = CodeConfig::default().with_primary_key_policy(PrimaryKeyPolicy::Reject);
        let err = ModelMeta::build("shop", "order_items", &composite(), &config).unwrap_err();
        match err {
            CodegenError::AmbiguousPrimaryKey { table, columns } => {
                assert_eq!(table, "order_items");
                assert_eq!(columns, vec!["order_id", "product_id"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_schema() {
        let config = CodeConfig::default();
        let model = ModelMeta::build("app", "empty", &Vec::new(), &config).unwrap();
        assert!(model.fields.is_empty());
        assert!(model.primary_field().is_none());
        assert!(!model.needs_time_import());
    }

    #[test]
    fn test_needs_time_import() {
        let config = CodeConfig::default();
        let model = ModelMeta::build("app", "user_profile", &user_profile(), &config).unwrap();
        assert!(model.needs_time_import());

        let schema = vec![
            ColumnDescriptor::new("id", "int64"),
            ColumnDescriptor::new("deleted_at", "*time.Time"),
        ];
        let model = ModelMeta::build("app", "t", &schema, &config).unwrap();
        assert!(model.needs_time_import());

        let schema = vec![ColumnDescriptor::new("id", "int64")];
        let model = ModelMeta::build("app", "t", &schema, &config).unwrap();
        assert!(!model.needs_time_import());
    }
}
