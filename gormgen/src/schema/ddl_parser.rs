//! MySQL DDL schema parser using sqlparser-rs

use std::collections::HashSet;

use sqlparser::ast::{
    ColumnOption, Expr, IndexColumn, ObjectName, PrimaryKeyConstraint, Statement,
    TableConstraint, UniqueConstraint, Value, ValueWithSpan,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use super::metadata::*;
use super::type_mapper::GoTypeMapper;
use crate::error::Result;

/// Parse `CREATE TABLE` statements into a schema with Go column types.
///
/// Other statements are ignored. Composite primary keys mark every member
/// column as `PRI`; only single-column unique constraints mark `UNI`.
pub fn parse_ddl(sql: &str) -> Result<DbSchema> {
    let dialect = MySqlDialect {};
    let statements = Parser::parse_sql(&dialect, sql)?;

    let mut schema = DbSchema::new();

    for stmt in statements {
        if let Statement::CreateTable(create_table) = stmt {
            let (name, columns) = extract_table(&create_table);
            debug!("Parsed table {} with {} columns", name, columns.len());
            schema.insert(name, columns);
        }
    }

    Ok(schema)
}

/// Column as read from DDL, before key classification and type mapping
struct ParsedColumn {
    name: String,
    sql_type: String,
    nullable: bool,
    is_unsigned: bool,
    is_auto_increment: bool,
    default_value: Option<String>,
    comment: Option<String>,
}

/// Extract the columns of a CREATE TABLE statement
fn extract_table(create: &sqlparser::ast::CreateTable) -> (String, TableSchema) {
    let name = extract_table_name(&create.name);

    let mut columns = Vec::new();
    let mut primary: HashSet<String> = HashSet::new();
    let mut unique: HashSet<String> = HashSet::new();

    // Extract columns with their options
    for col_def in &create.columns {
        let (column, col_pk, col_unique) = extract_column(col_def);

        if col_pk {
            primary.insert(column.name.clone());
        }
        if col_unique {
            unique.insert(column.name.clone());
        }

        columns.push(column);
    }

    // Extract table-level constraints
    for constraint in &create.constraints {
        match constraint {
            TableConstraint::PrimaryKey(PrimaryKeyConstraint {
                columns: pk_cols, ..
            }) => {
                primary = pk_cols.iter().map(extract_ident_from_index_column).collect();
            }
            TableConstraint::Unique(UniqueConstraint {
                columns: uniq_cols, ..
            }) => {
                if let [only] = uniq_cols.as_slice() {
                    unique.insert(extract_ident_from_index_column(only));
                }
            }
            _ => {}
        }
    }

    let columns = columns
        .into_iter()
        .map(|col| {
            let is_primary = primary.contains(&col.name);
            let column_key = if is_primary {
                PRIMARY_KEY
            } else if unique.contains(&col.name) {
                UNIQUE_KEY
            } else {
                ""
            };
            // Key columns are never NULL
            let nullable = col.nullable && !is_primary;
            let go_type = GoTypeMapper::resolve(&col.sql_type, col.is_unsigned, nullable);

            ColumnDescriptor {
                column_name: col.name,
                data_type: go_type.to_type_string(),
                column_key: column_key.to_string(),
                extra: if col.is_auto_increment {
                    AUTO_INCREMENT.to_string()
                } else {
                    String::new()
                },
                default_value: col.default_value.unwrap_or_default(),
                comment: col.comment.unwrap_or_default(),
            }
        })
        .collect();

    (name, columns)
}

/// Extract a column definition plus its column-level PRIMARY KEY / UNIQUE flags
fn extract_column(col_def: &sqlparser::ast::ColumnDef) -> (ParsedColumn, bool, bool) {
    let name = col_def.name.value.clone();
    let sql_type = format!("{}", col_def.data_type);
    let is_unsigned = sql_type.to_uppercase().contains("UNSIGNED");

    let mut nullable = true; // Default to nullable
    let mut default_value = None;
    let mut is_auto_increment = false;
    let mut col_is_primary = false;
    let mut col_is_unique = false;
    let mut comment = None;

    for option in &col_def.options {
        match &option.option {
            ColumnOption::NotNull => {
                nullable = false;
            }
            ColumnOption::Null => {
                nullable = true;
            }
            ColumnOption::Default(expr) => {
                default_value = Some(default_literal(expr));
            }
            ColumnOption::PrimaryKey(_) => {
                col_is_primary = true;
            }
            ColumnOption::Unique(_) => {
                col_is_unique = true;
            }
            ColumnOption::Comment(c) => {
                comment = Some(c.clone());
            }
            ColumnOption::DialectSpecific(tokens) => {
                // AUTO_INCREMENT is a MySQL-specific option
                let token_str = tokens
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_uppercase();
                if token_str.contains("AUTO_INCREMENT") {
                    is_auto_increment = true;
                }
            }
            _ => {}
        }
    }

    let column = ParsedColumn {
        name,
        sql_type,
        nullable,
        is_unsigned,
        is_auto_increment,
        default_value,
        comment,
    };

    (column, col_is_primary, col_is_unique)
}

/// Default value as stored in the catalog: string literals lose their quotes
fn default_literal(expr: &Expr) -> String {
    match expr {
        Expr::Value(ValueWithSpan {
            value: Value::SingleQuotedString(s) | Value::DoubleQuotedString(s),
            ..
        }) => s.clone(),
        other => format!("{}", other),
    }
}

/// Extract a simple string from an ObjectName
fn extract_table_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

/// Extract a column name string from an IndexColumn
fn extract_ident_from_index_column(ic: &IndexColumn) -> String {
    match &ic.column.expr {
        Expr::Identifier(ident) => ident.value.clone(),
        other => format!("{}", other),
    }
}
