//! MySQL to Go type mapping

/// A Go type used for a generated field
#[derive(Debug, Clone, PartialEq)]
pub enum GoType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Bytes,
    Time,
    /// Nullable wrapper
    Pointer(Box<GoType>),
}

impl GoType {
    /// Get the type string for code generation
    pub fn to_type_string(&self) -> String {
        match self {
            GoType::Bool => "bool".to_string(),
            GoType::Int8 => "int8".to_string(),
            GoType::Int16 => "int16".to_string(),
            GoType::Int32 => "int32".to_string(),
            GoType::Int64 => "int64".to_string(),
            GoType::Uint8 => "uint8".to_string(),
            GoType::Uint16 => "uint16".to_string(),
            GoType::Uint32 => "uint32".to_string(),
            GoType::Uint64 => "uint64".to_string(),
            GoType::Float32 => "float32".to_string(),
            GoType::Float64 => "float64".to_string(),
            GoType::String => "string".to_string(),
            GoType::Bytes => "[]byte".to_string(),
            GoType::Time => "time.Time".to_string(),
            GoType::Pointer(inner) => format!("*{}", inner.to_type_string()),
        }
    }

    /// Wrap in a pointer for nullable columns; slices are already nil-able
    fn nullable(self) -> GoType {
        match self {
            GoType::Bytes | GoType::Pointer(_) => self,
            other => GoType::Pointer(Box::new(other)),
        }
    }
}

/// Resolve MySQL column types to Go types
pub struct GoTypeMapper;

impl GoTypeMapper {
    /// Get the Go type for a column
    pub fn resolve(sql_type: &str, is_unsigned: bool, nullable: bool) -> GoType {
        let base_type = Self::resolve_base_type(sql_type, is_unsigned);

        if nullable {
            base_type.nullable()
        } else {
            base_type
        }
    }

    /// Resolve the base type (without pointer wrapper)
    fn resolve_base_type(sql_type: &str, is_unsigned: bool) -> GoType {
        let data_type_lower = sql_type.to_lowercase();

        // Boolean types
        if Self::is_boolean_type(&data_type_lower) {
            return GoType::Bool;
        }

        // Integer types
        if data_type_lower.starts_with("tinyint") {
            return if is_unsigned {
                GoType::Uint8
            } else {
                GoType::Int8
            };
        }
        if data_type_lower.starts_with("smallint") {
            return if is_unsigned {
                GoType::Uint16
            } else {
                GoType::Int16
            };
        }
        if data_type_lower.starts_with("mediumint") || data_type_lower.starts_with("int") {
            return if is_unsigned {
                GoType::Uint32
            } else {
                GoType::Int32
            };
        }
        if data_type_lower.starts_with("bigint") {
            return if is_unsigned {
                GoType::Uint64
            } else {
                GoType::Int64
            };
        }

        // Float types
        if data_type_lower.starts_with("float") {
            return GoType::Float32;
        }
        if data_type_lower.starts_with("double")
            || data_type_lower.starts_with("real")
            || data_type_lower.starts_with("decimal")
            || data_type_lower.starts_with("numeric")
        {
            return GoType::Float64;
        }

        // Binary types
        if data_type_lower.starts_with("binary")
            || data_type_lower.starts_with("varbinary")
            || data_type_lower.contains("blob")
            || data_type_lower.starts_with("bit")
        {
            return GoType::Bytes;
        }

        // Date/time types
        if data_type_lower.starts_with("date")
            || data_type_lower.starts_with("timestamp")
            || data_type_lower == "time"
            || data_type_lower.starts_with("time(")
        {
            return GoType::Time;
        }

        // Text, ENUM, SET and JSON all fall back to string
        GoType::String
    }

    /// BOOL, BOOLEAN, TINYINT(1) and BIT(1)
    fn is_boolean_type(data_type_lower: &str) -> bool {
        data_type_lower == "bool"
            || data_type_lower == "boolean"
            || (data_type_lower.starts_with("tinyint") && data_type_lower.contains("(1)"))
            || (data_type_lower.starts_with("bit") && data_type_lower.contains("(1)"))
    }
}
