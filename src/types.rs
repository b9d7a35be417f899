//! Core data model types for master data.
//!
//! A record type describes itself with a static [`Schema`] (a table name, a list of typed
//! [`Field`]s and the position of the primary key). The text parser and the binary codec both
//! work in terms of [`Value`]s laid out in schema order; [`MasterRecord`] converts between those
//! values and the concrete record struct.

use std::fmt;
use std::hash::Hash;

use crate::error::{LoadError, LoadResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Utf8,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int64 => "int",
            DataType::Float64 => "float",
            DataType::Utf8 => "string",
        };
        f.write_str(name)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
    /// Reject negative numeric values for this field.
    pub non_negative: bool,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            non_negative: false,
        }
    }

    /// Require numeric values of this field to be `>= 0`.
    ///
    /// Has no effect on [`DataType::Utf8`] fields.
    pub fn non_negative(mut self) -> Self {
        self.non_negative = true;
        self
    }
}

/// Static description of one record type: table name, ordered fields, primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Table name (e.g. `planet`).
    pub table: String,
    /// Ordered list of fields. A text row must have at least this many columns.
    pub fields: Vec<Field>,
    /// Index into `fields` of the primary-key field.
    pub primary_key: usize,
}

impl Schema {
    /// Create a new schema.
    ///
    /// # Panics
    ///
    /// Panics if the schema is invalid; see [`Schema::try_new`] for the rules.
    pub fn new(table: impl Into<String>, fields: Vec<Field>, primary_key: usize) -> Self {
        match Self::try_new(table, fields, primary_key) {
            Ok(schema) => schema,
            Err(e) => panic!("invalid schema: {e}"),
        }
    }

    /// Create a new schema, validating it.
    ///
    /// The primary key must point at an existing [`DataType::Int64`] or [`DataType::Utf8`]
    /// field (floats are not usable as keys) and field names must be unique.
    pub fn try_new(
        table: impl Into<String>,
        fields: Vec<Field>,
        primary_key: usize,
    ) -> LoadResult<Self> {
        let table = table.into();
        // Names and the field count are u16-prefixed in the binary form.
        if fields.len() > usize::from(u16::MAX) {
            return Err(LoadError::SchemaMismatch {
                message: format!("table '{table}': {} fields exceed the limit of {}", fields.len(), u16::MAX),
            });
        }
        if let Some(name) = std::iter::once(&table)
            .chain(fields.iter().map(|f| &f.name))
            .find(|name| name.len() > usize::from(u16::MAX))
        {
            return Err(LoadError::SchemaMismatch {
                message: format!(
                    "table '{}': name of {} bytes exceeds the limit of {}",
                    table.chars().take(32).collect::<String>(),
                    name.len(),
                    u16::MAX
                ),
            });
        }
        let Some(pk) = fields.get(primary_key) else {
            return Err(LoadError::SchemaMismatch {
                message: format!(
                    "table '{table}': primary key index {primary_key} is out of range ({} fields)",
                    fields.len()
                ),
            });
        };
        if pk.data_type == DataType::Float64 {
            return Err(LoadError::SchemaMismatch {
                message: format!(
                    "table '{table}': primary key '{}' must be an int or string field",
                    pk.name
                ),
            });
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(LoadError::SchemaMismatch {
                    message: format!("table '{table}': duplicate field name '{}'", field.name),
                });
            }
        }

        Ok(Self {
            table,
            fields,
            primary_key,
        })
    }

    /// Minimum number of columns a text row must have.
    pub fn required_columns(&self) -> usize {
        self.fields.len()
    }

    /// The primary-key field.
    pub fn primary_key_field(&self) -> &Field {
        &self.fields[self.primary_key]
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed value, laid out in [`Schema`] field order.
///
/// There is no null: a field that cannot be produced rejects the whole row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// The [`DataType`] this value belongs to.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int64(_) => DataType::Int64,
            Value::Float64(_) => DataType::Float64,
            Value::Utf8(_) => DataType::Utf8,
        }
    }
}

/// A typed, immutable master-data record.
///
/// Implementors describe their columns once through [`MasterRecord::schema`]; the text parser
/// produces values in that order and hands them to [`MasterRecord::from_values`], and the binary
/// codec uses [`MasterRecord::to_values`] on the way out.
pub trait MasterRecord: Clone {
    /// Primary-key type.
    type Key: Eq + Hash + Clone + fmt::Debug;

    /// Schema shared by every record of this type.
    fn schema() -> &'static Schema;

    /// Primary-key value of this record.
    fn key(&self) -> Self::Key;

    /// Build a record from values in schema order.
    ///
    /// Callers guarantee that each value already matches its field's [`DataType`]; a mismatch is
    /// reported as [`LoadError::SchemaMismatch`].
    fn from_values(values: Vec<Value>) -> LoadResult<Self>;

    /// Values of this record in schema order.
    fn to_values(&self) -> Vec<Value>;
}

#[cfg(test)]
mod tests {
    use super::{DataType, Field, Schema, Value};

    fn fields() -> Vec<Field> {
        vec![
            Field::new("id", DataType::Int64),
            Field::new("name", DataType::Utf8),
            Field::new("mass", DataType::Float64).non_negative(),
        ]
    }

    #[test]
    fn schema_index_of_works() {
        let schema = Schema::new("body", fields(), 0);
        assert_eq!(schema.index_of("id"), Some(0));
        assert_eq!(schema.index_of("mass"), Some(2));
        assert_eq!(schema.index_of("missing"), None);
        assert_eq!(schema.required_columns(), 3);
        assert_eq!(schema.primary_key_field().name, "id");
        assert!(schema.fields[2].non_negative);
    }

    #[test]
    fn schema_rejects_out_of_range_primary_key() {
        let err = Schema::try_new("body", fields(), 3).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn schema_rejects_float_primary_key() {
        let err = Schema::try_new("body", fields(), 2).unwrap_err();
        assert!(err.to_string().contains("must be an int or string field"));
    }

    #[test]
    fn schema_rejects_duplicate_field_names() {
        let mut f = fields();
        f.push(Field::new("name", DataType::Utf8));
        let err = Schema::try_new("body", f, 0).unwrap_err();
        assert!(err.to_string().contains("duplicate field name 'name'"));
    }

    #[test]
    fn schema_rejects_names_too_long_to_encode() {
        let mut f = fields();
        f.push(Field::new("x".repeat(usize::from(u16::MAX) + 1), DataType::Utf8));
        let err = Schema::try_new("body", f, 0).unwrap_err();
        assert!(err.to_string().contains("name of 65536 bytes exceeds the limit of 65535"));

        let err = Schema::try_new("t".repeat(70_000), fields(), 0).unwrap_err();
        assert!(err.to_string().contains("name of 70000 bytes"));

        // The longest encodable name is still fine.
        let mut f = fields();
        f.push(Field::new("y".repeat(usize::from(u16::MAX)), DataType::Utf8));
        assert!(Schema::try_new("body", f, 0).is_ok());
    }

    #[test]
    fn schema_rejects_more_fields_than_encodable() {
        let f: Vec<Field> = (0..=usize::from(u16::MAX))
            .map(|i| Field::new(format!("f{i}"), DataType::Int64))
            .collect();
        let err = Schema::try_new("wide", f, 0).unwrap_err();
        assert!(err.to_string().contains("65536 fields exceed the limit of 65535"));
    }

    #[test]
    #[should_panic(expected = "invalid schema")]
    fn schema_new_panics_on_invalid_schema() {
        let _ = Schema::new("body", Vec::new(), 0);
    }

    #[test]
    fn value_reports_its_data_type() {
        assert_eq!(Value::Int64(1).data_type(), DataType::Int64);
        assert_eq!(Value::Float64(1.0).data_type(), DataType::Float64);
        assert_eq!(Value::Utf8(String::new()).data_type(), DataType::Utf8);
        assert_eq!(DataType::Utf8.to_string(), "string");
    }
}
