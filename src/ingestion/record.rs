//! Row parser: tokens of one line to a typed record.

use crate::types::{DataType, Field, MasterRecord, Schema, Value};

use super::diagnostics::{DiagnosticCause, ParseDiagnostic};

/// Parse one tokenized row into a record of type `R`.
///
/// Validation order:
///
/// 1. the row must have at least [`Schema::required_columns`] tokens (extra trailing columns
///    are ignored);
/// 2. every field is coerced to its declared [`DataType`] with a locale-independent format
///    (`.` decimal point, no grouping separators);
/// 3. the typed values are handed to [`MasterRecord::from_values`].
///
/// There is no defaulting: the first failing field rejects the whole row. `line`/`row` only
/// label the returned diagnostic.
pub fn parse_record<R: MasterRecord>(
    line: usize,
    row: Option<usize>,
    tokens: &[String],
) -> Result<R, ParseDiagnostic> {
    let values = match parse_values(R::schema(), tokens) {
        Ok(values) => values,
        Err(cause) => return Err(ParseDiagnostic::row(line, row, tokens.to_vec(), cause)),
    };
    R::from_values(values).map_err(|e| {
        ParseDiagnostic::row(
            line,
            row,
            tokens.to_vec(),
            DiagnosticCause::RecordConstruction {
                message: e.to_string(),
            },
        )
    })
}

/// Coerce the leading tokens of a row into values in schema order.
pub fn parse_values(schema: &Schema, tokens: &[String]) -> Result<Vec<Value>, DiagnosticCause> {
    let expected = schema.required_columns();
    if tokens.len() < expected {
        return Err(DiagnosticCause::RowShape {
            expected,
            found: tokens.len(),
        });
    }

    schema
        .fields
        .iter()
        .zip(tokens)
        .enumerate()
        .map(|(index, (field, raw))| coerce_value(index, field, raw))
        .collect()
}

/// Convert a single token to the field's [`DataType`].
pub fn coerce_value(index: usize, field: &Field, raw: &str) -> Result<Value, DiagnosticCause> {
    let fail = |message: String| DiagnosticCause::FieldCoercion {
        index,
        field: field.name.clone(),
        data_type: field.data_type,
        raw: raw.to_owned(),
        message,
    };

    let trimmed = raw.trim();
    match field.data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => {
            let v = trimmed.parse::<i64>().map_err(|e| fail(e.to_string()))?;
            if field.non_negative && v < 0 {
                return Err(fail("must be non-negative".to_string()));
            }
            Ok(Value::Int64(v))
        }
        DataType::Float64 => {
            let v = trimmed.parse::<f64>().map_err(|e| fail(e.to_string()))?;
            if !v.is_finite() {
                return Err(fail("must be a finite number".to_string()));
            }
            if field.non_negative && v < 0.0 {
                return Err(fail("must be non-negative".to_string()));
            }
            Ok(Value::Float64(v))
        }
    }
}
