//! Versioned binary encoding of a record set.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! "MMDB"                              magic, 4 bytes
//! [u16 version]                       FORMAT_VERSION
//! [u16 len][table name]               UTF-8
//! [u16 field_count]
//!   [u8 type tag][u16 len][name]      per field; tag 1=int, 2=float, 3=string
//! [u16 primary key index]
//! [u32 record_count]
//!   per record, per field in schema order:
//!     int    -> [i64]
//!     float  -> [f64 bits]
//!     string -> [u32 len][UTF-8 bytes]
//! ```
//!
//! The schema is embedded so a blob written for one record layout is never decoded as another.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::{LoadError, LoadResult};
use crate::types::{DataType, Field, MasterRecord, Schema, Value};

use super::Database;

/// Magic prefix of every blob.
pub const MAGIC: &[u8; 4] = b"MMDB";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

const TAG_INT: u8 = 1;
const TAG_FLOAT: u8 = 2;
const TAG_STRING: u8 = 3;

/// Encode `records` (in order) with the schema of `R`.
///
/// Limits: at most `u32::MAX` records and string values of at most `u32::MAX` bytes. Names
/// and the field count fit in `u16` for every schema built through [`Schema::try_new`].
pub fn encode_records<R: MasterRecord>(records: &[R]) -> Vec<u8> {
    let schema = R::schema();
    let mut out = Vec::with_capacity(64 + records.len() * schema.fields.len() * 8);

    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    write_short_str(&mut out, &schema.table);
    write_u16(&mut out, schema.fields.len());
    for field in &schema.fields {
        out.push(type_tag(field.data_type));
        write_short_str(&mut out, &field.name);
    }
    write_u16(&mut out, schema.primary_key);

    write_u32(&mut out, records.len());
    for record in records {
        for value in record.to_values() {
            match value {
                Value::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
                Value::Float64(v) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
                Value::Utf8(s) => {
                    write_u32(&mut out, s.len());
                    out.extend_from_slice(s.as_bytes());
                }
            }
        }
    }
    out
}

/// Decode a blob into a sealed [`Database`].
///
/// Fails on a wrong magic/version, a schema that differs from `R`'s, truncated or trailing
/// data, invalid UTF-8, or duplicate primary keys.
pub fn decode_records<R: MasterRecord>(bytes: &[u8]) -> LoadResult<Database<R>> {
    let mut rd = ByteReader::new(bytes);

    if rd.take(MAGIC.len())? != MAGIC {
        return Err(rd.error_at(0, "bad magic"));
    }
    let version = rd.read_u16()?;
    if version != FORMAT_VERSION {
        return Err(rd.error_at(
            MAGIC.len(),
            format!("unsupported version {version} (expected {FORMAT_VERSION})"),
        ));
    }

    let schema_start = rd.pos;
    let embedded = read_schema(&mut rd)?;
    let expected = R::schema();
    if !same_layout(&embedded, expected) {
        return Err(rd.error_at(
            schema_start,
            format!(
                "schema mismatch: blob has table '{}' with fields [{}], expected table '{}' with fields [{}]",
                embedded.table,
                embedded.field_names().collect::<Vec<_>>().join(", "),
                expected.table,
                expected.field_names().collect::<Vec<_>>().join(", "),
            ),
        ));
    }

    let count = rd.read_u32()? as usize;
    // Every field takes at least 4 bytes, so a huge count cannot fit in a short blob.
    let mut records = Vec::with_capacity(count.min(rd.remaining() / 4 + 1));
    let mut index = HashMap::with_capacity(records.capacity());
    for _ in 0..count {
        let record_start = rd.pos;
        let mut values = Vec::with_capacity(expected.fields.len());
        for field in &expected.fields {
            values.push(read_value(&mut rd, field.data_type)?);
        }
        let record = R::from_values(values).map_err(|e| rd.error_at(record_start, e.to_string()))?;
        match index.entry(record.key()) {
            Entry::Occupied(e) => {
                return Err(rd.error_at(
                    record_start,
                    format!("duplicate primary key {:?}", e.key()),
                ));
            }
            Entry::Vacant(e) => {
                e.insert(records.len());
            }
        }
        records.push(record);
    }

    if rd.remaining() != 0 {
        return Err(rd.error_at(rd.pos, format!("{} trailing bytes", rd.remaining())));
    }

    Ok(Database::from_parts(records, index))
}

fn read_schema(rd: &mut ByteReader<'_>) -> LoadResult<Schema> {
    let table = rd.read_short_str()?;
    let field_count = rd.read_u16()? as usize;
    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        let tag_pos = rd.pos;
        let data_type = match rd.read_u8()? {
            TAG_INT => DataType::Int64,
            TAG_FLOAT => DataType::Float64,
            TAG_STRING => DataType::Utf8,
            other => return Err(rd.error_at(tag_pos, format!("unknown type tag {other}"))),
        };
        fields.push(Field::new(rd.read_short_str()?, data_type));
    }
    let primary_key = rd.read_u16()? as usize;
    let pos = rd.pos;
    Schema::try_new(table, fields, primary_key).map_err(|e| rd.error_at(pos, e.to_string()))
}

// Field constraints are not stored; only names, types and key position must agree.
fn same_layout(a: &Schema, b: &Schema) -> bool {
    a.table == b.table
        && a.primary_key == b.primary_key
        && a.fields.len() == b.fields.len()
        && a.fields
            .iter()
            .zip(&b.fields)
            .all(|(x, y)| x.name == y.name && x.data_type == y.data_type)
}

fn read_value(rd: &mut ByteReader<'_>, data_type: DataType) -> LoadResult<Value> {
    Ok(match data_type {
        DataType::Int64 => Value::Int64(i64::from_le_bytes(rd.read_8()?)),
        DataType::Float64 => Value::Float64(f64::from_bits(u64::from_le_bytes(rd.read_8()?))),
        DataType::Utf8 => {
            let len = rd.read_u32()? as usize;
            Value::Utf8(rd.read_str(len)?)
        }
    })
}

fn type_tag(data_type: DataType) -> u8 {
    match data_type {
        DataType::Int64 => TAG_INT,
        DataType::Float64 => TAG_FLOAT,
        DataType::Utf8 => TAG_STRING,
    }
}

fn write_u16(out: &mut Vec<u8>, value: usize) {
    debug_assert!(value <= usize::from(u16::MAX), "{value} does not fit the u16 prefix");
    out.extend_from_slice(&u16::try_from(value).unwrap_or(u16::MAX).to_le_bytes());
}

fn write_u32(out: &mut Vec<u8>, value: usize) {
    debug_assert!(u32::try_from(value).is_ok(), "{value} does not fit the u32 prefix");
    out.extend_from_slice(&u32::try_from(value).unwrap_or(u32::MAX).to_le_bytes());
}

fn write_short_str(out: &mut Vec<u8>, s: &str) {
    write_u16(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> LoadError {
        LoadError::Binary {
            offset,
            message: message.into(),
        }
    }

    fn take(&mut self, n: usize) -> LoadResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.error_at(
                self.pos,
                format!("truncated: need {n} bytes, {} left", self.remaining()),
            ));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_u8(&mut self) -> LoadResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> LoadResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> LoadResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_8(&mut self) -> LoadResult<[u8; 8]> {
        let mut out = [0u8; 8];
        out.copy_from_slice(self.take(8)?);
        Ok(out)
    }

    fn read_str(&mut self, len: usize) -> LoadResult<String> {
        let start = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| self.error_at(start, e.to_string()))
    }

    fn read_short_str(&mut self) -> LoadResult<String> {
        let len = self.read_u16()? as usize;
        self.read_str(len)
    }
}
