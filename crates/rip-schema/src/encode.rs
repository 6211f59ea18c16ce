//! Schema-driven encoding; the inverse of [`decode`](crate::decode).

use std::borrow::Cow;

use rip_binary::AssetWriter;
use rip_model::{Record, Value, Version};
use tracing::trace;

use crate::catalog::SchemaCatalog;
use crate::decode::ensure_supported;
use crate::default::default_value;
use crate::error::{EngineError, Result};
use crate::kind::FieldKind;
use crate::schema::{StepOp, TypeSchema};

/// Encode `record` at the writer's version, using the schema named by the
/// record's type.
pub fn encode(catalog: &SchemaCatalog, record: &Record, writer: &mut AssetWriter) -> Result<()> {
    let schema = catalog
        .get(record.type_name())
        .ok_or_else(|| EngineError::UnknownType {
            type_name: record.type_name().to_string(),
        })?;
    ensure_supported(schema, writer.version(), writer.position())?;
    encode_record(catalog, schema, record, writer)
}

struct Site<'s> {
    schema: &'s TypeSchema,
    field: &'s str,
    version: Version,
}

impl Site<'_> {
    fn mismatch(&self, writer: &AssetWriter, expected: &FieldKind, found: &Value) -> EngineError {
        EngineError::ValueMismatch {
            type_name: self.schema.name().to_string(),
            field: self.field.to_string(),
            version: self.version,
            offset: writer.position(),
            expected: expected.to_string(),
            found: found.kind_name(),
        }
    }

    fn out_of_range(&self, writer: &AssetWriter, value: i64, wire: &FieldKind) -> EngineError {
        EngineError::ValueOutOfRange {
            type_name: self.schema.name().to_string(),
            field: self.field.to_string(),
            version: self.version,
            offset: writer.position(),
            value,
            wire: wire.to_string(),
        }
    }
}

fn encode_record(
    catalog: &SchemaCatalog,
    schema: &TypeSchema,
    record: &Record,
    writer: &mut AssetWriter,
) -> Result<()> {
    let version = writer.version();

    for step in schema.steps() {
        if !step.is_enabled(&version) {
            continue;
        }
        let offset = writer.position();
        match step.op() {
            StepOp::Read { field, wire } => {
                let decl = &schema.fields()[*field];
                let value = field_value(catalog, schema, *field, record, version);
                let site = Site {
                    schema,
                    field: decl.name(),
                    version,
                };
                write_value(catalog, &site, wire, &value, writer)?;
                trace!(type_name = schema.name(), field = decl.name(), offset, "write");
            }
            StepOp::Align(alignment) => {
                writer
                    .align(*alignment)
                    .map_err(|e| EngineError::cursor(e, schema.name(), version, offset))?;
            }
            StepOp::Bitmask { field, bits } => {
                let decl = &schema.fields()[*field];
                let value = field_value(catalog, schema, *field, record, version);
                let site = Site {
                    schema,
                    field: decl.name(),
                    version,
                };
                let Value::Bytes(indices) = value.as_ref() else {
                    return Err(site.mismatch(writer, &FieldKind::Bytes, &value));
                };
                let mut mask = 0i32;
                for &index in indices {
                    if index >= *bits {
                        return Err(site.out_of_range(
                            writer,
                            i64::from(index),
                            &FieldKind::I32,
                        ));
                    }
                    mask |= 1 << index;
                }
                writer
                    .write_i32(mask)
                    .map_err(|e| EngineError::cursor(e, schema.name(), version, offset))?;
                trace!(type_name = schema.name(), field = decl.name(), mask, offset, "bitmask");
            }
        }
    }
    Ok(())
}

/// The record's value for a field, or the field's default when the record
/// does not carry it.
fn field_value<'r>(
    catalog: &SchemaCatalog,
    schema: &TypeSchema,
    index: usize,
    record: &'r Record,
    version: Version,
) -> Cow<'r, Value> {
    let decl = &schema.fields()[index];
    match record.get(decl.name()) {
        Some(value) => Cow::Borrowed(value),
        None => Cow::Owned(default_value(catalog, decl, version, record)),
    }
}

fn write_value(
    catalog: &SchemaCatalog,
    site: &Site<'_>,
    wire: &FieldKind,
    value: &Value,
    writer: &mut AssetWriter,
) -> Result<()> {
    let offset = writer.position();
    let cursor = |e| EngineError::cursor(e, site.schema.name(), site.version, offset);
    match (wire, value) {
        (FieldKind::Bool, Value::Bool(flag)) => writer.write_bool(*flag).map_err(cursor),
        (wire, Value::Int(int)) if wire.is_integer() => {
            if !wire.fits(*int) {
                return Err(site.out_of_range(writer, *int, wire));
            }
            let int = *int;
            let written = match wire {
                FieldKind::U8 => writer.write_u8(int as u8),
                FieldKind::I16 => writer.write_i16(int as i16),
                FieldKind::U16 => writer.write_u16(int as u16),
                FieldKind::I32 => writer.write_i32(int as i32),
                FieldKind::U32 => writer.write_u32(int as u32),
                FieldKind::I64 => writer.write_i64(int),
                _ => writer.write_u64(int.cast_unsigned()),
            };
            written.map_err(cursor)
        }
        (FieldKind::F32, Value::Float(real)) => writer.write_f32(*real).map_err(cursor),
        (FieldKind::String, Value::String(text)) => writer.write_string(text).map_err(cursor),
        (FieldKind::Bytes, Value::Bytes(bytes)) => writer.write_byte_array(bytes).map_err(cursor),
        (FieldKind::PPtr, Value::PPtr(pptr)) => writer.write_pptr(*pptr).map_err(cursor),
        (FieldKind::Array(inner), Value::Array(items)) => {
            writer.write_length(items.len()).map_err(cursor)?;
            for item in items {
                write_value(catalog, site, inner, item, writer)?;
            }
            Ok(())
        }
        (FieldKind::Record(name), Value::Record(nested)) => {
            let schema = catalog
                .get(name)
                .ok_or_else(|| EngineError::UnknownType {
                    type_name: name.clone(),
                })?;
            encode_record(catalog, schema, nested, writer)
        }
        (expected, found) => Err(site.mismatch(writer, expected, found)),
    }
}
