//! Schema-driven decoding.

use rip_binary::AssetReader;
use rip_model::{Record, Value, Version};
use tracing::{debug, trace};

use crate::catalog::SchemaCatalog;
use crate::default::default_value;
use crate::error::{EngineError, Result};
use crate::kind::FieldKind;
use crate::schema::{StepOp, TypeSchema};

/// Decode one object of `type_name` from `reader`.
///
/// Steps run in layout order; fields no executed step wrote are filled with
/// their version-consistent default afterwards.
pub fn decode(
    catalog: &SchemaCatalog,
    type_name: &str,
    reader: &mut AssetReader<'_>,
) -> Result<Record> {
    let schema = catalog
        .get(type_name)
        .ok_or_else(|| EngineError::UnknownType {
            type_name: type_name.to_string(),
        })?;
    decode_schema(catalog, schema, reader)
}

/// Decode one object whose type is given by class id.
pub fn decode_class(
    catalog: &SchemaCatalog,
    class_id: i32,
    reader: &mut AssetReader<'_>,
) -> Result<Record> {
    let schema = catalog
        .by_class_id(class_id)
        .ok_or(EngineError::UnknownClassId { class_id })?;
    decode_schema(catalog, schema, reader)
}

fn decode_schema(
    catalog: &SchemaCatalog,
    schema: &TypeSchema,
    reader: &mut AssetReader<'_>,
) -> Result<Record> {
    let version = reader.version();
    ensure_supported(schema, version, reader.position())?;
    let start = reader.position();
    let record = decode_record(catalog, schema, reader)?;
    debug!(
        type_name = schema.name(),
        %version,
        bytes = reader.position() - start,
        "decoded object"
    );
    Ok(record)
}

pub(crate) fn ensure_supported(schema: &TypeSchema, version: Version, offset: usize) -> Result<()> {
    if schema.supports(&version) {
        Ok(())
    } else {
        Err(EngineError::UnsupportedVersion {
            type_name: schema.name().to_string(),
            version,
            offset,
        })
    }
}

fn decode_record(
    catalog: &SchemaCatalog,
    schema: &TypeSchema,
    reader: &mut AssetReader<'_>,
) -> Result<Record> {
    let version = reader.version();
    let mut record = Record::new(schema.name());

    for step in schema.steps() {
        if !step.is_enabled(&version) {
            continue;
        }
        let offset = reader.position();
        match step.op() {
            StepOp::Read { field, wire } => {
                let decl = &schema.fields()[*field];
                let value = read_value(catalog, schema, wire, reader)?;
                trace!(type_name = schema.name(), field = decl.name(), offset, "read");
                record.set(decl.name(), value);
            }
            StepOp::Align(alignment) => {
                reader
                    .align(*alignment)
                    .map_err(|e| EngineError::cursor(e, schema.name(), version, offset))?;
                trace!(type_name = schema.name(), alignment, offset, "align");
            }
            StepOp::Bitmask { field, bits } => {
                let decl = &schema.fields()[*field];
                let mask = reader
                    .read_i32()
                    .map_err(|e| EngineError::cursor(e, schema.name(), version, offset))?;
                trace!(type_name = schema.name(), field = decl.name(), mask, offset, "bitmask");
                record.set(decl.name(), Value::Bytes(mask_indices(mask, *bits)));
            }
        }
    }

    for decl in schema.fields() {
        if !record.contains(decl.name()) {
            let value = default_value(catalog, decl, version, &record);
            record.set(decl.name(), value);
        }
    }
    Ok(record)
}

/// Indices of the set bits among the low `bits` bits of `mask`, ascending.
#[must_use]
pub fn mask_indices(mask: i32, bits: u8) -> Vec<u8> {
    (0..bits.min(32))
        .filter(|bit| mask & (1 << bit) != 0)
        .collect()
}

fn read_value(
    catalog: &SchemaCatalog,
    schema: &TypeSchema,
    wire: &FieldKind,
    reader: &mut AssetReader<'_>,
) -> Result<Value> {
    let version = reader.version();
    let offset = reader.position();
    let cursor = |e| EngineError::cursor(e, schema.name(), version, offset);

    let value = match wire {
        FieldKind::Bool => Value::Bool(reader.read_bool().map_err(cursor)?),
        FieldKind::U8 => Value::Int(i64::from(reader.read_u8().map_err(cursor)?)),
        FieldKind::I16 => Value::Int(i64::from(reader.read_i16().map_err(cursor)?)),
        FieldKind::U16 => Value::Int(i64::from(reader.read_u16().map_err(cursor)?)),
        FieldKind::I32 => Value::Int(i64::from(reader.read_i32().map_err(cursor)?)),
        FieldKind::U32 => Value::Int(i64::from(reader.read_u32().map_err(cursor)?)),
        FieldKind::I64 => Value::Int(reader.read_i64().map_err(cursor)?),
        // Stored bit-for-bit; encode and export reinterpret it as unsigned.
        FieldKind::U64 => Value::Int(reader.read_u64().map_err(cursor)?.cast_signed()),
        FieldKind::F32 => Value::Float(reader.read_f32().map_err(cursor)?),
        FieldKind::String => Value::String(reader.read_string().map_err(cursor)?),
        FieldKind::Bytes => Value::Bytes(reader.read_byte_array().map_err(cursor)?),
        FieldKind::PPtr => Value::PPtr(reader.read_pptr().map_err(cursor)?),
        FieldKind::Array(inner) => {
            let count = reader.read_length().map_err(cursor)?;
            let remaining = reader.remaining();
            let mut items = Vec::with_capacity(count.min(remaining));
            for index in 0..count {
                let start = reader.position();
                items.push(read_value(catalog, schema, inner, reader)?);
                // Items of one array share a width, so a zero-width first item
                // means the count alone decides how long this loop runs.
                if index == 0 && count > remaining && reader.position() == start {
                    return Err(EngineError::ImplausibleCount {
                        type_name: schema.name().to_string(),
                        version,
                        offset,
                        count,
                        remaining,
                    });
                }
            }
            Value::Array(items)
        }
        FieldKind::Record(name) => {
            let nested = catalog
                .get(name)
                .ok_or_else(|| EngineError::UnknownType {
                    type_name: name.clone(),
                })?;
            Value::Record(decode_record(catalog, nested, reader)?)
        }
    };
    Ok(value)
}
