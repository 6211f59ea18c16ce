//! Builds export trees from decoded objects.

use std::borrow::Cow;

use rip_model::{AssetObject, FileId, PPtr, Record, Value, Version};
use rip_resolve::{Registry, Resolver};
use rip_schema::{EngineError, FieldKind, SchemaCatalog, TypeSchema, default_value};
use serde::Serialize;
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::format::wrap_integer;
use crate::node::{ExportNode, MappingStyle, SequenceStyle};

/// `type` value of a pointer into another asset file.
const EXTERNAL_ASSET_TYPE: i64 = 2;

/// Options for [`Exporter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Emit the newest `serializedVersion` of each type regardless of the
    /// source version.
    pub topmost_revision: bool,
}

impl ExportOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn topmost_revision(mut self) -> Self {
        self.topmost_revision = true;
        self
    }
}

/// One exported object: the `--- !u!<class> &<path>` header data and the
/// tree under the root key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub class_id: i32,
    pub path_id: i64,
    pub root_name: String,
    pub node: ExportNode,
}

/// Turns decoded objects into export trees.
///
/// The registry is consulted only to render pointers into other files.
#[derive(Debug)]
pub struct Exporter<'a, R: Registry + ?Sized> {
    catalog: &'a SchemaCatalog,
    resolver: Resolver<'a, R>,
    options: ExportOptions,
}

/// Where a value sits while it is being exported.
struct Site<'s> {
    schema: &'s TypeSchema,
    field: &'s str,
    version: Version,
    file: FileId,
}

impl<'a, R: Registry + ?Sized> Exporter<'a, R> {
    pub const fn new(catalog: &'a SchemaCatalog, registry: &'a R) -> Self {
        Self {
            catalog,
            resolver: Resolver::new(registry),
            options: ExportOptions {
                topmost_revision: false,
            },
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn options(&self) -> ExportOptions {
        self.options
    }

    pub fn export(&self, object: &AssetObject) -> Result<ExportDocument> {
        let schema = self.schema(object.type_name())?;
        if !schema.supports(&object.version) {
            return Err(EngineError::UnsupportedVersion {
                type_name: schema.name().to_string(),
                version: object.version,
                offset: 0,
            }
            .into());
        }
        let class_id = object
            .class_id
            .or_else(|| schema.class_id())
            .ok_or_else(|| ExportError::MissingClassId {
                type_name: schema.name().to_string(),
            })?;

        let node = self.record_node(schema, &object.data, object.version, object.id.file)?;
        debug!(type_name = schema.name(), path_id = object.id.path_id, "exported object");
        Ok(ExportDocument {
            class_id,
            path_id: object.id.path_id,
            root_name: schema.name().to_string(),
            node,
        })
    }

    /// Export several objects, stopping at the first failure.
    pub fn export_all<'o>(
        &self,
        objects: impl IntoIterator<Item = &'o AssetObject>,
    ) -> Result<Vec<ExportDocument>> {
        objects.into_iter().map(|object| self.export(object)).collect()
    }

    /// Export tree of one record, with `serializedVersion` first when the
    /// type declares revisions.
    pub fn record_node(
        &self,
        schema: &TypeSchema,
        record: &Record,
        version: Version,
        file: FileId,
    ) -> Result<ExportNode> {
        let mut entries = Vec::with_capacity(schema.fields().len() + 1);
        if let Some(revision) = schema.revision(&version, self.options.topmost_revision) {
            entries.push((
                "serializedVersion".to_string(),
                ExportNode::scalar(i64::from(revision)),
            ));
        }

        for (index, decl) in schema.fields().iter().enumerate() {
            let stored = record
                .get(decl.name())
                .filter(|_| schema.is_present_at(index, &version));
            let value = match stored {
                Some(value) => Cow::Borrowed(value),
                None => Cow::Owned(default_value(self.catalog, decl, version, record)),
            };
            let site = Site {
                schema,
                field: decl.name(),
                version,
                file,
            };
            let node = self.value_node(&site, decl.kind(), &value)?;
            entries.push((decl.name().to_string(), node));
        }

        let style = if schema.is_flow() {
            MappingStyle::Flow
        } else {
            MappingStyle::Block
        };
        Ok(ExportNode::mapping(style, entries))
    }

    fn value_node(&self, site: &Site<'_>, kind: &FieldKind, value: &Value) -> Result<ExportNode> {
        let node = match (kind, value) {
            (FieldKind::Bool, Value::Bool(flag)) => ExportNode::scalar(*flag),
            (kind, Value::Int(int)) if kind.is_integer() => ExportNode::Scalar {
                value: wrap_integer(kind, *int),
            },
            (FieldKind::F32, Value::Float(real)) => ExportNode::scalar(*real),
            (FieldKind::String, Value::String(text)) => ExportNode::scalar(text.as_str()),
            (FieldKind::Bytes, Value::Bytes(bytes)) => ExportNode::bytes(bytes),
            (FieldKind::PPtr, Value::PPtr(ptr)) => self.pptr_node(site.file, *ptr),
            (FieldKind::Array(inner), Value::Array(items)) => ExportNode::Sequence {
                style: SequenceStyle::Block,
                items: items
                    .iter()
                    .map(|item| self.value_node(site, inner, item))
                    .collect::<Result<_>>()?,
            },
            (FieldKind::Record(name), Value::Record(nested)) => {
                let schema = self.schema(name)?;
                self.record_node(schema, nested, site.version, site.file)?
            }
            (expected, found) => {
                return Err(ExportError::ValueMismatch {
                    type_name: site.schema.name().to_string(),
                    field: site.field.to_string(),
                    expected: expected.to_string(),
                    found: found.kind_name(),
                });
            }
        };
        Ok(node)
    }

    /// `{fileID: ...}` form of a pointer read in `file`.
    ///
    /// Pointers into other files carry that file's guid; when the target
    /// file or its guid is unknown the pointer exports as null.
    #[must_use]
    pub fn pptr_node(&self, file: FileId, ptr: PPtr) -> ExportNode {
        let entry = |key: &str, node: ExportNode| (key.to_string(), node);
        if ptr.is_null() {
            return null_pptr();
        }
        if ptr.file_id == 0 {
            return ExportNode::mapping(
                MappingStyle::Flow,
                vec![entry("fileID", ExportNode::scalar(ptr.path_id))],
            );
        }

        let guid = self
            .resolver
            .resolve_file(file, ptr)
            .and_then(|target| self.resolver.registry().file_guid(target));
        match guid {
            Some(guid) => ExportNode::mapping(
                MappingStyle::Flow,
                vec![
                    entry("fileID", ExportNode::scalar(ptr.path_id)),
                    entry("guid", ExportNode::scalar(hex::encode(guid))),
                    entry("type", ExportNode::scalar(EXTERNAL_ASSET_TYPE)),
                ],
            ),
            None => {
                debug!(%ptr, file = file.0, "pointer into an unknown file exported as null");
                null_pptr()
            }
        }
    }

    fn schema(&self, type_name: &str) -> Result<&'a TypeSchema> {
        self.catalog.get(type_name).ok_or_else(|| {
            EngineError::UnknownType {
                type_name: type_name.to_string(),
            }
            .into()
        })
    }
}

fn null_pptr() -> ExportNode {
    ExportNode::mapping(
        MappingStyle::Flow,
        vec![("fileID".to_string(), ExportNode::scalar(0i64))],
    )
}
