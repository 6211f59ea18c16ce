//! Two-phase batch loading.
//!
//! Phase one decodes every file in parallel, each object from its own
//! cursor. Phase two builds the [`Collection`] from the decoded files, so
//! resolution only ever sees complete files.

use std::collections::BTreeMap;

use rayon::prelude::*;
use rip_binary::{AssetReader, Endian};
use rip_model::{FileId, Record, Version};
use rip_schema::{EngineError, SchemaCatalog, TypeSchema, decode, decode_class};
use tracing::{debug, warn};

use crate::collection::Collection;
use crate::error::{LoadError, Result};

/// How an object's type is identified in its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectType {
    ClassId(i32),
    Name(String),
}

/// An undecoded object: its path id, its type and its exact bytes.
#[derive(Debug, Clone)]
pub struct RawObject {
    pub path_id: i64,
    pub object_type: ObjectType,
    pub bytes: Vec<u8>,
}

impl RawObject {
    pub fn new(path_id: i64, object_type: ObjectType, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path_id,
            object_type,
            bytes: bytes.into(),
        }
    }
}

/// An undecoded serialized file as handed over by the container layer.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub guid: Option<[u8; 16]>,
    pub version: Version,
    pub endian: Endian,
    pub dependencies: Vec<String>,
    pub objects: Vec<RawObject>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            guid: None,
            version,
            endian: Endian::default(),
            dependencies: Vec::new(),
            objects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_guid(mut self, guid: [u8; 16]) -> Self {
        self.guid = Some(guid);
        self
    }

    #[must_use]
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    #[must_use]
    pub fn with_object(mut self, object: RawObject) -> Self {
        self.objects.push(object);
        self
    }
}

/// What to do with the rest of a file once one of its objects fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and keep decoding the file.
    #[default]
    SkipObject,
    /// Drop the whole file from the batch.
    AbortFile,
}

/// Options for [`load_batch`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub policy: FailurePolicy,
    /// Treat a decoder that does not consume exactly the object's bytes as
    /// a failure instead of a warning.
    pub strict_length: bool,
}

impl LoadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable strict length checking.
    #[must_use]
    pub fn strict_length(mut self) -> Self {
        self.strict_length = true;
        self
    }
}

/// An object that could not be loaded.
#[derive(Debug)]
pub struct ObjectFailure {
    pub path_id: i64,
    pub error: LoadError,
}

/// Outcome of loading one input file.
#[derive(Debug)]
pub struct FileReport {
    /// Id in the collection; `None` when the file was aborted.
    pub file: Option<FileId>,
    pub name: String,
    pub loaded: usize,
    pub failures: Vec<ObjectFailure>,
    pub aborted: bool,
}

/// Per-file outcomes, in input order.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub files: Vec<FileReport>,
}

impl LoadReport {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.files.iter().map(|file| file.failures.len()).sum()
    }

    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.files.iter().map(|file| file.loaded).sum()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.files
            .iter()
            .all(|file| file.failures.is_empty() && !file.aborted)
    }
}

/// A loaded batch, ready for resolution.
#[derive(Debug)]
pub struct LoadedBatch {
    pub collection: Collection,
    pub report: LoadReport,
}

struct DecodedObject {
    class_id: Option<i32>,
    record: Record,
}

struct DecodedFile<'f> {
    raw: &'f RawFile,
    objects: BTreeMap<i64, DecodedObject>,
    failures: Vec<ObjectFailure>,
    aborted: bool,
}

/// Decode every file of a batch and index the result.
///
/// Files decode in parallel; the catalog is shared read-only. Object
/// failures never cross file boundaries. Files that were aborted under
/// [`FailurePolicy::AbortFile`] are left out of the collection, so
/// references into them dangle.
pub fn load_batch(
    catalog: &SchemaCatalog,
    files: &[RawFile],
    options: &LoadOptions,
) -> LoadedBatch {
    let decoded: Vec<DecodedFile<'_>> = files
        .par_iter()
        .map(|file| decode_file(catalog, file, options))
        .collect();

    let mut collection = Collection::new();
    let mut report = LoadReport::default();
    for file in decoded {
        let raw = file.raw;
        let mut id = None;
        let mut loaded = 0;
        if !file.aborted {
            let target = collection.add_file(raw.name.clone(), raw.version);
            if let Some(guid) = raw.guid {
                target.set_guid(guid);
            }
            for dependency in &raw.dependencies {
                target.add_dependency(dependency.clone());
            }
            loaded = file.objects.len();
            for (path_id, object) in file.objects {
                target.insert(path_id, object.class_id, object.record);
            }
            id = Some(target.id());
        }
        report.files.push(FileReport {
            file: id,
            name: raw.name.clone(),
            loaded,
            failures: file.failures,
            aborted: file.aborted,
        });
    }

    debug!(
        files = report.files.len(),
        objects = report.loaded_count(),
        failures = report.failure_count(),
        "loaded batch"
    );
    LoadedBatch { collection, report }
}

fn decode_file<'f>(
    catalog: &SchemaCatalog,
    raw: &'f RawFile,
    options: &LoadOptions,
) -> DecodedFile<'f> {
    let mut file = DecodedFile {
        raw,
        objects: BTreeMap::new(),
        failures: Vec::new(),
        aborted: false,
    };

    for object in &raw.objects {
        let decoded = if file.objects.contains_key(&object.path_id) {
            Err(LoadError::DuplicatePathId {
                path_id: object.path_id,
            })
        } else {
            decode_object(catalog, raw, object, options)
        };

        match decoded {
            Ok(decoded) => {
                file.objects.insert(object.path_id, decoded);
            }
            Err(error) => {
                warn!(file = %raw.name, path_id = object.path_id, %error, "object failed to load");
                file.failures.push(ObjectFailure {
                    path_id: object.path_id,
                    error,
                });
                if options.policy == FailurePolicy::AbortFile {
                    warn!(file = %raw.name, "aborting file");
                    file.aborted = true;
                    file.objects.clear();
                    break;
                }
            }
        }
    }
    file
}

fn decode_object(
    catalog: &SchemaCatalog,
    file: &RawFile,
    object: &RawObject,
    options: &LoadOptions,
) -> Result<DecodedObject> {
    let mut reader = AssetReader::new(&object.bytes, file.version).with_endian(file.endian);
    let (class_id, record) = match &object.object_type {
        ObjectType::ClassId(class_id) => {
            let record = decode_class(catalog, *class_id, &mut reader)?;
            (Some(*class_id), record)
        }
        ObjectType::Name(name) => {
            let record = decode(catalog, name, &mut reader)?;
            (catalog.get(name).and_then(TypeSchema::class_id), record)
        }
    };

    let consumed = reader.position();
    if consumed != object.bytes.len() {
        let mismatch = EngineError::LengthMismatch {
            type_name: record.type_name().to_string(),
            version: file.version,
            offset: consumed,
            expected: object.bytes.len(),
            consumed,
        };
        if options.strict_length {
            return Err(mismatch.into());
        }
        warn!(file = %file.name, path_id = object.path_id, error = %mismatch, "length mismatch");
    }
    Ok(DecodedObject { class_id, record })
}
