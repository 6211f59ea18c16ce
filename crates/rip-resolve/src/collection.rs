//! In-memory multi-file registry.

use std::collections::BTreeMap;

use rip_model::{AssetObject, FileId, ObjectId, Record, Version};

use crate::registry::Registry;

/// One loaded serialized file.
#[derive(Debug, Clone)]
pub struct SerializedFile {
    id: FileId,
    name: String,
    guid: Option<[u8; 16]>,
    version: Version,
    dependencies: Vec<String>,
    objects: BTreeMap<i64, AssetObject>,
}

impl SerializedFile {
    #[must_use]
    pub const fn id(&self) -> FileId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn guid(&self) -> Option<[u8; 16]> {
        self.guid
    }

    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Names of the files this file's pointers address, in slot order.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    #[must_use]
    pub fn object(&self, path_id: i64) -> Option<&AssetObject> {
        self.objects.get(&path_id)
    }

    /// Objects in ascending path id order.
    pub fn objects(&self) -> impl Iterator<Item = &AssetObject> {
        self.objects.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn set_guid(&mut self, guid: [u8; 16]) -> &mut Self {
        self.guid = Some(guid);
        self
    }

    /// Append a dependency; the first one is addressed by `fileID` 1.
    pub fn add_dependency(&mut self, name: impl Into<String>) -> &mut Self {
        self.dependencies.push(name.into());
        self
    }

    /// Store a decoded record under `path_id`, replacing any previous object.
    pub fn insert(&mut self, path_id: i64, class_id: Option<i32>, data: Record) -> &mut Self {
        let object = AssetObject {
            id: ObjectId::new(self.id, path_id),
            class_id,
            version: self.version,
            data,
        };
        self.objects.insert(path_id, object);
        self
    }
}

/// Every file of a batch, addressable by id and by name.
///
/// Dependency slots are matched against file names. When two files share a
/// name the first one added wins.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    files: Vec<SerializedFile>,
    by_name: BTreeMap<String, FileId>,
}

impl Collection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty file and return it for filling in.
    pub fn add_file(&mut self, name: impl Into<String>, version: Version) -> &mut SerializedFile {
        let id = FileId(self.files.len() as u32);
        let name = name.into();
        self.by_name.entry(name.clone()).or_insert(id);
        self.files.push(SerializedFile {
            id,
            name,
            guid: None,
            version,
            dependencies: Vec::new(),
            objects: BTreeMap::new(),
        });
        let index = self.files.len() - 1;
        &mut self.files[index]
    }

    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&SerializedFile> {
        self.files.get(id.0 as usize)
    }

    #[must_use]
    pub fn file_by_name(&self, name: &str) -> Option<&SerializedFile> {
        self.by_name.get(name).and_then(|id| self.file(*id))
    }

    pub fn files(&self) -> impl Iterator<Item = &SerializedFile> {
        self.files.iter()
    }

    /// Every object of every file, file by file.
    pub fn objects(&self) -> impl Iterator<Item = &AssetObject> {
        self.files.iter().flat_map(SerializedFile::objects)
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&AssetObject> {
        self.object(id.file, id.path_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Registry for Collection {
    fn object(&self, file: FileId, path_id: i64) -> Option<&AssetObject> {
        self.file(file)?.object(path_id)
    }

    fn dependency(&self, from: FileId, file_index: i32) -> Option<FileId> {
        let slot = usize::try_from(file_index).ok()?.checked_sub(1)?;
        let name = self.file(from)?.dependencies.get(slot)?;
        self.by_name.get(name).copied()
    }

    fn file_guid(&self, file: FileId) -> Option<[u8; 16]> {
        self.file(file)?.guid
    }

    fn file_name(&self, file: FileId) -> Option<&str> {
        self.file(file).map(SerializedFile::name)
    }
}
