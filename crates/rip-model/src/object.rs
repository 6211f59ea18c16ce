use std::fmt;

use serde::Serialize;

use crate::value::Record;
use crate::version::Version;

/// Index of a loaded file inside a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

/// Identity of an object: owning file plus local path id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId {
    pub file: FileId,
    pub path_id: i64,
}

impl ObjectId {
    #[must_use]
    pub const fn new(file: FileId, path_id: i64) -> Self {
        Self { file, path_id }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.0, self.path_id)
    }
}

/// A decoded object together with its identity and source version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetObject {
    pub id: ObjectId,
    pub class_id: Option<i32>,
    pub version: Version,
    pub data: Record,
}

impl AssetObject {
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.data.type_name()
    }
}
