//! The registry seam and the resolver that queries it.

use rip_model::{AssetObject, FileId, ObjectId, PPtr};

/// Read-only index over loaded files and their objects.
///
/// Implemented by [`Collection`](crate::Collection); callers holding their
/// own index can implement it to reuse the resolver and the closure walk.
pub trait Registry {
    /// Object stored under `path_id` in `file`.
    fn object(&self, file: FileId, path_id: i64) -> Option<&AssetObject>;

    /// File addressed by the 1-based dependency slot `file_index` of `from`.
    fn dependency(&self, from: FileId, file_index: i32) -> Option<FileId>;

    /// Asset guid of a file, when the file has one.
    fn file_guid(&self, file: FileId) -> Option<[u8; 16]>;

    fn file_name(&self, file: FileId) -> Option<&str>;
}

/// Resolves weak references read inside one file against a registry.
///
/// The resolver only borrows the registry. Every lookup that cannot be
/// satisfied is `None`: null pointers, dependency slots the file does not
/// have, dependencies that were never loaded and path ids nobody stores.
#[derive(Debug)]
pub struct Resolver<'r, R: Registry + ?Sized> {
    registry: &'r R,
}

impl<R: Registry + ?Sized> Clone for Resolver<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Registry + ?Sized> Copy for Resolver<'_, R> {}

impl<'r, R: Registry + ?Sized> Resolver<'r, R> {
    #[must_use]
    pub const fn new(registry: &'r R) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &'r R {
        self.registry
    }

    /// File that `ptr`, read inside `from`, points into.
    #[must_use]
    pub fn resolve_file(&self, from: FileId, ptr: PPtr) -> Option<FileId> {
        match ptr.file_id {
            0 => Some(from),
            index if index > 0 => self.registry.dependency(from, index),
            _ => None,
        }
    }

    /// Identity of the object `ptr` names, whether or not it is loaded.
    #[must_use]
    pub fn resolve_id(&self, from: FileId, ptr: PPtr) -> Option<ObjectId> {
        if ptr.is_null() {
            return None;
        }
        let file = self.resolve_file(from, ptr)?;
        Some(ObjectId::new(file, ptr.path_id))
    }

    /// The object `ptr` points at, or `None` when it dangles.
    #[must_use]
    pub fn resolve(&self, from: FileId, ptr: PPtr) -> Option<&'r AssetObject> {
        let id = self.resolve_id(from, ptr)?;
        self.registry.object(id.file, id.path_id)
    }

    /// Like [`Resolver::resolve`], but only when the target has `type_name`.
    #[must_use]
    pub fn resolve_as(&self, from: FileId, ptr: PPtr, type_name: &str) -> Option<&'r AssetObject> {
        self.resolve(from, ptr)
            .filter(|object| object.type_name() == type_name)
    }
}
