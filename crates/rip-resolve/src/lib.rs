//! Weak reference resolution over batches of decoded asset files.
//!
//! - [`Registry`]: the read-only index the resolver queries
//! - [`Resolver`]: turns a `(fileID, pathID)` pointer read in one file into
//!   the object it names, or `None`
//! - [`enumerate_dependencies`] / [`dependency_closure`]: one-hop and
//!   transitive reference walks
//! - [`Collection`]: the in-memory registry
//! - [`load_batch`]: parallel two-phase decoding of raw files into a
//!   [`Collection`]
//!
//! # Example
//!
//! ```
//! use rip_model::{FileId, PPtr, Record};
//! use rip_resolve::{Collection, Resolver};
//!
//! let mut collection = Collection::new();
//! collection
//!     .add_file("level0", "5.6.1f1".parse().unwrap())
//!     .insert(1, Some(1), Record::new("GameObject"));
//!
//! let resolver = Resolver::new(&collection);
//! assert!(resolver.resolve(FileId(0), PPtr::local(1)).is_some());
//! assert!(resolver.resolve(FileId(0), PPtr::local(2)).is_none());
//! assert!(resolver.resolve(FileId(0), PPtr::new(3, 1)).is_none());
//! ```

#![deny(unsafe_code)]

mod collection;
mod dependencies;
mod error;
mod loader;
mod registry;

pub use collection::{Collection, SerializedFile};
pub use dependencies::{
    Closure, DanglingReference, Dependencies, Dependency, declared_dependency_closure,
    dependency_closure, enumerate_declared_dependencies, enumerate_dependencies,
};
pub use error::{LoadError, Result};
pub use loader::{
    FailurePolicy, FileReport, LoadOptions, LoadReport, LoadedBatch, ObjectFailure, ObjectType,
    RawFile, RawObject, load_batch,
};
pub use registry::{Registry, Resolver};
