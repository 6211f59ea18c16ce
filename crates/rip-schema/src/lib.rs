//! Declarative, version-gated type layouts and the engine that runs them.
//!
//! A [`SchemaCatalog`] is compiled from TOML tables. Each type lists its
//! fields (export order) and an ordered layout of `read`, `align` and
//! `bitmask` steps (wire order), each optionally gated by a named version
//! predicate. One generic engine interprets the catalog:
//!
//! - [`decode`] walks an [`AssetReader`](rip_binary::AssetReader) and fills
//!   fields the version never wrote with [`default_value`];
//! - [`encode`] runs the same steps into an
//!   [`AssetWriter`](rip_binary::AssetWriter);
//! - [`TypeSchema::is_present`] tells decode, encode and export alike whether
//!   a field exists at a version.
//!
//! # Example
//!
//! ```
//! use rip_binary::AssetReader;
//! use rip_schema::{SchemaCatalog, decode};
//!
//! let catalog = SchemaCatalog::builtin().unwrap();
//! let version = "5.5.0f3".parse().unwrap();
//! let bytes = [0u8, 0, 128, 63, 0, 0, 0, 64, 0, 0, 64, 64];
//! let mut reader = AssetReader::new(&bytes, version);
//! let pivot = decode(catalog, "Vector3f", &mut reader).unwrap();
//! assert_eq!(pivot.float("y").unwrap(), 2.0);
//! ```

#![deny(unsafe_code)]

pub mod catalog;
mod decode;
pub mod default;
mod encode;
mod error;
pub mod kind;
pub mod predicate;
pub mod revision;
pub mod schema;

pub use catalog::{BUILTIN_SCHEMAS, SchemaCatalog};
pub use decode::{decode, decode_class, mask_indices};
pub use default::{DefaultRule, default_record, default_value, zero_value};
pub use encode::encode;
pub use error::{EngineError, Result, SchemaError, SchemaResult};
pub use kind::FieldKind;
pub use predicate::{Condition, VersionRange};
pub use revision::{RevisionRule, select_revision};
pub use schema::{FieldDecl, Step, StepOp, TypeSchema, describe_step};
