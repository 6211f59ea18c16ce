//! Canonical export of decoded assets.
//!
//! An [`Exporter`] turns each [`AssetObject`](rip_model::AssetObject) into an
//! [`ExportDocument`]: the type's `serializedVersion` (when it declares
//! revisions), then every field in declaration order, base fields first.
//! Fields the source version never wrote export their version-consistent
//! default, the same value the decoder would have filled in.
//!
//! [`YamlWriter`] renders documents as the engine's YAML 1.1 text:
//!
//! ```text
//! %YAML 1.1
//! %TAG !u! tag:unity3d.com,2011:
//! --- !u!1 &100
//! GameObject:
//!   serializedVersion: 5
//!   m_Component:
//!   - component: {fileID: 4}
//!   m_Layer: 0
//! ```

#![deny(unsafe_code)]

mod error;
mod exporter;
pub mod format;
mod node;
mod yaml;

pub use error::{ExportError, Result};
pub use exporter::{ExportDocument, ExportOptions, Exporter};
pub use node::{ExportNode, MappingStyle, Scalar, SequenceStyle};
pub use yaml::{YAML_HEADER, YamlWriter, to_yaml};
