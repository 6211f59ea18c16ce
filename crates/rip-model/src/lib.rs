//! Shared model for the versioned asset engine.
//!
//! - [`Version`]: totally ordered engine version with threshold queries
//! - [`PPtr`]: weak `(fileID, pathID)` reference that may dangle
//! - [`Value`] / [`Record`]: decoded field values
//! - [`AssetObject`]: a decoded object with its identity
//! - [`ChannelInfo`]: fixed-stride vertex channel descriptor

#![deny(unsafe_code)]

pub mod channel;
mod error;
pub mod object;
mod pptr;
mod value;
pub mod version;

pub use channel::{ChannelFormat, ChannelInfo};
pub use error::{ModelError, Result};
pub use object::{AssetObject, FileId, ObjectId};
pub use pptr::PPtr;
pub use value::{Record, Value};
pub use version::{Version, VersionType};
