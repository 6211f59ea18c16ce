use std::fmt;

use serde::{Deserialize, Serialize};

/// Weak cross-object reference.
///
/// `file_id` 0 addresses the owning file, `n > 0` the owning file's n-th
/// dependency. A pointer is a lookup key only: it may dangle and it never
/// owns its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PPtr {
    pub file_id: i32,
    pub path_id: i64,
}

impl PPtr {
    pub const NULL: Self = Self {
        file_id: 0,
        path_id: 0,
    };

    #[must_use]
    pub const fn new(file_id: i32, path_id: i64) -> Self {
        Self { file_id, path_id }
    }

    /// Pointer into the owning file.
    #[must_use]
    pub const fn local(path_id: i64) -> Self {
        Self::new(0, path_id)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.file_id == 0 && self.path_id == 0
    }
}

impl fmt::Display for PPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PPtr({}, {})", self.file_id, self.path_id)
    }
}
