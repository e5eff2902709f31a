//! Common types used throughout the compiler
//!
//! Identifier types shared between the frontend data structures and the IR,
//! plus the storage-class model the export rules key off.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label identifier for basic blocks
pub type LabelId = u32;

/// Temporary value identifier for IR
pub type TempId = u32;

/// Storage classes for top-level declarations
///
/// A top-level declaration without an explicit storage class has external
/// linkage and is a candidate for export; `static` makes it file-local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageClass {
    Default,
    Static,
    Extern,
}

impl StorageClass {
    /// Whether a declaration with this storage class is externally linked
    pub fn is_external(&self) -> bool {
        !matches!(self, StorageClass::Static)
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageClass::Default => write!(f, ""),
            StorageClass::Static => write!(f, "static"),
            StorageClass::Extern => write!(f, "extern"),
        }
    }
}
