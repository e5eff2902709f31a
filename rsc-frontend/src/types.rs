//! Script language type system
//!
//! Types as the type-checker hands them to the backend. The export registry
//! projects these into the runtime-facing [`crate::registry::ExportType`]
//! classification; nothing in this module knows about descriptors or wire
//! encodings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Managed runtime object handles
///
/// Variables of these types are reference counted by the runtime, which is
/// what the object-slot list in the output metadata exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Element,
    Type,
    Allocation,
    Sampler,
    Script,
    Mesh,
    Font,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Element => write!(f, "rs_element"),
            ObjectKind::Type => write!(f, "rs_type"),
            ObjectKind::Allocation => write!(f, "rs_allocation"),
            ObjectKind::Sampler => write!(f, "rs_sampler"),
            ObjectKind::Script => write!(f, "rs_script"),
            ObjectKind::Mesh => write!(f, "rs_mesh"),
            ObjectKind::Font => write!(f, "rs_font"),
        }
    }
}

/// A named field of a struct type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub field_type: Type,
}

/// Script-language type
///
/// Struct types carry their full field list at every use site; the registry
/// deduplicates them by name and guarantees the field lists do not form
/// cycles by the time they reach the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Void,
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,

    /// Managed runtime handle
    Object(ObjectKind),

    /// Short vector of a scalar element type (2-4 lanes)
    Vector { element: Box<Type>, size: u8 },

    /// Square float matrix (dimension 2-4)
    Matrix { dim: u8 },

    /// Pointer type
    Pointer(Box<Type>),

    /// Fixed-size array
    Array { element: Box<Type>, size: u64 },

    /// Struct type with inline field definitions
    Struct { name: String, fields: Vec<StructField> },
}

impl Type {
    /// Check if this type is a scalar number (integer or float)
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Type::Bool
                | Type::I8
                | Type::U8
                | Type::I16
                | Type::U16
                | Type::I32
                | Type::U32
                | Type::I64
                | Type::U64
                | Type::F32
                | Type::F64
        )
    }

    /// Check if this type is a managed object handle
    pub fn is_object(&self) -> bool {
        matches!(self, Type::Object(_))
    }

    /// Check whether a managed object handle occurs anywhere inside this
    /// type (including the type itself)
    pub fn contains_object(&self) -> bool {
        match self {
            Type::Object(_) => true,
            Type::Vector { element, .. } => element.contains_object(),
            Type::Pointer(pointee) => pointee.contains_object(),
            Type::Array { element, .. } => element.contains_object(),
            Type::Struct { fields, .. } => fields.iter().any(|f| f.field_type.contains_object()),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::I8 => write!(f, "char"),
            Type::U8 => write!(f, "uchar"),
            Type::I16 => write!(f, "short"),
            Type::U16 => write!(f, "ushort"),
            Type::I32 => write!(f, "int"),
            Type::U32 => write!(f, "uint"),
            Type::I64 => write!(f, "long"),
            Type::U64 => write!(f, "ulong"),
            Type::F32 => write!(f, "float"),
            Type::F64 => write!(f, "double"),
            Type::Object(kind) => write!(f, "{kind}"),
            Type::Vector { element, size } => write!(f, "{element}{size}"),
            Type::Matrix { dim } => write!(f, "rs_matrix{dim}x{dim}"),
            Type::Pointer(pointee) => write!(f, "{pointee}*"),
            Type::Array { element, size } => write!(f, "{element}[{size}]"),
            Type::Struct { name, .. } => write!(f, "struct {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Type::I32.to_string(), "int");
        assert_eq!(Type::F32.to_string(), "float");
        assert_eq!(Type::U8.to_string(), "uchar");
    }

    #[test]
    fn test_display_compound() {
        let v = Type::Vector {
            element: Box::new(Type::F32),
            size: 4,
        };
        assert_eq!(v.to_string(), "float4");
        assert_eq!(Type::Matrix { dim: 3 }.to_string(), "rs_matrix3x3");
        assert_eq!(
            Type::Pointer(Box::new(Type::I16)).to_string(),
            "short*"
        );
    }

    #[test]
    fn test_contains_object() {
        assert!(Type::Object(ObjectKind::Allocation).contains_object());
        assert!(!Type::I32.contains_object());

        let arr = Type::Array {
            element: Box::new(Type::Object(ObjectKind::Font)),
            size: 4,
        };
        assert!(arr.contains_object());

        let s = Type::Struct {
            name: "plain".to_string(),
            fields: vec![StructField {
                name: "x".to_string(),
                field_type: Type::I32,
            }],
        };
        assert!(!s.contains_object());
    }
}
