//! IR Type System
//!
//! Types as they exist in the output module: scalars, pointers, vectors,
//! arrays and (possibly anonymous) struct types. The trampoline synthesizer
//! compares struct types structurally, so equality ignores nothing - two
//! struct types are equal only if name, fields and packing all match; use
//! [`IrType::same_layout`] for the structural comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrType {
    /// Void type (function returns only)
    Void,

    /// Integer types with bit width
    I1,
    I8,
    I16,
    I32,
    I64,

    /// Floating point types
    F32,
    F64,

    /// Pointer type
    Ptr(Box<IrType>),

    /// Short vector type <size x element>
    Vector { size: u8, element: Box<IrType> },

    /// Array type [size x element]
    Array { size: u64, element: Box<IrType> },

    /// Struct type
    Struct {
        name: Option<String>,
        fields: Vec<IrType>,
        packed: bool,
    },

    /// Function type
    Function {
        return_type: Box<IrType>,
        param_types: Vec<IrType>,
    },
}

impl IrType {
    /// Check if this is a pointer type
    pub fn is_pointer(&self) -> bool {
        matches!(self, IrType::Ptr(_))
    }

    /// The pointee for pointer types
    pub fn pointee(&self) -> Option<&IrType> {
        match self {
            IrType::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    /// Structural comparison for struct types: field lists must match,
    /// names are ignored. Non-struct types fall back to equality.
    pub fn same_layout(&self, other: &IrType) -> bool {
        match (self, other) {
            (
                IrType::Struct { fields: a, .. },
                IrType::Struct { fields: b, .. },
            ) => a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same_layout(y)),
            _ => self == other,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::I1 => write!(f, "i1"),
            IrType::I8 => write!(f, "i8"),
            IrType::I16 => write!(f, "i16"),
            IrType::I32 => write!(f, "i32"),
            IrType::I64 => write!(f, "i64"),
            IrType::F32 => write!(f, "float"),
            IrType::F64 => write!(f, "double"),
            IrType::Ptr(target) => write!(f, "{target}*"),
            IrType::Vector { size, element } => write!(f, "<{size} x {element}>"),
            IrType::Array { size, element } => write!(f, "[{size} x {element}]"),
            IrType::Struct {
                name: Some(name), ..
            } => write!(f, "%{name}"),
            IrType::Struct { name: None, fields, .. } => {
                write!(f, "{{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, " }}")
            }
            IrType::Function {
                return_type,
                param_types,
            } => {
                write!(f, "{return_type} (")?;
                for (i, param) in param_types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ")")
            }
        }
    }
}
