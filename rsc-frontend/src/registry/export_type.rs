//! Exported-type classification
//!
//! Projects the script type system into the closed classification the
//! runtime understands. The numeric codes in here are a wire contract
//! shared with the runtime loader: they are written into descriptors as
//! decimal strings and must never be renumbered.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::ir::IrType;
use crate::types::{ObjectKind, Type};

/// Primitive-kind wire codes
///
/// The matrix codes are laid out so that `Matrix2x2 + (dim - 2)` yields the
/// code for a `dim`-dimensional matrix. Codes `Element` and above are the
/// managed object kinds the runtime reference counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum DataType {
    Float32 = 0,
    Float64 = 1,
    Signed8 = 2,
    Signed16 = 3,
    Signed32 = 4,
    Signed64 = 5,
    Unsigned8 = 6,
    Unsigned16 = 7,
    Unsigned32 = 8,
    Unsigned64 = 9,
    Boolean = 10,
    Matrix2x2 = 11,
    Matrix3x3 = 12,
    Matrix4x4 = 13,
    Element = 14,
    Type = 15,
    Allocation = 16,
    Sampler = 17,
    Script = 18,
    Mesh = 19,
    Font = 20,
}

impl DataType {
    /// Decimal wire code
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Whether variables of this kind are reference counted by the runtime
    pub fn is_object_type(self) -> bool {
        self.code() >= DataType::Element.code()
    }

    /// Runtime-facing type name
    pub fn exported_name(self) -> &'static str {
        match self {
            DataType::Float32 => "float",
            DataType::Float64 => "double",
            DataType::Signed8 => "char",
            DataType::Signed16 => "short",
            DataType::Signed32 => "int",
            DataType::Signed64 => "long",
            DataType::Unsigned8 => "uchar",
            DataType::Unsigned16 => "ushort",
            DataType::Unsigned32 => "uint",
            DataType::Unsigned64 => "ulong",
            DataType::Boolean => "bool",
            DataType::Matrix2x2 => "rs_matrix2x2",
            DataType::Matrix3x3 => "rs_matrix3x3",
            DataType::Matrix4x4 => "rs_matrix4x4",
            DataType::Element => "rs_element",
            DataType::Type => "rs_type",
            DataType::Allocation => "rs_allocation",
            DataType::Sampler => "rs_sampler",
            DataType::Script => "rs_script",
            DataType::Mesh => "rs_mesh",
            DataType::Font => "rs_font",
        }
    }

    /// How a value of this kind is laid out in native code. Object handles
    /// are opaque pointers; matrices are flat float arrays.
    pub fn ir_type(self) -> IrType {
        match self {
            DataType::Float32 => IrType::F32,
            DataType::Float64 => IrType::F64,
            DataType::Signed8 | DataType::Unsigned8 => IrType::I8,
            DataType::Signed16 | DataType::Unsigned16 => IrType::I16,
            DataType::Signed32 | DataType::Unsigned32 => IrType::I32,
            DataType::Signed64 | DataType::Unsigned64 => IrType::I64,
            DataType::Boolean => IrType::I8,
            DataType::Matrix2x2 => matrix_ir_type(2),
            DataType::Matrix3x3 => matrix_ir_type(3),
            DataType::Matrix4x4 => matrix_ir_type(4),
            DataType::Element
            | DataType::Type
            | DataType::Allocation
            | DataType::Sampler
            | DataType::Script
            | DataType::Mesh
            | DataType::Font => IrType::Ptr(Box::new(IrType::I8)),
        }
    }

    fn from_object_kind(kind: ObjectKind) -> DataType {
        match kind {
            ObjectKind::Element => DataType::Element,
            ObjectKind::Type => DataType::Type,
            ObjectKind::Allocation => DataType::Allocation,
            ObjectKind::Sampler => DataType::Sampler,
            ObjectKind::Script => DataType::Script,
            ObjectKind::Mesh => DataType::Mesh,
            ObjectKind::Font => DataType::Font,
        }
    }

    fn from_scalar(ty: &Type) -> Option<DataType> {
        match ty {
            Type::Bool => Some(DataType::Boolean),
            Type::I8 => Some(DataType::Signed8),
            Type::U8 => Some(DataType::Unsigned8),
            Type::I16 => Some(DataType::Signed16),
            Type::U16 => Some(DataType::Unsigned16),
            Type::I32 => Some(DataType::Signed32),
            Type::U32 => Some(DataType::Unsigned32),
            Type::I64 => Some(DataType::Signed64),
            Type::U64 => Some(DataType::Unsigned64),
            Type::F32 => Some(DataType::Float32),
            Type::F64 => Some(DataType::Float64),
            _ => None,
        }
    }
}

fn matrix_ir_type(dim: u8) -> IrType {
    IrType::Array {
        size: u64::from(dim) * u64::from(dim),
        element: Box::new(IrType::F32),
    }
}

/// Coarse field-kind wire codes for record field descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum DataKind {
    User = 0,
    PixelL = 1,
    PixelA = 2,
    PixelLA = 3,
    PixelRGB = 4,
    PixelRGBA = 5,
}

impl DataKind {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Errors classifying or validating an exported type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportTypeError {
    #[error("type '{0}' cannot be exported")]
    Unexportable(String),

    #[error("vector element type '{0}' is not a scalar")]
    BadVectorElement(String),

    #[error("vector size {0} is out of range (2-4)")]
    BadVectorSize(u8),

    #[error("matrix dimension {0} is out of range (2-4)")]
    BadMatrixDimension(u8),

    #[error("aggregate type '{0}' contains a managed object type")]
    ObjectInAggregate(String),

    #[error("pointer type '{0}' points at a managed object type")]
    PointerToObject(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveType {
    pub data_type: DataType,
    pub kind: DataKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerType {
    pub pointee: Box<ExportType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorType {
    pub element: DataType,
    pub size: u8,
    pub kind: DataKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixType {
    pub dim: u8,
}

impl MatrixType {
    /// Wire code of this matrix dimension
    pub fn data_type(&self) -> DataType {
        match self.dim {
            2 => DataType::Matrix2x2,
            3 => DataType::Matrix3x3,
            _ => DataType::Matrix4x4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantArrayType {
    pub element: Box<ExportType>,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    pub name: String,
    pub field_type: ExportType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<RecordField>,
}

/// Exported-type classification
///
/// The single dispatch key for every encoding decision in the descriptor
/// emitter. The set is closed; every match over it is exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportType {
    Primitive(PrimitiveType),
    Pointer(PointerType),
    Vector(VectorType),
    Matrix(MatrixType),
    ConstantArray(ConstantArrayType),
    Record(RecordType),
}

impl ExportType {
    /// Classify a script type
    pub fn from_type(ty: &Type) -> Result<ExportType, ExportTypeError> {
        if let Some(data_type) = DataType::from_scalar(ty) {
            return Ok(ExportType::Primitive(PrimitiveType {
                data_type,
                kind: DataKind::User,
            }));
        }

        match ty {
            Type::Object(kind) => Ok(ExportType::Primitive(PrimitiveType {
                data_type: DataType::from_object_kind(*kind),
                kind: DataKind::User,
            })),
            Type::Vector { element, size } => {
                if !(2..=4).contains(size) {
                    return Err(ExportTypeError::BadVectorSize(*size));
                }
                let element = DataType::from_scalar(element)
                    .ok_or_else(|| ExportTypeError::BadVectorElement(element.to_string()))?;
                Ok(ExportType::Vector(VectorType {
                    element,
                    size: *size,
                    kind: DataKind::User,
                }))
            }
            Type::Matrix { dim } => {
                if !(2..=4).contains(dim) {
                    return Err(ExportTypeError::BadMatrixDimension(*dim));
                }
                Ok(ExportType::Matrix(MatrixType { dim: *dim }))
            }
            Type::Pointer(pointee) => Ok(ExportType::Pointer(PointerType {
                pointee: Box::new(ExportType::from_type(pointee)?),
            })),
            Type::Array { element, size } => Ok(ExportType::ConstantArray(ConstantArrayType {
                element: Box::new(ExportType::from_type(element)?),
                size: *size,
            })),
            Type::Struct { name, fields } => {
                let mut record_fields = Vec::with_capacity(fields.len());
                for field in fields {
                    record_fields.push(RecordField {
                        name: field.name.clone(),
                        field_type: ExportType::from_type(&field.field_type)?,
                    });
                }
                Ok(ExportType::Record(RecordType {
                    name: name.clone(),
                    fields: record_fields,
                }))
            }
            _ => Err(ExportTypeError::Unexportable(ty.to_string())),
        }
    }

    /// Canonical exported-type name. Decoding a pointer name of the form
    /// `*<name>` recovers the pointee's name.
    pub fn name(&self) -> String {
        match self {
            ExportType::Primitive(pt) => pt.data_type.exported_name().to_string(),
            ExportType::Pointer(pt) => format!("*{}", pt.pointee.name()),
            ExportType::Vector(vt) => format!("{}{}", vt.element.exported_name(), vt.size),
            ExportType::Matrix(mt) => mt.data_type().exported_name().to_string(),
            ExportType::ConstantArray(at) => format!("{}[{}]", at.element.name(), at.size),
            ExportType::Record(rt) => rt.name.clone(),
        }
    }

    /// Whether a variable of this type occupies a runtime object slot
    pub fn is_object(&self) -> bool {
        matches!(self, ExportType::Primitive(pt) if pt.data_type.is_object_type())
    }

    /// Native layout of a value of this type
    pub fn to_ir_type(&self) -> IrType {
        match self {
            ExportType::Primitive(pt) => pt.data_type.ir_type(),
            ExportType::Pointer(pt) => IrType::Ptr(Box::new(pt.pointee.to_ir_type())),
            ExportType::Vector(vt) => IrType::Vector {
                size: vt.size,
                element: Box::new(vt.element.ir_type()),
            },
            ExportType::Matrix(mt) => matrix_ir_type(mt.dim),
            ExportType::ConstantArray(at) => IrType::Array {
                size: at.size,
                element: Box::new(at.element.to_ir_type()),
            },
            ExportType::Record(rt) => rt.to_ir_type(),
        }
    }
}

impl RecordType {
    /// Native layout of this record
    pub fn to_ir_type(&self) -> IrType {
        IrType::Struct {
            name: Some(self.name.clone()),
            fields: self.fields.iter().map(|f| f.field_type.to_ir_type()).collect(),
            packed: false,
        }
    }
}

/// Normalize a script type to its canonical exported-type name
pub fn normalize_type(ty: &Type) -> Result<String, ExportTypeError> {
    ExportType::from_type(ty).map(|et| et.name())
}

/// Shape checks on an exported variable declaration beyond plain type
/// classification: managed object handles may only occur as immediate
/// variable types, never buried inside aggregates or behind pointers.
pub fn validate_var_type(ty: &Type) -> Result<(), ExportTypeError> {
    match ty {
        Type::Void => Err(ExportTypeError::Unexportable(ty.to_string())),
        Type::Array { element, .. } if element.contains_object() => {
            Err(ExportTypeError::ObjectInAggregate(ty.to_string()))
        }
        Type::Struct { .. } if ty.contains_object() => {
            Err(ExportTypeError::ObjectInAggregate(ty.to_string()))
        }
        Type::Pointer(pointee) if pointee.contains_object() => {
            Err(ExportTypeError::PointerToObject(ty.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StructField;

    #[test]
    fn test_matrix_code_offsets() {
        assert_eq!(
            DataType::Matrix2x2.code() + (3 - 2),
            DataType::Matrix3x3.code()
        );
        assert_eq!(
            DataType::Matrix2x2.code() + (4 - 2),
            DataType::Matrix4x4.code()
        );
    }

    #[test]
    fn test_object_kinds_are_objects() {
        assert!(DataType::Allocation.is_object_type());
        assert!(DataType::Font.is_object_type());
        assert!(!DataType::Signed32.is_object_type());
        assert!(!DataType::Matrix4x4.is_object_type());
    }

    #[test]
    fn test_classify_scalars() {
        let et = ExportType::from_type(&Type::I32).unwrap();
        assert_eq!(et.name(), "int");
        assert!(matches!(
            et,
            ExportType::Primitive(PrimitiveType {
                data_type: DataType::Signed32,
                ..
            })
        ));
    }

    #[test]
    fn test_classify_vector_and_matrix() {
        let v = ExportType::from_type(&Type::Vector {
            element: Box::new(Type::F32),
            size: 4,
        })
        .unwrap();
        assert_eq!(v.name(), "float4");

        let m = ExportType::from_type(&Type::Matrix { dim: 3 }).unwrap();
        assert_eq!(m.name(), "rs_matrix3x3");

        assert_eq!(
            ExportType::from_type(&Type::Matrix { dim: 5 }),
            Err(ExportTypeError::BadMatrixDimension(5))
        );
    }

    #[test]
    fn test_pointer_name_round_trip() {
        let p = ExportType::from_type(&Type::Pointer(Box::new(Type::I16))).unwrap();
        let name = p.name();
        assert_eq!(name, "*short");
        assert_eq!(name.strip_prefix('*'), Some("short"));
    }

    #[test]
    fn test_classify_record() {
        let s = Type::Struct {
            name: "point".to_string(),
            fields: vec![
                StructField {
                    name: "x".to_string(),
                    field_type: Type::F32,
                },
                StructField {
                    name: "y".to_string(),
                    field_type: Type::F32,
                },
            ],
        };
        let et = ExportType::from_type(&s).unwrap();
        match &et {
            ExportType::Record(rt) => {
                assert_eq!(rt.name, "point");
                assert_eq!(rt.fields.len(), 2);
            }
            other => panic!("expected record, got {other:?}"),
        }
        assert_eq!(
            et.to_ir_type(),
            IrType::Struct {
                name: Some("point".to_string()),
                fields: vec![IrType::F32, IrType::F32],
                packed: false,
            }
        );
    }

    #[test]
    fn test_void_is_unexportable() {
        assert!(ExportType::from_type(&Type::Void).is_err());
        assert!(validate_var_type(&Type::Void).is_err());
    }

    #[test]
    fn test_validate_rejects_buried_objects() {
        let arr = Type::Array {
            element: Box::new(Type::Object(ObjectKind::Allocation)),
            size: 3,
        };
        assert_eq!(
            validate_var_type(&arr),
            Err(ExportTypeError::ObjectInAggregate("rs_allocation[3]".to_string()))
        );

        let ptr = Type::Pointer(Box::new(Type::Object(ObjectKind::Element)));
        assert!(matches!(
            validate_var_type(&ptr),
            Err(ExportTypeError::PointerToObject(_))
        ));

        // A bare object handle is fine
        assert!(validate_var_type(&Type::Object(ObjectKind::Font)).is_ok());
    }

    #[test]
    fn test_object_lowering_is_opaque_pointer() {
        let et = ExportType::from_type(&Type::Object(ObjectKind::Script)).unwrap();
        assert!(et.is_object());
        assert_eq!(et.to_ir_type(), IrType::Ptr(Box::new(IrType::I8)));
    }
}
