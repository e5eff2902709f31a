//! Signature-level lowering
//!
//! Turns the unit's declarations into native artifacts in the output
//! module: one IR function per function definition, one IR global per
//! global variable. Bodies are stubbed with a bare return - the full
//! statement and expression code generator is a separate component; the
//! descriptor emitter only needs the native signatures to exist so the
//! trampoline synthesizer can read parameter layouts off them.

use log::debug;
use rsc_common::CompilerError;
use rsc_frontend::ir::{
    CallingConv, GlobalVariable, IrBuilder, IrType, Linkage, Module, Value,
};
use rsc_frontend::types::Type;
use rsc_frontend::{TopLevelItem, TranslationUnit};

/// Lower a script type to its native layout
pub fn lower_type(ty: &Type) -> IrType {
    match ty {
        Type::Void => IrType::Void,
        Type::Bool => IrType::I8,
        Type::I8 | Type::U8 => IrType::I8,
        Type::I16 | Type::U16 => IrType::I16,
        Type::I32 | Type::U32 => IrType::I32,
        Type::I64 | Type::U64 => IrType::I64,
        Type::F32 => IrType::F32,
        Type::F64 => IrType::F64,
        // Object handles are opaque pointers in native code
        Type::Object(_) => IrType::Ptr(Box::new(IrType::I8)),
        Type::Vector { element, size } => IrType::Vector {
            size: *size,
            element: Box::new(lower_type(element)),
        },
        Type::Matrix { dim } => IrType::Array {
            size: u64::from(*dim) * u64::from(*dim),
            element: Box::new(IrType::F32),
        },
        Type::Pointer(pointee) => IrType::Ptr(Box::new(lower_type(pointee))),
        Type::Array { element, size } => IrType::Array {
            size: *size,
            element: Box::new(lower_type(element)),
        },
        Type::Struct { name, fields } => IrType::Struct {
            name: Some(name.clone()),
            fields: fields.iter().map(|f| lower_type(&f.field_type)).collect(),
            packed: false,
        },
    }
}

/// Lower every declaration of the unit into the module, in declaration
/// order
pub fn lower_unit(unit: &TranslationUnit, module: &mut Module) -> Result<(), CompilerError> {
    for item in &unit.items {
        match item {
            TopLevelItem::Function(fd) => {
                lower_function(fd, module)?;
            }
            TopLevelItem::Declaration(decl) => {
                module.add_global(GlobalVariable {
                    name: decl.name.clone(),
                    var_type: lower_type(&decl.decl_type),
                    is_constant: false,
                    initializer: None,
                    linkage: if decl.is_external() {
                        Linkage::External
                    } else {
                        Linkage::Internal
                    },
                });
            }
            TopLevelItem::TypeDefinition { .. } => {}
        }
    }
    Ok(())
}

fn lower_function(
    fd: &rsc_frontend::FunctionDefinition,
    module: &mut Module,
) -> Result<(), CompilerError> {
    debug!("lowering function '{}'", fd.name);
    let mut builder = IrBuilder::new();
    let return_type = lower_type(&fd.return_type);
    builder.create_function(
        fd.name.clone(),
        return_type.clone(),
        if fd.is_global() {
            Linkage::External
        } else {
            Linkage::Internal
        },
        CallingConv::C,
    );
    for param in &fd.parameters {
        builder
            .add_parameter(lower_type(&param.param_type))
            .map_err(CompilerError::from)?;
    }

    if fd.has_body() {
        builder.create_block().map_err(CompilerError::from)?;
        let result = if matches!(return_type, IrType::Void) {
            None
        } else {
            Some(Value::Undef)
        };
        builder.build_return(result).map_err(CompilerError::from)?;
    }

    let function = builder
        .finish_function()
        .ok_or_else(|| CompilerError::internal_error("builder lost current function".to_string()))?;
    module.add_function(function);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rsc_common::{SourceSpan, StorageClass};
    use rsc_frontend::ast::{Declaration, FunctionDefinition, Parameter, Statement};

    fn unit(items: Vec<TopLevelItem>) -> TranslationUnit {
        TranslationUnit {
            name: "unit".to_string(),
            items,
            pragmas: Vec::new(),
            span: SourceSpan::dummy(),
        }
    }

    #[test]
    fn test_lower_type_scalars_and_objects() {
        assert_eq!(lower_type(&Type::I32), IrType::I32);
        assert_eq!(lower_type(&Type::F32), IrType::F32);
        assert_eq!(
            lower_type(&Type::Object(rsc_frontend::ObjectKind::Allocation)),
            IrType::Ptr(Box::new(IrType::I8))
        );
        assert_eq!(
            lower_type(&Type::Matrix { dim: 2 }),
            IrType::Array {
                size: 4,
                element: Box::new(IrType::F32)
            }
        );
    }

    #[test]
    fn test_lower_function_signature() {
        let fd = FunctionDefinition {
            name: "bar".to_string(),
            return_type: Type::Void,
            parameters: vec![
                Parameter {
                    name: "a".to_string(),
                    param_type: Type::I32,
                    span: SourceSpan::dummy(),
                },
                Parameter {
                    name: "b".to_string(),
                    param_type: Type::F32,
                    span: SourceSpan::dummy(),
                },
            ],
            body: Some(Statement::compound(Vec::new(), SourceSpan::dummy())),
            storage_class: StorageClass::Default,
            is_kernel: false,
            span: SourceSpan::dummy(),
        };

        let mut module = Module::new("unit".to_string());
        lower_unit(&unit(vec![TopLevelItem::Function(fd)]), &mut module).unwrap();

        let f = module.get_function("bar").unwrap();
        assert_eq!(f.param_types(), vec![IrType::I32, IrType::F32]);
        assert!(!f.is_declaration());
        assert_eq!(f.linkage, Linkage::External);
    }

    #[test]
    fn test_lower_globals_keep_linkage() {
        let items = vec![
            TopLevelItem::Declaration(Declaration {
                name: "foo".to_string(),
                decl_type: Type::I32,
                storage_class: StorageClass::Default,
                span: SourceSpan::dummy(),
            }),
            TopLevelItem::Declaration(Declaration {
                name: "hidden".to_string(),
                decl_type: Type::F32,
                storage_class: StorageClass::Static,
                span: SourceSpan::dummy(),
            }),
        ];

        let mut module = Module::new("unit".to_string());
        lower_unit(&unit(items), &mut module).unwrap();

        assert_eq!(module.get_global("foo").map(|g| g.linkage), Some(Linkage::External));
        assert_eq!(
            module.get_global("hidden").map(|g| g.linkage),
            Some(Linkage::Internal)
        );
    }

    #[test]
    fn test_prototypes_become_declarations() {
        let fd = FunctionDefinition {
            name: "ext".to_string(),
            return_type: Type::I32,
            parameters: Vec::new(),
            body: None,
            storage_class: StorageClass::Extern,
            is_kernel: false,
            span: SourceSpan::dummy(),
        };

        let mut module = Module::new("unit".to_string());
        lower_unit(&unit(vec![TopLevelItem::Function(fd)]), &mut module).unwrap();
        assert!(module.get_function("ext").unwrap().is_declaration());
    }
}
