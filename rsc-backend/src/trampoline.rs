//! Trampoline synthesis
//!
//! The runtime invokes exported functions through a generic protocol: it
//! packs all arguments into one block and calls with a single pointer. A
//! function compiled with a native N-argument signature cannot be called
//! that way, so for every exported function with parameters a helper is
//! synthesized that takes the packed block, unpacks each field and calls
//! the original with its native convention. The helper's name, not the
//! original's, is what lands in the function descriptor list.

use log::debug;
use rsc_common::{CompilerError, Diagnostic, ErrorReporter, SourceSpan};
use rsc_frontend::ir::{Function, IrBuilder, IrType, Linkage, Module, Value};
use rsc_frontend::registry::ExportFunc;
use crate::naming::helper_function_name;

/// Synthesize the packed-argument helper for `ef`, whose generated native
/// function is `native`. Returns the helper's name; the helper is added to
/// the module.
pub fn synthesize_helper(
    ef: &ExportFunc,
    native: &Function,
    module: &mut Module,
    reporter: &mut ErrorReporter,
) -> Result<String, CompilerError> {
    let param_types = native.param_types();

    // Packed record matching the native parameter list, in order. Reaching
    // this point with an empty parameter list is defensive only; parameter
    // -less functions are called directly and never get a helper.
    let packet_type = if param_types.is_empty() {
        None
    } else {
        Some(IrType::Struct {
            name: None,
            fields: param_types.clone(),
            packed: false,
        })
    };

    // Cross-check against the parameter packet the registry expected. A
    // mismatch is reported but does not stop generation; the descriptor
    // will still name the helper.
    if !ef.check_parameter_packet_type(packet_type.as_ref()) {
        let mut diag = Diagnostic::error(
            format!(
                "failed to export function '{}': parameter type mismatch during creation of helper function",
                ef.name
            ),
            SourceSpan::dummy(),
        );
        if let Some(expected) = ef.param_packet() {
            diag = diag.with_note(format!("expected: {}", expected.to_ir_type()));
        }
        if let Some(actual) = &packet_type {
            diag = diag.with_note(format!("got: {}", actual));
        }
        reporter.report(diag);
    }

    let helper_name = helper_function_name(&ef.name);
    debug!("synthesizing '{}' for '{}'", helper_name, ef.name);

    let mut builder = IrBuilder::new();
    let helper = builder.create_function(
        helper_name.clone(),
        native.return_type.clone(),
        Linkage::External,
        native.calling_conv,
    );
    helper.no_inline = true;

    let packet_param = match &packet_type {
        Some(packet) => Some(
            builder
                .add_parameter(IrType::Ptr(Box::new(packet.clone())))
                .map_err(CompilerError::from)?,
        ),
        None => None,
    };

    builder.create_block().map_err(CompilerError::from)?;

    // Unpack each field of the incoming block, in parameter order
    let mut args = Vec::with_capacity(param_types.len());
    if let Some(param_id) = packet_param {
        for (index, field_type) in param_types.iter().enumerate() {
            let addr = builder
                .build_struct_gep(
                    Value::Temp(param_id),
                    index as u32,
                    IrType::Ptr(Box::new(field_type.clone())),
                )
                .map_err(CompilerError::from)?;
            let value = builder
                .build_load(Value::Temp(addr), field_type.clone())
                .map_err(CompilerError::from)?;
            args.push(Value::Temp(value));
        }
    }

    // Call the original, preserving its calling convention
    let call_result = builder
        .build_call(
            Value::Function(native.name.clone()),
            args,
            native.return_type.clone(),
            native.calling_conv,
        )
        .map_err(CompilerError::from)?;
    match call_result {
        Some(temp) => builder.build_return(Some(Value::Temp(temp))),
        None => builder.build_return(None),
    }
    .map_err(CompilerError::from)?;

    let function = builder
        .finish_function()
        .ok_or_else(|| CompilerError::internal_error("builder lost helper function".to_string()))?;
    module.add_function(function);

    Ok(helper_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rsc_frontend::ir::{CallingConv, Instruction};
    use rsc_frontend::registry::{ExportParam, ExportType};
    use rsc_frontend::types::Type;

    fn export_func(name: &str, params: Vec<(&str, Type)>) -> ExportFunc {
        ExportFunc::new(
            name,
            params
                .into_iter()
                .map(|(n, t)| ExportParam {
                    name: n.to_string(),
                    export_type: ExportType::from_type(&t).unwrap(),
                })
                .collect(),
            Type::Void,
        )
    }

    fn native_function(name: &str, params: Vec<IrType>, return_type: IrType) -> Function {
        let mut f = Function::new(name.to_string(), return_type);
        for (i, ty) in params.into_iter().enumerate() {
            f.add_parameter(i as u32, ty);
        }
        f
    }

    #[test]
    fn test_helper_shape() {
        let ef = export_func("bar", vec![("a", Type::I32), ("b", Type::F32)]);
        let native = native_function("bar", vec![IrType::I32, IrType::F32], IrType::Void);
        let mut module = Module::new("unit".to_string());
        let mut reporter = ErrorReporter::new();

        let name = synthesize_helper(&ef, &native, &mut module, &mut reporter).unwrap();
        assert_eq!(name, ".helper_bar");
        assert!(!reporter.has_errors());

        let helper = module.get_function(".helper_bar").unwrap();
        assert_eq!(helper.parameters.len(), 1);
        assert!(helper.parameters[0].1.is_pointer());
        assert!(helper.no_inline);
        assert_eq!(helper.linkage, Linkage::External);

        // Two field addresses, two loads, the call, the return
        let instrs = &helper.blocks[0].instructions;
        assert_eq!(instrs.len(), 6);
        let loads = instrs
            .iter()
            .filter(|i| matches!(i, Instruction::Load { .. }))
            .count();
        assert_eq!(loads, 2);
        match &instrs[4] {
            Instruction::Call { function, args, .. } => {
                assert_eq!(function, &Value::Function("bar".to_string()));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {other}"),
        }
        assert_eq!(instrs[5], Instruction::Return(None));
    }

    #[test]
    fn test_helper_returns_call_result_for_non_void() {
        let ef = ExportFunc::new(
            "sum",
            vec![ExportParam {
                name: "a".to_string(),
                export_type: ExportType::from_type(&Type::I32).unwrap(),
            }],
            Type::I32,
        );
        let native = native_function("sum", vec![IrType::I32], IrType::I32);
        let mut module = Module::new("unit".to_string());
        let mut reporter = ErrorReporter::new();

        synthesize_helper(&ef, &native, &mut module, &mut reporter).unwrap();

        let helper = module.get_function(".helper_sum").unwrap();
        let last = helper.blocks[0].instructions.last().unwrap();
        assert!(matches!(last, Instruction::Return(Some(Value::Temp(_)))));
    }

    #[test]
    fn test_packet_mismatch_reports_but_still_generates() {
        // Registry expects (i32), generated code takes (i32, f32)
        let ef = export_func("drift", vec![("a", Type::I32)]);
        let native = native_function("drift", vec![IrType::I32, IrType::F32], IrType::Void);
        let mut module = Module::new("unit".to_string());
        let mut reporter = ErrorReporter::new();

        let name = synthesize_helper(&ef, &native, &mut module, &mut reporter).unwrap();

        assert_eq!(reporter.error_count(), 1);
        let diag = &reporter.diagnostics()[0];
        assert!(diag.message.contains("parameter type mismatch"));
        assert!(diag.notes.iter().any(|n| n.starts_with("expected:")));
        assert!(diag.notes.iter().any(|n| n.starts_with("got:")));

        // The helper exists regardless
        assert_eq!(name, ".helper_drift");
        assert!(module.get_function(".helper_drift").is_some());
    }

    #[test]
    fn test_calling_convention_is_preserved() {
        let ef = export_func("fast", vec![("a", Type::I32)]);
        let mut native = native_function("fast", vec![IrType::I32], IrType::Void);
        native.calling_conv = CallingConv::Fast;
        let mut module = Module::new("unit".to_string());
        let mut reporter = ErrorReporter::new();

        synthesize_helper(&ef, &native, &mut module, &mut reporter).unwrap();

        let helper = module.get_function(".helper_fast").unwrap();
        assert_eq!(helper.calling_conv, CallingConv::Fast);
        let call_cc = helper.blocks[0].instructions.iter().find_map(|i| match i {
            Instruction::Call { calling_conv, .. } => Some(*calling_conv),
            _ => None,
        });
        assert_eq!(call_cc, Some(CallingConv::Fast));
    }
}
