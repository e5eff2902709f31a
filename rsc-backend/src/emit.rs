//! Export descriptor emission
//!
//! Runs once after code generation: walks the registry's four collections
//! in declaration order and writes one descriptor per entry into the
//! module's named metadata area. The list names and record shapes are a
//! stable contract with the runtime loader (see [`crate::naming`]); records
//! are append-ordered and order-significant.

use log::debug;
use rsc_common::{CompilerError, ErrorReporter, SourceSpan};
use rsc_frontend::ir::{MetadataNode, Module, NamedMetadata};
use rsc_frontend::registry::{DataType, ExportContext, ExportType};
use crate::naming::{
    struct_info_name, RS_EXPORT_FOREACH_MN, RS_EXPORT_FUNC_MN, RS_EXPORT_TYPE_MN,
    RS_EXPORT_VAR_MN, RS_OBJECT_SLOTS_MN,
};
use crate::trampoline;

/// Per-pass handles to the lazily created descriptor lists
///
/// Lists come into existence the first time a descriptor is appended (or,
/// for the slot list, as soon as the first variable is walked) and are
/// reused afterwards. The handles live only as long as one emission pass;
/// nothing else may write to these lists concurrently.
#[derive(Default)]
struct MetadataHandles {
    export_var: Option<usize>,
    object_slots: Option<usize>,
    export_func: Option<usize>,
    export_foreach: Option<usize>,
    export_type: Option<usize>,
}

impl MetadataHandles {
    fn export_var<'m>(&mut self, module: &'m mut Module) -> &'m mut NamedMetadata {
        Self::resolve(&mut self.export_var, module, RS_EXPORT_VAR_MN)
    }

    fn object_slots<'m>(&mut self, module: &'m mut Module) -> &'m mut NamedMetadata {
        Self::resolve(&mut self.object_slots, module, RS_OBJECT_SLOTS_MN)
    }

    fn export_func<'m>(&mut self, module: &'m mut Module) -> &'m mut NamedMetadata {
        Self::resolve(&mut self.export_func, module, RS_EXPORT_FUNC_MN)
    }

    fn export_foreach<'m>(&mut self, module: &'m mut Module) -> &'m mut NamedMetadata {
        Self::resolve(&mut self.export_foreach, module, RS_EXPORT_FOREACH_MN)
    }

    fn export_type<'m>(&mut self, module: &'m mut Module) -> &'m mut NamedMetadata {
        Self::resolve(&mut self.export_type, module, RS_EXPORT_TYPE_MN)
    }

    fn resolve<'m>(
        slot: &mut Option<usize>,
        module: &'m mut Module,
        name: &str,
    ) -> &'m mut NamedMetadata {
        let idx = *slot.get_or_insert_with(|| module.ensure_named_metadata(name));
        module.named_metadata_at(idx)
    }
}

/// Emit every export descriptor for the unit into the module
pub fn emit_export_metadata(
    ctx: &ExportContext,
    module: &mut Module,
    reporter: &mut ErrorReporter,
) -> Result<(), CompilerError> {
    if !ctx.process_export() {
        debug!("export processing disabled, emitting no descriptors");
        return Ok(());
    }

    let mut handles = MetadataHandles::default();
    emit_variables(ctx, module, &mut handles);
    emit_functions(ctx, module, &mut handles, reporter)?;
    emit_kernels(ctx, module, &mut handles);
    emit_record_types(ctx, module, &mut handles, reporter);
    Ok(())
}

/// Descriptor encoding of an exported variable's type
fn encode_var_type(et: &ExportType) -> String {
    match et {
        ExportType::Primitive(pt) => pt.data_type.code().to_string(),
        ExportType::Pointer(pt) => format!("*{}", pt.pointee.name()),
        ExportType::Matrix(mt) => {
            (DataType::Matrix2x2.code() + (u32::from(mt.dim) - 2)).to_string()
        }
        ExportType::Vector(_) | ExportType::ConstantArray(_) | ExportType::Record(_) => et.name(),
    }
}

fn emit_variables(ctx: &ExportContext, module: &mut Module, handles: &mut MetadataHandles) {
    if !ctx.has_export_vars() {
        return;
    }

    // Slot information is emitted for every reference-counted variable; the
    // counter runs over all variables so slot numbers stay positional.
    let mut slot_count: u32 = 0;
    for var in ctx.export_vars() {
        let encoding = encode_var_type(&var.export_type);
        handles
            .export_var(module)
            .add_operand(MetadataNode::new(vec![var.name.clone(), encoding]));

        // The slot list exists once the first variable is walked, even if
        // it ends up empty.
        let slots = handles.object_slots(module);
        if var.export_type.is_object() {
            slots.add_operand(MetadataNode::new(vec![slot_count.to_string()]));
        }

        slot_count += 1;
    }
}

fn emit_functions(
    ctx: &ExportContext,
    module: &mut Module,
    handles: &mut MetadataHandles,
    reporter: &mut ErrorReporter,
) -> Result<(), CompilerError> {
    if !ctx.has_export_funcs() {
        return Ok(());
    }

    for ef in ctx.export_funcs() {
        let descriptor = if !ef.has_params() {
            // No parameters: the runtime calls the function directly
            Some(ef.name.clone())
        } else {
            match module.get_function(&ef.name).cloned() {
                Some(native) => {
                    Some(trampoline::synthesize_helper(ef, &native, module, reporter)?)
                }
                None => {
                    reporter.error(
                        format!(
                            "exported function '{}' disappeared from the generated module",
                            ef.name
                        ),
                        SourceSpan::dummy(),
                    );
                    None
                }
            }
        };

        if let Some(descriptor) = descriptor {
            handles
                .export_func(module)
                .add_operand(MetadataNode::new(vec![descriptor]));
        }
    }
    Ok(())
}

fn emit_kernels(ctx: &ExportContext, module: &mut Module, handles: &mut MetadataHandles) {
    if !ctx.has_export_foreach() {
        return;
    }

    for kernel in ctx.export_foreach() {
        handles
            .export_foreach(module)
            .add_operand(MetadataNode::new(vec![kernel
                .metadata_encoding()
                .to_string()]));
    }
}

fn emit_record_types(
    ctx: &ExportContext,
    module: &mut Module,
    handles: &mut MetadataHandles,
    reporter: &mut ErrorReporter,
) {
    if !ctx.has_export_types() {
        return;
    }

    for et in ctx.export_types() {
        // Field lists are meaningful only for record types; everything else
        // is skipped here.
        let ExportType::Record(rt) = et else {
            continue;
        };

        handles
            .export_type(module)
            .add_operand(MetadataNode::new(vec![rt.name.clone()]));

        let list_name = struct_info_name(&rt.name);
        if module.has_named_metadata(&list_name) {
            // The registry guarantees each record type is processed once
            // per unit; a pre-existing list means that invariant broke.
            reporter.error(
                format!("internal error: descriptor list '{list_name}' was created before"),
                SourceSpan::dummy(),
            );
            continue;
        }

        let field_list = module.get_or_insert_named_metadata(&list_name);
        for field in &rt.fields {
            let kind = match &field.field_type {
                ExportType::Primitive(pt) => pt.kind.code(),
                ExportType::Vector(vt) => vt.kind.code(),
                _ => rsc_frontend::registry::DataKind::User.code(),
            };
            field_list.add_operand(MetadataNode::new(vec![
                field.name.clone(),
                field.field_type.name(),
                kind.to_string(),
            ]));
        }
    }
}
