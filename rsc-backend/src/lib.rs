//! RSC Script Compiler - Export Metadata Backend
//!
//! This crate implements the stage that runs after parsing and type
//! checking: it decides what the managed runtime needs to know to call back
//! into compiled native code. It guards incoming declarations, validates
//! the unit, lowers signatures into the output module, reflects every
//! exported entity into named metadata descriptors and synthesizes
//! packed-argument trampolines for functions the runtime invokes through
//! its generic protocol.
//!
//! The stage is single-threaded and single-pass, driven in a fixed order:
//! declarations stream through the guard, the unit is validated once, code
//! is generated, and descriptors are emitted last. There is no retry logic
//! anywhere; every step either succeeds or reports a diagnostic and the
//! pass continues with best-effort partial output.

pub mod emit;
pub mod guard;
pub mod lower;
pub mod naming;
pub mod trampoline;
pub mod validate;

pub use guard::DeclarationGuard;

use rsc_common::{CompilerError, ErrorReporter};
use rsc_frontend::ir::Module;
use rsc_frontend::refcount::RefCountVisitor;
use rsc_frontend::registry::ExportContext;
use rsc_frontend::{TopLevelItem, TranslationUnit};

/// Options for the backend pass
pub struct BackendOptions {
    /// Permit user functions whose name starts with the reserved prefix
    pub allow_rs_prefix: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            allow_rs_prefix: false,
        }
    }
}

/// The backend pass, driven phase by phase over one translation unit
pub struct ScriptBackend {
    guard: DeclarationGuard,
    refcount: RefCountVisitor,
}

impl ScriptBackend {
    pub fn new(options: BackendOptions) -> Self {
        Self {
            guard: DeclarationGuard::new(options.allow_rs_prefix),
            refcount: RefCountVisitor::new(),
        }
    }

    /// Phase 1: guard a group of top-level declarations as they stream in
    pub fn handle_top_level_items(
        &mut self,
        items: &mut [TopLevelItem],
        reporter: &mut ErrorReporter,
    ) {
        self.guard.check_items(items, &mut self.refcount, reporter);
    }

    /// Phase 2: whole-unit validation, cleanup synthesis and file-local
    /// body annotation
    pub fn validate_unit(
        &mut self,
        unit: &mut TranslationUnit,
        ctx: &ExportContext,
        reporter: &mut ErrorReporter,
    ) {
        validate::validate_unit(unit, ctx, &mut self.guard, &mut self.refcount, reporter);
    }

    /// Phase 3: signature-level code generation into the output module
    pub fn lower_unit(
        &self,
        unit: &TranslationUnit,
        module: &mut Module,
    ) -> Result<(), CompilerError> {
        lower::lower_unit(unit, module)
    }

    /// Phase 4: export descriptor emission (and trampoline synthesis)
    pub fn emit_export_metadata(
        &self,
        ctx: &ExportContext,
        module: &mut Module,
        reporter: &mut ErrorReporter,
    ) -> Result<(), CompilerError> {
        emit::emit_export_metadata(ctx, module, reporter)
    }
}
