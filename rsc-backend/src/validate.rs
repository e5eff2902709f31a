//! Unit validation
//!
//! Runs once after the whole unit is parsed, before code generation:
//! validates every global variable's exportability, enforces the single
//! supported language version, synthesizes the static cleanup function and
//! annotates file-local function bodies.
//!
//! Validation failure abandons the rest of *this* phase only; the compiler
//! pipeline keeps going and the overall exit status is decided by the
//! diagnostic sink.

use log::debug;
use rsc_common::ErrorReporter;
use rsc_frontend::refcount::RefCountVisitor;
use rsc_frontend::registry::{normalize_type, validate_var_type, ExportContext};
use rsc_frontend::{Declaration, TopLevelItem, TranslationUnit};
use crate::guard::DeclarationGuard;

/// The single language version this compiler accepts
const SUPPORTED_VERSION: i32 = 1;

pub fn validate_unit(
    unit: &mut TranslationUnit,
    ctx: &ExportContext,
    guard: &mut DeclarationGuard,
    refcount: &mut RefCountVisitor,
    reporter: &mut ErrorReporter,
) {
    if !validate_globals(unit, reporter) {
        // Diagnostics are already out; skip the rest of unit-level
        // processing but leave the pipeline running.
        debug!("global validation failed, skipping version check and cleanup synthesis");
        return;
    }

    check_version(ctx, unit, reporter);

    // Create the static cleanup function if the unit holds managed
    // objects, and re-inject it as an ordinary top-level declaration.
    if let Some(dtor) = refcount.create_static_global_dtor(ctx) {
        guard.enqueue(TopLevelItem::Function(dtor));
        let injected = guard.drain(refcount, reporter);
        unit.items.extend(injected);
    }

    // File-local functions are not visited by the declaration guard;
    // annotate their bodies here. The naming policy does not apply to them.
    for item in unit.items.iter_mut() {
        if let TopLevelItem::Function(fd) = item {
            if !fd.is_global() {
                refcount.annotate(fd);
            }
        }
    }
}

/// Validate every global variable declaration. Failures are reported but
/// do not stop the scan.
fn validate_globals(unit: &TranslationUnit, reporter: &mut ErrorReporter) -> bool {
    let mut valid = true;
    for item in &unit.items {
        if let TopLevelItem::Declaration(decl) = item {
            valid &= validate_var_decl(decl, reporter);
        }
    }
    valid
}

fn validate_var_decl(decl: &Declaration, reporter: &mut ErrorReporter) -> bool {
    let mut valid = true;

    if decl.is_external() {
        if let Err(err) = normalize_type(&decl.decl_type) {
            reporter.error(
                format!("cannot export global variable '{}': {}", decl.name, err),
                decl.span.clone(),
            );
            valid = false;
        }
    }
    if let Err(err) = validate_var_type(&decl.decl_type) {
        reporter.error(
            format!("invalid declaration of global variable '{}': {}", decl.name, err),
            decl.span.clone(),
        );
        valid = false;
    }

    valid
}

fn check_version(ctx: &ExportContext, unit: &TranslationUnit, reporter: &mut ErrorReporter) {
    let version = ctx.version();
    if version == 0 {
        // Not setting a version is an error
        reporter.error(
            "Missing pragma for version in source file".to_string(),
            unit.span.clone(),
        );
    } else if version > SUPPORTED_VERSION {
        reporter.error(
            format!("Pragma for version in source file must be set to {SUPPORTED_VERSION}"),
            unit.span.clone(),
        );
    }
}
