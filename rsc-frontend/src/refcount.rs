//! Reference-count annotation for managed object types
//!
//! Walks function bodies to instrument the lifetime of managed object
//! handles, and synthesizes the static cleanup function that releases
//! object-typed globals when the script is torn down. The rewriting here is
//! deliberately shallow: locals of object type get a release call appended
//! to their enclosing function, which is all the runtime needs from this
//! compiler.

use log::debug;
use rsc_common::SourceSpan;
use crate::ast::{Declaration, FunctionDefinition, Statement, StatementKind};
use crate::registry::ExportContext;
use crate::types::Type;

/// Runtime entry point that releases one managed object handle
pub const CLEAR_OBJECT_FN: &str = "rsClearObject";

/// Name of the synthesized static cleanup function
pub const STATIC_DTOR_NAME: &str = ".rs.dtor";

/// Body annotator for managed object lifetimes
pub struct RefCountVisitor {
    object_locals: Vec<String>,
}

impl RefCountVisitor {
    pub fn new() -> Self {
        Self {
            object_locals: Vec::new(),
        }
    }

    /// Reset per-function state. Called before each body walk.
    pub fn init(&mut self) {
        self.object_locals.clear();
    }

    /// Instrument one function body. Bodyless declarations and functions
    /// defined in the trusted system header are left alone.
    pub fn annotate(&mut self, fd: &mut FunctionDefinition) {
        if !fd.has_body() || fd.is_in_system_header() {
            return;
        }
        self.init();
        if let Some(body) = &fd.body {
            self.visit(body);
        }
        if self.object_locals.is_empty() {
            return;
        }

        debug!(
            "annotating '{}': {} object-typed local(s)",
            fd.name,
            self.object_locals.len()
        );
        let releases: Vec<Statement> = self
            .object_locals
            .drain(..)
            .map(|name| Statement::call(CLEAR_OBJECT_FN, vec![name], fd.span.clone()))
            .collect();
        if let Some(body) = fd.body.as_mut() {
            append_to_body(body, releases);
        }
    }

    fn visit(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Compound(statements) => {
                for inner in statements {
                    self.visit(inner);
                }
            }
            StatementKind::Local(Declaration {
                name, decl_type, ..
            }) => {
                if decl_type.contains_object() {
                    self.object_locals.push(name.clone());
                }
            }
            StatementKind::Call { .. } | StatementKind::Return | StatementKind::Opaque => {}
        }
    }

    /// Synthesize the static cleanup function releasing every managed
    /// global, or `None` when the unit has no managed objects.
    pub fn create_static_global_dtor(&self, ctx: &ExportContext) -> Option<FunctionDefinition> {
        let releases: Vec<Statement> = ctx
            .export_vars()
            .iter()
            .filter(|v| v.export_type.is_object())
            .map(|v| Statement::call(CLEAR_OBJECT_FN, vec![v.name.clone()], SourceSpan::dummy()))
            .collect();

        if releases.is_empty() {
            return None;
        }

        debug!("synthesizing {} with {} release(s)", STATIC_DTOR_NAME, releases.len());
        Some(FunctionDefinition {
            name: STATIC_DTOR_NAME.to_string(),
            return_type: Type::Void,
            parameters: Vec::new(),
            body: Some(Statement::compound(releases, SourceSpan::dummy())),
            storage_class: rsc_common::StorageClass::Static,
            is_kernel: false,
            span: SourceSpan::dummy(),
        })
    }
}

impl Default for RefCountVisitor {
    fn default() -> Self {
        Self::new()
    }
}

fn append_to_body(body: &mut Statement, releases: Vec<Statement>) {
    match &mut body.kind {
        StatementKind::Compound(statements) => statements.extend(releases),
        _ => {
            // Non-compound body: wrap it so the releases have a place to go
            let span = body.span.clone();
            let original = std::mem::replace(
                body,
                Statement::compound(Vec::new(), span),
            );
            if let StatementKind::Compound(statements) = &mut body.kind {
                statements.push(original);
                statements.extend(releases);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ExportType, ExportVar};
    use crate::types::ObjectKind;
    use rsc_common::{SourceLocation, StorageClass};

    fn local(name: &str, ty: Type) -> Statement {
        Statement {
            kind: StatementKind::Local(Declaration {
                name: name.to_string(),
                decl_type: ty,
                storage_class: StorageClass::Default,
                span: SourceSpan::dummy(),
            }),
            span: SourceSpan::dummy(),
        }
    }

    fn function_with_body(body: Statement) -> FunctionDefinition {
        FunctionDefinition {
            name: "f".to_string(),
            return_type: Type::Void,
            parameters: Vec::new(),
            body: Some(body),
            storage_class: StorageClass::Default,
            is_kernel: false,
            span: SourceSpan::dummy(),
        }
    }

    fn release_count(stmt: &Statement) -> usize {
        match &stmt.kind {
            StatementKind::Compound(statements) => statements
                .iter()
                .filter(|s| {
                    matches!(&s.kind, StatementKind::Call { function, .. } if function == CLEAR_OBJECT_FN)
                })
                .count(),
            _ => 0,
        }
    }

    #[test]
    fn test_object_locals_get_release_calls() {
        let body = Statement::compound(
            vec![
                local("a", Type::Object(ObjectKind::Allocation)),
                local("n", Type::I32),
                local("f", Type::Object(ObjectKind::Font)),
            ],
            SourceSpan::dummy(),
        );
        let mut fd = function_with_body(body);

        let mut visitor = RefCountVisitor::new();
        visitor.annotate(&mut fd);

        assert_eq!(release_count(fd.body.as_ref().unwrap()), 2);
    }

    #[test]
    fn test_plain_functions_are_untouched() {
        let body = Statement::compound(vec![local("n", Type::I32)], SourceSpan::dummy());
        let before = function_with_body(body);
        let mut after = before.clone();

        RefCountVisitor::new().annotate(&mut after);
        assert_eq!(before, after);
    }

    #[test]
    fn test_system_header_functions_are_skipped() {
        let span = SourceSpan::from_location(SourceLocation::new("rs_core.rsh", 1, 1));
        let mut fd = FunctionDefinition {
            span,
            ..function_with_body(Statement::compound(
                vec![local("a", Type::Object(ObjectKind::Element))],
                SourceSpan::dummy(),
            ))
        };
        let before = fd.clone();

        RefCountVisitor::new().annotate(&mut fd);
        assert_eq!(before, fd);
    }

    #[test]
    fn test_dtor_only_when_managed_globals_exist() {
        let mut ctx = ExportContext::new();
        let visitor = RefCountVisitor::new();
        assert!(visitor.create_static_global_dtor(&ctx).is_none());

        ctx.add_export_var(ExportVar::new(
            "el",
            ExportType::from_type(&Type::Object(ObjectKind::Element)).unwrap(),
        ));
        ctx.add_export_var(ExportVar::new(
            "n",
            ExportType::from_type(&Type::I32).unwrap(),
        ));

        let dtor = visitor.create_static_global_dtor(&ctx).unwrap();
        assert_eq!(dtor.name, STATIC_DTOR_NAME);
        assert!(!dtor.is_global());
        assert_eq!(release_count(dtor.body.as_ref().unwrap()), 1);
    }
}
