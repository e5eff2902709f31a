//! Abstract syntax tree for a parsed translation unit
//!
//! The parser and type-checker live outside this repository; they hand the
//! backend a fully resolved unit in this shape (serde makes it loadable from
//! JSON). Function bodies are opaque to the backend except for the small
//! statement surface the reference-count annotator walks.

use crate::types::Type;
use rsc_common::{SourceSpan, StorageClass};
use serde::{Deserialize, Serialize};

/// File extension of the trusted system header. Declarations whose span
/// starts in such a file are exempt from the reserved-prefix policy and are
/// never re-annotated.
pub const SYSTEM_HEADER_EXT: &str = ".rsh";

/// A `#pragma name(value)` recorded by the parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pragma {
    pub name: String,
    pub value: String,
    pub span: SourceSpan,
}

/// Top-level compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub name: String,
    pub items: Vec<TopLevelItem>,
    pub pragmas: Vec<Pragma>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopLevelItem {
    /// Function definition or prototype
    Function(FunctionDefinition),

    /// Global variable declaration
    Declaration(Declaration),

    /// Struct definition
    TypeDefinition {
        name: String,
        type_def: Type,
        span: SourceSpan,
    },
}

/// Global or local variable declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub decl_type: Type,
    pub storage_class: StorageClass,
    pub span: SourceSpan,
}

impl Declaration {
    /// Whether this declaration is externally linked
    pub fn is_external(&self) -> bool {
        self.storage_class.is_external()
    }
}

/// Function definition (or bodyless prototype)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Parameter>,
    pub body: Option<Statement>,
    pub storage_class: StorageClass,
    /// Marked by the type-checker for data-parallel kernel entry points
    pub is_kernel: bool,
    pub span: SourceSpan,
}

impl FunctionDefinition {
    /// Whether this function is externally linked (not file-local)
    pub fn is_global(&self) -> bool {
        self.storage_class.is_external()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Whether this function was defined inside the trusted system header
    pub fn is_in_system_header(&self) -> bool {
        self.span.filename().ends_with(SYSTEM_HEADER_EXT)
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: Type,
    pub span: SourceSpan,
}

/// Statement nodes
///
/// Only the shapes the reference-count annotator cares about are modelled;
/// everything else the parser collapses into `Opaque`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Compound statement (block)
    Compound(Vec<Statement>),

    /// Local variable declaration
    Local(Declaration),

    /// Call of a named function with by-name argument references
    Call { function: String, args: Vec<String> },

    /// Return statement
    Return,

    /// Anything the annotator does not need to understand
    Opaque,
}

impl Statement {
    pub fn compound(statements: Vec<Statement>, span: SourceSpan) -> Self {
        Self {
            kind: StatementKind::Compound(statements),
            span,
        }
    }

    pub fn call(function: &str, args: Vec<String>, span: SourceSpan) -> Self {
        Self {
            kind: StatementKind::Call {
                function: function.to_string(),
                args,
            },
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_in(filename: &str) -> SourceSpan {
        SourceSpan::from_location(rsc_common::SourceLocation::new(filename, 1, 1))
    }

    fn function(name: &str, storage_class: StorageClass, filename: &str) -> FunctionDefinition {
        FunctionDefinition {
            name: name.to_string(),
            return_type: Type::Void,
            parameters: Vec::new(),
            body: Some(Statement::compound(Vec::new(), span_in(filename))),
            storage_class,
            is_kernel: false,
            span: span_in(filename),
        }
    }

    #[test]
    fn test_function_linkage() {
        assert!(function("f", StorageClass::Default, "kernel.rs").is_global());
        assert!(!function("g", StorageClass::Static, "kernel.rs").is_global());
    }

    #[test]
    fn test_system_header_detection() {
        assert!(function("rsGetDt", StorageClass::Default, "rs_core.rsh").is_in_system_header());
        assert!(!function("foo", StorageClass::Default, "kernel.rs").is_in_system_header());
    }
}
