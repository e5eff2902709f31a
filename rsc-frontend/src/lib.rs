//! RSC Script Compiler - Frontend
//!
//! This crate provides the data structures the backend operates on:
//! - AST: declarations as the external parser hands them over
//! - Types: the script language type system
//! - Registry: exported entities and their runtime-facing classification
//! - Refcount: managed-object lifetime annotation
//! - IR: the output module the backend emits into

pub mod ast;
pub mod ir;
pub mod refcount;
pub mod registry;
pub mod types;

pub use ast::{
    Declaration, FunctionDefinition, Parameter, Pragma, Statement, StatementKind, TopLevelItem,
    TranslationUnit,
};
pub use refcount::RefCountVisitor;
pub use registry::{ExportContext, ExportType};
pub use types::{ObjectKind, StructField, Type};
