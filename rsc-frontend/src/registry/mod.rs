//! Export-type registry
//!
//! Decides which declarations of a translation unit are externally visible
//! and assigns each a canonical exported-type representation. Collections
//! are append-only and iterate in insertion order, which equals declaration
//! order in the source - the runtime correlates descriptor positions with
//! slot numbers, so this order is a hard requirement.

pub mod entries;
pub mod export_type;

pub use entries::{ExportForEach, ExportFunc, ExportParam, ExportVar};
pub use export_type::{
    normalize_type, validate_var_type, ConstantArrayType, DataKind, DataType, ExportType,
    ExportTypeError, MatrixType, PointerType, PrimitiveType, RecordField, RecordType, VectorType,
};

use log::debug;
use rsc_common::ErrorReporter;
use std::collections::HashMap;
use crate::ast::{Declaration, FunctionDefinition, Pragma, TopLevelItem, TranslationUnit};
use crate::types::Type;

/// Per-unit export registry and pragma state
pub struct ExportContext {
    version: i32,
    process_export: bool,
    export_vars: Vec<ExportVar>,
    export_funcs: Vec<ExportFunc>,
    export_foreach: Vec<ExportForEach>,
    export_types: Vec<ExportType>,
    export_type_names: HashMap<String, usize>,
}

impl ExportContext {
    pub fn new() -> Self {
        Self {
            version: 0,
            process_export: true,
            export_vars: Vec::new(),
            export_funcs: Vec::new(),
            export_foreach: Vec::new(),
            export_types: Vec::new(),
            export_type_names: HashMap::new(),
        }
    }

    /// The language version resolved from the unit's pragmas; 0 when no
    /// version pragma was seen
    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    /// Global "should export anything" switch
    pub fn process_export(&self) -> bool {
        self.process_export
    }

    pub fn set_process_export(&mut self, process_export: bool) {
        self.process_export = process_export;
    }

    pub fn has_export_vars(&self) -> bool {
        !self.export_vars.is_empty()
    }

    pub fn has_export_funcs(&self) -> bool {
        !self.export_funcs.is_empty()
    }

    pub fn has_export_foreach(&self) -> bool {
        !self.export_foreach.is_empty()
    }

    pub fn has_export_types(&self) -> bool {
        !self.export_types.is_empty()
    }

    /// Exported variables in declaration order
    pub fn export_vars(&self) -> &[ExportVar] {
        &self.export_vars
    }

    /// Exported functions in declaration order
    pub fn export_funcs(&self) -> &[ExportFunc] {
        &self.export_funcs
    }

    /// Exported kernels in declaration order
    pub fn export_foreach(&self) -> &[ExportForEach] {
        &self.export_foreach
    }

    /// Exported types in registration order
    pub fn export_types(&self) -> &[ExportType] {
        &self.export_types
    }

    pub fn add_export_var(&mut self, var: ExportVar) {
        self.register_export_type(&var.export_type);
        self.export_vars.push(var);
    }

    pub fn add_export_func(&mut self, func: ExportFunc) {
        for param in &func.params {
            self.register_export_type(&param.export_type);
        }
        self.export_funcs.push(func);
    }

    pub fn add_export_foreach(&mut self, foreach: ExportForEach) {
        self.export_foreach.push(foreach);
    }

    /// Register an exported type (and every record type it references) by
    /// name, nested types first. Registering the same name twice is a no-op.
    pub fn register_export_type(&mut self, et: &ExportType) {
        match et {
            ExportType::Pointer(pt) => self.register_export_type(&pt.pointee),
            ExportType::ConstantArray(at) => self.register_export_type(&at.element),
            ExportType::Record(rt) => {
                for field in &rt.fields {
                    self.register_export_type(&field.field_type);
                }
            }
            _ => {}
        }

        let name = et.name();
        if self.export_type_names.contains_key(&name) {
            return;
        }
        self.export_type_names.insert(name, self.export_types.len());
        self.export_types.push(et.clone());
    }

    /// Populate the registry from a parsed unit, in declaration order
    pub fn process_unit(&mut self, unit: &TranslationUnit, reporter: &mut ErrorReporter) {
        self.resolve_pragmas(&unit.pragmas);

        for item in &unit.items {
            match item {
                TopLevelItem::Declaration(decl) => self.process_global(decl),
                TopLevelItem::Function(fd) => self.process_function(fd, reporter),
                TopLevelItem::TypeDefinition { name, type_def, .. } => {
                    self.process_type_definition(name, type_def);
                }
            }
        }
    }

    fn resolve_pragmas(&mut self, pragmas: &[Pragma]) {
        for pragma in pragmas {
            if pragma.name == "version" {
                match pragma.value.trim().parse::<i32>() {
                    Ok(value) => self.version = value,
                    Err(_) => {
                        // Unparseable values read as "no version set"; the
                        // unit validator reports the missing pragma.
                        debug!("ignoring unparseable version pragma '{}'", pragma.value);
                    }
                }
            }
        }
    }

    fn process_global(&mut self, decl: &Declaration) {
        if !decl.is_external() {
            return;
        }
        if let Err(err) = export_type::validate_var_type(&decl.decl_type) {
            // Not exportable; the unit validator owns the diagnostic.
            debug!("global '{}' not registered for export: {}", decl.name, err);
            return;
        }
        match ExportType::from_type(&decl.decl_type) {
            Ok(export_type) => {
                self.add_export_var(ExportVar::new(&decl.name, export_type));
            }
            Err(err) => {
                debug!("global '{}' not registered for export: {}", decl.name, err);
            }
        }
    }

    fn process_function(&mut self, fd: &FunctionDefinition, reporter: &mut ErrorReporter) {
        if fd.is_in_system_header() || !fd.has_body() {
            return;
        }
        if fd.is_kernel {
            self.add_export_foreach(ExportForEach::from_kernel(fd));
            return;
        }
        if !fd.is_global() {
            return;
        }

        let mut params = Vec::with_capacity(fd.parameters.len());
        for param in &fd.parameters {
            match ExportType::from_type(&param.param_type) {
                Ok(export_type) => params.push(ExportParam {
                    name: param.name.clone(),
                    export_type,
                }),
                Err(err) => {
                    reporter.error(
                        format!(
                            "cannot export function '{}': parameter '{}' {}",
                            fd.name, param.name, err
                        ),
                        param.span.clone(),
                    );
                    return;
                }
            }
        }
        self.add_export_func(ExportFunc::new(&fd.name, params, fd.return_type.clone()));
    }

    fn process_type_definition(&mut self, name: &str, type_def: &Type) {
        match ExportType::from_type(type_def) {
            Ok(et) => self.register_export_type(&et),
            Err(err) => {
                debug!("type definition '{name}' not registered for export: {err}");
            }
        }
    }
}

impl Default for ExportContext {
    fn default() -> Self {
        Self::new()
    }
}
