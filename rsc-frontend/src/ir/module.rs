//! Module and Global Variables
//!
//! The output artifact: functions, globals and the named metadata area.
//! Named metadata lists are created lazily through
//! [`Module::get_or_insert_named_metadata`] and only ever appended to.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{Function, IrType, MetadataNode, NamedMetadata, Value};

/// Linkage types for global symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    /// Visible to the runtime loader
    External,
    /// Only visible within this module (static)
    Internal,
}

/// Global variable definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: String,
    pub var_type: IrType,
    pub is_constant: bool,
    pub initializer: Option<Value>,
    pub linkage: Linkage,
}

/// IR Module - represents a complete compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
    pub globals: Vec<GlobalVariable>,
    named_metadata: Vec<NamedMetadata>,
}

impl Module {
    pub fn new(name: String) -> Self {
        Self {
            name,
            functions: Vec::new(),
            globals: Vec::new(),
            named_metadata: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn add_global(&mut self, global: GlobalVariable) {
        self.globals.push(global);
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn get_global(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.iter().find(|g| g.name == name)
    }

    /// Index of the named metadata list with this name, creating an empty
    /// list if it does not exist yet. Idempotent.
    pub fn ensure_named_metadata(&mut self, name: &str) -> usize {
        if let Some(pos) = self.named_metadata.iter().position(|m| m.name == name) {
            pos
        } else {
            self.named_metadata.push(NamedMetadata::new(name));
            self.named_metadata.len() - 1
        }
    }

    /// Get-or-create accessor for a named metadata list
    pub fn get_or_insert_named_metadata(&mut self, name: &str) -> &mut NamedMetadata {
        let idx = self.ensure_named_metadata(name);
        &mut self.named_metadata[idx]
    }

    /// Access a named metadata list by index (as returned by
    /// [`Module::ensure_named_metadata`])
    pub fn named_metadata_at(&mut self, idx: usize) -> &mut NamedMetadata {
        &mut self.named_metadata[idx]
    }

    pub fn named_metadata(&self, name: &str) -> Option<&NamedMetadata> {
        self.named_metadata.iter().find(|m| m.name == name)
    }

    pub fn has_named_metadata(&self, name: &str) -> bool {
        self.named_metadata.iter().any(|m| m.name == name)
    }

    /// All named metadata lists in creation order
    pub fn named_metadata_lists(&self) -> &[NamedMetadata] {
        &self.named_metadata
    }

    /// Append one record to the named list, creating the list on first use
    pub fn append_metadata(&mut self, name: &str, node: MetadataNode) {
        self.get_or_insert_named_metadata(name).add_operand(node);
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for global in &self.globals {
            let linkage = match global.linkage {
                Linkage::External => "",
                Linkage::Internal => "internal ",
            };
            let kind = if global.is_constant { "constant" } else { "global" };
            write!(f, "@{} = {}{} {}", global.name, linkage, kind, global.var_type)?;
            if let Some(init) = &global.initializer {
                write!(f, " {init}")?;
            }
            writeln!(f)?;
        }
        for function in &self.functions {
            writeln!(f, "{function}")?;
        }
        for md in &self.named_metadata {
            writeln!(f, "{md}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_insert_is_idempotent() {
        let mut module = Module::new("unit".to_string());

        module
            .get_or_insert_named_metadata("#rs_export_var")
            .add_operand(MetadataNode::new(vec!["foo".to_string()]));
        module
            .get_or_insert_named_metadata("#rs_export_var")
            .add_operand(MetadataNode::new(vec!["bar".to_string()]));

        assert_eq!(module.named_metadata_lists().len(), 1);
        let md = module.named_metadata("#rs_export_var").map(|m| m.num_operands());
        assert_eq!(md, Some(2));
    }

    #[test]
    fn test_function_lookup() {
        let mut module = Module::new("unit".to_string());
        module.add_function(Function::new("bar".to_string(), IrType::Void));

        assert!(module.get_function("bar").is_some());
        assert!(module.get_function("baz").is_none());
    }

    #[test]
    fn test_global_lookup() {
        let mut module = Module::new("unit".to_string());
        module.add_global(GlobalVariable {
            name: "foo".to_string(),
            var_type: IrType::I32,
            is_constant: false,
            initializer: None,
            linkage: Linkage::External,
        });

        assert!(module.get_global("foo").is_some());
        assert!(!module.has_named_metadata("#rs_export_var"));
    }
}
