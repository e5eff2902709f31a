//! Export registry entries
//!
//! One entry type per exported entity class. Entries are created while the
//! unit is processed and are read-only afterwards; the backend never writes
//! back into them.

use serde::{Deserialize, Serialize};
use crate::ast::{FunctionDefinition, Parameter};
use crate::ir::IrType;
use crate::registry::export_type::{ExportType, RecordField, RecordType};
use crate::types::Type;

/// An exported global variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportVar {
    pub name: String,
    pub export_type: ExportType,
}

impl ExportVar {
    pub fn new(name: &str, export_type: ExportType) -> Self {
        Self {
            name: name.to_string(),
            export_type,
        }
    }
}

/// A named parameter of an exported function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportParam {
    pub name: String,
    pub export_type: ExportType,
}

/// An exported function the runtime may invoke
///
/// Functions with parameters are invoked through a packed argument block;
/// the registry records the record type it expects that block to have, and
/// the trampoline synthesizer later cross-checks the block it builds from
/// the generated code against this expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFunc {
    pub name: String,
    pub params: Vec<ExportParam>,
    pub return_type: Type,
    param_packet: Option<RecordType>,
}

impl ExportFunc {
    pub fn new(name: &str, params: Vec<ExportParam>, return_type: Type) -> Self {
        let param_packet = if params.is_empty() {
            None
        } else {
            Some(RecordType {
                name: format!("{name}.params"),
                fields: params
                    .iter()
                    .map(|p| RecordField {
                        name: p.name.clone(),
                        field_type: p.export_type.clone(),
                    })
                    .collect(),
            })
        };
        Self {
            name: name.to_string(),
            params,
            return_type,
            param_packet,
        }
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// The packed-parameter record the registry expects, if any
    pub fn param_packet(&self) -> Option<&RecordType> {
        self.param_packet.as_ref()
    }

    /// Cross-check a parameter packet built from generated code against the
    /// registry's expectation. The comparison is structural: field layouts
    /// must match, struct names are ignored.
    pub fn check_parameter_packet_type(&self, actual: Option<&IrType>) -> bool {
        match (&self.param_packet, actual) {
            (None, None) => true,
            (Some(expected), Some(actual)) => expected.to_ir_type().same_layout(actual),
            _ => false,
        }
    }
}

/// Signature feature bits folded into a kernel's metadata encoding
const SIG_IN: u32 = 0x01;
const SIG_OUT: u32 = 0x02;
const SIG_USR_DATA: u32 = 0x04;
const SIG_X: u32 = 0x08;
const SIG_Y: u32 = 0x10;

/// An exported data-parallel kernel
///
/// The encoding summarizes the kernel signature for the runtime dispatcher.
/// It is computed once when the kernel is registered; the descriptor
/// emitter treats it as an atomic blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportForEach {
    pub name: String,
    metadata_encoding: u32,
}

impl ExportForEach {
    pub fn from_kernel(fd: &FunctionDefinition) -> Self {
        Self {
            name: fd.name.clone(),
            metadata_encoding: encode_signature(fd),
        }
    }

    pub fn metadata_encoding(&self) -> u32 {
        self.metadata_encoding
    }
}

fn encode_signature(fd: &FunctionDefinition) -> u32 {
    let mut encoding = 0;

    let mut pointer_params = fd
        .parameters
        .iter()
        .filter(|p| matches!(p.param_type, Type::Pointer(_)));
    if pointer_params.next().is_some() {
        encoding |= SIG_IN;
    }
    if pointer_params.next().is_some() {
        encoding |= SIG_USR_DATA;
    }

    if fd.return_type != Type::Void {
        encoding |= SIG_OUT;
    }

    if has_index_param(&fd.parameters, "x") {
        encoding |= SIG_X;
    }
    if has_index_param(&fd.parameters, "y") {
        encoding |= SIG_Y;
    }

    encoding
}

fn has_index_param(params: &[Parameter], name: &str) -> bool {
    params
        .iter()
        .any(|p| p.name == name && matches!(p.param_type, Type::U32))
}
