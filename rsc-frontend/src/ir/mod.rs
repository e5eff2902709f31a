//! Intermediate Representation for the output module
//!
//! The backend treats this as its output sink: it creates functions and
//! basic blocks, emits the handful of instructions the trampoline
//! synthesizer needs, and attaches named metadata records. Nothing in here
//! performs optimization or analysis.
//!
//! ## Architecture
//!
//! - `types` - Type system (IrType)
//! - `values` - Value representations
//! - `instructions` - IR instructions
//! - `blocks` - Basic block management
//! - `function` - Function definitions and calling conventions
//! - `module` - Module, global variables and named metadata storage
//! - `metadata` - Named metadata lists and records
//! - `builder` - IR construction utilities

pub use self::blocks::BasicBlock;
pub use self::builder::IrBuilder;
pub use self::function::{CallingConv, Function};
pub use self::instructions::Instruction;
pub use self::metadata::{MetadataNode, NamedMetadata};
pub use self::module::{GlobalVariable, Linkage, Module};
pub use self::types::IrType;
pub use self::values::Value;

mod blocks;
mod builder;
mod function;
mod instructions;
mod metadata;
mod module;
mod types;
mod values;
