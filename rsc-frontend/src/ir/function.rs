//! Function Definitions
//!
//! IR functions with their parameters, blocks and the attributes the
//! trampoline synthesizer needs to preserve (linkage, calling convention,
//! inlinability).

use rsc_common::{LabelId, TempId};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{BasicBlock, IrType, Linkage};

/// Calling conventions understood by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallingConv {
    C,
    Fast,
}

impl Default for CallingConv {
    fn default() -> Self {
        CallingConv::C
    }
}

impl fmt::Display for CallingConv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallingConv::C => write!(f, "ccc"),
            CallingConv::Fast => write!(f, "fastcc"),
        }
    }
}

/// Function in IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub return_type: IrType,
    pub parameters: Vec<(TempId, IrType)>,
    pub blocks: Vec<BasicBlock>,
    pub linkage: Linkage,
    pub calling_conv: CallingConv,
    pub no_inline: bool,
}

impl Function {
    pub fn new(name: String, return_type: IrType) -> Self {
        Self {
            name,
            return_type,
            parameters: Vec::new(),
            blocks: Vec::new(),
            linkage: Linkage::External,
            calling_conv: CallingConv::C,
            no_inline: false,
        }
    }

    pub fn add_parameter(&mut self, param_id: TempId, param_type: IrType) {
        self.parameters.push((param_id, param_type));
    }

    pub fn add_block(&mut self, block: BasicBlock) {
        self.blocks.push(block);
    }

    pub fn get_block_mut(&mut self, id: LabelId) -> Option<&mut BasicBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Whether this is a declaration without a body
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Parameter types in declaration order
    pub fn param_types(&self) -> Vec<IrType> {
        self.parameters.iter().map(|(_, ty)| ty.clone()).collect()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_declaration() {
            "declare"
        } else {
            "define"
        };
        write!(f, "{keyword} ")?;
        if self.linkage == Linkage::Internal {
            write!(f, "internal ")?;
        }
        write!(f, "{} @{}(", self.return_type, self.name)?;
        for (i, (id, ty)) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ty} %{id}")?;
        }
        write!(f, ")")?;
        if self.no_inline {
            write!(f, " noinline")?;
        }
        if self.is_declaration() {
            return Ok(());
        }
        writeln!(f, " {{")?;
        for block in &self.blocks {
            writeln!(f, "L{}:", block.id)?;
            for instr in &block.instructions {
                writeln!(f, "  {instr}")?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Instruction;

    #[test]
    fn test_function_shape() {
        let mut func = Function::new("bar".to_string(), IrType::Void);
        func.add_parameter(0, IrType::I32);
        func.add_parameter(1, IrType::F32);
        assert!(func.is_declaration());
        assert_eq!(func.param_types(), vec![IrType::I32, IrType::F32]);

        let mut block = BasicBlock::new(0);
        block.add_instruction(Instruction::Return(None));
        func.add_block(block);
        assert!(!func.is_declaration());

        let text = func.to_string();
        assert!(text.starts_with("define void @bar(i32 %0, float %1)"));
        assert!(text.contains("ret void"));
    }

    #[test]
    fn test_declaration_display() {
        let func = Function::new("ext".to_string(), IrType::I32);
        assert_eq!(func.to_string(), "declare i32 @ext()");
    }
}
