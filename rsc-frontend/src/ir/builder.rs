//! IR Builder
//!
//! Utilities for constructing IR programmatically. One builder instance is
//! used per synthesized function; temporaries restart at zero after the
//! declared parameters.

use rsc_common::{LabelId, TempId};
use crate::ir::{
    BasicBlock, CallingConv, Function, Instruction, IrType, Linkage, Value,
};

/// Builder for constructing IR
pub struct IrBuilder {
    current_function: Option<Function>,
    current_block: Option<LabelId>,
    next_temp_id: TempId,
    next_label_id: LabelId,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self {
            current_function: None,
            current_block: None,
            next_temp_id: 0,
            next_label_id: 0,
        }
    }

    pub fn new_temp(&mut self) -> TempId {
        let temp = self.next_temp_id;
        self.next_temp_id += 1;
        temp
    }

    pub fn new_label(&mut self) -> LabelId {
        let label = self.next_label_id;
        self.next_label_id += 1;
        label
    }

    pub fn create_function(
        &mut self,
        name: String,
        return_type: IrType,
        linkage: Linkage,
        calling_conv: CallingConv,
    ) -> &mut Function {
        let mut function = Function::new(name, return_type);
        function.linkage = linkage;
        function.calling_conv = calling_conv;
        self.current_function = Some(function);
        self.current_block = None;
        // Reset counters for the new function
        self.next_temp_id = 0;
        self.next_label_id = 0;
        self.current_function
            .as_mut()
            .unwrap_or_else(|| unreachable!("function was just installed"))
    }

    pub fn add_parameter(&mut self, param_type: IrType) -> Result<TempId, String> {
        let param_id = self.new_temp();
        if let Some(ref mut function) = self.current_function {
            function.add_parameter(param_id, param_type);
            Ok(param_id)
        } else {
            Err("No current function".to_string())
        }
    }

    pub fn create_block(&mut self) -> Result<LabelId, String> {
        let label_id = self.new_label();
        let block = BasicBlock::new(label_id);

        if let Some(ref mut function) = self.current_function {
            function.add_block(block);
            self.current_block = Some(label_id);
            Ok(label_id)
        } else {
            Err("No current function".to_string())
        }
    }

    pub fn build_load(&mut self, ptr: Value, result_type: IrType) -> Result<TempId, String> {
        let result = self.new_temp();
        let instr = Instruction::Load {
            result,
            ptr,
            result_type,
        };

        self.add_instruction(instr)?;
        Ok(result)
    }

    pub fn build_store(&mut self, value: Value, ptr: Value) -> Result<(), String> {
        let instr = Instruction::Store { value, ptr };
        self.add_instruction(instr)
    }

    /// Address of field `field_index` inside the struct `base` points at.
    /// Emits the canonical two-index form (outer zero index plus field
    /// index).
    pub fn build_struct_gep(
        &mut self,
        base: Value,
        field_index: u32,
        result_type: IrType,
    ) -> Result<TempId, String> {
        let result = self.new_temp();
        let instr = Instruction::GetElementPtr {
            result,
            base,
            indices: vec![Value::ConstInt(0), Value::ConstInt(i64::from(field_index))],
            result_type,
        };

        self.add_instruction(instr)?;
        Ok(result)
    }

    pub fn build_call(
        &mut self,
        function: Value,
        args: Vec<Value>,
        result_type: IrType,
        calling_conv: CallingConv,
    ) -> Result<Option<TempId>, String> {
        let result = if matches!(result_type, IrType::Void) {
            None
        } else {
            Some(self.new_temp())
        };

        let instr = Instruction::Call {
            result,
            function,
            args,
            result_type,
            calling_conv,
        };

        self.add_instruction(instr)?;
        Ok(result)
    }

    pub fn build_return(&mut self, value: Option<Value>) -> Result<(), String> {
        let instr = Instruction::Return(value);
        self.add_instruction(instr)
    }

    fn add_instruction(&mut self, instr: Instruction) -> Result<(), String> {
        if let Some(ref mut function) = self.current_function {
            if let Some(block_id) = self.current_block {
                if let Some(block) = function.get_block_mut(block_id) {
                    block.add_instruction(instr);
                    Ok(())
                } else {
                    Err("Current block not found".to_string())
                }
            } else {
                Err("No current block".to_string())
            }
        } else {
            Err("No current function".to_string())
        }
    }

    pub fn finish_function(&mut self) -> Option<Function> {
        self.current_block = None;
        self.current_function.take()
    }
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}
