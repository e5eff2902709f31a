//! IR Instructions
//!
//! The instruction set is the fixed capability surface the backend relies
//! on: memory access, field addressing, calls and returns. Control flow
//! inside synthesized functions is straight-line, so `Return` is the only
//! terminator.

use rsc_common::TempId;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{CallingConv, IrType, Value};

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Load from memory: result = load ptr
    Load {
        result: TempId,
        ptr: Value,
        result_type: IrType,
    },

    /// Store to memory: store value, ptr
    Store { value: Value, ptr: Value },

    /// Field/element address: result = getelementptr base, indices...
    GetElementPtr {
        result: TempId,
        base: Value,
        indices: Vec<Value>,
        result_type: IrType,
    },

    /// Function call: result = call func(args...)
    Call {
        result: Option<TempId>,
        function: Value,
        args: Vec<Value>,
        result_type: IrType,
        calling_conv: CallingConv,
    },

    /// Return: ret value or ret void
    Return(Option<Value>),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Load {
                result,
                ptr,
                result_type,
            } => {
                write!(f, "%{result} = load {result_type}, {result_type}* {ptr}")
            }
            Instruction::Store { value, ptr } => {
                write!(f, "store {value}, {ptr}")
            }
            Instruction::GetElementPtr {
                result,
                base,
                indices,
                result_type: _,
            } => {
                write!(f, "%{result} = getelementptr inbounds {base}")?;
                for index in indices {
                    write!(f, ", {index}")?;
                }
                Ok(())
            }
            Instruction::Call {
                result,
                function,
                args,
                result_type,
                calling_conv: _,
            } => {
                if let Some(result) = result {
                    write!(f, "%{result} = ")?;
                }
                write!(f, "call {result_type} {function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Instruction::Return(Some(value)) => write!(f, "ret {value}"),
            Instruction::Return(None) => write!(f, "ret void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_load_and_gep() {
        let gep = Instruction::GetElementPtr {
            result: 1,
            base: Value::Temp(0),
            indices: vec![Value::ConstInt(0), Value::ConstInt(2)],
            result_type: IrType::Ptr(Box::new(IrType::F32)),
        };
        assert_eq!(gep.to_string(), "%1 = getelementptr inbounds %0, 0, 2");

        let load = Instruction::Load {
            result: 2,
            ptr: Value::Temp(1),
            result_type: IrType::F32,
        };
        assert_eq!(load.to_string(), "%2 = load float, float* %1");
    }

    #[test]
    fn test_display_call_and_return() {
        let call = Instruction::Call {
            result: None,
            function: Value::Function("bar".to_string()),
            args: vec![Value::Temp(1), Value::Temp(2)],
            result_type: IrType::Void,
            calling_conv: CallingConv::C,
        };
        assert_eq!(call.to_string(), "call void @bar(%1, %2)");
        assert_eq!(Instruction::Return(None).to_string(), "ret void");
    }
}
