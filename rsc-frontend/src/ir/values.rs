//! IR Value Representations
//!
//! Operands of IR instructions: temporaries, constants and symbol
//! references.

use rsc_common::TempId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Value - represents operands in IR instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Temporary value
    Temp(TempId),

    /// Constant integer
    ConstInt(i64),

    /// Constant float
    ConstFloat(f64),

    /// Global symbol reference
    Global(String),

    /// Function reference
    Function(String),

    /// Undefined value (uninitialized globals, stub returns)
    Undef,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temp(id) => write!(f, "%{id}"),
            Value::ConstInt(val) => write!(f, "{val}"),
            Value::ConstFloat(val) => write!(f, "{val}"),
            Value::Global(name) => write!(f, "@{name}"),
            Value::Function(name) => write!(f, "@{name}"),
            Value::Undef => write!(f, "undef"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Temp(3).to_string(), "%3");
        assert_eq!(Value::ConstInt(-7).to_string(), "-7");
        assert_eq!(Value::Global("foo".to_string()).to_string(), "@foo");
        assert_eq!(Value::Undef.to_string(), "undef");
    }
}
