//! Named Metadata
//!
//! The descriptor area of the output module: flat, append-only lists of
//! string tuples keyed by a list name. The runtime loader parses these
//! without any access to compiler types, so nothing richer than strings is
//! allowed in here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One metadata record: an ordered tuple of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataNode(pub Vec<String>);

impl MetadataNode {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for MetadataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{{")?;
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "!\"{field}\"")?;
        }
        write!(f, "}}")
    }
}

/// A named, ordered list of metadata records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedMetadata {
    pub name: String,
    operands: Vec<MetadataNode>,
}

impl NamedMetadata {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            operands: Vec::new(),
        }
    }

    /// Append a record. Records are never reordered or removed.
    pub fn add_operand(&mut self, node: MetadataNode) {
        self.operands.push(node);
    }

    pub fn operands(&self) -> &[MetadataNode] {
        &self.operands
    }

    pub fn num_operands(&self) -> usize {
        self.operands.len()
    }
}

impl fmt::Display for NamedMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{} = !{{", self.name)?;
        for (i, op) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{op}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order() {
        let mut md = NamedMetadata::new("#rs_export_var");
        md.add_operand(MetadataNode::new(vec!["foo".to_string(), "4".to_string()]));
        md.add_operand(MetadataNode::new(vec!["bar".to_string(), "0".to_string()]));

        assert_eq!(md.num_operands(), 2);
        assert_eq!(md.operands()[0].fields(), ["foo", "4"]);
        assert_eq!(md.operands()[1].fields(), ["bar", "0"]);
    }

    #[test]
    fn test_display() {
        let mut md = NamedMetadata::new("#rs_export_func");
        md.add_operand(MetadataNode::new(vec![".helper_bar".to_string()]));
        assert_eq!(md.to_string(), "!#rs_export_func = !{!{!\".helper_bar\"}}");
    }
}
