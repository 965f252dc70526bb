//! Label and attribute-spec identifiers.
//!
//! Both are plain integers on the wire; the newtypes keep an attribute spec
//! from being looked up as a label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the label (class) an annotation belongs to.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LabelId(pub u64);

impl LabelId {
    /// Creates a new LabelId.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelId({})", self.0)
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LabelId {
    fn from(id: u64) -> Self {
        LabelId::new(id)
    }
}

/// Identifier of an attribute specification attached to a label.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSpecId(pub u64);

impl AttributeSpecId {
    /// Creates a new AttributeSpecId.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AttributeSpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeSpecId({})", self.0)
    }
}

impl fmt::Display for AttributeSpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AttributeSpecId {
    fn from(id: u64) -> Self {
        AttributeSpecId::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&LabelId::new(7)).expect("serialize label id");
        assert_eq!(json, "7");

        let spec: AttributeSpecId = serde_json::from_str("12").expect("parse spec id");
        assert_eq!(spec.as_u64(), 12);
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(LabelId::new(3).to_string(), "3");
        assert_eq!(format!("{:?}", AttributeSpecId::new(4)), "AttributeSpecId(4)");
    }
}
