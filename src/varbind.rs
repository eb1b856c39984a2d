//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value.

use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// A `NoSuchObject` binding for `oid`, the "nothing here" answer.
    pub fn no_such_object(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::NoSuchObject,
        }
    }

    /// An `EndOfMibView` binding for `oid`.
    pub fn end_of_mib_view(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::EndOfMibView,
        }
    }

    /// True if the value is one of the exception values.
    pub fn is_exception(&self) -> bool {
        self.value.is_exception()
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_varbind_display() {
        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 15, 2, 0), Value::Integer(64846));
        let display = format!("{}", vb);
        assert!(display.contains("1.3.6.1.2.1.15.2.0"));
        assert!(display.contains("64846"));
    }

    #[test]
    fn test_varbind_display_exception() {
        let vb = VarBind::no_such_object(oid!(1, 3, 6, 1));
        assert!(vb.is_exception());
        assert!(format!("{}", vb).contains("noSuchObject"));
    }

    #[test]
    fn test_end_of_mib_view_constructor() {
        let vb = VarBind::end_of_mib_view(oid!(1, 3, 6, 1, 2, 1, 15));
        assert_eq!(vb.oid, oid!(1, 3, 6, 1, 2, 1, 15));
        assert_eq!(vb.value, Value::EndOfMibView);
    }
}
