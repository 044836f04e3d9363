//! Typed field getters shared by [`PointValues`](crate::PointValues) and [`Point`](crate::Point)

use crate::error::Result;
use crate::types::{extract, FieldKind, FieldType, FieldValue};

/// Read access to the fields of a point.
///
/// Every typed getter returns `Ok(None)` for a missing field and
/// `Err(TypeMismatch)` when the stored value is of another kind. Values are
/// never coerced between kinds.
pub trait FieldAccess {
    fn get_field_value(&self, name: &str) -> Option<&FieldValue>;

    fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.get_field_value(name).map(FieldValue::kind)
    }

    fn has_field(&self, name: &str) -> bool {
        self.get_field_value(name).is_some()
    }

    /// Generic typed getter, e.g. `point.get_field::<f64>("usage")`
    fn get_field<T: FieldType>(&self, name: &str) -> Result<Option<T>> {
        self.get_field_value(name)
            .map(|value| extract::<T>(name, value))
            .transpose()
    }

    fn get_float_field(&self, name: &str) -> Result<Option<f64>> {
        self.get_field(name)
    }

    fn get_integer_field(&self, name: &str) -> Result<Option<i64>> {
        self.get_field(name)
    }

    fn get_uinteger_field(&self, name: &str) -> Result<Option<u64>> {
        self.get_field(name)
    }

    fn get_string_field(&self, name: &str) -> Result<Option<String>> {
        self.get_field(name)
    }

    fn get_boolean_field(&self, name: &str) -> Result<Option<bool>> {
        self.get_field(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::collections::HashMap;

    struct Fields(HashMap<String, FieldValue>);

    impl FieldAccess for Fields {
        fn get_field_value(&self, name: &str) -> Option<&FieldValue> {
            self.0.get(name)
        }
    }

    fn fields() -> Fields {
        Fields(HashMap::from([
            ("f".to_string(), FieldValue::Float(1.5)),
            ("i".to_string(), FieldValue::Integer(-3)),
            ("u".to_string(), FieldValue::UnsignedInteger(3)),
            ("s".to_string(), FieldValue::String("x".to_string())),
            ("b".to_string(), FieldValue::Boolean(false)),
        ]))
    }

    #[test]
    fn test_typed_getters() {
        let fields = fields();
        assert_eq!(fields.get_float_field("f").unwrap(), Some(1.5));
        assert_eq!(fields.get_integer_field("i").unwrap(), Some(-3));
        assert_eq!(fields.get_uinteger_field("u").unwrap(), Some(3));
        assert_eq!(fields.get_string_field("s").unwrap(), Some("x".to_string()));
        assert_eq!(fields.get_boolean_field("b").unwrap(), Some(false));
        assert_eq!(fields.get_field::<f64>("f").unwrap(), Some(1.5));
    }

    #[test]
    fn test_missing_field_is_absent_not_error() {
        let fields = fields();
        assert_eq!(fields.get_float_field("missing").unwrap(), None);
        assert_eq!(fields.field_kind("missing"), None);
        assert!(!fields.has_field("missing"));
    }

    #[test]
    fn test_mismatch_is_not_coerced() {
        let fields = fields();
        match fields.get_float_field("i") {
            Err(CoreError::TypeMismatch {
                field,
                expected,
                actual,
            }) => {
                assert_eq!(field, "i");
                assert_eq!(expected, "float");
                assert_eq!(actual, "integer");
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
        assert!(fields.get_integer_field("u").is_err());
        assert!(fields.get_string_field("b").is_err());
    }
}
