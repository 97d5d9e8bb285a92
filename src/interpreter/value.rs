//! Values computed by the constant interpreter

use super::EvalError;

/// A compile-time value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer (booleans are 0 and 1)
    Int(i32),
    /// Array or record contents, in index/field order
    List(Vec<Value>),
}

impl Value {
    /// Convert a boolean to its integer encoding
    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        Value::Int(i32::from(value))
    }

    /// Get the integer, failing for lists
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::NotScalar`] if the value is a list.
    pub fn as_int(&self) -> Result<i32, EvalError> {
        match self {
            Value::Int(value) => Ok(*value),
            Value::List(_) => Err(EvalError::NotScalar),
        }
    }

    /// Append every integer contained in this value to `out`
    pub fn flatten_into(self, out: &mut Vec<i32>) {
        match self {
            Value::Int(value) => out.push(value),
            Value::List(values) => {
                for value in values {
                    value.flatten_into(out);
                }
            }
        }
    }
}
