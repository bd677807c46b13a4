//! Typed result rows
//!
//! Result records are decoded into `SqlValue`s once, at the client boundary.
//! Query sites use the positional accessors and get a decode error instead
//! of a panic when the shape is not what they expect.

use encopt_common::{EncoptError, Result};

/// A single field of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Str(String),
    Long(i64),
    Double(f64),
    Bool(bool),
    Null,
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row(pub Vec<SqlValue>);

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn get(&self, idx: usize) -> Result<&SqlValue> {
        self.0.get(idx).ok_or_else(|| {
            EncoptError::Decode(format!(
                "row has {} fields, no field at index {idx}",
                self.0.len()
            ))
        })
    }

    /// String field at `idx`.
    pub fn str(&self, idx: usize) -> Result<&str> {
        match self.get(idx)? {
            SqlValue::Str(s) => Ok(s),
            other => Err(EncoptError::Decode(format!(
                "expected string at index {idx}, got {other:?}"
            ))),
        }
    }

    /// Integer field at `idx`.
    pub fn long(&self, idx: usize) -> Result<i64> {
        match self.get(idx)? {
            SqlValue::Long(v) => Ok(*v),
            other => Err(EncoptError::Decode(format!(
                "expected long at index {idx}, got {other:?}"
            ))),
        }
    }

    /// String field at `idx`, parsed as a decimal number.
    pub fn decimal_str(&self, idx: usize) -> Result<f64> {
        let raw = self.str(idx)?;
        raw.parse::<f64>().map_err(|_| {
            EncoptError::Decode(format!(
                "expected numeric string at index {idx}, got {raw:?}"
            ))
        })
    }
}

impl From<Vec<SqlValue>> for Row {
    fn from(values: Vec<SqlValue>) -> Self {
        Self(values)
    }
}
