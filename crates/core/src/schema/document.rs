//! Opaque raw documents and the path-tracking walker used to validate them.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::dates::parse_api_date;
use super::error::{SchemaError, SchemaResult};

/// An unvalidated response body.
///
/// The contents are deliberately not exposed: the only way to read a raw
/// document is through the validators in this module.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument(Value);

impl RawDocument {
    /// Wraps an already-parsed JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parses a response body.
    pub fn from_slice(bytes: &[u8]) -> SchemaResult<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    pub(super) fn root(&self) -> Node<'_> {
        Node {
            value: &self.0,
            path: String::new(),
        }
    }
}

impl From<Value> for RawDocument {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// A JSON value together with its path from the document root.
pub(super) struct Node<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Node<'a> {
    pub(super) fn path(&self) -> &str {
        &self.path
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn wrong_type(&self, expected: &'static str) -> SchemaError {
        SchemaError::WrongType {
            path: self.path.clone(),
            expected,
            found: type_name(self.value),
        }
    }

    pub(super) fn invalid(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::InvalidValue {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn object(&self) -> SchemaResult<&'a Map<String, Value>> {
        self.value.as_object().ok_or_else(|| self.wrong_type("object"))
    }

    /// Returns the child at `key`, treating `null` as absent.
    pub(super) fn get(&self, key: &str) -> SchemaResult<Option<Node<'a>>> {
        Ok(self
            .object()?
            .get(key)
            .filter(|v| !v.is_null())
            .map(|value| Node {
                value,
                path: self.child_path(key),
            }))
    }

    pub(super) fn required(&self, key: &str) -> SchemaResult<Node<'a>> {
        self.get(key)?.ok_or_else(|| SchemaError::MissingField {
            path: self.child_path(key),
        })
    }

    pub(super) fn string(&self) -> SchemaResult<String> {
        self.value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.wrong_type("string"))
    }

    pub(super) fn required_str(&self, key: &str) -> SchemaResult<String> {
        self.required(key)?.string()
    }

    pub(super) fn optional_str(&self, key: &str) -> SchemaResult<Option<String>> {
        self.get(key)?.map(|n| n.string()).transpose()
    }

    /// Accepts either a string or an integer and returns its text form.
    pub(super) fn optional_str_or_int(&self, key: &str) -> SchemaResult<Option<String>> {
        match self.get(key)? {
            None => Ok(None),
            Some(node) => match node.value {
                Value::String(s) => Ok(Some(s.clone())),
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
                _ => Err(node.wrong_type("string or integer")),
            },
        }
    }

    pub(super) fn array(&self) -> SchemaResult<Vec<Node<'a>>> {
        let items = self.value.as_array().ok_or_else(|| self.wrong_type("array"))?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, value)| Node {
                value,
                path: format!("{}[{i}]", self.path),
            })
            .collect())
    }

    pub(super) fn required_array(&self, key: &str) -> SchemaResult<Vec<Node<'a>>> {
        self.required(key)?.array()
    }

    /// Returns the array at `key`, or an empty list when absent.
    pub(super) fn optional_array(&self, key: &str) -> SchemaResult<Vec<Node<'a>>> {
        self.get(key)?.map_or_else(|| Ok(Vec::new()), |n| n.array())
    }

    pub(super) fn decimal(&self) -> SchemaResult<Decimal> {
        let Value::Number(n) = self.value else {
            return Err(self.wrong_type("number"));
        };
        let text = n.to_string();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|e| self.invalid(format!("not representable as a decimal: {e}")))
    }

    pub(super) fn required_decimal(&self, key: &str) -> SchemaResult<Decimal> {
        self.required(key)?.decimal()
    }

    pub(super) fn optional_decimal(&self, key: &str) -> SchemaResult<Option<Decimal>> {
        self.get(key)?.map(|n| n.decimal()).transpose()
    }

    fn unsigned(&self) -> SchemaResult<u64> {
        self.value.as_u64().ok_or_else(|| self.wrong_type("non-negative integer"))
    }

    pub(super) fn required_u32(&self, key: &str) -> SchemaResult<u32> {
        let node = self.required(key)?;
        let value = node.unsigned()?;
        u32::try_from(value).map_err(|_| node.invalid(format!("{value} is out of range")))
    }

    pub(super) fn optional_u32(&self, key: &str) -> SchemaResult<Option<u32>> {
        match self.get(key)? {
            None => Ok(None),
            Some(node) => {
                let value = node.unsigned()?;
                u32::try_from(value)
                    .map(Some)
                    .map_err(|_| node.invalid(format!("{value} is out of range")))
            }
        }
    }

    pub(super) fn required_u64(&self, key: &str) -> SchemaResult<u64> {
        self.required(key)?.unsigned()
    }

    pub(super) fn required_date(&self, key: &str) -> SchemaResult<NaiveDate> {
        let node = self.required(key)?;
        let raw = node.string()?;
        parse_api_date(&raw).ok_or_else(|| node.invalid(format!("unrecognised date '{raw}'")))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
