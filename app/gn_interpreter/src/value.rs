/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Values of the build description language.

use std::fmt;
use std::sync::Arc;

use derive_more::Display;
use dupe::Dupe;
use starlark_map::small_map::SmallMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Dupe, Eq, PartialEq, Hash, Display)]
pub enum ValueType {
    #[display("none")]
    None,
    #[display("boolean")]
    Boolean,
    #[display("integer")]
    Integer,
    #[display("string")]
    String,
    #[display("list")]
    List,
    #[display("scope")]
    Scope,
}

fn with_article(ty: ValueType) -> &'static str {
    match ty {
        ValueType::None => "none",
        ValueType::Boolean => "a boolean",
        ValueType::Integer => "an integer",
        ValueType::String => "a string",
        ValueType::List => "a list",
        ValueType::Scope => "a scope",
    }
}

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("This is not {}.\nInstead I see a {} = {}", with_article(*.0), .1.value_type(), .1)]
    WrongType(ValueType, Value),
}

/// A scope captured as a value, e.g. `invoker` or a `metadata` block.
#[derive(Debug, Clone, Dupe, Default, PartialEq, Eq)]
pub struct ScopeValue(Arc<SmallMap<String, Value>>);

impl ScopeValue {
    pub fn new(values: SmallMap<String, Value>) -> ScopeValue {
        ScopeValue(Arc::new(values))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(k, v)| (k.to_owned(), v.to_json()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<Value>),
    Scope(ScopeValue),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    pub fn list_of_strings<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Value {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::None => ValueType::None,
            Value::Bool(_) => ValueType::Boolean,
            Value::Int(_) => ValueType::Integer,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Scope(_) => ValueType::Scope,
        }
    }

    pub fn verify_type(&self, ty: ValueType) -> Result<(), ValueError> {
        if self.value_type() == ty {
            Ok(())
        } else {
            Err(ValueError::WrongType(ty, self.clone()))
        }
    }

    fn wrong_type(&self, ty: ValueType) -> anyhow::Error {
        ValueError::WrongType(ty, self.clone()).into()
    }

    pub fn as_str(&self) -> anyhow::Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.wrong_type(ValueType::String)),
        }
    }

    pub fn as_bool(&self) -> anyhow::Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.wrong_type(ValueType::Boolean)),
        }
    }

    pub fn as_int(&self) -> anyhow::Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            _ => Err(self.wrong_type(ValueType::Integer)),
        }
    }

    pub fn as_list(&self) -> anyhow::Result<&[Value]> {
        match self {
            Value::List(l) => Ok(l),
            _ => Err(self.wrong_type(ValueType::List)),
        }
    }

    pub fn as_scope(&self) -> anyhow::Result<&ScopeValue> {
        match self {
            Value::Scope(s) => Ok(s),
            _ => Err(self.wrong_type(ValueType::Scope)),
        }
    }

    /// Every element must be a string.
    pub fn as_string_list(&self) -> anyhow::Result<Vec<&str>> {
        self.as_list()?.iter().map(|v| v.as_str()).collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::None => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(l) => serde_json::Value::Array(l.iter().map(|v| v.to_json()).collect()),
            Value::Scope(s) => serde_json::Value::Object(s.to_json_map()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "<void>"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    if matches!(c, '"' | '\\' | '$') {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, "\"")
            }
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Scope(s) => {
                if s.is_empty() {
                    return write!(f, "{{ }}");
                }
                writeln!(f, "{{")?;
                for (k, v) in s.iter() {
                    writeln!(f, "  {} = {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_type_message() {
        let v = Value::list_of_strings(["a"]);
        assert_eq!(
            "This is not a string.\nInstead I see a list = [\"a\"]",
            v.as_str().unwrap_err().to_string()
        );
        assert_eq!(
            "This is not an integer.\nInstead I see a string = \"x\"",
            Value::string("x").as_int().unwrap_err().to_string()
        );
    }

    #[test]
    fn test_display_escapes() {
        assert_eq!(r#""a\"b\$c""#, Value::string("a\"b$c").to_string());
    }

    #[test]
    fn test_to_json() {
        let mut map = SmallMap::new();
        map.insert("k".to_owned(), Value::List(vec![Value::Int(1), Value::Bool(true)]));
        assert_eq!(
            serde_json::json!({"k": [1, true]}),
            Value::Scope(ScopeValue::new(map)).to_json()
        );
    }
}
