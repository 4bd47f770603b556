/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The executable-block contract between the parser and the evaluator, plus a small
//! statement tree implementing it.

use std::fmt::Debug;
use std::sync::Arc;

use dupe::Dupe;
use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use thiserror::Error;

use crate::evaluator::FileEvaluator;
use crate::scope::Scope;
use crate::value::Value;

#[derive(Debug, Error)]
enum AstError {
    #[error("Undefined identifier.\nThe name \"{0}\" is not defined in this scope.")]
    UndefinedIdentifier(String),
    #[error("No value named \"{1}\" in scope \"{0}\".")]
    UndefinedMember(String, String),
    #[error("Undefined identifier in +=.\nThe name \"{0}\" is not defined in this scope.")]
    UndefinedAppend(String),
    #[error("Incompatible types for +=.\nCan't append {1} to {0}.")]
    IncompatibleAppend(String, String),
    #[error("Integer overflow in +=.\n{0} + {1} does not fit in 64 bits.")]
    IntegerOverflow(i64, i64),
}

/// A parsed block of the build description.
pub trait Block: Debug + Send + Sync {
    fn execute(&self, scope: &mut Scope<'_>, eval: &FileEvaluator<'_>) -> anyhow::Result<()>;

    fn origin(&self) -> &Origin;
}

#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub block: Option<Arc<dyn Block>>,
    pub origin: Origin,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Identifier(String, Origin),
    /// `scope.member`
    Member(String, String, Origin),
    List(Vec<Expr>),
    Call(Box<FunctionCall>),
}

impl Expr {
    pub fn evaluate(
        &self,
        scope: &mut Scope<'_>,
        eval: &FileEvaluator<'_>,
    ) -> anyhow::Result<Value> {
        match self {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Identifier(name, origin) => match scope.get_value(name) {
                Some(v) => Ok(v.clone()),
                None => Err(AstError::UndefinedIdentifier(name.clone())).at(origin),
            },
            Expr::Member(base, member, origin) => {
                let value = match scope.get_value(base) {
                    Some(v) => v,
                    None => return Err(AstError::UndefinedIdentifier(base.clone())).at(origin),
                };
                match value.as_scope().at(origin)?.get(member) {
                    Some(v) => Ok(v.clone()),
                    None => {
                        Err(AstError::UndefinedMember(base.clone(), member.clone())).at(origin)
                    }
                }
            }
            Expr::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|e| e.evaluate(scope, eval))
                    .collect::<anyhow::Result<_>>()?,
            )),
            Expr::Call(call) => eval.call(scope, call),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Assign {
        name: String,
        value: Expr,
        origin: Origin,
    },
    Append {
        name: String,
        value: Expr,
        origin: Origin,
    },
    Call(FunctionCall),
}

fn append(dest: &mut Value, value: Value) -> Result<(), AstError> {
    match (dest, value) {
        (Value::List(l), Value::List(r)) => l.extend(r),
        (Value::List(l), v) => l.push(v),
        (Value::String(l), Value::String(r)) => l.push_str(&r),
        (Value::Int(l), Value::Int(r)) => {
            *l = l
                .checked_add(r)
                .ok_or(AstError::IntegerOverflow(*l, r))?;
        }
        (l, r) => {
            return Err(AstError::IncompatibleAppend(
                l.value_type().to_string(),
                r.value_type().to_string(),
            ));
        }
    }
    Ok(())
}

impl Statement {
    fn execute(&self, scope: &mut Scope<'_>, eval: &FileEvaluator<'_>) -> anyhow::Result<()> {
        match self {
            Statement::Assign {
                name,
                value,
                origin,
            } => {
                let value = value.evaluate(scope, eval)?;
                scope.set_value(name.clone(), value, origin.dupe());
            }
            Statement::Append {
                name,
                value,
                origin,
            } => {
                let value = value.evaluate(scope, eval)?;
                match scope.get_mutable_value(name, origin) {
                    Some(dest) => append(dest, value).at(origin)?,
                    None => return Err(AstError::UndefinedAppend(name.clone())).at(origin),
                }
            }
            Statement::Call(call) => {
                eval.call(scope, call)?;
            }
        }
        Ok(())
    }
}

/// A `{ ... }` block: statements run in order, stopping at the first error.
#[derive(Debug, Clone)]
pub struct StatementList {
    statements: Vec<Statement>,
    origin: Origin,
}

impl StatementList {
    pub fn new(statements: Vec<Statement>, origin: Origin) -> StatementList {
        StatementList { statements, origin }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

impl Block for StatementList {
    fn execute(&self, scope: &mut Scope<'_>, eval: &FileEvaluator<'_>) -> anyhow::Result<()> {
        for statement in &self.statements {
            statement.execute(scope, eval)?;
        }
        Ok(())
    }

    fn origin(&self) -> &Origin {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append() {
        let mut list = Value::list_of_strings(["a"]);
        append(&mut list, Value::list_of_strings(["b", "c"])).unwrap();
        append(&mut list, Value::string("d")).unwrap();
        assert_eq!(Value::list_of_strings(["a", "b", "c", "d"]), list);

        let mut s = Value::string("foo");
        append(&mut s, Value::string("bar")).unwrap();
        assert_eq!(Value::string("foobar"), s);

        let mut i = Value::Int(1);
        append(&mut i, Value::Int(2)).unwrap();
        assert_eq!(Value::Int(3), i);

        let mut b = Value::Bool(true);
        assert_eq!(
            "Incompatible types for +=.\nCan't append integer to boolean.",
            append(&mut b, Value::Int(1)).unwrap_err().to_string()
        );
    }

    #[test]
    fn test_append_overflow() {
        let mut i = Value::Int(i64::MAX);
        assert_eq!(
            format!(
                "Integer overflow in +=.\n{} + 1 does not fit in 64 bits.",
                i64::MAX
            ),
            append(&mut i, Value::Int(1)).unwrap_err().to_string()
        );
        assert_eq!(Value::Int(i64::MAX), i);

        let mut i = Value::Int(i64::MIN);
        assert!(append(&mut i, Value::Int(-1)).is_err());
    }
}
