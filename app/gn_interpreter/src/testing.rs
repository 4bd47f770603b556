/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Drive the evaluator from tests without a parser.
//!
//! Statements are built with the small constructors below; each gets a fresh origin on its
//! own line of `//BUILD.gn` so errors can still be told apart.

use std::cell::Cell;
use std::sync::Arc;

use dupe::Dupe;
use gn_core::build_settings::BuildSettings;
use gn_core::fs::source_dir::SourceDir;
use gn_core::fs::source_file::SourceFile;
use gn_core::label::Label;
use gn_core::origin::Origin;
use gn_core::path_map::PathMap;
use gn_node::item::Item;
use gn_node::target::Target;
use thiserror::Error;

use crate::ast::Expr;
use crate::ast::FunctionCall;
use crate::ast::Statement;
use crate::ast::StatementList;
use crate::build_context::BuildContext;
use crate::build_context::BuildContextBuilder;
use crate::value::Value;

pub const TESTING_BUILD_DIR: &str = "//out/Debug/";
pub const TESTING_DEFAULT_TOOLCHAIN: &str = "//toolchain:default";

#[derive(Debug, Error)]
enum TesterError {
    #[error("Expected exactly one target, got {0} items")]
    NotOneTarget(usize),
}

thread_local! {
    static NEXT_LINE: Cell<u32> = const { Cell::new(1) };
}

fn next_origin() -> Origin {
    NEXT_LINE.with(|line| {
        let current = line.get();
        line.set(current + 1);
        Origin::new("//BUILD.gn", current, 1)
    })
}

pub fn testing_build_settings(path_map: PathMap) -> BuildSettings {
    BuildSettings::new(SourceDir::unchecked_new(TESTING_BUILD_DIR), path_map)
        .with_default_toolchain(Label::testing_parse(TESTING_DEFAULT_TOOLCHAIN))
}

/// A frozen build context plus shortcuts for evaluating build files against it.
pub struct Tester {
    ctx: Arc<BuildContext>,
}

impl Tester {
    /// A context whose build config runs `build_config`.
    pub fn new(build_config: Vec<Statement>) -> anyhow::Result<Tester> {
        Self::with_settings(testing_build_settings(PathMap::default()), build_config)
    }

    pub fn with_settings(
        build_settings: BuildSettings,
        build_config: Vec<Statement>,
    ) -> anyhow::Result<Tester> {
        gn_core::logging::init_tracing_for_tests();
        let mut builder = BuildContextBuilder::new(Arc::new(build_settings))?;
        builder.load_build_config(
            &SourceFile::unchecked_new("//build/config/BUILDCONFIG.gn"),
            &block(build_config),
        )?;
        Ok(Tester {
            ctx: builder.build(),
        })
    }

    pub fn context(&self) -> &Arc<BuildContext> {
        &self.ctx
    }

    /// Evaluate `file` (e.g. `//foo/BUILD.gn`) in the default toolchain.
    pub fn eval(&self, file: &str, statements: Vec<Statement>) -> anyhow::Result<Vec<Item>> {
        let settings = self.ctx.default_settings().dupe();
        self.ctx
            .evaluate_file(&settings, &SourceFile::unchecked_new(file), &block(statements))
    }

    pub fn eval_in_toolchain(
        &self,
        toolchain: &str,
        file: &str,
        statements: Vec<Statement>,
    ) -> anyhow::Result<Vec<Item>> {
        let settings = self
            .ctx
            .settings_for_toolchain(&Label::testing_parse(toolchain));
        self.ctx
            .evaluate_file(&settings, &SourceFile::unchecked_new(file), &block(statements))
    }

    /// Evaluate a file that must declare exactly one target.
    pub fn eval_target(&self, file: &str, statements: Vec<Statement>) -> anyhow::Result<Arc<Target>> {
        let items = self.eval(file, statements)?;
        match items.as_slice() {
            [Item::Target(target)] => Ok(target.dupe()),
            _ => Err(TesterError::NotOneTarget(items.len()).into()),
        }
    }
}

pub fn block(statements: Vec<Statement>) -> StatementList {
    StatementList::new(statements, next_origin())
}

pub fn string(s: &str) -> Expr {
    Expr::Literal(Value::string(s))
}

pub fn strings(items: &[&str]) -> Expr {
    Expr::Literal(Value::list_of_strings(items.iter().copied()))
}

pub fn int(i: i64) -> Expr {
    Expr::Literal(Value::Int(i))
}

pub fn boolean(b: bool) -> Expr {
    Expr::Literal(Value::Bool(b))
}

pub fn list(items: Vec<Expr>) -> Expr {
    Expr::List(items)
}

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(name.to_owned(), next_origin())
}

pub fn member(base: &str, name: &str) -> Expr {
    Expr::Member(base.to_owned(), name.to_owned(), next_origin())
}

pub fn call_expr(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(Box::new(function_call(name, args)))
}

pub fn assign(name: &str, value: Expr) -> Statement {
    Statement::Assign {
        name: name.to_owned(),
        value,
        origin: next_origin(),
    }
}

pub fn append(name: &str, value: Expr) -> Statement {
    Statement::Append {
        name: name.to_owned(),
        value,
        origin: next_origin(),
    }
}

pub fn call(name: &str, args: Vec<Expr>) -> Statement {
    Statement::Call(function_call(name, args))
}

/// `name(args) { body }`
pub fn call_with_block(name: &str, args: Vec<Expr>, body: Vec<Statement>) -> Statement {
    let origin = next_origin();
    let body = StatementList::new(body, origin.dupe());
    Statement::Call(FunctionCall {
        name: name.to_owned(),
        args,
        block: Some(Arc::new(body)),
        origin,
    })
}

/// `kind("name") { body }`
pub fn target(kind: &str, name: &str, body: Vec<Statement>) -> Statement {
    call_with_block(kind, vec![string(name)], body)
}

fn function_call(name: &str, args: Vec<Expr>) -> FunctionCall {
    FunctionCall {
        name: name.to_owned(),
        args,
        block: None,
        origin: next_origin(),
    }
}
