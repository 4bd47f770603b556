/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Built-in functions.

use std::sync::Arc;

use gn_core::origin::OriginContext;
use gn_node::output_type::OutputType;
use thiserror::Error;

use crate::ast::Block;
use crate::ast::FunctionCall;
use crate::evaluator::FileEvaluator;
use crate::scope::Scope;
use crate::value::Value;

pub(crate) mod config;
pub(crate) mod deferred;
pub(crate) mod forward;
pub(crate) mod label_info;
pub(crate) mod pool;
pub(crate) mod set_defaults;
pub(crate) mod strings;
pub(crate) mod target;
pub(crate) mod template;

#[derive(Debug, Error)]
pub(crate) enum FunctionError {
    #[error("Wrong number of arguments to {0}().\nExpecting {1}, got {2}.")]
    WrongArgCount(String, String, usize),
    #[error("{0}() needs a {{}} block.")]
    MissingBlock(String),
    #[error("{0}() does not take a {{}} block.")]
    UnexpectedBlock(String),
    #[error("{0}() can't be called from the build config.")]
    NotInBuildConfig(String),
    #[error("{0}() can only be called from the build config.")]
    OnlyInBuildConfig(String),
}

type NoBlockFn = fn(
    &mut Scope<'_>,
    &FunctionCall,
    Vec<Value>,
    &FileEvaluator<'_>,
) -> anyhow::Result<Value>;

type BlockFn = fn(
    &mut Scope<'_>,
    &FunctionCall,
    Vec<Value>,
    &Arc<dyn Block>,
    &FileEvaluator<'_>,
) -> anyhow::Result<Value>;

#[derive(Clone, Copy)]
pub(crate) enum Builtin {
    NoBlock(NoBlockFn),
    Block(BlockFn),
    Target(OutputType),
}

pub(crate) fn lookup(name: &str) -> Option<Builtin> {
    if let Some(kind) = OutputType::from_function_name(name) {
        return Some(Builtin::Target(kind));
    }
    Some(match name {
        "config" => Builtin::Block(config::config),
        "pool" => Builtin::Block(pool::pool),
        "template" => Builtin::Block(template::template),
        "set_defaults" => Builtin::Block(set_defaults::set_defaults),
        "update_target" => Builtin::Block(deferred::update_target),
        "update_template_instance" => Builtin::Block(deferred::update_template_instance),
        "forward_variables_from" => Builtin::NoBlock(forward::forward_variables_from),
        "get_label_info" => Builtin::NoBlock(label_info::get_label_info),
        "string_join" => Builtin::NoBlock(strings::string_join),
        "string_split" => Builtin::NoBlock(strings::string_split),
        "string_replace" => Builtin::NoBlock(strings::string_replace),
        "split_list" => Builtin::NoBlock(strings::split_list),
        _ => return None,
    })
}

pub(crate) fn is_builtin(name: &str) -> bool {
    lookup(name).is_some()
}

impl Builtin {
    pub(crate) fn invoke(
        self,
        scope: &mut Scope<'_>,
        call: &FunctionCall,
        eval: &FileEvaluator<'_>,
    ) -> anyhow::Result<Value> {
        let args = eval.evaluate_args(scope, call)?;
        match self {
            Builtin::NoBlock(f) => {
                if call.block.is_some() {
                    return Err(FunctionError::UnexpectedBlock(call.name.clone())).at(&call.origin);
                }
                f(scope, call, args, eval)
            }
            Builtin::Block(f) => f(scope, call, args, required_block(call)?, eval),
            Builtin::Target(kind) => {
                target::declare_target(scope, call, args, required_block(call)?, kind, eval)
            }
        }
    }
}

fn required_block(call: &FunctionCall) -> anyhow::Result<&Arc<dyn Block>> {
    call.block
        .as_ref()
        .ok_or_else(|| FunctionError::MissingBlock(call.name.clone()))
        .at(&call.origin)
}

/// Between `min` and `max` arguments, inclusive.
pub(crate) fn check_arg_count(
    call: &FunctionCall,
    args: &[Value],
    min: usize,
    max: usize,
) -> anyhow::Result<()> {
    if args.len() >= min && args.len() <= max {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{} to {}", min, max)
    };
    Err(FunctionError::WrongArgCount(
        call.name.clone(),
        expected,
        args.len(),
    ))
    .at(&call.origin)
}

/// The single string argument of a declaration, e.g. `executable("foo")`.
pub(crate) fn target_name_arg(call: &FunctionCall, args: &[Value]) -> anyhow::Result<String> {
    check_arg_count(call, args, 1, 1)?;
    Ok(args[0].as_str().at(&call.origin)?.to_owned())
}

pub(crate) fn check_not_bootstrap(
    call: &FunctionCall,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<()> {
    if eval.is_bootstrap() {
        return Err(FunctionError::NotInBuildConfig(call.name.clone())).at(&call.origin);
    }
    Ok(())
}
