/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use crate::ast::Block;
use crate::ast::FunctionCall;
use crate::evaluator::FileEvaluator;
use crate::functions::target_name_arg;
use crate::scope::Scope;
use crate::value::Value;

/// `set_defaults("kind") { ... }`: values every later `kind` block (a target kind or a
/// template) starts with.
pub(crate) fn set_defaults(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    block: &Arc<dyn Block>,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    let kind = target_name_arg(call, &args)?;
    scope.check_nesting("set_defaults", &call.origin)?;
    let defaults = {
        let mut block_scope = Scope::new_child(scope);
        block.execute(&mut block_scope, eval)?;
        block_scope.local_closure()
    };
    tracing::debug!("Defaults for {}: {} values", kind, defaults.len());
    scope.set_target_defaults(&kind, defaults, &call.origin)?;
    Ok(Value::None)
}
