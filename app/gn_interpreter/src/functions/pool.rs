/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use dupe::Dupe;
use gn_core::label::Label;
use gn_core::origin::OriginContext;
use gn_node::item::Item;
use gn_node::pool::Pool;
use thiserror::Error;

use crate::ast::Block;
use crate::ast::FunctionCall;
use crate::evaluator::FileEvaluator;
use crate::functions::check_not_bootstrap;
use crate::functions::target_name_arg;
use crate::scope::Scope;
use crate::value::Value;
use crate::value_extractors::ScopeFields;

#[derive(Debug, Error)]
enum PoolError {
    #[error("Missing depth.\nA pool must define a \"depth\".")]
    MissingDepth,
    #[error("Value out of range.\nThe pool depth can't be negative, got {0}.")]
    NegativeDepth(i64),
    #[error("Invalid console pool depth.\nThe console pool must have a depth of 1, got {0}.")]
    ConsoleDepth(i64),
    #[error(
        "Console pool defined in non-default toolchain.\nThe console pool can only be defined \
        in the default toolchain."
    )]
    ConsoleToolchain,
}

/// `pool("name") { depth = N }`
pub(crate) fn pool(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    block: &Arc<dyn Block>,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_not_bootstrap(call, eval)?;
    let name = target_name_arg(call, &args)?;
    scope.check_nesting("pool", &call.origin)?;
    let label = Label::new(
        scope.source_dir(),
        name.as_str(),
        Some(eval.settings().toolchain_label()),
    );

    let mut block_scope = Scope::new_child(scope);
    block_scope.set_non_nestable("pool", call.origin.dupe());
    block.execute(&mut block_scope, eval)?;

    let fields = ScopeFields::new(&block_scope, eval.settings());
    let depth = match fields.int("depth")? {
        Some(depth) => depth,
        None => return Err(PoolError::MissingDepth).at(&call.origin),
    };
    let depth_origin = fields.origin_of("depth").unwrap_or_else(|| call.origin.dupe());
    if depth < 0 {
        return Err(PoolError::NegativeDepth(depth)).at(&depth_origin);
    }
    if Pool::is_console(&label) {
        if !eval.settings().is_default() {
            return Err(PoolError::ConsoleToolchain).at(&call.origin);
        }
        if depth != 1 {
            return Err(PoolError::ConsoleDepth(depth)).at(&depth_origin);
        }
    }
    block_scope.check_for_unused_vars()?;
    tracing::debug!("Defining pool {} with depth {}", label, depth);
    eval.record_item(Item::Pool(Arc::new(Pool {
        label,
        origin: call.origin.dupe(),
        depth,
    })));
    Ok(Value::None)
}
