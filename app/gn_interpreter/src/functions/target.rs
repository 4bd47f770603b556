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
use gn_node::item::Item;
use gn_node::output_type::OutputType;

use crate::ast::Block;
use crate::ast::FunctionCall;
use crate::deferred_updates::UpdateKind;
use crate::evaluator::FileEvaluator;
use crate::functions::check_not_bootstrap;
use crate::functions::target_name_arg;
use crate::generators;
use crate::scope::MergePolicy;
use crate::scope::Scope;
use crate::value::Value;

/// `executable("name") { ... }` and the other target kinds.
///
/// The block runs in a fresh child scope seeded with the kind's defaults; then matching
/// deferred updates patch that scope, the generator reads it, and every variable it set must
/// have been read by someone.
pub(crate) fn declare_target(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    block: &Arc<dyn Block>,
    kind: OutputType,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_not_bootstrap(call, eval)?;
    let name = target_name_arg(call, &args)?;
    scope.check_nesting("target", &call.origin)?;
    let label = Label::new(
        scope.source_dir(),
        name.as_str(),
        Some(eval.settings().toolchain_label()),
    );
    tracing::debug!("Defining target {} ({})", label, kind);

    let mut block_scope = Scope::new_child(scope);
    if let Some(defaults) = scope.get_target_defaults(kind.function_name()) {
        defaults.merge_into(&mut block_scope, MergePolicy::SkipPrivate)?;
    }
    block_scope.set_builtin("target_name", Value::String(name));
    block_scope.set_non_nestable("target", call.origin.dupe());
    block.execute(&mut block_scope, eval)?;
    eval.apply_deferred_updates(&mut block_scope, UpdateKind::Target, &label)?;

    let target = generators::generate_target(&block_scope, call, label, kind, eval.settings())?;
    block_scope.check_for_unused_vars()?;
    eval.record_item(Item::Target(Arc::new(target)));
    Ok(Value::None)
}
