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
use gn_core::label::LabelResolver;
use gn_core::origin::OriginContext;

use crate::ast::Block;
use crate::ast::FunctionCall;
use crate::deferred_updates::DeferredUpdate;
use crate::deferred_updates::UpdateKey;
use crate::deferred_updates::UpdateKind;
use crate::evaluator::FileEvaluator;
use crate::functions::target_name_arg;
use crate::functions::FunctionError;
use crate::scope::Scope;
use crate::value::Value;

/// `update_target("label") { ... }`
pub(crate) fn update_target(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    block: &Arc<dyn Block>,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    register(UpdateKind::Target, scope, call, args, block, eval)
}

/// `update_template_instance("label") { ... }`
pub(crate) fn update_template_instance(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    block: &Arc<dyn Block>,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    register(UpdateKind::TemplateInstance, scope, call, args, block, eval)
}

fn register(
    kind: UpdateKind,
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    block: &Arc<dyn Block>,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    if !eval.is_bootstrap() {
        return Err(FunctionError::OnlyInBuildConfig(call.name.clone())).at(&call.origin);
    }
    let label = target_name_arg(call, &args)?;
    // Registrations name targets in every toolchain unless they say otherwise.
    let resolver = LabelResolver::new(eval.settings().build_settings().path_resolver(), None);
    let key = UpdateKey::parse(resolver, &scope.source_dir(), &label).at(&call.origin)?;
    tracing::debug!("Registering {} for {:?} at {}", kind, key, call.origin);
    eval.register_update(DeferredUpdate::new(
        kind,
        key,
        scope.make_closure(),
        block.dupe(),
        call.origin.dupe(),
    ));
    Ok(Value::None)
}
