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
use gn_node::config::Config;
use gn_node::item::Item;
use gn_node::visibility::Visibility;

use crate::ast::Block;
use crate::ast::FunctionCall;
use crate::evaluator::FileEvaluator;
use crate::functions::check_not_bootstrap;
use crate::functions::target_name_arg;
use crate::generators::config_values::collect_config_values;
use crate::scope::Scope;
use crate::value::Value;
use crate::value_extractors::ScopeFields;

/// `config("name") { ... }`
pub(crate) fn config(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    block: &Arc<dyn Block>,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_not_bootstrap(call, eval)?;
    let name = target_name_arg(call, &args)?;
    scope.check_nesting("config", &call.origin)?;
    let label = Label::new(
        scope.source_dir(),
        name.as_str(),
        Some(eval.settings().toolchain_label()),
    );
    tracing::debug!("Defining config {}", label);

    let mut block_scope = Scope::new_child(scope);
    block_scope.set_builtin("target_name", Value::String(name));
    block_scope.set_non_nestable("config", call.origin.dupe());
    block.execute(&mut block_scope, eval)?;

    let fields = ScopeFields::new(&block_scope, eval.settings());
    let mut config = Config::new(label, call.origin.dupe());
    config.own_values = collect_config_values(&fields, fields.dir())?;
    if let Some(configs) = fields.unique_labels("configs")? {
        config.configs = configs;
    }
    if let Some(patterns) = fields.patterns("visibility")? {
        config.visibility = Visibility::from_patterns(patterns);
    }
    if let Some(testonly) = fields.bool("testonly")? {
        config.testonly = testonly;
    }
    block_scope.check_for_unused_vars()?;
    eval.record_item(Item::Config(Arc::new(config)));
    Ok(Value::None)
}
