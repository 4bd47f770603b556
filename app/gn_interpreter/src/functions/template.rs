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
use gn_core::origin::OriginContext;
use thiserror::Error;

use crate::ast::Block;
use crate::ast::FunctionCall;
use crate::evaluator::FileEvaluator;
use crate::functions::is_builtin;
use crate::functions::target_name_arg;
use crate::scope::Scope;
use crate::template::Template;
use crate::value::Value;

#[derive(Debug, Error)]
enum TemplateError {
    #[error("Template name \"{0}\" is a built-in function.\nTemplates can't replace built-ins.")]
    ShadowsBuiltin(String),
}

/// `template("name") { ... }`: captures the current scope for later invocations.
pub(crate) fn template(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    block: &Arc<dyn Block>,
    _eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    let name = target_name_arg(call, &args)?;
    if is_builtin(&name) {
        return Err(TemplateError::ShadowsBuiltin(name)).at(&call.origin);
    }
    scope.check_nesting("template", &call.origin)?;
    let template = Template::new(
        name.clone(),
        scope.make_closure(),
        block.dupe(),
        call.origin.dupe(),
    );
    scope.add_template(&name, Arc::new(template), &call.origin)?;
    Ok(Value::None)
}
