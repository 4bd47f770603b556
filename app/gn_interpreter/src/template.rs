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
use gn_core::origin::Origin;
use gn_core::origin::OriginContext;

use crate::ast::Block;
use crate::ast::FunctionCall;
use crate::deferred_updates::UpdateKind;
use crate::evaluator::FileEvaluator;
use crate::functions::target_name_arg;
use crate::functions::FunctionError;
use crate::scope::Closure;
use crate::scope::MergePolicy;
use crate::scope::Scope;
use crate::value::Value;

/// A user-defined function declared with `template("name") { ... }`.
#[derive(Debug)]
pub struct Template {
    name: String,
    closure: Closure,
    body: Arc<dyn Block>,
    origin: Origin,
}

impl Template {
    pub fn new(name: String, closure: Closure, body: Arc<dyn Block>, origin: Origin) -> Template {
        Template {
            name,
            closure,
            body,
            origin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Run an invocation `name("target_name") { ... }`.
    ///
    /// The invocation block runs first, in a child of the caller's scope; its values reach the
    /// template body as `invoker`. The body runs in a scope built from the template's closure,
    /// with the caller's directory as the current directory.
    pub fn invoke(
        &self,
        scope: &mut Scope<'_>,
        call: &FunctionCall,
        args: Vec<Value>,
        eval: &FileEvaluator<'_>,
    ) -> anyhow::Result<Value> {
        scope.check_nesting("template invocation", &call.origin)?;
        let target_name = target_name_arg(call, &args)?;
        let block = call
            .block
            .as_ref()
            .ok_or_else(|| FunctionError::MissingBlock(call.name.clone()))
            .at(&call.origin)?;
        let invoker_dir = scope.source_dir();

        let invoker = {
            let mut invocation_scope = Scope::new_child(scope);
            if let Some(defaults) = scope.get_target_defaults(&self.name) {
                defaults.merge_into(&mut invocation_scope, MergePolicy::SkipPrivate)?;
            }
            invocation_scope.set_non_nestable("template invocation", call.origin.dupe());
            block.execute(&mut invocation_scope, eval)?;
            let label = Label::new(
                invoker_dir.clone(),
                target_name.as_str(),
                Some(eval.settings().toolchain_label()),
            );
            eval.apply_deferred_updates(&mut invocation_scope, UpdateKind::TemplateInstance, &label)?;
            invocation_scope.mark_all_used();
            invocation_scope.to_scope_value()
        };

        tracing::debug!(
            "Invoking template {} for {} from {}",
            self.name,
            target_name,
            call.origin
        );
        let closure_scope = Scope::from_closure(&self.closure);
        let mut template_scope = Scope::new_child(&closure_scope);
        template_scope.set_source_dir(invoker_dir.clone());
        eval.set_file_builtins(&mut template_scope, &invoker_dir);
        template_scope.set_builtin("invoker", Value::Scope(invoker));
        template_scope.set_builtin("target_name", Value::String(target_name));
        self.body.execute(&mut template_scope, eval)?;
        template_scope.check_for_unused_vars()?;
        Ok(Value::None)
    }
}
