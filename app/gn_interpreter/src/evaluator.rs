/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::cell::RefCell;

use dupe::Dupe;
use gn_core::build_settings::Settings;
use gn_core::fs::source_dir::SourceDir;
use gn_core::label::Label;
use gn_core::origin::OriginContext;
use gn_node::item::Item;
use thiserror::Error;

use crate::ast::FunctionCall;
use crate::build_context::BuildContext;
use crate::deferred_updates::DeferredUpdate;
use crate::deferred_updates::UpdateKind;
use crate::functions;
use crate::scope::Scope;
use crate::value::Value;

#[derive(Debug, Error)]
enum EvaluatorError {
    #[error("Unknown function.\nThe function \"{0}\" is neither a built-in function nor a template.")]
    UnknownFunction(String),
}

/// What is being evaluated.
#[derive(Clone, Copy, Dupe)]
pub enum Phase<'a> {
    /// The build config: globals, templates, defaults and deferred-update registration.
    Bootstrap,
    /// An ordinary build file, against a frozen context.
    Generation(&'a BuildContext),
}

/// Per-file evaluation state, the "extra" every built-in function receives.
///
/// Only touched by the thread evaluating the file.
pub struct FileEvaluator<'a> {
    phase: Phase<'a>,
    settings: Settings,
    items: RefCell<Vec<Item>>,
    registrations: RefCell<Vec<DeferredUpdate>>,
}

impl<'a> FileEvaluator<'a> {
    pub fn new(phase: Phase<'a>, settings: Settings) -> FileEvaluator<'a> {
        FileEvaluator {
            phase,
            settings,
            items: RefCell::new(Vec::new()),
            registrations: RefCell::new(Vec::new()),
        }
    }

    pub fn phase(&self) -> Phase<'a> {
        self.phase
    }

    pub fn is_bootstrap(&self) -> bool {
        matches!(self.phase, Phase::Bootstrap)
    }

    pub fn build_context(&self) -> Option<&'a BuildContext> {
        match self.phase {
            Phase::Bootstrap => None,
            Phase::Generation(ctx) => Some(ctx),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Call a built-in function or a template.
    pub fn call(&self, scope: &mut Scope<'_>, call: &FunctionCall) -> anyhow::Result<Value> {
        if let Some(builtin) = functions::lookup(&call.name) {
            return builtin.invoke(scope, call, self);
        }
        match scope.get_template(&call.name).map(|t| t.dupe()) {
            Some(template) => {
                let args = self.evaluate_args(scope, call)?;
                template.invoke(scope, call, args, self)
            }
            None => Err(EvaluatorError::UnknownFunction(call.name.clone())).at(&call.origin),
        }
    }

    pub(crate) fn evaluate_args(
        &self,
        scope: &mut Scope<'_>,
        call: &FunctionCall,
    ) -> anyhow::Result<Vec<Value>> {
        call.args.iter().map(|a| a.evaluate(scope, self)).collect()
    }

    /// Variables every file and template body starts with.
    pub fn set_file_builtins(&self, scope: &mut Scope<'_>, dir: &SourceDir) {
        let settings = &self.settings;
        scope.set_builtin(
            "current_toolchain",
            Value::string(settings.toolchain_label().user_visible_name(false)),
        );
        scope.set_builtin(
            "default_toolchain",
            Value::string(settings.default_toolchain_label().user_visible_name(false)),
        );
        scope.set_builtin(
            "root_build_dir",
            Value::string(settings.build_settings().build_dir().with_no_trailing_slash()),
        );
        scope.set_builtin(
            "root_gen_dir",
            Value::string(settings.root_gen_dir().with_no_trailing_slash()),
        );
        scope.set_builtin(
            "root_out_dir",
            Value::string(settings.root_out_dir().with_no_trailing_slash()),
        );
        scope.set_builtin(
            "target_gen_dir",
            Value::string(settings.target_gen_dir(dir).with_no_trailing_slash()),
        );
        scope.set_builtin(
            "target_out_dir",
            Value::string(settings.target_out_dir(dir).with_no_trailing_slash()),
        );
    }

    /// Apply the deferred updates registered for `label` to the scope of its declaration.
    pub(crate) fn apply_deferred_updates(
        &self,
        scope: &mut Scope<'_>,
        kind: UpdateKind,
        label: &Label,
    ) -> anyhow::Result<()> {
        let registry = match self.build_context() {
            Some(ctx) => ctx.deferred_updates(),
            None => return Ok(()),
        };
        for update in registry.matching(kind, label) {
            if !registry.try_mark_applied(&update, label) {
                tracing::debug!(
                    "{} from {} was already applied to {}",
                    kind,
                    update.origin(),
                    label
                );
                continue;
            }
            tracing::debug!("Applying {} from {} to {}", kind, update.origin(), label);
            update.apply(scope, self)?;
        }
        Ok(())
    }

    pub(crate) fn record_item(&self, item: Item) {
        self.items.borrow_mut().push(item);
    }

    pub(crate) fn register_update(&self, update: DeferredUpdate) {
        self.registrations.borrow_mut().push(update);
    }

    /// The items declared by the file, in declaration order, and the updates it registered.
    pub fn finish(self) -> (Vec<Item>, Vec<DeferredUpdate>) {
        (self.items.into_inner(), self.registrations.into_inner())
    }
}
