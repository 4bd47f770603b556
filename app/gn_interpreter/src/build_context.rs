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
use gn_core::build_settings::BuildSettings;
use gn_core::build_settings::Settings;
use gn_core::fs::source_file::SourceFile;
use gn_core::label::Label;
use gn_node::item::Item;
use thiserror::Error;

use crate::ast::Block;
use crate::deferred_updates::DeferredUpdate;
use crate::deferred_updates::DeferredUpdateRegistry;
use crate::evaluator::FileEvaluator;
use crate::evaluator::Phase;
use crate::scope::Closure;
use crate::scope::Scope;

#[derive(Debug, Error)]
enum BuildContextError {
    #[error("The build settings do not name a default toolchain.")]
    NoDefaultToolchain,
    #[error("The build config was already loaded from {0}.")]
    BuildConfigLoaded(SourceFile),
}

/// Single-threaded bootstrap: evaluates the build config, then freezes into a
/// [`BuildContext`].
pub struct BuildContextBuilder {
    build_settings: Arc<BuildSettings>,
    default_settings: Settings,
    build_config: Option<SourceFile>,
    base: Closure,
    updates: Vec<DeferredUpdate>,
}

impl BuildContextBuilder {
    pub fn new(build_settings: Arc<BuildSettings>) -> anyhow::Result<BuildContextBuilder> {
        let default_toolchain = build_settings
            .default_toolchain()
            .ok_or(BuildContextError::NoDefaultToolchain)?
            .dupe();
        let default_settings = Settings::new(build_settings.dupe(), default_toolchain);
        Ok(BuildContextBuilder {
            build_settings,
            default_settings,
            build_config: None,
            base: Closure::default(),
            updates: Vec::new(),
        })
    }

    /// Evaluate the build config. Everything it defines is visible to every build file.
    pub fn load_build_config(&mut self, file: &SourceFile, block: &dyn Block) -> anyhow::Result<()> {
        if let Some(loaded) = &self.build_config {
            return Err(BuildContextError::BuildConfigLoaded(loaded.clone()).into());
        }
        let dir = file.dir();
        let eval = FileEvaluator::new(Phase::Bootstrap, self.default_settings.dupe());
        let mut scope = Scope::new_root();
        scope.set_source_dir(dir.clone());
        eval.set_file_builtins(&mut scope, &dir);
        block.execute(&mut scope, &eval)?;
        let (_, updates) = eval.finish();
        self.base = scope.make_closure();
        tracing::info!(
            "Loaded build config {}: {} values, {} deferred updates",
            file,
            self.base.len(),
            updates.len()
        );
        self.updates = updates;
        self.build_config = Some(file.clone());
        Ok(())
    }

    pub fn build(self) -> Arc<BuildContext> {
        Arc::new(BuildContext {
            build_settings: self.build_settings,
            default_settings: self.default_settings,
            base: self.base,
            deferred_updates: DeferredUpdateRegistry::new(self.updates),
        })
    }
}

/// Everything build files are evaluated against. Shared across evaluation threads.
pub struct BuildContext {
    build_settings: Arc<BuildSettings>,
    default_settings: Settings,
    base: Closure,
    deferred_updates: DeferredUpdateRegistry,
}

impl BuildContext {
    pub fn build_settings(&self) -> &Arc<BuildSettings> {
        &self.build_settings
    }

    pub fn default_settings(&self) -> &Settings {
        &self.default_settings
    }

    pub fn settings_for_toolchain(&self, toolchain: &Label) -> Settings {
        if toolchain == self.default_settings.toolchain_label() {
            self.default_settings.dupe()
        } else {
            Settings::new(self.build_settings.dupe(), toolchain.dupe())
        }
    }

    pub fn deferred_updates(&self) -> &DeferredUpdateRegistry {
        &self.deferred_updates
    }

    /// Evaluate one build file in the toolchain of `settings`, returning the items it
    /// declared. Nothing is returned if any declaration fails.
    pub fn evaluate_file(
        &self,
        settings: &Settings,
        file: &SourceFile,
        block: &dyn Block,
    ) -> anyhow::Result<Vec<Item>> {
        let dir = file.dir();
        let eval = FileEvaluator::new(Phase::Generation(self), settings.dupe());
        let base = Scope::from_closure(&self.base);
        let mut scope = Scope::new_child(&base);
        scope.set_source_dir(dir.clone());
        eval.set_file_builtins(&mut scope, &dir);
        block.execute(&mut scope, &eval)?;
        let (items, _) = eval.finish();
        tracing::debug!(
            "Evaluated {} in {}: {} items",
            file,
            settings.toolchain_label(),
            items.len()
        );
        Ok(items)
    }
}
