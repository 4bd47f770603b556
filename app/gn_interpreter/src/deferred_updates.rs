/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! `update_target` and `update_template_instance` patches.
//!
//! Patches are registered while the build config is evaluated, then applied to the matching
//! target or template instance right after its own block ran, at most once per
//! fully-qualified label.

use std::sync::Arc;

use derive_more::Display;
use dupe::Dupe;
use gn_core::fs::source_dir::SourceDir;
use gn_core::label::Label;
use gn_core::label::LabelResolver;
use gn_core::origin::Origin;
use parking_lot::Mutex;
use starlark_map::small_map::SmallMap;
use starlark_map::small_set::SmallSet;

use crate::ast::Block;
use crate::evaluator::FileEvaluator;
use crate::scope::Closure;
use crate::scope::MergePolicy;
use crate::scope::Scope;

#[derive(Debug, Clone, Copy, Dupe, Eq, PartialEq, Hash, Display)]
pub enum UpdateKind {
    #[display("update_target")]
    Target,
    #[display("update_template_instance")]
    TemplateInstance,
}

/// The label an update was registered for.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum UpdateKey {
    /// `:name`: every target called `name`, in any directory.
    Short(String),
    /// `//dir:name`, optionally restricted to one toolchain.
    Full {
        label: String,
        toolchain: Option<Label>,
    },
}

impl UpdateKey {
    /// A leading `:` without a toolchain is the short form; anything else is resolved as a
    /// label relative to `current_dir`.
    pub fn parse(
        resolver: LabelResolver<'_>,
        current_dir: &SourceDir,
        input: &str,
    ) -> anyhow::Result<UpdateKey> {
        if let Some(name) = input.strip_prefix(':') {
            if !name.is_empty() && !name.contains('(') {
                return Ok(UpdateKey::Short(input.to_owned()));
            }
        }
        let label = resolver.resolve(current_dir, input)?;
        Ok(UpdateKey::Full {
            label: label.user_visible_name(false),
            toolchain: label.toolchain_label(),
        })
    }

    fn lookup_key(&self) -> &str {
        match self {
            UpdateKey::Short(k) => k,
            UpdateKey::Full { label, .. } => label,
        }
    }

    fn matches_toolchain(&self, label: &Label) -> bool {
        match self {
            UpdateKey::Full {
                toolchain: Some(toolchain),
                ..
            } => label.is_in_toolchain(toolchain),
            _ => true,
        }
    }
}

/// One registered patch: the body and the scope it was registered from.
#[derive(Debug)]
pub struct DeferredUpdate {
    /// Registration order, unique across both kinds.
    id: usize,
    kind: UpdateKind,
    key: UpdateKey,
    closure: Closure,
    body: Arc<dyn Block>,
    origin: Origin,
}

impl DeferredUpdate {
    pub fn new(
        kind: UpdateKind,
        key: UpdateKey,
        closure: Closure,
        body: Arc<dyn Block>,
        origin: Origin,
    ) -> DeferredUpdate {
        DeferredUpdate {
            id: 0,
            kind,
            key,
            closure,
            body,
            origin,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> UpdateKind {
        self.kind
    }

    pub fn key(&self) -> &UpdateKey {
        &self.key
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Run the body against `scope`.
    ///
    /// The captured values are visible to the body but never shadow what `scope` already
    /// sees; whatever the body binds is written back onto `scope`, overwriting.
    pub fn apply(&self, scope: &mut Scope<'_>, eval: &FileEvaluator<'_>) -> anyhow::Result<()> {
        let results = {
            let captured = Scope::merged_child(scope, &self.closure, MergePolicy::PreferExisting)?;
            let mut block_scope = Scope::new_child(&captured);
            self.body.execute(&mut block_scope, eval)?;
            block_scope.into_local_bindings()
        };
        scope.merge_bindings(results, MergePolicy::Clobber)
    }
}

#[derive(Debug, Default)]
struct UpdateTable {
    /// Indices into the registry's entries, per lookup key, in registration order.
    by_key: SmallMap<String, Vec<usize>>,
}

/// All updates registered during bootstrap, immutable afterwards except for the apply-once
/// marks.
#[derive(Debug, Default)]
pub struct DeferredUpdateRegistry {
    entries: Vec<Arc<DeferredUpdate>>,
    targets: UpdateTable,
    template_instances: UpdateTable,
    /// (update id, label with toolchain) pairs already applied.
    applied: Mutex<SmallSet<(usize, Label)>>,
}

impl DeferredUpdateRegistry {
    pub fn new(updates: Vec<DeferredUpdate>) -> DeferredUpdateRegistry {
        let mut registry = DeferredUpdateRegistry::default();
        for (id, mut update) in updates.into_iter().enumerate() {
            update.id = id;
            let table = match update.kind {
                UpdateKind::Target => &mut registry.targets,
                UpdateKind::TemplateInstance => &mut registry.template_instances,
            };
            table
                .by_key
                .entry(update.key.lookup_key().to_owned())
                .or_default()
                .push(id);
            registry.entries.push(Arc::new(update));
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Updates registered under either spelling of `label`, in registration order.
    pub fn matching(&self, kind: UpdateKind, label: &Label) -> Vec<Arc<DeferredUpdate>> {
        let table = match kind {
            UpdateKind::Target => &self.targets,
            UpdateKind::TemplateInstance => &self.template_instances,
        };
        let short = format!(":{}", label.name());
        let full = label.user_visible_name(false);
        let mut ids: Vec<usize> = [short.as_str(), full.as_str()]
            .iter()
            .filter_map(|k| table.by_key.get(*k))
            .flatten()
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .map(|id| &self.entries[id])
            .filter(|u| u.key.matches_toolchain(label))
            .map(|u| u.dupe())
            .collect()
    }

    /// Record that `update` is being applied to `label`. False if it already was.
    pub fn try_mark_applied(&self, update: &DeferredUpdate, label: &Label) -> bool {
        self.applied.lock().insert((update.id, label.dupe()))
    }

    pub fn applied_count(&self) -> usize {
        self.applied.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use gn_core::fs::resolver::PathResolver;
    use gn_core::path_map::PathMap;

    use super::*;
    use crate::ast::StatementList;

    fn update(kind: UpdateKind, key: &str) -> DeferredUpdate {
        let path_map = PathMap::default();
        let key = UpdateKey::parse(
            LabelResolver::new(PathResolver::new(&path_map), None),
            &SourceDir::unchecked_new("//build/"),
            key,
        )
        .unwrap();
        DeferredUpdate::new(
            kind,
            key,
            Closure::default(),
            Arc::new(StatementList::new(Vec::new(), Origin::builtin())),
            Origin::builtin(),
        )
    }

    #[test]
    fn test_key_forms() {
        assert_matches!(update(UpdateKind::Target, ":bar").key(), UpdateKey::Short(k) if k == ":bar");
        assert_matches!(
            update(UpdateKind::Target, ":bar(//tc:host)").key(),
            UpdateKey::Full { label, toolchain: Some(_) } if label == "//build:bar"
        );
        assert_matches!(
            update(UpdateKind::Target, "//foo").key(),
            UpdateKey::Full { label, toolchain: None } if label == "//foo:foo"
        );
    }

    #[test]
    fn test_short_and_full_keys_match_in_registration_order() {
        let registry = DeferredUpdateRegistry::new(vec![
            update(UpdateKind::Target, "//bar:bar"),
            update(UpdateKind::Target, ":bar"),
            update(UpdateKind::TemplateInstance, "//bar:bar"),
            update(UpdateKind::Target, "//bar"),
            update(UpdateKind::Target, "//baz:bar"),
        ]);
        let label = Label::testing_parse("//bar:bar(//tc:default)");
        let ids: Vec<usize> = registry
            .matching(UpdateKind::Target, &label)
            .iter()
            .map(|u| u.id())
            .collect();
        assert_eq!(vec![0, 1, 3], ids);
        let ids: Vec<usize> = registry
            .matching(UpdateKind::TemplateInstance, &label)
            .iter()
            .map(|u| u.id())
            .collect();
        assert_eq!(vec![2], ids);
    }

    #[test]
    fn test_toolchain_restriction() {
        let registry =
            DeferredUpdateRegistry::new(vec![update(UpdateKind::Target, "//bar:bar(//tc:host)")]);
        assert!(
            registry
                .matching(
                    UpdateKind::Target,
                    &Label::testing_parse("//bar:bar(//tc:default)")
                )
                .is_empty()
        );
        assert_eq!(
            1,
            registry
                .matching(
                    UpdateKind::Target,
                    &Label::testing_parse("//bar:bar(//tc:host)")
                )
                .len()
        );
    }

    #[test]
    fn test_apply_once_per_label() {
        let registry = DeferredUpdateRegistry::new(vec![update(UpdateKind::Target, ":bar")]);
        let default = Label::testing_parse("//bar:bar(//tc:default)");
        let host = Label::testing_parse("//bar:bar(//tc:host)");
        let entry = registry.matching(UpdateKind::Target, &default).remove(0);
        assert!(registry.try_mark_applied(&entry, &default));
        assert!(!registry.try_mark_applied(&entry, &default));
        assert!(registry.try_mark_applied(&entry, &host));
        assert_eq!(2, registry.applied_count());
    }
}
