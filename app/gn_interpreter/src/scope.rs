/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The variable environment blocks execute in.
//!
//! A [`Scope`] borrows its parent: lookups read through the chain, writes are always local.
//! Anything that outlives the block that produced it (templates, target defaults, deferred
//! update captures) is a [`Closure`], a flattened owned copy that can be turned back into a
//! scope later, possibly on another thread.

use std::cell::Cell;
use std::sync::Arc;

use dupe::Dupe;
use gn_core::fs::source_dir::SourceDir;
use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use starlark_map::small_map::SmallMap;
use thiserror::Error;

use crate::template::Template;
use crate::value::ScopeValue;
use crate::value::Value;

#[derive(Debug, Error)]
enum ScopeError {
    #[error(
        "Assignment had no effect.\nYou set the variable \"{0}\" here and it was unused before it \
        went\nout of scope."
    )]
    UnusedVariable(String),
    #[error("Value collision.\nThe value \"{0}\" is also being set in the current scope.")]
    ValueCollision(String),
    #[error("Can't nest these things.\nYou are trying to nest a {0} inside a {1}.")]
    CantNest(&'static str, &'static str),
    #[error("Duplicate template definition.\nA template called \"{0}\" was already defined.")]
    DuplicateTemplate(String),
    #[error("This target type already has defaults.\nYou called set_defaults(\"{0}\") twice.")]
    DuplicateDefaults(String),
}

/// How a merge treats names that already exist in the destination.
#[derive(Debug, Clone, Copy, Dupe, Eq, PartialEq)]
pub enum MergePolicy {
    /// Overwrite local values of the same name.
    Clobber,
    /// Skip names visible anywhere through the destination's chain.
    PreferExisting,
    /// Skip `_`-prefixed names; a local value of the same name must be equal.
    SkipPrivate,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub origin: Origin,
    used: Cell<bool>,
}

impl Binding {
    pub fn new(value: Value, origin: Origin) -> Binding {
        Binding {
            value,
            origin,
            used: Cell::new(false),
        }
    }

    fn used(value: Value, origin: Origin) -> Binding {
        Binding {
            value,
            origin,
            used: Cell::new(true),
        }
    }

    pub fn is_used(&self) -> bool {
        self.used.get()
    }
}

#[derive(Debug, Clone)]
struct NonNestable {
    what: &'static str,
    origin: Origin,
}

/// Owned snapshot of a scope chain.
#[derive(Debug, Clone, Default)]
pub struct Closure {
    values: SmallMap<String, (Value, Origin)>,
    templates: SmallMap<String, Arc<Template>>,
    target_defaults: SmallMap<String, Arc<Closure>>,
}

impl Closure {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).map(|(v, _)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge the captured values into `dest`.
    pub fn merge_into(&self, dest: &mut Scope<'_>, policy: MergePolicy) -> anyhow::Result<()> {
        for (name, (value, origin)) in &self.values {
            dest.merge_binding(
                name.clone(),
                Binding::used(value.clone(), origin.dupe()),
                policy,
            )?;
        }
        Ok(())
    }
}

pub struct Scope<'p> {
    parent: Option<&'p Scope<'p>>,
    values: SmallMap<String, Binding>,
    templates: SmallMap<String, Arc<Template>>,
    target_defaults: SmallMap<String, Arc<Closure>>,
    source_dir: Option<SourceDir>,
    non_nestable: Option<NonNestable>,
}

impl Scope<'static> {
    pub fn new_root() -> Scope<'static> {
        Scope {
            parent: None,
            values: SmallMap::new(),
            templates: SmallMap::new(),
            target_defaults: SmallMap::new(),
            source_dir: None,
            non_nestable: None,
        }
    }

    /// A parentless scope holding the closure's contents. Captured values never count as
    /// unused.
    pub fn from_closure(closure: &Closure) -> Scope<'static> {
        let mut scope = Scope::new_root();
        for (name, (value, origin)) in &closure.values {
            scope
                .values
                .insert(name.clone(), Binding::used(value.clone(), origin.dupe()));
        }
        scope.templates = closure.templates.clone();
        scope.target_defaults = closure.target_defaults.clone();
        scope
    }
}

impl<'p> Scope<'p> {
    pub fn new_child(parent: &'p Scope<'p>) -> Scope<'p> {
        Scope {
            parent: Some(parent),
            values: SmallMap::new(),
            templates: SmallMap::new(),
            target_defaults: SmallMap::new(),
            source_dir: None,
            non_nestable: None,
        }
    }

    /// A child of `parent` with `closure` merged in.
    pub fn merged_child(
        parent: &'p Scope<'p>,
        closure: &Closure,
        policy: MergePolicy,
    ) -> anyhow::Result<Scope<'p>> {
        let mut child = Scope::new_child(parent);
        closure.merge_into(&mut child, policy)?;
        Ok(child)
    }

    pub fn parent(&self) -> Option<&'p Scope<'p>> {
        self.parent
    }

    fn ancestors(&self) -> impl Iterator<Item = &Scope<'_>> {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent.map(|p| p as &Scope<'_>);
            Some(current)
        })
    }

    fn find_binding(&self, name: &str) -> Option<&Binding> {
        self.ancestors().find_map(|s| s.values.get(name))
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: Value, origin: Origin) {
        self.values.insert(name.into(), Binding::new(value, origin));
    }

    /// Like [`Scope::set_value`], but never reported as unused.
    pub fn set_used_value(&mut self, name: impl Into<String>, value: Value, origin: Origin) {
        self.values.insert(name.into(), Binding::used(value, origin));
    }

    /// A value the evaluator provides, e.g. `target_name`. Never reported as unused.
    pub fn set_builtin(&mut self, name: impl Into<String>, value: Value) {
        self.values
            .insert(name.into(), Binding::used(value, Origin::builtin()));
    }

    /// Look a name up through the chain and mark it used.
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.get_value_with_origin(name).map(|(v, _)| v)
    }

    pub fn get_value_with_origin(&self, name: &str) -> Option<(&Value, &Origin)> {
        let binding = self.find_binding(name)?;
        binding.used.set(true);
        Some((&binding.value, &binding.origin))
    }

    /// Look a name up without marking it used.
    pub fn peek_value(&self, name: &str) -> Option<&Value> {
        self.find_binding(name).map(|b| &b.value)
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// A local value to modify in place. A value found further up the chain is copied into
    /// this scope first.
    pub fn get_mutable_value(&mut self, name: &str, origin: &Origin) -> Option<&mut Value> {
        if !self.values.contains_key(name) {
            let inherited = self.parent?.get_value(name)?.clone();
            self.values
                .insert(name.to_owned(), Binding::new(inherited, origin.dupe()));
        }
        self.values.get_mut(name).map(|b| &mut b.value)
    }

    pub fn mark_used(&self, name: &str) {
        if let Some(binding) = self.find_binding(name) {
            binding.used.set(true);
        }
    }

    pub fn mark_all_used(&self) {
        for binding in self.values.values() {
            binding.used.set(true);
        }
    }

    /// The first local binding nobody read is an error.
    pub fn check_for_unused_vars(&self) -> anyhow::Result<()> {
        for (name, binding) in &self.values {
            if !binding.is_used() {
                return Err(ScopeError::UnusedVariable(name.clone())).at(&binding.origin);
            }
        }
        Ok(())
    }

    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// Local values as a scope value. Marks nothing.
    pub fn to_scope_value(&self) -> ScopeValue {
        ScopeValue::new(
            self.values
                .iter()
                .map(|(k, b)| (k.clone(), b.value.clone()))
                .collect(),
        )
    }

    pub fn into_local_bindings(self) -> SmallMap<String, Binding> {
        self.values
    }

    pub fn merge_binding(
        &mut self,
        name: String,
        binding: Binding,
        policy: MergePolicy,
    ) -> anyhow::Result<()> {
        match policy {
            MergePolicy::Clobber => {}
            MergePolicy::PreferExisting => {
                if self.find_binding(&name).is_some() {
                    return Ok(());
                }
            }
            MergePolicy::SkipPrivate => {
                if name.starts_with('_') {
                    return Ok(());
                }
                if let Some(existing) = self.values.get(&name) {
                    if existing.value == binding.value {
                        return Ok(());
                    }
                    return Err(ScopeError::ValueCollision(name)).at(&existing.origin);
                }
            }
        }
        self.values.insert(name, binding);
        Ok(())
    }

    pub fn merge_bindings(
        &mut self,
        bindings: SmallMap<String, Binding>,
        policy: MergePolicy,
    ) -> anyhow::Result<()> {
        for (name, binding) in bindings {
            self.merge_binding(name, binding, policy)?;
        }
        Ok(())
    }

    pub fn add_template(
        &mut self,
        name: &str,
        template: Arc<Template>,
        origin: &Origin,
    ) -> anyhow::Result<()> {
        if self.templates.contains_key(name) {
            return Err(ScopeError::DuplicateTemplate(name.to_owned())).at(origin);
        }
        self.templates.insert(name.to_owned(), template);
        Ok(())
    }

    pub fn get_template(&self, name: &str) -> Option<&Arc<Template>> {
        self.ancestors().find_map(|s| s.templates.get(name))
    }

    pub fn set_target_defaults(
        &mut self,
        kind: &str,
        defaults: Closure,
        origin: &Origin,
    ) -> anyhow::Result<()> {
        if self.target_defaults.contains_key(kind) {
            return Err(ScopeError::DuplicateDefaults(kind.to_owned())).at(origin);
        }
        self.target_defaults
            .insert(kind.to_owned(), Arc::new(defaults));
        Ok(())
    }

    pub fn get_target_defaults(&self, kind: &str) -> Option<&Arc<Closure>> {
        self.ancestors().find_map(|s| s.target_defaults.get(kind))
    }

    pub fn set_source_dir(&mut self, dir: SourceDir) {
        self.source_dir = Some(dir);
    }

    /// The closest directory set on the chain, null if none is.
    pub fn source_dir(&self) -> SourceDir {
        self.ancestors()
            .find_map(|s| s.source_dir.clone())
            .unwrap_or_default()
    }

    /// Mark this scope as the body of a `what` block; no declarations may happen inside it.
    pub fn set_non_nestable(&mut self, what: &'static str, origin: Origin) {
        self.non_nestable = Some(NonNestable { what, origin });
    }

    /// Fails if a `what` may not be declared here.
    pub fn check_nesting(&self, what: &'static str, origin: &Origin) -> anyhow::Result<()> {
        match self.ancestors().find_map(|s| s.non_nestable.as_ref()) {
            Some(outer) => {
                tracing::debug!("{} nested in {} declared at {}", what, outer.what, outer.origin);
                Err(ScopeError::CantNest(what, outer.what)).at(origin)
            }
            None => Ok(()),
        }
    }

    /// Flatten the whole chain into an owned snapshot; inner scopes shadow outer ones.
    pub fn make_closure(&self) -> Closure {
        let chain: Vec<&Scope<'_>> = self.ancestors().collect();
        let mut closure = Closure::default();
        for scope in chain.into_iter().rev() {
            for (name, binding) in &scope.values {
                closure
                    .values
                    .insert(name.clone(), (binding.value.clone(), binding.origin.dupe()));
            }
            for (name, template) in &scope.templates {
                closure.templates.insert(name.clone(), template.dupe());
            }
            for (kind, defaults) in &scope.target_defaults {
                closure.target_defaults.insert(kind.clone(), defaults.dupe());
            }
        }
        closure
    }

    /// Only the local values, for `set_defaults`.
    pub fn local_closure(&self) -> Closure {
        Closure {
            values: self
                .values
                .iter()
                .map(|(k, b)| (k.clone(), (b.value.clone(), b.origin.dupe())))
                .collect(),
            templates: SmallMap::new(),
            target_defaults: SmallMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(line: u32) -> Origin {
        Origin::new("//BUILD.gn", line, 1)
    }

    #[test]
    fn test_lookup_reads_through_parent() {
        let mut root = Scope::new_root();
        root.set_value("a", Value::Int(1), origin(1));
        let mut child = Scope::new_child(&root);
        child.set_value("b", Value::Int(2), origin(2));
        assert_eq!(Some(&Value::Int(1)), child.get_value("a"));
        assert_eq!(Some(&Value::Int(2)), child.get_value("b"));
        assert_eq!(None, child.get_value("c"));
        assert!(!child.has_local("a"));
        drop(child);
        assert!(root.check_for_unused_vars().is_ok());
    }

    #[test]
    fn test_unused_variable() {
        let mut scope = Scope::new_root();
        scope.set_value("used", Value::Int(1), origin(1));
        scope.set_value("unused", Value::Int(2), origin(2));
        scope.get_value("used");
        let err = scope.check_for_unused_vars().unwrap_err();
        assert_eq!(
            "At //BUILD.gn:2:1: Assignment had no effect.\nYou set the variable \"unused\" here \
            and it was unused before it went\nout of scope.",
            format!("{:#}", err)
        );
    }

    #[test]
    fn test_mutable_value_copies_from_parent() {
        let mut root = Scope::new_root();
        root.set_value("list", Value::list_of_strings(["a"]), origin(1));
        let mut child = Scope::new_child(&root);
        match child.get_mutable_value("list", &origin(2)) {
            Some(Value::List(l)) => l.push(Value::string("b")),
            v => panic!("unexpected {:?}", v),
        }
        assert_eq!(
            Some(&Value::list_of_strings(["a", "b"])),
            child.get_value("list")
        );
        drop(child);
        assert_eq!(Some(&Value::list_of_strings(["a"])), root.peek_value("list"));
    }

    #[test]
    fn test_merge_policies() {
        let mut root = Scope::new_root();
        root.set_value("outer", Value::Int(1), origin(1));
        let mut closure_scope = Scope::new_root();
        closure_scope.set_value("outer", Value::Int(10), origin(2));
        closure_scope.set_value("fresh", Value::Int(20), origin(3));
        closure_scope.set_value("_private", Value::Int(30), origin(4));
        let closure = closure_scope.make_closure();

        let child = Scope::merged_child(&root, &closure, MergePolicy::PreferExisting).unwrap();
        assert_eq!(Some(&Value::Int(1)), child.peek_value("outer"));
        assert_eq!(Some(&Value::Int(20)), child.peek_value("fresh"));

        let mut clobbered = Scope::new_root();
        clobbered.set_value("outer", Value::Int(1), origin(5));
        closure
            .merge_into(&mut clobbered, MergePolicy::Clobber)
            .unwrap();
        assert_eq!(Some(&Value::Int(10)), clobbered.peek_value("outer"));

        let mut defaults = Scope::new_root();
        closure
            .merge_into(&mut defaults, MergePolicy::SkipPrivate)
            .unwrap();
        assert_eq!(None, defaults.peek_value("_private"));
        assert!(defaults.check_for_unused_vars().is_ok());
    }

    #[test]
    fn test_skip_private_collision() {
        let mut closure_scope = Scope::new_root();
        closure_scope.set_value("x", Value::Int(1), origin(1));
        let closure = closure_scope.local_closure();
        let mut dest = Scope::new_root();
        dest.set_value("x", Value::Int(2), origin(7));
        let err = closure
            .merge_into(&mut dest, MergePolicy::SkipPrivate)
            .unwrap_err();
        assert!(format!("{:#}", err).starts_with("At //BUILD.gn:7:1: Value collision."));
    }

    #[test]
    fn test_closure_shadowing() {
        let mut root = Scope::new_root();
        root.set_value("x", Value::Int(1), origin(1));
        root.set_value("y", Value::Int(1), origin(1));
        let mut child = Scope::new_child(&root);
        child.set_value("x", Value::Int(2), origin(2));
        let closure = child.make_closure();
        assert_eq!(Some(&Value::Int(2)), closure.get("x"));
        assert_eq!(Some(&Value::Int(1)), closure.get("y"));
        let restored = Scope::from_closure(&closure);
        assert!(restored.check_for_unused_vars().is_ok());
    }

    #[test]
    fn test_nesting() {
        let root = Scope::new_root();
        let mut target = Scope::new_child(&root);
        target.set_non_nestable("target", origin(1));
        let inner = Scope::new_child(&target);
        assert!(root.check_nesting("config", &origin(2)).is_ok());
        let err = inner.check_nesting("config", &origin(3)).unwrap_err();
        assert_eq!(
            "At //BUILD.gn:3:1: Can't nest these things.\nYou are trying to nest a config inside \
            a target.",
            format!("{:#}", err)
        );
    }

    #[test]
    fn test_source_dir_inherited() {
        let mut root = Scope::new_root();
        assert!(root.source_dir().is_null());
        root.set_source_dir(SourceDir::unchecked_new("//a/"));
        let child = Scope::new_child(&root);
        assert_eq!("//a/", child.source_dir().value());
    }
}
