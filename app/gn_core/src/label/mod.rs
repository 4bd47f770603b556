/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

pub mod pattern;

use std::fmt;
use std::fmt::Display;
use std::sync::Arc;

use allocative::Allocative;
use anyhow::Context;
use dupe::Dupe;

use crate::fs::resolver::PathResolver;
use crate::fs::source_dir::SourceDir;

#[derive(Debug, thiserror::Error)]
pub enum LabelParseError {
    #[error("Label is empty.")]
    Empty,
    #[error("Invalid label `{0}`: the target name is empty.")]
    EmptyName(String),
    #[error("Invalid label `{0}`: only one `:` may separate the directory from the target name.")]
    MultipleColons(String),
    #[error("Invalid label `{0}`: the toolchain has a left paren but no matching right paren.")]
    UnbalancedToolchain(String),
    #[error("Invalid label `{0}`: a toolchain label can not itself specify a toolchain.")]
    NestedToolchain(String),
    #[error("Invalid label `{0}`: character `{1}` is not allowed in a target name.")]
    InvalidCharacter(String, char),
    #[error("Invalid label `{0}`: no target name is given and none can be taken from `{1}`.")]
    NoImplicitName(String, String),
}

/// Resolved identity of a target, config, pool or toolchain:
/// a directory, a name and (except for toolchain labels themselves) a toolchain.
#[derive(Clone, Dupe, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Allocative)]
pub struct Label(Arc<LabelData>);

#[derive(Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Allocative)]
struct LabelData {
    dir: SourceDir,
    name: String,
    toolchain_dir: SourceDir,
    toolchain_name: String,
}

impl Label {
    /// Any toolchain of `toolchain` itself is dropped.
    pub fn new(dir: SourceDir, name: impl Into<String>, toolchain: Option<&Label>) -> Label {
        let (toolchain_dir, toolchain_name) = match toolchain {
            Some(t) => (t.0.dir.clone(), t.0.name.clone()),
            None => (SourceDir::default(), String::new()),
        };
        Label(Arc::new(LabelData {
            dir,
            name: name.into(),
            toolchain_dir,
            toolchain_name,
        }))
    }

    /// Test helper: parse a source-absolute label with no path map and no default toolchain.
    pub fn testing_parse(label: &str) -> Label {
        LabelResolver::new(PathResolver::new(&Default::default()), None)
            .resolve(&SourceDir::root(), label)
            .unwrap()
    }

    pub fn dir(&self) -> &SourceDir {
        &self.0.dir
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn has_toolchain(&self) -> bool {
        !self.0.toolchain_dir.is_null()
    }

    pub fn toolchain_label(&self) -> Option<Label> {
        if self.has_toolchain() {
            Some(Label::new(
                self.0.toolchain_dir.clone(),
                self.0.toolchain_name.clone(),
                None,
            ))
        } else {
            None
        }
    }

    pub fn without_toolchain(&self) -> Label {
        Label::new(self.0.dir.clone(), self.0.name.clone(), None)
    }

    pub fn with_toolchain(&self, toolchain: &Label) -> Label {
        Label::new(self.0.dir.clone(), self.0.name.clone(), Some(toolchain))
    }

    pub fn toolchains_equal(&self, other: &Label) -> bool {
        self.0.toolchain_dir == other.0.toolchain_dir
            && self.0.toolchain_name == other.0.toolchain_name
    }

    /// Whether this label's toolchain is `toolchain` (a label without toolchain).
    pub fn is_in_toolchain(&self, toolchain: &Label) -> bool {
        self.0.toolchain_dir == toolchain.0.dir && self.0.toolchain_name == toolchain.0.name
    }

    /// `//foo:bar`, or `//foo:bar(//tc:tc)` when asked for and known.
    pub fn user_visible_name(&self, include_toolchain: bool) -> String {
        let mut s = format!("{}:{}", self.0.dir.with_no_trailing_slash(), self.0.name);
        if include_toolchain && self.has_toolchain() {
            s.push('(');
            s.push_str(self.0.toolchain_dir.with_no_trailing_slash());
            s.push(':');
            s.push_str(&self.0.toolchain_name);
            s.push(')');
        }
        s
    }

    /// The toolchain is only spelled out when it is not the default one.
    pub fn user_visible_name_for_default(&self, default_toolchain: &Label) -> String {
        self.user_visible_name(!self.is_in_toolchain(default_toolchain))
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_visible_name(true))
    }
}

/// Resolves label text relative to a directory, applying the path map to source-absolute
/// directories and defaulting the toolchain.
#[derive(Clone, Copy, Dupe)]
pub struct LabelResolver<'a> {
    paths: PathResolver<'a>,
    current_toolchain: Option<&'a Label>,
}

impl<'a> LabelResolver<'a> {
    pub fn new(paths: PathResolver<'a>, current_toolchain: Option<&'a Label>) -> LabelResolver<'a> {
        LabelResolver {
            paths,
            current_toolchain,
        }
    }

    pub fn paths(&self) -> PathResolver<'a> {
        self.paths
    }

    pub fn current_toolchain(&self) -> Option<&'a Label> {
        self.current_toolchain
    }

    pub fn resolve(&self, current_dir: &SourceDir, input: &str) -> anyhow::Result<Label> {
        if input.is_empty() {
            return Err(LabelParseError::Empty.into());
        }
        let (location, toolchain) = match split_toolchain(input)? {
            (location, Some(toolchain_text)) => {
                if toolchain_text.contains('(') {
                    return Err(LabelParseError::NestedToolchain(input.to_owned()).into());
                }
                let resolver = LabelResolver::new(self.paths, None);
                let toolchain = resolver.resolve_location(current_dir, toolchain_text, input)?;
                (location, Some(toolchain))
            }
            (location, None) => (location, None),
        };
        let label = self.resolve_location(current_dir, location, input)?;
        Ok(match (&toolchain, self.current_toolchain) {
            (Some(t), _) => label.with_toolchain(t),
            (None, Some(t)) => label.with_toolchain(t),
            (None, None) => label,
        })
    }

    /// Resolve the `dir:name` part (no toolchain).
    fn resolve_location(
        &self,
        current_dir: &SourceDir,
        location: &str,
        original: &str,
    ) -> anyhow::Result<Label> {
        let (dir_text, name) = match location.split_once(':') {
            Some((_, name)) if name.contains(':') => {
                return Err(LabelParseError::MultipleColons(original.to_owned()).into());
            }
            Some((dir, name)) => (dir, Some(name)),
            None => (location, None),
        };

        let dir = if dir_text.is_empty() {
            current_dir.clone()
        } else {
            self.paths
                .resolve_dir(current_dir, dir_text)
                .with_context(|| format!("Invalid label `{}`", original))?
        };

        let name = match name {
            Some(name) => {
                validate_target_name(name, original)?;
                name.to_owned()
            }
            None => match dir.last_component() {
                Some(name) => name.to_owned(),
                None => {
                    return Err(LabelParseError::NoImplicitName(
                        original.to_owned(),
                        dir.value().to_owned(),
                    )
                    .into());
                }
            },
        };
        Ok(Label::new(dir, name, None))
    }
}

/// `//a:b(//tc:tc)` -> (`//a:b`, Some(`//tc:tc`)).
fn split_toolchain(input: &str) -> Result<(&str, Option<&str>), LabelParseError> {
    match input.find('(') {
        Some(open) => match input[open + 1..].strip_suffix(')') {
            Some(toolchain) => Ok((&input[..open], Some(toolchain))),
            None => Err(LabelParseError::UnbalancedToolchain(input.to_owned())),
        },
        None if input.contains(')') => Err(LabelParseError::InvalidCharacter(input.to_owned(), ')')),
        None => Ok((input, None)),
    }
}

pub(crate) fn validate_target_name(name: &str, original: &str) -> Result<(), LabelParseError> {
    if name.is_empty() {
        return Err(LabelParseError::EmptyName(original.to_owned()));
    }
    match name
        .chars()
        .find(|c| matches!(c, '/' | '(' | ')' | '*') || c.is_whitespace())
    {
        Some(c) => Err(LabelParseError::InvalidCharacter(original.to_owned(), c)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::path_map::PathMap;

    fn resolve(map: &PathMap, toolchain: Option<&Label>, dir: &str, input: &str) -> anyhow::Result<Label> {
        LabelResolver::new(PathResolver::new(map), toolchain)
            .resolve(&SourceDir::unchecked_new(dir), input)
    }

    #[test]
    fn test_resolve_forms() {
        let map = PathMap::default();
        let tc = Label::testing_parse("//build/toolchain:clang");
        let l = resolve(&map, Some(&tc), "//foo/", ":bar").unwrap();
        assert_eq!("//foo:bar(//build/toolchain:clang)", l.to_string());
        assert_eq!("//foo:bar", l.user_visible_name(false));

        let l = resolve(&map, Some(&tc), "//foo/", "//baz/qux").unwrap();
        assert_eq!("//baz/qux:qux", l.user_visible_name(false));

        let l = resolve(&map, Some(&tc), "//foo/", "sub:x").unwrap();
        assert_eq!("//foo/sub:x", l.user_visible_name(false));

        let l = resolve(&map, Some(&tc), "//foo/", "//:console").unwrap();
        assert_eq!("//:console", l.user_visible_name(false));
    }

    #[test]
    fn test_explicit_toolchain() {
        let map = PathMap::default();
        let default = Label::testing_parse("//tc:default");
        let l = resolve(&map, Some(&default), "//foo/", ":bar(//tc:host)").unwrap();
        assert_eq!("//tc:host", l.toolchain_label().unwrap().to_string());
        assert_eq!("//foo:bar(//tc:host)", l.user_visible_name_for_default(&default));
        let l = resolve(&map, Some(&default), "//foo/", ":bar").unwrap();
        assert_eq!("//foo:bar", l.user_visible_name_for_default(&default));
    }

    #[test]
    fn test_path_map_applies_to_label_dirs() {
        let map = PathMap::new([("//alpha", "//"), ("//", "//gamma")]).unwrap();
        let l = resolve(&map, None, "//foo/", "//alpha/a:b").unwrap();
        assert_eq!("//a:b", l.to_string());
        let l = resolve(&map, None, "//foo/", "//x/y").unwrap();
        assert_eq!("//gamma/x/y:y", l.to_string());
        let l = resolve(&map, None, "//foo/", ":z").unwrap();
        assert_eq!("//foo:z", l.to_string());
    }

    #[test]
    fn test_malformed() {
        let map = PathMap::default();
        let err = |s| {
            resolve(&map, None, "//foo/", s)
                .unwrap_err()
                .downcast::<LabelParseError>()
                .unwrap()
        };
        assert_matches!(err(""), LabelParseError::Empty);
        assert_matches!(err("//foo:"), LabelParseError::EmptyName(_));
        assert_matches!(err("//a:b:c"), LabelParseError::MultipleColons(_));
        assert_matches!(err("//a:b(//tc:x"), LabelParseError::UnbalancedToolchain(_));
        assert_matches!(err("//a:b(//tc:x(//y:z))"), LabelParseError::NestedToolchain(_));
        assert_matches!(err("//a:b c"), LabelParseError::InvalidCharacter(_, ' '));
        assert_matches!(err("//"), LabelParseError::NoImplicitName(..));
    }
}
