/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use allocative::Allocative;
use anyhow::Context;

use crate::fs::source_dir::SourceDir;
use crate::label::validate_target_name;
use crate::label::Label;
use crate::label::LabelResolver;

#[derive(Debug, thiserror::Error)]
enum LabelPatternError {
    #[error(
        "Invalid label pattern `{0}`: a wildcard must be the whole pattern (`*`), \
        a recursive directory (`//foo/*`) or all targets in a directory (`//foo:*`)."
    )]
    MisplacedWildcard(String),
    #[error("Invalid label pattern `{0}`: the toolchain has a left paren but no matching right paren.")]
    UnbalancedToolchain(String),
}

/// What a [`LabelPattern`] matches, ignoring the toolchain.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Allocative)]
pub enum LabelPatternKind {
    /// `*`
    Everything,
    /// `//foo:bar`
    Exact(SourceDir, String),
    /// `//foo:*`
    Directory(SourceDir),
    /// `//foo/*`
    RecursiveDirectory(SourceDir),
}

/// A pattern over labels, used by `visibility`, `assert_no_deps`, `friend` and
/// `bundle_deps_filter`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Allocative)]
pub struct LabelPattern {
    kind: LabelPatternKind,
    toolchain: Option<Label>,
}

impl LabelPattern {
    pub fn everything() -> LabelPattern {
        LabelPattern {
            kind: LabelPatternKind::Everything,
            toolchain: None,
        }
    }

    pub fn new(kind: LabelPatternKind, toolchain: Option<Label>) -> LabelPattern {
        LabelPattern { kind, toolchain }
    }

    pub fn kind(&self) -> &LabelPatternKind {
        &self.kind
    }

    pub fn toolchain(&self) -> Option<&Label> {
        self.toolchain.as_ref()
    }

    /// Patterns never default the toolchain: an unspecified toolchain matches all of them.
    pub fn parse(
        resolver: LabelResolver<'_>,
        current_dir: &SourceDir,
        input: &str,
    ) -> anyhow::Result<LabelPattern> {
        let (location, toolchain) = match input.find('(') {
            Some(open) => {
                let toolchain_text = input[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| LabelPatternError::UnbalancedToolchain(input.to_owned()))?;
                let toolchain = LabelResolver::new(resolver.paths(), None)
                    .resolve(current_dir, toolchain_text)
                    .with_context(|| format!("Invalid label pattern `{}`", input))?;
                (&input[..open], Some(toolchain))
            }
            None => (input, None),
        };

        let kind = Self::parse_kind(resolver, current_dir, location, input)?;
        Ok(LabelPattern { kind, toolchain })
    }

    fn parse_kind(
        resolver: LabelResolver<'_>,
        current_dir: &SourceDir,
        location: &str,
        original: &str,
    ) -> anyhow::Result<LabelPatternKind> {
        if location == "*" {
            return Ok(LabelPatternKind::Everything);
        }
        let resolve_dir = |text: &str| -> anyhow::Result<SourceDir> {
            if text.is_empty() {
                Ok(current_dir.clone())
            } else {
                resolver
                    .paths()
                    .resolve_dir(current_dir, text)
                    .with_context(|| format!("Invalid label pattern `{}`", original))
            }
        };

        if let Some((dir, name)) = location.split_once(':') {
            if dir.contains('*') {
                return Err(LabelPatternError::MisplacedWildcard(original.to_owned()).into());
            }
            let dir = resolve_dir(dir)?;
            if name == "*" {
                return Ok(LabelPatternKind::Directory(dir));
            }
            validate_target_name(name, original)?;
            return Ok(LabelPatternKind::Exact(dir, name.to_owned()));
        }

        if let Some(dir) = location.strip_suffix("/*") {
            if dir.contains('*') {
                return Err(LabelPatternError::MisplacedWildcard(original.to_owned()).into());
            }
            let dir = if dir == "/" {
                // `//*`
                SourceDir::root()
            } else {
                resolve_dir(dir)?
            };
            return Ok(LabelPatternKind::RecursiveDirectory(dir));
        }
        if location.contains('*') {
            return Err(LabelPatternError::MisplacedWildcard(original.to_owned()).into());
        }

        // `//foo/bar` is shorthand for `//foo/bar:bar`.
        let label = LabelResolver::new(resolver.paths(), None).resolve(current_dir, location)?;
        Ok(LabelPatternKind::Exact(
            label.dir().clone(),
            label.name().to_owned(),
        ))
    }

    pub fn matches(&self, label: &Label) -> bool {
        if let Some(toolchain) = &self.toolchain {
            if !label.is_in_toolchain(toolchain) {
                return false;
            }
        }
        match &self.kind {
            LabelPatternKind::Everything => true,
            LabelPatternKind::Exact(dir, name) => label.dir() == dir && label.name() == name,
            LabelPatternKind::Directory(dir) => label.dir() == dir,
            LabelPatternKind::RecursiveDirectory(dir) => dir.contains(label.dir().value()),
        }
    }

    pub fn matches_any(patterns: &[LabelPattern], label: &Label) -> bool {
        patterns.iter().any(|p| p.matches(label))
    }
}

impl Display for LabelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LabelPatternKind::Everything => write!(f, "*")?,
            LabelPatternKind::Exact(dir, name) => {
                write!(f, "{}:{}", dir.with_no_trailing_slash(), name)?
            }
            LabelPatternKind::Directory(dir) => write!(f, "{}:*", dir.with_no_trailing_slash())?,
            LabelPatternKind::RecursiveDirectory(dir) => write!(f, "{}*", dir)?,
        }
        if let Some(toolchain) = &self.toolchain {
            write!(f, "({})", toolchain)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::resolver::PathResolver;
    use crate::path_map::PathMap;

    fn parse(input: &str) -> anyhow::Result<LabelPattern> {
        let map = PathMap::default();
        LabelPattern::parse(
            LabelResolver::new(PathResolver::new(&map), None),
            &SourceDir::unchecked_new("//foo/"),
            input,
        )
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(LabelPatternKind::Everything, *parse("*").unwrap().kind());
        assert_eq!("//foo:bar", parse(":bar").unwrap().to_string());
        assert_eq!("//foo:*", parse(":*").unwrap().to_string());
        assert_eq!("//a/b/*", parse("//a/b/*").unwrap().to_string());
        assert_eq!("//*", parse("//*").unwrap().to_string());
        assert_eq!("//x/y:y", parse("//x/y").unwrap().to_string());
        assert_eq!("//a:*(//tc:tc)", parse("//a:*(//tc)").unwrap().to_string());
    }

    #[test]
    fn test_misplaced_wildcards() {
        assert!(parse("//a*").is_err());
        assert!(parse("//a/*/b:c").is_err());
        assert!(parse("//a:b*").is_err());
        assert!(parse("//a:b(//tc").is_err());
    }

    #[test]
    fn test_matches() {
        let label = Label::testing_parse("//a/b:c");
        assert!(parse("*").unwrap().matches(&label));
        assert!(parse("//a/b:c").unwrap().matches(&label));
        assert!(parse("//a/b:*").unwrap().matches(&label));
        assert!(parse("//a/*").unwrap().matches(&label));
        assert!(parse("//a/b/*").unwrap().matches(&label));
        assert!(!parse("//a:*").unwrap().matches(&label));
        assert!(!parse("//ab/*").unwrap().matches(&label));
        assert!(!parse("//a/b:d").unwrap().matches(&label));
    }

    #[test]
    fn test_toolchain_filter() {
        let host = Label::testing_parse("//tc:host");
        let target = Label::testing_parse("//a:b");
        let in_host = target.with_toolchain(&host);
        let pattern = parse("//a:b(//tc:host)").unwrap();
        assert!(pattern.matches(&in_host));
        assert!(!pattern.matches(&target));
        assert!(!pattern.matches(&target.with_toolchain(&Label::testing_parse("//tc:arm"))));
    }
}
