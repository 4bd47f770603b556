/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::borrow::Cow;

use allocative::Allocative;

use crate::fs::source_dir::SourceDir;
use crate::fs::source_file::SourceFile;

#[derive(Debug, thiserror::Error)]
enum PathMapError {
    #[error("Path map prefix `{0}` must be source-absolute (start with `//`).")]
    PrefixNotSourceAbsolute(String),
    #[error("Path map replacement `{1}` for prefix `{0}` must be source-absolute (start with `//`).")]
    ReplacementNotSourceAbsolute(String, String),
    #[error("Path map prefix `{0}` is listed more than once.")]
    DuplicatePrefix(String),
}

#[derive(Debug, Clone, Eq, PartialEq, Allocative)]
pub struct PathMapEntry {
    prefix: SourceDir,
    replacement: SourceDir,
}

impl PathMapEntry {
    pub fn prefix(&self) -> &SourceDir {
        &self.prefix
    }

    pub fn replacement(&self) -> &SourceDir {
        &self.replacement
    }
}

/// Ordered prefix-substitution table applied to source-absolute paths.
///
/// Entries are kept most-specific (longest prefix) first; the first entry whose prefix
/// contains a path rewrites it, paths no entry contains pass through unchanged. Matching is by
/// whole directory components: `//alpha` does not contain `//alphabet/x`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Allocative)]
pub struct PathMap {
    entries: Vec<PathMapEntry>,
}

impl PathMap {
    pub fn new<P, R>(entries: impl IntoIterator<Item = (P, R)>) -> anyhow::Result<PathMap>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        let mut parsed: Vec<PathMapEntry> = Vec::new();
        for (prefix, replacement) in entries {
            let (prefix, replacement) = (prefix.as_ref(), replacement.as_ref());
            if !prefix.starts_with("//") {
                return Err(PathMapError::PrefixNotSourceAbsolute(prefix.to_owned()).into());
            }
            if !replacement.starts_with("//") {
                return Err(PathMapError::ReplacementNotSourceAbsolute(
                    prefix.to_owned(),
                    replacement.to_owned(),
                )
                .into());
            }
            let entry = PathMapEntry {
                prefix: SourceDir::parse(prefix)?,
                replacement: SourceDir::parse(replacement)?,
            };
            if parsed.iter().any(|e| e.prefix == entry.prefix) {
                return Err(PathMapError::DuplicatePrefix(prefix.to_owned()).into());
            }
            parsed.push(entry);
        }
        // Stable, so equally long prefixes keep their declaration order.
        parsed.sort_by(|a, b| b.prefix.value().len().cmp(&a.prefix.value().len()));
        Ok(PathMap { entries: parsed })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PathMapEntry] {
        &self.entries
    }

    /// Rewrite a source-absolute path (file or directory) through the first matching entry.
    pub fn map<'a>(&self, path: &'a str) -> Cow<'a, str> {
        if !path.starts_with("//") {
            return Cow::Borrowed(path);
        }
        for entry in &self.entries {
            let rest = match path.strip_prefix(entry.prefix.value()) {
                Some(rest) => rest,
                None if entry.prefix.with_no_trailing_slash() == path => "",
                None => continue,
            };
            let mapped = format!("{}{}", entry.replacement.value(), rest);
            tracing::trace!("path map: `{}` -> `{}`", path, mapped);
            return Cow::Owned(mapped);
        }
        Cow::Borrowed(path)
    }

    pub fn map_dir(&self, dir: &SourceDir) -> SourceDir {
        match self.map(dir.value()) {
            Cow::Borrowed(_) => dir.clone(),
            Cow::Owned(v) => SourceDir::unchecked_new(v),
        }
    }

    pub fn map_file(&self, file: &SourceFile) -> SourceFile {
        match self.map(file.value()) {
            Cow::Borrowed(_) => file.clone(),
            Cow::Owned(v) => SourceFile::unchecked_new(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testing_map() -> PathMap {
        PathMap::new([("//alpha", "//"), ("//beta", "//beta"), ("//", "//gamma")]).unwrap()
    }

    #[test]
    fn test_most_specific_prefix_wins() {
        let map = testing_map();
        assert_eq!("//a/b/c", map.map("//alpha/a/b/c"));
        assert_eq!("//beta/d/e/f", map.map("//beta/d/e/f"));
        assert_eq!("//gamma/foo/g/h/i", map.map("//foo/g/h/i"));
    }

    #[test]
    fn test_component_boundaries() {
        let map = PathMap::new([("//alpha", "//x")]).unwrap();
        assert_eq!("//alphabet/a", map.map("//alphabet/a"));
        assert_eq!("//x/", map.map("//alpha"));
    }

    #[test]
    fn test_system_paths_pass_through() {
        assert_eq!("/usr/include", testing_map().map("/usr/include"));
        assert_eq!("relative/path", testing_map().map("relative/path"));
    }

    #[test]
    fn test_declaration_order_is_not_precedence() {
        let map = PathMap::new([("//", "//gamma"), ("//alpha", "//")]).unwrap();
        assert_eq!("//a", map.map("//alpha/a"));
    }

    #[test]
    fn test_invalid_entries() {
        assert!(PathMap::new([("alpha", "//")]).is_err());
        assert!(PathMap::new([("//alpha", "beta")]).is_err());
        assert!(PathMap::new([("//a", "//b"), ("//a/", "//c")]).is_err());
    }
}
