/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use allocative::Allocative;

use crate::fs::path_util::is_path_in_dir;
use crate::fs::path_util::normalize_path;
use crate::fs::source_file::SourceFile;
use crate::fs::PathError;

/// A directory in the source tree or on the system, always ending in a slash.
///
/// The empty value is the "null" directory (for example the unset toolchain directory of a
/// toolchain label).
#[derive(
    Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Allocative, derive_more::Display
)]
#[display("{}", _0)]
pub struct SourceDir(String);

impl SourceDir {
    /// The caller guarantees `value` is normalized and ends with a slash (or is empty).
    pub fn unchecked_new(value: impl Into<String>) -> SourceDir {
        let value = value.into();
        debug_assert!(value.is_empty() || value.ends_with('/'), "{}", value);
        SourceDir(value)
    }

    /// Parse an absolute directory, adding the trailing slash if missing.
    pub fn parse(value: &str) -> Result<SourceDir, PathError> {
        if value.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(SourceDir(with_trailing_slash(normalize_path(value)?)))
    }

    pub fn root() -> SourceDir {
        SourceDir("//".to_owned())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_source_absolute(&self) -> bool {
        self.0.starts_with("//")
    }

    pub fn is_system_absolute(&self) -> bool {
        !self.is_source_absolute() && self.0.starts_with('/')
    }

    /// `//foo/bar/` -> `//foo/bar`; the root stays `//`.
    pub fn with_no_trailing_slash(&self) -> &str {
        if (self.0.len() <= 2 && self.is_source_absolute()) || self.0 == "/" {
            &self.0
        } else {
            self.0.strip_suffix('/').unwrap_or(&self.0)
        }
    }

    /// Path relative to the source root, without leading `//` or trailing `/`.
    pub fn source_root_relative(&self) -> &str {
        self.0
            .strip_prefix("//")
            .unwrap_or(&self.0)
            .trim_end_matches('/')
    }

    /// Last path component, if any.
    pub fn last_component(&self) -> Option<&str> {
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(i) if i + 1 < trimmed.len() => Some(&trimmed[i + 1..]),
            _ => None,
        }
    }

    /// Whether `path` (a file or directory value) is this directory or below it.
    pub fn contains(&self, path: &str) -> bool {
        !self.is_null() && is_path_in_dir(&self.0, path)
    }

    fn absolutize(&self, input: &str) -> Result<String, PathError> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        if input.starts_with('/') {
            normalize_path(input)
        } else {
            normalize_path(&format!("{}{}", self.0, input))
        }
    }

    /// Resolve a file name written relative to this directory.
    pub fn resolve_relative_file(&self, input: &str) -> Result<SourceFile, PathError> {
        if input.ends_with('/') {
            return Err(PathError::NotAFile(input.to_owned()));
        }
        let resolved = self.absolutize(input)?;
        if resolved.ends_with('/') {
            return Err(PathError::NotAFile(input.to_owned()));
        }
        Ok(SourceFile::unchecked_new(resolved))
    }

    /// Resolve a directory name written relative to this directory.
    pub fn resolve_relative_dir(&self, input: &str) -> Result<SourceDir, PathError> {
        Ok(SourceDir(with_trailing_slash(self.absolutize(input)?)))
    }
}

fn with_trailing_slash(mut value: String) -> String {
    if !value.ends_with('/') {
        value.push('/');
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_file() {
        let dir = SourceDir::unchecked_new("//a/b/");
        assert_eq!("//a/b/foo.cc", dir.resolve_relative_file("foo.cc").unwrap().value());
        assert_eq!("//a/c.cc", dir.resolve_relative_file("../c.cc").unwrap().value());
        assert_eq!("//x/y.cc", dir.resolve_relative_file("//x/y.cc").unwrap().value());
        assert_eq!(
            "/usr/lib/libz.a",
            dir.resolve_relative_file("/usr/lib/libz.a").unwrap().value()
        );
        assert_eq!(Err(PathError::Empty), dir.resolve_relative_file(""));
        assert_eq!(
            Err(PathError::NotAFile("foo/".to_owned())),
            dir.resolve_relative_file("foo/")
        );
    }

    #[test]
    fn test_resolve_relative_dir() {
        let dir = SourceDir::unchecked_new("//a/b/");
        assert_eq!("//a/b/", dir.resolve_relative_dir(".").unwrap().value());
        assert_eq!("//a/b/include/", dir.resolve_relative_dir("include").unwrap().value());
        assert_eq!("//a/", dir.resolve_relative_dir("..").unwrap().value());
        assert_eq!("//", dir.resolve_relative_dir("//").unwrap().value());
    }

    #[test]
    fn test_components() {
        let dir = SourceDir::unchecked_new("//foo/bar/");
        assert_eq!("//foo/bar", dir.with_no_trailing_slash());
        assert_eq!("foo/bar", dir.source_root_relative());
        assert_eq!(Some("bar"), dir.last_component());
        assert_eq!("//", SourceDir::root().with_no_trailing_slash());
        assert_eq!(None, SourceDir::root().last_component());
    }
}
