/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use allocative::Allocative;

use crate::fs::source_dir::SourceDir;
use crate::fs::source_file_type::SourceFileType;

/// A file in the source tree (`//foo/bar.cc`) or on the system (`/usr/lib/libz.a`).
#[derive(
    Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Allocative, derive_more::Display
)]
#[display("{}", _0)]
pub struct SourceFile(String);

impl SourceFile {
    /// The caller guarantees `value` is normalized and does not end with a slash.
    pub fn unchecked_new(value: impl Into<String>) -> SourceFile {
        let value = value.into();
        debug_assert!(!value.ends_with('/'), "{}", value);
        SourceFile(value)
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_source_absolute(&self) -> bool {
        self.0.starts_with("//")
    }

    /// File part, `//foo/bar.cc` -> `bar.cc`.
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }

    /// File part without the extension, `//foo/bar.pb.cc` -> `bar.pb`.
    pub fn name_part(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(i) if i > 0 => &name[..i],
            _ => name,
        }
    }

    /// Extension without the dot, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.name();
        match name.rfind('.') {
            Some(i) if i > 0 => Some(&name[i + 1..]),
            _ => None,
        }
    }

    pub fn dir(&self) -> SourceDir {
        match self.0.rfind('/') {
            Some(i) => SourceDir::unchecked_new(&self.0[..=i]),
            None => SourceDir::default(),
        }
    }

    pub fn file_type(&self) -> SourceFileType {
        match self.extension() {
            Some(ext) => SourceFileType::from_extension(ext),
            None => SourceFileType::Unknown,
        }
    }

    pub fn is_swift_module_type(&self) -> bool {
        self.file_type() == SourceFileType::SwiftModule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let f = SourceFile::unchecked_new("//foo/bar.pb.cc");
        assert_eq!("bar.pb.cc", f.name());
        assert_eq!("bar.pb", f.name_part());
        assert_eq!(Some("cc"), f.extension());
        assert_eq!("//foo/", f.dir().value());
        assert_eq!(SourceFileType::Cpp, f.file_type());
    }

    #[test]
    fn test_no_extension() {
        let f = SourceFile::unchecked_new("//foo/.hidden");
        assert_eq!(None, f.extension());
        assert_eq!(".hidden", f.name_part());
        assert_eq!(SourceFileType::Unknown, f.file_type());
    }
}
