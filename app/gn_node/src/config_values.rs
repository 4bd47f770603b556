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
use gn_core::fs::source_dir::SourceDir;
use gn_core::fs::source_file::SourceFile;
use once_cell::sync::Lazy;
use regex::Regex;

static FRAMEWORK_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^/]+)\.framework$").unwrap());

/// `Foo.framework` -> `Foo`; anything else (a path, another extension) is rejected.
pub fn framework_name(file: &str) -> Option<&str> {
    FRAMEWORK_NAME
        .captures(file)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// An entry of `libs`: a bare library name passed to the linker, or a file.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Allocative)]
pub enum LibFile {
    Name(String),
    File(SourceFile),
}

impl Display for LibFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibFile::Name(name) => write!(f, "{}", name),
            LibFile::File(file) => write!(f, "{}", file),
        }
    }
}

/// Compiler and linker settings owned by a single target or config.
///
/// Every list keeps the order it was written in; nothing is sorted or deduplicated.
#[derive(Debug, Clone, Default, Eq, PartialEq, Allocative)]
pub struct ConfigValues {
    pub arflags: Vec<String>,
    pub asmflags: Vec<String>,
    pub cflags: Vec<String>,
    pub cflags_c: Vec<String>,
    pub cflags_cc: Vec<String>,
    pub cflags_objc: Vec<String>,
    pub cflags_objcc: Vec<String>,
    pub defines: Vec<String>,
    pub ldflags: Vec<String>,
    pub rustflags: Vec<String>,
    pub rustenv: Vec<String>,
    pub swiftflags: Vec<String>,

    pub include_dirs: Vec<SourceDir>,
    pub lib_dirs: Vec<SourceDir>,
    pub framework_dirs: Vec<SourceDir>,

    pub inputs: Vec<SourceFile>,
    pub libs: Vec<LibFile>,
    pub frameworks: Vec<String>,
    pub weak_frameworks: Vec<String>,
    /// `(crate name, library)` pairs, in declaration order.
    pub externs: Vec<(String, LibFile)>,

    pub precompiled_header: Option<String>,
    pub precompiled_source: Option<SourceFile>,
}

impl ConfigValues {
    pub fn has_precompiled_headers(&self) -> bool {
        self.precompiled_header.is_some() || self.precompiled_source.is_some()
    }

    /// Append the list fields of `other`. Precompiled header settings are not lists and are
    /// only taken when unset here.
    pub fn append(&mut self, other: &ConfigValues) {
        macro_rules! append_lists {
            ($($field:ident),* $(,)?) => {
                $(self.$field.extend(other.$field.iter().cloned());)*
            };
        }
        append_lists!(
            arflags,
            asmflags,
            cflags,
            cflags_c,
            cflags_cc,
            cflags_objc,
            cflags_objcc,
            defines,
            ldflags,
            rustflags,
            rustenv,
            swiftflags,
            include_dirs,
            lib_dirs,
            framework_dirs,
            inputs,
            libs,
            frameworks,
            weak_frameworks,
            externs,
        );
        if self.precompiled_header.is_none() {
            self.precompiled_header = other.precompiled_header.clone();
        }
        if self.precompiled_source.is_none() {
            self.precompiled_source = other.precompiled_source.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_name() {
        assert_eq!(Some("Foundation"), framework_name("Foundation.framework"));
        assert_eq!(None, framework_name("Foundation"));
        assert_eq!(None, framework_name("Foo/Foo.framework"));
        assert_eq!(None, framework_name(".framework"));
    }

    #[test]
    fn test_append_keeps_order() {
        let mut a = ConfigValues {
            defines: vec!["A".to_owned(), "B".to_owned()],
            precompiled_header: Some("pch.h".to_owned()),
            ..Default::default()
        };
        let b = ConfigValues {
            defines: vec!["B".to_owned(), "C".to_owned()],
            precompiled_header: Some("other.h".to_owned()),
            ..Default::default()
        };
        a.append(&b);
        assert_eq!(vec!["A", "B", "B", "C"], a.defines);
        assert_eq!(Some("pch.h".to_owned()), a.precompiled_header);
    }
}
