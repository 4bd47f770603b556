/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use allocative::Allocative;
use dupe::Dupe;

/// Type of a source file, derived from its extension.
#[derive(Debug, Copy, Clone, Dupe, Eq, PartialEq, Hash, Allocative)]
pub enum SourceFileType {
    Unknown,
    Asm,
    C,
    Cpp,
    H,
    M,
    Mm,
    ModuleMap,
    Rc,
    O,
    Def,
    Rs,
    Go,
    Swift,
    SwiftModule,
}

/// Languages whose sources cannot be compiled together in one target.
#[derive(Debug, Copy, Clone, Dupe, Eq, PartialEq, Hash)]
pub enum LanguageFamily {
    /// C, C++, Objective C/C++, assembly and the inputs their toolchains consume.
    C,
    Rust,
    Go,
    Swift,
}

impl SourceFileType {
    pub fn from_extension(ext: &str) -> SourceFileType {
        match ext {
            "cc" | "cpp" | "cxx" | "c++" => SourceFileType::Cpp,
            "h" | "hpp" | "hxx" | "hh" | "inc" | "ipp" | "inl" => SourceFileType::H,
            "c" => SourceFileType::C,
            "m" => SourceFileType::M,
            "mm" => SourceFileType::Mm,
            "modulemap" => SourceFileType::ModuleMap,
            "rc" => SourceFileType::Rc,
            "S" | "s" | "asm" => SourceFileType::Asm,
            "o" | "obj" => SourceFileType::O,
            "def" => SourceFileType::Def,
            "rs" => SourceFileType::Rs,
            "go" => SourceFileType::Go,
            "swift" => SourceFileType::Swift,
            "swiftmodule" => SourceFileType::SwiftModule,
            _ => SourceFileType::Unknown,
        }
    }

    /// Whether a file of this type may appear in the `sources` of a compiled target.
    pub fn is_allowed_in_binary_sources(self) -> bool {
        !matches!(self, SourceFileType::Unknown | SourceFileType::SwiftModule)
    }

    /// Headers have no family: they may accompany any language.
    pub fn family(self) -> Option<LanguageFamily> {
        match self {
            SourceFileType::Asm
            | SourceFileType::C
            | SourceFileType::Cpp
            | SourceFileType::M
            | SourceFileType::Mm
            | SourceFileType::ModuleMap
            | SourceFileType::Rc
            | SourceFileType::O
            | SourceFileType::Def => Some(LanguageFamily::C),
            SourceFileType::Rs => Some(LanguageFamily::Rust),
            SourceFileType::Go => Some(LanguageFamily::Go),
            SourceFileType::Swift => Some(LanguageFamily::Swift),
            SourceFileType::H | SourceFileType::Unknown | SourceFileType::SwiftModule => None,
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of source types used by a target.
#[derive(Debug, Default, Copy, Clone, Dupe, Eq, PartialEq, Allocative)]
pub struct SourceFileTypeSet(u32);

impl SourceFileTypeSet {
    pub fn set(&mut self, t: SourceFileType) {
        self.0 |= t.bit();
    }

    pub fn get(&self, t: SourceFileType) -> bool {
        self.0 & t.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    fn family_used(&self, family: LanguageFamily) -> bool {
        ALL_TYPES
            .iter()
            .any(|t| self.get(*t) && t.family() == Some(family))
    }

    pub fn c_source_used(&self) -> bool {
        self.family_used(LanguageFamily::C) || self.get(SourceFileType::H)
    }

    pub fn rust_source_used(&self) -> bool {
        self.family_used(LanguageFamily::Rust)
    }

    pub fn go_source_used(&self) -> bool {
        self.family_used(LanguageFamily::Go)
    }

    pub fn swift_source_used(&self) -> bool {
        self.family_used(LanguageFamily::Swift)
    }

    /// More than one compilation-incompatible language family is present.
    pub fn mixed_source_used(&self) -> bool {
        [
            LanguageFamily::C,
            LanguageFamily::Rust,
            LanguageFamily::Go,
            LanguageFamily::Swift,
        ]
        .iter()
        .filter(|f| self.family_used(**f))
        .count()
            > 1
    }
}

const ALL_TYPES: [SourceFileType; 15] = [
    SourceFileType::Unknown,
    SourceFileType::Asm,
    SourceFileType::C,
    SourceFileType::Cpp,
    SourceFileType::H,
    SourceFileType::M,
    SourceFileType::Mm,
    SourceFileType::ModuleMap,
    SourceFileType::Rc,
    SourceFileType::O,
    SourceFileType::Def,
    SourceFileType::Rs,
    SourceFileType::Go,
    SourceFileType::Swift,
    SourceFileType::SwiftModule,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(types: &[SourceFileType]) -> SourceFileTypeSet {
        let mut set = SourceFileTypeSet::default();
        for t in types {
            set.set(*t);
        }
        set
    }

    #[test]
    fn test_c_family_mixes() {
        let set = set_of(&[
            SourceFileType::C,
            SourceFileType::Cpp,
            SourceFileType::Mm,
            SourceFileType::H,
        ]);
        assert!(set.c_source_used());
        assert!(!set.mixed_source_used());
    }

    #[test]
    fn test_rust_with_headers_is_not_mixed() {
        let set = set_of(&[SourceFileType::Rs, SourceFileType::H]);
        assert!(set.rust_source_used());
        assert!(!set.mixed_source_used());
    }

    #[test]
    fn test_rust_with_cpp_is_mixed() {
        assert!(set_of(&[SourceFileType::Rs, SourceFileType::Cpp]).mixed_source_used());
        assert!(set_of(&[SourceFileType::Rs, SourceFileType::O]).mixed_source_used());
        assert!(set_of(&[SourceFileType::Swift, SourceFileType::Go]).mixed_source_used());
    }

    #[test]
    fn test_rejected_types() {
        assert!(!SourceFileType::Unknown.is_allowed_in_binary_sources());
        assert!(!SourceFileType::SwiftModule.is_allowed_in_binary_sources());
        assert!(SourceFileType::ModuleMap.is_allowed_in_binary_sources());
    }
}
