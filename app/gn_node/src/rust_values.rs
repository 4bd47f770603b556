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
use gn_core::fs::source_file::SourceFile;
use gn_core::label::Label;
use itertools::Itertools;
use starlark_map::small_map::SmallMap;

use crate::output_type::OutputType;

#[derive(
    Debug, Copy, Clone, Dupe, Eq, PartialEq, Hash, Allocative, derive_more::Display
)]
pub enum CrateType {
    #[display("bin")]
    Bin,
    #[display("cdylib")]
    Cdylib,
    #[display("dylib")]
    Dylib,
    #[display("proc-macro")]
    ProcMacro,
    #[display("rlib")]
    Rlib,
    #[display("staticlib")]
    Staticlib,
}

impl CrateType {
    pub const ALL: [CrateType; 6] = [
        CrateType::Bin,
        CrateType::Cdylib,
        CrateType::Dylib,
        CrateType::ProcMacro,
        CrateType::Rlib,
        CrateType::Staticlib,
    ];

    pub fn from_name(name: &str) -> Option<CrateType> {
        Self::ALL.into_iter().find(|t| t.to_string() == name)
    }

    /// `"bin", "cdylib", ...` for error messages.
    pub fn allowed_names() -> String {
        Self::ALL.iter().map(|t| format!("\"{}\"", t)).join(", ")
    }
}

/// Rust crate settings of a target.
#[derive(Debug, Clone, Default, Eq, PartialEq, Allocative)]
pub struct RustValues {
    pub crate_name: String,
    /// Unset means inferred from the target kind.
    pub crate_type: Option<CrateType>,
    pub crate_root: Option<SourceFile>,
    /// Dependency label to the crate name it is exposed as.
    pub aliased_deps: SmallMap<Label, String>,
}

impl RustValues {
    pub fn inferred_crate_type(&self, output_type: OutputType) -> Option<CrateType> {
        if let Some(t) = self.crate_type {
            return Some(t);
        }
        match output_type {
            OutputType::Executable => Some(CrateType::Bin),
            OutputType::StaticLibrary => Some(CrateType::Staticlib),
            OutputType::RustLibrary => Some(CrateType::Rlib),
            OutputType::RustProcMacro => Some(CrateType::ProcMacro),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_type_names() {
        assert_eq!(Some(CrateType::ProcMacro), CrateType::from_name("proc-macro"));
        assert_eq!(None, CrateType::from_name("proc_macro"));
        assert_eq!(
            "\"bin\", \"cdylib\", \"dylib\", \"proc-macro\", \"rlib\", \"staticlib\"",
            CrateType::allowed_names()
        );
    }

    #[test]
    fn test_inferred_crate_type() {
        let values = RustValues::default();
        assert_eq!(Some(CrateType::Rlib), values.inferred_crate_type(OutputType::RustLibrary));
        assert_eq!(Some(CrateType::Bin), values.inferred_crate_type(OutputType::Executable));
        assert_eq!(None, values.inferred_crate_type(OutputType::SharedLibrary));
        let values = RustValues {
            crate_type: Some(CrateType::Cdylib),
            ..Default::default()
        };
        assert_eq!(Some(CrateType::Cdylib), values.inferred_crate_type(OutputType::SharedLibrary));
    }
}
