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

/// Kind of a target. Each kind is declared by the function of the same name.
#[derive(
    Debug, Copy, Clone, Dupe, Eq, PartialEq, Hash, Allocative, derive_more::Display
)]
pub enum OutputType {
    #[display("action")]
    Action,
    #[display("action_foreach")]
    ActionForeach,
    #[display("bundle_data")]
    BundleData,
    #[display("create_bundle")]
    CreateBundle,
    #[display("copy")]
    Copy,
    #[display("executable")]
    Executable,
    #[display("group")]
    Group,
    #[display("loadable_module")]
    LoadableModule,
    #[display("shared_library")]
    SharedLibrary,
    #[display("source_set")]
    SourceSet,
    #[display("static_library")]
    StaticLibrary,
    #[display("generated_file")]
    GeneratedFile,
    #[display("rust_library")]
    RustLibrary,
    #[display("rust_proc_macro")]
    RustProcMacro,
}

impl OutputType {
    pub const ALL: [OutputType; 14] = [
        OutputType::Action,
        OutputType::ActionForeach,
        OutputType::BundleData,
        OutputType::CreateBundle,
        OutputType::Copy,
        OutputType::Executable,
        OutputType::Group,
        OutputType::LoadableModule,
        OutputType::SharedLibrary,
        OutputType::SourceSet,
        OutputType::StaticLibrary,
        OutputType::GeneratedFile,
        OutputType::RustLibrary,
        OutputType::RustProcMacro,
    ];

    pub fn from_function_name(name: &str) -> Option<OutputType> {
        Self::ALL.into_iter().find(|t| t.function_name() == name)
    }

    pub fn function_name(self) -> &'static str {
        match self {
            OutputType::Action => "action",
            OutputType::ActionForeach => "action_foreach",
            OutputType::BundleData => "bundle_data",
            OutputType::CreateBundle => "create_bundle",
            OutputType::Copy => "copy",
            OutputType::Executable => "executable",
            OutputType::Group => "group",
            OutputType::LoadableModule => "loadable_module",
            OutputType::SharedLibrary => "shared_library",
            OutputType::SourceSet => "source_set",
            OutputType::StaticLibrary => "static_library",
            OutputType::GeneratedFile => "generated_file",
            OutputType::RustLibrary => "rust_library",
            OutputType::RustProcMacro => "rust_proc_macro",
        }
    }

    /// Kinds that compile sources and so go through the binary target pipeline.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            OutputType::Executable
                | OutputType::SharedLibrary
                | OutputType::LoadableModule
                | OutputType::StaticLibrary
                | OutputType::SourceSet
                | OutputType::RustLibrary
                | OutputType::RustProcMacro
        )
    }

    /// Kinds a Rust crate can be built as. `source_set` is not one of them.
    pub fn supports_rust(self) -> bool {
        matches!(
            self,
            OutputType::Executable
                | OutputType::SharedLibrary
                | OutputType::LoadableModule
                | OutputType::StaticLibrary
                | OutputType::RustLibrary
                | OutputType::RustProcMacro
        )
    }

    /// Kinds that are Rust crates whatever their sources.
    pub fn is_rust_only(self) -> bool {
        matches!(self, OutputType::RustLibrary | OutputType::RustProcMacro)
    }

    pub fn is_action(self) -> bool {
        matches!(self, OutputType::Action | OutputType::ActionForeach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_names_round_trip() {
        for t in OutputType::ALL {
            assert_eq!(Some(t), OutputType::from_function_name(t.function_name()));
            assert_eq!(t.function_name(), t.to_string());
        }
        assert_eq!(None, OutputType::from_function_name("toolchain"));
    }
}
