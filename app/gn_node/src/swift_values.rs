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
use gn_core::build_settings::Settings;
use gn_core::fs::source_dir::SourceDir;
use gn_core::fs::source_file::SourceFile;
use gn_core::label::Label;
use gn_core::origin::OriginContext;

use crate::substitution::SubstitutionContext;
use crate::toolchain::Toolchain;

const SWIFT_TOOL: &str = "swift";

#[derive(Debug, thiserror::Error)]
enum SwiftValuesError {
    #[error("Toolchain {0} has no \"{1}\" tool, needed to build {2}.")]
    MissingTool(Label, &'static str, Label),
    #[error(
        "Incorrect outputs for tool\nThe outputs of tool \"{0}\" must list exactly one \
        .swiftmodule file, but {1} were found."
    )]
    IncorrectOutputs(&'static str, usize),
}

/// Swift module settings of a target.
#[derive(Debug, Clone, Default, Eq, PartialEq, Allocative)]
pub struct SwiftValues {
    pub module_name: String,
    pub bridge_header: Option<SourceFile>,
    module_output_file: Option<SourceFile>,
}

impl SwiftValues {
    /// Only known once the target has been resolved against its toolchain.
    pub fn module_output_file(&self) -> Option<&SourceFile> {
        self.module_output_file.as_ref()
    }

    /// Pick the single `.swiftmodule` file among the outputs of the toolchain's swift tool.
    pub fn fill_module_output_file(
        &mut self,
        settings: &Settings,
        label: &Label,
        output_name: &str,
        toolchain: &Toolchain,
    ) -> anyhow::Result<()> {
        let tool = toolchain.tool(SWIFT_TOOL).ok_or_else(|| {
            SwiftValuesError::MissingTool(toolchain.label().dupe(), SWIFT_TOOL, label.dupe())
        })?;
        let ctx = SubstitutionContext::new(settings)
            .with_target(label, output_name)
            .with_module_name(&self.module_name);

        let mut modules = Vec::new();
        for pattern in tool.outputs().patterns() {
            let expanded = pattern.expand(&ctx).at(tool.origin())?;
            let file = SourceDir::root().resolve_relative_file(&expanded)?;
            if file.is_swift_module_type() {
                modules.push(file);
            }
        }
        match <[SourceFile; 1]>::try_from(modules) {
            Ok([module]) => {
                self.module_output_file = Some(module);
                Ok(())
            }
            Err(modules) => {
                Err(SwiftValuesError::IncorrectOutputs(SWIFT_TOOL, modules.len())).at(tool.origin())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gn_core::build_settings::BuildSettings;
    use gn_core::origin::Origin;
    use gn_core::path_map::PathMap;

    use super::*;
    use crate::substitution::SubstitutionList;
    use crate::toolchain::Tool;

    fn settings() -> Settings {
        Settings::new(
            Arc::new(BuildSettings::new(
                SourceDir::unchecked_new("//out/"),
                PathMap::default(),
            )),
            Label::testing_parse("//tc:default"),
        )
    }

    fn toolchain(outputs: &[&str]) -> Toolchain {
        let mut toolchain = Toolchain::new(Label::testing_parse("//tc:default"));
        toolchain
            .add_tool(Tool::new(
                "swift",
                SubstitutionList::parse(outputs).unwrap(),
                Origin::new("//tc/BUILD.gn", 3, 3),
            ))
            .unwrap();
        toolchain
    }

    #[test]
    fn test_single_module_output() {
        let mut values = SwiftValues {
            module_name: "Foo".to_owned(),
            ..Default::default()
        };
        values
            .fill_module_output_file(
                &settings(),
                &Label::testing_parse("//foo:bar"),
                "bar",
                &toolchain(&[
                    "{{target_out_dir}}/{{module_name}}.swiftmodule",
                    "{{target_out_dir}}/{{module_name}}.h",
                ]),
            )
            .unwrap();
        assert_eq!(
            "//out/obj/foo/Foo.swiftmodule",
            values.module_output_file().unwrap().value()
        );
    }

    #[test]
    fn test_wrong_number_of_modules() {
        let mut values = SwiftValues::default();
        let err = values
            .fill_module_output_file(
                &settings(),
                &Label::testing_parse("//foo:bar"),
                "bar",
                &toolchain(&["{{target_out_dir}}/{{label_name}}.h"]),
            )
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("At //tc/BUILD.gn:3:3"), "{}", message);
        assert!(message.contains("Incorrect outputs for tool"), "{}", message);
        assert_eq!(None, values.module_output_file());
    }
}
