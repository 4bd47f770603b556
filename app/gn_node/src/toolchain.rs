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
use gn_core::label::Label;
use gn_core::origin::Origin;
use starlark_map::small_map::SmallMap;

use crate::substitution::SubstitutionList;

#[derive(Debug, thiserror::Error)]
enum ToolchainError {
    #[error("Duplicate tool \"{0}\" in toolchain {1}.")]
    DuplicateTool(String, Label),
}

/// A tool of a toolchain, reduced to what target resolution reads: its output templates.
#[derive(Debug, Clone, Allocative)]
pub struct Tool {
    name: String,
    outputs: SubstitutionList,
    origin: Origin,
}

impl Tool {
    pub fn new(name: impl Into<String>, outputs: SubstitutionList, origin: Origin) -> Tool {
        Tool {
            name: name.into(),
            outputs,
            origin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outputs(&self) -> &SubstitutionList {
        &self.outputs
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

#[derive(Debug, Clone, Allocative)]
pub struct Toolchain {
    label: Label,
    tools: SmallMap<String, Tool>,
}

impl Toolchain {
    pub fn new(label: Label) -> Toolchain {
        Toolchain {
            label,
            tools: SmallMap::new(),
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn add_tool(&mut self, tool: Tool) -> anyhow::Result<()> {
        if self.tools.contains_key(tool.name()) {
            return Err(ToolchainError::DuplicateTool(tool.name, self.label.dupe()).into());
        }
        self.tools.insert(tool.name.clone(), tool);
        Ok(())
    }

    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_tool() {
        let mut toolchain = Toolchain::new(Label::testing_parse("//tc:default"));
        let tool = || Tool::new("swift", SubstitutionList::default(), Origin::builtin());
        toolchain.add_tool(tool()).unwrap();
        assert_eq!(
            "Duplicate tool \"swift\" in toolchain //tc:default.",
            toolchain.add_tool(tool()).unwrap_err().to_string()
        );
        assert!(toolchain.tool("swift").is_some());
        assert!(toolchain.tool("cc").is_none());
    }
}
