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

use crate::substitution::SubstitutionContext;
use crate::substitution::SubstitutionList;
use crate::substitution::SubstitutionPattern;

/// Script, arguments and outputs of `action`, `action_foreach`, `copy`, `bundle_data` and
/// `generated_file` targets.
#[derive(Debug, Clone, Default, Eq, PartialEq, Allocative)]
pub struct ActionValues {
    pub script: Option<SourceFile>,
    pub args: SubstitutionList,
    pub outputs: SubstitutionList,
    pub depfile: Option<SubstitutionPattern>,
    pub response_file_contents: SubstitutionList,
}

impl ActionValues {
    /// Outputs for the given sources, or for the target itself when `sources` is empty.
    pub fn output_files(
        &self,
        settings: &Settings,
        label: &Label,
        output_name: &str,
        sources: &[SourceFile],
    ) -> anyhow::Result<Vec<SourceFile>> {
        let base = SubstitutionContext::new(settings).with_target(label, output_name);
        let mut files = Vec::new();
        if sources.is_empty() || !self.outputs.has_source_expansion() {
            for pattern in self.outputs.patterns() {
                files.push(SourceDir::root().resolve_relative_file(&pattern.expand(&base)?)?);
            }
            return Ok(files);
        }
        for source in sources {
            let ctx = SubstitutionContext::new(settings)
                .with_target(label, output_name)
                .with_source(source);
            for pattern in self.outputs.patterns() {
                files.push(SourceDir::root().resolve_relative_file(&pattern.expand(&ctx)?)?);
            }
        }
        Ok(files)
    }
}

/// How `generated_file` writes its value.
#[derive(
    Debug, Copy, Clone, Dupe, Default, Eq, PartialEq, Hash, Allocative, derive_more::Display
)]
pub enum OutputConversion {
    #[default]
    #[display("")]
    Default,
    #[display("list lines")]
    ListLines,
    #[display("string")]
    String,
    #[display("value")]
    Value,
    #[display("json")]
    Json,
    #[display("scope")]
    Scope,
}

impl OutputConversion {
    pub const ALL: [OutputConversion; 6] = [
        OutputConversion::Default,
        OutputConversion::ListLines,
        OutputConversion::String,
        OutputConversion::Value,
        OutputConversion::Json,
        OutputConversion::Scope,
    ];

    pub fn from_name(name: &str) -> Option<OutputConversion> {
        Self::ALL.into_iter().find(|c| c.to_string() == name)
    }
}

/// Values of a `generated_file` target.
#[derive(Debug, Clone, Default, Allocative)]
pub struct GeneratedFileValues {
    #[allocative(skip)]
    pub contents: Option<serde_json::Value>,
    pub data_keys: Vec<String>,
    pub walk_keys: Vec<String>,
    pub rebase: Option<SourceDir>,
    pub output_conversion: OutputConversion,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gn_core::build_settings::BuildSettings;
    use gn_core::path_map::PathMap;

    use super::*;

    #[test]
    fn test_output_files_per_source() {
        let settings = Settings::new(
            Arc::new(BuildSettings::new(
                SourceDir::unchecked_new("//out/"),
                PathMap::default(),
            )),
            Label::testing_parse("//tc:default"),
        );
        let values = ActionValues {
            outputs: SubstitutionList::parse(&["{{target_gen_dir}}/{{source_name_part}}.h"])
                .unwrap(),
            ..Default::default()
        };
        let files = values
            .output_files(
                &settings,
                &Label::testing_parse("//foo:gen"),
                "gen",
                &[
                    SourceFile::unchecked_new("//foo/a.idl"),
                    SourceFile::unchecked_new("//foo/b.idl"),
                ],
            )
            .unwrap();
        assert_eq!(
            vec!["//out/gen/foo/a.h", "//out/gen/foo/b.h"],
            files.iter().map(|f| f.value()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_output_conversion_names() {
        assert_eq!(Some(OutputConversion::Default), OutputConversion::from_name(""));
        assert_eq!(Some(OutputConversion::ListLines), OutputConversion::from_name("list lines"));
        assert_eq!(None, OutputConversion::from_name("yaml"));
    }
}
