/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! `{{placeholder}}` patterns used by action outputs, bundle rules and tool definitions.

use std::fmt;
use std::fmt::Display;

use allocative::Allocative;
use dupe::Dupe;
use gn_core::build_settings::Settings;
use gn_core::fs::source_dir::SourceDir;
use gn_core::fs::source_file::SourceFile;
use gn_core::label::Label;

use crate::bundle::bundle_data::BundleDirs;

#[derive(Debug, thiserror::Error)]
pub enum SubstitutionError {
    #[error("Unterminated {{{{ in \"{0}\".")]
    Unterminated(String),
    #[error("Unknown substitution pattern \"{{{{{1}}}}}\" in \"{0}\".")]
    Unknown(String, String),
    #[error("\"{{{{{1}}}}}\" can not be expanded here (in \"{0}\").")]
    NotAvailable(String, String),
}

#[derive(Debug, Copy, Clone, Dupe, Eq, PartialEq, Hash, Allocative)]
pub enum SubstitutionType {
    Source,
    SourceNamePart,
    SourceFilePart,
    SourceDir,
    SourceRootRelativeDir,
    SourceGenDir,
    SourceOutDir,
    SourceTargetRelative,
    BundleRootDir,
    BundleContentsDir,
    BundleResourcesDir,
    BundleExecutableDir,
    TargetOutDir,
    TargetGenDir,
    RootOutDir,
    RootGenDir,
    LabelName,
    TargetOutputName,
    ModuleName,
}

impl SubstitutionType {
    const ALL: [SubstitutionType; 19] = [
        SubstitutionType::Source,
        SubstitutionType::SourceNamePart,
        SubstitutionType::SourceFilePart,
        SubstitutionType::SourceDir,
        SubstitutionType::SourceRootRelativeDir,
        SubstitutionType::SourceGenDir,
        SubstitutionType::SourceOutDir,
        SubstitutionType::SourceTargetRelative,
        SubstitutionType::BundleRootDir,
        SubstitutionType::BundleContentsDir,
        SubstitutionType::BundleResourcesDir,
        SubstitutionType::BundleExecutableDir,
        SubstitutionType::TargetOutDir,
        SubstitutionType::TargetGenDir,
        SubstitutionType::RootOutDir,
        SubstitutionType::RootGenDir,
        SubstitutionType::LabelName,
        SubstitutionType::TargetOutputName,
        SubstitutionType::ModuleName,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SubstitutionType::Source => "source",
            SubstitutionType::SourceNamePart => "source_name_part",
            SubstitutionType::SourceFilePart => "source_file_part",
            SubstitutionType::SourceDir => "source_dir",
            SubstitutionType::SourceRootRelativeDir => "source_root_relative_dir",
            SubstitutionType::SourceGenDir => "source_gen_dir",
            SubstitutionType::SourceOutDir => "source_out_dir",
            SubstitutionType::SourceTargetRelative => "source_target_relative",
            SubstitutionType::BundleRootDir => "bundle_root_dir",
            SubstitutionType::BundleContentsDir => "bundle_contents_dir",
            SubstitutionType::BundleResourcesDir => "bundle_resources_dir",
            SubstitutionType::BundleExecutableDir => "bundle_executable_dir",
            SubstitutionType::TargetOutDir => "target_out_dir",
            SubstitutionType::TargetGenDir => "target_gen_dir",
            SubstitutionType::RootOutDir => "root_out_dir",
            SubstitutionType::RootGenDir => "root_gen_dir",
            SubstitutionType::LabelName => "label_name",
            SubstitutionType::TargetOutputName => "target_output_name",
            SubstitutionType::ModuleName => "module_name",
        }
    }

    pub fn from_name(name: &str) -> Option<SubstitutionType> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn is_source(self) -> bool {
        matches!(
            self,
            SubstitutionType::Source
                | SubstitutionType::SourceNamePart
                | SubstitutionType::SourceFilePart
                | SubstitutionType::SourceDir
                | SubstitutionType::SourceRootRelativeDir
                | SubstitutionType::SourceGenDir
                | SubstitutionType::SourceOutDir
                | SubstitutionType::SourceTargetRelative
        )
    }

    pub fn is_bundle(self) -> bool {
        matches!(
            self,
            SubstitutionType::BundleRootDir
                | SubstitutionType::BundleContentsDir
                | SubstitutionType::BundleResourcesDir
                | SubstitutionType::BundleExecutableDir
        )
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Allocative)]
enum SubstitutionRange {
    Literal(String),
    Placeholder(SubstitutionType),
}

/// A string with `{{name}}` placeholders.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Allocative)]
pub struct SubstitutionPattern {
    ranges: Vec<SubstitutionRange>,
}

impl SubstitutionPattern {
    pub fn parse(input: &str) -> anyhow::Result<SubstitutionPattern> {
        let mut ranges = Vec::new();
        let mut rest = input;
        while let Some(start) = rest.find("{{") {
            if start > 0 {
                ranges.push(SubstitutionRange::Literal(rest[..start].to_owned()));
            }
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| SubstitutionError::Unterminated(input.to_owned()))?;
            let name = &after[..end];
            let ty = SubstitutionType::from_name(name)
                .ok_or_else(|| SubstitutionError::Unknown(input.to_owned(), name.to_owned()))?;
            ranges.push(SubstitutionRange::Placeholder(ty));
            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            ranges.push(SubstitutionRange::Literal(rest.to_owned()));
        }
        Ok(SubstitutionPattern { ranges })
    }

    pub fn placeholders(&self) -> impl Iterator<Item = SubstitutionType> + '_ {
        self.ranges.iter().filter_map(|r| match r {
            SubstitutionRange::Placeholder(t) => Some(*t),
            SubstitutionRange::Literal(_) => None,
        })
    }

    pub fn has_source_expansion(&self) -> bool {
        self.placeholders().any(|t| t.is_source())
    }

    /// The placeholder the pattern starts with, if it starts with one.
    pub fn first_placeholder(&self) -> Option<SubstitutionType> {
        match self.ranges.first() {
            Some(SubstitutionRange::Placeholder(t)) => Some(*t),
            _ => None,
        }
    }

    /// The text of a pattern without placeholders.
    pub fn as_literal(&self) -> Option<&str> {
        match self.ranges.as_slice() {
            [] => Some(""),
            [SubstitutionRange::Literal(s)] => Some(s),
            _ => None,
        }
    }

    pub fn expand(&self, ctx: &SubstitutionContext<'_>) -> anyhow::Result<String> {
        let mut result = String::new();
        for range in &self.ranges {
            match range {
                SubstitutionRange::Literal(s) => result.push_str(s),
                SubstitutionRange::Placeholder(t) => match ctx.value(*t) {
                    Some(v) => result.push_str(&v),
                    None => {
                        return Err(SubstitutionError::NotAvailable(
                            self.to_string(),
                            t.name().to_owned(),
                        )
                        .into());
                    }
                },
            }
        }
        Ok(result)
    }
}

impl Display for SubstitutionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for range in &self.ranges {
            match range {
                SubstitutionRange::Literal(s) => f.write_str(s)?,
                SubstitutionRange::Placeholder(t) => write!(f, "{{{{{}}}}}", t.name())?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Allocative)]
pub struct SubstitutionList {
    patterns: Vec<SubstitutionPattern>,
}

impl SubstitutionList {
    pub fn new(patterns: Vec<SubstitutionPattern>) -> SubstitutionList {
        SubstitutionList { patterns }
    }

    pub fn parse<S: AsRef<str>>(items: &[S]) -> anyhow::Result<SubstitutionList> {
        Ok(SubstitutionList {
            patterns: items
                .iter()
                .map(|s| SubstitutionPattern::parse(s.as_ref()))
                .collect::<anyhow::Result<_>>()?,
        })
    }

    pub fn patterns(&self) -> &[SubstitutionPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn has_source_expansion(&self) -> bool {
        self.patterns.iter().any(|p| p.has_source_expansion())
    }
}

/// What placeholders expand to. Anything not supplied fails to expand.
pub struct SubstitutionContext<'a> {
    settings: &'a Settings,
    target: Option<&'a Label>,
    output_name: Option<&'a str>,
    module_name: Option<&'a str>,
    bundle: Option<&'a BundleDirs>,
    source: Option<&'a SourceFile>,
}

impl<'a> SubstitutionContext<'a> {
    pub fn new(settings: &'a Settings) -> SubstitutionContext<'a> {
        SubstitutionContext {
            settings,
            target: None,
            output_name: None,
            module_name: None,
            bundle: None,
            source: None,
        }
    }

    pub fn with_target(mut self, label: &'a Label, output_name: &'a str) -> Self {
        self.target = Some(label);
        self.output_name = Some(output_name);
        self
    }

    pub fn with_module_name(mut self, module_name: &'a str) -> Self {
        self.module_name = Some(module_name);
        self
    }

    pub fn with_bundle(mut self, bundle: &'a BundleDirs) -> Self {
        self.bundle = Some(bundle);
        self
    }

    pub fn with_source(mut self, source: &'a SourceFile) -> Self {
        self.source = Some(source);
        self
    }

    fn dir(dir: &SourceDir) -> String {
        dir.with_no_trailing_slash().to_owned()
    }

    fn value(&self, ty: SubstitutionType) -> Option<String> {
        let settings = self.settings;
        match ty {
            SubstitutionType::Source => self.source.map(|s| s.value().to_owned()),
            SubstitutionType::SourceNamePart => self.source.map(|s| s.name_part().to_owned()),
            SubstitutionType::SourceFilePart => self.source.map(|s| s.name().to_owned()),
            SubstitutionType::SourceDir => self.source.map(|s| Self::dir(&s.dir())),
            SubstitutionType::SourceRootRelativeDir => {
                self.source.map(|s| s.dir().source_root_relative().to_owned())
            }
            SubstitutionType::SourceGenDir => self
                .source
                .map(|s| Self::dir(&settings.target_gen_dir(&s.dir()))),
            SubstitutionType::SourceOutDir => self
                .source
                .map(|s| Self::dir(&settings.target_out_dir(&s.dir()))),
            SubstitutionType::SourceTargetRelative => {
                let source = self.source?;
                let target_dir = self.target?.dir();
                Some(
                    source
                        .value()
                        .strip_prefix(target_dir.value())
                        .unwrap_or(source.value())
                        .to_owned(),
                )
            }
            SubstitutionType::BundleRootDir
            | SubstitutionType::BundleContentsDir
            | SubstitutionType::BundleResourcesDir
            | SubstitutionType::BundleExecutableDir => self.bundle?.get(ty).map(Self::dir),
            SubstitutionType::TargetOutDir => {
                self.target.map(|l| Self::dir(&settings.target_out_dir(l.dir())))
            }
            SubstitutionType::TargetGenDir => {
                self.target.map(|l| Self::dir(&settings.target_gen_dir(l.dir())))
            }
            SubstitutionType::RootOutDir => Some(Self::dir(&settings.root_out_dir())),
            SubstitutionType::RootGenDir => Some(Self::dir(&settings.root_gen_dir())),
            SubstitutionType::LabelName => self.target.map(|l| l.name().to_owned()),
            SubstitutionType::TargetOutputName => self.output_name.map(str::to_owned),
            SubstitutionType::ModuleName => self.module_name.map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gn_core::build_settings::BuildSettings;
    use gn_core::path_map::PathMap;

    use super::*;

    fn settings() -> Settings {
        Settings::new(
            Arc::new(BuildSettings::new(
                SourceDir::unchecked_new("//out/"),
                PathMap::default(),
            )),
            Label::testing_parse("//tc:default"),
        )
    }

    #[test]
    fn test_parse_and_display() {
        let p = SubstitutionPattern::parse("{{target_gen_dir}}/{{source_name_part}}.h").unwrap();
        assert!(p.has_source_expansion());
        assert_eq!(Some(SubstitutionType::TargetGenDir), p.first_placeholder());
        assert_eq!("{{target_gen_dir}}/{{source_name_part}}.h", p.to_string());
        assert_eq!(Some("plain"), SubstitutionPattern::parse("plain").unwrap().as_literal());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "Unterminated {{ in \"{{source\".",
            SubstitutionPattern::parse("{{source").unwrap_err().to_string()
        );
        assert_eq!(
            "Unknown substitution pattern \"{{bogus}}\" in \"a{{bogus}}\".",
            SubstitutionPattern::parse("a{{bogus}}").unwrap_err().to_string()
        );
    }

    #[test]
    fn test_expand() {
        let settings = settings();
        let label = Label::testing_parse("//foo:bar");
        let source = SourceFile::unchecked_new("//foo/sub/x.proto");
        let ctx = SubstitutionContext::new(&settings)
            .with_target(&label, "libbar")
            .with_source(&source);
        let expand = |s: &str| SubstitutionPattern::parse(s).unwrap().expand(&ctx).unwrap();
        assert_eq!("//out/gen/foo/sub/x.pb.h", expand("{{source_gen_dir}}/{{source_name_part}}.pb.h"));
        assert_eq!("sub/x.proto", expand("{{source_target_relative}}"));
        assert_eq!("//out/obj/foo/libbar.a", expand("{{target_out_dir}}/{{target_output_name}}.a"));
        assert_eq!("foo/sub", expand("{{source_root_relative_dir}}"));
        assert!(SubstitutionPattern::parse("{{module_name}}")
            .unwrap()
            .expand(&ctx)
            .is_err());
    }
}
