/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Settings shared by the whole build ([`BuildSettings`]) and per toolchain ([`Settings`]).

use std::path::PathBuf;
use std::sync::Arc;

use allocative::Allocative;
use anyhow::Context;
use dupe::Dupe;
use serde::Deserialize;

use crate::fs::resolver::PathResolver;
use crate::fs::source_dir::SourceDir;
use crate::label::Label;
use crate::label::LabelResolver;
use crate::path_map::PathMap;

#[derive(Debug, thiserror::Error)]
enum BuildSettingsError {
    #[error("Build dir `{0}` must be source-absolute (start with `//`).")]
    BuildDirNotSourceAbsolute(String),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildSettingsJson {
    #[serde(default)]
    root_path: PathBuf,
    build_dir: String,
    #[serde(default)]
    default_toolchain: Option<String>,
    #[serde(default)]
    path_map: Vec<PathMapEntryJson>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PathMapEntryJson {
    prefix: String,
    replacement: String,
}

/// Write-once build configuration, read by every resolution during generation.
#[derive(Debug, Clone, Eq, PartialEq, Allocative)]
pub struct BuildSettings {
    #[allocative(skip)]
    root_path: PathBuf,
    build_dir: SourceDir,
    default_toolchain: Option<Label>,
    path_map: PathMap,
}

impl BuildSettings {
    pub fn new(build_dir: SourceDir, path_map: PathMap) -> BuildSettings {
        BuildSettings {
            root_path: PathBuf::new(),
            build_dir,
            default_toolchain: None,
            path_map,
        }
    }

    /// Parse the JSON form:
    ///
    /// ```json
    /// {
    ///   "root_path": "/src",
    ///   "build_dir": "//out/Debug",
    ///   "default_toolchain": "//build/toolchain:clang",
    ///   "path_map": [{"prefix": "//third_party", "replacement": "//vendor"}]
    /// }
    /// ```
    pub fn from_json(json: &str) -> anyhow::Result<BuildSettings> {
        let raw: BuildSettingsJson =
            serde_json::from_str(json).context("Malformed build settings")?;
        if !raw.build_dir.starts_with("//") {
            return Err(BuildSettingsError::BuildDirNotSourceAbsolute(raw.build_dir).into());
        }
        let build_dir = SourceDir::parse(&raw.build_dir)?;
        let path_map = PathMap::new(
            raw.path_map
                .iter()
                .map(|e| (e.prefix.as_str(), e.replacement.as_str())),
        )?;
        let default_toolchain = match &raw.default_toolchain {
            Some(t) => Some(
                LabelResolver::new(PathResolver::new(&path_map), None)
                    .resolve(&SourceDir::root(), t)
                    .context("Invalid default toolchain")?,
            ),
            None => None,
        };
        Ok(BuildSettings {
            root_path: raw.root_path,
            build_dir,
            default_toolchain,
            path_map,
        })
    }

    pub fn with_default_toolchain(mut self, toolchain: Label) -> BuildSettings {
        self.default_toolchain = Some(toolchain);
        self
    }

    pub fn root_path(&self) -> &PathBuf {
        &self.root_path
    }

    pub fn build_dir(&self) -> &SourceDir {
        &self.build_dir
    }

    pub fn default_toolchain(&self) -> Option<&Label> {
        self.default_toolchain.as_ref()
    }

    pub fn path_map(&self) -> &PathMap {
        &self.path_map
    }

    pub fn path_resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.path_map)
    }
}

/// Settings for evaluating files in one toolchain.
#[derive(Debug, Clone, Dupe, Allocative)]
pub struct Settings(Arc<SettingsData>);

#[derive(Debug, Allocative)]
struct SettingsData {
    build_settings: Arc<BuildSettings>,
    toolchain_label: Label,
    is_default: bool,
    /// Empty for the default toolchain, otherwise `<toolchain name>/`.
    toolchain_output_subdir: String,
}

impl Settings {
    pub fn new(build_settings: Arc<BuildSettings>, toolchain_label: Label) -> Settings {
        let is_default = match build_settings.default_toolchain() {
            Some(default) => *default == toolchain_label,
            None => true,
        };
        let toolchain_output_subdir = if is_default {
            String::new()
        } else {
            format!("{}/", toolchain_label.name())
        };
        Settings(Arc::new(SettingsData {
            build_settings,
            toolchain_label,
            is_default,
            toolchain_output_subdir,
        }))
    }

    pub fn build_settings(&self) -> &Arc<BuildSettings> {
        &self.0.build_settings
    }

    pub fn toolchain_label(&self) -> &Label {
        &self.0.toolchain_label
    }

    pub fn default_toolchain_label(&self) -> &Label {
        self.0
            .build_settings
            .default_toolchain()
            .unwrap_or(&self.0.toolchain_label)
    }

    pub fn is_default(&self) -> bool {
        self.0.is_default
    }

    pub fn toolchain_output_subdir(&self) -> &str {
        &self.0.toolchain_output_subdir
    }

    pub fn label_resolver(&self) -> LabelResolver<'_> {
        LabelResolver::new(
            self.0.build_settings.path_resolver(),
            Some(&self.0.toolchain_label),
        )
    }

    /// `//out/Debug/` or `//out/Debug/<toolchain>/`.
    pub fn root_out_dir(&self) -> SourceDir {
        SourceDir::unchecked_new(format!(
            "{}{}",
            self.0.build_settings.build_dir().value(),
            self.0.toolchain_output_subdir
        ))
    }

    pub fn root_gen_dir(&self) -> SourceDir {
        SourceDir::unchecked_new(format!("{}gen/", self.root_out_dir().value()))
    }

    pub fn target_out_dir(&self, dir: &SourceDir) -> SourceDir {
        Self::append_dir(self.root_out_dir(), "obj/", dir)
    }

    pub fn target_gen_dir(&self, dir: &SourceDir) -> SourceDir {
        Self::append_dir(self.root_gen_dir(), "", dir)
    }

    fn append_dir(base: SourceDir, infix: &str, dir: &SourceDir) -> SourceDir {
        let rel = dir.source_root_relative();
        if rel.is_empty() {
            SourceDir::unchecked_new(format!("{}{}", base.value(), infix))
        } else {
            SourceDir::unchecked_new(format!("{}{}{}/", base.value(), infix, rel))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let settings = BuildSettings::from_json(
            r#"{
                "build_dir": "//out/Debug",
                "default_toolchain": "//build/toolchain:clang",
                "path_map": [
                    {"prefix": "//", "replacement": "//gamma"},
                    {"prefix": "//alpha", "replacement": "//"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!("//out/Debug/", settings.build_dir().value());
        // The toolchain label goes through the path map like any other.
        assert_eq!(
            "//gamma/build/toolchain:clang",
            settings.default_toolchain().unwrap().to_string()
        );
        assert_eq!("//alpha/", settings.path_map().entries()[0].prefix().value());
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(BuildSettings::from_json(r#"{"build_dir": "out"}"#).is_err());
        assert!(BuildSettings::from_json(r#"{"build_dir": "//out", "extra": 1}"#).is_err());
        assert!(BuildSettings::from_json(r#"{"build_dir": "//out", "path_map": [{"prefix": "a", "replacement": "//b"}]}"#).is_err());
    }

    #[test]
    fn test_output_dirs() {
        let default = Label::testing_parse("//tc:clang");
        let host = Label::testing_parse("//tc:host");
        let build = Arc::new(
            BuildSettings::new(SourceDir::unchecked_new("//out/"), PathMap::default())
                .with_default_toolchain(default.dupe()),
        );
        let settings = Settings::new(build.dupe(), default);
        assert!(settings.is_default());
        let dir = SourceDir::unchecked_new("//foo/bar/");
        assert_eq!("//out/obj/foo/bar/", settings.target_out_dir(&dir).value());
        assert_eq!("//out/gen/foo/bar/", settings.target_gen_dir(&dir).value());
        assert_eq!("//out/gen/", settings.target_gen_dir(&SourceDir::root()).value());

        let host_settings = Settings::new(build, host);
        assert!(!host_settings.is_default());
        assert_eq!("//out/host/", host_settings.root_out_dir().value());
        assert_eq!("//out/host/obj/foo/bar/", host_settings.target_out_dir(&dir).value());
    }
}
