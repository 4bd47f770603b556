/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Typed reads of scope variables.

use dupe::Dupe;
use gazebo::prelude::SliceExt;
use gn_core::build_settings::Settings;
use gn_core::collections::ordered_set::OrderedSet;
use gn_core::fs::source_dir::SourceDir;
use gn_core::fs::source_file::SourceFile;
use gn_core::label::pattern::LabelPattern;
use gn_core::label::Label;
use gn_core::label::LabelResolver;
use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use thiserror::Error;

use crate::scope::Scope;
use crate::value::ScopeValue;
use crate::value::Value;

#[derive(Debug, Error)]
enum ExtractError {
    #[error("Duplicate item in list.\nThe item \"{0}\" was already in the list.")]
    Duplicate(String),
}

pub fn extract_list_of_strings(value: &Value) -> anyhow::Result<Vec<String>> {
    value.as_list()?.try_map(|v| v.as_str().map(str::to_owned))
}

pub fn extract_list_of_relative_files(
    settings: &Settings,
    current_dir: &SourceDir,
    value: &Value,
) -> anyhow::Result<Vec<SourceFile>> {
    let paths = settings.build_settings().path_resolver();
    value
        .as_list()?
        .iter()
        .map(|v| -> anyhow::Result<SourceFile> {
            Ok(paths.resolve_file(current_dir, v.as_str()?)?)
        })
        .collect()
}

pub fn extract_list_of_relative_dirs(
    settings: &Settings,
    current_dir: &SourceDir,
    value: &Value,
) -> anyhow::Result<Vec<SourceDir>> {
    let paths = settings.build_settings().path_resolver();
    value
        .as_list()?
        .iter()
        .map(|v| -> anyhow::Result<SourceDir> {
            Ok(paths.resolve_dir(current_dir, v.as_str()?)?)
        })
        .collect()
}

pub fn extract_list_of_labels(
    resolver: LabelResolver<'_>,
    current_dir: &SourceDir,
    value: &Value,
) -> anyhow::Result<Vec<Label>> {
    value
        .as_list()?
        .try_map(|v| resolver.resolve(current_dir, v.as_str()?))
}

/// Like [`extract_list_of_labels`], but a label may only appear once.
pub fn extract_list_of_unique_labels(
    resolver: LabelResolver<'_>,
    current_dir: &SourceDir,
    value: &Value,
) -> anyhow::Result<OrderedSet<Label>> {
    let mut labels = OrderedSet::new();
    for label in extract_list_of_labels(resolver, current_dir, value)? {
        let name = label.user_visible_name(false);
        if !labels.insert(label) {
            return Err(ExtractError::Duplicate(name).into());
        }
    }
    Ok(labels)
}

pub fn extract_list_of_label_patterns(
    resolver: LabelResolver<'_>,
    current_dir: &SourceDir,
    value: &Value,
) -> anyhow::Result<Vec<LabelPattern>> {
    value
        .as_list()?
        .try_map(|v| LabelPattern::parse(resolver, current_dir, v.as_str()?))
}

/// Reads the variables a declaration block set, marking each one read as used.
///
/// Every accessor returns `None` when the variable is not set; type and resolution errors
/// point at the assignment.
pub struct ScopeFields<'s, 'p> {
    scope: &'s Scope<'p>,
    settings: &'s Settings,
    dir: SourceDir,
}

impl<'s, 'p> ScopeFields<'s, 'p> {
    pub fn new(scope: &'s Scope<'p>, settings: &'s Settings) -> ScopeFields<'s, 'p> {
        ScopeFields {
            scope,
            settings,
            dir: scope.source_dir(),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// The directory relative paths are resolved against.
    pub fn dir(&self) -> &SourceDir {
        &self.dir
    }

    pub fn label_resolver(&self) -> LabelResolver<'_> {
        self.settings.label_resolver()
    }

    pub fn get(&self, name: &str) -> Option<(&Value, &Origin)> {
        self.scope.get_value_with_origin(name)
    }

    pub fn origin_of(&self, name: &str) -> Option<Origin> {
        self.scope.get_value_with_origin(name).map(|(_, o)| o.dupe())
    }

    /// Apply `extract` to the variable if it is set; errors point at its assignment.
    pub fn read<T>(
        &self,
        name: &str,
        extract: impl FnOnce(&Value) -> anyhow::Result<T>,
    ) -> anyhow::Result<Option<T>> {
        match self.get(name) {
            Some((value, origin)) => extract(value).at(origin).map(Some),
            None => Ok(None),
        }
    }

    pub fn string(&self, name: &str) -> anyhow::Result<Option<String>> {
        self.read(name, |v| Ok(v.as_str()?.to_owned()))
    }

    pub fn bool(&self, name: &str) -> anyhow::Result<Option<bool>> {
        self.read(name, |v| v.as_bool())
    }

    pub fn int(&self, name: &str) -> anyhow::Result<Option<i64>> {
        self.read(name, |v| v.as_int())
    }

    pub fn scope_value(&self, name: &str) -> anyhow::Result<Option<ScopeValue>> {
        self.read(name, |v| Ok(v.as_scope()?.dupe()))
    }

    pub fn strings(&self, name: &str) -> anyhow::Result<Option<Vec<String>>> {
        self.read(name, extract_list_of_strings)
    }

    pub fn file(&self, name: &str) -> anyhow::Result<Option<SourceFile>> {
        self.read(name, |v| {
            Ok(self
                .settings
                .build_settings()
                .path_resolver()
                .resolve_file(&self.dir, v.as_str()?)?)
        })
    }

    pub fn files(&self, name: &str) -> anyhow::Result<Option<Vec<SourceFile>>> {
        self.read(name, |v| {
            extract_list_of_relative_files(self.settings, &self.dir, v)
        })
    }

    pub fn source_dir(&self, name: &str) -> anyhow::Result<Option<SourceDir>> {
        self.read(name, |v| {
            Ok(self
                .settings
                .build_settings()
                .path_resolver()
                .resolve_dir(&self.dir, v.as_str()?)?)
        })
    }

    pub fn dirs(&self, name: &str) -> anyhow::Result<Option<Vec<SourceDir>>> {
        self.read(name, |v| {
            extract_list_of_relative_dirs(self.settings, &self.dir, v)
        })
    }

    pub fn label(&self, name: &str) -> anyhow::Result<Option<Label>> {
        self.read(name, |v| {
            self.label_resolver().resolve(&self.dir, v.as_str()?)
        })
    }

    pub fn labels(&self, name: &str) -> anyhow::Result<Option<Vec<Label>>> {
        self.read(name, |v| {
            extract_list_of_labels(self.label_resolver(), &self.dir, v)
        })
    }

    pub fn unique_labels(&self, name: &str) -> anyhow::Result<Option<OrderedSet<Label>>> {
        self.read(name, |v| {
            extract_list_of_unique_labels(self.label_resolver(), &self.dir, v)
        })
    }

    pub fn patterns(&self, name: &str) -> anyhow::Result<Option<Vec<LabelPattern>>> {
        self.read(name, |v| {
            extract_list_of_label_patterns(self.label_resolver(), &self.dir, v)
        })
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
    fn test_unique_labels_rejects_duplicates() {
        let settings = settings();
        let value = Value::list_of_strings([":a", "//x:a", ":a"]);
        let err = extract_list_of_unique_labels(
            settings.label_resolver(),
            &SourceDir::unchecked_new("//x/"),
            &value,
        )
        .unwrap_err();
        assert_eq!(
            "Duplicate item in list.\nThe item \"//x:a\" was already in the list.",
            err.to_string()
        );
    }

    #[test]
    fn test_fields_resolve_against_scope_dir() {
        let settings = settings();
        let mut scope = Scope::new_root();
        scope.set_source_dir(SourceDir::unchecked_new("//app/"));
        scope.set_value(
            "sources",
            Value::list_of_strings(["a.cc", "../lib/b.cc"]),
            Origin::new("//app/BUILD.gn", 3, 5),
        );
        scope.set_value("flag", Value::string("yes"), Origin::new("//app/BUILD.gn", 4, 5));
        let fields = ScopeFields::new(&scope, &settings);
        let files = fields.files("sources").unwrap().unwrap();
        assert_eq!(
            vec!["//app/a.cc", "//lib/b.cc"],
            files.iter().map(|f| f.value()).collect::<Vec<_>>()
        );
        assert_eq!(None, fields.files("missing").unwrap());
        let err = fields.bool("flag").unwrap_err();
        assert!(format!("{:#}", err).starts_with("At //app/BUILD.gn:4:5: This is not a boolean."));
        assert!(scope.check_for_unused_vars().is_ok());
    }
}
