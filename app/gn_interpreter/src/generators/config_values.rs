/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The compiler and linker flags shared by targets and configs.

use gn_core::fs::source_dir::SourceDir;
use gn_node::config_values::framework_name;
use gn_node::config_values::ConfigValues;
use gn_node::config_values::LibFile;
use thiserror::Error;

use crate::value::Value;
use crate::value_extractors::extract_list_of_relative_dirs;
use crate::value_extractors::extract_list_of_relative_files;
use crate::value_extractors::extract_list_of_strings;
use crate::value_extractors::ScopeFields;

#[derive(Debug, Error)]
enum ConfigValuesError {
    #[error(
        "Invalid framework name.\n\"{0}\" is not a valid framework name. A framework name \
        ends with \".framework\" and has no path separators."
    )]
    InvalidFramework(String),
    #[error(
        "Bad precompiled_header value.\n\"{0}\" looks like a source-absolute path. \
        precompiled_header is the string the sources #include, written exactly as\nthey \
        include it, not a path."
    )]
    PrecompiledHeaderIsPath(String),
}

/// Collect every flag variable set in `fields`.
///
/// Paths are resolved against `input_dir`, the directory of the file that declared the target
/// or config, so a config keeps meaning the same paths wherever it is applied.
pub(crate) fn collect_config_values(
    fields: &ScopeFields<'_, '_>,
    input_dir: &SourceDir,
) -> anyhow::Result<ConfigValues> {
    let mut values = ConfigValues::default();

    macro_rules! strings {
        ($($field:ident),* $(,)?) => {
            $(if let Some(v) = fields.strings(stringify!($field))? {
                values.$field = v;
            })*
        };
    }
    strings!(
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
    );

    macro_rules! dirs {
        ($($field:ident),* $(,)?) => {
            $(if let Some(v) = fields.read(stringify!($field), |v| {
                extract_list_of_relative_dirs(fields.settings(), input_dir, v)
            })? {
                values.$field = v;
            })*
        };
    }
    dirs!(include_dirs, lib_dirs, framework_dirs);

    if let Some(inputs) = fields.read("inputs", |v| {
        extract_list_of_relative_files(fields.settings(), input_dir, v)
    })? {
        values.inputs = inputs;
    }

    if let Some(libs) = fields.read("libs", |v| {
        v.as_list()?
            .iter()
            .map(|lib| lib_file(fields, input_dir, lib))
            .collect()
    })? {
        values.libs = libs;
    }

    for (name, field) in [
        ("frameworks", &mut values.frameworks),
        ("weak_frameworks", &mut values.weak_frameworks),
    ] {
        if let Some(frameworks) = fields.read(name, |v| {
            let frameworks = extract_list_of_strings(v)?;
            if let Some(bad) = frameworks.iter().find(|f| framework_name(f).is_none()) {
                return Err(ConfigValuesError::InvalidFramework(bad.clone()).into());
            }
            Ok(frameworks)
        })? {
            *field = frameworks;
        }
    }

    if let Some(externs) = fields.read("externs", |v| {
        let paths = fields.settings().build_settings().path_resolver();
        v.as_scope()?
            .iter()
            .map(|(crate_name, file)| -> anyhow::Result<(String, LibFile)> {
                let file = paths.resolve_file(input_dir, file.as_str()?)?;
                Ok((crate_name.to_owned(), LibFile::File(file)))
            })
            .collect()
    })? {
        values.externs = externs;
    }

    values.precompiled_header = fields.read("precompiled_header", |v| {
        let header = v.as_str()?;
        if header.starts_with("//") {
            return Err(ConfigValuesError::PrecompiledHeaderIsPath(header.to_owned()).into());
        }
        Ok(header.to_owned())
    })?;
    values.precompiled_source = fields.read("precompiled_source", |v| {
        Ok(fields
            .settings()
            .build_settings()
            .path_resolver()
            .resolve_file(input_dir, v.as_str()?)?)
    })?;

    Ok(values)
}

/// A `libs` entry with a slash is a file, anything else is passed to the linker by name.
fn lib_file(fields: &ScopeFields<'_, '_>, input_dir: &SourceDir, lib: &Value) -> anyhow::Result<LibFile> {
    let lib = lib.as_str()?;
    if lib.contains('/') {
        Ok(LibFile::File(
            fields
                .settings()
                .build_settings()
                .path_resolver()
                .resolve_file(input_dir, lib)?,
        ))
    } else {
        Ok(LibFile::Name(lib.to_owned()))
    }
}
