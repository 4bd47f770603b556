/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use gn_core::fs::source_file::SourceFile;
use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use gn_node::output_type::OutputType;
use gn_node::rust_values::CrateType;
use gn_node::rust_values::RustValues;
use gn_node::target::Target;
use starlark_map::small_map::SmallMap;
use thiserror::Error;

use crate::value_extractors::ScopeFields;

#[derive(Debug, Error)]
enum RustValuesError {
    #[error("Inadmissible crate type \"{0}\".\nThe crate type must be one of {1}.")]
    InvalidCrateType(String, String),
    #[error("Must set \"crate_type\" on a Rust \"{0}\".\nThe crate type must be one of {1}.")]
    MissingCrateType(OutputType, String),
    #[error("Missing \"crate_root\" and missing \"{0}\" in sources.")]
    MissingCrateRoot(&'static str),
}

/// Crate name, type, root and aliased deps, in that order.
pub(crate) fn fill_rust_values(
    fields: &ScopeFields<'_, '_>,
    target: &Target,
    declaration: &Origin,
) -> anyhow::Result<RustValues> {
    let crate_name = fields
        .string("crate_name")?
        .unwrap_or_else(|| target.label.name().to_owned());

    let crate_type = fields.read("crate_type", |v| {
        let name = v.as_str()?;
        CrateType::from_name(name).ok_or_else(|| {
            RustValuesError::InvalidCrateType(name.to_owned(), CrateType::allowed_names()).into()
        })
    })?;
    if crate_type.is_none()
        && matches!(
            target.output_type,
            OutputType::SharedLibrary | OutputType::LoadableModule
        )
    {
        return Err(RustValuesError::MissingCrateType(
            target.output_type,
            CrateType::allowed_names(),
        ))
        .at(declaration);
    }

    let crate_root = match fields.file("crate_root")? {
        Some(root) => root,
        None => default_crate_root(target).at(declaration)?,
    };

    let aliased_deps = fields
        .read("aliased_deps", |v| {
            let mut aliases = SmallMap::new();
            for (crate_name, label) in v.as_scope()?.iter() {
                let label = fields.label_resolver().resolve(fields.dir(), label.as_str()?)?;
                aliases.insert(label, crate_name.to_owned());
            }
            Ok(aliases)
        })?
        .unwrap_or_default();

    Ok(RustValues {
        crate_name,
        crate_type,
        crate_root: Some(crate_root),
        aliased_deps,
    })
}

/// The only source, or the conventional root for the kind.
fn default_crate_root(target: &Target) -> Result<SourceFile, RustValuesError> {
    if let [only] = target.sources.as_slice() {
        return Ok(only.clone());
    }
    let conventional = if target.output_type == OutputType::Executable {
        "main.rs"
    } else {
        "lib.rs"
    };
    target
        .sources
        .iter()
        .find(|s| s.name() == conventional)
        .cloned()
        .ok_or(RustValuesError::MissingCrateRoot(conventional))
}
