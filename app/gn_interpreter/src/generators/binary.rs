/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Executables, libraries and source sets.

use dupe::Dupe;
use gn_core::fs::source_file::SourceFile;
use gn_core::fs::source_file_type::SourceFileTypeSet;
use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use gn_node::output_type::OutputType;
use gn_node::target::Target;
use thiserror::Error;

use crate::generators::config_values::collect_config_values;
use crate::generators::ensure_in_output_dir;
use crate::generators::origin_of;
use crate::generators::rust_values::fill_rust_values;
use crate::generators::swift_values::fill_swift_values;
use crate::value_extractors::extract_list_of_relative_files;
use crate::value_extractors::ScopeFields;

#[derive(Debug, Error)]
enum BinaryError {
    #[error(
        "Only source, header, and object files belong in the sources of a {0}. {1} is not one \
        of the valid types."
    )]
    InvalidSourceType(OutputType, SourceFile),
    #[error(
        "More than one language used in target sources.\nMixed sources are not allowed, unless \
        they are compilation-compatible (e.g. Objective C and C++)."
    )]
    MixedSources,
    #[error(
        "Label not in deps.\nThe label \"{0}\"\nwas not in the deps of this target. \
        allow_circular_includes_from only allows\ntargets present in the deps."
    )]
    CircularIncludesNotInDeps(String),
}

/// The binary pipeline. Each step may end generation; the order is fixed because later steps
/// read what earlier ones filled in.
pub(crate) fn fill_binary(
    fields: &ScopeFields<'_, '_>,
    target: &mut Target,
    declaration: &Origin,
) -> anyhow::Result<()> {
    target.output_name = fields.string("output_name")?;
    if let Some(v) = fields.bool("output_prefix_override")? {
        target.output_prefix_override = v;
    }
    target.output_dir = fields.read("output_dir", |v| {
        let dir = fields
            .settings()
            .build_settings()
            .path_resolver()
            .resolve_dir(fields.dir(), v.as_str()?)?;
        ensure_in_output_dir(fields.settings(), dir.value())?;
        Ok(dir)
    })?;
    target.output_extension = fields.string("output_extension")?;

    fill_sources(fields, target)?;

    if let Some(public) = fields.files("public")? {
        target.public_headers = public;
        target.all_headers_public = false;
    }
    if let Some(friends) = fields.patterns("friend")? {
        target.friends = friends;
    }
    if let Some(v) = fields.bool("check_includes")? {
        target.check_includes = v;
    }
    if let Some(configs) = fields.unique_labels("configs")? {
        target.configs = configs;
    }
    fill_allow_circular_includes_from(fields, target)?;
    if target.output_type == OutputType::StaticLibrary {
        if let Some(v) = fields.bool("complete_static_lib")? {
            target.complete_static_lib = v;
        }
    }
    target.pool = fields.label("pool")?;

    if target.source_types_used.mixed_source_used() {
        return Err(BinaryError::MixedSources).at(&origin_of(fields, "sources", declaration));
    }

    let kind = target.output_type;
    if kind.is_rust_only() || (target.source_types_used.rust_source_used() && kind.supports_rust())
    {
        target.rust_values = Some(fill_rust_values(fields, target, declaration)?);
    }
    if target.source_types_used.swift_source_used() {
        target.swift_values = Some(fill_swift_values(fields, target)?);
    }

    target.config_values = collect_config_values(fields, fields.dir())?;
    Ok(())
}

fn fill_sources(fields: &ScopeFields<'_, '_>, target: &mut Target) -> anyhow::Result<()> {
    let kind = target.output_type;
    let classified = fields.read("sources", |v| {
        let sources = extract_list_of_relative_files(fields.settings(), fields.dir(), v)?;
        let mut types = SourceFileTypeSet::default();
        for source in &sources {
            let file_type = source.file_type();
            if !file_type.is_allowed_in_binary_sources() {
                return Err(BinaryError::InvalidSourceType(kind, source.clone()).into());
            }
            types.set(file_type);
        }
        Ok((sources, types))
    })?;
    if let Some((sources, types)) = classified {
        target.sources = sources;
        target.source_types_used = types;
    }
    Ok(())
}

fn fill_allow_circular_includes_from(
    fields: &ScopeFields<'_, '_>,
    target: &mut Target,
) -> anyhow::Result<()> {
    let labels = match fields.unique_labels("allow_circular_includes_from")? {
        Some(labels) => labels,
        None => return Ok(()),
    };
    let linked: Vec<_> = target.linked_deps().collect();
    if let Some(missing) = labels.iter().find(|l| !linked.contains(l)) {
        let origin = fields
            .origin_of("allow_circular_includes_from")
            .unwrap_or_else(|| target.origin.dupe());
        return Err(BinaryError::CircularIncludesNotInDeps(
            missing.user_visible_name(false),
        ))
        .at(&origin);
    }
    target.allow_circular_includes_from = labels;
    Ok(())
}
