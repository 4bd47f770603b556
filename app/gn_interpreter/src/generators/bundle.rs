/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! `bundle_data` and `create_bundle`.

use gn_core::fs::source_dir::SourceDir;
use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use gn_node::target::Target;
use starlark_map::small_map::SmallMap;
use thiserror::Error;

use crate::generators::ensure_in_output_dir;
use crate::generators::origin_of;
use crate::generators::read_output_patterns;
use crate::generators::read_patterns;
use crate::generators::required;
use crate::value_extractors::ScopeFields;

const UI_TESTING_PRODUCT_TYPE: &str = "com.apple.product-type.bundle.ui-testing";

#[derive(Debug, Error)]
enum BundleError {
    #[error("Empty sources for bundle_data target.\nYou have to specify at least one file in the \"sources\".")]
    EmptySources,
    #[error("Need exactly one output for bundle_data.\nFound {0}.")]
    NotOneOutput(usize),
    #[error(
        "Invalid bundle_data output.\nThe output \"{0}\" must start with a bundle directory \
        substitution such as\n{{{{bundle_resources_dir}}}}."
    )]
    OutputNotInBundle(String),
    #[error(
        "Path is not in bundle root dir.\n\"{0}\" should be in the bundle root directory \"{1}\" \
        or below."
    )]
    NotInBundleRoot(String, String),
    #[error(
        "xcode_test_application_name is only valid for ui-testing bundles.\nSet product_type to \
        \"{0}\" to use it."
    )]
    TestApplicationNameWithoutUiTesting(&'static str),
    #[error("post_processing_outputs must be set and non-empty when post_processing_script is set.")]
    NoPostProcessingOutputs,
}

pub(crate) fn fill_bundle_data(
    fields: &ScopeFields<'_, '_>,
    target: &mut Target,
    declaration: &Origin,
) -> anyhow::Result<()> {
    let sources = fields.files("sources")?.unwrap_or_default();
    if sources.is_empty() {
        return Err(BundleError::EmptySources).at(&origin_of(fields, "sources", declaration));
    }
    let outputs = required(read_patterns(fields, "outputs")?, "outputs", declaration)?;
    let outputs_origin = origin_of(fields, "outputs", declaration);
    match outputs.patterns() {
        [pattern] => {
            if !pattern.first_placeholder().map_or(false, |t| t.is_bundle()) {
                return Err(BundleError::OutputNotInBundle(pattern.to_string())).at(&outputs_origin);
            }
        }
        patterns => {
            return Err(BundleError::NotOneOutput(patterns.len())).at(&outputs_origin);
        }
    }
    target.sources = sources;
    target.action_values.outputs = outputs;
    if let Some(product_type) = fields.string("product_type")? {
        target.bundle_data.product_type = product_type;
    }
    Ok(())
}

pub(crate) fn fill_create_bundle(
    fields: &ScopeFields<'_, '_>,
    target: &mut Target,
) -> anyhow::Result<()> {
    fill_bundle_dirs(fields, target)?;

    let bundle = &mut target.bundle_data;
    if let Some(product_type) = fields.string("product_type")? {
        bundle.product_type = product_type;
    }
    bundle.partial_info_plist = fields.read("partial_info_plist", |v| {
        let file = fields
            .settings()
            .build_settings()
            .path_resolver()
            .resolve_file(fields.dir(), v.as_str()?)?;
        ensure_in_output_dir(fields.settings(), file.value())?;
        Ok(file)
    })?;
    if let Some(attributes) = fields.read("xcode_extra_attributes", |v| {
        let mut attributes = SmallMap::new();
        for (key, value) in v.as_scope()?.iter() {
            attributes.insert(key.to_owned(), value.as_str()?.to_owned());
        }
        Ok(attributes)
    })? {
        bundle.xcode_extra_attributes = attributes;
    }
    bundle.xcode_test_application_name = fields.string("xcode_test_application_name")?;
    if bundle.xcode_test_application_name.is_some()
        && bundle.product_type != UI_TESTING_PRODUCT_TYPE
    {
        return Err(BundleError::TestApplicationNameWithoutUiTesting(
            UI_TESTING_PRODUCT_TYPE,
        ))
        .at(&origin_of(
            fields,
            "xcode_test_application_name",
            &target.origin,
        ));
    }

    bundle.post_processing_script = fields.file("post_processing_script")?;
    if bundle.post_processing_script.is_some() {
        bundle.post_processing_sources = fields.files("post_processing_sources")?.unwrap_or_default();
        let outputs = read_output_patterns(fields, "post_processing_outputs")?.unwrap_or_default();
        if outputs.is_empty() {
            return Err(BundleError::NoPostProcessingOutputs).at(&origin_of(
                fields,
                "post_processing_script",
                &target.origin,
            ));
        }
        bundle.post_processing_outputs = outputs;
        bundle.post_processing_args = read_patterns(fields, "post_processing_args")?.unwrap_or_default();
    }

    if let Some(filter) = fields.patterns("bundle_deps_filter")? {
        bundle.bundle_deps_filter = filter;
    }
    if let Some(transparent) = fields.bool("transparent")? {
        bundle.transparent = transparent;
    }
    Ok(())
}

/// The root must be in the output directory; the other directories must be in the root.
fn fill_bundle_dirs(fields: &ScopeFields<'_, '_>, target: &mut Target) -> anyhow::Result<()> {
    let read_dir = |name: &str, root: Option<&SourceDir>| {
        fields.read(name, |v| {
            let dir = fields
                .settings()
                .build_settings()
                .path_resolver()
                .resolve_dir(fields.dir(), v.as_str()?)?;
            match root {
                Some(root) if !root.contains(dir.value()) => {
                    return Err(BundleError::NotInBundleRoot(
                        dir.value().to_owned(),
                        root.value().to_owned(),
                    )
                    .into());
                }
                _ => ensure_in_output_dir(fields.settings(), dir.value())?,
            }
            Ok(dir)
        })
    };
    let root = read_dir("bundle_root_dir", None)?;
    let dirs = &mut target.bundle_data.dirs;
    dirs.contents_dir = read_dir("bundle_contents_dir", root.as_ref())?;
    dirs.resources_dir = read_dir("bundle_resources_dir", root.as_ref())?;
    dirs.executable_dir = read_dir("bundle_executable_dir", root.as_ref())?;
    dirs.root_dir = root;
    Ok(())
}
