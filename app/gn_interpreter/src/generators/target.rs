/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use gn_node::target::Target;
use gn_node::visibility::Visibility;

use crate::generators::ensure_in_output_dir;
use crate::value_extractors::ScopeFields;

/// Fields every target kind accepts.
pub(crate) fn fill_generic(fields: &ScopeFields<'_, '_>, target: &mut Target) -> anyhow::Result<()> {
    if let Some(configs) = fields.unique_labels("all_dependent_configs")? {
        target.all_dependent_configs = configs;
    }
    if let Some(configs) = fields.unique_labels("public_configs")? {
        target.public_configs = configs;
    }

    if let Some(deps) = fields.unique_labels("deps")? {
        target.deps = deps.to_vec();
    }
    if let Some(deps) = fields.unique_labels("public_deps")? {
        target.public_deps = deps.to_vec();
    }
    if let Some(deps) = fields.unique_labels("data_deps")? {
        target.data_deps = deps.to_vec();
    }
    if let Some(deps) = fields.unique_labels("gen_deps")? {
        target.gen_deps = deps.to_vec();
    }

    // Entries ending in a slash are directories.
    if let Some(data) = fields.read("data", |v| {
        let paths = fields.settings().build_settings().path_resolver();
        v.as_string_list()?
            .into_iter()
            .map(|s| -> anyhow::Result<String> {
                if s.ends_with('/') {
                    Ok(paths.resolve_dir(fields.dir(), s)?.value().to_owned())
                } else {
                    Ok(paths.resolve_file(fields.dir(), s)?.value().to_owned())
                }
            })
            .collect()
    })? {
        target.data = data;
    }

    if let Some(metadata) = fields.scope_value("metadata")? {
        target.metadata = metadata.to_json_map();
    }
    if let Some(testonly) = fields.bool("testonly")? {
        target.testonly = testonly;
    }
    if let Some(patterns) = fields.patterns("assert_no_deps")? {
        target.assert_no_deps = patterns;
    }
    if let Some(patterns) = fields.patterns("visibility")? {
        target.visibility = Visibility::from_patterns(patterns);
    }
    target.write_runtime_deps = fields.read("write_runtime_deps", |v| {
        let file = fields
            .settings()
            .build_settings()
            .path_resolver()
            .resolve_file(fields.dir(), v.as_str()?)?;
        ensure_in_output_dir(fields.settings(), file.value())?;
        Ok(file)
    })?;
    Ok(())
}
