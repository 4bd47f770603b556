/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use gn_node::target::Target;
use thiserror::Error;

use crate::generators::origin_of;
use crate::generators::read_output_patterns;
use crate::generators::required;
use crate::value_extractors::ScopeFields;

#[derive(Debug, Error)]
enum CopyError {
    #[error("Empty sources for copy command.\nYou have to specify at least one file to copy in the \"sources\".")]
    EmptySources,
    #[error(
        "Copy command must have exactly one output.\nYou must specify exactly one value in the \
        \"outputs\" array for the destination of the copy. If there are\nmultiple sources to \
        copy, use a source expansion."
    )]
    NotOneOutput,
    #[error(
        "Copy command must use a source expansion with multiple sources.\nWith more than one \
        source, the output needs a source expansion such as\n{{{{source_file_part}}}} so the \
        copies don't collide."
    )]
    MultipleSourcesNoExpansion,
}

pub(crate) fn fill_copy(
    fields: &ScopeFields<'_, '_>,
    target: &mut Target,
    declaration: &Origin,
) -> anyhow::Result<()> {
    let sources = fields.files("sources")?.unwrap_or_default();
    if sources.is_empty() {
        return Err(CopyError::EmptySources).at(&origin_of(fields, "sources", declaration));
    }
    let outputs = required(read_output_patterns(fields, "outputs")?, "outputs", declaration)?;
    let outputs_origin = origin_of(fields, "outputs", declaration);
    if outputs.len() != 1 {
        return Err(CopyError::NotOneOutput).at(&outputs_origin);
    }
    if sources.len() > 1 && !outputs.has_source_expansion() {
        return Err(CopyError::MultipleSourcesNoExpansion).at(&outputs_origin);
    }
    target.sources = sources;
    target.action_values.outputs = outputs;
    Ok(())
}
