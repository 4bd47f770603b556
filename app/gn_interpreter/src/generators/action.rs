/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! `action` and `action_foreach`.

use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use gn_node::output_type::OutputType;
use gn_node::substitution::SubstitutionPattern;
use gn_node::target::Target;
use thiserror::Error;

use crate::generators::ensure_pattern_in_output_dir;
use crate::generators::origin_of;
use crate::generators::read_output_patterns;
use crate::generators::read_patterns;
use crate::generators::required;
use crate::value_extractors::ScopeFields;

#[derive(Debug, Error)]
enum ActionError {
    #[error(
        "Source expansions are not allowed in the {0} of an action.\nUse action_foreach() to \
        run the script once per source."
    )]
    SourceExpansionInAction(&'static str),
    #[error(
        "action_foreach should have a pattern in the output.\nEvery output of action_foreach \
        needs a source expansion such as {{{{source_name_part}}}}."
    )]
    NoSourceExpansionInForeach,
    #[error("Action has no outputs.\nSet \"outputs\" to the files the script writes.")]
    NoOutputs,
}

pub(crate) fn fill_action(
    fields: &ScopeFields<'_, '_>,
    target: &mut Target,
    declaration: &Origin,
) -> anyhow::Result<()> {
    let foreach = target.output_type == OutputType::ActionForeach;

    if let Some(sources) = fields.files("sources")? {
        target.sources = sources;
    }
    target.action_values.script = Some(required(fields.file("script")?, "script", declaration)?);

    let outputs = required(read_output_patterns(fields, "outputs")?, "outputs", declaration)?;
    let outputs_origin = origin_of(fields, "outputs", declaration);
    if outputs.is_empty() {
        return Err(ActionError::NoOutputs).at(&outputs_origin);
    }
    if foreach {
        if !outputs.patterns().iter().all(|p| p.has_source_expansion()) {
            return Err(ActionError::NoSourceExpansionInForeach).at(&outputs_origin);
        }
    } else if outputs.has_source_expansion() {
        return Err(ActionError::SourceExpansionInAction("outputs")).at(&outputs_origin);
    }
    target.action_values.outputs = outputs;

    if let Some(args) = read_patterns(fields, "args")? {
        if !foreach && args.has_source_expansion() {
            return Err(ActionError::SourceExpansionInAction("args"))
                .at(&origin_of(fields, "args", declaration));
        }
        target.action_values.args = args;
    }
    target.action_values.depfile = fields.read("depfile", |v| {
        let pattern = SubstitutionPattern::parse(v.as_str()?)?;
        if !foreach && pattern.has_source_expansion() {
            return Err(ActionError::SourceExpansionInAction("depfile").into());
        }
        ensure_pattern_in_output_dir(fields.settings(), &pattern)?;
        Ok(pattern)
    })?;
    if let Some(contents) = read_patterns(fields, "response_file_contents")? {
        if !foreach && contents.has_source_expansion() {
            return Err(ActionError::SourceExpansionInAction("response_file_contents"))
                .at(&origin_of(fields, "response_file_contents", declaration));
        }
        target.action_values.response_file_contents = contents;
    }

    if let Some(inputs) = fields.files("inputs")? {
        target.config_values.inputs = inputs;
    }
    target.pool = fields.label("pool")?;
    Ok(())
}
